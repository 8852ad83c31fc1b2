//! # Drawing Scoring Server Library
//!
//! This library implements the service that judges drawings for the
//! drawing-guessing game. A client streams the pen-stroke events of one
//! drawing together with a list of candidate words and the word the player
//! was meant to draw; the service rebuilds the picture, asks an image-text
//! similarity model which candidate it looks like, and answers with the
//! predicted word, whether the target was guessed, and a 0-100 score.
//!
//! ## Request Pipeline
//!
//! ```text
//! bytes -> frame decode -> JSON request -> canvas replay -> scorer
//!       -> decision -> JSON response -> frame encode -> bytes
//! ```
//!
//! Every stage fails with its own [`ServiceError`] kind. The connection layer
//! is the only place errors are caught: it logs them and closes the
//! connection without writing a response, so clients detect failure by the
//! close alone.
//!
//! ## Module Organization
//!
//! ### Canvas Module (`canvas`)
//! Fixed 800x600 two-tone raster and stroke replay. The pen cursor is an
//! explicit value threaded through the replay, never shared state.
//!
//! ### Scorer Module (`scorer`)
//! The [`SimilarityScorer`] seam, output validation and softmax.
//!
//! ### Clip Module (`clip`)
//! CLIP-backed scorer loaded from a local model artifact (default `clip` feature).
//!
//! ### Handler Module (`handler`)
//! Parsing, scoring and the verdict rules: first-index tie-break, score taken
//! from the target's probability, 0 when the target is not a candidate.
//!
//! ### Network Module (`network`)
//! Sequential accept loop owning the listener and the scorer.
//!
//! ## Concurrency
//!
//! Connections are served strictly one after another and the scorer is only
//! ever called from that single loop. Nothing here assumes concurrent
//! inference against one scorer is safe.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::{ClipScorer, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scorer = ClipScorer::load("./model")?;
//!     let server = Server::bind("127.0.0.1:5000", scorer).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod canvas;
pub mod clip;
pub mod error;
pub mod handler;
pub mod network;
pub mod scorer;

pub use canvas::{reconstruct, replay, Canvas, Point};
pub use clip::ClipScorer;
pub use error::ServiceError;
pub use handler::{decide, handle, parse_request};
pub use network::Server;
pub use scorer::{ScorerError, SimilarityScorer};
