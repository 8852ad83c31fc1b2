//! # Drawing Scoring Client Library
//!
//! Client side of the drawing scoring service. The game server uses it to hand
//! a finished drawing to the scoring service and read back the verdict;
//! operators use the `client` binary to smoke-test a running service.
//!
//! ## Protocol
//!
//! One request per connection: the client writes a single length-prefixed
//! JSON frame and reads a single frame back. The service signals any failure
//! by closing the connection without a response, which surfaces here as
//! [`ClientError::NoResponse`].
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! [`GuessClient`], the stream-level [`exchange`] it runs over each
//! connection, and the [`ClientError`] type.
//!
//! ### Scribble Module (`scribble`)
//! Loading drawings from JSON files and generating random scribbles for
//! testing a deployment without a real player.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::GuessClient;
//! use shared::{DrawingRequest, StrokeEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = DrawingRequest {
//!         drawing: vec![StrokeEvent::press(100, 100), StrokeEvent::moved(200, 150)],
//!         candidates: vec!["sun".into(), "moon".into()],
//!         target: "sun".into(),
//!     };
//!
//!     let verdict = GuessClient::new("127.0.0.1:5000").request(&request).await?;
//!     println!("{} ({}%)", verdict.predicted_word, verdict.score);
//!     Ok(())
//! }
//! ```

pub mod network;
pub mod scribble;

pub use network::{exchange, ClientError, GuessClient};
pub use scribble::{load_drawing, random_drawing};
