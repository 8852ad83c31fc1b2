//! Wire types and framing shared by the scoring service and its clients.
//!
//! Both peers depend on this crate so that the JSON schema and the frame
//! layout cannot drift between them.

pub mod frame;

pub use frame::{decode, encode, write_frame, FrameError, FRAME_HEADER_LEN};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CANVAS_WIDTH: u32 = 800;
pub const CANVAS_HEIGHT: u32 = 600;
pub const STROKE_WIDTH: u32 = 3;
pub const DEFAULT_PORT: u16 = 5000;
pub const READ_CHUNK_SIZE: usize = 4096;

/// Pen action carried by a stroke event, encoded on the wire as 1, 2 or 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Action {
    Press,
    Move,
    Clear,
}

#[derive(Debug, Error)]
#[error("unknown stroke action {0}, expected 1 (press), 2 (move) or 3 (clear)")]
pub struct UnknownAction(pub u8);

impl TryFrom<u8> for Action {
    type Error = UnknownAction;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Action::Press),
            2 => Ok(Action::Move),
            3 => Ok(Action::Clear),
            other => Err(UnknownAction(other)),
        }
    }
}

impl From<Action> for u8 {
    fn from(action: Action) -> Self {
        match action {
            Action::Press => 1,
            Action::Move => 2,
            Action::Clear => 3,
        }
    }
}

/// One sampled input from the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrokeEvent {
    pub x: i32,
    pub y: i32,
    pub action: Action,
}

impl StrokeEvent {
    pub fn press(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            action: Action::Press,
        }
    }

    pub fn moved(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            action: Action::Move,
        }
    }

    pub fn clear() -> Self {
        Self {
            x: 0,
            y: 0,
            action: Action::Clear,
        }
    }
}

/// A drawing submitted for scoring.
///
/// `candidates` is index-significant: duplicates are allowed and the first
/// occurrence wins both the tie-break and the target lookup. `target` does not
/// have to be one of the candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingRequest {
    pub drawing: Vec<StrokeEvent>,
    pub candidates: Vec<String>,
    pub target: String,
}

impl DrawingRequest {
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Verdict returned for one drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResult {
    pub predicted_word: String,
    #[serde(with = "flag")]
    pub is_correct: bool,
    pub score: u8,
}

impl GuessResult {
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Booleans travel as 0/1 integers.
mod flag {
    use serde::de::{Error, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(D::Error::invalid_value(
                Unexpected::Unsigned(other as u64),
                &"0 or 1",
            )),
        }
    }
}
