//! Drawing sources for the client: files on disk and random scribbles.

use rand::Rng;
use shared::{StrokeEvent, CANVAS_HEIGHT, CANVAS_WIDTH};
use std::path::Path;

use crate::network::ClientError;

const MOVES_PER_STROKE: std::ops::RangeInclusive<usize> = 5..=20;
const MAX_STEP: i32 = 25;

/// Read a JSON array of stroke events.
pub fn load_drawing(path: impl AsRef<Path>) -> Result<Vec<StrokeEvent>, ClientError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Generate `strokes` pen strokes, each a press followed by short moves.
/// All points stay on the canvas.
pub fn random_drawing<R: Rng>(rng: &mut R, strokes: usize) -> Vec<StrokeEvent> {
    let max_x = CANVAS_WIDTH as i32 - 1;
    let max_y = CANVAS_HEIGHT as i32 - 1;
    let mut events = Vec::new();

    for _ in 0..strokes {
        let mut x = rng.gen_range(0..=max_x);
        let mut y = rng.gen_range(0..=max_y);
        events.push(StrokeEvent::press(x, y));

        for _ in 0..rng.gen_range(MOVES_PER_STROKE) {
            x = (x + rng.gen_range(-MAX_STEP..=MAX_STEP)).clamp(0, max_x);
            y = (y + rng.gen_range(-MAX_STEP..=MAX_STEP)).clamp(0, max_y);
            events.push(StrokeEvent::moved(x, y));
        }
    }

    events
}
