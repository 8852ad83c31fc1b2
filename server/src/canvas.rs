//! Per-request raster surface and stroke replay.
//!
//! A [`Canvas`] is created fresh for every request and thrown away afterwards.
//! The pen cursor is never stored on the canvas: it is threaded through
//! [`apply_event`] by the caller, so nothing carries over between requests.

use image::{GrayImage, Luma};
use log::debug;
use shared::{Action, StrokeEvent, CANVAS_HEIGHT, CANVAS_WIDTH, STROKE_WIDTH};
use std::fmt;

pub const BACKGROUND: Luma<u8> = Luma([255]);
pub const FOREGROUND: Luma<u8> = Luma([0]);

/// Pen position in canvas coordinates.
pub type Point = (i32, i32);

/// Fixed-size two-tone drawing surface.
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    pixels: GrayImage,
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            pixels: GrayImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn image(&self) -> &GrayImage {
        &self.pixels
    }

    /// Returns true if the pixel is foreground. Off-canvas points are never inked.
    pub fn is_inked(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x as i64, y as i64)
            && *self.pixels.get_pixel(x as u32, y as u32) == FOREGROUND
    }

    pub fn inked_pixels(&self) -> usize {
        self.pixels.pixels().filter(|p| **p == FOREGROUND).count()
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| *p == BACKGROUND)
    }

    /// Plot a single foreground pixel. Off-canvas points are ignored.
    pub fn plot(&mut self, x: i32, y: i32) {
        self.put(x as i64, y as i64);
    }

    /// Draw a foreground line from `from` to `to` by stamping a square
    /// `width`x`width` brush at every Bresenham point.
    ///
    /// Axis-aligned strokes come out exactly `width` pixels wide; diagonals
    /// are wider, up to `width * sqrt(2)` measured across the stroke.
    ///
    /// The segment is clipped to the canvas (grown by the brush radius) before
    /// rasterising, so far off-canvas coordinates cost nothing.
    pub fn draw_line(&mut self, from: Point, to: Point, width: u32) {
        let width = width.max(1) as i64;
        let lo = -(width / 2);
        let hi = width - 1 + lo;

        let Some((start, end)) = clip_segment(from, to, (-lo).max(hi)) else {
            return;
        };

        for_each_line_point(start, end, |x, y| {
            for dy in lo..=hi {
                for dx in lo..=hi {
                    self.put(x + dx, y + dy);
                }
            }
        });
    }

    /// Reset every pixel to the background color.
    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = BACKGROUND;
        }
    }

    fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i64 && y < self.height() as i64
    }

    fn put(&mut self, x: i64, y: i64) {
        if self.in_bounds(x, y) {
            self.pixels.put_pixel(x as u32, y as u32, FOREGROUND);
        }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("inked_pixels", &self.inked_pixels())
            .finish()
    }
}

/// Apply one stroke event and return the cursor to carry into the next one.
pub fn apply_event(canvas: &mut Canvas, cursor: Option<Point>, event: &StrokeEvent) -> Option<Point> {
    let point = (event.x, event.y);
    match event.action {
        Action::Press => {
            canvas.plot(event.x, event.y);
            Some(point)
        }
        Action::Move => {
            // A move without a cursor only repositions the pen.
            if let Some(last) = cursor {
                canvas.draw_line(last, point, STROKE_WIDTH);
            }
            Some(point)
        }
        Action::Clear => {
            canvas.clear();
            None
        }
    }
}

/// Replay `events` in order on a fresh canvas, returning the canvas and the
/// final cursor.
pub fn replay(events: &[StrokeEvent]) -> (Canvas, Option<Point>) {
    let mut canvas = Canvas::new();
    let cursor = events
        .iter()
        .fold(None, |cursor, event| apply_event(&mut canvas, cursor, event));

    debug!(
        "Replayed {} stroke events, {} pixels inked",
        events.len(),
        canvas.inked_pixels()
    );
    (canvas, cursor)
}

pub fn reconstruct(events: &[StrokeEvent]) -> Canvas {
    replay(events).0
}

/// Liang-Barsky clip against the canvas rectangle grown by `margin` pixels.
fn clip_segment(from: Point, to: Point, margin: i64) -> Option<((i64, i64), (i64, i64))> {
    let (x0, y0) = (from.0 as f64, from.1 as f64);
    let (dx, dy) = (to.0 as f64 - x0, to.1 as f64 - y0);

    let min = -margin as f64;
    let max_x = (CANVAS_WIDTH as i64 - 1 + margin) as f64;
    let max_y = (CANVAS_HEIGHT as i64 - 1 + margin) as f64;

    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    let edges = [
        (-dx, x0 - min),
        (dx, max_x - x0),
        (-dy, y0 - min),
        (dy, max_y - y0),
    ];

    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }

        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| ((x0 + t * dx).round() as i64, (y0 + t * dy).round() as i64);
    Some((at(t0), at(t1)))
}

/// Bresenham walk from `start` to `end`, both endpoints included.
fn for_each_line_point(start: (i64, i64), end: (i64, i64), mut visit: impl FnMut(i64, i64)) {
    let (mut x, mut y) = start;
    let dx = (end.0 - x).abs();
    let dy = -(end.1 - y).abs();
    let step_x = if x < end.0 { 1 } else { -1 };
    let step_y = if y < end.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        visit(x, y);
        if x == end.0 && y == end.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += step_x;
        }
        if e2 <= dx {
            err += dx;
            y += step_y;
        }
    }
}
