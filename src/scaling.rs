//! Value-to-pixel mapping for the power sparkline
//!
//! The sparkline is drawn around a horizontal midline: consumption rises
//! above it, feed-in falls below. [`to_pixel_y`] maps a sample onto the
//! vertical axis, and [`layout`] turns a whole window of samples into the
//! line segments the renderer paints. Both are pure so they can be tested
//! without a GUI.
//!
//! Samples beyond [`POWER_MAX_POS`]/[`POWER_MAX_NEG`] are not clipped; they
//! map to coordinates outside the canvas and draw off-canvas.

use crate::types::Sample;

/// Power (W) that maps to the top edge of the canvas
pub const POWER_MAX_POS: f64 = 1000.0;

/// Power (W) that maps to the bottom edge of the canvas
pub const POWER_MAX_NEG: f64 = -1000.0;

/// Map a signed sample onto a vertical pixel coordinate
///
/// `mid_y` is the y coordinate of zero. Positive values scale against
/// `max_pos`, negative values against `|max_neg|`. The result is truncated
/// toward zero.
pub fn to_pixel_y(value: Sample, mid_y: i32, max_pos: f64, max_neg: f64) -> i32 {
    let value = value as f64;
    let mid = mid_y as f64;
    let ratio = if value >= 0.0 {
        value / max_pos
    } else {
        value / max_neg.abs()
    };
    (mid - ratio * mid) as i32
}

/// A point on the sparkline canvas, relative to its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// A straight line between two consecutive samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: PixelPoint,
    pub to: PixelPoint,
}

/// Geometry of one sparkline frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparklineLayout {
    /// y coordinate of the zero reference line
    pub mid_y: i32,
    /// Horizontal distance between consecutive samples
    pub step: i32,
    /// One segment per adjacent pair of samples, oldest on the left
    pub segments: Vec<Segment>,
}

/// Lay out `samples` on a `width` x `height` canvas
///
/// Returns `None` while the canvas has no area yet (before the first layout
/// pass) or when there are fewer than two samples to connect.
///
/// The horizontal step uses integer division, so a canvas whose width is
/// not a multiple of the sample count leaves a small gap on the right.
pub fn layout(samples: &[Sample], width: u32, height: u32) -> Option<SparklineLayout> {
    if width == 0 || height == 0 || samples.len() < 2 {
        return None;
    }

    let mid_y = (height / 2) as i32;
    let step = (width as usize / samples.len()) as i32;

    let points: Vec<PixelPoint> = samples
        .iter()
        .enumerate()
        .map(|(i, &value)| PixelPoint {
            x: i as i32 * step,
            y: to_pixel_y(value, mid_y, POWER_MAX_POS, POWER_MAX_NEG),
        })
        .collect();

    let segments = points
        .windows(2)
        .map(|pair| Segment {
            from: pair[0],
            to: pair[1],
        })
        .collect();

    Some(SparklineLayout {
        mid_y,
        step,
        segments,
    })
}

/// Segments for `samples` on a `width` x `height` canvas, empty when there is
/// nothing to draw
pub fn sparkline_segments(samples: &[Sample], width: u32, height: u32) -> Vec<Segment> {
    layout(samples, width, height)
        .map(|l| l.segments)
        .unwrap_or_default()
}
