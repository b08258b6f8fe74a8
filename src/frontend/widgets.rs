//! Custom widgets for the overlay
//!
//! - [`ReadingsLabel`] - Two-line CO₂/power text, colored by CO₂ level
//! - [`PowerSparkline`] - Power history polyline around a dashed zero line

use crate::scaling::{self, PixelPoint};
use crate::state::DisplayState;
use crate::types::{Co2Level, Sample};
use egui::{Color32, Pos2, Response, RichText, Sense, Shape, Stroke, Ui, Vec2, Widget};

/// Color of the sparkline polyline
pub const SPARKLINE_COLOR: Color32 = Color32::from_rgb(0, 255, 255);

/// Color of the dashed zero line
pub const MIDLINE_COLOR: Color32 = Color32::WHITE;

/// Label color for a CO₂ level
pub fn co2_color(level: Co2Level) -> Color32 {
    match level {
        Co2Level::Unknown | Co2Level::Normal => Color32::LIGHT_GRAY,
        Co2Level::Elevated => Color32::ORANGE,
        Co2Level::High => Color32::RED,
    }
}

/// Two-line readings label
pub struct ReadingsLabel {
    text: String,
    level: Co2Level,
    font_size: f32,
}

impl ReadingsLabel {
    pub fn new(text: impl Into<String>, level: Co2Level) -> Self {
        Self {
            text: text.into(),
            level,
            font_size: 12.0,
        }
    }

    /// Label for the current readings of `state`
    pub fn from_state(state: &DisplayState) -> Self {
        Self::new(state.label_text(), state.co2_level())
    }

    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }
}

impl Widget for ReadingsLabel {
    fn ui(self, ui: &mut Ui) -> Response {
        let color = co2_color(self.level);
        ui.label(RichText::new(self.text).size(self.font_size).color(color))
    }
}

/// Mini line chart of the power history
///
/// Oldest sample on the left, newest on the right. Drawing is skipped while
/// the allocated rect has no area.
pub struct PowerSparkline<'a> {
    samples: &'a [Sample],
    size: Vec2,
}

impl<'a> PowerSparkline<'a> {
    pub fn new(samples: &'a [Sample], size: Vec2) -> Self {
        Self { samples, size }
    }
}

impl Widget for PowerSparkline<'_> {
    fn ui(self, ui: &mut Ui) -> Response {
        let (rect, response) = ui.allocate_exact_size(self.size, Sense::hover());

        if !ui.is_rect_visible(rect) {
            return response;
        }

        let width = rect.width().max(0.0) as u32;
        let height = rect.height().max(0.0) as u32;
        let Some(layout) = scaling::layout(self.samples, width, height) else {
            return response;
        };

        let painter = ui.painter_at(rect);
        let to_screen = |p: PixelPoint| Pos2::new(rect.min.x + p.x as f32, rect.min.y + p.y as f32);

        let mid = rect.min.y + layout.mid_y as f32;
        painter.extend(Shape::dashed_line(
            &[Pos2::new(rect.min.x, mid), Pos2::new(rect.max.x, mid)],
            Stroke::new(1.0, MIDLINE_COLOR.gamma_multiply(0.6)),
            1.0,
            1.0,
        ));

        let stroke = Stroke::new(1.0, SPARKLINE_COLOR);
        for segment in &layout.segments {
            painter.line_segment([to_screen(segment.from), to_screen(segment.to)], stroke);
        }

        response
    }
}
