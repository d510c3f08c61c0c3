//! Combined waveform plus spectrum renderer.

use super::{Frame, Render};
use crate::color::Style;
use crate::sample::{normalize, time_value};
use crate::surface::Surface;

/// Waveform through the middle with spectrum bars above and below it.
pub struct Combined;

impl Render for Combined {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let width = surface.width();
        let center_y = surface.height() / 2.0;

        if !frame.time.is_empty() {
            let slice = width / frame.time.len() as f32;
            let points: Vec<(f32, f32)> = frame
                .time
                .iter()
                .enumerate()
                .map(|(i, &d)| (i as f32 * slice, center_y + time_value(d) * center_y * 0.8))
                .collect();
            surface.stroke_polyline(&points, style.bar_color.resolve(0.5).opaque(), 2.0, false);
        }

        if !frame.freq.is_empty() {
            let bar_width = width / frame.freq.len() as f32;
            let draw_width = (bar_width - 0.5).max(0.5);
            for (i, &d) in frame.freq.iter().enumerate() {
                let v = normalize(d);
                let bar_height = v * center_y * 0.3;
                let color = style.bar_color.resolve(v).opaque();
                let x = i as f32 * bar_width;

                surface.fill_rect(x, center_y - bar_height - 5.0, draw_width, bar_height, color);
                surface.fill_rect(x, center_y + 5.0, draw_width, bar_height, color);
            }
        }
    }
}
