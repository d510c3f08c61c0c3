//! Frequency-domain bar, line and dot renderers.

use tiny_skia::PathBuilder;

use super::{Frame, Render};
use crate::color::{Rgb, Style};
use crate::sample::{band_average, normalize};
use crate::surface::Surface;

/// Classic bottom-up spectrum bars, one per bin.
pub struct Spectrum;

impl Render for Spectrum {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let width = surface.width();
        let height = surface.height();
        let bar_width = (width / data.len() as f32).max(1.0);
        let draw_width = (bar_width - 0.5).max(0.5);

        for (i, &d) in data.iter().enumerate() {
            let v = normalize(d);
            // Minimum height keeps silent bins visible.
            let bar_height = (v * height).max(1.0);
            let color = style.bar_color.resolve(v).opaque();
            let x = i as f32 * bar_width;

            surface.fill_rect(x, height - bar_height, draw_width, bar_height, color);
            if style.mirror {
                surface.fill_rect(x, 0.0, draw_width, bar_height, color);
            }
        }
    }
}

/// Spectrum as a single line rising from the midline.
pub struct LineSpectrum;

impl Render for LineSpectrum {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let center_y = surface.height() / 2.0;
        let slice = surface.width() / data.len() as f32;
        let color = style.bar_color.resolve(0.5).opaque();

        let curve = |sign: f32| -> Vec<(f32, f32)> {
            data.iter()
                .enumerate()
                .map(|(i, &d)| (i as f32 * slice, center_y + sign * normalize(d) * center_y))
                .collect()
        };
        surface.stroke_polyline(&curve(-1.0), color, 2.0, false);
        if style.mirror {
            surface.stroke_polyline(&curve(1.0), color, 2.0, false);
        }
    }
}

/// Spectrum bars with rounded top corners.
pub struct RoundedBars;

impl RoundedBars {
    fn bar_path(x: f32, top: f32, width: f32, height: f32) -> Option<tiny_skia::Path> {
        let radius = 3.0f32.min(width / 2.0).min(height / 2.0);
        let mut pb = PathBuilder::new();
        pb.move_to(x + radius, top);
        pb.line_to(x + width - radius, top);
        pb.quad_to(x + width, top, x + width, top + radius);
        pb.line_to(x + width, top + height);
        pb.line_to(x, top + height);
        pb.line_to(x, top + radius);
        pb.quad_to(x, top, x + radius, top);
        pb.close();
        pb.finish()
    }
}

impl Render for RoundedBars {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let height = surface.height();
        let bar_width = (surface.width() / data.len() as f32).max(1.0);
        let draw_width = (bar_width - 1.0).max(1.0);

        for (i, &d) in data.iter().enumerate() {
            let v = normalize(d);
            let bar_height = (v * height).max(1.0);
            let color = style.bar_color.resolve(v).opaque();
            let x = i as f32 * bar_width;

            if let Some(path) = Self::bar_path(x, height - bar_height, draw_width, bar_height) {
                surface.fill_path(&path, color);
            }
            if style.mirror {
                if let Some(path) = Self::bar_path(x, 0.0, draw_width, bar_height) {
                    surface.fill_path(&path, color);
                }
            }
        }
    }
}

/// Ten-band equalizer with bars growing out of the midline.
pub struct Equalizer;

impl Render for Equalizer {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let width = surface.width();
        let height = surface.height();
        let center_y = height / 2.0;
        let band_count = 10;
        let bar_width = width / band_count as f32;
        let rule = Rgb::new(255, 255, 255).with_alpha(0.2);

        for i in 0..band_count {
            let v = band_average(data, band_count, i);
            let bar_height = v * center_y;
            let color = style.bar_color.resolve(v).opaque();
            let x = i as f32 * bar_width;

            let mid = x + bar_width / 2.0;
            surface.stroke_polyline(&[(mid, 0.0), (mid, height)], rule, 1.0, false);
            surface.fill_rect(
                x + 2.0,
                center_y - bar_height,
                bar_width - 4.0,
                bar_height * 2.0,
                color,
            );
        }
    }
}

/// Spectrum grouped into 32 coarse bands.
pub struct FrequencyBands;

impl Render for FrequencyBands {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let height = surface.height();
        let band_count = 32;
        let bar_width = surface.width() / band_count as f32;
        let draw_width = (bar_width - 2.0).max(1.0);

        for i in 0..band_count {
            let v = band_average(data, band_count, i);
            let bar_height = v * height;
            let color = style.bar_color.resolve(v).opaque();
            let x = i as f32 * bar_width;

            surface.fill_rect(x, height - bar_height, draw_width, bar_height, color);
            if style.mirror {
                surface.fill_rect(x, 0.0, draw_width, bar_height, color);
            }
        }
    }
}

/// Spectrum as discrete dots hovering around the midline.
pub struct FrequencyDots;

impl Render for FrequencyDots {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let height = surface.height();
        let center_y = height / 2.0;
        let dot_count = data.len().min(150);
        let step = (data.len() / dot_count).max(1);
        let x_step = surface.width() / dot_count as f32;

        for i in 0..dot_count {
            let v = normalize(data[(i * step).min(data.len() - 1)]);
            let x = i as f32 * x_step;
            let y = center_y - (v - 0.5) * height * 0.7;
            let size = v * 5.0 + 2.0;
            let color = style.bar_color.resolve(v).opaque();

            surface.fill_circle(x, y, size, color);
            if style.mirror {
                let mirror_y = center_y + (v - 0.5) * height * 0.7;
                surface.fill_circle(x, mirror_y, size, color);
            }
        }
    }
}

/// Horizontal lines stacked top to bottom, length tracking bin energy.
pub struct FrequencyLines;

impl Render for FrequencyLines {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let width = surface.width();
        let height = surface.height();
        let line_spacing = height / data.len() as f32;

        for (i, &d) in data.iter().enumerate() {
            let v = normalize(d);
            let line_length = v * width;
            let color = style.bar_color.resolve(v).opaque();
            let y = i as f32 * line_spacing;

            surface.stroke_polyline(&[(0.0, y), (line_length, y)], color, 2.0, false);
            if style.mirror {
                let mirror_y = height - y;
                surface.stroke_polyline(&[(0.0, mirror_y), (line_length, mirror_y)], color, 2.0, false);
            }
        }
    }
}
