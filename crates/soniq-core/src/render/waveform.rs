//! Time-domain line and bar renderers.

use super::{Frame, Render};
use crate::color::{Rgb, Style};
use crate::sample::time_value;
use crate::surface::Surface;

/// Single waveform polyline across the full width.
pub struct Waveform;

impl Render for Waveform {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.time;
        if data.is_empty() {
            return;
        }
        let width = surface.width();
        let center_y = surface.height() / 2.0;
        let slice = width / data.len() as f32;
        let color = style.line_color();

        let points: Vec<(f32, f32)> = data
            .iter()
            .enumerate()
            .map(|(i, &d)| (i as f32 * slice, center_y + time_value(d) * center_y))
            .collect();
        surface.stroke_polyline(&points, color.opaque(), style.line_width, false);

        if style.mirror {
            let inverted: Vec<(f32, f32)> = data
                .iter()
                .enumerate()
                .map(|(i, &d)| (i as f32 * slice, center_y - time_value(d) * center_y))
                .collect();
            surface.stroke_polyline(&inverted, color.opaque(), style.line_width, false);
        }
    }
}

/// Waveform and its reflection stacked around the midline, with a thin
/// center rule.
pub struct DualWaveform;

impl Render for DualWaveform {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.time;
        if data.is_empty() {
            return;
        }
        let width = surface.width();
        let center_y = surface.height() / 2.0;
        let slice = width / data.len() as f32;
        let color = style.line_color().opaque();

        for sign in [-1.0f32, 1.0] {
            let points: Vec<(f32, f32)> = data
                .iter()
                .enumerate()
                .map(|(i, &d)| {
                    let y = time_value(d) * center_y / 2.0;
                    (i as f32 * slice, center_y + sign * y)
                })
                .collect();
            surface.stroke_polyline(&points, color, style.line_width, false);
        }

        surface.stroke_polyline(&[(0.0, center_y), (width, center_y)], color, 1.0, false);
    }
}

/// Waveform over a faint measurement grid.
pub struct Oscilloscope;

impl Render for Oscilloscope {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let width = surface.width();
        let height = surface.height();
        let center_y = height / 2.0;

        let grid = Rgb::new(255, 255, 255).with_alpha(0.1);
        for i in 0..=4 {
            let y = height / 4.0 * i as f32;
            surface.stroke_polyline(&[(0.0, y), (width, y)], grid, 1.0, false);
        }
        for i in 0..=8 {
            let x = width / 8.0 * i as f32;
            surface.stroke_polyline(&[(x, 0.0), (x, height)], grid, 1.0, false);
        }

        let data = frame.time;
        if data.is_empty() {
            return;
        }
        let slice = width / data.len() as f32;
        let color = style.line_color().opaque();

        // 0.8 leaves a margin at full amplitude.
        let trace = |sign: f32| -> Vec<(f32, f32)> {
            data.iter()
                .enumerate()
                .map(|(i, &d)| {
                    (
                        i as f32 * slice,
                        center_y + sign * time_value(d) * center_y * 0.8,
                    )
                })
                .collect()
        };
        surface.stroke_polyline(&trace(1.0), color, style.line_width, false);
        if style.mirror {
            surface.stroke_polyline(&trace(-1.0), color, style.line_width, false);
        }
    }
}

/// Filled waveform silhouette above and below the midline.
pub struct WaveformFill;

impl Render for WaveformFill {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.time;
        if data.is_empty() {
            return;
        }
        let width = surface.width();
        let center_y = surface.height() / 2.0;
        let slice = width / data.len() as f32;
        let color = style.bar_color.resolve(0.5);

        let lobe = |sign: f32| -> Vec<(f32, f32)> {
            let mut points = Vec::with_capacity(data.len() + 2);
            points.push((0.0, center_y));
            for (i, &d) in data.iter().enumerate() {
                let y = d as f32 / 128.0 * center_y / 2.0;
                points.push((i as f32 * slice, center_y + sign * y));
            }
            points.push((width, center_y));
            points
        };

        for sign in [-1.0f32, 1.0] {
            let points = lobe(sign);
            surface.fill_polygon(&points, color.with_alpha(0.5));
            surface.stroke_polyline(&points[1..points.len() - 1], color.opaque(), 2.0, false);
        }
    }
}

/// One bar per sample, up for positive and down for negative excursions.
pub struct WaveformBars;

impl Render for WaveformBars {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.time;
        if data.is_empty() {
            return;
        }
        let center_y = surface.height() / 2.0;
        let bar_width = (surface.width() / data.len() as f32).max(1.0);
        let draw_width = (bar_width - 0.5).max(0.5);

        for (i, &d) in data.iter().enumerate() {
            let v = time_value(d);
            let bar_height = v.abs() * center_y;
            let color = style.bar_color.resolve(v.abs()).opaque();
            let x = i as f32 * bar_width;

            if v > 0.0 {
                surface.fill_rect(x, center_y - bar_height, draw_width, bar_height, color);
            } else {
                surface.fill_rect(x, center_y, draw_width, bar_height, color);
            }
            if style.mirror {
                if v > 0.0 {
                    surface.fill_rect(x, center_y, draw_width, bar_height, color);
                } else {
                    surface.fill_rect(x, center_y - bar_height, draw_width, bar_height, color);
                }
            }
        }
    }
}

/// Lissajous figure whose frequency ratios and amplitudes are derived from
/// the two halves of the waveform window.
pub struct Lissajous;

impl Render for Lissajous {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.time;
        if data.len() < 4 {
            return;
        }
        let center_x = surface.width() / 2.0;
        let center_y = surface.height() / 2.0;
        let max_radius = surface.width().min(surface.height()) / 2.0 - 20.0;

        let mid = data.len() / 2;
        let (head, tail) = data.split_at(mid);

        let rms_of = |half: &[u8]| -> f32 {
            let sum: f32 = half.iter().map(|&d| time_value(d).powi(2)).sum();
            (sum / half.len() as f32).sqrt()
        };
        let zero_crossings = |half: &[u8]| -> usize {
            half.windows(2)
                .filter(|w| {
                    let prev = time_value(w[0]);
                    let curr = time_value(w[1]);
                    (prev < 0.0 && curr >= 0.0) || (prev > 0.0 && curr <= 0.0)
                })
                .count()
        };

        let ratio_x = ((zero_crossings(head) as f32 / head.len() as f32 * 10.0) as i32 + 1)
            .clamp(1, 5) as f32;
        let ratio_y = ((zero_crossings(tail) as f32 / tail.len() as f32 * 10.0) as i32 + 1)
            .clamp(1, 5) as f32;
        let amp_x = max_radius * (0.4 + rms_of(head) * 0.4);
        let amp_y = max_radius * (0.4 + rms_of(tail) * 0.4);

        let point_count = data.len().max(500);
        let color = style.line_color().opaque();

        let curve = |scale: f32| -> Vec<(f32, f32)> {
            (0..point_count)
                .map(|i| {
                    let t = i as f32 / point_count as f32 * std::f32::consts::TAU;
                    (
                        center_x + (t * ratio_x).cos() * amp_x * scale,
                        center_y + (t * ratio_y).sin() * amp_y * scale,
                    )
                })
                .collect()
        };
        surface.stroke_polyline(&curve(1.0), color, style.line_width, false);
        if style.mirror {
            surface.stroke_polyline(&curve(0.7), color, style.line_width, false);
        }
    }
}
