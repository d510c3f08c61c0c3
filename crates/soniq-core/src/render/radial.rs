//! Radial renderers built around the surface center.

use std::f32::consts::{PI, TAU};

use tiny_skia::PathBuilder;

use super::{Frame, Render};
use crate::color::Style;
use crate::sample::{interleaved_value, time_value};
use crate::surface::{arc_points, arc_to, Surface};

fn center(surface: &Surface) -> (f32, f32, f32) {
    let cx = surface.width() / 2.0;
    let cy = surface.height() / 2.0;
    let max_radius = surface.width().min(surface.height()) / 2.0;
    (cx, cy, max_radius)
}

/// Filled ring sector from `base` out to `base + length`.
fn sector_path(
    cx: f32,
    cy: f32,
    base: f32,
    outer: f32,
    start_angle: f32,
    end_angle: f32,
) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(cx, cy);
    arc_to(&mut pb, cx, cy, base, start_angle, end_angle, true);
    arc_to(&mut pb, cx, cy, outer, end_angle, start_angle, true);
    pb.close();
    pb.finish()
}

/// Ring of filled sector bars growing outward from an inner circle.
pub struct Circular;

impl Render for Circular {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let (cx, cy, max_radius) = center(surface);
        let base_radius = max_radius * 0.3;
        let max_bar = max_radius - base_radius - 10.0;

        let bar_count = data.len().min(64);
        let angle_step = TAU / bar_count as f32;

        for i in 0..bar_count {
            let v = (interleaved_value(data, bar_count, i) * 1.6).max(0.1);
            let bar_length = (v * max_bar).min(max_bar);
            let start = i as f32 * angle_step - PI / 2.0;
            let end = (i + 1) as f32 * angle_step - PI / 2.0;
            let color = style.bar_color.resolve(v).opaque();

            if let Some(path) = sector_path(cx, cy, base_radius, base_radius + bar_length, start, end)
            {
                surface.fill_path(&path, color);
            }
            if style.mirror {
                if let Some(path) = sector_path(
                    cx,
                    cy,
                    base_radius,
                    base_radius + bar_length,
                    start + PI,
                    end + PI,
                ) {
                    surface.fill_path(&path, color);
                }
            }
        }
    }
}

/// Thin radial bars around a base circle.
pub struct RadialSpectrum;

impl Render for RadialSpectrum {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let (cx, cy, max_radius) = center(surface);
        let base_radius = max_radius * 0.3;
        let max_bar = max_radius - base_radius - 10.0;

        let bar_count = data.len().min(64);
        let angle_step = TAU / bar_count as f32;

        for i in 0..bar_count {
            let v = (interleaved_value(data, bar_count, i) * 1.6).max(0.1);
            let bar_length = (v * max_bar).min(max_bar);
            let angle = i as f32 * angle_step - PI / 2.0;
            let color = style.bar_color.resolve(v).opaque();

            let inner = (cx + angle.cos() * base_radius, cy + angle.sin() * base_radius);
            let outer = (
                cx + angle.cos() * (base_radius + bar_length),
                cy + angle.sin() * (base_radius + bar_length),
            );
            surface.stroke_polyline(&[inner, outer], color, 3.0, false);

            if style.mirror {
                let m = angle + PI;
                let inner = (cx + m.cos() * base_radius, cy + m.sin() * base_radius);
                let outer = (
                    cx + m.cos() * (base_radius + bar_length),
                    cy + m.sin() * (base_radius + bar_length),
                );
                surface.stroke_polyline(&[inner, outer], color, 3.0, false);
            }
        }
    }
}

/// Waveform wrapped into a closed ring around a base radius.
pub struct RadialWaveform;

impl Render for RadialWaveform {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.time;
        if data.is_empty() {
            return;
        }
        let cx = surface.width() / 2.0;
        let cy = surface.height() / 2.0;
        let base_radius = surface.width().min(surface.height()) / 3.0;
        let max_radius = surface.width().min(surface.height()) / 2.0 - 10.0;
        let angle_step = TAU / data.len() as f32;
        let color = style.line_color().opaque();

        let ring = |scale: f32| -> Vec<(f32, f32)> {
            data.iter()
                .enumerate()
                .map(|(i, &d)| {
                    let radius = base_radius + time_value(d) * (max_radius - base_radius) * scale;
                    let angle = i as f32 * angle_step - PI / 2.0;
                    (cx + angle.cos() * radius, cy + angle.sin() * radius)
                })
                .collect()
        };
        surface.stroke_polyline(&ring(1.0), color, style.line_width, true);
        if style.mirror {
            surface.stroke_polyline(&ring(0.7), color, style.line_width, true);
        }
    }
}

/// Eight concentric rings whose thickness tracks band energy.
pub struct FrequencyRings;

impl Render for FrequencyRings {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let cx = surface.width() / 2.0;
        let cy = surface.height() / 2.0;
        let max_radius = surface.width().min(surface.height()) / 2.0 - 10.0;
        let ring_count = 8;

        for i in 0..ring_count {
            let v = interleaved_value(data, ring_count, i);
            let radius = max_radius / ring_count as f32 * (i + 1) as f32;
            let thickness = v * 20.0 + 2.0;
            let color = style.bar_color.resolve(v).opaque();

            surface.stroke_circle(cx, cy, radius, color, thickness);
            if style.mirror {
                surface.stroke_circle(cx, cy, radius * 0.7, color, thickness);
            }
        }
    }
}

/// Short arcs orbiting the center, radius and sweep tracking energy.
pub struct FrequencyArcs;

impl Render for FrequencyArcs {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let (cx, cy, mut max_radius) = center(surface);
        max_radius -= 10.0;
        let base_radius = max_radius * 0.3;
        let arc_count = data.len().min(60);
        let angle_step = TAU / arc_count as f32;

        for i in 0..arc_count {
            let v = (interleaved_value(data, arc_count, i) * 1.5).max(0.1);
            let radius = base_radius + v * (max_radius - base_radius);
            let angle = i as f32 * angle_step - PI / 2.0;
            let sweep = v * PI * 0.5;
            let color = style.bar_color.resolve(v).opaque();
            let width = 2.0 + v * 2.0;

            surface.stroke_polyline(
                &arc_points(cx, cy, radius, angle, angle + sweep),
                color,
                width,
                false,
            );
            if style.mirror {
                surface.stroke_polyline(
                    &arc_points(cx, cy, radius * 0.7, angle, angle + sweep),
                    color,
                    width,
                    false,
                );
            }
        }
    }
}

/// Rays bursting out of the center with a fade-to-transparent gradient.
pub struct LightRays;

impl Render for LightRays {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let (cx, cy, mut max_radius) = center(surface);
        max_radius -= 10.0;
        let ray_count = data.len().min(60);
        let angle_step = TAU / ray_count as f32;

        for i in 0..ray_count {
            let v = (interleaved_value(data, ray_count, i) * 1.8).max(0.1);
            let ray_length = v * max_radius;
            let angle = i as f32 * angle_step - PI / 2.0;
            let color = style.bar_color.resolve(v);
            let tip = (cx + angle.cos() * ray_length, cy + angle.sin() * ray_length);

            surface.stroke_line_linear(
                (cx, cy),
                tip,
                &[(0.0, color.with_alpha(1.0)), (1.0, color.with_alpha(0.0))],
                2.0 + v * 3.0,
            );
            if style.mirror {
                let inner_angle = angle + PI;
                let inner_length = ray_length * 0.7;
                let inner_tip = (
                    cx + inner_angle.cos() * inner_length,
                    cy + inner_angle.sin() * inner_length,
                );
                surface.stroke_line_linear(
                    (cx, cy),
                    inner_tip,
                    &[(0.0, color.with_alpha(1.0)), (1.0, color.with_alpha(0.0))],
                    2.0 + v * 3.0,
                );
            }
        }
    }
}

/// Spectrum traced along a three-turn spiral.
pub struct Spiral;

impl Render for Spiral {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let (cx, cy, mut max_radius) = center(surface);
        max_radius -= 10.0;
        let turns = 3.0;
        let points_per_turn = data.len() as f32 / turns;
        let point_count = data.len().min(200);

        let mut points = Vec::with_capacity(point_count);
        let mut last_v = 0.1;
        for i in 0..point_count {
            let data_index = i * data.len() / point_count;
            let range = (data.len() / point_count).max(1);

            let mut sum = 0u32;
            let mut max = 0u8;
            let mut count = 0u32;
            for j in 0..range {
                let Some(&value) = data.get(data_index + j) else {
                    break;
                };
                sum += value as u32;
                max = max.max(value);
                count += 1;
            }
            let interleaved = data[(i * range) % data.len()];
            sum += interleaved as u32;
            max = max.max(interleaved);
            count += 1;

            let mean = sum as f32 / count as f32;
            let v = ((mean * 0.5 + max as f32 * 0.5) / 255.0 * 1.8).max(0.1);
            last_v = v;

            let angle = i as f32 / points_per_turn * TAU;
            let radius = i as f32 / point_count as f32 * max_radius;
            let offset = v * 50.0;
            points.push((
                cx + angle.cos() * (radius + offset),
                cy + angle.sin() * (radius + offset),
            ));
        }
        let color = style.bar_color.resolve(last_v).opaque();
        surface.stroke_polyline(&points, color, 2.0, false);
    }
}
