//! Symmetric geometric renderers.

use std::f32::consts::{PI, TAU};

use super::{Frame, Render};
use crate::color::Style;
use crate::sample::{average, interleaved_value, normalize};
use crate::surface::Surface;

/// Star polygon whose points reach out with spectral energy.
pub struct Star;

impl Star {
    fn outline(
        data: &[u8],
        cx: f32,
        cy: f32,
        max_radius: f32,
        scale: f32,
        point_count: usize,
    ) -> Vec<(f32, f32)> {
        let angle_step = TAU / point_count as f32;
        let mut points = Vec::with_capacity(point_count + 1);
        points.push((cx, cy));
        for i in 0..point_count {
            let v = (interleaved_value(data, point_count, i) * 1.6).max(0.1);
            let radius = v * max_radius * scale;
            let angle = i as f32 * angle_step - PI / 2.0;
            points.push((cx + angle.cos() * radius, cy + angle.sin() * radius));
        }
        points
    }
}

impl Render for Star {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let cx = surface.width() / 2.0;
        let cy = surface.height() / 2.0;
        let max_radius = surface.width().min(surface.height()) / 2.0 - 10.0;
        let point_count = data.len().min(64);
        let color = style.bar_color.resolve(average(data));

        let outer = Self::outline(data, cx, cy, max_radius, 1.0, point_count);
        surface.fill_polygon(&outer, color.with_alpha(0.25));
        surface.stroke_polyline(&outer, color.opaque(), 2.0, true);

        if style.mirror {
            let inner = Self::outline(data, cx, cy, max_radius, 0.5, point_count);
            surface.fill_polygon(&inner, color.with_alpha(0.25));
            surface.stroke_polyline(&inner, color.opaque(), 2.0, true);
        }
    }
}

/// Eight elliptical petals around a center disc.
pub struct Flower;

impl Render for Flower {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let cx = surface.width() / 2.0;
        let cy = surface.height() / 2.0;
        let max_radius = surface.width().min(surface.height()) / 2.0 - 10.0;
        let petals = 8;

        for petal in 0..petals {
            let angle = petal as f32 / petals as f32 * TAU - PI / 2.0;
            let v = (interleaved_value(data, petals, petal) * 1.8).max(0.15);
            let length = v * max_radius;
            let width = length * (0.25 + v * 0.35);
            let color = style.bar_color.resolve(v).opaque();

            // Petal is an ellipse offset half its length along the petal axis.
            let offset = length / 2.0;
            let px = cx + angle.sin() * offset;
            let py = cy - angle.cos() * offset;
            surface.fill_ellipse(px, py, width, length, angle, color);
        }

        let center_v = average(data);
        surface.fill_circle(
            cx,
            cy,
            max_radius * 0.1,
            style.bar_color.resolve(center_v).opaque(),
        );
    }
}

/// Twelve concentric wobbling rings, amplitude-scaled.
pub struct Mandala;

impl Render for Mandala {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        let layers = 12;
        if data.len() < layers {
            return;
        }
        let cx = surface.width() / 2.0;
        let cy = surface.height() / 2.0;
        let max_radius = surface.width().min(surface.height()) / 2.0 - 10.0;
        let points_per_layer = data.len() / layers;

        let peak = data.iter().copied().max().unwrap_or(0);
        let amplitude_scale = (peak as f32 / 255.0).max(0.3);

        for layer in 0..layers {
            let layer_radius = max_radius / layers as f32 * (layer + 1) as f32;
            let angle_step = TAU / points_per_layer as f32;
            // Outer layers move more.
            let layer_scale = 0.5 + layer as f32 / layers as f32;

            let mut sum = 0u32;
            let mut ring = Vec::with_capacity(points_per_layer);
            for i in 0..points_per_layer {
                let Some(&d) = data.get(layer * points_per_layer + i) else {
                    break;
                };
                sum += d as u32;
                let base_offset = (normalize(d) - 0.5) * 2.0;
                let offset = base_offset * layer_radius * 0.6 * layer_scale * amplitude_scale;
                let angle = i as f32 * angle_step;
                ring.push((
                    cx + angle.cos() * (layer_radius + offset),
                    cy + angle.sin() * (layer_radius + offset),
                ));
            }

            let avg = sum as f32 / points_per_layer as f32 / 255.0;
            let color = style.bar_color.resolve(avg).opaque();
            surface.stroke_polyline(&ring, color, 1.5 + avg * 2.5, true);
        }
    }
}

/// Dots repeated across eight rotated mirror segments.
pub struct Kaleidoscope;

impl Render for Kaleidoscope {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let cx = surface.width() / 2.0;
        let cy = surface.height() / 2.0;
        let max_radius = surface.width().min(surface.height()) / 2.0 - 10.0;

        let segments = 8usize;
        let angle_step = TAU / segments as f32;
        let points_per_segment = (data.len() / segments).min(30).max(1);
        let total = segments * points_per_segment;

        for seg in 0..segments {
            let rotation = seg as f32 * angle_step;
            let (sin_r, cos_r) = rotation.sin_cos();

            for i in 0..points_per_segment {
                let element = seg * points_per_segment + i;
                let v = (interleaved_value(data, total, element) * 1.8).max(0.1);
                let radius = v * max_radius;
                let angle = i as f32 / points_per_segment as f32 * (PI / segments as f32);

                let local_x = angle.cos() * radius;
                let local_y = angle.sin() * radius;
                let x = cx + local_x * cos_r - local_y * sin_r;
                let y = cy + local_x * sin_r + local_y * cos_r;

                let color = style.bar_color.resolve(v).opaque();
                surface.fill_circle(x, y, 2.0 + v * 4.0, color);
            }
        }
    }
}

/// Spectrum bars with layered translucent halos.
pub struct Glow;

impl Render for Glow {
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
            let bar_height = v * height;
            let color = style.bar_color.resolve(v);
            let x = i as f32 * bar_width;

            for layer in 0..5 {
                let alpha = 0.3 - layer as f32 * 0.05;
                let glow_height = bar_height + layer as f32 * 5.0;
                let halo = color.with_alpha(alpha);
                surface.fill_rect(
                    x - layer as f32,
                    height - glow_height,
                    draw_width + layer as f32 * 2.0,
                    glow_height,
                    halo,
                );
                if style.mirror {
                    surface.fill_rect(
                        x - layer as f32,
                        layer as f32 * 5.0,
                        draw_width + layer as f32 * 2.0,
                        glow_height,
                        halo,
                    );
                }
            }

            surface.fill_rect(x, height - bar_height, draw_width, bar_height, color.opaque());
            if style.mirror {
                surface.fill_rect(x, 0.0, draw_width, bar_height, color.opaque());
            }
        }
    }
}
