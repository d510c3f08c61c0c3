//! Animated renderers carrying state between frames.

use std::f32::consts::{PI, TAU};

use rand::Rng;

use super::{Frame, Render};
use crate::color::Style;
use crate::sample::{average, normalize, rms};
use crate::surface::Surface;

/// Spectrum as floating dots around the midline.
pub struct Particles;

impl Render for Particles {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let height = surface.height();
        let center_y = height / 2.0;
        let count = data.len().min(200);
        let step = (data.len() / count).max(1);
        let x_step = surface.width() / count as f32;

        for i in 0..count {
            let v = normalize(data[(i * step).min(data.len() - 1)]);
            let x = i as f32 * x_step;
            let y = center_y - (v - 0.5) * height * 0.8;
            let size = v * 4.0 + 1.0;
            let color = style.bar_color.resolve(v).opaque();

            surface.fill_circle(x, y, size, color);
            if style.mirror {
                surface.fill_circle(x, center_y + (v - 0.5) * height * 0.8, size, color);
            }
        }
    }
}

/// Concentric ripples breathing with the average level.
pub struct SoundWaves {
    phase: f32,
}

impl SoundWaves {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }
}

impl Render for SoundWaves {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let cx = surface.width() / 2.0;
        let cy = surface.height() / 2.0;
        let max_radius = surface.width().min(surface.height()) / 2.0 - 20.0;
        let avg = average(data);

        self.phase += 0.05;

        let rings = 8;
        for ring in 0..rings {
            let radius = max_radius / rings as f32 * (ring + 1) as f32;
            let phase = self.phase + ring as f32 * 0.5;
            let amplitude = avg * (1.0 - ring as f32 / rings as f32);
            let wave_radius = radius + phase.sin() * amplitude * 30.0;

            let alpha = 0.3 - ring as f32 / rings as f32 * 0.25;
            let color = style.bar_color.resolve(avg).with_alpha(alpha);

            surface.stroke_circle(cx, cy, wave_radius, color, 2.0);
            if style.mirror {
                surface.stroke_circle(cx, cy, wave_radius * 0.7, color, 2.0);
            }
        }
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Pulsing circles driven by signal RMS.
pub struct Pulse {
    phase: f32,
}

impl Pulse {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }
}

impl Render for Pulse {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let cx = surface.width() / 2.0;
        let cy = surface.height() / 2.0;
        let max_radius = surface.width().min(surface.height()) / 2.0 - 10.0;

        let level = (rms(data) * 3.0).min(1.0);
        self.phase += 0.1;

        let pulses = 5;
        for i in 0..pulses {
            let phase = self.phase + i as f32 * 0.5;
            let radius = (phase.sin() * 0.5 + 0.5) * max_radius * (1.0 - i as f32 / pulses as f32);

            let fade = 1.0 - i as f32 / pulses as f32 * 0.6;
            let alpha = ((0.3 + level * 0.7) * fade).max(0.2);
            let color = style.bar_color.resolve(level).with_alpha(alpha);

            surface.stroke_circle(cx, cy, radius, color, 4.0 + i as f32 * 0.5);
        }
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Layered travelling sine waves modulated by the waveform.
pub struct EnergyWaves {
    phase: f32,
}

impl EnergyWaves {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }
}

impl Render for EnergyWaves {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.time;
        if data.is_empty() {
            return;
        }
        let width = surface.width();
        let height = surface.height();
        let center_y = height / 2.0;

        let mut sum_squares = 0.0f32;
        let mut peak = 0.0f32;
        for &d in data {
            let v = normalize(d);
            sum_squares += v * v;
            peak = peak.max(v);
        }
        let level_rms = (sum_squares / data.len() as f32).sqrt();
        let amplitude = ((level_rms * 0.7 + peak * 0.3) * 2.5).min(1.0);

        // Faster motion when louder.
        self.phase += 0.15 + amplitude * 0.4;

        let color = style.bar_color.resolve(amplitude).opaque();
        let layers = 4;
        for layer in 0..layers {
            let phase = self.phase + layer as f32 * 0.6;
            let base = height / 5.0 * (1.0 - layer as f32 / layers as f32 * 0.5);
            let dynamic = base * (0.3 + amplitude * 0.7);

            let wave = |sign: f32| -> Vec<(f32, f32)> {
                let mut points = Vec::new();
                let mut x = 0.0f32;
                while x < width {
                    let idx = ((x / width) * data.len() as f32) as usize;
                    let f = data.get(idx).map(|&d| normalize(d)).unwrap_or(0.0);
                    let freq = x / width * PI * 4.0 + f * TAU;
                    let wave_amp = dynamic * (1.0 + f * 0.5);
                    points.push((x, center_y + sign * (freq + phase).sin() * wave_amp));
                    x += 2.0;
                }
                points
            };
            surface.stroke_polyline(&wave(1.0), color, 1.5 + amplitude * 2.0, false);
            if style.mirror {
                surface.stroke_polyline(&wave(-1.0), color, 1.5 + amplitude * 2.0, false);
            }
        }
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

struct Bubble {
    x: f32,
    y: f32,
    size: f32,
}

/// Bubbles drifting in place, easing toward per-band target sizes.
pub struct Bubbles {
    states: Vec<Bubble>,
}

impl Bubbles {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }
}

impl Render for Bubbles {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let width = surface.width();
        let height = surface.height();
        let count = data.len().min(30);
        let step = (data.len() / count).max(1);

        // Re-seed when the element count changes.
        if self.states.len() != count {
            let mut rng = rand::rng();
            self.states = (0..count)
                .map(|_| Bubble {
                    x: rng.random::<f32>() * width,
                    y: rng.random::<f32>() * height,
                    size: 0.0,
                })
                .collect();
        }

        for (i, bubble) in self.states.iter_mut().enumerate() {
            let v = normalize(data[(i * step).min(data.len() - 1)]);
            let target = v * 50.0 + 5.0;
            bubble.size += (target - bubble.size) * 0.1;

            let color = style.bar_color.resolve(v);
            surface.fill_circle_radial(
                bubble.x,
                bubble.y,
                bubble.size,
                &[
                    (0.0, color.with_alpha(1.0)),
                    (0.7, color.with_alpha(0.5)),
                    (1.0, color.with_alpha(0.0)),
                ],
            );
            surface.stroke_circle(bubble.x, bubble.y, bubble.size, color.opaque(), 2.0);
        }
    }

    fn reset(&mut self) {
        self.states.clear();
    }
}

struct MatrixColumn {
    y: f32,
    speed: f32,
}

/// Falling columns with fading trails.
pub struct Matrix {
    columns: Vec<MatrixColumn>,
}

impl Matrix {
    pub fn new() -> Self {
        Self { columns: Vec::new() }
    }
}

impl Render for Matrix {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let width = surface.width();
        let height = surface.height();
        let count = data.len().min(50);
        let column_width = width / count as f32;

        if self.columns.len() != count {
            let mut rng = rand::rng();
            self.columns = (0..count)
                .map(|_| MatrixColumn {
                    y: rng.random::<f32>() * height,
                    speed: 0.5 + rng.random::<f32>() * 2.0,
                })
                .collect();
        }

        let mut rng = rand::rng();
        for (i, column) in self.columns.iter_mut().enumerate() {
            let v = normalize(data[i * data.len() / count]);
            column.y += column.speed * (1.0 + v);
            if column.y > height {
                column.y = -20.0;
                column.speed = 0.5 + rng.random::<f32>() * 2.0;
            }

            let x = i as f32 * column_width;
            let bar_height = v * height * 0.3 + 10.0;
            let color = style.bar_color.resolve(v);

            for j in 0..5 {
                let alpha = 1.0 - j as f32 * 0.2;
                surface.fill_rect(
                    x,
                    column.y - bar_height * j as f32,
                    column_width - 1.0,
                    bar_height,
                    color.with_alpha(alpha),
                );
            }
        }
    }

    fn reset(&mut self) {
        self.columns.clear();
    }
}

struct Trail {
    x: f32,
    y: f32,
    vy: f32,
    history: Vec<(f32, f32)>,
}

/// Trail length cap; older points fall off the tail.
const TRAIL_CAP: usize = 20;

/// Dots chasing the spectrum with springy motion and fading trails.
pub struct ParticleTrails {
    particles: Vec<Trail>,
}

impl ParticleTrails {
    pub fn new() -> Self {
        Self { particles: Vec::new() }
    }
}

impl Render for ParticleTrails {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let data = frame.freq;
        if data.is_empty() {
            return;
        }
        let height = surface.height();
        let center_y = height / 2.0;
        let count = data.len().min(50);
        let step = (data.len() / count).max(1);
        let x_step = surface.width() / count as f32;

        if self.particles.len() != count {
            self.particles = (0..count)
                .map(|i| Trail {
                    x: i as f32 * x_step,
                    y: center_y,
                    vy: 0.0,
                    history: Vec::new(),
                })
                .collect();
        }

        for (i, particle) in self.particles.iter_mut().enumerate() {
            let v = normalize(data[(i * step).min(data.len() - 1)]);
            let target_y = center_y - (v - 0.5) * height * 0.8;

            particle.vy += (target_y - particle.y) * 0.1;
            particle.vy *= 0.9;
            particle.y += particle.vy;

            particle.history.push((particle.x, particle.y));
            if particle.history.len() > TRAIL_CAP {
                particle.history.remove(0);
            }

            let color = style.bar_color.resolve(v);
            let n = particle.history.len();
            for window in particle.history.windows(2).enumerate() {
                let (j, pair) = window;
                let alpha = (j + 1) as f32 / n as f32;
                surface.stroke_polyline(&[pair[0], pair[1]], color.with_alpha(alpha), 2.0, false);
            }
            surface.fill_circle(particle.x, particle.y, 4.0, color.opaque());
        }
    }

    fn reset(&mut self) {
        self.particles.clear();
    }
}

struct NebulaParticle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    life: f32,
    max_life: f32,
    size: f32,
}

/// Flowing particle cloud with radial bands and motion trails.
pub struct Nebula {
    smoothed: Vec<f32>,
    particles: Vec<NebulaParticle>,
}

impl Nebula {
    pub fn new() -> Self {
        Self {
            smoothed: Vec::new(),
            particles: Vec::new(),
        }
    }
}

impl Render for Nebula {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        let data = frame.freq;
        // Fade instead of clearing, leaving motion trails behind.
        let fade = match style.background.solid() {
            Some(c) => c.with_alpha(0.15),
            None => crate::color::Rgb::new(0, 0, 0).with_alpha(0.1),
        };
        surface.fill_rect(0.0, 0.0, surface.width(), surface.height(), fade);
        if data.is_empty() {
            return;
        }
        let width = surface.width();
        let height = surface.height();
        let cx = width / 2.0;
        let cy = height / 2.0;
        let max_radius = width.min(height) / 2.0;

        // Frame-to-frame smoothing of the spectrum.
        if self.smoothed.len() != data.len() {
            self.smoothed = data.iter().map(|&d| normalize(d)).collect();
        } else {
            for (s, &d) in self.smoothed.iter_mut().zip(data) {
                *s = *s * 0.3 + normalize(d) * 0.7;
            }
        }
        let avg_energy = self.smoothed.iter().sum::<f32>() / self.smoothed.len() as f32;

        let wanted = ((avg_energy * 200.0 + 50.0) as usize).min(150);
        self.particles.retain(|p| p.life > 0.0);
        let mut rng = rand::rng();
        while self.particles.len() < wanted {
            let angle = rng.random::<f32>() * TAU;
            let distance = rng.random::<f32>() * max_radius * 0.3;
            self.particles.push(NebulaParticle {
                x: cx + angle.cos() * distance,
                y: cy + angle.sin() * distance,
                vx: (rng.random::<f32>() - 0.5) * 2.0,
                vy: (rng.random::<f32>() - 0.5) * 2.0,
                life: 1.0,
                max_life: 0.5 + rng.random::<f32>() * 0.5,
                size: 2.0 + rng.random::<f32>() * 4.0,
            });
        }

        let bins = self.smoothed.len();
        for particle in &mut self.particles {
            let angle = (particle.y - cy).atan2(particle.x - cx);
            let normalized_angle = (angle + PI) / TAU;
            let idx = ((normalized_angle * bins as f32) as usize) % bins;
            let f = self.smoothed[idx];

            let force_angle = angle + (f - 0.5) * PI * 0.5;
            let force = f * 0.5;
            particle.vx += force_angle.cos() * force * 0.1;
            particle.vy += force_angle.sin() * force * 0.1;
            particle.vx *= 0.95;
            particle.vy *= 0.95;
            particle.x += particle.vx;
            particle.y += particle.vy;

            if particle.x < 0.0 {
                particle.x = width;
            } else if particle.x > width {
                particle.x = 0.0;
            }
            if particle.y < 0.0 {
                particle.y = height;
            } else if particle.y > height {
                particle.y = 0.0;
            }
            particle.life -= 0.01;

            let alpha = (particle.life / particle.max_life) * f * 0.8;
            let color = style.bar_color.resolve(f);
            let glow = particle.size * (1.0 + f * 2.0);
            surface.fill_circle_radial(
                particle.x,
                particle.y,
                glow,
                &[
                    (0.0, color.with_alpha(alpha)),
                    (0.5, color.with_alpha(alpha * 0.5)),
                    (1.0, color.with_alpha(0.0)),
                ],
            );
            surface.fill_circle(
                particle.x,
                particle.y,
                particle.size * 0.3,
                color.with_alpha((alpha * 1.5).min(1.0)),
            );

            if style.mirror {
                surface.fill_circle_radial(
                    particle.x,
                    height - particle.y,
                    glow,
                    &[
                        (0.0, color.with_alpha(alpha * 0.5)),
                        (1.0, color.with_alpha(0.0)),
                    ],
                );
            }
        }

        // Flowing radial bands.
        let band_count = 5;
        for band in 0..band_count {
            let start = band * bins / band_count;
            let end = ((band + 1) * bins / band_count).max(start + 1);
            let band_energy =
                self.smoothed[start..end].iter().sum::<f32>() / (end - start) as f32;
            let radius = max_radius * (0.3 + band_energy * 0.7);
            let segments = 64;

            let outline: Vec<(f32, f32)> = (0..=segments)
                .map(|i| {
                    let angle = i as f32 / segments as f32 * TAU;
                    let value = self.smoothed[i * (bins - 1) / segments];
                    let r = radius * (0.8 + value * 0.4);
                    (cx + angle.cos() * r, cy + angle.sin() * r)
                })
                .collect();

            let color = style.bar_color.resolve(band_energy);
            if let Some(path) = crate::surface::build_polyline(&outline, true) {
                surface.fill_path_radial(
                    &path,
                    cx,
                    cy,
                    radius,
                    &[
                        (0.0, color.with_alpha(band_energy * 0.3)),
                        (1.0, color.with_alpha(0.0)),
                    ],
                );
            }
            surface.stroke_polyline(&outline, color.with_alpha(band_energy * 0.6), 1.0, true);
        }
    }

    fn reset(&mut self) {
        self.smoothed.clear();
        self.particles.clear();
    }
}
