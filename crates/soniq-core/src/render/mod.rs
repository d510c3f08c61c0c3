//! Renderer catalogue
//!
//! One renderer per visualization mode. Renderers draw a single frame from
//! the current analysis snapshots; the handful of animated ones carry their
//! own particle or history state between frames and re-seed themselves when
//! the surface size changes.

mod combined;
mod geometry;
mod history;
mod meters;
mod motion;
mod radial;
mod registry;
mod spectrum;
mod waveform;

pub use registry::Registry;

use crate::color::Style;
use crate::surface::Surface;

/// One frame's worth of analysis data.
///
/// Only the slices a mode consumes are guaranteed to be populated; the
/// other may be empty.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Frequency snapshot, one byte per bin
    pub freq: &'a [u8],
    /// Time-domain snapshot, one byte per sample, 128 = silence
    pub time: &'a [u8],
}

/// A drawable visualization.
pub trait Render {
    /// Draws one frame onto the surface.
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style);

    /// Clears any state carried between frames. Called when the
    /// visualization is (re)started.
    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Background, Rgb};
    use crate::mode::Mode;

    /// Every mode's renderer must survive a frame of silence, a loud frame
    /// and an empty-buffer frame without panicking.
    #[test]
    fn test_all_renderers_draw_without_panic() {
        let mut registry = Registry::new();
        let mut surface = Surface::new(200.0, 100.0, 1.0);
        let style = Style::default();

        let silence_freq = vec![0u8; 512];
        let silence_time = vec![128u8; 1024];
        let loud_freq = vec![255u8; 512];
        let loud_time: Vec<u8> = (0..1024).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect();

        for &mode in Mode::ALL {
            let renderer = registry.resolve(mode).unwrap();
            renderer.draw(
                &mut surface,
                &Frame {
                    freq: &silence_freq,
                    time: &silence_time,
                },
                &style,
            );
            renderer.draw(
                &mut surface,
                &Frame {
                    freq: &loud_freq,
                    time: &loud_time,
                },
                &style,
            );
            renderer.draw(&mut surface, &Frame { freq: &[], time: &[] }, &style);
            renderer.reset();
        }
    }

    #[test]
    fn test_mirror_and_transparent_background() {
        let mut registry = Registry::new();
        let mut surface = Surface::new(120.0, 80.0, 2.0);
        let style = Style {
            background: Background::Transparent,
            mirror: true,
            ..Style::default()
        };
        let freq = vec![180u8; 256];
        let time = vec![200u8; 512];

        for &mode in Mode::ALL {
            let renderer = registry.resolve(mode).unwrap();
            renderer.draw(&mut surface, &Frame { freq: &freq, time: &time }, &style);
        }
    }

    #[test]
    fn test_spectrum_mirror_paints_both_halves() {
        let mut registry = Registry::new();
        let mut surface = Surface::new(100.0, 100.0, 1.0);
        let style = Style {
            bar_color: crate::color::BarColor::Solid(Rgb::new(255, 0, 0)),
            background: Background::Solid(Rgb::new(0, 0, 0)),
            mirror: true,
            ..Style::default()
        };
        let freq = vec![200u8; 20];
        let bar_width = 100.0 / freq.len() as f32;

        let renderer = registry.resolve(Mode::Spectrum).unwrap();
        renderer.draw(&mut surface, &Frame { freq: &freq, time: &[] }, &style);

        for i in 0..freq.len() {
            let x = i as f32 * bar_width + bar_width / 2.0;
            let top = surface.pixel(x, 5.0).unwrap();
            let bottom = surface.pixel(x, 95.0).unwrap();
            assert!(top.red() > 200, "bar {i} missing from the top half");
            assert!(bottom.red() > 200, "bar {i} missing from the bottom half");
        }

        // Without mirroring the top half stays background.
        let style = Style { mirror: false, ..style };
        let renderer = registry.resolve(Mode::Spectrum).unwrap();
        renderer.draw(&mut surface, &Frame { freq: &freq, time: &[] }, &style);
        let top = surface.pixel(bar_width / 2.0, 5.0).unwrap();
        assert_eq!(top.red(), 0);
    }

    #[test]
    fn test_light_rays_mirror_adds_opposite_ray() {
        let mut registry = Registry::new();
        let style = Style {
            bar_color: crate::color::BarColor::Solid(Rgb::new(255, 0, 0)),
            background: Background::Transparent,
            mirror: false,
            ..Style::default()
        };
        // One loud bin pointing straight up; the other rays stay at the
        // minimum length.
        let freq = [255u8, 0, 0, 0];
        let frame = Frame { freq: &freq, time: &[] };
        let below_center = (50.0, 70.0);

        let mut surface = Surface::new(100.0, 100.0, 1.0);
        let renderer = registry.resolve(Mode::LightRays).unwrap();
        renderer.draw(&mut surface, &frame, &style);
        let px = surface.pixel(below_center.0, below_center.1).unwrap();
        assert_eq!(px.alpha(), 0, "no ray should reach below the center");

        let style = Style { mirror: true, ..style };
        let renderer = registry.resolve(Mode::LightRays).unwrap();
        renderer.draw(&mut surface, &frame, &style);
        let px = surface.pixel(below_center.0, below_center.1).unwrap();
        assert!(px.alpha() > 0, "mirroring should reflect the loud ray downward");
    }

    #[test]
    fn test_spectrum_draws_bars_over_background() {
        let mut registry = Registry::new();
        let mut surface = Surface::new(100.0, 100.0, 1.0);
        let style = Style {
            bar_color: crate::color::BarColor::Solid(Rgb::new(255, 0, 0)),
            background: Background::Solid(Rgb::new(0, 0, 0)),
            ..Style::default()
        };
        let freq = vec![255u8; 64];

        let renderer = registry.resolve(Mode::Spectrum).unwrap();
        renderer.draw(&mut surface, &Frame { freq: &freq, time: &[] }, &style);

        // Full-scale input fills columns from the bottom edge upward.
        let px = surface.pixel(50.0, 95.0).unwrap();
        assert!(px.red() > 200, "expected a red bar near the bottom");
    }
}
