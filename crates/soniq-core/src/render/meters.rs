//! Level meter renderers.

use super::{Frame, Render};
use crate::color::{Rgb, Style};
use crate::sample::rms;
use crate::surface::Surface;

/// Amplification applied to raw RMS; normal program material rarely exceeds
/// 0.3 so the meters would otherwise sit near the floor.
const RMS_GAIN: f32 = 3.0;

/// Full-width loudness bar rising from the bottom.
pub struct Loudness;

impl Render for Loudness {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let level = (rms(frame.time) * RMS_GAIN).clamp(0.0, 1.0);
        let width = surface.width();
        let height = surface.height();

        let bar_height = (level * height).max(2.0);
        let color = style.bar_color.resolve(level);

        surface.fill_rect(0.0, height - bar_height, width, bar_height, color.opaque());
        surface.stroke_rect(0.0, height - bar_height, width, bar_height, color.opaque(), 2.0);
    }
}

/// Classic segmented VU meter with green, yellow and red zones.
pub struct VuMeter;

impl Render for VuMeter {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        surface.fill_background(&style.background);
        let level = (rms(frame.time) * RMS_GAIN).clamp(0.0, 1.0);
        let width = surface.width();
        let height = surface.height();

        let meter_w = width * 0.8;
        let meter_h = height * 0.6;
        let meter_x = (width - meter_w) / 2.0;
        let meter_y = (height - meter_h) / 2.0;

        surface.fill_rect(meter_x, meter_y, meter_w, meter_h, Rgb::new(0, 0, 0).with_alpha(0.3));

        let segment = meter_h / 3.0;
        surface.fill_rect(
            meter_x,
            meter_y + segment * 2.0,
            meter_w,
            segment,
            Rgb::new(0, 255, 0).with_alpha(0.2),
        );
        surface.fill_rect(
            meter_x,
            meter_y + segment,
            meter_w,
            segment,
            Rgb::new(255, 255, 0).with_alpha(0.2),
        );
        surface.fill_rect(meter_x, meter_y, meter_w, segment, Rgb::new(255, 0, 0).with_alpha(0.2));

        let level_height = level * meter_h;
        let color = style.bar_color.resolve(level).opaque();
        surface.fill_rect(
            meter_x,
            meter_y + meter_h - level_height,
            meter_w,
            level_height,
            color,
        );

        surface.stroke_rect(
            meter_x,
            meter_y,
            meter_w,
            meter_h,
            Rgb::new(255, 255, 255).with_alpha(0.5),
            2.0,
        );
    }
}
