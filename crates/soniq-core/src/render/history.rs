//! Renderers that accumulate past frames.

use std::collections::VecDeque;

use super::{Frame, Render};
use crate::color::Style;
use crate::sample::{normalize, time_value};
use crate::surface::Surface;

/// Rows of spectrogram history kept before the oldest falls off.
const SPECTROGRAM_CAP: usize = 200;

/// Scrolling time-frequency heat map, oldest row at the top.
pub struct Spectrogram {
    history: VecDeque<Vec<u8>>,
}

impl Spectrogram {
    pub fn new() -> Self {
        Self {
            history: VecDeque::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Render for Spectrogram {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        let data = frame.freq;
        if !data.is_empty() {
            self.history.push_back(data.to_vec());
            if self.history.len() > SPECTROGRAM_CAP {
                self.history.pop_front();
            }
        }

        surface.fill_background(&style.background);
        if self.history.is_empty() {
            return;
        }
        let width = surface.width();
        let row_height = surface.height() / self.history.len() as f32;

        for (row, frame_data) in self.history.iter().enumerate() {
            let y = row as f32 * row_height;
            let bar_width = width / frame_data.len() as f32;
            let draw_width = (bar_width - 0.5).max(0.5);

            for (i, &d) in frame_data.iter().enumerate() {
                let v = normalize(d);
                let color = style.bar_color.resolve(v).with_alpha(v.max(0.1));
                surface.fill_rect(i as f32 * bar_width, y, draw_width, row_height, color);
            }
        }
    }

    fn reset(&mut self) {
        self.history.clear();
    }
}

/// Waveform frames kept for the ghosting effect.
const WAVEFORM_HISTORY_CAP: usize = 50;

/// Waveform with ghosts of recent frames fading out behind it.
pub struct WaveformHistory {
    history: VecDeque<Vec<u8>>,
}

impl WaveformHistory {
    pub fn new() -> Self {
        Self {
            history: VecDeque::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Render for WaveformHistory {
    fn draw(&mut self, surface: &mut Surface, frame: &Frame<'_>, style: &Style) {
        let data = frame.time;
        if !data.is_empty() {
            self.history.push_back(data.to_vec());
            if self.history.len() > WAVEFORM_HISTORY_CAP {
                self.history.pop_front();
            }
        }

        surface.fill_background(&style.background);
        if self.history.is_empty() {
            return;
        }
        let width = surface.width();
        let center_y = surface.height() / 2.0;
        let color = style.line_color();
        let alpha_step = 1.0 / self.history.len() as f32;

        for (h, frame_data) in self.history.iter().enumerate() {
            let alpha = h as f32 * alpha_step;
            let slice = width / frame_data.len() as f32;
            let faded = color.with_alpha(alpha);

            let trace = |sign: f32| -> Vec<(f32, f32)> {
                frame_data
                    .iter()
                    .enumerate()
                    .map(|(i, &d)| {
                        (
                            i as f32 * slice,
                            center_y + sign * time_value(d) * center_y * 0.8,
                        )
                    })
                    .collect()
            };
            surface.stroke_polyline(&trace(1.0), faded, style.line_width, false);
            if style.mirror {
                surface.stroke_polyline(&trace(-1.0), faded, style.line_width, false);
            }
        }
    }

    fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Style;

    #[test]
    fn test_spectrogram_history_capped() {
        let mut renderer = Spectrogram::new();
        let mut surface = Surface::new(64.0, 64.0, 1.0);
        let style = Style::default();
        let freq = vec![100u8; 32];

        for _ in 0..(SPECTROGRAM_CAP + 40) {
            renderer.draw(&mut surface, &Frame { freq: &freq, time: &[] }, &style);
        }
        assert_eq!(renderer.history_len(), SPECTROGRAM_CAP);

        renderer.reset();
        assert_eq!(renderer.history_len(), 0);
    }

    #[test]
    fn test_waveform_history_capped() {
        let mut renderer = WaveformHistory::new();
        let mut surface = Surface::new(64.0, 64.0, 1.0);
        let style = Style::default();
        let time = vec![150u8; 64];

        for _ in 0..(WAVEFORM_HISTORY_CAP * 2) {
            renderer.draw(&mut surface, &Frame { freq: &[], time: &time }, &style);
        }
        assert_eq!(renderer.history_len(), WAVEFORM_HISTORY_CAP);
    }

    #[test]
    fn test_empty_frame_not_recorded() {
        let mut renderer = Spectrogram::new();
        let mut surface = Surface::new(64.0, 64.0, 1.0);
        renderer.draw(&mut surface, &Frame { freq: &[], time: &[] }, &Style::default());
        assert_eq!(renderer.history_len(), 0);
    }
}
