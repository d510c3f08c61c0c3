//! FFT analysis stage
//!
//! Maintains a ring buffer of the most recent input samples and exposes
//! byte-quantized frequency and time-domain snapshots. Frequency output is
//! the Hann-windowed magnitude spectrum, exponentially smoothed across
//! frames, converted to decibels and mapped onto `[0, 255]` between the
//! configured decibel bounds. Time-domain output is the raw window centered
//! at 128.

use std::str::FromStr;
use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use tracing::debug;

use crate::error::{Error, Result};

/// Supported transform sizes (powers of two).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftSize {
    /// 256-point transform, 128 frequency bins
    Small,
    /// 512-point transform, 256 frequency bins
    Medium,
    /// 1024-point transform, 512 frequency bins (default)
    Large,
    /// 2048-point transform, 1024 frequency bins
    Huge,
}

impl FftSize {
    /// Window length in samples.
    pub fn size(self) -> usize {
        match self {
            Self::Small => 256,
            Self::Medium => 512,
            Self::Large => 1024,
            Self::Huge => 2048,
        }
    }

    /// Number of frequency bins (half the window length).
    pub fn bins(self) -> usize {
        self.size() / 2
    }
}

impl Default for FftSize {
    fn default() -> Self {
        Self::Large
    }
}

impl TryFrom<usize> for FftSize {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        match value {
            256 => Ok(Self::Small),
            512 => Ok(Self::Medium),
            1024 => Ok(Self::Large),
            2048 => Ok(Self::Huge),
            other => Err(Error::InvalidConfig(format!(
                "fft size must be 256, 512, 1024 or 2048, got {other}"
            ))),
        }
    }
}

impl FromStr for FftSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let n: usize = s
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("invalid fft size {s:?}")))?;
        Self::try_from(n)
    }
}

/// Analyser configuration.
#[derive(Debug, Clone)]
pub struct AnalyserConfig {
    /// Transform size
    pub fft_size: FftSize,
    /// Exponential smoothing constant in `[0, 1]`; higher holds the past longer
    pub smoothing: f32,
    /// Decibel value mapped to byte 0
    pub min_decibels: f32,
    /// Decibel value mapped to byte 255
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: FftSize::default(),
            smoothing: 0.85,
            min_decibels: -90.0,
            max_decibels: -10.0,
        }
    }
}

impl AnalyserConfig {
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(Error::InvalidConfig(format!(
                "smoothing must be in [0, 1], got {}",
                self.smoothing
            )));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(Error::InvalidConfig(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        Ok(())
    }
}

/// Streaming FFT analyser over mono samples.
pub struct Analyser {
    fft: Arc<dyn Fft<f32>>,
    config: AnalyserConfig,
    /// Ring buffer of the most recent `fft_size` samples
    input: Vec<f32>,
    write_pos: usize,
    fft_buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    window: Vec<f32>,
    /// Exponentially smoothed magnitudes, one per bin
    smoothed: Vec<f32>,
}

impl Analyser {
    /// Creates an analyser, validating the configuration.
    pub fn new(config: AnalyserConfig) -> Result<Self> {
        config.validate()?;
        let size = config.fft_size.size();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);

        debug!(
            "analyser: fft_size={}, smoothing={}, range=[{}, {}] dB",
            size, config.smoothing, config.min_decibels, config.max_decibels
        );

        Ok(Self {
            fft,
            input: vec![0.0; size],
            write_pos: 0,
            fft_buffer: vec![Complex::new(0.0, 0.0); size],
            scratch: vec![Complex::new(0.0, 0.0); size],
            window: hann_window(size),
            smoothed: vec![0.0; size / 2],
            config,
        })
    }

    /// Transform size in samples; also the time-domain snapshot length.
    pub fn fft_size(&self) -> usize {
        self.config.fft_size.size()
    }

    /// Number of frequency bins; also the frequency snapshot length.
    pub fn frequency_bin_count(&self) -> usize {
        self.config.fft_size.bins()
    }

    /// Feeds mono samples into the ring buffer. Non-finite samples are
    /// treated as silence so a single bad chunk cannot poison the smoothed
    /// spectrum.
    pub fn push_samples(&mut self, samples: &[f32]) {
        for &s in samples {
            self.input[self.write_pos] = if s.is_finite() { s } else { 0.0 };
            self.write_pos = (self.write_pos + 1) % self.input.len();
        }
    }

    /// Writes the byte-quantized frequency snapshot into `out`.
    ///
    /// `out` must hold exactly [`Analyser::frequency_bin_count`] bytes. Each
    /// call runs the transform over the current window and advances the
    /// exponential smoothing state.
    pub fn byte_frequency_data(&mut self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.frequency_bin_count());
        self.transform();

        let tau = self.config.smoothing;
        let norm = 1.0 / self.fft_size() as f32;
        let min_db = self.config.min_decibels;
        let max_db = self.config.max_decibels;
        let range = max_db - min_db;

        for (i, byte) in out.iter_mut().enumerate() {
            let magnitude = self.fft_buffer[i].norm() * norm;
            self.smoothed[i] = tau * self.smoothed[i] + (1.0 - tau) * magnitude;

            let db = 20.0 * self.smoothed[i].max(f32::MIN_POSITIVE).log10();
            let scaled = (db - min_db) / range * 255.0;
            *byte = scaled.clamp(0.0, 255.0) as u8;
        }
    }

    /// Writes the byte-quantized time-domain snapshot into `out`.
    ///
    /// `out` must hold exactly [`Analyser::fft_size`] bytes. Samples map
    /// linearly with silence at 128.
    pub fn byte_time_domain_data(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.fft_size());
        let len = self.input.len();
        for (i, byte) in out.iter_mut().enumerate() {
            let sample = self.input[(self.write_pos + i) % len];
            *byte = (128.0 * (1.0 + sample)).clamp(0.0, 255.0) as u8;
        }
    }

    /// Clears the ring buffer and smoothing state.
    pub fn reset(&mut self) {
        self.input.fill(0.0);
        self.write_pos = 0;
        self.smoothed.fill(0.0);
    }

    fn transform(&mut self) {
        // Unwrap the ring buffer in order, oldest sample first.
        let len = self.input.len();
        for i in 0..len {
            let sample = self.input[(self.write_pos + i) % len];
            self.fft_buffer[i] = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch);
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / (size - 1) as f32;
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * t).cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, count: usize) -> Vec<f32> {
        (0..count)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_buffer_lengths() {
        let analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        assert_eq!(analyser.fft_size(), 1024);
        assert_eq!(analyser.frequency_bin_count(), 512);
    }

    #[test]
    fn test_rejects_bad_config() {
        let config = AnalyserConfig {
            smoothing: 1.5,
            ..Default::default()
        };
        assert!(Analyser::new(config).is_err());

        let config = AnalyserConfig {
            min_decibels: -10.0,
            max_decibels: -90.0,
            ..Default::default()
        };
        assert!(Analyser::new(config).is_err());
    }

    #[test]
    fn test_silence_maps_to_floor() {
        let mut analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        analyser.push_samples(&vec![0.0; 2048]);
        let mut freq = vec![0u8; analyser.frequency_bin_count()];
        analyser.byte_frequency_data(&mut freq);
        assert!(freq.iter().all(|&b| b == 0));

        let mut time = vec![0u8; analyser.fft_size()];
        analyser.byte_time_domain_data(&mut time);
        assert!(time.iter().all(|&b| b == 128));
    }

    #[test]
    fn test_tone_peaks_near_expected_bin() {
        let config = AnalyserConfig {
            fft_size: FftSize::Huge,
            smoothing: 0.0,
            ..Default::default()
        };
        let mut analyser = Analyser::new(config).unwrap();
        analyser.push_samples(&sine(440.0, 44_100.0, 4096));

        let mut freq = vec![0u8; analyser.frequency_bin_count()];
        analyser.byte_frequency_data(&mut freq);

        let peak_bin = freq
            .iter()
            .enumerate()
            .max_by_key(|&(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        // 440 Hz at 44.1 kHz with a 2048-point window lands near bin 20.
        let expected = (440.0 * 2048.0 / 44_100.0) as usize;
        assert!(
            peak_bin.abs_diff(expected) <= 2,
            "peak at bin {peak_bin}, expected near {expected}"
        );
    }

    #[test]
    fn test_smoothing_decays_gradually() {
        let config = AnalyserConfig {
            smoothing: 0.9,
            ..Default::default()
        };
        let mut analyser = Analyser::new(config).unwrap();
        analyser.push_samples(&sine(440.0, 44_100.0, 2048));

        let mut first = vec![0u8; analyser.frequency_bin_count()];
        analyser.byte_frequency_data(&mut first);

        // Replace the window with silence; smoothed spectrum should linger.
        analyser.push_samples(&vec![0.0; 2048]);
        let mut second = vec![0u8; analyser.frequency_bin_count()];
        analyser.byte_frequency_data(&mut second);

        let first_sum: u32 = first.iter().map(|&b| b as u32).sum();
        let second_sum: u32 = second.iter().map(|&b| b as u32).sum();
        assert!(first_sum > 0);
        assert!(second_sum > 0, "smoothed spectrum dropped to zero instantly");
        assert!(second_sum < first_sum);
    }

    #[test]
    fn test_time_domain_follows_latest_samples() {
        let mut analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        analyser.push_samples(&vec![1.0; 1024]);
        let mut time = vec![0u8; analyser.fft_size()];
        analyser.byte_time_domain_data(&mut time);
        assert!(time.iter().all(|&b| b == 255));

        analyser.push_samples(&vec![-1.0; 1024]);
        analyser.byte_time_domain_data(&mut time);
        assert!(time.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_non_finite_samples_sanitized() {
        let mut analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        analyser.push_samples(&[f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 0.5]);
        let mut freq = vec![0u8; analyser.frequency_bin_count()];
        analyser.byte_frequency_data(&mut freq);
        // No poisoned output, only valid bytes.
        let mut time = vec![0u8; analyser.fft_size()];
        analyser.byte_time_domain_data(&mut time);
        assert!(time.iter().all(|&b| b == 128 || b == 192));
    }

    #[test]
    fn test_reset_clears_state() {
        let mut analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        analyser.push_samples(&sine(440.0, 44_100.0, 2048));
        let mut freq = vec![0u8; analyser.frequency_bin_count()];
        analyser.byte_frequency_data(&mut freq);
        assert!(freq.iter().any(|&b| b > 0));

        analyser.reset();
        analyser.byte_frequency_data(&mut freq);
        assert!(freq.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_fft_size_parsing() {
        assert_eq!(FftSize::try_from(512).unwrap(), FftSize::Medium);
        assert!(FftSize::try_from(300).is_err());
        assert_eq!("2048".parse::<FftSize>().unwrap(), FftSize::Huge);
        assert!("big".parse::<FftSize>().is_err());
    }
}
