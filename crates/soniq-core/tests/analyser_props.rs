use proptest::prelude::*;
use soniq_core::audio::{Analyser, AnalyserConfig, FftSize};

proptest! {
    /// The time-domain snapshot is exactly the latest window, quantized
    /// around 128, with the unfilled head of the ring reading as silence.
    #[test]
    fn test_time_bytes_quantize_latest_window(
        samples in prop::collection::vec(-1.0f32..=1.0, 1..1500),
    ) {
        let mut analyser = Analyser::new(AnalyserConfig::default()).unwrap();
        analyser.push_samples(&samples);

        let mut out = vec![0u8; analyser.fft_size()];
        analyser.byte_time_domain_data(&mut out);

        let n = out.len();
        let tail_len = samples.len().min(n);
        let pad = n - tail_len;
        let tail = &samples[samples.len() - tail_len..];
        for (i, &byte) in out.iter().enumerate() {
            let expected = if i < pad {
                128
            } else {
                (128.0 * (1.0 + tail[i - pad])).clamp(0.0, 255.0) as u8
            };
            prop_assert_eq!(byte, expected);
        }
    }

    /// Arbitrary input, including out-of-range amplitudes, never panics the
    /// frequency path and always fills the full bin count.
    #[test]
    fn test_frequency_bytes_defined_for_any_input(
        samples in prop::collection::vec(-2.0f32..=2.0, 0..4096),
    ) {
        let config = AnalyserConfig {
            fft_size: FftSize::Medium,
            ..Default::default()
        };
        let mut analyser = Analyser::new(config).unwrap();
        analyser.push_samples(&samples);

        let mut out = vec![0u8; analyser.frequency_bin_count()];
        analyser.byte_frequency_data(&mut out);
        analyser.byte_frequency_data(&mut out);
        prop_assert_eq!(out.len(), 256);
    }
}

#[test]
fn test_buffer_lengths_for_every_fft_size() {
    for (size, bins) in [(256, 128), (512, 256), (1024, 512), (2048, 1024)] {
        let config = AnalyserConfig {
            fft_size: FftSize::try_from(size).unwrap(),
            ..Default::default()
        };
        let analyser = Analyser::new(config).unwrap();
        assert_eq!(analyser.fft_size(), size);
        assert_eq!(analyser.frequency_bin_count(), bins);
    }
}
