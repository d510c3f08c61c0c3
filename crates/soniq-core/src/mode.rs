//! Visualization mode catalogue

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Which analysis snapshot(s) a mode consumes each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// Frequency-domain byte snapshot (fftSize/2 bins)
    Frequency,
    /// Time-domain byte snapshot (fftSize samples, 128 = silence)
    Time,
    /// Both snapshots
    Both,
}

macro_rules! modes {
    ($( $variant:ident => $tag:literal ),+ $(,)?) => {
        /// A visualization mode tag selecting one renderer.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Mode {
            $(
                #[doc = $tag]
                $variant,
            )+
        }

        impl Mode {
            /// Every known mode, in catalogue order.
            pub const ALL: &'static [Mode] = &[$(Mode::$variant),+];

            /// The mode's string tag.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Mode::$variant => $tag,)+
                }
            }
        }

        impl FromStr for Mode {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok(Mode::$variant),)+
                    _ => Err(Error::UnknownMode(s.to_string())),
                }
            }
        }
    };
}

modes! {
    Waveform => "waveform",
    Spectrum => "spectrum",
    Loudness => "loudness",
    Circular => "circular",
    FrequencyBands => "frequency-bands",
    RoundedBars => "rounded-bars",
    Particles => "particles",
    DualWaveform => "dual-waveform",
    LineSpectrum => "line-spectrum",
    RadialSpectrum => "radial-spectrum",
    Oscilloscope => "oscilloscope",
    VuMeter => "vu-meter",
    FrequencyDots => "frequency-dots",
    SoundWaves => "sound-waves",
    Spiral => "spiral",
    Matrix => "matrix",
    Equalizer => "equalizer",
    Spectrogram => "spectrogram",
    Star => "star",
    Bubbles => "bubbles",
    Lissajous => "lissajous",
    WaveformBars => "waveform-bars",
    FrequencyRings => "frequency-rings",
    Pulse => "pulse",
    WaveformFill => "waveform-fill",
    RadialWaveform => "radial-waveform",
    FrequencyLines => "frequency-lines",
    FrequencyArcs => "frequency-arcs",
    Kaleidoscope => "kaleidoscope",
    Mandala => "mandala",
    Flower => "flower",
    Glow => "glow",
    ParticleTrails => "particle-trails",
    LightRays => "light-rays",
    EnergyWaves => "energy-waves",
    WaveformHistory => "waveform-history",
    Nebula => "nebula",
    Combined => "combined",
}

impl Mode {
    /// Which snapshot(s) this mode's renderer consumes.
    pub fn data_kind(&self) -> DataKind {
        match self {
            Mode::Combined => DataKind::Both,
            Mode::Waveform
            | Mode::DualWaveform
            | Mode::Oscilloscope
            | Mode::Loudness
            | Mode::VuMeter
            | Mode::Lissajous
            | Mode::WaveformBars
            | Mode::WaveformFill
            | Mode::RadialWaveform
            | Mode::WaveformHistory
            | Mode::EnergyWaves => DataKind::Time,
            _ => DataKind::Frequency,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_tag_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), *mode);
        }
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = "not-a-real-mode".parse::<Mode>().unwrap_err();
        assert!(err.is_unknown_mode());
    }

    #[test]
    fn test_catalogue_size() {
        assert_eq!(Mode::ALL.len(), 38);
    }

    #[test]
    fn test_data_kinds() {
        assert_eq!(Mode::Spectrum.data_kind(), DataKind::Frequency);
        assert_eq!(Mode::Waveform.data_kind(), DataKind::Time);
        assert_eq!(Mode::EnergyWaves.data_kind(), DataKind::Time);
        assert_eq!(Mode::Combined.data_kind(), DataKind::Both);
    }
}
