//! Per-instance renderer cache.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use super::{combined, geometry, history, meters, motion, radial, spectrum, waveform, Render};
use crate::error::Result;
use crate::mode::Mode;

/// Lazily instantiates renderers and memoizes them per mode.
///
/// Each registry owns its renderer instances, so two visualizers never
/// share animation state.
#[derive(Default)]
pub struct Registry {
    slots: HashMap<Mode, Box<dyn Render>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the renderer for a mode, instantiating it on first use.
    pub fn resolve(&mut self, mode: Mode) -> Result<&mut dyn Render> {
        match self.slots.entry(mode) {
            Entry::Occupied(slot) => Ok(slot.into_mut().as_mut()),
            Entry::Vacant(slot) => {
                debug!("instantiating renderer for {mode}");
                Ok(slot.insert(instantiate(mode)?).as_mut())
            }
        }
    }

    /// Instantiates a mode's renderer ahead of time so the first frame does
    /// not pay the setup cost.
    pub fn preload(&mut self, mode: Mode) -> Result<()> {
        self.resolve(mode).map(|_| ())
    }

    /// Whether a mode's renderer is already cached.
    pub fn is_cached(&self, mode: Mode) -> bool {
        self.slots.contains_key(&mode)
    }

    /// Resets the carried state of every cached renderer.
    pub fn reset_all(&mut self) {
        for renderer in self.slots.values_mut() {
            renderer.reset();
        }
    }
}

fn instantiate(mode: Mode) -> Result<Box<dyn Render>> {
    Ok(match mode {
        Mode::Waveform => Box::new(waveform::Waveform),
        Mode::Spectrum => Box::new(spectrum::Spectrum),
        Mode::Loudness => Box::new(meters::Loudness),
        Mode::Circular => Box::new(radial::Circular),
        Mode::FrequencyBands => Box::new(spectrum::FrequencyBands),
        Mode::RoundedBars => Box::new(spectrum::RoundedBars),
        Mode::Particles => Box::new(motion::Particles),
        Mode::DualWaveform => Box::new(waveform::DualWaveform),
        Mode::LineSpectrum => Box::new(spectrum::LineSpectrum),
        Mode::RadialSpectrum => Box::new(radial::RadialSpectrum),
        Mode::Oscilloscope => Box::new(waveform::Oscilloscope),
        Mode::VuMeter => Box::new(meters::VuMeter),
        Mode::FrequencyDots => Box::new(spectrum::FrequencyDots),
        Mode::SoundWaves => Box::new(motion::SoundWaves::new()),
        Mode::Spiral => Box::new(radial::Spiral),
        Mode::Matrix => Box::new(motion::Matrix::new()),
        Mode::Equalizer => Box::new(spectrum::Equalizer),
        Mode::Spectrogram => Box::new(history::Spectrogram::new()),
        Mode::Star => Box::new(geometry::Star),
        Mode::Bubbles => Box::new(motion::Bubbles::new()),
        Mode::Lissajous => Box::new(waveform::Lissajous),
        Mode::WaveformBars => Box::new(waveform::WaveformBars),
        Mode::FrequencyRings => Box::new(radial::FrequencyRings),
        Mode::Pulse => Box::new(motion::Pulse::new()),
        Mode::WaveformFill => Box::new(waveform::WaveformFill),
        Mode::RadialWaveform => Box::new(radial::RadialWaveform),
        Mode::FrequencyLines => Box::new(spectrum::FrequencyLines),
        Mode::FrequencyArcs => Box::new(radial::FrequencyArcs),
        Mode::Kaleidoscope => Box::new(geometry::Kaleidoscope),
        Mode::Mandala => Box::new(geometry::Mandala),
        Mode::Flower => Box::new(geometry::Flower),
        Mode::Glow => Box::new(geometry::Glow),
        Mode::ParticleTrails => Box::new(motion::ParticleTrails::new()),
        Mode::LightRays => Box::new(radial::LightRays),
        Mode::EnergyWaves => Box::new(motion::EnergyWaves::new()),
        Mode::WaveformHistory => Box::new(history::WaveformHistory::new()),
        Mode::Nebula => Box::new(motion::Nebula::new()),
        Mode::Combined => Box::new(combined::Combined),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_instantiates() {
        let mut registry = Registry::new();
        for &mode in Mode::ALL {
            registry.preload(mode).unwrap();
            assert!(registry.is_cached(mode));
        }
    }

    #[test]
    fn test_resolve_memoizes() {
        let mut registry = Registry::new();
        assert!(!registry.is_cached(Mode::Spectrum));
        registry.resolve(Mode::Spectrum).unwrap();
        assert!(registry.is_cached(Mode::Spectrum));
        // Second resolve reuses the slot without growing the cache.
        registry.resolve(Mode::Spectrum).unwrap();
        assert_eq!(registry.slots.len(), 1);
    }

    #[test]
    fn test_registries_are_independent() {
        let mut a = Registry::new();
        let b = Registry::new();
        a.preload(Mode::Bubbles).unwrap();
        assert!(a.is_cached(Mode::Bubbles));
        assert!(!b.is_cached(Mode::Bubbles));
    }
}
