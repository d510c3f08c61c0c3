use soniq_core::audio::{Clock, MediaElement, MockCapture};
use soniq_core::{Mode, Source, State, Visualizer, VisualizerOptions};

fn sine_element(hz: f32, seconds: f32, sample_rate: u32) -> MediaElement {
    let count = (seconds * sample_rate as f32) as usize;
    let samples: Vec<f32> = (0..count)
        .map(|i| (i as f32 / sample_rate as f32 * hz * std::f32::consts::TAU).sin() * 0.8)
        .collect();
    let element = MediaElement::from_samples(samples, sample_rate);
    element.set_clock(Clock::Manual(1024));
    element
}

fn painted_pixels(viz: &Visualizer) -> usize {
    viz.surface()
        .pixmap()
        .pixels()
        .iter()
        .filter(|p| p.green() > 0 || p.red() > 0 || p.blue() > 0)
        .count()
}

#[test]
fn test_element_source_paints_spectrum() {
    let element = sine_element(440.0, 2.0, 44_100);
    element.set_looping(true);
    element.play();

    let mut viz = Visualizer::with_backend(
        VisualizerOptions {
            source: Source::Element(element),
            mode: Mode::Spectrum,
            ..Default::default()
        },
        Box::new(MockCapture::granting()),
    );
    viz.surface_mut().set_logical_size(400.0, 200.0);

    viz.start();
    assert!(viz.is_running());
    // Let the smoothed spectrum build up over several frames.
    for _ in 0..20 {
        viz.on_frame();
    }
    assert!(
        painted_pixels(&viz) > 0,
        "a sustained tone must light at least one bar"
    );
    viz.stop();
    assert_eq!(viz.state(), State::Idle);
}

#[test]
fn test_microphone_chunks_paint_waveform() {
    let backend = MockCapture::granting();
    for _ in 0..4 {
        let chunk: Vec<f32> = (0..2048).map(|i| (i as f32 * 0.05).sin()).collect();
        backend.push_chunk(chunk);
    }

    let mut viz = Visualizer::with_backend(
        VisualizerOptions {
            mode: Mode::Waveform,
            ..Default::default()
        },
        Box::new(backend.clone()),
    );
    viz.surface_mut().set_logical_size(400.0, 200.0);
    viz.start();
    for _ in 0..4 {
        viz.on_frame();
    }
    assert!(painted_pixels(&viz) > 0);

    viz.stop();
    assert_eq!(backend.stop_count(), 1);
}

#[test]
fn test_every_mode_renders_through_controller() {
    let element = sine_element(220.0, 3.0, 44_100);
    element.set_looping(true);
    element.play();

    let mut viz = Visualizer::with_backend(
        VisualizerOptions {
            source: Source::Element(element),
            ..Default::default()
        },
        Box::new(MockCapture::granting()),
    );
    viz.surface_mut().set_logical_size(200.0, 100.0);
    viz.start();
    assert!(viz.is_running());

    for &mode in Mode::ALL {
        viz.set_mode(mode);
        viz.on_frame();
        viz.on_frame();
        assert!(viz.is_running(), "controller must survive mode {mode}");
    }
    viz.stop();
}

#[test]
fn test_unknown_mode_tag_is_rejected() {
    let err = "not-a-real-mode".parse::<Mode>().unwrap_err();
    assert!(err.is_unknown_mode());
}

#[test]
fn test_mode_tags_round_trip() {
    for &mode in Mode::ALL {
        let parsed: Mode = mode.as_str().parse().unwrap();
        assert_eq!(parsed, mode);
    }
}

#[test]
fn test_denied_permission_leaves_idle_with_error() {
    let mut viz = Visualizer::with_backend(
        VisualizerOptions::default(),
        Box::new(MockCapture::denying("user dismissed the prompt")),
    );
    viz.start();
    assert!(!viz.is_running());
    assert!(viz.error().is_some_and(soniq_core::Error::is_permission));
    // The controller stays usable: a later grant would start normally.
    viz.stop();
    assert_eq!(viz.state(), State::Idle);
}
