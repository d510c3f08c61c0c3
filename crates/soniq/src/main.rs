//! Offline demo: renders a WAV file's visualization to a PNG sequence.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use soniq_core::audio::{Clock, FftSize, MediaElement};
use soniq_core::{Background, BarColor, Mode, Source, Visualizer, VisualizerOptions};

#[derive(Parser)]
#[command(name = "soniq", about = "Render audio visualizations to PNG frames")]
struct Args {
    /// Input WAV file
    input: PathBuf,

    /// Visualization mode tag (e.g. spectrum, waveform, nebula)
    #[arg(short, long, default_value = "spectrum")]
    mode: String,

    /// Number of frames to render
    #[arg(short = 'n', long, default_value_t = 300)]
    frames: u32,

    /// Frames per second of the rendered sequence
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Output directory for the PNG sequence
    #[arg(short, long, default_value = "frames")]
    out_dir: PathBuf,

    /// Logical surface width
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Logical surface height
    #[arg(long, default_value_t = 400.0)]
    height: f32,

    /// FFT window size (256, 512, 1024 or 2048)
    #[arg(long, default_value_t = 1024)]
    fft_size: usize,

    /// Bar color (hex, rgb() or a named color)
    #[arg(long, default_value = "#00ffcc")]
    bar_color: String,

    /// Background color, or "transparent"
    #[arg(long, default_value = "#000")]
    background: String,

    /// Stroke width for line-style modes
    #[arg(long, default_value_t = 2.0)]
    line_width: f32,

    /// Mirror the drawing across its symmetry axis
    #[arg(long)]
    mirror: bool,

    /// Loop the input instead of stopping at its end
    #[arg(long)]
    looping: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let mode: Mode = args
        .mode
        .parse()
        .with_context(|| format!("known modes: {}", mode_list()))?;
    let fft_size =
        FftSize::try_from(args.fft_size).context("fft size must be 256, 512, 1024 or 2048")?;

    let element = MediaElement::from_wav_file(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    // Deterministic playback: advance the element by exactly one frame's
    // worth of samples per rendered frame.
    let step = (element.sample_rate() / args.fps.max(1)) as usize;
    element.set_clock(Clock::Manual(step));
    element.set_looping(args.looping);
    element.play();

    info!(
        input = %args.input.display(),
        %mode,
        duration = element.duration(),
        "rendering {} frames at {} fps",
        args.frames,
        args.fps
    );

    let mut viz = Visualizer::new(VisualizerOptions {
        source: Source::Element(element),
        mode,
        fft_size,
        bar_color: BarColor::solid(&args.bar_color),
        background: Background::parse(&args.background),
        line_width: args.line_width,
        mirror: args.mirror,
        ..Default::default()
    });
    viz.surface_mut().set_logical_size(args.width, args.height);

    viz.start();
    if let Some(err) = viz.error() {
        anyhow::bail!("failed to start: {err}");
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    for frame in 0..args.frames {
        viz.on_frame();
        let path = args.out_dir.join(format!("frame_{frame:05}.png"));
        viz.surface()
            .pixmap()
            .save_png(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    viz.stop();
    info!("wrote {} frames to {}", args.frames, args.out_dir.display());
    Ok(())
}

fn mode_list() -> String {
    let mut out = String::new();
    for (i, mode) in Mode::ALL.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{mode}");
    }
    out
}
