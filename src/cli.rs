use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::playback::scheduler::DEFAULT_INTERVAL;
use crate::playback::seek::DEFAULT_TOLERANCE;
use crate::render::theme::Theme;

#[derive(Parser, Debug)]
#[command(
    name = "sonosync",
    about = "Play an audio file with a synchronized live spectrum, or render static views"
)]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: PathBuf,

    /// What to show
    #[arg(long, value_enum, default_value_t = View::Live)]
    pub view: View,

    /// Color theme
    #[arg(long, value_enum, default_value_t = Theme::Plasma)]
    pub theme: Theme,

    /// STFT window size for static views (power of two, 512-4096)
    #[arg(long, default_value_t = 2048)]
    pub window: usize,

    /// Exponent applied to normalized magnitudes (0.5-5.0)
    #[arg(long, default_value_t = 1.0)]
    pub sensitivity: f32,

    /// Frame pacing interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_INTERVAL.as_millis() as u64)]
    pub interval_ms: u64,

    /// Seeks closer than this many seconds to the current time are ignored
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    pub seek_tolerance: f64,

    /// Output file for waveform/spectrogram (PNG) and surface (JSON) views
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 400)]
    pub height: u32,

    /// Visuals only, no audio output
    #[arg(long)]
    pub mute: bool,

    /// Keep the session open after the track ends
    #[arg(long)]
    pub stay: bool,

    /// Start paused instead of playing immediately
    #[arg(long)]
    pub paused: bool,

    /// Print the mood report as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to config file (default: ./sonosync.toml or ~/.config/sonosync/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// Interactive playback with a live spectrum
    Live,
    Waveform,
    Spectrogram,
    /// 3D spectrogram surface exported as JSON
    Surface,
    /// Tempo/loudness mood classification
    Mood,
}

impl View {
    pub fn default_output(self) -> Option<&'static str> {
        match self {
            View::Waveform => Some("waveform.png"),
            View::Spectrogram => Some("spectrogram.png"),
            View::Surface => Some("surface.json"),
            View::Live | View::Mood => None,
        }
    }
}
