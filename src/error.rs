use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by an audio output device.
///
/// Neither variant is fatal: the transport keeps its wall-clock and the
/// visualization keeps running without sound.
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    /// Only backends that read the file themselves report this.
    #[cfg(any(feature = "playback", test))]
    #[error("could not load {path}: {reason}")]
    Load { path: PathBuf, reason: String },
    #[error("audio backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to open audio file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported or corrupt audio: {0}")]
    Format(#[from] symphonia::core::errors::Error),
    #[error("no decodable audio track found")]
    NoTrack,
    #[error("audio track has no sample rate")]
    UnknownSampleRate,
    #[error("audio file contains no samples")]
    Empty,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("window size must be a power of two in [512, 4096], got {0}")]
    WindowSize(usize),
    #[error("sensitivity must be in [0.5, 5.0], got {0}")]
    Sensitivity(f32),
    #[error("seek tolerance must be in [0.1, 1.0] seconds, got {0}")]
    SeekTolerance(f64),
    #[error("frame interval must be in [5, 1000] ms, got {0}")]
    Interval(u64),
}
