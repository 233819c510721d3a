use std::path::Path;

use crate::error::DeviceError;

/// An audio output device.
///
/// `play(offset)` restarts the device's own position counter at zero, so
/// `elapsed_ms` is relative to the last `play` call, not to the track start.
/// The value is only meaningful while playing and may be negative or stale
/// otherwise.
pub trait AudioDevice {
    fn load(&mut self, path: &Path) -> Result<(), DeviceError>;
    fn play(&mut self, offset_seconds: f64) -> Result<(), DeviceError>;
    fn pause(&mut self) -> Result<(), DeviceError>;
    fn stop(&mut self) -> Result<(), DeviceError>;
    fn elapsed_ms(&self) -> i64;
}

impl<D: AudioDevice + ?Sized> AudioDevice for Box<D> {
    fn load(&mut self, path: &Path) -> Result<(), DeviceError> {
        (**self).load(path)
    }

    fn play(&mut self, offset_seconds: f64) -> Result<(), DeviceError> {
        (**self).play(offset_seconds)
    }

    fn pause(&mut self) -> Result<(), DeviceError> {
        (**self).pause()
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        (**self).stop()
    }

    fn elapsed_ms(&self) -> i64 {
        (**self).elapsed_ms()
    }
}

/// Stand-in when no audio backend exists (or `--mute`). Every call fails
/// with [`DeviceError::Unavailable`].
pub struct SilentDevice {
    reason: String,
}

impl SilentDevice {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn unavailable(&self) -> DeviceError {
        DeviceError::Unavailable(self.reason.clone())
    }
}

impl AudioDevice for SilentDevice {
    fn load(&mut self, _path: &Path) -> Result<(), DeviceError> {
        Err(self.unavailable())
    }

    fn play(&mut self, _offset_seconds: f64) -> Result<(), DeviceError> {
        Err(self.unavailable())
    }

    fn pause(&mut self) -> Result<(), DeviceError> {
        Err(self.unavailable())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        Err(self.unavailable())
    }

    fn elapsed_ms(&self) -> i64 {
        -1
    }
}

/// Wraps a device so that no call can fail outward. The first failure flips
/// the adapter into degraded (visual-only) mode and is logged once.
pub struct DeviceAdapter<D> {
    device: D,
    degraded: Option<DeviceError>,
    playing: bool,
}

impl<D: AudioDevice> DeviceAdapter<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            degraded: None,
            playing: false,
        }
    }

    pub fn load(&mut self, path: &Path) {
        let result = self.device.load(path);
        self.record("load", result);
    }

    pub fn play(&mut self, offset_seconds: f64) {
        let result = self.device.play(offset_seconds);
        self.playing = result.is_ok();
        self.record("play", result);
    }

    pub fn pause(&mut self) {
        self.playing = false;
        let result = self.device.pause();
        self.record("pause", result);
    }

    pub fn stop(&mut self) {
        self.playing = false;
        let result = self.device.stop();
        self.record("stop", result);
    }

    /// Seconds since the last successful `play`, clamped at zero. `None`
    /// while not playing or degraded.
    pub fn elapsed(&self) -> Option<f64> {
        if !self.playing || self.degraded.is_some() {
            return None;
        }
        Some(self.device.elapsed_ms().max(0) as f64 / 1000.0)
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    pub fn degraded_reason(&self) -> Option<&DeviceError> {
        self.degraded.as_ref()
    }

    #[cfg(test)]
    pub fn device(&self) -> &D {
        &self.device
    }

    fn record(&mut self, op: &str, result: Result<(), DeviceError>) {
        let Err(err) = result else {
            return;
        };
        if self.degraded.is_none() {
            log::warn!("Audio device {} failed, continuing without sound: {}", op, err);
            self.degraded = Some(err);
        } else {
            log::debug!("Audio device {} failed: {}", op, err);
        }
    }
}

#[cfg(feature = "playback")]
pub use rodio_backend::RodioDevice;

#[cfg(feature = "playback")]
mod rodio_backend {
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

    use super::AudioDevice;
    use crate::error::DeviceError;

    /// Default output device via rodio. The file is held in memory so each
    /// `play` can build a fresh decoder at the requested offset.
    pub struct RodioDevice {
        stream: OutputStream,
        sink: Option<Sink>,
        media: Option<Arc<[u8]>>,
        offset: Duration,
    }

    impl RodioDevice {
        pub fn open() -> Result<Self, DeviceError> {
            let mut stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| DeviceError::Unavailable(e.to_string()))?;
            stream.log_on_drop(false);
            Ok(Self {
                stream,
                sink: None,
                media: None,
                offset: Duration::ZERO,
            })
        }
    }

    impl AudioDevice for RodioDevice {
        fn load(&mut self, path: &Path) -> Result<(), DeviceError> {
            let load_error = |reason: String| DeviceError::Load {
                path: path.to_path_buf(),
                reason,
            };
            let bytes: Arc<[u8]> = std::fs::read(path)
                .map_err(|e| load_error(e.to_string()))?
                .into();
            Decoder::new(Cursor::new(bytes.clone())).map_err(|e| load_error(e.to_string()))?;

            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
            self.media = Some(bytes);
            Ok(())
        }

        fn play(&mut self, offset_seconds: f64) -> Result<(), DeviceError> {
            let media = self
                .media
                .clone()
                .ok_or_else(|| DeviceError::Unavailable("no media loaded".into()))?;
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }

            let source = Decoder::new(Cursor::new(media))
                .map_err(|e| DeviceError::Unavailable(e.to_string()))?;
            let sink = Sink::connect_new(self.stream.mixer());
            sink.append(source);

            let offset = Duration::from_secs_f64(offset_seconds.max(0.0));
            if let Err(e) = sink.try_seek(offset) {
                log::debug!("Seek to {:.2}s failed: {}", offset_seconds, e);
            }
            sink.play();

            self.offset = offset;
            self.sink = Some(sink);
            Ok(())
        }

        fn pause(&mut self) -> Result<(), DeviceError> {
            if let Some(sink) = &self.sink {
                sink.pause();
            }
            Ok(())
        }

        fn stop(&mut self) -> Result<(), DeviceError> {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
            self.offset = Duration::ZERO;
            Ok(())
        }

        fn elapsed_ms(&self) -> i64 {
            match &self.sink {
                Some(sink) if !sink.is_paused() && !sink.empty() => {
                    sink.get_pos().as_millis() as i64 - self.offset.as_millis() as i64
                }
                _ => -1,
            }
        }
    }
}
