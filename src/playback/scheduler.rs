use std::time::Duration;

use super::clock::Clock;
use super::device::AudioDevice;
use super::transport::{Mode, Transport};
use crate::audio::signal::Signal;
use crate::audio::spectrum::{frame_index, FrameExtractor, FrameSlot};
use crate::render::RenderSurface;

/// Default pacing interval (~33 fps).
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Rendered(usize),
    /// Tail or empty slice; nothing drawn.
    Skipped,
    EndOfTrack,
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// Ran off the end of the track.
    Finished,
    /// Transport left `Playing` because of a pause or stop.
    Interrupted,
    Quit,
}

/// What the between-ticks hook wants the loop to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Cooperative render loop. Runs only while the transport is playing and
/// yields only at the pacing sleep.
pub struct FrameScheduler {
    extractor: FrameExtractor,
    total_frames: usize,
    interval: Duration,
    drift_tolerance: f64,
}

impl FrameScheduler {
    pub fn new(extractor: FrameExtractor, signal: &Signal, interval: Duration) -> Self {
        let total_frames = extractor.total_frame_count(signal);
        log::info!(
            "Scheduler: {} frames (hop={}, sensitivity={}), interval={}ms",
            total_frames,
            extractor.hop(),
            extractor.sensitivity(),
            interval.as_millis()
        );
        Self {
            extractor,
            total_frames,
            interval,
            drift_tolerance: super::seek::DEFAULT_TOLERANCE,
        }
    }

    pub fn with_drift_tolerance(mut self, tolerance: f64) -> Self {
        self.drift_tolerance = tolerance;
        self
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One iteration: read the time, then render, skip, or report the end.
    pub fn tick<C, D, S>(
        &self,
        transport: &mut Transport<C, D>,
        signal: &Signal,
        surface: &mut S,
    ) -> Tick
    where
        C: Clock,
        D: AudioDevice,
        S: RenderSurface,
    {
        let time = transport.current_time();
        if transport.take_end_of_track() {
            surface.finish();
            return Tick::EndOfTrack;
        }
        if transport.mode() != Mode::Playing {
            return Tick::Idle;
        }

        if let Some(drift) = transport.device_drift() {
            if drift.abs() > self.drift_tolerance {
                log::debug!("Device drift {:+.3}s at {:.3}s", drift, time);
            }
        }

        let Some(idx) = frame_index(time, transport.duration(), self.total_frames) else {
            return Tick::Skipped;
        };
        match self.extractor.extract(signal, idx) {
            FrameSlot::Frame(frame) => {
                surface.draw(&frame, time, transport.duration());
                Tick::Rendered(idx)
            }
            FrameSlot::Empty => Tick::Skipped,
        }
    }

    /// Tick until the track ends, the transport leaves `Playing`, or
    /// `between_ticks` asks to quit. `between_ticks` runs before every tick
    /// and is where pause/stop/seek requests are applied and status notices
    /// are posted to the surface.
    pub fn run<C, D, S, F>(
        &self,
        transport: &mut Transport<C, D>,
        signal: &Signal,
        surface: &mut S,
        mut between_ticks: F,
    ) -> LoopExit
    where
        C: Clock,
        D: AudioDevice,
        S: RenderSurface,
        F: FnMut(&mut Transport<C, D>, &mut S) -> Control,
    {
        loop {
            if between_ticks(transport, surface) == Control::Quit {
                return LoopExit::Quit;
            }
            match self.tick(transport, signal, surface) {
                Tick::EndOfTrack => return LoopExit::Finished,
                Tick::Idle => return LoopExit::Interrupted,
                Tick::Rendered(_) | Tick::Skipped => {}
            }
            transport.clock().sleep(self.interval);
        }
    }
}
