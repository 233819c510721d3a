use std::path::Path;
use std::time::Duration;

use super::clock::Clock;
use super::device::{AudioDevice, DeviceAdapter};

/// Reaching `duration - END_EPSILON` while playing counts as end of track.
pub const END_EPSILON: f64 = 0.02;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Stopped,
    Playing,
    Paused,
}

/// Authoritative playback clock.
///
/// While playing, time is extrapolated from a wall-clock anchor rather than
/// read from the device; the device is only the sound source.
pub struct Transport<C, D> {
    clock: C,
    device: DeviceAdapter<D>,
    duration: f64,
    mode: Mode,
    anchor_wallclock: Duration,
    anchor_offset: f64,
    end_of_track: bool,
}

impl<C: Clock, D: AudioDevice> Transport<C, D> {
    pub fn new(clock: C, device: D, duration: f64) -> Self {
        let anchor_wallclock = clock.now();
        Self {
            clock,
            device: DeviceAdapter::new(device),
            duration: duration.max(0.0),
            mode: Mode::Stopped,
            anchor_wallclock,
            anchor_offset: 0.0,
            end_of_track: false,
        }
    }

    pub fn load(&mut self, path: &Path) {
        self.device.load(path);
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn device(&self) -> &DeviceAdapter<D> {
        &self.device
    }

    pub fn is_degraded(&self) -> bool {
        self.device.is_degraded()
    }

    pub fn play(&mut self) {
        if self.mode == Mode::Playing {
            return;
        }
        if self.anchor_offset >= self.duration - END_EPSILON {
            self.anchor_offset = 0.0;
        }
        self.device.play(self.anchor_offset);
        self.anchor_wallclock = self.clock.now();
        self.end_of_track = false;
        self.mode = Mode::Playing;
        log::debug!("Transport: play from {:.3}s", self.anchor_offset);
    }

    pub fn pause(&mut self) {
        if self.mode != Mode::Playing {
            return;
        }
        let now = self.position();
        self.device.pause();
        self.anchor_offset = now;
        self.anchor_wallclock = self.clock.now();
        self.mode = Mode::Paused;
        log::debug!("Transport: paused at {:.3}s", now);
    }

    pub fn stop(&mut self) {
        self.device.stop();
        self.anchor_offset = 0.0;
        self.anchor_wallclock = self.clock.now();
        self.mode = Mode::Stopped;
        log::debug!("Transport: stopped");
    }

    pub fn seek(&mut self, target_seconds: f64) {
        let target = self.clamp(target_seconds);
        if self.mode == Mode::Playing {
            self.device.stop();
            self.device.play(target);
        }
        self.anchor_offset = target;
        self.anchor_wallclock = self.clock.now();
        log::debug!("Transport: seek to {:.3}s ({:?})", target, self.mode);
    }

    /// Current playback time in `[0, duration]`. Reaching the end while
    /// playing stops the transport and raises the end-of-track event.
    pub fn current_time(&mut self) -> f64 {
        let time = self.position();
        if self.mode == Mode::Playing && time >= self.duration - END_EPSILON {
            self.device.stop();
            self.anchor_offset = self.duration;
            self.anchor_wallclock = self.clock.now();
            self.mode = Mode::Stopped;
            self.end_of_track = true;
            log::debug!("Transport: end of track");
            return self.duration;
        }
        time
    }

    /// Current time without triggering transitions.
    pub fn position(&self) -> f64 {
        let time = match self.mode {
            Mode::Playing => {
                let elapsed = self.clock.now().saturating_sub(self.anchor_wallclock);
                self.anchor_offset + elapsed.as_secs_f64()
            }
            Mode::Paused | Mode::Stopped => self.anchor_offset,
        };
        self.clamp(time)
    }

    /// One-shot: returns true once after the transport ran off the end.
    pub fn take_end_of_track(&mut self) -> bool {
        std::mem::take(&mut self.end_of_track)
    }

    /// Device-reported position minus wall-clock position. Only a secondary
    /// signal; `None` unless playing on a healthy device.
    pub fn device_drift(&self) -> Option<f64> {
        if self.mode != Mode::Playing {
            return None;
        }
        let elapsed = self.device.elapsed()?;
        Some(self.clamp(self.anchor_offset + elapsed) - self.position())
    }

    fn clamp(&self, time: f64) -> f64 {
        if time.is_nan() {
            return 0.0;
        }
        time.clamp(0.0, self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::device::SilentDevice;
    use crate::playback::testing::{DeviceCall, ManualClock, RecordingDevice};

    const TOL: f64 = 1e-9;

    fn transport(duration: f64) -> (Transport<ManualClock, RecordingDevice>, ManualClock, RecordingDevice) {
        let clock = ManualClock::new();
        let device = RecordingDevice::new();
        let t = Transport::new(clock.clone(), device.clone(), duration);
        (t, clock, device)
    }

    #[test]
    fn starts_stopped_at_zero() {
        let (mut t, clock, _) = transport(10.0);
        clock.advance_secs(3.0);
        assert_eq!(t.mode(), Mode::Stopped);
        assert_eq!(t.current_time(), 0.0);
    }

    #[test]
    fn playing_time_follows_wall_clock() {
        let (mut t, clock, device) = transport(10.0);
        t.play();
        clock.advance_secs(2.5);
        assert!((t.current_time() - 2.5).abs() < TOL);
        assert_eq!(device.calls(), vec![DeviceCall::Play(0.0)]);
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let (mut t, clock, device) = transport(10.0);
        t.play();
        clock.advance_secs(3.0);
        t.pause();
        let paused_at = t.current_time();
        assert!((paused_at - 3.0).abs() < TOL);
        clock.advance_secs(4.0);
        assert!((t.current_time() - paused_at).abs() < TOL);

        t.play();
        assert!((t.current_time() - paused_at).abs() < TOL);
        clock.advance_secs(1.0);
        assert!((t.current_time() - 4.0).abs() < TOL);
        assert_eq!(
            device.calls(),
            vec![DeviceCall::Play(0.0), DeviceCall::Pause, DeviceCall::Play(3.0)]
        );
    }

    #[test]
    fn double_pause_is_noop() {
        let (mut t, clock, device) = transport(10.0);
        t.play();
        clock.advance_secs(1.0);
        t.pause();
        clock.advance_secs(1.0);
        t.pause();
        assert_eq!(t.mode(), Mode::Paused);
        assert!((t.current_time() - 1.0).abs() < TOL);
        assert_eq!(device.calls(), vec![DeviceCall::Play(0.0), DeviceCall::Pause]);
    }

    #[test]
    fn pause_when_stopped_is_noop() {
        let (mut t, _, device) = transport(10.0);
        t.pause();
        assert_eq!(t.mode(), Mode::Stopped);
        assert!(device.calls().is_empty());
    }

    #[test]
    fn play_while_playing_is_noop() {
        let (mut t, clock, device) = transport(10.0);
        t.play();
        clock.advance_secs(1.0);
        t.play();
        assert!((t.current_time() - 1.0).abs() < TOL);
        assert_eq!(device.calls(), vec![DeviceCall::Play(0.0)]);
    }

    #[test]
    fn stop_resets_offset() {
        let (mut t, clock, device) = transport(10.0);
        t.play();
        clock.advance_secs(4.0);
        t.stop();
        assert_eq!(t.mode(), Mode::Stopped);
        assert_eq!(t.current_time(), 0.0);
        assert_eq!(device.calls().last(), Some(&DeviceCall::Stop));
    }

    #[test]
    fn seek_lands_on_target_in_every_mode() {
        for setup in 0..3 {
            let (mut t, clock, _) = transport(10.0);
            match setup {
                0 => {}
                1 => t.play(),
                _ => {
                    t.play();
                    clock.advance_secs(2.0);
                    t.pause();
                }
            }
            let before = t.mode();
            t.seek(6.5);
            assert!((t.current_time() - 6.5).abs() < TOL);
            assert_eq!(t.mode(), before);
        }
    }

    #[test]
    fn seek_while_playing_restarts_device() {
        let (mut t, clock, device) = transport(10.0);
        t.play();
        clock.advance_secs(1.0);
        t.seek(7.0);
        clock.advance_secs(0.5);
        assert!((t.current_time() - 7.5).abs() < TOL);
        assert_eq!(
            device.calls(),
            vec![DeviceCall::Play(0.0), DeviceCall::Stop, DeviceCall::Play(7.0)]
        );
    }

    #[test]
    fn seek_while_paused_does_not_touch_device() {
        let (mut t, _, device) = transport(10.0);
        t.seek(4.0);
        assert!(device.calls().is_empty());
        t.play();
        assert_eq!(device.calls(), vec![DeviceCall::Play(4.0)]);
    }

    #[test]
    fn seek_clamps_negative_to_zero() {
        let (mut t, _, _) = transport(10.0);
        t.seek(-3.0);
        assert_eq!(t.current_time(), 0.0);
    }

    #[test]
    fn seek_past_end_clamps_and_ends_track() {
        let (mut t, _, device) = transport(10.0);
        t.play();
        t.seek(12.0);
        assert_eq!(t.current_time(), 10.0);
        assert_eq!(t.mode(), Mode::Stopped);
        assert!(t.take_end_of_track());
        assert!(!t.take_end_of_track());
        assert_eq!(device.calls().last(), Some(&DeviceCall::Stop));
        assert_eq!(t.current_time(), 10.0);
    }

    #[test]
    fn natural_end_of_track() {
        let (mut t, clock, _) = transport(10.0);
        t.play();
        clock.advance_secs(9.97);
        assert!(t.current_time() < 10.0);
        assert_eq!(t.mode(), Mode::Playing);
        clock.advance_secs(0.02);
        assert_eq!(t.current_time(), 10.0);
        assert_eq!(t.mode(), Mode::Stopped);
        assert!(t.take_end_of_track());
    }

    #[test]
    fn play_after_end_restarts_from_zero() {
        let (mut t, clock, device) = transport(10.0);
        t.play();
        clock.advance_secs(11.0);
        t.current_time();
        assert!(t.take_end_of_track());
        t.play();
        assert_eq!(t.current_time(), 0.0);
        assert_eq!(device.calls().last(), Some(&DeviceCall::Play(0.0)));
    }

    #[test]
    fn time_stays_in_range_across_transitions() {
        let (mut t, clock, _) = transport(10.0);
        let script: &[(&str, f64)] = &[
            ("play", 0.0),
            ("wait", 3.0),
            ("seek", -5.0),
            ("wait", 1.0),
            ("pause", 0.0),
            ("seek", 40.0),
            ("play", 0.0),
            ("wait", 2.0),
            ("stop", 0.0),
            ("seek", 9.99),
            ("play", 0.0),
            ("wait", 50.0),
            ("pause", 0.0),
            ("play", 0.0),
            ("seek", f64::NAN),
        ];
        for &(op, arg) in script {
            match op {
                "play" => t.play(),
                "pause" => t.pause(),
                "stop" => t.stop(),
                "seek" => t.seek(arg),
                _ => clock.advance_secs(arg),
            }
            let now = t.current_time();
            assert!((0.0..=10.0).contains(&now), "{} -> {}", op, now);
        }
    }

    #[test]
    fn unavailable_device_still_advances() {
        let clock = ManualClock::new();
        let mut t = Transport::new(clock.clone(), SilentDevice::new("no backend"), 10.0);
        t.play();
        assert!(t.is_degraded());
        assert_eq!(t.mode(), Mode::Playing);
        clock.advance_secs(2.0);
        assert!((t.current_time() - 2.0).abs() < TOL);
        assert_eq!(t.device_drift(), None);
    }

    #[test]
    fn drift_compares_device_and_wall_clock() {
        let (mut t, clock, device) = transport(10.0);
        t.seek(2.0);
        t.play();
        clock.advance_secs(1.0);
        device.set_elapsed_ms(950);
        let drift = t.device_drift().expect("drift");
        assert!((drift + 0.05).abs() < 1e-6);
        t.pause();
        assert_eq!(t.device_drift(), None);
    }

    #[test]
    fn zero_duration_track_ends_immediately() {
        let (mut t, _, _) = transport(0.0);
        t.play();
        assert_eq!(t.current_time(), 0.0);
        assert!(t.take_end_of_track());
    }
}
