//! Deterministic fakes for playback tests.

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use super::clock::Clock;
use super::control::{Command, ControlSource};
use super::device::AudioDevice;
use crate::audio::spectrum::RenderFrame;
use crate::error::DeviceError;
use crate::render::RenderSurface;

/// Clock that only moves when told to; `sleep` advances it.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeviceCall {
    Load,
    Play(f64),
    Pause,
    Stop,
}

#[derive(Default)]
struct DeviceLog {
    calls: Vec<DeviceCall>,
    elapsed_ms: i64,
    fail_load: bool,
    fail_play: bool,
}

/// Device that records every call. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingDevice {
    log: Rc<RefCell<DeviceLog>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.log.borrow().calls.clone()
    }

    pub fn set_elapsed_ms(&self, ms: i64) {
        self.log.borrow_mut().elapsed_ms = ms;
    }

    pub fn fail_load(&self) {
        self.log.borrow_mut().fail_load = true;
    }

    /// Every later `play` is recorded and then fails.
    pub fn fail_plays(&self) {
        self.log.borrow_mut().fail_play = true;
    }

    fn push(&self, call: DeviceCall) {
        self.log.borrow_mut().calls.push(call);
    }
}

impl AudioDevice for RecordingDevice {
    fn load(&mut self, path: &Path) -> Result<(), DeviceError> {
        self.push(DeviceCall::Load);
        if self.log.borrow().fail_load {
            return Err(DeviceError::Load {
                path: path.to_path_buf(),
                reason: "unsupported".into(),
            });
        }
        Ok(())
    }

    fn play(&mut self, offset_seconds: f64) -> Result<(), DeviceError> {
        self.push(DeviceCall::Play(offset_seconds));
        if self.log.borrow().fail_play {
            return Err(DeviceError::Unavailable("device lost".into()));
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), DeviceError> {
        self.push(DeviceCall::Pause);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        self.push(DeviceCall::Stop);
        Ok(())
    }

    fn elapsed_ms(&self) -> i64 {
        self.log.borrow().elapsed_ms
    }
}

#[derive(Default)]
pub struct SurfaceLog {
    /// `(time, bins)` for every drawn frame.
    pub frames: Vec<(f64, Vec<f32>)>,
    pub silent: Vec<f64>,
    pub finished: usize,
    pub notices: Vec<String>,
}

#[derive(Clone, Default)]
pub struct RecordingSurface {
    log: Rc<RefCell<SurfaceLog>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_count(&self) -> usize {
        self.log.borrow().frames.len()
    }

    pub fn frame_times(&self) -> Vec<f64> {
        self.log.borrow().frames.iter().map(|(t, _)| *t).collect()
    }

    pub fn silent_count(&self) -> usize {
        self.log.borrow().silent.len()
    }

    pub fn finished(&self) -> usize {
        self.log.borrow().finished
    }

    pub fn notices(&self) -> Vec<String> {
        self.log.borrow().notices.clone()
    }
}

impl RenderSurface for RecordingSurface {
    fn draw(&mut self, frame: &RenderFrame, time: f64, _duration: f64) {
        self.log.borrow_mut().frames.push((time, frame.bins.clone()));
    }

    fn draw_silent(&mut self, time: f64, _duration: f64) {
        self.log.borrow_mut().silent.push(time);
    }

    fn finish(&mut self) {
        self.log.borrow_mut().finished += 1;
    }

    fn notice(&mut self, message: &str) {
        self.log.borrow_mut().notices.push(message.to_string());
    }
}

/// Emits each command once the manual clock reaches its timestamp.
pub struct ScriptedControls {
    clock: ManualClock,
    script: Vec<(Duration, Command)>,
}

impl ScriptedControls {
    pub fn new(clock: &ManualClock, script: &[(f64, Command)]) -> Self {
        let mut script: Vec<(Duration, Command)> = script
            .iter()
            .map(|&(at, cmd)| (Duration::from_secs_f64(at), cmd))
            .collect();
        script.sort_by_key(|(at, _)| *at);
        script.reverse();
        Self {
            clock: clock.clone(),
            script,
        }
    }
}

impl ControlSource for ScriptedControls {
    fn poll(&mut self) -> Vec<Command> {
        let now = self.clock.now();
        let mut due = Vec::new();
        while let Some(&(at, cmd)) = self.script.last() {
            if at > now {
                break;
            }
            self.script.pop();
            due.push(cmd);
        }
        due
    }
}
