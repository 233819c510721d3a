use super::clock::Clock;
use super::control::{Command, ControlSource};
use super::device::AudioDevice;
use super::scheduler::{Control, FrameScheduler, LoopExit};
use super::seek::SeekReconciler;
use super::transport::{Mode, Transport};
use crate::audio::signal::Signal;
use crate::render::RenderSurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Finished,
    Quit,
}

/// One playback session: the only owner of the transport, and therefore the
/// only path to the audio device.
pub struct Session<C, D> {
    transport: Transport<C, D>,
    reconciler: SeekReconciler,
    scheduler: FrameScheduler,
    signal: Signal,
    stay: bool,
}

impl<C: Clock, D: AudioDevice> Session<C, D> {
    pub fn new(
        transport: Transport<C, D>,
        reconciler: SeekReconciler,
        scheduler: FrameScheduler,
        signal: Signal,
    ) -> Self {
        Self {
            transport,
            reconciler,
            scheduler,
            signal,
            stay: false,
        }
    }

    /// Keep the session open after the track ends instead of returning.
    pub fn stay_after_end(mut self, stay: bool) -> Self {
        self.stay = stay;
        self
    }

    pub fn transport(&self) -> &Transport<C, D> {
        &self.transport
    }

    /// Apply a command outside of `run`.
    pub fn apply(&mut self, command: Command) -> Control {
        apply(&mut self.transport, &self.reconciler, command)
    }

    /// Drive the session until quit, or until the track ends when not
    /// staying. `stay` only applies to interactive control sources; with no
    /// way to send commands the session ends with the track.
    pub fn run<S, K>(&mut self, surface: &mut S, controls: &mut K) -> SessionEnd
    where
        S: RenderSurface,
        K: ControlSource,
    {
        let stay = self.stay && controls.is_interactive();
        let mut degraded_reported = false;
        // (mode, position) of the last silent frame drawn while idle
        let mut idle_drawn: Option<(Mode, f64)> = None;

        loop {
            report_degraded(&self.transport, surface, &mut degraded_reported);

            if self.transport.mode() == Mode::Playing {
                idle_drawn = None;
                let reconciler = &self.reconciler;
                let exit = self.scheduler.run(
                    &mut self.transport,
                    &self.signal,
                    surface,
                    |transport, surface| {
                        let mut flow = Control::Continue;
                        for command in controls.poll() {
                            if apply(transport, reconciler, command) == Control::Quit {
                                flow = Control::Quit;
                            }
                        }
                        report_degraded(transport, surface, &mut degraded_reported);
                        flow
                    },
                );
                match exit {
                    LoopExit::Quit => return SessionEnd::Quit,
                    LoopExit::Finished if !stay => return SessionEnd::Finished,
                    LoopExit::Finished | LoopExit::Interrupted => continue,
                }
            }

            let state = (self.transport.mode(), self.transport.position());
            if idle_drawn != Some(state) {
                surface.draw_silent(state.1, self.transport.duration());
                idle_drawn = Some(state);
            }

            for command in controls.poll() {
                if apply(&mut self.transport, &self.reconciler, command) == Control::Quit {
                    return SessionEnd::Quit;
                }
            }
            if self.transport.mode() != Mode::Playing {
                self.transport.clock().sleep(self.scheduler.interval());
            }
        }
    }
}

/// Post the visuals-only notice the first time the device is degraded.
fn report_degraded<C, D, S>(transport: &Transport<C, D>, surface: &mut S, reported: &mut bool)
where
    C: Clock,
    D: AudioDevice,
    S: RenderSurface,
{
    if *reported {
        return;
    }
    if let Some(reason) = transport.device().degraded_reason() {
        surface.notice(&format!("No audio output ({}); visuals only", reason));
        *reported = true;
    }
}

fn apply<C: Clock, D: AudioDevice>(
    transport: &mut Transport<C, D>,
    reconciler: &SeekReconciler,
    command: Command,
) -> Control {
    log::debug!("Command: {:?}", command);
    match command {
        Command::Play => transport.play(),
        Command::Pause => transport.pause(),
        Command::TogglePause => match transport.mode() {
            Mode::Playing => transport.pause(),
            Mode::Paused | Mode::Stopped => transport.play(),
        },
        Command::Stop => transport.stop(),
        Command::SeekTo(target) => {
            reconciler.request_seek(transport, target);
        }
        Command::SeekBy(delta) => {
            let target = transport.position() + delta;
            reconciler.request_seek(transport, target);
        }
        Command::Quit => return Control::Quit,
    }
    Control::Continue
}
