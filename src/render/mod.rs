pub mod image;
pub mod surface;
pub mod terminal;
pub mod theme;

use crate::audio::spectrum::RenderFrame;

/// Consumer of per-tick frames from the scheduler.
pub trait RenderSurface {
    fn draw(&mut self, frame: &RenderFrame, time: f64, duration: f64);

    /// Static frame shown when entering the idle (paused/stopped) state.
    fn draw_silent(&mut self, time: f64, duration: f64);

    /// Track played to the end.
    fn finish(&mut self);

    /// One-off status message, e.g. running without audio output.
    fn notice(&mut self, _message: &str) {}
}
