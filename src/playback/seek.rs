use super::clock::Clock;
use super::device::AudioDevice;
use super::transport::Transport;

pub const DEFAULT_TOLERANCE: f64 = 0.3;

/// Turns user seek requests into transport seeks, ignoring targets within
/// `tolerance` of the current time so the loop's own time advance is never
/// mistaken for a seek.
pub struct SeekReconciler {
    tolerance: f64,
}

impl SeekReconciler {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns true when the transport was repositioned.
    pub fn request_seek<C: Clock, D: AudioDevice>(
        &self,
        transport: &mut Transport<C, D>,
        target_seconds: f64,
    ) -> bool {
        if !target_seconds.is_finite() {
            log::debug!("Ignoring non-finite seek target");
            return false;
        }
        let target = target_seconds.clamp(0.0, transport.duration());
        let current = transport.position();
        if (target - current).abs() <= self.tolerance {
            return false;
        }
        log::debug!("Seek {:.3}s -> {:.3}s", current, target);
        transport.seek(target);
        true
    }
}

impl Default for SeekReconciler {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}
