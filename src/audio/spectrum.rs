use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use super::signal::Signal;

/// Number of low-frequency bins kept per frame.
pub const NUM_BINS: usize = 100;

const NORM_EPSILON: f32 = 1e-6;

/// Normalized magnitude bins for one tick, each in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFrame {
    pub bins: Vec<f32>,
}

/// Result of slicing the signal at a frame index. `Empty` marks the track
/// tail (or an out-of-range index) and must be skipped, not rendered.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameSlot {
    Frame(RenderFrame),
    Empty,
}

/// Pure hop-sized spectrum extractor. The FFT plan is built once; `extract`
/// only reads the signal.
pub struct FrameExtractor {
    hop: usize,
    sensitivity: f32,
    fft: Arc<dyn Fft<f32>>,
}

impl FrameExtractor {
    pub fn new(hop: usize, sensitivity: f32) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(hop.max(1));
        Self {
            hop,
            sensitivity,
            fft,
        }
    }

    /// Hop size giving `seconds` of audio at the signal's rate, e.g. 30ms at
    /// 22050 Hz is 661 samples.
    pub fn hop_for(sample_rate: u32, seconds: f64) -> usize {
        ((sample_rate as f64 * seconds) as usize).max(1)
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn total_frame_count(&self, signal: &Signal) -> usize {
        if self.hop == 0 {
            return 0;
        }
        signal.len() / self.hop
    }

    pub fn extract(&self, signal: &Signal, frame_index: usize) -> FrameSlot {
        let samples = signal.samples();
        let Some(start) = frame_index.checked_mul(self.hop) else {
            return FrameSlot::Empty;
        };
        if self.hop == 0 || start >= samples.len() || samples.len() - start < self.hop {
            return FrameSlot::Empty;
        }

        let mut buffer: Vec<Complex<f32>> = samples[start..start + self.hop]
            .iter()
            .map(|&s| Complex::new(s, 0.0))
            .collect();
        self.fft.process(&mut buffer);

        // Real input: bins above hop/2 mirror the lower half.
        let keep = NUM_BINS.min(self.hop / 2 + 1);
        let magnitudes: Vec<f32> = buffer[..keep].iter().map(|c| c.norm()).collect();

        FrameSlot::Frame(RenderFrame {
            bins: shape(&magnitudes, self.sensitivity),
        })
    }
}

/// Normalize to the frame peak, then apply the sensitivity exponent.
fn shape(magnitudes: &[f32], sensitivity: f32) -> Vec<f32> {
    let peak = magnitudes.iter().copied().fold(0.0f32, f32::max) + NORM_EPSILON;
    magnitudes
        .iter()
        .map(|&m| (m / peak).clamp(0.0, 1.0).powf(sensitivity))
        .collect()
}

/// Map a playback time onto a frame index in `[0, total_frames - 1]`.
///
/// Returns `None` when there are no frames or the duration is not positive.
pub fn frame_index(time: f64, duration: f64, total_frames: usize) -> Option<usize> {
    if total_frames == 0 || duration <= 0.0 || !time.is_finite() {
        return None;
    }
    let position = (time / duration).clamp(0.0, 1.0);
    let idx = (position * total_frames as f64).floor() as usize;
    Some(idx.min(total_frames - 1))
}
