use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};

use super::signal::Signal;

/// Full-signal magnitude STFT, frame-major.
pub struct Spectrogram {
    /// `frames[t][k]` is the magnitude of bin `k` in frame `t`.
    pub frames: Vec<Vec<f32>>,
    pub n_fft: usize,
    pub hop: usize,
    pub sample_rate: u32,
}

impl Spectrogram {
    pub fn num_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Center frequency of bin `k` in Hz.
    pub fn bin_frequency(&self, k: usize) -> f32 {
        k as f32 * self.sample_rate as f32 / self.n_fft as f32
    }

    /// Start time of frame `t` in seconds.
    pub fn frame_time(&self, t: usize) -> f32 {
        (t * self.hop) as f32 / self.sample_rate as f32
    }

    pub fn peak(&self) -> f32 {
        self.frames
            .iter()
            .flat_map(|f| f.iter().copied())
            .fold(0.0f32, f32::max)
    }

    /// Magnitudes in dB relative to the global peak, floored at `floor_db`.
    pub fn to_db(&self, floor_db: f32) -> Vec<Vec<f32>> {
        let reference = self.peak().max(1e-10);
        self.frames
            .iter()
            .map(|frame| {
                frame
                    .iter()
                    .map(|&m| (20.0 * (m.max(1e-10) / reference).log10()).max(floor_db))
                    .collect()
            })
            .collect()
    }
}

/// Compute a Hann-windowed STFT with `hop = n_fft / 4`. The last partial
/// frame is zero-padded.
pub fn stft(signal: &Signal, n_fft: usize) -> Spectrogram {
    let hop = (n_fft / 4).max(1);
    let samples = signal.samples();
    let num_frames = if samples.is_empty() {
        0
    } else {
        (samples.len() + hop - 1) / hop
    };
    let hann = hann_window(n_fft);
    let half = n_fft / 2 + 1;

    log::info!("STFT: {} frames (n_fft={}, hop={})", num_frames, n_fft, hop);

    let frames = (0..num_frames)
        .into_par_iter()
        .map(|frame_idx| {
            let start = frame_idx * hop;
            let end = (start + n_fft).min(samples.len());

            let mut buffer = vec![Complex::new(0.0f32, 0.0); n_fft];
            for (i, &s) in samples[start..end].iter().enumerate() {
                buffer[i] = Complex::new(s * hann[i], 0.0);
            }

            // Per-thread planner (rayon-safe)
            let mut planner = FftPlanner::<f32>::new();
            let fft = planner.plan_fft_forward(n_fft);
            fft.process(&mut buffer);

            buffer[..half].iter().map(|c| c.norm()).collect()
        })
        .collect();

    Spectrogram {
        frames,
        n_fft,
        hop,
        sample_rate: signal.sample_rate(),
    }
}

pub fn hann_window(size: usize) -> Vec<f32> {
    if size < 2 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}
