use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::audio::stft::Spectrogram;

/// Only the lowest bins are exported.
pub const MAX_BINS: usize = 512;
/// Keep every Nth STFT frame.
pub const FRAME_STRIDE: usize = 4;

/// 3D surface data: `z[f][t]` is the (sensitivity-shaped) magnitude at
/// `freqs[f]` and `times[t]`.
#[derive(Debug, Serialize)]
pub struct SurfaceGrid {
    pub times: Vec<f32>,
    pub freqs: Vec<f32>,
    pub z: Vec<Vec<f32>>,
}

impl SurfaceGrid {
    pub fn from_spectrogram(spec: &Spectrogram, sensitivity: f32) -> Self {
        let bins = spec.num_bins().min(MAX_BINS);
        let kept: Vec<usize> = (0..spec.num_frames()).step_by(FRAME_STRIDE).collect();

        let times = kept.iter().map(|&t| spec.frame_time(t)).collect();
        let freqs = (0..bins).map(|k| spec.bin_frequency(k)).collect();
        let z = (0..bins)
            .map(|k| {
                kept.iter()
                    .map(|&t| spec.frames[t][k].powf(sensitivity))
                    .collect()
            })
            .collect();

        Self { times, freqs, z }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self).context("Failed to serialize surface")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write surface to {}", path.display()))?;
        log::info!(
            "Wrote surface ({} freqs x {} times) to {}",
            self.freqs.len(),
            self.times.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrogram(frames: usize, n_fft: usize) -> Spectrogram {
        let half = n_fft / 2 + 1;
        Spectrogram {
            frames: (0..frames)
                .map(|t| (0..half).map(|k| (t + k) as f32 / 10.0).collect())
                .collect(),
            n_fft,
            hop: n_fft / 4,
            sample_rate: 22050,
        }
    }

    #[test]
    fn decimates_frames_and_caps_bins() {
        let grid = SurfaceGrid::from_spectrogram(&spectrogram(10, 2048), 1.0);
        assert_eq!(grid.freqs.len(), MAX_BINS);
        assert_eq!(grid.times.len(), 3);
        assert_eq!(grid.z.len(), MAX_BINS);
        assert!(grid.z.iter().all(|row| row.len() == 3));
        // z[k][i] comes from frame 4 * i
        assert!((grid.z[5][2] - 1.3).abs() < 1e-6);
    }

    #[test]
    fn small_fft_keeps_all_bins() {
        let grid = SurfaceGrid::from_spectrogram(&spectrogram(4, 512), 1.0);
        assert_eq!(grid.freqs.len(), 257);
        assert_eq!(grid.times, vec![0.0]);
    }

    #[test]
    fn sensitivity_raises_magnitudes() {
        let spec = spectrogram(1, 512);
        let grid = SurfaceGrid::from_spectrogram(&spec, 2.0);
        assert!((grid.z[20][0] - 4.0).abs() < 1e-5);
    }

    #[test]
    fn json_has_expected_keys() {
        let grid = SurfaceGrid::from_spectrogram(&spectrogram(1, 512), 1.0);
        let value: serde_json::Value = serde_json::to_value(&grid).unwrap();
        assert!(value.get("times").is_some());
        assert!(value.get("freqs").is_some());
        assert_eq!(value["z"].as_array().unwrap().len(), 257);
    }
}
