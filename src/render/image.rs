use std::path::Path;

use anyhow::{Context, Result};
use ::image::{ImageFormat, Rgb, RgbImage};

use super::theme::Theme;
use crate::audio::signal::Signal;
use crate::audio::stft::Spectrogram;

const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);
const WAVE_COLOR: Rgb<u8> = Rgb([0, 255, 255]);
const DB_FLOOR: f32 = -80.0;
/// Lowest frequency shown on the log axis.
const MIN_FREQ: f32 = 20.0;

/// Min/max envelope of the signal, one pixel column per slice of samples.
pub fn waveform_image(signal: &Signal, width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    if signal.is_empty() || width == 0 || height == 0 {
        return img;
    }
    let samples = signal.samples();

    let mid = (height - 1) as f32 / 2.0;
    let to_row = |v: f32| -> u32 {
        let y = mid - v.clamp(-1.0, 1.0) * mid;
        (y.round() as u32).min(height - 1)
    };

    for x in 0..width {
        let start = x as usize * samples.len() / width as usize;
        let end = ((x as usize + 1) * samples.len() / width as usize)
            .max(start + 1)
            .min(samples.len());
        if start >= end {
            continue;
        }
        let slice = &samples[start..end];
        let lo = slice.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = slice.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        // Higher amplitude is a smaller row index.
        for y in to_row(hi)..=to_row(lo) {
            img.put_pixel(x, y, WAVE_COLOR);
        }
    }
    img
}

/// Spectrogram in dB with time on x and a log-frequency y axis (low at the
/// bottom).
pub fn spectrogram_image(spec: &Spectrogram, theme: Theme, width: u32, height: u32) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
    if spec.num_frames() == 0 || width == 0 || height == 0 {
        return img;
    }

    let db = spec.to_db(DB_FLOOR);
    let bin_hz = spec.bin_frequency(1);
    let f_max = spec.sample_rate as f32 / 2.0;
    let f_min = MIN_FREQ.max(bin_hz).min(f_max);
    let last_bin = spec.num_bins() - 1;

    let row_bins: Vec<usize> = (0..height)
        .map(|y| {
            let frac = if height > 1 {
                1.0 - y as f32 / (height - 1) as f32
            } else {
                0.0
            };
            let freq = f_min * (f_max / f_min).powf(frac);
            ((freq / bin_hz).round() as usize).min(last_bin)
        })
        .collect();

    for x in 0..width {
        let frame = (x as usize * spec.num_frames() / width as usize).min(spec.num_frames() - 1);
        let column = &db[frame];
        for (y, &bin) in row_bins.iter().enumerate() {
            let level = (column[bin] - DB_FLOOR) / -DB_FLOOR;
            img.put_pixel(x, y as u32, Rgb(theme.color(level)));
        }
    }
    img
}

pub fn save_png(img: &RgbImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write image to {}", path.display()))?;
    log::info!("Wrote {}x{} image to {}", img.width(), img.height(), path.display());
    Ok(())
}
