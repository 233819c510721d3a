//! Heuristic loudness/tempo mood report. Stateless and independent of
//! playback; it only reads the decoded signal.

use rustfft::{num_complex::Complex, FftPlanner};
use serde::Serialize;

use super::signal::Signal;
use super::stft::hann_window;

const FFT_SIZE: usize = 2048;
const HOP_SIZE: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Mood {
    #[serde(rename = "calm")]
    Calm,
    #[serde(rename = "focus")]
    Focus,
    #[serde(rename = "energetic")]
    Energetic,
}

impl Mood {
    pub fn label(self) -> &'static str {
        match self {
            Mood::Calm => "Calm / Relaxing",
            Mood::Focus => "Focus / Productivity",
            Mood::Energetic => "Energetic / Stressful",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MoodReport {
    pub duration: f32,
    pub rms: f32,
    pub peak_amplitude: f32,
    pub onsets: usize,
    /// `None` when fewer than two usable onsets were found.
    pub tempo_bpm: Option<f32>,
    pub mood: Mood,
}

pub fn analyze(signal: &Signal) -> MoodReport {
    let samples = signal.samples();
    let rms = if samples.is_empty() {
        0.0
    } else {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    };
    let peak_amplitude = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

    let flux = spectral_flux(samples, signal.sample_rate());
    let onsets = detect_onsets(&flux);
    let tempo_bpm = estimate_tempo(&onsets);
    let mood = classify(tempo_bpm.unwrap_or(0.0), rms);

    log::info!(
        "Mood: rms={:.4}, peak={:.4}, onsets={}, tempo={}, mood={}",
        rms,
        peak_amplitude,
        onsets.len(),
        tempo_bpm.map_or_else(|| "n/a".to_string(), |t| format!("{:.1} BPM", t)),
        mood.label()
    );

    MoodReport {
        duration: signal.duration() as f32,
        rms,
        peak_amplitude,
        onsets: onsets.len(),
        tempo_bpm,
        mood,
    }
}

pub fn classify(tempo_bpm: f32, rms: f32) -> Mood {
    if tempo_bpm < 90.0 && rms < 0.02 {
        Mood::Calm
    } else if (90.0..=130.0).contains(&tempo_bpm) && rms < 0.05 {
        Mood::Focus
    } else {
        Mood::Energetic
    }
}

/// Half-wave rectified spectral flux per hop, as `(time, flux)` pairs.
fn spectral_flux(samples: &[f32], sample_rate: u32) -> Vec<(f32, f32)> {
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);
    let hann = hann_window(FFT_SIZE);

    let mut prev_magnitudes = vec![0.0f32; FFT_SIZE / 2];
    let mut flux_values = Vec::new();

    let mut pos = 0;
    while pos + FFT_SIZE <= samples.len() {
        let mut buffer: Vec<Complex<f32>> = samples[pos..pos + FFT_SIZE]
            .iter()
            .zip(hann.iter())
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();
        fft.process(&mut buffer);

        let magnitudes: Vec<f32> = buffer[..FFT_SIZE / 2].iter().map(|c| c.norm()).collect();
        let flux: f32 = magnitudes
            .iter()
            .zip(prev_magnitudes.iter())
            .map(|(cur, prev)| (cur - prev).max(0.0))
            .sum();

        flux_values.push((pos as f32 / sample_rate as f32, flux));
        prev_magnitudes = magnitudes;
        pos += HOP_SIZE;
    }

    flux_values
}

fn detect_onsets(flux_values: &[(f32, f32)]) -> Vec<f32> {
    let window = 20;
    let mut onset_times: Vec<f32> = Vec::new();

    for i in 0..flux_values.len() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(flux_values.len());
        let local_mean: f32 =
            flux_values[start..end].iter().map(|(_, f)| f).sum::<f32>() / (end - start) as f32;
        let threshold = local_mean * 1.5 + 0.01;

        if flux_values[i].1 <= threshold {
            continue;
        }

        let is_peak = (i == 0 || flux_values[i].1 >= flux_values[i - 1].1)
            && (i == flux_values.len() - 1 || flux_values[i].1 >= flux_values[i + 1].1);
        // 100ms minimum gap
        let far_enough = onset_times
            .last()
            .map_or(true, |&last| flux_values[i].0 - last > 0.1);

        if is_peak && far_enough {
            onset_times.push(flux_values[i].0);
        }
    }

    onset_times
}

fn estimate_tempo(onset_times: &[f32]) -> Option<f32> {
    // 60-200 BPM
    let mut reasonable: Vec<f32> = onset_times
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|&i| (0.3..=1.0).contains(&i))
        .collect();

    if reasonable.is_empty() {
        return None;
    }

    reasonable.sort_by(|a, b| a.total_cmp(b));
    Some(60.0 / reasonable[reasonable.len() / 2])
}
