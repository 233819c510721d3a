mod audio;
mod cli;
mod config;
mod error;
mod playback;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use audio::signal::Signal;
use audio::spectrum::FrameExtractor;
use cli::{Cli, View};
#[cfg(feature = "playback")]
use error::DeviceError;
use playback::clock::SystemClock;
use playback::control::{Command, KeyboardControls, NoControls};
use playback::device::{AudioDevice, SilentDevice};
use playback::scheduler::FrameScheduler;
use playback::seek::SeekReconciler;
use playback::session::Session;
use playback::transport::Transport;
use render::terminal::{format_time, TerminalSurface};
use render::RenderSurface;

/// Audio covered by one live frame.
const FRAME_SECONDS: f64 = 0.03;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Config: explicit --config path, or auto-detect sonosync.toml / global config
    let mut analysis_rate = config::default_analysis_rate();
    if let Some(path) = config::find_config(cli.config.as_deref()) {
        if let Some(cfg) = config::load_config(&path) {
            log::info!("Loaded config from {}", path.display());
            analysis_rate = cfg.playback.analysis_rate;
            cfg.merge_into(&mut cli);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }
    config::validate(&cli).context("Invalid settings")?;

    let input = &cli.input;
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    log::info!("sonosync - synchronized audio visualizer");
    log::info!("Input: {}", input.display());
    log::info!("View: {:?}, theme: {}", cli.view, cli.theme.name());

    // 1. Decode audio
    log::info!("Decoding audio...");
    let signal = audio::decode::decode_file(input)
        .with_context(|| format!("Failed to decode {}", input.display()))?;

    // 2. Dispatch on view
    match cli.view {
        View::Live => run_live(&cli, signal, analysis_rate),
        View::Waveform => {
            let img = render::image::waveform_image(&signal, cli.width, cli.height);
            render::image::save_png(&img, &output_path(&cli))
        }
        View::Spectrogram => {
            let spec = audio::stft::stft(&signal, cli.window);
            let img = render::image::spectrogram_image(&spec, cli.theme, cli.width, cli.height);
            render::image::save_png(&img, &output_path(&cli))
        }
        View::Surface => {
            let spec = audio::stft::stft(&signal, cli.window);
            render::surface::SurfaceGrid::from_spectrogram(&spec, cli.sensitivity)
                .write_json(&output_path(&cli))
        }
        View::Mood => print_mood(&signal, cli.json),
    }
}

fn output_path(cli: &Cli) -> PathBuf {
    cli.output
        .clone()
        .unwrap_or_else(|| PathBuf::from(cli.view.default_output().unwrap_or("output")))
}

fn run_live(cli: &Cli, signal: Signal, analysis_rate: u32) -> Result<()> {
    let duration = signal.duration();
    let signal = if signal.sample_rate() != analysis_rate {
        signal
            .resampled(analysis_rate)
            .context("Failed to resample audio for analysis")?
    } else {
        signal
    };

    let extractor = FrameExtractor::new(
        FrameExtractor::hop_for(analysis_rate, FRAME_SECONDS),
        cli.sensitivity,
    );
    let scheduler = FrameScheduler::new(extractor, &signal, Duration::from_millis(cli.interval_ms))
        .with_drift_tolerance(cli.seek_tolerance);

    let reconciler = SeekReconciler::new(cli.seek_tolerance);
    log::info!(
        "Live: {} frames over {}, seek tolerance {:.2}s",
        scheduler.total_frames(),
        format_time(duration),
        reconciler.tolerance()
    );

    let mut transport = Transport::new(SystemClock::new(), open_device(cli.mute), duration);
    transport.load(&cli.input);

    let interactive = std::io::stdin().is_terminal();
    if cli.paused && !interactive {
        log::warn!("--paused ignored: no terminal to resume from");
    }
    if cli.stay && !interactive {
        log::warn!("--stay ignored: no terminal to quit from");
    }

    let mut session = Session::new(transport, reconciler, scheduler, signal)
        .stay_after_end(cli.stay && interactive);
    if !cli.paused || !interactive {
        session.apply(Command::Play);
    }

    let title = cli
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut surface =
        TerminalSurface::new(&title, duration, cli.theme, TerminalSurface::fit_columns());

    let end = if interactive {
        let mut controls =
            KeyboardControls::new().context("Failed to enable terminal raw mode")?;
        surface.notice(KeyboardControls::help());
        session.run(&mut surface, &mut controls)
    } else {
        session.run(&mut surface, &mut NoControls)
    };
    let stopped_at = session.transport().position();
    session.apply(Command::Stop);

    log::info!("Session ended ({:?}) at {}", end, format_time(stopped_at));
    Ok(())
}

fn open_device(mute: bool) -> Box<dyn AudioDevice> {
    if mute {
        return Box::new(SilentDevice::new("muted"));
    }

    #[cfg(feature = "playback")]
    let device: Box<dyn AudioDevice> = match playback::device::RodioDevice::open() {
        Ok(device) => Box::new(device),
        Err(DeviceError::Unavailable(reason)) => Box::new(SilentDevice::new(reason)),
        Err(e) => Box::new(SilentDevice::new(e.to_string())),
    };
    #[cfg(not(feature = "playback"))]
    let device: Box<dyn AudioDevice> =
        Box::new(SilentDevice::new("built without the 'playback' feature"));

    device
}

fn print_mood(signal: &Signal, json: bool) -> Result<()> {
    let report = audio::mood::analyze(signal);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize mood report")?
        );
        return Ok(());
    }

    println!("Duration:  {}", format_time(report.duration as f64));
    println!("Loudness:  {:.4} RMS (peak {:.3})", report.rms, report.peak_amplitude);
    match report.tempo_bpm {
        Some(bpm) => println!("Tempo:     {:.1} BPM ({} onsets)", bpm, report.onsets),
        None => println!("Tempo:     n/a ({} onsets)", report.onsets),
    }
    println!("Mood:      {}", report.mood.label());
    Ok(())
}
