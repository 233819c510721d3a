use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::theme::Theme;
use super::RenderSurface;
use crate::audio::spectrum::RenderFrame;

/// Block glyphs from empty to full, one per eighth of a cell.
const LEVELS: [&str; 9] = [" ", "▁", "▂", "▃", "▄", "▅", "▆", "▇", "█"];
const IDLE_GRAY: [u8; 3] = [90, 90, 90];

/// Live spectrum drawn on a single terminal line: status and clock in the
/// prefix, colored block bars in the message.
pub struct TerminalSurface {
    bar: ProgressBar,
    theme: Theme,
    columns: usize,
}

impl TerminalSurface {
    pub fn new(title: &str, duration: f64, theme: Theme, columns: usize) -> Self {
        let bar = ProgressBar::with_draw_target(
            Some((duration * 1000.0).max(0.0) as u64),
            ProgressDrawTarget::stderr_with_hz(40),
        );
        let style = ProgressStyle::with_template("{prefix} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.println(format!("♪ {}", title));
        Self {
            bar,
            theme,
            columns: columns.max(1),
        }
    }

    /// Width that leaves room for the status prefix on the current terminal.
    pub fn fit_columns() -> usize {
        match crossterm::terminal::size() {
            Ok((cols, _)) => (cols as usize).saturating_sub(24).clamp(8, 100),
            Err(_) => 64,
        }
    }

    fn status(&self, glyph: char, time: f64, duration: f64) {
        self.bar.set_position((time * 1000.0).max(0.0) as u64);
        self.bar.set_prefix(format!(
            "{} {} / {}",
            glyph,
            format_time(time),
            format_time(duration)
        ));
    }
}

impl RenderSurface for TerminalSurface {
    fn draw(&mut self, frame: &RenderFrame, time: f64, duration: f64) {
        self.status('▶', time, duration);
        let levels = pool(&frame.bins, self.columns);
        let mut line = String::with_capacity(levels.len() * 24);
        for v in levels {
            line.push_str(&colored(self.theme.color(v), glyph(v)));
        }
        line.push_str("\x1b[0m");
        self.bar.set_message(line);
    }

    fn draw_silent(&mut self, time: f64, duration: f64) {
        self.status('⏸', time, duration);
        let line = LEVELS[1].repeat(self.columns);
        self.bar.set_message(colored(IDLE_GRAY, &line) + "\x1b[0m");
    }

    fn finish(&mut self) {
        let total = self.bar.length().unwrap_or(0) as f64 / 1000.0;
        self.bar.set_prefix(format!("■ {}", format_time(total)));
        self.bar.finish_with_message("Playback complete");
    }

    fn notice(&mut self, message: &str) {
        self.bar.println(format!("⚠ {}", message));
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

/// `mm:ss`, or `h:mm:ss` past the hour.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() { seconds.max(0.0) as u64 } else { 0 };
    if total >= 3600 {
        format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
    } else {
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}

/// Max-pool `bins` down (or repeat up) to exactly `columns` values.
fn pool(bins: &[f32], columns: usize) -> Vec<f32> {
    if bins.is_empty() {
        return vec![0.0; columns];
    }
    (0..columns)
        .map(|c| {
            let start = c * bins.len() / columns;
            let end = ((c + 1) * bins.len() / columns).max(start + 1).min(bins.len());
            bins[start..end]
                .iter()
                .copied()
                .fold(0.0f32, f32::max)
        })
        .collect()
}

fn glyph(level: f32) -> &'static str {
    let idx = (level.clamp(0.0, 1.0) * (LEVELS.len() - 1) as f32).round() as usize;
    LEVELS[idx]
}

fn colored(rgb: [u8; 3], text: &str) -> String {
    format!("\x1b[38;2;{};{};{}m{}", rgb[0], rgb[1], rgb[2], text)
}
