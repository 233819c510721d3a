use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

/// Seconds moved by the arrow keys.
pub const SEEK_STEP: f64 = 5.0;

/// User transport actions. Each maps onto exactly one transport transition
/// (seeks go through the reconciler).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Play,
    Pause,
    TogglePause,
    Stop,
    SeekTo(f64),
    SeekBy(f64),
    Quit,
}

/// Polled between scheduler ticks. Must not block.
pub trait ControlSource {
    fn poll(&mut self) -> Vec<Command>;

    /// Whether a user can send commands through this source at all.
    fn is_interactive(&self) -> bool {
        true
    }
}

/// No interactive input; the session runs unattended.
pub struct NoControls;

impl ControlSource for NoControls {
    fn poll(&mut self) -> Vec<Command> {
        Vec::new()
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Keyboard transport controls read from the terminal in raw mode.
///
/// Raw mode is restored when dropped.
pub struct KeyboardControls {
    _private: (),
}

impl KeyboardControls {
    pub fn new() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self { _private: () })
    }

    pub fn help() -> &'static str {
        "space play/pause | l play | p pause | s stop | ←/→ seek 5s | home restart | q quit"
    }
}

impl ControlSource for KeyboardControls {
    fn poll(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    log::debug!("Input poll failed: {}", e);
                    break;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if let Some(cmd) = map_key(key.code, key.modifiers) {
                        commands.push(cmd);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log::debug!("Input read failed: {}", e);
                    break;
                }
            }
        }
        commands
    }
}

impl Drop for KeyboardControls {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Option<Command> {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    match code {
        KeyCode::Char(' ') => Some(Command::TogglePause),
        KeyCode::Char('l') | KeyCode::Enter => Some(Command::Play),
        KeyCode::Char('p') => Some(Command::Pause),
        KeyCode::Char('s') => Some(Command::Stop),
        KeyCode::Left => Some(Command::SeekBy(-SEEK_STEP)),
        KeyCode::Right => Some(Command::SeekBy(SEEK_STEP)),
        KeyCode::Home => Some(Command::SeekTo(0.0)),
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_bindings() {
        let none = KeyModifiers::NONE;
        assert_eq!(map_key(KeyCode::Char(' '), none), Some(Command::TogglePause));
        assert_eq!(map_key(KeyCode::Enter, none), Some(Command::Play));
        assert_eq!(map_key(KeyCode::Char('s'), none), Some(Command::Stop));
        assert_eq!(map_key(KeyCode::Left, none), Some(Command::SeekBy(-5.0)));
        assert_eq!(map_key(KeyCode::Home, none), Some(Command::SeekTo(0.0)));
        assert_eq!(map_key(KeyCode::Char('x'), none), None);
    }

    #[test]
    fn ctrl_c_quits() {
        assert_eq!(
            map_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Command::Quit)
        );
        assert_eq!(map_key(KeyCode::Char('c'), KeyModifiers::NONE), None);
    }

    #[test]
    fn no_controls_is_silent() {
        assert!(NoControls.poll().is_empty());
        assert!(!NoControls.is_interactive());
    }
}
