//! Terminal key input: the crossterm subscription and event conversion.
//!
//! A dedicated OS thread owns `crossterm::event::poll`/`read` and forwards
//! events over a Tokio channel, so the UI task never blocks on the terminal.
//! The thread is the dispatcher's [`InputListener`]; detaching it stops the
//! thread and closes the channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use chordchain_engine::{InputListener, KeyPress, Modifiers};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(16);
const CHANNEL_CAPACITY: usize = 500;

/// Converts a crossterm key event into the dispatcher's [`KeyPress`].
///
/// Releases are ignored, as are keys with no stable name (media keys, bare
/// modifier presses). Shift is folded into printable characters, which
/// already carry their case, and `BackTab` becomes `Shift+Tab`.
pub fn key_press_from_event(key: &KeyEvent) -> Option<KeyPress> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let mut modifiers = Modifiers {
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        meta: key.modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
    };

    let name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => {
            modifiers.shift = false;
            c.to_string()
        }
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => {
            modifiers.shift = true;
            "Tab".to_string()
        }
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => return None,
    };

    Some(KeyPress::new(name, modifiers))
}

/// Background thread forwarding terminal events to the UI task.
#[derive(Debug)]
pub struct CrosstermListener {
    stop: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl CrosstermListener {
    /// Spawns the input thread and returns it with the receiving end of its channel.
    pub fn spawn() -> Result<(Self, mpsc::Receiver<Event>)> {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let join_handle = std::thread::Builder::new()
            .name("chordchain-input".to_string())
            .spawn(move || run_input_loop(sender, thread_stop))
            .context("failed to spawn input thread")?;

        Ok((
            Self {
                stop,
                join_handle: Some(join_handle),
            },
            receiver,
        ))
    }

    pub fn is_running(&self) -> bool {
        !self.stop.load(Ordering::Relaxed)
    }
}

impl InputListener for CrosstermListener {
    fn detach(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take()
            && handle.join().is_err()
        {
            warn!("input thread panicked before detaching");
        }
        debug!("terminal input listener detached");
    }
}

impl Drop for CrosstermListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn run_input_loop(sender: mpsc::Sender<Event>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Relaxed) {
        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(error) => {
                warn!(error = %error, "failed to poll terminal input");
                break;
            }
        }
        match event::read() {
            Ok(event) => {
                if let Err(error) = sender.blocking_send(event) {
                    warn!(error = %error, "failed to forward terminal event");
                    break;
                }
            }
            Err(error) => {
                warn!(error = %error, "failed to read terminal event");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn escape_maps_to_plain_escape_chord() {
        let press = key_press_from_event(&key(KeyCode::Esc, KeyModifiers::NONE)).unwrap();
        assert_eq!(press.chord().as_str(), "Escape");
    }

    #[test]
    fn control_characters_keep_modifier_order() {
        let press = key_press_from_event(&key(KeyCode::Char('k'), KeyModifiers::CONTROL | KeyModifiers::ALT)).unwrap();
        assert_eq!(press.chord().as_str(), "Ctrl+Alt+k");
    }

    #[test]
    fn shift_is_folded_into_characters() {
        let press = key_press_from_event(&key(KeyCode::Char('K'), KeyModifiers::SHIFT)).unwrap();
        assert_eq!(press.chord().as_str(), "K");
    }

    #[test]
    fn back_tab_becomes_shift_tab() {
        let press = key_press_from_event(&key(KeyCode::BackTab, KeyModifiers::SHIFT)).unwrap();
        assert_eq!(press.chord().as_str(), "Shift+Tab");
    }

    #[test]
    fn named_keys_and_function_keys() {
        let up = key_press_from_event(&key(KeyCode::Up, KeyModifiers::SHIFT)).unwrap();
        assert_eq!(up.chord().as_str(), "Shift+ArrowUp");
        let f5 = key_press_from_event(&key(KeyCode::F(5), KeyModifiers::SUPER)).unwrap();
        assert_eq!(f5.chord().as_str(), "Meta+F5");
        let space = key_press_from_event(&key(KeyCode::Char(' '), KeyModifiers::NONE)).unwrap();
        assert_eq!(space.chord().as_str(), "Space");
    }

    #[test]
    fn releases_and_unnamed_keys_are_ignored() {
        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Esc,
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert!(key_press_from_event(&release).is_none());
        assert!(key_press_from_event(&key(KeyCode::Null, KeyModifiers::NONE)).is_none());
    }
}
