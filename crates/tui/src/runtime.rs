//! Runtime: terminal lifecycle and the event loop.
//!
//! Terminal events arrive from the [`CrosstermListener`] thread over a Tokio
//! channel. Every key press is converted to a [`KeyPress`] and dispatched on
//! this task; the frame is redrawn after each handled event.

use std::any::Any;
use std::io::Stdout;
use std::panic::{self, PanicHookInfo};

use anyhow::Result;
use chordchain_util::UserPreferences;
use crossterm::{
    event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, prelude::CrosstermBackend};
use tokio::{signal, sync::mpsc};
use tracing::{error, info, warn};

use crate::dashboard::{Dashboard, HostAction, Region};
use crate::input::{CrosstermListener, key_press_from_event};
use crate::ui;

type DashboardTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<DashboardTerminal> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut DashboardTerminal) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Routes panic reports to tracing while the terminal is in raw mode and
/// puts the previous hook back on drop.
struct PanicLogGuard {
    previous: Option<PanicHook>,
}

impl PanicLogGuard {
    fn install() -> Self {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(|info| {
            let location = info.location().map(|location| location.to_string()).unwrap_or_default();
            error!(location = %location, message = %panic_message(info.payload()), "panic");
        }));
        Self { previous: Some(previous) }
    }
}

impl Drop for PanicLogGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            panic::set_hook(previous);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

fn is_force_quit(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release && key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Entry point: sets up the terminal, attaches the input listener, runs the
/// loop, then tears everything down again.
pub async fn run_dashboard(mut preferences: UserPreferences) -> Result<()> {
    let dashboard = Dashboard::new(&preferences);
    let (listener, mut input_receiver) = CrosstermListener::spawn()?;
    dashboard.dispatcher().attach_listener(Box::new(listener));

    let mut terminal = setup_terminal()?;
    let panic_guard = PanicLogGuard::install();
    info!(providers = dashboard.dispatcher().len(), "dashboard started");
    let outcome = event_loop(&mut terminal, &dashboard, &mut input_receiver).await;

    let overlay_open = dashboard.state().is_open(Region::Overlay);
    // The input thread exits once its sends start failing.
    drop(input_receiver);
    dashboard.shutdown();
    let cleanup = cleanup_terminal(&mut terminal);
    drop(panic_guard);
    cleanup?;

    if let Err(error) = preferences.set_show_debug_overlay(overlay_open) {
        warn!(error = %error, "failed to persist preferences");
    }
    outcome
}

async fn event_loop(terminal: &mut DashboardTerminal, dashboard: &Dashboard, input_receiver: &mut mpsc::Receiver<Event>) -> Result<()> {
    terminal.draw(|frame| ui::draw(frame, dashboard))?;

    loop {
        let event = tokio::select! {
            event = input_receiver.recv() => event,
            _ = signal::ctrl_c() => {
                info!("interrupt received; leaving dashboard");
                return Ok(());
            }
        };
        let Some(event) = event else {
            warn!("input channel closed; leaving dashboard");
            return Ok(());
        };

        match event {
            Event::Key(key) if is_force_quit(&key) => return Ok(()),
            Event::Key(key) => {
                let Some(key_press) = key_press_from_event(&key) else {
                    continue;
                };
                let (_, action) = dashboard.handle_key(&key_press).await;
                if action == HostAction::Quit {
                    return Ok(());
                }
            }
            Event::Resize(..) => {}
            _ => continue,
        }
        terminal.draw(|frame| ui::draw(frame, dashboard))?;
    }
}
