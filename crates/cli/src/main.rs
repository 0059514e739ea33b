use std::path::PathBuf;

use anyhow::{Context, Result};
use chordchain_engine::Chord;
use chordchain_tui::{Dashboard, Region};
use chordchain_util::{LogTarget, UserPreferences, expand_tilde, init_tracing};
use clap::{Args, Parser, Subcommand};
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "chordchain", version, about = "Keyboard shortcut dashboard and dispatch diagnostics")]
struct Cli {
    /// Preferences file (defaults to ~/.config/chordchain/preferences.json).
    #[arg(long, global = true, value_name = "PATH")]
    preferences: Option<String>,

    /// Tracing filter directive, e.g. `debug` or `chordchain_engine=trace`.
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the canonical form of a chord such as `shift+ctrl+k`.
    Normalize { text: String },
    /// Dispatch one chord against the dashboard regions and print the result as JSON.
    Dispatch(ChordArgs),
    /// Print the participants for a chord as JSON.
    Debug(ChordArgs),
}

#[derive(Debug, Args)]
struct ChordArgs {
    chord: String,
    /// Regions to open before dispatching: modal, nav, menu, overlay.
    #[arg(long, value_delimiter = ',')]
    state: Vec<String>,
}

impl ChordArgs {
    fn chord(&self) -> Result<Chord> {
        self.chord.parse().with_context(|| format!("invalid chord '{}'", self.chord))
    }

    fn regions(&self) -> Result<Vec<Region>> {
        self.state.iter().filter(|name| !name.trim().is_empty()).map(|name| name.parse()).collect()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let target = match cli.command {
        None => LogTarget::default_file(),
        Some(_) => LogTarget::Stderr,
    };
    init_tracing(cli.log_level.as_deref(), target).context("failed to initialise logging")?;
    let preferences = load_preferences(preferences_path(&cli));

    // No subcommand => TUI
    let Some(command) = cli.command else {
        return chordchain_tui::run(preferences).await;
    };

    match command {
        Command::Normalize { text } => {
            let chord: Chord = text.parse().with_context(|| format!("invalid chord '{text}'"))?;
            println!("{chord}");
        }
        Command::Dispatch(args) => {
            let dashboard = headless_dashboard(&preferences, &args)?;
            let (result, _) = dashboard.handle_chord(&args.chord()?).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Debug(args) => {
            let dashboard = headless_dashboard(&preferences, &args)?;
            let info = dashboard.dispatcher().debug_info(&args.chord()?);
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }
    Ok(())
}

fn headless_dashboard(preferences: &UserPreferences, args: &ChordArgs) -> Result<Dashboard> {
    let dashboard = Dashboard::new(preferences);
    dashboard.open_regions(&args.regions()?);
    Ok(dashboard)
}

fn preferences_path(cli: &Cli) -> Option<PathBuf> {
    cli.preferences.as_deref().map(expand_tilde)
}

fn load_preferences(path: Option<PathBuf>) -> UserPreferences {
    let loaded = match path {
        Some(path) => UserPreferences::load_from(path),
        None => UserPreferences::new(),
    };
    loaded.unwrap_or_else(|error| {
        warn!(error = %error, "failed to load preferences; using in-memory defaults");
        UserPreferences::ephemeral()
    })
}
