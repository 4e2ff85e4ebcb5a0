//! dirwatch CLI - run a command when files in the current directory change

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{info, Level};
use watcher::{EventKind, HandlerMap, WatchConfig, Watcher};

pub mod shell;

pub use shell::ShellCommand;

/// Directory watched by the binary
pub const WATCH_ROOT: &str = ".";

/// Run a command whenever a file in the current directory changes
#[derive(Parser, Debug)]
#[command(name = "dirwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Kind of change to react to
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Executable in the current directory, run as `./<COMMAND> <file-name>`
    pub command: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log level selected by `-v` flags
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// Event kind as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    #[value(name = "CREATE")]
    Create,
    #[value(name = "MODIFY")]
    Modify,
    #[value(name = "DELETE")]
    Delete,
}

impl From<KindArg> for EventKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Create => EventKind::Create,
            KindArg::Modify => EventKind::Modify,
            KindArg::Delete => EventKind::Delete,
        }
    }
}

/// Watch the current directory and run the command until stopped
pub fn run(cli: Cli) -> Result<()> {
    let kind = EventKind::from(cli.kind);
    let handlers = HandlerMap::new().on(kind, ShellCommand::new(&cli.command));

    let mut watcher =
        Watcher::new(handlers, WatchConfig::default()).context("Failed to start file watcher")?;
    watcher
        .watch_directory(WATCH_ROOT)
        .context("Failed to watch current directory")?;

    let stop = watcher.stop_handle();
    ctrlc::set_handler(move || stop.stop()).context("Failed to install signal handler")?;

    info!("Watching {} for {} events", WATCH_ROOT, kind);
    watcher.run().context("Watch loop failed")?;
    info!("Stopped");
    Ok(())
}
