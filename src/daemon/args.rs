use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

/// The daemon needs no arguments. Everything here is for diagnosing a running installation.
#[derive(Parser, Debug)]
#[command(name = "dectracker", version, about = "Tracks work and break time in the background")]
pub struct DaemonArgs {
    /// Application directory holding logs and `config.json`. Defaults to $APPDATA/dectracker on
    /// Windows and $XDG_STATE_HOME/dectracker or $HOME/.local/state/dectracker elsewhere.
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Configuration file to use instead of `<dir>/config.json`.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
}
