// This runs the tracker on windows without creating a console. Disable during development to see
// stdout.
#![cfg_attr(feature = "win", windows_subsystem = "windows")]

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use dectracker::{
    daemon::{
        args::DaemonArgs,
        config::{CONFIG_FILE_NAME, TrackerConfig},
        start_daemon,
    },
    utils::{
        dir::create_application_default_path,
        logging::{DAEMON_PREFIX, enable_logging},
    },
};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = DaemonArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Tracker stopped {e:?}");
            eprintln!("dectracker: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: DaemonArgs) -> Result<()> {
    let app_dir = args.dir.map_or_else(create_application_default_path, Ok)?;
    enable_logging(DAEMON_PREFIX, &app_dir, args.log, args.log_console)?;

    let config_path = args.config.unwrap_or_else(|| app_dir.join(CONFIG_FILE_NAME));
    let config = TrackerConfig::load(&config_path)?;
    info!("Loaded configuration from {config_path:?}");

    single_thread_runtime()?.block_on(start_daemon(config))
}

/// All ticks run on one thread, the loop never needs more.
fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
