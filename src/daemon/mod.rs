use anyhow::Result;
use collection::{
    afk::AfkEvaluator,
    poll_loop::{POLL_INTERVAL, PollLoop},
};
use config::TrackerConfig;
use session::TrackerSession;
use sync::{RemoteStore, gateway::RestGateway};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    sampler::{ActivitySampler, GenericSampler, SamplerAdapter},
    utils::clock::{Clock, DefaultClock},
};

pub mod args;
pub mod classifier;
pub mod collection;
pub mod config;
pub mod session;
pub mod shutdown;
pub mod sync;

/// Represents the starting point for the daemon
pub async fn start_daemon(config: TrackerConfig) -> Result<()> {
    let sampler = GenericSampler::new()?;
    let gateway = RestGateway::new(&config.store_url, &config.store_key)?;

    let shutdown_token = CancellationToken::new();

    let poll_loop = create_poll_loop(
        &config,
        sampler,
        gateway,
        &shutdown_token,
        DefaultClock,
    );

    info!("Tracking activity of {}", config.engineer_id);
    tokio::join!(
        shutdown::detect_shutdown(shutdown_token),
        poll_loop.run(),
    );

    Ok(())
}

fn create_poll_loop(
    config: &TrackerConfig,
    sampler: impl ActivitySampler + 'static,
    store: impl RemoteStore + 'static,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
) -> PollLoop {
    let session = TrackerSession::new(
        config.engineer_id.clone(),
        AfkEvaluator::default(),
        clock.time(),
    );
    PollLoop::new(
        SamplerAdapter::new(Box::new(sampler)),
        Box::new(store),
        session,
        shutdown_token.clone(),
        POLL_INTERVAL,
        Box::new(clock),
    )
}
