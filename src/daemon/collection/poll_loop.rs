use std::{any::Any, panic::AssertUnwindSafe, time::Duration};

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::{
    daemon::{
        session::{TickReport, TrackerSession},
        sync::RemoteStore,
    },
    sampler::{SampleOutcome, SamplerAdapter},
    utils::clock::Clock,
};

/// Time between two samples.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Drives a [TrackerSession] with samples at a fixed cadence until shutdown is requested.
pub struct PollLoop {
    sampler: SamplerAdapter,
    store: Box<dyn RemoteStore>,
    session: TrackerSession,
    shutdown: CancellationToken,
    poll_interval: Duration,
    time_provider: Box<dyn Clock>,
}

impl PollLoop {
    pub fn new(
        sampler: SamplerAdapter,
        store: Box<dyn RemoteStore>,
        session: TrackerSession,
        shutdown: CancellationToken,
        poll_interval: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            sampler,
            store,
            session,
            shutdown,
            poll_interval,
            time_provider,
        }
    }

    async fn tick(&mut self) -> TickReport {
        let sample = match self.sampler.sample() {
            SampleOutcome::Complete(sample) => sample,
            SampleOutcome::Degraded { sample, reasons } => {
                for reason in &reasons {
                    warn!("Degraded sample: {reason:#}");
                }
                sample
            }
        };
        debug!(
            "Sampled {:?}, idle for {}ms",
            sample.window_title, sample.idle_ms
        );

        let now = self.time_provider.time();
        self.session.tick(&sample, now, self.store.as_ref()).await
    }

    /// Executes the poll loop. A panic inside a tick is logged and the loop carries on with the
    /// next one.
    pub async fn run(mut self) {
        let mut deadline = self.time_provider.instant();
        loop {
            deadline += self.poll_interval;

            let tick = AssertUnwindSafe(self.tick())
                .catch_unwind()
                .instrument(info_span!("tick"))
                .await;
            match tick {
                Ok(report) => debug!("Tick finished {report:?}"),
                Err(panic) => error!("Tick aborted: {}", panic_message(panic.as_ref())),
            }

            // A tick blocked on the store can run past its slot. Start counting from now instead
            // of firing the missed ticks back to back.
            let now = self.time_provider.instant();
            if deadline < now {
                warn!("Tick overran the poll interval by {:?}", now - deadline);
                deadline = now;
            }

            let stopping = tokio::select! {
                _ = self.shutdown.cancelled() => true,
                _ = self.time_provider.sleep_until(deadline) => false,
            };
            if stopping {
                let now = self.time_provider.time();
                self.session.close(now, self.store.as_ref()).await;
                info!("Poll loop stopped");
                return;
            }
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
