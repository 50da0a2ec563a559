use std::future::pending;

use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Waits for Ctrl-C, or SIGTERM on unix, and cancels the token.
///
/// A detached Windows process never receives Ctrl-C, so there the daemon only stops when the
/// process is killed.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Can't listen for Ctrl-C {e:?}");
            pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                warn!("Can't listen for SIGTERM {e:?}");
                pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = pending::<()>();

    select! {
        _ = interrupt => info!("Received Ctrl-C"),
        _ = terminate => info!("Received termination signal"),
    };
    cancelation.cancel();
}
