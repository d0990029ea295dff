//! Background task that periodically purges expired revocation entries.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use super::revocation::SharedRevocationRegistry;
use crate::domain::RevocationStore;
use crate::shared::shutdown::ShutdownSignal;

/// Start the revocation sweeper. Purges the in-memory registry and, when
/// given, the durable revocation list. Stops when `shutdown` fires.
pub fn start_revocation_sweeper(
    registry: SharedRevocationRegistry,
    durable: Option<Arc<dyn RevocationStore>>,
    shutdown: ShutdownSignal,
    check_interval_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            check_interval = check_interval_secs,
            durable = durable.is_some(),
            "Revocation sweeper started"
        );

        let mut interval = tokio::time::interval(Duration::from_secs(check_interval_secs.max(1)));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let purged = registry.purge_expired();
                    if purged > 0 {
                        debug!(purged, remaining = registry.revoked_count(), "Purged expired revocations");
                    }
                    if let Some(store) = &durable {
                        match store.purge_expired(registry.now()).await {
                            Ok(0) => {}
                            Ok(rows) => debug!(rows, "Purged expired revocation rows"),
                            Err(e) => warn!(error = %e, "Failed to purge revocation rows"),
                        }
                    }
                }
                _ = shutdown.notified().wait() => {
                    info!("Revocation sweeper shutting down");
                    break;
                }
            }
        }

        info!("Revocation sweeper stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    use super::*;
    use crate::application::session::RevocationRegistry;
    use crate::shared::{Clock, ManualClock};

    #[tokio::test]
    async fn sweeper_purges_and_stops_on_shutdown() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ));
        let registry = RevocationRegistry::shared(clock.clone());
        registry.revoke("t1", "alice", clock.now() + ChronoDuration::minutes(1));
        clock.advance(ChronoDuration::minutes(2));

        let shutdown = ShutdownSignal::new();
        let handle = start_revocation_sweeper(registry.clone(), None, shutdown.clone(), 1);

        // The first tick fires immediately.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(registry.revoked_count(), 0);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
