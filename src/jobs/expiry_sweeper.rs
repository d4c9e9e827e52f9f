use std::time::Duration;
use tokio::{task::JoinHandle, time};

use crate::store::CardStore;

/// Background job that reclaims memory held by expired cards
///
/// Reads already hide expired cards, so a sweep never changes what clients
/// see. The first sweep runs one full interval after startup.
pub fn spawn(store: CardStore, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            sweep(&store).await;
        }
    })
}

/// Runs a single eviction pass and returns the number of removed cards
pub async fn sweep(store: &CardStore) -> usize {
    let evicted = store.evict_expired().await;

    if evicted > 0 {
        let remaining = store.len().await;
        tracing::info!(evicted, remaining, "Evicted expired cards");
    } else {
        tracing::debug!("Expiry sweep found nothing to evict");
    }

    evicted
}
