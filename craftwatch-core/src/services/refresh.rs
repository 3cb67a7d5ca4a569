// craftwatch-core/src/services/refresh.rs
//
// The tracked-target refresh engine. One cycle walks the registry in
// order and, for each entry: fetches the server status, renders it, and
// reconciles the published message. The per-entry outcomes are:
//
//   - fetch failed        => entry evicted from the registry, no publish
//   - edit succeeded      => entry unchanged
//   - edit returned 404   => message recreated, entry rekeyed to the new id
//   - other publish error => entry retained, retried next cycle
//
// Eviction on any fetch error (including a single dropped packet) is
// intentional; a fresh registration recreates the tracker.

use std::sync::Arc;

use chrono::Local;
use tracing::{error, info, warn};

use craftwatch_common::Error;
use craftwatch_common::models::tracker::{ServerKind, TrackedKey, TrackedTarget};
use craftwatch_common::traits::platform_traits::{NotificationPublisher, StatusFetcher};
use craftwatch_common::traits::repository_traits::TrackerRepository;

use crate::render::Renderer;

/// What a cycle did with one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Existing message edited in place; key unchanged.
    Updated,
    /// Message was gone; a new one was created and the entry rekeyed.
    Recreated(TrackedKey),
    /// Fetch failed; entry removed from the registry.
    Evicted,
}

pub struct RefreshEngine {
    repo: Arc<dyn TrackerRepository>,
    fetcher: Arc<dyn StatusFetcher>,
    renderer: Arc<Renderer>,
    publisher: Arc<dyn NotificationPublisher>,
}

impl RefreshEngine {
    pub fn new(
        repo: Arc<dyn TrackerRepository>,
        fetcher: Arc<dyn StatusFetcher>,
        renderer: Arc<Renderer>,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self {
            repo,
            fetcher,
            renderer,
            publisher,
        }
    }

    /// One full pass over the registry. Entries are processed strictly
    /// sequentially; a failing entry never stops the rest of the cycle.
    pub async fn refresh_all(&self) -> Result<(), Error> {
        info!("Refreshing all tracked messages...");
        let entries = self.repo.all().await?;

        for (key, target) in entries {
            match self.refresh_entry(&key, &target).await {
                Ok(RefreshOutcome::Updated) => {
                    info!("Refreshed status for {}", target.address);
                }
                Ok(RefreshOutcome::Recreated(new_key)) => {
                    info!(
                        "Recreated status message for {} ({} => {})",
                        target.address, key.message_id, new_key.message_id
                    );
                }
                Ok(RefreshOutcome::Evicted) => {
                    warn!(
                        "Evicted tracker {} for {}: status fetch failed",
                        key, target.address
                    );
                }
                Err(e) => {
                    // Retained; retried on the next cycle.
                    error!("Error refreshing {} ({}): {}", target.address, key, e);
                }
            }
        }
        Ok(())
    }

    /// Drive one entry through fetch -> render -> publish.
    pub async fn refresh_entry(
        &self,
        key: &TrackedKey,
        target: &TrackedTarget,
    ) -> Result<RefreshOutcome, Error> {
        let snapshot = match self.fetcher.fetch(&target.address, target.kind).await {
            Ok(s) => s,
            Err(e) => {
                warn!("Status fetch failed for {}: {}", target.address, e);
                self.repo.delete(key).await?;
                return Ok(RefreshOutcome::Evicted);
            }
        };

        let payload = self
            .renderer
            .render(&snapshot, &target.address, target.kind, Local::now());

        match self
            .publisher
            .edit(&key.channel_id, &key.message_id, &payload)
            .await
        {
            Ok(()) => Ok(RefreshOutcome::Updated),
            Err(Error::NotFound(_)) => {
                info!("Message not found for {}, sending new one", target.address);
                let new_message_id = self.publisher.create(&key.channel_id, &payload).await?;
                let new_key = key.with_message_id(&new_message_id);
                self.repo.rekey(key, &new_key).await?;
                Ok(RefreshOutcome::Recreated(new_key))
            }
            Err(e) => Err(e),
        }
    }

    /// Registration path: fetch and publish immediately, then persist the
    /// new tracker. Fetch and publish errors propagate to the caller so
    /// the registration can be acknowledged as failed; nothing is stored
    /// in that case.
    pub async fn track_new(
        &self,
        guild_id: &str,
        channel_id: &str,
        address: &str,
        kind: ServerKind,
    ) -> Result<TrackedKey, Error> {
        let snapshot = self.fetcher.fetch(address, kind).await?;
        let payload = self.renderer.render(&snapshot, address, kind, Local::now());
        let message_id = self.publisher.create(channel_id, &payload).await?;

        let key = TrackedKey::new(guild_id, channel_id, &message_id);
        let target = TrackedTarget {
            address: address.to_string(),
            kind,
        };
        self.repo.set(&key, &target).await?;
        info!("Now tracking {} in channel {}", address, channel_id);
        Ok(key)
    }
}
