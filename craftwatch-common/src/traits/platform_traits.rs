// File: craftwatch-common/src/traits/platform_traits.rs

use async_trait::async_trait;

use crate::error::Error;
use crate::models::notification::NotificationPayload;
use crate::models::status::StatusSnapshot;
use crate::models::tracker::ServerKind;

/// One timed remote status query. No caching, no internal retry; the
/// refresh engine owns the (deliberately absent) retry policy.
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    async fn fetch(&self, address: &str, kind: ServerKind) -> Result<StatusSnapshot, Error>;
}

/// Create/edit operations on a channel's message surface. `edit` reports a
/// deleted target message as `Error::NotFound`; every other failure is an
/// ordinary error the caller may retry on a later cycle.
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Publish a new status message; returns the new message id.
    async fn create(&self, channel_id: &str, payload: &NotificationPayload)
        -> Result<String, Error>;

    async fn edit(
        &self,
        channel_id: &str,
        message_id: &str,
        payload: &NotificationPayload,
    ) -> Result<(), Error>;
}
