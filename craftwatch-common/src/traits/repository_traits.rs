// File: craftwatch-common/src/traits/repository_traits.rs

use async_trait::async_trait;

use crate::error::Error;
use crate::models::tracker::{TrackedKey, TrackedTarget};

/// Durable registry of tracked status messages.
///
/// Every key returned by `all()` is attempted on every refresh cycle;
/// entries only disappear through an explicit `delete` (or a `rekey`
/// replacing the stale message id).
#[async_trait]
pub trait TrackerRepository: Send + Sync {
    /// Insert or overwrite the target stored under `key`.
    async fn set(&self, key: &TrackedKey, target: &TrackedTarget) -> Result<(), Error>;

    async fn get(&self, key: &TrackedKey) -> Result<Option<TrackedTarget>, Error>;

    async fn delete(&self, key: &TrackedKey) -> Result<(), Error>;

    /// Every tracked entry, in storage order.
    async fn all(&self) -> Result<Vec<(TrackedKey, TrackedTarget)>, Error>;

    /// Atomically replace `old` with `new`, keeping the stored target.
    /// After this call the old key no longer resolves.
    async fn rekey(&self, old: &TrackedKey, new: &TrackedKey) -> Result<(), Error>;
}
