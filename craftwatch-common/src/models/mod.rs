// File: craftwatch-common/src/models/mod.rs
pub mod notification;
pub mod status;
pub mod tracker;

pub use notification::{ImageAsset, NotificationPayload, StatusSummary};
pub use status::StatusSnapshot;
pub use tracker::{ServerKind, TrackedKey, TrackedTarget};
