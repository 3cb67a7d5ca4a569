// craftwatch-core/src/platforms/discord/mod.rs

pub mod publisher;
pub mod runtime;

pub use publisher::DiscordPublisher;
pub use runtime::{DiscordEvent, DiscordPlatform};
