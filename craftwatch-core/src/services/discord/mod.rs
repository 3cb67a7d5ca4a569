// File: craftwatch-core/src/services/discord/mod.rs

pub mod slashcommands;

pub mod event_service;

pub use event_service::DiscordEventService;
