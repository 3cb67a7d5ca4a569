// craftwatch-core/src/services/mod.rs

pub mod discord;
pub mod refresh;

pub use refresh::RefreshEngine;
