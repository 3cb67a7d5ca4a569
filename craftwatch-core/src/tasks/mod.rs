// craftwatch-core/src/tasks/mod.rs

pub mod status_refresh;

pub use status_refresh::RefreshScheduler;
