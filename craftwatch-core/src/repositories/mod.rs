// craftwatch-core/src/repositories/mod.rs

pub mod sqlite;

pub use sqlite::tracked_targets::SqliteTrackerRepository;
