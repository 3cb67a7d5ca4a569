// craftwatch-core/src/repositories/sqlite/mod.rs

pub mod tracked_targets;
