// craftwatch-core/src/lib.rs

pub mod db;
pub mod platforms;
pub mod render;
pub mod repositories;
pub mod services;
pub mod tasks;

pub use craftwatch_common::Error;
pub use db::Database;
