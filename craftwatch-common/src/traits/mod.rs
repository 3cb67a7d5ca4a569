// File: craftwatch-common/src/traits/mod.rs
pub mod platform_traits;
pub mod repository_traits;
