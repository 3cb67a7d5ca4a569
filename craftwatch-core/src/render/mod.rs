// craftwatch-core/src/render/mod.rs

pub mod embed;
pub mod motd;

pub use embed::Renderer;
