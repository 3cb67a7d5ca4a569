// craftwatch-core/src/platforms/mcstatus/mod.rs

pub mod client;

pub use client::McStatusClient;
