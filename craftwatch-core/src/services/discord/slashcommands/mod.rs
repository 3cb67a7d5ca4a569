// File: craftwatch-core/src/services/discord/slashcommands/mod.rs

pub mod track;
