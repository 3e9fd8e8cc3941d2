//! Subcommand implementations.

pub mod annotate;
pub mod config;
pub mod models;
pub mod score;
pub mod setup;
pub mod types;
