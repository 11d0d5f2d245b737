//! Subcommand implementations.

pub mod config;
pub mod ingest;
pub mod parse;
