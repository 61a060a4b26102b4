//! EDITS CLI - Command-line interface for EDITS network metadata
//!
//! This crate provides the CLI application that ties together all EDITS components.

pub mod config;

pub use config::{Command, Config, OutputFormat};
