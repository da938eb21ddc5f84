//! Trellis CLI library.
//!
//! This library exposes the command handlers for integration testing.
//! In production, `trellis` is used as a binary (main.rs).

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
