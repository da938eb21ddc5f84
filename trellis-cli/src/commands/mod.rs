//! Command handlers -- one module per subcommand

pub mod collect;
pub mod config;
