use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use trellis_cli::cli::{Cli, Commands};
use trellis_cli::commands;
use trellis_cli::logging::init_tracing;
use trellis_cli::output::OutputWriter;
use trellis_core::config::{GeneralConfig, TrellisConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 로깅 설정만 먼저 읽음; 설정 에러는 각 명령이 보고
    let mut general = TrellisConfig::load_or_default(&cli.config)
        .await
        .map(|config| config.general)
        .unwrap_or_else(|_| GeneralConfig::default());
    if let Some(ref level) = cli.log_level {
        general.log_level = level.clone();
    }
    if let Err(e) = init_tracing(&general) {
        eprintln!("{} {}", "warning:".yellow().bold(), e);
    }

    trellis_core::metrics::describe_all();
    tracing::debug!(config = %cli.config.display(), "trellis starting");

    let writer = OutputWriter::new(cli.output);
    let result = match cli.command {
        Commands::Collect(args) => commands::collect::execute(args, &cli.config, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}
