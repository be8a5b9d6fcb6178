mod commands;
mod logging;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pinscore", version)]
#[command(about = "Reports finished pinball games read over the machine's serial port")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config.json", env = "PINSCORE_CONFIG", global = true)]
    config: PathBuf,

    /// High score record
    #[arg(long, default_value = "scores.json", global = true)]
    scores: PathBuf,

    /// Append-only log file
    #[arg(long, default_value = "pintweet.log", global = true)]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Poll the machine and report finished games (default)
    Watch,
    /// Check the connection and print the current leading score once
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_file) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    info!("*** STARTUP ***");

    let result = match cli.command.unwrap_or(Command::Watch) {
        Command::Watch => commands::watch::run(&cli.config, &cli.scores),
        Command::Check => commands::check::run(&cli.config),
    };

    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    };

    info!("*** SHUTDOWN ***");
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["pinscore"]).unwrap();
        assert_eq!(cli.scores, PathBuf::from("scores.json"));
        assert_eq!(cli.log_file, PathBuf::from("pintweet.log"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_check_with_global_flags() {
        let cli =
            Cli::try_parse_from(["pinscore", "check", "--config", "bench.json"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Check)));
        assert_eq!(cli.config, PathBuf::from("bench.json"));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["pinscore", "tweet"]).is_err());
    }
}
