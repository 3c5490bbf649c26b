//! `resgen` command line.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod commands;

/// Crates whose log level `RESGEN_LOG` controls when given a plain level.
const LOG_TARGETS: [&str; 3] = ["resgen_cli", "resgen_core", "resgen_model"];

#[derive(Parser, Debug)]
#[command(
    name = "resgen",
    version,
    about = "Generate annotated Java resource interfaces from REST API descriptions"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate interface sources
    Generate(commands::generate::GenerateArgs),
    /// Validate an API description without writing anything
    Check(commands::check::CheckArgs),
}

/// Parse `args` (program name first) and run the selected command.
///
/// Returns the process exit code.
pub fn run_cli(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => {
                init_tracing();
                commands::generate::run(args)
            }
            Some(Commands::Check(args)) => {
                init_tracing();
                commands::check::run(args)
            }
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

fn init_tracing() {
    // RESGEN_LOG: "trace", "debug", "info", "warn", "error",
    // or a full filter spec like "resgen_core=trace,resgen_cli=info"
    let filter = match std::env::var("RESGEN_LOG") {
        Ok(level) if is_plain_level(&level) => level_filter(&level),
        Ok(spec) => spec,
        Err(_) => level_filter("info"),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    // Repeated runs in one process keep the first subscriber.
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

fn level_filter(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_covers_all_crates() {
        assert_eq!(
            level_filter("debug"),
            "resgen_cli=debug,resgen_core=debug,resgen_model=debug"
        );
    }

    #[test]
    fn test_is_plain_level() {
        assert!(is_plain_level("WARN"));
        assert!(!is_plain_level("resgen_core=trace"));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_unknown_subcommand_is_usage_error() {
        assert_eq!(run_cli(vec!["resgen".into(), "frobnicate".into()]), 2);
    }
}
