mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;
use smcprims_channel::DEFAULT_SERVICE_NAME;
use smcprims_client::SessionConfig;

use crate::cmd::{Command, Context};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "smcprims", version, about = "Apple SMC sensors and fans")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Serve requests from a simulated SMC snapshot (JSON) instead of the driver.
    #[arg(long, value_name = "FILE", env = "SMCPRIMS_SIM", global = true)]
    sim: Option<PathBuf>,

    /// IOService name of the SMC driver.
    #[arg(long, value_name = "NAME", env = "SMCPRIMS_SERVICE", default_value = DEFAULT_SERVICE_NAME, global = true)]
    service: String,

    /// Key catalog file (JSON). Default: built-in catalog.
    #[arg(long, value_name = "FILE", env = "SMCPRIMS_CATALOG", global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn context(&self) -> Context {
        let mut session = SessionConfig::default().with_service_name(&self.service);
        if let Some(path) = &self.sim {
            session = session.with_simulation(path);
        }
        Context {
            session,
            catalog: self.catalog.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let ctx = cli.context();
    let result = cmd::run(cli.command, &ctx, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_write_subcommand() {
        let cli = Cli::try_parse_from([
            "smcprims", "write", "F0Mn", "--type", "fpe2", "--value", "1200",
        ])
        .expect("write args should parse");

        assert!(matches!(cli.command, Command::Write(_)));
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "smcprims", "write", "F0Mn", "--type", "fpe2", "--value", "1200", "--hex", "12c0",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn write_requires_a_payload() {
        let err = Cli::try_parse_from(["smcprims", "write", "F0Mn", "--type", "fpe2"])
            .expect_err("missing payload should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn global_flags_build_context() {
        let cli = Cli::try_parse_from([
            "smcprims",
            "temps",
            "--unit",
            "f",
            "--sim",
            "/tmp/smc.json",
            "--service",
            "AppleSMCKeysEndpoint",
        ])
        .expect("temps args should parse");

        let ctx = cli.context();
        assert_eq!(ctx.session.service_name, "AppleSMCKeysEndpoint");
        assert_eq!(ctx.session.simulation, Some(PathBuf::from("/tmp/smc.json")));
        assert!(matches!(cli.command, Command::Temps(_)));
    }

    #[test]
    fn parses_fan_min_positionals() {
        let cli = Cli::try_parse_from(["smcprims", "fan-min", "1", "2000"])
            .expect("fan-min args should parse");
        match cli.command {
            Command::FanMin(args) => {
                assert_eq!(args.index, 1);
                assert_eq!(args.rpm, 2000);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
