use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use smcprims_client::{KeyCatalog, SessionConfig, SystemSmc};
use smcprims_codec::TemperatureUnit;

use crate::exit::{catalog_error, smc_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod doctor;
pub mod fan_min;
pub mod fans;
pub mod keys;
pub mod power;
pub mod read;
pub mod temps;
pub mod version;
pub mod watch;
pub mod write;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read one key and print its type, size, and value.
    Read(ReadArgs),
    /// Write one key after checking its type and size.
    Write(WriteArgs),
    /// Print the temperature probes that are present.
    Temps(TempsArgs),
    /// Print fan speeds.
    Fans(FansArgs),
    /// Set a fan's minimum speed (requires root).
    FanMin(FanMinArgs),
    /// Print power and drive flags.
    Power(PowerArgs),
    /// List the keys the SMC exposes.
    Keys(KeysArgs),
    /// Poll temperatures and fan speeds until interrupted.
    Watch(WatchArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Where commands find the SMC and the key catalog.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub session: SessionConfig,
    pub catalog: Option<PathBuf>,
}

impl Context {
    pub fn open(&self) -> CliResult<SystemSmc> {
        smcprims_client::open(&self.session).map_err(|err| smc_error("open SMC", err))
    }

    pub fn catalog(&self) -> CliResult<KeyCatalog> {
        match &self.catalog {
            Some(path) => KeyCatalog::from_path(path).map_err(catalog_error),
            None => Ok(KeyCatalog::builtin()),
        }
    }
}

pub fn run(command: Command, ctx: &Context, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Read(args) => read::run(args, ctx, format),
        Command::Write(args) => write::run(args, ctx, format),
        Command::Temps(args) => temps::run(args, ctx, format),
        Command::Fans(args) => fans::run(args, ctx, format),
        Command::FanMin(args) => fan_min::run(args, ctx, format),
        Command::Power(args) => power::run(args, ctx, format),
        Command::Keys(args) => keys::run(args, ctx, format),
        Command::Watch(args) => watch::run(args, ctx, format),
        Command::Doctor(args) => doctor::run(args, ctx, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum Unit {
    #[default]
    C,
    F,
    K,
}

impl From<Unit> for TemperatureUnit {
    fn from(unit: Unit) -> Self {
        match unit {
            Unit::C => TemperatureUnit::Celsius,
            Unit::F => TemperatureUnit::Fahrenheit,
            Unit::K => TemperatureUnit::Kelvin,
        }
    }
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Four-character key (e.g. TC0P, F0Ac).
    pub key: String,
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Four-character key.
    pub key: String,
    /// Data type tag the key must have (e.g. fpe2, "ui8 ", flag).
    #[arg(long = "type", value_name = "TYPE")]
    pub data_type: String,
    /// Value to encode for the type.
    #[arg(long, required_unless_present = "hex", conflicts_with = "hex")]
    pub value: Option<String>,
    /// Raw payload as hex.
    #[arg(long)]
    pub hex: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct TempsArgs {
    /// Temperature unit.
    #[arg(long, value_enum, default_value = "c")]
    pub unit: Unit,
}

#[derive(Args, Debug, Default)]
pub struct FansArgs {}

#[derive(Args, Debug)]
pub struct FanMinArgs {
    /// Fan index (0-9).
    pub index: u32,
    /// Minimum speed in RPM.
    pub rpm: u32,
}

#[derive(Args, Debug, Default)]
pub struct PowerArgs {}

#[derive(Args, Debug, Default)]
pub struct KeysArgs {
    /// Stop after N keys.
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Time between samples (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub interval: String,
    /// Exit after N samples.
    #[arg(long)]
    pub count: Option<usize>,
    /// Temperature unit.
    #[arg(long, value_enum, default_value = "c")]
    pub unit: Unit,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_interval(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "interval must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid interval: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "interval must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_interval_units() {
        assert_eq!(parse_interval("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_interval("3").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_interval("250ms").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn parse_interval_rejects_bad_input() {
        assert_eq!(parse_interval("0s").unwrap_err().code, USAGE);
        assert_eq!(parse_interval("soon").unwrap_err().code, USAGE);
        assert_eq!(parse_interval("").unwrap_err().code, USAGE);
    }

    #[test]
    fn builtin_catalog_when_no_path() {
        let ctx = Context::default();
        assert!(!ctx.catalog().unwrap().is_empty());
    }
}
