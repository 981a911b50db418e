use serde::Serialize;
use smcprims_client::{KeyCatalog, SensorKind};

use crate::cmd::{Context, DoctorArgs};
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    schema_id: &'static str,
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(_args: DoctorArgs, ctx: &Context, format: OutputFormat) -> CliResult<i32> {
    let checks = vec![
        platform_check(ctx),
        channel_open_check(ctx),
        privilege_check(),
        catalog_check(ctx),
        compiled_features_check(),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let output = DoctorOutput {
        schema_id: "https://schemas.3leaps.dev/smcprims/cli/v1/doctor-report.schema.json",
        checks,
        overall: if has_fail { "fail" } else { "pass" },
    };

    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => crate::output::print_json(output),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("smcprims doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<18} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
        CheckStatus::Skip => "SKIP",
    }
}

fn platform_check(ctx: &Context) -> CheckResult {
    #[cfg(target_os = "macos")]
    {
        let _ = ctx;
        match smcprims_channel::machine_model() {
            Ok(model) => CheckResult::new("platform", CheckStatus::Pass, format!("macOS ({model})")),
            Err(err) => CheckResult::new(
                "platform",
                CheckStatus::Warn,
                format!("macOS, model unavailable: {err}"),
            ),
        }
    }

    #[cfg(not(target_os = "macos"))]
    {
        let status = if ctx.session.simulation.is_some() {
            CheckStatus::Info
        } else {
            CheckStatus::Warn
        };
        CheckResult::new(
            "platform",
            status,
            format!(
                "{}: AppleSMC driver unavailable, simulated SMC only",
                std::env::consts::OS
            ),
        )
    }
}

fn channel_open_check(ctx: &Context) -> CheckResult {
    let target = match &ctx.session.simulation {
        Some(path) => format!("simulated SMC {}", path.display()),
        None => format!("IOService {}", ctx.session.service_name),
    };

    if ctx.session.simulation.is_none() && !cfg!(target_os = "macos") {
        return CheckResult::new("channel_open", CheckStatus::Skip, format!("{target} requires macOS"));
    }

    match ctx.open() {
        Ok(mut smc) => match smc.key_count() {
            Ok(count) => CheckResult::new(
                "channel_open",
                CheckStatus::Pass,
                format!("{target} open, {count} keys"),
            ),
            Err(err) => CheckResult::new(
                "channel_open",
                CheckStatus::Warn,
                format!("{target} open, key count unavailable: {err}"),
            ),
        },
        Err(err) => CheckResult::new("channel_open", CheckStatus::Fail, err.message),
    }
}

fn privilege_check() -> CheckResult {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no preconditions and cannot fail.
        let euid = unsafe { libc::geteuid() };
        if euid == 0 {
            CheckResult::new("privilege", CheckStatus::Pass, "running as root; writes allowed")
        } else {
            CheckResult::new(
                "privilege",
                CheckStatus::Warn,
                format!("euid {euid}; fan writes require root"),
            )
        }
    }

    #[cfg(not(unix))]
    {
        CheckResult::new("privilege", CheckStatus::Skip, "privilege check not implemented")
    }
}

fn catalog_check(ctx: &Context) -> CheckResult {
    let source = match &ctx.catalog {
        Some(path) => path.display().to_string(),
        None => "built-in".to_string(),
    };
    match ctx.catalog() {
        Ok(catalog) => CheckResult::new("catalog", CheckStatus::Pass, catalog_summary(&source, &catalog)),
        Err(err) => CheckResult::new("catalog", CheckStatus::Fail, err.message),
    }
}

fn catalog_summary(source: &str, catalog: &KeyCatalog) -> String {
    format!(
        "{source}: {} keys ({} temperature probes)",
        catalog.len(),
        catalog.of_kind(SensorKind::Temperature).count()
    )
}

fn compiled_features_check() -> CheckResult {
    let mut features = Vec::new();
    if cfg!(feature = "client") {
        features.push("client");
    }
    if cfg!(feature = "cli") {
        features.push("cli");
    }
    if cfg!(target_os = "macos") {
        features.push("iokit");
    }

    CheckResult::new("compiled_features", CheckStatus::Info, features.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_output_has_overall_status() {
        let output = DoctorOutput {
            schema_id: "x",
            checks: vec![CheckResult::new("x", CheckStatus::Pass, "ok")],
            overall: "pass",
        };
        let json = serde_json::to_string(&output).expect("doctor output should serialize");
        assert!(json.contains("\"overall\":\"pass\""));
        assert!(json.contains("\"status\":\"pass\""));
    }

    #[test]
    fn missing_catalog_fails_check() {
        let ctx = Context {
            catalog: Some("/nonexistent/catalog.json".into()),
            ..Context::default()
        };
        assert!(matches!(catalog_check(&ctx).status, CheckStatus::Fail));
    }

    #[test]
    fn builtin_catalog_summary() {
        let summary = catalog_summary("built-in", &KeyCatalog::builtin());
        assert!(summary.starts_with("built-in: "));
    }
}
