use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use smcprims_client::{FanReading, TemperatureReading};
use tracing::debug;

use crate::cmd::fans::read_fans;
use crate::cmd::{parse_interval, Context, WatchArgs};
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{now_unix_seconds, print_fans, print_json, print_temperatures, OutputFormat};

#[derive(Serialize)]
struct Sample {
    timestamp: u64,
    temperatures: Vec<TemperatureReading>,
    fans: Vec<FanReading>,
}

pub fn run(args: WatchArgs, ctx: &Context, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_interval(&args.interval)?;
    let catalog = ctx.catalog()?;
    let mut smc = ctx.open()?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut taken = 0usize;
    while running.load(Ordering::SeqCst) {
        let sample = Sample {
            timestamp: now_unix_seconds(),
            temperatures: smc.temperature_readings(&catalog, args.unit.into()),
            fans: read_fans(&mut smc).unwrap_or_default(),
        };
        print_sample(&sample, format);
        taken = taken.saturating_add(1);

        if args.count.is_some_and(|count| taken >= count) {
            break;
        }
        sleep_while_running(interval, &running);
    }

    debug!(samples = taken, "watch finished");
    Ok(SUCCESS)
}

fn print_sample(sample: &Sample, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(sample),
        OutputFormat::Raw => {
            print_temperatures(&sample.temperatures, format);
            print_fans(&sample.fans, format);
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("-- {} --", sample.timestamp);
            print_temperatures(&sample.temperatures, format);
            if !sample.fans.is_empty() {
                print_fans(&sample.fans, format);
            }
        }
    }
}

/// Sleep in short steps so Ctrl-C ends the loop promptly.
fn sleep_while_running(interval: Duration, running: &AtomicBool) {
    let deadline = Instant::now() + interval;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        std::thread::sleep((deadline - now).min(Duration::from_millis(100)));
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
