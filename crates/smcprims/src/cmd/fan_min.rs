use serde::Serialize;
use tracing::info;

use crate::cmd::{Context, FanMinArgs};
use crate::exit::{smc_error, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct FanMinOutput {
    index: u32,
    requested: u32,
    min: u32,
}

pub fn run(args: FanMinArgs, ctx: &Context, format: OutputFormat) -> CliResult<i32> {
    let mut smc = ctx.open()?;
    smc.set_fan_min_rpm(args.index, args.rpm)
        .map_err(|err| smc_error(&format!("set fan {} minimum", args.index), err))?;
    info!(fan = args.index, rpm = args.rpm, "fan minimum set");

    let out = FanMinOutput {
        index: args.index,
        requested: args.rpm,
        min: smc.fan_min_rpm(args.index),
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("fan {} minimum now {} rpm", out.index, out.min);
        }
        OutputFormat::Raw => println!("{}", out.min),
    }
    Ok(SUCCESS)
}
