use serde::Serialize;

use crate::cmd::{Context, PowerArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, table, OutputFormat};

#[derive(Serialize)]
struct PowerOutput {
    battery_powered: bool,
    optical_drive_full: bool,
}

pub fn run(_args: PowerArgs, ctx: &Context, format: OutputFormat) -> CliResult<i32> {
    let mut smc = ctx.open()?;
    let out = PowerOutput {
        battery_powered: smc.is_battery_powered(),
        optical_drive_full: smc.is_optical_disk_drive_full(),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut t = table(&["FLAG", "VALUE"]);
            t.add_row(vec!["battery powered".to_string(), out.battery_powered.to_string()]);
            t.add_row(vec![
                "optical drive full".to_string(),
                out.optical_drive_full.to_string(),
            ]);
            println!("{t}");
        }
        OutputFormat::Pretty => {
            println!("battery powered:    {}", out.battery_powered);
            println!("optical drive full: {}", out.optical_drive_full);
        }
        OutputFormat::Raw => {
            println!("{} {}", u8::from(out.battery_powered), u8::from(out.optical_drive_full));
        }
    }
    Ok(SUCCESS)
}
