use smcprims_channel::SmcChannel;
use smcprims_client::{FanReading, Smc};

use crate::cmd::{Context, FansArgs};
use crate::exit::{CliError, CliResult, NOT_FOUND, SUCCESS};
use crate::output::{display_name, print_fans, OutputFormat};

pub fn run(_args: FansArgs, ctx: &Context, format: OutputFormat) -> CliResult<i32> {
    let mut smc = ctx.open()?;
    let fans = read_fans(&mut smc)?;
    print_fans(&fans, format);
    Ok(SUCCESS)
}

pub(crate) fn read_fans<C: SmcChannel>(smc: &mut Smc<C>) -> CliResult<Vec<FanReading>> {
    let count = smc.fan_count();
    if count < 0 {
        return Err(CliError::new(NOT_FOUND, "fan count (FNum) unavailable"));
    }
    Ok((0..count as u32)
        .map(|index| {
            let mut fan = smc.fan_snapshot(index);
            fan.name = display_name(&fan.name).to_string();
            fan
        })
        .collect())
}
