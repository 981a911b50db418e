use crate::cmd::{Context, TempsArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_temperatures, OutputFormat};

pub fn run(args: TempsArgs, ctx: &Context, format: OutputFormat) -> CliResult<i32> {
    let catalog = ctx.catalog()?;
    let mut smc = ctx.open()?;
    let readings = smc.temperature_readings(&catalog, args.unit.into());
    print_temperatures(&readings, format);
    Ok(SUCCESS)
}
