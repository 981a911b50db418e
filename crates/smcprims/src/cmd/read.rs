use serde::Serialize;
use smcprims_codec::hex;

use crate::cmd::{Context, ReadArgs};
use crate::exit::{smc_error, CliResult, SUCCESS};
use crate::output::{print_json, print_raw, table, OutputFormat};

#[derive(Serialize)]
struct ReadOutput {
    key: String,
    #[serde(rename = "type")]
    data_type: String,
    size: u32,
    hex: String,
    value: Option<String>,
}

pub fn run(args: ReadArgs, ctx: &Context, format: OutputFormat) -> CliResult<i32> {
    let mut smc = ctx.open()?;
    let value = smc
        .read(&args.key)
        .map_err(|err| smc_error(&format!("read {}", args.key), err))?;

    if let OutputFormat::Raw = format {
        print_raw(value.bytes());
        return Ok(SUCCESS);
    }

    let out = ReadOutput {
        key: value.key.to_string(),
        data_type: value.data_type.to_string(),
        size: value.size,
        hex: hex(value.bytes()),
        value: value.decode().ok().map(|v| v.to_string()),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut t = table(&["KEY", "TYPE", "SIZE", "HEX", "VALUE"]);
            t.add_row(vec![
                out.key.clone(),
                out.data_type.clone(),
                out.size.to_string(),
                out.hex.clone(),
                out.value.clone().unwrap_or_default(),
            ]);
            println!("{t}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!(
                "{} [{}] {} bytes: {}",
                out.key,
                out.data_type,
                out.size,
                out.value.as_deref().unwrap_or(&out.hex)
            );
        }
    }

    Ok(SUCCESS)
}
