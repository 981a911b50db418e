use serde::Serialize;
use tracing::warn;

use crate::cmd::{Context, KeysArgs};
use crate::exit::{smc_error, CliResult, SUCCESS};
use crate::output::{print_json, table, OutputFormat};

#[derive(Serialize)]
struct KeyEntry {
    key: String,
    #[serde(rename = "type")]
    data_type: String,
    size: u32,
}

#[derive(Serialize)]
struct KeysOutput {
    total: u32,
    keys: Vec<KeyEntry>,
}

pub fn run(args: KeysArgs, ctx: &Context, format: OutputFormat) -> CliResult<i32> {
    let mut smc = ctx.open()?;
    let total = smc
        .key_count()
        .map_err(|err| smc_error("read key count", err))?;
    let limit = args.limit.map_or(total, |limit| limit.min(total));

    let mut keys = Vec::with_capacity(limit as usize);
    for index in 0..limit {
        let key = smc
            .key_at_index(index)
            .map_err(|err| smc_error(&format!("key at index {index}"), err))?;
        match smc.key_info(key) {
            Ok(info) => keys.push(KeyEntry {
                key: key.to_string(),
                data_type: info.data_type.to_string(),
                size: info.data_size,
            }),
            Err(err) => warn!(key = %key, error = %err, "key info unavailable"),
        }
    }

    let out = KeysOutput { total, keys };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut t = table(&["KEY", "TYPE", "SIZE"]);
            for k in &out.keys {
                t.add_row(vec![k.key.clone(), k.data_type.clone(), k.size.to_string()]);
            }
            println!("{t}");
            println!("{} of {} keys", out.keys.len(), out.total);
        }
        OutputFormat::Pretty => {
            for k in &out.keys {
                println!("{} [{}] {}", k.key, k.data_type, k.size);
            }
        }
        OutputFormat::Raw => {
            for k in &out.keys {
                println!("{}", k.key);
            }
        }
    }
    Ok(SUCCESS)
}
