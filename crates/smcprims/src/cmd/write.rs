use serde::Serialize;
use smcprims_client::KeyValue;
use smcprims_codec::{hex, parse_hex, DataType, Key, Value};
use tracing::info;

use crate::cmd::{Context, WriteArgs};
use crate::exit::{smc_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct WriteOutput {
    key: String,
    #[serde(rename = "type")]
    data_type: String,
    size: u32,
    hex: String,
    written: bool,
}

pub fn run(args: WriteArgs, ctx: &Context, format: OutputFormat) -> CliResult<i32> {
    let payload = build_payload(&args)?;

    let mut smc = ctx.open()?;
    smc.write_key(&payload)
        .map_err(|err| smc_error(&format!("write {}", args.key), err))?;
    info!(key = %payload.key, size = payload.size, "key written");

    let out = WriteOutput {
        key: payload.key.to_string(),
        data_type: payload.data_type.to_string(),
        size: payload.size,
        hex: hex(payload.bytes()),
        written: true,
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("wrote {} [{}] {}", out.key, out.data_type, out.hex);
        }
        OutputFormat::Raw => println!("{}", out.hex),
    }
    Ok(SUCCESS)
}

fn build_payload(args: &WriteArgs) -> CliResult<KeyValue> {
    let usage = |err: smcprims_client::SmcError| smc_error("invalid arguments", err);
    let key = Key::new(&args.key).map_err(|err| usage(err.into()))?;
    let data_type = DataType::new(&args.data_type).map_err(|err| usage(err.into()))?;

    if let Some(text) = &args.hex {
        let bytes = parse_hex(text)
            .ok_or_else(|| CliError::new(USAGE, format!("invalid hex payload: {text}")))?;
        return KeyValue::new(key, data_type, &bytes).map_err(usage);
    }

    let text = args.value.as_deref().unwrap_or_default();
    let value = Value::parse(data_type, text).ok_or_else(|| {
        CliError::new(
            USAGE,
            format!("cannot parse {text:?} as {data_type}; use --hex for this type"),
        )
    })?;
    KeyValue::from_value(key, &value).map_err(usage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::DATA_INVALID;

    fn args(key: &str, data_type: &str, value: Option<&str>, hex: Option<&str>) -> WriteArgs {
        WriteArgs {
            key: key.to_string(),
            data_type: data_type.to_string(),
            value: value.map(str::to_string),
            hex: hex.map(str::to_string),
        }
    }

    #[test]
    fn builds_typed_payload() {
        let payload = build_payload(&args("F0Mn", "fpe2", Some("1200"), None)).unwrap();
        assert_eq!(payload.bytes(), &[0x12, 0xC0]);
        assert_eq!(payload.data_type, DataType::FPE2);
    }

    #[test]
    fn builds_hex_payload() {
        let payload = build_payload(&args("F0ID", "{fds", None, Some("00 01 02"))).unwrap();
        assert_eq!(payload.size, 3);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            build_payload(&args("F0M", "fpe2", Some("1"), None)).unwrap_err().code,
            USAGE
        );
        assert_eq!(
            build_payload(&args("F0Mn", "fpe2", Some("fast"), None)).unwrap_err().code,
            USAGE
        );
        assert_eq!(
            build_payload(&args("F0Mn", "fpe2", None, Some("0g"))).unwrap_err().code,
            USAGE
        );
        assert_eq!(
            build_payload(&args("F0ID", "{fds", None, Some(&"00".repeat(33))))
                .unwrap_err()
                .code,
            DATA_INVALID
        );
    }
}
