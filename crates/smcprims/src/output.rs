use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use smcprims_client::{FanReading, TemperatureReading};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Fan names are fixed-width records; drop the NUL padding for display.
pub fn display_name(name: &str) -> &str {
    name.trim_end_matches('\0')
}

pub fn print_temperatures(readings: &[TemperatureReading], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&readings),
        OutputFormat::Table => {
            let mut t = table(&["KEY", "SENSOR", "VALUE"]);
            for r in readings {
                t.add_row(vec![
                    r.key.clone(),
                    r.name.clone(),
                    format!("{:.1}{}", r.value, r.unit),
                ]);
            }
            println!("{t}");
        }
        OutputFormat::Pretty => {
            for r in readings {
                println!("{} {:<24} {:>7.1}{}", r.key, r.name, r.value, r.unit);
            }
        }
        OutputFormat::Raw => {
            for r in readings {
                println!("{}={}", r.key, r.value);
            }
        }
    }
}

pub fn fan_rows(fans: &[FanReading]) -> Table {
    let mut t = table(&["FAN", "NAME", "ACTUAL", "MIN", "MAX", "TARGET"]);
    for f in fans {
        t.add_row(vec![
            f.index.to_string(),
            display_name(&f.name).to_string(),
            f.actual.to_string(),
            f.min.to_string(),
            f.max.to_string(),
            f.target.to_string(),
        ]);
    }
    t
}

pub fn print_fans(fans: &[FanReading], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&fans),
        OutputFormat::Table => println!("{}", fan_rows(fans)),
        OutputFormat::Pretty => {
            for f in fans {
                println!(
                    "fan {} {:<12} actual={} min={} max={} target={}",
                    f.index,
                    display_name(&f.name),
                    f.actual,
                    f.min,
                    f.max,
                    f.target
                );
            }
        }
        OutputFormat::Raw => {
            for f in fans {
                println!("{}={}", f.index, f.actual);
            }
        }
    }
}

pub fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_drops_padding() {
        assert_eq!(display_name("Main\0\0\0\0"), "Main");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn fan_table_has_one_row_per_fan() {
        let fans = vec![
            FanReading {
                index: 0,
                name: "Left\0".to_string(),
                actual: 1200,
                min: 1000,
                max: 6000,
                safe: 0,
                target: 1200,
            },
            FanReading {
                index: 1,
                name: "Right".to_string(),
                actual: 1300,
                min: 1000,
                max: 6000,
                safe: 0,
                target: 1300,
            },
        ];
        let rendered = fan_rows(&fans).to_string();
        assert!(rendered.contains("Left"));
        assert!(rendered.contains("1300"));
    }
}
