//! Print a sensor report from a simulated SMC.
//!
//! Run with:
//!   cargo run --example sensor-report
//!
//! The same calls work against the real driver on macOS by opening the
//! session with `smcprims::client::open(&SessionConfig::default())`.

use smcprims::channel::SimulatedSmc;
use smcprims::client::{KeyCatalog, Smc};
use smcprims::codec::{encode_fpe2, DataType, Key, TemperatureUnit};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut name = [0u8; 16];
    name[4..8].copy_from_slice(b"Main");

    let simulated = SimulatedSmc::new()
        .with_key(Key::new("TC0P")?, DataType::SP78, &[52, 0])
        .with_key(Key::new("TB0T")?, DataType::SP78, &[31, 0])
        .with_key(Key::new("BATP")?, DataType::FLAG, &[0])
        .with_key(Key::new("FNum")?, DataType::UINT8, &[1])
        .with_key(Key::new("F0Ac")?, DataType::FPE2, &encode_fpe2(2160))
        .with_key(Key::new("F0Mx")?, DataType::FPE2, &encode_fpe2(6200))
        .with_writable_key(Key::new("F0Mn")?, DataType::FPE2, &encode_fpe2(1200))
        .with_key(Key::new("F0ID")?, DataType::SFDS, &name);

    let mut smc = Smc::new(simulated);

    for reading in smc.temperature_readings(&KeyCatalog::builtin(), TemperatureUnit::Celsius) {
        println!("{:<24} {:>6.1}{}", reading.name, reading.value, reading.unit);
    }

    println!("on battery: {}", smc.is_battery_powered());

    smc.set_fan_min_rpm(0, 1800)?;
    for index in 0..smc.fan_count().max(0) as u32 {
        let fan = smc.fan_snapshot(index);
        println!(
            "fan {} ({}): {} rpm, min {} max {}",
            fan.index,
            fan.name.trim_end_matches('\0'),
            fan.actual,
            fan.min,
            fan.max
        );
    }

    Ok(())
}
