//! Typed sensor and fan operations.
//!
//! Reads here are best-effort: any failure yields a sentinel (`0.0`, `false`,
//! `-1`, `0`, or an empty string) and is logged at debug level. Use
//! [`Smc::is_key_valid`] to tell an absent sensor from one that reads zero.
//! Writes report errors.

use serde::Serialize;
use smcprims_channel::SmcChannel;
use smcprims_codec::{decode_fpe2, decode_fpe2_legacy, encode_fpe2, DataType, Key, TemperatureUnit};
use tracing::debug;

use crate::catalog::{KeyCatalog, SensorKind, BATTERY_POWERED, FAN_COUNT, OPTICAL_DRIVE_FULL};
use crate::error::Result;
use crate::session::Smc;
use crate::transaction::KeyValue;

const FAN_NAME_SIZE: u32 = 16;
const FAN_NAME_OFFSET: usize = 4;

/// Per-fan keys. The key is `F`, the fan index digit, then the suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FanKey {
    Actual,
    Min,
    Max,
    Safe,
    Target,
    Id,
}

impl FanKey {
    fn suffix(self) -> &'static str {
        match self {
            FanKey::Actual => "Ac",
            FanKey::Min => "Mn",
            FanKey::Max => "Mx",
            FanKey::Safe => "Sf",
            FanKey::Target => "Tg",
            FanKey::Id => "ID",
        }
    }

    /// Key for fan `index`. Indices above 9 do not fit the template.
    pub fn key(self, index: u32) -> Result<Key> {
        Ok(Key::new(&format!("F{index}{}", self.suffix()))?)
    }
}

/// One temperature probe reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureReading {
    pub key: String,
    pub name: String,
    pub value: f64,
    pub unit: &'static str,
}

/// Speeds and name of one fan, in RPM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FanReading {
    pub index: u32,
    pub name: String,
    pub actual: u32,
    pub min: u32,
    pub max: u32,
    pub safe: u32,
    pub target: u32,
}

fn or_sentinel<T>(what: &str, key: impl std::fmt::Display, result: Result<T>, sentinel: T) -> T {
    result.unwrap_or_else(|err| {
        debug!(key = %key, error = %err, "{what} unavailable");
        sentinel
    })
}

impl<C: SmcChannel> Smc<C> {
    fn read_expecting(&mut self, key: Key, size: u32, data_type: DataType) -> Result<KeyValue> {
        self.read_key(key)?.expect(size, data_type)
    }

    /// Temperature of probe `key` in `unit`, whole degrees.
    pub fn read_temperature(&mut self, key: &str, unit: TemperatureUnit) -> Result<f64> {
        let value = self.read_expecting(Key::new(key)?, 2, DataType::SP78)?;
        // Whole degrees only; the fractional byte is ignored.
        Ok(unit.from_celsius(f64::from(value.bytes()[0])))
    }

    /// Temperature of probe `key` in `unit`, or `0.0` on error.
    ///
    /// Only the integer byte of the `sp78` value is used, so readings are
    /// whole degrees Celsius before conversion.
    pub fn temperature(&mut self, key: &str, unit: TemperatureUnit) -> f64 {
        let result = self.read_temperature(key, unit);
        or_sentinel("temperature", key, result, 0.0)
    }

    pub fn read_flag(&mut self, key: Key) -> Result<bool> {
        let value = self.read_expecting(key, 1, DataType::FLAG)?;
        Ok(value.bytes()[0] != 0)
    }

    /// True iff `key` is a readable one-byte flag with a nonzero value.
    pub fn flag(&mut self, key: Key) -> bool {
        let result = self.read_flag(key);
        or_sentinel("flag", key, result, false)
    }

    pub fn is_battery_powered(&mut self) -> bool {
        self.flag(BATTERY_POWERED)
    }

    pub fn is_optical_disk_drive_full(&mut self) -> bool {
        self.flag(OPTICAL_DRIVE_FULL)
    }

    pub fn read_fan_count(&mut self) -> Result<i32> {
        let value = self.read_expecting(FAN_COUNT, 1, DataType::UINT8)?;
        Ok(i32::from(value.bytes()[0]))
    }

    /// Number of fans, or `-1` on error.
    pub fn fan_count(&mut self) -> i32 {
        let result = self.read_fan_count();
        or_sentinel("fan count", FAN_COUNT, result, -1)
    }

    fn try_fan_speed(&mut self, index: u32, which: FanKey, decode: fn([u8; 2]) -> u32) -> Result<u32> {
        let value = self.read_expecting(which.key(index)?, 2, DataType::FPE2)?;
        let bytes = value.bytes();
        Ok(decode([bytes[0], bytes[1]]))
    }

    /// Speed of fan `index` in RPM.
    pub fn read_fan_speed(&mut self, index: u32, which: FanKey) -> Result<u32> {
        self.try_fan_speed(index, which, decode_fpe2)
    }

    /// Actual speed of fan `index` decoded with [`decode_fpe2_legacy`].
    pub fn read_fan_rpm_legacy(&mut self, index: u32) -> Result<u32> {
        self.try_fan_speed(index, FanKey::Actual, decode_fpe2_legacy)
    }

    /// Speed of fan `index` in RPM, or `0` on error.
    pub fn fan_speed(&mut self, index: u32, which: FanKey) -> u32 {
        let result = self.read_fan_speed(index, which);
        or_sentinel("fan speed", format_args!("fan {index} {which:?}"), result, 0)
    }

    pub fn fan_rpm(&mut self, index: u32) -> u32 {
        self.fan_speed(index, FanKey::Actual)
    }

    pub fn fan_min_rpm(&mut self, index: u32) -> u32 {
        self.fan_speed(index, FanKey::Min)
    }

    pub fn fan_max_rpm(&mut self, index: u32) -> u32 {
        self.fan_speed(index, FanKey::Max)
    }

    pub fn fan_safe_rpm(&mut self, index: u32) -> u32 {
        self.fan_speed(index, FanKey::Safe)
    }

    pub fn fan_target_rpm(&mut self, index: u32) -> u32 {
        self.fan_speed(index, FanKey::Target)
    }

    /// Actual speed decoded with [`decode_fpe2_legacy`].
    pub fn fan_rpm_legacy(&mut self, index: u32) -> u32 {
        let result = self.read_fan_rpm_legacy(index);
        or_sentinel("fan speed", format_args!("fan {index}"), result, 0)
    }

    pub fn read_fan_name(&mut self, index: u32) -> Result<String> {
        let value = self.read_expecting(FanKey::Id.key(index)?, FAN_NAME_SIZE, DataType::SFDS)?;
        Ok(value.bytes()[FAN_NAME_OFFSET..]
            .iter()
            .take_while(|&&b| b != b' ')
            .map(|&b| b as char)
            .collect())
    }

    /// Name of fan `index`, or an empty string on error.
    ///
    /// The name is bytes 4..16 of the `{fds` record, cut at the first space.
    /// NUL bytes are not terminators and come through as is.
    pub fn fan_name(&mut self, index: u32) -> String {
        let result = self.read_fan_name(index);
        or_sentinel("fan name", format_args!("fan {index}"), result, String::new())
    }

    /// Set the minimum speed of fan `index`. Needs a privileged channel.
    pub fn set_fan_min_rpm(&mut self, index: u32, rpm: u32) -> Result<()> {
        let key = FanKey::Min.key(index)?;
        let value = KeyValue::new(key, DataType::FPE2, &encode_fpe2(rpm))?;
        self.write_key(&value)
    }

    /// All speeds of fan `index`, with sentinels for anything unreadable.
    pub fn fan_snapshot(&mut self, index: u32) -> FanReading {
        FanReading {
            index,
            name: self.fan_name(index),
            actual: self.fan_rpm(index),
            min: self.fan_min_rpm(index),
            max: self.fan_max_rpm(index),
            safe: self.fan_safe_rpm(index),
            target: self.fan_target_rpm(index),
        }
    }

    /// Readings for every temperature probe in `catalog` that is present.
    pub fn temperature_readings(
        &mut self,
        catalog: &KeyCatalog,
        unit: TemperatureUnit,
    ) -> Vec<TemperatureReading> {
        let mut readings = Vec::new();
        for entry in catalog.of_kind(SensorKind::Temperature) {
            let key = entry.key.to_string();
            match self.read_temperature(&key, unit) {
                Ok(value) => readings.push(TemperatureReading {
                    key,
                    name: entry.name.clone(),
                    value,
                    unit: unit.symbol(),
                }),
                Err(err) => debug!(key = %key, error = %err, "skipping probe"),
            }
        }
        readings
    }
}
