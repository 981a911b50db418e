//! Fixed-point encodings and temperature units.

/// Largest value an `fpe2` field can carry (14 integer bits).
pub const FPE2_MAX: u32 = 0x3FFF;

/// Encode an unsigned value as `fpe2` (14 integer bits, 2 fractional bits).
///
/// Values above [`FPE2_MAX`] are truncated: the high bits are lost, the
/// result is not clamped.
pub fn encode_fpe2(value: u32) -> [u8; 2] {
    [(value >> 6) as u8, (value << 2) as u8]
}

/// Decode an `fpe2` field, discarding the fractional bits.
///
/// Inverse of [`encode_fpe2`] over `0..=FPE2_MAX`.
pub fn decode_fpe2(bytes: [u8; 2]) -> u32 {
    (u32::from(bytes[0]) << 6) | (u32::from(bytes[1]) >> 2)
}

/// Historical `fpe2` reading: `(b0 << 6) + (b1 << 2)`.
///
/// Disagrees with [`decode_fpe2`] whenever the low byte is nonzero. Kept as is
/// for callers of the C interface that depend on the old numbers.
pub fn decode_fpe2_legacy(bytes: [u8; 2]) -> u32 {
    (u32::from(bytes[0]) << 6) + (u32::from(bytes[1]) << 2)
}

/// Decode a signed 8.8 fixed-point (`sp78`) field.
pub fn decode_sp78(bytes: [u8; 2]) -> f64 {
    f64::from(i16::from_be_bytes(bytes)) / 256.0
}

/// Encode a value as `sp78`, saturating at the representable range.
pub fn encode_sp78(value: f64) -> [u8; 2] {
    let scaled = (value * 256.0).round().clamp(f64::from(i16::MIN), f64::from(i16::MAX));
    (scaled as i16).to_be_bytes()
}

/// Unit for temperature readings. The SMC reports Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    /// Convert a Celsius reading into this unit.
    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => to_fahrenheit(celsius),
            TemperatureUnit::Kelvin => to_kelvin(celsius),
        }
    }

    /// Short suffix for display.
    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Kelvin => "K",
        }
    }
}

pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

pub fn to_kelvin(celsius: f64) -> f64 {
    celsius + 273.15
}
