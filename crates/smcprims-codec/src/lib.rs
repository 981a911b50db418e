//! Encoding layer for the Apple System Management Controller protocol.
//!
//! Everything that touches byte layout lives here:
//! - 4-character keys and data type tags packed big-endian into a `u32`
//! - `fpe2` and `sp78` fixed-point fields, temperature units
//! - typed payload decoding (`flag`, `ui8 `, `ui16`, `ui32`, ...)
//! - the 80-byte parameter block exchanged with the AppleSMC driver
//!
//! No I/O happens in this crate.

pub mod error;
pub mod fixed;
pub mod key;
pub mod params;
pub mod value;

pub use error::{CodecError, Result};
pub use fixed::{
    decode_fpe2, decode_fpe2_legacy, decode_sp78, encode_fpe2, encode_sp78, to_fahrenheit,
    to_kelvin, TemperatureUnit, FPE2_MAX,
};
pub use key::{decode_type_tag, encode_key, DataType, Key, KEY_SIZE};
pub use params::{
    decode_params, encode_params, result, KeyInfo, PLimitData, Selector, SmcParams, SmcVersion,
    DATA_LEN, HANDLE_YPC_EVENT, PARAM_BLOCK_SIZE,
};
pub use value::{decode_value, encode_value, hex, parse_hex, Value};
