use std::fmt;

use crate::error::{CodecError, Result};
use crate::fixed::{decode_fpe2, decode_sp78, encode_fpe2, encode_sp78};
use crate::key::DataType;
use crate::params::DATA_LEN;

/// A decoded SMC payload.
///
/// Integers are big-endian on the SMC regardless of host byte order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Flag(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    Fpe2(u32),
    Sp78(f64),
    /// Any type without a dedicated decoder.
    Raw(DataType, Vec<u8>),
}

impl Value {
    /// The data type tag this value encodes to.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Flag(_) => DataType::FLAG,
            Value::U8(_) => DataType::UINT8,
            Value::U16(_) => DataType::UINT16,
            Value::U32(_) => DataType::UINT32,
            Value::Fpe2(_) => DataType::FPE2,
            Value::Sp78(_) => DataType::SP78,
            Value::Raw(data_type, _) => *data_type,
        }
    }

    /// Parse a textual value for a given data type (CLI input).
    ///
    /// `flag` accepts `true/false/1/0`; numeric types accept decimal;
    /// unknown types are rejected since their layout is opaque.
    pub fn parse(data_type: DataType, text: &str) -> Option<Self> {
        let text = text.trim();
        match data_type {
            DataType::FLAG => match text {
                "1" | "true" | "on" => Some(Value::Flag(true)),
                "0" | "false" | "off" => Some(Value::Flag(false)),
                _ => None,
            },
            DataType::UINT8 => text.parse().ok().map(Value::U8),
            DataType::UINT16 => text.parse().ok().map(Value::U16),
            DataType::UINT32 => text.parse().ok().map(Value::U32),
            DataType::FPE2 => text.parse().ok().map(Value::Fpe2),
            DataType::SP78 => text.parse().ok().map(Value::Sp78),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Flag(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::Fpe2(v) => write!(f, "{v}"),
            Value::Sp78(v) => write!(f, "{v:.2}"),
            Value::Raw(_, bytes) => write!(f, "{}", hex(bytes)),
        }
    }
}

/// Decode `bytes` according to `data_type`.
///
/// Fails when a known type receives the wrong number of bytes.
pub fn decode_value(data_type: DataType, bytes: &[u8]) -> Result<Value> {
    let value = match data_type {
        DataType::FLAG => Value::Flag(exact::<1>(data_type, bytes)?[0] != 0),
        DataType::UINT8 => Value::U8(exact::<1>(data_type, bytes)?[0]),
        DataType::UINT16 => Value::U16(u16::from_be_bytes(exact(data_type, bytes)?)),
        DataType::UINT32 => Value::U32(u32::from_be_bytes(exact(data_type, bytes)?)),
        DataType::FPE2 => Value::Fpe2(decode_fpe2(exact(data_type, bytes)?)),
        DataType::SP78 => Value::Sp78(decode_sp78(exact(data_type, bytes)?)),
        other => Value::Raw(other, bytes.to_vec()),
    };
    Ok(value)
}

/// Encode a value into its type tag and payload bytes.
pub fn encode_value(value: &Value) -> Result<(DataType, Vec<u8>)> {
    let bytes = match value {
        Value::Flag(v) => vec![u8::from(*v)],
        Value::U8(v) => vec![*v],
        Value::U16(v) => v.to_be_bytes().to_vec(),
        Value::U32(v) => v.to_be_bytes().to_vec(),
        Value::Fpe2(v) => encode_fpe2(*v).to_vec(),
        Value::Sp78(v) => encode_sp78(*v).to_vec(),
        Value::Raw(_, bytes) => {
            if bytes.len() > DATA_LEN {
                return Err(CodecError::PayloadTooLarge {
                    size: bytes.len(),
                    max: DATA_LEN,
                });
            }
            bytes.clone()
        }
    };
    Ok((value.data_type(), bytes))
}

/// Lowercase hex rendering used for raw payloads.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Parse a hex string (whitespace ignored) into bytes.
pub fn parse_hex(text: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks(2)
        .map(|pair| {
            let s = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(s, 16).ok()
        })
        .collect()
}

fn exact<const N: usize>(data_type: DataType, bytes: &[u8]) -> Result<[u8; N]> {
    bytes.try_into().map_err(|_| CodecError::SizeMismatch {
        data_type: data_type.to_string(),
        expected: N,
        actual: bytes.len(),
    })
}
