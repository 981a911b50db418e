//! Four-character codes: SMC keys and data type tags.
//!
//! Both are packed big-endian into a `u32`: the first character lands in the
//! most significant byte.

use std::fmt;
use std::str::FromStr;

use crate::error::{CodecError, Result};

/// Number of characters in an SMC key or type tag.
pub const KEY_SIZE: usize = 4;

/// Pack a 4-character ASCII string into its 32-bit wire representation.
pub fn encode_key(text: &str) -> Result<u32> {
    let len = text.chars().count();
    if len != KEY_SIZE {
        return Err(CodecError::InvalidKeyLength {
            key: text.to_string(),
            len,
        });
    }
    if !text.is_ascii() {
        return Err(CodecError::InvalidKeyCharacter(text.to_string()));
    }

    let bytes: [u8; KEY_SIZE] = text
        .as_bytes()
        .try_into()
        .map_err(|_| CodecError::InvalidKeyCharacter(text.to_string()))?;
    Ok(u32::from_be_bytes(bytes))
}

/// Render a packed 32-bit code back into its four characters.
pub fn decode_type_tag(value: u32) -> String {
    value.to_be_bytes().iter().map(|&b| b as char).collect()
}

/// A validated SMC key, e.g. `TC0P` or `F0Ac`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(u32);

impl Key {
    /// Parse a key from its textual form.
    pub fn new(text: &str) -> Result<Self> {
        encode_key(text).map(Self)
    }

    /// Wrap a raw code received from the channel.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Build a compile-time key from four bytes.
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// The packed wire value.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&decode_type_tag(self.0))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({:?})", decode_type_tag(self.0))
    }
}

impl FromStr for Key {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// The data type tag the SMC reports for a key, e.g. `fpe2`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType(u32);

impl DataType {
    pub const UINT8: DataType = DataType::from_bytes(*b"ui8 ");
    pub const UINT16: DataType = DataType::from_bytes(*b"ui16");
    pub const UINT32: DataType = DataType::from_bytes(*b"ui32");
    pub const FLAG: DataType = DataType::from_bytes(*b"flag");
    pub const FPE2: DataType = DataType::from_bytes(*b"fpe2");
    /// Fan descriptor struct.
    pub const SFDS: DataType = DataType::from_bytes(*b"{fds");
    pub const SP78: DataType = DataType::from_bytes(*b"sp78");

    /// Parse a type tag from its textual form.
    pub fn new(text: &str) -> Result<Self> {
        encode_key(text).map(Self)
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&decode_type_tag(self.0))
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataType({:?})", decode_type_tag(self.0))
    }
}

impl FromStr for DataType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_key_packs_big_endian() {
        assert_eq!(encode_key("TC0P").unwrap(), 0x5443_3050);
        assert_eq!(encode_key("#KEY").unwrap(), 0x234B_4559);
    }

    #[test]
    fn encode_key_rejects_wrong_lengths() {
        for text in ["", "T", "TC0", "TC0PX", "F10Ac", "way too long"] {
            let err = encode_key(text).unwrap_err();
            assert!(
                matches!(err, CodecError::InvalidKeyLength { len, .. } if len == text.chars().count()),
                "{text:?} should fail with InvalidKeyLength"
            );
        }
    }

    #[test]
    fn encode_key_rejects_non_ascii() {
        let err = encode_key("Té0P").unwrap_err();
        assert!(matches!(err, CodecError::InvalidKeyCharacter(_)));
    }

    #[test]
    fn type_tag_round_trips_through_key_encoding() {
        assert_eq!(decode_type_tag(encode_key("ui8 ").unwrap()), "ui8 ");
        assert_eq!(decode_type_tag(encode_key("{fds").unwrap()), "{fds");
    }

    #[test]
    fn constants_match_parsed_tags() {
        assert_eq!(DataType::new("fpe2").unwrap(), DataType::FPE2);
        assert_eq!(DataType::new("ui8 ").unwrap(), DataType::UINT8);
        assert_eq!(DataType::SP78.to_string(), "sp78");
    }

    #[test]
    fn key_display_and_parse() {
        let key: Key = "F0Ac".parse().unwrap();
        assert_eq!(key.to_string(), "F0Ac");
        assert_eq!(Key::from_raw(key.raw()), key);
        assert_eq!(format!("{key:?}"), "Key(\"F0Ac\")");
    }
}
