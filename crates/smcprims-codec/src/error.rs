/// Errors that can occur while encoding or decoding SMC data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A key or type tag is not exactly four characters long.
    #[error("invalid key length for {key:?} ({len} characters, expected 4)")]
    InvalidKeyLength { key: String, len: usize },

    /// A four-character key contains non-ASCII characters.
    #[error("key {0:?} contains non-ASCII characters")]
    InvalidKeyCharacter(String),

    /// A payload does not fit in the 32-byte data area.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A parameter block buffer is shorter than the fixed layout.
    #[error("parameter block truncated ({len} bytes, expected {expected})")]
    Truncated { len: usize, expected: usize },

    /// Payload bytes do not match the size a data type requires.
    #[error("{data_type} expects {expected} bytes, got {actual}")]
    SizeMismatch {
        data_type: String,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, CodecError>;
