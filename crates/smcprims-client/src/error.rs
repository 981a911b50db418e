use smcprims_channel::ChannelError;
use smcprims_codec::{result, CodecError, DataType, Key, Selector};

/// Errors that can occur in SMC transactions.
#[derive(Debug, thiserror::Error)]
pub enum SmcError {
    /// The key is not exactly four characters.
    #[error("invalid key {key:?} ({len} characters, expected 4)")]
    InvalidKeyLength { key: String, len: usize },

    /// The metadata phase reported that the key does not exist.
    #[error("key {0} not found")]
    KeyNotFound(Key),

    /// The declared size/type disagrees with what the SMC reports.
    #[error(
        "type mismatch for {key}: SMC reports {actual_type} ({actual_size} bytes), \
         expected {declared_type} ({declared_size} bytes)"
    )]
    TypeMismatch {
        key: Key,
        actual_type: DataType,
        actual_size: u32,
        declared_type: DataType,
        declared_size: u32,
    },

    /// The SMC answered with a non-success result code.
    #[error("{selector} for {key} failed: result {code:#04x} ({})", status_name(.code))]
    ChannelStatus {
        key: Key,
        selector: Selector,
        code: u8,
    },

    /// Enumerating the key table failed at `index`.
    #[error("get-key-from-index for index {index} failed: result {code:#04x} ({})", status_name(.code))]
    IndexStatus { index: u32, code: u8 },

    /// The operation requires privileges the process does not have.
    #[error("permission denied: {0}")]
    PermissionDenied(ChannelError),

    /// The channel exchange itself failed.
    #[error("channel error: {0}")]
    Channel(ChannelError),

    /// A value could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(CodecError),
}

impl SmcError {
    /// True when the key does not exist on this machine.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SmcError::KeyNotFound(_))
    }
}

fn status_name(code: &u8) -> &'static str {
    result::name(*code)
}

impl From<CodecError> for SmcError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::InvalidKeyLength { key, len } => SmcError::InvalidKeyLength { key, len },
            other => SmcError::Codec(other),
        }
    }
}

impl From<ChannelError> for SmcError {
    fn from(err: ChannelError) -> Self {
        match err {
            ChannelError::PermissionDenied { .. } => SmcError::PermissionDenied(err),
            ChannelError::Codec(codec) => codec.into(),
            other => SmcError::Channel(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SmcError>;
