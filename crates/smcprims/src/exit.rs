use std::fmt;

use smcprims_channel::ChannelError;
use smcprims_client::{CatalogError, SmcError};

pub const SUCCESS: i32 = 0;
pub const CHANNEL_ERROR: i32 = 3;
pub const NOT_FOUND: i32 = 4;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn channel_error(context: &str, err: ChannelError) -> CliError {
    let code = match &err {
        ChannelError::PermissionDenied { .. } => PERMISSION_DENIED,
        ChannelError::ServiceNotFound { .. } => NOT_FOUND,
        ChannelError::Snapshot(_) | ChannelError::Codec(_) => DATA_INVALID,
        ChannelError::Open { .. }
        | ChannelError::Call { .. }
        | ChannelError::Unsupported(_)
        | ChannelError::AlreadyOpen => CHANNEL_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn smc_error(context: &str, err: SmcError) -> CliError {
    match err {
        SmcError::Channel(err) => channel_error(context, err),
        SmcError::InvalidKeyLength { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        SmcError::KeyNotFound(_) => CliError::new(NOT_FOUND, format!("{context}: {err}")),
        SmcError::TypeMismatch { .. } | SmcError::Codec(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        SmcError::PermissionDenied(_) => {
            CliError::new(PERMISSION_DENIED, format!("{context}: {err}"))
        }
        SmcError::ChannelStatus { .. } | SmcError::IndexStatus { .. } => {
            CliError::new(CHANNEL_ERROR, format!("{context}: {err}"))
        }
    }
}

pub fn catalog_error(err: CatalogError) -> CliError {
    let code = match err {
        CatalogError::Io { .. } => NOT_FOUND,
        _ => DATA_INVALID,
    };
    CliError::new(code, format!("catalog: {err}"))
}

#[cfg(test)]
mod tests {
    use smcprims_channel::kern;
    use smcprims_codec::{result, DataType, Key, Selector};

    use super::*;

    #[test]
    fn smc_errors_map_to_exit_codes() {
        let key = Key::new("F0Mn").unwrap();
        assert_eq!(smc_error("x", SmcError::KeyNotFound(key)).code, NOT_FOUND);
        assert_eq!(
            smc_error(
                "x",
                SmcError::TypeMismatch {
                    key,
                    actual_type: DataType::FPE2,
                    actual_size: 2,
                    declared_type: DataType::UINT8,
                    declared_size: 1,
                }
            )
            .code,
            DATA_INVALID
        );
        assert_eq!(
            smc_error(
                "x",
                SmcError::ChannelStatus {
                    key,
                    selector: Selector::WriteKey,
                    code: result::KEY_NOT_WRITABLE,
                }
            )
            .code,
            CHANNEL_ERROR
        );
        let denied = ChannelError::PermissionDenied {
            operation: "write-key",
            code: kern::IO_RETURN_NOT_PRIVILEGED,
        };
        assert_eq!(smc_error("x", denied.into()).code, PERMISSION_DENIED);
    }

    #[test]
    fn message_keeps_context() {
        let err = channel_error("open", ChannelError::Unsupported("no driver".to_string()));
        assert_eq!(err.to_string(), "open: unsupported: no driver");
    }
}
