use smcprims_codec::CodecError;

/// IOKit `kern_return_t` values the channel distinguishes.
pub mod kern {
    pub const IO_RETURN_SUCCESS: i32 = 0;
    pub const IO_RETURN_ERROR: i32 = 0xE000_02BC_u32 as i32;
    pub const IO_RETURN_NOT_PRIVILEGED: i32 = 0xE000_02C1_u32 as i32;
    pub const IO_RETURN_BAD_ARGUMENT: i32 = 0xE000_02C2_u32 as i32;
    pub const IO_RETURN_NOT_PERMITTED: i32 = 0xE000_02E2_u32 as i32;
    pub const IO_RETURN_NOT_FOUND: i32 = 0xE000_02F0_u32 as i32;

    /// Strip the system/subsystem bits (`err_get_code`).
    pub fn code(value: i32) -> i32 {
        value & 0x3FFF
    }

    /// True for authorization failures.
    pub fn is_privilege_error(value: i32) -> bool {
        let code = code(value);
        code == self::code(IO_RETURN_NOT_PRIVILEGED) || code == self::code(IO_RETURN_NOT_PERMITTED)
    }
}

/// Errors that can occur on the privileged SMC channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// No IOService with the requested name is registered.
    #[error("IOService {service:?} not found")]
    ServiceNotFound { service: String },

    /// Opening the user client failed.
    #[error("failed to open {service:?}: kern_return {code:#010x}")]
    Open { service: String, code: i32 },

    /// The caller lacks the privilege the operation requires.
    #[error("{operation} not permitted: kern_return {code:#010x}")]
    PermissionDenied { operation: &'static str, code: i32 },

    /// The struct-method call itself failed.
    #[error("SMC call failed: kern_return {code:#010x}")]
    Call { code: i32 },

    /// A channel to the SMC is already open in this process.
    #[error("SMC channel already open in this process")]
    AlreadyOpen,

    /// The channel is not available on this platform.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A simulated SMC snapshot could not be loaded.
    #[error("invalid SMC snapshot: {0}")]
    Snapshot(String),

    /// The parameter block could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl ChannelError {
    /// Classify a failed `kern_return_t` from a call.
    pub fn from_kern_return(operation: &'static str, code: i32) -> Self {
        if kern::is_privilege_error(code) {
            ChannelError::PermissionDenied { operation, code }
        } else {
            ChannelError::Call { code }
        }
    }

    /// True when the failure is an authorization failure.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, ChannelError::PermissionDenied { .. })
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privilege_errors_are_classified() {
        let err = ChannelError::from_kern_return("write-key", kern::IO_RETURN_NOT_PRIVILEGED);
        assert!(err.is_permission_denied());

        let err = ChannelError::from_kern_return("open", kern::IO_RETURN_NOT_PERMITTED);
        assert!(err.is_permission_denied());

        // err_get_code-reduced values classify the same way.
        let err = ChannelError::from_kern_return("call", kern::code(kern::IO_RETURN_NOT_PRIVILEGED));
        assert!(err.is_permission_denied());
    }

    #[test]
    fn other_failures_are_call_errors() {
        let err = ChannelError::from_kern_return("call", kern::IO_RETURN_BAD_ARGUMENT);
        assert!(matches!(err, ChannelError::Call { .. }));
        assert!(err.to_string().contains("0xe00002c2"));
    }
}
