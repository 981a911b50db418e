use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use smcprims_channel::ChannelError;
use smcprims_client::SmcError;

use crate::types::SmcResultCode;

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::default();
    });
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    let sanitized = message.into().replace('\0', "?");
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new(sanitized).unwrap_or_default();
    });
}

pub(crate) fn set_invalid_argument(message: impl Into<String>) -> SmcResultCode {
    set_error_message(message);
    SmcResultCode::InvalidArgument
}

pub(crate) fn set_not_open() -> SmcResultCode {
    set_error_message("SMC session is not open");
    SmcResultCode::NotOpen
}

pub(crate) fn set_panic_error() {
    set_error_message("panic across FFI boundary");
}

pub(crate) fn map_smc_error(err: &SmcError) -> SmcResultCode {
    set_error_message(err.to_string());
    match err {
        SmcError::InvalidKeyLength { .. } | SmcError::Codec(_) => SmcResultCode::InvalidArgument,
        SmcError::KeyNotFound(_) => SmcResultCode::KeyNotFound,
        SmcError::TypeMismatch { .. } => SmcResultCode::TypeMismatch,
        SmcError::PermissionDenied(_) => SmcResultCode::PermissionDenied,
        SmcError::Channel(ChannelError::AlreadyOpen) => SmcResultCode::AlreadyOpen,
        SmcError::Channel(ChannelError::Unsupported(_)) => SmcResultCode::Unsupported,
        SmcError::ChannelStatus { .. } | SmcError::IndexStatus { .. } | SmcError::Channel(_) => {
            SmcResultCode::ChannelError
        }
    }
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().as_ptr())
}
