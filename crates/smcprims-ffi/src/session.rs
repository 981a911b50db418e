use std::ffi::CStr;
use std::os::raw::c_char;
use std::sync::{Mutex, MutexGuard, PoisonError};

use smcprims_client::{SessionConfig, SystemSmc};
use tracing::debug;

use crate::error;
use crate::types::SmcResultCode;

static SESSION: Mutex<Option<SystemSmc>> = Mutex::new(None);

fn session() -> MutexGuard<'static, Option<SystemSmc>> {
    SESSION.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run `f` against the open session, or record `NotOpen` and return `on_error`.
pub(crate) fn with_session<T>(on_error: T, f: impl FnOnce(&mut SystemSmc) -> T) -> T {
    match session().as_mut() {
        Some(smc) => f(smc),
        None => {
            let _ = error::set_not_open();
            on_error
        }
    }
}

/// Convert a required C string argument into UTF-8 `&str`.
///
/// # Safety
/// `value` must be null or point to a valid NUL-terminated C string.
pub(crate) unsafe fn required_str_arg<'a>(value: *const c_char, name: &str) -> Option<&'a str> {
    if value.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null"));
        return None;
    }

    // SAFETY: The caller guarantees `value` points to a valid NUL-terminated C string.
    let value = unsafe { CStr::from_ptr(value) };
    match value.to_str() {
        Ok(v) => Some(v),
        Err(_) => {
            let _ = error::set_invalid_argument(format!("{name} must be valid UTF-8"));
            None
        }
    }
}

fn open_with(config: &SessionConfig) -> SmcResultCode {
    let mut slot = session();
    if slot.is_some() {
        error::set_error_message("SMC session is already open");
        return SmcResultCode::AlreadyOpen;
    }
    match smcprims_client::open(config) {
        Ok(smc) => {
            debug!(session = ?smc, "SMC session opened");
            *slot = Some(smc);
            error::clear_error_state();
            SmcResultCode::Ok
        }
        Err(err) => error::map_smc_error(&err),
    }
}

/// Open the process-wide session on the AppleSMC driver.
#[no_mangle]
pub extern "C" fn smc_open() -> SmcResultCode {
    crate::ffi_boundary(SmcResultCode::Internal, || {
        open_with(&SessionConfig::default())
    })
}

/// Open the process-wide session on a simulated SMC snapshot.
///
/// # Safety
/// `path` must be a non-null pointer to a valid UTF-8, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn smc_open_simulated(path: *const c_char) -> SmcResultCode {
    crate::ffi_boundary(SmcResultCode::Internal, || {
        // SAFETY: We validate null and UTF-8 in helper.
        let Some(path) = (unsafe { required_str_arg(path, "path") }) else {
            return SmcResultCode::InvalidArgument;
        };
        open_with(&SessionConfig::default().with_simulation(path))
    })
}

/// Close the process-wide session. Closing when nothing is open is a no-op.
#[no_mangle]
pub extern "C" fn smc_close() -> SmcResultCode {
    crate::ffi_boundary(SmcResultCode::Internal, || {
        if session().take().is_some() {
            debug!("SMC session closed");
        }
        SmcResultCode::Ok
    })
}
