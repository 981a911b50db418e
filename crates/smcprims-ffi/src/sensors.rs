use std::os::raw::c_char;

use smcprims_client::{BATTERY_POWERED, OPTICAL_DRIVE_FULL};
use smcprims_codec::TemperatureUnit;

use crate::error;
use crate::session::{required_str_arg, with_session};
use crate::types::{SmcResultCode, SMC_CELSIUS, SMC_FAHRENHEIT, SMC_KELVIN};

/// Record `result`'s error for `smc_last_error`, or clear it on success.
fn reported<T>(result: smcprims_client::Result<T>, sentinel: T) -> T {
    match result {
        Ok(value) => {
            error::clear_error_state();
            value
        }
        Err(err) => {
            let _ = error::map_smc_error(&err);
            sentinel
        }
    }
}

fn unit_from_c(unit: i32) -> Option<TemperatureUnit> {
    match unit {
        SMC_CELSIUS => Some(TemperatureUnit::Celsius),
        SMC_FAHRENHEIT => Some(TemperatureUnit::Fahrenheit),
        SMC_KELVIN => Some(TemperatureUnit::Kelvin),
        _ => None,
    }
}

/// True when `key` names a readable key.
///
/// # Safety
/// `key` must be a non-null pointer to a valid UTF-8, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn smc_is_key_valid(key: *const c_char) -> bool {
    crate::ffi_boundary(false, || {
        // SAFETY: We validate null and UTF-8 in helper.
        let Some(key) = (unsafe { required_str_arg(key, "key") }) else {
            return false;
        };
        with_session(false, |smc| reported(smc.read(key).map(|_| true), false))
    })
}

/// Temperature of probe `key`, or `0.0` on error.
///
/// # Safety
/// `key` must be a non-null pointer to a valid UTF-8, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn smc_get_tmp(key: *const c_char, unit: i32) -> f64 {
    crate::ffi_boundary(0.0, || {
        // SAFETY: We validate null and UTF-8 in helper.
        let Some(key) = (unsafe { required_str_arg(key, "key") }) else {
            return 0.0;
        };
        let Some(unit) = unit_from_c(unit) else {
            let _ = error::set_invalid_argument(format!("unknown temperature unit {unit}"));
            return 0.0;
        };
        with_session(0.0, |smc| reported(smc.read_temperature(key, unit), 0.0))
    })
}

#[no_mangle]
pub extern "C" fn smc_is_battery_powered() -> bool {
    crate::ffi_boundary(false, || {
        with_session(false, |smc| reported(smc.read_flag(BATTERY_POWERED), false))
    })
}

#[no_mangle]
pub extern "C" fn smc_is_optical_disk_drive_full() -> bool {
    crate::ffi_boundary(false, || {
        with_session(false, |smc| reported(smc.read_flag(OPTICAL_DRIVE_FULL), false))
    })
}

/// Number of fans, or `-1` on error.
#[no_mangle]
pub extern "C" fn smc_get_num_fans() -> i32 {
    crate::ffi_boundary(-1, || with_session(-1, |smc| reported(smc.read_fan_count(), -1)))
}

/// Actual speed of fan `index` with the historical fpe2 arithmetic, or `0`.
#[no_mangle]
pub extern "C" fn smc_get_fan_rpm(index: u32) -> u32 {
    crate::ffi_boundary(0, || {
        with_session(0, |smc| reported(smc.read_fan_rpm_legacy(index), 0))
    })
}

/// Copy the name of fan `index` into `buf` as a NUL-terminated string.
///
/// The name is truncated to `len - 1` bytes. Returns false when the name
/// cannot be read or is empty.
///
/// # Safety
/// `buf` must be a non-null pointer to at least `len` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn smc_get_fan_name(index: u32, buf: *mut c_char, len: usize) -> bool {
    crate::ffi_boundary(false, || {
        if buf.is_null() || len == 0 {
            let _ = error::set_invalid_argument("buf must be non-null with len > 0");
            return false;
        }
        let name = with_session(String::new(), |smc| {
            reported(smc.read_fan_name(index), String::new())
        });
        let bytes: Vec<u8> = name.chars().map(|c| c as u8).collect();
        let n = bytes.len().min(len - 1);

        // SAFETY: `buf` holds at least `len` bytes and `n < len`.
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), n);
            *buf.add(n) = 0;
        }
        !bytes.is_empty()
    })
}

/// Set the minimum speed of fan `index`. Requires a privileged process.
#[no_mangle]
pub extern "C" fn smc_set_fan_min_rpm(index: u32, rpm: u32) -> SmcResultCode {
    crate::ffi_boundary(SmcResultCode::Internal, || {
        with_session(SmcResultCode::NotOpen, |smc| {
            match smc.set_fan_min_rpm(index, rpm) {
                Ok(()) => {
                    error::clear_error_state();
                    SmcResultCode::Ok
                }
                Err(err) => error::map_smc_error(&err),
            }
        })
    })
}
