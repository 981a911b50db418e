//! smcprims-ffi: C-ABI exports for SMC sensor and fan access.
//!
//! The C interface keeps one process-wide session. `smc_open` (or
//! `smc_open_simulated`) creates it, `smc_close` drops it, and every other
//! call runs against it under a mutex. Read calls return sentinels on error;
//! the reason is available from `smc_last_error` on the calling thread until
//! the next successful call clears it.

mod error;
mod sensors;
mod session;
mod types;

use std::panic::AssertUnwindSafe;

pub use sensors::{
    smc_get_fan_name, smc_get_fan_rpm, smc_get_num_fans, smc_get_tmp, smc_is_battery_powered,
    smc_is_key_valid, smc_is_optical_disk_drive_full, smc_set_fan_min_rpm,
};
pub use session::{smc_close, smc_open, smc_open_simulated};
pub use types::{
    SmcResultCode, SMC_CELSIUS, SMC_ERR_ALREADY_OPEN, SMC_ERR_CHANNEL, SMC_ERR_INTERNAL,
    SMC_ERR_INVALID_ARGUMENT, SMC_ERR_KEY_NOT_FOUND, SMC_ERR_NOT_OPEN, SMC_ERR_PERMISSION_DENIED,
    SMC_ERR_TYPE_MISMATCH, SMC_ERR_UNSUPPORTED, SMC_FAHRENHEIT, SMC_KELVIN, SMC_OK,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

#[no_mangle]
pub extern "C" fn smc_init() -> SmcResultCode {
    ffi_boundary(SmcResultCode::Internal, || {
        error::clear_error_state();
        SmcResultCode::Ok
    })
}

#[no_mangle]
pub extern "C" fn smc_cleanup() {
    ffi_boundary((), || {
        let _ = smc_close();
        error::clear_error_state();
    });
}

#[no_mangle]
pub extern "C" fn smc_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}

#[cfg(test)]
mod tests {
    use std::ffi::{CStr, CString};
    use std::path::PathBuf;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use super::*;

    // The session is process-wide; tests that touch it run one at a time.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    fn serial() -> MutexGuard<'static, ()> {
        let guard = TEST_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        smc_close();
        guard
    }

    fn last_error() -> String {
        // SAFETY: smc_last_error returns a pointer to a thread-local CString.
        unsafe { CStr::from_ptr(smc_last_error()).to_str().unwrap().to_string() }
    }

    fn write_snapshot(name: &str, privileged: bool) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "smcprims-ffi-{}-{}-{}",
            name,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        let path = dir.join("smc.json");
        let json = format!(
            r#"{{ "privileged": {privileged}, "keys": [
                {{ "key": "TC0P", "type": "sp78", "bytes": [25, 0] }},
                {{ "key": "BATP", "type": "flag", "bytes": [1] }},
                {{ "key": "MSDI", "type": "flag", "bytes": [0] }},
                {{ "key": "FNum", "type": "ui8 ", "bytes": [2] }},
                {{ "key": "F0Ac", "type": "fpe2", "bytes": [18, 192] }},
                {{ "key": "F0Mn", "type": "fpe2", "bytes": [15, 160], "writable": true }},
                {{ "key": "F0ID", "type": "{{fds", "bytes": [0, 0, 0, 0, 77, 97, 105, 110, 32, 0, 0, 0, 0, 0, 0, 0] }}
            ] }}"#
        );
        std::fs::write(&path, json).expect("snapshot should be writable");
        path
    }

    fn open_snapshot(path: &PathBuf) -> SmcResultCode {
        let c_path = CString::new(path.to_str().unwrap()).unwrap();
        // SAFETY: c_path is a valid NUL-terminated string.
        unsafe { smc_open_simulated(c_path.as_ptr()) }
    }

    #[test]
    fn init_and_cleanup_are_ok() {
        let _guard = serial();
        assert_eq!(smc_init(), SmcResultCode::Ok);
        smc_cleanup();
        assert!(last_error().is_empty());
    }

    #[test]
    fn calls_without_session_return_sentinels() {
        let _guard = serial();
        assert_eq!(smc_get_num_fans(), -1);
        assert_eq!(last_error(), "SMC session is not open");
        assert_eq!(smc_get_fan_rpm(0), 0);
        assert!(!smc_is_battery_powered());
        assert_eq!(smc_set_fan_min_rpm(0, 1000), SmcResultCode::NotOpen);
    }

    #[test]
    fn simulated_session_reads_sensors() {
        let _guard = serial();
        let path = write_snapshot("reads", true);
        assert_eq!(open_snapshot(&path), SmcResultCode::Ok);

        let key = CString::new("TC0P").unwrap();
        let missing = CString::new("TC9P").unwrap();
        // SAFETY: keys are valid NUL-terminated strings.
        unsafe {
            assert!(smc_is_key_valid(key.as_ptr()));
            assert!(!smc_is_key_valid(missing.as_ptr()));
            assert_eq!(smc_get_tmp(key.as_ptr(), SMC_FAHRENHEIT), 77.0);
            assert_eq!(smc_get_tmp(key.as_ptr(), 7), 0.0);
        }
        assert!(smc_is_battery_powered());
        assert!(!smc_is_optical_disk_drive_full());
        assert_eq!(smc_get_num_fans(), 2);
        // Historical arithmetic: (18 << 6) + (192 << 2).
        assert_eq!(smc_get_fan_rpm(0), 1920);

        let mut buf = [0 as std::os::raw::c_char; 16];
        // SAFETY: buf is writable for its full length.
        let ok = unsafe { smc_get_fan_name(0, buf.as_mut_ptr(), buf.len()) };
        assert!(ok);
        // SAFETY: smc_get_fan_name NUL-terminates the buffer.
        let name = unsafe { CStr::from_ptr(buf.as_ptr()) };
        assert_eq!(name.to_str().unwrap(), "Main");

        assert_eq!(smc_close(), SmcResultCode::Ok);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn sentinel_reads_record_their_reason() {
        let _guard = serial();
        let path = write_snapshot("reasons", true);
        let dir = path.parent().unwrap().to_path_buf();
        let wrong_type = dir.join("wrong-type.json");
        std::fs::write(
            &wrong_type,
            r#"{ "keys": [ { "key": "TC0P", "type": "ui16", "bytes": [0, 25] } ] }"#,
        )
        .unwrap();
        assert_eq!(open_snapshot(&wrong_type), SmcResultCode::Ok);

        let missing = CString::new("TC9P").unwrap();
        let mistyped = CString::new("TC0P").unwrap();
        // SAFETY: keys are valid NUL-terminated strings.
        unsafe {
            assert_eq!(smc_get_tmp(missing.as_ptr(), SMC_CELSIUS), 0.0);
            assert!(last_error().contains("not found"), "{}", last_error());
            assert_eq!(smc_get_tmp(mistyped.as_ptr(), SMC_CELSIUS), 0.0);
            assert!(last_error().contains("type mismatch"), "{}", last_error());
        }
        assert_eq!(smc_get_num_fans(), -1);
        assert!(last_error().contains("FNum"), "{}", last_error());
        smc_close();

        // A successful read clears the reason left by an earlier failure.
        assert_eq!(open_snapshot(&path), SmcResultCode::Ok);
        assert_eq!(smc_get_fan_rpm(5), 0);
        assert!(!last_error().is_empty());
        assert_eq!(smc_get_num_fans(), 2);
        assert!(last_error().is_empty());
        smc_close();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn second_open_is_rejected() {
        let _guard = serial();
        let path = write_snapshot("twice", true);
        assert_eq!(open_snapshot(&path), SmcResultCode::Ok);
        assert_eq!(open_snapshot(&path), SmcResultCode::AlreadyOpen);
        assert_eq!(smc_close(), SmcResultCode::Ok);
        assert_eq!(open_snapshot(&path), SmcResultCode::Ok);
        smc_close();
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn fan_min_write_reports_privilege() {
        let _guard = serial();
        let path = write_snapshot("denied", false);
        assert_eq!(open_snapshot(&path), SmcResultCode::Ok);
        assert_eq!(smc_set_fan_min_rpm(0, 2000), SmcResultCode::PermissionDenied);
        assert!(last_error().contains("permission denied"));
        assert_eq!(smc_set_fan_min_rpm(9, 2000), SmcResultCode::KeyNotFound);
        smc_close();

        let path_ok = write_snapshot("allowed", true);
        assert_eq!(open_snapshot(&path_ok), SmcResultCode::Ok);
        assert_eq!(smc_set_fan_min_rpm(0, 2000), SmcResultCode::Ok);
        smc_close();

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
        let _ = std::fs::remove_dir_all(path_ok.parent().unwrap());
    }

    #[test]
    fn null_arguments_are_rejected() {
        let _guard = serial();
        // SAFETY: null is handled by the argument helper.
        unsafe {
            assert_eq!(
                smc_open_simulated(std::ptr::null()),
                SmcResultCode::InvalidArgument
            );
            assert_eq!(smc_get_tmp(std::ptr::null(), SMC_CELSIUS), 0.0);
            assert!(!smc_get_fan_name(0, std::ptr::null_mut(), 8));
        }
        assert!(!last_error().is_empty());
    }

    #[test]
    fn missing_snapshot_is_channel_error() {
        let _guard = serial();
        let path = PathBuf::from("/nonexistent/smcprims/smc.json");
        assert_eq!(open_snapshot(&path), SmcResultCode::ChannelError);
        assert!(!last_error().is_empty());

        let dir = write_snapshot("bad-key", true).parent().unwrap().to_path_buf();
        let bad_key = dir.join("bad-key.json");
        std::fs::write(
            &bad_key,
            r#"{ "keys": [ { "key": "TOOLONG", "type": "ui8 ", "bytes": [1] } ] }"#,
        )
        .unwrap();
        assert_eq!(open_snapshot(&bad_key), SmcResultCode::ChannelError);
        assert!(last_error().contains("TOOLONG"));
        let _ = std::fs::remove_dir_all(dir);
    }
}
