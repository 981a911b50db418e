/// Status codes returned by the C interface.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmcResultCode {
    Ok = 0,
    InvalidArgument = 1,
    NotOpen = 2,
    AlreadyOpen = 3,
    KeyNotFound = 4,
    TypeMismatch = 5,
    PermissionDenied = 6,
    ChannelError = 7,
    Unsupported = 8,
    Internal = 99,
}

#[allow(dead_code)]
pub const SMC_OK: SmcResultCode = SmcResultCode::Ok;
#[allow(dead_code)]
pub const SMC_ERR_INVALID_ARGUMENT: SmcResultCode = SmcResultCode::InvalidArgument;
#[allow(dead_code)]
pub const SMC_ERR_NOT_OPEN: SmcResultCode = SmcResultCode::NotOpen;
#[allow(dead_code)]
pub const SMC_ERR_ALREADY_OPEN: SmcResultCode = SmcResultCode::AlreadyOpen;
#[allow(dead_code)]
pub const SMC_ERR_KEY_NOT_FOUND: SmcResultCode = SmcResultCode::KeyNotFound;
#[allow(dead_code)]
pub const SMC_ERR_TYPE_MISMATCH: SmcResultCode = SmcResultCode::TypeMismatch;
#[allow(dead_code)]
pub const SMC_ERR_PERMISSION_DENIED: SmcResultCode = SmcResultCode::PermissionDenied;
#[allow(dead_code)]
pub const SMC_ERR_CHANNEL: SmcResultCode = SmcResultCode::ChannelError;
#[allow(dead_code)]
pub const SMC_ERR_UNSUPPORTED: SmcResultCode = SmcResultCode::Unsupported;
#[allow(dead_code)]
pub const SMC_ERR_INTERNAL: SmcResultCode = SmcResultCode::Internal;

/// Temperature unit argument of `smc_get_tmp`.
#[allow(dead_code)]
pub const SMC_CELSIUS: i32 = 0;
#[allow(dead_code)]
pub const SMC_FAHRENHEIT: i32 = 1;
#[allow(dead_code)]
pub const SMC_KELVIN: i32 = 2;
