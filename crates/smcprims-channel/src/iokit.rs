use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::sync::atomic::{AtomicBool, Ordering};

use smcprims_codec::{decode_params, SmcParams, HANDLE_YPC_EVENT, PARAM_BLOCK_SIZE};
use tracing::{debug, info, warn};

use crate::error::{kern, ChannelError, Result};
use crate::traits::SmcChannel;
use crate::DEFAULT_SERVICE_NAME;

#[allow(non_camel_case_types)]
type kern_return_t = libc::c_int;
#[allow(non_camel_case_types)]
type mach_port_t = libc::c_uint;
#[allow(non_camel_case_types)]
type io_object_t = mach_port_t;
#[allow(non_camel_case_types)]
type io_service_t = io_object_t;
#[allow(non_camel_case_types)]
type io_connect_t = io_object_t;

/// `kIOMainPortDefault` is `MACH_PORT_NULL`.
const MAIN_PORT_DEFAULT: mach_port_t = 0;

/// Registry entry that carries the machine model name.
const PLATFORM_EXPERT_SERVICE: &str = "IOPlatformExpertDevice";

/// `io_name_t` is `char[128]`.
const IO_NAME_LEN: usize = 128;

#[link(name = "IOKit", kind = "framework")]
extern "C" {
    fn IOServiceMatching(name: *const c_char) -> *mut c_void;
    fn IOServiceGetMatchingService(main_port: mach_port_t, matching: *mut c_void) -> io_service_t;
    fn IOServiceOpen(
        service: io_service_t,
        owning_task: mach_port_t,
        kind: u32,
        connect: *mut io_connect_t,
    ) -> kern_return_t;
    fn IOServiceClose(connect: io_connect_t) -> kern_return_t;
    fn IOObjectRelease(object: io_object_t) -> kern_return_t;
    fn IOConnectCallStructMethod(
        connection: io_connect_t,
        selector: u32,
        input: *const c_void,
        input_size: usize,
        output: *mut c_void,
        output_size: *mut usize,
    ) -> kern_return_t;
    fn IORegistryEntryGetName(entry: io_object_t, name: *mut c_char) -> kern_return_t;
}

extern "C" {
    static mach_task_self_: mach_port_t;
}

/// Set while an [`IoKitChannel`] is alive. The driver does not define what
/// happens when one process opens the user client twice.
static CHANNEL_OPEN: AtomicBool = AtomicBool::new(false);

/// Channel to the AppleSMC kernel extension through its IOKit user client.
///
/// At most one exists per process. The connection is closed on drop.
pub struct IoKitChannel {
    conn: io_connect_t,
    service: String,
}

impl IoKitChannel {
    /// Open the default `AppleSMC` service.
    pub fn open() -> Result<Self> {
        Self::open_service(DEFAULT_SERVICE_NAME)
    }

    /// Open a user client on the named IOService.
    pub fn open_service(service: &str) -> Result<Self> {
        if CHANNEL_OPEN
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ChannelError::AlreadyOpen);
        }

        match open_connection(service) {
            Ok(conn) => {
                info!(service, "opened SMC channel");
                Ok(Self {
                    conn,
                    service: service.to_string(),
                })
            }
            Err(err) => {
                CHANNEL_OPEN.store(false, Ordering::Release);
                Err(err)
            }
        }
    }

    /// Close the connection and report the driver's answer.
    pub fn close(mut self) -> Result<()> {
        let code = self.release();
        if code == kern::IO_RETURN_SUCCESS {
            Ok(())
        } else {
            Err(ChannelError::from_kern_return("close", code))
        }
    }

    /// The IOService this channel is connected to.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn release(&mut self) -> kern_return_t {
        if self.conn == 0 {
            return kern::IO_RETURN_SUCCESS;
        }
        // SAFETY: `conn` was returned by a successful IOServiceOpen and is
        // zeroed after this call, so it is closed exactly once.
        let code = unsafe { IOServiceClose(self.conn) };
        self.conn = 0;
        CHANNEL_OPEN.store(false, Ordering::Release);
        debug!(service = %self.service, code, "closed SMC channel");
        code
    }
}

impl SmcChannel for IoKitChannel {
    fn call(&mut self, request: &SmcParams) -> Result<SmcParams> {
        let input = request.to_bytes();
        let mut output = [0u8; PARAM_BLOCK_SIZE];
        let mut output_size = PARAM_BLOCK_SIZE;

        // SAFETY: both buffers are PARAM_BLOCK_SIZE bytes, matching the sizes
        // passed in; `conn` is an open user client.
        let code = unsafe {
            IOConnectCallStructMethod(
                self.conn,
                HANDLE_YPC_EVENT,
                input.as_ptr().cast::<c_void>(),
                input.len(),
                output.as_mut_ptr().cast::<c_void>(),
                &mut output_size,
            )
        };

        if code != kern::IO_RETURN_SUCCESS {
            let operation = request.selector().map(|s| s.name()).unwrap_or("call");
            return Err(ChannelError::from_kern_return(operation, code));
        }

        Ok(decode_params(&output[..output_size.min(PARAM_BLOCK_SIZE)])?)
    }

    fn channel_name(&self) -> &'static str {
        "iokit"
    }
}

impl Drop for IoKitChannel {
    fn drop(&mut self) {
        let code = self.release();
        if code != kern::IO_RETURN_SUCCESS {
            warn!(service = %self.service, code, "SMC channel close failed");
        }
    }
}

impl std::fmt::Debug for IoKitChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoKitChannel")
            .field("service", &self.service)
            .field("open", &(self.conn != 0))
            .finish()
    }
}

/// Registry name of the platform expert device, e.g. `MacBookPro11,1`.
pub fn machine_model() -> Result<String> {
    let service = matching_service(PLATFORM_EXPERT_SERVICE)?;
    let mut name = [0 as c_char; IO_NAME_LEN];

    // SAFETY: `name` is an io_name_t sized buffer; `service` is a live
    // registry entry released right after.
    let code = unsafe {
        let code = IORegistryEntryGetName(service, name.as_mut_ptr());
        IOObjectRelease(service);
        code
    };
    if code != kern::IO_RETURN_SUCCESS {
        return Err(ChannelError::Call { code });
    }

    // SAFETY: IORegistryEntryGetName NUL-terminates within io_name_t.
    let model = unsafe { CStr::from_ptr(name.as_ptr()) };
    Ok(model.to_string_lossy().into_owned())
}

fn matching_service(service: &str) -> Result<io_service_t> {
    let name = CString::new(service).map_err(|_| ChannelError::ServiceNotFound {
        service: service.to_string(),
    })?;

    // SAFETY: IOServiceMatching copies `name`; IOServiceGetMatchingService
    // consumes the returned dictionary reference.
    let handle = unsafe {
        let matching = IOServiceMatching(name.as_ptr());
        IOServiceGetMatchingService(MAIN_PORT_DEFAULT, matching)
    };

    if handle == 0 {
        return Err(ChannelError::ServiceNotFound {
            service: service.to_string(),
        });
    }
    Ok(handle)
}

fn open_connection(service: &str) -> Result<io_connect_t> {
    let handle = matching_service(service)?;
    let mut conn: io_connect_t = 0;

    // SAFETY: `handle` is a live service object released right after the
    // open; `conn` is a valid out-pointer.
    let code = unsafe {
        let code = IOServiceOpen(handle, mach_task_self_, 0, &mut conn);
        IOObjectRelease(handle);
        code
    };

    if code == kern::IO_RETURN_SUCCESS {
        return Ok(conn);
    }
    if kern::is_privilege_error(code) {
        return Err(ChannelError::PermissionDenied {
            operation: "open",
            code,
        });
    }
    Err(ChannelError::Open {
        service: service.to_string(),
        code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_service_is_not_found() {
        let err = IoKitChannel::open_service("smcprims-no-such-service").unwrap_err();
        assert!(matches!(err, ChannelError::ServiceNotFound { .. }));
        // A failed open must not leave the singleton flag set.
        assert!(!CHANNEL_OPEN.load(Ordering::Acquire));
    }
}
