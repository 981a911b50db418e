use smcprims_codec::SmcParams;

use crate::error::Result;

/// A connection that carries SMC parameter blocks.
///
/// One call is one request/response exchange. Implementations are not
/// required to be reentrant; callers serialize access per channel.
pub trait SmcChannel {
    /// Send `request` and return the SMC's response block.
    ///
    /// A non-success SMC result code is a successful call: it comes back in
    /// `response.result`. `Err` means the exchange itself failed.
    fn call(&mut self, request: &SmcParams) -> Result<SmcParams>;

    /// Channel name for diagnostics.
    fn channel_name(&self) -> &'static str;
}

impl<T: SmcChannel + ?Sized> SmcChannel for Box<T> {
    fn call(&mut self, request: &SmcParams) -> Result<SmcParams> {
        (**self).call(request)
    }

    fn channel_name(&self) -> &'static str {
        (**self).channel_name()
    }
}

impl<T: SmcChannel + ?Sized> SmcChannel for &mut T {
    fn call(&mut self, request: &SmcParams) -> Result<SmcParams> {
        (**self).call(request)
    }

    fn channel_name(&self) -> &'static str {
        (**self).channel_name()
    }
}
