//! Typed access to the Apple System Management Controller.
//!
//! smcprims reads temperatures, fan speeds, and status flags from the SMC
//! and writes fan minimums, using the two-phase (metadata, then data) key
//! protocol of the AppleSMC driver. A simulated SMC runs the same protocol
//! without hardware.
//!
//! # Crate Structure
//!
//! - [`codec`] — Keys, type tags, fixed-point values, the 80-byte parameter block
//! - [`channel`] — The `SmcChannel` trait, the IOKit driver channel, the simulated SMC
//! - [`client`] — Sessions, transactions, and sensor/fan operations (behind `client` feature)

/// Re-export codec types.
pub mod codec {
    pub use smcprims_codec::*;
}

/// Re-export channel types.
pub mod channel {
    pub use smcprims_channel::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use smcprims_client::*;
}
