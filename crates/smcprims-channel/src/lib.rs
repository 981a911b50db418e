//! Privileged channel to the Apple System Management Controller.
//!
//! The [`SmcChannel`] trait is the only thing the transaction layer sees:
//! send one 80-byte parameter block, get one back. Implementations:
//! - [`IoKitChannel`] — the AppleSMC IOKit user client (macOS)
//! - [`SimulatedSmc`] — an in-memory SMC for tests and hardware-less runs

pub mod error;
pub mod sim;
pub mod traits;

#[cfg(target_os = "macos")]
pub mod iokit;

pub use error::{kern, ChannelError, Result};
pub use sim::{SimCall, SimEntry, SimKeySpec, SimSnapshot, SimulatedSmc};
pub use traits::SmcChannel;

#[cfg(target_os = "macos")]
pub use iokit::{machine_model, IoKitChannel};

/// Name of the SMC IOService in the IORegistry.
pub const DEFAULT_SERVICE_NAME: &str = "AppleSMC";
