//! SMC sessions, two-phase key transactions, and typed sensor access.
//!
//! This is the layer applications use. Open a session, then read
//! temperatures, fan speeds, and flags, or write fan minimums:
//!
//! ```no_run
//! use smcprims_client::{open, SessionConfig};
//! use smcprims_codec::TemperatureUnit;
//!
//! let mut smc = open(&SessionConfig::default())?;
//! let cpu = smc.temperature("TC0P", TemperatureUnit::Celsius);
//! let fans = smc.fan_count();
//! println!("cpu {cpu} fans {fans}");
//! # Ok::<(), smcprims_client::SmcError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod sensors;
pub mod session;
pub mod transaction;

pub use catalog::{
    CatalogEntry, CatalogError, KeyCatalog, SensorKind, BATTERY_POWERED, FAN_COUNT,
    OPTICAL_DRIVE_FULL,
};
pub use config::SessionConfig;
pub use error::{Result, SmcError};
pub use sensors::{FanKey, FanReading, TemperatureReading};
pub use session::{open, SharedSmc, Smc, SystemSmc, KEY_COUNT};
pub use transaction::KeyValue;
