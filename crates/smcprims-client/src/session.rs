use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use smcprims_channel::{SimulatedSmc, SmcChannel};
use smcprims_codec::{Key, KeyInfo, Value};
use tracing::info;

use crate::config::SessionConfig;
use crate::error::{Result, SmcError};
use crate::transaction::{self, KeyValue};

/// Key holding the number of keys the SMC exposes.
pub const KEY_COUNT: Key = Key::from_bytes(*b"#KEY");

/// A session owning one channel to the SMC.
///
/// Methods take `&mut self`, so the two phases of a transaction cannot
/// interleave with another transaction on the same session. Dropping the
/// session drops the channel, which closes the connection.
pub struct Smc<C> {
    channel: C,
}

impl<C: SmcChannel> std::fmt::Debug for Smc<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Smc")
            .field("channel", &self.channel.channel_name())
            .finish()
    }
}

/// Session over whichever channel [`open`] selected.
pub type SystemSmc = Smc<Box<dyn SmcChannel + Send>>;

impl<C: SmcChannel> Smc<C> {
    /// Wrap an open channel.
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Read a key (metadata, then data).
    pub fn read_key(&mut self, key: Key) -> Result<KeyValue> {
        transaction::read_key(&mut self.channel, key)
    }

    /// Parse and read a textual key.
    pub fn read(&mut self, key: &str) -> Result<KeyValue> {
        self.read_key(Key::new(key)?)
    }

    /// Write a value after validating it against the key's metadata.
    pub fn write_key(&mut self, value: &KeyValue) -> Result<()> {
        transaction::write_key(&mut self.channel, value)
    }

    /// Encode and write a typed value.
    pub fn write_value(&mut self, key: Key, value: &Value) -> Result<()> {
        self.write_key(&KeyValue::from_value(key, value)?)
    }

    /// Size and type of a key, without reading its data.
    pub fn key_info(&mut self, key: Key) -> Result<KeyInfo> {
        transaction::key_info(&mut self.channel, key)
    }

    /// True when `key` is a 4-character key that can be read.
    ///
    /// Use this to tell "absent" apart from "reads zero" before calling the
    /// sentinel-returning sensor methods.
    pub fn is_key_valid(&mut self, key: &str) -> bool {
        self.read(key).is_ok()
    }

    /// Number of keys the SMC exposes.
    pub fn key_count(&mut self) -> Result<u32> {
        let value = self.read_key(KEY_COUNT)?;
        match value.decode()? {
            Value::U32(count) => Ok(count),
            _ => Err(SmcError::TypeMismatch {
                key: KEY_COUNT,
                actual_type: value.data_type,
                actual_size: value.size,
                declared_type: smcprims_codec::DataType::UINT32,
                declared_size: 4,
            }),
        }
    }

    /// Key at position `index` of the SMC's key table.
    pub fn key_at_index(&mut self, index: u32) -> Result<Key> {
        transaction::key_at_index(&mut self.channel, index)
    }

    /// Borrow the channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Mutably borrow the channel.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Consume the session and return the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}

/// Open a session as described by `config`.
///
/// With `simulation` set, the snapshot is loaded into a [`SimulatedSmc`];
/// otherwise the AppleSMC driver is opened (macOS only).
pub fn open(config: &SessionConfig) -> Result<SystemSmc> {
    if let Some(path) = &config.simulation {
        let smc = SimulatedSmc::from_path(path)?;
        info!(path = %path.display(), "using simulated SMC");
        let channel: Box<dyn SmcChannel + Send> = Box::new(smc);
        return Ok(Smc::new(channel));
    }

    #[cfg(target_os = "macos")]
    {
        let channel: Box<dyn SmcChannel + Send> = Box::new(
            smcprims_channel::IoKitChannel::open_service(&config.service_name)?,
        );
        Ok(Smc::new(channel))
    }

    #[cfg(not(target_os = "macos"))]
    {
        Err(SmcError::Channel(
            smcprims_channel::ChannelError::Unsupported(format!(
                "IOService {} requires macOS; use a simulated SMC snapshot",
                config.service_name
            )),
        ))
    }
}

/// A cloneable, thread-safe session handle.
///
/// Each clone shares one channel. The mutex is held for a whole operation,
/// so the metadata phase of one caller never interleaves with the data phase
/// of another.
pub struct SharedSmc<C> {
    inner: Arc<Mutex<Smc<C>>>,
}

impl<C> Clone for SharedSmc<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: SmcChannel> SharedSmc<C> {
    pub fn new(smc: Smc<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(smc)),
        }
    }

    /// Lock the session for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, Smc<C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut Smc<C>) -> R) -> R {
        f(&mut self.lock())
    }

    /// Number of live handles sharing this session.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}
