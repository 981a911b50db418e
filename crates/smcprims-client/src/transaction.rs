//! Two-phase SMC transactions.
//!
//! Every read and write first asks the SMC for the key's size and type
//! (get-key-info), then exchanges data. The encoding of a key is not known
//! statically, and the driver rejects payloads that disagree with it; the
//! metadata phase turns those rejections into typed errors before any data
//! moves.

use smcprims_channel::SmcChannel;
use smcprims_codec::{
    decode_value, encode_value, result, CodecError, DataType, Key, KeyInfo, Selector, SmcParams,
    Value, DATA_LEN,
};
use tracing::debug;

use crate::error::{Result, SmcError};

/// A key's payload together with the size and type that describe it.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: Key,
    pub data_type: DataType,
    pub size: u32,
    data: [u8; DATA_LEN],
}

impl KeyValue {
    /// Build a payload to write. `size` is the payload length.
    pub fn new(key: Key, data_type: DataType, payload: &[u8]) -> Result<Self> {
        if payload.len() > DATA_LEN {
            return Err(CodecError::PayloadTooLarge {
                size: payload.len(),
                max: DATA_LEN,
            }
            .into());
        }
        let mut data = [0u8; DATA_LEN];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            key,
            data_type,
            size: payload.len() as u32,
            data,
        })
    }

    /// Build a payload from a typed value.
    pub fn from_value(key: Key, value: &Value) -> Result<Self> {
        let (data_type, bytes) = encode_value(value)?;
        Self::new(key, data_type, &bytes)
    }

    /// The payload, cut to the declared size.
    pub fn bytes(&self) -> &[u8] {
        &self.data[..(self.size as usize).min(DATA_LEN)]
    }

    /// Decode the payload according to its data type.
    pub fn decode(&self) -> Result<Value> {
        Ok(decode_value(self.data_type, self.bytes())?)
    }

    /// True when size and type match the given contract.
    pub fn matches(&self, size: u32, data_type: DataType) -> bool {
        self.size == size && self.data_type == data_type
    }

    /// Check a facade contract, reporting the mismatch as [`SmcError::TypeMismatch`].
    pub fn expect(self, size: u32, data_type: DataType) -> Result<Self> {
        if self.matches(size, data_type) {
            return Ok(self);
        }
        Err(SmcError::TypeMismatch {
            key: self.key,
            actual_type: self.data_type,
            actual_size: self.size,
            declared_type: data_type,
            declared_size: size,
        })
    }
}

impl std::fmt::Debug for KeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValue")
            .field("key", &self.key)
            .field("data_type", &self.data_type)
            .field("size", &self.size)
            .field("bytes", &self.bytes())
            .finish()
    }
}

/// Phase one: fetch the authoritative size and type of `key`.
pub fn key_info<C: SmcChannel + ?Sized>(channel: &mut C, key: Key) -> Result<KeyInfo> {
    let response = exchange(channel, SmcParams::request(key, Selector::GetKeyInfo))?;
    match response.result {
        result::SUCCESS => Ok(response.key_info),
        result::KEY_NOT_FOUND => Err(SmcError::KeyNotFound(key)),
        code => Err(SmcError::ChannelStatus {
            key,
            selector: Selector::GetKeyInfo,
            code,
        }),
    }
}

/// Read `key`: metadata, then data.
pub fn read_key<C: SmcChannel + ?Sized>(channel: &mut C, key: Key) -> Result<KeyValue> {
    let info = key_info(channel, key)?;

    let mut request = SmcParams::request(key, Selector::ReadKey);
    request.key_info.data_size = info.data_size;
    let response = exchange(channel, request)?;
    check_status(key, Selector::ReadKey, response.result)?;

    let len = (info.data_size as usize).min(DATA_LEN);
    let mut data = [0u8; DATA_LEN];
    data[..len].copy_from_slice(&response.bytes[..len]);

    Ok(KeyValue {
        key,
        data_type: info.data_type,
        size: info.data_size,
        data,
    })
}

/// Write `value` after validating its size and type against the SMC.
///
/// Nothing is written when the metadata disagrees. Failed writes are not
/// retried: re-read the key and validate again before another attempt.
pub fn write_key<C: SmcChannel + ?Sized>(channel: &mut C, value: &KeyValue) -> Result<()> {
    let key = value.key;
    let info = key_info(channel, key)?;

    if info.data_size != value.size || info.data_type != value.data_type {
        return Err(SmcError::TypeMismatch {
            key,
            actual_type: info.data_type,
            actual_size: info.data_size,
            declared_type: value.data_type,
            declared_size: value.size,
        });
    }

    let mut request = SmcParams::request(key, Selector::WriteKey);
    request.key_info.data_size = info.data_size;
    request.bytes = value.data;
    let response = exchange(channel, request)?;
    check_status(key, Selector::WriteKey, response.result)
}

/// Name of the key at position `index` in the SMC's key table.
pub fn key_at_index<C: SmcChannel + ?Sized>(channel: &mut C, index: u32) -> Result<Key> {
    let mut request = SmcParams::request(Key::from_raw(0), Selector::GetKeyFromIndex);
    request.data32 = index;
    let response = exchange(channel, request)?;
    if response.result != result::SUCCESS {
        return Err(SmcError::IndexStatus {
            index,
            code: response.result,
        });
    }
    Ok(response.key)
}

fn exchange<C: SmcChannel + ?Sized>(channel: &mut C, request: SmcParams) -> Result<SmcParams> {
    let response = channel.call(&request)?;
    debug!(
        key = %request.key,
        selector = ?request.selector(),
        result = response.result,
        channel = channel.channel_name(),
        "smc exchange"
    );
    Ok(response)
}

fn check_status(key: Key, selector: Selector, code: u8) -> Result<()> {
    if code == result::SUCCESS {
        Ok(())
    } else {
        Err(SmcError::ChannelStatus {
            key,
            selector,
            code,
        })
    }
}
