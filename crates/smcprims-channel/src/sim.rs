//! In-memory SMC that speaks the same parameter-block protocol as the driver.
//!
//! Used by tests and by the CLI/C interface when no hardware is available.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use smcprims_codec::{
    encode_key, result, CodecError, DataType, Key, KeyInfo, Selector, SmcParams, DATA_LEN,
};
use tracing::trace;

use crate::error::{kern, ChannelError, Result};
use crate::traits::SmcChannel;

/// Key attribute bits reported in key info.
const ATTR_READ: u8 = 0x80;
const ATTR_WRITE: u8 = 0x40;

/// Virtual key holding the number of keys (`ui32`).
const KEY_COUNT_KEY: Key = Key::from_bytes(*b"#KEY");

/// A key stored in the simulated SMC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimEntry {
    pub data_type: DataType,
    pub bytes: Vec<u8>,
    pub writable: bool,
}

/// One request observed by the simulated SMC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimCall {
    pub key: Key,
    pub selector: Option<Selector>,
    pub data_size: u32,
}

/// JSON snapshot of a simulated SMC.
///
/// ```json
/// { "privileged": true,
///   "keys": [ { "key": "F0Ac", "type": "fpe2", "bytes": [18, 192] } ] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSnapshot {
    /// Whether writes are authorized.
    #[serde(default = "default_privileged")]
    pub privileged: bool,
    pub keys: Vec<SimKeySpec>,
}

/// One key in a [`SimSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimKeySpec {
    pub key: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub bytes: Vec<u8>,
    #[serde(default)]
    pub writable: bool,
}

fn default_privileged() -> bool {
    true
}

/// Simulated SMC.
#[derive(Debug, Clone)]
pub struct SimulatedSmc {
    entries: BTreeMap<Key, SimEntry>,
    faults: HashMap<(Key, Selector), u8>,
    privileged: bool,
    calls: Vec<SimCall>,
}

impl Default for SimulatedSmc {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSmc {
    /// An empty SMC that authorizes writes.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            faults: HashMap::new(),
            privileged: true,
            calls: Vec::new(),
        }
    }

    /// Add a read-only key.
    pub fn with_key(mut self, key: Key, data_type: DataType, bytes: &[u8]) -> Self {
        self.insert(key, data_type, bytes, false);
        self
    }

    /// Add a writable key.
    pub fn with_writable_key(mut self, key: Key, data_type: DataType, bytes: &[u8]) -> Self {
        self.insert(key, data_type, bytes, true);
        self
    }

    /// Set whether writes are authorized.
    pub fn with_privilege(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    /// Answer `selector` requests for `key` with result `code`.
    pub fn fail_with(mut self, key: Key, selector: Selector, code: u8) -> Self {
        self.faults.insert((key, selector), code);
        self
    }

    /// Insert or replace a key. Payloads longer than 32 bytes are cut.
    pub fn insert(&mut self, key: Key, data_type: DataType, bytes: &[u8], writable: bool) {
        let len = bytes.len().min(DATA_LEN);
        self.entries.insert(
            key,
            SimEntry {
                data_type,
                bytes: bytes[..len].to_vec(),
                writable,
            },
        );
    }

    /// Build from a parsed snapshot.
    pub fn from_snapshot(snapshot: &SimSnapshot) -> Result<Self> {
        let mut smc = Self::new().with_privilege(snapshot.privileged);
        for spec in &snapshot.keys {
            let invalid = |err: CodecError| ChannelError::Snapshot(format!("{}: {err}", spec.key));
            let key = Key::new(&spec.key).map_err(invalid)?;
            let data_type = DataType::from_raw(encode_key(&spec.data_type).map_err(invalid)?);
            if spec.bytes.len() > DATA_LEN {
                return Err(ChannelError::Snapshot(format!(
                    "{}: {} bytes exceeds {DATA_LEN}",
                    spec.key,
                    spec.bytes.len()
                )));
            }
            smc.insert(key, data_type, &spec.bytes, spec.writable);
        }
        Ok(smc)
    }

    /// Build from snapshot JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: SimSnapshot =
            serde_json::from_str(json).map_err(|err| ChannelError::Snapshot(err.to_string()))?;
        Self::from_snapshot(&snapshot)
    }

    /// Load a snapshot file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|err| ChannelError::Snapshot(format!("{}: {err}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Stored entry for `key`.
    pub fn entry(&self, key: Key) -> Option<&SimEntry> {
        self.entries.get(&key)
    }

    /// Every request received so far, oldest first.
    pub fn calls(&self) -> &[SimCall] {
        &self.calls
    }

    /// Number of requests received with `selector`.
    pub fn count_calls(&self, selector: Selector) -> usize {
        self.calls
            .iter()
            .filter(|call| call.selector == Some(selector))
            .count()
    }

    fn lookup(&self, key: Key) -> Option<SimEntry> {
        if key == KEY_COUNT_KEY && !self.entries.contains_key(&key) {
            return Some(SimEntry {
                data_type: DataType::UINT32,
                bytes: (self.entries.len() as u32).to_be_bytes().to_vec(),
                writable: false,
            });
        }
        self.entries.get(&key).cloned()
    }

    fn key_info(&self, request: &SmcParams, response: &mut SmcParams) {
        match self.lookup(request.key) {
            Some(entry) => {
                response.key_info = KeyInfo {
                    data_size: entry.bytes.len() as u32,
                    data_type: entry.data_type,
                    attributes: if entry.writable {
                        ATTR_READ | ATTR_WRITE
                    } else {
                        ATTR_READ
                    },
                };
            }
            None => response.result = result::KEY_NOT_FOUND,
        }
    }

    fn read(&self, request: &SmcParams, response: &mut SmcParams) {
        let Some(entry) = self.lookup(request.key) else {
            response.result = result::KEY_NOT_FOUND;
            return;
        };
        if request.key_info.data_size as usize != entry.bytes.len() {
            response.result = result::KEY_SIZE_MISMATCH;
            return;
        }
        response.key_info.data_size = request.key_info.data_size;
        response.bytes[..entry.bytes.len()].copy_from_slice(&entry.bytes);
    }

    fn write(&mut self, request: &SmcParams, response: &mut SmcParams) -> Result<()> {
        if !self.privileged {
            return Err(ChannelError::PermissionDenied {
                operation: Selector::WriteKey.name(),
                code: kern::IO_RETURN_NOT_PRIVILEGED,
            });
        }
        let Some(entry) = self.entries.get_mut(&request.key) else {
            response.result = if request.key == KEY_COUNT_KEY {
                result::KEY_NOT_WRITABLE
            } else {
                result::KEY_NOT_FOUND
            };
            return Ok(());
        };
        if !entry.writable {
            response.result = result::KEY_NOT_WRITABLE;
            return Ok(());
        }
        let size = request.key_info.data_size as usize;
        if size != entry.bytes.len() {
            response.result = result::KEY_SIZE_MISMATCH;
            return Ok(());
        }
        entry.bytes.copy_from_slice(&request.bytes[..size]);
        Ok(())
    }

    fn key_from_index(&self, request: &SmcParams, response: &mut SmcParams) {
        match self.entries.keys().nth(request.data32 as usize) {
            Some(key) => response.key = *key,
            None => response.result = result::KEY_INDEX_RANGE,
        }
    }
}

impl SmcChannel for SimulatedSmc {
    fn call(&mut self, request: &SmcParams) -> Result<SmcParams> {
        let selector = request.selector();
        self.calls.push(SimCall {
            key: request.key,
            selector,
            data_size: request.key_info.data_size,
        });
        trace!(key = %request.key, selector = ?selector, "simulated SMC call");

        let mut response = SmcParams {
            key: request.key,
            data8: request.data8,
            ..SmcParams::default()
        };

        if let Some(code) = selector.and_then(|s| self.faults.get(&(request.key, s))) {
            response.result = *code;
            return Ok(response);
        }

        match selector {
            Some(Selector::GetKeyInfo) => self.key_info(request, &mut response),
            Some(Selector::ReadKey) => self.read(request, &mut response),
            Some(Selector::WriteKey) => self.write(request, &mut response)?,
            Some(Selector::GetKeyFromIndex) => self.key_from_index(request, &mut response),
            Some(Selector::GetKeyCount) | None => response.result = result::BAD_COMMAND,
        }
        Ok(response)
    }

    fn channel_name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use smcprims_codec::encode_fpe2;

    use super::*;

    fn key(text: &str) -> Key {
        Key::new(text).unwrap()
    }

    fn info(smc: &mut SimulatedSmc, k: &str) -> SmcParams {
        smc.call(&SmcParams::request(key(k), Selector::GetKeyInfo))
            .unwrap()
    }

    #[test]
    fn key_info_reports_size_and_type() {
        let mut smc = SimulatedSmc::new().with_key(key("F0Ac"), DataType::FPE2, &encode_fpe2(1200));
        let response = info(&mut smc, "F0Ac");
        assert_eq!(response.result, result::SUCCESS);
        assert_eq!(response.key_info.data_size, 2);
        assert_eq!(response.key_info.data_type, DataType::FPE2);

        assert_eq!(info(&mut smc, "ZZZZ").result, result::KEY_NOT_FOUND);
    }

    #[test]
    fn read_requires_matching_size() {
        let mut smc = SimulatedSmc::new().with_key(key("FNum"), DataType::UINT8, &[2]);
        let mut request = SmcParams::request(key("FNum"), Selector::ReadKey);
        request.key_info.data_size = 1;
        let response = smc.call(&request).unwrap();
        assert_eq!(response.result, result::SUCCESS);
        assert_eq!(response.bytes[0], 2);

        request.key_info.data_size = 4;
        assert_eq!(smc.call(&request).unwrap().result, result::KEY_SIZE_MISMATCH);
    }

    #[test]
    fn write_checks_privilege_and_writability() {
        let mut request = SmcParams::request(key("F0Mn"), Selector::WriteKey);
        request.key_info.data_size = 2;
        request.bytes[..2].copy_from_slice(&encode_fpe2(1500));

        let mut locked = SimulatedSmc::new()
            .with_writable_key(key("F0Mn"), DataType::FPE2, &encode_fpe2(1000))
            .with_privilege(false);
        let err = locked.call(&request).unwrap_err();
        assert!(err.is_permission_denied());

        let mut read_only = SimulatedSmc::new().with_key(key("F0Mn"), DataType::FPE2, &[0, 0]);
        assert_eq!(
            read_only.call(&request).unwrap().result,
            result::KEY_NOT_WRITABLE
        );

        let mut smc =
            SimulatedSmc::new().with_writable_key(key("F0Mn"), DataType::FPE2, &encode_fpe2(1000));
        assert_eq!(smc.call(&request).unwrap().result, result::SUCCESS);
        assert_eq!(smc.entry(key("F0Mn")).unwrap().bytes, encode_fpe2(1500).to_vec());
    }

    #[test]
    fn key_count_and_index_enumeration() {
        let mut smc = SimulatedSmc::new()
            .with_key(key("TC0P"), DataType::SP78, &[40, 0])
            .with_key(key("BATP"), DataType::FLAG, &[0]);

        let mut request = SmcParams::request(KEY_COUNT_KEY, Selector::ReadKey);
        request.key_info.data_size = 4;
        let response = smc.call(&request).unwrap();
        assert_eq!(&response.bytes[..4], &2u32.to_be_bytes());

        let mut request = SmcParams::request(Key::from_raw(0), Selector::GetKeyFromIndex);
        request.data32 = 0;
        assert_eq!(smc.call(&request).unwrap().key, key("BATP"));
        request.data32 = 1;
        assert_eq!(smc.call(&request).unwrap().key, key("TC0P"));
        request.data32 = 2;
        assert_eq!(smc.call(&request).unwrap().result, result::KEY_INDEX_RANGE);
    }

    #[test]
    fn injected_faults_and_call_log() {
        let mut smc = SimulatedSmc::new()
            .with_key(key("TC0P"), DataType::SP78, &[40, 0])
            .fail_with(key("TC0P"), Selector::GetKeyInfo, result::ERROR);
        assert_eq!(info(&mut smc, "TC0P").result, result::ERROR);
        assert_eq!(smc.count_calls(Selector::GetKeyInfo), 1);
        assert_eq!(smc.count_calls(Selector::ReadKey), 0);
        assert_eq!(smc.calls()[0].key, key("TC0P"));
    }

    #[test]
    fn loads_snapshot_json() {
        let smc = SimulatedSmc::from_json_str(
            r#"{
                "privileged": false,
                "keys": [
                    { "key": "F0Ac", "type": "fpe2", "bytes": [18, 192] },
                    { "key": "F0Mn", "type": "fpe2", "bytes": [0, 0], "writable": true }
                ]
            }"#,
        )
        .unwrap();
        assert!(!smc.privileged);
        assert_eq!(smc.entry(key("F0Ac")).unwrap().bytes, vec![18, 192]);
        assert!(smc.entry(key("F0Mn")).unwrap().writable);
    }

    #[test]
    fn snapshot_rejects_bad_keys() {
        let err = SimulatedSmc::from_json_str(
            r#"{ "keys": [ { "key": "TOOLONG", "type": "ui8 ", "bytes": [1] } ] }"#,
        )
        .unwrap_err();
        match err {
            ChannelError::Snapshot(message) => assert!(message.starts_with("TOOLONG: ")),
            other => panic!("expected snapshot error, got {other:?}"),
        }

        let err = SimulatedSmc::from_json_str(
            r#"{ "keys": [ { "key": "TC0P", "type": "sp7", "bytes": [25, 0] } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ChannelError::Snapshot(_)));

        let err = SimulatedSmc::from_json_str("not json").unwrap_err();
        assert!(matches!(err, ChannelError::Snapshot(_)));
    }
}
