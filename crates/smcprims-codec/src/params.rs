use bytes::{Buf, BufMut, BytesMut};

use crate::error::{CodecError, Result};
use crate::key::{DataType, Key};

/// Size of the AppleSMC parameter block in bytes.
pub const PARAM_BLOCK_SIZE: usize = 80;

/// Size of the payload area at the end of the parameter block.
pub const DATA_LEN: usize = 32;

/// IOKit struct-method index that carries every SMC request.
pub const HANDLE_YPC_EVENT: u32 = 2;

/// Function the SMC performs for a request (carried in `data8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Selector {
    ReadKey = 5,
    WriteKey = 6,
    GetKeyCount = 7,
    GetKeyFromIndex = 8,
    GetKeyInfo = 9,
}

impl Selector {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            5 => Some(Selector::ReadKey),
            6 => Some(Selector::WriteKey),
            7 => Some(Selector::GetKeyCount),
            8 => Some(Selector::GetKeyFromIndex),
            9 => Some(Selector::GetKeyInfo),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Selector::ReadKey => "read-key",
            Selector::WriteKey => "write-key",
            Selector::GetKeyCount => "get-key-count",
            Selector::GetKeyFromIndex => "get-key-from-index",
            Selector::GetKeyInfo => "get-key-info",
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result codes reported by the SMC in the `result` byte.
pub mod result {
    pub const SUCCESS: u8 = 0x00;
    pub const ERROR: u8 = 0x01;
    pub const COMM_COLLISION: u8 = 0x80;
    pub const SPURIOUS_DATA: u8 = 0x81;
    pub const BAD_COMMAND: u8 = 0x82;
    pub const BAD_PARAMETER: u8 = 0x83;
    pub const KEY_NOT_FOUND: u8 = 0x84;
    pub const KEY_NOT_READABLE: u8 = 0x85;
    pub const KEY_NOT_WRITABLE: u8 = 0x86;
    pub const KEY_SIZE_MISMATCH: u8 = 0x87;
    pub const FRAMING_ERROR: u8 = 0x88;
    pub const BAD_ARGUMENT: u8 = 0x89;
    pub const TIMEOUT: u8 = 0xB7;
    pub const KEY_INDEX_RANGE: u8 = 0xB8;

    /// Human-readable name for a result code.
    pub fn name(code: u8) -> &'static str {
        match code {
            SUCCESS => "success",
            ERROR => "error",
            COMM_COLLISION => "communication collision",
            SPURIOUS_DATA => "spurious data",
            BAD_COMMAND => "bad command",
            BAD_PARAMETER => "bad parameter",
            KEY_NOT_FOUND => "key not found",
            KEY_NOT_READABLE => "key not readable",
            KEY_NOT_WRITABLE => "key not writable",
            KEY_SIZE_MISMATCH => "key size mismatch",
            FRAMING_ERROR => "framing error",
            BAD_ARGUMENT => "bad argument",
            TIMEOUT => "timeout",
            KEY_INDEX_RANGE => "key index out of range",
            _ => "unknown",
        }
    }
}

/// Firmware version block. Zero in requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmcVersion {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
    pub reserved: u8,
    pub release: u16,
}

/// Power limit block. Zero in requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PLimitData {
    pub version: u16,
    pub length: u16,
    pub cpu_p_limit: u32,
    pub gpu_p_limit: u32,
    pub mem_p_limit: u32,
}

/// Size and type the SMC reports for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInfo {
    pub data_size: u32,
    pub data_type: DataType,
    pub attributes: u8,
}

impl Default for KeyInfo {
    fn default() -> Self {
        Self {
            data_size: 0,
            data_type: DataType::from_raw(0),
            attributes: 0,
        }
    }
}

/// The parameter block exchanged with the AppleSMC user client.
///
/// Layout (host byte order, little-endian on every Mac that ships the driver):
/// ```text
/// offset  size  field
///      0     4  key
///      4     6  version {major, minor, build, reserved, release: u16}
///     12    16  p-limit {version: u16, length: u16, cpu, gpu, mem: u32}
///     28    12  key info {data_size: u32, data_type: u32, attributes: u8, pad}
///     40     1  result
///     41     1  status
///     42     1  data8 (selector)
///     44     4  data32
///     48    32  bytes
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmcParams {
    pub key: Key,
    pub version: SmcVersion,
    pub p_limit: PLimitData,
    pub key_info: KeyInfo,
    pub result: u8,
    pub status: u8,
    pub data8: u8,
    pub data32: u32,
    pub bytes: [u8; DATA_LEN],
}

impl Default for SmcParams {
    fn default() -> Self {
        Self {
            key: Key::from_raw(0),
            version: SmcVersion::default(),
            p_limit: PLimitData::default(),
            key_info: KeyInfo::default(),
            result: 0,
            status: 0,
            data8: 0,
            data32: 0,
            bytes: [0; DATA_LEN],
        }
    }
}

impl SmcParams {
    /// A zeroed request for `key` with the given selector.
    pub fn request(key: Key, selector: Selector) -> Self {
        Self {
            key,
            data8: selector as u8,
            ..Self::default()
        }
    }

    /// The selector carried in `data8`, if recognised.
    pub fn selector(&self) -> Option<Selector> {
        Selector::from_u8(self.data8)
    }

    /// Serialize into a fixed-size buffer.
    pub fn to_bytes(&self) -> [u8; PARAM_BLOCK_SIZE] {
        let mut buf = BytesMut::with_capacity(PARAM_BLOCK_SIZE);
        encode_params(self, &mut buf);
        let mut out = [0u8; PARAM_BLOCK_SIZE];
        out.copy_from_slice(&buf);
        out
    }
}

/// Encode a parameter block into the wire layout.
pub fn encode_params(params: &SmcParams, dst: &mut BytesMut) {
    dst.reserve(PARAM_BLOCK_SIZE);
    dst.put_u32_le(params.key.raw());

    dst.put_u8(params.version.major);
    dst.put_u8(params.version.minor);
    dst.put_u8(params.version.build);
    dst.put_u8(params.version.reserved);
    dst.put_u16_le(params.version.release);
    dst.put_bytes(0, 2);

    dst.put_u16_le(params.p_limit.version);
    dst.put_u16_le(params.p_limit.length);
    dst.put_u32_le(params.p_limit.cpu_p_limit);
    dst.put_u32_le(params.p_limit.gpu_p_limit);
    dst.put_u32_le(params.p_limit.mem_p_limit);

    dst.put_u32_le(params.key_info.data_size);
    dst.put_u32_le(params.key_info.data_type.raw());
    dst.put_u8(params.key_info.attributes);
    dst.put_bytes(0, 3);

    dst.put_u8(params.result);
    dst.put_u8(params.status);
    dst.put_u8(params.data8);
    dst.put_bytes(0, 1);
    dst.put_u32_le(params.data32);
    dst.put_slice(&params.bytes);
}

/// Decode a parameter block. Trailing bytes beyond the layout are ignored.
pub fn decode_params(src: &[u8]) -> Result<SmcParams> {
    if src.len() < PARAM_BLOCK_SIZE {
        return Err(CodecError::Truncated {
            len: src.len(),
            expected: PARAM_BLOCK_SIZE,
        });
    }
    let mut buf = &src[..PARAM_BLOCK_SIZE];

    let key = Key::from_raw(buf.get_u32_le());

    let version = SmcVersion {
        major: buf.get_u8(),
        minor: buf.get_u8(),
        build: buf.get_u8(),
        reserved: buf.get_u8(),
        release: buf.get_u16_le(),
    };
    buf.advance(2);

    let p_limit = PLimitData {
        version: buf.get_u16_le(),
        length: buf.get_u16_le(),
        cpu_p_limit: buf.get_u32_le(),
        gpu_p_limit: buf.get_u32_le(),
        mem_p_limit: buf.get_u32_le(),
    };

    let key_info = KeyInfo {
        data_size: buf.get_u32_le(),
        data_type: DataType::from_raw(buf.get_u32_le()),
        attributes: buf.get_u8(),
    };
    buf.advance(3);

    let result = buf.get_u8();
    let status = buf.get_u8();
    let data8 = buf.get_u8();
    buf.advance(1);
    let data32 = buf.get_u32_le();

    let mut bytes = [0u8; DATA_LEN];
    buf.copy_to_slice(&mut bytes);

    Ok(SmcParams {
        key,
        version,
        p_limit,
        key_info,
        result,
        status,
        data8,
        data32,
        bytes,
    })
}
