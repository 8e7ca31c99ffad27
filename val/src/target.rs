/*++

Licensed under the Apache-2.0 license.

File Name:

    target.rs

Abstract:

    File contains the target-configuration database lookup.

--*/

use bitfield::bitfield;
use pact_error::{PactError, PactResult};
use zerocopy::{AsBytes, FromBytes};

/// Terminal sentinel id closing the record sequence.
pub const CFG_ID_INVALID: u32 = 0xFFFF_FFFF;

/// Minor id of the NVRAM region inside the Memory group.
pub const MEMORY_NVRAM: u8 = 0x2;

const DB_VERSION: u32 = 1;
const RECORD_SIZE_MASK: u32 = 0x00FF_FFFF;

/// Descriptor major groups. Lookups outside this range are rejected without
/// touching the database.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[repr(u8)]
pub enum CfgGroup {
    Memory = 0x1,
    Dpm = 0x2,
    Peripheral = 0x3,
    Crypto = 0x4,
    Fuse = 0x5,
    Key = 0x6,
    Clock = 0x7,
    Miscellaneous = 0x8,
}

const CFG_GROUP_MIN: u8 = CfgGroup::Memory as u8;
const CFG_GROUP_MAX: u8 = CfgGroup::Miscellaneous as u8;

bitfield! {
    /// Composite configuration id: major group, minor group, instance index.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct CfgId(u32);

    /// Instance index within the minor group
    pub u16, instance, set_instance: 15, 0;

    /// Minor group
    pub u8, minor, set_minor: 23, 16;

    /// Major group
    pub u8, major, set_major: 31, 24;
}

impl CfgId {
    pub fn new(group: CfgGroup, minor: u8, instance: u16) -> CfgId {
        let mut id = CfgId(0);
        id.set_major(group as u8);
        id.set_minor(minor);
        id.set_instance(instance);
        id
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl core::fmt::Debug for CfgId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CfgId({:#010x})", self.0)
    }
}

#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Clone, Copy)]
struct DbHeader {
    version: u32,
    size: u32,
}

#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Clone, Copy)]
struct RecordHeader {
    cfg_id: u32,
    /// Total record length including this header, in the low 24 bits.
    size: u32,
}

const DB_HEADER_LEN: usize = core::mem::size_of::<DbHeader>();
const RECORD_HEADER_LEN: usize = core::mem::size_of::<RecordHeader>();

/// Records are stored word aligned; the size field keeps the true length.
fn align4(len: usize) -> usize {
    (len + 3) & !3
}

/// Memory-region descriptor payload.
#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoryDesc {
    pub start: u32,
    pub size: u32,
    pub attributes: u32,
}

/// Immutable view over the build-time-generated descriptor database: a
/// header followed by length-prefixed records, closed by a sentinel id.
/// Lookups hand out borrows into the blob, never copies.
pub struct TargetConfigDb<'a> {
    records: &'a [u8],
}

impl<'a> TargetConfigDb<'a> {
    pub fn new(blob: &'a [u8]) -> PactResult<TargetConfigDb<'a>> {
        let header =
            DbHeader::read_from_prefix(blob).ok_or(PactError::TARGET_CFG_BAD_HEADER)?;
        if header.version != DB_VERSION || header.size == 0 {
            return Err(PactError::TARGET_CFG_BAD_HEADER);
        }
        Ok(TargetConfigDb {
            records: &blob[DB_HEADER_LEN..],
        })
    }

    /// Return the payload bytes of the record matching `id`.
    pub fn get(&self, id: CfgId) -> PactResult<&'a [u8]> {
        if id.major() < CFG_GROUP_MIN || id.major() > CFG_GROUP_MAX {
            return Err(PactError::TARGET_CFG_INVALID_ID);
        }

        let mut rest = self.records;
        loop {
            let header = RecordHeader::read_from_prefix(rest)
                .ok_or(PactError::TARGET_CFG_DB_CORRUPTED)?;
            if header.cfg_id == CFG_ID_INVALID {
                return Err(PactError::TARGET_CFG_NOT_FOUND);
            }
            let payload = &rest[RECORD_HEADER_LEN..];
            let record_len = (header.size & RECORD_SIZE_MASK) as usize;
            if record_len < RECORD_HEADER_LEN {
                return Err(PactError::TARGET_CFG_DB_CORRUPTED);
            }
            let payload_len = record_len - RECORD_HEADER_LEN;
            let stored_len = align4(payload_len);
            if stored_len > payload.len() {
                return Err(PactError::TARGET_CFG_DB_CORRUPTED);
            }
            if header.cfg_id == id.raw() {
                return Ok(&payload[..payload_len]);
            }
            rest = &payload[stored_len..];
        }
    }

    /// Typed copy of a record payload.
    pub fn get_as<T: FromBytes>(&self, id: CfgId) -> PactResult<T> {
        let payload = self.get(id)?;
        T::read_from_prefix(payload).ok_or(PactError::TARGET_CFG_DB_CORRUPTED)
    }
}

/// Builder assembling a database blob the way the build-time generator lays
/// it out; used by platforms and tests.
pub struct TargetConfigBuilder {
    buf: Vec<u8>,
}

impl TargetConfigBuilder {
    pub fn new() -> TargetConfigBuilder {
        let header = DbHeader {
            version: DB_VERSION,
            size: 0,
        };
        TargetConfigBuilder {
            buf: header.as_bytes().to_vec(),
        }
    }

    pub fn record(mut self, id: CfgId, payload: &[u8]) -> TargetConfigBuilder {
        let header = RecordHeader {
            cfg_id: id.raw(),
            size: (RECORD_HEADER_LEN + payload.len()) as u32,
        };
        self.buf.extend_from_slice(header.as_bytes());
        self.buf.extend_from_slice(payload);
        self.buf.resize(align4(self.buf.len()), 0);
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        let sentinel = RecordHeader {
            cfg_id: CFG_ID_INVALID,
            size: RECORD_HEADER_LEN as u32,
        };
        self.buf.extend_from_slice(sentinel.as_bytes());
        let total = self.buf.len() as u32;
        self.buf[4..8].copy_from_slice(total.as_bytes());
        self.buf
    }
}

impl Default for TargetConfigBuilder {
    fn default() -> Self {
        TargetConfigBuilder::new()
    }
}
