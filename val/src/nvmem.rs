/*++

Licensed under the Apache-2.0 license.

File Name:

    nvmem.rs

Abstract:

    File contains the NVRAM field layout shared by the dispatcher and tests.

--*/

use zerocopy::{AsBytes, FromBytes};

/// Every field occupies one 4-byte block at a fixed offset. Offsets are
/// stable across reboots of the same image; nothing else about the layout is
/// versioned.
pub const NV_BLOCK_SIZE: u32 = 4;

/// Fixed NVRAM field map.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[repr(u32)]
pub enum NvSlot {
    /// Id of the last test that ran to completion.
    TestIdPrevious = 0,

    /// Id of the test in flight; rewritten before the payload runs so a
    /// mid-test reboot can be attributed.
    TestIdCurrent = 1,

    /// Packed pass/skip/fail counters.
    TestCount = 2,

    /// Boot flag owned by the running test.
    BootFlag = 3,

    /// Scratch slots tests use to persist their own sub-state across a
    /// reboot they trigger themselves.
    TestData1 = 4,
    TestData2 = 5,
    TestData3 = 6,
}

impl NvSlot {
    pub fn offset(self) -> u32 {
        self as u32 * NV_BLOCK_SIZE
    }
}

/// The scratch slots exposed to test bodies.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum DataSlot {
    Data1,
    Data2,
    Data3,
}

impl From<DataSlot> for NvSlot {
    fn from(slot: DataSlot) -> NvSlot {
        match slot {
            DataSlot::Data1 => NvSlot::TestData1,
            DataSlot::Data2 => NvSlot::TestData2,
            DataSlot::Data3 => NvSlot::TestData3,
        }
    }
}

/// Suite counters, one byte each, packed into the counter block.
#[repr(C)]
#[derive(FromBytes, AsBytes, Debug, Default, Eq, PartialEq, Copy, Clone)]
pub struct TestCount {
    pub pass: u8,
    pub skip: u8,
    pub fail: u8,
    reserved: u8,
}

impl TestCount {
    pub fn total(&self) -> u32 {
        u32::from(self.pass) + u32::from(self.skip) + u32::from(self.fail)
    }
}
