/*++

Licensed under the Apache-2.0 license.

File Name:

    testutil.rs

Abstract:

    File contains the in-process fake platform used by the unit tests.

--*/

use pact_error::PactResult;
use zerocopy::AsBytes;

use crate::boot::{ResetReason, ResetRequest};
use crate::context::SuiteContext;
use crate::platform::{Platform, WdogTimeout};
use crate::target::{CfgGroup, CfgId, MemoryDesc, TargetConfigBuilder, MEMORY_NVRAM};
use crate::test::{PersonaHooks, TestCase, TestId};

const FAKE_NVMEM_SIZE: usize = 4096;

/// Minimal in-process backend: flat NVRAM, captured output, latched resets.
pub(crate) struct FakePlatform {
    pub nvmem: Vec<u8>,
    pub output: Vec<u8>,
    pub reset_reason: ResetReason,
    pub pending_reset: Option<ResetRequest>,
    pub wdog_armed: bool,
    pub isolation_level: u8,
}

impl FakePlatform {
    pub fn new() -> FakePlatform {
        FakePlatform {
            nvmem: vec![0u8; FAKE_NVMEM_SIZE],
            output: Vec::new(),
            reset_reason: ResetReason::ColdReset,
            pending_reset: None,
            wdog_armed: false,
            isolation_level: 1,
        }
    }

    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// Configuration blob with a single NVRAM descriptor at `base`.
    pub fn config_blob(base: u32) -> Vec<u8> {
        let desc = MemoryDesc {
            start: base,
            size: FAKE_NVMEM_SIZE as u32 - base,
            attributes: 0,
        };
        TargetConfigBuilder::new()
            .record(CfgId::new(CfgGroup::Memory, MEMORY_NVRAM, 0), desc.as_bytes())
            .finish()
    }
}

impl Platform for FakePlatform {
    fn nvmem_read(&mut self, offset: u32, buf: &mut [u8]) -> PactResult<()> {
        let offset = offset as usize;
        buf.copy_from_slice(&self.nvmem[offset..offset + buf.len()]);
        Ok(())
    }

    fn nvmem_write(&mut self, offset: u32, buf: &[u8]) -> PactResult<()> {
        let offset = offset as usize;
        self.nvmem[offset..offset + buf.len()].copy_from_slice(buf);
        Ok(())
    }

    fn reset_reason(&self) -> ResetReason {
        self.reset_reason
    }

    fn request_reset(&mut self, kind: ResetRequest) {
        self.pending_reset = Some(kind);
    }

    fn reset_pending(&self) -> bool {
        self.pending_reset.is_some()
    }

    fn wdog_init(&mut self, _timeout: WdogTimeout) -> PactResult<()> {
        Ok(())
    }

    fn wdog_enable(&mut self) -> PactResult<()> {
        self.wdog_armed = true;
        Ok(())
    }

    fn wdog_disable(&mut self) -> PactResult<()> {
        self.wdog_armed = false;
        Ok(())
    }

    fn wdog_reprogram(&mut self, _timeout: WdogTimeout) -> PactResult<()> {
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) {
        self.output.push(byte);
    }

    fn isolation_level(&self) -> u8 {
        self.isolation_level
    }
}

fn noop_hook(_: &mut SuiteContext<'_, FakePlatform, ()>) -> PactResult<()> {
    Ok(())
}

/// Registry entry whose hooks do nothing; for registry-walk tests.
pub(crate) fn noop_case(id: TestId) -> TestCase<FakePlatform, ()> {
    TestCase {
        id,
        ref_tag: "noop",
        title: "noop",
        secure: PersonaHooks {
            entry: noop_hook,
            payload: noop_hook,
            exit: noop_hook,
        },
        nonsecure: None,
    }
}
