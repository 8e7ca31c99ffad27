/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains the simulated target backend for suite development and CI.

--*/

mod output;

pub use output::Output;

use pact_error::{PactError, PactResult};
use pact_val::{
    run_suite, CfgGroup, CfgId, MemoryDesc, Platform, ResetReason, ResetRequest, SuiteContext,
    SuiteExit, SuiteSummary, TargetConfigBuilder, TestRegistry, Verbosity, WdogTimeout,
    MEMORY_NVRAM,
};
use zerocopy::AsBytes;

/// Upper bound on reboots one `run_to_completion` call will service. A suite
/// that keeps requesting resets past this is stuck in a continuation loop.
const MAX_BOOT_CYCLES: usize = 64;

/// Construction parameters of the simulated target.
#[derive(Debug, Clone, Copy)]
pub struct InitParams {
    pub nvmem_size: usize,
    pub isolation_level: u8,
}

impl Default for InitParams {
    fn default() -> Self {
        InitParams {
            nvmem_size: 4096,
            isolation_level: 1,
        }
    }
}

/// In-process simulation of a target device: byte-array NVRAM, latched reset
/// requests, a watchdog that only fires when the test asks it to, and a
/// captured print sink. Resets are serviced explicitly through `cycle` so a
/// test run can observe the device "off" between boots.
pub struct ModelSim {
    nvmem: Vec<u8>,
    reset_reason: ResetReason,
    pending_reset: Option<ResetRequest>,
    wdog_timeout: Option<WdogTimeout>,
    wdog_armed: bool,
    isolation_level: u8,
    output: Output,
}

impl ModelSim {
    pub fn new(params: InitParams) -> ModelSim {
        ModelSim {
            nvmem: vec![0u8; params.nvmem_size],
            reset_reason: ResetReason::ColdReset,
            pending_reset: None,
            wdog_timeout: None,
            wdog_armed: false,
            isolation_level: params.isolation_level,
            output: Output::new(),
        }
    }

    /// Target configuration blob describing this model's NVRAM window.
    pub fn config_blob(&self, base: u32) -> Vec<u8> {
        let desc = MemoryDesc {
            start: base,
            size: self.nvmem.len() as u32 - base,
            attributes: 0,
        };
        TargetConfigBuilder::new()
            .record(CfgId::new(CfgGroup::Memory, MEMORY_NVRAM, 0), desc.as_bytes())
            .finish()
    }

    /// Service the latched reset request. NVRAM contents survive either
    /// kind; discarding stale suite state is the dispatcher's job, keyed off
    /// the reset reason. Cycling with nothing latched models a spontaneous
    /// power cycle.
    pub fn cycle(&mut self) {
        self.reset_reason = match self.pending_reset.take() {
            Some(ResetRequest::Warm) => ResetReason::WarmReset,
            Some(ResetRequest::Cold) | None => ResetReason::ColdReset,
        };
        self.wdog_armed = false;
        self.wdog_timeout = None;
    }

    /// Pull the plug: drop any latched request and come back cold.
    pub fn power_cycle(&mut self) {
        self.pending_reset = None;
        self.cycle();
    }

    /// Expire the watchdog. Returns false when it was not armed.
    pub fn fire_watchdog(&mut self) -> bool {
        if !self.wdog_armed {
            return false;
        }
        self.pending_reset = None;
        self.reset_reason = ResetReason::WdogReset;
        self.wdog_armed = false;
        self.wdog_timeout = None;
        true
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut Output {
        &mut self.output
    }

    fn nvmem_range(&self, offset: u32, len: usize, err: PactError) -> PactResult<usize> {
        let offset = offset as usize;
        if offset.checked_add(len).map_or(true, |end| end > self.nvmem.len()) {
            return Err(err);
        }
        Ok(offset)
    }
}

impl Platform for ModelSim {
    fn nvmem_read(&mut self, offset: u32, buf: &mut [u8]) -> PactResult<()> {
        let offset = self.nvmem_range(offset, buf.len(), PactError::INFRA_NVMEM_READ_FAILURE)?;
        buf.copy_from_slice(&self.nvmem[offset..offset + buf.len()]);
        Ok(())
    }

    fn nvmem_write(&mut self, offset: u32, buf: &[u8]) -> PactResult<()> {
        let offset = self.nvmem_range(offset, buf.len(), PactError::INFRA_NVMEM_WRITE_FAILURE)?;
        self.nvmem[offset..offset + buf.len()].copy_from_slice(buf);
        Ok(())
    }

    fn reset_reason(&self) -> ResetReason {
        self.reset_reason
    }

    fn request_reset(&mut self, kind: ResetRequest) {
        // First request wins; a real device would already be resetting.
        if self.pending_reset.is_none() {
            self.pending_reset = Some(kind);
        }
    }

    fn reset_pending(&self) -> bool {
        self.pending_reset.is_some()
    }

    fn wdog_init(&mut self, timeout: WdogTimeout) -> PactResult<()> {
        self.wdog_timeout = Some(timeout);
        Ok(())
    }

    fn wdog_enable(&mut self) -> PactResult<()> {
        if self.wdog_timeout.is_none() {
            return Err(PactError::WDOG_INIT_FAILURE);
        }
        self.wdog_armed = true;
        Ok(())
    }

    fn wdog_disable(&mut self) -> PactResult<()> {
        self.wdog_armed = false;
        Ok(())
    }

    fn wdog_reprogram(&mut self, timeout: WdogTimeout) -> PactResult<()> {
        if !self.wdog_armed {
            return Err(PactError::WDOG_INIT_FAILURE);
        }
        self.wdog_timeout = Some(timeout);
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) {
        self.output.push(byte);
    }

    fn isolation_level(&self) -> u8 {
        self.isolation_level
    }
}

/// Drive the suite across as many boot cycles as it needs, servicing each
/// reset request, until the dispatcher reports completion.
pub fn run_to_completion<S>(
    model: &mut ModelSim,
    services: &mut S,
    config_blob: &[u8],
    registry: &TestRegistry<'_, ModelSim, S>,
    verbosity: Verbosity,
) -> PactResult<SuiteSummary> {
    for _ in 0..MAX_BOOT_CYCLES {
        let mut ctx = SuiteContext::init(model, services, config_blob, verbosity)?;
        match run_suite(&mut ctx, registry)? {
            SuiteExit::Complete(summary) => return Ok(summary),
            SuiteExit::ResetPending => {}
        }
        drop(ctx);
        model.cycle();
    }
    Err(PactError::PLATFORM_POLL_TIMEOUT)
}
