/*++

Licensed under the Apache-2.0 license.

File Name:

    context.rs

Abstract:

    File contains the suite context handed to every test hook.

--*/

use core::fmt::Write;

use pact_error::{PactError, PactResult};
use zerocopy::{AsBytes, FromBytes};

use crate::boot::{BootState, ResetReason, ResetRequest};
use crate::nvmem::{DataSlot, NvSlot, NV_BLOCK_SIZE};
use crate::platform::{Platform, WdogTimeout};
use crate::printer::{SinkWriter, Verbosity};
use crate::status::{StatusBuffer, TestState, TestStatus};
use crate::target::{CfgGroup, CfgId, MemoryDesc, TargetConfigDb, MEMORY_NVRAM};
use crate::test::TestId;

/// Per-test requirements declared by the entry hook.
#[derive(Debug, Clone, Copy)]
pub struct TestAttributes {
    /// Minimum isolation level the test needs; the test is skipped when the
    /// target implements less.
    pub isolation_level: u8,
    pub wdog_timeout: WdogTimeout,
}

impl Default for TestAttributes {
    fn default() -> Self {
        TestAttributes {
            isolation_level: 1,
            wdog_timeout: WdogTimeout::Medium,
        }
    }
}

/// Everything a test hook may touch: the platform backend, the
/// caller-supplied service handle, the target configuration, the status
/// recorder and the NVRAM window. One context lives per boot cycle.
pub struct SuiteContext<'a, P: Platform, S> {
    platform: &'a mut P,
    /// API-under-test handle, opaque to the runtime.
    pub services: &'a mut S,
    config: TargetConfigDb<'a>,
    status: StatusBuffer,
    verbosity: Verbosity,
    nvmem_base: u32,
}

impl<'a, P: Platform, S> SuiteContext<'a, P, S> {
    /// Validate the configuration blob and locate the NVRAM window. Fails
    /// closed: without NVRAM no result can be trusted across a reboot.
    pub fn init(
        platform: &'a mut P,
        services: &'a mut S,
        config_blob: &'a [u8],
        verbosity: Verbosity,
    ) -> PactResult<SuiteContext<'a, P, S>> {
        let config = TargetConfigDb::new(config_blob)?;
        let nvram_id = CfgId::new(CfgGroup::Memory, MEMORY_NVRAM, 0);
        let nvmem_base = match config.get_as::<MemoryDesc>(nvram_id) {
            Ok(desc) => desc.start,
            Err(_) => {
                let mut sink = SinkWriter::new(platform);
                let _ = writeln!(sink, "NVRAM descriptor not present in target configuration");
                return Err(PactError::INFRA_INIT_FAILURE);
            }
        };
        Ok(SuiteContext {
            platform,
            services,
            config,
            status: StatusBuffer::new(),
            verbosity,
            nvmem_base,
        })
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Emit `args` when `level` clears the configured threshold.
    pub fn print(&mut self, level: Verbosity, args: core::fmt::Arguments) {
        if !level.at_least(self.verbosity) {
            return;
        }
        let mut sink = SinkWriter::new(self.platform);
        let _ = sink.write_fmt(args);
        let _ = sink.write_str("\n");
    }

    // ----------------------------------------------------------------
    // NVRAM accessors
    // ----------------------------------------------------------------

    pub fn nv_read<T: FromBytes>(&mut self, slot: NvSlot) -> PactResult<T> {
        let mut buf = [0u8; NV_BLOCK_SIZE as usize];
        self.platform
            .nvmem_read(self.nvmem_base + slot.offset(), &mut buf)?;
        T::read_from_prefix(&buf[..]).ok_or(PactError::INFRA_NVMEM_READ_FAILURE)
    }

    pub fn nv_write<T: AsBytes>(&mut self, slot: NvSlot, value: T) -> PactResult<()> {
        self.platform
            .nvmem_write(self.nvmem_base + slot.offset(), value.as_bytes())
    }

    pub fn boot_flag(&mut self) -> PactResult<BootState> {
        Ok(BootState::from_word(self.nv_read::<u32>(NvSlot::BootFlag)?))
    }

    pub fn set_boot_flag(&mut self, state: BootState) -> PactResult<()> {
        self.nv_write(NvSlot::BootFlag, state.to_word())
    }

    /// Scratch word a test persisted for itself across a reboot.
    pub fn test_data(&mut self, slot: DataSlot) -> PactResult<i32> {
        self.nv_read::<i32>(NvSlot::from(slot))
    }

    pub fn set_test_data(&mut self, slot: DataSlot, value: i32) -> PactResult<()> {
        self.nv_write(NvSlot::from(slot), value)
    }

    // ----------------------------------------------------------------
    // Status recorder
    // ----------------------------------------------------------------

    pub fn set_status(&mut self, status: TestStatus) {
        self.status.set(status);
    }

    pub fn status(&self) -> TestStatus {
        self.status.get()
    }

    pub fn status_slot(&self, id: TestId) -> Option<TestStatus> {
        self.status.slot(id)
    }

    /// Checkpoint gate: pass `result` through unchanged, recording a failure
    /// and printing the checkpoint either way. Lets test bodies chain checks
    /// with `?` while keeping a trace of how far they got.
    pub fn err_check_set<T>(&mut self, checkpoint: u32, result: PactResult<T>) -> PactResult<T> {
        match &result {
            Ok(_) => {
                self.print(
                    Verbosity::Debug,
                    format_args!("\tCheckpoint {checkpoint}"),
                );
            }
            Err(err) => {
                let code: u32 = (*err).into();
                self.print(
                    Verbosity::Error,
                    format_args!("\tCheckpoint {checkpoint} : Error Code = 0x{code:08x}"),
                );
                self.status.set(TestStatus::fail(*err));
            }
        }
        result
    }

    /// Record the scratch status into the slot for `id` and print the
    /// verdict line. Idempotent; a test stuck at `Start` reports as failed.
    pub fn report_status(&mut self, id: TestId) -> TestState {
        let status = self.status.record(id);
        match status.state {
            TestState::Pass | TestState::End => {
                self.print(Verbosity::Test, format_args!("TEST RESULT: PASSED"));
                TestState::Pass
            }
            TestState::Skip => {
                self.print(
                    Verbosity::Test,
                    format_args!("TEST RESULT: SKIPPED (Skip Code = 0x{:08x})", status.code),
                );
                TestState::Skip
            }
            TestState::Pending => {
                self.print(Verbosity::Test, format_args!("TEST RESULT: PENDING"));
                TestState::Pending
            }
            TestState::Fail | TestState::Start => {
                self.print(
                    Verbosity::Test,
                    format_args!("TEST RESULT: FAILED (Error Code = 0x{:08x})", status.code),
                );
                TestState::Fail
            }
        }
    }

    // ----------------------------------------------------------------
    // Test lifecycle
    // ----------------------------------------------------------------

    /// Standard entry-hook preamble: preset the status, print the banner,
    /// enforce the isolation requirement and arm the watchdog.
    pub fn test_init(
        &mut self,
        id: TestId,
        title: &str,
        attrs: TestAttributes,
    ) -> PactResult<()> {
        self.status.set(TestStatus::invalid());
        self.print(
            Verbosity::Test,
            format_args!("TEST: {}-{:03} | DESCRIPTION: {}", id.group(), id.num(), title),
        );

        if attrs.isolation_level > self.platform.isolation_level() {
            let err = PactError::TEST_ISOLATION_LEVEL_NOT_SUPPORTED;
            self.status.set(TestStatus::skip(err));
            return Err(err);
        }

        self.platform.wdog_init(attrs.wdog_timeout)?;
        self.platform.wdog_enable()?;
        self.status.set(TestStatus::start());
        Ok(())
    }

    /// Standard exit-hook epilogue: disarm the watchdog and close out a test
    /// nothing downgraded.
    pub fn test_exit(&mut self) -> PactResult<()> {
        self.platform.wdog_disable()?;
        if self.status.get().is_passing() {
            self.status.set(TestStatus::end());
        }
        Ok(())
    }

    /// Re-arm the watchdog mid-payload before a long-running check.
    pub fn wdog_reprogram(&mut self, timeout: WdogTimeout) -> PactResult<()> {
        self.platform.wdog_reprogram(timeout)
    }

    // ----------------------------------------------------------------
    // Platform passthroughs
    // ----------------------------------------------------------------

    pub fn reset_reason(&self) -> ResetReason {
        self.platform.reset_reason()
    }

    pub fn request_reset(&mut self, kind: ResetRequest) {
        self.platform.request_reset(kind);
    }

    pub fn reset_pending(&self) -> bool {
        self.platform.reset_pending()
    }

    // ----------------------------------------------------------------
    // Target configuration
    // ----------------------------------------------------------------

    pub fn target_config(&self, id: CfgId) -> PactResult<&'a [u8]> {
        self.config.get(id)
    }

    pub fn target_config_as<T: FromBytes>(&self, id: CfgId) -> PactResult<T> {
        self.config.get_as(id)
    }
}
