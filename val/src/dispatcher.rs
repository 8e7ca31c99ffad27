/*++

Licensed under the Apache-2.0 license.

File Name:

    dispatcher.rs

Abstract:

    File contains the suite dispatcher driving tests across reboots.

--*/

use pact_error::{PactError, PactResult};

use crate::boot::BootState;
use crate::context::SuiteContext;
use crate::nvmem::{NvSlot, TestCount};
use crate::platform::Platform;
use crate::printer::Verbosity;
use crate::status::{TestState, TestStatus};
use crate::test::{component_name, PersonaHooks, TestId, TestRegistry};

/// Final tallies of one complete suite run.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct SuiteSummary {
    pub pass: u32,
    pub skip: u32,
    pub fail: u32,
}

impl SuiteSummary {
    pub fn total(&self) -> u32 {
        self.pass + self.skip + self.fail
    }

    /// Collapse the tallies into a single verdict.
    pub fn as_result(&self) -> PactResult<()> {
        if self.fail > 0 {
            Err(PactError::DISPATCHER_SUITE_FAILED)
        } else {
            Ok(())
        }
    }
}

/// Why `run_suite` returned.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SuiteExit {
    /// A test requested a reset; the caller must cycle the platform and call
    /// `run_suite` again with a fresh context.
    ResetPending,

    /// The registry is exhausted and the report has been printed.
    Complete(SuiteSummary),
}

/// Run the suite from wherever the persisted state says it left off.
///
/// On a boot that was not requested by the previous run, all continuation
/// state is discarded and the suite starts from the head of the registry.
/// Returns `ResetPending` as soon as a hook requests a reset; the in-flight
/// bookkeeping is already in NVRAM at that point, so the next call resumes
/// the same test.
pub fn run_suite<P: Platform, S>(
    ctx: &mut SuiteContext<'_, P, S>,
    registry: &TestRegistry<'_, P, S>,
) -> PactResult<SuiteExit> {
    if registry.is_empty() {
        return Err(PactError::DISPATCHER_NO_TESTS);
    }

    if !ctx.reset_reason().is_requested() {
        ctx.nv_write(NvSlot::TestIdPrevious, TestId::INVALID.raw())?;
        ctx.nv_write(NvSlot::TestIdCurrent, TestId::INVALID.raw())?;
        ctx.nv_write(NvSlot::TestCount, TestCount::default())?;
        ctx.set_boot_flag(BootState::Unknown)?;
    }

    // Banner state carries across reboots through the previous id's
    // component, so resuming a test mid-component does not reprint it.
    let resume_prev = TestId::from_raw(ctx.nv_read::<u32>(NvSlot::TestIdPrevious)?);
    let mut last_group = if resume_prev == TestId::INVALID {
        None
    } else {
        Some(resume_prev.group())
    };

    loop {
        let flag = ctx.boot_flag()?;

        // A persisted in-flight flag that does not anticipate a resume means
        // the previous cycle died inside a test. Charge the failure to the
        // test on record and move on.
        if flag == BootState::NotExpected || flag == BootState::ExpectedButFailed {
            let current = TestId::from_raw(ctx.nv_read::<u32>(NvSlot::TestIdCurrent)?);
            let err = if flag == BootState::NotExpected {
                ctx.print(
                    Verbosity::Error,
                    format_args!("Unexpected reboot during test execution"),
                );
                PactError::DISPATCHER_UNEXPECTED_REBOOT
            } else {
                ctx.print(
                    Verbosity::Error,
                    format_args!("Anticipated reset did not occur"),
                );
                PactError::DISPATCHER_BOOT_EXPECTED_BUT_FAILED
            };
            ctx.set_status(TestStatus::fail(err));
            let state = ctx.report_status(current);
            finish_test(ctx, current, state)?;
            continue;
        }

        let prev = TestId::from_raw(ctx.nv_read::<u32>(NvSlot::TestIdPrevious)?);
        let next = registry.next_after(prev);
        if next.skipped > 0 {
            let code: u32 = PactError::DISPATCHER_LOAD_FAILURE.into();
            ctx.print(
                Verbosity::Warn,
                format_args!(
                    "Skipped {} malformed registry entries (Error Code = 0x{code:08x})",
                    next.skipped
                ),
            );
        }
        let case = match next.case {
            Some(case) => case,
            None => break,
        };

        ctx.nv_write(NvSlot::TestIdCurrent, case.id.raw())?;

        if last_group != Some(case.id.group()) {
            last_group = Some(case.id.group());
            ctx.print(
                Verbosity::Always,
                format_args!("Running: {}", component_name(case.id.group())),
            );
        }

        ctx.print(Verbosity::Info, format_args!("Loading {}", case.ref_tag));

        // Claim the flag before any test code runs so a crash from here on
        // is attributable.
        if !flag.in_flight() {
            ctx.set_boot_flag(BootState::NotExpected)?;
        }

        if run_persona(ctx, &case.secure) {
            return Ok(SuiteExit::ResetPending);
        }
        if let Some(nonsecure) = &case.nonsecure {
            if ctx.status().is_passing() && run_persona(ctx, nonsecure) {
                return Ok(SuiteExit::ResetPending);
            }
        }

        let state = ctx.report_status(case.id);
        finish_test(ctx, case.id, state)?;
    }

    let count: TestCount = ctx.nv_read(NvSlot::TestCount)?;
    let summary = SuiteSummary {
        pass: u32::from(count.pass),
        skip: u32::from(count.skip),
        fail: u32::from(count.fail),
    };
    ctx.print(
        Verbosity::Always,
        format_args!("************ RESULTS ************"),
    );
    ctx.print(
        Verbosity::Always,
        format_args!("TOTAL TESTS : {}", summary.total()),
    );
    ctx.print(Verbosity::Always, format_args!("TOTAL PASSED : {}", summary.pass));
    ctx.print(Verbosity::Always, format_args!("TOTAL FAILED : {}", summary.fail));
    ctx.print(Verbosity::Always, format_args!("TOTAL SKIPPED : {}", summary.skip));
    ctx.print(
        Verbosity::Always,
        format_args!("*********************************"),
    );
    Ok(SuiteExit::Complete(summary))
}

/// Run one persona. The exit hook runs even when entry or payload failed so
/// fixtures never leak into the next test; a pending reset abandons the
/// persona immediately, mirroring real hardware where control never comes
/// back from the reset request. Returns true when a reset is pending.
fn run_persona<P: Platform, S>(
    ctx: &mut SuiteContext<'_, P, S>,
    hooks: &PersonaHooks<P, S>,
) -> bool {
    if let Err(err) = (hooks.entry)(ctx) {
        note_hook_failure(ctx, err);
    }
    if ctx.reset_pending() {
        return true;
    }

    if ctx.status().is_passing() {
        if let Err(err) = (hooks.payload)(ctx) {
            note_hook_failure(ctx, err);
        }
        if ctx.reset_pending() {
            return true;
        }
    }

    if let Err(err) = (hooks.exit)(ctx) {
        note_hook_failure(ctx, err);
    }
    ctx.reset_pending()
}

/// An error propagated out of a hook fails the test unless the status was
/// already downgraded (a skip stays a skip).
fn note_hook_failure<P: Platform, S>(ctx: &mut SuiteContext<'_, P, S>, err: PactError) {
    if ctx.status().is_passing() {
        ctx.set_status(TestStatus::fail(err));
    }
}

/// Post-test bookkeeping: release the boot flag, bump the persisted
/// counters and advance the resume pointer.
fn finish_test<P: Platform, S>(
    ctx: &mut SuiteContext<'_, P, S>,
    id: TestId,
    state: TestState,
) -> PactResult<()> {
    ctx.set_boot_flag(BootState::Unknown)?;

    let mut count: TestCount = ctx.nv_read(NvSlot::TestCount)?;
    match state {
        TestState::Pass => count.pass = count.pass.saturating_add(1),
        TestState::Skip => count.skip = count.skip.saturating_add(1),
        // A test still pending at completion never finished its reboot
        // protocol; that is a failure.
        _ => count.fail = count.fail.saturating_add(1),
    }
    ctx.nv_write(NvSlot::TestCount, count)?;
    ctx.nv_write(NvSlot::TestIdPrevious, id.raw())
}
