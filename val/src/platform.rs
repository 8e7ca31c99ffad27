/*++

Licensed under the Apache-2.0 license.

File Name:

    platform.rs

Abstract:

    File contains the platform capability trait every target backend implements.

--*/

use pact_error::PactResult;

use crate::boot::{ResetReason, ResetRequest};

/// Watchdog timeout class programmed before a test payload runs. Bounds the
/// worst-case hang time of a misbehaving target; it is not a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WdogTimeout {
    Low,
    Medium,
    High,
}

// Represents a simulator, emulator or real target the suite runs against.
// Swapping the implementor swaps the backend without touching test bodies.
pub trait Platform {
    /// Read `buf.len()` bytes from persistent memory at `offset`.
    ///
    /// No bounds or schema checking beyond the caller-supplied size; the
    /// caller owns offset stability across reboots of the same image.
    fn nvmem_read(&mut self, offset: u32, buf: &mut [u8]) -> PactResult<()>;

    /// Write `buf` to persistent memory at `offset`.
    fn nvmem_write(&mut self, offset: u32, buf: &[u8]) -> PactResult<()>;

    /// Reason for the most recent reset.
    fn reset_reason(&self) -> ResetReason;

    /// Request a system reset. On real hardware control never returns from
    /// the reset; simulated backends latch the request and the dispatcher
    /// abandons the current test at the next hook boundary.
    fn request_reset(&mut self, kind: ResetRequest);

    /// True once a reset has been requested and not yet serviced.
    fn reset_pending(&self) -> bool;

    fn wdog_init(&mut self, timeout: WdogTimeout) -> PactResult<()>;

    fn wdog_enable(&mut self) -> PactResult<()>;

    fn wdog_disable(&mut self) -> PactResult<()>;

    /// Re-arm the watchdog mid-payload for long-running checks.
    fn wdog_reprogram(&mut self, timeout: WdogTimeout) -> PactResult<()>;

    /// Byte sink behind the verbosity-filtered print channel.
    fn write_byte(&mut self, byte: u8);

    /// Isolation level implemented by the target. Tests declaring a higher
    /// requirement are skipped.
    fn isolation_level(&self) -> u8 {
        1
    }
}
