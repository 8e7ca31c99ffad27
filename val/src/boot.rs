/*++

Licensed under the Apache-2.0 license.

File Name:

    boot.rs

Abstract:

    File contains the boot-flag state machine and reset classification.

--*/

/// Reset Reason
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ResetReason {
    /// Cold Reset
    ColdReset,

    /// Warm Reset
    WarmReset,

    /// Watchdog Reset
    WdogReset,

    /// Unknown Reset
    Unknown,
}

impl ResetReason {
    /// True when the reset was requested by the previously running image
    /// (directly, or indirectly through the watchdog it armed). Any other
    /// reason is an unrelated power cycle and invalidates continuation state.
    pub fn is_requested(self) -> bool {
        matches!(self, ResetReason::WarmReset | ResetReason::WdogReset)
    }
}

/// Reset kind a test or the harness may ask the platform for.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ResetRequest {
    Warm,
    Cold,
}

/// Boot flag persisted in NVRAM by the currently running test.
///
/// A test writes an `Expected*` value immediately before an operation that
/// may reset the device. If the next boot finds that exact value, the reset
/// was the intended outcome; `ExpectedButFailed` is written by a handler
/// that observed the wrong failure and is a hard test failure.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[repr(u32)]
pub enum BootState {
    /// No test in flight.
    Unknown = 0x1,

    /// A test is running and no reset is anticipated. Finding this value
    /// after a reboot means the device crashed.
    NotExpected = 0x2,

    /// Reset anticipated while executing in the secure persona.
    ExpectedSecure = 0x3,

    /// Reset anticipated while executing in the non-secure persona.
    ExpectedNonSecure = 0x4,

    /// The anticipated reset did not happen; the device later reset for an
    /// unrelated reason.
    ExpectedButFailed = 0x5,

    /// Reset anticipated; resume the same test at its next check.
    ExpectedContinuation = 0x6,

    /// Reset anticipated; resume the same test past its second check.
    ExpectedOnSecondCheck = 0x7,
}

impl BootState {
    /// Decode the persisted word. Anything unrecognized (including the
    /// zero-filled pattern of never-written NVRAM) reads as `Unknown`.
    pub fn from_word(word: u32) -> BootState {
        match word {
            0x2 => BootState::NotExpected,
            0x3 => BootState::ExpectedSecure,
            0x4 => BootState::ExpectedNonSecure,
            0x5 => BootState::ExpectedButFailed,
            0x6 => BootState::ExpectedContinuation,
            0x7 => BootState::ExpectedOnSecondCheck,
            _ => BootState::Unknown,
        }
    }

    pub fn to_word(self) -> u32 {
        self as u32
    }

    /// True while a test owns the flag, i.e. any state other than `Unknown`.
    pub fn in_flight(self) -> bool {
        !matches!(self, BootState::Unknown)
    }

    /// True for the values a test sets ahead of a reset it intends to cause.
    pub fn anticipates_reset(self) -> bool {
        matches!(
            self,
            BootState::ExpectedSecure
                | BootState::ExpectedNonSecure
                | BootState::ExpectedContinuation
                | BootState::ExpectedOnSecondCheck
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_round_trip() {
        for state in [
            BootState::Unknown,
            BootState::NotExpected,
            BootState::ExpectedSecure,
            BootState::ExpectedNonSecure,
            BootState::ExpectedButFailed,
            BootState::ExpectedContinuation,
            BootState::ExpectedOnSecondCheck,
        ] {
            assert_eq!(BootState::from_word(state.to_word()), state);
        }
    }

    #[test]
    fn test_garbage_reads_as_unknown() {
        assert_eq!(BootState::from_word(0), BootState::Unknown);
        assert_eq!(BootState::from_word(0xDEAD_BEEF), BootState::Unknown);
    }

    #[test]
    fn test_requested_reset_classification() {
        assert!(ResetReason::WarmReset.is_requested());
        assert!(ResetReason::WdogReset.is_requested());
        assert!(!ResetReason::ColdReset.is_requested());
        assert!(!ResetReason::Unknown.is_requested());
    }
}
