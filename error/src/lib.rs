/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains API and macros used by the suite runtime for error handling

--*/
#![cfg_attr(not(feature = "std"), no_std)]
use core::convert::From;
use core::num::{NonZeroU32, TryFromIntError};

/// PACT Error Type
/// Derives debug, copy, clone, eq, and partial eq
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PactError(pub NonZeroU32);

/// Macro to define error constants ensuring uniqueness
///
/// This macro takes a list of (name, value, doc) tuples and generates
/// constant definitions for each error code.
#[macro_export]
macro_rules! define_error_constants {
    ($(($name:ident, $value:expr, $doc:expr)),* $(,)?) => {
        $(
            #[doc = $doc]
            pub const $name: PactError = PactError::new_const($value);
        )*

        #[cfg(test)]
        /// Returns a vector of all defined error constants for testing uniqueness
        pub fn all_constants() -> Vec<(& 'static str, u32)> {
            vec![
                $(
                    (stringify!($name), $value),
                )*
            ]
        }
    };
}

impl PactError {
    /// Create a suite error; intended to only be used from const contexts, as we don't want
    /// runtime panics if val is zero. The preferred way to get a PactError from a u32 is to
    /// use `PactError::try_from()` from the `TryFrom` trait impl.
    const fn new_const(val: u32) -> Self {
        match NonZeroU32::new(val) {
            Some(val) => Self(val),
            None => panic!("PactError cannot be 0"),
        }
    }

    // Use the macro to define all error constants
    define_error_constants![
        (
            INFRA_NVMEM_READ_FAILURE,
            0x00010001,
            "Non-volatile memory read failure"
        ),
        (
            INFRA_NVMEM_WRITE_FAILURE,
            0x00010002,
            "Non-volatile memory write failure"
        ),
        (
            INFRA_INIT_FAILURE,
            0x00010003,
            "Suite infrastructure initialization failure"
        ),
        (
            INFRA_STATUS_INVALID,
            0x00010004,
            "Status record never written by the test"
        ),
        (
            TARGET_CFG_NOT_FOUND,
            0x00020001,
            "No record with the requested configuration id"
        ),
        (
            TARGET_CFG_INVALID_ID,
            0x00020002,
            "Configuration id outside the valid major-group range"
        ),
        (
            TARGET_CFG_DB_CORRUPTED,
            0x00020003,
            "Configuration database record walk left the blob bounds"
        ),
        (
            TARGET_CFG_BAD_HEADER,
            0x00020004,
            "Configuration database header version or size check failed"
        ),
        (
            DISPATCHER_LOAD_FAILURE,
            0x00030001,
            "Malformed registry slot; the slot is skipped"
        ),
        (
            DISPATCHER_NO_TESTS,
            0x00030002,
            "Registry contains no runnable tests"
        ),
        (
            DISPATCHER_UNEXPECTED_REBOOT,
            0x00030003,
            "Device rebooted while no reset was anticipated"
        ),
        (
            DISPATCHER_BOOT_EXPECTED_BUT_FAILED,
            0x00030004,
            "Anticipated reset did not occur; device later reset for an unrelated reason"
        ),
        (
            DISPATCHER_SUITE_FAILED,
            0x00030005,
            "One or more tests in the suite failed"
        ),
        (WDOG_INIT_FAILURE, 0x00040001, "Watchdog setup failure"),
        (
            WDOG_RESET_TRIGGERED,
            0x00040002,
            "Watchdog expiry forced a device reset"
        ),
        (
            TEST_ISOLATION_LEVEL_NOT_SUPPORTED,
            0x00050001,
            "Platform isolation level below the test requirement"
        ),
        (
            TEST_CHECK_FAILED,
            0x00050002,
            "Observed value did not match the expected vector"
        ),
        (
            PLATFORM_INTERRUPT_OUT_OF_RANGE,
            0x00060001,
            "Interrupt number outside the platform vector range"
        ),
        (
            PLATFORM_POLL_TIMEOUT,
            0x00060002,
            "Hardware ready flag did not assert before the deadline"
        ),
    ];
}

impl From<core::num::NonZeroU32> for crate::PactError {
    fn from(val: core::num::NonZeroU32) -> Self {
        crate::PactError(val)
    }
}

impl From<PactError> for core::num::NonZeroU32 {
    fn from(val: PactError) -> Self {
        val.0
    }
}

impl From<PactError> for u32 {
    fn from(val: PactError) -> Self {
        core::num::NonZeroU32::from(val).get()
    }
}

impl TryFrom<u32> for PactError {
    type Error = TryFromIntError;
    fn try_from(val: u32) -> Result<Self, TryFromIntError> {
        match NonZeroU32::try_from(val) {
            Ok(val) => Ok(PactError(val)),
            Err(err) => Err(err),
        }
    }
}

pub type PactResult<T> = Result<T, PactError>;
