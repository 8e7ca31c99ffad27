/*++

Licensed under the Apache-2.0 license.

File Name:

    status.rs

Abstract:

    File contains the per-test status recorder.

--*/

use pact_error::PactError;

use crate::test::TestId;

/// Test lifecycle state. `Start` and `End` bracket a run; `Pending` marks a
/// test intentionally left incomplete across a reboot it requested itself.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[repr(u8)]
pub enum TestState {
    Start = 0x01,
    End = 0x02,
    Pass = 0x04,
    Fail = 0x08,
    Skip = 0x10,
    Pending = 0x20,
}

/// Recorded {state, status-code} pair for one test.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct TestStatus {
    pub state: TestState,
    pub code: u32,
}

impl TestStatus {
    /// Preset written before a test runs; a test that never reaches its
    /// start checkpoint reports as failed with this code.
    pub const fn invalid() -> TestStatus {
        TestStatus {
            state: TestState::Fail,
            code: PactError::INFRA_STATUS_INVALID.0.get(),
        }
    }

    pub fn start() -> TestStatus {
        TestStatus {
            state: TestState::Start,
            code: 0,
        }
    }

    pub fn end() -> TestStatus {
        TestStatus {
            state: TestState::End,
            code: 0,
        }
    }

    pub fn pass() -> TestStatus {
        TestStatus {
            state: TestState::Pass,
            code: 0,
        }
    }

    pub fn fail(err: PactError) -> TestStatus {
        TestStatus {
            state: TestState::Fail,
            code: err.into(),
        }
    }

    pub fn skip(err: PactError) -> TestStatus {
        TestStatus {
            state: TestState::Skip,
            code: err.into(),
        }
    }

    pub fn pending(err: PactError) -> TestStatus {
        TestStatus {
            state: TestState::Pending,
            code: err.into(),
        }
    }

    /// True while nothing has downgraded the test; gates payload execution
    /// and the non-secure persona.
    pub fn is_passing(&self) -> bool {
        matches!(
            self.state,
            TestState::Start | TestState::Pass | TestState::End
        )
    }

    pub fn is_fail(&self) -> bool {
        self.state == TestState::Fail
    }

    pub fn is_skip(&self) -> bool {
        self.state == TestState::Skip
    }

    pub fn is_pending(&self) -> bool {
        self.state == TestState::Pending
    }
}

impl Default for TestStatus {
    fn default() -> Self {
        TestStatus::invalid()
    }
}

/// In-memory status records for the suite run. Slot 0 is the scratch record
/// for the test in progress; completed tests get one slot each, keyed by id.
/// Process-lifetime; records are never destroyed, only overwritten.
pub struct StatusBuffer {
    scratch: TestStatus,
    slots: Vec<(TestId, TestStatus)>,
}

impl StatusBuffer {
    pub fn new() -> StatusBuffer {
        StatusBuffer {
            scratch: TestStatus::invalid(),
            slots: Vec::new(),
        }
    }

    pub fn set(&mut self, status: TestStatus) {
        self.scratch = status;
    }

    pub fn get(&self) -> TestStatus {
        self.scratch
    }

    /// Copy the scratch record into the slot for `id`. Idempotent until the
    /// next `set`.
    pub fn record(&mut self, id: TestId) -> TestStatus {
        match self.slots.iter_mut().find(|(slot_id, _)| *slot_id == id) {
            Some((_, status)) => *status = self.scratch,
            None => self.slots.push((id, self.scratch)),
        }
        self.scratch
    }

    pub fn slot(&self, id: TestId) -> Option<TestStatus> {
        self.slots
            .iter()
            .find(|(slot_id, _)| *slot_id == id)
            .map(|(_, status)| *status)
    }
}

impl Default for StatusBuffer {
    fn default() -> Self {
        StatusBuffer::new()
    }
}
