/*++

Licensed under the Apache-2.0 license.

File Name:

    test.rs

Abstract:

    File contains the test identity types and the compiled-in test registry.

--*/

use bitfield::bitfield;

use crate::context::SuiteContext;
use crate::platform::Platform;
use pact_error::PactResult;

/// API component groups. The group number is the high byte of a test id and
/// selects the component banner.
pub mod groups {
    pub const IPC: u8 = 0;
    pub const CRYPTO: u8 = 1;
    pub const PROTECTED_STORAGE: u8 = 2;
    pub const INTERNAL_TRUSTED_STORAGE: u8 = 3;
    pub const ATTESTATION: u8 = 4;
    pub const MAX: u8 = 4;
}

pub fn component_name(group: u8) -> &'static str {
    match group {
        groups::IPC => "IPC Suite",
        groups::CRYPTO => "Crypto Suite",
        groups::PROTECTED_STORAGE => "Protected Storage Suite",
        groups::INTERNAL_TRUSTED_STORAGE => "Internal Trusted Storage Suite",
        groups::ATTESTATION => "Initial Attestation Suite",
        _ => "Unknown Suite",
    }
}

bitfield! {
    /// Composite test id: component group in the high byte, test number in
    /// the low half-word.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct TestId(u32);

    /// Test number within the group
    pub u16, num, set_num: 15, 0;

    /// Component group
    pub u8, group, set_group: 31, 24;
}

impl TestId {
    /// Reserved id persisted when no test has completed yet.
    pub const INVALID: TestId = TestId(0xFFFF_FFFF);

    pub fn new(group: u8, num: u16) -> TestId {
        let mut id = TestId(0);
        id.set_group(group);
        id.set_num(num);
        id
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn from_raw(raw: u32) -> TestId {
        TestId(raw)
    }
}

impl core::fmt::Debug for TestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "TestId({}, {})", self.group(), self.num())
    }
}

/// A test hook. Hooks receive the suite context and report through its
/// status recorder; the returned error doubles as the recorded failure code.
pub type TestFn<P, S> = fn(&mut SuiteContext<'_, P, S>) -> PactResult<()>;

/// The three hooks making up one persona of a test: fixture setup, the
/// checks themselves, and teardown. `exit` always runs, even after a failed
/// entry, so fixtures cannot leak into the next test.
pub struct PersonaHooks<P: Platform, S> {
    pub entry: TestFn<P, S>,
    pub payload: TestFn<P, S>,
    pub exit: TestFn<P, S>,
}

/// One compiled-in test. The secure persona always exists; the non-secure
/// persona is optional and runs only while the secure persona left the test
/// passing.
pub struct TestCase<P: Platform, S> {
    pub id: TestId,
    pub ref_tag: &'static str,
    pub title: &'static str,
    pub secure: PersonaHooks<P, S>,
    pub nonsecure: Option<PersonaHooks<P, S>>,
}

/// Result of asking the registry for the next runnable test.
pub struct NextTest<'a, P: Platform, S> {
    /// Malformed entries stepped over on the way to `case`.
    pub skipped: usize,
    /// `None` once the registry is exhausted.
    pub case: Option<&'a TestCase<P, S>>,
}

/// Ordered, compiled-in test list. Registry order is execution order; the
/// dispatcher resumes after a reboot by asking for the entry after the last
/// persisted id.
pub struct TestRegistry<'a, P: Platform, S> {
    cases: &'a [TestCase<P, S>],
}

impl<'a, P: Platform, S> TestRegistry<'a, P, S> {
    pub fn new(cases: &'a [TestCase<P, S>]) -> TestRegistry<'a, P, S> {
        TestRegistry { cases }
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Find the entry recorded for `id`, if any.
    pub fn find(&self, id: TestId) -> Option<&'a TestCase<P, S>> {
        self.cases.iter().find(|case| case.id == id)
    }

    /// First well-formed entry after the one matching `prev`. With
    /// `TestId::INVALID` the scan starts at the head. A `prev` that is not
    /// in the registry exhausts the scan, which reads as end-of-suite.
    pub fn next_after(&self, prev: TestId) -> NextTest<'a, P, S> {
        let start = if prev == TestId::INVALID {
            0
        } else {
            match self.cases.iter().position(|case| case.id == prev) {
                Some(pos) => pos + 1,
                None => self.cases.len(),
            }
        };

        let mut skipped = 0;
        for case in &self.cases[start..] {
            if case.id == TestId::INVALID || case.id.group() > groups::MAX {
                skipped += 1;
                continue;
            }
            return NextTest {
                skipped,
                case: Some(case),
            };
        }
        NextTest {
            skipped,
            case: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{noop_case, FakePlatform};

    type Registry<'a> = TestRegistry<'a, FakePlatform, ()>;

    #[test]
    fn test_id_fields() {
        let id = TestId::new(groups::CRYPTO, 203);
        assert_eq!(id.group(), groups::CRYPTO);
        assert_eq!(id.num(), 203);
        assert_eq!(TestId::from_raw(id.raw()), id);
        assert_ne!(id, TestId::INVALID);
    }

    #[test]
    fn test_next_after_walks_in_order() {
        let cases = [
            noop_case(TestId::new(groups::IPC, 1)),
            noop_case(TestId::new(groups::IPC, 2)),
            noop_case(TestId::new(groups::CRYPTO, 1)),
        ];
        let registry = Registry::new(&cases);

        let first = registry.next_after(TestId::INVALID);
        assert_eq!(first.case.map(|c| c.id), Some(cases[0].id));
        let second = registry.next_after(cases[0].id);
        assert_eq!(second.case.map(|c| c.id), Some(cases[1].id));
        let last = registry.next_after(cases[2].id);
        assert!(last.case.is_none());
    }

    #[test]
    fn test_malformed_entries_are_skipped_and_counted() {
        let cases = [
            noop_case(TestId::INVALID),
            noop_case(TestId::new(groups::MAX + 1, 1)),
            noop_case(TestId::new(groups::IPC, 5)),
        ];
        let registry = Registry::new(&cases);

        let next = registry.next_after(TestId::INVALID);
        assert_eq!(next.skipped, 2);
        assert_eq!(next.case.map(|c| c.id), Some(TestId::new(groups::IPC, 5)));
    }

    #[test]
    fn test_unknown_prev_reads_as_end() {
        let cases = [noop_case(TestId::new(groups::IPC, 1))];
        let registry = Registry::new(&cases);
        let next = registry.next_after(TestId::new(groups::IPC, 99));
        assert!(next.case.is_none());
        assert_eq!(next.skipped, 0);
    }
}
