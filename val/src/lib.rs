/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the PACT validation-abstraction runtime.

--*/

mod boot;
mod context;
mod dispatcher;
mod nvmem;
mod platform;
mod printer;
mod status;
mod target;
mod test;

pub use crate::boot::{BootState, ResetReason, ResetRequest};
pub use crate::context::{SuiteContext, TestAttributes};
pub use crate::dispatcher::{run_suite, SuiteExit, SuiteSummary};
pub use crate::nvmem::{DataSlot, NvSlot, TestCount, NV_BLOCK_SIZE};
pub use crate::platform::{Platform, WdogTimeout};
pub use crate::printer::Verbosity;
pub use crate::status::{StatusBuffer, TestState, TestStatus};
pub use crate::target::{
    CfgGroup, CfgId, MemoryDesc, TargetConfigBuilder, TargetConfigDb, CFG_ID_INVALID, MEMORY_NVRAM,
};
pub use crate::test::{
    component_name, groups, NextTest, PersonaHooks, TestCase, TestFn, TestId, TestRegistry,
};

#[cfg(test)]
pub(crate) mod testutil;
