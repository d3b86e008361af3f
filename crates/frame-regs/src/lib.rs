#![allow(
    clippy::missing_errors_doc // error variants are documented on `Error`
)]

pub mod context;
pub mod error;
pub mod frame;
pub mod regs;
pub mod resolver;

/// Test harness module for writing unit and integration tests.
///
/// This module is only available when running tests or when the
/// `test-harness` feature is enabled.
#[cfg(any(test, feature = "test-harness"))]
pub mod test_harness;

pub use context::{ExecutionContext, RegisterBlockContext};
pub use error::{Error, Result};
pub use frame::{RegisterOverlay, StackFrame};
pub use regs::{
    Architecture, NumberingScheme, RegisterCatalog, RegisterDescriptor, RegisterIdScope,
    RegisterRole,
};
pub use resolver::RegisterResolver;
