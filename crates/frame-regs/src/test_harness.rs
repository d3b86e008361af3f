//! Test harness for frame-regs unit and integration tests
//!
//! Provides a recording execution context and small catalogs so tests can
//! check which path (live context or frame overlay) an access took.
//!
//! # Example
//!
//! ```rust
//! use frame_regs::test_harness::*;
//! use frame_regs::{NumberingScheme, RegisterResolver, StackFrame};
//!
//! let resolver = RegisterResolver::new(r0_catalog());
//! let ctx = MockContext::new();
//! let mut frame = StackFrame::new(&ctx, 1, resolver.catalog().block_size());
//!
//! let r0 = resolver.resolve(NumberingScheme::Dwarf, 0);
//! frame.write_reg_bytes(r0, 0, &[1, 2, 3, 4]).unwrap();
//!
//! let mut buf = [0u8; 4];
//! frame.read_reg_bytes(r0, 0, &mut buf).unwrap();
//! assert_eq!(buf, [1, 2, 3, 4]);
//! assert!(ctx.calls().is_empty());
//! ```

#![allow(clippy::must_use_candidate, clippy::missing_panics_doc)]

use std::cell::{Cell, RefCell};

use crate::{Error, ExecutionContext, RegisterCatalog, RegisterDescriptor, Result};

/// A call made on a [`MockContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextCall {
    Read {
        reg: String,
        offset: usize,
        len: usize,
    },
    Write {
        reg: String,
        offset: usize,
        bytes: Vec<u8>,
    },
}

/// Execution context that records live accesses.
///
/// Reads fill the buffer with [`MockContext::FILL`]. A failure set with
/// [`fail_with`](MockContext::fail_with) is returned by every later access.
#[derive(Debug)]
pub struct MockContext {
    has_state: Cell<bool>,
    failure: RefCell<Option<Error>>,
    calls: RefCell<Vec<ContextCall>>,
}

impl MockContext {
    pub const FILL: u8 = 0x5A;

    /// Context that can hold register state.
    pub fn new() -> Self {
        Self {
            has_state: Cell::new(true),
            failure: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Context that reports no register state.
    pub fn stateless() -> Self {
        let ctx = Self::new();
        ctx.has_state.set(false);
        ctx
    }

    pub fn set_has_state(&self, has_state: bool) {
        self.has_state.set(has_state);
    }

    pub fn fail_with(&self, error: Error) {
        *self.failure.borrow_mut() = Some(error);
    }

    pub fn calls(&self) -> Vec<ContextCall> {
        self.calls.borrow().clone()
    }

    fn check_failure(&self) -> Result<()> {
        match self.failure.borrow().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Default for MockContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext for MockContext {
    fn read_reg(&self, reg: &RegisterDescriptor, offset: usize, buf: &mut [u8]) -> Result<()> {
        self.calls.borrow_mut().push(ContextCall::Read {
            reg: reg.name().to_string(),
            offset,
            len: buf.len(),
        });
        self.check_failure()?;
        buf.fill(Self::FILL);
        Ok(())
    }

    fn write_reg(&self, reg: &RegisterDescriptor, offset: usize, buf: &[u8]) -> Result<()> {
        self.calls.borrow_mut().push(ContextCall::Write {
            reg: reg.name().to_string(),
            offset,
            bytes: buf.to_vec(),
        });
        self.check_failure()
    }

    fn has_state(&self) -> bool {
        self.has_state.get()
    }
}

/// Catalog with the single 4-byte register `R0`, DWARF number 0.
pub fn r0_catalog() -> RegisterCatalog {
    RegisterCatalog::new(vec![RegisterDescriptor::new("R0", 0, 4).with_dwarf_id(0)]).unwrap()
}

/// Catalog of three adjacent registers with sparse DWARF numbers:
/// `a` (4 bytes, DWARF 0), `b` (8 bytes, DWARF 2, EH-frame 0) and `c`
/// (2 bytes, no numbers).
pub fn abc_catalog() -> RegisterCatalog {
    RegisterCatalog::new(vec![
        RegisterDescriptor::new("a", 0, 4).with_dwarf_id(0),
        RegisterDescriptor::new("b", 4, 8)
            .with_dwarf_id(2)
            .with_eh_frame_id(0),
        RegisterDescriptor::new("c", 12, 2),
    ])
    .unwrap()
}
