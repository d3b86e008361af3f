//! Live register access of an execution context (thread or process).

use std::cell::{Cell, RefCell};
use std::ops::Range;

use crate::{Error, RegisterDescriptor, Result};

/// Live register I/O provided by a debugger backend.
///
/// Errors returned here reach callers of the frame accessors unchanged.
pub trait ExecutionContext {
    /// Read `buf.len()` bytes starting `offset` bytes into `reg`.
    fn read_reg(&self, reg: &RegisterDescriptor, offset: usize, buf: &mut [u8]) -> Result<()>;

    /// Write `buf` starting `offset` bytes into `reg`.
    fn write_reg(&self, reg: &RegisterDescriptor, offset: usize, buf: &[u8]) -> Result<()>;

    /// Whether the context can currently produce register state (for
    /// instance, it is stopped).
    fn has_state(&self) -> bool;
}

/// Execution context backed by an in-memory register block, such as a
/// snapshot taken when a thread stopped.
#[derive(Debug)]
pub struct RegisterBlockContext {
    block: RefCell<Vec<u8>>,
    stopped: Cell<bool>,
}

impl RegisterBlockContext {
    /// Stopped context with a zero-filled block.
    #[must_use]
    pub fn new(block_size: usize) -> Self {
        Self::from_block(vec![0; block_size])
    }

    #[must_use]
    pub fn from_block(block: Vec<u8>) -> Self {
        Self {
            block: RefCell::new(block),
            stopped: Cell::new(true),
        }
    }

    pub fn set_stopped(&self, stopped: bool) {
        self.stopped.set(stopped);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }

    /// Copy of the current register block.
    #[must_use]
    pub fn block(&self) -> Vec<u8> {
        self.block.borrow().clone()
    }

    fn check_access(
        &self,
        reg: &RegisterDescriptor,
        offset: usize,
        len: usize,
    ) -> Result<Range<usize>> {
        if !self.is_stopped() {
            return Err(Error::Target(format!(
                "cannot access register '{}': context is running",
                reg.name()
            )));
        }
        let range = reg.sub_range(offset, len)?;
        if range.end > self.block.borrow().len() {
            return Err(Error::Target(format!(
                "register '{}' lies outside the register block",
                reg.name()
            )));
        }
        Ok(range)
    }
}

impl ExecutionContext for RegisterBlockContext {
    fn read_reg(&self, reg: &RegisterDescriptor, offset: usize, buf: &mut [u8]) -> Result<()> {
        let range = self.check_access(reg, offset, buf.len())?;
        buf.copy_from_slice(&self.block.borrow()[range]);
        Ok(())
    }

    fn write_reg(&self, reg: &RegisterDescriptor, offset: usize, buf: &[u8]) -> Result<()> {
        let range = self.check_access(reg, offset, buf.len())?;
        self.block.borrow_mut()[range].copy_from_slice(buf);
        Ok(())
    }

    fn has_state(&self) -> bool {
        self.is_stopped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_block() {
        let ctx = RegisterBlockContext::new(16);
        let reg = RegisterDescriptor::new("r1", 8, 8);

        ctx.write_reg(&reg, 2, &[0xAB, 0xCD]).unwrap();
        let mut buf = [0u8; 8];
        ctx.read_reg(&reg, 0, &mut buf).unwrap();
        assert_eq!(buf, [0, 0, 0xAB, 0xCD, 0, 0, 0, 0]);
        assert_eq!(&ctx.block()[10..12], &[0xAB, 0xCD]);
    }

    #[test]
    fn test_out_of_register_access() {
        let ctx = RegisterBlockContext::new(16);
        let reg = RegisterDescriptor::new("r0", 0, 4);
        let mut buf = [0u8; 4];
        assert!(matches!(
            ctx.read_reg(&reg, 1, &mut buf),
            Err(Error::InvalidDataSize { .. })
        ));
    }

    #[test]
    fn test_running_context_has_no_state() {
        let ctx = RegisterBlockContext::new(8);
        ctx.set_stopped(false);
        assert!(!ctx.has_state());

        let reg = RegisterDescriptor::new("r0", 0, 8);
        let mut buf = [0u8; 8];
        assert!(matches!(
            ctx.read_reg(&reg, 0, &mut buf),
            Err(Error::Target(_))
        ));
    }

    #[test]
    fn test_register_outside_block() {
        let ctx = RegisterBlockContext::new(4);
        let reg = RegisterDescriptor::new("wide", 0, 8);
        assert!(matches!(
            ctx.write_reg(&reg, 0, &[0; 8]),
            Err(Error::Target(_))
        ));
    }

    #[test]
    fn test_register_at_end_of_address_space() {
        let ctx = RegisterBlockContext::new(4);
        let reg = RegisterDescriptor::new("stray", usize::MAX - 1, 4);
        let mut buf = [0u8; 4];
        assert_eq!(ctx.read_reg(&reg, 0, &mut buf), Err(Error::InvalidContext));
        assert!(matches!(
            ctx.write_reg(&reg, 0, &buf[..1]),
            Err(Error::Target(_))
        ));
    }
}
