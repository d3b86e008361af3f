//! Register access through a stack frame.
//!
//! The innermost frame reads and writes registers of its execution context
//! directly. Outer frames only know what the unwinder has recorded for them,
//! so their registers live in a [`RegisterOverlay`] that tracks, byte by
//! byte, which values have been determined.

mod overlay;

pub use overlay::{RegisterOverlay, VALID};

use crate::{Error, ExecutionContext, RegisterDescriptor, Result};

/// Widest register [`StackFrame::read_reg_value`] can return.
const MAX_VALUE_SIZE: usize = 8;

pub struct StackFrame<'a> {
    ctx: &'a dyn ExecutionContext,
    level: usize,
    block_size: usize,
    regs: Option<RegisterOverlay>,
}

impl<'a> StackFrame<'a> {
    /// Frame `level` of a stack in `ctx`; level 0 is the innermost (top)
    /// frame. `block_size` is the register block size of the catalog the
    /// frame's registers come from.
    #[must_use]
    pub fn new(ctx: &'a dyn ExecutionContext, level: usize, block_size: usize) -> Self {
        Self {
            ctx,
            level,
            block_size,
            regs: None,
        }
    }

    /// The innermost frame of `ctx`.
    #[must_use]
    pub fn top(ctx: &'a dyn ExecutionContext, block_size: usize) -> Self {
        Self::new(ctx, 0, block_size)
    }

    #[must_use]
    pub fn is_top(&self) -> bool {
        self.level == 0
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    #[must_use]
    pub fn context(&self) -> &'a dyn ExecutionContext {
        self.ctx
    }

    /// Register values recorded for this frame, if any were ever written.
    #[must_use]
    pub fn overlay(&self) -> Option<&RegisterOverlay> {
        self.regs.as_ref()
    }

    /// Read `buf.len()` bytes starting `offset` bytes into `reg`.
    ///
    /// The top frame reads the live context. Other frames fail with
    /// [`Error::InvalidContext`] unless every requested byte has been
    /// recorded; undetermined bytes are never returned.
    pub fn read_reg_bytes(
        &self,
        reg: Option<&RegisterDescriptor>,
        offset: usize,
        buf: &mut [u8],
    ) -> Result<()> {
        let reg = reg.ok_or(Error::InvalidContext)?;
        if self.is_top() {
            return self.ctx.read_reg(reg, offset, buf);
        }

        let Some(regs) = &self.regs else {
            tracing::trace!(
                level = self.level,
                reg = reg.name(),
                "no registers recorded for frame"
            );
            return Err(Error::InvalidContext);
        };
        let range = reg.sub_range(offset, buf.len())?;
        if !regs.read(range.start, buf) {
            tracing::trace!(
                level = self.level,
                reg = reg.name(),
                offset,
                len = buf.len(),
                "register bytes not determined"
            );
            return Err(Error::InvalidContext);
        }
        Ok(())
    }

    /// Write `buf` starting `offset` bytes into `reg`.
    ///
    /// The top frame writes the live context. Other frames record the bytes
    /// as determined, creating the frame's overlay on first use; that needs
    /// a context able to hold register state.
    pub fn write_reg_bytes(
        &mut self,
        reg: Option<&RegisterDescriptor>,
        offset: usize,
        buf: &[u8],
    ) -> Result<()> {
        let reg = reg.ok_or(Error::InvalidContext)?;
        if self.is_top() {
            return self.ctx.write_reg(reg, offset, buf);
        }

        if self.regs.is_none() && !self.ctx.has_state() {
            tracing::trace!(level = self.level, reg = reg.name(), "context has no register state");
            return Err(Error::InvalidContext);
        }
        let range = reg.sub_range(offset, buf.len())?;
        if range.end > self.block_size {
            tracing::trace!(
                level = self.level,
                reg = reg.name(),
                block_size = self.block_size,
                "register lies outside the frame register block"
            );
            return Err(Error::InvalidContext);
        }

        let block_size = self.block_size;
        let level = self.level;
        let regs = self.regs.get_or_insert_with(|| {
            tracing::debug!(level, block_size, "created register overlay");
            RegisterOverlay::new(block_size)
        });
        let written = regs.write(range.start, buf);
        debug_assert!(written, "range was checked against the block size");
        Ok(())
    }

    /// Whole value of `reg` as an integer in target byte order.
    pub fn read_reg_value(&self, reg: Option<&RegisterDescriptor>) -> Result<u64> {
        let reg = reg.ok_or(Error::InvalidContext)?;
        let size = value_size(reg)?;

        let mut bytes = [0u8; MAX_VALUE_SIZE];
        self.read_reg_bytes(Some(reg), 0, &mut bytes[..size])?;
        let bytes = &bytes[..size];

        let value = if reg.big_endian() {
            bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
        } else {
            bytes.iter().rev().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
        };
        Ok(value)
    }

    /// Store `value` as the whole of `reg`, truncated to the register size.
    pub fn write_reg_value(&mut self, reg: Option<&RegisterDescriptor>, value: u64) -> Result<()> {
        let reg = reg.ok_or(Error::InvalidContext)?;
        let size = value_size(reg)?;

        let bytes = if reg.big_endian() {
            let full = value.to_be_bytes();
            full[MAX_VALUE_SIZE - size..].to_vec()
        } else {
            value.to_le_bytes()[..size].to_vec()
        };
        self.write_reg_bytes(Some(reg), 0, &bytes)
    }
}

fn value_size(reg: &RegisterDescriptor) -> Result<usize> {
    if reg.size() > MAX_VALUE_SIZE {
        return Err(Error::InvalidDataSize {
            offset: 0,
            len: reg.size(),
            size: MAX_VALUE_SIZE,
        });
    }
    Ok(reg.size())
}

impl std::fmt::Debug for StackFrame<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackFrame")
            .field("level", &self.level)
            .field("block_size", &self.block_size)
            .field("regs", &self.regs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegisterBlockContext;

    fn r0() -> RegisterDescriptor {
        RegisterDescriptor::new("R0", 0, 4).with_dwarf_id(0)
    }

    #[test]
    fn test_historical_round_trip() {
        let ctx = RegisterBlockContext::new(4);
        let mut frame = StackFrame::new(&ctx, 1, 4);
        let reg = r0();

        frame.write_reg_bytes(Some(&reg), 0, &[1, 2, 3, 4]).unwrap();
        let mut buf = [0u8; 4];
        frame.read_reg_bytes(Some(&reg), 0, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        // The live block is not involved.
        assert_eq!(ctx.block(), vec![0; 4]);
    }

    #[test]
    fn test_missing_register() {
        let ctx = RegisterBlockContext::new(4);
        let mut frame = StackFrame::new(&ctx, 2, 4);
        let mut buf = [0u8; 4];
        assert_eq!(
            frame.read_reg_bytes(None, 0, &mut buf),
            Err(Error::InvalidContext)
        );
        assert_eq!(frame.write_reg_bytes(None, 0, &buf), Err(Error::InvalidContext));
        assert!(frame.overlay().is_none());

        let mut top = StackFrame::top(&ctx, 4);
        assert_eq!(top.write_reg_bytes(None, 0, &buf), Err(Error::InvalidContext));
    }

    #[test]
    fn test_register_outside_frame_block() {
        let ctx = RegisterBlockContext::new(4);
        let mut frame = StackFrame::new(&ctx, 1, 4);
        let stray = RegisterDescriptor::new("stray", 8, 4);
        assert_eq!(
            frame.write_reg_bytes(Some(&stray), 0, &[0; 4]),
            Err(Error::InvalidContext)
        );
        assert!(frame.overlay().is_none());
    }

    #[test]
    fn test_register_at_end_of_address_space() {
        let ctx = RegisterBlockContext::new(4);
        let mut frame = StackFrame::new(&ctx, 1, 4);
        let stray = RegisterDescriptor::new("stray", usize::MAX - 1, 4);

        assert_eq!(
            frame.write_reg_bytes(Some(&stray), 0, &[0; 4]),
            Err(Error::InvalidContext)
        );
        assert!(frame.overlay().is_none());

        frame.write_reg_bytes(Some(&r0()), 0, &[1, 2, 3, 4]).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(
            frame.read_reg_bytes(Some(&stray), 0, &mut buf),
            Err(Error::InvalidContext)
        );
        // Fits the address space but not the block.
        assert_eq!(
            frame.read_reg_bytes(Some(&stray), 0, &mut buf[..1]),
            Err(Error::InvalidContext)
        );
    }

    #[test]
    fn test_value_little_endian() {
        let ctx = RegisterBlockContext::new(4);
        let mut frame = StackFrame::new(&ctx, 1, 4);
        let reg = r0();

        frame.write_reg_value(Some(&reg), 0x1122_3344).unwrap();
        let mut buf = [0u8; 4];
        frame.read_reg_bytes(Some(&reg), 0, &mut buf).unwrap();
        assert_eq!(buf, [0x44, 0x33, 0x22, 0x11]);
        assert_eq!(frame.read_reg_value(Some(&reg)), Ok(0x1122_3344));
    }

    #[test]
    fn test_value_big_endian() {
        let ctx = RegisterBlockContext::new(4);
        let mut frame = StackFrame::new(&ctx, 1, 4);
        let reg = r0().with_big_endian(true);

        frame.write_reg_value(Some(&reg), 0xAABB_CCDD).unwrap();
        let mut buf = [0u8; 2];
        frame.read_reg_bytes(Some(&reg), 0, &mut buf).unwrap();
        assert_eq!(buf, [0xAA, 0xBB]);
        assert_eq!(frame.read_reg_value(Some(&reg)), Ok(0xAABB_CCDD));
    }

    #[test]
    fn test_value_truncated_to_register_size() {
        let ctx = RegisterBlockContext::new(2);
        let mut frame = StackFrame::new(&ctx, 1, 2);
        let reg = RegisterDescriptor::new("cs", 0, 2);

        frame.write_reg_value(Some(&reg), 0xDEAD_0033).unwrap();
        assert_eq!(frame.read_reg_value(Some(&reg)), Ok(0x0033));
    }

    #[test]
    fn test_value_of_wide_register() {
        let ctx = RegisterBlockContext::new(16);
        let mut frame = StackFrame::new(&ctx, 1, 16);
        let xmm = RegisterDescriptor::new("xmm0", 0, 16);

        assert!(matches!(
            frame.write_reg_value(Some(&xmm), 1),
            Err(Error::InvalidDataSize { len: 16, .. })
        ));
        assert!(matches!(
            frame.read_reg_value(Some(&xmm)),
            Err(Error::InvalidDataSize { .. })
        ));
        assert!(frame.overlay().is_none());
    }

    #[test]
    fn test_top_frame_value_uses_context() {
        let ctx = RegisterBlockContext::new(4);
        let mut frame = StackFrame::top(&ctx, 4);
        let reg = r0();

        frame.write_reg_value(Some(&reg), 7).unwrap();
        assert_eq!(ctx.block(), vec![7, 0, 0, 0]);
        assert_eq!(frame.read_reg_value(Some(&reg)), Ok(7));
        assert!(frame.overlay().is_none());
    }
}
