use std::ops::Range;

/// Mask byte value marking a value byte as determined.
pub const VALID: u8 = 0xFF;

/// Register values recorded for a historical stack frame.
///
/// Two equally sized blocks addressed by the same offsets: `data` holds the
/// register bytes and `mask` records, per byte, whether the value is known.
/// Bytes start out undetermined and only [`write`](Self::write) marks them
/// valid; nothing here ever clears a mask byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterOverlay {
    data: Vec<u8>,
    mask: Vec<u8>,
}

impl RegisterOverlay {
    /// Zero-filled overlay with every byte undetermined.
    #[must_use]
    pub fn new(block_size: usize) -> Self {
        Self {
            data: vec![0; block_size],
            mask: vec![0; block_size],
        }
    }

    #[must_use]
    pub fn block_size(&self) -> usize {
        self.data.len()
    }

    /// Whether every byte of `range` is determined. Ranges reaching past the
    /// block are never valid.
    #[must_use]
    pub fn is_valid(&self, range: Range<usize>) -> bool {
        self.mask
            .get(range)
            .is_some_and(|mask| mask.iter().all(|&m| m == VALID))
    }

    /// Copy the bytes at `start` into `buf`. Returns `false`, leaving `buf`
    /// untouched, unless every requested byte is determined.
    #[must_use]
    pub fn read(&self, start: usize, buf: &mut [u8]) -> bool {
        let Some(end) = start.checked_add(buf.len()) else {
            return false;
        };
        let range = start..end;
        if !self.is_valid(range.clone()) {
            return false;
        }
        buf.copy_from_slice(&self.data[range]);
        true
    }

    /// Store `bytes` at `start` and mark them determined. Returns `false`,
    /// changing nothing, when the range does not fit the block.
    #[must_use]
    pub fn write(&mut self, start: usize, bytes: &[u8]) -> bool {
        let Some(end) = start.checked_add(bytes.len()) else {
            return false;
        };
        if end > self.data.len() {
            return false;
        }
        let range = start..end;
        self.data[range.clone()].copy_from_slice(bytes);
        self.mask[range].fill(VALID);
        true
    }

    /// Number of determined bytes in the whole block.
    #[must_use]
    pub fn valid_bytes(&self) -> usize {
        self.mask.iter().filter(|&&m| m == VALID).count()
    }
}
