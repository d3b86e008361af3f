use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::{Error, Result};

/// External register numbering space a register id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NumberingScheme {
    /// Numbers used by `.debug_info` / `.debug_frame`.
    Dwarf = 0,
    /// Numbers used by `.eh_frame` unwind tables.
    EhFrame = 1,
}

impl NumberingScheme {
    pub const ALL: [Self; 2] = [Self::Dwarf, Self::EhFrame];

    /// Map a raw scheme tag to a scheme. Unknown tags are unsupported.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Dwarf),
            1 => Some(Self::EhFrame),
            _ => None,
        }
    }

    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for NumberingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dwarf => f.write_str("dwarf"),
            Self::EhFrame => f.write_str("eh-frame"),
        }
    }
}

impl FromStr for NumberingScheme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dwarf" => Ok(Self::Dwarf),
            "eh-frame" | "eh_frame" => Ok(Self::EhFrame),
            other => Err(format!(
                "unknown numbering scheme '{other}', expected 'dwarf' or 'eh-frame'"
            )),
        }
    }
}

/// Scope handed over by a debug-info reader together with a register number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterIdScope {
    /// Raw numbering scheme tag, see [`NumberingScheme::from_tag`].
    pub id_type: u8,
    pub big_endian: bool,
    /// ELF `e_machine` of the object the number came from.
    pub machine: u16,
}

impl RegisterIdScope {
    #[must_use]
    pub const fn new(scheme: NumberingScheme) -> Self {
        Self {
            id_type: scheme.tag(),
            big_endian: false,
            machine: 0,
        }
    }
}

/// Special purpose a register serves in the target ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterRole {
    /// Program counter.
    Pc,
    /// Stack pointer.
    Sp,
    /// Frame pointer.
    Fp,
    /// Return address (link register).
    Ra,
}

impl fmt::Display for RegisterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pc => f.write_str("pc"),
            Self::Sp => f.write_str("sp"),
            Self::Fp => f.write_str("fp"),
            Self::Ra => f.write_str("ra"),
        }
    }
}

/// Backend-native description of one register.
///
/// The value of the register occupies `size` bytes starting at `offset` in
/// the flat register block of its catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDescriptor {
    name: String,
    offset: usize,
    size: usize,
    dwarf_id: Option<u32>,
    eh_frame_id: Option<u32>,
    big_endian: bool,
    role: Option<RegisterRole>,
}

impl RegisterDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, offset: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            offset,
            size,
            dwarf_id: None,
            eh_frame_id: None,
            big_endian: false,
            role: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, scheme: NumberingScheme, id: u32) -> Self {
        match scheme {
            NumberingScheme::Dwarf => self.dwarf_id = Some(id),
            NumberingScheme::EhFrame => self.eh_frame_id = Some(id),
        }
        self
    }

    #[must_use]
    pub fn with_dwarf_id(self, id: u32) -> Self {
        self.with_id(NumberingScheme::Dwarf, id)
    }

    #[must_use]
    pub fn with_eh_frame_id(self, id: u32) -> Self {
        self.with_id(NumberingScheme::EhFrame, id)
    }

    #[must_use]
    pub fn with_big_endian(mut self, big_endian: bool) -> Self {
        self.big_endian = big_endian;
        self
    }

    #[must_use]
    pub fn with_role(mut self, role: RegisterRole) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// External id of this register in `scheme`, if it has one.
    #[must_use]
    pub fn id(&self, scheme: NumberingScheme) -> Option<u32> {
        match scheme {
            NumberingScheme::Dwarf => self.dwarf_id,
            NumberingScheme::EhFrame => self.eh_frame_id,
        }
    }

    #[must_use]
    pub fn big_endian(&self) -> bool {
        self.big_endian
    }

    #[must_use]
    pub fn role(&self) -> Option<RegisterRole> {
        self.role
    }

    /// Byte range of the register inside the flat register block, or `None`
    /// if it runs past the end of the address space.
    #[must_use]
    pub fn block_range(&self) -> Option<Range<usize>> {
        Some(self.offset..self.offset.checked_add(self.size)?)
    }

    /// Block range of `len` bytes starting `offset` bytes into the register.
    ///
    /// Fails with [`Error::InvalidDataSize`] if they do not fit the register
    /// and with [`Error::InvalidContext`] if the register itself cannot be
    /// addressed.
    pub fn sub_range(&self, offset: usize, len: usize) -> Result<Range<usize>> {
        let end = match offset.checked_add(len) {
            Some(end) if end <= self.size => end,
            _ => {
                return Err(Error::InvalidDataSize {
                    offset,
                    len,
                    size: self.size,
                });
            }
        };
        let block_start = self.offset.checked_add(offset).ok_or(Error::InvalidContext)?;
        let block_end = self.offset.checked_add(end).ok_or(Error::InvalidContext)?;
        Ok(block_start..block_end)
    }
}
