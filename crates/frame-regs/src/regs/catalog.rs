use std::collections::HashMap;

use super::{NumberingScheme, RegisterDescriptor, RegisterRole};
use crate::{Error, Result};

/// Immutable list of the registers of one target architecture.
///
/// The flat register block of a catalog is `block_size()` bytes long and
/// holds every register at its descriptor offset.
#[derive(Debug, Clone)]
pub struct RegisterCatalog {
    regs: Vec<RegisterDescriptor>,
    block_size: usize,
}

impl RegisterCatalog {
    /// Build a catalog, rejecting empty names, zero-sized registers and
    /// external ids used twice within one numbering scheme.
    pub fn new(regs: Vec<RegisterDescriptor>) -> Result<Self> {
        let mut seen: HashMap<(NumberingScheme, u32), &str> = HashMap::new();
        let mut block_size = 0;

        for reg in &regs {
            if reg.name().is_empty() {
                return Err(Error::InvalidCatalog(format!(
                    "register at offset {} has an empty name",
                    reg.offset()
                )));
            }
            if reg.size() == 0 {
                return Err(Error::InvalidCatalog(format!(
                    "register '{}' has zero size",
                    reg.name()
                )));
            }
            let end = reg.offset().checked_add(reg.size()).ok_or_else(|| {
                Error::InvalidCatalog(format!("register '{}' overflows the block", reg.name()))
            })?;
            block_size = block_size.max(end);

            for scheme in NumberingScheme::ALL {
                let Some(id) = reg.id(scheme) else {
                    continue;
                };
                if let Some(prev) = seen.insert((scheme, id), reg.name()) {
                    return Err(Error::InvalidCatalog(format!(
                        "{scheme} id {id} is used by both '{prev}' and '{}'",
                        reg.name()
                    )));
                }
            }
        }

        Ok(Self { regs, block_size })
    }

    /// Size in bytes of the flat register block.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RegisterDescriptor> {
        self.regs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisterDescriptor> {
        self.regs.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[RegisterDescriptor] {
        &self.regs
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&RegisterDescriptor> {
        self.regs.iter().find(|r| r.name() == name)
    }

    /// First register carrying `role`.
    #[must_use]
    pub fn by_role(&self, role: RegisterRole) -> Option<&RegisterDescriptor> {
        self.regs.iter().find(|r| r.role() == Some(role))
    }
}

impl<'a> IntoIterator for &'a RegisterCatalog {
    type Item = &'a RegisterDescriptor;
    type IntoIter = std::slice::Iter<'a, RegisterDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.regs.iter()
    }
}
