//! Lookup of register descriptors by external register number.
//!
//! Debug-info streams name registers by number, and which number means
//! which register depends on the numbering scheme in effect. The resolver
//! keeps one dense table per scheme, indexed by external id, built from the
//! catalog the first time that scheme is asked for. Tables are never rebuilt:
//! the catalog is fixed once the resolver owns it.

use std::sync::OnceLock;

use crate::regs::{
    Architecture, NumberingScheme, RegisterCatalog, RegisterDescriptor, RegisterIdScope,
    RegisterRole,
};
use crate::Result;

/// Dense id → catalog index table for one numbering scheme.
type SchemeTable = Vec<Option<usize>>;

#[derive(Debug)]
pub struct RegisterResolver {
    catalog: RegisterCatalog,
    tables: [OnceLock<SchemeTable>; NumberingScheme::ALL.len()],
}

impl RegisterResolver {
    #[must_use]
    pub fn new(catalog: RegisterCatalog) -> Self {
        Self {
            catalog,
            tables: std::array::from_fn(|_| OnceLock::new()),
        }
    }

    /// Resolver over the built-in catalog of `arch`.
    pub fn for_arch(arch: Architecture) -> Result<Self> {
        Ok(Self::new(arch.catalog()?))
    }

    #[must_use]
    pub fn catalog(&self) -> &RegisterCatalog {
        &self.catalog
    }

    /// Descriptor numbered `id` in `scheme`.
    ///
    /// Absence is a normal outcome: debug info routinely mentions register
    /// numbers the backend does not model.
    #[must_use]
    pub fn resolve(&self, scheme: NumberingScheme, id: u32) -> Option<&RegisterDescriptor> {
        let table = self.tables[scheme.index()].get_or_init(|| build_table(&self.catalog, scheme));
        let slot = (*table.get(slot_index(id)?)?)?;
        self.catalog.get(slot)
    }

    /// Like [`resolve`](Self::resolve), with the scheme given as a raw tag.
    /// Unsupported tags resolve to nothing.
    #[must_use]
    pub fn resolve_in_scope(
        &self,
        scope: &RegisterIdScope,
        id: u32,
    ) -> Option<&RegisterDescriptor> {
        let scheme = NumberingScheme::from_tag(scope.id_type)?;
        self.resolve(scheme, id)
    }

    #[must_use]
    pub fn pc(&self) -> Option<&RegisterDescriptor> {
        self.catalog.by_role(RegisterRole::Pc)
    }

    #[must_use]
    pub fn sp(&self) -> Option<&RegisterDescriptor> {
        self.catalog.by_role(RegisterRole::Sp)
    }
}

/// Table position of external id `id`.
fn slot_index(id: u32) -> Option<usize> {
    usize::try_from(id).ok()
}

fn build_table(catalog: &RegisterCatalog, scheme: NumberingScheme) -> SchemeTable {
    // First pass sizes the table, second pass fills it.
    let len = catalog
        .iter()
        .filter_map(|reg| reg.id(scheme).and_then(slot_index))
        .map(|slot| slot + 1)
        .max()
        .unwrap_or(0);

    let mut table = vec![None; len];
    let mut populated = 0usize;
    for (index, reg) in catalog.iter().enumerate() {
        if let Some(slot) = reg.id(scheme).and_then(slot_index) {
            table[slot] = Some(index);
            populated += 1;
        }
    }

    tracing::debug!(%scheme, len, populated, "built register id table");
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_catalog() -> RegisterCatalog {
        RegisterCatalog::new(vec![
            RegisterDescriptor::new("r0", 0, 4).with_dwarf_id(0),
            RegisterDescriptor::new("r1", 4, 4)
                .with_dwarf_id(3)
                .with_eh_frame_id(1),
            RegisterDescriptor::new("flags", 8, 4),
        ])
        .unwrap()
    }

    #[test]
    fn test_table_sized_by_max_id() {
        let catalog = small_catalog();
        assert_eq!(build_table(&catalog, NumberingScheme::Dwarf).len(), 4);
        assert_eq!(build_table(&catalog, NumberingScheme::EhFrame).len(), 2);
    }

    #[test]
    fn test_gaps_resolve_to_none() {
        let resolver = RegisterResolver::new(small_catalog());
        assert_eq!(
            resolver.resolve(NumberingScheme::Dwarf, 0).map(RegisterDescriptor::name),
            Some("r0")
        );
        assert!(resolver.resolve(NumberingScheme::Dwarf, 1).is_none());
        assert!(resolver.resolve(NumberingScheme::Dwarf, 2).is_none());
        assert_eq!(
            resolver.resolve(NumberingScheme::Dwarf, 3).map(RegisterDescriptor::name),
            Some("r1")
        );
        assert!(resolver.resolve(NumberingScheme::Dwarf, 4).is_none());
        assert!(resolver.resolve(NumberingScheme::Dwarf, u32::MAX).is_none());
    }

    #[test]
    fn test_schemes_are_independent() {
        let resolver = RegisterResolver::new(small_catalog());
        assert!(resolver.resolve(NumberingScheme::EhFrame, 0).is_none());
        assert_eq!(
            resolver.resolve(NumberingScheme::EhFrame, 1).map(RegisterDescriptor::name),
            Some("r1")
        );
        assert!(resolver.tables[NumberingScheme::Dwarf.index()].get().is_none());
    }

    #[test]
    fn test_unused_scheme_has_empty_table() {
        let reg = RegisterDescriptor::new("a", 0, 8).with_dwarf_id(0);
        let catalog = RegisterCatalog::new(vec![reg]).unwrap();
        let resolver = RegisterResolver::new(catalog);
        assert!(resolver.resolve(NumberingScheme::EhFrame, 0).is_none());
        assert_eq!(
            resolver.tables[NumberingScheme::EhFrame.index()].get().map(Vec::len),
            Some(0)
        );
    }

    #[test]
    fn test_unknown_scope_tag() {
        let resolver = RegisterResolver::new(small_catalog());
        let scope = RegisterIdScope {
            id_type: 7,
            big_endian: false,
            machine: 0,
        };
        assert!(resolver.resolve_in_scope(&scope, 0).is_none());
        assert!(resolver.tables.iter().all(|t| t.get().is_none()));

        let dwarf = RegisterIdScope::new(NumberingScheme::Dwarf);
        assert_eq!(
            resolver.resolve_in_scope(&dwarf, 3).map(RegisterDescriptor::name),
            Some("r1")
        );
    }

    #[test]
    fn test_concurrent_first_use() {
        let resolver = RegisterResolver::for_arch(Architecture::X86_64).unwrap();
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let rsp = resolver.resolve(NumberingScheme::Dwarf, 7).unwrap();
                    assert_eq!(rsp.name(), "rsp");
                });
            }
        });
    }
}
