//! Register descriptors, numbering schemes and per-architecture catalogs.

mod arch;
mod catalog;
mod descriptor;

pub use arch::Architecture;
pub use catalog::RegisterCatalog;
pub use descriptor::{NumberingScheme, RegisterDescriptor, RegisterIdScope, RegisterRole};
