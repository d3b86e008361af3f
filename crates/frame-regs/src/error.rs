#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A required object is missing, the frame has no recorded state for the
    /// requested bytes, or the context cannot hold register state.
    #[error("Invalid context")]
    InvalidContext,

    #[error("Invalid data size: {len} bytes at offset {offset} exceed register size {size}")]
    InvalidDataSize {
        offset: usize,
        len: usize,
        size: usize,
    },

    #[error("Invalid register catalog: {0}")]
    InvalidCatalog(String),

    /// Failure reported by a live execution context. Passed through as is.
    #[error("Target error: {0}")]
    Target(String),
}

pub type Result<T> = std::result::Result<T, Error>;
