use thiserror::Error;

/// Top-level error type for structural-part generation.
#[derive(Debug, Error)]
pub enum FeaError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Errors related to geometric construction.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to structure and library bookkeeping.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("index {index} is out of range for {len} entries")]
    InvalidIndex { index: usize, len: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised while reading or writing structure records.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("malformed structure record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown component referenced by structure record")]
    UnknownComponent,

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Convenience type alias for results using [`FeaError`].
pub type Result<T> = std::result::Result<T, FeaError>;
