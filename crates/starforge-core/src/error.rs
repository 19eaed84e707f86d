//! Error types for the generation engine.

use std::fmt;

/// Errors from the persistence sink.
#[derive(Debug)]
pub enum StoreError {
    /// An update referenced a row that does not exist.
    MissingRow { table: &'static str, id: u64 },
    /// A gate insert hit an existing canonical endpoint pair without
    /// opting into ignore semantics.
    DuplicateGate { galaxy_id: u64 },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::MissingRow { table, id } => {
                write!(f, "no row with id {id} in table {table}")
            }
            StoreError::DuplicateGate { galaxy_id } => {
                write!(f, "duplicate gate endpoints in galaxy {galaxy_id}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors from pipeline assembly and execution.
#[derive(Debug)]
pub enum GenerationError {
    /// The generator dependency graph contains a cycle.
    CyclicDependency { remaining: Vec<String> },
    /// A generator names a dependency that is not registered.
    UnknownDependency { generator: String, dependency: String },
    /// A stage reported failure; earlier stages' rows are preserved.
    StageFailure { stage: String, message: String },
    /// A galaxy id that is not in the store.
    UnknownGalaxy(u64),
    Store(StoreError),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::CyclicDependency { remaining } => {
                write!(f, "cyclic generator dependencies among: {}", remaining.join(", "))
            }
            GenerationError::UnknownDependency { generator, dependency } => {
                write!(f, "generator '{generator}' depends on unknown '{dependency}'")
            }
            GenerationError::StageFailure { stage, message } => {
                write!(f, "stage '{stage}' failed: {message}")
            }
            GenerationError::UnknownGalaxy(id) => write!(f, "unknown galaxy {id}"),
            GenerationError::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerationError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for GenerationError {
    fn from(e: StoreError) -> Self {
        GenerationError::Store(e)
    }
}

/// Errors from snapshot save/load.
#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
    UnknownGalaxy(u64),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "io error: {e}"),
            SnapshotError::Bincode(e) => write!(f, "serialization error: {e}"),
            SnapshotError::VersionMismatch { expected, found } => {
                write!(f, "snapshot version mismatch: expected {expected}, found {found}")
            }
            SnapshotError::UnknownGalaxy(id) => write!(f, "unknown galaxy {id}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        SnapshotError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SnapshotError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SnapshotError::Bincode(e)
    }
}
