//! Error types for vdsgen-core.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vdsgen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fragment attribute compared during consistency validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Height,
    Width,
    ElementType,
    Frames,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Height => "height",
            Self::Width => "width",
            Self::ElementType => "dtype",
            Self::Frames => "frames",
        };
        f.write_str(name)
    }
}

/// Errors raised while planning or committing a virtual dataset.
///
/// Every variant is fatal to the run. Nothing is written to the output
/// artifact once any of them has been returned.
#[derive(Error, Debug)]
pub enum Error {
    /// Conflicting or missing options.
    #[error("configuration error: {0}")]
    Config(String),

    /// Prefix search matched nothing.
    #[error("no files matching pattern found. Got path: {}, prefix: {prefix}", .dir.display())]
    NoFragments { dir: PathBuf, prefix: String },

    /// Prefix search matched fewer than two files.
    #[error("folder must contain more than one matching HDF5 file, found {found}")]
    InsufficientFragments { found: usize },

    /// A listed fragment does not exist and no metadata was declared for it.
    #[error(
        "file {} does not exist. To create VDS from raw files that haven't been created yet, source metadata must be provided",
        .0.display()
    )]
    MissingFragment(PathBuf),

    /// A fragment vanished between listing and probing.
    #[error("fragment not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The data node is absent or does not have a usable shape.
    #[error("{}:{node}: {reason}", .path.display())]
    Schema {
        path: PathBuf,
        node: String,
        reason: String,
    },

    /// Fragments disagree on a compared attribute.
    #[error("files have mismatched {attribute}: expected {expected}, got {actual}")]
    Mismatch {
        attribute: Attribute,
        expected: String,
        actual: String,
    },

    /// The planned target extent does not fit in `usize`.
    #[error("layout overflow: {0}")]
    Layout(String),

    /// Bad data-node path syntax.
    #[error("invalid data node {node:?}: {reason}")]
    InvalidNode { node: String, reason: &'static str },

    /// The output artifact already holds the target node.
    #[error("VDS {} already has an entry for node {node}", .path.display())]
    NodeConflict { path: PathBuf, node: String },

    /// Element type name or store type not representable.
    #[error("unsupported element type: {0}")]
    UnsupportedType(String),

    /// Failure reported by the array store.
    #[error("array store error: {0}")]
    Store(String),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
