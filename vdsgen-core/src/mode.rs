//! Create-or-append decision for the output artifact.

use crate::node::DataNode;
use crate::store::ArrayStore;
use crate::{Error, Result};
use std::fmt;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the output artifact is opened for the commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WriteMode {
    /// Create a new file, overwriting anything at the path.
    #[default]
    Create,
    /// Add the dataset to an existing file.
    Append,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Append => f.write_str("append"),
        }
    }
}

impl WriteMode {
    /// Chooses the write mode for `output` and `node`.
    ///
    /// A missing file is created. An existing file is appended to unless it
    /// already has an entry at `node`. The check and the later write are
    /// separate operations; another process touching the file in between is
    /// not detected.
    ///
    /// # Errors
    /// Returns [`Error::NodeConflict`] if the node is already present.
    pub fn select<S>(store: &S, output: &Path, node: &DataNode) -> Result<Self>
    where
        S: ArrayStore + ?Sized,
    {
        if !store.file_exists(output) {
            return Ok(Self::Create);
        }
        if store.node_exists(output, node.as_str())? {
            return Err(Error::NodeConflict {
                path: output.to_path_buf(),
                node: node.to_string(),
            });
        }
        Ok(Self::Append)
    }
}
