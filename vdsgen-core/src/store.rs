//! The array-store seam.
//!
//! Everything that touches real files goes through [`ArrayStore`]: directory
//! listing, existence checks, reading a fragment's shape and type, and
//! committing the virtual dataset. The engine itself never opens a file.

use crate::mapping::MappingEntry;
use crate::metadata::ElementType;
use crate::mode::WriteMode;
use crate::node::DataNode;
use crate::Result;
use std::path::Path;

/// A virtual dataset ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualDataset {
    pub node: DataNode,
    pub shape: Vec<usize>,
    pub element_type: ElementType,
    pub mappings: Vec<MappingEntry>,
    /// Value read back from unmapped regions, converted to `element_type`.
    pub fill_value: u8,
}

/// Read side of the array store, plus opening the output artifact.
pub trait ArrayStore {
    /// Handle on an output artifact opened for writing.
    type Target: TargetArtifact;

    /// Lists the file names (not paths) directly inside `dir`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read.
    fn list_dir(&self, dir: &Path) -> Result<Vec<String>>;

    /// Returns true if a file exists at `path`.
    fn file_exists(&self, path: &Path) -> bool;

    /// Opens `path` read-only and reports whether `node` has an entry.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    fn node_exists(&self, path: &Path, node: &str) -> Result<bool>;

    /// Reads the full shape and element type of the dataset at `node`.
    ///
    /// # Errors
    /// Returns an error if the dataset cannot be opened or its type is not
    /// an [`ElementType`].
    fn read_shape_and_type(&self, path: &Path, node: &str) -> Result<(Vec<usize>, ElementType)>;

    /// Opens the output artifact for writing.
    ///
    /// [`WriteMode::Create`] truncates any existing file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or opened.
    fn open_target(&mut self, path: &Path, mode: WriteMode) -> Result<Self::Target>;
}

/// An output artifact open for writing.
pub trait TargetArtifact {
    /// Returns true if `node` has an entry in the artifact.
    ///
    /// # Errors
    /// Propagates store failures.
    fn node_exists(&self, node: &str) -> Result<bool>;

    /// Creates a group at `node`. Its parent must already exist.
    ///
    /// # Errors
    /// Propagates store failures.
    fn create_group(&mut self, node: &str) -> Result<()>;

    /// Declares the virtual dataset and closes the artifact.
    ///
    /// # Errors
    /// Propagates store failures.
    fn commit_virtual_dataset(self, dataset: &VirtualDataset) -> Result<()>;
}
