//! An in-memory array store.

use crate::metadata::ElementType;
use crate::mode::WriteMode;
use crate::node::SEPARATOR;
use crate::store::{ArrayStore, TargetArtifact, VirtualDataset};
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A dataset held by a [`MemoryStore`] file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryDataset {
    /// A plain dataset, known only by shape and type.
    Plain {
        shape: Vec<usize>,
        element_type: ElementType,
    },
    /// A committed virtual dataset.
    Virtual(VirtualDataset),
}

/// One file in a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFile {
    pub groups: BTreeSet<String>,
    pub datasets: BTreeMap<String, MemoryDataset>,
}

impl MemoryFile {
    fn contains(&self, node: &str) -> bool {
        self.groups.contains(node) || self.datasets.contains_key(node)
    }

    fn parent_exists(&self, node: &str) -> bool {
        match node.rsplit_once(SEPARATOR) {
            Some((parent, _)) => self.groups.contains(parent),
            None => true,
        }
    }
}

type Files = BTreeMap<PathBuf, MemoryFile>;

/// An in-memory store.
///
/// Clones share the same files, so a store handed to the generator can be
/// inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: Arc<Mutex<Files>>,
}

impl MemoryStore {
    /// Create a new, empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Files> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a plain dataset, creating the file and any parent groups.
    pub fn add_dataset<P: AsRef<Path>>(
        &mut self,
        path: P,
        node: &str,
        shape: &[usize],
        element_type: ElementType,
    ) {
        let mut files = self.lock();
        let file = files.entry(path.as_ref().to_path_buf()).or_default();
        for (idx, _) in node.match_indices(SEPARATOR) {
            file.groups.insert(node[..idx].to_string());
        }
        file.datasets.insert(
            node.to_string(),
            MemoryDataset::Plain {
                shape: shape.to_vec(),
                element_type,
            },
        );
    }

    /// Adds an empty file.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) {
        self.lock().entry(path.as_ref().to_path_buf()).or_default();
    }

    /// Returns a snapshot of the file at `path`.
    #[must_use]
    pub fn file<P: AsRef<Path>>(&self, path: P) -> Option<MemoryFile> {
        self.lock().get(path.as_ref()).cloned()
    }

    /// Returns the virtual dataset committed at `node`, if any.
    #[must_use]
    pub fn virtual_dataset<P: AsRef<Path>>(&self, path: P, node: &str) -> Option<VirtualDataset> {
        match self.lock().get(path.as_ref())?.datasets.get(node)? {
            MemoryDataset::Virtual(dataset) => Some(dataset.clone()),
            MemoryDataset::Plain { .. } => None,
        }
    }
}

impl ArrayStore for MemoryStore {
    type Target = MemoryTarget;

    fn list_dir(&self, dir: &Path) -> Result<Vec<String>> {
        Ok(self
            .lock()
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    fn node_exists(&self, path: &Path, node: &str) -> Result<bool> {
        self.lock()
            .get(path)
            .map(|file| file.contains(node))
            .ok_or_else(|| Error::NotFound(path.to_path_buf()))
    }

    fn read_shape_and_type(&self, path: &Path, node: &str) -> Result<(Vec<usize>, ElementType)> {
        let files = self.lock();
        let file = files
            .get(path)
            .ok_or_else(|| Error::NotFound(path.to_path_buf()))?;
        match file.datasets.get(node) {
            Some(MemoryDataset::Plain {
                shape,
                element_type,
            }) => Ok((shape.clone(), *element_type)),
            Some(MemoryDataset::Virtual(dataset)) => {
                Ok((dataset.shape.clone(), dataset.element_type))
            }
            None => Err(Error::Store(format!(
                "{}: no dataset at {node}",
                path.display()
            ))),
        }
    }

    fn open_target(&mut self, path: &Path, mode: WriteMode) -> Result<MemoryTarget> {
        let mut files = self.lock();
        match mode {
            WriteMode::Create => {
                files.insert(path.to_path_buf(), MemoryFile::default());
            }
            WriteMode::Append => {
                if !files.contains_key(path) {
                    return Err(Error::NotFound(path.to_path_buf()));
                }
            }
        }
        drop(files);

        Ok(MemoryTarget {
            files: Arc::clone(&self.files),
            path: path.to_path_buf(),
            created_groups: Vec::new(),
        })
    }
}

/// A [`MemoryStore`] file opened for writing.
#[derive(Debug)]
pub struct MemoryTarget {
    files: Arc<Mutex<Files>>,
    path: PathBuf,
    created_groups: Vec<String>,
}

impl MemoryTarget {
    /// Groups created through this handle, in creation order.
    #[must_use]
    pub fn created_groups(&self) -> &[String] {
        &self.created_groups
    }

    fn with_file<T>(&self, f: impl FnOnce(&mut MemoryFile) -> Result<T>) -> Result<T> {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        let file = files
            .get_mut(&self.path)
            .ok_or_else(|| Error::NotFound(self.path.clone()))?;
        f(file)
    }
}

impl TargetArtifact for MemoryTarget {
    fn node_exists(&self, node: &str) -> Result<bool> {
        self.with_file(|file| Ok(file.contains(node)))
    }

    fn create_group(&mut self, node: &str) -> Result<()> {
        self.with_file(|file| {
            if file.contains(node) {
                return Err(Error::Store(format!("node {node} already exists")));
            }
            if !file.parent_exists(node) {
                return Err(Error::Store(format!("parent group of {node} does not exist")));
            }
            file.groups.insert(node.to_string());
            Ok(())
        })?;
        self.created_groups.push(node.to_string());
        Ok(())
    }

    fn commit_virtual_dataset(self, dataset: &VirtualDataset) -> Result<()> {
        let node = dataset.node.as_str();
        self.with_file(|file| {
            if file.contains(node) {
                return Err(Error::Store(format!("node {node} already exists")));
            }
            if !file.parent_exists(node) {
                return Err(Error::Store(format!("parent group of {node} does not exist")));
            }
            file.datasets
                .insert(node.to_string(), MemoryDataset::Virtual(dataset.clone()));
            Ok(())
        })
    }
}
