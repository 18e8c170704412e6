//! Destination data-node paths.

use crate::store::TargetArtifact;
use crate::{Error, Result};
use std::fmt;

/// Separator between data-node path segments.
pub const SEPARATOR: char = '/';

/// Validated data-node path inside the output artifact.
///
/// Relative, with no leading or trailing separator and no empty segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataNode(String);

impl DataNode {
    /// Validates `node` as a destination path.
    ///
    /// # Errors
    /// Returns [`Error::InvalidNode`] for an empty path, a leading or trailing
    /// separator, or an empty segment.
    pub fn parse(node: &str) -> Result<Self> {
        let reason = if node.is_empty() {
            Some("path is empty")
        } else if node.starts_with(SEPARATOR) {
            Some("path must not begin with '/'")
        } else if node.ends_with(SEPARATOR) {
            Some("path must not end with '/'")
        } else if node.split(SEPARATOR).any(str::is_empty) {
            Some("path contains an empty segment")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::InvalidNode {
                node: node.to_string(),
                reason,
            }),
            None => Ok(Self(node.to_string())),
        }
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Every ancestor group path, outermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        self.0
            .match_indices(SEPARATOR)
            .map(|(idx, _)| &self.0[..idx])
    }

    /// Creates any missing parent groups of this node in `target`.
    ///
    /// Runs before every commit, whether the artifact is new or appended to.
    ///
    /// # Errors
    /// Propagates store failures.
    pub fn ensure_parents<T: TargetArtifact + ?Sized>(&self, target: &mut T) -> Result<()> {
        for group in self.ancestors() {
            if !target.node_exists(group)? {
                log::debug!("Creating group {group}");
                target.create_group(group)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DataNode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ArrayStore;
    use crate::{ElementType, MemoryStore, WriteMode};
    use std::path::Path;

    #[test]
    fn test_parse_valid_nodes() {
        assert_eq!(DataNode::parse("full_frame").unwrap().as_str(), "full_frame");
        let nested = DataNode::parse("entry/detector/detector1").unwrap();
        assert_eq!(
            nested.ancestors().collect::<Vec<_>>(),
            vec!["entry", "entry/detector"]
        );
        assert_eq!(DataNode::parse("data").unwrap().ancestors().count(), 0);
    }

    #[test]
    fn test_leading_separator_rejected() {
        let err = DataNode::parse("/entry/detector").unwrap_err();
        assert!(matches!(err, Error::InvalidNode { ref node, .. } if node == "/entry/detector"));
    }

    #[test]
    fn test_trailing_and_empty_segments_rejected() {
        assert!(DataNode::parse("entry/detector/").is_err());
        assert!(DataNode::parse("entry//detector").is_err());
        assert!(DataNode::parse("").is_err());
    }

    #[test]
    fn test_ensure_parents_creates_missing_groups() {
        let mut store = MemoryStore::new();
        let path = Path::new("/raw/vds.h5");
        let mut target = store.open_target(path, WriteMode::Create).unwrap();

        let node = DataNode::parse("entry/detector/detector1").unwrap();
        node.ensure_parents(&mut target).unwrap();
        assert!(target.node_exists("entry").unwrap());
        assert!(target.node_exists("entry/detector").unwrap());
        assert!(!target.node_exists("entry/detector/detector1").unwrap());
    }

    #[test]
    fn test_ensure_parents_flat_node_creates_nothing() {
        let mut store = MemoryStore::new();
        let mut target = store
            .open_target(Path::new("/raw/vds.h5"), WriteMode::Create)
            .unwrap();

        DataNode::parse("full_frame").unwrap().ensure_parents(&mut target).unwrap();
        assert!(target.created_groups().is_empty());
    }

    #[test]
    fn test_ensure_parents_keeps_existing_groups() {
        let mut store = MemoryStore::new();
        let path = Path::new("/raw/vds.h5");
        store.add_dataset(path, "entry/other", &[1, 2, 3], ElementType::Uint8);
        let mut target = store.open_target(path, WriteMode::Append).unwrap();

        let node = DataNode::parse("entry/detector").unwrap();
        node.ensure_parents(&mut target).unwrap();
        assert!(target.node_exists("entry/other").unwrap());
        assert!(target.created_groups().is_empty());
    }
}
