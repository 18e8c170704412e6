//! Consistency validation across fragments.

use crate::config::StackAxis;
use crate::metadata::FragmentMetadata;
use crate::{Attribute, Error, Result};
use std::path::{Path, PathBuf};

/// Ordered set of fragments whose metadata has been checked for consistency.
///
/// Order is stacking order. Every fragment shares height, width and element
/// type. Frame dimensions match exactly when stacking rows, and match after
/// the leading dimension when stacking frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    fragments: Vec<(PathBuf, FragmentMetadata)>,
    axis: StackAxis,
}

impl SourceSet {
    /// Starts a set from its first fragment, which every later one must match.
    ///
    /// # Errors
    /// Returns [`Error::Schema`] when stacking frames from a fragment with no
    /// frame dimension.
    pub fn new(path: PathBuf, reference: FragmentMetadata, axis: StackAxis) -> Result<Self> {
        if axis == StackAxis::Frames && reference.frame_dims.is_empty() {
            return Err(Error::Schema {
                path,
                node: String::new(),
                reason: "stacking frames requires at least one frame dimension".to_string(),
            });
        }
        Ok(Self {
            fragments: vec![(path, reference)],
            axis,
        })
    }

    /// Checks one more fragment against the reference and appends it.
    ///
    /// Attributes are compared in the order height, width, element type,
    /// frames, and the first difference is returned without looking further.
    /// A rejected fragment is not added.
    ///
    /// # Errors
    /// Returns [`Error::Mismatch`] naming the first differing attribute.
    pub fn push(&mut self, path: PathBuf, meta: FragmentMetadata) -> Result<()> {
        let reference = self.reference();
        check(Attribute::Height, &reference.height, &meta.height)?;
        check(Attribute::Width, &reference.width, &meta.width)?;
        check(
            Attribute::ElementType,
            &reference.element_type,
            &meta.element_type,
        )?;
        match self.axis {
            StackAxis::Rows => check(Attribute::Frames, &reference.frame_dims, &meta.frame_dims)?,
            StackAxis::Frames => {
                let expected = &reference.frame_dims[1..];
                let actual = meta.frame_dims.get(1..).unwrap_or_default();
                if meta.frame_dims.is_empty() || expected != actual {
                    return Err(mismatch(Attribute::Frames, &expected, &actual));
                }
            }
        }
        self.fragments.push((path, meta));
        Ok(())
    }

    /// Validates `fragments` against the first one, stopping at the first
    /// fragment that differs.
    ///
    /// # Errors
    /// Same conditions as [`SourceSet::new`] and [`SourceSet::push`].
    pub fn validate(fragments: Vec<(PathBuf, FragmentMetadata)>, axis: StackAxis) -> Result<Self> {
        let mut fragments = fragments.into_iter();
        let Some((path, reference)) = fragments.next() else {
            return Err(Error::InsufficientFragments { found: 0 });
        };

        let mut set = Self::new(path, reference, axis)?;
        for (path, meta) in fragments {
            set.push(path, meta)?;
        }
        Ok(set)
    }

    /// Builds a set from one declared metadata record shared by every path.
    ///
    /// # Errors
    /// Same conditions as [`SourceSet::validate`].
    pub fn declared(paths: Vec<PathBuf>, metadata: &FragmentMetadata, axis: StackAxis) -> Result<Self> {
        let fragments = paths
            .into_iter()
            .map(|path| (path, metadata.clone()))
            .collect();
        Self::validate(fragments, axis)
    }

    /// Number of fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns true if the set holds no fragments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Metadata of the first fragment, which every other fragment matches.
    ///
    /// # Panics
    /// Never, since every constructor starts from a reference fragment.
    #[must_use]
    pub fn reference(&self) -> &FragmentMetadata {
        &self.fragments[0].1
    }

    /// Axis the fragments are stacked along.
    #[must_use]
    pub fn axis(&self) -> StackAxis {
        self.axis
    }

    /// Iterates fragments in stacking order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &FragmentMetadata)> {
        self.fragments.iter().map(|(path, meta)| (path.as_path(), meta))
    }
}

fn check<T>(attribute: Attribute, expected: &T, actual: &T) -> Result<()>
where
    T: PartialEq + std::fmt::Debug + ?Sized,
{
    if expected == actual {
        Ok(())
    } else {
        Err(mismatch(attribute, &expected, &actual))
    }
}

fn mismatch<T: std::fmt::Debug + ?Sized>(attribute: Attribute, expected: &T, actual: &T) -> Error {
    Error::Mismatch {
        attribute,
        expected: format!("{expected:?}"),
        actual: format!("{actual:?}"),
    }
}
