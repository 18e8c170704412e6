//! Fragment metadata and the probe that reads it from an array store.

use crate::store::ArrayStore;
use crate::{Error, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalar element type of a fragment dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ElementType {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

impl ElementType {
    /// All supported element types.
    pub const ALL: [Self; 10] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Float32,
        Self::Float64,
    ];

    /// Returns the numpy-style name (`uint16`, `float32`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| Error::UnsupportedType(s.to_string()))
    }
}

/// Shape and element type of one fragment.
///
/// The last two dimensions of the stored shape are the image height and
/// width. Everything before them is frame dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FragmentMetadata {
    pub frame_dims: Vec<usize>,
    pub height: usize,
    pub width: usize,
    pub element_type: ElementType,
}

impl FragmentMetadata {
    /// Splits a full dataset shape into frames, height and width.
    ///
    /// Returns `None` if the shape has fewer than two dimensions or a zero
    /// height or width.
    #[must_use]
    pub fn from_shape(shape: &[usize], element_type: ElementType) -> Option<Self> {
        let (frames, image) = shape.split_at(shape.len().checked_sub(2)?);
        if image.contains(&0) {
            return None;
        }
        Some(Self {
            frame_dims: frames.to_vec(),
            height: image[0],
            width: image[1],
            element_type,
        })
    }

    /// Full dataset shape, `frame_dims ++ [height, width]`.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = self.frame_dims.clone();
        shape.push(self.height);
        shape.push(self.width);
        shape
    }
}

/// Reads the metadata of the dataset at `node` in the fragment at `path`.
///
/// # Errors
/// Returns [`Error::NotFound`] if the fragment does not exist and
/// [`Error::Schema`] if the node is absent or has fewer than two dimensions.
pub fn probe<S>(store: &S, path: &Path, node: &str) -> Result<FragmentMetadata>
where
    S: ArrayStore + ?Sized,
{
    if !store.file_exists(path) {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    if !store.node_exists(path, node)? {
        return Err(Error::Schema {
            path: path.to_path_buf(),
            node: node.to_string(),
            reason: "data node does not exist".to_string(),
        });
    }

    let (shape, element_type) = store.read_shape_and_type(path, node)?;
    let metadata = FragmentMetadata::from_shape(&shape, element_type).ok_or_else(|| {
        Error::Schema {
            path: path.to_path_buf(),
            node: node.to_string(),
            reason: format!(
                "expected at least 2 dimensions with non-zero height and width, got shape {shape:?}"
            ),
        }
    })?;

    log::debug!("Probed {}: {:?}", path.display(), metadata);
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_element_type_names() {
        for ty in ElementType::ALL {
            assert_eq!(ty.name().parse::<ElementType>().unwrap(), ty);
        }
        assert_eq!(ElementType::Uint16.to_string(), "uint16");
        assert!(matches!(
            "complex64".parse::<ElementType>(),
            Err(Error::UnsupportedType(name)) if name == "complex64"
        ));
    }

    #[test]
    fn test_from_shape_splits_frames() {
        let meta = FragmentMetadata::from_shape(&[4, 3, 256, 2048], ElementType::Uint16).unwrap();
        assert_eq!(meta.frame_dims, vec![4, 3]);
        assert_eq!(meta.height, 256);
        assert_eq!(meta.width, 2048);
        assert_eq!(meta.shape(), vec![4, 3, 256, 2048]);

        let image = FragmentMetadata::from_shape(&[256, 2048], ElementType::Uint8).unwrap();
        assert!(image.frame_dims.is_empty());

        assert!(FragmentMetadata::from_shape(&[2048], ElementType::Uint8).is_none());
        assert!(FragmentMetadata::from_shape(&[1, 0, 0], ElementType::Uint8).is_none());
        assert!(FragmentMetadata::from_shape(&[1, 256, 0], ElementType::Uint8).is_none());

        // An empty frame dimension leaves the image usable.
        assert!(FragmentMetadata::from_shape(&[0, 256, 2048], ElementType::Uint8).is_some());
    }

    #[test]
    fn test_probe_reads_metadata() {
        let mut store = MemoryStore::new();
        store.add_dataset("/raw/stripe_1.h5", "data", &[3, 256, 2048], ElementType::Uint16);

        let meta = probe(&store, Path::new("/raw/stripe_1.h5"), "data").unwrap();
        assert_eq!(meta.frame_dims, vec![3]);
        assert_eq!(meta.element_type, ElementType::Uint16);
    }

    #[test]
    fn test_probe_missing_file() {
        let store = MemoryStore::new();
        let err = probe(&store, Path::new("/raw/none.h5"), "data").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_probe_missing_node_or_flat_shape() {
        let mut store = MemoryStore::new();
        store.add_dataset("/raw/a.h5", "data", &[2048], ElementType::Uint16);

        let err = probe(&store, Path::new("/raw/a.h5"), "entry/data").unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));

        let err = probe(&store, Path::new("/raw/a.h5"), "data").unwrap_err();
        assert!(matches!(err, Error::Schema { ref reason, .. } if reason.contains("2 dimensions")));
    }
}
