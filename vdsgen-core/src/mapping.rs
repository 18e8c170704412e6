//! Fragment to target-region mappings.

use crate::layout::LayoutPlan;
use crate::metadata::ElementType;
use crate::validate::SourceSet;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Half-open range `[start, stop)` along one target dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TargetSlice {
    pub start: usize,
    pub stop: usize,
}

impl TargetSlice {
    /// Slice covering a whole dimension of length `extent`.
    #[must_use]
    pub const fn full(extent: usize) -> Self {
        Self {
            start: 0,
            stop: extent,
        }
    }

    /// Number of elements covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.stop - self.start
    }

    /// Returns true if the slice covers nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.stop <= self.start
    }
}

/// Links a whole fragment dataset to one region of the virtual dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MappingEntry {
    /// Fragment path as resolved on disk.
    pub source_path: PathBuf,
    /// Fragment path as recorded in the virtual dataset, relative to the
    /// output artifact's directory where possible.
    pub source_link: String,
    /// Data node inside the fragment.
    pub source_node: String,
    /// Full shape of the fragment dataset.
    pub source_shape: Vec<usize>,
    /// One slice per target dimension.
    pub target_slice: Vec<TargetSlice>,
    pub element_type: ElementType,
}

impl MappingEntry {
    /// Slice along the stacked dimension.
    #[must_use]
    pub fn stacked(&self, plan: &LayoutPlan) -> TargetSlice {
        self.target_slice[plan.stacked_axis]
    }
}

/// Walks the fragments in order and assigns each one its target region.
///
/// A mapping covers only the fragment's own extent. The gap after it is
/// skipped when positioning the next fragment and stays unmapped, so it
/// reads back as the fill value.
#[must_use]
pub fn build(
    sources: &SourceSet,
    plan: &LayoutPlan,
    source_node: &str,
    output_file: &Path,
) -> Vec<MappingEntry> {
    let output_dir = output_file.parent().unwrap_or_else(|| Path::new(""));
    let axis = plan.stacked_axis;

    let mut mappings = Vec::with_capacity(sources.len());
    let mut position = 0;
    for ((path, meta), gap) in sources.iter().zip(&plan.spacing) {
        let source_shape = meta.shape();
        let extent = source_shape[axis];

        // Never exceeds the stacked extent, which the planner checked.
        let start = position;
        position = start + extent + gap;

        let target_slice = plan
            .target_shape
            .iter()
            .enumerate()
            .map(|(dim, &len)| {
                if dim == axis {
                    TargetSlice {
                        start,
                        stop: start + extent,
                    }
                } else {
                    TargetSlice::full(len)
                }
            })
            .collect();

        let entry = MappingEntry {
            source_path: path.to_path_buf(),
            source_link: source_link(path, output_dir),
            source_node: source_node.to_string(),
            source_shape,
            target_slice,
            element_type: meta.element_type,
        };
        log::debug!(
            "Mapping {} to {:?} of {}",
            entry.source_link,
            entry.target_slice,
            output_file.display()
        );
        mappings.push(entry);
    }

    mappings
}

fn source_link(path: &Path, output_dir: &Path) -> String {
    let relative = if path.is_absolute() == output_dir.is_absolute() {
        pathdiff::diff_paths(path, output_dir)
    } else {
        None
    };
    relative
        .filter(|rel| !rel.as_os_str().is_empty())
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}
