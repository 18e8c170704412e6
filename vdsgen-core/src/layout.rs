//! Stripe and module spacing.
//!
//! Detector modules are pairs of stripes. Consecutive stripes inside a module
//! are separated by the stripe spacing, consecutive modules by the module
//! spacing, and the last stripe never has a gap after it.

use crate::config::StackAxis;
use crate::validate::SourceSet;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shape of the virtual dataset and the gap that follows each fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutPlan {
    /// Full shape of the virtual dataset.
    pub target_shape: Vec<usize>,
    /// Gap appended after each fragment, one entry per fragment.
    pub spacing: Vec<usize>,
    /// Index of the dimension fragments are stacked along.
    pub stacked_axis: usize,
}

impl LayoutPlan {
    /// Plans a row-stacked layout.
    ///
    /// Even slots take `stripe_spacing` and odd slots `module_spacing`, then
    /// the final slot is cleared whichever rule set it.
    ///
    /// # Errors
    /// Returns [`Error::Layout`] if the stacked height overflows `usize`.
    pub fn rows(
        fragment_count: usize,
        height: usize,
        width: usize,
        frame_dims: &[usize],
        stripe_spacing: usize,
        module_spacing: usize,
    ) -> Result<Self> {
        let mut spacing = vec![0; fragment_count];
        for gap in spacing.iter_mut().step_by(2) {
            *gap = stripe_spacing;
        }
        for gap in spacing.iter_mut().skip(1).step_by(2) {
            *gap = module_spacing;
        }
        if let Some(last) = spacing.last_mut() {
            *last = 0;
        }

        let total_height = fragment_count
            .checked_mul(height)
            .and_then(|rows| spacing.iter().try_fold(rows, |acc, &gap| acc.checked_add(gap)))
            .ok_or_else(|| {
                Error::Layout(format!(
                    "{fragment_count} stripes of height {height} with spacing \
                     {stripe_spacing}/{module_spacing}"
                ))
            })?;
        let mut target_shape = frame_dims.to_vec();
        target_shape.push(total_height);
        target_shape.push(width);

        Ok(Self {
            target_shape,
            spacing,
            stacked_axis: frame_dims.len(),
        })
    }

    /// Plans a frame-stacked layout from the leading frame count of each fragment.
    ///
    /// `frame_counts` must be non-empty per fragment; `tail` is the shape
    /// shared by every fragment after the leading dimension.
    ///
    /// # Errors
    /// Returns [`Error::Layout`] if the total frame count overflows `usize`.
    pub fn frames(frame_counts: &[usize], tail: &[usize]) -> Result<Self> {
        let total = frame_counts
            .iter()
            .try_fold(0usize, |acc, &n| acc.checked_add(n))
            .ok_or_else(|| Error::Layout(format!("frame counts {frame_counts:?}")))?;
        let mut target_shape = Vec::with_capacity(tail.len() + 1);
        target_shape.push(total);
        target_shape.extend_from_slice(tail);

        Ok(Self {
            target_shape,
            spacing: vec![0; frame_counts.len()],
            stacked_axis: 0,
        })
    }

    /// Plans the layout for a validated source set.
    ///
    /// # Errors
    /// Returns [`Error::Layout`] if the stacked extent overflows `usize`.
    pub fn for_sources(sources: &SourceSet, stripe_spacing: usize, module_spacing: usize) -> Result<Self> {
        let reference = sources.reference();
        let plan = match sources.axis() {
            StackAxis::Rows => Self::rows(
                sources.len(),
                reference.height,
                reference.width,
                &reference.frame_dims,
                stripe_spacing,
                module_spacing,
            )?,
            StackAxis::Frames => {
                let counts: Vec<usize> = sources.iter().map(|(_, meta)| meta.frame_dims[0]).collect();
                let tail = &reference.shape()[1..];
                Self::frames(&counts, tail)?
            }
        };
        log::debug!("VDS metadata constructed: {plan:?}");
        Ok(plan)
    }

    /// Extent of the stacked dimension.
    #[must_use]
    pub fn stacked_extent(&self) -> usize {
        self.target_shape[self.stacked_axis]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_spacing_pattern() {
        let plan = LayoutPlan::rows(6, 256, 2048, &[3], 10, 100).unwrap();
        assert_eq!(plan.spacing, vec![10, 100, 10, 100, 10, 0]);
        assert_eq!(plan.target_shape, vec![3, 1766, 2048]);
        assert_eq!(plan.stacked_axis, 1);
    }

    #[test]
    fn test_equal_spacing() {
        let plan = LayoutPlan::rows(6, 256, 2048, &[3], 10, 10).unwrap();
        assert_eq!(plan.spacing, vec![10, 10, 10, 10, 10, 0]);
        assert_eq!(plan.stacked_extent(), 1586);
    }

    #[test]
    fn test_last_gap_always_cleared() {
        for n in 2..12 {
            for (stripe, module) in [(0, 0), (3, 127), (10, 10), (50, 1)] {
                let plan = LayoutPlan::rows(n, 64, 128, &[2, 5], stripe, module).unwrap();
                assert_eq!(plan.spacing.len(), n);
                assert_eq!(plan.spacing[n - 1], 0);
                assert_eq!(
                    plan.stacked_extent(),
                    n * 64 + plan.spacing.iter().sum::<usize>()
                );
                assert_eq!(plan.target_shape, vec![2, 5, plan.stacked_extent(), 128]);
            }
        }
    }

    #[test]
    fn test_odd_count_ends_on_stripe_slot() {
        let plan = LayoutPlan::rows(3, 10, 20, &[], 1, 7).unwrap();
        assert_eq!(plan.spacing, vec![1, 7, 0]);
        assert_eq!(plan.target_shape, vec![38, 20]);
        assert_eq!(plan.stacked_axis, 0);
    }

    #[test]
    fn test_single_fragment_has_no_gap() {
        let plan = LayoutPlan::rows(1, 256, 2048, &[1], 10, 10).unwrap();
        assert_eq!(plan.spacing, vec![0]);
        assert_eq!(plan.target_shape, vec![1, 256, 2048]);
    }

    #[test]
    fn test_overflowing_height_rejected() {
        let err = LayoutPlan::rows(3, 256, 2048, &[1], usize::MAX, 1).unwrap_err();
        assert!(matches!(err, Error::Layout(_)));

        let err = LayoutPlan::rows(4, usize::MAX / 2, 2048, &[], 0, 0).unwrap_err();
        assert!(matches!(err, Error::Layout(_)));

        let err = LayoutPlan::frames(&[usize::MAX, 1], &[256, 2048]).unwrap_err();
        assert!(matches!(err, Error::Layout(_)));
    }

    #[test]
    fn test_frame_stacking_sums_leading_dim() {
        let plan = LayoutPlan::frames(&[3, 5, 2], &[4, 256, 2048]).unwrap();
        assert_eq!(plan.target_shape, vec![10, 4, 256, 2048]);
        assert_eq!(plan.spacing, vec![0, 0, 0]);
        assert_eq!(plan.stacked_extent(), 10);
    }
}
