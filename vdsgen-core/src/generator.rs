//! End-to-end generation.
//!
//! 1. Resolve the fragment list (prefix search or explicit names)
//! 2. Derive the output name unless one was given
//! 3. Build the source set (probe every fragment, or use declared metadata)
//! 4. Plan the layout
//! 5. Build the mappings
//! 6. Choose create or append, refusing an occupied target node
//! 7. Create missing parent groups in the opened artifact
//! 8. Commit every mapping in one call
//!
//! Steps 1 to 5 never write. The commit is the only durable change, so a
//! failure anywhere before it leaves the output untouched.

use crate::config::{GeneratorConfig, SourceSpec};
use crate::layout::LayoutPlan;
use crate::mapping::{self, MappingEntry};
use crate::metadata::{self, ElementType};
use crate::mode::WriteMode;
use crate::store::{ArrayStore, TargetArtifact, VirtualDataset};
use crate::validate::SourceSet;
use crate::{fragments, Error, Result};
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Everything needed to commit a virtual dataset, computed without writing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GenerationPlan {
    pub output_file: PathBuf,
    pub target_node: String,
    pub element_type: ElementType,
    pub layout: LayoutPlan,
    pub mappings: Vec<MappingEntry>,
}

/// Runs steps 1 to 5 and returns the plan.
///
/// # Errors
/// Returns discovery, probing and validation errors; see [`Error`].
pub fn plan<S>(store: &S, config: &GeneratorConfig) -> Result<GenerationPlan>
where
    S: ArrayStore + ?Sized,
{
    let (paths, prefix) = fragments::resolve(store, &config.root, &config.selection)?;
    let Some(first) = paths.first() else {
        return Err(Error::InsufficientFragments { found: 0 });
    };

    let name = match &config.output {
        Some(name) => name.clone(),
        None => fragments::output_name(&prefix, first),
    };
    let output_file = absolute(&config.root.join(&name))?;

    let file_names: Vec<String> = paths
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    log::debug!("Combining datasets {} into {name}", file_names.join(", "));

    let sources = source_set(store, paths, config)?;
    let layout = LayoutPlan::for_sources(&sources, config.stripe_spacing, config.module_spacing)?;
    let mappings = mapping::build(&sources, &layout, &config.source_node, &output_file);

    Ok(GenerationPlan {
        output_file,
        target_node: config.target_node.to_string(),
        element_type: sources.reference().element_type,
        layout,
        mappings,
    })
}

/// Plans and commits the virtual dataset.
///
/// Returns the committed plan and the write mode that was used.
///
/// # Errors
/// Returns any planning error, [`Error::NodeConflict`] if the target node is
/// taken, or a store error from the commit.
pub fn generate<S>(store: &mut S, config: &GeneratorConfig) -> Result<(GenerationPlan, WriteMode)>
where
    S: ArrayStore + ?Sized,
{
    let plan = plan(store, config)?;
    let mode = WriteMode::select(store, &plan.output_file, &config.target_node)?;

    log::info!("Creating VDS at {}", plan.output_file.display());
    let dataset = VirtualDataset {
        node: config.target_node.clone(),
        shape: plan.layout.target_shape.clone(),
        element_type: plan.element_type,
        mappings: plan.mappings.clone(),
        fill_value: config.fill_value,
    };

    let mut target = store.open_target(&plan.output_file, mode)?;
    config.target_node.ensure_parents(&mut target)?;
    target.commit_virtual_dataset(&dataset)?;

    Ok((plan, mode))
}

fn source_set<S>(store: &S, paths: Vec<PathBuf>, config: &GeneratorConfig) -> Result<SourceSet>
where
    S: ArrayStore + ?Sized,
{
    let sources = match &config.source {
        SourceSpec::Declared(meta) => SourceSet::declared(paths, meta, config.stack)?,
        SourceSpec::Probed => {
            if let Some(missing) = paths.iter().find(|path| !store.file_exists(path)) {
                return Err(Error::MissingFragment(missing.clone()));
            }
            // Each fragment is checked as soon as it is probed, so a mismatch
            // is reported before any later fragment is opened.
            let mut paths = paths.into_iter();
            let Some(first) = paths.next() else {
                return Err(Error::InsufficientFragments { found: 0 });
            };
            let reference = metadata::probe(store, &first, &config.source_node)?;
            let mut sources = SourceSet::new(first, reference, config.stack)?;
            for path in paths {
                let meta = metadata::probe(store, &path, &config.source_node)?;
                sources.push(path, meta)?;
            }
            sources
        }
    };
    log::debug!("Source metadata retrieved: {:?}", sources.reference());
    Ok(sources)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
