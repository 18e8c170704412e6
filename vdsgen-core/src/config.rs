//! Generator configuration.
//!
//! [`GeneratorOptions`] is what a caller (the CLI) hands over: every field is
//! optional. [`GeneratorConfig::resolve`] applies defaults once and settles
//! the mutually exclusive choices into enums, so nothing downstream has to
//! re-check them.

use crate::metadata::{ElementType, FragmentMetadata};
use crate::node::DataNode;
use crate::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pixel spacing between the two stripes of a module.
pub const DEFAULT_STRIPE_SPACING: usize = 10;
/// Pixel spacing between modules.
pub const DEFAULT_MODULE_SPACING: usize = 10;
/// Data node in source files.
pub const DEFAULT_SOURCE_NODE: &str = "data";
/// Data node in the virtual dataset file.
pub const DEFAULT_TARGET_NODE: &str = "full_frame";
/// Value of unmapped gap regions.
pub const FILL_VALUE: u8 = 0x1;
/// Shape declared for fragments that do not exist yet.
pub const DEFAULT_EMPTY_SHAPE: [usize; 3] = [1, 256, 2048];
/// Element type declared for fragments that do not exist yet.
pub const DEFAULT_EMPTY_DATA_TYPE: ElementType = ElementType::Uint16;

/// Axis fragments are stacked along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StackAxis {
    /// Stack image rows with stripe and module gaps.
    #[default]
    Rows,
    /// Concatenate along the leading frame dimension.
    Frames,
}

impl fmt::Display for StackAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows => f.write_str("rows"),
            Self::Frames => f.write_str("frames"),
        }
    }
}

impl FromStr for StackAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rows" => Ok(Self::Rows),
            "frames" => Ok(Self::Frames),
            other => Err(Error::Config(format!("unknown stacking axis: {other}"))),
        }
    }
}

/// Raw options, as collected from the command line or another caller.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    /// Root folder of source files and the virtual dataset.
    pub root: PathBuf,
    pub prefix: Option<String>,
    pub files: Option<Vec<String>>,
    pub output: Option<String>,
    /// Describe fragments that do not exist yet instead of probing them.
    pub empty: bool,
    pub shape: Option<Vec<usize>>,
    pub data_type: Option<String>,
    pub stripe_spacing: Option<usize>,
    pub module_spacing: Option<usize>,
    pub source_node: Option<String>,
    pub target_node: Option<String>,
    pub stack: Option<StackAxis>,
}

/// How fragments are found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentSelection {
    /// Search the root for `<prefix><digits>.<hdf5|hdf|h5>`.
    ByPrefix(String),
    /// Exactly these file names, in this order.
    Explicit(Vec<String>),
}

/// Where fragment metadata comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Read from each fragment, which must exist.
    Probed,
    /// Declared up front for fragments that may not exist yet.
    Declared(FragmentMetadata),
}

/// Fully resolved generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub root: PathBuf,
    pub selection: FragmentSelection,
    pub output: Option<String>,
    pub source: SourceSpec,
    pub stripe_spacing: usize,
    pub module_spacing: usize,
    pub source_node: String,
    pub target_node: DataNode,
    pub stack: StackAxis,
    pub fill_value: u8,
}

impl GeneratorConfig {
    /// Resolves options into a configuration, applying defaults.
    ///
    /// # Errors
    /// Returns [`Error::Config`] when neither or both of prefix and files are
    /// given, when fewer than two files are listed, when declared metadata is
    /// requested without a file list, or when the declared shape is unusable.
    /// Returns [`Error::InvalidNode`] for a malformed target node and
    /// [`Error::UnsupportedType`] for an unknown data type.
    pub fn resolve(options: GeneratorOptions) -> Result<Self> {
        let selection = match (options.prefix, options.files) {
            (Some(prefix), None) => FragmentSelection::ByPrefix(prefix),
            (None, Some(files)) => {
                if files.len() < 2 {
                    return Err(Error::Config(
                        "must define at least two files to combine".to_string(),
                    ));
                }
                FragmentSelection::Explicit(files)
            }
            _ => {
                return Err(Error::Config(
                    "one, and only one, of prefix or files required".to_string(),
                ))
            }
        };

        let source = if options.empty {
            if !matches!(selection, FragmentSelection::Explicit(_)) {
                return Err(Error::Config(
                    "to make an empty VDS you must explicitly define files for the eventual raw datasets"
                        .to_string(),
                ));
            }
            let shape = options
                .shape
                .unwrap_or_else(|| DEFAULT_EMPTY_SHAPE.to_vec());
            let element_type = match options.data_type {
                Some(name) => name.parse()?,
                None => DEFAULT_EMPTY_DATA_TYPE,
            };
            let metadata = FragmentMetadata::from_shape(&shape, element_type).ok_or_else(|| {
                Error::Config(format!(
                    "shape {shape:?} must have at least height and width, both non-zero"
                ))
            })?;
            SourceSpec::Declared(metadata)
        } else {
            if options.shape.is_some() || options.data_type.is_some() {
                log::warn!("Ignoring declared shape and data type without --empty");
            }
            SourceSpec::Probed
        };

        let target_node =
            DataNode::parse(options.target_node.as_deref().unwrap_or(DEFAULT_TARGET_NODE))?;

        Ok(Self {
            root: options.root,
            selection,
            output: options.output,
            source,
            stripe_spacing: options.stripe_spacing.unwrap_or(DEFAULT_STRIPE_SPACING),
            module_spacing: options.module_spacing.unwrap_or(DEFAULT_MODULE_SPACING),
            source_node: options
                .source_node
                .unwrap_or_else(|| DEFAULT_SOURCE_NODE.to_string()),
            target_node,
            stack: options.stack.unwrap_or_default(),
            fill_value: FILL_VALUE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix_options() -> GeneratorOptions {
        GeneratorOptions {
            root: "/test/path".into(),
            prefix: Some("stripe_".to_string()),
            ..GeneratorOptions::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::resolve(prefix_options()).unwrap();
        assert_eq!(config.selection, FragmentSelection::ByPrefix("stripe_".to_string()));
        assert_eq!(config.source, SourceSpec::Probed);
        assert_eq!(config.stripe_spacing, 10);
        assert_eq!(config.module_spacing, 10);
        assert_eq!(config.source_node, "data");
        assert_eq!(config.target_node.as_str(), "full_frame");
        assert_eq!(config.stack, StackAxis::Rows);
        assert_eq!(config.fill_value, 1);
        assert!(config.output.is_none());
    }

    #[test]
    fn test_given_values_override_defaults() {
        let options = GeneratorOptions {
            output: Some("vds.hdf5".to_string()),
            stripe_spacing: Some(3),
            module_spacing: Some(127),
            source_node: Some("entry/data/data".to_string()),
            target_node: Some("entry/detector/detector1".to_string()),
            stack: Some(StackAxis::Frames),
            ..prefix_options()
        };
        let config = GeneratorConfig::resolve(options).unwrap();
        assert_eq!(config.output.as_deref(), Some("vds.hdf5"));
        assert_eq!(config.stripe_spacing, 3);
        assert_eq!(config.module_spacing, 127);
        assert_eq!(config.source_node, "entry/data/data");
        assert_eq!(config.target_node.as_str(), "entry/detector/detector1");
        assert_eq!(config.stack, StackAxis::Frames);
    }

    #[test]
    fn test_prefix_and_files_conflict() {
        let options = GeneratorOptions {
            files: Some(vec!["a.h5".to_string(), "b.h5".to_string()]),
            ..prefix_options()
        };
        assert!(matches!(GeneratorConfig::resolve(options), Err(Error::Config(_))));

        let options = GeneratorOptions {
            prefix: None,
            ..prefix_options()
        };
        assert!(matches!(GeneratorConfig::resolve(options), Err(Error::Config(_))));
    }

    #[test]
    fn test_single_file_rejected() {
        let options = GeneratorOptions {
            root: "/test/path".into(),
            files: Some(vec!["stripe_1.h5".to_string()]),
            ..GeneratorOptions::default()
        };
        assert!(matches!(GeneratorConfig::resolve(options), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_requires_files() {
        let options = GeneratorOptions {
            empty: true,
            ..prefix_options()
        };
        assert!(matches!(GeneratorConfig::resolve(options), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_declares_metadata() {
        let options = GeneratorOptions {
            root: "/test/path".into(),
            files: Some(vec!["a.h5".to_string(), "b.h5".to_string()]),
            empty: true,
            shape: Some(vec![5, 2, 256, 1024]),
            data_type: Some("uint32".to_string()),
            ..GeneratorOptions::default()
        };
        let config = GeneratorConfig::resolve(options).unwrap();
        assert_eq!(
            config.source,
            SourceSpec::Declared(FragmentMetadata {
                frame_dims: vec![5, 2],
                height: 256,
                width: 1024,
                element_type: ElementType::Uint32,
            })
        );
    }

    #[test]
    fn test_empty_defaults_and_bad_values() {
        let files = Some(vec!["a.h5".to_string(), "b.h5".to_string()]);
        let options = GeneratorOptions {
            files: files.clone(),
            empty: true,
            ..GeneratorOptions::default()
        };
        let config = GeneratorConfig::resolve(options).unwrap();
        let SourceSpec::Declared(meta) = config.source else {
            panic!("expected declared metadata");
        };
        assert_eq!(meta.shape(), DEFAULT_EMPTY_SHAPE.to_vec());
        assert_eq!(meta.element_type, ElementType::Uint16);

        let options = GeneratorOptions {
            files: files.clone(),
            empty: true,
            shape: Some(vec![2048]),
            ..GeneratorOptions::default()
        };
        assert!(matches!(GeneratorConfig::resolve(options), Err(Error::Config(_))));

        let options = GeneratorOptions {
            files: files.clone(),
            empty: true,
            shape: Some(vec![1, 0, 0]),
            ..GeneratorOptions::default()
        };
        assert!(matches!(GeneratorConfig::resolve(options), Err(Error::Config(_))));

        let options = GeneratorOptions {
            files,
            empty: true,
            data_type: Some("bool".to_string()),
            ..GeneratorOptions::default()
        };
        assert!(matches!(
            GeneratorConfig::resolve(options),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_bad_target_node_rejected_up_front() {
        let options = GeneratorOptions {
            target_node: Some("/entry/detector".to_string()),
            ..prefix_options()
        };
        assert!(matches!(
            GeneratorConfig::resolve(options),
            Err(Error::InvalidNode { .. })
        ));
    }

    #[test]
    fn test_stack_axis_parse() {
        assert_eq!("frames".parse::<StackAxis>().unwrap(), StackAxis::Frames);
        assert_eq!(StackAxis::Rows.to_string(), "rows");
        assert!("columns".parse::<StackAxis>().is_err());
    }
}
