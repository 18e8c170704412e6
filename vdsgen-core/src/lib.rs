//! vdsgen-core: Layout and mapping engine for stripe virtual datasets.
//!
//! A detector writes one file per stripe. This crate works out where each
//! stripe lands in a single virtual array, leaving deterministic gaps between
//! stripes and modules, and hands the resulting mappings to an [`ArrayStore`]
//! to commit. Pixel data is never read or copied.
//!

pub mod config;
pub mod error;
pub mod fragments;
pub mod generator;
pub mod layout;
pub mod mapping;
pub mod memory;
pub mod metadata;
pub mod mode;
pub mod node;
pub mod store;
pub mod validate;

pub use config::{
    FragmentSelection, GeneratorConfig, GeneratorOptions, SourceSpec, StackAxis,
    DEFAULT_MODULE_SPACING, DEFAULT_SOURCE_NODE, DEFAULT_STRIPE_SPACING, DEFAULT_TARGET_NODE,
    FILL_VALUE,
};
pub use error::{Attribute, Error, Result};
pub use generator::{generate, plan, GenerationPlan};
pub use layout::LayoutPlan;
pub use mapping::{MappingEntry, TargetSlice};
pub use memory::MemoryStore;
pub use metadata::{ElementType, FragmentMetadata};
pub use mode::WriteMode;
pub use node::DataNode;
pub use store::{ArrayStore, TargetArtifact, VirtualDataset};
pub use validate::SourceSet;
