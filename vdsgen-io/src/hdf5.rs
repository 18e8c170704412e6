//! HDF5 array store.

use crate::{Error, Result};
use hdf5::types::{FloatSize, IntSize, TypeDescriptor};
use hdf5::{Extents, File, Group, Hyperslab, Selection, SliceOrIndex};
use std::path::Path;
use vdsgen_core::mapping::MappingEntry;
use vdsgen_core::{ArrayStore, ElementType, TargetArtifact, VirtualDataset, WriteMode};

/// Array store backed by HDF5 files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hdf5Store;

impl Hdf5Store {
    /// Creates a new store.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ArrayStore for Hdf5Store {
    type Target = Hdf5Target;

    fn list_dir(&self, dir: &Path) -> vdsgen_core::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn node_exists(&self, path: &Path, node: &str) -> vdsgen_core::Result<bool> {
        let file = File::open(path).map_err(Error::from)?;
        Ok(link_exists(&file, node))
    }

    fn read_shape_and_type(
        &self,
        path: &Path,
        node: &str,
    ) -> vdsgen_core::Result<(Vec<usize>, ElementType)> {
        Ok(read_shape_and_type(path, node)?)
    }

    fn open_target(&mut self, path: &Path, mode: WriteMode) -> vdsgen_core::Result<Hdf5Target> {
        Ok(Hdf5Target::open(path, mode)?)
    }
}

/// Reads the shape and element type of the dataset at `node`.
///
/// The file is closed again before returning.
///
/// # Errors
/// Returns an error if the dataset cannot be opened or has a non-scalar type.
pub fn read_shape_and_type<P: AsRef<Path>>(path: P, node: &str) -> Result<(Vec<usize>, ElementType)> {
    let file = File::open(path)?;
    let dataset = file.dataset(node)?;
    let descriptor = dataset.dtype()?.to_descriptor()?;
    Ok((dataset.shape(), element_type(&descriptor)?))
}

fn element_type(descriptor: &TypeDescriptor) -> Result<ElementType> {
    let ty = match descriptor {
        TypeDescriptor::Integer(IntSize::U1) => ElementType::Int8,
        TypeDescriptor::Integer(IntSize::U2) => ElementType::Int16,
        TypeDescriptor::Integer(IntSize::U4) => ElementType::Int32,
        TypeDescriptor::Integer(IntSize::U8) => ElementType::Int64,
        TypeDescriptor::Unsigned(IntSize::U1) => ElementType::Uint8,
        TypeDescriptor::Unsigned(IntSize::U2) => ElementType::Uint16,
        TypeDescriptor::Unsigned(IntSize::U4) => ElementType::Uint32,
        TypeDescriptor::Unsigned(IntSize::U8) => ElementType::Uint64,
        TypeDescriptor::Float(FloatSize::U4) => ElementType::Float32,
        TypeDescriptor::Float(FloatSize::U8) => ElementType::Float64,
        other => return Err(Error::UnsupportedType(format!("{other:?}"))),
    };
    Ok(ty)
}

// HDF5 errors on a nested lookup whose parent is missing, so walk the path.
fn link_exists(group: &Group, node: &str) -> bool {
    let mut end = 0;
    for segment in node.split('/') {
        end += segment.len();
        if !group.link_exists(&node[..end]) {
            return false;
        }
        end += 1;
    }
    true
}

/// An HDF5 file opened for writing the virtual dataset.
pub struct Hdf5Target {
    file: File,
}

impl Hdf5Target {
    /// Opens `path` with the latest file format, which virtual datasets need.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or opened.
    pub fn open<P: AsRef<Path>>(path: P, mode: WriteMode) -> Result<Self> {
        let mut builder = File::with_options();
        builder.with_fapl(|p| p.libver_latest());
        let file = match mode {
            WriteMode::Create => builder.create(path)?,
            WriteMode::Append => builder.append(path)?,
        };
        Ok(Self { file })
    }

    #[allow(
        clippy::cast_lossless,
        clippy::cast_possible_wrap,
        clippy::unnecessary_cast
    )]
    fn commit(&self, dataset: &VirtualDataset) -> Result<()> {
        macro_rules! create_as {
            ($ty:ty) => {{
                let mut builder = self
                    .file
                    .new_dataset::<$ty>()
                    .shape(dataset.shape.clone())
                    .fill_value(dataset.fill_value as $ty);
                for mapping in &dataset.mappings {
                    builder = builder.virtual_map(
                        &mapping.source_link,
                        &mapping.source_node,
                        mapping.source_shape.clone(),
                        Selection::All,
                        Extents::from(dataset.shape.clone()),
                        target_selection(mapping),
                    );
                }
                builder.create(dataset.node.as_str())?;
            }};
        }

        match dataset.element_type {
            ElementType::Int8 => create_as!(i8),
            ElementType::Int16 => create_as!(i16),
            ElementType::Int32 => create_as!(i32),
            ElementType::Int64 => create_as!(i64),
            ElementType::Uint8 => create_as!(u8),
            ElementType::Uint16 => create_as!(u16),
            ElementType::Uint32 => create_as!(u32),
            ElementType::Uint64 => create_as!(u64),
            ElementType::Float32 => create_as!(f32),
            ElementType::Float64 => create_as!(f64),
        }
        Ok(())
    }
}

fn target_selection(mapping: &MappingEntry) -> Selection {
    let slices: Vec<SliceOrIndex> = mapping
        .target_slice
        .iter()
        .map(|slice| SliceOrIndex::from(slice.start..slice.stop))
        .collect();
    Selection::from(Hyperslab::from(slices))
}

impl TargetArtifact for Hdf5Target {
    fn node_exists(&self, node: &str) -> vdsgen_core::Result<bool> {
        Ok(link_exists(&self.file, node))
    }

    fn create_group(&mut self, node: &str) -> vdsgen_core::Result<()> {
        self.file.create_group(node).map_err(Error::from)?;
        Ok(())
    }

    fn commit_virtual_dataset(self, dataset: &VirtualDataset) -> vdsgen_core::Result<()> {
        self.commit(dataset)?;
        self.file.close().map_err(Error::from)?;
        Ok(())
    }
}
