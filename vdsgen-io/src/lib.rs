//! vdsgen-io: HDF5 array store for vdsgen.
//!
//! Implements [`vdsgen_core::ArrayStore`] over HDF5 files, so fragments are
//! probed and the virtual dataset committed with the HDF5 library's own
//! virtual-dataset support.
//!

mod error;
#[cfg(feature = "hdf5")]
pub mod hdf5;

pub use error::{Error, Result};
#[cfg(feature = "hdf5")]
pub use crate::hdf5::{Hdf5Store, Hdf5Target};
