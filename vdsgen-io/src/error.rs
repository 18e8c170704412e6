//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HDF5 library error.
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// Stored element type has no vdsgen equivalent.
    #[error("unsupported element type: {0}")]
    UnsupportedType(String),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] vdsgen_core::Error),
}

impl From<Error> for vdsgen_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Core(inner) => inner,
            Error::Io(inner) => Self::Io(inner),
            Error::UnsupportedType(name) => Self::UnsupportedType(name),
            #[cfg(feature = "hdf5")]
            other @ Error::Hdf5(_) => Self::Store(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_pass_through() {
        let err = Error::from(vdsgen_core::Error::InsufficientFragments { found: 1 });
        let core: vdsgen_core::Error = err.into();
        assert!(matches!(
            core,
            vdsgen_core::Error::InsufficientFragments { found: 1 }
        ));

        let core: vdsgen_core::Error = Error::UnsupportedType("compound".to_string()).into();
        assert!(matches!(core, vdsgen_core::Error::UnsupportedType(_)));
    }
}
