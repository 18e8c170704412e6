//! Fragment discovery and output naming.

use crate::config::FragmentSelection;
use crate::store::ArrayStore;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// File extensions accepted by prefix discovery.
pub const EXTENSIONS: [&str; 3] = ["hdf5", "hdf", "h5"];

/// Returns true if `name` is `<prefix><digits>.<ext>`.
#[must_use]
pub fn matches_prefix(name: &str, prefix: &str) -> bool {
    let Some(rest) = name.strip_prefix(prefix) else {
        return false;
    };
    let Some((index, ext)) = rest.split_once('.') else {
        return false;
    };
    !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) && EXTENSIONS.contains(&ext)
}

/// Finds fragments in `root` named `<prefix><digits>.<ext>`, sorted by name.
///
/// # Errors
/// Returns [`Error::NoFragments`] if nothing matches and
/// [`Error::InsufficientFragments`] if only one file matches.
pub fn discover<S>(store: &S, root: &Path, prefix: &str) -> Result<Vec<PathBuf>>
where
    S: ArrayStore + ?Sized,
{
    let mut names: Vec<String> = store
        .list_dir(root)?
        .into_iter()
        .filter(|name| matches_prefix(name, prefix))
        .collect();
    names.sort();

    match names.len() {
        0 => Err(Error::NoFragments {
            dir: root.to_path_buf(),
            prefix: prefix.to_string(),
        }),
        1 => Err(Error::InsufficientFragments { found: 1 }),
        _ => {
            log::debug!("Found datasets {}", names.join(", "));
            Ok(names.iter().map(|name| root.join(name)).collect())
        }
    }
}

/// Resolves a fragment selection into file paths under `root`.
///
/// Returns the paths together with the prefix used for naming the output.
/// An explicit list keeps its order and is not re-checked for length here.
///
/// # Errors
/// Propagates discovery errors.
pub fn resolve<S>(store: &S, root: &Path, selection: &FragmentSelection) -> Result<(Vec<PathBuf>, String)>
where
    S: ArrayStore + ?Sized,
{
    match selection {
        FragmentSelection::ByPrefix(prefix) => Ok((discover(store, root, prefix)?, prefix.clone())),
        FragmentSelection::Explicit(files) => {
            let names: Vec<&str> = files.iter().map(String::as_str).collect();
            let paths = files.iter().map(|name| root.join(name)).collect();
            Ok((paths, common_prefix(&names).to_string()))
        }
    }
}

/// Longest common leading substring of `names`, on character boundaries.
#[must_use]
pub fn common_prefix<'a>(names: &[&'a str]) -> &'a str {
    let Some((first, rest)) = names.split_first() else {
        return "";
    };
    let mut end = first.len();
    for name in rest {
        end = first
            .char_indices()
            .zip(name.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((idx, c), _)| idx + c.len_utf8())
            .min(end);
    }
    &first[..end]
}

/// Default output name, `<prefix>vds<ext of first fragment>`.
#[must_use]
pub fn output_name(prefix: &str, first: &Path) -> String {
    let ext = first
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let name = format!("{prefix}vds{ext}");
    log::debug!("Generated VDS name: {name}");
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_matches_prefix() {
        assert!(matches_prefix("stripe_1.h5", "stripe_"));
        assert!(matches_prefix("stripe_12.hdf5", "stripe_"));
        assert!(matches_prefix("stripe_3.hdf", "stripe_"));
        assert!(!matches_prefix("stripe_.h5", "stripe_"));
        assert!(!matches_prefix("stripe_a.h5", "stripe_"));
        assert!(!matches_prefix("stripe_1.txt", "stripe_"));
        assert!(!matches_prefix("stripe_vds.h5", "stripe_"));
        assert!(!matches_prefix("other_1.h5", "stripe_"));
    }

    fn store_with(names: &[&str]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for name in names {
            store.add_file(Path::new("/test/path").join(name));
        }
        store
    }

    #[test]
    fn test_discover_sorted() {
        let store = store_with(&["stripe_3.h5", "stripe_1.h5", "stripe_2.h5", "notes.txt"]);
        let files = discover(&store, Path::new("/test/path"), "stripe_").unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/test/path/stripe_1.h5"),
                PathBuf::from("/test/path/stripe_2.h5"),
                PathBuf::from("/test/path/stripe_3.h5"),
            ]
        );
    }

    #[test]
    fn test_discover_one_file() {
        let store = store_with(&["stripe_1.h5", "stripe_vds.h5"]);
        let err = discover(&store, Path::new("/test/path"), "stripe_").unwrap_err();
        assert!(matches!(err, Error::InsufficientFragments { found: 1 }));
    }

    #[test]
    fn test_discover_no_files() {
        let store = store_with(&["image_1.h5"]);
        let err = discover(&store, Path::new("/test/path"), "stripe_").unwrap_err();
        assert!(matches!(err, Error::NoFragments { ref prefix, .. } if prefix == "stripe_"));
    }

    #[test]
    fn test_explicit_keeps_order() {
        let store = MemoryStore::new();
        let selection = FragmentSelection::Explicit(vec![
            "stripe_2.h5".to_string(),
            "stripe_1.h5".to_string(),
        ]);
        let (paths, prefix) = resolve(&store, Path::new("/test/path"), &selection).unwrap();
        assert_eq!(paths[0], PathBuf::from("/test/path/stripe_2.h5"));
        assert_eq!(prefix, "stripe_");
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix(&["stripe_1.h5", "stripe_2.h5"]), "stripe_");
        assert_eq!(common_prefix(&["a.h5", "b.h5"]), "");
        assert_eq!(common_prefix(&["same.h5", "same.h5"]), "same.h5");
        assert_eq!(common_prefix(&["ab", "abc", "abd"]), "ab");
        assert_eq!(common_prefix(&[]), "");
    }

    #[test]
    fn test_output_name() {
        assert_eq!(output_name("stripe_", Path::new("/p/stripe_1.h5")), "stripe_vds.h5");
        assert_eq!(output_name("", Path::new("a.hdf5")), "vds.hdf5");
    }
}
