// src/container/mod.rs

//! Uniform storage interface over resource-pack containers
//!
//! A resource pack ships either as a directory tree or as a zip archive.
//! Everything above this module (schema loading, state resolution, plan
//! execution) talks to a [`Container`] and never touches storage directly.
//!
//! The contract is deliberately small:
//!
//! - `exists` / `read` / `list` probe the pack
//! - `rename` is the only mutation, and it never overwrites: it fails when
//!   the source is missing or the destination is already present
//!
//! Content is never deleted. A file that is switched off keeps its bytes and
//! only gains the [`MARKER_SUFFIX`].

mod archive;
mod dir;

pub use archive::ZipContainer;
pub use dir::DirContainer;

use crate::error::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Suffix appended to a file's full path while it is hidden or inactive
pub const MARKER_SUFFIX: &str = ".packset.old";

/// Return the marked (inactive) form of a pack path
pub fn marked(path: &str) -> String {
    format!("{}{}", path, MARKER_SUFFIX)
}

/// Check whether a pack path carries the marker suffix
pub fn is_marked(path: &str) -> bool {
    path.ends_with(MARKER_SUFFIX)
}

/// Storage operations needed by Packset
///
/// Paths are pack-relative and use `/` separators.
pub trait Container {
    /// Check whether a file exists at `path`
    fn exists(&self, path: &str) -> Result<bool>;

    /// Read the full contents of the file at `path`
    fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Rename `src` to `dst`
    ///
    /// Fails with [`Error::NotFound`] when `src` is absent and with
    /// [`Error::AlreadyExists`] when `dst` is present. Either the rename
    /// happens in full or the container is left untouched.
    fn rename(&mut self, src: &str, dst: &str) -> Result<()>;

    /// List every file whose path starts with `prefix`, sorted
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Human-readable location, used in log lines
    fn describe(&self) -> String;
}

/// A container backend chosen from what is on disk
#[derive(Debug)]
pub enum PackContainer {
    /// Unpacked pack directory
    Directory(DirContainer),
    /// Zipped pack
    Archive(ZipContainer),
}

impl PackContainer {
    /// Open a pack, picking the backend from the path
    ///
    /// Directories use [`DirContainer`]; files with a `.zip` extension use
    /// [`ZipContainer`]. Anything else is rejected.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.is_dir() {
            debug!("Opening directory pack: {}", path.display());
            return Ok(Self::Directory(DirContainer::open(path)?));
        }

        let is_zip = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"));

        if path.is_file() && is_zip {
            debug!("Opening archive pack: {}", path.display());
            return Ok(Self::Archive(ZipContainer::open(path)?));
        }

        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }

        Err(Error::UnsupportedContainer(path.display().to_string()))
    }

    /// Whether this pack is an archive
    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Archive(_))
    }

    fn inner(&self) -> &dyn Container {
        match self {
            Self::Directory(dir) => dir,
            Self::Archive(zip) => zip,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Container {
        match self {
            Self::Directory(dir) => dir,
            Self::Archive(zip) => zip,
        }
    }
}

impl Container for PackContainer {
    fn exists(&self, path: &str) -> Result<bool> {
        self.inner().exists(path)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.inner().read(path)
    }

    fn rename(&mut self, src: &str, dst: &str) -> Result<()> {
        self.inner_mut().rename(src, dst)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner().list(prefix)
    }

    fn describe(&self) -> String {
        self.inner().describe()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_marker_helpers() {
        assert_eq!(marked("a.png"), "a.png.packset.old");
        assert!(is_marked("a.png.packset.old"));
        assert!(!is_marked("a.png"));
    }

    #[test]
    fn test_open_directory() {
        let temp_dir = TempDir::new().unwrap();
        let container = PackContainer::open(temp_dir.path()).unwrap();
        assert!(!container.is_archive());
    }

    #[test]
    fn test_open_archive_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("Pack.ZIP");
        let file = std::fs::File::create(&zip_path).unwrap();
        zip::ZipWriter::new(file).finish().unwrap();

        let container = PackContainer::open(&zip_path).unwrap();
        assert!(container.is_archive());
    }

    #[test]
    fn test_open_rejects_other_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pack.rar");
        std::fs::write(&path, b"not a pack").unwrap();

        assert!(matches!(
            PackContainer::open(&path),
            Err(Error::UnsupportedContainer(_))
        ));
        assert!(matches!(
            PackContainer::open(temp_dir.path().join("missing")),
            Err(Error::NotFound(_))
        ));
    }
}
