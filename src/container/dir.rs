// src/container/dir.rs

//! Directory-tree container backend

use crate::error::{Error, Result};
use crate::filesystem::path::{relative_to, safe_join};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::Container;

/// An unpacked resource pack rooted at a directory
#[derive(Debug, Clone)]
pub struct DirContainer {
    root: PathBuf,
}

impl DirContainer {
    /// Open a pack directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::NotFound(root.display().to_string()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Pack root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target(&self, path: &str) -> Result<PathBuf> {
        safe_join(&self.root, path)
    }
}

/// Metadata of `path` without following a final symlink, `None` when absent
fn lookup(path: &Path) -> Result<Option<fs::Metadata>> {
    match path.symlink_metadata() {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Container for DirContainer {
    fn exists(&self, path: &str) -> Result<bool> {
        let target = self.target(path)?;
        Ok(lookup(&target)?.is_some_and(|m| !m.is_dir()))
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let target = self.target(path)?;
        match fs::read(&target) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn rename(&mut self, src: &str, dst: &str) -> Result<()> {
        let src_path = self.target(src)?;
        let dst_path = self.target(dst)?;

        if lookup(&src_path)?.is_none() {
            return Err(Error::NotFound(src.to_string()));
        }
        if lookup(&dst_path)?.is_some() {
            return Err(Error::AlreadyExists(dst.to_string()));
        }

        if let Some(parent) = dst_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
            debug!("Created parent directory: {}", parent.display());
        }

        fs::rename(&src_path, &dst_path)?;
        info!("Renamed {} -> {} in {}", src, dst, self.root.display());
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "Failed to walk {}: {}",
                    self.root.display(),
                    e
                )))
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            if let Some(rel) = relative_to(&self.root, entry.path())
                && rel.starts_with(prefix)
            {
                files.push(rel);
            }
        }

        files.sort();
        Ok(files)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_pack() -> (TempDir, DirContainer) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("assets/minecraft")).unwrap();
        fs::write(root.join("pack.mcmeta"), "{}").unwrap();
        fs::write(root.join("assets/minecraft/a.png"), "a").unwrap();
        fs::write(root.join("assets/minecraft/b.png"), "b").unwrap();
        let container = DirContainer::open(root).unwrap();
        (temp_dir, container)
    }

    #[test]
    fn test_exists_and_read() {
        let (_temp_dir, container) = setup_pack();
        assert!(container.exists("assets/minecraft/a.png").unwrap());
        assert!(!container.exists("assets/minecraft/c.png").unwrap());
        // Directories are not files
        assert!(!container.exists("assets/minecraft").unwrap());
        assert_eq!(container.read("assets/minecraft/b.png").unwrap(), b"b");
        assert!(matches!(
            container.read("missing.png"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_rename_moves_file() {
        let (temp_dir, mut container) = setup_pack();
        container
            .rename("assets/minecraft/a.png", "assets/minecraft/a.png.packset.old")
            .unwrap();

        assert!(!temp_dir.path().join("assets/minecraft/a.png").exists());
        assert_eq!(
            fs::read(temp_dir.path().join("assets/minecraft/a.png.packset.old")).unwrap(),
            b"a"
        );
    }

    #[test]
    fn test_rename_never_overwrites() {
        let (temp_dir, mut container) = setup_pack();
        let result = container.rename("assets/minecraft/a.png", "assets/minecraft/b.png");

        assert!(matches!(result, Err(Error::AlreadyExists(p)) if p == "assets/minecraft/b.png"));
        assert_eq!(fs::read(temp_dir.path().join("assets/minecraft/a.png")).unwrap(), b"a");
        assert_eq!(fs::read(temp_dir.path().join("assets/minecraft/b.png")).unwrap(), b"b");
    }

    #[test]
    fn test_rename_missing_source() {
        let (_temp_dir, mut container) = setup_pack();
        let result = container.rename("assets/minecraft/c.png", "assets/minecraft/d.png");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_rename_creates_parent() {
        let (temp_dir, mut container) = setup_pack();
        container
            .rename("assets/minecraft/a.png", "assets/other/a.png")
            .unwrap();
        assert!(temp_dir.path().join("assets/other/a.png").exists());
    }

    #[test]
    fn test_rename_rejects_traversal() {
        let (_temp_dir, mut container) = setup_pack();
        let result = container.rename("assets/minecraft/a.png", "../escaped.png");
        assert!(matches!(result, Err(Error::PathTraversal(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_lookup_errors_are_not_absence() {
        let (temp_dir, mut container) = setup_pack();
        let looped = temp_dir.path().join("loop");
        std::os::unix::fs::symlink(&looped, &looped).unwrap();

        assert!(matches!(container.exists("loop/a.png"), Err(Error::Io(_))));
        assert!(matches!(
            container.rename("loop/a.png", "assets/minecraft/c.png"),
            Err(Error::Io(_))
        ));
        assert!(matches!(
            container.rename("assets/minecraft/a.png", "loop/a.png"),
            Err(Error::Io(_))
        ));
        assert!(temp_dir.path().join("assets/minecraft/a.png").exists());

        // A file standing in for a directory is plain absence
        assert!(!container.exists("pack.mcmeta/a.png").unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_rename_through_symlinked_dir_rejected() {
        let (temp_dir, mut container) = setup_pack();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("linked")).unwrap();

        let result = container.rename("assets/minecraft/a.png", "linked/a.png");
        assert!(matches!(result, Err(Error::PathTraversal(_))));
        assert!(temp_dir.path().join("assets/minecraft/a.png").exists());
        assert!(!outside.path().join("a.png").exists());
    }

    #[test]
    fn test_list_prefix() {
        let (_temp_dir, container) = setup_pack();
        assert_eq!(
            container.list("assets/").unwrap(),
            vec!["assets/minecraft/a.png", "assets/minecraft/b.png"]
        );
        assert_eq!(container.list("").unwrap().len(), 3);
        assert!(container.list("missing/").unwrap().is_empty());
    }
}
