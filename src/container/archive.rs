// src/container/archive.rs

//! Zip archive container backend
//!
//! Zip has no in-place rename. A rename rewrites the whole archive into a
//! temporary file next to the original, raw-copying every entry (compressed
//! bytes, CRCs and metadata are carried over untouched) and copying the
//! renamed entry under its new name. The temporary file then replaces the
//! original with a single filesystem rename.
//!
//! Any failure before that final rename drops the temporary file, so the
//! original archive stays byte-identical.

use crate::error::{Error, Result};
use crate::filesystem::path::sanitize_path;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use zip::result::ZipError;
use zip::{ZipArchive, ZipWriter};

use super::Container;

/// A zipped resource pack
#[derive(Debug, Clone)]
pub struct ZipContainer {
    path: PathBuf,
}

impl ZipContainer {
    /// Open a zip pack, checking that its central directory is readable
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let container = Self {
            path: path.as_ref().to_path_buf(),
        };
        let archive = container.open_archive()?;
        debug!(
            "Opened archive {} ({} entries)",
            container.path.display(),
            archive.len()
        );
        Ok(container)
    }

    /// Path of the archive file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_archive(&self) -> Result<ZipArchive<BufReader<File>>> {
        let file = File::open(&self.path)?;
        Ok(ZipArchive::new(BufReader::new(file))?)
    }

    /// File entry names, excluding directory entries
    fn entry_names(&self) -> Result<Vec<String>> {
        let archive = self.open_archive()?;
        Ok(archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(String::from)
            .collect())
    }
}

impl Container for ZipContainer {
    fn exists(&self, path: &str) -> Result<bool> {
        let path = sanitize_path(path)?;
        Ok(self.entry_names()?.iter().any(|name| *name == path))
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let path = sanitize_path(path)?;
        let mut archive = self.open_archive()?;
        let mut entry = match archive.by_name(&path) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(Error::NotFound(path)),
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    fn rename(&mut self, src: &str, dst: &str) -> Result<()> {
        let src = sanitize_path(src)?;
        let dst = sanitize_path(dst)?;

        let names = self.entry_names()?;
        if !names.iter().any(|name| *name == src) {
            return Err(Error::NotFound(src));
        }
        if names.iter().any(|name| *name == dst) {
            return Err(Error::AlreadyExists(dst));
        }

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut temp = NamedTempFile::new_in(&parent)?;

        {
            let mut archive = self.open_archive()?;
            let mut writer = ZipWriter::new(temp.as_file_mut());
            writer.set_raw_comment(archive.comment().to_vec());

            for index in 0..archive.len() {
                let entry = archive.by_index_raw(index)?;
                if entry.name() == src {
                    writer.raw_copy_file_rename(entry, &dst)?;
                } else {
                    writer.raw_copy_file(entry)?;
                }
            }

            writer.finish()?;
        }

        temp.as_file().sync_all()?;
        let permissions = fs::metadata(&self.path)?.permissions();
        fs::set_permissions(temp.path(), permissions)?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        info!("Renamed {} -> {} in {}", src, dst, self.path.display());
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .entry_names()?
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort();
        Ok(names)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
