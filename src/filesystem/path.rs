// src/filesystem/path.rs

//! Path sanitization for pack-relative paths
//!
//! Every path a manifest declares is relative to the pack root and is used
//! both as a filesystem location (directory packs) and as an entry name
//! (zip packs). This module turns manifest text into one canonical form:
//! forward slashes, no leading slash, no `.` components. Paths that would
//! leave the pack root are rejected.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Sanitize a pack-relative path from a manifest
///
/// This function:
/// 1. Normalizes `\` separators to `/`
/// 2. Strips leading slashes to make the path relative
/// 3. Skips `.` and empty components
/// 4. Rejects `..` components
/// 5. Returns an error for empty paths
///
/// # Examples
///
/// ```
/// use packset::filesystem::path::sanitize_path;
///
/// assert_eq!(sanitize_path("assets/minecraft/a.png").unwrap(), "assets/minecraft/a.png");
/// assert_eq!(sanitize_path("/assets\\minecraft/./a.png").unwrap(), "assets/minecraft/a.png");
/// assert!(sanitize_path("../outside.png").is_err());
/// ```
pub fn sanitize_path(path: &str) -> Result<String> {
    let unified = path.replace('\\', "/");

    let mut parts: Vec<&str> = Vec::new();
    for component in unified.split('/') {
        match component {
            "" | "." => {}
            ".." => return Err(Error::PathTraversal(path.to_string())),
            normal => parts.push(normal),
        }
    }

    if parts.is_empty() {
        return Err(Error::InvalidPath(format!(
            "Empty path after sanitization: {:?}",
            path
        )));
    }

    Ok(parts.join("/"))
}

/// Safely join a pack root with a pack-relative path
///
/// The path is sanitized first, so the result cannot escape the root
/// lexically. When the root exists on disk, the nearest existing directory
/// above the result is also resolved, so a symlinked directory inside the
/// pack cannot lead outside it.
///
/// # Examples
///
/// ```
/// use packset::filesystem::path::safe_join;
/// use std::path::{Path, PathBuf};
///
/// let root = Path::new("/packs/faithful");
/// assert_eq!(
///     safe_join(root, "pack.png").unwrap(),
///     PathBuf::from("/packs/faithful/pack.png")
/// );
/// assert!(safe_join(root, "../other/pack.png").is_err());
/// ```
pub fn safe_join(root: impl AsRef<Path>, path: &str) -> Result<PathBuf> {
    let root = root.as_ref();
    let sanitized = sanitize_path(path)?;

    let mut joined = root.to_path_buf();
    for part in sanitized.split('/') {
        joined.push(part);
    }

    // The final component itself may be a symlink; renames move the link
    if let Ok(canonical_root) = root.canonicalize()
        && let Some(parent) = joined.parent()
        && let Some(canonical_parent) = parent.ancestors().find_map(|p| p.canonicalize().ok())
        && !canonical_parent.starts_with(&canonical_root)
    {
        return Err(Error::PathTraversal(format!(
            "Path {} escapes root {}",
            joined.display(),
            root.display()
        )));
    }

    Ok(joined)
}

/// Convert a path below `root` into its pack-relative form
///
/// Returns `None` when `path` is not under `root` or is not valid UTF-8.
pub fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    let joined = parts?.join("/");
    if joined.is_empty() { None } else { Some(joined) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_normal() {
        assert_eq!(
            sanitize_path("assets/minecraft/textures/a.png").unwrap(),
            "assets/minecraft/textures/a.png"
        );
        assert_eq!(sanitize_path("pack.png").unwrap(), "pack.png");
    }

    #[test]
    fn test_sanitize_path_leading_slash() {
        assert_eq!(sanitize_path("/assets/a.png").unwrap(), "assets/a.png");
        assert_eq!(sanitize_path("///assets/a.png").unwrap(), "assets/a.png");
    }

    #[test]
    fn test_sanitize_path_backslashes() {
        assert_eq!(
            sanitize_path("assets\\minecraft\\a.png").unwrap(),
            "assets/minecraft/a.png"
        );
    }

    #[test]
    fn test_sanitize_path_dot() {
        assert_eq!(sanitize_path("./assets/a.png").unwrap(), "assets/a.png");
        assert_eq!(sanitize_path("assets/./a.png").unwrap(), "assets/a.png");
        assert_eq!(sanitize_path("assets//a.png").unwrap(), "assets/a.png");
    }

    #[test]
    fn test_sanitize_path_traversal_rejected() {
        assert!(matches!(sanitize_path(".."), Err(Error::PathTraversal(_))));
        assert!(sanitize_path("../pack.png").is_err());
        assert!(sanitize_path("assets/../../pack.png").is_err());
        assert!(sanitize_path("assets\\..\\..\\pack.png").is_err());
    }

    #[test]
    fn test_sanitize_path_empty_rejected() {
        assert!(matches!(sanitize_path(""), Err(Error::InvalidPath(_))));
        assert!(sanitize_path("/").is_err());
        assert!(sanitize_path("./").is_err());
    }

    #[test]
    fn test_safe_join_normal() {
        let root = PathBuf::from("/tmp/pack");
        assert_eq!(
            safe_join(&root, "assets/a.png").unwrap(),
            PathBuf::from("/tmp/pack/assets/a.png")
        );
    }

    #[test]
    fn test_safe_join_traversal_rejected() {
        let root = PathBuf::from("/tmp/pack");
        assert!(safe_join(&root, "../etc/passwd").is_err());
        assert!(safe_join(&root, "assets/../../etc/passwd").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_safe_join_rejects_symlinked_escape() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let root = temp_dir.path().join("pack");
        let outside = temp_dir.path().join("outside");
        std::fs::create_dir_all(root.join("assets")).unwrap();
        std::fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("linked")).unwrap();

        assert!(matches!(
            safe_join(&root, "linked/a.png"),
            Err(Error::PathTraversal(_))
        ));
        assert!(matches!(
            safe_join(&root, "linked/deeper/a.png"),
            Err(Error::PathTraversal(_))
        ));
        assert_eq!(
            safe_join(&root, "assets/new/a.png").unwrap(),
            root.join("assets/new/a.png")
        );
    }

    #[test]
    fn test_relative_to() {
        let root = Path::new("/tmp/pack");
        assert_eq!(
            relative_to(root, Path::new("/tmp/pack/assets/a.png")).as_deref(),
            Some("assets/a.png")
        );
        assert_eq!(relative_to(root, Path::new("/tmp/other/a.png")), None);
        assert_eq!(relative_to(root, root), None);
    }
}
