// src/filesystem/mod.rs

//! Filesystem helpers shared by the container backends
//!
//! Manifest paths are untrusted input: everything that turns a pack-relative
//! path into a real location goes through [`path::safe_join`].

pub mod path;

pub use path::{relative_to, safe_join, sanitize_path};
