// src/store/mod.rs

//! Snapshot store
//!
//! Maps the in-memory snapshot model to and from a path-addressed tree
//! (see [`layout`] for the file names). Storage is reached only through the
//! [`PathStore`] contract; [`LocalStore`] implements it on a local
//! filesystem.
//!
//! Writes are not transactional: the first failing write aborts a push and
//! whatever was already written stays in place.

pub mod layout;
mod names;
mod pull;
mod push;

pub use names::{excluded_resource, merge_comp_meta_lists, merge_resource_list, resource_names};
pub use pull::{pull, pull_custom, pull_helm, pull_operator};
pub use push::{push, push_custom, push_helm, push_operator};

use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Path-addressed read/write contract
pub trait PathStore {
    fn exists(&self, path: &Path) -> bool;

    /// Names of the immediate child directories, sorted
    fn list_child_dirs(&self, path: &Path) -> Result<Vec<String>>;

    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    fn write_file(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// Create a directory and its parents; no-op if present
    fn mkdir(&self, path: &Path) -> Result<()>;
}

/// [`PathStore`] over the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl LocalStore {
    pub fn new() -> Self {
        LocalStore
    }
}

impl PathStore for LocalStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_child_dirs(&self, path: &Path) -> Result<Vec<String>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to temp, then rename
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        debug!("Wrote {:?} ({} bytes)", path, content.len());
        Ok(())
    }

    fn mkdir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
            debug!("Created directory {:?}", path);
        }
        Ok(())
    }
}

/// Serialize `value` as pretty JSON into `path`
pub(crate) fn write_json<S, T>(store: &S, path: &Path, value: &T) -> Result<()>
where
    S: PathStore + ?Sized,
    T: Serialize + ?Sized,
{
    let content = serde_json::to_vec_pretty(value)
        .map_err(|e| Error::serialization(path.display().to_string(), e))?;
    store.write_file(path, &content)
}

/// Read and deserialize a JSON file, keeping the path in the error
pub(crate) fn read_json<S, T>(store: &S, path: &Path) -> Result<T>
where
    S: PathStore + ?Sized,
    T: DeserializeOwned,
{
    let content = store.read_file(path)?;
    serde_json::from_slice(&content).map_err(|e| Error::serialization(path.display().to_string(), e))
}
