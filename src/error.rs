// src/error.rs

//! Error types for the snapshot engine

use crate::cluster::ClusterError;
use crate::helm::SetParseError;
use thiserror::Error;

/// Result type alias for appsnap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while storing, transforming or resolving hooks for snapshots
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored artifact or captured body could not be (de)serialized
    #[error("failed to parse {context}: {message}")]
    Serialization { context: String, message: String },

    /// A required file is absent from the snapshot tree
    #[error("missing artifact: {0}")]
    MissingArtifact(String),

    /// The snapshot root does not exist
    #[error("snapshot location not found: {0}")]
    LocationNotFound(String),

    /// Nothing to push
    #[error("snapshot has no custom, helm or operator components")]
    EmptySnapshot,

    /// Cluster API failure from a collaborator
    #[error("cluster error: {0}")]
    Cluster(#[from] ClusterError),

    /// A JSON patch could not be decoded or applied
    #[error("patch error: {0}")]
    Patch(String),

    /// Invalid hook configuration (selector, regex)
    #[error("invalid hook configuration: {0}")]
    HookConfig(String),

    /// A matching pod carries no container matching the regex
    #[error("no container in pod {pod} matches regex {regex:?}")]
    NoMatchingContainer { regex: String, pod: String },

    /// A hook resolved to zero targets
    #[error("no matching resources found for hook {hook}, mode {mode}")]
    NoHookTargets { hook: String, mode: String },

    /// Owner reference traversal failed (cycle, depth, fetch)
    #[error("owner chain error: {0}")]
    OwnerChain(String),

    /// Helm release selection, decoding or rendering failure
    #[error("release error: {0}")]
    Release(String),

    /// Malformed `--set` override
    #[error("invalid value override: {0}")]
    SetValue(#[from] SetParseError),

    /// No free release name could be found
    #[error("could not find a unique release name for {name} after {attempts} attempts")]
    ReleaseNameExhausted { name: String, attempts: u32 },

    /// Status could not be persisted even by overwrite
    #[error("failed to update status: {0}")]
    StatusUpdate(String),

    /// At least one component failed to transform
    #[error("transformation failed for: {}", components.join(", "))]
    TransformFailed { components: Vec<String> },

    /// Invalid engine configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a serialization error with the location that failed
    pub fn serialization(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Error::Serialization {
            context: context.into(),
            message: err.to_string(),
        }
    }
}
