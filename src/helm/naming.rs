// src/helm/naming.rs

//! Collision-free release names for restored Helm releases

use super::ReleaseStorage;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::model::HelmStorageBackend;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Candidate name for `attempt`: `old` with its trailing characters replaced
/// by a hash suffix derived from the old name, namespace and attempt.
pub fn candidate_release_name(old: &str, namespace: &str, attempt: u32, suffix_len: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(old.as_bytes());
    hasher.update(b"|");
    hasher.update(namespace.as_bytes());
    hasher.update(b"|");
    hasher.update(attempt.to_le_bytes());
    let digest = hex::encode(hasher.finalize());

    let chars: Vec<char> = old.chars().collect();
    if chars.len() < suffix_len {
        return digest[..chars.len().max(1)].to_string();
    }
    let prefix: String = chars[..chars.len() - suffix_len].iter().collect();
    format!("{}{}", prefix, &digest[..suffix_len])
}

/// Find a release name not yet used in `namespace`
pub fn unique_release_name<R: ReleaseStorage + ?Sized>(
    storage: &R,
    old: &str,
    namespace: &str,
    backend: HelmStorageBackend,
    config: &EngineConfig,
) -> Result<String> {
    for attempt in 0..config.release_name_attempts {
        let candidate = candidate_release_name(old, namespace, attempt, config.release_name_suffix_len);
        if candidate == old {
            continue;
        }
        if !storage.release_exists(backend, &candidate, namespace)? {
            info!("Using release name {} for {} in {}", candidate, old, namespace);
            return Ok(candidate);
        }
        debug!("Release name {} already taken in {}", candidate, namespace);
    }

    Err(Error::ReleaseNameExhausted {
        name: old.to_string(),
        attempts: config.release_name_attempts,
    })
}
