// src/cluster/retry.rs

//! Optimistic-concurrency status persistence

use super::ClusterError;
use crate::config::StatusUpdateConfig;
use crate::error::{Error, Result};
use tracing::{debug, error, warn};

/// Status persistence for a resource type `R`
pub trait StatusClient<R> {
    /// Re-read the latest version of the resource
    fn get_latest(&self, current: &R) -> std::result::Result<R, ClusterError>;

    /// Merge-patch the desired status onto the latest version
    fn merge_patch_status(&self, latest: &R, desired: &R) -> std::result::Result<(), ClusterError>;

    /// Write the desired status unconditionally
    fn overwrite_status(&self, desired: &R) -> std::result::Result<(), ClusterError>;
}

/// Persist `desired`'s status: read-latest and merge-patch, retrying on
/// conflicts with exponential backoff, then fall back to an unconditional
/// overwrite. Only a failed overwrite is returned as an error.
pub fn update_status_with_retry<R, C>(client: &C, desired: &R, retry: &StatusUpdateConfig) -> Result<()>
where
    C: StatusClient<R> + ?Sized,
{
    for attempt in 0..retry.max_attempts {
        let latest = match client.get_latest(desired) {
            Ok(latest) => latest,
            Err(e) => {
                warn!("Failed to read latest object before status update: {}", e);
                break;
            }
        };

        match client.merge_patch_status(&latest, desired) {
            Ok(()) => {
                debug!("Status updated on attempt {}", attempt + 1);
                return Ok(());
            }
            Err(e) if e.is_conflict() => {
                debug!("Status update conflict on attempt {}: {}", attempt + 1, e);
                if attempt + 1 < retry.max_attempts {
                    std::thread::sleep(retry.backoff(attempt));
                }
            }
            Err(e) => {
                warn!("Status merge-patch failed: {}", e);
                break;
            }
        }
    }

    warn!("Falling back to status overwrite");
    client.overwrite_status(desired).map_err(|e| {
        error!("Status overwrite failed: {}", e);
        Error::StatusUpdate(e.to_string())
    })
}
