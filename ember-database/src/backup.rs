use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

/// Optional snapshot capability for the profile store.
///
/// Configured from `BACKUP_DIR`; when the variable is unset the service
/// is absent and callers report the capability as unavailable. A
/// snapshot is a plain copy of the store file into the destination
/// directory, named per owner and timestamp.
#[derive(Clone, Debug)]
pub struct BackupService {
    source: PathBuf,
    destination: PathBuf,
}

impl BackupService {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Build the service from `BACKUP_DIR`, or `None` when unset/empty.
    pub fn from_env_optional(source: &Path) -> Option<Self> {
        let destination = std::env::var("BACKUP_DIR").ok()?;
        let destination = destination.trim();
        if destination.is_empty() {
            return None;
        }

        Some(Self::new(source, destination))
    }

    /// Snapshot the store for `owner_id`. Reports success; never errors.
    pub async fn create_backup(&self, owner_id: u64) -> bool {
        match self.try_create(owner_id).await {
            Ok(target) => {
                info!(owner_id, target = %target.display(), "profile backup created");
                true
            }
            Err(err) => {
                warn!(?err, owner_id, "profile backup failed");
                false
            }
        }
    }

    async fn try_create(&self, owner_id: u64) -> anyhow::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.destination).await?;

        let target = self
            .destination
            .join(format!("profiles-{}-{}.sqlite", owner_id, now_unix_secs()));
        tokio::fs::copy(&self.source, &target).await?;

        Ok(target)
    }
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
