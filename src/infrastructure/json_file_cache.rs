// JSON file cache - Durable cache backend keeping every dashboard in one file
use crate::application::cache_store::DashboardCacheBackend;
use crate::application::error::StorageError;
use crate::domain::dashboard::{Dashboard, DashboardId};
use crate::domain::device::DeviceIdentity;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedDashboard {
    device: DeviceIdentity,
    dashboard: Dashboard,
}

type Entries = BTreeMap<(DeviceIdentity, DashboardId), Dashboard>;

pub struct JsonFileCache {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl JsonFileCache {
    /// Opens the cache file at `path`; a missing file is an empty cache.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = read_entries(&path).await?;
        tracing::debug!(path = %path.display(), count = entries.len(), "opened dashboard cache file");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Rewrites the whole file via a temporary file and a rename. The data
    /// is flushed to disk before the rename replaces the old file.
    async fn persist(&self, entries: &Entries) -> Result<(), StorageError> {
        let records: Vec<CachedDashboard> = entries
            .iter()
            .map(|((device, _), dashboard)| CachedDashboard {
                device: device.clone(),
                dashboard: dashboard.clone(),
            })
            .collect();
        let bytes = serde_json::to_vec_pretty(&records)?;

        let parent = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await?;

        if let Some(parent) = parent {
            sync_dir(parent).await?;
        }
        Ok(())
    }
}

/// Makes the rename itself durable.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

async fn read_entries(path: &Path) -> Result<Entries, StorageError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
        Err(e) => return Err(e.into()),
    };

    let records: Vec<CachedDashboard> = serde_json::from_slice(&bytes)?;
    Ok(records
        .into_iter()
        .map(|record| {
            let key = (record.device, record.dashboard.dashboard_id.clone());
            (key, record.dashboard)
        })
        .collect())
}

#[async_trait]
impl DashboardCacheBackend for JsonFileCache {
    async fn load_all(&self) -> Result<Vec<(DeviceIdentity, Dashboard)>, StorageError> {
        let entries = self.entries.lock().await;
        Ok(entries
            .iter()
            .map(|((device, _), dashboard)| (device.clone(), dashboard.clone()))
            .collect())
    }

    async fn save(&self, identity: &DeviceIdentity, dashboard: &Dashboard) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().await;
        let key = (identity.clone(), dashboard.dashboard_id.clone());
        let previous = entries.insert(key.clone(), dashboard.clone());

        if let Err(e) = self.persist(&entries).await {
            match previous {
                Some(previous) => entries.insert(key, previous),
                None => entries.remove(&key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn delete(&self, identity: &DeviceIdentity, dashboard_id: &DashboardId) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().await;
        let key = (identity.clone(), dashboard_id.clone());
        let Some(previous) = entries.remove(&key) else {
            return Ok(());
        };

        if let Err(e) = self.persist(&entries).await {
            entries.insert(key, previous);
            return Err(e);
        }
        Ok(())
    }
}
