// In-memory cache backend, for tests and cache-less runs
use crate::application::cache_store::DashboardCacheBackend;
use crate::application::error::StorageError;
use crate::domain::dashboard::{Dashboard, DashboardId};
use crate::domain::device::DeviceIdentity;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<BTreeMap<(DeviceIdentity, DashboardId), Dashboard>>,
}

#[async_trait]
impl DashboardCacheBackend for InMemoryCache {
    async fn load_all(&self) -> Result<Vec<(DeviceIdentity, Dashboard)>, StorageError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .map(|((identity, _), dashboard)| (identity.clone(), dashboard.clone()))
            .collect())
    }

    async fn save(&self, identity: &DeviceIdentity, dashboard: &Dashboard) -> Result<(), StorageError> {
        self.entries.write().await.insert(
            (identity.clone(), dashboard.dashboard_id.clone()),
            dashboard.clone(),
        );
        Ok(())
    }

    async fn delete(&self, identity: &DeviceIdentity, dashboard_id: &DashboardId) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .remove(&(identity.clone(), dashboard_id.clone()));
        Ok(())
    }
}
