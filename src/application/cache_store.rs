// Cache store - Durable last-known dashboards, mirrored in memory for observers
use crate::application::dashboard_source::{DashboardBodies, DashboardSource};
use crate::application::error::StorageError;
use crate::domain::dashboard::{Dashboard, DashboardId};
use crate::domain::device::DeviceIdentity;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Persistence behind the cache store.
#[async_trait]
pub trait DashboardCacheBackend: Send + Sync {
    /// Every dashboard persisted so far.
    async fn load_all(&self) -> Result<Vec<(DeviceIdentity, Dashboard)>, StorageError>;

    /// Inserts or replaces the dashboard with the same id for `identity`.
    async fn save(&self, identity: &DeviceIdentity, dashboard: &Dashboard) -> Result<(), StorageError>;

    /// Removes a dashboard; removing a missing one succeeds.
    async fn delete(&self, identity: &DeviceIdentity, dashboard_id: &DashboardId) -> Result<(), StorageError>;
}

/// Durable dashboards served to observers while their device is offline.
///
/// Writes reach the backend first and are mirrored in memory only once they
/// succeeded, so observers never see a value that was not persisted.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn DashboardCacheBackend>,
    dashboards: DashboardBodies,
    write_lock: Arc<Mutex<()>>,
}

impl CacheStore {
    pub async fn open(backend: Arc<dyn DashboardCacheBackend>) -> Result<Self, StorageError> {
        let entries = backend.load_all().await?;
        tracing::info!(count = entries.len(), "loaded cached dashboards");

        Ok(Self {
            backend,
            dashboards: DashboardBodies::from_entries(entries),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub async fn save_dashboard(
        &self,
        identity: &DeviceIdentity,
        dashboard: Dashboard,
    ) -> Result<(), StorageError> {
        // Held across the backend call so writes land in submission order.
        let _guard = self.write_lock.lock().await;
        self.backend.save(identity, &dashboard).await?;
        self.dashboards.save(identity, dashboard);
        Ok(())
    }

    pub async fn delete_dashboard(
        &self,
        identity: &DeviceIdentity,
        dashboard_id: &DashboardId,
    ) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.backend.delete(identity, dashboard_id).await?;
        self.dashboards.delete(identity, dashboard_id);
        Ok(())
    }

    pub fn dashboard(&self, identity: &DeviceIdentity, dashboard_id: &DashboardId) -> Option<Dashboard> {
        self.dashboards.get(identity, dashboard_id)
    }

    pub fn dashboard_ids(&self, identity: &DeviceIdentity) -> Vec<DashboardId> {
        self.dashboards.ids(identity)
    }
}

impl DashboardSource for CacheStore {
    fn observe_dashboard(
        &self,
        identity: &DeviceIdentity,
        dashboard_id: &DashboardId,
    ) -> BoxStream<'static, Option<Dashboard>> {
        self.dashboards.observe_dashboard(identity, dashboard_id)
    }

    fn observe_device_dashboards(
        &self,
        identity: &DeviceIdentity,
    ) -> BoxStream<'static, Vec<DashboardId>> {
        self.dashboards.observe_device_dashboards(identity)
    }
}
