// Dashboard router - Routes reads and writes between the live and cached stores
use crate::application::cache_store::CacheStore;
use crate::application::connectivity::ConnectivitySignal;
use crate::application::dashboard_source::DashboardSource;
use crate::application::error::StorageError;
use crate::application::live_store::LiveDashboardStore;
use crate::application::stream_ext::{distinct_until_changed, switch_latest};
use crate::domain::dashboard::{Dashboard, DashboardArrangement, DashboardId};
use crate::domain::device::DeviceIdentity;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;

/// Entry point for everything the presentation layer reads or changes.
///
/// Dashboards and dashboard lists follow the device: the live store while it
/// is connected, the cache otherwise. Selection and arrangement always come
/// from the live store.
#[derive(Clone)]
pub struct DashboardRouter {
    live: LiveDashboardStore,
    cache: CacheStore,
    connectivity: Arc<dyn ConnectivitySignal>,
}

impl DashboardRouter {
    pub fn new(
        live: LiveDashboardStore,
        cache: CacheStore,
        connectivity: Arc<dyn ConnectivitySignal>,
    ) -> Self {
        Self {
            live,
            cache,
            connectivity,
        }
    }

    pub fn observe_dashboard(
        &self,
        identity: &DeviceIdentity,
        dashboard_id: &DashboardId,
    ) -> BoxStream<'static, Option<Dashboard>> {
        let identity = identity.clone();
        let dashboard_id = dashboard_id.clone();
        self.route(identity.clone(), move |source| {
            source.observe_dashboard(&identity, &dashboard_id)
        })
    }

    pub fn observe_device_dashboards(
        &self,
        identity: &DeviceIdentity,
    ) -> BoxStream<'static, Vec<DashboardId>> {
        let owner = identity.clone();
        self.route(identity.clone(), move |source| {
            source.observe_device_dashboards(&owner)
        })
    }

    pub fn observe_selected_device_dashboard(
        &self,
        identity: &DeviceIdentity,
    ) -> BoxStream<'static, Option<DashboardId>> {
        self.live.observe_selected_dashboard(identity)
    }

    pub fn observe_dashboard_arrangement(
        &self,
        identity: &DeviceIdentity,
    ) -> BoxStream<'static, DashboardArrangement> {
        self.live.observe_arrangement(identity)
    }

    pub fn select_device_dashboard(&self, identity: &DeviceIdentity, dashboard_id: DashboardId) {
        tracing::debug!(%identity, %dashboard_id, "selecting dashboard");
        self.live.select_dashboard(identity, dashboard_id);
    }

    pub fn select_dashboard_arrangement(
        &self,
        identity: &DeviceIdentity,
        arrangement: DashboardArrangement,
    ) {
        tracing::debug!(%identity, ?arrangement, "selecting arrangement");
        self.live.select_arrangement(identity, arrangement);
    }

    /// Writes a device-pushed dashboard to both stores.
    ///
    /// The live store is written even when the cache fails, so a connected
    /// device keeps its live view during a cache outage.
    pub async fn save_dashboard(
        &self,
        identity: &DeviceIdentity,
        dashboard: Dashboard,
    ) -> Result<(), StorageError> {
        self.live.save_dashboard(identity, dashboard.clone());
        self.cache
            .save_dashboard(identity, dashboard)
            .await
            .inspect_err(|e| tracing::error!(%identity, error = %e, "failed to cache dashboard"))
    }

    /// Removes a dashboard from both stores, clearing the selection if it
    /// pointed at it. Deleting a missing dashboard is a no-op.
    ///
    /// The cache is deleted first; if that fails both stores keep the
    /// dashboard and the selection.
    pub async fn delete_dashboard(
        &self,
        identity: &DeviceIdentity,
        dashboard_id: &DashboardId,
    ) -> Result<(), StorageError> {
        self.cache
            .delete_dashboard(identity, dashboard_id)
            .await
            .inspect_err(|e| {
                tracing::error!(%identity, %dashboard_id, error = %e, "failed to delete cached dashboard")
            })?;
        self.live.delete_dashboard(identity, dashboard_id);
        Ok(())
    }

    /// Whether `identity` is connected, emitted only when that changes.
    fn observe_connection(&self, identity: DeviceIdentity) -> BoxStream<'static, bool> {
        distinct_until_changed(
            self.connectivity
                .observe_active_identities()
                .map(move |active| active.contains(&identity)),
        )
    }

    fn route<T, F>(&self, identity: DeviceIdentity, read: F) -> BoxStream<'static, T>
    where
        T: Send + 'static,
        F: Fn(&dyn DashboardSource) -> BoxStream<'static, T> + Send + 'static,
    {
        let live = self.live.clone();
        let cache = self.cache.clone();
        let connections = self.observe_connection(identity.clone());

        switch_latest(connections, move |connected| {
            tracing::debug!(%identity, connected, "routing dashboard reads");
            if connected {
                read(&live)
            } else {
                read(&cache)
            }
        })
    }
}
