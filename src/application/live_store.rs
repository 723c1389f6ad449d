// Live store - Session-scoped dashboard state of connected devices
use crate::application::dashboard_source::{DashboardBodies, DashboardSource};
use crate::application::reactive_store::ReactiveStore;
use crate::domain::dashboard::{Dashboard, DashboardArrangement, DashboardId};
use crate::domain::device::DeviceIdentity;
use futures::stream::{BoxStream, StreamExt};

/// Holds what devices pushed during this session plus the user's selections.
///
/// Nothing here survives a restart. Selection, arrangement and bodies live in
/// three independent stores so a write to one never waits on another.
#[derive(Clone, Default)]
pub struct LiveDashboardStore {
    selected_dashboards: ReactiveStore<DeviceIdentity, DashboardId>,
    arrangements: ReactiveStore<DeviceIdentity, DashboardArrangement>,
    dashboards: DashboardBodies,
}

impl LiveDashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_selected_dashboard(
        &self,
        identity: &DeviceIdentity,
    ) -> BoxStream<'static, Option<DashboardId>> {
        self.selected_dashboards.observe(identity.clone())
    }

    pub fn select_dashboard(&self, identity: &DeviceIdentity, dashboard_id: DashboardId) {
        self.selected_dashboards.put(identity.clone(), dashboard_id);
    }

    pub fn observe_arrangement(
        &self,
        identity: &DeviceIdentity,
    ) -> BoxStream<'static, DashboardArrangement> {
        self.arrangements
            .observe(identity.clone())
            .map(Option::unwrap_or_default)
            .boxed()
    }

    pub fn select_arrangement(&self, identity: &DeviceIdentity, arrangement: DashboardArrangement) {
        self.arrangements.put(identity.clone(), arrangement);
    }

    pub fn save_dashboard(&self, identity: &DeviceIdentity, dashboard: Dashboard) {
        self.dashboards.save(identity, dashboard);
    }

    /// Removes the dashboard and, when it is the selected one, the selection.
    ///
    /// The selection goes first so it never points at a removed dashboard.
    pub fn delete_dashboard(&self, identity: &DeviceIdentity, dashboard_id: &DashboardId) {
        let cleared = self.selected_dashboards.update(|selected| {
            if selected.get(identity) == Some(dashboard_id) {
                selected.remove(identity);
                true
            } else {
                false
            }
        });
        let removed = self.dashboards.delete(identity, dashboard_id);
        tracing::debug!(
            %identity,
            %dashboard_id,
            cleared_selection = cleared,
            removed,
            "deleted live dashboard"
        );
    }

    pub fn dashboard_ids(&self, identity: &DeviceIdentity) -> Vec<DashboardId> {
        self.dashboards.ids(identity)
    }
}

impl DashboardSource for LiveDashboardStore {
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn next<T>(stream: &mut BoxStream<'static, T>) -> T {
        timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("stream emitted nothing")
            .expect("stream ended")
    }

    fn identity() -> DeviceIdentity {
        DeviceIdentity::new("dev1", "com.app")
    }

    fn dashboard(id: &str) -> Dashboard {
        Dashboard::new(DashboardId::new(id), Vec::new())
    }

    #[tokio::test]
    async fn test_arrangement_defaults_to_adaptive() {
        let store = LiveDashboardStore::new();
        let mut arrangement = store.observe_arrangement(&identity());
        assert_eq!(next(&mut arrangement).await, DashboardArrangement::Adaptive);

        store.select_arrangement(&identity(), DashboardArrangement::Fixed { items_per_row: 2 });
        assert_eq!(
            next(&mut arrangement).await,
            DashboardArrangement::Fixed { items_per_row: 2 }
        );
    }

    #[tokio::test]
    async fn test_delete_clears_matching_selection() {
        let store = LiveDashboardStore::new();
        store.save_dashboard(&identity(), dashboard("home"));
        store.select_dashboard(&identity(), DashboardId::new("home"));

        let mut selected = store.observe_selected_dashboard(&identity());
        assert_eq!(next(&mut selected).await, Some(DashboardId::new("home")));

        store.delete_dashboard(&identity(), &DashboardId::new("home"));
        assert_eq!(next(&mut selected).await, None);
        assert!(store.dashboard_ids(&identity()).is_empty());
    }

    #[tokio::test]
    async fn test_delete_keeps_other_selection() {
        let store = LiveDashboardStore::new();
        store.save_dashboard(&identity(), dashboard("home"));
        store.save_dashboard(&identity(), dashboard("debug"));
        store.select_dashboard(&identity(), DashboardId::new("home"));

        store.delete_dashboard(&identity(), &DashboardId::new("debug"));

        let mut selected = store.observe_selected_dashboard(&identity());
        assert_eq!(next(&mut selected).await, Some(DashboardId::new("home")));
        assert_eq!(store.dashboard_ids(&identity()), vec![DashboardId::new("home")]);
    }

    #[tokio::test]
    async fn test_device_dashboards_are_scoped_to_identity() {
        let store = LiveDashboardStore::new();
        let other = DeviceIdentity::new("dev1", "com.other");
        store.save_dashboard(&identity(), dashboard("b"));
        store.save_dashboard(&identity(), dashboard("a"));
        store.save_dashboard(&other, dashboard("c"));

        let mut ids = store.observe_device_dashboards(&identity());
        assert_eq!(
            next(&mut ids).await,
            vec![DashboardId::new("a"), DashboardId::new("b")]
        );
    }
}
