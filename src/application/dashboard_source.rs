// Dashboard sources - Read side shared by the live and cached stores
use crate::application::reactive_store::ReactiveStore;
use crate::domain::dashboard::{Dashboard, DashboardId};
use crate::domain::device::DeviceIdentity;
use futures::stream::BoxStream;
use std::collections::BTreeMap;

/// A store the router can read dashboards from.
pub trait DashboardSource: Send + Sync {
    /// Dashboard `dashboard_id` of `identity`, or `None` while it is unknown.
    fn observe_dashboard(
        &self,
        identity: &DeviceIdentity,
        dashboard_id: &DashboardId,
    ) -> BoxStream<'static, Option<Dashboard>>;

    /// Ids of every dashboard recorded for `identity`, in id order.
    fn observe_device_dashboards(
        &self,
        identity: &DeviceIdentity,
    ) -> BoxStream<'static, Vec<DashboardId>>;
}

pub type DashboardKey = (DeviceIdentity, DashboardId);

/// Dashboard bodies keyed by owner and id.
#[derive(Clone, Default)]
pub struct DashboardBodies {
    store: ReactiveStore<DashboardKey, Dashboard>,
}

impl DashboardBodies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (DeviceIdentity, Dashboard)>) -> Self {
        Self {
            store: ReactiveStore::from_entries(entries.into_iter().map(|(identity, dashboard)| {
                ((identity, dashboard.dashboard_id.clone()), dashboard)
            })),
        }
    }

    pub fn get(&self, identity: &DeviceIdentity, dashboard_id: &DashboardId) -> Option<Dashboard> {
        self.store.get(&(identity.clone(), dashboard_id.clone()))
    }

    pub fn save(&self, identity: &DeviceIdentity, dashboard: Dashboard) {
        let key = (identity.clone(), dashboard.dashboard_id.clone());
        self.store.put(key, dashboard);
    }

    pub fn delete(&self, identity: &DeviceIdentity, dashboard_id: &DashboardId) -> bool {
        self.store
            .delete(&(identity.clone(), dashboard_id.clone()))
            .is_some()
    }

    pub fn ids(&self, identity: &DeviceIdentity) -> Vec<DashboardId> {
        self.store.read(|map| ids_of(map, identity))
    }
}

fn ids_of(
    map: &BTreeMap<DashboardKey, Dashboard>,
    identity: &DeviceIdentity,
) -> Vec<DashboardId> {
    map.range((identity.clone(), DashboardId::new(""))..)
        .take_while(|((owner, _), _)| owner == identity)
        .map(|((_, dashboard_id), _)| dashboard_id.clone())
        .collect()
}

impl DashboardSource for DashboardBodies {
    fn observe_dashboard(
        &self,
        identity: &DeviceIdentity,
        dashboard_id: &DashboardId,
    ) -> BoxStream<'static, Option<Dashboard>> {
        self.store.observe((identity.clone(), dashboard_id.clone()))
    }

    fn observe_device_dashboards(
        &self,
        identity: &DeviceIdentity,
    ) -> BoxStream<'static, Vec<DashboardId>> {
        let identity = identity.clone();
        self.store.observe_projection(move |map| ids_of(map, &identity))
    }
}
