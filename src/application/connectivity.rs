// Connectivity signal - Which device identities are currently connected
use crate::domain::device::DeviceIdentity;
use futures::stream::BoxStream;
use std::collections::HashSet;

pub trait ConnectivitySignal: Send + Sync {
    /// Currently connected identities, re-emitted whenever the set changes.
    ///
    /// The first item is the current set, which may be empty.
    fn observe_active_identities(&self) -> BoxStream<'static, HashSet<DeviceIdentity>>;
}
