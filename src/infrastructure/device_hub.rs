// Device hub - Tracks connected devices and queues messages for them
use crate::application::connectivity::ConnectivitySignal;
use crate::application::device_transport::DeviceTransport;
use crate::application::error::TransportError;
use crate::application::reactive_store::ReactiveStore;
use crate::domain::device::DeviceIdentity;
use crate::domain::message::OutgoingMessage;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

type SessionId = u64;

/// In-process registry of connected devices.
///
/// A device counts as connected while it holds the receiving end of its
/// outbox. Dropping the returned [`DeviceSession`] disconnects it; a newer
/// session for the same identity replaces the older one.
#[derive(Clone)]
pub struct DeviceHub {
    sessions: ReactiveStore<DeviceIdentity, SessionId>,
    outboxes: Arc<Mutex<HashMap<DeviceIdentity, (SessionId, mpsc::Sender<OutgoingMessage>)>>>,
    next_session: Arc<AtomicU64>,
    outbox_capacity: usize,
}

/// A live device connection; disconnects the device when dropped.
pub struct DeviceSession {
    pub identity: DeviceIdentity,
    pub outbox: mpsc::Receiver<OutgoingMessage>,
    id: SessionId,
    hub: DeviceHub,
}

impl DeviceHub {
    pub fn new(outbox_capacity: usize) -> Self {
        Self {
            sessions: ReactiveStore::new(),
            outboxes: Arc::new(Mutex::new(HashMap::new())),
            next_session: Arc::new(AtomicU64::new(1)),
            outbox_capacity: outbox_capacity.max(1),
        }
    }

    pub fn connect(&self, identity: DeviceIdentity) -> DeviceSession {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.outbox_capacity);

        // Replacing the sender closes the previous session's outbox.
        self.lock_outboxes().insert(identity.clone(), (id, tx));
        self.sessions.put(identity.clone(), id);
        tracing::info!(%identity, session = id, "device connected");

        DeviceSession {
            identity,
            outbox: rx,
            id,
            hub: self.clone(),
        }
    }

    pub fn is_connected(&self, identity: &DeviceIdentity) -> bool {
        self.sessions.get(identity).is_some()
    }

    fn disconnect(&self, identity: &DeviceIdentity, session: SessionId) {
        let mut outboxes = self.lock_outboxes();
        if matches!(outboxes.get(identity), Some((current, _)) if *current == session) {
            outboxes.remove(identity);
        }
        drop(outboxes);

        let removed = self.sessions.update(|sessions| {
            if sessions.get(identity) == Some(&session) {
                sessions.remove(identity);
                true
            } else {
                false
            }
        });
        if removed {
            tracing::info!(%identity, session, "device disconnected");
        }
    }

    fn lock_outboxes(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<DeviceIdentity, (SessionId, mpsc::Sender<OutgoingMessage>)>> {
        self.outboxes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.hub.disconnect(&self.identity, self.id);
    }
}

impl ConnectivitySignal for DeviceHub {
    fn observe_active_identities(&self) -> BoxStream<'static, HashSet<DeviceIdentity>> {
        self.sessions
            .observe_projection(|sessions| sessions.keys().cloned().collect())
    }
}

#[async_trait]
impl DeviceTransport for DeviceHub {
    async fn send(&self, identity: &DeviceIdentity, message: OutgoingMessage) -> Result<(), TransportError> {
        let sender = self
            .lock_outboxes()
            .get(identity)
            .map(|(_, sender)| sender.clone())
            .ok_or_else(|| TransportError::NotConnected(identity.clone()))?;

        sender
            .send(message)
            .await
            .map_err(|_| TransportError::ConnectionClosed(identity.clone()))
    }
}
