// Message ingestor - Device messages in, dashboard events out
use crate::application::dashboard_router::DashboardRouter;
use crate::application::device_transport::DeviceTransport;
use crate::application::error::{DashboardError, StorageError, TransportError};
use crate::domain::dashboard::{Dashboard, DashboardEvent, DashboardId};
use crate::domain::device::DeviceIdentity;
use crate::domain::message::{IncomingMessage, OutgoingMessage};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Plugin name dashboard traffic is exchanged under.
pub const DASHBOARD_PLUGIN: &str = "dashboard";

/// Wire format of dashboard messages.
pub trait DashboardCodec: Send + Sync {
    /// The dashboard carried by `message`, if it carries one. Only called
    /// for messages addressed to [`DASHBOARD_PLUGIN`].
    fn try_decode_dashboard(&self, message: &IncomingMessage) -> Option<Dashboard>;

    fn encode_event(&self, event: &DashboardEvent) -> Result<OutgoingMessage, TransportError>;
}

#[derive(Clone)]
pub struct MessageIngestor {
    router: DashboardRouter,
    codec: Arc<dyn DashboardCodec>,
    transport: Arc<dyn DeviceTransport>,
}

impl MessageIngestor {
    pub fn new(
        router: DashboardRouter,
        codec: Arc<dyn DashboardCodec>,
        transport: Arc<dyn DeviceTransport>,
    ) -> Self {
        Self {
            router,
            codec,
            transport,
        }
    }

    /// Stores the dashboard carried by `message`; anything else is ignored.
    ///
    /// Returns whether a dashboard was found.
    pub async fn on_message_received(
        &self,
        identity: &DeviceIdentity,
        message: &IncomingMessage,
    ) -> Result<bool, StorageError> {
        if message.plugin != DASHBOARD_PLUGIN {
            tracing::debug!(%identity, plugin = %message.plugin, "ignoring message for another plugin");
            return Ok(false);
        }

        let Some(dashboard) = self.codec.try_decode_dashboard(message) else {
            tracing::debug!(%identity, method = %message.method, "ignoring non-dashboard message");
            return Ok(false);
        };

        tracing::debug!(%identity, dashboard_id = %dashboard.dashboard_id, "received dashboard");
        self.router.save_dashboard(identity, dashboard).await?;
        Ok(true)
    }

    pub async fn send_click_event(
        &self,
        identity: &DeviceIdentity,
        dashboard_id: &DashboardId,
        button_id: &str,
    ) -> Result<(), DashboardError> {
        let event = DashboardEvent::Click {
            button_id: button_id.to_string(),
        };
        self.send_event(identity, dashboard_id, &event).await
    }

    pub async fn submit_form_event(
        &self,
        identity: &DeviceIdentity,
        dashboard_id: &DashboardId,
        form_id: &str,
        values: BTreeMap<String, String>,
    ) -> Result<(), DashboardError> {
        let event = DashboardEvent::SubmitForm {
            form_id: form_id.to_string(),
            values,
        };
        self.send_event(identity, dashboard_id, &event).await
    }

    pub async fn submit_text_field_event(
        &self,
        identity: &DeviceIdentity,
        dashboard_id: &DashboardId,
        text_field_id: &str,
        value: &str,
    ) -> Result<(), DashboardError> {
        let event = DashboardEvent::UpdateTextField {
            text_field_id: text_field_id.to_string(),
            value: value.to_string(),
        };
        self.send_event(identity, dashboard_id, &event).await
    }

    pub async fn send_update_check_box_event(
        &self,
        identity: &DeviceIdentity,
        dashboard_id: &DashboardId,
        check_box_id: &str,
        value: bool,
    ) -> Result<(), DashboardError> {
        let event = DashboardEvent::UpdateCheckBox {
            check_box_id: check_box_id.to_string(),
            value,
        };
        self.send_event(identity, dashboard_id, &event).await
    }

    /// Forwards a user interaction to the device. Never touches local state
    /// and never retries.
    pub async fn send_event(
        &self,
        identity: &DeviceIdentity,
        dashboard_id: &DashboardId,
        event: &DashboardEvent,
    ) -> Result<(), DashboardError> {
        let message = self.codec.encode_event(event)?;
        self.transport
            .send(identity, message)
            .await
            .inspect_err(|e| tracing::warn!(%identity, %dashboard_id, error = %e, "dashboard event not delivered"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cache_store::CacheStore;
    use crate::application::connectivity::ConnectivitySignal;
    use crate::application::live_store::LiveDashboardStore;
    use crate::infrastructure::json_codec::JsonDashboardCodec;
    use crate::infrastructure::memory_cache::InMemoryCache;
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream, StreamExt};
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct NobodyConnected;

    impl ConnectivitySignal for NobodyConnected {
        fn observe_active_identities(&self) -> BoxStream<'static, HashSet<DeviceIdentity>> {
            stream::iter(vec![HashSet::new()]).chain(stream::pending()).boxed()
        }
    }

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(DeviceIdentity, OutgoingMessage)>>,
        reachable: bool,
    }

    #[async_trait]
    impl DeviceTransport for RecordingTransport {
        async fn send(&self, identity: &DeviceIdentity, message: OutgoingMessage) -> Result<(), TransportError> {
            if !self.reachable {
                return Err(TransportError::NotConnected(identity.clone()));
            }
            self.sent.lock().unwrap().push((identity.clone(), message));
            Ok(())
        }
    }

    async fn build_ingestor(transport: Arc<RecordingTransport>) -> (MessageIngestor, CacheStore) {
        let cache = CacheStore::open(Arc::new(InMemoryCache::default())).await.unwrap();
        let router = DashboardRouter::new(LiveDashboardStore::new(), cache.clone(), Arc::new(NobodyConnected));
        (
            MessageIngestor::new(router, Arc::new(JsonDashboardCodec), transport),
            cache,
        )
    }

    fn identity() -> DeviceIdentity {
        DeviceIdentity::new("dev1", "com.app")
    }

    #[tokio::test]
    async fn test_dashboard_message_is_written_through() {
        let (ingestor, cache) = build_ingestor(Arc::default()).await;
        let message = IncomingMessage {
            plugin: DASHBOARD_PLUGIN.to_string(),
            method: "update".to_string(),
            body: r#"{"dashboardId":"home","containers":[]}"#.to_string(),
        };

        assert!(ingestor.on_message_received(&identity(), &message).await.unwrap());
        assert_eq!(cache.dashboard_ids(&identity()), vec![DashboardId::new("home")]);
    }

    #[tokio::test]
    async fn test_other_messages_are_ignored() {
        let (ingestor, cache) = build_ingestor(Arc::default()).await;
        let foreign = IncomingMessage {
            plugin: "network".to_string(),
            method: "update".to_string(),
            body: r#"{"dashboardId":"home","containers":[]}"#.to_string(),
        };
        let garbled = IncomingMessage {
            plugin: DASHBOARD_PLUGIN.to_string(),
            method: "update".to_string(),
            body: "not json".to_string(),
        };

        assert!(!ingestor.on_message_received(&identity(), &foreign).await.unwrap());
        assert!(!ingestor.on_message_received(&identity(), &garbled).await.unwrap());
        assert!(cache.dashboard_ids(&identity()).is_empty());
    }

    /// Decodes every body as the same dashboard, whatever it is addressed to.
    struct PermissiveCodec;

    impl DashboardCodec for PermissiveCodec {
        fn try_decode_dashboard(&self, _message: &IncomingMessage) -> Option<Dashboard> {
            Some(Dashboard::new(DashboardId::new("home"), Vec::new()))
        }

        fn encode_event(&self, event: &DashboardEvent) -> Result<OutgoingMessage, TransportError> {
            JsonDashboardCodec.encode_event(event)
        }
    }

    #[tokio::test]
    async fn test_plugin_filter_applies_before_decoding() {
        let cache = CacheStore::open(Arc::new(InMemoryCache::default())).await.unwrap();
        let router = DashboardRouter::new(LiveDashboardStore::new(), cache.clone(), Arc::new(NobodyConnected));
        let transport: Arc<RecordingTransport> = Arc::default();
        let ingestor = MessageIngestor::new(router, Arc::new(PermissiveCodec), transport);

        let foreign = IncomingMessage {
            plugin: "network".to_string(),
            method: "update".to_string(),
            body: "{}".to_string(),
        };
        assert!(!ingestor.on_message_received(&identity(), &foreign).await.unwrap());
        assert!(cache.dashboard_ids(&identity()).is_empty());

        let addressed = IncomingMessage {
            plugin: DASHBOARD_PLUGIN.to_string(),
            ..foreign
        };
        assert!(ingestor.on_message_received(&identity(), &addressed).await.unwrap());
        assert_eq!(cache.dashboard_ids(&identity()), vec![DashboardId::new("home")]);
    }

    #[tokio::test]
    async fn test_events_reach_transport() {
        let transport = Arc::new(RecordingTransport {
            reachable: true,
            ..Default::default()
        });
        let (ingestor, _) = build_ingestor(transport.clone()).await;
        let home = DashboardId::new("home");

        ingestor.send_click_event(&identity(), &home, "refresh").await.unwrap();
        let values = BTreeMap::from([("name".to_string(), "bob".to_string())]);
        ingestor
            .submit_form_event(&identity(), &home, "profile", values)
            .await
            .unwrap();
        ingestor
            .send_update_check_box_event(&identity(), &home, "debug", true)
            .await
            .unwrap();

        let sent = transport.sent.lock().unwrap();
        let methods: Vec<&str> = sent.iter().map(|(_, m)| m.method.as_str()).collect();
        assert_eq!(methods, vec!["onClick", "onFormSubmitted", "onCheckBoxValueChanged"]);
        assert_eq!(sent[1].1.body, r#"{"id":"profile","values":{"name":"bob"}}"#);
        assert!(sent.iter().all(|(to, m)| *to == identity() && m.plugin == DASHBOARD_PLUGIN));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported() {
        let (ingestor, _) = build_ingestor(Arc::default()).await;
        let result = ingestor
            .submit_text_field_event(&identity(), &DashboardId::new("home"), "name", "bob")
            .await;
        assert!(matches!(
            result,
            Err(DashboardError::Transport(TransportError::NotConnected(_)))
        ));
    }
}
