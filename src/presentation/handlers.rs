// HTTP request handlers
use crate::application::error::{DashboardError, TransportError};
use crate::domain::dashboard::{DashboardArrangement, DashboardEvent, DashboardId};
use crate::domain::device::DeviceIdentity;
use crate::domain::message::IncomingMessage;
use crate::infrastructure::ndjson_stream::ndjson_stream;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct DevicePath {
    pub device_id: String,
    pub package_name: String,
}

impl DevicePath {
    fn identity(self) -> DeviceIdentity {
        DeviceIdentity::new(self.device_id, self.package_name)
    }
}

#[derive(Deserialize)]
pub struct DashboardPath {
    pub device_id: String,
    pub package_name: String,
    pub dashboard_id: String,
}

impl DashboardPath {
    fn split(self) -> (DeviceIdentity, DashboardId) {
        (
            DeviceIdentity::new(self.device_id, self.package_name),
            DashboardId::new(self.dashboard_id),
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectDashboardRequest {
    pub dashboard_id: DashboardId,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Inbound message from a device
pub async fn receive_message(
    Path(path): Path<DevicePath>,
    State(state): State<Arc<AppState>>,
    Json(message): Json<IncomingMessage>,
) -> StatusCode {
    let identity = path.identity();
    match state.ingestor.on_message_received(&identity, &message).await {
        Ok(true) => StatusCode::ACCEPTED,
        Ok(false) => StatusCode::NO_CONTENT,
        Err(e) => {
            tracing::error!(%identity, error = %e, "failed to store dashboard");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Device connection: streams outgoing messages while the device listens
pub async fn device_outbox(
    Path(path): Path<DevicePath>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let mut session = state.devices.connect(path.identity());

    // Dropping the stream (client hung up) ends the session.
    let stream = async_stream::stream! {
        while let Some(message) = session.outbox.recv().await {
            yield message;
        }
    };
    ndjson_stream(stream)
}

/// Stream of dashboard ids for a device
pub async fn observe_device_dashboards(
    Path(path): Path<DevicePath>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ndjson_stream(state.router.observe_device_dashboards(&path.identity()))
}

/// Stream of one dashboard (null while unknown)
pub async fn observe_dashboard(
    Path(path): Path<DashboardPath>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let (identity, dashboard_id) = path.split();
    ndjson_stream(state.router.observe_dashboard(&identity, &dashboard_id))
}

pub async fn delete_dashboard(
    Path(path): Path<DashboardPath>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    let (identity, dashboard_id) = path.split();
    match state.router.delete_dashboard(&identity, &dashboard_id).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Forward a user interaction to the device
pub async fn send_dashboard_event(
    Path(path): Path<DashboardPath>,
    State(state): State<Arc<AppState>>,
    Json(event): Json<DashboardEvent>,
) -> StatusCode {
    let (identity, dashboard_id) = path.split();
    let result = match event {
        DashboardEvent::Click { button_id } => {
            state
                .ingestor
                .send_click_event(&identity, &dashboard_id, &button_id)
                .await
        }
        DashboardEvent::SubmitForm { form_id, values } => {
            state
                .ingestor
                .submit_form_event(&identity, &dashboard_id, &form_id, values)
                .await
        }
        DashboardEvent::UpdateTextField {
            text_field_id,
            value,
        } => {
            state
                .ingestor
                .submit_text_field_event(&identity, &dashboard_id, &text_field_id, &value)
                .await
        }
        DashboardEvent::UpdateCheckBox {
            check_box_id,
            value,
        } => {
            state
                .ingestor
                .send_update_check_box_event(&identity, &dashboard_id, &check_box_id, value)
                .await
        }
    };

    match result {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => error_status(&e),
    }
}

pub async fn observe_selected_dashboard(
    Path(path): Path<DevicePath>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ndjson_stream(state.router.observe_selected_device_dashboard(&path.identity()))
}

pub async fn select_dashboard(
    Path(path): Path<DevicePath>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectDashboardRequest>,
) -> StatusCode {
    state
        .router
        .select_device_dashboard(&path.identity(), request.dashboard_id);
    StatusCode::NO_CONTENT
}

pub async fn observe_arrangement(
    Path(path): Path<DevicePath>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ndjson_stream(state.router.observe_dashboard_arrangement(&path.identity()))
}

pub async fn select_arrangement(
    Path(path): Path<DevicePath>,
    State(state): State<Arc<AppState>>,
    Json(arrangement): Json<DashboardArrangement>,
) -> impl IntoResponse {
    state
        .router
        .select_dashboard_arrangement(&path.identity(), arrangement);
    StatusCode::NO_CONTENT
}

fn error_status(error: &DashboardError) -> StatusCode {
    match error {
        DashboardError::Transport(TransportError::NotConnected(_)) => StatusCode::NOT_FOUND,
        DashboardError::Transport(TransportError::ConnectionClosed(_)) => StatusCode::GONE,
        DashboardError::Transport(TransportError::Encode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        DashboardError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cache_store::tests::FlakyCache;
    use crate::application::cache_store::CacheStore;
    use crate::application::dashboard_router::DashboardRouter;
    use crate::application::error::StorageError;
    use crate::application::live_store::LiveDashboardStore;
    use crate::application::message_ingestor::{MessageIngestor, DASHBOARD_PLUGIN};
    use crate::infrastructure::device_hub::DeviceHub;
    use crate::infrastructure::json_codec::JsonDashboardCodec;
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn build_state(backend: Arc<FlakyCache>) -> Arc<AppState> {
        let devices = DeviceHub::new(8);
        let cache = CacheStore::open(backend).await.unwrap();
        let router = DashboardRouter::new(LiveDashboardStore::new(), cache, Arc::new(devices.clone()));
        let ingestor = MessageIngestor::new(
            router.clone(),
            Arc::new(JsonDashboardCodec),
            Arc::new(devices.clone()),
        );
        Arc::new(AppState {
            router,
            ingestor,
            devices,
        })
    }

    fn identity() -> DeviceIdentity {
        DeviceIdentity::new("dev1", "com.app")
    }

    fn device_path() -> Path<DevicePath> {
        Path(DevicePath {
            device_id: "dev1".to_string(),
            package_name: "com.app".to_string(),
        })
    }

    fn dashboard_path() -> Path<DashboardPath> {
        Path(DashboardPath {
            device_id: "dev1".to_string(),
            package_name: "com.app".to_string(),
            dashboard_id: "home".to_string(),
        })
    }

    fn message(plugin: &str) -> Json<IncomingMessage> {
        Json(IncomingMessage {
            plugin: plugin.to_string(),
            method: "update".to_string(),
            body: r#"{"dashboardId":"home","containers":[]}"#.to_string(),
        })
    }

    fn click() -> Json<DashboardEvent> {
        Json(DashboardEvent::Click {
            button_id: "refresh".to_string(),
        })
    }

    #[tokio::test]
    async fn test_receive_message_statuses() {
        let backend = Arc::new(FlakyCache::default());
        let state = build_state(backend.clone()).await;

        let status = receive_message(device_path(), State(state.clone()), message(DASHBOARD_PLUGIN)).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let status = receive_message(device_path(), State(state.clone()), message("network")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        backend.set_down(true);
        let status = receive_message(device_path(), State(state), message(DASHBOARD_PLUGIN)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_outbox_streams_events_until_hang_up() {
        let state = build_state(Arc::default()).await;

        let response = device_outbox(device_path(), State(state.clone())).await;
        assert!(state.devices.is_connected(&identity()));

        let status = send_dashboard_event(dashboard_path(), State(state.clone()), click()).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let mut body = response.into_body().into_data_stream();
        let line = timeout(Duration::from_secs(1), body.next())
            .await
            .expect("outbox emitted nothing")
            .expect("outbox ended")
            .unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&line).unwrap();
        assert_eq!(sent["method"], "onClick");

        drop(body);
        assert!(!state.devices.is_connected(&identity()));
    }

    #[tokio::test]
    async fn test_event_delivery_errors_map_to_statuses() {
        let state = build_state(Arc::default()).await;

        let status = send_dashboard_event(dashboard_path(), State(state.clone()), click()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let mut session = state.devices.connect(identity());
        session.outbox.close();
        let status = send_dashboard_event(dashboard_path(), State(state.clone()), click()).await;
        assert_eq!(status, StatusCode::GONE);

        let storage = DashboardError::Storage(StorageError::Unavailable("disk offline".to_string()));
        assert_eq!(error_status(&storage), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_delete_reports_cache_outage() {
        let backend = Arc::new(FlakyCache::default());
        let state = build_state(backend.clone()).await;

        assert_eq!(
            delete_dashboard(dashboard_path(), State(state.clone())).await,
            StatusCode::NO_CONTENT
        );

        backend.set_down(true);
        assert_eq!(
            delete_dashboard(dashboard_path(), State(state)).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
