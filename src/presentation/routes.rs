// HTTP route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    delete_dashboard, device_outbox, health_check, observe_arrangement, observe_dashboard,
    observe_device_dashboards, observe_selected_dashboard, receive_message, select_arrangement,
    select_dashboard, send_dashboard_event,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/devices/:device_id/:package_name/messages", post(receive_message))
        .route("/devices/:device_id/:package_name/outbox", get(device_outbox))
        .route(
            "/devices/:device_id/:package_name/dashboards",
            get(observe_device_dashboards),
        )
        .route(
            "/devices/:device_id/:package_name/dashboards/:dashboard_id",
            get(observe_dashboard).delete(delete_dashboard),
        )
        .route(
            "/devices/:device_id/:package_name/dashboards/:dashboard_id/events",
            post(send_dashboard_event),
        )
        .route(
            "/devices/:device_id/:package_name/selection",
            get(observe_selected_dashboard).put(select_dashboard),
        )
        .route(
            "/devices/:device_id/:package_name/arrangement",
            get(observe_arrangement).put(select_arrangement),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
