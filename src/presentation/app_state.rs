// Application state for HTTP handlers
use crate::application::dashboard_router::DashboardRouter;
use crate::application::message_ingestor::MessageIngestor;
use crate::infrastructure::device_hub::DeviceHub;

#[derive(Clone)]
pub struct AppState {
    pub router: DashboardRouter,
    pub ingestor: MessageIngestor,
    pub devices: DeviceHub,
}
