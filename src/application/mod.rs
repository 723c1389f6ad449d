// Application layer - Stores, routing and device messaging
pub mod cache_store;
pub mod connectivity;
pub mod dashboard_router;
pub mod dashboard_source;
pub mod device_transport;
pub mod error;
pub mod live_store;
pub mod message_ingestor;
pub mod reactive_store;
pub mod stream_ext;
