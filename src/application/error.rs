// Error types surfaced by the dashboard core
use crate::domain::device::DeviceIdentity;
use thiserror::Error;

/// Failure of the durable cache backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cache storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("cache storage unavailable: {0}")]
    Unavailable(String),
}

/// Failure to hand a message to a device.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("device {0} is not connected")]
    NotConnected(DeviceIdentity),
    #[error("connection to device {0} closed")]
    ConnectionClosed(DeviceIdentity),
    #[error("failed to encode outgoing message: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
