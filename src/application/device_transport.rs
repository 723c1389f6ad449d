// Repository trait for reaching connected devices
use crate::application::error::TransportError;
use crate::domain::device::DeviceIdentity;
use crate::domain::message::OutgoingMessage;
use async_trait::async_trait;

#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// Hands `message` to the device; fails when it cannot be delivered.
    async fn send(&self, identity: &DeviceIdentity, message: OutgoingMessage) -> Result<(), TransportError>;
}
