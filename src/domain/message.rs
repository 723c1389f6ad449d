// Messages exchanged with devices
use serde::{Deserialize, Serialize};

/// Raw message received from a device, routed by plugin name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub plugin: String,
    pub method: String,
    pub body: String,
}

/// Message queued for delivery to a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub plugin: String,
    pub method: String,
    pub body: String,
}
