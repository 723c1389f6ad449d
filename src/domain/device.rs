// Device identity domain model
use serde::{Deserialize, Serialize};
use std::fmt;

/// One application instance on one device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceIdentity {
    pub device_id: String,
    pub package_name: String,
}

impl DeviceIdentity {
    pub fn new(device_id: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            package_name: package_name.into(),
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device_id, self.package_name)
    }
}
