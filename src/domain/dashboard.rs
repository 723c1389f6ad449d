// Dashboard domain model
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a dashboard, unique within one device identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardId(String);

impl DashboardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DashboardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DashboardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Dashboard content pushed by a device. Replaced wholesale on every push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub dashboard_id: DashboardId,
    pub containers: Vec<DashboardContainer>,
}

impl Dashboard {
    pub fn new(dashboard_id: DashboardId, containers: Vec<DashboardContainer>) -> Self {
        Self {
            dashboard_id,
            containers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardContainer {
    pub name: String,
    pub kind: ContainerKind,
    pub elements: Vec<DashboardElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContainerKind {
    Section,
    #[serde(rename_all = "camelCase")]
    Form { form_id: String, submit_text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DashboardElement {
    Button {
        id: String,
        text: String,
    },
    Text {
        label: String,
        value: String,
        color: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    PlainText {
        label: String,
        value: String,
        format: PlainTextFormat,
    },
    TextField {
        id: String,
        label: String,
        placeholder: Option<String>,
        value: String,
    },
    CheckBox {
        id: String,
        label: String,
        value: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlainTextFormat {
    Text,
    Json,
}

/// Layout preference for the dashboards of one device identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DashboardArrangement {
    #[default]
    Adaptive,
    #[serde(rename_all = "camelCase")]
    Fixed { items_per_row: u32 },
}

/// User interaction forwarded to the device that owns the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DashboardEvent {
    #[serde(rename_all = "camelCase")]
    Click { button_id: String },
    #[serde(rename_all = "camelCase")]
    SubmitForm {
        form_id: String,
        values: BTreeMap<String, String>,
    },
    #[serde(rename_all = "camelCase")]
    UpdateTextField { text_field_id: String, value: String },
    #[serde(rename_all = "camelCase")]
    UpdateCheckBox { check_box_id: String, value: bool },
}
