// JSON codec - Maps device wire payloads to domain dashboards and back
use crate::application::error::TransportError;
use crate::application::message_ingestor::{DashboardCodec, DASHBOARD_PLUGIN};
use crate::domain::dashboard::{
    ContainerKind, Dashboard, DashboardContainer, DashboardElement, DashboardEvent, DashboardId,
    PlainTextFormat,
};
use crate::domain::message::{IncomingMessage, OutgoingMessage};
use serde::Deserialize;
use serde_json::json;

const METHOD_UPDATE: &str = "update";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DashboardWire {
    dashboard_id: String,
    #[serde(default)]
    containers: Vec<ContainerWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerWire {
    name: String,
    #[serde(default)]
    form: Option<FormWire>,
    #[serde(default)]
    elements: Vec<ElementWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormWire {
    id: String,
    submit_text: String,
}

/// One element; devices fill exactly one of the fields.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementWire {
    button: Option<ButtonWire>,
    text: Option<TextWire>,
    plain_text: Option<PlainTextWire>,
    text_field: Option<TextFieldWire>,
    check_box: Option<CheckBoxWire>,
}

#[derive(Debug, Deserialize)]
struct ButtonWire {
    id: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct TextWire {
    label: String,
    value: String,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlainTextWire {
    label: String,
    value: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextFieldWire {
    id: String,
    label: String,
    #[serde(default)]
    placeholder: Option<String>,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct CheckBoxWire {
    id: String,
    label: String,
    value: bool,
}

/// Codec for the JSON bodies devices exchange under the dashboard plugin.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDashboardCodec;

impl DashboardCodec for JsonDashboardCodec {
    fn try_decode_dashboard(&self, message: &IncomingMessage) -> Option<Dashboard> {
        if message.method != METHOD_UPDATE {
            tracing::debug!(method = %message.method, "not a dashboard update");
            return None;
        }

        match serde_json::from_str::<DashboardWire>(&message.body) {
            Ok(wire) => Some(dashboard_from_wire(wire)),
            Err(e) => {
                tracing::debug!(error = %e, "dashboard body did not decode");
                None
            }
        }
    }

    fn encode_event(&self, event: &DashboardEvent) -> Result<OutgoingMessage, TransportError> {
        let (method, body) = match event {
            DashboardEvent::Click { button_id } => ("onClick", json!({ "id": button_id })),
            DashboardEvent::SubmitForm { form_id, values } => {
                ("onFormSubmitted", json!({ "id": form_id, "values": values }))
            }
            DashboardEvent::UpdateTextField {
                text_field_id,
                value,
            } => ("onTextFieldChanged", json!({ "id": text_field_id, "value": value })),
            DashboardEvent::UpdateCheckBox {
                check_box_id,
                value,
            } => (
                "onCheckBoxValueChanged",
                json!({ "id": check_box_id, "value": value }),
            ),
        };

        Ok(OutgoingMessage {
            plugin: DASHBOARD_PLUGIN.to_string(),
            method: method.to_string(),
            body: serde_json::to_string(&body)?,
        })
    }
}

fn dashboard_from_wire(wire: DashboardWire) -> Dashboard {
    let containers = wire.containers.into_iter().map(container_from_wire).collect();
    Dashboard::new(DashboardId::new(wire.dashboard_id), containers)
}

fn container_from_wire(wire: ContainerWire) -> DashboardContainer {
    let kind = match wire.form {
        Some(form) => ContainerKind::Form {
            form_id: form.id,
            submit_text: form.submit_text,
        },
        None => ContainerKind::Section,
    };

    DashboardContainer {
        name: wire.name,
        kind,
        elements: wire.elements.into_iter().filter_map(element_from_wire).collect(),
    }
}

fn element_from_wire(wire: ElementWire) -> Option<DashboardElement> {
    if let Some(button) = wire.button {
        return Some(DashboardElement::Button {
            id: button.id,
            text: button.text,
        });
    }
    if let Some(text) = wire.text {
        return Some(DashboardElement::Text {
            label: text.label,
            value: text.value,
            color: text.color,
        });
    }
    if let Some(plain) = wire.plain_text {
        let format = match plain.kind.as_deref() {
            Some("json") => PlainTextFormat::Json,
            _ => PlainTextFormat::Text,
        };
        return Some(DashboardElement::PlainText {
            label: plain.label,
            value: plain.value,
            format,
        });
    }
    if let Some(field) = wire.text_field {
        return Some(DashboardElement::TextField {
            id: field.id,
            label: field.label,
            placeholder: field.placeholder,
            value: field.value,
        });
    }
    if let Some(check_box) = wire.check_box {
        return Some(DashboardElement::CheckBox {
            id: check_box.id,
            label: check_box.label,
            value: check_box.value,
        });
    }

    // Unknown element kinds from newer clients
    tracing::debug!("skipping unsupported dashboard element");
    None
}
