use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Connection to the remote application was established.
pub const EVENT_OPEN: &str = "rpc.open";
/// Connection to the remote application was lost (or it exited).
pub const EVENT_CLOSE: &str = "rpc.close";
/// The remote application pushed the persisted settings object.
pub const EVENT_SETTINGS: &str = "rpc.settings";
/// Persist the full settings object on the host (fire-and-forget).
pub const EVENT_SET_SETTINGS: &str = "setSettings";

/// Prefix shared by every remote-resource event name ("rpc.sceneList", ...).
pub const RPC_PREFIX: &str = "rpc.";

/// One message on the host socket. The host speaks text frames containing
/// `{event, action?, context?, payload?}`; `payload` stays opaque JSON here,
/// vendor shapes are decoded at the edge that needs them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Envelope {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Envelope {
    pub fn bare(event: &str) -> Self {
        Self {
            event: event.to_string(),
            action: None,
            context: None,
            payload: None,
        }
    }

    pub fn with_payload(event: &str, context: &str, payload: Value) -> Self {
        Self {
            event: event.to_string(),
            action: None,
            context: Some(context.to_string()),
            payload: Some(payload),
        }
    }

    /// The `setSettings` persistence message: always carries the action id,
    /// the placed-instance context and the whole settings object.
    pub fn set_settings(action: &str, context: &str, settings: Map<String, Value>) -> Self {
        Self {
            event: EVENT_SET_SETTINGS.to_string(),
            action: Some(action.to_string()),
            context: Some(context.to_string()),
            payload: Some(Value::Object(settings)),
        }
    }

    pub fn parameters(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Whether this event names a remote resource (satisfies a dependency).
    pub fn is_resource(&self) -> bool {
        self.event.starts_with(RPC_PREFIX)
    }
}

/// Concrete settings schema per action type. The wire keeps these as plain
/// objects; inspectors decode on demand and treat unknown shapes as a decode
/// error, never a default.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ActionSettings {
    Brightness { level: u8 },
    Color { color: String },
    Temperature { mireds: u16 },
    Scene { scene: String },
    Clock { twenty_four_hour: bool, show_seconds: bool },
}
