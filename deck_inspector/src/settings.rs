use crate::error::Error;
use deck_protocol::{Envelope, EVENT_SETTINGS};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

/// Local cache of the remote settings object for one placed action instance.
///
/// The host is the system of record: every remote `rpc.settings` event
/// replaces the cache wholesale, and every local edit immediately re-sends
/// the full object (there is no partial-update protocol). Last write wins.
#[derive(Debug)]
pub struct SettingsMirror {
    action: String,
    context: String,
    values: Map<String, Value>,
    outbound: mpsc::Sender<Envelope>,
}

impl SettingsMirror {
    pub fn new(action: &str, context: &str, outbound: mpsc::Sender<Envelope>) -> Self {
        Self {
            action: action.to_string(),
            context: context.to_string(),
            values: Map::new(),
            outbound,
        }
    }

    /// Replaces the whole cache with the received payload. A missing or
    /// non-object payload is a loud error: defaulting here would leave the
    /// panel rendering settings the remote no longer has.
    pub fn on_remote_settings(&mut self, payload: Option<&Value>) -> Result<(), Error> {
        let value = payload.ok_or_else(|| Error::MissingParameters {
            event: EVENT_SETTINGS.to_string(),
        })?;
        let Value::Object(map) = value else {
            return Err(Error::MalformedSettings {
                event: EVENT_SETTINGS.to_string(),
            });
        };
        self.values = map.clone();
        Ok(())
    }

    /// Mutates one field locally, then pushes the full object back over the
    /// channel as a single `setSettings` message.
    pub fn set_field(&mut self, key: &str, value: Value) -> Result<(), Error> {
        self.values.insert(key.to_string(), value);
        self.push()
    }

    fn push(&self) -> Result<(), Error> {
        let env = Envelope::set_settings(&self.action, &self.context, self.values.clone());
        self.outbound.try_send(env).map_err(|_| Error::ChannelClosed)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Decodes the cache into one of the typed per-action schemas.
    pub fn typed<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.values.clone()))
    }
}
