use crate::calls::CallRegistry;
use crate::dependency::DependencyTracker;
use crate::error::{CallError, Error};
use crate::readiness::{evaluate, Readiness};
use crate::settings::SettingsMirror;
use deck_protocol::{Envelope, EVENT_CLOSE, EVENT_OPEN, EVENT_SETTINGS};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

/// One settings panel bound to one placed action instance.
///
/// Owns its tracker, settings mirror and call registry exclusively; nothing
/// is shared across instances and there is no module-level state. The caller
/// constructs one per host context and feeds it every inbound envelope.
pub struct Inspector {
    context: String,
    tracker: DependencyTracker,
    required: Vec<String>,
    mirror: SettingsMirror,
    calls: CallRegistry,
}

impl Inspector {
    /// `required` is the waiting-message checklist, in the order the messages
    /// should be reported. The open and settings dependencies are almost
    /// always in it, first.
    pub fn new(
        action: &str,
        context: &str,
        required: &[&str],
        outbound: mpsc::Sender<Envelope>,
    ) -> Self {
        let mut tracker = DependencyTracker::new();
        for name in required {
            tracker.register(name);
        }
        Self {
            context: context.to_string(),
            tracker,
            required: required.iter().map(|n| n.to_string()).collect(),
            mirror: SettingsMirror::new(action, context, outbound),
            calls: CallRegistry::new(),
        }
    }

    /// Registers a dependency that is tolerated absent ("don't block").
    pub fn register_non_blocking(&mut self, name: &str) {
        self.tracker.register_non_blocking(name);
    }

    /// Routes one inbound envelope, then reports the resulting UI state.
    ///
    /// Open satisfies the connection dependency; close is a reset, not an
    /// error: required dependencies re-block and in-flight calls reject.
    /// Settings feed the mirror; any other `rpc.*` event satisfies its
    /// dependency and resolves a pending call under the same name.
    pub fn handle_event(&mut self, env: &Envelope) -> Result<Readiness, Error> {
        if env.context.as_deref().is_some_and(|c| c != self.context) {
            return Ok(self.readiness());
        }

        match env.event.as_str() {
            EVENT_OPEN => self.tracker.mark_satisfied(EVENT_OPEN),
            EVENT_CLOSE => {
                self.tracker.reset();
                self.calls.abort_all();
            }
            EVENT_SETTINGS => {
                self.mirror.on_remote_settings(env.parameters())?;
                self.tracker.mark_satisfied(EVENT_SETTINGS);
            }
            name if env.is_resource() => {
                self.tracker.mark_satisfied(name);
                let payload = env.parameters().cloned().unwrap_or(Value::Null);
                self.calls.complete(name, Ok(payload));
            }
            _ => {}
        }

        Ok(self.readiness())
    }

    /// Top-level guard: same routing, but a settings error is logged and the
    /// panel stays in its current state instead of tearing anything down.
    pub fn handle_event_logged(&mut self, env: &Envelope) -> Readiness {
        match self.handle_event(env) {
            Ok(state) => state,
            Err(err) => {
                tracing::error!(context = %self.context, event = %env.event, %err, "event handling failed");
                self.readiness()
            }
        }
    }

    pub fn readiness(&self) -> Readiness {
        let order: Vec<&str> = self.required.iter().map(String::as_str).collect();
        evaluate(&self.tracker, &order)
    }

    /// Starts a remote call whose reply arrives as the `id` resource event.
    pub fn begin_call(&mut self, id: &str) -> oneshot::Receiver<Result<Value, CallError>> {
        self.calls.begin(id)
    }

    /// Surfaces a remote error payload to whoever awaits the call; state is
    /// left unchanged (the caller shows an alert, nothing retries).
    pub fn fail_call(&mut self, id: &str, message: &str) {
        self.calls.complete(id, Err(CallError::Remote(message.to_string())));
    }

    pub fn set_field(&mut self, key: &str, value: Value) -> Result<(), Error> {
        self.mirror.set_field(key, value)
    }

    pub fn settings(&self) -> &serde_json::Map<String, Value> {
        self.mirror.values()
    }

    pub fn typed_settings<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        self.mirror.typed()
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn is_satisfied(&self, name: &str) -> bool {
        self.tracker.is_satisfied(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inspector() -> (Inspector, mpsc::Receiver<Envelope>) {
        let (tx, rx) = mpsc::channel(8);
        (
            Inspector::new(
                "com.example.scene",
                "ctx-1",
                &[EVENT_OPEN, EVENT_SETTINGS],
                tx,
            ),
            rx,
        )
    }

    #[test]
    fn gates_until_checklist_complete_then_re_blocks_on_close() {
        let (mut inspector, _rx) = inspector();
        assert_eq!(
            inspector.readiness(),
            Readiness::Waiting {
                blocking: EVENT_OPEN.to_string()
            }
        );

        let state = inspector.handle_event(&Envelope::bare(EVENT_OPEN)).unwrap();
        assert_eq!(
            state,
            Readiness::Waiting {
                blocking: EVENT_SETTINGS.to_string()
            }
        );

        let settings = Envelope::with_payload(EVENT_SETTINGS, "ctx-1", json!({"scene": "Live"}));
        assert_eq!(inspector.handle_event(&settings).unwrap(), Readiness::Ready);
        assert_eq!(inspector.settings()["scene"], "Live");

        let state = inspector.handle_event(&Envelope::bare(EVENT_CLOSE)).unwrap();
        assert_eq!(
            state,
            Readiness::Waiting {
                blocking: EVENT_OPEN.to_string()
            }
        );
    }

    #[test]
    fn resource_events_satisfy_and_resolve_calls() {
        let (mut inspector, _rx) = inspector();
        inspector.register_non_blocking("rpc.sceneList");

        let reply = inspector.begin_call("rpc.sceneList");
        let env = Envelope::with_payload("rpc.sceneList", "ctx-1", json!(["Live", "BRB"]));
        inspector.handle_event(&env).unwrap();

        assert!(inspector.is_satisfied("rpc.sceneList"));
        assert_eq!(reply.blocking_recv().unwrap(), Ok(json!(["Live", "BRB"])));
    }

    #[test]
    fn close_rejects_in_flight_calls() {
        let (mut inspector, _rx) = inspector();
        let reply = inspector.begin_call("rpc.sceneList");
        inspector.handle_event(&Envelope::bare(EVENT_CLOSE)).unwrap();
        assert_eq!(
            reply.blocking_recv().unwrap(),
            Err(CallError::ChannelClosed)
        );
    }

    #[test]
    fn foreign_context_envelopes_are_ignored() {
        let (mut inspector, _rx) = inspector();
        inspector.handle_event(&Envelope::bare(EVENT_OPEN)).unwrap();

        let foreign = Envelope::with_payload(EVENT_SETTINGS, "ctx-2", json!({"scene": "Other"}));
        let state = inspector.handle_event(&foreign).unwrap();
        assert_eq!(
            state,
            Readiness::Waiting {
                blocking: EVENT_SETTINGS.to_string()
            }
        );
        assert!(inspector.settings().is_empty());
    }

    #[test]
    fn missing_settings_payload_is_loud_but_guard_keeps_state() {
        let (mut inspector, _rx) = inspector();
        inspector.handle_event(&Envelope::bare(EVENT_OPEN)).unwrap();

        let bad = Envelope::bare(EVENT_SETTINGS);
        assert!(matches!(
            inspector.handle_event(&bad),
            Err(Error::MissingParameters { .. })
        ));

        // The logged guard reports the unchanged waiting state.
        assert_eq!(
            inspector.handle_event_logged(&bad),
            Readiness::Waiting {
                blocking: EVENT_SETTINGS.to_string()
            }
        );
    }

    #[test]
    fn local_edit_pushes_full_object_once() {
        let (mut inspector, mut rx) = inspector();
        let settings = Envelope::with_payload(EVENT_SETTINGS, "ctx-1", json!({"color": "#ffffff"}));
        inspector.handle_event(&Envelope::bare(EVENT_OPEN)).unwrap();
        inspector.handle_event(&settings).unwrap();

        inspector.set_field("color", json!("#ff0000")).unwrap();
        let sent = rx.try_recv().unwrap();
        assert_eq!(sent.payload.unwrap(), json!({"color": "#ff0000"}));
        assert!(rx.try_recv().is_err());
    }
}
