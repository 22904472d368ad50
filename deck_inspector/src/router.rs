use deck_protocol::Envelope;
use std::collections::HashMap;

type Handler = Box<dyn FnMut(&Envelope) + Send>;

/// Fan-out of inbound envelopes to named handlers. Multiple handlers per
/// event are allowed and all run, in registration order; dispatch happens on
/// the single owning task, in arrival order, with no coalescing.
#[derive(Default)]
pub struct EventRouter {
    handlers: HashMap<String, Vec<Handler>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, event: &str, handler: F)
    where
        F: FnMut(&Envelope) + Send + 'static,
    {
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push(Box::new(handler));
    }

    /// Runs every handler registered for the envelope's event; returns how
    /// many ran. Events nobody listens for are dropped silently.
    pub fn dispatch(&mut self, env: &Envelope) -> usize {
        match self.handlers.get_mut(&env.event) {
            Some(list) => {
                for handler in list.iter_mut() {
                    handler(env);
                }
                list.len()
            }
            None => 0,
        }
    }
}
