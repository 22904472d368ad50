use crate::error::CallError;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::oneshot;

/// In-flight request/response pairs, correlated by a caller-supplied id
/// (usually the resource event name the reply will arrive under).
///
/// Channel close aborts every pending call with `CallError::ChannelClosed`
/// rather than leaving the future pending forever. Issuing a new call under
/// a pending id supersedes the old one.
#[derive(Debug, Default)]
pub struct CallRegistry {
    pending: HashMap<String, oneshot::Sender<Result<Value, CallError>>>,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a call; the returned receiver resolves when the reply arrives,
    /// the call is superseded, or the channel closes.
    pub fn begin(&mut self, id: &str) -> oneshot::Receiver<Result<Value, CallError>> {
        let (tx, rx) = oneshot::channel();
        if let Some(prev) = self.pending.insert(id.to_string(), tx) {
            let _ = prev.send(Err(CallError::Superseded));
        }
        rx
    }

    /// Resolves a pending call. Returns false when nothing was waiting under
    /// this id (an unsolicited reply, which is fine to ignore).
    pub fn complete(&mut self, id: &str, result: Result<Value, CallError>) -> bool {
        match self.pending.remove(id) {
            Some(tx) => tx.send(result).is_ok(),
            None => false,
        }
    }

    /// Rejects everything in flight; invoked on channel close.
    pub fn abort_all(&mut self) {
        for (_, tx) in self.pending.drain() {
            let _ = tx.send(Err(CallError::ChannelClosed));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn completes_with_reply_payload() {
        let mut calls = CallRegistry::new();
        let rx = calls.begin("rpc.sceneList");
        assert!(calls.complete("rpc.sceneList", Ok(json!(["a", "b"]))));
        assert_eq!(rx.await.unwrap(), Ok(json!(["a", "b"])));
        assert!(calls.is_empty());
    }

    #[tokio::test]
    async fn close_aborts_every_pending_call() {
        let mut calls = CallRegistry::new();
        let rx1 = calls.begin("rpc.sceneList");
        let rx2 = calls.begin("rpc.profileList");
        calls.abort_all();
        assert_eq!(rx1.await.unwrap(), Err(CallError::ChannelClosed));
        assert_eq!(rx2.await.unwrap(), Err(CallError::ChannelClosed));
    }

    #[tokio::test]
    async fn newer_call_supersedes_older() {
        let mut calls = CallRegistry::new();
        let old = calls.begin("rpc.sceneList");
        let new = calls.begin("rpc.sceneList");
        assert_eq!(old.await.unwrap(), Err(CallError::Superseded));
        assert!(calls.complete("rpc.sceneList", Ok(json!([]))));
        assert_eq!(new.await.unwrap(), Ok(json!([])));
    }

    #[test]
    fn unsolicited_reply_is_ignored() {
        let mut calls = CallRegistry::new();
        assert!(!calls.complete("rpc.sceneList", Ok(json!([]))));
    }
}
