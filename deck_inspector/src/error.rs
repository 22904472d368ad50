use thiserror::Error;

/// Inspector-side failures. Channel loss is deliberately absent: it is a
/// reset, not an error (required dependencies re-block and the UI waits).
#[derive(Debug, Error)]
pub enum Error {
    /// A remote event arrived without the payload it is defined to carry.
    /// Failing loudly here beats silently keeping stale state that no longer
    /// matches the remote application.
    #[error("event `{event}` arrived without the expected payload")]
    MissingParameters { event: String },

    /// The settings payload was present but not a JSON object.
    #[error("settings payload for `{event}` is not an object")]
    MalformedSettings { event: String },

    /// The outbound queue to the channel actor is gone.
    #[error("channel outbound queue closed")]
    ChannelClosed,
}

/// Outcome of a promise-wrapped remote call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The remote application answered with an error payload.
    #[error("remote call failed: {0}")]
    Remote(String),

    /// The channel closed while the call was in flight; the call rejects
    /// promptly instead of staying pending forever.
    #[error("channel closed before the call completed")]
    ChannelClosed,

    /// A newer call was issued under the same id.
    #[error("superseded by a newer call with the same id")]
    Superseded,
}
