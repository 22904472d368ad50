pub mod calls;
pub mod channel;
pub mod dependency;
pub mod discovery;
pub mod error;
pub mod inspector;
pub mod readiness;
pub mod router;
pub mod settings;
pub mod util;

pub use calls::CallRegistry;
pub use channel::{ChannelConfig, ChannelHandle};
pub use dependency::{DependencyToken, DependencyTracker};
pub use discovery::DiscoveryCache;
pub use error::{CallError, Error};
pub use inspector::Inspector;
pub use readiness::{evaluate, Readiness};
pub use router::EventRouter;
pub use settings::SettingsMirror;
