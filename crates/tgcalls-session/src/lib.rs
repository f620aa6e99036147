//! `CallManager` and the actor infrastructure it runs on (§4.4, §4.5, §5).

mod collaborators;
mod executor;
mod manager;
mod state;
mod thread_bound;

pub use collaborators::{CallObserver, MediaBridge, Transport};
pub use executor::Executor;
pub use manager::{CallManager, CallManagerConfig};
pub use state::{CallState, VideoEvent, VideoState, VideoTransition};
pub use thread_bound::ThreadBoundObject;
