//! Marshaling of host values into concolic buffers tracked by an external
//! symbolic execution engine.
//!
//! The entry point is [`ConcolicSession`], which takes a value of the
//! [host](host) model, registers its storage with a [`ConcolicEngine`] and
//! hands back the value to continue the execution with. The answers the engine
//! later finds for the registered buffers are decoded by
//! [`common::answers::AssignmentTree`].

pub mod abs;
pub mod backends;
pub mod host;
pub mod session;
pub(crate) mod utils;

pub use abs::{Assumption, Comparison, ConcolicEngine};
pub use session::{ConcolicSession, FailureKind, SessionConfig, SessionError};

use common::log_info;

fn init() {
    utils::logging::init_logging();
    log_info!("Initializing marshaling runtime");
}
