mod noop;
mod recording;

pub use noop::NoopEngine;
pub use recording::{EngineEvent, RecordingEngine};

use crate::host::HostSize;

/// The bound on the size of structures used when nothing else is configured.
pub const DEFAULT_MAX_SYMBOLIC_SIZE: HostSize = 1000;
