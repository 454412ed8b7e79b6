use std::collections::HashMap;

use delegate::delegate;
use derive_more as dm;

use common::{log_debug, log_trace, log_warn};

use crate::{
    abs::{Assumption, ConcolicEngine},
    host::HostSize,
};

use super::DEFAULT_MAX_SYMBOLIC_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, dm::Display)]
pub enum EngineEvent {
    #[display("track `{name}` ({} bytes)", bytes.len())]
    Tracked { name: String, bytes: Vec<u8> },
    #[display("assume {_0}")]
    Assumed(Assumption),
    #[display("begin atomic")]
    AtomicBegin,
    #[display("end atomic")]
    AtomicEnd,
}

/// An in-process engine that keeps a log of the requests it receives.
///
/// It can also replay previously found answers: when a buffer is marked under
/// a name with a registered replay, its content is replaced with the replayed
/// bytes, as the engine does when it runs a state with a new input.
#[derive(Debug, Clone)]
pub struct RecordingEngine {
    active: bool,
    max_size: HostSize,
    events: Vec<EngineEvent>,
    replays: HashMap<String, Vec<u8>>,
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            active: true,
            max_size: DEFAULT_MAX_SYMBOLIC_SIZE,
            events: Vec::new(),
            replays: HashMap::new(),
        }
    }

    pub fn inactive() -> Self {
        Self {
            active: false,
            ..Self::new()
        }
    }

    pub fn with_max_size(mut self, max_size: HostSize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_replay(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.replays.insert(name.into(), bytes.into());
        self
    }

    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        core::mem::take(&mut self.events)
    }

    delegate! {
        to self.events {
            #[call(len)]
            pub fn event_count(&self) -> usize;
        }
    }

    /// The names and the contents of the tracked buffers, in order.
    pub fn tracked(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.events.iter().filter_map(|e| match e {
            EngineEvent::Tracked { name, bytes } => Some((name.as_str(), bytes.as_slice())),
            _ => None,
        })
    }

    pub fn assumptions(&self) -> impl Iterator<Item = &Assumption> {
        self.events.iter().filter_map(|e| match e {
            EngineEvent::Assumed(assumption) => Some(assumption),
            _ => None,
        })
    }
}

impl ConcolicEngine for RecordingEngine {
    fn is_active(&self) -> bool {
        self.active
    }

    fn make_concolic(&mut self, buffer: &mut [u8], name: &str) {
        if let Some(replay) = self.replays.get(name) {
            if replay.len() == buffer.len() {
                log_debug!("Replaying the content of `{}`", name);
                buffer.copy_from_slice(replay);
            } else {
                log_warn!(
                    "Ignoring the replay for `{}` with {} bytes for a buffer of {} bytes",
                    name,
                    replay.len(),
                    buffer.len()
                );
            }
        }

        let event = EngineEvent::Tracked {
            name: name.to_owned(),
            bytes: buffer.to_vec(),
        };
        log_trace!("Engine event: {}", event);
        self.events.push(event);
    }

    fn assume(&mut self, assumption: Assumption) {
        if !assumption.holds() {
            log_warn!("Assumption does not hold concretely: {}", assumption);
        }
        let event = EngineEvent::Assumed(assumption);
        log_trace!("Engine event: {}", event);
        self.events.push(event);
    }

    fn configured_max_size(&self) -> HostSize {
        self.max_size
    }

    fn begin_atomic(&mut self) {
        self.events.push(EngineEvent::AtomicBegin);
    }

    fn end_atomic(&mut self) {
        self.events.push(EngineEvent::AtomicEnd);
    }
}
