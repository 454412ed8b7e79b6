//! The marshaling entry points.

mod config;
mod convert;
mod error;
pub mod size;

use std::sync::Once;

use common::{log_debug, log_info, log_warn};

use crate::{
    abs::ConcolicEngine,
    backends::DEFAULT_MAX_SYMBOLIC_SIZE,
    host::{HostInt, HostSize, Value},
};

use convert::Converter;
use size::SizeConstraint;

pub use config::SessionConfig;
pub use error::{FailureKind, SessionError};

pub(crate) const ENV_PREFIX: &str = "MARSH";

static INIT: Once = Once::new();

/// Makes host values symbolic by registering their storage with the engine.
///
/// The session keeps no state between calls other than the bound for the
/// element count of structures, which is fixed at construction.
pub struct ConcolicSession<E: ConcolicEngine> {
    engine: E,
    max_symbolic_size: HostSize,
    in_atomic: bool,
}

impl<E: ConcolicEngine> ConcolicSession<E> {
    pub fn new(engine: E, config: SessionConfig) -> Self {
        let max_symbolic_size =
            resolve_max_symbolic_size(config.max_symbolic_size, engine.configured_max_size());
        log_debug!(
            "Creating a concolic session with max symbolic size {}",
            max_symbolic_size
        );
        Self {
            engine,
            max_symbolic_size,
            in_atomic: false,
        }
    }

    /// Creates a session configured from the environment.
    /// The logging of the library is initialized on the first call.
    pub fn from_env(engine: E) -> Result<Self, ::config::ConfigError> {
        INIT.call_once(crate::init);
        let config = SessionConfig::load()?;
        Ok(Self::new(engine, config))
    }

    #[inline]
    pub fn max_symbolic_size(&self) -> HostSize {
        self.max_symbolic_size
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Makes the integer symbolic under `name` and returns the value to
    /// continue with.
    ///
    /// The value is constrained to `[min, max]` only if `max >= min`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn make_symbolic_int(
        &mut self,
        value: HostInt,
        name: &str,
        max: HostInt,
        min: HostInt,
    ) -> Result<HostInt, SessionError> {
        self.ensure_active()?;
        Converter::new(&mut self.engine, name, self.max_symbolic_size).int(value, max, min)
    }

    /// Makes the sequence symbolic under `name`. On success, `value` is
    /// replaced with the object built over the tracked buffer; it is left
    /// untouched otherwise.
    ///
    /// # Remarks
    /// `max` selects the size policy: negative for a fixed size, zero for a
    /// size of at least `min`, positive for a size in `[min, max]`.
    /// Lists only get their length tracked, and the bounds are ignored for
    /// dictionaries and tuples, whose element count is kept below
    /// [`max_symbolic_size`](Self::max_symbolic_size).
    #[tracing::instrument(level = "debug", skip(self, value), fields(kind = %value.kind()))]
    pub fn make_symbolic_sequence(
        &mut self,
        value: &mut Value,
        name: &str,
        max: HostSize,
        min: HostSize,
    ) -> Result<(), SessionError> {
        self.ensure_active()?;
        let constraint = SizeConstraint::new(max, min)?;
        Converter::new(&mut self.engine, name, self.max_symbolic_size).sequence(value, constraint)
    }

    /// Runs `f` with the engine in an atomic region.
    /// Nested regions are merged into the outermost one.
    pub fn in_atomic_region<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        if self.in_atomic {
            return f(self);
        }

        self.engine.begin_atomic();
        self.in_atomic = true;
        let mut region = AtomicRegion { session: self };
        let result = f(&mut *region.session);
        drop(region);
        result
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.engine.is_active() {
            Ok(())
        } else {
            log_info!("Ignoring the request as the engine is not active");
            Err(SessionError::EngineInactive)
        }
    }
}

/// Leaves the atomic region of the session when dropped, unwinding included.
struct AtomicRegion<'a, E: ConcolicEngine> {
    session: &'a mut ConcolicSession<E>,
}

impl<E: ConcolicEngine> Drop for AtomicRegion<'_, E> {
    fn drop(&mut self) {
        self.session.in_atomic = false;
        self.session.engine.end_atomic();
    }
}

/// Picks the first positive bound among the configured one and the engine's.
fn resolve_max_symbolic_size(configured: Option<HostSize>, engine: HostSize) -> HostSize {
    for size in configured.into_iter().chain([engine]) {
        if size > 0 {
            return size;
        }
        log_warn!("Ignoring the non-positive max symbolic size {}", size);
    }
    DEFAULT_MAX_SYMBOLIC_SIZE
}
