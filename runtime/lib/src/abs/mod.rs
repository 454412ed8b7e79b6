//! The interface expected from the symbolic execution engine.

use derive_more as dm;

use crate::host::HostSize;

/// The operations of the engine the marshaling relies on.
///
/// Engines are synchronous and non-reentrant from the point of view of this
/// crate; each call either completes or has no effect.
pub trait ConcolicEngine {
    /// Whether the program is executing under the engine.
    fn is_active(&self) -> bool;

    /// Marks the buffer as concolic, i.e., symbolic with its current content
    /// kept as the concrete value.
    /// The engine may update the content of the buffer, which callers read back.
    fn make_concolic(&mut self, buffer: &mut [u8], name: &str);

    /// Adds the assumption to the current state.
    fn assume(&mut self, assumption: Assumption);

    /// Constrains `value` to the inclusive range `[lower, upper]`.
    fn assume_range(&mut self, value: i64, lower: i64, upper: i64) {
        self.assume(Assumption::new(value, Comparison::Ge, lower));
        self.assume(Assumption::new(value, Comparison::Le, upper));
    }

    /// The upper bound (exclusive) used for the size of structures whose size
    /// is made symbolic without explicit bounds.
    fn configured_max_size(&self) -> HostSize;

    /// Prevents the engine from interleaving other states until [`end_atomic`].
    ///
    /// [`end_atomic`]: ConcolicEngine::end_atomic
    fn begin_atomic(&mut self) {}

    fn end_atomic(&mut self) {}
}

impl<E: ConcolicEngine + ?Sized> ConcolicEngine for &mut E {
    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn make_concolic(&mut self, buffer: &mut [u8], name: &str) {
        (**self).make_concolic(buffer, name)
    }

    fn assume(&mut self, assumption: Assumption) {
        (**self).assume(assumption)
    }

    fn assume_range(&mut self, value: i64, lower: i64, upper: i64) {
        (**self).assume_range(value, lower, upper)
    }

    fn configured_max_size(&self) -> HostSize {
        (**self).configured_max_size()
    }

    fn begin_atomic(&mut self) {
        (**self).begin_atomic()
    }

    fn end_atomic(&mut self) {
        (**self).end_atomic()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, dm::Display)]
pub enum Comparison {
    #[display(">=")]
    Ge,
    #[display("<=")]
    Le,
    #[display("<")]
    Lt,
}

/// A comparison between a value read from a tracked buffer and a bound.
///
/// Under the engine, `value` carries the symbolic expression of the buffer it
/// is read from; [`holds`](Assumption::holds) is its concrete evaluation,
/// which is what a hypercall-based engine receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, dm::Display)]
#[display("{value} {op} {bound}")]
pub struct Assumption {
    pub value: i64,
    pub op: Comparison,
    pub bound: i64,
}

impl Assumption {
    pub const fn new(value: i64, op: Comparison, bound: i64) -> Self {
        Self { value, op, bound }
    }

    pub fn holds(&self) -> bool {
        match self.op {
            Comparison::Ge => self.value >= self.bound,
            Comparison::Le => self.value <= self.bound,
            Comparison::Lt => self.value < self.bound,
        }
    }
}
