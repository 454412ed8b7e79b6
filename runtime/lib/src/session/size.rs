use core::cmp::Ordering;

use common::log_trace;

use crate::{
    abs::{Assumption, Comparison, ConcolicEngine},
    host::HostSize,
};

use super::SessionError;

/// The bounds requested for the size of an object.
///
/// Built from a `(max, min)` pair with the sentinel semantics of `max`:
/// - negative: the object has a fixed size, its size is not made symbolic,
/// - zero: only the lower bound applies,
/// - positive: the size is in the inclusive range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeConstraint {
    Fixed,
    AtLeast { min: HostSize },
    Within { min: HostSize, max: HostSize },
}

impl SizeConstraint {
    /// # Remarks
    /// Inverted ranges are accepted as is; no size satisfies them.
    pub fn new(max: HostSize, min: HostSize) -> Result<Self, SessionError> {
        if min < 0 {
            return Err(SessionError::InvalidSize { min: min as i64 });
        }

        Ok(match max.cmp(&0) {
            Ordering::Less => Self::Fixed,
            Ordering::Equal => Self::AtLeast { min },
            Ordering::Greater => Self::Within { min, max },
        })
    }

    /// Whether the size gets its own symbolic variable.
    pub fn is_tracked(&self) -> bool {
        !matches!(self, Self::Fixed)
    }

    pub fn check(&self, size: HostSize) -> Result<(), SessionError> {
        let (satisfied, min, max) = match *self {
            Self::Fixed => return Ok(()),
            Self::AtLeast { min } => (size >= min, min, None),
            Self::Within { min, max } => ((min..=max).contains(&size), min, Some(max as i64)),
        };

        if satisfied {
            Ok(())
        } else {
            Err(SessionError::RangeViolation {
                subject: "size",
                value: size as i64,
                min: min as i64,
                max,
            })
        }
    }

    /// Adds the assumptions matching the bounds for a size read from a tracked
    /// buffer.
    pub fn constrain(&self, engine: &mut impl ConcolicEngine, size: HostSize) {
        let size = size as i64;
        let at_least = |min: HostSize| Assumption::new(size, Comparison::Ge, min as i64);
        match *self {
            Self::Fixed => return,
            Self::AtLeast { min } => engine.assume(at_least(min)),
            Self::Within { min, max } => {
                engine.assume(Assumption::new(size, Comparison::Le, max as i64));
                engine.assume(at_least(min));
            }
        }
        log_trace!("Constrained size {} by {:?}", size, self);
    }
}
