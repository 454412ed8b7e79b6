use crate::{
    abs::{Assumption, ConcolicEngine},
    host::HostSize,
};

use super::DEFAULT_MAX_SYMBOLIC_SIZE;

/// The engine of an uninstrumented execution: never active, and every request
/// is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEngine;

impl ConcolicEngine for NoopEngine {
    #[inline(always)]
    fn is_active(&self) -> bool {
        false
    }

    #[inline(always)]
    fn make_concolic(&mut self, _buffer: &mut [u8], _name: &str) {}

    #[inline(always)]
    fn assume(&mut self, _assumption: Assumption) {}

    #[inline(always)]
    fn configured_max_size(&self) -> HostSize {
        DEFAULT_MAX_SYMBOLIC_SIZE
    }
}
