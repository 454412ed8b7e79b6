use common::{
    log_trace, log_warn,
    naming::{QUALIFIER_SIZE, QUALIFIER_VALUE, TypeTag, encode_name},
};

use crate::{
    abs::{Assumption, Comparison, ConcolicEngine},
    host::{
        ContentStorage, DictObject, HostInt, HostSize, ListObject, SizeWord, SizedObject,
        TupleObject, Value,
    },
};

use super::{SessionError, size::SizeConstraint};

/// Registers the storage of a single host value with the engine.
///
/// A converter is bound to the base name of the value; every buffer it tracks
/// is named after it.
pub(super) struct Converter<'a, E: ConcolicEngine> {
    engine: &'a mut E,
    name: &'a str,
    max_symbolic_size: HostSize,
}

impl<'a, E: ConcolicEngine> Converter<'a, E> {
    pub(super) fn new(engine: &'a mut E, name: &'a str, max_symbolic_size: HostSize) -> Self {
        Self {
            engine,
            name,
            max_symbolic_size,
        }
    }

    /// # Remarks
    /// The range is enabled only if `max >= min`.
    pub(super) fn int(
        &mut self,
        value: HostInt,
        max: HostInt,
        min: HostInt,
    ) -> Result<HostInt, SessionError> {
        let ranged = max >= min;
        if ranged && !(min..=max).contains(&value) {
            return Err(SessionError::RangeViolation {
                subject: "value",
                value: value as i64,
                min: min as i64,
                max: Some(max as i64),
            });
        }

        let name = encode_name(self.name, QUALIFIER_VALUE, TypeTag::Int)?;
        let mut bytes = value.to_ne_bytes();
        self.engine.make_concolic(&mut bytes, &name);
        let value = HostInt::from_ne_bytes(bytes);

        if ranged {
            self.engine
                .assume_range(value as i64, min as i64, max as i64);
        }
        Ok(value)
    }

    pub(super) fn sequence(
        &mut self,
        value: &mut Value,
        constraint: SizeConstraint,
    ) -> Result<(), SessionError> {
        match value {
            Value::None => Err(SessionError::NullValue),
            Value::Str(obj) => {
                *obj = self.content(obj, constraint, TypeTag::Str)?;
                Ok(())
            }
            Value::Unicode(obj) => {
                *obj = self.content(obj, constraint, TypeTag::Unicode)?;
                Ok(())
            }
            Value::List(obj) => self.list(obj, constraint),
            Value::Dict(obj) => self.structure::<DictObject>(obj),
            Value::Tuple(obj) => self.structure::<TupleObject>(obj),
            other => Err(SessionError::UnsupportedType { kind: other.kind() }),
        }
    }

    /// Copies the content of the object into a tracked buffer and builds a new
    /// object over it. The size of the new object is tracked as well unless it
    /// is fixed.
    fn content<T: ContentStorage>(
        &mut self,
        obj: &T,
        constraint: SizeConstraint,
        tag: TypeTag,
    ) -> Result<T, SessionError> {
        constraint.check(obj.size_word().get())?;

        let value_name = encode_name(self.name, QUALIFIER_VALUE, tag)?;
        let size_name = self.size_name(constraint)?;

        let requested = obj.unit_count().saturating_mul(T::UNIT_WIDTH);
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(requested)
            .map_err(|_| SessionError::OutOfMemory { requested })?;
        obj.copy_raw_bytes(&mut buffer);

        self.engine.make_concolic(&mut buffer, &value_name);
        let mut result = T::with_new_storage(buffer);

        if let Some(size_name) = size_name {
            let size = self.track_size_word(&mut result, &size_name);
            constraint.constrain(&mut *self.engine, size);
        }
        Ok(result)
    }

    /// Only the number of elements becomes symbolic; the elements themselves
    /// are left as they are.
    fn list(&mut self, obj: &mut ListObject, constraint: SizeConstraint) -> Result<(), SessionError> {
        constraint.check(obj.size_word().get())?;

        if let Some(size_name) = self.size_name(constraint)? {
            let size = self.track_size_word(obj, &size_name);
            constraint.constrain(&mut *self.engine, size);
        }
        Ok(())
    }

    fn structure<T: SizedObject>(&mut self, obj: &mut T) -> Result<(), SessionError> {
        let size_name = encode_name(self.name, QUALIFIER_SIZE, TypeTag::SizeWord)?;
        let count = self.track_size_word(obj, &size_name);

        if count >= self.max_symbolic_size {
            log_warn!(
                "The element count of `{}` ({}) is beyond the symbolic size limit {}",
                self.name,
                count,
                self.max_symbolic_size
            );
        }
        let count = count as i64;
        self.engine.assume(Assumption::new(count, Comparison::Ge, 0));
        self.engine.assume(Assumption::new(
            count,
            Comparison::Lt,
            self.max_symbolic_size as i64,
        ));
        Ok(())
    }

    fn size_name(&self, constraint: SizeConstraint) -> Result<Option<String>, SessionError> {
        constraint
            .is_tracked()
            .then(|| encode_name(self.name, QUALIFIER_SIZE, TypeTag::SizeWord))
            .transpose()
            .map_err(Into::into)
    }

    /// Tracks the size word of the object in place and returns the value read
    /// back from it.
    fn track_size_word<T: SizedObject>(&mut self, obj: &mut T, name: &str) -> HostSize {
        let mut bytes = obj.size_word().to_ne_bytes();
        self.engine.make_concolic(&mut bytes, name);
        *obj.size_word_mut() = SizeWord::from_ne_bytes(bytes);
        log_trace!("Tracked the size word of `{}`", self.name);
        obj.size_word().get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::backends::{EngineEvent, RecordingEngine};

    fn names(engine: &RecordingEngine) -> Vec<&str> {
        engine.tracked().map(|(name, _)| name).collect()
    }

    #[test]
    fn test_int_without_range() {
        let mut engine = RecordingEngine::new();
        let result = Converter::new(&mut engine, "x", 1000).int(42, -1, 0);
        assert_eq!(result, Ok(42));
        assert_eq!(names(&engine), vec!["x.i#value"]);
        assert_eq!(engine.assumptions().count(), 0);
    }

    #[test]
    fn test_int_out_of_range() {
        let mut engine = RecordingEngine::new();
        let result = Converter::new(&mut engine, "x", 1000).int(11, 10, 0);
        assert!(matches!(
            result,
            Err(SessionError::RangeViolation { value: 11, min: 0, max: Some(10), .. })
        ));
        assert_eq!(engine.event_count(), 0);
    }

    #[test]
    fn test_int_replayed() {
        let mut engine = RecordingEngine::new().with_replay("x.i#value", 7i32.to_ne_bytes());
        let result = Converter::new(&mut engine, "x", 1000).int(5, 10, 0);
        assert_eq!(result, Ok(7));
        assert_eq!(
            engine.assumptions().copied().collect::<Vec<_>>(),
            vec![
                Assumption::new(7, Comparison::Ge, 0),
                Assumption::new(7, Comparison::Le, 10),
            ]
        );
    }

    #[test]
    fn test_fixed_size_string() {
        let mut engine = RecordingEngine::new();
        let mut value = Value::str("abc");
        let constraint = SizeConstraint::new(-1, 0).unwrap();
        Converter::new(&mut engine, "s", 1000)
            .sequence(&mut value, constraint)
            .unwrap();

        assert_eq!(value, Value::str("abc"));
        assert_eq!(engine.events(), &[EngineEvent::Tracked {
            name: "s.s#value".to_owned(),
            bytes: b"abc".to_vec(),
        }]);
    }

    #[test]
    fn test_replayed_string_is_rebuilt() {
        let mut engine = RecordingEngine::new().with_replay("s.s#value", *b"xyz");
        let mut value = Value::str("abc");
        let constraint = SizeConstraint::new(5, 1).unwrap();
        Converter::new(&mut engine, "s", 1000)
            .sequence(&mut value, constraint)
            .unwrap();

        assert_eq!(value, Value::str("xyz"));
        assert_eq!(names(&engine), vec!["s.s#value", "s.l#size"]);
    }

    #[test]
    fn test_structure_ignores_bounds() {
        let mut engine = RecordingEngine::new();
        let mut value = Value::tuple(vec![Value::None; 3]);
        let constraint = SizeConstraint::new(1, 0).unwrap();
        Converter::new(&mut engine, "t", 50)
            .sequence(&mut value, constraint)
            .unwrap();

        assert_eq!(names(&engine), vec!["t.l#size"]);
        assert_eq!(
            engine.assumptions().copied().collect::<Vec<_>>(),
            vec![
                Assumption::new(3, Comparison::Ge, 0),
                Assumption::new(3, Comparison::Lt, 50),
            ]
        );
    }

    /// Claims a content too large to be allocated.
    struct Oversized {
        size: SizeWord,
    }

    impl SizedObject for Oversized {
        fn size_word(&self) -> SizeWord {
            self.size
        }

        fn size_word_mut(&mut self) -> &mut SizeWord {
            &mut self.size
        }
    }

    impl ContentStorage for Oversized {
        const UNIT_WIDTH: usize = 1;

        fn unit_count(&self) -> usize {
            isize::MAX as usize - 10
        }

        fn copy_raw_bytes(&self, _buffer: &mut Vec<u8>) {
            unreachable!("the content is never allocated")
        }

        fn with_new_storage(_buffer: Vec<u8>) -> Self {
            unreachable!("the content is never allocated")
        }
    }

    #[test]
    fn test_allocation_failure() {
        let mut engine = RecordingEngine::new();
        let obj = Oversized {
            size: SizeWord::of_len(isize::MAX as usize - 10),
        };
        let constraint = SizeConstraint::new(-1, 0).unwrap();
        let result = Converter::new(&mut engine, "big", 1000).content(&obj, constraint, TypeTag::Str);

        assert!(matches!(
            result,
            Err(SessionError::OutOfMemory { requested }) if requested == isize::MAX as usize - 10
        ));
        assert_eq!(engine.event_count(), 0);
    }

    #[test]
    fn test_long_name_leaves_no_trace() {
        let mut engine = RecordingEngine::new();
        let name = "n".repeat(250);
        let mut value = Value::str("abc");
        let constraint = SizeConstraint::new(5, 0).unwrap();
        let result = Converter::new(&mut engine, &name, 1000).sequence(&mut value, constraint);

        assert!(matches!(result, Err(SessionError::Name(_))));
        assert_eq!(engine.event_count(), 0);
        assert_eq!(value, Value::str("abc"));
    }
}
