use core::error::Error;

use derive_more as dm;

use common::naming::NameError;

use crate::host::ValueKind;

#[derive(Debug, Clone, PartialEq, Eq, dm::Display)]
pub enum SessionError {
    #[display("Not in symbolic mode")]
    EngineInactive,
    #[display("Incompatible {subject} constraints: {value} is out of [{min}, {}", upper_bound(max))]
    RangeViolation {
        subject: &'static str,
        value: i64,
        min: i64,
        /// Absent when the range has no upper end.
        max: Option<i64>,
    },
    #[display("Minimum size cannot be negative: {min}")]
    InvalidSize { min: i64 },
    #[display("Cannot make a none value symbolic")]
    NullValue,
    #[display("Unsupported type: {kind}")]
    UnsupportedType { kind: ValueKind },
    #[display("Failed to allocate {requested} bytes for the concolic buffer")]
    OutOfMemory { requested: usize },
    #[display("{_0}")]
    Name(NameError),
}

/// The kinds of failures the host distinguishes when signaling errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, dm::Display)]
pub enum FailureKind {
    RuntimeFailure,
    ValueRangeFailure,
    TypeFailure,
    OutOfMemory,
}

fn upper_bound(max: &Option<i64>) -> String {
    match max {
        Some(max) => format!("{max}]"),
        None => "+inf)".to_owned(),
    }
}

impl SessionError {
    pub fn kind(&self) -> FailureKind {
        use SessionError::*;
        match self {
            EngineInactive | Name(_) => FailureKind::RuntimeFailure,
            RangeViolation { .. } | InvalidSize { .. } | NullValue => {
                FailureKind::ValueRangeFailure
            }
            UnsupportedType { .. } => FailureKind::TypeFailure,
            OutOfMemory { .. } => FailureKind::OutOfMemory,
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Name(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NameError> for SessionError {
    fn from(value: NameError) -> Self {
        Self::Name(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_violation_message() {
        let bounded = SessionError::RangeViolation {
            subject: "size",
            value: 10,
            min: 1,
            max: Some(5),
        };
        assert_eq!(
            bounded.to_string(),
            "Incompatible size constraints: 10 is out of [1, 5]"
        );

        let unbounded = SessionError::RangeViolation {
            subject: "size",
            value: 3,
            min: 5,
            max: None,
        };
        assert_eq!(
            unbounded.to_string(),
            "Incompatible size constraints: 3 is out of [5, +inf)"
        );
    }
}
