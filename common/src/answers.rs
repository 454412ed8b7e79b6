//! Decoding of the answers found by the engine for the tracked buffers.
//!
//! The engine reports each symbolic variable as its full name and the raw
//! bytes of the buffer. The name carries enough information (see
//! [`crate::naming`]) to rebuild a typed value and to group the values of
//! the same object together, e.g., `arg.s#value` and `arg.l#size` both end up
//! under the key `arg`.

use core::{error::Error, mem::size_of};
use std::collections::{HashMap, hash_map};

use derive_more as dm;
use widestring::{WideChar, WideString};

use crate::{
    log_debug, log_trace,
    naming::{NameError, TypeTag, decode_name},
};

/// Outputs answers found for the symbolic values.
pub trait AnswersWriter {
    type Id;
    type Answer;
    type Output;
    type Error;

    fn write(
        &mut self,
        answers: impl ExactSizeIterator<Item = (Self::Id, Self::Answer)>,
    ) -> Result<Self::Output, Self::Error>;
}

const INT_WIDTH: usize = size_of::<i32>();
const SIZE_WORD_WIDTH: usize = size_of::<isize>();
pub const WIDE_CHAR_WIDTH: usize = size_of::<WideChar>();

/// A value rebuilt from the raw bytes of a tracked buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TypedValue {
    Integer(i32),
    SizeWord(isize),
    ByteString(Vec<u8>),
    WideString(
        #[cfg_attr(feature = "serde", serde(serialize_with = "serdes::serialize_wide"))]
        WideString,
    ),
    ByteArray(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, dm::Display)]
pub enum SizeRequirement {
    #[display("exactly {_0}")]
    Exactly(usize),
    #[display("a multiple of {_0}")]
    MultipleOf(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, dm::Display)]
pub enum DecodeError {
    #[display("{_0}")]
    Name(NameError),
    #[display("Invalid assignment type: `{_0}`")]
    UnknownTypeTag(char),
    #[display("Invalid content size for type `{tag}`: expected {required} bytes, got {actual}")]
    SizeMismatch {
        tag: TypeTag,
        required: SizeRequirement,
        actual: usize,
    },
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Name(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NameError> for DecodeError {
    fn from(value: NameError) -> Self {
        Self::Name(value)
    }
}

/// Rebuilds a typed value out of the raw bytes of a buffer.
/// Fixed-width types must match the width exactly; the bytes are never
/// reinterpreted with a different width.
pub fn convert_buffer_value(bytes: &[u8], tag: char) -> Result<TypedValue, DecodeError> {
    let tag = TypeTag::try_from(tag).map_err(DecodeError::UnknownTypeTag)?;
    let value = match tag {
        TypeTag::Int => TypedValue::Integer(i32::from_ne_bytes(exact::<INT_WIDTH>(bytes, tag)?)),
        TypeTag::SizeWord => {
            TypedValue::SizeWord(isize::from_ne_bytes(exact::<SIZE_WORD_WIDTH>(bytes, tag)?))
        }
        TypeTag::Str => TypedValue::ByteString(bytes.to_vec()),
        TypeTag::Unicode => {
            if bytes.len() % WIDE_CHAR_WIDTH != 0 {
                return Err(DecodeError::SizeMismatch {
                    tag,
                    required: SizeRequirement::MultipleOf(WIDE_CHAR_WIDTH),
                    actual: bytes.len(),
                });
            }
            let units = bytes
                .chunks_exact(WIDE_CHAR_WIDTH)
                .map(|unit| exact::<WIDE_CHAR_WIDTH>(unit, tag).map(WideChar::from_ne_bytes))
                .collect::<Result<Vec<_>, _>>()?;
            TypedValue::WideString(WideString::from_vec(units))
        }
        TypeTag::Bytes => TypedValue::ByteArray(bytes.to_vec()),
    };
    Ok(value)
}

fn exact<const N: usize>(bytes: &[u8], tag: TypeTag) -> Result<[u8; N], DecodeError> {
    <[u8; N]>::try_from(bytes).map_err(|_| DecodeError::SizeMismatch {
        tag,
        required: SizeRequirement::Exactly(N),
        actual: bytes.len(),
    })
}

type Fields = HashMap<String, TypedValue>;

/// The decoded answers, grouped by key and then by field.
///
/// The tree is meant to be fed incrementally, the last value decoded for a
/// `(key, field)` pair wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AssignmentTree {
    entries: HashMap<String, Fields>,
}

impl AssignmentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a single assignment into the tree.
    /// On failure, the tree is left untouched.
    pub fn decode(&mut self, name: &str, bytes: &[u8]) -> Result<(), DecodeError> {
        let decoded = decode_name(name)?;
        let value = convert_buffer_value(bytes, decoded.tag)?;
        log_trace!(
            key = decoded.key,
            field = decoded.field,
            "Decoded assignment: {:?}",
            value
        );

        self.entries
            .entry(decoded.key.to_owned())
            .or_default()
            .insert(decoded.field.to_owned(), value);
        Ok(())
    }

    pub fn get(&self, key: &str, field: &str) -> Option<&TypedValue> {
        self.entries.get(key).and_then(|fields| fields.get(field))
    }

    pub fn fields(&self, key: &str) -> Option<&HashMap<String, TypedValue>> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Fields> {
        self.entries.iter()
    }

    /// The number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a AssignmentTree {
    type Item = (&'a String, &'a Fields);
    type IntoIter = hash_map::Iter<'a, String, Fields>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Decodes a batch of answers into the tree.
/// # Remarks
/// The batch is not atomic: answers preceding a failing one stay in the tree.
impl AnswersWriter for AssignmentTree {
    type Id = String;
    type Answer = Vec<u8>;
    /// The number of decoded answers.
    type Output = usize;
    type Error = DecodeError;

    fn write(
        &mut self,
        answers: impl ExactSizeIterator<Item = (Self::Id, Self::Answer)>,
    ) -> Result<Self::Output, Self::Error> {
        let count = answers.len();
        log_debug!("Decoding {} answers", count);
        for (name, bytes) in answers {
            self.decode(&name, &bytes)?;
        }
        Ok(count)
    }
}

#[cfg(feature = "serde")]
mod serdes {
    use serde::Serializer;
    use widestring::WideString;

    pub(super) fn serialize_wide<S: Serializer>(
        value: &WideString,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide(text: &str) -> Vec<u8> {
        WideString::from_str(text)
            .as_slice()
            .iter()
            .flat_map(|c| c.to_ne_bytes())
            .collect()
    }

    #[test]
    fn test_convert_fixed_width() {
        assert_eq!(
            convert_buffer_value(&(-7_i32).to_ne_bytes(), 'i'),
            Ok(TypedValue::Integer(-7))
        );
        assert_eq!(
            convert_buffer_value(&42_isize.to_ne_bytes(), 'l'),
            Ok(TypedValue::SizeWord(42))
        );
    }

    #[test]
    fn test_convert_size_mismatch() {
        assert_eq!(
            convert_buffer_value(&[1, 2, 3], 'i'),
            Err(DecodeError::SizeMismatch {
                tag: TypeTag::Int,
                required: SizeRequirement::Exactly(4),
                actual: 3,
            })
        );
        assert!(matches!(
            convert_buffer_value(&[0; SIZE_WORD_WIDTH + 1], 'l'),
            Err(DecodeError::SizeMismatch {
                tag: TypeTag::SizeWord,
                ..
            })
        ));
        assert!(matches!(
            convert_buffer_value(&[0; WIDE_CHAR_WIDTH + 1], 'u'),
            Err(DecodeError::SizeMismatch {
                required: SizeRequirement::MultipleOf(WIDE_CHAR_WIDTH),
                ..
            })
        ));
    }

    #[test]
    fn test_convert_variable_width() {
        assert_eq!(
            convert_buffer_value(b"abc", 's'),
            Ok(TypedValue::ByteString(b"abc".to_vec()))
        );
        assert_eq!(
            convert_buffer_value(b"", 'b'),
            Ok(TypedValue::ByteArray(Vec::new()))
        );
        assert_eq!(
            convert_buffer_value(&wide("héllo"), 'u'),
            Ok(TypedValue::WideString(WideString::from_str("héllo")))
        );
    }

    #[test]
    fn test_convert_unknown_tag() {
        assert_eq!(
            convert_buffer_value(b"abc", 'z'),
            Err(DecodeError::UnknownTypeTag('z'))
        );
    }

    #[test]
    fn test_accumulation() {
        let mut tree = AssignmentTree::new();
        tree.decode("x.i#value", &5_i32.to_ne_bytes()).unwrap();
        tree.decode("x.l#size", &3_isize.to_ne_bytes()).unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get("x", "value"), Some(&TypedValue::Integer(5)));
        assert_eq!(tree.get("x", "size"), Some(&TypedValue::SizeWord(3)));
    }

    #[test]
    fn test_last_write_wins() {
        let mut tree = AssignmentTree::new();
        tree.decode("x.i#value", &5_i32.to_ne_bytes()).unwrap();
        tree.decode("x.i#value", &6_i32.to_ne_bytes()).unwrap();
        assert_eq!(tree.get("x", "value"), Some(&TypedValue::Integer(6)));
        assert_eq!(tree.fields("x").map(HashMap::len), Some(1));
    }

    #[test]
    fn test_untagged_names() {
        let mut tree = AssignmentTree::new();
        tree.decode("stdin", b"\x00\xff").unwrap();
        tree.decode("file.contents", b"data").unwrap();

        assert_eq!(
            tree.get("stdin", ""),
            Some(&TypedValue::ByteArray(vec![0, 0xff]))
        );
        assert_eq!(
            tree.get("file", "contents"),
            Some(&TypedValue::ByteArray(b"data".to_vec()))
        );
    }

    #[test]
    fn test_failure_leaves_tree_untouched() {
        let mut tree = AssignmentTree::new();
        assert!(matches!(
            tree.decode("x.i#", &[0; 4]),
            Err(DecodeError::Name(NameError::Malformed { .. }))
        ));
        assert!(tree.decode("x.i#value", &[0; 3]).is_err());
        assert!(tree.decode("x.q#value", &[0; 4]).is_err());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_write_batch() {
        let mut tree = AssignmentTree::new();
        let answers = vec![
            ("a.s#value".to_string(), b"hi".to_vec()),
            ("b.i#value".to_string(), 1_i32.to_ne_bytes().to_vec()),
        ];
        assert_eq!(tree.write(answers.into_iter()), Ok(2));
        assert_eq!(tree.keys().count(), 2);

        let failing = vec![
            ("c.s#value".to_string(), b"ok".to_vec()),
            ("d.i#value".to_string(), vec![0]),
        ];
        assert!(tree.write(failing.into_iter()).is_err());
        assert!(tree.get("c", "value").is_some());
        assert!(tree.fields("d").is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize() {
        let mut tree = AssignmentTree::new();
        tree.decode("x.i#value", &5_i32.to_ne_bytes()).unwrap();
        tree.decode("y.u#value", &wide("ab")).unwrap();

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["x"]["value"]["integer"], 5);
        assert_eq!(json["y"]["value"]["wide_string"], "ab");
    }
}
