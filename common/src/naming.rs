//! The naming convention for the buffers handed to the engine.
//!
//! Every tracked buffer is registered under a composite name of the form
//! `<base_path>.<tag>#<qualifier>`, where the tag tells the consumer of the
//! engine's answers how to reinterpret the raw bytes of the buffer.

use core::{error::Error, fmt};

use derive_more as dm;

/// The size of the identifier buffer on the engine side.
/// Names are passed NUL-terminated, so one byte is reserved for the terminator.
pub const NAME_LIMIT: usize = 256;

const SEPARATOR: char = '.';
const TAG_MARKER: u8 = b'#';

pub const QUALIFIER_VALUE: &str = "value";
pub const QUALIFIER_SIZE: &str = "size";

/// Identifies how the bytes of a tracked buffer are turned back into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, dm::Display)]
pub enum TypeTag {
    /// A 32-bit integer.
    #[display("i")]
    Int,
    /// A platform-sized signed word holding the size of an object.
    #[display("l")]
    SizeWord,
    /// An immutable byte string.
    #[display("s")]
    Str,
    /// A string of platform wide characters.
    #[display("u")]
    Unicode,
    /// A raw byte array. Untagged names fall back to this.
    #[display("b")]
    Bytes,
}

impl TypeTag {
    pub const DEFAULT: Self = Self::Bytes;

    pub const fn as_char(self) -> char {
        match self {
            Self::Int => 'i',
            Self::SizeWord => 'l',
            Self::Str => 's',
            Self::Unicode => 'u',
            Self::Bytes => 'b',
        }
    }
}

impl TryFrom<char> for TypeTag {
    type Error = char;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Ok(match value {
            'i' => Self::Int,
            'l' => Self::SizeWord,
            's' => Self::Str,
            'u' => Self::Unicode,
            'b' => Self::Bytes,
            _ => return Err(value),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, dm::Display)]
pub enum NameError {
    #[display("Encoded name takes {len} bytes while at most {limit} bytes fit the engine buffer")]
    TooLong { len: usize, limit: usize },
    #[display("Malformed name `{name}`: {reason}")]
    Malformed { name: String, reason: &'static str },
}

impl Error for NameError {}

/// The parts of an engine-facing name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolicName<'a> {
    pub base_path: &'a str,
    pub qualifier: &'a str,
    pub tag: TypeTag,
}

impl<'a> SymbolicName<'a> {
    pub fn new(base_path: &'a str, qualifier: &'a str, tag: TypeTag) -> Self {
        Self {
            base_path,
            qualifier,
            tag,
        }
    }

    /// Builds the composite name.
    /// # Remarks
    /// Only names that decode back to the same parts are produced, i.e., the
    /// qualifier must be non-empty and free of the separator.
    pub fn encode(&self) -> Result<String, NameError> {
        let malformed = |reason| NameError::Malformed {
            name: self.to_string(),
            reason,
        };

        if self.qualifier.is_empty() {
            return Err(malformed("empty qualifier"));
        }
        if self.qualifier.contains(SEPARATOR) {
            return Err(malformed("qualifier contains the separator"));
        }
        if self.base_path.contains('\0') || self.qualifier.contains('\0') {
            return Err(malformed("interior NUL byte"));
        }

        let encoded = self.to_string();
        if encoded.len() >= NAME_LIMIT {
            return Err(NameError::TooLong {
                len: encoded.len(),
                limit: NAME_LIMIT - 1,
            });
        }
        Ok(encoded)
    }
}

impl fmt::Display for SymbolicName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.base_path, SEPARATOR, self.tag, TAG_MARKER as char, self.qualifier
        )
    }
}

#[inline]
pub fn encode_name(base_path: &str, qualifier: &str, tag: TypeTag) -> Result<String, NameError> {
    SymbolicName::new(base_path, qualifier, tag).encode()
}

/// A name split back into its parts.
/// The tag is kept raw, names coming from the engine may carry anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedName<'a> {
    pub key: &'a str,
    pub field: &'a str,
    pub tag: char,
}

/// Splits a full name on its last separator.
///
/// Names that do not follow the convention still resolve:
/// - `plain` gives `("plain", "", 'b')`,
/// - `a.field` gives `("a", "field", 'b')`.
pub fn decode_name(full_name: &str) -> Result<DecodedName<'_>, NameError> {
    let Some((key, remainder)) = full_name.rsplit_once(SEPARATOR) else {
        return Ok(DecodedName {
            key: full_name,
            field: "",
            tag: TypeTag::DEFAULT.as_char(),
        });
    };

    let bytes = remainder.as_bytes();
    if bytes.get(1) != Some(&TAG_MARKER) {
        return Ok(DecodedName {
            key,
            field: remainder,
            tag: TypeTag::DEFAULT.as_char(),
        });
    }

    if bytes.len() <= 2 {
        return Err(NameError::Malformed {
            name: full_name.to_owned(),
            reason: "missing field after the type tag",
        });
    }

    // The marker is ASCII, so the byte before it is a whole character.
    Ok(DecodedName {
        key,
        field: &remainder[2..],
        tag: bytes[0] as char,
    })
}
