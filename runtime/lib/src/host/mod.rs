//! A reference model of the dynamically-typed values of the host program.
//!
//! The marshaling logic only touches these values through the capabilities
//! below: [`SizedObject`] for the word holding the number of elements of an
//! object and [`ContentStorage`] for objects whose content is copied into a
//! tracked buffer and rebuilt from it.

use derive_more as dm;
use widestring::{WideChar, WideString};

mod objects;

pub use objects::{DictObject, ListObject, StrObject, TupleObject, UnicodeObject};

/// The platform integer of the host, the C `int` of its native interface.
pub type HostInt = i32;
/// The signed word the host uses for sizes.
pub type HostSize = isize;

const SIZE_WORD_WIDTH: usize = core::mem::size_of::<HostSize>();

/// The header field an object keeps its size in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, dm::Display)]
#[repr(transparent)]
pub struct SizeWord(HostSize);

impl SizeWord {
    pub const WIDTH: usize = SIZE_WORD_WIDTH;

    pub(crate) fn of_len(len: usize) -> Self {
        // Allocations never exceed `isize::MAX` bytes, neither do their lengths.
        Self(len as HostSize)
    }

    #[inline]
    pub fn get(self) -> HostSize {
        self.0
    }

    #[inline]
    pub fn to_ne_bytes(self) -> [u8; SIZE_WORD_WIDTH] {
        self.0.to_ne_bytes()
    }

    #[inline]
    pub fn from_ne_bytes(bytes: [u8; SIZE_WORD_WIDTH]) -> Self {
        Self(HostSize::from_ne_bytes(bytes))
    }
}

pub trait SizedObject {
    fn size_word(&self) -> SizeWord;

    fn size_word_mut(&mut self) -> &mut SizeWord;
}

/// Objects with a flat content made of fixed-width units.
pub trait ContentStorage: SizedObject + Sized {
    /// The width of a single unit of the content in bytes.
    const UNIT_WIDTH: usize;

    fn unit_count(&self) -> usize;

    /// Appends the raw bytes of the content to the buffer.
    fn copy_raw_bytes(&self, buffer: &mut Vec<u8>);

    /// Builds a new object that takes over the buffer as its content.
    /// The length of the buffer is a multiple of [`UNIT_WIDTH`](Self::UNIT_WIDTH).
    fn with_new_storage(buffer: Vec<u8>) -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, dm::Display)]
pub enum ValueKind {
    #[display("none")]
    None,
    #[display("int")]
    Int,
    #[display("float")]
    Float,
    #[display("bytearray")]
    ByteArray,
    #[display("str")]
    Str,
    #[display("unicode")]
    Unicode,
    #[display("list")]
    List,
    #[display("dict")]
    Dict,
    #[display("tuple")]
    Tuple,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Int(HostInt),
    Float(f64),
    ByteArray(Vec<u8>),
    Str(StrObject),
    Unicode(UnicodeObject),
    List(ListObject),
    Dict(DictObject),
    Tuple(TupleObject),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::None => ValueKind::None,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::ByteArray(_) => ValueKind::ByteArray,
            Value::Str(_) => ValueKind::Str,
            Value::Unicode(_) => ValueKind::Unicode,
            Value::List(_) => ValueKind::List,
            Value::Dict(_) => ValueKind::Dict,
            Value::Tuple(_) => ValueKind::Tuple,
        }
    }

    pub fn str(data: impl AsRef<[u8]>) -> Self {
        Value::Str(StrObject::new(data.as_ref()))
    }

    pub fn unicode(text: &str) -> Self {
        Value::Unicode(UnicodeObject::new(WideString::from_str(text)))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(ListObject::new(items))
    }

    pub fn dict(entries: Vec<(Value, Value)>) -> Self {
        Value::Dict(DictObject::new(entries))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(TupleObject::new(items))
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

value_from! {
    HostInt => Int,
    f64 => Float,
    Vec<u8> => ByteArray,
    StrObject => Str,
    UnicodeObject => Unicode,
    ListObject => List,
    DictObject => Dict,
    TupleObject => Tuple,
}

pub(crate) const WIDE_CHAR_WIDTH: usize = core::mem::size_of::<WideChar>();
