use widestring::{WideChar, WideString};

use super::{ContentStorage, HostSize, SizeWord, SizedObject, Value, WIDE_CHAR_WIDTH};

macro_rules! impl_sized_object {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(
            impl SizedObject for $ty {
                #[inline]
                fn size_word(&self) -> SizeWord {
                    self.$field
                }

                #[inline]
                fn size_word_mut(&mut self) -> &mut SizeWord {
                    &mut self.$field
                }
            }

            impl $ty {
                /// The size as recorded in the header of the object.
                #[inline]
                pub fn len(&self) -> HostSize {
                    self.$field.get()
                }

                #[inline]
                pub fn is_empty(&self) -> bool {
                    self.len() == 0
                }
            }
        )*
    };
}

impl_sized_object! {
    StrObject => size,
    UnicodeObject => size,
    ListObject => size,
    DictObject => used,
    TupleObject => size,
}

/// An immutable byte string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrObject {
    size: SizeWord,
    data: Box<[u8]>,
}

impl StrObject {
    pub fn new(data: &[u8]) -> Self {
        Self::with_new_storage(data.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl ContentStorage for StrObject {
    const UNIT_WIDTH: usize = 1;

    fn unit_count(&self) -> usize {
        self.data.len()
    }

    fn copy_raw_bytes(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.data);
    }

    fn with_new_storage(buffer: Vec<u8>) -> Self {
        Self {
            size: SizeWord::of_len(buffer.len()),
            data: buffer.into_boxed_slice(),
        }
    }
}

/// An immutable string of platform wide characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnicodeObject {
    size: SizeWord,
    data: WideString,
}

impl UnicodeObject {
    pub fn new(data: WideString) -> Self {
        Self {
            size: SizeWord::of_len(data.len()),
            data,
        }
    }

    pub fn as_wide_str(&self) -> &widestring::WideStr {
        &self.data
    }
}

impl ContentStorage for UnicodeObject {
    const UNIT_WIDTH: usize = WIDE_CHAR_WIDTH;

    fn unit_count(&self) -> usize {
        self.data.len()
    }

    fn copy_raw_bytes(&self, buffer: &mut Vec<u8>) {
        buffer.extend(self.data.as_slice().iter().flat_map(|c| c.to_ne_bytes()));
    }

    fn with_new_storage(buffer: Vec<u8>) -> Self {
        debug_assert_eq!(buffer.len() % Self::UNIT_WIDTH, 0);
        let units = buffer
            .chunks_exact(Self::UNIT_WIDTH)
            .map(|unit| {
                let mut raw = [0; WIDE_CHAR_WIDTH];
                raw.copy_from_slice(unit);
                WideChar::from_ne_bytes(raw)
            })
            .collect::<Vec<_>>();
        Self::new(WideString::from_vec(units))
    }
}

/// An ordered mutable sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListObject {
    size: SizeWord,
    items: Vec<Value>,
}

impl ListObject {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            size: SizeWord::of_len(items.len()),
            items,
        }
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn push(&mut self, item: Value) {
        self.items.push(item);
        self.size = SizeWord::of_len(self.items.len());
    }
}

/// An associative structure. Keys are compared by equality.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DictObject {
    used: SizeWord,
    entries: Vec<(Value, Value)>,
}

impl DictObject {
    /// # Remarks
    /// Later entries replace the earlier ones with an equal key.
    pub fn new(entries: Vec<(Value, Value)>) -> Self {
        let mut dict = Self::default();
        for (key, value) in entries {
            dict.insert(key, value);
        }
        dict
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(core::mem::replace(existing, value));
        }
        self.entries.push((key, value));
        self.used = SizeWord::of_len(self.entries.len());
        None
    }
}

/// A fixed-arity sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TupleObject {
    size: SizeWord,
    items: Box<[Value]>,
}

impl TupleObject {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            size: SizeWord::of_len(items.len()),
            items: items.into_boxed_slice(),
        }
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unicode_storage_round_trip() {
        let text = UnicodeObject::new(WideString::from_str("añb"));
        let mut buffer = Vec::new();
        text.copy_raw_bytes(&mut buffer);
        assert_eq!(buffer.len(), 3 * WIDE_CHAR_WIDTH);

        let rebuilt = UnicodeObject::with_new_storage(buffer);
        assert_eq!(rebuilt, text);
        assert_eq!(rebuilt.len(), 3);
    }

    #[test]
    fn test_dict_replaces_equal_keys() {
        let mut dict = DictObject::new(vec![
            (Value::Int(1), Value::str("a")),
            (Value::Int(1), Value::str("b")),
        ]);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get(&Value::Int(1)), Some(&Value::str("b")));

        assert_eq!(dict.insert(Value::Int(2), Value::None), None);
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_list_push_updates_size() {
        let mut list = ListObject::new(vec![Value::Int(1)]);
        list.push(Value::Int(2));
        assert_eq!(list.len(), 2);
        assert_eq!(list.items().len(), 2);
    }
}
