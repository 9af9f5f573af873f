//! Property descriptors and keys, grounded on `property/mod.rs` and
//! `property/attribute` in the teacher, re-expressed over [`JsValue`] and
//! [`JsString`] rather than the teacher's `Gc`-boxed `ValueData`.

use bitflags::bitflags;

use crate::{string::JsString, symbol::JsSymbol, value::JsValue};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Attribute: u8 {
        const WRITABLE     = 0b0001;
        const ENUMERABLE   = 0b0010;
        const CONFIGURABLE = 0b0100;
    }
}

impl Default for Attribute {
    fn default() -> Self {
        Attribute::WRITABLE | Attribute::ENUMERABLE | Attribute::CONFIGURABLE
    }
}

#[derive(Debug, Clone)]
pub struct DataDescriptor {
    pub value: JsValue,
    pub attributes: Attribute,
}

impl DataDescriptor {
    pub fn new(value: impl Into<JsValue>, attributes: Attribute) -> Self {
        Self {
            value: value.into(),
            attributes,
        }
    }

    pub fn writable(&self) -> bool {
        self.attributes.contains(Attribute::WRITABLE)
    }

    pub fn enumerable(&self) -> bool {
        self.attributes.contains(Attribute::ENUMERABLE)
    }

    pub fn configurable(&self) -> bool {
        self.attributes.contains(Attribute::CONFIGURABLE)
    }
}

/// A getter/setter pair. Either side may be absent (`Object.defineProperty`
/// with only a `get`, for instance). `writable` is meaningless for
/// accessors, so `attributes` here never carries [`Attribute::WRITABLE`].
#[derive(Debug, Clone)]
pub struct AccessorDescriptor {
    pub get: Option<crate::object::JsObject>,
    pub set: Option<crate::object::JsObject>,
    pub attributes: Attribute,
}

impl AccessorDescriptor {
    pub fn enumerable(&self) -> bool {
        self.attributes.contains(Attribute::ENUMERABLE)
    }

    pub fn configurable(&self) -> bool {
        self.attributes.contains(Attribute::CONFIGURABLE)
    }
}

#[derive(Debug, Clone)]
pub enum PropertyDescriptor {
    Data(DataDescriptor),
    Accessor(AccessorDescriptor),
}

impl PropertyDescriptor {
    pub fn data(value: impl Into<JsValue>, attributes: Attribute) -> Self {
        Self::Data(DataDescriptor::new(value, attributes))
    }

    pub fn enumerable(&self) -> bool {
        match self {
            Self::Data(d) => d.enumerable(),
            Self::Accessor(a) => a.enumerable(),
        }
    }

    pub fn configurable(&self) -> bool {
        match self {
            Self::Data(d) => d.configurable(),
            Self::Accessor(a) => a.configurable(),
        }
    }

    pub fn as_data(&self) -> Option<&DataDescriptor> {
        match self {
            Self::Data(d) => Some(d),
            Self::Accessor(_) => None,
        }
    }
}

/// `IsPropertyKey`: either a string, a symbol, or a canonical array index
/// (split out so ordinary objects can store indexed properties in a dense
/// `Vec` instead of hashing a numeric string every time).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(JsString),
    Symbol(JsSymbol),
    Index(u32),
}

impl From<JsString> for PropertyKey {
    fn from(s: JsString) -> Self {
        match s.as_array_index() {
            Some(i) => PropertyKey::Index(i),
            None => PropertyKey::String(s),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        JsString::from(s).into()
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        JsString::from(s).into()
    }
}

impl From<JsSymbol> for PropertyKey {
    fn from(s: JsSymbol) -> Self {
        PropertyKey::Symbol(s)
    }
}

impl From<u32> for PropertyKey {
    fn from(i: u32) -> Self {
        PropertyKey::Index(i)
    }
}

impl std::fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{s}"),
            PropertyKey::Symbol(s) => write!(f, "{s}"),
            PropertyKey::Index(i) => write!(f, "{i}"),
        }
    }
}
