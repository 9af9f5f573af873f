//! `JsString`: a reference-counted UTF-16 code unit sequence, grounded on
//! the teacher's `value::rcstring::RcString`. Kept distinct from
//! [`jsrt_interner::Sym`]: `Sym` handles are for identifiers/property keys
//! resolved against a single `Interner`, whereas arbitrary runtime string
//! *values* (the result of concatenation, `String(42)`, template literals)
//! need their own storage independent of the interner's lifetime.

use std::{fmt, ops::Deref, rc::Rc};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JsString(Rc<[u16]>);

impl JsString {
    pub fn new(value: &str) -> Self {
        Self(value.encode_utf16().collect::<Vec<u16>>().into())
    }

    pub fn from_utf16(units: Vec<u16>) -> Self {
        Self(units.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn units(&self) -> &[u16] {
        &self.0
    }

    pub fn concat(&self, other: &Self) -> Self {
        let mut units = Vec::with_capacity(self.0.len() + other.0.len());
        units.extend_from_slice(&self.0);
        units.extend_from_slice(&other.0);
        Self(units.into())
    }

    /// Lossy conversion for display/hashing into Rust `String`s; unpaired
    /// surrogates are replaced per `String::from_utf16_lossy`.
    pub fn to_std_string(&self) -> String {
        String::from_utf16_lossy(&self.0)
    }

    /// Parses as an array index (`"0"`, `"17"`, never `"-1"`/`"01"`),
    /// mirroring the teacher's `PropertyKey::from(JsString)` canonical
    /// numeric-key check.
    pub fn as_array_index(&self) -> Option<u32> {
        let s = self.to_std_string();
        if s == "0" {
            return Some(0);
        }
        if s.starts_with('0') || s.is_empty() {
            return None;
        }
        s.parse::<u32>().ok()
    }
}

impl From<&str> for JsString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for JsString {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl Deref for JsString {
    type Target = [u16];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_std_string())
    }
}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        self.to_std_string() == other
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self.to_std_string() == *other
    }
}
