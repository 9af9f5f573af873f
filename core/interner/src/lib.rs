//! String interner for identifiers and property keys.
//!
//! Every identifier the lexer produces is interned exactly once; the rest
//! of the pipeline (parser, CPS transformer, evaluator) passes around the
//! cheap [`Sym`] handle instead of re-hashing or re-allocating the same
//! names over and over. This mirrors the role `boa_interner` plays in the
//! teacher workspace, minus the `no_std`/ICU concerns that crate also
//! carries.

use std::num::NonZeroU32;

use hashbrown::HashMap;
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

/// A handle to an interned string.
///
/// `Sym` is `Copy` and comparable with `==`; two identifiers compare equal
/// iff they were interned from equal strings. Index `0` is never issued so
/// that `Option<Sym>` is niche-optimized to the size of `Sym` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sym(NonZeroU32);

impl Sym {
    /// Well-known symbol reserved for the empty string, always index 1.
    pub const EMPTY_STRING: Sym = Sym(match NonZeroU32::new(1) {
        Some(v) => v,
        None => unreachable!(),
    });

    fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index + 1).expect("interner overflowed u32 index space");
        Sym(NonZeroU32::new(raw).expect("index + 1 is never zero"))
    }

    fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Bidirectional string <-> [`Sym`] table.
///
/// Interning is idempotent: calling [`Interner::get_or_intern`] twice with
/// the same text returns the same `Sym`. Lookups in the reverse direction
/// (`Sym` -> `&str`) are O(1) index accesses.
#[derive(Debug, Default)]
pub struct Interner {
    strings: IndexSet<Box<str>, FxBuildHasher>,
}

impl Interner {
    /// Creates an interner pre-seeded with the empty string at
    /// [`Sym::EMPTY_STRING`].
    pub fn new() -> Self {
        let mut strings = IndexSet::with_hasher(FxBuildHasher);
        strings.insert("".into());
        Self { strings }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut interner = Self::new();
        interner.strings.reserve(capacity);
        interner
    }

    /// Interns `value`, returning its handle. Subsequent calls with an
    /// equal string return the same handle without reallocating.
    pub fn get_or_intern(&mut self, value: &str) -> Sym {
        if let Some(index) = self.strings.get_index_of(value) {
            return Sym::from_index(index);
        }
        let (index, _) = self.strings.insert_full(value.into());
        Sym::from_index(index)
    }

    /// Resolves a handle back to its string. Panics if `sym` was not
    /// produced by this interner (handles are not portable across
    /// `Interner` instances).
    pub fn resolve(&self, sym: Sym) -> &str {
        self.strings
            .get_index(sym.to_index())
            .expect("Sym not produced by this interner")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// A set of well-known [`Sym`]s resolved once at interner construction,
/// so hot paths (property lookup for `length`, `constructor`, ...) never
/// pay for a hash lookup into the interner's string table.
#[derive(Debug, Clone, Copy)]
pub struct CommonSyms {
    pub length: Sym,
    pub constructor: Sym,
    pub prototype: Sym,
    pub name: Sym,
    pub message: Sym,
    pub value: Sym,
    pub done: Sym,
    pub next: Sym,
    pub default: Sym,
}

impl CommonSyms {
    pub fn new(interner: &mut Interner) -> Self {
        Self {
            length: interner.get_or_intern("length"),
            constructor: interner.get_or_intern("constructor"),
            prototype: interner.get_or_intern("prototype"),
            name: interner.get_or_intern("name"),
            message: interner.get_or_intern("message"),
            value: interner.get_or_intern("value"),
            done: interner.get_or_intern("done"),
            next: interner.get_or_intern("next"),
            default: interner.get_or_intern("default"),
        }
    }
}

/// Fast-path map keyed by [`Sym`]; used wherever the evaluator would
/// otherwise hash a `String` repeatedly (e.g. binding tables).
pub type SymMap<V> = HashMap<Sym, V, FxBuildHasher>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut interner = Interner::new();
        let a = interner.get_or_intern("hello");
        let b = interner.get_or_intern("hello");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "hello");
    }

    #[test]
    fn distinct_strings_get_distinct_syms() {
        let mut interner = Interner::new();
        let a = interner.get_or_intern("foo");
        let b = interner.get_or_intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_string_is_pre_interned() {
        let interner = Interner::new();
        assert_eq!(interner.resolve(Sym::EMPTY_STRING), "");
    }
}
