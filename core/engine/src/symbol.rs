//! `JsSymbol`, grounded on `symbol/mod.rs` + `symbol/rcsymbol.rs`: a
//! unique, optionally-described token. Uniqueness comes from an
//! incrementing hash handed out by [`crate::context::Context`], not from
//! string identity — two symbols with the same description are distinct.

use std::{fmt, rc::Rc};

use crate::string::JsString;

#[derive(Debug)]
struct SymbolData {
    id: u64,
    description: Option<JsString>,
}

#[derive(Debug, Clone)]
pub struct JsSymbol(Rc<SymbolData>);

impl JsSymbol {
    pub(crate) fn new(id: u64, description: Option<JsString>) -> Self {
        Self(Rc::new(SymbolData { id, description }))
    }

    pub fn description(&self) -> Option<&JsString> {
        self.0.description.as_ref()
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }
}

impl PartialEq for JsSymbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for JsSymbol {}

impl std::hash::Hash for JsSymbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Display for JsSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.description {
            Some(d) => write!(f, "Symbol({d})"),
            None => write!(f, "Symbol()"),
        }
    }
}

/// Symbols reserved by the spec (`Symbol.iterator`, `Symbol.asyncIterator`)
/// resolved once at realm construction, mirroring `WellKnownSymbols`.
#[derive(Debug, Clone)]
pub struct WellKnownSymbols {
    pub iterator: JsSymbol,
    pub async_iterator: JsSymbol,
    pub to_primitive: JsSymbol,
    pub has_instance: JsSymbol,
}

impl WellKnownSymbols {
    pub fn new(next_id: &mut u64) -> Self {
        let mut mk = |desc: &str| {
            let id = *next_id;
            *next_id += 1;
            JsSymbol::new(id, Some(JsString::from(desc)))
        };
        Self {
            iterator: mk("Symbol.iterator"),
            async_iterator: mk("Symbol.asyncIterator"),
            to_primitive: mk("Symbol.toPrimitive"),
            has_instance: mk("Symbol.hasInstance"),
        }
    }
}
