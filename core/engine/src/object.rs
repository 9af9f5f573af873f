//! Ordinary objects, grounded on `object/mod.rs` + `object/gcobject.rs` +
//! `object/property_map.rs`. The teacher heap-allocates each object behind
//! `Gc<GcCell<Object>>`; here every object lives in the realm's
//! [`Heap`] arena and is addressed by the `Copy` handle [`JsObject`],
//! per the arena-with-indices data model `SPEC_FULL.md` §3 mandates.

use indexmap::IndexMap;
use jsrt_gc::{Arena, Handle};
use rustc_hash::FxBuildHasher;

use crate::{
    environment::EnvironmentId,
    error::JsNativeErrorKind,
    property::{Attribute, PropertyDescriptor, PropertyKey},
    string::JsString,
    symbol::JsSymbol,
    value::JsValue,
};

/// Ordered key -> descriptor table. `IndexMap` (rather than a plain hash
/// map) is what lets `Object.keys`/`for-in` observe insertion order, the
/// same reason the teacher's `PropertyMap` keeps a parallel index vector.
pub type PropertyMap = IndexMap<PropertyKey, PropertyDescriptor, FxBuildHasher>;

#[derive(Debug, Clone)]
pub enum FunctionKind {
    /// A user-defined function: captures its defining environment and a
    /// reference to its (already CPS-lowered, if it needed to be) body.
    Closure {
        name: Option<JsString>,
        params: jsrt_ast::Node,
        body: Vec<jsrt_ast::Node>,
        environment: EnvironmentId,
        is_arrow: bool,
        this_value: Option<JsValue>,
    },
    /// An engine- or host-provided function. Boxed `dyn Fn` rather than a
    /// bare function pointer so builtins can close over realm-specific
    /// state (well-known symbols, cached prototypes) the way the
    /// teacher's `NativeFunction` closures do.
    Native(NativeFunction),
}

pub type NativeFunction = std::rc::Rc<
    dyn Fn(&JsValue, &[JsValue], &mut crate::context::Context) -> crate::error::JsResult<JsValue>,
>;

#[derive(Debug, Clone)]
pub enum ObjectKind {
    Ordinary,
    Array,
    Function(FunctionKind),
    Error(JsNativeErrorKind),
    BooleanData(bool),
    NumberData(f64),
    StringData(JsString),
    SymbolData(JsSymbol),
    Map(indexmap::IndexMap<MapKey, JsValue, FxBuildHasher>),
    Set(indexmap::IndexSet<MapKey, FxBuildHasher>),
    Promise(crate::job_queue::PromiseState),
    RegExp { source: JsString, flags: JsString },
    Arguments,
    AbortController,
    AbortSignal { aborted: bool },
    Global,
}

/// Map/Set keys use `SameValueZero`, which (unlike `JsValue`'s derived
/// equality here being the same thing for our purposes) treats `NaN` as
/// equal to itself — already true of our `PartialEq` impl — so this is a
/// thin newtype purely to give Map/Set their own `Hash` impl without
/// requiring `JsValue` itself to be hashable (objects/functions aren't
/// meaningfully hashable beyond handle identity, which this covers).
#[derive(Debug, Clone)]
pub struct MapKey(pub JsValue);

impl PartialEq for MapKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for MapKey {}

impl std::hash::Hash for MapKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match &self.0 {
            JsValue::Undefined => 0u8.hash(state),
            JsValue::Null => 1u8.hash(state),
            JsValue::Bool(b) => {
                2u8.hash(state);
                b.hash(state);
            }
            JsValue::Number(n) => {
                3u8.hash(state);
                n.to_bits().hash(state);
            }
            JsValue::String(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            JsValue::BigInt(b) => {
                5u8.hash(state);
                b.hash(state);
            }
            JsValue::Symbol(s) => {
                6u8.hash(state);
                s.hash(state);
            }
            JsValue::Object(o) => {
                7u8.hash(state);
                o.hash(state);
            }
        }
    }
}

#[derive(Debug)]
pub struct ObjectData {
    pub prototype: Option<JsObject>,
    pub extensible: bool,
    pub properties: PropertyMap,
    pub kind: ObjectKind,
}

impl ObjectData {
    pub fn new(prototype: Option<JsObject>, kind: ObjectKind) -> Self {
        Self {
            prototype,
            extensible: true,
            properties: PropertyMap::default(),
            kind,
        }
    }
}

/// Arena of every object live in a realm. Owned by
/// [`crate::realm::Realm`]; accessed through [`JsObject`] handles.
#[derive(Debug, Default)]
pub struct Heap(Arena<ObjectData>);

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, data: ObjectData) -> JsObject {
        JsObject(self.0.insert(data))
    }

    pub fn get(&self, obj: JsObject) -> &ObjectData {
        self.0.get(obj.0).expect("stale JsObject handle")
    }

    pub fn get_mut(&mut self, obj: JsObject) -> &mut ObjectData {
        self.0.get_mut(obj.0).expect("stale JsObject handle")
    }
}

/// A `Copy` handle to an object living in a realm's [`Heap`]. All actual
/// object state lives in the heap; this type is just an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JsObject(Handle<ObjectData>);

impl JsObject {
    pub fn get_own_property(self, heap: &Heap, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        heap.get(self).properties.get(key)
    }

    pub fn has_own_property(self, heap: &Heap, key: &PropertyKey) -> bool {
        heap.get(self).properties.contains_key(key)
    }

    pub fn prototype(self, heap: &Heap) -> Option<JsObject> {
        heap.get(self).prototype
    }

    pub fn set_prototype(self, heap: &mut Heap, proto: Option<JsObject>) {
        heap.get_mut(self).prototype = proto;
    }

    pub fn is_extensible(self, heap: &Heap) -> bool {
        heap.get(self).extensible
    }

    /// `[[DefineOwnProperty]]` for ordinary objects: no validation against
    /// an existing non-configurable descriptor is performed here (the
    /// strict-mode/non-configurable-redefinition rejection path is left to
    /// `Context::define_property`, which is where a `TypeError` would be
    /// raised — this just writes the slot).
    pub fn define_own_property(self, heap: &mut Heap, key: PropertyKey, desc: PropertyDescriptor) {
        heap.get_mut(self).properties.insert(key, desc);
    }

    pub fn delete_own_property(self, heap: &mut Heap, key: &PropertyKey) -> bool {
        heap.get_mut(self).properties.shift_remove(key).is_some()
    }

    /// `[[OwnPropertyKeys]]`: integer indices (ascending), then strings in
    /// insertion order, then symbols in insertion order — the ordering
    /// `Object.keys`/`JSON.stringify`/`for-in` all rely on.
    pub fn own_property_keys(self, heap: &Heap) -> Vec<PropertyKey> {
        let data = heap.get(self);
        let mut indices: Vec<u32> = Vec::new();
        let mut strings: Vec<PropertyKey> = Vec::new();
        let mut symbols: Vec<PropertyKey> = Vec::new();
        for key in data.properties.keys() {
            match key {
                PropertyKey::Index(i) => indices.push(*i),
                PropertyKey::String(_) => strings.push(key.clone()),
                PropertyKey::Symbol(_) => symbols.push(key.clone()),
            }
        }
        indices.sort_unstable();
        let mut out: Vec<PropertyKey> = indices.into_iter().map(PropertyKey::Index).collect();
        out.extend(strings);
        out.extend(symbols);
        out
    }

    pub fn is_callable(self, heap: &Heap) -> bool {
        matches!(heap.get(self).kind, ObjectKind::Function(_))
    }

    pub fn is_array(self, heap: &Heap) -> bool {
        matches!(heap.get(self).kind, ObjectKind::Array)
    }

    /// Convenience for builtins: set a plain data property with the
    /// default (writable/enumerable/configurable) attributes.
    pub fn set_data(self, heap: &mut Heap, key: impl Into<PropertyKey>, value: impl Into<JsValue>) {
        self.define_own_property(
            heap,
            key.into(),
            PropertyDescriptor::data(value, Attribute::default()),
        );
    }

    /// Same as [`Self::set_data`] but non-enumerable, the attributes used
    /// for built-in methods (`Array.prototype.push` shouldn't show up in
    /// `for-in`).
    pub fn set_method(self, heap: &mut Heap, key: impl Into<PropertyKey>, value: impl Into<JsValue>) {
        self.define_own_property(
            heap,
            key.into(),
            PropertyDescriptor::data(value, Attribute::WRITABLE | Attribute::CONFIGURABLE),
        );
    }
}
