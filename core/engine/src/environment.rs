//! Environment records, grounded on `environment/declarative_environment_record.rs`,
//! `environment/function_environment_record.rs`, `environment/global_environment_record.rs`,
//! and `environment/lexical_environment.rs`. The teacher links environments
//! into a chain via `Gc<GcCell<dyn EnvironmentRecordTrait>>` trait objects;
//! here each kind is a plain variant of one [`EnvironmentRecord`] enum
//! stored in an arena, linked by [`EnvironmentId`] handles, matching the
//! rest of the engine's arena-with-indices data model.

use jsrt_gc::{Arena, Handle};
use jsrt_interner::{Interner, Sym, SymMap};

use crate::{
    error::{JsNativeError, JsResult},
    object::JsObject,
    value::JsValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvironmentId(Handle<EnvironmentRecord>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone)]
struct Binding {
    value: Option<JsValue>,
    kind: BindingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThisBindingStatus {
    /// Arrow functions: no binding of their own, resolved via the outer
    /// environment chain instead.
    Lexical,
    Uninitialized,
    Initialized,
}

#[derive(Debug)]
pub enum EnvironmentRecord {
    /// `let`/`const`/function-scoped `var` bindings introduced by a block,
    /// a `for` loop head, or a function body.
    Declarative {
        bindings: SymMap<Binding>,
        outer: Option<EnvironmentId>,
    },
    /// A function's own environment: like `Declarative`, plus the `this`
    /// binding (absent/lexical for arrows) and captured `arguments`.
    Function {
        bindings: SymMap<Binding>,
        outer: Option<EnvironmentId>,
        this_value: Option<JsValue>,
        this_status: ThisBindingStatus,
    },
    /// The realm's global environment: bindings live as properties on the
    /// global object itself (so `var x` and `window.x` observe the same
    /// slot), plus a declarative record for global `let`/`const`.
    Global {
        object: JsObject,
        declarative: SymMap<Binding>,
        var_names: rustc_hash::FxHashSet<Sym>,
    },
}

/// Owns every environment record live in a realm.
#[derive(Debug, Default)]
pub struct EnvironmentArena(Arena<EnvironmentRecord>);

impl EnvironmentArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: EnvironmentRecord) -> EnvironmentId {
        EnvironmentId(self.0.insert(record))
    }

    fn get(&self, id: EnvironmentId) -> &EnvironmentRecord {
        self.0.get(id.0).expect("stale EnvironmentId")
    }

    fn get_mut(&mut self, id: EnvironmentId) -> &mut EnvironmentRecord {
        self.0.get_mut(id.0).expect("stale EnvironmentId")
    }

    pub fn new_declarative(&mut self, outer: Option<EnvironmentId>) -> EnvironmentId {
        self.insert(EnvironmentRecord::Declarative {
            bindings: SymMap::default(),
            outer,
        })
    }

    pub fn new_function(&mut self, outer: Option<EnvironmentId>, this_value: Option<JsValue>) -> EnvironmentId {
        let this_status = if this_value.is_some() {
            ThisBindingStatus::Initialized
        } else {
            ThisBindingStatus::Lexical
        };
        self.insert(EnvironmentRecord::Function {
            bindings: SymMap::default(),
            outer,
            this_value,
            this_status,
        })
    }

    pub fn new_global(&mut self, object: JsObject) -> EnvironmentId {
        self.insert(EnvironmentRecord::Global {
            object,
            declarative: SymMap::default(),
            var_names: rustc_hash::FxHashSet::default(),
        })
    }

    fn outer(&self, id: EnvironmentId) -> Option<EnvironmentId> {
        match self.get(id) {
            EnvironmentRecord::Declarative { outer, .. } => *outer,
            EnvironmentRecord::Function { outer, .. } => *outer,
            EnvironmentRecord::Global { .. } => None,
        }
    }

    pub fn create_mutable_binding(&mut self, id: EnvironmentId, name: Sym, kind: BindingKind) {
        match self.get_mut(id) {
            EnvironmentRecord::Declarative { bindings, .. }
            | EnvironmentRecord::Function { bindings, .. } => {
                bindings.entry(name).or_insert(Binding { value: None, kind });
            }
            EnvironmentRecord::Global { declarative, var_names, .. } => {
                if matches!(kind, BindingKind::Var) {
                    var_names.insert(name);
                } else {
                    declarative.entry(name).or_insert(Binding { value: None, kind });
                }
            }
        }
    }

    pub fn initialize_binding(
        &mut self,
        id: EnvironmentId,
        name: Sym,
        value: JsValue,
        interner: &Interner,
        heap: &mut crate::object::Heap,
    ) {
        match self.get_mut(id) {
            EnvironmentRecord::Declarative { bindings, .. }
            | EnvironmentRecord::Function { bindings, .. } => {
                if let Some(b) = bindings.get_mut(&name) {
                    b.value = Some(value);
                } else {
                    bindings.insert(name, Binding { value: Some(value), kind: BindingKind::Var });
                }
            }
            EnvironmentRecord::Global { object, declarative, var_names, .. } => {
                if var_names.contains(&name) {
                    object.set_data(heap, name_key(name, interner), value);
                } else {
                    declarative.insert(name, Binding { value: Some(value), kind: BindingKind::Var });
                }
            }
        }
    }

    pub fn has_binding(&self, id: EnvironmentId, name: Sym, interner: &Interner, heap: &crate::object::Heap) -> bool {
        match self.get(id) {
            EnvironmentRecord::Declarative { bindings, .. }
            | EnvironmentRecord::Function { bindings, .. } => bindings.contains_key(&name),
            EnvironmentRecord::Global { object, declarative, var_names, .. } => {
                declarative.contains_key(&name)
                    || var_names.contains(&name)
                    || object.has_own_property(heap, &name_key(name, interner))
            }
        }
    }

    /// Resolves `name` by walking the environment chain from `id` outward.
    pub fn get_binding_value(
        &self,
        id: EnvironmentId,
        name: Sym,
        interner: &Interner,
        heap: &crate::object::Heap,
    ) -> JsResult<JsValue> {
        let mut current = Some(id);
        while let Some(env) = current {
            if let Some(value) = self.lookup_own(env, name, interner, heap) {
                return value;
            }
            current = self.outer(env);
        }
        Err(JsNativeError::reference(format!("{} is not defined", interner.resolve(name))).into())
    }

    fn lookup_own(&self, id: EnvironmentId, name: Sym, interner: &Interner, heap: &crate::object::Heap) -> Option<JsResult<JsValue>> {
        match self.get(id) {
            EnvironmentRecord::Declarative { bindings, .. }
            | EnvironmentRecord::Function { bindings, .. } => bindings.get(&name).map(|b| {
                b.value
                    .clone()
                    .ok_or_else(|| JsNativeError::reference("cannot access binding before initialization").into())
            }),
            EnvironmentRecord::Global { object, declarative, var_names, .. } => {
                if let Some(b) = declarative.get(&name) {
                    return Some(
                        b.value
                            .clone()
                            .ok_or_else(|| JsNativeError::reference("cannot access binding before initialization").into()),
                    );
                }
                let key = name_key(name, interner);
                if var_names.contains(&name) || object.has_own_property(heap, &key) {
                    return Some(Ok(object
                        .get_own_property(heap, &key)
                        .and_then(|d| d.as_data())
                        .map(|d| d.value.clone())
                        .unwrap_or(JsValue::Undefined)));
                }
                None
            }
        }
    }

    pub fn set_mutable_binding(
        &mut self,
        id: EnvironmentId,
        name: Sym,
        value: JsValue,
        interner: &Interner,
        heap: &mut crate::object::Heap,
    ) -> JsResult<()> {
        let mut current = Some(id);
        while let Some(env) = current {
            let found = match self.get_mut(env) {
                EnvironmentRecord::Declarative { bindings, .. }
                | EnvironmentRecord::Function { bindings, .. } => {
                    if let Some(b) = bindings.get_mut(&name) {
                        if b.kind == BindingKind::Const && b.value.is_some() {
                            return Err(JsNativeError::typ("Assignment to constant variable.").into());
                        }
                        b.value = Some(value.clone());
                        true
                    } else {
                        false
                    }
                }
                EnvironmentRecord::Global { object, declarative, var_names, .. } => {
                    if let Some(b) = declarative.get_mut(&name) {
                        if b.kind == BindingKind::Const && b.value.is_some() {
                            return Err(JsNativeError::typ("Assignment to constant variable.").into());
                        }
                        b.value = Some(value.clone());
                        true
                    } else {
                        let key = name_key(name, interner);
                        if var_names.contains(&name) || object.has_own_property(heap, &key) {
                            object.set_data(heap, key, value.clone());
                            true
                        } else {
                            false
                        }
                    }
                }
            };
            if found {
                return Ok(());
            }
            current = self.outer(env);
        }
        Err(JsNativeError::reference(format!("{} is not defined", interner.resolve(name))).into())
    }

    /// Annex B.3.3 eligibility check: walks from `from` up to `to`
    /// (inclusive), returning `true` if any environment in between binds
    /// `name` as `let`/`const`/`class` — which blocks a block-scoped
    /// `function` declaration from also assigning the enclosing `var`
    /// binding of the same name. Also returns `true` if `to` is never
    /// reached (the two environments aren't on the same chain), treating
    /// that as ineligible rather than guessing.
    pub fn shadowed_by_lexical_declaration(&self, from: EnvironmentId, to: EnvironmentId, name: Sym) -> bool {
        let mut current = Some(from);
        while let Some(env) = current {
            let lexically_bound = match self.get(env) {
                EnvironmentRecord::Declarative { bindings, .. }
                | EnvironmentRecord::Function { bindings, .. } => {
                    matches!(bindings.get(&name), Some(b) if b.kind != BindingKind::Var)
                }
                EnvironmentRecord::Global { declarative, .. } => declarative.contains_key(&name),
            };
            if lexically_bound {
                return true;
            }
            if env == to {
                return false;
            }
            current = self.outer(env);
        }
        true
    }

    pub fn this_value(&self, id: EnvironmentId, global_this: &JsValue) -> JsValue {
        let mut current = Some(id);
        while let Some(env) = current {
            match self.get(env) {
                EnvironmentRecord::Function { this_value: Some(v), this_status: ThisBindingStatus::Initialized, .. } => {
                    return v.clone();
                }
                EnvironmentRecord::Function { this_status: ThisBindingStatus::Lexical, .. }
                | EnvironmentRecord::Declarative { .. } => {}
                EnvironmentRecord::Global { .. } => return global_this.clone(),
                _ => {}
            }
            current = self.outer(env);
        }
        global_this.clone()
    }
}

/// Global `var`/function bindings are properties on the global object, so
/// their key has to round-trip through `PropertyKey` even though binding
/// names are interned `Sym`s everywhere else.
fn name_key(name: Sym, interner: &Interner) -> crate::property::PropertyKey {
    crate::property::PropertyKey::from(interner.resolve(name))
}
