//! `Symbol`, grounded on `builtins::symbol::Symbol`. The well-known
//! symbols (`Symbol.iterator`, `Symbol.asyncIterator`, `Symbol.toPrimitive`,
//! `Symbol.hasInstance`) are resolved once at realm construction
//! ([`crate::symbol::WellKnownSymbols`]) and exposed here as read-only
//! properties on the constructor, mirroring how the teacher attaches them
//! to the `Symbol` global rather than re-minting them per realm access.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    context::Context,
    object::{FunctionKind, NativeFunction, ObjectData, ObjectKind},
    property::{Attribute, PropertyDescriptor, PropertyKey},
    string::JsString,
    value::JsValue,
};

pub fn init(ctx: &mut Context) {
    let proto = ctx.realm().intrinsics.symbol_prototype;
    ctx.register_native(proto, "toString", 0, to_string_native());

    let function_prototype = ctx.realm().intrinsics.function_prototype;
    let registry: Rc<RefCell<HashMap<String, crate::symbol::JsSymbol>>> = Rc::new(RefCell::new(HashMap::new()));
    let ctor = ctx
        .heap_mut()
        .insert(ObjectData::new(Some(function_prototype), ObjectKind::Function(FunctionKind::Native(constructor_native()))));
    {
        let heap = ctx.heap_mut();
        ctor.set_data(heap, "name", "Symbol");
        ctor.set_data(heap, "length", JsValue::Number(0.0));
        ctor.define_own_property(heap, PropertyKey::from("prototype"), PropertyDescriptor::data(JsValue::Object(proto), Attribute::empty()));
    }
    let wks = ctx.realm().well_known_symbols.clone();
    {
        let heap = ctx.heap_mut();
        ctor.set_data(heap, "iterator", JsValue::Symbol(wks.iterator));
        ctor.set_data(heap, "asyncIterator", JsValue::Symbol(wks.async_iterator));
        ctor.set_data(heap, "toPrimitive", JsValue::Symbol(wks.to_primitive));
        ctor.set_data(heap, "hasInstance", JsValue::Symbol(wks.has_instance));
    }
    ctx.register_native(ctor, "for", 1, for_native(registry.clone()));
    ctx.register_native(ctor, "keyFor", 1, key_for_native(registry));

    let global = ctx.global_object();
    let heap = ctx.heap_mut();
    global.set_method(heap, "Symbol", JsValue::Object(ctor));
}

fn constructor_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let description = match args.first() {
            Some(v) if !v.is_undefined() => Some(ctx.to_js_string(v)?),
            _ => None,
        };
        Ok(JsValue::Symbol(ctx.construct_symbol(description)))
    })
}

fn to_string_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, _ctx: &mut Context| match this {
        JsValue::Symbol(s) => Ok(JsValue::String(JsString::from(s.to_string()))),
        _ => Ok(JsValue::String(JsString::from("Symbol()"))),
    })
}

/// `Symbol.for`/`Symbol.keyFor`: the global symbol registry, keyed by
/// description string. Kept as a closure-captured `Rc<RefCell<_>>` rather
/// than realm state since nothing else in the engine needs to observe it.
fn for_native(registry: Rc<RefCell<HashMap<String, crate::symbol::JsSymbol>>>) -> NativeFunction {
    std::rc::Rc::new(move |_this, args, ctx: &mut Context| {
        let key = match args.first() {
            Some(v) => ctx.to_js_string(v)?.to_std_string(),
            None => "undefined".to_string(),
        };
        if let Some(existing) = registry.borrow().get(&key) {
            return Ok(JsValue::Symbol(existing.clone()));
        }
        let sym = ctx.construct_symbol(Some(JsString::from(key.clone())));
        registry.borrow_mut().insert(key, sym.clone());
        Ok(JsValue::Symbol(sym))
    })
}

fn key_for_native(registry: Rc<RefCell<HashMap<String, crate::symbol::JsSymbol>>>) -> NativeFunction {
    std::rc::Rc::new(move |_this, args, _ctx: &mut Context| {
        let Some(JsValue::Symbol(sym)) = args.first() else {
            return Ok(JsValue::Undefined);
        };
        for (key, candidate) in registry.borrow().iter() {
            if candidate == sym {
                return Ok(JsValue::String(JsString::from(key.clone())));
            }
        }
        Ok(JsValue::Undefined)
    })
}
