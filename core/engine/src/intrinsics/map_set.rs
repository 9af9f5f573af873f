//! `Map`/`Set`/`WeakMap`/`WeakSet`, grounded on `builtins::map::Map` and
//! `builtins::set::Set`. `SPEC_FULL.md` §4.4 scopes these to basic
//! value-model operations (`get`/`set`/`has`/`delete`/`size`, insertion-
//! order iteration) — no `forEach`/iterator-protocol quirks beyond what
//! dispatching `new Map(iterable)`/`new Set(iterable)` needs. `WeakMap`/
//! `WeakSet` share the same backing storage: this engine has no GC
//! finalization to make the "weak" half of their contract observable, so
//! they are implemented as ordinary (strongly-held) maps/sets with the
//! distinct constructor identity the spec requires.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;

use crate::{
    context::Context,
    intrinsics::array,
    object::{FunctionKind, JsObject, MapKey, NativeFunction, ObjectData, ObjectKind},
    property::{Attribute, PropertyDescriptor, PropertyKey},
    value::JsValue,
};

pub fn init(ctx: &mut Context) {
    init_map(ctx);
    init_set(ctx);
}

fn init_map(ctx: &mut Context) {
    let proto = ctx.realm().intrinsics.map_prototype;
    ctx.register_native(proto, "get", 1, map_get_native());
    ctx.register_native(proto, "set", 2, map_set_native());
    ctx.register_native(proto, "has", 1, map_has_native());
    ctx.register_native(proto, "delete", 1, map_delete_native());
    ctx.register_native(proto, "clear", 0, map_clear_native());
    ctx.register_native(proto, "forEach", 1, map_for_each_native());
    define_size_accessor(ctx, proto, map_size_native());

    register_constructor(ctx, "Map", proto, map_constructor_native());
    let weak_proto = ctx.construct_object();
    ctx.register_native(weak_proto, "get", 1, map_get_native());
    ctx.register_native(weak_proto, "set", 2, map_set_native());
    ctx.register_native(weak_proto, "has", 1, map_has_native());
    ctx.register_native(weak_proto, "delete", 1, map_delete_native());
    register_constructor(ctx, "WeakMap", weak_proto, map_constructor_native());
}

fn init_set(ctx: &mut Context) {
    let proto = ctx.realm().intrinsics.set_prototype;
    ctx.register_native(proto, "add", 1, set_add_native());
    ctx.register_native(proto, "has", 1, set_has_native());
    ctx.register_native(proto, "delete", 1, set_delete_native());
    ctx.register_native(proto, "clear", 0, set_clear_native());
    ctx.register_native(proto, "forEach", 1, set_for_each_native());
    define_size_accessor(ctx, proto, set_size_native());

    register_constructor(ctx, "Set", proto, set_constructor_native());
    let weak_proto = ctx.construct_object();
    ctx.register_native(weak_proto, "add", 1, set_add_native());
    ctx.register_native(weak_proto, "has", 1, set_has_native());
    ctx.register_native(weak_proto, "delete", 1, set_delete_native());
    register_constructor(ctx, "WeakSet", weak_proto, set_constructor_native());
}

fn register_constructor(ctx: &mut Context, name: &str, proto: JsObject, native: NativeFunction) {
    let function_prototype = ctx.realm().intrinsics.function_prototype;
    let ctor = ctx.heap_mut().insert(ObjectData::new(Some(function_prototype), ObjectKind::Function(FunctionKind::Native(native))));
    {
        let heap = ctx.heap_mut();
        ctor.set_data(heap, "name", name);
        ctor.set_data(heap, "length", JsValue::Number(0.0));
        ctor.define_own_property(heap, PropertyKey::from("prototype"), PropertyDescriptor::data(JsValue::Object(proto), Attribute::empty()));
        proto.define_own_property(
            heap,
            PropertyKey::from("constructor"),
            PropertyDescriptor::data(JsValue::Object(ctor), Attribute::WRITABLE | Attribute::CONFIGURABLE),
        );
    }
    let global = ctx.global_object();
    let heap = ctx.heap_mut();
    global.set_method(heap, name, JsValue::Object(ctor));
}

fn define_size_accessor(ctx: &mut Context, proto: JsObject, getter: NativeFunction) {
    let function_prototype = ctx.realm().intrinsics.function_prototype;
    let getter_obj = ctx.heap_mut().insert(ObjectData::new(Some(function_prototype), ObjectKind::Function(FunctionKind::Native(getter))));
    let heap = ctx.heap_mut();
    proto.define_own_property(
        heap,
        PropertyKey::from("size"),
        PropertyDescriptor::Accessor(crate::property::AccessorDescriptor { get: Some(getter_obj), set: None, attributes: Attribute::CONFIGURABLE }),
    );
}

fn iterable_entries(ctx: &Context, value: &JsValue) -> Vec<(JsValue, JsValue)> {
    match value {
        JsValue::Object(o) if o.is_array(ctx.heap()) => array::elements(ctx, *o)
            .into_iter()
            .map(|item| match &item {
                JsValue::Object(pair) if pair.is_array(ctx.heap()) => {
                    let mut parts = array::elements(ctx, *pair);
                    let v = parts.pop().unwrap_or(JsValue::Undefined);
                    let k = if parts.is_empty() { JsValue::Undefined } else { parts.remove(0) };
                    (k, v)
                }
                _ => (item, JsValue::Undefined),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn map_constructor_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let proto = ctx.realm().intrinsics.map_prototype;
        let mut entries: IndexMap<MapKey, JsValue, FxBuildHasher> = IndexMap::default();
        if let Some(arg) = args.first() {
            if !arg.is_undefined() && !arg.is_null() {
                for (k, v) in iterable_entries(ctx, arg) {
                    entries.insert(MapKey(k), v);
                }
            }
        }
        Ok(JsValue::Object(ctx.heap_mut().insert(ObjectData::new(Some(proto), ObjectKind::Map(entries)))))
    })
}

fn set_constructor_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let proto = ctx.realm().intrinsics.set_prototype;
        let mut entries: IndexSet<MapKey, FxBuildHasher> = IndexSet::default();
        if let Some(arg) = args.first() {
            if !arg.is_undefined() && !arg.is_null() {
                if let JsValue::Object(o) = arg {
                    if o.is_array(ctx.heap()) {
                        for item in array::elements(ctx, *o) {
                            entries.insert(MapKey(item));
                        }
                    }
                }
            }
        }
        Ok(JsValue::Object(ctx.heap_mut().insert(ObjectData::new(Some(proto), ObjectKind::Set(entries)))))
    })
}

fn as_map(ctx: &Context, value: &JsValue) -> crate::error::JsResult<JsObject> {
    match value {
        JsValue::Object(o) if matches!(&ctx.heap().get(*o).kind, ObjectKind::Map(_)) => Ok(*o),
        _ => Err(crate::error::JsNativeError::typ("not a Map").into()),
    }
}

fn as_set(ctx: &Context, value: &JsValue) -> crate::error::JsResult<JsObject> {
    match value {
        JsValue::Object(o) if matches!(&ctx.heap().get(*o).kind, ObjectKind::Set(_)) => Ok(*o),
        _ => Err(crate::error::JsNativeError::typ("not a Set").into()),
    }
}

fn map_get_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_map(ctx, this)?;
        let key = MapKey(args.first().cloned().unwrap_or(JsValue::Undefined));
        let ObjectKind::Map(entries) = &ctx.heap().get(obj).kind else { unreachable!() };
        Ok(entries.get(&key).cloned().unwrap_or(JsValue::Undefined))
    })
}

fn map_set_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_map(ctx, this)?;
        let key = MapKey(args.first().cloned().unwrap_or(JsValue::Undefined));
        let value = args.get(1).cloned().unwrap_or(JsValue::Undefined);
        let ObjectKind::Map(entries) = &mut ctx.heap_mut().get_mut(obj).kind else { unreachable!() };
        entries.insert(key, value);
        Ok(JsValue::Object(obj))
    })
}

fn map_has_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_map(ctx, this)?;
        let key = MapKey(args.first().cloned().unwrap_or(JsValue::Undefined));
        let ObjectKind::Map(entries) = &ctx.heap().get(obj).kind else { unreachable!() };
        Ok(JsValue::from(entries.contains_key(&key)))
    })
}

fn map_delete_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_map(ctx, this)?;
        let key = MapKey(args.first().cloned().unwrap_or(JsValue::Undefined));
        let ObjectKind::Map(entries) = &mut ctx.heap_mut().get_mut(obj).kind else { unreachable!() };
        Ok(JsValue::from(entries.shift_remove(&key).is_some()))
    })
}

fn map_clear_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| {
        let obj = as_map(ctx, this)?;
        let ObjectKind::Map(entries) = &mut ctx.heap_mut().get_mut(obj).kind else { unreachable!() };
        entries.clear();
        Ok(JsValue::Undefined)
    })
}

fn map_size_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| {
        let obj = as_map(ctx, this)?;
        let ObjectKind::Map(entries) = &ctx.heap().get(obj).kind else { unreachable!() };
        Ok(JsValue::Number(entries.len() as f64))
    })
}

fn map_for_each_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_map(ctx, this)?;
        let callback = args.first().cloned().unwrap_or(JsValue::Undefined);
        let ObjectKind::Map(entries) = &ctx.heap().get(obj).kind else { unreachable!() };
        let pairs: Vec<(JsValue, JsValue)> = entries.iter().map(|(k, v)| (k.0.clone(), v.clone())).collect();
        for (k, v) in pairs {
            ctx.call(&callback, &JsValue::Undefined, &[v, k, JsValue::Object(obj)])?;
        }
        Ok(JsValue::Undefined)
    })
}

fn set_add_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_set(ctx, this)?;
        let value = args.first().cloned().unwrap_or(JsValue::Undefined);
        let ObjectKind::Set(entries) = &mut ctx.heap_mut().get_mut(obj).kind else { unreachable!() };
        entries.insert(MapKey(value));
        Ok(JsValue::Object(obj))
    })
}

fn set_has_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_set(ctx, this)?;
        let key = MapKey(args.first().cloned().unwrap_or(JsValue::Undefined));
        let ObjectKind::Set(entries) = &ctx.heap().get(obj).kind else { unreachable!() };
        Ok(JsValue::from(entries.contains(&key)))
    })
}

fn set_delete_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_set(ctx, this)?;
        let key = MapKey(args.first().cloned().unwrap_or(JsValue::Undefined));
        let ObjectKind::Set(entries) = &mut ctx.heap_mut().get_mut(obj).kind else { unreachable!() };
        Ok(JsValue::from(entries.shift_remove(&key)))
    })
}

fn set_clear_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| {
        let obj = as_set(ctx, this)?;
        let ObjectKind::Set(entries) = &mut ctx.heap_mut().get_mut(obj).kind else { unreachable!() };
        entries.clear();
        Ok(JsValue::Undefined)
    })
}

fn set_size_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| {
        let obj = as_set(ctx, this)?;
        let ObjectKind::Set(entries) = &ctx.heap().get(obj).kind else { unreachable!() };
        Ok(JsValue::Number(entries.len() as f64))
    })
}

fn set_for_each_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_set(ctx, this)?;
        let callback = args.first().cloned().unwrap_or(JsValue::Undefined);
        let ObjectKind::Set(entries) = &ctx.heap().get(obj).kind else { unreachable!() };
        let values: Vec<JsValue> = entries.iter().map(|v| v.0.clone()).collect();
        for v in values {
            ctx.call(&callback, &JsValue::Undefined, &[v.clone(), v, JsValue::Object(obj)])?;
        }
        Ok(JsValue::Undefined)
    })
}
