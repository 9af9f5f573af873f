//! The `Object` constructor and `Object.prototype`, grounded on
//! `builtins::object::Object`. Covers the operation list `SPEC_FULL.md`
//! §4.4 names (`defineProperty`, `getOwnPropertyDescriptor`, `keys`/
//! `values`/`entries`, `getOwnPropertyNames`/`getOwnPropertySymbols`,
//! `freeze`/`seal`) plus the small set of prototype methods user code
//! reaches for constantly enough that omitting them would be conspicuous
//! (`hasOwnProperty`, `toString`).

use crate::{
    context::Context,
    error::JsNativeError,
    object::{FunctionKind, JsObject, NativeFunction, ObjectData, ObjectKind},
    property::{AccessorDescriptor, Attribute, DataDescriptor, PropertyDescriptor, PropertyKey},
    string::JsString,
    value::JsValue,
};

pub fn init(ctx: &mut Context) {
    let proto = ctx.realm().intrinsics.object_prototype;
    ctx.register_native(proto, "hasOwnProperty", 1, has_own_property_native());
    ctx.register_native(proto, "isPrototypeOf", 1, is_prototype_of_native());
    ctx.register_native(proto, "propertyIsEnumerable", 1, property_is_enumerable_native());
    ctx.register_native(proto, "toString", 0, to_string_native());
    ctx.register_native(proto, "valueOf", 0, value_of_native());

    let function_prototype = ctx.realm().intrinsics.function_prototype;
    let ctor = ctx.heap_mut().insert(ObjectData::new(Some(function_prototype), ObjectKind::Function(FunctionKind::Native(constructor_native()))));
    {
        let heap = ctx.heap_mut();
        ctor.set_data(heap, "name", "Object");
        ctor.set_data(heap, "length", JsValue::Number(1.0));
        ctor.define_own_property(heap, PropertyKey::from("prototype"), PropertyDescriptor::data(JsValue::Object(proto), Attribute::empty()));
        proto.define_own_property(
            heap,
            PropertyKey::from("constructor"),
            PropertyDescriptor::data(JsValue::Object(ctor), Attribute::WRITABLE | Attribute::CONFIGURABLE),
        );
    }
    ctx.register_native(ctor, "keys", 1, keys_native());
    ctx.register_native(ctor, "values", 1, values_native());
    ctx.register_native(ctor, "entries", 1, entries_native());
    ctx.register_native(ctor, "getOwnPropertyNames", 1, get_own_property_names_native());
    ctx.register_native(ctor, "getOwnPropertySymbols", 1, get_own_property_symbols_native());
    ctx.register_native(ctor, "getOwnPropertyDescriptor", 2, get_own_property_descriptor_native());
    ctx.register_native(ctor, "defineProperty", 3, define_property_native());
    ctx.register_native(ctor, "defineProperties", 2, define_properties_native());
    ctx.register_native(ctor, "freeze", 1, freeze_native());
    ctx.register_native(ctor, "seal", 1, seal_native());
    ctx.register_native(ctor, "isFrozen", 1, is_frozen_native());
    ctx.register_native(ctor, "isSealed", 1, is_sealed_native());
    ctx.register_native(ctor, "getPrototypeOf", 1, get_prototype_of_native());
    ctx.register_native(ctor, "setPrototypeOf", 2, set_prototype_of_native());
    ctx.register_native(ctor, "create", 2, create_native());
    ctx.register_native(ctor, "assign", 2, assign_native());

    let global = ctx.global_object();
    let heap = ctx.heap_mut();
    global.set_method(heap, "Object", JsValue::Object(ctor));
}

fn to_object_arg(ctx: &mut Context, args: &[JsValue]) -> crate::error::JsResult<JsObject> {
    ctx.to_object(args.first().unwrap_or(&JsValue::Undefined))
}

fn constructor_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| match args.first() {
        Some(v) if v.is_object() => Ok(v.clone()),
        Some(v) if !v.is_null_or_undefined() => Ok(JsValue::Object(ctx.to_object(v)?)),
        _ => Ok(JsValue::Object(ctx.construct_object())),
    })
}

fn has_own_property_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = ctx.to_object(this)?;
        let key = ctx.to_property_key(args.first().unwrap_or(&JsValue::Undefined))?;
        Ok(JsValue::from(obj.has_own_property(ctx.heap(), &key)))
    })
}

fn is_prototype_of_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let Some(JsValue::Object(mut candidate)) = args.first().cloned() else {
            return Ok(JsValue::from(false));
        };
        let target = ctx.to_object(this)?;
        while let Some(proto) = candidate.prototype(ctx.heap()) {
            if proto == target {
                return Ok(JsValue::from(true));
            }
            candidate = proto;
        }
        Ok(JsValue::from(false))
    })
}

fn property_is_enumerable_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = ctx.to_object(this)?;
        let key = ctx.to_property_key(args.first().unwrap_or(&JsValue::Undefined))?;
        let enumerable = obj.get_own_property(ctx.heap(), &key).map(|d| d.enumerable()).unwrap_or(false);
        Ok(JsValue::from(enumerable))
    })
}

fn to_string_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| {
        let tag = match this {
            JsValue::Undefined => "Undefined",
            JsValue::Null => "Null",
            JsValue::Object(o) if o.is_array(ctx.heap()) => "Array",
            JsValue::Object(o) if o.is_callable(ctx.heap()) => "Function",
            _ => "Object",
        };
        Ok(JsValue::String(JsString::from(format!("[object {tag}]"))))
    })
}

fn value_of_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| Ok(JsValue::Object(ctx.to_object(this)?)))
}

fn own_string_keys(ctx: &Context, obj: JsObject) -> Vec<PropertyKey> {
    obj.own_property_keys(ctx.heap())
        .into_iter()
        .filter(|k| !matches!(k, PropertyKey::Symbol(_)))
        .filter(|k| obj.get_own_property(ctx.heap(), k).map(|d| d.enumerable()).unwrap_or(false))
        .collect()
}

fn keys_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let obj = to_object_arg(ctx, args)?;
        let keys = own_string_keys(ctx, obj);
        Ok(JsValue::Object(make_array(ctx, keys.into_iter().map(|k| JsValue::String(JsString::from(k.to_string()))).collect())))
    })
}

fn values_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let obj = to_object_arg(ctx, args)?;
        let keys = own_string_keys(ctx, obj);
        let values: Vec<JsValue> = keys.into_iter().map(|k| ctx.get(obj, &k, &JsValue::Object(obj))).collect::<crate::error::JsResult<_>>()?;
        Ok(JsValue::Object(make_array(ctx, values)))
    })
}

fn entries_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let obj = to_object_arg(ctx, args)?;
        let keys = own_string_keys(ctx, obj);
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let value = ctx.get(obj, &key, &JsValue::Object(obj))?;
            let pair = make_array(ctx, vec![JsValue::String(JsString::from(key.to_string())), value]);
            entries.push(JsValue::Object(pair));
        }
        Ok(JsValue::Object(make_array(ctx, entries)))
    })
}

fn get_own_property_names_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let obj = to_object_arg(ctx, args)?;
        let names: Vec<JsValue> = obj
            .own_property_keys(ctx.heap())
            .into_iter()
            .filter(|k| !matches!(k, PropertyKey::Symbol(_)))
            .map(|k| JsValue::String(JsString::from(k.to_string())))
            .collect();
        Ok(JsValue::Object(make_array(ctx, names)))
    })
}

fn get_own_property_symbols_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let obj = to_object_arg(ctx, args)?;
        let symbols: Vec<JsValue> = obj
            .own_property_keys(ctx.heap())
            .into_iter()
            .filter_map(|k| match k {
                PropertyKey::Symbol(s) => Some(JsValue::Symbol(s)),
                _ => None,
            })
            .collect();
        Ok(JsValue::Object(make_array(ctx, symbols)))
    })
}

fn get_own_property_descriptor_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let obj = to_object_arg(ctx, args)?;
        let key = ctx.to_property_key(args.get(1).unwrap_or(&JsValue::Undefined))?;
        let Some(desc) = obj.get_own_property(ctx.heap(), &key).cloned() else {
            return Ok(JsValue::Undefined);
        };
        Ok(JsValue::Object(descriptor_to_object(ctx, &desc)))
    })
}

fn descriptor_to_object(ctx: &mut Context, desc: &PropertyDescriptor) -> JsObject {
    let out = ctx.construct_object();
    match desc {
        PropertyDescriptor::Data(d) => {
            let heap = ctx.heap_mut();
            out.set_data(heap, "value", d.value.clone());
            out.set_data(heap, "writable", JsValue::from(d.writable()));
        }
        PropertyDescriptor::Accessor(a) => {
            let heap = ctx.heap_mut();
            out.set_data(heap, "get", a.get.map(JsValue::Object).unwrap_or(JsValue::Undefined));
            out.set_data(heap, "set", a.set.map(JsValue::Object).unwrap_or(JsValue::Undefined));
        }
    }
    let heap = ctx.heap_mut();
    out.set_data(heap, "enumerable", JsValue::from(desc.enumerable()));
    out.set_data(heap, "configurable", JsValue::from(desc.configurable()));
    out
}

fn object_to_descriptor(ctx: &mut Context, value: &JsValue) -> crate::error::JsResult<PropertyDescriptor> {
    let JsValue::Object(desc_obj) = value else {
        return Err(JsNativeError::typ("Property description must be an object").into());
    };
    let desc_obj = *desc_obj;
    let has = |k: &str| desc_obj.has_own_property(ctx.heap(), &PropertyKey::from(k));
    let mut attrs = Attribute::empty();
    if !has("enumerable") || ctx.get(desc_obj, &PropertyKey::from("enumerable"), value)?.to_boolean() {
        attrs |= Attribute::ENUMERABLE;
    }
    if !has("configurable") || ctx.get(desc_obj, &PropertyKey::from("configurable"), value)?.to_boolean() {
        attrs |= Attribute::CONFIGURABLE;
    }
    if has("get") || has("set") {
        let get = ctx.get(desc_obj, &PropertyKey::from("get"), value)?.as_object().copied();
        let set = ctx.get(desc_obj, &PropertyKey::from("set"), value)?.as_object().copied();
        return Ok(PropertyDescriptor::Accessor(AccessorDescriptor { get, set, attributes: attrs }));
    }
    let val = ctx.get(desc_obj, &PropertyKey::from("value"), value)?;
    if !has("writable") || ctx.get(desc_obj, &PropertyKey::from("writable"), value)?.to_boolean() {
        attrs |= Attribute::WRITABLE;
    }
    Ok(PropertyDescriptor::Data(DataDescriptor::new(val, attrs)))
}

fn define_property_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let JsValue::Object(obj) = args.first().cloned().unwrap_or(JsValue::Undefined) else {
            return Err(JsNativeError::typ("Object.defineProperty called on non-object").into());
        };
        let key = ctx.to_property_key(args.get(1).unwrap_or(&JsValue::Undefined))?;
        let descriptor = object_to_descriptor(ctx, args.get(2).unwrap_or(&JsValue::Undefined))?;
        obj.define_own_property(ctx.heap_mut(), key, descriptor);
        Ok(JsValue::Object(obj))
    })
}

fn define_properties_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let JsValue::Object(obj) = args.first().cloned().unwrap_or(JsValue::Undefined) else {
            return Err(JsNativeError::typ("Object.defineProperties called on non-object").into());
        };
        let props = to_object_arg(ctx, args.get(1..).unwrap_or(&[]))?;
        for key in own_string_keys(ctx, props) {
            let desc_value = ctx.get(props, &key, &JsValue::Object(props))?;
            let descriptor = object_to_descriptor(ctx, &desc_value)?;
            obj.define_own_property(ctx.heap_mut(), key, descriptor);
        }
        Ok(JsValue::Object(obj))
    })
}

fn freeze_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        if let Some(JsValue::Object(obj)) = args.first().cloned() {
            set_integrity(ctx, obj, true);
        }
        Ok(args.first().cloned().unwrap_or(JsValue::Undefined))
    })
}

fn seal_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        if let Some(JsValue::Object(obj)) = args.first().cloned() {
            set_integrity(ctx, obj, false);
        }
        Ok(args.first().cloned().unwrap_or(JsValue::Undefined))
    })
}

/// `[[Freeze]]`/`[[Seal]]`: marks the object non-extensible and strips
/// `configurable` (plus `writable` for a freeze) from every own property.
fn set_integrity(ctx: &mut Context, obj: JsObject, freeze: bool) {
    ctx.heap_mut().get_mut(obj).extensible = false;
    let keys = obj.own_property_keys(ctx.heap());
    for key in keys {
        let Some(desc) = obj.get_own_property(ctx.heap(), &key).cloned() else { continue };
        let updated = match desc {
            PropertyDescriptor::Data(mut d) => {
                d.attributes.remove(Attribute::CONFIGURABLE);
                if freeze {
                    d.attributes.remove(Attribute::WRITABLE);
                }
                PropertyDescriptor::Data(d)
            }
            PropertyDescriptor::Accessor(mut a) => {
                a.attributes.remove(Attribute::CONFIGURABLE);
                PropertyDescriptor::Accessor(a)
            }
        };
        obj.define_own_property(ctx.heap_mut(), key, updated);
    }
}

fn is_frozen_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let Some(JsValue::Object(obj)) = args.first().cloned() else { return Ok(JsValue::from(true)) };
        Ok(JsValue::from(!obj.is_extensible(ctx.heap()) && is_locked(ctx, obj, true)))
    })
}

fn is_sealed_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let Some(JsValue::Object(obj)) = args.first().cloned() else { return Ok(JsValue::from(true)) };
        Ok(JsValue::from(!obj.is_extensible(ctx.heap()) && is_locked(ctx, obj, false)))
    })
}

fn is_locked(ctx: &Context, obj: JsObject, check_writable: bool) -> bool {
    obj.own_property_keys(ctx.heap()).into_iter().all(|key| {
        let Some(desc) = obj.get_own_property(ctx.heap(), &key) else { return true };
        if desc.configurable() {
            return false;
        }
        !check_writable || desc.as_data().map(|d| !d.writable()).unwrap_or(true)
    })
}

fn get_prototype_of_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let obj = to_object_arg(ctx, args)?;
        Ok(obj.prototype(ctx.heap()).map(JsValue::Object).unwrap_or(JsValue::Null))
    })
}

fn set_prototype_of_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let JsValue::Object(obj) = args.first().cloned().unwrap_or(JsValue::Undefined) else {
            return Err(JsNativeError::typ("Object.setPrototypeOf called on non-object").into());
        };
        let proto = match args.get(1) {
            Some(JsValue::Object(p)) => Some(*p),
            _ => None,
        };
        obj.set_prototype(ctx.heap_mut(), proto);
        Ok(JsValue::Object(obj))
    })
}

fn create_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let proto = match args.first() {
            Some(JsValue::Object(p)) => Some(*p),
            Some(JsValue::Null) => None,
            _ => return Err(JsNativeError::typ("Object prototype may only be an Object or null").into()),
        };
        let obj = ctx.heap_mut().insert(ObjectData::new(proto, ObjectKind::Ordinary));
        if let Some(props) = args.get(1) {
            if !props.is_undefined() {
                let props_obj = ctx.to_object(props)?;
                for key in own_string_keys(ctx, props_obj) {
                    let desc_value = ctx.get(props_obj, &key, props)?;
                    let descriptor = object_to_descriptor(ctx, &desc_value)?;
                    obj.define_own_property(ctx.heap_mut(), key, descriptor);
                }
            }
        }
        Ok(JsValue::Object(obj))
    })
}

fn assign_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let target = to_object_arg(ctx, args)?;
        for source in args.get(1..).unwrap_or(&[]) {
            if source.is_null_or_undefined() {
                continue;
            }
            let source_obj = ctx.to_object(source)?;
            for key in own_string_keys(ctx, source_obj) {
                let value = ctx.get(source_obj, &key, source)?;
                ctx.set(target, key, value, &JsValue::Object(target))?;
            }
        }
        Ok(JsValue::Object(target))
    })
}

fn make_array(ctx: &mut Context, items: Vec<JsValue>) -> JsObject {
    let proto = ctx.realm().intrinsics.array_prototype;
    let obj = ctx.heap_mut().insert(ObjectData::new(Some(proto), ObjectKind::Array));
    let heap = ctx.heap_mut();
    for (i, item) in items.iter().enumerate() {
        obj.define_own_property(heap, PropertyKey::Index(i as u32), PropertyDescriptor::data(item.clone(), Attribute::default()));
    }
    obj.define_own_property(heap, PropertyKey::from("length"), PropertyDescriptor::data(items.len() as f64, Attribute::WRITABLE));
    obj
}
