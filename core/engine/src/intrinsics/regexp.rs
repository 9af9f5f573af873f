//! `RegExp`, grounded on `builtins::regexp::RegExp`. Per `SPEC_FULL.md`
//! §4.4, actual pattern matching is out of scope: this stores `source`/
//! `flags` on the object (already produced by `eval::mod.rs`'s regex
//! literal handling) and exposes `source`/`flags`/`toString`, with
//! `exec`/`test` stubbed out rather than backed by a real matcher.

use crate::{
    context::Context,
    error::JsNativeError,
    object::{FunctionKind, NativeFunction, ObjectData, ObjectKind},
    property::{Attribute, PropertyDescriptor, PropertyKey},
    string::JsString,
    value::JsValue,
};

pub fn init(ctx: &mut Context) {
    let proto = ctx.realm().intrinsics.regexp_prototype;
    ctx.register_native(proto, "toString", 0, to_string_native());
    // `exec`/`test` intentionally do not run the pattern against a string —
    // wiring a real matcher (this crate already depends on `regress` for
    // it) is left to a future pass; for now every call reports "no match".
    ctx.register_native(proto, "exec", 1, exec_native());
    ctx.register_native(proto, "test", 1, test_native());

    let function_prototype = ctx.realm().intrinsics.function_prototype;
    let ctor = ctx.heap_mut().insert(ObjectData::new(Some(function_prototype), ObjectKind::Function(FunctionKind::Native(constructor_native(proto)))));
    {
        let heap = ctx.heap_mut();
        ctor.set_data(heap, "name", "RegExp");
        ctor.set_data(heap, "length", JsValue::Number(2.0));
        ctor.define_own_property(heap, PropertyKey::from("prototype"), PropertyDescriptor::data(JsValue::Object(proto), Attribute::empty()));
        proto.define_own_property(
            heap,
            PropertyKey::from("constructor"),
            PropertyDescriptor::data(JsValue::Object(ctor), Attribute::WRITABLE | Attribute::CONFIGURABLE),
        );
    }
    let global = ctx.global_object();
    let heap = ctx.heap_mut();
    global.set_method(heap, "RegExp", JsValue::Object(ctor));
}

fn constructor_native(proto: crate::object::JsObject) -> NativeFunction {
    std::rc::Rc::new(move |_this, args, ctx: &mut Context| {
        let source = match args.first() {
            Some(JsValue::String(s)) => s.clone(),
            Some(v) if !v.is_undefined() => ctx.to_js_string(v)?,
            _ => JsString::from(""),
        };
        let flags = match args.get(1) {
            Some(v) if !v.is_undefined() => ctx.to_js_string(v)?,
            _ => JsString::from(""),
        };
        let obj = ctx.heap_mut().insert(ObjectData::new(Some(proto), ObjectKind::RegExp { source: source.clone(), flags: flags.clone() }));
        let heap = ctx.heap_mut();
        obj.set_data(heap, "source", source);
        obj.set_data(heap, "flags", flags);
        obj.set_data(heap, "lastIndex", JsValue::Number(0.0));
        Ok(JsValue::Object(obj))
    })
}

fn as_regexp(ctx: &Context, value: &JsValue) -> crate::error::JsResult<(JsString, JsString)> {
    match value {
        JsValue::Object(o) => match &ctx.heap().get(*o).kind {
            ObjectKind::RegExp { source, flags } => Ok((source.clone(), flags.clone())),
            _ => Err(JsNativeError::typ("not a RegExp").into()),
        },
        _ => Err(JsNativeError::typ("not a RegExp").into()),
    }
}

fn to_string_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| {
        let (source, flags) = as_regexp(ctx, this)?;
        Ok(JsValue::String(JsString::from(format!("/{source}/{flags}"))))
    })
}

fn exec_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| {
        as_regexp(ctx, this)?;
        Ok(JsValue::Null)
    })
}

fn test_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| {
        as_regexp(ctx, this)?;
        Ok(JsValue::from(false))
    })
}
