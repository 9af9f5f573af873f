//! `Function.prototype`, grounded on `builtins::function::BuiltInFunctionObject`.
//! Only `call`/`apply`/`bind` plus `toString` — there is no `new Function(...)`
//! source-from-string constructor (no form of dynamic `eval`-from-source for
//! function bodies is part of this engine's supported surface).

use crate::{
    context::Context,
    error::JsNativeError,
    intrinsics::array,
    object::{FunctionKind, JsObject, NativeFunction, ObjectData, ObjectKind},
    string::JsString,
    value::JsValue,
};

pub fn init(ctx: &mut Context) {
    let proto = ctx.realm().intrinsics.function_prototype;
    ctx.register_native(proto, "call", 1, call_native());
    ctx.register_native(proto, "apply", 2, apply_native());
    ctx.register_native(proto, "bind", 1, bind_native());
    ctx.register_native(proto, "toString", 0, to_string_native());
}

fn call_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let this_arg = args.first().cloned().unwrap_or(JsValue::Undefined);
        ctx.call(this, &this_arg, args.get(1..).unwrap_or(&[]))
    })
}

fn apply_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let this_arg = args.first().cloned().unwrap_or(JsValue::Undefined);
        let call_args = match args.get(1) {
            Some(JsValue::Object(o)) if o.is_array(ctx.heap()) => array::elements(ctx, *o),
            Some(v) if v.is_null_or_undefined() => Vec::new(),
            None => Vec::new(),
            Some(_) => return Err(JsNativeError::typ("CreateListFromArrayLike called on non-object").into()),
        };
        ctx.call(this, &this_arg, &call_args)
    })
}

fn bind_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let target = match this {
            JsValue::Object(o) if o.is_callable(ctx.heap()) => *o,
            _ => return Err(JsNativeError::typ("Bind must be called on a function").into()),
        };
        let bound_this = args.first().cloned().unwrap_or(JsValue::Undefined);
        let bound_args = args.get(1..).unwrap_or(&[]).to_vec();
        let proto = ctx.realm().intrinsics.function_prototype;
        let bound = ctx.heap_mut().insert(ObjectData::new(
            Some(proto),
            ObjectKind::Function(FunctionKind::Native(bound_native(target, bound_this, bound_args))),
        ));
        let heap = ctx.heap_mut();
        bound.set_data(heap, "name", JsString::from(format!("bound {}", target_name(ctx, target))));
        Ok(JsValue::Object(bound))
    })
}

fn target_name(ctx: &Context, target: JsObject) -> String {
    target
        .get_own_property(ctx.heap(), &crate::property::PropertyKey::from("name"))
        .and_then(|d| d.as_data())
        .map(|d| d.value.to_display_string())
        .unwrap_or_default()
}

fn bound_native(target: JsObject, bound_this: JsValue, bound_args: Vec<JsValue>) -> NativeFunction {
    std::rc::Rc::new(move |_this, args, ctx: &mut Context| {
        let mut call_args = bound_args.clone();
        call_args.extend(args.iter().cloned());
        ctx.call(&JsValue::Object(target), &bound_this, &call_args)
    })
}

fn to_string_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| {
        let name = target_name(ctx, match this {
            JsValue::Object(o) => *o,
            _ => return Err(JsNativeError::typ("not a function").into()),
        });
        Ok(JsValue::String(JsString::from(format!("function {name}() {{ [native code] }}"))))
    })
}
