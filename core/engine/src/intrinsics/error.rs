//! The `Error` constructor family, grounded on `builtins::error::Error`
//! (and its `type_error`/`range_error`/... siblings), collapsed into one
//! generic constructor factory since every member of the family differs
//! only by name and cached prototype.

use crate::{
    context::Context,
    error::{JsNativeError, JsNativeErrorKind},
    object::{FunctionKind, JsObject, NativeFunction, ObjectData, ObjectKind},
    property::PropertyKey,
    string::JsString,
    value::JsValue,
};

pub fn init(ctx: &mut Context) {
    use JsNativeErrorKind::*;
    register(ctx, Error, ctx.realm().intrinsics.error_prototype);
    register(ctx, TypeError, ctx.realm().intrinsics.type_error_prototype);
    register(ctx, RangeError, ctx.realm().intrinsics.range_error_prototype);
    register(ctx, ReferenceError, ctx.realm().intrinsics.reference_error_prototype);
    register(ctx, SyntaxError, ctx.realm().intrinsics.syntax_error_prototype);
    register_aggregate(ctx, ctx.realm().intrinsics.aggregate_error_prototype);
}

fn register(ctx: &mut Context, kind: JsNativeErrorKind, prototype: JsObject) {
    let name = kind.name();
    {
        let heap = ctx.heap_mut();
        prototype.set_data(heap, "name", JsString::from(name));
        prototype.set_data(heap, "message", JsString::from(""));
    }
    ctx.register_native(prototype, "toString", 0, to_string_native());

    let function_prototype = ctx.realm().intrinsics.function_prototype;
    let ctor_obj = ctx.heap_mut().insert(ObjectData::new(
        Some(function_prototype),
        ObjectKind::Function(FunctionKind::Native(constructor_native(kind))),
    ));
    {
        let heap = ctx.heap_mut();
        ctor_obj.set_data(heap, "name", JsString::from(name));
        ctor_obj.set_data(heap, "length", JsValue::Number(1.0));
        ctor_obj.define_own_property(
            heap,
            PropertyKey::from("prototype"),
            crate::property::PropertyDescriptor::data(JsValue::Object(prototype), crate::property::Attribute::empty()),
        );
        prototype.define_own_property(
            heap,
            PropertyKey::from("constructor"),
            crate::property::PropertyDescriptor::data(
                JsValue::Object(ctor_obj),
                crate::property::Attribute::WRITABLE | crate::property::Attribute::CONFIGURABLE,
            ),
        );
    }
    let global = ctx.global_object();
    let heap = ctx.heap_mut();
    global.set_method(heap, name, JsValue::Object(ctor_obj));
}

/// `AggregateError` differs from the rest of the family only in its
/// constructor signature (`new AggregateError(errors, message)`, taking an
/// iterable of the errors it wraps before the message), so it shares
/// `register`'s prototype/`toString` plumbing but supplies its own
/// constructor rather than going through [`constructor_native`].
fn register_aggregate(ctx: &mut Context, prototype: JsObject) {
    let name = JsNativeErrorKind::AggregateError.name();
    {
        let heap = ctx.heap_mut();
        prototype.set_data(heap, "name", JsString::from(name));
        prototype.set_data(heap, "message", JsString::from(""));
    }
    ctx.register_native(prototype, "toString", 0, to_string_native());

    let function_prototype = ctx.realm().intrinsics.function_prototype;
    let ctor_obj = ctx.heap_mut().insert(ObjectData::new(
        Some(function_prototype),
        ObjectKind::Function(FunctionKind::Native(aggregate_constructor_native())),
    ));
    {
        let heap = ctx.heap_mut();
        ctor_obj.set_data(heap, "name", JsString::from(name));
        ctor_obj.set_data(heap, "length", JsValue::Number(2.0));
        ctor_obj.define_own_property(
            heap,
            PropertyKey::from("prototype"),
            crate::property::PropertyDescriptor::data(JsValue::Object(prototype), crate::property::Attribute::empty()),
        );
        prototype.define_own_property(
            heap,
            PropertyKey::from("constructor"),
            crate::property::PropertyDescriptor::data(
                JsValue::Object(ctor_obj),
                crate::property::Attribute::WRITABLE | crate::property::Attribute::CONFIGURABLE,
            ),
        );
    }
    let global = ctx.global_object();
    let heap = ctx.heap_mut();
    global.set_method(heap, name, JsValue::Object(ctor_obj));
}

fn aggregate_constructor_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let proto = ctx.realm().intrinsics.aggregate_error_prototype;
        let obj = ctx.heap_mut().insert(ObjectData::new(Some(proto), ObjectKind::Error(JsNativeErrorKind::AggregateError)));
        let errors = match args.first() {
            Some(JsValue::Object(o)) if o.is_array(ctx.heap()) => crate::intrinsics::array::elements(ctx, *o),
            _ => Vec::new(),
        };
        let errors_array = crate::intrinsics::array::make_array(ctx, errors);
        if let Some(message) = args.get(1) {
            if !message.is_undefined() {
                let message = ctx.to_js_string(message)?;
                let heap = ctx.heap_mut();
                obj.set_data(heap, "message", message);
            }
        }
        let heap = ctx.heap_mut();
        obj.set_data(heap, "errors", JsValue::Object(errors_array));
        Ok(JsValue::Object(obj))
    })
}

/// `new Error(message)`/`Error(message)` behave the same way (a bare call
/// still constructs an error object), matching `ErrorObject::constructor`.
fn constructor_native(kind: JsNativeErrorKind) -> NativeFunction {
    std::rc::Rc::new(move |_this, args, ctx: &mut Context| {
        let proto = ctx.realm().error_prototype_for(kind);
        let obj = ctx.heap_mut().insert(ObjectData::new(Some(proto), ObjectKind::Error(kind)));
        if let Some(message) = args.first() {
            if !message.is_undefined() {
                let message = ctx.to_js_string(message)?;
                let heap = ctx.heap_mut();
                obj.set_data(heap, "message", message);
            }
        }
        Ok(JsValue::Object(obj))
    })
}

fn to_string_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| {
        let name = ctx.get_v(this, &PropertyKey::from("name"))?;
        let name = if name.is_undefined() { "Error".to_string() } else { ctx.to_js_string(&name)?.to_std_string() };
        let message = ctx.get_v(this, &PropertyKey::from("message"))?;
        let message = if message.is_undefined() { String::new() } else { ctx.to_js_string(&message)?.to_std_string() };
        let result = if message.is_empty() {
            name
        } else if name.is_empty() {
            message
        } else {
            format!("{name}: {message}")
        };
        Ok(JsValue::String(JsString::from(result)))
    })
}

/// Builds an `AggregateError` directly from already-computed parts, for
/// callers (`Promise.any`) that assemble the `errors` list themselves
/// rather than receiving it as a constructor argument.
pub fn new_aggregate_error(ctx: &mut Context, errors: Vec<JsValue>, message: &str) -> JsValue {
    let proto = ctx.realm().intrinsics.aggregate_error_prototype;
    let obj = ctx.heap_mut().insert(ObjectData::new(Some(proto), ObjectKind::Error(JsNativeErrorKind::AggregateError)));
    let errors_array = crate::intrinsics::array::make_array(ctx, errors);
    let heap = ctx.heap_mut();
    obj.set_data(heap, "message", JsString::from(message));
    obj.set_data(heap, "errors", JsValue::Object(errors_array));
    JsValue::Object(obj)
}

/// Builds a throwable error object without a [`Context`] call-site round
/// trip, used by intrinsics that need to raise e.g. a `TypeError` from
/// inside a native function body. Thin wrapper kept here (rather than on
/// `JsNativeError` itself) since it needs `Context::error_to_value`-style
/// prototype wiring.
pub fn make_error(ctx: &mut Context, error: &JsNativeError) -> JsValue {
    ctx.error_to_value(&error.clone().into())
}
