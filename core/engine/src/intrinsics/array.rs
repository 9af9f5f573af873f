//! The `Array` constructor and `Array.prototype`, grounded on
//! `builtins::array::Array`. Arrays themselves are ordinary objects with
//! an `ObjectKind::Array` tag plus dense indexed properties and a
//! `length` data property — no separate exotic `[[DefineOwnProperty]]`
//! override for index/length coupling, matching `eval::create_array`'s
//! own simplified treatment.

use crate::{
    context::Context,
    error::JsNativeError,
    object::{FunctionKind, JsObject, NativeFunction, ObjectData, ObjectKind},
    property::{Attribute, PropertyDescriptor, PropertyKey},
    value::JsValue,
};

pub fn init(ctx: &mut Context) {
    let proto = ctx.realm().intrinsics.array_prototype;
    {
        let heap = ctx.heap_mut();
        proto.define_own_property(heap, PropertyKey::from("length"), PropertyDescriptor::data(JsValue::Number(0.0), Attribute::WRITABLE));
    }
    ctx.register_native(proto, "push", 1, push_native());
    ctx.register_native(proto, "pop", 0, pop_native());
    ctx.register_native(proto, "shift", 0, shift_native());
    ctx.register_native(proto, "unshift", 1, unshift_native());
    ctx.register_native(proto, "slice", 2, slice_native());
    ctx.register_native(proto, "splice", 2, splice_native());
    ctx.register_native(proto, "concat", 1, concat_native());
    ctx.register_native(proto, "join", 1, join_native());
    ctx.register_native(proto, "indexOf", 1, index_of_native());
    ctx.register_native(proto, "includes", 1, includes_native());
    ctx.register_native(proto, "forEach", 1, for_each_native());
    ctx.register_native(proto, "map", 1, map_native());
    ctx.register_native(proto, "filter", 1, filter_native());
    ctx.register_native(proto, "reduce", 1, reduce_native());
    ctx.register_native(proto, "find", 1, find_native());
    ctx.register_native(proto, "some", 1, some_native());
    ctx.register_native(proto, "every", 1, every_native());
    ctx.register_native(proto, "reverse", 0, reverse_native());
    ctx.register_native(proto, "toString", 0, to_string_native());

    let function_prototype = ctx.realm().intrinsics.function_prototype;
    let ctor = ctx.heap_mut().insert(ObjectData::new(Some(function_prototype), ObjectKind::Function(FunctionKind::Native(constructor_native()))));
    {
        let heap = ctx.heap_mut();
        ctor.set_data(heap, "name", "Array");
        ctor.set_data(heap, "length", JsValue::Number(1.0));
        ctor.define_own_property(heap, PropertyKey::from("prototype"), PropertyDescriptor::data(JsValue::Object(proto), Attribute::empty()));
        proto.define_own_property(
            heap,
            PropertyKey::from("constructor"),
            PropertyDescriptor::data(JsValue::Object(ctor), Attribute::WRITABLE | Attribute::CONFIGURABLE),
        );
    }
    ctx.register_native(ctor, "isArray", 1, is_array_native());
    ctx.register_native(ctor, "from", 1, from_native());
    ctx.register_native(ctor, "of", 0, of_native());

    let global = ctx.global_object();
    let heap = ctx.heap_mut();
    global.set_method(heap, "Array", JsValue::Object(ctor));
}

fn as_array(ctx: &Context, value: &JsValue) -> crate::error::JsResult<JsObject> {
    match value {
        JsValue::Object(o) if o.is_array(ctx.heap()) => Ok(*o),
        _ => Err(JsNativeError::typ("not an array").into()),
    }
}

pub fn elements(ctx: &Context, obj: JsObject) -> Vec<JsValue> {
    let len = length(ctx, obj);
    (0..len)
        .map(|i| {
            obj.get_own_property(ctx.heap(), &PropertyKey::Index(i))
                .and_then(|d| d.as_data())
                .map(|d| d.value.clone())
                .unwrap_or(JsValue::Undefined)
        })
        .collect()
}

fn length(ctx: &Context, obj: JsObject) -> u32 {
    obj.get_own_property(ctx.heap(), &PropertyKey::from("length"))
        .and_then(|d| d.as_data())
        .and_then(|d| d.value.as_number())
        .unwrap_or(0.0) as u32
}

fn set_length(ctx: &mut Context, obj: JsObject, len: u32) {
    let heap = ctx.heap_mut();
    obj.define_own_property(heap, PropertyKey::from("length"), PropertyDescriptor::data(JsValue::Number(len as f64), Attribute::WRITABLE));
}

fn write_elements(ctx: &mut Context, obj: JsObject, items: &[JsValue]) {
    let heap = ctx.heap_mut();
    for (i, item) in items.iter().enumerate() {
        obj.define_own_property(heap, PropertyKey::Index(i as u32), PropertyDescriptor::data(item.clone(), Attribute::default()));
    }
    obj.define_own_property(heap, PropertyKey::from("length"), PropertyDescriptor::data(items.len() as f64, Attribute::WRITABLE));
}

pub fn make_array(ctx: &mut Context, items: Vec<JsValue>) -> JsObject {
    let proto = ctx.realm().intrinsics.array_prototype;
    let obj = ctx.heap_mut().insert(ObjectData::new(Some(proto), ObjectKind::Array));
    write_elements(ctx, obj, &items);
    obj
}

fn constructor_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        if args.len() == 1 {
            if let Some(n) = args[0].as_number() {
                let obj = make_array(ctx, Vec::new());
                set_length(ctx, obj, n as u32);
                return Ok(JsValue::Object(obj));
            }
        }
        Ok(JsValue::Object(make_array(ctx, args.to_vec())))
    })
}

fn is_array_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let is_array = matches!(args.first(), Some(JsValue::Object(o)) if o.is_array(ctx.heap()));
        Ok(JsValue::from(is_array))
    })
}

fn from_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| {
        let source = args.first().cloned().unwrap_or(JsValue::Undefined);
        let items = match &source {
            JsValue::Object(o) if o.is_array(ctx.heap()) => elements(ctx, *o),
            JsValue::String(s) => s.units().iter().map(|u| JsValue::String(crate::string::JsString::from_utf16(vec![*u]))).collect(),
            _ => Vec::new(),
        };
        let mapped = match args.get(1) {
            Some(f) if f.as_object().map(|o| o.is_callable(ctx.heap())).unwrap_or(false) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    out.push(ctx.call(f, &JsValue::Undefined, &[item, JsValue::Number(i as f64)])?);
                }
                out
            }
            _ => items,
        };
        Ok(JsValue::Object(make_array(ctx, mapped)))
    })
}

fn of_native() -> NativeFunction {
    std::rc::Rc::new(|_this, args, ctx: &mut Context| Ok(JsValue::Object(make_array(ctx, args.to_vec()))))
}

fn push_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let mut items = elements(ctx, obj);
        items.extend(args.iter().cloned());
        let len = items.len();
        write_elements(ctx, obj, &items);
        Ok(JsValue::Number(len as f64))
    })
}

fn pop_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let mut items = elements(ctx, obj);
        let popped = items.pop();
        write_elements(ctx, obj, &items);
        Ok(popped.unwrap_or(JsValue::Undefined))
    })
}

fn shift_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let mut items = elements(ctx, obj);
        if items.is_empty() {
            return Ok(JsValue::Undefined);
        }
        let shifted = items.remove(0);
        write_elements(ctx, obj, &items);
        Ok(shifted)
    })
}

fn unshift_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let mut items = elements(ctx, obj);
        for (i, arg) in args.iter().enumerate() {
            items.insert(i, arg.clone());
        }
        let len = items.len();
        write_elements(ctx, obj, &items);
        Ok(JsValue::Number(len as f64))
    })
}

/// `RelativeIndex`: a negative argument counts back from the end, clamped
/// to `[0, len]`.
fn relative_index(n: f64, len: usize) -> usize {
    if n.is_nan() {
        return 0;
    }
    if n < 0.0 {
        ((len as f64 + n).max(0.0)) as usize
    } else {
        (n as usize).min(len)
    }
}

fn slice_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let items = elements(ctx, obj);
        let len = items.len();
        let start = args.first().and_then(|v| v.as_number()).map(|n| relative_index(n, len)).unwrap_or(0);
        let end = args.get(1).and_then(|v| v.as_number()).map(|n| relative_index(n, len)).unwrap_or(len);
        let slice = if start < end { items[start..end].to_vec() } else { Vec::new() };
        Ok(JsValue::Object(make_array(ctx, slice)))
    })
}

fn splice_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let mut items = elements(ctx, obj);
        let len = items.len();
        let start = args.first().and_then(|v| v.as_number()).map(|n| relative_index(n, len)).unwrap_or(0);
        let delete_count = args
            .get(1)
            .and_then(|v| v.as_number())
            .map(|n| (n.max(0.0) as usize).min(len - start))
            .unwrap_or(len - start);
        let removed: Vec<JsValue> = items.splice(start..start + delete_count, args.get(2..).unwrap_or(&[]).iter().cloned()).collect();
        write_elements(ctx, obj, &items);
        Ok(JsValue::Object(make_array(ctx, removed)))
    })
}

fn concat_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let mut items = elements(ctx, obj);
        for arg in args {
            match arg {
                JsValue::Object(o) if o.is_array(ctx.heap()) => items.extend(elements(ctx, *o)),
                other => items.push(other.clone()),
            }
        }
        Ok(JsValue::Object(make_array(ctx, items)))
    })
}

fn join_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let items = elements(ctx, obj);
        let sep = match args.first() {
            Some(v) if !v.is_undefined() => ctx.to_js_string(v)?.to_std_string(),
            _ => ",".to_string(),
        };
        let parts: Vec<String> = items
            .iter()
            .map(|v| if v.is_null_or_undefined() { Ok(String::new()) } else { ctx.to_js_string(v).map(|s| s.to_std_string()) })
            .collect::<crate::error::JsResult<_>>()?;
        Ok(JsValue::String(crate::string::JsString::from(parts.join(&sep))))
    })
}

fn to_string_native() -> NativeFunction {
    join_native()
}

fn index_of_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let items = elements(ctx, obj);
        let target = args.first().cloned().unwrap_or(JsValue::Undefined);
        let index = items.iter().position(|v| *v == target).map(|i| i as f64).unwrap_or(-1.0);
        Ok(JsValue::Number(index))
    })
}

fn includes_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let items = elements(ctx, obj);
        let target = args.first().cloned().unwrap_or(JsValue::Undefined);
        Ok(JsValue::from(items.iter().any(|v| *v == target)))
    })
}

fn for_each_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let items = elements(ctx, obj);
        let callback = args.first().cloned().unwrap_or(JsValue::Undefined);
        let this_arg = args.get(1).cloned().unwrap_or(JsValue::Undefined);
        for (i, item) in items.into_iter().enumerate() {
            ctx.call(&callback, &this_arg, &[item, JsValue::Number(i as f64), JsValue::Object(obj)])?;
        }
        Ok(JsValue::Undefined)
    })
}

fn map_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let items = elements(ctx, obj);
        let callback = args.first().cloned().unwrap_or(JsValue::Undefined);
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            out.push(ctx.call(&callback, &JsValue::Undefined, &[item, JsValue::Number(i as f64), JsValue::Object(obj)])?);
        }
        Ok(JsValue::Object(make_array(ctx, out)))
    })
}

fn filter_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let items = elements(ctx, obj);
        let callback = args.first().cloned().unwrap_or(JsValue::Undefined);
        let mut out = Vec::new();
        for (i, item) in items.into_iter().enumerate() {
            let keep = ctx.call(&callback, &JsValue::Undefined, &[item.clone(), JsValue::Number(i as f64), JsValue::Object(obj)])?;
            if keep.to_boolean() {
                out.push(item);
            }
        }
        Ok(JsValue::Object(make_array(ctx, out)))
    })
}

fn reduce_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let items = elements(ctx, obj);
        let callback = args.first().cloned().unwrap_or(JsValue::Undefined);
        let mut iter = items.into_iter().enumerate();
        let mut acc = match args.get(1) {
            Some(initial) => initial.clone(),
            None => match iter.next() {
                Some((_, v)) => v,
                None => return Err(JsNativeError::typ("Reduce of empty array with no initial value").into()),
            },
        };
        for (i, item) in iter {
            acc = ctx.call(&callback, &JsValue::Undefined, &[acc, item, JsValue::Number(i as f64), JsValue::Object(obj)])?;
        }
        Ok(acc)
    })
}

fn find_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let items = elements(ctx, obj);
        let callback = args.first().cloned().unwrap_or(JsValue::Undefined);
        for (i, item) in items.into_iter().enumerate() {
            let matched = ctx.call(&callback, &JsValue::Undefined, &[item.clone(), JsValue::Number(i as f64), JsValue::Object(obj)])?;
            if matched.to_boolean() {
                return Ok(item);
            }
        }
        Ok(JsValue::Undefined)
    })
}

fn some_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let items = elements(ctx, obj);
        let callback = args.first().cloned().unwrap_or(JsValue::Undefined);
        for (i, item) in items.into_iter().enumerate() {
            let matched = ctx.call(&callback, &JsValue::Undefined, &[item, JsValue::Number(i as f64), JsValue::Object(obj)])?;
            if matched.to_boolean() {
                return Ok(JsValue::from(true));
            }
        }
        Ok(JsValue::from(false))
    })
}

fn every_native() -> NativeFunction {
    std::rc::Rc::new(|this, args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let items = elements(ctx, obj);
        let callback = args.first().cloned().unwrap_or(JsValue::Undefined);
        for (i, item) in items.into_iter().enumerate() {
            let matched = ctx.call(&callback, &JsValue::Undefined, &[item, JsValue::Number(i as f64), JsValue::Object(obj)])?;
            if !matched.to_boolean() {
                return Ok(JsValue::from(false));
            }
        }
        Ok(JsValue::from(true))
    })
}

fn reverse_native() -> NativeFunction {
    std::rc::Rc::new(|this, _args, ctx: &mut Context| {
        let obj = as_array(ctx, this)?;
        let mut items = elements(ctx, obj);
        items.reverse();
        write_elements(ctx, obj, &items);
        Ok(JsValue::Object(obj))
    })
}

#[cfg(test)]
mod tests {
    use super::relative_index;

    #[test]
    fn negative_indices_count_back_from_the_end() {
        assert_eq!(relative_index(-1.0, 5), 4);
        assert_eq!(relative_index(-5.0, 5), 0);
    }

    #[test]
    fn negative_indices_past_the_start_clamp_to_zero() {
        assert_eq!(relative_index(-100.0, 5), 0);
    }

    #[test]
    fn positive_indices_clamp_to_len() {
        assert_eq!(relative_index(3.0, 5), 3);
        assert_eq!(relative_index(100.0, 5), 5);
    }

    #[test]
    fn nan_behaves_as_zero() {
        assert_eq!(relative_index(f64::NAN, 5), 0);
    }
}
