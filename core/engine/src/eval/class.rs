//! `class` declarations/expressions, grounded on how `exec/mod.rs`'s
//! `Executor::run` builds a constructor function and wires its prototype
//! chain in the teacher, generalized over the cons-cell `ClassDecl`/
//! `ClassExpr` shape this IR uses instead of a dedicated `StatementList`
//! node per class. Field initializers are desugared into ordinary
//! `this.field = value` assignment statements prepended to the
//! constructor body rather than tracked as a separate `[[Fields]]`
//! internal slot, matching the "keep the IR uniform" approach the rest of
//! this evaluator takes.
//!
//! `super` is resolved through two synthetic bindings (`__super__`, the
//! superclass constructor, and `__super_proto__`, its prototype) in the
//! class's own declarative environment rather than a formal `[[HomeObject]]`
//! slot per method — simpler, and sufficient since this evaluator has no
//! need to support `super` outside of class bodies.

use jsrt_ast::{MethodKind, Node, Payload, Span, Tag};
use jsrt_interner::Sym;

use super::Evaluator;
use crate::{
    environment::{BindingKind, EnvironmentId},
    error::JsResult,
    object::JsObject,
    property::{AccessorDescriptor, Attribute, PropertyDescriptor, PropertyKey},
    value::JsValue,
};

pub(super) const SUPER_CTOR_NAME: &str = "__super__";
pub(super) const SUPER_PROTO_NAME: &str = "__super_proto__";

pub(super) fn eval_class(evaluator: &mut Evaluator, node: &Node, env: EnvironmentId) -> JsResult<(Option<Sym>, JsValue)> {
    let name = node.children[0].as_identifier();
    let extends = &node.children[1];
    let body = &node.children[2];

    let super_ctor = if extends.tag == Tag::Extends {
        Some(evaluator.eval_expr(&extends.children[0], env)?)
    } else {
        None
    };
    let super_proto = match &super_ctor {
        Some(sc) => evaluator.ctx.get_v(sc, &PropertyKey::from("prototype"))?.as_object().copied(),
        None => None,
    };

    let proto_obj = evaluator.ctx.construct_object();
    if let Some(sp) = super_proto {
        proto_obj.set_prototype(evaluator.ctx.heap_mut(), Some(sp));
    }

    let class_env = evaluator.ctx.realm_mut().environments.new_declarative(Some(env));
    if let Some(n) = name {
        evaluator.ctx.realm_mut().environments.create_mutable_binding(class_env, n, BindingKind::Const);
    }
    if let Some(sc) = &super_ctor {
        bind_super(evaluator, class_env, sc.clone(), super_proto);
    }

    let mut constructor_member = None;
    let mut instance_fields = Vec::new();
    let mut static_fields = Vec::new();
    let mut methods = Vec::new();
    let mut static_blocks = Vec::new();

    for member in &body.children {
        match member.tag {
            Tag::ClassMethod => {
                let Payload::ClassMember(info) = &member.payload else { unreachable!() };
                if !info.is_static && is_named(evaluator, &member.children[0], "constructor") {
                    constructor_member = Some(member);
                } else {
                    methods.push(member);
                }
            }
            Tag::ClassField => {
                let Payload::ClassMember(info) = &member.payload else { unreachable!() };
                if info.is_static {
                    static_fields.push(member);
                } else {
                    instance_fields.push(member);
                }
            }
            Tag::StaticBlock => static_blocks.push(member),
            _ => {}
        }
    }

    let (ctor_params, mut ctor_body) = match constructor_member {
        Some(ctor) => {
            let view = ctor.children[1].as_function().expect("constructor carries a FunctionExpr");
            (view.params.clone(), view.body.to_vec())
        }
        None => default_constructor(evaluator, super_ctor.is_some()),
    };

    let insert_at = if super_ctor.is_some() {
        ctor_body
            .iter()
            .position(is_super_call_statement)
            .map(|i| i + 1)
            .unwrap_or(0)
    } else {
        0
    };
    for (offset, field) in instance_fields.iter().enumerate() {
        let key = &field.children[0];
        let value = field.children[1].clone();
        ctor_body.insert(insert_at + offset, field_init_statement(key.clone(), value));
    }

    let ctor_obj = evaluator.make_closure(name, &ctor_params, &ctor_body, class_env, false);
    {
        let heap = evaluator.ctx.heap_mut();
        ctor_obj.define_own_property(
            heap,
            PropertyKey::from("prototype"),
            PropertyDescriptor::data(JsValue::Object(proto_obj), Attribute::empty()),
        );
        proto_obj.define_own_property(
            heap,
            PropertyKey::from("constructor"),
            PropertyDescriptor::data(JsValue::Object(ctor_obj), Attribute::WRITABLE | Attribute::CONFIGURABLE),
        );
    }
    if let Some(JsValue::Object(sc_obj)) = &super_ctor {
        ctor_obj.set_prototype(evaluator.ctx.heap_mut(), Some(*sc_obj));
    }

    for method in methods {
        let Payload::ClassMember(info) = &method.payload else { unreachable!() };
        let (kind, is_static) = (info.kind, info.is_static);
        let target = if is_static { ctor_obj } else { proto_obj };
        let key = evaluator.eval_property_key(&method.children[0], class_env)?;
        let view = method.children[1].as_function().expect("method carries a FunctionExpr");
        let func = evaluator.make_closure(None, view.params, view.body, class_env, false);
        match kind {
            MethodKind::Get => merge_accessor(evaluator, target, key, Some(func), None),
            MethodKind::Set => merge_accessor(evaluator, target, key, None, Some(func)),
            _ => {
                let heap = evaluator.ctx.heap_mut();
                target.define_own_property(
                    heap,
                    key,
                    PropertyDescriptor::data(JsValue::Object(func), Attribute::WRITABLE | Attribute::CONFIGURABLE),
                );
            }
        }
    }

    for field in static_fields {
        let key = evaluator.eval_property_key(&field.children[0], class_env)?;
        let value_node = &field.children[1];
        let value = if value_node.tag == Tag::Empty {
            JsValue::Undefined
        } else {
            let field_env = evaluator.ctx.realm_mut().environments.new_function(Some(class_env), Some(JsValue::Object(ctor_obj)));
            evaluator.eval_expr(value_node, field_env)?
        };
        let heap = evaluator.ctx.heap_mut();
        ctor_obj.define_own_property(heap, key, PropertyDescriptor::data(value, Attribute::WRITABLE | Attribute::ENUMERABLE | Attribute::CONFIGURABLE));
    }

    for block in static_blocks {
        let block_env = evaluator.ctx.realm_mut().environments.new_function(Some(class_env), Some(JsValue::Object(ctor_obj)));
        evaluator.hoist_var_scope(&block.children, block_env);
        evaluator.eval_statement_list(&block.children, block_env)?;
    }

    let class_value = JsValue::Object(ctor_obj);
    if let Some(n) = name {
        evaluator.initialize_binding(class_env, n, class_value.clone());
    }
    Ok((name, class_value))
}

fn bind_super(evaluator: &mut Evaluator, class_env: EnvironmentId, ctor: JsValue, proto: Option<JsObject>) {
    let ctor_sym = evaluator.ctx.interner_mut().get_or_intern(SUPER_CTOR_NAME);
    let proto_sym = evaluator.ctx.interner_mut().get_or_intern(SUPER_PROTO_NAME);
    evaluator.ctx.realm_mut().environments.create_mutable_binding(class_env, ctor_sym, BindingKind::Const);
    evaluator.initialize_binding(class_env, ctor_sym, ctor);
    evaluator.ctx.realm_mut().environments.create_mutable_binding(class_env, proto_sym, BindingKind::Const);
    evaluator.initialize_binding(class_env, proto_sym, proto.map(JsValue::Object).unwrap_or(JsValue::Null));
}

/// `constructor(...__ctor_args__) { super(...__ctor_args__); }` for a
/// derived class with no explicit constructor, or an empty body for a
/// base class.
fn default_constructor(evaluator: &mut Evaluator, has_super: bool) -> (Node, Vec<Node>) {
    if !has_super {
        return (Node::new(Tag::Parameters, Span::EMPTY), Vec::new());
    }
    let args_sym = evaluator.ctx.interner_mut().get_or_intern("__ctor_args__");
    let rest = Node::with_children(
        Tag::RestBinding,
        Span::EMPTY,
        vec![Node::with_payload(Tag::IdBinding, Span::EMPTY, Payload::Sym(args_sym))],
    );
    let params = Node::with_children(Tag::Parameters, Span::EMPTY, vec![rest]);
    let args_ref = Node::with_payload(Tag::Identifier, Span::EMPTY, Payload::Sym(args_sym));
    let spread = Node::with_children(Tag::SpreadElement, Span::EMPTY, vec![args_ref]);
    let super_call = Node::with_children(Tag::SuperCall, Span::EMPTY, vec![spread]);
    let stmt = Node::with_children(Tag::ExpressionStatement, Span::EMPTY, vec![super_call]);
    (params, vec![stmt])
}

fn is_super_call_statement(stmt: &Node) -> bool {
    stmt.tag == Tag::ExpressionStatement && stmt.children.first().map(|c| c.tag == Tag::SuperCall).unwrap_or(false)
}

/// `this.<key> = <value>;`, desugaring a `ClassField` member into a plain
/// assignment statement spliced into the constructor body. Private names
/// (`#x`) are treated as an ordinary (non-computed) key here — this
/// evaluator has no hard-privacy enforcement, just the field's slot.
fn field_init_statement(key: Node, value: Node) -> Node {
    let this_expr = Node::new(Tag::ThisExpr, Span::EMPTY);
    let member = match key.tag {
        Tag::ComputedKey => {
            let inner = key.children.into_iter().next().expect("computed key carries an expression");
            Node::with_children(Tag::ComputedMember, Span::EMPTY, vec![this_expr, inner])
        }
        Tag::Identifier | Tag::PrivateName => {
            let id = Node::with_payload(Tag::Identifier, Span::EMPTY, key.payload);
            Node::with_children(Tag::Member, Span::EMPTY, vec![this_expr, id])
        }
        Tag::Literal if matches!(key.payload, Payload::Sym(_)) => {
            let id = Node::with_payload(Tag::Identifier, Span::EMPTY, key.payload);
            Node::with_children(Tag::Member, Span::EMPTY, vec![this_expr, id])
        }
        _ => Node::with_children(Tag::ComputedMember, Span::EMPTY, vec![this_expr, key]),
    };
    let value = if value.tag == Tag::Empty { Node::with_payload(Tag::Literal, Span::EMPTY, Payload::Undefined) } else { value };
    let assign = Node::leaf(Tag::Assign, Span::EMPTY, Payload::AssignOp(jsrt_ast::AssignOp::Assign), vec![member, value]);
    Node::with_children(Tag::ExpressionStatement, Span::EMPTY, vec![assign])
}

fn is_named(evaluator: &Evaluator, key_node: &Node, name: &str) -> bool {
    if let Some(sym) = key_node.as_identifier() {
        return evaluator.ctx.interner().resolve(sym) == name;
    }
    if key_node.tag == Tag::Literal {
        if let Payload::Sym(sym) = key_node.payload {
            return evaluator.ctx.interner().resolve(sym) == name;
        }
    }
    false
}

fn merge_accessor(evaluator: &mut Evaluator, target: JsObject, key: PropertyKey, get: Option<JsObject>, set: Option<JsObject>) {
    let existing = target.get_own_property(evaluator.ctx.heap(), &key).cloned();
    let (prev_get, prev_set) = match existing {
        Some(PropertyDescriptor::Accessor(a)) => (a.get, a.set),
        _ => (None, None),
    };
    let desc = PropertyDescriptor::Accessor(AccessorDescriptor {
        get: get.or(prev_get),
        set: set.or(prev_set),
        attributes: Attribute::CONFIGURABLE,
    });
    target.define_own_property(evaluator.ctx.heap_mut(), key, desc);
}
