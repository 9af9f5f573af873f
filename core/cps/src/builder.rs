//! Node constructors for the IR fragments the rewrite synthesises:
//! `Promise`/`.then`/`.catch` call trees, trampoline declarations, and
//! generator result objects. Kept apart from [`crate::rewrite`] so the
//! conversion logic reads as "what shape do I need" rather than being
//! interleaved with `Node::with_children` boilerplate.

use jsrt_ast::{AssignOp, FunctionFlags, MethodKind, Node, Payload, Span, Tag, UnaryOp};
use jsrt_interner::{Interner, Sym};

pub fn ident(sym: Sym) -> Node {
    Node::with_payload(Tag::Identifier, Span::EMPTY, Payload::Sym(sym))
}

pub fn empty() -> Node {
    Node::new(Tag::Empty, Span::EMPTY)
}

pub fn bool_lit(value: bool) -> Node {
    Node::with_payload(Tag::Literal, Span::EMPTY, Payload::Bool(value))
}

pub fn undefined() -> Node {
    Node::with_payload(Tag::Literal, Span::EMPTY, Payload::Undefined)
}

pub fn member(object: Node, prop: Sym) -> Node {
    Node::with_children(Tag::Member, Span::EMPTY, vec![object, ident(prop)])
}

pub fn call(callee: Node, args: Vec<Node>) -> Node {
    let mut children = vec![callee];
    children.extend(args);
    Node::with_children(Tag::Call, Span::EMPTY, children)
}

pub fn new_expr(callee: Node, args: Vec<Node>) -> Node {
    let mut children = vec![callee];
    children.extend(args);
    Node::with_children(Tag::New, Span::EMPTY, children)
}

pub fn expr_stmt(expr: Node) -> Node {
    Node::with_children(Tag::ExpressionStatement, Span::EMPTY, vec![expr])
}

pub fn return_stmt(expr: Option<Node>) -> Node {
    Node::with_children(Tag::Return, Span::EMPTY, expr.into_iter().collect())
}

pub fn throw_stmt(expr: Node) -> Node {
    Node::with_children(Tag::Throw, Span::EMPTY, vec![expr])
}

pub fn block(stmts: Vec<Node>) -> Node {
    Node::with_children(Tag::Block, Span::EMPTY, stmts)
}

pub fn params_node(names: Vec<Sym>) -> Node {
    Node::with_children(
        Tag::Parameters,
        Span::EMPTY,
        names.into_iter().map(id_binding).collect(),
    )
}

pub fn id_binding(sym: Sym) -> Node {
    Node::with_payload(Tag::IdBinding, Span::EMPTY, Payload::Sym(sym))
}

/// A synthesised `(params) => { body }` arrow with a statement-list body
/// (never a concise-body arrow, so [`crate::rewrite`] never has to decide
/// whether to wrap a single expression in an implicit `return`).
pub fn arrow(param_syms: Vec<Sym>, body: Vec<Node>) -> Node {
    let mut children = vec![empty(), params_node(param_syms)];
    children.extend(body);
    Node::leaf(
        Tag::ArrowFunction,
        Span::EMPTY,
        Payload::FunctionFlags(FunctionFlags::default()),
        children,
    )
}

pub fn let_decl(name: Sym, init: Option<Node>) -> Node {
    let_decl_pattern(id_binding(name), init)
}

/// Like [`let_decl`] but the declared target can be an arbitrary binding
/// pattern (e.g. the `left` side lifted out of a `for-of`, or a catch
/// parameter) rather than a single identifier.
pub fn let_decl_pattern(target: Node, init: Option<Node>) -> Node {
    let mut binding_children = vec![target];
    binding_children.extend(init);
    let binding = Node::with_children(Tag::Binding, Span::EMPTY, binding_children);
    Node::with_children(Tag::LetDecl, Span::EMPTY, vec![binding])
}

pub fn unary_not(expr: Node) -> Node {
    Node::leaf(Tag::Unary, Span::EMPTY, Payload::UnaryOp(UnaryOp::Not), vec![expr])
}

pub fn assign(target: Node, value: Node) -> Node {
    Node::leaf(
        Tag::Assign,
        Span::EMPTY,
        Payload::AssignOp(AssignOp::Assign),
        vec![target, value],
    )
}

pub fn try_stmt(try_body: Vec<Node>, catch_param: Sym, catch_body: Vec<Node>) -> Node {
    let catch = Node::with_children(
        Tag::Catch,
        Span::EMPTY,
        vec![id_binding(catch_param), block(catch_body)],
    );
    Node::with_children(
        Tag::Try,
        Span::EMPTY,
        vec![block(try_body), catch, empty()],
    )
}

pub fn if_stmt(test: Node, consequent: Node, alternate: Node) -> Node {
    Node::with_children(Tag::If, Span::EMPTY, vec![test, consequent, alternate])
}

/// A data property `key: value` (`Payload::MethodKind(Normal)`, matching
/// how the parser tags a plain `key: value` pair).
pub fn data_prop(key: Node, value: Node) -> Node {
    Node::leaf(
        Tag::PropertyDefinition,
        Span::EMPTY,
        Payload::MethodKind(MethodKind::Normal),
        vec![key, value],
    )
}

/// A method property whose value is a synthesised arrow (arrows need no
/// `this`/`super` binding here, so a real `FunctionExpr` method is
/// unnecessary); still tagged `MethodKind::Normal` since the distinction
/// only matters for `get`/`set`/generator accessors.
pub fn method_prop(key: Node, param_syms: Vec<Sym>, body: Vec<Node>) -> Node {
    data_prop(key, arrow(param_syms, body))
}

pub fn computed_key(expr: Node) -> Node {
    Node::with_children(Tag::ComputedKey, Span::EMPTY, vec![expr])
}

/// `{value: <value>, done: <done>}` — the iterator-result shape both
/// generator and async-generator `next`/`return`/`throw` produce.
pub fn iter_result(value: Node, done: bool, interner: &mut Interner) -> Node {
    let value_sym = interner.get_or_intern("value");
    let done_sym = interner.get_or_intern("done");
    let value_prop = data_prop(ident(value_sym), value);
    let done_prop = data_prop(ident(done_sym), bool_lit(done));
    Node::with_children(Tag::ObjectLiteral, Span::EMPTY, vec![value_prop, done_prop])
}

/// `Promise.resolve(<expr>)` — used to normalise an arbitrary await
/// operand (which may not itself be a promise) before chaining `.then`.
pub fn promise_resolve(expr: Node, interner: &mut Interner) -> Node {
    let promise_sym = interner.get_or_intern("Promise");
    let resolve_sym = interner.get_or_intern("resolve");
    call(member(ident(promise_sym), resolve_sym), vec![expr])
}

/// `new Promise((resolve, reject) => { <body> })`.
pub fn new_promise(resolve: Sym, reject: Sym, body: Vec<Node>, interner: &mut Interner) -> Node {
    let promise_sym = interner.get_or_intern("Promise");
    let executor = arrow(vec![resolve, reject], body);
    new_expr(ident(promise_sym), vec![executor])
}

/// `<promise>.then(<on_fulfilled>[, <on_rejected>])`.
pub fn then(promise: Node, on_fulfilled: Node, on_rejected: Option<Node>, interner: &mut Interner) -> Node {
    let then_sym = interner.get_or_intern("then");
    let mut args = vec![on_fulfilled];
    args.extend(on_rejected);
    call(member(promise, then_sym), args)
}
