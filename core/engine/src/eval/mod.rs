//! The tree-walking evaluator, grounded (loosely, for dispatch shape) on
//! `exec/mod.rs`'s `Executor::run`/`Interpreter::call`, re-expressed over
//! the cons-cell [`jsrt_ast::Node`] IR and the arena-backed environment/
//! object model instead of `ValueData`/`Gc<ValueData>`. By the time a
//! program reaches [`Evaluator`], `jsrt_cps::transform` has already
//! rewritten away every `async`/generator function, so this module never
//! has to special-case `Tag::Await`/`Tag::Yield` — only plain functions,
//! closures, and `Promise`/object literals remain.

mod class;

use jsrt_ast::{AssignOp, BinaryOp, LogicalOp, Node, Payload, Tag, UnaryOp, UpdateOp};
use jsrt_interner::Sym;

use crate::{
    context::Context,
    environment::{BindingKind, EnvironmentId},
    error::{JsNativeError, JsResult},
    object::{FunctionKind, Heap, JsObject, ObjectData, ObjectKind},
    property::{Attribute, PropertyDescriptor, PropertyKey},
    string::JsString,
    value::JsValue,
};

/// What a statement's evaluation produced, beyond its value: an ordinary
/// completion, or one unwinding toward a `return`/`break`/`continue`
/// target. Mirrors the spec's `Completion Record` closely enough for a
/// tree-walker without reifying the `[[Type]]`/`[[Value]]`/`[[Target]]`
/// triple as its own type per call site.
enum Completion {
    Normal(JsValue),
    Return(JsValue),
    Break(Option<Sym>),
    Continue(Option<Sym>),
}

pub struct Evaluator<'a> {
    ctx: &'a mut Context,
    /// The nearest enclosing function (or script) environment: the target
    /// for `var` hoisting and, when Annex B is enabled, for block-scoped
    /// `function` declaration hoisting. Set once per call at
    /// [`Evaluator::run_program`]/[`Evaluator::call_closure`] entry and
    /// left unchanged for the lifetime of this `Evaluator` — a nested
    /// function call gets its own `Evaluator` with its own `var_scope`.
    var_scope: EnvironmentId,
}

impl<'a> Evaluator<'a> {
    pub fn new(ctx: &'a mut Context) -> Self {
        let var_scope = ctx.global_env();
        Self { ctx, var_scope }
    }

    /// Initializes (or re-initializes) `name`'s binding value in `env`.
    /// Reaches into `Context`'s fields directly rather than through its
    /// `realm_mut()`/`interner()` accessors, since those take `&mut self`/
    /// `&self` on the whole struct and would fight the disjoint borrows
    /// of `realm.environments`, `realm.heap`, and `interner` this needs
    /// at once.
    fn initialize_binding(&mut self, env: EnvironmentId, name: Sym, value: JsValue) {
        let Context { realm, interner, .. } = &mut *self.ctx;
        realm.environments.initialize_binding(env, name, value, interner, &mut realm.heap);
    }

    fn set_mutable_binding(&mut self, env: EnvironmentId, name: Sym, value: JsValue) -> JsResult<()> {
        let Context { realm, interner, .. } = &mut *self.ctx;
        realm.environments.set_mutable_binding(env, name, value, interner, &mut realm.heap)
    }

    pub fn run_program(&mut self, program: &Node) -> JsResult<JsValue> {
        let env = self.ctx.global_env();
        self.var_scope = env;
        self.hoist_var_scope(&program.children, env);
        match self.eval_statement_list(&program.children, env)? {
            Completion::Normal(v) => Ok(v),
            Completion::Return(v) => Ok(v),
            Completion::Break(_) | Completion::Continue(_) => {
                Err(JsNativeError::syntax("Illegal break/continue at top level").into())
            }
        }
    }

    /// Calls a user-defined closure: pushes a fresh function environment
    /// chained off the closure's defining environment, binds parameters
    /// (simple identifiers and rest parameters; destructuring parameters
    /// are bound via the same pattern-binding helper statements use),
    /// hoists the body's own `var`s, and runs it to completion.
    pub fn call_closure(
        &mut self,
        params: &Node,
        body: &[Node],
        defining_env: EnvironmentId,
        this_value: Option<JsValue>,
        args: &[JsValue],
    ) -> JsResult<JsValue> {
        let call_env = self
            .ctx
            .realm_mut()
            .environments
            .new_function(Some(defining_env), this_value);
        self.var_scope = call_env;
        let _span = self.ctx.activity().start("Scope:Function", self.scope_mode());
        self.bind_parameters(params, args, call_env)?;
        self.hoist_var_scope(body, call_env);
        match self.eval_statement_list(body, call_env)? {
            Completion::Normal(_) => Ok(JsValue::Undefined),
            Completion::Return(v) => Ok(v),
            Completion::Break(_) | Completion::Continue(_) => {
                Err(JsNativeError::syntax("Illegal break/continue in function body").into())
            }
        }
    }

    fn bind_parameters(&mut self, params: &Node, args: &[JsValue], env: EnvironmentId) -> JsResult<()> {
        for (i, param) in params.children.iter().enumerate() {
            if param.tag == Tag::RestBinding {
                let rest: Vec<JsValue> = args.get(i..).unwrap_or(&[]).to_vec();
                let array = self.create_array(rest);
                if let Some(target) = param.children.first() {
                    self.bind_pattern(target, JsValue::Object(array), env, BindingKind::Let, true)?;
                }
                break;
            }
            let value = args.get(i).cloned().unwrap_or(JsValue::Undefined);
            if param.tag == Tag::DefaultBinding {
                let value = if value.is_undefined() { self.eval_expr(&param.children[1], env)? } else { value };
                self.bind_pattern(&param.children[0], value, env, BindingKind::Let, true)?;
            } else {
                self.bind_pattern(param, value, env, BindingKind::Let, true)?;
            }
        }
        Ok(())
    }

    /// Declares (and initializes) every `var` name and hoisted function
    /// declaration reachable in `body`'s own function/script scope.
    fn hoist_var_scope(&mut self, body: &[Node], env: EnvironmentId) {
        for name in jsrt_ast::operations::var_declared_names(&Node::with_children(
            Tag::Block,
            jsrt_ast::Span::EMPTY,
            body.to_vec(),
        )) {
            self.ctx
                .realm_mut()
                .environments
                .create_mutable_binding(env, name, BindingKind::Var);
            self.initialize_binding(env, name, JsValue::Undefined);
        }
        for stmt in body {
            if stmt.tag == Tag::FunctionDecl {
                if let Some(view) = stmt.as_function() {
                    let closure = self.make_closure(view.name, view.params, view.body, env, false);
                    if let Some(name) = view.name {
                        let _span = self.ctx.activity().start("Statement:FunctionDeclaration", self.execution_kind());
                        self.ctx.realm_mut().environments.create_mutable_binding(env, name, BindingKind::Var);
                        self.initialize_binding(env, name, JsValue::Object(closure));
                    }
                }
            }
        }
    }

    /// `js.scope.mode` for the current tracing tag: this engine has no
    /// strict-mode tracking (no builtin ever observes "use strict"), so
    /// every scope is sloppy; Annex B's own enablement is the only axis
    /// that varies, matching the engine-wide simplification already
    /// recorded for other strict-mode-dependent spec corners.
    fn scope_mode(&self) -> &'static str {
        if self.ctx.options.enable_annex_b {
            "SloppyAnnexB"
        } else {
            "Sloppy"
        }
    }

    /// `js.execution.kind` for the current tracing tag: `Function` while
    /// running inside a function call, `Script` at the top level. There is
    /// no separate dynamic-`eval` execution kind since this engine only
    /// exposes `Context::eval` as a host API, not a callable global.
    fn execution_kind(&self) -> &'static str {
        if self.var_scope == self.ctx.global_env() {
            "Script"
        } else {
            "Function"
        }
    }

    fn hoist_lexical_scope(&mut self, body: &[Node], env: EnvironmentId) {
        for name in jsrt_ast::operations::lexically_declared_names(body) {
            self.ctx
                .realm_mut()
                .environments
                .create_mutable_binding(env, name, BindingKind::Let);
        }
    }

    fn eval_statement_list(&mut self, stmts: &[Node], env: EnvironmentId) -> JsResult<Completion> {
        let mut last = JsValue::Undefined;
        for stmt in stmts {
            match self.eval_statement(stmt, env)? {
                Completion::Normal(v) => {
                    if !v.is_undefined() || matches!(stmt.tag, Tag::ExpressionStatement) {
                        last = v;
                    }
                }
                other => return Ok(other),
            }
        }
        Ok(Completion::Normal(last))
    }

    /// Runs `stmts` in a fresh child environment (block scoping), hoisting
    /// `let`/`const`/`class` names and function declarations first.
    fn eval_block(&mut self, stmts: &[Node], outer: EnvironmentId) -> JsResult<Completion> {
        let _span = self.ctx.activity().start("Scope:Block", self.scope_mode());
        let env = self.ctx.realm_mut().environments.new_declarative(Some(outer));
        self.hoist_lexical_scope(stmts, env);
        for stmt in stmts {
            if stmt.tag == Tag::FunctionDecl {
                if let Some(view) = stmt.as_function() {
                    let closure = self.make_closure(view.name, view.params, view.body, env, false);
                    if let Some(name) = view.name {
                        let _span = self.ctx.activity().start("Statement:FunctionDeclaration", self.execution_kind());
                        self.initialize_binding(env, name, JsValue::Object(closure));
                        self.annex_b_sync_function(name, env, JsValue::Object(closure));
                    }
                }
            }
        }
        self.eval_statement_list(stmts, env)
    }

    /// Annex B.3.3: a block-scoped `function` declaration also assigns the
    /// nearest enclosing `var` binding of the same name, so that sloppy-mode
    /// code observing the name from outside the block (e.g. `typeof f` after
    /// an `if` block containing `function f(){}`) sees the function rather
    /// than `undefined`. Suppressed entirely when `enable_annex_b` is off,
    /// when `block_env` already *is* the var scope (no hoisting needed), or
    /// when a `let`/`const`/`class` of the same name shadows it somewhere
    /// between the block and the var scope.
    fn annex_b_sync_function(&mut self, name: Sym, block_env: EnvironmentId, value: JsValue) {
        if !self.ctx.options.enable_annex_b || block_env == self.var_scope {
            return;
        }
        let var_scope = self.var_scope;
        let eligible = !self.ctx.realm.environments.shadowed_by_lexical_declaration(block_env, var_scope, name)
            && self
                .ctx
                .realm
                .environments
                .has_binding(var_scope, name, &self.ctx.interner, &self.ctx.realm.heap);
        if eligible {
            let _ = self.set_mutable_binding(var_scope, name, value);
        }
    }

    fn eval_statement(&mut self, node: &Node, env: EnvironmentId) -> JsResult<Completion> {
        match node.tag {
            Tag::ExpressionStatement => Ok(Completion::Normal(self.eval_expr(&node.children[0], env)?)),
            Tag::Block => self.eval_block(&node.children, env),
            Tag::Empty | Tag::Directive | Tag::FunctionDecl => Ok(Completion::Normal(JsValue::Undefined)),
            Tag::VarDecl => {
                for binding in &node.children {
                    self.eval_binding(binding, env, BindingKind::Var, false)?;
                }
                Ok(Completion::Normal(JsValue::Undefined))
            }
            Tag::LetDecl => {
                for binding in &node.children {
                    self.eval_binding(binding, env, BindingKind::Let, true)?;
                }
                Ok(Completion::Normal(JsValue::Undefined))
            }
            Tag::ConstDecl => {
                for binding in &node.children {
                    self.eval_binding(binding, env, BindingKind::Const, true)?;
                }
                Ok(Completion::Normal(JsValue::Undefined))
            }
            Tag::ClassDecl => {
                let (name, value) = class::eval_class(self, node, env)?;
                if let Some(name) = name {
                    self.ctx.realm_mut().environments.create_mutable_binding(env, name, BindingKind::Let);
                    self.initialize_binding(env, name, value);
                }
                Ok(Completion::Normal(JsValue::Undefined))
            }
            Tag::If => {
                let test = self.eval_expr(&node.children[0], env)?;
                if test.to_boolean() {
                    self.eval_statement(&node.children[1], env)
                } else if let Some(alt) = node.children.get(2) {
                    self.eval_statement(alt, env)
                } else {
                    Ok(Completion::Normal(JsValue::Undefined))
                }
            }
            Tag::While => self.eval_while(node, env, None),
            Tag::DoWhile => self.eval_do_while(node, env, None),
            Tag::For => self.eval_for(node, env, None),
            Tag::ForIn => self.eval_for_in(node, env, None),
            Tag::ForOf => self.eval_for_of(node, env, None),
            Tag::Switch => self.eval_switch(node, env),
            Tag::Break => Ok(Completion::Break(node.as_label())),
            Tag::Continue => Ok(Completion::Continue(node.as_label())),
            Tag::Return => {
                let value = match node.children.first() {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => JsValue::Undefined,
                };
                Ok(Completion::Return(value))
            }
            Tag::Throw => {
                let value = self.eval_expr(&node.children[0], env)?;
                Err(value.into())
            }
            Tag::Try => self.eval_try(node, env),
            Tag::Labelled => self.eval_labelled(node, env),
            Tag::With => self.eval_statement(&node.children[1], env),
            _ => Err(JsNativeError::syntax(format!("unsupported statement `{}`", node.tag)).into()),
        }
    }

    fn eval_labelled(&mut self, node: &Node, env: EnvironmentId) -> JsResult<Completion> {
        let Payload::Sym(label) = node.payload else {
            return self.eval_statement(&node.children[0], env);
        };
        let body = &node.children[0];
        let result = match body.tag {
            Tag::While => self.eval_while(body, env, Some(label)),
            Tag::DoWhile => self.eval_do_while(body, env, Some(label)),
            Tag::For => self.eval_for(body, env, Some(label)),
            Tag::ForIn => self.eval_for_in(body, env, Some(label)),
            Tag::ForOf => self.eval_for_of(body, env, Some(label)),
            _ => self.eval_statement(body, env),
        }?;
        match result {
            Completion::Break(Some(l)) if l == label => Ok(Completion::Normal(JsValue::Undefined)),
            other => Ok(other),
        }
    }

    fn eval_while(&mut self, node: &Node, env: EnvironmentId, label: Option<Sym>) -> JsResult<Completion> {
        loop {
            if !self.eval_expr(&node.children[0], env)?.to_boolean() {
                return Ok(Completion::Normal(JsValue::Undefined));
            }
            match self.eval_statement(&node.children[1], env)? {
                Completion::Break(l) if l.is_none() || l == label => return Ok(Completion::Normal(JsValue::Undefined)),
                Completion::Continue(l) if l.is_none() || l == label => continue,
                Completion::Normal(_) => {}
                other => return Ok(other),
            }
        }
    }

    fn eval_do_while(&mut self, node: &Node, env: EnvironmentId, label: Option<Sym>) -> JsResult<Completion> {
        loop {
            match self.eval_statement(&node.children[1], env)? {
                Completion::Break(l) if l.is_none() || l == label => return Ok(Completion::Normal(JsValue::Undefined)),
                Completion::Continue(l) if l.is_none() || l == label => {}
                Completion::Normal(_) => {}
                other => return Ok(other),
            }
            if !self.eval_expr(&node.children[0], env)?.to_boolean() {
                return Ok(Completion::Normal(JsValue::Undefined));
            }
        }
    }

    fn eval_for(&mut self, node: &Node, outer: EnvironmentId, label: Option<Sym>) -> JsResult<Completion> {
        let env = self.ctx.realm_mut().environments.new_declarative(Some(outer));
        let init = &node.children[0];
        match init.tag {
            Tag::VarDecl => {
                for binding in &init.children {
                    self.eval_binding(binding, env, BindingKind::Var, false)?;
                }
            }
            Tag::LetDecl => {
                for binding in &init.children {
                    self.eval_binding(binding, env, BindingKind::Let, true)?;
                }
            }
            Tag::ConstDecl => {
                for binding in &init.children {
                    self.eval_binding(binding, env, BindingKind::Const, true)?;
                }
            }
            Tag::Empty => {}
            _ => {
                self.eval_expr(init, env)?;
            }
        }
        loop {
            if !matches!(node.children[1].tag, Tag::Empty) && !self.eval_expr(&node.children[1], env)?.to_boolean() {
                return Ok(Completion::Normal(JsValue::Undefined));
            }
            match self.eval_statement(&node.children[3], env)? {
                Completion::Break(l) if l.is_none() || l == label => return Ok(Completion::Normal(JsValue::Undefined)),
                Completion::Continue(l) if l.is_none() || l == label => {}
                Completion::Normal(_) => {}
                other => return Ok(other),
            }
            if !matches!(node.children[2].tag, Tag::Empty) {
                self.eval_expr(&node.children[2], env)?;
            }
        }
    }

    fn eval_for_in(&mut self, node: &Node, outer: EnvironmentId, label: Option<Sym>) -> JsResult<Completion> {
        let right = self.eval_expr(&node.children[1], outer)?;
        let obj = match &right {
            JsValue::Undefined | JsValue::Null => return Ok(Completion::Normal(JsValue::Undefined)),
            _ => self.ctx.to_object(&right)?,
        };
        let mut seen = std::collections::HashSet::new();
        let mut keys = Vec::new();
        let mut current = Some(obj);
        while let Some(o) = current {
            for key in o.own_property_keys(self.ctx.heap()) {
                if let PropertyKey::Symbol(_) = key {
                    continue;
                }
                let enumerable = o.get_own_property(self.ctx.heap(), &key).map(|d| d.enumerable()).unwrap_or(false);
                if enumerable && seen.insert(key.to_string()) {
                    keys.push(key);
                }
            }
            current = o.prototype(self.ctx.heap());
        }
        for key in keys {
            let env = self.ctx.realm_mut().environments.new_declarative(Some(outer));
            let key_value = JsValue::String(JsString::from(key.to_string()));
            self.bind_pattern(&node.children[0], key_value, env, BindingKind::Let, true)?;
            match self.eval_statement(&node.children[2], env)? {
                Completion::Break(l) if l.is_none() || l == label => return Ok(Completion::Normal(JsValue::Undefined)),
                Completion::Continue(l) if l.is_none() || l == label => continue,
                Completion::Normal(_) => {}
                other => return Ok(other),
            }
        }
        Ok(Completion::Normal(JsValue::Undefined))
    }

    fn eval_for_of(&mut self, node: &Node, outer: EnvironmentId, label: Option<Sym>) -> JsResult<Completion> {
        let right = self.eval_expr(&node.children[1], outer)?;
        let items = self.iterate(&right)?;
        for item in items {
            let env = self.ctx.realm_mut().environments.new_declarative(Some(outer));
            self.bind_pattern(&node.children[0], item, env, BindingKind::Let, true)?;
            match self.eval_statement(&node.children[2], env)? {
                Completion::Break(l) if l.is_none() || l == label => return Ok(Completion::Normal(JsValue::Undefined)),
                Completion::Continue(l) if l.is_none() || l == label => continue,
                Completion::Normal(_) => {}
                other => return Ok(other),
            }
        }
        Ok(Completion::Normal(JsValue::Undefined))
    }

    /// Materializes an iterable into a `Vec` eagerly. Arrays are walked by
    /// index directly; anything else goes through the `Symbol.iterator`
    /// protocol (what generator objects produced by the CPS transform, and
    /// `Map`/`Set`, expose). Not lazy — fine for `for-of`/spread, which
    /// always want every element — but an infinite iterator would hang,
    /// a known limitation of this eager approach.
    fn iterate(&mut self, value: &JsValue) -> JsResult<Vec<JsValue>> {
        if let JsValue::Object(obj) = value {
            if obj.is_array(self.ctx.heap()) {
                return Ok(self.array_elements(*obj));
            }
        }
        if let JsValue::String(s) = value {
            return Ok(s.units().iter().map(|u| JsValue::String(JsString::from_utf16(vec![*u]))).collect());
        }
        let iterator_sym = self.ctx.realm().well_known_symbols.iterator.clone();
        let iter_fn = self.ctx.get_v(value, &PropertyKey::Symbol(iterator_sym))?;
        if iter_fn.is_undefined() {
            return Err(JsNativeError::typ("value is not iterable").into());
        }
        let iterator = self.ctx.call(&iter_fn, value, &[])?;
        let mut out = Vec::new();
        loop {
            let next_fn = self.ctx.get_v(&iterator, &PropertyKey::from("next"))?;
            let result = self.ctx.call(&next_fn, &iterator, &[])?;
            let done = self.ctx.get_v(&result, &PropertyKey::from("done"))?;
            if done.to_boolean() {
                break;
            }
            out.push(self.ctx.get_v(&result, &PropertyKey::from("value"))?);
        }
        Ok(out)
    }

    fn array_elements(&self, obj: JsObject) -> Vec<JsValue> {
        let len = obj
            .get_own_property(self.ctx.heap(), &PropertyKey::from("length"))
            .and_then(|d| d.as_data())
            .and_then(|d| d.value.as_number())
            .unwrap_or(0.0) as u32;
        (0..len)
            .map(|i| {
                obj.get_own_property(self.ctx.heap(), &PropertyKey::Index(i))
                    .and_then(|d| d.as_data())
                    .map(|d| d.value.clone())
                    .unwrap_or(JsValue::Undefined)
            })
            .collect()
    }

    fn eval_switch(&mut self, node: &Node, outer: EnvironmentId) -> JsResult<Completion> {
        let discriminant = self.eval_expr(&node.children[0], outer)?;
        let cases = &node.children[1..];
        let env = self.ctx.realm_mut().environments.new_declarative(Some(outer));
        for case in cases {
            if case.tag == Tag::SwitchCase {
                self.hoist_lexical_scope(&case.children[1..], env);
            } else {
                self.hoist_lexical_scope(&case.children, env);
            }
        }
        let mut matched_index = None;
        for (i, case) in cases.iter().enumerate() {
            if case.tag == Tag::SwitchCase {
                let test = self.eval_expr(&case.children[0], env)?;
                if strict_equals(&discriminant, &test) {
                    matched_index = Some(i);
                    break;
                }
            }
        }
        let start = matched_index.or_else(|| cases.iter().position(|c| c.tag == Tag::Default));
        let Some(start) = start else {
            return Ok(Completion::Normal(JsValue::Undefined));
        };
        for case in &cases[start..] {
            let body = if case.tag == Tag::SwitchCase { &case.children[1..] } else { &case.children[..] };
            match self.eval_statement_list(body, env)? {
                Completion::Break(None) => return Ok(Completion::Normal(JsValue::Undefined)),
                Completion::Normal(_) => {}
                other => return Ok(other),
            }
        }
        Ok(Completion::Normal(JsValue::Undefined))
    }

    fn eval_try(&mut self, node: &Node, env: EnvironmentId) -> JsResult<Completion> {
        let block = &node.children[0];
        let catch = &node.children[1];
        let finally = &node.children[2];
        let result = self.eval_block(&block.children, env);
        let result = match result {
            Err(err) if catch.tag == Tag::Catch => {
                let _span = self.ctx.activity().start("Scope:Catch", self.scope_mode());
                let catch_env = self.ctx.realm_mut().environments.new_declarative(Some(env));
                let value = self.ctx.error_to_value(&err);
                if !matches!(catch.children[0].tag, Tag::Empty) {
                    self.bind_pattern(&catch.children[0], value, catch_env, BindingKind::Let, true)?;
                }
                self.eval_block(&catch.children[1].children, catch_env)
            }
            other => other,
        };
        if finally.tag == Tag::Finally {
            match self.eval_block(&finally.children[0].children, env)? {
                Completion::Normal(_) => {}
                other => return Ok(other),
            }
        }
        result
    }

    fn eval_binding(&mut self, binding: &Node, env: EnvironmentId, kind: BindingKind, initialize_if_absent: bool) -> JsResult<()> {
        let target = &binding.children[0];
        let value = match binding.children.get(1) {
            Some(init) => self.eval_expr(init, env)?,
            None => JsValue::Undefined,
        };
        if binding.children.get(1).is_none() && !initialize_if_absent {
            // `var x;` with no initializer: leave the hoisted `undefined` binding alone.
            if target.as_identifier().is_some() {
                return Ok(());
            }
        }
        self.bind_pattern(target, value, env, kind, false)
    }

    /// Binds `value` against a (possibly destructuring) pattern, creating
    /// the binding if `declare` or it doesn't already exist, else treating
    /// it as a hoisted `var` slot being initialized.
    fn bind_pattern(&mut self, target: &Node, value: JsValue, env: EnvironmentId, kind: BindingKind, declare: bool) -> JsResult<()> {
        match target.tag {
            Tag::IdBinding | Tag::Identifier => {
                let name = target.as_identifier().expect("id binding carries a Sym");
                if declare {
                    self.ctx.realm_mut().environments.create_mutable_binding(env, name, kind);
                }
                self.initialize_binding(env, name, value);
                Ok(())
            }
            Tag::ArrayBindingPattern => {
                let items = self.iterate(&value)?;
                let mut idx = 0;
                for element in &target.children {
                    match element.tag {
                        Tag::Elision => idx += 1,
                        Tag::RestBinding => {
                            let rest: Vec<JsValue> = items.get(idx..).unwrap_or(&[]).to_vec();
                            let array = self.create_array(rest);
                            self.bind_pattern(&element.children[0], JsValue::Object(array), env, kind, declare)?;
                        }
                        Tag::BindingElement => {
                            let inner = &element.children[0];
                            let v = items.get(idx).cloned().unwrap_or(JsValue::Undefined);
                            if inner.tag == Tag::DefaultBinding {
                                let v = if v.is_undefined() { self.eval_expr(&inner.children[1], env)? } else { v };
                                self.bind_pattern(&inner.children[0], v, env, kind, declare)?;
                            } else {
                                self.bind_pattern(inner, v, env, kind, declare)?;
                            }
                            idx += 1;
                        }
                        _ => {}
                    }
                }
                Ok(())
            }
            Tag::ObjectBindingPattern => {
                let mut used = std::collections::HashSet::new();
                for prop in &target.children {
                    match prop.tag {
                        Tag::RestBinding => {
                            let obj = self.ctx.to_object(&value)?;
                            let rest_obj = self.ctx.construct_object();
                            for key in obj.own_property_keys(self.ctx.heap()) {
                                if used.contains(&key.to_string()) {
                                    continue;
                                }
                                let v = self.ctx.get_v(&value, &key)?;
                                rest_obj.set_data(self.ctx.heap_mut(), key, v);
                            }
                            self.bind_pattern(&prop.children[0], JsValue::Object(rest_obj), env, kind, declare)?;
                        }
                        Tag::BindingProperty => {
                            let key = self.eval_property_key(&prop.children[0], env)?;
                            used.insert(key.to_string());
                            let v = self.ctx.get_v(&value, &key)?;
                            let target_node = &prop.children[1];
                            if target_node.tag == Tag::DefaultBinding {
                                let v = if v.is_undefined() { self.eval_expr(&target_node.children[1], env)? } else { v };
                                self.bind_pattern(&target_node.children[0], v, env, kind, declare)?;
                            } else {
                                self.bind_pattern(target_node, v, env, kind, declare)?;
                            }
                        }
                        _ => {}
                    }
                }
                Ok(())
            }
            Tag::Member | Tag::ComputedMember => self.assign_to_target(target, value, env).map(|_| ()),
            _ => Err(JsNativeError::syntax("invalid binding target").into()),
        }
    }

    fn eval_property_key(&mut self, key_node: &Node, env: EnvironmentId) -> JsResult<PropertyKey> {
        if key_node.tag == Tag::ComputedKey {
            let value = self.eval_expr(&key_node.children[0], env)?;
            return self.ctx.to_property_key(&value);
        }
        if let Some(sym) = key_node.as_identifier() {
            return Ok(PropertyKey::from(self.ctx.interner().resolve(sym)));
        }
        match &key_node.payload {
            Payload::Sym(s) => Ok(PropertyKey::from(self.ctx.interner().resolve(*s))),
            Payload::Number(n) => Ok(self.ctx.to_property_key(&JsValue::Number(*n))?),
            _ => Err(JsNativeError::syntax("invalid property key").into()),
        }
    }

    fn create_array(&mut self, items: Vec<JsValue>) -> JsObject {
        let proto = self.ctx.realm().intrinsics.array_prototype;
        let obj = self.ctx.heap_mut().insert(ObjectData::new(Some(proto), ObjectKind::Array));
        let heap = self.ctx.heap_mut();
        for (i, item) in items.iter().enumerate() {
            obj.define_own_property(heap, PropertyKey::Index(i as u32), PropertyDescriptor::data(item.clone(), Attribute::default()));
        }
        obj.define_own_property(heap, PropertyKey::from("length"), PropertyDescriptor::data(items.len() as f64, Attribute::WRITABLE));
        obj
    }

    /// Creates a closure value, capturing `defining_env`. `is_arrow`
    /// closures capture the surrounding `this` lazily at call time
    /// (`FunctionKind::Closure::this_value` stays `None`; `Context::call`
    /// resolves it via the lexical chain instead of rebinding `this`).
    fn make_closure(&mut self, name: Option<Sym>, params: &Node, body: &[Node], defining_env: EnvironmentId, is_arrow: bool) -> JsObject {
        let proto = self.ctx.realm().intrinsics.function_prototype;
        let name_str = name.map(|s| JsString::from(self.ctx.interner().resolve(s)));
        let arity = params.children.iter().take_while(|c| c.tag != Tag::RestBinding && c.tag != Tag::DefaultBinding).count();
        let obj = self.ctx.heap_mut().insert(ObjectData::new(
            Some(proto),
            ObjectKind::Function(FunctionKind::Closure {
                name: name_str.clone(),
                params: params.clone(),
                body: body.to_vec(),
                environment: defining_env,
                is_arrow,
                this_value: None,
            }),
        ));
        let heap = self.ctx.heap_mut();
        obj.set_data(heap, "length", JsValue::Number(arity as f64));
        obj.set_data(heap, "name", JsValue::String(name_str.unwrap_or_else(|| JsString::from(""))));
        if !is_arrow {
            let proto_obj = self.ctx.construct_object();
            let heap = self.ctx.heap_mut();
            proto_obj.set_data(heap, "constructor", JsValue::Object(obj));
            obj.set_data(heap, "prototype", JsValue::Object(proto_obj));
        }
        obj
    }

    fn eval_expr(&mut self, node: &Node, env: EnvironmentId) -> JsResult<JsValue> {
        match node.tag {
            Tag::Literal => self.eval_literal(node),
            Tag::Identifier => {
                let name = node.as_identifier().expect("identifier node carries a Sym");
                self.ctx.realm.environments.get_binding_value(env, name, &self.ctx.interner, &self.ctx.realm.heap)
            }
            Tag::ThisExpr => Ok(self.current_this(env)),
            Tag::ArrayLiteral => {
                let mut items = Vec::new();
                for child in &node.children {
                    match child.tag {
                        Tag::Elision => items.push(JsValue::Undefined),
                        Tag::SpreadElement => {
                            let v = self.eval_expr(&child.children[0], env)?;
                            items.extend(self.iterate(&v)?);
                        }
                        _ => items.push(self.eval_expr(child, env)?),
                    }
                }
                Ok(JsValue::Object(self.create_array(items)))
            }
            Tag::ObjectLiteral => self.eval_object_literal(node, env),
            Tag::FunctionExpr => {
                let view = node.as_function().expect("FunctionExpr view");
                Ok(JsValue::Object(self.make_closure(view.name, view.params, view.body, env, false)))
            }
            Tag::ArrowFunction => {
                let view = node.as_function().expect("ArrowFunction view");
                Ok(JsValue::Object(self.make_closure(None, view.params, view.body, env, true)))
            }
            Tag::ClassExpr => {
                let (_, value) = class::eval_class(self, node, env)?;
                Ok(value)
            }
            Tag::TemplateLiteral => self.eval_template(node, env),
            Tag::RegexLiteral => {
                let Payload::Regex { pattern, flags } = node.payload else { unreachable!() };
                let source = JsString::from(self.ctx.interner().resolve(pattern));
                let flags = JsString::from(self.ctx.interner().resolve(flags));
                let proto = self.ctx.realm().intrinsics.regexp_prototype;
                Ok(JsValue::Object(self.ctx.heap_mut().insert(ObjectData::new(Some(proto), ObjectKind::RegExp { source, flags }))))
            }
            Tag::Member | Tag::ComputedMember | Tag::OptionalMember | Tag::OptionalComputedMember => {
                let obj = self.eval_expr(&node.children[0], env)?;
                if matches!(node.tag, Tag::OptionalMember | Tag::OptionalComputedMember) && obj.is_null_or_undefined() {
                    return Ok(JsValue::Undefined);
                }
                let key = self.member_key(node, env)?;
                self.ctx.get_v(&obj, &key)
            }
            Tag::Call | Tag::OptionalCall => self.eval_call(node, env),
            Tag::New => self.eval_new(node, env),
            Tag::SuperProperty => {
                let proto = self.super_proto_object(env)?;
                let key = self.super_property_key(&node.children[0], env)?;
                let this_value = self.current_this(env);
                self.ctx.get(proto, &key, &this_value)
            }
            Tag::SuperCall => {
                let super_ctor = self.super_constructor(env)?;
                let args = self.eval_args(&node.children, env)?;
                let this_value = self.current_this(env);
                self.ctx.call(&super_ctor, &this_value, &args)?;
                Ok(this_value)
            }
            Tag::Assign => self.eval_assign(node, env),
            Tag::Conditional => {
                let test = self.eval_expr(&node.children[0], env)?;
                if test.to_boolean() {
                    self.eval_expr(&node.children[1], env)
                } else {
                    self.eval_expr(&node.children[2], env)
                }
            }
            Tag::Binary => {
                let view = node.as_binary().expect("Binary view");
                let left = self.eval_expr(view.left, env)?;
                let right = self.eval_expr(view.right, env)?;
                self.apply_binary(view.op, &left, &right, view.right, env)
            }
            Tag::Logical => {
                let view = node.as_logical().expect("Logical view");
                let left = self.eval_expr(view.left, env)?;
                match view.op {
                    LogicalOp::And => {
                        if left.to_boolean() {
                            self.eval_expr(view.right, env)
                        } else {
                            Ok(left)
                        }
                    }
                    LogicalOp::Or => {
                        if left.to_boolean() {
                            Ok(left)
                        } else {
                            self.eval_expr(view.right, env)
                        }
                    }
                    LogicalOp::Coalesce => {
                        if left.is_null_or_undefined() {
                            self.eval_expr(view.right, env)
                        } else {
                            Ok(left)
                        }
                    }
                }
            }
            Tag::Unary => self.eval_unary(node, env),
            Tag::Update => self.eval_update(node, env),
            Tag::Sequence => {
                let mut last = JsValue::Undefined;
                for item in &node.children {
                    last = self.eval_expr(item, env)?;
                }
                Ok(last)
            }
            Tag::MetaProperty => Ok(JsValue::Undefined),
            _ => Err(JsNativeError::syntax(format!("unsupported expression `{}`", node.tag)).into()),
        }
    }

    fn eval_literal(&mut self, node: &Node) -> JsResult<JsValue> {
        Ok(match &node.payload {
            Payload::Null => JsValue::Null,
            Payload::Undefined => JsValue::Undefined,
            Payload::Bool(b) => JsValue::Bool(*b),
            Payload::Number(n) => JsValue::Number(*n),
            Payload::BigInt(b) => JsValue::BigInt(std::rc::Rc::new(b.clone())),
            Payload::Sym(s) => JsValue::String(JsString::from(self.ctx.interner().resolve(*s))),
            _ => JsValue::Undefined,
        })
    }

    fn eval_template(&mut self, node: &Node, env: EnvironmentId) -> JsResult<JsValue> {
        let mut out = JsString::from("");
        for part in &node.children {
            let piece = if part.tag == Tag::TemplateElement {
                let Payload::Sym(s) = part.payload else { unreachable!() };
                JsString::from(self.ctx.interner().resolve(s))
            } else {
                let v = self.eval_expr(part, env)?;
                self.ctx.to_js_string(&v)?
            };
            out = out.concat(&piece);
        }
        Ok(JsValue::String(out))
    }

    fn eval_object_literal(&mut self, node: &Node, env: EnvironmentId) -> JsResult<JsValue> {
        let obj = self.ctx.construct_object();
        for prop in &node.children {
            match prop.tag {
                Tag::SpreadElement => {
                    let v = self.eval_expr(&prop.children[0], env)?;
                    if let JsValue::Object(src) = &v {
                        for key in src.own_property_keys(self.ctx.heap()) {
                            if src.get_own_property(self.ctx.heap(), &key).map(|d| d.enumerable()).unwrap_or(false) {
                                let value = self.ctx.get_v(&v, &key)?;
                                obj.set_data(self.ctx.heap_mut(), key, value);
                            }
                        }
                    }
                }
                Tag::ShorthandProperty => {
                    let Payload::Sym(name) = prop.payload else { unreachable!() };
                    let value = self.eval_expr(prop, env)?;
                    obj.set_data(self.ctx.heap_mut(), self.ctx.interner().resolve(name), value);
                }
                Tag::PropertyDefinition => {
                    let key = self.eval_property_key(&prop.children[0], env)?;
                    let value = self.eval_expr(&prop.children[1], env)?;
                    obj.set_data(self.ctx.heap_mut(), key, value);
                }
                _ => {}
            }
        }
        Ok(JsValue::Object(obj))
    }

    fn member_key(&mut self, node: &Node, env: EnvironmentId) -> JsResult<PropertyKey> {
        let key_node = &node.children[1];
        if node.tag == Tag::ComputedMember || node.tag == Tag::OptionalComputedMember {
            let v = self.eval_expr(key_node, env)?;
            return self.ctx.to_property_key(&v);
        }
        let sym = key_node.as_identifier().expect("member key carries an identifier");
        Ok(PropertyKey::from(self.ctx.interner().resolve(sym)))
    }

    /// Resolves a call target into `(thisArg, function)`, matching how
    /// `Context::set_value`/the exec dispatch in the teacher decides `this`
    /// from the callee's shape (`obj.method()` binds `this` to `obj`;
    /// anything else calls with `this === undefined`).
    fn eval_callee(&mut self, callee: &Node, env: EnvironmentId) -> JsResult<(JsValue, JsValue)> {
        match callee.tag {
            Tag::Member | Tag::ComputedMember | Tag::OptionalMember | Tag::OptionalComputedMember => {
                let obj = self.eval_expr(&callee.children[0], env)?;
                if matches!(callee.tag, Tag::OptionalMember | Tag::OptionalComputedMember) && obj.is_null_or_undefined() {
                    return Ok((JsValue::Undefined, JsValue::Undefined));
                }
                let key = self.member_key(callee, env)?;
                let f = self.ctx.get_v(&obj, &key)?;
                Ok((obj, f))
            }
            Tag::SuperProperty => {
                let proto = self.super_proto_object(env)?;
                let key = self.super_property_key(&callee.children[0], env)?;
                let this_value = self.current_this(env);
                let f = self.ctx.get(proto, &key, &this_value)?;
                Ok((this_value, f))
            }
            _ => {
                let f = self.eval_expr(callee, env)?;
                Ok((JsValue::Undefined, f))
            }
        }
    }

    /// Resolves `this` in `env`'s chain, falling back to the global object
    /// for non-strict sloppy-mode function calls (matches
    /// `EnvironmentArena::this_value`'s own fallback).
    fn current_this(&mut self, env: EnvironmentId) -> JsValue {
        let global_this = JsValue::Object(self.ctx.global_object());
        self.ctx.realm().environments.this_value(env, &global_this)
    }

    /// Looks up the synthetic `__super_proto__` binding a class body wires
    /// up in its declarative environment (see `eval::class`).
    fn super_proto_object(&mut self, env: EnvironmentId) -> JsResult<JsObject> {
        let sym = self.ctx.interner_mut().get_or_intern(class::SUPER_PROTO_NAME);
        let value = self.ctx.realm.environments.get_binding_value(env, sym, &self.ctx.interner, &self.ctx.realm.heap)?;
        value
            .as_object()
            .copied()
            .ok_or_else(|| JsNativeError::syntax("'super' keyword is only valid inside a derived class").into())
    }

    /// Looks up the synthetic `__super__` binding (the superclass
    /// constructor) a class body wires up in its declarative environment.
    fn super_constructor(&mut self, env: EnvironmentId) -> JsResult<JsValue> {
        let sym = self.ctx.interner_mut().get_or_intern(class::SUPER_CTOR_NAME);
        self.ctx.realm.environments.get_binding_value(env, sym, &self.ctx.interner, &self.ctx.realm.heap)
    }

    /// `super.x`/`super[x]` carry no computed-ness flag of their own; the
    /// dot form's key is always an `Identifier` produced by
    /// `parse_member_name`, so that shape is what distinguishes it from
    /// the bracket form's arbitrary expression.
    fn super_property_key(&mut self, key_node: &Node, env: EnvironmentId) -> JsResult<PropertyKey> {
        if let Some(sym) = key_node.as_identifier() {
            return Ok(PropertyKey::from(self.ctx.interner().resolve(sym)));
        }
        let value = self.eval_expr(key_node, env)?;
        self.ctx.to_property_key(&value)
    }

    fn eval_args(&mut self, arg_nodes: &[Node], env: EnvironmentId) -> JsResult<Vec<JsValue>> {
        let mut args = Vec::new();
        for arg in arg_nodes {
            if arg.tag == Tag::SpreadElement {
                let v = self.eval_expr(&arg.children[0], env)?;
                args.extend(self.iterate(&v)?);
            } else {
                args.push(self.eval_expr(arg, env)?);
            }
        }
        Ok(args)
    }

    fn eval_call(&mut self, node: &Node, env: EnvironmentId) -> JsResult<JsValue> {
        let (this, f) = self.eval_callee(&node.children[0], env)?;
        if node.tag == Tag::OptionalCall && f.is_null_or_undefined() {
            return Ok(JsValue::Undefined);
        }
        if f.is_undefined() && matches!(node.children[0].tag, Tag::OptionalMember | Tag::OptionalComputedMember) {
            return Ok(JsValue::Undefined);
        }
        let args = self.eval_args(&node.children[1..], env)?;
        self.ctx.call(&f, &this, &args)
    }

    fn eval_new(&mut self, node: &Node, env: EnvironmentId) -> JsResult<JsValue> {
        let f = self.eval_expr(&node.children[0], env)?;
        let args = self.eval_args(&node.children[1..], env)?;
        self.ctx.construct(&f, &args)
    }

    fn eval_unary(&mut self, node: &Node, env: EnvironmentId) -> JsResult<JsValue> {
        let (op, operand) = node.as_unary().expect("Unary view");
        if op == UnaryOp::TypeOf && operand.tag == Tag::Identifier {
            let name = operand.as_identifier().unwrap();
            let interner = &self.ctx.interner;
            if !self.ctx.realm.environments.has_binding(env, name, interner, &self.ctx.realm.heap) {
                return Ok(JsValue::String(JsString::from("undefined")));
            }
        }
        if op == UnaryOp::Delete {
            if let Tag::Member | Tag::ComputedMember = operand.tag {
                let obj = self.eval_expr(&operand.children[0], env)?;
                let key = self.member_key(operand, env)?;
                if let JsValue::Object(o) = obj {
                    return Ok(JsValue::Bool(o.delete_own_property(self.ctx.heap_mut(), &key)));
                }
            }
            return Ok(JsValue::Bool(true));
        }
        let value = self.eval_expr(operand, env)?;
        Ok(match op {
            UnaryOp::Minus => JsValue::Number(-self.ctx.to_number(&value)?),
            UnaryOp::Plus => JsValue::Number(self.ctx.to_number(&value)?),
            UnaryOp::Not => JsValue::Bool(!value.to_boolean()),
            UnaryOp::BitNot => JsValue::Number(!to_int32(self.ctx.to_number(&value)?) as f64),
            UnaryOp::TypeOf => JsValue::String(JsString::from(type_of(&value, self.ctx.heap()))),
            UnaryOp::Void => JsValue::Undefined,
            UnaryOp::Delete => unreachable!(),
        })
    }

    fn eval_update(&mut self, node: &Node, env: EnvironmentId) -> JsResult<JsValue> {
        let Payload::UpdateOp { op, prefix } = node.payload else { unreachable!() };
        let target = &node.children[0];
        let old = self.ctx.to_number(&self.eval_ref(target, env)?)?;
        let new = match op {
            UpdateOp::Increment => old + 1.0,
            UpdateOp::Decrement => old - 1.0,
        };
        self.assign_to_target(target, JsValue::Number(new), env)?;
        Ok(JsValue::Number(if prefix { new } else { old }))
    }

    fn eval_ref(&mut self, target: &Node, env: EnvironmentId) -> JsResult<JsValue> {
        self.eval_expr(target, env)
    }

    fn eval_assign(&mut self, node: &Node, env: EnvironmentId) -> JsResult<JsValue> {
        let view = node.as_assign().expect("Assign view");
        if matches!(view.op, AssignOp::Assign) {
            if matches!(view.target.tag, Tag::ArrayBindingPattern | Tag::ObjectBindingPattern) {
                let value = self.eval_expr(view.value, env)?;
                self.bind_pattern(view.target, value.clone(), env, BindingKind::Var, false)?;
                return Ok(value);
            }
            let value = self.eval_expr(view.value, env)?;
            self.assign_to_target(view.target, value.clone(), env)?;
            return Ok(value);
        }
        if matches!(view.op, AssignOp::LogicalAnd | AssignOp::LogicalOr | AssignOp::Coalesce) {
            let current = self.eval_expr(view.target, env)?;
            let should_assign = match view.op {
                AssignOp::LogicalAnd => current.to_boolean(),
                AssignOp::LogicalOr => !current.to_boolean(),
                AssignOp::Coalesce => current.is_null_or_undefined(),
                _ => unreachable!(),
            };
            if !should_assign {
                return Ok(current);
            }
            let value = self.eval_expr(view.value, env)?;
            self.assign_to_target(view.target, value.clone(), env)?;
            return Ok(value);
        }
        let current = self.eval_expr(view.target, env)?;
        let rhs = self.eval_expr(view.value, env)?;
        let bin_op = compound_to_binary(view.op);
        let value = self.apply_binary(bin_op, &current, &rhs, view.value, env)?;
        self.assign_to_target(view.target, value.clone(), env)?;
        Ok(value)
    }

    fn assign_to_target(&mut self, target: &Node, value: JsValue, env: EnvironmentId) -> JsResult<JsValue> {
        match target.tag {
            Tag::Identifier => {
                let name = target.as_identifier().expect("assignment target identifier");
                self.set_mutable_binding(env, name, value.clone())?;
                Ok(value)
            }
            Tag::Member | Tag::ComputedMember => {
                let obj_value = self.eval_expr(&target.children[0], env)?;
                let key = self.member_key(target, env)?;
                let obj = self.ctx.to_object(&obj_value)?;
                self.ctx.set(obj, key, value.clone(), &obj_value)?;
                Ok(value)
            }
            _ => Err(JsNativeError::syntax("invalid assignment target").into()),
        }
    }

    fn apply_binary(&mut self, op: BinaryOp, left: &JsValue, right: &JsValue, right_node: &Node, env: EnvironmentId) -> JsResult<JsValue> {
        let _ = (right_node, env);
        Ok(match op {
            BinaryOp::Add => {
                let lp = self.ctx.to_primitive(left, false)?;
                let rp = self.ctx.to_primitive(right, false)?;
                if matches!(lp, JsValue::String(_)) || matches!(rp, JsValue::String(_)) {
                    let ls = self.ctx.to_js_string(&lp)?;
                    let rs = self.ctx.to_js_string(&rp)?;
                    JsValue::String(ls.concat(&rs))
                } else {
                    JsValue::Number(self.ctx.to_number(&lp)? + self.ctx.to_number(&rp)?)
                }
            }
            BinaryOp::Sub => JsValue::Number(self.ctx.to_number(left)? - self.ctx.to_number(right)?),
            BinaryOp::Mul => JsValue::Number(self.ctx.to_number(left)? * self.ctx.to_number(right)?),
            BinaryOp::Div => JsValue::Number(self.ctx.to_number(left)? / self.ctx.to_number(right)?),
            BinaryOp::Mod => JsValue::Number(self.ctx.to_number(left)? % self.ctx.to_number(right)?),
            BinaryOp::Exp => JsValue::Number(self.ctx.to_number(left)?.powf(self.ctx.to_number(right)?)),
            BinaryOp::Equal => JsValue::Bool(self.loose_equals(left, right)?),
            BinaryOp::NotEqual => JsValue::Bool(!self.loose_equals(left, right)?),
            BinaryOp::StrictEqual => JsValue::Bool(strict_equals(left, right)),
            BinaryOp::StrictNotEqual => JsValue::Bool(!strict_equals(left, right)),
            BinaryOp::LessThan => self.compare(left, right, |o| o == std::cmp::Ordering::Less)?,
            BinaryOp::GreaterThan => self.compare(left, right, |o| o == std::cmp::Ordering::Greater)?,
            BinaryOp::LessThanOrEqual => self.compare(left, right, |o| o != std::cmp::Ordering::Greater)?,
            BinaryOp::GreaterThanOrEqual => self.compare(left, right, |o| o != std::cmp::Ordering::Less)?,
            BinaryOp::BitAnd => JsValue::Number((to_int32(self.ctx.to_number(left)?) & to_int32(self.ctx.to_number(right)?)) as f64),
            BinaryOp::BitOr => JsValue::Number((to_int32(self.ctx.to_number(left)?) | to_int32(self.ctx.to_number(right)?)) as f64),
            BinaryOp::BitXor => JsValue::Number((to_int32(self.ctx.to_number(left)?) ^ to_int32(self.ctx.to_number(right)?)) as f64),
            BinaryOp::Shl => JsValue::Number(((to_int32(self.ctx.to_number(left)?) << (to_uint32(self.ctx.to_number(right)?) & 31)) as f64)),
            BinaryOp::Shr => JsValue::Number(((to_int32(self.ctx.to_number(left)?) >> (to_uint32(self.ctx.to_number(right)?) & 31)) as f64)),
            BinaryOp::UShr => JsValue::Number(((to_uint32(self.ctx.to_number(left)?) >> (to_uint32(self.ctx.to_number(right)?) & 31)) as f64)),
            BinaryOp::In => {
                let key = self.ctx.to_property_key(right)?;
                match right {
                    JsValue::Object(o) => JsValue::Bool(self.ctx.has_property(*o, &key)),
                    _ => return Err(JsNativeError::typ("Cannot use 'in' operator on a non-object").into()),
                }
            }
            BinaryOp::InstanceOf => JsValue::Bool(self.instance_of(left, right)?),
            BinaryOp::Comma => right.clone(),
        })
    }

    fn compare(&mut self, left: &JsValue, right: &JsValue, f: impl Fn(std::cmp::Ordering) -> bool) -> JsResult<JsValue> {
        let lp = self.ctx.to_primitive(left, true)?;
        let rp = self.ctx.to_primitive(right, true)?;
        if let (JsValue::String(ls), JsValue::String(rs)) = (&lp, &rp) {
            return Ok(JsValue::Bool(f(ls.units().cmp(rs.units()))));
        }
        let ln = self.ctx.to_number(&lp)?;
        let rn = self.ctx.to_number(&rp)?;
        if ln.is_nan() || rn.is_nan() {
            return Ok(JsValue::Bool(false));
        }
        Ok(JsValue::Bool(f(ln.partial_cmp(&rn).unwrap())))
    }

    fn loose_equals(&mut self, left: &JsValue, right: &JsValue) -> JsResult<bool> {
        use JsValue::*;
        Ok(match (left, right) {
            (Null | Undefined, Null | Undefined) => true,
            (Number(_), Number(_)) | (String(_), String(_)) | (Bool(_), Bool(_)) | (Object(_), Object(_)) | (Symbol(_), Symbol(_)) => {
                strict_equals(left, right)
            }
            (Number(_), String(_)) | (String(_), Number(_)) => {
                self.ctx.to_number(left)? == self.ctx.to_number(right)?
            }
            (Bool(_), _) => {
                let l = JsValue::Number(if left.to_boolean() { 1.0 } else { 0.0 });
                self.loose_equals(&l, right)?
            }
            (_, Bool(_)) => {
                let r = JsValue::Number(if right.to_boolean() { 1.0 } else { 0.0 });
                self.loose_equals(left, &r)?
            }
            (Object(_), Number(_) | String(_)) => {
                let lp = self.ctx.to_primitive(left, false)?;
                self.loose_equals(&lp, right)?
            }
            (Number(_) | String(_), Object(_)) => {
                let rp = self.ctx.to_primitive(right, false)?;
                self.loose_equals(left, &rp)?
            }
            _ => false,
        })
    }

    fn instance_of(&mut self, value: &JsValue, constructor: &JsValue) -> JsResult<bool> {
        let JsValue::Object(ctor) = constructor else {
            return Err(JsNativeError::typ("Right-hand side of 'instanceof' is not callable").into());
        };
        if !ctor.is_callable(self.ctx.heap()) {
            return Err(JsNativeError::typ("Right-hand side of 'instanceof' is not callable").into());
        }
        let JsValue::Object(obj) = value else { return Ok(false) };
        let proto_value = self.ctx.get(*ctor, &PropertyKey::from("prototype"), constructor)?;
        let Some(target_proto) = proto_value.as_object().copied() else { return Ok(false) };
        let mut current = obj.prototype(self.ctx.heap());
        while let Some(p) = current {
            if p == target_proto {
                return Ok(true);
            }
            current = p.prototype(self.ctx.heap());
        }
        Ok(false)
    }
}

fn compound_to_binary(op: AssignOp) -> BinaryOp {
    match op {
        AssignOp::Add => BinaryOp::Add,
        AssignOp::Sub => BinaryOp::Sub,
        AssignOp::Mul => BinaryOp::Mul,
        AssignOp::Div => BinaryOp::Div,
        AssignOp::Mod => BinaryOp::Mod,
        AssignOp::Exp => BinaryOp::Exp,
        AssignOp::BitAnd => BinaryOp::BitAnd,
        AssignOp::BitOr => BinaryOp::BitOr,
        AssignOp::BitXor => BinaryOp::BitXor,
        AssignOp::Shl => BinaryOp::Shl,
        AssignOp::Shr => BinaryOp::Shr,
        AssignOp::UShr => BinaryOp::UShr,
        AssignOp::Assign | AssignOp::LogicalAnd | AssignOp::LogicalOr | AssignOp::Coalesce => unreachable!(),
    }
}

fn strict_equals(left: &JsValue, right: &JsValue) -> bool {
    left == right
}

fn to_int32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    (n as i64 as u64 as u32) as i32
}

fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n as i64 as u64 as u32
}

fn type_of(value: &JsValue, heap: &Heap) -> &'static str {
    match value {
        JsValue::Undefined => "undefined",
        JsValue::Null => "object",
        JsValue::Bool(_) => "boolean",
        JsValue::Number(_) => "number",
        JsValue::String(_) => "string",
        JsValue::BigInt(_) => "bigint",
        JsValue::Symbol(_) => "symbol",
        JsValue::Object(o) => {
            if o.is_callable(heap) {
                "function"
            } else {
                "object"
            }
        }
    }
}

trait NodeLabel {
    fn as_label(&self) -> Option<Sym>;
}
impl NodeLabel for Node {
    fn as_label(&self) -> Option<Sym> {
        match self.payload {
            Payload::Sym(s) => Some(s),
            _ => None,
        }
    }
}
