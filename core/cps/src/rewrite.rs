//! The rewrite itself: turning `async`/generator functions into ordinary
//! functions that build their result through `Promise`/`.then` chains
//! (async), a hand-rolled resumable closure (generators), or both
//! (async generators).
//!
//! # Scope
//!
//! Suspension points (`await`/`yield`) are only recognised in a handful
//! of syntactic positions: the sole initializer of a single-declarator
//! `var`/`let`/`const`, a bare expression statement, the right-hand side
//! of a plain assignment expression statement, and a `return` argument.
//! `f(await x, await y)` or `if (await x)` are out of scope — this is a
//! statement-level CPS conversion, not full A-normal-form. Within that
//! boundary the conversion still reaches into `if`, `try`/`catch`/
//! `finally`, and loop bodies that contain a suspension point anywhere
//! inside them.
//!
//! `switch` bodies containing a suspension point are left unconverted.
//! Labelled `break`/`continue` that would cross a synthesised loop
//! boundary are not rewritten (only the unlabelled form is). `for-in`
//! with a suspension in its body is left unconverted. `yield*` is only
//! lowered in its common, value-discarding form (`yield* iterable;` as a
//! bare statement); used as a value-producing expression it falls back
//! to forwarding the iterable through a single non-delegating `yield`.
//! `for (init; test; update)` loops whose body suspends lower `update`
//! into the loop body itself, so an unlabelled `continue` there skips
//! it — `while`/`for-of`/`for-await-of` do not have this gap since they
//! have no separate update clause.

use jsrt_ast::{Node, Payload, Tag};
use jsrt_interner::{Interner, Sym};

use crate::builder::*;

#[derive(Clone, Copy)]
pub(crate) enum Sink {
    Async { resolve: Sym, reject: Sym },
    Generator { resume: Sym },
    AsyncGenerator { resume: Sym },
}

impl Sink {
    fn resume_sym(self) -> Option<Sym> {
        match self {
            Sink::Generator { resume } | Sink::AsyncGenerator { resume } => Some(resume),
            Sink::Async { .. } => None,
        }
    }
}

#[derive(Clone)]
struct LoopCtx {
    on_break: Vec<Node>,
    on_continue: Vec<Node>,
}

#[derive(Clone)]
struct CatchCtx {
    kind: CatchKind,
}

#[derive(Clone)]
enum CatchKind {
    /// No enclosing `try` inside this function: an uncaught rejection
    /// completes the function itself (reject the promise / rethrow).
    Root,
    User {
        param: Option<Node>,
        raw_body: Vec<Node>,
        rest: Vec<Node>,
        loop_ctx: Option<Box<LoopCtx>>,
        outer: Box<CatchCtx>,
    },
}

impl CatchCtx {
    fn root() -> Self {
        CatchCtx { kind: CatchKind::Root }
    }
}

enum Bind {
    None,
    Pattern(Node),
    Assign(Node),
}

struct StmtSusp {
    operand: Node,
    is_yield: bool,
    delegate: bool,
    bind: Bind,
    is_return: bool,
}

fn extract_susp(expr: &Node) -> Option<(Node, bool, bool)> {
    match expr.tag {
        Tag::Await => Some((expr.children.first()?.clone(), false, false)),
        Tag::Yield => {
            let Payload::Bool(delegate) = expr.payload else {
                return None;
            };
            let operand = expr.children.first().cloned().unwrap_or_else(undefined);
            Some((operand, true, delegate))
        }
        _ => None,
    }
}

fn stmt_suspension(stmt: &Node) -> Option<StmtSusp> {
    match stmt.tag {
        Tag::VarDecl | Tag::LetDecl | Tag::ConstDecl => {
            if stmt.children.len() != 1 {
                return None;
            }
            let binding = &stmt.children[0];
            if binding.tag != Tag::Binding || binding.children.len() != 2 {
                return None;
            }
            let target = &binding.children[0];
            let init = &binding.children[1];
            let (operand, is_yield, delegate) = extract_susp(init)?;
            Some(StmtSusp {
                operand,
                is_yield,
                delegate,
                bind: Bind::Pattern(target.clone()),
                is_return: false,
            })
        }
        Tag::ExpressionStatement => {
            let expr = stmt.children.first()?;
            if let Some((operand, is_yield, delegate)) = extract_susp(expr) {
                return Some(StmtSusp {
                    operand,
                    is_yield,
                    delegate,
                    bind: Bind::None,
                    is_return: false,
                });
            }
            let view = expr.as_assign()?;
            if view.op != jsrt_ast::AssignOp::Assign {
                return None;
            }
            let (operand, is_yield, delegate) = extract_susp(view.value)?;
            Some(StmtSusp {
                operand,
                is_yield,
                delegate,
                bind: Bind::Assign(view.target.clone()),
                is_return: false,
            })
        }
        Tag::Return => {
            let expr = stmt.children.first()?;
            let (operand, is_yield, delegate) = extract_susp(expr)?;
            Some(StmtSusp {
                operand,
                is_yield,
                delegate,
                bind: Bind::None,
                is_return: true,
            })
        }
        _ => None,
    }
}

fn branch_stmts(node: Node) -> Vec<Node> {
    match node.tag {
        Tag::Block => node.children,
        Tag::Empty => Vec::new(),
        _ => vec![node],
    }
}

pub(crate) struct Ctx<'i> {
    pub interner: &'i mut Interner,
    fresh: u32,
}

impl<'i> Ctx<'i> {
    pub fn new(interner: &'i mut Interner) -> Self {
        Ctx { interner, fresh: 0 }
    }

    fn fresh_sym(&mut self, hint: &str) -> Sym {
        self.fresh += 1;
        self.interner.get_or_intern(&format!("__{hint}{}", self.fresh))
    }

    /// Recursively rewrites `node`, lowering any `async`/generator
    /// function found anywhere inside it (including `node` itself).
    pub fn transform_node(&mut self, node: Node) -> Node {
        if let Some(view) = node.as_function() {
            if view.flags.is_async || view.flags.is_generator {
                return self.transform_function(node);
            }
        }
        let Node { tag, span, children, payload } = node;
        let children = children.into_iter().map(|c| self.transform_node(c)).collect();
        Node { tag, span, children, payload }
    }

    fn transform_function(&mut self, node: Node) -> Node {
        let Node { tag, span, mut children, payload } = node;
        let jsrt_ast::Payload::FunctionFlags(flags) = payload else {
            unreachable!("as_function already checked this payload shape");
        };
        // name + Parameters stay untouched; only the body is CPS-converted.
        let body: Vec<Node> = children
            .split_off(2)
            .into_iter()
            .map(|c| self.transform_node(c))
            .collect();

        let new_body = if flags.is_generator {
            self.build_generator_body(body, flags.is_async)
        } else {
            self.build_async_body(body)
        };

        children.extend(new_body);
        Node {
            tag,
            span,
            children,
            payload: jsrt_ast::Payload::FunctionFlags(jsrt_ast::FunctionFlags {
                is_async: false,
                is_generator: false,
                is_strict: flags.is_strict,
            }),
        }
    }

    fn sink_complete(&mut self, sink: Sink, value: Option<Node>) -> Vec<Node> {
        match sink {
            Sink::Async { resolve, .. } => {
                vec![expr_stmt(call(ident(resolve), vec![value.unwrap_or_else(undefined)]))]
            }
            Sink::Generator { .. } | Sink::AsyncGenerator { .. } => {
                let result = iter_result(value.unwrap_or_else(undefined), true, self.interner);
                vec![return_stmt(Some(result))]
            }
        }
    }

    fn sink_fail(&mut self, sink: Sink, err: Node) -> Vec<Node> {
        match sink {
            Sink::Async { reject, .. } => vec![expr_stmt(call(ident(reject), vec![err]))],
            Sink::Generator { .. } | Sink::AsyncGenerator { .. } => vec![throw_stmt(err)],
        }
    }

    fn build_async_body(&mut self, body: Vec<Node>) -> Vec<Node> {
        let resolve = self.fresh_sym("resolve");
        let reject = self.fresh_sym("reject");
        let sink = Sink::Async { resolve, reject };
        let complete = self.sink_complete(sink, None);
        let converted = self.convert_seq(&body, 0, sink, &complete, CatchCtx::root(), None);
        let err_sym = self.fresh_sym("e");
        let executor_body = vec![try_stmt(
            converted,
            err_sym,
            vec![expr_stmt(call(ident(reject), vec![ident(err_sym)]))],
        )];
        vec![return_stmt(Some(new_promise(resolve, reject, executor_body, self.interner)))]
    }

    fn build_generator_body(&mut self, body: Vec<Node>, is_async_gen: bool) -> Vec<Node> {
        let resume = self.fresh_sym("resume");
        let sink = if is_async_gen {
            Sink::AsyncGenerator { resume }
        } else {
            Sink::Generator { resume }
        };
        let complete = self.sink_complete(sink, None);
        let converted = self.convert_seq(&body, 0, sink, &complete, CatchCtx::root(), None);
        let initial_param = self.fresh_sym("v0");
        let initial_fn = arrow(vec![initial_param], converted);

        let next_param = self.fresh_sym("v");
        let return_param = self.fresh_sym("v");
        let throw_param = self.fresh_sym("e");

        let call_resume = call(ident(resume), vec![ident(next_param)]);
        let next_body = if is_async_gen {
            let inner_resolve = self.fresh_sym("resolve");
            let inner_reject = self.fresh_sym("reject");
            let inner_err = self.fresh_sym("e");
            let executor_body = vec![try_stmt(
                vec![expr_stmt(call(ident(inner_resolve), vec![call_resume]))],
                inner_err,
                vec![expr_stmt(call(ident(inner_reject), vec![ident(inner_err)]))],
            )];
            vec![return_stmt(Some(new_promise(
                inner_resolve,
                inner_reject,
                executor_body,
                self.interner,
            )))]
        } else {
            vec![return_stmt(Some(call_resume))]
        };
        let return_body = vec![return_stmt(Some(iter_result(ident(return_param), true, self.interner)))];
        let throw_body = vec![throw_stmt(ident(throw_param))];

        let next_sym = self.interner.get_or_intern("next");
        let return_sym = self.interner.get_or_intern("return");
        let throw_sym = self.interner.get_or_intern("throw");
        let symbol_sym = self.interner.get_or_intern("Symbol");
        let iterator_sym = self
            .interner
            .get_or_intern(if is_async_gen { "asyncIterator" } else { "iterator" });

        let gen_sym = self.fresh_sym("gen");
        let iterator_key = computed_key(member(ident(symbol_sym), iterator_sym));
        let iterator_method = method_prop(iterator_key, Vec::new(), vec![return_stmt(Some(ident(gen_sym)))]);

        let obj_literal = Node::with_children(
            Tag::ObjectLiteral,
            jsrt_ast::Span::EMPTY,
            vec![
                method_prop(ident(next_sym), vec![next_param], next_body),
                method_prop(ident(return_sym), vec![return_param], return_body),
                method_prop(ident(throw_sym), vec![throw_param], throw_body),
                iterator_method,
            ],
        );

        vec![
            let_decl(resume, Some(initial_fn)),
            let_decl(gen_sym, Some(obj_literal)),
            return_stmt(Some(ident(gen_sym))),
        ]
    }

    fn build_reject_arrow(&mut self, catch_ctx: &CatchCtx, sink: Sink) -> Node {
        let err_sym = self.fresh_sym("e");
        let body = match &catch_ctx.kind {
            CatchKind::Root => self.sink_fail(sink, ident(err_sym)),
            CatchKind::User {
                param,
                raw_body,
                rest,
                loop_ctx,
                outer,
            } => {
                let mut body = Vec::new();
                if let Some(p) = param {
                    body.push(let_decl_pattern(p.clone(), Some(ident(err_sym))));
                }
                let lc = loop_ctx.as_ref().map(|b| (**b).clone());
                body.extend(self.convert_seq(raw_body, 0, sink, rest, (**outer).clone(), lc));
                body
            }
        };
        arrow(vec![err_sym], body)
    }

    fn convert_seq(
        &mut self,
        stmts: &[Node],
        i: usize,
        sink: Sink,
        on_fallthrough: &[Node],
        catch_ctx: CatchCtx,
        loop_ctx: Option<LoopCtx>,
    ) -> Vec<Node> {
        if i >= stmts.len() {
            return on_fallthrough.to_vec();
        }
        let stmt = &stmts[i];

        if let Some(susp) = stmt_suspension(stmt) {
            return self.convert_susp(susp, stmts, i, sink, on_fallthrough, catch_ctx, loop_ctx);
        }

        let has_inner_susp =
            jsrt_ast::operations::contains_own_await(stmt) || jsrt_ast::operations::contains_own_yield(stmt);

        match stmt.tag {
            Tag::If if has_inner_susp => self.convert_if(stmt, stmts, i, sink, on_fallthrough, catch_ctx, loop_ctx),
            Tag::Try if has_inner_susp => self.convert_try(stmt, stmts, i, sink, on_fallthrough, catch_ctx, loop_ctx),
            Tag::Block if has_inner_susp => {
                let mut spliced = stmt.children.clone();
                spliced.extend(stmts[i + 1..].iter().cloned());
                self.convert_seq(&spliced, 0, sink, on_fallthrough, catch_ctx, loop_ctx)
            }
            Tag::Labelled if has_inner_susp => {
                let inner = stmt.children[1].clone();
                let mut spliced = vec![inner];
                spliced.extend(stmts[i + 1..].iter().cloned());
                self.convert_seq(&spliced, 0, sink, on_fallthrough, catch_ctx, loop_ctx)
            }
            Tag::While | Tag::DoWhile | Tag::For | Tag::ForOf | Tag::ForIn if has_inner_susp => {
                self.convert_loop(stmt, stmts, i, sink, on_fallthrough, catch_ctx, loop_ctx)
            }
            Tag::Break if matches!(stmt.payload, Payload::None) && loop_ctx.is_some() => {
                loop_ctx.unwrap().on_break
            }
            Tag::Continue if matches!(stmt.payload, Payload::None) && loop_ctx.is_some() => {
                loop_ctx.unwrap().on_continue
            }
            _ => {
                let mut out = vec![stmt.clone()];
                out.extend(self.convert_seq(stmts, i + 1, sink, on_fallthrough, catch_ctx, loop_ctx));
                out
            }
        }
    }

    fn convert_susp(
        &mut self,
        susp: StmtSusp,
        stmts: &[Node],
        i: usize,
        sink: Sink,
        on_fallthrough: &[Node],
        catch_ctx: CatchCtx,
        loop_ctx: Option<LoopCtx>,
    ) -> Vec<Node> {
        if susp.is_yield && susp.delegate && matches!(susp.bind, Bind::None) && !susp.is_return {
            let desugared = self.desugar_yield_star(susp.operand);
            let mut spliced = vec![desugared];
            spliced.extend(stmts[i + 1..].iter().cloned());
            return self.convert_seq(&spliced, 0, sink, on_fallthrough, catch_ctx, loop_ctx);
        }

        let v_sym = self.fresh_sym("v");
        let mut cont_body = Vec::new();
        match &susp.bind {
            Bind::Pattern(p) => cont_body.push(let_decl_pattern(p.clone(), Some(ident(v_sym)))),
            Bind::Assign(t) => cont_body.push(expr_stmt(assign(t.clone(), ident(v_sym)))),
            Bind::None => {}
        }
        if susp.is_return {
            cont_body.extend(self.sink_complete(sink, Some(ident(v_sym))));
        } else {
            cont_body.extend(self.convert_seq(stmts, i + 1, sink, on_fallthrough, catch_ctx.clone(), loop_ctx));
        }

        if susp.is_yield {
            let resume = sink.resume_sym().expect("yield only appears inside a generator sink");
            let cont_arrow = arrow(vec![v_sym], cont_body);
            vec![
                expr_stmt(assign(ident(resume), cont_arrow)),
                return_stmt(Some(iter_result(susp.operand, false, self.interner))),
            ]
        } else {
            let cont_arrow = arrow(vec![v_sym], cont_body);
            let reject_arrow = self.build_reject_arrow(&catch_ctx, sink);
            let promise = promise_resolve(susp.operand, self.interner);
            vec![expr_stmt(then(promise, cont_arrow, Some(reject_arrow), self.interner))]
        }
    }

    fn desugar_yield_star(&mut self, iterable: Node) -> Node {
        let item_sym = self.fresh_sym("d");
        let yield_item = Node::leaf(
            Tag::Yield,
            jsrt_ast::Span::EMPTY,
            Payload::Bool(false),
            vec![ident(item_sym)],
        );
        let body = block(vec![expr_stmt(yield_item)]);
        let left = Node::with_children(
            Tag::LetDecl,
            jsrt_ast::Span::EMPTY,
            vec![Node::with_children(
                Tag::Binding,
                jsrt_ast::Span::EMPTY,
                vec![id_binding(item_sym)],
            )],
        );
        Node::with_children(Tag::ForOf, jsrt_ast::Span::EMPTY, vec![left, iterable, body])
    }

    fn convert_if(
        &mut self,
        stmt: &Node,
        stmts: &[Node],
        i: usize,
        sink: Sink,
        on_fallthrough: &[Node],
        catch_ctx: CatchCtx,
        loop_ctx: Option<LoopCtx>,
    ) -> Vec<Node> {
        let test = stmt.children[0].clone();
        let consequent = branch_stmts(stmt.children[1].clone());
        let alternate = branch_stmts(stmt.children[2].clone());
        let rest = self.convert_seq(stmts, i + 1, sink, on_fallthrough, catch_ctx.clone(), loop_ctx.clone());
        let consequent_converted =
            self.convert_seq(&consequent, 0, sink, &rest, catch_ctx.clone(), loop_ctx.clone());
        let alternate_converted = self.convert_seq(&alternate, 0, sink, &rest, catch_ctx, loop_ctx);
        vec![if_stmt(test, block(consequent_converted), block(alternate_converted))]
    }

    fn convert_try(
        &mut self,
        stmt: &Node,
        stmts: &[Node],
        i: usize,
        sink: Sink,
        on_fallthrough: &[Node],
        catch_ctx: CatchCtx,
        loop_ctx: Option<LoopCtx>,
    ) -> Vec<Node> {
        let try_block = stmt.children[0].clone();
        let catch_node = stmt.children[1].clone();
        let finally_node = stmt.children[2].clone();

        let mut rest = self.convert_seq(stmts, i + 1, sink, on_fallthrough, catch_ctx.clone(), loop_ctx.clone());
        if finally_node.tag == Tag::Finally {
            // Only covers the non-throwing path: a rejection that isn't
            // re-thrown further down this chain skips `finally` here.
            let finally_stmts = finally_node.children[0].children.clone();
            let mut combined = finally_stmts;
            combined.extend(rest);
            rest = combined;
        }

        let new_catch_ctx = if catch_node.tag == Tag::Catch {
            let param = catch_node.children[0].clone();
            let catch_body = catch_node.children[1].children.clone();
            CatchCtx {
                kind: CatchKind::User {
                    param: if param.tag == Tag::Empty { None } else { Some(param) },
                    raw_body: catch_body,
                    rest: rest.clone(),
                    loop_ctx: loop_ctx.clone().map(Box::new),
                    outer: Box::new(catch_ctx.clone()),
                },
            }
        } else {
            catch_ctx
        };

        let try_stmts = try_block.children;
        self.convert_seq(&try_stmts, 0, sink, &rest, new_catch_ctx, loop_ctx)
    }

    fn convert_loop(
        &mut self,
        stmt: &Node,
        stmts: &[Node],
        i: usize,
        sink: Sink,
        on_fallthrough: &[Node],
        catch_ctx: CatchCtx,
        loop_ctx: Option<LoopCtx>,
    ) -> Vec<Node> {
        match stmt.tag {
            Tag::DoWhile => {
                let body_stmts = branch_stmts(stmt.children[0].clone());
                let test = stmt.children[1].clone();
                self.convert_do_while(test, body_stmts, stmts, i, sink, on_fallthrough, catch_ctx, loop_ctx)
            }
            Tag::While => {
                let test = stmt.children[0].clone();
                let body_stmts = branch_stmts(stmt.children[1].clone());
                let rest = self.convert_seq(stmts, i + 1, sink, on_fallthrough, catch_ctx.clone(), loop_ctx);
                self.build_while_trampoline(test, body_stmts, rest, sink, catch_ctx)
            }
            Tag::For => {
                let init = stmt.children[0].clone();
                let test = if stmt.children[1].tag == Tag::Empty {
                    bool_lit(true)
                } else {
                    stmt.children[1].clone()
                };
                let update = stmt.children[2].clone();
                let mut body_stmts = branch_stmts(stmt.children[3].clone());
                if update.tag != Tag::Empty {
                    body_stmts.push(expr_stmt(update));
                }
                let rest = self.convert_seq(stmts, i + 1, sink, on_fallthrough, catch_ctx.clone(), loop_ctx);
                let mut out = if init.tag == Tag::Empty { Vec::new() } else { vec![init] };
                out.extend(self.build_while_trampoline(test, body_stmts, rest, sink, catch_ctx));
                out
            }
            Tag::ForIn => {
                // Not lowered: a suspension inside a for-in body is left
                // as-is (unsupported combination).
                let mut out = vec![stmt.clone()];
                out.extend(self.convert_seq(stmts, i + 1, sink, on_fallthrough, catch_ctx, loop_ctx));
                out
            }
            Tag::ForOf => {
                let is_await = matches!(stmt.payload, Payload::Bool(true));
                let left = stmt.children[0].clone();
                let iterable = stmt.children[1].clone();
                let body_stmts = branch_stmts(stmt.children[2].clone());
                let (prelude, test, new_body) = self.desugar_for_of(left, iterable, body_stmts, is_await);
                let rest = self.convert_seq(stmts, i + 1, sink, on_fallthrough, catch_ctx.clone(), loop_ctx);
                let mut out = prelude;
                out.extend(self.build_while_trampoline(test, new_body, rest, sink, catch_ctx));
                out
            }
            _ => unreachable!("convert_loop only dispatched for loop tags"),
        }
    }

    fn convert_do_while(
        &mut self,
        test: Node,
        body_stmts: Vec<Node>,
        stmts: &[Node],
        i: usize,
        sink: Sink,
        on_fallthrough: &[Node],
        catch_ctx: CatchCtx,
        loop_ctx: Option<LoopCtx>,
    ) -> Vec<Node> {
        let rest = self.convert_seq(stmts, i + 1, sink, on_fallthrough, catch_ctx.clone(), loop_ctx);
        let while_tail = self.build_while_trampoline(test, body_stmts.clone(), rest.clone(), sink, catch_ctx.clone());
        let first_loop_ctx = Some(LoopCtx {
            on_break: rest,
            on_continue: while_tail.clone(),
        });
        self.convert_seq(&body_stmts, 0, sink, &while_tail, catch_ctx, first_loop_ctx)
    }

    fn build_while_trampoline(
        &mut self,
        test: Node,
        body_stmts: Vec<Node>,
        rest: Vec<Node>,
        sink: Sink,
        catch_ctx: CatchCtx,
    ) -> Vec<Node> {
        let loop_sym = self.fresh_sym("loop");
        let recurse_stmt = return_stmt(Some(call(ident(loop_sym), Vec::new())));
        let inner_loop_ctx = Some(LoopCtx {
            on_break: rest.clone(),
            on_continue: vec![recurse_stmt.clone()],
        });
        let body_converted = self.convert_seq(
            &body_stmts,
            0,
            sink,
            std::slice::from_ref(&recurse_stmt),
            catch_ctx,
            inner_loop_ctx,
        );
        let not_test = unary_not(test);
        let loop_body = vec![if_stmt(not_test, block(rest), block(body_converted))];
        let loop_decl = let_decl(loop_sym, Some(arrow(Vec::new(), loop_body)));
        vec![loop_decl, return_stmt(Some(call(ident(loop_sym), Vec::new())))]
    }

    /// Lowers a (possibly `for await`) `for-of` into iterator-protocol
    /// calls: `left`/`iterable`/`body` in, `(prelude, test, new_body)`
    /// out, ready to feed [`Self::build_while_trampoline`].
    fn desugar_for_of(
        &mut self,
        left: Node,
        iterable: Node,
        body_stmts: Vec<Node>,
        is_await: bool,
    ) -> (Vec<Node>, Node, Vec<Node>) {
        let iter_sym = self.fresh_sym("iter");
        let step_sym = self.fresh_sym("step");
        let symbol_sym = self.interner.get_or_intern("Symbol");
        let method_sym = self
            .interner
            .get_or_intern(if is_await { "asyncIterator" } else { "iterator" });
        let next_sym = self.interner.get_or_intern("next");
        let done_sym = self.interner.get_or_intern("done");
        let value_sym = self.interner.get_or_intern("value");

        let get_iter_method = Node::with_children(
            Tag::ComputedMember,
            jsrt_ast::Span::EMPTY,
            vec![iterable, member(ident(symbol_sym), method_sym)],
        );
        let iter_decl = let_decl(iter_sym, Some(call(get_iter_method, Vec::new())));

        let mut next_call = call(member(ident(iter_sym), next_sym), Vec::new());
        if is_await {
            next_call = Node::with_children(Tag::Await, jsrt_ast::Span::EMPTY, vec![next_call]);
        }
        let step_decl = let_decl(step_sym, Some(next_call));
        let break_if_done = if_stmt(
            member(ident(step_sym), done_sym),
            block(vec![Node::new(Tag::Break, jsrt_ast::Span::EMPTY)]),
            empty(),
        );

        let bind_stmt = match left.tag {
            Tag::VarDecl | Tag::LetDecl | Tag::ConstDecl => {
                let binding = left.children.into_iter().next().expect("for-of binding");
                let target = binding.children.into_iter().next().expect("for-of binding target");
                let_decl_pattern(target, Some(member(ident(step_sym), value_sym)))
            }
            _ => expr_stmt(assign(left, member(ident(step_sym), value_sym))),
        };

        let mut new_body = vec![step_decl, break_if_done, bind_stmt];
        new_body.extend(body_stmts);
        (vec![iter_decl], bool_lit(true), new_body)
    }
}
