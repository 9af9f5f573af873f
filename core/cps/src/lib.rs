//! Continuation-passing-style lowering of `async function`, generator
//! `function*`, `async function*`, and `for await` (`spec.md` §4.3).
//!
//! [`needs_transformation`] answers whether a parsed program contains
//! any of those constructs anywhere in its tree; [`transform`] rewrites
//! them away into plain functions that drive a `Promise`/`.then` chain
//! (async) or a hand-rolled resumable closure (generators), so the
//! evaluator (`jsrt_engine`) never has to implement suspension itself.
//! [`transform`] is idempotent: every rewritten function comes out with
//! `is_async`/`is_generator` cleared and contains no `Await`/`Yield`
//! nodes, so a second pass (and a second `needs_transformation` scan)
//! finds nothing left to do.

mod builder;
mod rewrite;

use jsrt_ast::visitor::{walk, Visitor};
use jsrt_ast::{Node, Payload, Tag};
use jsrt_interner::Interner;

/// `true` iff `program` contains an `async`/generator function, or a
/// `for await`, *anywhere* in its tree — unlike
/// [`jsrt_ast::operations::contains_own_await`], this does not stop at
/// function boundaries, since any async/generator function anywhere
/// needs rewriting, not just ones reachable from the program's own
/// top-level scope.
pub fn needs_transformation(program: &Node) -> bool {
    struct Scan {
        found: bool,
    }
    impl Visitor for Scan {
        fn visit_node(&mut self, node: &Node) -> bool {
            if self.found {
                return false;
            }
            if let Some(view) = node.as_function() {
                if view.flags.is_async || view.flags.is_generator {
                    self.found = true;
                    return false;
                }
            }
            if node.tag == Tag::ForOf && matches!(node.payload, Payload::Bool(true)) {
                self.found = true;
                return false;
            }
            true
        }
    }
    let mut scan = Scan { found: false };
    walk(program, &mut scan);
    scan.found
}

/// Rewrites every `async`/generator function (and `for await` loop)
/// reachable from `program`. See the module docs for the statement-level
/// scope this conversion operates at.
pub fn transform(program: Node, interner: &mut Interner) -> Node {
    let mut ctx = rewrite::Ctx::new(interner);
    ctx.transform_node(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsrt_ast::{FunctionFlags, Span};

    fn async_fn_program() -> (Node, Interner) {
        let mut interner = Interner::new();
        let p = interner.get_or_intern("p");
        let a = interner.get_or_intern("a");
        let b = interner.get_or_intern("b");
        let c = interner.get_or_intern("c");

        // async function t() {
        //   let a = await p;
        //   let b = await p;
        //   return b;
        // }
        fn await_ident(sym: jsrt_interner::Sym) -> Node {
            Node::with_children(
                Tag::Await,
                Span::EMPTY,
                vec![Node::with_payload(Tag::Identifier, Span::EMPTY, Payload::Sym(sym))],
            )
        }
        let let_a = Node::with_children(
            Tag::LetDecl,
            Span::EMPTY,
            vec![Node::with_children(
                Tag::Binding,
                Span::EMPTY,
                vec![
                    Node::with_payload(Tag::IdBinding, Span::EMPTY, Payload::Sym(a)),
                    await_ident(p),
                ],
            )],
        );
        let let_b = Node::with_children(
            Tag::LetDecl,
            Span::EMPTY,
            vec![Node::with_children(
                Tag::Binding,
                Span::EMPTY,
                vec![
                    Node::with_payload(Tag::IdBinding, Span::EMPTY, Payload::Sym(b)),
                    await_ident(p),
                ],
            )],
        );
        let return_b = Node::with_children(
            Tag::Return,
            Span::EMPTY,
            vec![Node::with_payload(Tag::Identifier, Span::EMPTY, Payload::Sym(b))],
        );

        let func = Node::leaf(
            Tag::FunctionDecl,
            Span::EMPTY,
            Payload::FunctionFlags(FunctionFlags {
                is_async: true,
                is_generator: false,
                is_strict: false,
            }),
            vec![
                Node::with_payload(Tag::Identifier, Span::EMPTY, Payload::Sym(c)),
                Node::new(Tag::Parameters, Span::EMPTY),
                let_a,
                let_b,
                return_b,
            ],
        );
        let program = Node::with_children(Tag::Program, Span::EMPTY, vec![func]);
        (program, interner)
    }

    #[test]
    fn needs_transformation_detects_async_function_anywhere() {
        let (program, _interner) = async_fn_program();
        assert!(needs_transformation(&program));

        let plain = Node::with_children(Tag::Program, Span::EMPTY, Vec::new());
        assert!(!needs_transformation(&plain));
    }

    #[test]
    fn needs_transformation_detects_for_await() {
        let mut interner = Interner::new();
        let x = interner.get_or_intern("x");
        let it = interner.get_or_intern("it");
        let for_await = Node::with_payload(
            Tag::ForOf,
            Span::EMPTY,
            Payload::Bool(true),
        );
        let mut for_await = for_await;
        for_await.children = vec![
            Node::with_payload(Tag::IdBinding, Span::EMPTY, Payload::Sym(x)),
            Node::with_payload(Tag::Identifier, Span::EMPTY, Payload::Sym(it)),
            Node::new(Tag::Block, Span::EMPTY),
        ];
        let program = Node::with_children(Tag::Program, Span::EMPTY, vec![for_await]);
        assert!(needs_transformation(&program));
    }

    #[test]
    fn transform_clears_async_flag_and_is_idempotent() {
        let (program, mut interner) = async_fn_program();
        let once = transform(program, &mut interner);
        assert!(!needs_transformation(&once));

        let func = &once.children[0];
        let view = func.as_function().expect("still a function");
        assert!(!view.flags.is_async);
        assert!(!view.flags.is_generator);

        let twice = transform(once.clone(), &mut interner);
        assert_eq!(once, twice);
    }

    #[test]
    fn transform_rewrites_async_body_into_promise_then_chain() {
        let (program, mut interner) = async_fn_program();
        let transformed = transform(program, &mut interner);
        let func = &transformed.children[0];
        let view = func.as_function().expect("function");
        // body: `return new Promise((resolve, reject) => { try { ... } catch (e) { reject(e) } });`
        assert_eq!(view.body.len(), 1);
        assert_eq!(view.body[0].tag, Tag::Return);
        let promise_new = &view.body[0].children[0];
        assert_eq!(promise_new.tag, Tag::New);
    }

    #[test]
    fn transform_rewrites_generator_into_resume_object() {
        let mut interner = Interner::new();
        let yielded = interner.get_or_intern("v");
        let name = interner.get_or_intern("g");
        let yield_stmt = Node::with_children(
            Tag::ExpressionStatement,
            Span::EMPTY,
            vec![Node::leaf(
                Tag::Yield,
                Span::EMPTY,
                Payload::Bool(false),
                vec![Node::with_payload(Tag::Identifier, Span::EMPTY, Payload::Sym(yielded))],
            )],
        );
        let func = Node::leaf(
            Tag::FunctionDecl,
            Span::EMPTY,
            Payload::FunctionFlags(FunctionFlags {
                is_async: false,
                is_generator: true,
                is_strict: false,
            }),
            vec![
                Node::with_payload(Tag::Identifier, Span::EMPTY, Payload::Sym(name)),
                Node::new(Tag::Parameters, Span::EMPTY),
                yield_stmt,
            ],
        );
        let program = Node::with_children(Tag::Program, Span::EMPTY, vec![func]);
        assert!(needs_transformation(&program));

        let transformed = transform(program, &mut interner);
        assert!(!needs_transformation(&transformed));
        let view = transformed.children[0].as_function().unwrap();
        // body: `let __resume1 = ...; let __gen1 = {...}; return __gen1;`
        assert_eq!(view.body.len(), 3);
        assert_eq!(view.body[0].tag, Tag::LetDecl);
        assert_eq!(view.body[1].tag, Tag::LetDecl);
        assert_eq!(view.body[2].tag, Tag::Return);
    }
}
