//! Static analyses over the IR that the parser, CPS transformer, and
//! evaluator all need: declared-name collection, directive-prologue
//! scanning, and "does this subtree contain an `await`/`yield` that
//! belongs to it" (the latter backs
//! [`jsrt_cps::needs_transformation`](../../cps/index.html)).

use jsrt_interner::Sym;

use crate::ir::{Node, Payload, Tag};
use crate::visitor::{walk, StopAtNestedFunctions, Visitor};

/// Collects the `var`/hoisted-function names declared directly in
/// `node`'s own function/script scope (not descending into nested
/// functions, which hoist to their own scope).
pub fn var_declared_names(node: &Node) -> Vec<Sym> {
    struct Collector(Vec<Sym>);
    impl Visitor for Collector {
        fn visit_node(&mut self, node: &Node) -> bool {
            match node.tag {
                Tag::VarDecl => {
                    for binding in &node.children {
                        collect_bound_names(binding, &mut self.0);
                    }
                    true
                }
                Tag::FunctionDecl => {
                    if let Some(name) = node.children.first().and_then(Node::as_identifier) {
                        self.0.push(name);
                    }
                    // Don't descend into the declared function's own body.
                    false
                }
                Tag::FunctionExpr | Tag::ArrowFunction | Tag::ClassDecl | Tag::ClassExpr => false,
                _ => true,
            }
        }
    }
    let mut collector = Collector(Vec::new());
    walk(node, &mut collector);
    collector.0
}

/// Collects `let`/`const`/`class` names declared directly in `node`'s own
/// block scope (shallow: does not descend into nested blocks/functions).
pub fn lexically_declared_names(statements: &[Node]) -> Vec<Sym> {
    let mut names = Vec::new();
    for stmt in statements {
        match stmt.tag {
            Tag::LetDecl | Tag::ConstDecl => {
                for binding in &stmt.children {
                    collect_bound_names(binding, &mut names);
                }
            }
            Tag::ClassDecl => {
                if let Some(name) = stmt.children.first().and_then(Node::as_identifier) {
                    names.push(name);
                }
            }
            _ => {}
        }
    }
    names
}

fn collect_bound_names(binding: &Node, out: &mut Vec<Sym>) {
    match binding.tag {
        Tag::Binding => {
            if let Some(target) = binding.children.first() {
                collect_bound_names(target, out);
            }
        }
        Tag::IdBinding => {
            if let Some(name) = binding.as_identifier() {
                out.push(name);
            }
        }
        Tag::ObjectBindingPattern | Tag::ArrayBindingPattern => {
            for element in &binding.children {
                collect_bound_names(element, out);
            }
        }
        Tag::BindingProperty | Tag::BindingElement | Tag::DefaultBinding | Tag::RestBinding => {
            for child in &binding.children {
                collect_bound_names(child, out);
            }
        }
        _ => {}
    }
}

/// `true` iff `body` (a function/script body, as a statement list) opens
/// with a `"use strict"` directive prologue.
pub fn has_use_strict_directive(body: &[Node], use_strict: Sym) -> bool {
    for stmt in body {
        if stmt.tag != Tag::Directive {
            break;
        }
        if stmt.payload == Payload::Sym(use_strict) {
            return true;
        }
    }
    false
}

/// `true` iff `node`'s own function scope (not a nested one) contains an
/// `await` expression or a `for await` loop — one half of
/// `NeedsTransformation` from `spec.md` §4.3.
pub fn contains_own_await(node: &Node) -> bool {
    let mut pass = StopAtNestedFunctions {
        found: false,
        predicate: |n: &Node| n.tag == Tag::Await || is_for_await(n),
    };
    walk(node, &mut pass);
    pass.found
}

/// `true` iff `node`'s own function scope contains a `yield` expression.
pub fn contains_own_yield(node: &Node) -> bool {
    let mut pass = StopAtNestedFunctions {
        found: false,
        predicate: |n: &Node| n.tag == Tag::Yield,
    };
    walk(node, &mut pass);
    pass.found
}

fn is_for_await(node: &Node) -> bool {
    node.tag == Tag::ForOf && matches!(node.payload, Payload::Bool(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FunctionFlags, Payload};
    use crate::position::Span;
    use jsrt_interner::Interner;

    #[test]
    fn var_declared_names_collects_across_blocks_but_not_nested_functions() {
        let mut interner = Interner::new();
        let x = interner.get_or_intern("x");
        let y = interner.get_or_intern("y");

        let var_x = Node::with_children(
            Tag::VarDecl,
            Span::EMPTY,
            vec![Node::with_children(
                Tag::Binding,
                Span::EMPTY,
                vec![Node::with_payload(Tag::IdBinding, Span::EMPTY, Payload::Sym(x))],
            )],
        );
        let inner_fn = Node::leaf(
            Tag::FunctionDecl,
            Span::EMPTY,
            Payload::FunctionFlags(FunctionFlags::default()),
            vec![
                Node::with_payload(Tag::Identifier, Span::EMPTY, Payload::Sym(y)),
                Node::new(Tag::Parameters, Span::EMPTY),
                Node::with_children(
                    Tag::VarDecl,
                    Span::EMPTY,
                    vec![Node::with_children(
                        Tag::Binding,
                        Span::EMPTY,
                        vec![Node::with_payload(
                            Tag::IdBinding,
                            Span::EMPTY,
                            Payload::Sym(interner.get_or_intern("z")),
                        )],
                    )],
                ),
            ],
        );
        let block = Node::with_children(Tag::Block, Span::EMPTY, vec![var_x, inner_fn]);

        let names = var_declared_names(&block);
        assert!(names.contains(&x));
        assert!(names.contains(&y)); // function declaration name hoists
        assert!(!names.contains(&interner.get_or_intern("z"))); // nested var does not
    }

    #[test]
    fn contains_own_await_ignores_nested_function() {
        let await_expr = Node::new(Tag::Await, Span::EMPTY);
        let nested = Node::leaf(
            Tag::FunctionExpr,
            Span::EMPTY,
            Payload::FunctionFlags(FunctionFlags {
                is_async: true,
                ..Default::default()
            }),
            vec![
                Node::new(Tag::Empty, Span::EMPTY),
                Node::new(Tag::Parameters, Span::EMPTY),
                await_expr,
            ],
        );
        let outer = Node::with_children(Tag::Block, Span::EMPTY, vec![nested]);
        assert!(!contains_own_await(&outer));
    }
}
