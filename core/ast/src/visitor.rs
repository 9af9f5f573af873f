//! Generic tree walking over the cons-cell IR.
//!
//! Because every node has the same `children: Vec<Node>` shape, a single
//! recursive walker handles the whole grammar; there is no per-variant
//! `visit_if_statement`/`visit_for_loop`/... boilerplate the way a typed
//! AST visitor (e.g. `boa_ast::visitor`) needs. Passes that only care
//! about a handful of tags (the CPS transformer's `NeedsTransformation`
//! scan, tracing's scope-tag walk) implement [`Visitor`] and let
//! [`walk`] recurse into everything else for them.

use crate::ir::{Node, Tag};

/// A pass over the IR. The default method bodies recurse into children;
/// override `visit_node` to inspect a node before/after its subtree, or
/// return `false` to skip descending into it (e.g. not crossing into a
/// nested function body when counting the enclosing function's `await`s).
pub trait Visitor {
    /// Called once per node, pre-order. Return `true` to continue walking
    /// into this node's children, `false` to skip them.
    fn visit_node(&mut self, node: &Node) -> bool {
        let _ = node;
        true
    }
}

pub fn walk<V: Visitor + ?Sized>(node: &Node, visitor: &mut V) {
    if visitor.visit_node(node) {
        for child in &node.children {
            walk(child, visitor);
        }
    }
}

/// A [`Visitor`] that stops at the boundary of a nested function/arrow
/// body, used by anything that reasons about "this function's own
/// `await`/`yield`" without being confused by a function literal nested
/// inside it (which has its own, independent async/generator status).
pub struct StopAtNestedFunctions<F> {
    pub found: bool,
    pub predicate: F,
}

impl<F: FnMut(&Node) -> bool> Visitor for StopAtNestedFunctions<F> {
    fn visit_node(&mut self, node: &Node) -> bool {
        if (self.predicate)(node) {
            self.found = true;
            return false;
        }
        !matches!(
            node.tag,
            Tag::FunctionExpr | Tag::FunctionDecl | Tag::ArrowFunction
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Payload;
    use crate::position::Span;

    #[test]
    fn walk_visits_every_descendant() {
        let leaf = Node::new(Tag::ThisExpr, Span::EMPTY);
        let mut root = Node::new(Tag::Block, Span::EMPTY);
        root.push(leaf.clone());
        root.push(leaf);

        struct Counter(usize);
        impl Visitor for Counter {
            fn visit_node(&mut self, _node: &Node) -> bool {
                self.0 += 1;
                true
            }
        }
        let mut counter = Counter(0);
        walk(&root, &mut counter);
        assert_eq!(counter.0, 3); // root + 2 children
    }

    #[test]
    fn stop_at_nested_functions_does_not_cross_boundary() {
        let inner_await = Node::new(Tag::Await, Span::EMPTY);
        let mut inner_fn = Node::with_children(
            Tag::FunctionExpr,
            Span::EMPTY,
            vec![
                Node::new(Tag::Empty, Span::EMPTY),
                Node::new(Tag::Parameters, Span::EMPTY),
                inner_await,
            ],
        );
        inner_fn.payload = Payload::None;
        let outer = Node::with_children(Tag::Block, Span::EMPTY, vec![inner_fn]);

        let mut pass = StopAtNestedFunctions {
            found: false,
            predicate: |n: &Node| n.tag == Tag::Await,
        };
        walk(&outer, &mut pass);
        assert!(!pass.found, "await inside a nested function must not count");
    }
}
