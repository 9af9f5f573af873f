//! Thin, nominal accessors over the cons-cell IR.
//!
//! These are not a second data structure: they borrow straight from a
//! [`Node`] and decode its `tag`/`payload`/`children` into the shape a
//! caller would expect from a typed AST (`node.as_binary()` instead of
//! `node.children[0]`/`node.children[1]`). Per `spec.md` §9 this is the
//! "thin view... generated" option rather than a maintained parallel tree.

use jsrt_interner::Sym;

use crate::ir::{AssignOp, BinaryOp, FunctionFlags, LogicalOp, Node, Payload, Tag, UnaryOp};

/// A decoded binary expression: `left <op> right`.
pub struct BinaryView<'a> {
    pub op: BinaryOp,
    pub left: &'a Node,
    pub right: &'a Node,
}

/// A decoded logical expression (`&&`, `||`, `??`), kept distinct from
/// [`BinaryView`] because its right operand is not always evaluated.
pub struct LogicalView<'a> {
    pub op: LogicalOp,
    pub left: &'a Node,
    pub right: &'a Node,
}

pub struct AssignView<'a> {
    pub op: AssignOp,
    pub target: &'a Node,
    pub value: &'a Node,
}

pub struct FunctionView<'a> {
    pub name: Option<Sym>,
    pub flags: FunctionFlags,
    pub params: &'a Node,
    pub body: &'a [Node],
}

impl Node {
    pub fn as_identifier(&self) -> Option<Sym> {
        if self.tag == Tag::Identifier {
            if let Payload::Sym(s) = self.payload {
                return Some(s);
            }
        }
        None
    }

    pub fn as_binary(&self) -> Option<BinaryView<'_>> {
        if self.tag != Tag::Binary {
            return None;
        }
        let Payload::BinaryOp(op) = self.payload else {
            return None;
        };
        Some(BinaryView {
            op,
            left: self.children.first()?,
            right: self.children.get(1)?,
        })
    }

    pub fn as_logical(&self) -> Option<LogicalView<'_>> {
        if self.tag != Tag::Logical {
            return None;
        }
        let Payload::LogicalOp(op) = self.payload else {
            return None;
        };
        Some(LogicalView {
            op,
            left: self.children.first()?,
            right: self.children.get(1)?,
        })
    }

    pub fn as_unary(&self) -> Option<(UnaryOp, &Node)> {
        if self.tag != Tag::Unary {
            return None;
        }
        let Payload::UnaryOp(op) = self.payload else {
            return None;
        };
        Some((op, self.children.first()?))
    }

    pub fn as_assign(&self) -> Option<AssignView<'_>> {
        if self.tag != Tag::Assign {
            return None;
        }
        let Payload::AssignOp(op) = self.payload else {
            return None;
        };
        Some(AssignView {
            op,
            target: self.children.first()?,
            value: self.children.get(1)?,
        })
    }

    /// `FunctionExpr`/`FunctionDecl`/`ArrowFunction` nodes are laid out as
    /// `[name_or_empty, Parameters, body_stmt_0, body_stmt_1, ...]`: the
    /// first child is either an `Identifier` node (named function/decl) or
    /// a `Tag::Empty` placeholder (anonymous expression, every arrow).
    pub fn as_function(&self) -> Option<FunctionView<'_>> {
        if !matches!(
            self.tag,
            Tag::FunctionExpr | Tag::FunctionDecl | Tag::ArrowFunction
        ) {
            return None;
        }
        let Payload::FunctionFlags(flags) = self.payload else {
            return None;
        };
        let name = self.children.first()?.as_identifier();
        let params = self.children.get(1)?;
        Some(FunctionView {
            name,
            flags,
            params,
            body: self.children.get(2..).unwrap_or_default(),
        })
    }

    pub fn is_directive(&self, text: Sym) -> bool {
        self.tag == Tag::Directive && self.payload == Payload::Sym(text)
    }
}
