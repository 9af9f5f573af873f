//! The cons-cell intermediate representation shared by the parser, the
//! CPS transformer, and the evaluator.
//!
//! See [`ir`] for the core `Node`/`Tag` types, [`view`] for a typed
//! accessor layer over them, [`visitor`] for generic tree walking, and
//! [`operations`] for the declared-names/contains-await analyses the rest
//! of the pipeline depends on.

pub mod ir;
pub mod keyword;
pub mod operations;
pub mod position;
pub mod view;
pub mod visitor;

pub use ir::{
    AssignOp, BinaryOp, ClassMemberInfo, FunctionFlags, LogicalOp, MethodKind, Node, Payload, Tag,
    UnaryOp, UpdateOp,
};
pub use position::{Position, Span};
