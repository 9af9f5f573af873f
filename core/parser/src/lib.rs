//! Lexer and recursive-descent parser: source text to the cons-cell
//! [`jsrt_ast::ir::Node`] IR (`spec.md` §4.1/§4.2).
//!
//! [`lexer`] is hand-rolled and context-free except for the two things
//! only the parser can resolve: regex-vs-division and template-literal
//! re-entrancy (see [`cursor::Cursor`]). [`parser`] drives both into a
//! single [`parse`] entry point.

pub mod cursor;
pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{LexError, LexReason, ParseError, ParseResult};
pub use parser::parse;
