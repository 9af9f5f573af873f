//! Token buffering for the parser: one token of lookahead plus the
//! "was the previous significant token regex-compatible" bookkeeping the
//! lexer needs (`spec.md` §4.1).

use jsrt_ast::Span;
use jsrt_interner::Interner;

use crate::error::ParseResult;
use crate::lexer::{Lexer, Token, TokenKind};

#[derive(Clone)]
pub struct Cursor<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str, interner: &mut Interner) -> ParseResult<Self> {
        let mut lexer = Lexer::new(src);
        let current = lexer.next_token(interner, true)?;
        Ok(Self { lexer, current })
    }

    pub fn current(&self) -> &Token {
        &self.current
    }

    pub fn span(&self) -> Span {
        self.current.span
    }

    /// Advances past the current token. `regex_allowed` tells the lexer
    /// whether a following `/` should be read as a regex literal or a
    /// division operator — the parser alone knows this from grammatical
    /// position (spec.md §4.1).
    pub fn advance(&mut self, interner: &mut Interner, regex_allowed: bool) -> ParseResult<Token> {
        let next = self.lexer.next_token(interner, regex_allowed)?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    pub fn enter_template_substitution(&mut self) {
        self.lexer.enter_template_substitution();
    }

    pub fn note_brace(&mut self, open: bool) -> bool {
        self.lexer.note_brace(open)
    }

    /// Re-lexes the current `}` as the continuation of a template
    /// literal rather than a punctuator.
    pub fn continue_template(&mut self, interner: &mut Interner) -> ParseResult<()> {
        self.current = self.lexer.continue_template(interner)?;
        Ok(())
    }

    pub fn preceded_by_newline(&self) -> bool {
        self.current.preceded_by_newline
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }
}
