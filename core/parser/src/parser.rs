//! The recursive-descent grammar: token stream to [`Node`] trees
//! (`spec.md` §4.2).
//!
//! Keywords are not a lexer concept here — [`crate::lexer`] hands back
//! every identifier-shaped token as `TokenKind::Identifier`, and this
//! module reinterprets it by grammatical position via
//! [`jsrt_ast::keyword::Keyword::from_str`]. That is also how contextual
//! words (`async`, `of`, `get`, `set`, ...) stay legal as ordinary
//! identifiers everywhere the grammar allows it.
//!
//! Binary and logical operators share one precedence-climbing function
//! (`parse_binary_expression`) driven by a small lookup table rather than
//! one hand-written function per precedence level — the table is the
//! single place that encodes precedence and associativity.

use jsrt_ast::ir::{
    AssignOp, BinaryOp, ClassMemberInfo, FunctionFlags, LogicalOp, MethodKind, Node, Payload, Tag,
    UnaryOp, UpdateOp,
};
use jsrt_ast::position::{Position, Span};
use jsrt_interner::{Interner, Sym};

use crate::cursor::Cursor;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{NumLit, Punctuator, Token, TokenKind};

use jsrt_ast::keyword::Keyword;

/// Keywords that introduce an expression (or otherwise cannot be followed
/// by a division operator), used to disambiguate `/` as the start of a
/// regex literal rather than division (`spec.md` §4.1).
const REGEX_INTRODUCING_KEYWORDS: &[&str] = &[
    "return", "typeof", "delete", "void", "in", "instanceof", "new", "yield", "case", "throw",
    "do", "else", "of", "extends", "await", "default", "export", "import",
];

pub struct Parser<'a, 'i> {
    cursor: Cursor<'a>,
    interner: &'i mut Interner,
    use_strict_sym: Sym,
    strict: bool,
    in_async: bool,
    in_generator: bool,
    in_function: bool,
    in_loop: bool,
    in_switch: bool,
    labels: Vec<Sym>,
}

/// Parses a complete program. The returned [`Tag::Program`] node's `"use
/// strict"` status (and every nested function's) is recovered by scanning
/// each scope's directive prologue after the fact, via
/// [`jsrt_ast::operations::has_use_strict_directive`].
pub fn parse(source: &str, interner: &mut Interner) -> ParseResult<Node> {
    let mut parser = Parser::new(source, interner)?;
    parser.parse_program()
}

impl<'a, 'i> Parser<'a, 'i> {
    fn new(source: &'a str, interner: &'i mut Interner) -> ParseResult<Self> {
        let cursor = Cursor::new(source, interner)?;
        let use_strict_sym = interner.get_or_intern("use strict");
        Ok(Self {
            cursor,
            interner,
            use_strict_sym,
            strict: false,
            in_async: false,
            in_generator: false,
            in_function: false,
            in_loop: false,
            in_switch: false,
            labels: Vec::new(),
        })
    }

    // ---- token-stream plumbing -------------------------------------

    fn current(&self) -> &Token {
        self.cursor.current()
    }

    fn span(&self) -> Span {
        self.cursor.span()
    }

    fn is_eof(&self) -> bool {
        self.cursor.is_eof()
    }

    fn regex_allowed_after(&self, kind: &TokenKind) -> bool {
        match kind {
            TokenKind::Identifier(sym) => {
                REGEX_INTRODUCING_KEYWORDS.contains(&self.interner.resolve(*sym))
            }
            TokenKind::Punctuator(p) => !matches!(
                p,
                Punctuator::RParen
                    | Punctuator::RBracket
                    | Punctuator::PlusPlus
                    | Punctuator::MinusMinus
            ),
            TokenKind::Numeric(_) | TokenKind::String(_) | TokenKind::PrivateIdentifier(_) => {
                false
            }
            TokenKind::TemplatePart { tail, .. } => !*tail,
            _ => true,
        }
    }

    /// Consumes the current token and returns it, lexing the next one.
    fn advance(&mut self) -> ParseResult<Token> {
        let regex_allowed = self.regex_allowed_after(&self.current().kind);
        Ok(self.cursor.advance(self.interner, regex_allowed)?)
    }

    fn at_punct(&self, p: Punctuator) -> bool {
        matches!(&self.current().kind, TokenKind::Punctuator(q) if *q == p)
    }

    fn eat_punct(&mut self, p: Punctuator) -> ParseResult<bool> {
        if self.at_punct(p) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_punct(&mut self, p: Punctuator) -> ParseResult<Span> {
        let span = self.span();
        if self.eat_punct(p)? {
            Ok(span)
        } else {
            Err(self.unexpected(format!("{p:?}")))
        }
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::Unexpected {
            span: self.span(),
            expected: expected.into(),
            found: format!("{:?}", self.current().kind),
        }
    }

    /// The current token's text, if it's an identifier-shaped token
    /// (including every reserved/contextual keyword, which the lexer
    /// never distinguishes from plain identifiers).
    fn ident_text(&self) -> Option<&str> {
        match &self.current().kind {
            TokenKind::Identifier(s) => Some(self.interner.resolve(*s)),
            _ => None,
        }
    }

    fn at_keyword(&self, text: &str) -> bool {
        self.ident_text() == Some(text)
    }

    fn eat_keyword(&mut self, text: &str) -> ParseResult<bool> {
        if self.at_keyword(text) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_keyword(&mut self, text: &str) -> ParseResult<()> {
        if self.eat_keyword(text)? {
            Ok(())
        } else {
            Err(self.unexpected(format!("'{text}'")))
        }
    }

    fn current_identifier_sym(&mut self) -> ParseResult<Sym> {
        match self.current().kind {
            TokenKind::Identifier(s) => {
                self.advance()?;
                Ok(s)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Automatic semicolon insertion (`spec.md` §4.2): a `;` is consumed
    /// if present; otherwise the statement terminates silently at `}`,
    /// EOF, or a line terminator, and loudly anywhere else.
    fn consume_semicolon(&mut self) -> ParseResult<()> {
        if self.eat_punct(Punctuator::Semicolon)? {
            return Ok(());
        }
        if self.is_eof()
            || self.at_punct(Punctuator::RBrace)
            || self.current().preceded_by_newline
        {
            return Ok(());
        }
        Err(self.unexpected("';'"))
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.span().start)
    }

    // ---- program / statement lists ----------------------------------

    fn parse_program(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        let mut body = Vec::new();
        while !self.is_eof() {
            body.push(self.parse_statement_list_item()?);
        }
        self.strict = jsrt_ast::operations::has_use_strict_directive(&body, self.use_strict_sym);
        Ok(Node::with_children(
            Tag::Program,
            self.span_from(start),
            body,
        ))
    }

    fn parse_statement_list(&mut self) -> ParseResult<Vec<Node>> {
        let mut body = Vec::new();
        while !self.is_eof() && !self.at_punct(Punctuator::RBrace) {
            body.push(self.parse_statement_list_item()?);
        }
        Ok(body)
    }

    fn parse_statement_list_item(&mut self) -> ParseResult<Node> {
        if self.at_keyword("function") {
            return self.parse_function(true, FunctionFlags::default());
        }
        if self.at_keyword("async") && self.peek_is_function_no_newline()? {
            self.advance()?;
            return self.parse_function(
                true,
                FunctionFlags {
                    is_async: true,
                    ..Default::default()
                },
            );
        }
        if self.at_keyword("class") {
            return self.parse_class(true);
        }
        if self.at_keyword("let") || self.at_keyword("const") {
            return self.parse_variable_statement();
        }
        if self.at_keyword("import") {
            return self.parse_import_declaration();
        }
        if self.at_keyword("export") {
            return self.parse_export_declaration();
        }
        self.parse_statement()
    }

    /// Peeks whether `function` follows `async` with no line terminator
    /// between them, without consuming anything.
    fn peek_is_function_no_newline(&mut self) -> ParseResult<bool> {
        let checkpoint = self.cursor.clone();
        self.advance()?;
        let result = self.at_keyword("function") && !self.current().preceded_by_newline;
        self.cursor = checkpoint;
        Ok(result)
    }

    fn parse_statement(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        if self.at_punct(Punctuator::LBrace) {
            return self.parse_block();
        }
        if self.at_keyword("var") {
            return self.parse_variable_statement();
        }
        if self.at_punct(Punctuator::Semicolon) {
            self.advance()?;
            return Ok(Node::new(Tag::Empty, self.span_from(start)));
        }
        if self.at_keyword("if") {
            return self.parse_if_statement();
        }
        if self.at_keyword("for") {
            return self.parse_for_statement();
        }
        if self.at_keyword("while") {
            return self.parse_while_statement();
        }
        if self.at_keyword("do") {
            return self.parse_do_while_statement();
        }
        if self.at_keyword("continue") {
            return self.parse_continue_or_break(true);
        }
        if self.at_keyword("break") {
            return self.parse_continue_or_break(false);
        }
        if self.at_keyword("return") {
            return self.parse_return_statement();
        }
        if self.at_keyword("with") {
            return self.parse_with_statement();
        }
        if self.at_keyword("switch") {
            return self.parse_switch_statement();
        }
        if self.at_keyword("throw") {
            return self.parse_throw_statement();
        }
        if self.at_keyword("try") {
            return self.parse_try_statement();
        }
        if self.at_keyword("debugger") {
            self.advance()?;
            self.consume_semicolon()?;
            return Ok(Node::new(Tag::Empty, self.span_from(start)));
        }
        // LabelledStatement: Identifier ':' Statement, only when the
        // identifier isn't actually starting an expression.
        if let Some(label) = self.peek_label()? {
            self.advance()?; // identifier
            self.advance()?; // ':'
            self.labels.push(label);
            let body = self.parse_statement()?;
            self.labels.pop();
            return Ok(Node::leaf(
                Tag::Labelled,
                self.span_from(start),
                Payload::Sym(label),
                vec![body],
            ));
        }
        self.parse_expression_statement()
    }

    fn peek_label(&mut self) -> ParseResult<Option<Sym>> {
        let TokenKind::Identifier(sym) = self.current().kind else {
            return Ok(None);
        };
        if Keyword::from_str(self.interner.resolve(sym)).is_some() {
            return Ok(None);
        }
        let checkpoint = self.cursor.clone();
        self.advance()?;
        let is_label = self.at_punct(Punctuator::Colon);
        self.cursor = checkpoint;
        Ok(if is_label { Some(sym) } else { None })
    }

    fn parse_block(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_punct(Punctuator::LBrace)?;
        let body = self.parse_statement_list()?;
        self.expect_punct(Punctuator::RBrace)?;
        Ok(Node::with_children(Tag::Block, self.span_from(start), body))
    }

    // ---- declarations --------------------------------------------------

    fn parse_variable_statement(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        let tag = if self.eat_keyword("var")? {
            Tag::VarDecl
        } else if self.eat_keyword("let")? {
            Tag::LetDecl
        } else {
            self.expect_keyword("const")?;
            Tag::ConstDecl
        };
        let declarators = self.parse_variable_declaration_list(false)?;
        self.consume_semicolon()?;
        Ok(Node::with_children(
            tag,
            self.span_from(start),
            declarators,
        ))
    }

    fn parse_variable_declaration_list(&mut self, no_in: bool) -> ParseResult<Vec<Node>> {
        let mut out = vec![self.parse_variable_declarator(no_in)?];
        while self.eat_punct(Punctuator::Comma)? {
            out.push(self.parse_variable_declarator(no_in)?);
        }
        Ok(out)
    }

    fn parse_variable_declarator(&mut self, no_in: bool) -> ParseResult<Node> {
        let start = self.span().start;
        let target = self.parse_binding_target()?;
        let mut children = vec![target];
        if self.eat_punct(Punctuator::Assign)? {
            children.push(self.parse_assignment_expression(no_in)?);
        }
        Ok(Node::with_children(Tag::Binding, self.span_from(start), children))
    }

    /// `IdBinding`, `ObjectBindingPattern`, or `ArrayBindingPattern`.
    fn parse_binding_target(&mut self) -> ParseResult<Node> {
        if self.at_punct(Punctuator::LBrace) {
            return self.parse_object_binding_pattern();
        }
        if self.at_punct(Punctuator::LBracket) {
            return self.parse_array_binding_pattern();
        }
        let start = self.span().start;
        let sym = self.current_identifier_sym()?;
        Ok(Node::with_payload(
            Tag::IdBinding,
            self.span_from(start),
            Payload::Sym(sym),
        ))
    }

    fn parse_object_binding_pattern(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_punct(Punctuator::LBrace)?;
        let mut props = Vec::new();
        while !self.at_punct(Punctuator::RBrace) {
            let prop_start = self.span().start;
            if self.eat_punct(Punctuator::Ellipsis)? {
                let target = self.parse_binding_target()?;
                props.push(Node::with_children(
                    Tag::RestBinding,
                    self.span_from(prop_start),
                    vec![target],
                ));
                break;
            }
            let (key, computed) = self.parse_property_key()?;
            let value = if self.eat_punct(Punctuator::Colon)? {
                self.parse_binding_target()?
            } else {
                let name = key.as_identifier().ok_or_else(|| self.unexpected("binding identifier"))?;
                Node::with_payload(Tag::IdBinding, key.span, Payload::Sym(name))
            };
            let value = if self.eat_punct(Punctuator::Assign)? {
                let default = self.parse_assignment_expression(false)?;
                Node::with_children(Tag::DefaultBinding, self.span_from(prop_start), vec![value, default])
            } else {
                value
            };
            let key = if computed {
                Node::with_children(Tag::ComputedKey, key.span, vec![key])
            } else {
                key
            };
            props.push(Node::with_children(
                Tag::BindingProperty,
                self.span_from(prop_start),
                vec![key, value],
            ));
            if !self.eat_punct(Punctuator::Comma)? {
                break;
            }
        }
        self.expect_punct(Punctuator::RBrace)?;
        Ok(Node::with_children(
            Tag::ObjectBindingPattern,
            self.span_from(start),
            props,
        ))
    }

    fn parse_array_binding_pattern(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_punct(Punctuator::LBracket)?;
        let mut elements = Vec::new();
        while !self.at_punct(Punctuator::RBracket) {
            if self.at_punct(Punctuator::Comma) {
                elements.push(Node::new(Tag::Elision, self.span()));
                self.advance()?;
                continue;
            }
            let elem_start = self.span().start;
            if self.eat_punct(Punctuator::Ellipsis)? {
                let target = self.parse_binding_target()?;
                elements.push(Node::with_children(
                    Tag::RestBinding,
                    self.span_from(elem_start),
                    vec![target],
                ));
                break;
            }
            let target = self.parse_binding_target()?;
            let target = if self.eat_punct(Punctuator::Assign)? {
                let default = self.parse_assignment_expression(false)?;
                Node::with_children(
                    Tag::DefaultBinding,
                    self.span_from(elem_start),
                    vec![target, default],
                )
            } else {
                target
            };
            elements.push(Node::with_children(
                Tag::BindingElement,
                self.span_from(elem_start),
                vec![target],
            ));
            if !self.eat_punct(Punctuator::Comma)? {
                break;
            }
        }
        self.expect_punct(Punctuator::RBracket)?;
        Ok(Node::with_children(
            Tag::ArrayBindingPattern,
            self.span_from(start),
            elements,
        ))
    }

    /// Parses an object/class member key: an identifier, string, number,
    /// or `[computed]` expression. Returns the key node plus whether it
    /// was computed.
    fn parse_property_key(&mut self) -> ParseResult<(Node, bool)> {
        let start = self.span().start;
        if self.eat_punct(Punctuator::LBracket)? {
            let expr = self.parse_assignment_expression(false)?;
            self.expect_punct(Punctuator::RBracket)?;
            return Ok((expr, true));
        }
        match self.current().kind.clone() {
            TokenKind::Identifier(sym) => {
                self.advance()?;
                Ok((
                    Node::with_payload(Tag::Identifier, self.span_from(start), Payload::Sym(sym)),
                    false,
                ))
            }
            TokenKind::String(sym) => {
                self.advance()?;
                Ok((
                    Node::with_payload(Tag::Literal, self.span_from(start), Payload::Sym(sym)),
                    false,
                ))
            }
            TokenKind::Numeric(NumLit::Float(n)) => {
                self.advance()?;
                Ok((
                    Node::with_payload(Tag::Literal, self.span_from(start), Payload::Number(n)),
                    false,
                ))
            }
            TokenKind::Numeric(NumLit::BigInt(n)) => {
                self.advance()?;
                Ok((
                    Node::with_payload(Tag::Literal, self.span_from(start), Payload::BigInt(n)),
                    false,
                ))
            }
            TokenKind::PrivateIdentifier(sym) => {
                self.advance()?;
                Ok((
                    Node::with_payload(Tag::PrivateName, self.span_from(start), Payload::Sym(sym)),
                    false,
                ))
            }
            _ => Err(self.unexpected("property key")),
        }
    }

    // ---- functions -------------------------------------------------

    /// Parses `function` [`*`] [name] `(` params `)` `{` body `}`.
    /// `as_declaration` distinguishes `FunctionDecl` from `FunctionExpr`
    /// (an anonymous function expression is always legal; an anonymous
    /// declaration only in `export default`, handled by the caller).
    fn parse_function(&mut self, as_declaration: bool, mut flags: FunctionFlags) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("function")?;
        flags.is_generator = self.eat_punct(Punctuator::Star)?;
        let name = if let TokenKind::Identifier(sym) = self.current().kind {
            if Keyword::from_str(self.interner.resolve(sym)).is_none() || self.at_keyword("yield") || self.at_keyword("await") {
                self.advance()?;
                Node::with_payload(Tag::Identifier, self.span(), Payload::Sym(sym))
            } else {
                Node::new(Tag::Empty, self.span())
            }
        } else {
            Node::new(Tag::Empty, self.span())
        };
        let params = self.parse_formal_parameters()?;
        let (body, is_strict) = self.with_function_context(flags.is_async, flags.is_generator, |p| {
            p.expect_punct(Punctuator::LBrace)?;
            let body = p.parse_statement_list()?;
            p.expect_punct(Punctuator::RBrace)?;
            let strict = jsrt_ast::operations::has_use_strict_directive(&body, p.use_strict_sym);
            Ok((body, strict))
        })?;
        flags.is_strict = is_strict || self.strict;
        let mut children = vec![name, params];
        children.extend(body);
        Ok(Node::leaf(
            if as_declaration { Tag::FunctionDecl } else { Tag::FunctionExpr },
            self.span_from(start),
            Payload::FunctionFlags(flags),
            children,
        ))
    }

    fn with_function_context<T>(
        &mut self,
        is_async: bool,
        is_generator: bool,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let (saved_async, saved_gen, saved_fn, saved_loop, saved_switch) =
            (self.in_async, self.in_generator, self.in_function, self.in_loop, self.in_switch);
        let saved_labels = std::mem::take(&mut self.labels);
        self.in_async = is_async;
        self.in_generator = is_generator;
        self.in_function = true;
        self.in_loop = false;
        self.in_switch = false;
        let result = f(self);
        self.in_async = saved_async;
        self.in_generator = saved_gen;
        self.in_function = saved_fn;
        self.in_loop = saved_loop;
        self.in_switch = saved_switch;
        self.labels = saved_labels;
        result
    }

    fn parse_formal_parameters(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_punct(Punctuator::LParen)?;
        let mut params = Vec::new();
        while !self.at_punct(Punctuator::RParen) {
            let param_start = self.span().start;
            if self.eat_punct(Punctuator::Ellipsis)? {
                let target = self.parse_binding_target()?;
                params.push(Node::with_children(
                    Tag::RestBinding,
                    self.span_from(param_start),
                    vec![target],
                ));
                break;
            }
            let target = self.parse_binding_target()?;
            let target = if self.eat_punct(Punctuator::Assign)? {
                let default = self.parse_assignment_expression(false)?;
                Node::with_children(
                    Tag::DefaultBinding,
                    self.span_from(param_start),
                    vec![target, default],
                )
            } else {
                target
            };
            params.push(target);
            if !self.eat_punct(Punctuator::Comma)? {
                break;
            }
        }
        self.expect_punct(Punctuator::RParen)?;
        Ok(Node::with_children(Tag::Parameters, self.span_from(start), params))
    }

    // ---- classes -----------------------------------------------------

    fn parse_class(&mut self, as_declaration: bool) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("class")?;
        let name = if let TokenKind::Identifier(sym) = self.current().kind {
            if Keyword::from_str(self.interner.resolve(sym)).is_none() {
                self.advance()?;
                Node::with_payload(Tag::Identifier, self.span(), Payload::Sym(sym))
            } else {
                Node::new(Tag::Empty, self.span())
            }
        } else {
            Node::new(Tag::Empty, self.span())
        };
        let extends = if self.eat_keyword("extends")? {
            let super_expr = self.parse_lhs_expression()?;
            Node::with_children(Tag::Extends, super_expr.span, vec![super_expr])
        } else {
            Node::new(Tag::Empty, self.span())
        };
        let body = self.parse_class_body()?;
        let was_strict = self.strict;
        self.strict = true;
        let _ = was_strict; // class bodies are always strict; restored by caller scope via recursive descent
        Ok(Node::with_children(
            if as_declaration { Tag::ClassDecl } else { Tag::ClassExpr },
            self.span_from(start),
            vec![name, extends, body],
        ))
    }

    fn parse_class_body(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_punct(Punctuator::LBrace)?;
        let mut members = Vec::new();
        while !self.at_punct(Punctuator::RBrace) {
            if self.eat_punct(Punctuator::Semicolon)? {
                continue;
            }
            members.push(self.parse_class_member()?);
        }
        self.expect_punct(Punctuator::RBrace)?;
        Ok(Node::with_children(Tag::ClassBody, self.span_from(start), members))
    }

    fn parse_class_member(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        let mut is_static = false;
        if self.at_keyword("static") {
            let checkpoint = self.cursor.clone();
            self.advance()?;
            if self.at_punct(Punctuator::LBrace) {
                let body = self.parse_block()?;
                return Ok(Node::with_children(
                    Tag::StaticBlock,
                    self.span_from(start),
                    body.children,
                ));
            }
            if self.at_punct(Punctuator::LParen) || self.at_punct(Punctuator::Assign) {
                // `static` used as an ordinary member name.
                self.cursor = checkpoint;
            } else {
                is_static = true;
            }
        }

        let mut kind = MethodKind::Normal;
        if self.at_keyword("async") && !self.peek_terminates_member_name()? {
            self.advance()?;
            kind = MethodKind::Async;
        }
        let is_generator = self.eat_punct(Punctuator::Star)?;
        if is_generator {
            kind = if kind == MethodKind::Async { MethodKind::AsyncGenerator } else { MethodKind::Generator };
        }
        if kind == MethodKind::Normal && (self.at_keyword("get") || self.at_keyword("set")) && !self.peek_terminates_member_name()? {
            kind = if self.at_keyword("get") { MethodKind::Get } else { MethodKind::Set };
            self.advance()?;
        }

        let (key, computed) = self.parse_property_key()?;
        let key = if computed {
            Node::with_children(Tag::ComputedKey, key.span, vec![key])
        } else {
            key
        };

        if self.at_punct(Punctuator::LParen) {
            let params = self.parse_formal_parameters()?;
            let (body, is_strict) = self.with_function_context(
                matches!(kind, MethodKind::Async | MethodKind::AsyncGenerator),
                matches!(kind, MethodKind::Generator | MethodKind::AsyncGenerator),
                |p| {
                    p.expect_punct(Punctuator::LBrace)?;
                    let body = p.parse_statement_list()?;
                    p.expect_punct(Punctuator::RBrace)?;
                    Ok((body, jsrt_ast::operations::has_use_strict_directive(&body, p.use_strict_sym)))
                },
            )?;
            let _ = is_strict;
            let mut fn_children = vec![Node::new(Tag::Empty, key.span), params];
            fn_children.extend(body);
            let function = Node::leaf(
                Tag::FunctionExpr,
                self.span_from(start),
                Payload::FunctionFlags(FunctionFlags {
                    is_async: matches!(kind, MethodKind::Async | MethodKind::AsyncGenerator),
                    is_generator: matches!(kind, MethodKind::Generator | MethodKind::AsyncGenerator),
                    is_strict: true,
                }),
                fn_children,
            );
            return Ok(Node::leaf(
                Tag::ClassMethod,
                self.span_from(start),
                Payload::ClassMember(ClassMemberInfo { kind, is_static }),
                vec![key, function],
            ));
        }

        // Class field.
        let value = if self.eat_punct(Punctuator::Assign)? {
            self.parse_assignment_expression(false)?
        } else {
            Node::new(Tag::Empty, self.span())
        };
        self.consume_semicolon()?;
        Ok(Node::leaf(
            Tag::ClassField,
            self.span_from(start),
            Payload::ClassMember(ClassMemberInfo { kind: MethodKind::Normal, is_static }),
            vec![key, value],
        ))
    }

    /// After `async`/`get`/`set`, a `(`, `=`, `;`, or `}` means the word
    /// was actually the member's name, not a modifier.
    fn peek_terminates_member_name(&mut self) -> ParseResult<bool> {
        let checkpoint = self.cursor.clone();
        self.advance()?;
        let terminates = self.at_punct(Punctuator::LParen)
            || self.at_punct(Punctuator::Assign)
            || self.at_punct(Punctuator::Semicolon)
            || self.at_punct(Punctuator::RBrace)
            || self.current().preceded_by_newline;
        self.cursor = checkpoint;
        Ok(terminates)
    }

    // ---- control flow --------------------------------------------------

    fn parse_if_statement(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("if")?;
        self.expect_punct(Punctuator::LParen)?;
        let test = self.parse_expression(false)?;
        self.expect_punct(Punctuator::RParen)?;
        let consequent = self.parse_statement()?;
        let alternate = if self.eat_keyword("else")? {
            self.parse_statement()?
        } else {
            Node::new(Tag::Empty, self.span())
        };
        Ok(Node::with_children(
            Tag::If,
            self.span_from(start),
            vec![test, consequent, alternate],
        ))
    }

    fn parse_while_statement(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("while")?;
        self.expect_punct(Punctuator::LParen)?;
        let test = self.parse_expression(false)?;
        self.expect_punct(Punctuator::RParen)?;
        let body = self.in_loop(|p| p.parse_statement())?;
        Ok(Node::with_children(Tag::While, self.span_from(start), vec![test, body]))
    }

    fn parse_do_while_statement(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("do")?;
        let body = self.in_loop(|p| p.parse_statement())?;
        self.expect_keyword("while")?;
        self.expect_punct(Punctuator::LParen)?;
        let test = self.parse_expression(false)?;
        self.expect_punct(Punctuator::RParen)?;
        self.eat_punct(Punctuator::Semicolon)?;
        Ok(Node::with_children(Tag::DoWhile, self.span_from(start), vec![body, test]))
    }

    fn in_loop<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let saved = self.in_loop;
        self.in_loop = true;
        let result = f(self);
        self.in_loop = saved;
        result
    }

    fn parse_for_statement(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("for")?;
        let is_await = self.at_keyword("await") && {
            self.advance()?;
            true
        };
        self.expect_punct(Punctuator::LParen)?;

        let init = if self.at_punct(Punctuator::Semicolon) {
            None
        } else if self.at_keyword("var") || self.at_keyword("let") || self.at_keyword("const") {
            let tag = if self.eat_keyword("var")? {
                Tag::VarDecl
            } else if self.eat_keyword("let")? {
                Tag::LetDecl
            } else {
                self.expect_keyword("const")?;
                Tag::ConstDecl
            };
            let decl_start = self.span().start;
            let target = self.parse_binding_target()?;
            if self.at_keyword("in") || self.at_keyword("of") {
                let binding = Node::with_children(tag, self.span_from(decl_start), vec![
                    Node::with_children(Tag::Binding, target.span, vec![target]),
                ]);
                return self.parse_for_in_of_tail(start, binding, is_await);
            }
            let mut declarator_children = vec![target];
            if self.eat_punct(Punctuator::Assign)? {
                declarator_children.push(self.parse_assignment_expression(true)?);
            }
            let mut declarators = vec![Node::with_children(
                Tag::Binding,
                self.span_from(decl_start),
                declarator_children,
            )];
            while self.eat_punct(Punctuator::Comma)? {
                declarators.push(self.parse_variable_declarator(true)?);
            }
            Some(Node::with_children(tag, self.span_from(decl_start), declarators))
        } else {
            let expr_start = self.span().start;
            let expr = self.parse_expression(true)?;
            if self.at_keyword("in") || self.at_keyword("of") {
                let target = self.expr_to_assignment_target(expr)?;
                let _ = expr_start;
                return self.parse_for_in_of_tail(start, target, is_await);
            }
            Some(Node::with_children(Tag::ExpressionStatement, expr.span, vec![expr]))
        };

        self.expect_punct(Punctuator::Semicolon)?;
        let test = if self.at_punct(Punctuator::Semicolon) {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        self.expect_punct(Punctuator::Semicolon)?;
        let update = if self.at_punct(Punctuator::RParen) {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        self.expect_punct(Punctuator::RParen)?;
        let body = self.in_loop(|p| p.parse_statement())?;

        let empty = || Node::new(Tag::Empty, Span::EMPTY);
        Ok(Node::with_children(
            Tag::For,
            self.span_from(start),
            vec![
                init.unwrap_or_else(empty),
                test.unwrap_or_else(empty),
                update.unwrap_or_else(empty),
                body,
            ],
        ))
    }

    fn parse_for_in_of_tail(&mut self, start: Position, left: Node, is_await: bool) -> ParseResult<Node> {
        let is_of = self.at_keyword("of");
        self.advance()?; // 'in' or 'of'
        let right = if is_of {
            self.parse_assignment_expression(false)?
        } else {
            self.parse_expression(false)?
        };
        self.expect_punct(Punctuator::RParen)?;
        let body = self.in_loop(|p| p.parse_statement())?;
        let mut node = Node::with_children(
            if is_of { Tag::ForOf } else { Tag::ForIn },
            self.span_from(start),
            vec![left, right, body],
        );
        if is_of && is_await {
            node.payload = Payload::Bool(true);
        }
        Ok(node)
    }

    fn parse_continue_or_break(&mut self, is_continue: bool) -> ParseResult<Node> {
        let start = self.span().start;
        self.advance()?;
        let label = if !self.current().preceded_by_newline {
            if let TokenKind::Identifier(sym) = self.current().kind {
                if Keyword::from_str(self.interner.resolve(sym)).is_none() {
                    self.advance()?;
                    Some(sym)
                } else {
                    None
                }
            } else {
                None
            }
        } else {
            None
        };
        self.consume_semicolon()?;
        let payload = label.map(Payload::Sym).unwrap_or(Payload::None);
        Ok(Node::with_payload(
            if is_continue { Tag::Continue } else { Tag::Break },
            self.span_from(start),
            payload,
        ))
    }

    fn parse_return_statement(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("return")?;
        let mut children = Vec::new();
        if !self.current().preceded_by_newline
            && !self.at_punct(Punctuator::Semicolon)
            && !self.at_punct(Punctuator::RBrace)
            && !self.is_eof()
        {
            children.push(self.parse_expression(false)?);
        }
        self.consume_semicolon()?;
        Ok(Node::with_children(Tag::Return, self.span_from(start), children))
    }

    fn parse_with_statement(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("with")?;
        self.expect_punct(Punctuator::LParen)?;
        let object = self.parse_expression(false)?;
        self.expect_punct(Punctuator::RParen)?;
        let body = self.parse_statement()?;
        Ok(Node::with_children(Tag::With, self.span_from(start), vec![object, body]))
    }

    fn parse_switch_statement(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("switch")?;
        self.expect_punct(Punctuator::LParen)?;
        let discriminant = self.parse_expression(false)?;
        self.expect_punct(Punctuator::RParen)?;
        self.expect_punct(Punctuator::LBrace)?;
        let saved_switch = self.in_switch;
        self.in_switch = true;
        let mut cases = vec![discriminant];
        while !self.at_punct(Punctuator::RBrace) {
            let case_start = self.span().start;
            if self.eat_keyword("case")? {
                let test = self.parse_expression(false)?;
                self.expect_punct(Punctuator::Colon)?;
                let mut body = vec![test];
                while !self.at_keyword("case") && !self.at_keyword("default") && !self.at_punct(Punctuator::RBrace) {
                    body.push(self.parse_statement_list_item()?);
                }
                cases.push(Node::with_children(Tag::SwitchCase, self.span_from(case_start), body));
            } else {
                self.expect_keyword("default")?;
                self.expect_punct(Punctuator::Colon)?;
                let mut body = Vec::new();
                while !self.at_keyword("case") && !self.at_keyword("default") && !self.at_punct(Punctuator::RBrace) {
                    body.push(self.parse_statement_list_item()?);
                }
                cases.push(Node::with_children(Tag::Default, self.span_from(case_start), body));
            }
        }
        self.expect_punct(Punctuator::RBrace)?;
        self.in_switch = saved_switch;
        Ok(Node::with_children(Tag::Switch, self.span_from(start), cases))
    }

    fn parse_throw_statement(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("throw")?;
        if self.current().preceded_by_newline {
            return Err(self.unexpected("expression (no line terminator after 'throw')"));
        }
        let expr = self.parse_expression(false)?;
        self.consume_semicolon()?;
        Ok(Node::with_children(Tag::Throw, self.span_from(start), vec![expr]))
    }

    fn parse_try_statement(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("try")?;
        let block = self.parse_block()?;
        let catch = if self.eat_keyword("catch")? {
            let catch_start = self.span().start;
            let param = if self.eat_punct(Punctuator::LParen)? {
                let target = self.parse_binding_target()?;
                self.expect_punct(Punctuator::RParen)?;
                target
            } else {
                Node::new(Tag::Empty, self.span())
            };
            let body = self.parse_block()?;
            Node::with_children(Tag::Catch, self.span_from(catch_start), vec![param, body])
        } else {
            Node::new(Tag::Empty, self.span())
        };
        let finally = if self.eat_keyword("finally")? {
            let finally_start = self.span().start;
            let body = self.parse_block()?;
            Node::with_children(Tag::Finally, self.span_from(finally_start), vec![body])
        } else {
            Node::new(Tag::Empty, self.span())
        };
        Ok(Node::with_children(
            Tag::Try,
            self.span_from(start),
            vec![block, catch, finally],
        ))
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        let expr = self.parse_expression(false)?;
        self.consume_semicolon()?;
        let span = self.span_from(start);
        if expr.tag == Tag::Literal {
            if let Payload::Sym(text) = &expr.payload {
                return Ok(Node::with_payload(Tag::Directive, span, Payload::Sym(*text)));
            }
        }
        Ok(Node::with_children(Tag::ExpressionStatement, span, vec![expr]))
    }

    // ---- expressions -----------------------------------------------

    /// The full `Expression` production, including the comma operator.
    fn parse_expression(&mut self, no_in: bool) -> ParseResult<Node> {
        let start = self.span().start;
        let mut expr = self.parse_assignment_expression(no_in)?;
        if self.at_punct(Punctuator::Comma) {
            let mut items = vec![expr];
            while self.eat_punct(Punctuator::Comma)? {
                items.push(self.parse_assignment_expression(no_in)?);
            }
            expr = Node::leaf(
                Tag::Sequence,
                self.span_from(start),
                Payload::BinaryOp(BinaryOp::Comma),
                items,
            );
        }
        Ok(expr)
    }

    fn parse_assignment_expression(&mut self, no_in: bool) -> ParseResult<Node> {
        if self.in_generator && self.at_keyword("yield") {
            return self.parse_yield_expression(no_in);
        }
        if let Some(arrow) = self.try_parse_arrow_function(no_in)? {
            return Ok(arrow);
        }
        let start = self.span().start;
        let lhs = self.parse_conditional_expression(no_in)?;
        if let Some(op) = self.current_assign_op() {
            self.advance()?;
            let rhs = self.parse_assignment_expression(no_in)?;
            let target = if op == AssignOp::Assign {
                self.expr_to_assignment_target(lhs)?
            } else {
                lhs
            };
            return Ok(Node::leaf(
                Tag::Assign,
                self.span_from(start),
                Payload::AssignOp(op),
                vec![target, rhs],
            ));
        }
        Ok(lhs)
    }

    fn current_assign_op(&self) -> Option<AssignOp> {
        let TokenKind::Punctuator(p) = self.current().kind else {
            return None;
        };
        Some(match p {
            Punctuator::Assign => AssignOp::Assign,
            Punctuator::PlusEq => AssignOp::Add,
            Punctuator::MinusEq => AssignOp::Sub,
            Punctuator::StarEq => AssignOp::Mul,
            Punctuator::SlashEq => AssignOp::Div,
            Punctuator::PercentEq => AssignOp::Mod,
            Punctuator::StarStarEq => AssignOp::Exp,
            Punctuator::BitAndEq => AssignOp::BitAnd,
            Punctuator::BitOrEq => AssignOp::BitOr,
            Punctuator::BitXorEq => AssignOp::BitXor,
            Punctuator::ShlEq => AssignOp::Shl,
            Punctuator::ShrEq => AssignOp::Shr,
            Punctuator::UShrEq => AssignOp::UShr,
            Punctuator::LogicalAndEq => AssignOp::LogicalAnd,
            Punctuator::LogicalOrEq => AssignOp::LogicalOr,
            Punctuator::QuestionQuestionEq => AssignOp::Coalesce,
            _ => return None,
        })
    }

    fn parse_yield_expression(&mut self, no_in: bool) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("yield")?;
        let delegate = self.eat_punct(Punctuator::Star)?;
        let mut children = Vec::new();
        let has_arg = !self.current().preceded_by_newline
            && !self.at_punct(Punctuator::Semicolon)
            && !self.at_punct(Punctuator::RParen)
            && !self.at_punct(Punctuator::RBracket)
            && !self.at_punct(Punctuator::RBrace)
            && !self.at_punct(Punctuator::Colon)
            && !self.at_punct(Punctuator::Comma)
            && !self.is_eof();
        if has_arg || delegate {
            children.push(self.parse_assignment_expression(no_in)?);
        }
        Ok(Node::leaf(
            Tag::Yield,
            self.span_from(start),
            Payload::Bool(delegate),
            children,
        ))
    }

    /// Tries to parse an arrow function starting at the current position,
    /// restoring the cursor and returning `None` if it turns out not to be
    /// one. Handles `x => ...`, `(a, b) => ...`, and the `async` variants.
    fn try_parse_arrow_function(&mut self, no_in: bool) -> ParseResult<Option<Node>> {
        let start = self.span().start;
        let checkpoint = self.cursor.clone();

        let mut is_async = false;
        if self.at_keyword("async") && !self.peek_is_paren_or_ident_no_newline()? {
            return Ok(None);
        }
        if self.at_keyword("async") {
            self.advance()?;
            is_async = true;
        }

        if let TokenKind::Identifier(sym) = self.current().kind {
            if Keyword::from_str(self.interner.resolve(sym)).is_none() {
                let checkpoint2 = self.cursor.clone();
                self.advance()?;
                if self.at_punct(Punctuator::Arrow) && !self.current().preceded_by_newline {
                    self.advance()?; // '=>'
                    let param = Node::with_payload(Tag::IdBinding, checkpoint2.current().span, Payload::Sym(sym));
                    let params = Node::with_children(Tag::Parameters, param.span, vec![param]);
                    return self
                        .parse_arrow_body(start, params, is_async, no_in)
                        .map(Some);
                }
                self.cursor = checkpoint;
                return Ok(None);
            }
        }

        if !self.at_punct(Punctuator::LParen) {
            self.cursor = checkpoint;
            return Ok(None);
        }

        // Tentatively parse a parameter list; only commit if `=>` follows.
        let params = match self.parse_formal_parameters() {
            Ok(p) => p,
            Err(_) => {
                self.cursor = checkpoint;
                return Ok(None);
            }
        };
        if !self.at_punct(Punctuator::Arrow) || self.current().preceded_by_newline {
            self.cursor = checkpoint;
            return Ok(None);
        }
        self.advance()?; // '=>'
        self.parse_arrow_body(start, params, is_async, no_in).map(Some)
    }

    fn peek_is_paren_or_ident_no_newline(&mut self) -> ParseResult<bool> {
        let checkpoint = self.cursor.clone();
        self.advance()?;
        let ok = !self.current().preceded_by_newline
            && (self.at_punct(Punctuator::LParen)
                || matches!(self.current().kind, TokenKind::Identifier(_)));
        self.cursor = checkpoint;
        Ok(ok)
    }

    /// Arrow bodies with a bare expression (no braces) are normalized into
    /// a single implicit `Return`, so `ArrowFunction` shares the same
    /// `[name_or_empty, Parameters, ...body]` shape as every other
    /// function node (`jsrt_ast::view::as_function`).
    fn parse_arrow_body(
        &mut self,
        start: Position,
        params: Node,
        is_async: bool,
        no_in: bool,
    ) -> ParseResult<Node> {
        let body = if self.at_punct(Punctuator::LBrace) {
            self.with_function_context(is_async, false, |p| {
                p.expect_punct(Punctuator::LBrace)?;
                let body = p.parse_statement_list()?;
                p.expect_punct(Punctuator::RBrace)?;
                Ok(body)
            })?
        } else {
            let expr = self.with_function_context(is_async, false, |p| {
                p.parse_assignment_expression(no_in)
            })?;
            vec![Node::with_children(Tag::Return, expr.span, vec![expr])]
        };
        let mut children = vec![Node::new(Tag::Empty, params.span), params];
        children.extend(body);
        Ok(Node::leaf(
            Tag::ArrowFunction,
            self.span_from(start),
            Payload::FunctionFlags(FunctionFlags {
                is_async,
                is_generator: false,
                is_strict: self.strict,
            }),
            children,
        ))
    }

    fn parse_conditional_expression(&mut self, no_in: bool) -> ParseResult<Node> {
        let start = self.span().start;
        let test = self.parse_binary_expression(0, no_in)?;
        if self.eat_punct(Punctuator::Question)? {
            let consequent = self.parse_assignment_expression(false)?;
            self.expect_punct(Punctuator::Colon)?;
            let alternate = self.parse_assignment_expression(no_in)?;
            return Ok(Node::with_children(
                Tag::Conditional,
                self.span_from(start),
                vec![test, consequent, alternate],
            ));
        }
        Ok(test)
    }

    /// Binary/logical operator precedence table: `(min binding power,
    /// operator, right-associative?)`. One precedence-climbing function
    /// replaces the usual cascade of per-level parse functions.
    fn binary_op_info(&self, no_in: bool) -> Option<(u8, BinOrLogical, bool)> {
        use BinOrLogical::*;
        let info = match &self.current().kind {
            TokenKind::Punctuator(p) => match p {
                Punctuator::QuestionQuestion => (1, Logical(LogicalOp::Coalesce), false),
                Punctuator::LogicalOr => (2, Logical(LogicalOp::Or), false),
                Punctuator::LogicalAnd => (3, Logical(LogicalOp::And), false),
                Punctuator::BitOr => (4, Bin(BinaryOp::BitOr), false),
                Punctuator::BitXor => (5, Bin(BinaryOp::BitXor), false),
                Punctuator::BitAnd => (6, Bin(BinaryOp::BitAnd), false),
                Punctuator::Eq => (7, Bin(BinaryOp::Equal), false),
                Punctuator::NotEq => (7, Bin(BinaryOp::NotEqual), false),
                Punctuator::StrictEq => (7, Bin(BinaryOp::StrictEqual), false),
                Punctuator::StrictNotEq => (7, Bin(BinaryOp::StrictNotEqual), false),
                Punctuator::Lt => (8, Bin(BinaryOp::LessThan), false),
                Punctuator::Gt => (8, Bin(BinaryOp::GreaterThan), false),
                Punctuator::LtEq => (8, Bin(BinaryOp::LessThanOrEqual), false),
                Punctuator::GtEq => (8, Bin(BinaryOp::GreaterThanOrEqual), false),
                Punctuator::Shl => (9, Bin(BinaryOp::Shl), false),
                Punctuator::Shr => (9, Bin(BinaryOp::Shr), false),
                Punctuator::UShr => (9, Bin(BinaryOp::UShr), false),
                Punctuator::Plus => (10, Bin(BinaryOp::Add), false),
                Punctuator::Minus => (10, Bin(BinaryOp::Sub), false),
                Punctuator::Star => (11, Bin(BinaryOp::Mul), false),
                Punctuator::Slash => (11, Bin(BinaryOp::Div), false),
                Punctuator::Percent => (11, Bin(BinaryOp::Mod), false),
                Punctuator::StarStar => (12, Bin(BinaryOp::Exp), true),
                _ => return None,
            },
            TokenKind::Identifier(sym) => {
                let text = self.interner.resolve(*sym);
                if text == "instanceof" {
                    (8, Bin(BinaryOp::InstanceOf), false)
                } else if text == "in" && !no_in {
                    (8, Bin(BinaryOp::In), false)
                } else {
                    return None;
                }
            }
            _ => return None,
        };
        Some(info)
    }

    fn parse_binary_expression(&mut self, min_prec: u8, no_in: bool) -> ParseResult<Node> {
        let start = self.span().start;
        let mut left = self.parse_unary_expression()?;
        while let Some((prec, op, right_assoc)) = self.binary_op_info(no_in) {
            if prec < min_prec {
                break;
            }
            self.advance()?;
            let next_min = if right_assoc { prec } else { prec + 1 };
            let right = self.parse_binary_expression(next_min, no_in)?;
            left = match op {
                BinOrLogical::Bin(op) => Node::leaf(
                    Tag::Binary,
                    self.span_from(start),
                    Payload::BinaryOp(op),
                    vec![left, right],
                ),
                BinOrLogical::Logical(op) => Node::leaf(
                    Tag::Logical,
                    self.span_from(start),
                    Payload::LogicalOp(op),
                    vec![left, right],
                ),
            };
        }
        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        let op = if self.eat_punct(Punctuator::Minus)? {
            Some(UnaryOp::Minus)
        } else if self.eat_punct(Punctuator::Plus)? {
            Some(UnaryOp::Plus)
        } else if self.eat_punct(Punctuator::Not)? {
            Some(UnaryOp::Not)
        } else if self.eat_punct(Punctuator::BitNot)? {
            Some(UnaryOp::BitNot)
        } else if self.eat_keyword("typeof")? {
            Some(UnaryOp::TypeOf)
        } else if self.eat_keyword("void")? {
            Some(UnaryOp::Void)
        } else if self.eat_keyword("delete")? {
            Some(UnaryOp::Delete)
        } else {
            None
        };
        if let Some(op) = op {
            let operand = self.parse_unary_expression()?;
            return Ok(Node::leaf(
                Tag::Unary,
                self.span_from(start),
                Payload::UnaryOp(op),
                vec![operand],
            ));
        }
        if self.in_async && self.at_keyword("await") {
            self.advance()?;
            let operand = self.parse_unary_expression()?;
            return Ok(Node::with_children(Tag::Await, self.span_from(start), vec![operand]));
        }
        if self.at_punct(Punctuator::PlusPlus) || self.at_punct(Punctuator::MinusMinus) {
            let inc = self.at_punct(Punctuator::PlusPlus);
            self.advance()?;
            let operand = self.parse_unary_expression()?;
            let target = self.expr_to_assignment_target(operand)?;
            return Ok(Node::leaf(
                Tag::Update,
                self.span_from(start),
                Payload::UpdateOp {
                    op: if inc { UpdateOp::Increment } else { UpdateOp::Decrement },
                    prefix: true,
                },
                vec![target],
            ));
        }
        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        let expr = self.parse_lhs_expression()?;
        if !self.current().preceded_by_newline
            && (self.at_punct(Punctuator::PlusPlus) || self.at_punct(Punctuator::MinusMinus))
        {
            let inc = self.at_punct(Punctuator::PlusPlus);
            self.advance()?;
            let target = self.expr_to_assignment_target(expr)?;
            return Ok(Node::leaf(
                Tag::Update,
                self.span_from(start),
                Payload::UpdateOp {
                    op: if inc { UpdateOp::Increment } else { UpdateOp::Decrement },
                    prefix: false,
                },
                vec![target],
            ));
        }
        Ok(expr)
    }

    /// `NewExpression`/`MemberExpression`/`CallExpression`, folded into one
    /// left-to-right chain over member access, calls, and optional
    /// chaining — the usual "left-hand-side expression" production.
    fn parse_lhs_expression(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        let mut expr = if self.at_keyword("new") {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        loop {
            if self.eat_punct(Punctuator::Dot)? {
                let key = self.parse_member_name()?;
                expr = Node::with_children(Tag::Member, self.span_from(start), vec![expr, key]);
            } else if self.at_punct(Punctuator::QuestionDot) {
                self.advance()?;
                if self.at_punct(Punctuator::LParen) {
                    let args = self.parse_arguments()?;
                    let mut children = vec![expr];
                    children.extend(args);
                    expr = Node::with_children(Tag::OptionalCall, self.span_from(start), children);
                } else if self.eat_punct(Punctuator::LBracket)? {
                    let key = self.parse_expression(false)?;
                    self.expect_punct(Punctuator::RBracket)?;
                    expr = Node::with_children(
                        Tag::OptionalComputedMember,
                        self.span_from(start),
                        vec![expr, key],
                    );
                } else {
                    let key = self.parse_member_name()?;
                    expr = Node::with_children(Tag::OptionalMember, self.span_from(start), vec![expr, key]);
                }
            } else if self.eat_punct(Punctuator::LBracket)? {
                let key = self.parse_expression(false)?;
                self.expect_punct(Punctuator::RBracket)?;
                expr = Node::with_children(Tag::ComputedMember, self.span_from(start), vec![expr, key]);
            } else if self.at_punct(Punctuator::LParen) {
                let args = self.parse_arguments()?;
                let mut children = vec![expr];
                children.extend(args);
                expr = Node::with_children(Tag::Call, self.span_from(start), children);
            } else if matches!(self.current().kind, TokenKind::TemplatePart { head: true, .. }) {
                let template = self.parse_template_literal()?;
                expr = Node::with_children(Tag::TaggedTemplate, self.span_from(start), vec![expr, template]);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_member_name(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        match self.current().kind {
            TokenKind::Identifier(sym) => {
                self.advance()?;
                Ok(Node::with_payload(Tag::Identifier, self.span_from(start), Payload::Sym(sym)))
            }
            TokenKind::PrivateIdentifier(sym) => {
                self.advance()?;
                Ok(Node::with_payload(Tag::PrivateName, self.span_from(start), Payload::Sym(sym)))
            }
            _ => Err(self.unexpected("property name")),
        }
    }

    fn parse_new_expression(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("new")?;
        if self.eat_punct(Punctuator::Dot)? {
            self.expect_keyword("target")?;
            return Ok(Node::new(Tag::MetaProperty, self.span_from(start)));
        }
        let callee = if self.at_keyword("new") {
            self.parse_new_expression()?
        } else {
            let mut callee = self.parse_primary_expression()?;
            loop {
                if self.eat_punct(Punctuator::Dot)? {
                    let key = self.parse_member_name()?;
                    callee = Node::with_children(Tag::Member, self.span_from(start), vec![callee, key]);
                } else if self.eat_punct(Punctuator::LBracket)? {
                    let key = self.parse_expression(false)?;
                    self.expect_punct(Punctuator::RBracket)?;
                    callee = Node::with_children(Tag::ComputedMember, self.span_from(start), vec![callee, key]);
                } else {
                    break;
                }
            }
            callee
        };
        let args = if self.at_punct(Punctuator::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        let mut children = vec![callee];
        children.extend(args);
        Ok(Node::with_children(Tag::New, self.span_from(start), children))
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Node>> {
        self.expect_punct(Punctuator::LParen)?;
        let mut args = Vec::new();
        while !self.at_punct(Punctuator::RParen) {
            let arg_start = self.span().start;
            if self.eat_punct(Punctuator::Ellipsis)? {
                let expr = self.parse_assignment_expression(false)?;
                args.push(Node::with_children(Tag::SpreadElement, self.span_from(arg_start), vec![expr]));
            } else {
                args.push(self.parse_assignment_expression(false)?);
            }
            if !self.eat_punct(Punctuator::Comma)? {
                break;
            }
        }
        self.expect_punct(Punctuator::RParen)?;
        Ok(args)
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        if self.at_keyword("this") {
            self.advance()?;
            return Ok(Node::new(Tag::ThisExpr, self.span_from(start)));
        }
        if self.at_keyword("super") {
            self.advance()?;
            if self.eat_punct(Punctuator::Dot)? {
                let key = self.parse_member_name()?;
                return Ok(Node::with_children(Tag::SuperProperty, self.span_from(start), vec![key]));
            }
            if self.eat_punct(Punctuator::LBracket)? {
                let key = self.parse_expression(false)?;
                self.expect_punct(Punctuator::RBracket)?;
                return Ok(Node::with_children(Tag::SuperProperty, self.span_from(start), vec![key]));
            }
            let args = self.parse_arguments()?;
            return Ok(Node::with_children(Tag::SuperCall, self.span_from(start), args));
        }
        if self.at_keyword("function") {
            return self.parse_function(false, FunctionFlags::default());
        }
        if self.at_keyword("async") && self.peek_is_function_no_newline()? {
            self.advance()?;
            return self.parse_function(
                false,
                FunctionFlags {
                    is_async: true,
                    ..Default::default()
                },
            );
        }
        if self.at_keyword("class") {
            return self.parse_class(false);
        }
        if self.at_keyword("true") {
            self.advance()?;
            return Ok(Node::with_payload(Tag::Literal, self.span_from(start), Payload::Bool(true)));
        }
        if self.at_keyword("false") {
            self.advance()?;
            return Ok(Node::with_payload(Tag::Literal, self.span_from(start), Payload::Bool(false)));
        }
        if self.at_keyword("null") {
            self.advance()?;
            return Ok(Node::with_payload(Tag::Literal, self.span_from(start), Payload::Null));
        }
        if self.at_punct(Punctuator::LParen) {
            self.advance()?;
            let expr = self.parse_expression(false)?;
            self.expect_punct(Punctuator::RParen)?;
            return Ok(expr);
        }
        if self.at_punct(Punctuator::LBracket) {
            return self.parse_array_literal();
        }
        if self.at_punct(Punctuator::LBrace) {
            return self.parse_object_literal();
        }
        if matches!(self.current().kind, TokenKind::TemplatePart { .. }) {
            return self.parse_template_literal();
        }
        match self.current().kind.clone() {
            TokenKind::Identifier(sym) => {
                if Keyword::from_str(self.interner.resolve(sym)).is_some()
                    && !jsrt_ast::keyword::CONTEXTUAL_KEYWORDS.contains(&self.interner.resolve(sym))
                {
                    return Err(self.unexpected("expression"));
                }
                self.advance()?;
                Ok(Node::with_payload(Tag::Identifier, self.span_from(start), Payload::Sym(sym)))
            }
            TokenKind::PrivateIdentifier(sym) => {
                self.advance()?;
                Ok(Node::with_payload(Tag::PrivateName, self.span_from(start), Payload::Sym(sym)))
            }
            TokenKind::Numeric(NumLit::Float(n)) => {
                self.advance()?;
                Ok(Node::with_payload(Tag::Literal, self.span_from(start), Payload::Number(n)))
            }
            TokenKind::Numeric(NumLit::BigInt(n)) => {
                self.advance()?;
                Ok(Node::with_payload(Tag::Literal, self.span_from(start), Payload::BigInt(n)))
            }
            TokenKind::String(sym) => {
                self.advance()?;
                Ok(Node::with_payload(Tag::Literal, self.span_from(start), Payload::Sym(sym)))
            }
            TokenKind::Regex { pattern, flags } => {
                self.advance()?;
                Ok(Node::with_payload(
                    Tag::RegexLiteral,
                    self.span_from(start),
                    Payload::Regex { pattern, flags },
                ))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_array_literal(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_punct(Punctuator::LBracket)?;
        let mut elements = Vec::new();
        while !self.at_punct(Punctuator::RBracket) {
            if self.at_punct(Punctuator::Comma) {
                elements.push(Node::new(Tag::Elision, self.span()));
                self.advance()?;
                continue;
            }
            let elem_start = self.span().start;
            if self.eat_punct(Punctuator::Ellipsis)? {
                let expr = self.parse_assignment_expression(false)?;
                elements.push(Node::with_children(Tag::SpreadElement, self.span_from(elem_start), vec![expr]));
            } else {
                elements.push(self.parse_assignment_expression(false)?);
            }
            if !self.eat_punct(Punctuator::Comma)? {
                break;
            }
        }
        self.expect_punct(Punctuator::RBracket)?;
        Ok(Node::with_children(Tag::ArrayLiteral, self.span_from(start), elements))
    }

    fn parse_object_literal(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_punct(Punctuator::LBrace)?;
        let mut props = Vec::new();
        while !self.at_punct(Punctuator::RBrace) {
            props.push(self.parse_property_definition()?);
            if !self.eat_punct(Punctuator::Comma)? {
                break;
            }
        }
        self.expect_punct(Punctuator::RBrace)?;
        Ok(Node::with_children(Tag::ObjectLiteral, self.span_from(start), props))
    }

    fn parse_property_definition(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        if self.eat_punct(Punctuator::Ellipsis)? {
            let expr = self.parse_assignment_expression(false)?;
            return Ok(Node::with_children(Tag::SpreadElement, self.span_from(start), vec![expr]));
        }

        let mut kind = MethodKind::Normal;
        if self.at_keyword("async") && !self.peek_terminates_member_name()? {
            self.advance()?;
            kind = MethodKind::Async;
        }
        let is_generator = self.eat_punct(Punctuator::Star)?;
        if is_generator {
            kind = if kind == MethodKind::Async { MethodKind::AsyncGenerator } else { MethodKind::Generator };
        }
        if kind == MethodKind::Normal && (self.at_keyword("get") || self.at_keyword("set")) && !self.peek_terminates_member_name()? {
            kind = if self.at_keyword("get") { MethodKind::Get } else { MethodKind::Set };
            self.advance()?;
        }

        let (key, computed) = self.parse_property_key()?;

        if self.at_punct(Punctuator::LParen) {
            let params = self.parse_formal_parameters()?;
            let (body, _) = self.with_function_context(
                matches!(kind, MethodKind::Async | MethodKind::AsyncGenerator),
                matches!(kind, MethodKind::Generator | MethodKind::AsyncGenerator),
                |p| {
                    p.expect_punct(Punctuator::LBrace)?;
                    let body = p.parse_statement_list()?;
                    p.expect_punct(Punctuator::RBrace)?;
                    Ok((body, ()))
                },
            )?;
            let mut fn_children = vec![Node::new(Tag::Empty, key.span), params];
            fn_children.extend(body);
            let function = Node::leaf(
                Tag::FunctionExpr,
                self.span_from(start),
                Payload::FunctionFlags(FunctionFlags {
                    is_async: matches!(kind, MethodKind::Async | MethodKind::AsyncGenerator),
                    is_generator: matches!(kind, MethodKind::Generator | MethodKind::AsyncGenerator),
                    is_strict: self.strict,
                }),
                fn_children,
            );
            let key = if computed {
                Node::with_children(Tag::ComputedKey, key.span, vec![key])
            } else {
                key
            };
            return Ok(Node::leaf(
                Tag::PropertyDefinition,
                self.span_from(start),
                Payload::MethodKind(kind),
                vec![key, function],
            ));
        }

        if !computed && self.at_punct(Punctuator::Colon) {
            self.advance()?;
            let value = self.parse_assignment_expression(false)?;
            return Ok(Node::leaf(
                Tag::PropertyDefinition,
                self.span_from(start),
                Payload::MethodKind(MethodKind::Normal),
                vec![key, value],
            ));
        }
        if computed {
            self.expect_punct(Punctuator::Colon)?;
            let value = self.parse_assignment_expression(false)?;
            let key = Node::with_children(Tag::ComputedKey, key.span, vec![key]);
            return Ok(Node::leaf(
                Tag::PropertyDefinition,
                self.span_from(start),
                Payload::MethodKind(MethodKind::Normal),
                vec![key, value],
            ));
        }

        // Shorthand `{ x }` or `{ x = default }` (the latter only legal
        // when this object literal is later reinterpreted as a pattern).
        let name = key.as_identifier().ok_or_else(|| self.unexpected("property"))?;
        if self.eat_punct(Punctuator::Assign)? {
            let default = self.parse_assignment_expression(false)?;
            return Ok(Node::with_children(
                Tag::DefaultBinding,
                self.span_from(start),
                vec![
                    Node::with_payload(Tag::ShorthandProperty, key.span, Payload::Sym(name)),
                    default,
                ],
            ));
        }
        Ok(Node::with_payload(
            Tag::ShorthandProperty,
            self.span_from(start),
            Payload::Sym(name),
        ))
    }

    /// Parses a template literal, alternating `TemplateElement` text
    /// chunks with substitution expressions. Brace-depth bookkeeping
    /// (`Cursor::note_brace`/`enter_template_substitution`) lets the lexer
    /// resume the literal portion after `}` instead of treating it as a
    /// stray punctuator.
    fn parse_template_literal(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        let mut parts = Vec::new();
        loop {
            let TokenKind::TemplatePart { text, tail, .. } = self.current().kind else {
                return Err(self.unexpected("template part"));
            };
            parts.push(Node::with_payload(Tag::TemplateElement, self.span(), Payload::Sym(text)));
            self.advance()?;
            if tail {
                break;
            }
            self.cursor.enter_template_substitution();
            let expr = self.parse_expression(false)?;
            self.expect_punct(Punctuator::RBrace)?;
            parts.push(expr);
            self.cursor.continue_template(self.interner)?;
        }
        Ok(Node::with_children(Tag::TemplateLiteral, self.span_from(start), parts))
    }

    // ---- destructuring conversions -----------------------------------

    /// Reinterprets an already-parsed expression (from `x = ...`) as an
    /// assignment target: identifiers and member expressions pass
    /// through unchanged, and array/object literals are converted into
    /// binding-pattern shaped nodes in place, since an `=`'s left side is
    /// ambiguous between "expression" and "pattern" until this point.
    fn expr_to_assignment_target(&self, expr: Node) -> ParseResult<Node> {
        match expr.tag {
            Tag::Identifier | Tag::Member | Tag::ComputedMember | Tag::IdBinding
            | Tag::ObjectBindingPattern | Tag::ArrayBindingPattern => Ok(expr),
            Tag::ArrayLiteral => {
                let span = expr.span;
                let mut elements = Vec::with_capacity(expr.children.len());
                for child in expr.children {
                    elements.push(match child.tag {
                        Tag::Elision => child,
                        Tag::SpreadElement => {
                            let inner = child.children.into_iter().next().unwrap();
                            Node::with_children(Tag::RestBinding, child.span, vec![self.expr_to_assignment_target(inner)?])
                        }
                        Tag::Assign => {
                            let mut it = child.children.into_iter();
                            let target = self.expr_to_assignment_target(it.next().unwrap())?;
                            let default = it.next().unwrap();
                            Node::with_children(Tag::DefaultBinding, child.span, vec![target, default])
                        }
                        _ => self.expr_to_assignment_target(child)?,
                    });
                }
                Ok(Node::with_children(Tag::ArrayBindingPattern, span, elements))
            }
            Tag::ObjectLiteral => {
                let span = expr.span;
                let mut props = Vec::with_capacity(expr.children.len());
                for child in expr.children {
                    match child.tag {
                        Tag::SpreadElement => {
                            let inner = child.children.into_iter().next().unwrap();
                            props.push(Node::with_children(Tag::RestBinding, child.span, vec![self.expr_to_assignment_target(inner)?]));
                        }
                        Tag::ShorthandProperty => {
                            let Payload::Sym(name) = child.payload else { unreachable!() };
                            let id = Node::with_payload(Tag::IdBinding, child.span, Payload::Sym(name));
                            let key = Node::with_payload(Tag::Identifier, child.span, Payload::Sym(name));
                            props.push(Node::with_children(Tag::BindingProperty, child.span, vec![key, id]));
                        }
                        Tag::DefaultBinding => props.push(child),
                        Tag::PropertyDefinition => {
                            let mut it = child.children.into_iter();
                            let key = it.next().unwrap();
                            let value = self.expr_to_assignment_target(it.next().unwrap())?;
                            props.push(Node::with_children(Tag::BindingProperty, child.span, vec![key, value]));
                        }
                        _ => return Err(self.unexpected("destructuring target")),
                    }
                }
                Ok(Node::with_children(Tag::ObjectBindingPattern, span, props))
            }
            _ => Err(ParseError::Unexpected {
                span: expr.span,
                expected: "assignment target".to_string(),
                found: format!("{}", expr.tag),
            }),
        }
    }

    // ---- modules ---------------------------------------------------

    fn parse_import_declaration(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("import")?;
        let mut specifiers = Vec::new();
        if let TokenKind::String(_) = self.current().kind {
            // Bare `import "module";`, no bindings.
        } else {
            if let TokenKind::Identifier(sym) = self.current().kind {
                if Keyword::from_str(self.interner.resolve(sym)).is_none() {
                    self.advance()?;
                    specifiers.push(Node::with_payload(
                        Tag::ImportDefaultSpecifier,
                        self.span(),
                        Payload::Sym(sym),
                    ));
                    self.eat_punct(Punctuator::Comma)?;
                }
            }
            if self.eat_punct(Punctuator::Star)? {
                self.expect_keyword("as")?;
                let sym = self.current_identifier_sym()?;
                specifiers.push(Node::with_payload(Tag::ImportNamespaceSpecifier, self.span(), Payload::Sym(sym)));
            } else if self.eat_punct(Punctuator::LBrace)? {
                while !self.at_punct(Punctuator::RBrace) {
                    let imported = self.current_identifier_sym()?;
                    let local = if self.eat_keyword("as")? {
                        self.current_identifier_sym()?
                    } else {
                        imported
                    };
                    let _ = imported;
                    specifiers.push(Node::with_payload(Tag::ImportSpecifier, self.span(), Payload::Sym(local)));
                    if !self.eat_punct(Punctuator::Comma)? {
                        break;
                    }
                }
                self.expect_punct(Punctuator::RBrace)?;
            }
            self.expect_keyword("from")?;
        }
        let TokenKind::String(module) = self.current().kind else {
            return Err(self.unexpected("module specifier string"));
        };
        self.advance()?;
        self.consume_semicolon()?;
        let mut node = Node::with_children(Tag::ImportDecl, self.span_from(start), specifiers);
        node.payload = Payload::Sym(module);
        Ok(node)
    }

    fn parse_export_declaration(&mut self) -> ParseResult<Node> {
        let start = self.span().start;
        self.expect_keyword("export")?;
        if self.eat_keyword("default")? {
            let expr = if self.at_keyword("function") || (self.at_keyword("async") && self.peek_is_function_no_newline()?) {
                let is_async = self.eat_keyword("async")?;
                self.parse_function(true, FunctionFlags { is_async, ..Default::default() })?
            } else if self.at_keyword("class") {
                self.parse_class(true)?
            } else {
                let expr = self.parse_assignment_expression(false)?;
                self.consume_semicolon()?;
                expr
            };
            return Ok(Node::with_children(Tag::ExportDefault, self.span_from(start), vec![expr]));
        }
        if self.eat_punct(Punctuator::Star)? {
            let mut exported = None;
            if self.eat_keyword("as")? {
                exported = Some(self.current_identifier_sym()?);
            }
            self.expect_keyword("from")?;
            let TokenKind::String(module) = self.current().kind else {
                return Err(self.unexpected("module specifier string"));
            };
            self.advance()?;
            self.consume_semicolon()?;
            let mut node = Node::new(Tag::ExportAll, self.span_from(start));
            node.payload = exported.map(Payload::Sym).unwrap_or(Payload::Sym(module));
            return Ok(node);
        }
        if self.eat_punct(Punctuator::LBrace)? {
            let mut specifiers = Vec::new();
            while !self.at_punct(Punctuator::RBrace) {
                let local = self.current_identifier_sym()?;
                let exported = if self.eat_keyword("as")? {
                    self.current_identifier_sym()?
                } else {
                    local
                };
                let _ = exported;
                specifiers.push(Node::with_payload(Tag::ExportSpecifier, self.span(), Payload::Sym(local)));
                if !self.eat_punct(Punctuator::Comma)? {
                    break;
                }
            }
            self.expect_punct(Punctuator::RBrace)?;
            if self.eat_keyword("from")? {
                let TokenKind::String(_module) = self.current().kind else {
                    return Err(self.unexpected("module specifier string"));
                };
                self.advance()?;
            }
            self.consume_semicolon()?;
            return Ok(Node::with_children(Tag::ExportNamed, self.span_from(start), specifiers));
        }
        // `export` directly in front of a declaration.
        let decl = self.parse_statement_list_item()?;
        Ok(Node::with_children(Tag::ExportNamed, self.span_from(start), vec![decl]))
    }
}

enum BinOrLogical {
    Bin(BinaryOp),
    Logical(LogicalOp),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Node {
        let mut interner = Interner::new();
        parse(src, &mut interner).unwrap_or_else(|e| panic!("parse failed for {src:?}: {e}"))
    }

    #[test]
    fn parses_variable_and_expression_statements() {
        let program = parse_ok("let x = 1 + 2 * 3;\nx;");
        assert_eq!(program.tag, Tag::Program);
        assert_eq!(program.children.len(), 2);
        assert_eq!(program.children[0].tag, Tag::LetDecl);
    }

    #[test]
    fn parses_function_declaration_with_params_and_return() {
        let program = parse_ok("function add(a, b) { return a + b; }");
        let func = &program.children[0];
        assert_eq!(func.tag, Tag::FunctionDecl);
        let view = func.as_function().expect("function view");
        assert!(view.name.is_some());
        assert_eq!(view.params.children.len(), 2);
        assert_eq!(view.body.len(), 1);
        assert_eq!(view.body[0].tag, Tag::Return);
    }

    #[test]
    fn parses_arrow_function_with_concise_body() {
        let program = parse_ok("const f = (x) => x * 2;");
        let decl = &program.children[0];
        let init = &decl.children[0].children[1];
        assert_eq!(init.tag, Tag::ArrowFunction);
        let view = init.as_function().expect("arrow view");
        assert_eq!(view.body.len(), 1);
        assert_eq!(view.body[0].tag, Tag::Return);
    }

    #[test]
    fn parses_async_function_with_await() {
        let program = parse_ok("async function load() { await fetch(); }");
        let func = &program.children[0];
        let Payload::FunctionFlags(flags) = &func.payload else {
            panic!("expected flags")
        };
        assert!(flags.is_async);
        assert!(jsrt_ast::operations::contains_own_await(func));
    }

    #[test]
    fn parses_class_with_method_and_field() {
        let program = parse_ok("class C { #x = 1; static greet() { return 1; } }");
        let class = &program.children[0];
        assert_eq!(class.tag, Tag::ClassDecl);
        let body = &class.children[2];
        assert_eq!(body.tag, Tag::ClassBody);
        assert_eq!(body.children[0].tag, Tag::ClassField);
        assert_eq!(body.children[1].tag, Tag::ClassMethod);
    }

    #[test]
    fn parses_destructuring_assignment() {
        let program = parse_ok("let [a, ...rest] = arr; ({ b, c: d } = obj);");
        let first = &program.children[0].children[0].children[0];
        assert_eq!(first.tag, Tag::ArrayBindingPattern);
        let assign_stmt = &program.children[1].children[0];
        let target = &assign_stmt.children[0];
        assert_eq!(target.tag, Tag::ObjectBindingPattern);
    }

    #[test]
    fn parses_for_of_and_template_literal() {
        let program = parse_ok("for (const x of xs) { `hi ${x}!`; }");
        assert_eq!(program.children[0].tag, Tag::ForOf);
    }

    #[test]
    fn object_literal_shorthand_and_method() {
        let program = parse_ok("const o = { a, b() { return 1; } };");
        let obj = &program.children[0].children[0].children[0];
        assert_eq!(obj.tag, Tag::ObjectLiteral);
        assert_eq!(obj.children[0].tag, Tag::ShorthandProperty);
        assert_eq!(obj.children[1].tag, Tag::PropertyDefinition);
    }

    #[test]
    fn precedence_climbing_respects_operator_binding() {
        let program = parse_ok("1 + 2 * 3;");
        let expr = &program.children[0].children[0];
        let bin = expr.as_binary().expect("top-level +");
        assert_eq!(bin.op, BinaryOp::Add);
        assert!(bin.right.as_binary().is_some());
    }
}
