//! Diet signature reader.
//!
//! Parses the signature-only source produced by the diet printer back into
//! a unit. The grammar is the printer's output language, nothing more:
//! directives, class and interface headers, and member signatures ending
//! in `;`. Executable bodies never occur in diet text.
//!
//! The one ambiguity is signature-initial: a member may start with either
//! its declared type or directly with its name (when the declaration had
//! no return type). A single identifier of lookahead settles it, since a
//! name is always followed by `(` and a type never is.

use logos::Logos;
use vela_ast::{Accessor, Modifiers, NodeId, SharedInterner, Span, Unit, UnitBuilder};

use crate::DietError;

/// Tokens of the diet signature grammar.
#[derive(Logos, Copy, Clone, Eq, PartialEq, Debug)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[token("library")]
    Library,
    #[token("import")]
    Import,
    #[token("source")]
    Source,
    #[token("native")]
    Native,
    #[token("as")]
    As,
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("default")]
    Default,
    #[token("static")]
    Static,
    #[token("abstract")]
    Abstract,
    #[token("factory")]
    Factory,
    #[token("final")]
    Final,
    #[token("get")]
    Get,
    #[token("set")]
    Set,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[regex(r#""[^"]*""#)]
    Str,
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,
}

/// Parse one unit of diet text.
pub(crate) fn read_unit(
    file_name: &str,
    uri: &str,
    source: &str,
    interner: &SharedInterner,
) -> Result<Unit, DietError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);
    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(DietError::InvalidToken {
                    file: file_name.to_owned(),
                    offset: span.start,
                })
            }
        }
    }
    let mut reader = Reader {
        file: file_name,
        source,
        tokens,
        pos: 0,
        builder: UnitBuilder::new(file_name, uri, source, interner),
    };
    reader.read()?;
    Ok(reader.builder.finish_diet())
}

struct Reader<'a> {
    file: &'a str,
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    pos: usize,
    builder: UnitBuilder,
}

impl<'a> Reader<'a> {
    fn read(&mut self) -> Result<(), DietError> {
        while matches!(
            self.peek(),
            Some(Token::Library | Token::Import | Token::Source | Token::Native)
        ) {
            self.directive()?;
        }
        while self.peek().is_some() {
            self.declaration()?;
        }
        Ok(())
    }

    // Token access

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|&(token, _)| token)
    }

    fn peek2(&self) -> Option<Token> {
        self.tokens.get(self.pos + 1).map(|&(token, _)| token)
    }

    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map_or(Span::DUMMY, |&(_, span)| span)
    }

    fn bump(&mut self) -> Option<(Token, Span)> {
        let next = self.tokens.get(self.pos).copied();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn at(&self, token: Token) -> bool {
        self.peek() == Some(token)
    }

    fn eat(&mut self, token: Token) -> Option<Span> {
        if self.at(token) {
            self.bump().map(|(_, span)| span)
        } else {
            None
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<Span, DietError> {
        match self.bump() {
            Some((found, span)) if found == token => Ok(span),
            Some((found, span)) => Err(DietError::UnexpectedToken {
                file: self.file.to_owned(),
                found,
                offset: span.start,
                expected,
            }),
            None => Err(DietError::UnexpectedEof {
                file: self.file.to_owned(),
                expected,
            }),
        }
    }

    fn text(&self, span: Span) -> &'a str {
        &self.source[span.to_range()]
    }

    fn ident(&mut self) -> Result<(&'a str, Span), DietError> {
        let span = self.expect(Token::Ident, "identifier")?;
        Ok((self.text(span), span))
    }

    fn string(&mut self) -> Result<(&'a str, Span), DietError> {
        let span = self.expect(Token::Str, "string literal")?;
        let text = self.text(span);
        Ok((&text[1..text.len() - 1], span))
    }

    // Directives

    fn directive(&mut self) -> Result<(), DietError> {
        match self.peek() {
            Some(Token::Library) => {
                let start = self.expect(Token::Library, "'library'")?;
                let (name, _) = self.string()?;
                let end = self.expect(Token::Semi, "';'")?;
                self.builder.library_directive(name, start.merge(end));
            }
            Some(Token::Import) => {
                let start = self.expect(Token::Import, "'import'")?;
                let (uri, _) = self.string()?;
                let prefix = if self.eat(Token::As).is_some() {
                    Some(self.ident()?.0)
                } else {
                    None
                };
                let end = self.expect(Token::Semi, "';'")?;
                self.builder.import_directive(uri, prefix, start.merge(end));
            }
            Some(Token::Source) => {
                let start = self.expect(Token::Source, "'source'")?;
                let (uri, _) = self.string()?;
                let end = self.expect(Token::Semi, "';'")?;
                self.builder.source_directive(uri, start.merge(end));
            }
            _ => {
                let start = self.expect(Token::Native, "'native'")?;
                let (uri, _) = self.string()?;
                let end = self.expect(Token::Semi, "';'")?;
                self.builder.native_directive(uri, start.merge(end));
            }
        }
        Ok(())
    }

    // Declarations

    fn declaration(&mut self) -> Result<(), DietError> {
        let decl = match self.peek() {
            Some(Token::Abstract) if self.peek2() == Some(Token::Class) => {
                let start = self.expect(Token::Abstract, "'abstract'")?;
                self.class_decl(Modifiers::ABSTRACT, start)?
            }
            Some(Token::Class) => {
                let start = self.peek_span();
                self.class_decl(Modifiers::empty(), start)?
            }
            Some(Token::Interface) => self.interface_decl()?,
            _ => self.member_decl()?,
        };
        self.builder.add_declaration(decl);
        Ok(())
    }

    fn class_decl(&mut self, modifiers: Modifiers, start: Span) -> Result<NodeId, DietError> {
        self.expect(Token::Class, "'class'")?;
        let (name, name_span) = self.ident()?;
        let superclass = if self.eat(Token::Extends).is_some() {
            Some(self.type_ref()?)
        } else {
            None
        };
        let mut interfaces = Vec::new();
        if self.eat(Token::Implements).is_some() {
            loop {
                interfaces.push(self.type_ref()?);
                if self.eat(Token::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(Token::LBrace, "'{'")?;
        let mut members = Vec::new();
        while !self.at(Token::RBrace) {
            members.push(self.member_decl()?);
        }
        let end = self.expect(Token::RBrace, "'}'")?;
        Ok(self.builder.class(
            name,
            name_span,
            modifiers,
            superclass,
            interfaces,
            members,
            start.merge(end),
        ))
    }

    fn interface_decl(&mut self) -> Result<NodeId, DietError> {
        let start = self.expect(Token::Interface, "'interface'")?;
        let (name, name_span) = self.ident()?;
        let mut interfaces = Vec::new();
        if self.eat(Token::Extends).is_some() {
            loop {
                interfaces.push(self.type_ref()?);
                if self.eat(Token::Comma).is_none() {
                    break;
                }
            }
        }
        let default_class = if self.eat(Token::Default).is_some() {
            Some(self.type_ref()?)
        } else {
            None
        };
        self.expect(Token::LBrace, "'{'")?;
        let mut members = Vec::new();
        while !self.at(Token::RBrace) {
            members.push(self.member_decl()?);
        }
        let end = self.expect(Token::RBrace, "'}'")?;
        Ok(self.builder.interface(
            name,
            name_span,
            interfaces,
            default_class,
            members,
            start.merge(end),
        ))
    }

    // Members

    fn member_decl(&mut self) -> Result<NodeId, DietError> {
        let start = self.peek_span();
        let mut modifiers = Modifiers::empty();
        loop {
            match self.peek() {
                Some(Token::Static) => {
                    let _ = self.bump();
                    modifiers |= Modifiers::STATIC;
                }
                Some(Token::Abstract) => {
                    let _ = self.bump();
                    modifiers |= Modifiers::ABSTRACT;
                }
                Some(Token::Factory) => {
                    let _ = self.bump();
                    modifiers |= Modifiers::FACTORY;
                }
                Some(Token::Final) => {
                    let _ = self.bump();
                    modifiers |= Modifiers::FINAL;
                }
                _ => break,
            }
        }

        // Accessor with no return type: `get x(...)` / `set y(...)`.
        let accessor = match self.peek() {
            Some(Token::Get) => {
                let _ = self.bump();
                Accessor::Getter
            }
            Some(Token::Set) => {
                let _ = self.bump();
                Accessor::Setter
            }
            _ => Accessor::None,
        };
        if accessor != Accessor::None {
            let name = self.name_node()?;
            return self.finish_method(start, modifiers, accessor, None, name);
        }

        let (first, first_span) = self.ident()?;
        if self.at(Token::LParen) {
            // No return type; `first` was the method name.
            let name = self.builder.identifier(first, first_span);
            return self.finish_method(start, modifiers, Accessor::None, None, name);
        }
        if self.at(Token::Dot) {
            let _ = self.bump();
            let (second, second_span) = self.ident()?;
            if self.at(Token::LParen) {
                // No return type; `first.second` was a constructor name.
                let qualifier = self.builder.identifier(first, first_span);
                let name = self.builder.qualified(
                    qualifier,
                    second,
                    second_span,
                    first_span.merge(second_span),
                );
                return self.finish_method(start, modifiers, Accessor::None, None, name);
            }
            let ty = self.finish_type(Some(first), second, first_span, second_span)?;
            return self.member_tail(start, modifiers, Some(ty));
        }
        let ty = self.finish_type(None, first, first_span, first_span)?;
        self.member_tail(start, modifiers, Some(ty))
    }

    /// The rest of a member after its declared type: optional accessor,
    /// name, and either a parameter list (method) or `;` (field).
    fn member_tail(
        &mut self,
        start: Span,
        modifiers: Modifiers,
        ty: Option<NodeId>,
    ) -> Result<NodeId, DietError> {
        let accessor = match self.peek() {
            Some(Token::Get) => {
                let _ = self.bump();
                Accessor::Getter
            }
            Some(Token::Set) => {
                let _ = self.bump();
                Accessor::Setter
            }
            _ => Accessor::None,
        };
        if accessor != Accessor::None {
            let name = self.name_node()?;
            return self.finish_method(start, modifiers, accessor, ty, name);
        }
        let (name, name_span) = self.ident()?;
        if self.at(Token::Dot) {
            let _ = self.bump();
            let (second, second_span) = self.ident()?;
            let qualifier = self.builder.identifier(name, name_span);
            let qname = self.builder.qualified(
                qualifier,
                second,
                second_span,
                name_span.merge(second_span),
            );
            return self.finish_method(start, modifiers, Accessor::None, ty, qname);
        }
        if self.at(Token::LParen) {
            let name_node = self.builder.identifier(name, name_span);
            return self.finish_method(start, modifiers, Accessor::None, ty, name_node);
        }
        let end = self.expect(Token::Semi, "';'")?;
        Ok(self
            .builder
            .field(name, name_span, modifiers, ty, None, start.merge(end)))
    }

    /// A method name: `foo` or `Type.ctor`.
    fn name_node(&mut self) -> Result<NodeId, DietError> {
        let (first, first_span) = self.ident()?;
        if self.eat(Token::Dot).is_some() {
            let (second, second_span) = self.ident()?;
            let qualifier = self.builder.identifier(first, first_span);
            return Ok(self.builder.qualified(
                qualifier,
                second,
                second_span,
                first_span.merge(second_span),
            ));
        }
        Ok(self.builder.identifier(first, first_span))
    }

    fn finish_method(
        &mut self,
        start: Span,
        modifiers: Modifiers,
        accessor: Accessor,
        return_type: Option<NodeId>,
        name: NodeId,
    ) -> Result<NodeId, DietError> {
        let params = self.params()?;
        let end = self.expect(Token::Semi, "';'")?;
        Ok(self.builder.method(
            name,
            modifiers,
            accessor,
            return_type,
            params,
            None,
            start.merge(end),
        ))
    }

    // Types and parameters

    fn type_ref(&mut self) -> Result<NodeId, DietError> {
        let (first, first_span) = self.ident()?;
        if self.eat(Token::Dot).is_some() {
            let (name, name_span) = self.ident()?;
            self.finish_type(Some(first), name, first_span, name_span)
        } else {
            self.finish_type(None, first, first_span, first_span)
        }
    }

    fn finish_type(
        &mut self,
        prefix: Option<&'a str>,
        name: &'a str,
        start: Span,
        name_span: Span,
    ) -> Result<NodeId, DietError> {
        let mut args = Vec::new();
        let mut end = name_span;
        if self.eat(Token::Lt).is_some() {
            loop {
                args.push(self.type_ref()?);
                if self.eat(Token::Comma).is_none() {
                    break;
                }
            }
            end = self.expect(Token::Gt, "'>'")?;
        }
        Ok(self.builder.type_ref(prefix, name, args, start.merge(end)))
    }

    fn params(&mut self) -> Result<Vec<NodeId>, DietError> {
        self.expect(Token::LParen, "'('")?;
        let mut params = Vec::new();
        let mut optional = false;
        while !self.at(Token::RParen) {
            if self.eat(Token::LBracket).is_some() {
                optional = true;
            }
            params.push(self.param(optional)?);
            let _ = self.eat(Token::RBracket);
            if self.eat(Token::Comma).is_none() {
                break;
            }
        }
        self.expect(Token::RParen, "')'")?;
        Ok(params)
    }

    fn param(&mut self, optional: bool) -> Result<NodeId, DietError> {
        let (first, first_span) = self.ident()?;
        // Bare name when the parameter carries no declared type.
        if matches!(
            self.peek(),
            Some(Token::Comma | Token::RBracket | Token::RParen)
        ) {
            return Ok(self
                .builder
                .param(first, first_span, None, optional, first_span));
        }
        let ty = if self.eat(Token::Dot).is_some() {
            let (second, second_span) = self.ident()?;
            self.finish_type(Some(first), second, first_span, second_span)?
        } else {
            self.finish_type(None, first, first_span, first_span)?
        };
        let (name, name_span) = self.ident()?;
        Ok(self
            .builder
            .param(name, name_span, Some(ty), optional, first_span.merge(name_span)))
    }
}
