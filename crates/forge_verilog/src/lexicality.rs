//! Lazy flattening of an element tree into a token stream.
//!
//! A [`Lexicality`] is one level of the tree: tokens interleaved with child
//! elements. [`Lexicality::tokens`] walks it depth-first with an explicit
//! stack, asking each child for its own lexicality only when the cursor
//! reaches it. The resulting [`TokenStream`] is single-pass: it consumes the
//! lexicality, and a second traversal has to start again from
//! [`VerilogElement::lexicalify`] on the root.

use crate::error::{VerilogError, VerilogResult};
use crate::token::{Control, Symbol, Token};
use std::fmt;

/// Anything that can describe itself as a sequence of tokens and sub-elements.
pub trait VerilogElement {
    /// Returns this element's immediate structure.
    fn lexicalify(&self) -> Lexicality<'_>;
}

/// One entry of a [`Lexicality`].
#[derive(Clone)]
pub enum Lexeme<'a> {
    /// A leaf.
    Token(Token),
    /// A borrowed child, linearized on demand.
    Element(&'a dyn VerilogElement),
    /// A child structure built inline by the parent.
    Nested(Lexicality<'a>),
}

/// An ordered, possibly nested collection of lexemes.
#[derive(Clone, Default)]
pub struct Lexicality<'a> {
    items: Vec<Lexeme<'a>>,
}

impl<'a> Lexicality<'a> {
    /// Creates an empty lexicality.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends a token, keyword, symbol or control marker.
    pub fn push(&mut self, token: impl Into<Token>) -> &mut Self {
        self.items.push(Lexeme::Token(token.into()));
        self
    }

    /// Appends an identifier token.
    pub fn ident(&mut self, name: &str) -> &mut Self {
        self.push(Token::ident(name))
    }

    /// Appends a newline marker.
    pub fn newline(&mut self) -> &mut Self {
        self.push(Control::Newline)
    }

    /// Appends a child element.
    pub fn element(&mut self, element: &'a dyn VerilogElement) -> &mut Self {
        self.items.push(Lexeme::Element(element));
        self
    }

    /// Appends an inline child structure.
    pub fn nested(&mut self, nested: Lexicality<'a>) -> &mut Self {
        self.items.push(Lexeme::Nested(nested));
        self
    }

    /// Appends each element, placing `separator` between consecutive ones.
    pub fn separated<E: VerilogElement + 'a>(
        &mut self,
        elements: impl IntoIterator<Item = &'a E>,
        separator: Symbol,
    ) -> &mut Self {
        for (i, element) in elements.into_iter().enumerate() {
            if i > 0 {
                self.push(separator);
            }
            self.element(element);
        }
        self
    }

    /// Number of immediate lexemes.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no immediate lexemes.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of leaf tokens under this lexicality.
    pub fn leaf_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                Lexeme::Token(_) => 1,
                Lexeme::Element(e) => e.lexicalify().leaf_count(),
                Lexeme::Nested(l) => l.leaf_count(),
            })
            .sum()
    }

    /// Starts a depth-first, leaves-only traversal.
    ///
    /// Fails with [`VerilogError::EmptyLexicality`] when the root has no
    /// lexemes. Empty children further down are skipped.
    pub fn tokens(self) -> VerilogResult<TokenStream<'a>> {
        if self.items.is_empty() {
            return Err(VerilogError::EmptyLexicality);
        }
        Ok(TokenStream {
            stack: vec![self.items.into_iter()],
        })
    }
}

impl<'a> Extend<Token> for Lexicality<'a> {
    fn extend<T: IntoIterator<Item = Token>>(&mut self, iter: T) {
        self.items.extend(iter.into_iter().map(Lexeme::Token));
    }
}

/// Renders the token stream with the standard spacing rule.
impl fmt::Display for Lexicality<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.clone().tokens() {
            Ok(tokens) => f.write_str(&render_tokens(tokens)),
            Err(_) => Ok(()),
        }
    }
}

impl fmt::Debug for Lexicality<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lexicality({:?})", self.to_string())
    }
}

/// The flattened, single-pass token sequence of a [`Lexicality`].
pub struct TokenStream<'a> {
    stack: Vec<std::vec::IntoIter<Lexeme<'a>>>,
}

impl Iterator for TokenStream<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let cursor = self.stack.last_mut()?;
            match cursor.next() {
                None => {
                    self.stack.pop();
                }
                Some(Lexeme::Token(token)) => return Some(token),
                Some(Lexeme::Element(element)) => {
                    self.stack.push(element.lexicalify().items.into_iter());
                }
                Some(Lexeme::Nested(nested)) => self.stack.push(nested.items.into_iter()),
            }
        }
    }
}

/// Joins tokens into text.
///
/// A single space separates tokens except after openers and prefix
/// operators, before closers and separators, between a name and its
/// select or port list, and between a replication count and its brace.
/// Control tokens supply their own whitespace.
pub fn render_tokens(tokens: impl IntoIterator<Item = Token>) -> String {
    let mut out = String::new();
    let mut prev: Option<Token> = None;
    for token in tokens {
        if let Some(p) = &prev {
            if needs_space(p, &token) {
                out.push(' ');
            }
        }
        out.push_str(token.as_str());
        prev = Some(token);
    }
    out
}

fn needs_space(prev: &Token, next: &Token) -> bool {
    match (prev, next) {
        (Token::Control(_), _) | (_, Token::Control(_)) => false,
        (Token::Symbol(p), _) if p.is_opener() || p.is_prefix() => false,
        (_, Token::Symbol(n)) if n.is_closer() => false,
        (Token::Identifier(_), Token::Symbol(Symbol::LBracket | Symbol::LParen)) => false,
        (Token::Symbol(Symbol::RBracket), Token::Symbol(Symbol::LBracket)) => false,
        (Token::Number(_), Token::Symbol(Symbol::LBrace)) => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Keyword;

    struct Leaf(&'static str);

    impl VerilogElement for Leaf {
        fn lexicalify(&self) -> Lexicality<'_> {
            let mut lex = Lexicality::new();
            lex.ident(self.0);
            lex
        }
    }

    struct Empty;

    impl VerilogElement for Empty {
        fn lexicalify(&self) -> Lexicality<'_> {
            Lexicality::new()
        }
    }

    struct Group(Vec<Box<dyn VerilogElement>>);

    impl VerilogElement for Group {
        fn lexicalify(&self) -> Lexicality<'_> {
            let mut lex = Lexicality::new();
            lex.push(Symbol::LBrace);
            for (i, child) in self.0.iter().enumerate() {
                if i > 0 {
                    lex.push(Symbol::Comma);
                }
                lex.element(child.as_ref());
            }
            lex.push(Symbol::RBrace);
            lex
        }
    }

    fn tree() -> Group {
        Group(vec![
            Box::new(Leaf("a")),
            Box::new(Group(vec![Box::new(Leaf("b")), Box::new(Empty), Box::new(Leaf("c"))])),
            Box::new(Empty),
            Box::new(Leaf("d")),
        ])
    }

    #[test]
    fn yields_leaves_in_document_order() {
        let root = tree();
        let text: Vec<String> = root
            .lexicalify()
            .tokens()
            .unwrap()
            .map(|t| t.as_str().to_string())
            .collect();
        assert_eq!(
            text,
            ["{", "a", ",", "{", "b", ",", ",", "c", "}", ",", ",", "d", "}"]
        );
    }

    #[test]
    fn leaf_count_matches_stream_length() {
        let root = tree();
        let lex = root.lexicalify();
        let expected = lex.leaf_count();
        assert_eq!(expected, 13);
        assert_eq!(lex.tokens().unwrap().count(), expected);
    }

    #[test]
    fn fresh_traversal_from_root_repeats_sequence() {
        let root = tree();
        let first: Vec<Token> = root.lexicalify().tokens().unwrap().collect();
        let second: Vec<Token> = root.lexicalify().tokens().unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_root_is_rejected() {
        assert!(matches!(
            Empty.lexicalify().tokens(),
            Err(VerilogError::EmptyLexicality)
        ));
        assert_eq!(Empty.lexicalify().to_string(), "");
    }

    #[test]
    fn all_empty_children_yield_nothing() {
        let root = Group(vec![]);
        let mut lex = Lexicality::new();
        lex.element(&Empty).element(&Empty);
        assert_eq!(lex.tokens().unwrap().count(), 0);
        assert_eq!(root.lexicalify().to_string(), "{}");
    }

    #[test]
    fn display_strips_to_token_concatenation() {
        let root = tree();
        let shown = root.lexicalify().to_string();
        let joined: String = root.lexicalify().tokens().unwrap().map(|t| t.to_string()).collect();
        assert_eq!(shown.replace(' ', ""), joined);
        assert_eq!(shown, "{a, {b,, c},, d}");
    }

    #[test]
    fn spacing_rules() {
        let mut lex = Lexicality::new();
        lex.push(Keyword::Assign)
            .ident("y")
            .push(Symbol::Assign)
            .push(Symbol::Complement)
            .ident("a")
            .push(Symbol::LBracket)
            .push(Token::number(7))
            .push(Symbol::RangeColon)
            .push(Token::number(0))
            .push(Symbol::RBracket)
            .push(Symbol::Plus)
            .push(Symbol::LBrace)
            .push(Token::number(2))
            .push(Symbol::LBrace)
            .push(Token::Number("1'b0".into()))
            .push(Symbol::RBrace)
            .push(Symbol::RBrace)
            .push(Symbol::Semicolon)
            .newline();
        assert_eq!(lex.to_string(), "assign y = ~a[7:0] + {2{1'b0}};\n");
    }

    #[test]
    fn nested_lexicality_is_flattened() {
        let mut inner = Lexicality::new();
        inner.ident("x").ident("y");
        let mut outer = Lexicality::new();
        outer.ident("w").nested(inner).nested(Lexicality::new()).ident("z");
        assert_eq!(outer.leaf_count(), 4);
        assert_eq!(outer.to_string(), "w x y z");
    }
}
