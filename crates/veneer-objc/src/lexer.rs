//! Declaration tokenizer built on [`logos`].
//!
//! Only the punctuation that occurs in interface declarations gets its own
//! token. Comments are skipped; anything unrecognised becomes
//! [`Token::Error`] and is left for the parser to reject.

use logos::Logos;

/// Lex `source` into tokens, skipping whitespace and comments.
#[must_use]
pub fn lex(source: &str) -> Vec<Token<'_>> {
    Token::lexer(source)
        .map(|result| result.unwrap_or(Token::Error))
        .collect()
}

fn line_comment<'s>(_lex: &mut logos::Lexer<'s, Token<'s>>) -> logos::Skip {
    logos::Skip
}

fn block_comment<'s>(lex: &mut logos::Lexer<'s, Token<'s>>) -> logos::FilterResult<(), ()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            logos::FilterResult::Skip
        }
        None => {
            // Unterminated: swallow the rest so the lexer stops.
            lex.bump(lex.remainder().len());
            logos::FilterResult::Error(())
        }
    }
}

/// A single token of an Objective-C declaration.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token<'src> {
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("*")]
    Star,
    #[token("^")]
    Caret,
    #[token("&")]
    Amp,
    #[token("=")]
    Equals,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,

    /// `@interface`, `@property`, `@end`, ...
    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*")]
    Directive(&'src str),

    /// Version numbers inside availability macros, array sizes.
    #[regex(r"[0-9][0-9a-zA-Z_]*(\.[0-9][0-9a-zA-Z_]*)*")]
    Number(&'src str),

    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLit(&'src str),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier(&'src str),

    #[regex(r"/\*", block_comment)]
    _BlockComment,

    #[regex(r"//[^\n]*", line_comment, allow_greedy = true)]
    _LineComment,

    /// Invalid / unrecognised byte sequence.
    Error,
}

impl<'src> Token<'src> {
    pub fn identifier(&self) -> Option<&'src str> {
        match self {
            Token::Identifier(name) => Some(*name),
            _ => None,
        }
    }

    /// Identifiers, numbers, strings and directives.
    fn is_word(&self) -> bool {
        matches!(
            self,
            Token::Identifier(_) | Token::Number(_) | Token::StringLit(_) | Token::Directive(_)
        )
    }
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Token::Plus => "+",
            Token::Minus => "-",
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::Less => "<",
            Token::Greater => ">",
            Token::LeftBrace => "{",
            Token::RightBrace => "}",
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::Colon => ":",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::Star => "*",
            Token::Caret => "^",
            Token::Amp => "&",
            Token::Equals => "=",
            Token::Dot => ".",
            Token::Ellipsis => "...",
            Token::Directive(s)
            | Token::Number(s)
            | Token::StringLit(s)
            | Token::Identifier(s) => *s,
            Token::_BlockComment | Token::_LineComment => "",
            Token::Error => "?",
        };
        f.write_str(text)
    }
}

/// Render tokens back to declaration text with conventional spacing:
/// `NSArray<NSString *>`, `void (^)(BOOL finished)`, `API_AVAILABLE(macos(10.12))`.
pub fn render(tokens: &[Token<'_>]) -> String {
    let mut out = String::new();
    let mut prev: Option<Token<'_>> = None;

    for (i, tok) in tokens.iter().enumerate() {
        if let Some(p) = prev {
            let space = match tok {
                _ if tok.is_word() => p.is_word() || matches!(p, Token::Star | Token::Comma),
                Token::Star => p.is_word() || p == Token::Greater,
                Token::LeftParen => {
                    p.is_word() && matches!(tokens.get(i + 1), Some(Token::Caret | Token::Star))
                }
                _ => false,
            };
            if space {
                out.push(' ');
            }
        }
        out.push_str(&tok.to_string());
        prev = Some(*tok);
    }

    out
}
