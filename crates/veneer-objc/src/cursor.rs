use crate::lexer::Token;

/// Forward-only cursor over a lexed declaration.
pub(crate) struct TokenCursor<'t, 's> {
    tokens: &'t [Token<'s>],
    pos: usize,
}

impl<'t, 's> TokenCursor<'t, 's> {
    pub fn new(tokens: &'t [Token<'s>]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn peek(&self) -> Option<Token<'s>> {
        self.tokens.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<Token<'s>> {
        self.tokens.get(self.pos + offset).copied()
    }

    pub fn bump(&mut self) -> Option<Token<'s>> {
        let tok = self.peek()?;
        self.pos += 1;
        Some(tok)
    }

    pub fn eat(&mut self, expected: Token<'s>) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn eat_identifier(&mut self) -> Option<&'s str> {
        let name = self.peek()?.identifier()?;
        self.pos += 1;
        Some(name)
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn rest(&self) -> &'t [Token<'s>] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }

    /// Consume a balanced group opened by the current token and return its
    /// contents, without the delimiters. The flag is `false` when input ran
    /// out before the group closed.
    pub fn group(&mut self, open: Token<'s>, close: Token<'s>) -> Option<(&'t [Token<'s>], bool)> {
        if !self.eat(open) {
            return None;
        }
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(tok) = self.bump() {
            if tok == open {
                depth += 1;
            } else if tok == close {
                depth -= 1;
                if depth == 0 {
                    return Some((&self.tokens[start..self.pos - 1], true));
                }
            }
        }
        Some((&self.tokens[start..], false))
    }

    pub fn paren_group(&mut self) -> Option<(&'t [Token<'s>], bool)> {
        self.group(Token::LeftParen, Token::RightParen)
    }
}

/// Split tokens on top-level commas.
pub(crate) fn split_commas<'t, 's>(tokens: &'t [Token<'s>]) -> Vec<&'t [Token<'s>]> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, tok) in tokens.iter().enumerate() {
        match tok {
            Token::LeftParen | Token::Less => depth += 1,
            Token::RightParen | Token::Greater => depth -= 1,
            Token::Comma if depth == 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < tokens.len() {
        parts.push(&tokens[start..]);
    }
    parts.retain(|p| !p.is_empty());
    parts
}
