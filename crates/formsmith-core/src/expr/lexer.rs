//! Formula tokenizer

use super::EvalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    /// `||`, string concatenation
    Concat,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Question,
    Colon,
    LParen,
    RParen,
    Comma,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    /// Tokenize the whole source; the last token is always `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, EvalError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let start = self.pos;
            let Some(&b) = self.bytes.get(self.pos) else {
                tokens.push(Token::new(TokenKind::Eof, Span::new(start, start)));
                return Ok(tokens);
            };

            let kind = match b {
                b'(' => self.single(TokenKind::LParen),
                b')' => self.single(TokenKind::RParen),
                b',' => self.single(TokenKind::Comma),
                b'+' => self.single(TokenKind::Plus),
                b'-' => self.single(TokenKind::Minus),
                b'*' => self.single(TokenKind::Star),
                b'/' => self.single(TokenKind::Slash),
                b'%' => self.single(TokenKind::Percent),
                b'^' => self.single(TokenKind::Caret),
                b'?' => self.single(TokenKind::Question),
                b':' => self.single(TokenKind::Colon),
                b'|' if self.peek_at(1) == Some(b'|') => self.double(TokenKind::Concat),
                b'=' if self.peek_at(1) == Some(b'=') => self.double(TokenKind::EqEq),
                b'!' if self.peek_at(1) == Some(b'=') => self.double(TokenKind::NotEq),
                b'<' if self.peek_at(1) == Some(b'=') => self.double(TokenKind::Le),
                b'<' => self.single(TokenKind::Lt),
                b'>' if self.peek_at(1) == Some(b'=') => self.double(TokenKind::Ge),
                b'>' => self.single(TokenKind::Gt),
                b'"' | b'\'' => self.read_string(b)?,
                b'0'..=b'9' => self.read_number()?,
                b'.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => self.read_number()?,
                _ if self.current_char().is_some_and(is_ident_start) => self.read_ident(),
                _ => {
                    let ch = self.current_char().unwrap_or('?');
                    let hint = match ch {
                        '=' => " (use `==` to compare)",
                        '!' => " (use `not` to negate)",
                        '&' => " (use `and`)",
                        '|' => " (use `or`, or `||` to concatenate)",
                        _ => "",
                    };
                    return Err(EvalError::parse(start, format!("unexpected character '{}'{}", ch, hint)));
                }
            };
            tokens.push(Token::new(kind, Span::new(start, self.pos)));
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn double(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 2;
        kind
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn current_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn read_string(&mut self, quote: u8) -> Result<TokenKind, EvalError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        let mut chars = self.source[self.pos..].char_indices();
        while let Some((offset, ch)) = chars.next() {
            match ch {
                c if c as u32 == quote as u32 => {
                    self.pos += offset + 1;
                    return Ok(TokenKind::Str(value));
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, other)) => value.push(other),
                    None => break,
                },
                c => value.push(c),
            }
        }
        Err(EvalError::parse(start, "unterminated string literal"))
    }

    fn read_number(&mut self) -> Result<TokenKind, EvalError> {
        let start = self.pos;
        self.eat_digits();
        if self.peek_at(0) == Some(b'.') {
            self.pos += 1;
            self.eat_digits();
        }
        if matches!(self.peek_at(0), Some(b'e' | b'E')) {
            let signed = matches!(self.peek_at(1), Some(b'+' | b'-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|d| d.is_ascii_digit()) {
                self.pos += digit_at;
                self.eat_digits();
            }
        }
        let text = &self.source[start..self.pos];
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| EvalError::parse(start, format!("invalid number '{}'", text)))
    }

    fn eat_digits(&mut self) {
        while self.peek_at(0).is_some_and(|d| d.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn read_ident(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(ch) = self.current_char().filter(|&c| is_ident_continue(c)) {
            self.pos += ch.len_utf8();
        }
        match &self.source[start..self.pos] {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            name => TokenKind::Ident(name.to_string()),
        }
    }
}

// Field keys may be written in any script.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a >= 1 || 'x'"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Ge,
                TokenKind::Number(1.0),
                TokenKind::Concat,
                TokenKind::Str("x".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("3 2.5 .5 1e3 2E-2"),
            vec![
                TokenKind::Number(3.0),
                TokenKind::Number(2.5),
                TokenKind::Number(0.5),
                TokenKind::Number(1000.0),
                TokenKind::Number(0.02),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(
            kinds(r#""a\"b" 'it\'s' "tab\t""#),
            vec![
                TokenKind::Str("a\"b".into()),
                TokenKind::Str("it's".into()),
                TokenKind::Str("tab\t".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds("'héllo'"), vec![TokenKind::Str("héllo".into()), TokenKind::Eof]);
    }

    #[test]
    fn test_keywords_and_idents() {
        assert_eq!(
            kinds("not done and field_x1 or $y"),
            vec![
                TokenKind::Not,
                TokenKind::Ident("done".into()),
                TokenKind::And,
                TokenKind::Ident("field_x1".into()),
                TokenKind::Or,
                TokenKind::Ident("$y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unicode_idents() {
        assert_eq!(
            kinds("prénom || ' ' || 名前2"),
            vec![
                TokenKind::Ident("prénom".into()),
                TokenKind::Concat,
                TokenKind::Str(" ".into()),
                TokenKind::Concat,
                TokenKind::Ident("名前2".into()),
                TokenKind::Eof,
            ]
        );
        let tokens = Lexer::new("été+1").tokenize().unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 5));
        assert_eq!(tokens[1].kind, TokenKind::Plus);
    }

    #[test]
    fn test_spans() {
        let tokens = Lexer::new("ab + 1").tokenize().unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].span, Span::new(3, 4));
        assert_eq!(tokens[3].span, Span::new(6, 6));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            Lexer::new("'open").tokenize(),
            Err(EvalError::Parse { position: 0, .. })
        ));
        let err = Lexer::new("a = 1").tokenize().unwrap_err();
        assert!(err.to_string().contains("=="), "{err}");
        assert!(Lexer::new("a # b").tokenize().is_err());
    }
}
