//! Tokenizer.
//!
//! Newlines are tokens: a statement ends at the end of its line. Spaces,
//! tabs, and `\r` are skipped; `#` starts a comment running to the end of
//! the line.

use vigil_text::Span;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Int(i64),
    Str(String),
    Ident(String),
    Let,
    Fn,
    Exit,
    Fail,
    Eq,
    Dot,
    Comma,
    Colon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Newline,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Int(n) => format!("integer `{n}`"),
            TokenKind::Str(_) => "string".to_owned(),
            TokenKind::Ident(name) => format!("`{name}`"),
            TokenKind::Let => "`let`".to_owned(),
            TokenKind::Fn => "`fn`".to_owned(),
            TokenKind::Exit => "`exit`".to_owned(),
            TokenKind::Fail => "`fail`".to_owned(),
            TokenKind::Eq => "`=`".to_owned(),
            TokenKind::Dot => "`.`".to_owned(),
            TokenKind::Comma => "`,`".to_owned(),
            TokenKind::Colon => "`:`".to_owned(),
            TokenKind::LParen => "`(`".to_owned(),
            TokenKind::RParen => "`)`".to_owned(),
            TokenKind::LBrace => "`{`".to_owned(),
            TokenKind::RBrace => "`}`".to_owned(),
            TokenKind::Newline => "end of line".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LexError {
    pub message: String,
    pub span: Span,
}

fn span(start: usize, end: usize) -> Span {
    Span::new(
        u32::try_from(start).unwrap_or(u32::MAX),
        u32::try_from(end).unwrap_or(u32::MAX),
    )
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub(crate) fn lex(text: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let single = |kind| Token {
            kind,
            span: span(start, start + c.len_utf8()),
        };
        match c {
            ' ' | '\t' | '\r' => {}
            '#' => {
                while chars.next_if(|&(_, c)| c != '\n').is_some() {}
            }
            '\n' => tokens.push(single(TokenKind::Newline)),
            '=' => tokens.push(single(TokenKind::Eq)),
            '.' => tokens.push(single(TokenKind::Dot)),
            ',' => tokens.push(single(TokenKind::Comma)),
            ':' => tokens.push(single(TokenKind::Colon)),
            '(' => tokens.push(single(TokenKind::LParen)),
            ')' => tokens.push(single(TokenKind::RParen)),
            '{' => tokens.push(single(TokenKind::LBrace)),
            '}' => tokens.push(single(TokenKind::RBrace)),
            '"' => {
                let mut end = None;
                for (i, c) in chars.by_ref() {
                    if c == '"' {
                        end = Some(i);
                        break;
                    }
                    if c == '\n' {
                        break;
                    }
                }
                let Some(end) = end else {
                    return Err(LexError {
                        message: "unterminated string".to_owned(),
                        span: span(start, start + 1),
                    });
                };
                tokens.push(Token {
                    kind: TokenKind::Str(text[start + 1..end].to_owned()),
                    span: span(start, end + 1),
                });
            }
            c if c.is_ascii_digit() => {
                let mut end = start + 1;
                while let Some((i, c)) = chars.next_if(|&(_, c)| c.is_ascii_digit()) {
                    end = i + c.len_utf8();
                }
                let value = text[start..end].parse::<i64>().map_err(|_| LexError {
                    message: "integer literal out of range".to_owned(),
                    span: span(start, end),
                })?;
                tokens.push(Token {
                    kind: TokenKind::Int(value),
                    span: span(start, end),
                });
            }
            c if is_ident_start(c) => {
                let mut end = start + c.len_utf8();
                while let Some((i, c)) = chars.next_if(|&(_, c)| is_ident_continue(c)) {
                    end = i + c.len_utf8();
                }
                let kind = match &text[start..end] {
                    "let" => TokenKind::Let,
                    "fn" => TokenKind::Fn,
                    "exit" => TokenKind::Exit,
                    "fail" => TokenKind::Fail,
                    word => TokenKind::Ident(word.to_owned()),
                };
                tokens.push(Token {
                    kind,
                    span: span(start, end),
                });
            }
            other => {
                return Err(LexError {
                    message: format!("unexpected character `{other}`"),
                    span: span(start, start + other.len_utf8()),
                });
            }
        }
    }
    Ok(tokens)
}
