//! Lexical scanner for MiniC.
//!
//! Produces the token stream consumed by the recursive-descent parser.
//! Whitespace and comments are skipped; every token carries the 1-based
//! line it started on, which is all the parser needs for diagnostics.

use crate::ast::NameId;
use crate::diagnostic::DiagnosticEngine;
use std::iter::Peekable;
use std::str::Chars;

/// The kind of a MiniC token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// The `int` keyword.
    Int,
    /// The `return` keyword.
    Return,
    /// An identifier, interned.
    Identifier(NameId),
    /// A decimal integer constant.
    IntConst(i32),
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Semicolon,
    Comma,
    Assign,
    /// The end of the input.
    EndOfFile,
}

/// A token together with the source line it started on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32) -> Self {
        Token { kind, line }
    }
}

/// Hand-written scanner over the source text.
pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
    line: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input: input.chars().peekable(),
            line: 1,
        }
    }

    /// Scan the whole input. The returned stream always ends with an
    /// `EndOfFile` token. Lexical errors are reported to `diag` and the
    /// offending character is skipped.
    pub fn tokenize(mut self, diag: &mut DiagnosticEngine) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            match self.next_token(diag) {
                Some(token) => tokens.push(token),
                None => break,
            }
        }
        tokens.push(Token::new(TokenKind::EndOfFile, self.line));
        tokens
    }

    fn next_token(&mut self, diag: &mut DiagnosticEngine) -> Option<Token> {
        loop {
            let line = self.line;
            let c = self.input.next()?;

            match c {
                ' ' | '\t' | '\r' => continue,
                '\n' => {
                    self.line += 1;
                    continue;
                }
                '/' => match self.input.peek() {
                    Some('/') => {
                        self.skip_line_comment();
                        continue;
                    }
                    Some('*') => {
                        self.input.next();
                        self.skip_block_comment(line, diag);
                        continue;
                    }
                    _ => {
                        diag.report(line, "unexpected character '/'");
                        continue;
                    }
                },
                '(' => return Some(Token::new(TokenKind::LeftParen, line)),
                ')' => return Some(Token::new(TokenKind::RightParen, line)),
                '{' => return Some(Token::new(TokenKind::LeftBrace, line)),
                '}' => return Some(Token::new(TokenKind::RightBrace, line)),
                ';' => return Some(Token::new(TokenKind::Semicolon, line)),
                ',' => return Some(Token::new(TokenKind::Comma, line)),
                '=' => return Some(Token::new(TokenKind::Assign, line)),
                _ if c.is_ascii_digit() => {
                    let mut num = String::from(c);
                    while let Some(&c) = self.input.peek() {
                        if c.is_ascii_digit() {
                            num.push(self.input.next().unwrap());
                        } else {
                            break;
                        }
                    }
                    let value = match num.parse::<i32>() {
                        Ok(value) => value,
                        Err(_) => {
                            diag.report(line, format!("integer constant out of range: {}", num));
                            0
                        }
                    };
                    return Some(Token::new(TokenKind::IntConst(value), line));
                }
                _ if c.is_ascii_alphabetic() || c == '_' => {
                    let mut ident = String::from(c);
                    while let Some(&c) = self.input.peek() {
                        if c.is_ascii_alphanumeric() || c == '_' {
                            ident.push(self.input.next().unwrap());
                        } else {
                            break;
                        }
                    }
                    let kind = match ident.as_str() {
                        "int" => TokenKind::Int,
                        "return" => TokenKind::Return,
                        _ => TokenKind::Identifier(NameId::new(ident.as_str())),
                    };
                    return Some(Token::new(kind, line));
                }
                _ => {
                    diag.report(line, format!("unexpected character '{}'", c));
                    continue;
                }
            }
        }
    }

    fn skip_line_comment(&mut self) {
        for c in self.input.by_ref() {
            if c == '\n' {
                self.line += 1;
                break;
            }
        }
    }

    fn skip_block_comment(&mut self, start_line: u32, diag: &mut DiagnosticEngine) {
        let mut last_was_star = false;
        for c in self.input.by_ref() {
            match c {
                '\n' => {
                    self.line += 1;
                    last_was_star = false;
                }
                '*' => last_was_star = true,
                '/' if last_was_star => return,
                _ => last_was_star = false,
            }
        }
        diag.report(start_line, "unterminated block comment");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> (Vec<Token>, DiagnosticEngine) {
        let mut diag = DiagnosticEngine::new();
        let tokens = Lexer::new(input).tokenize(&mut diag);
        (tokens, diag)
    }

    #[test]
    fn lexes_minimal_function() {
        let (tokens, diag) = lex("int main(){return 1;}");
        assert!(!diag.has_errors());
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Int,
                TokenKind::Identifier(NameId::new("main")),
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::Return,
                TokenKind::IntConst(1),
                TokenKind::Semicolon,
                TokenKind::RightBrace,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn tracks_lines_across_comments() {
        let (tokens, diag) = lex("int main()\n{\n  // comment\n  /* multi\n     line */ return 42;\n}");
        assert!(!diag.has_errors());
        let ret = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Return)
            .expect("return token");
        assert_eq!(ret.line, 5);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::EndOfFile);
    }

    #[test]
    fn reports_unknown_character() {
        let (tokens, diag) = lex("int $ x");
        assert_eq!(diag.error_count(), 1);
        assert_eq!(diag.diagnostics()[0].line, 1);
        // The bad character is skipped, the rest still lexes.
        assert_eq!(tokens[1].kind, TokenKind::Identifier(NameId::new("x")));
    }

    #[test]
    fn reports_out_of_range_constant() {
        let (tokens, diag) = lex("99999999999");
        assert_eq!(diag.error_count(), 1);
        assert_eq!(tokens[0].kind, TokenKind::IntConst(0));
    }

    #[test]
    fn reports_unterminated_block_comment() {
        let (_, diag) = lex("int a /* no end");
        assert_eq!(diag.error_count(), 1);
    }
}
