//! Table-driven DFA lexer: character stream to [`Token`] stream.
//!
//! The character alphabet is partitioned into the ten equivalence classes
//! from [`CharClass`]. The scanner is a small state machine ([`State`]) whose
//! transitions are expressed as a `match (state, class)` rather than a
//! literal two-dimensional jump table — the same automaton, rendered the way
//! match arms read best in Rust.
//!
//! A token is emitted whenever the automaton leaves a non-`Start`,
//! non-`InSymbol` accepting state; `InSymbol` emits its one-character token
//! immediately. Comments contribute no tokens. A newline inside a string
//! literal is a lex error; the lexer records it and keeps scanning so later
//! problems in the same file can also surface.

use jackc_base::{DiagnosticCode, DiagnosticSink, Interner, SourceLoc, Symbol};

use crate::token::{Keyword, Punct, Token, TokenQueue, TokenType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Whitespace,
    Newline,
    AlphaOrUnderscore,
    Digit,
    DoubleQuote,
    Slash,
    Star,
    Symbol,
    Other,
    Eof,
}

fn classify(c: Option<char>) -> CharClass {
    match c {
        None => CharClass::Eof,
        Some('\n') => CharClass::Newline,
        Some(c) if c.is_whitespace() => CharClass::Whitespace,
        Some(c) if c.is_alphabetic() || c == '_' => CharClass::AlphaOrUnderscore,
        Some(c) if c.is_ascii_digit() => CharClass::Digit,
        Some('"') => CharClass::DoubleQuote,
        Some('/') => CharClass::Slash,
        Some('*') => CharClass::Star,
        Some(c) if Punct::from_char(c).is_some() => CharClass::Symbol,
        Some(_) => CharClass::Other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    InId,
    InNum,
    InString,
    CommentStart,
    InCommentSingle,
    InCommentMulti,
    SeenStarInComment,
    InSymbol,
    Error,
}

/// Converts one file's source text into a [`TokenQueue`].
///
/// `file` is the interned filename used to stamp every token's [`SourceLoc`].
/// Diagnostics (newline-in-string, EOF-in-string, unexpected EOF, illegal
/// character) are recorded on `diagnostics` rather than returned, matching
/// how every other phase reports problems.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: u32,
    file: Symbol,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: Symbol) -> Self {
        Lexer {
            source,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            file,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char();
        if let Some(c) = c {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
            }
        }
        c
    }

    fn loc_at(&self, pos: usize, line: u32) -> SourceLoc {
        SourceLoc::new(self.file, line, pos)
    }

    /// Scans the whole source into a [`TokenQueue`], arena-allocating each
    /// token's lexeme text and always terminating the queue with an `Eof`
    /// token.
    pub fn lex(
        &mut self,
        arena: &'a jackc_base::Arena,
        interner: &mut Interner,
        diagnostics: &mut DiagnosticSink,
    ) -> TokenQueue<'a> {
        let mut queue = TokenQueue::new();

        loop {
            // Skip whitespace between tokens.
            while matches!(classify(self.peek_char()), CharClass::Whitespace | CharClass::Newline) {
                self.advance();
            }

            let token_start = self.pos;
            let token_line = self.line;
            let Some(c) = self.peek_char() else {
                queue.push(Token::new(TokenType::Eof, "", self.loc_at(token_start, token_line)));
                break;
            };

            let class = classify(Some(c));
            let mut state = match class {
                CharClass::AlphaOrUnderscore => State::InId,
                CharClass::Digit => State::InNum,
                CharClass::DoubleQuote => State::InString,
                CharClass::Slash => State::CommentStart,
                CharClass::Symbol => State::InSymbol,
                _ => State::Error,
            };

            if state == State::Error {
                diagnostics.error(
                    DiagnosticCode::IllegalSymbol,
                    self.loc_at(token_start, token_line),
                    format!("illegal character '{c}'"),
                );
                self.advance();
                continue;
            }

            self.advance();

            match state {
                State::InId => {
                    while matches!(classify(self.peek_char()), CharClass::AlphaOrUnderscore | CharClass::Digit) {
                        self.advance();
                    }
                    let lexeme = arena.alloc_str(&self.source_slice(token_start, self.pos));
                    let ty = match Keyword::lookup(lexeme) {
                        Some(kw) => TokenType::Keyword(kw),
                        None => TokenType::Identifier,
                    };
                    queue.push(Token::new(ty, lexeme, self.loc_at(token_start, token_line)));
                }
                State::InNum => {
                    while matches!(classify(self.peek_char()), CharClass::Digit) {
                        self.advance();
                    }
                    let text = self.source_slice(token_start, self.pos);
                    let lexeme = arena.alloc_str(&text);
                    let value = match text.parse::<u16>() {
                        Ok(value) => value,
                        Err(_) => {
                            diagnostics.error(
                                DiagnosticCode::IntegerLiteralOverflow,
                                self.loc_at(token_start, token_line),
                                format!("integer literal '{text}' does not fit in 0..=65535"),
                            );
                            0
                        }
                    };
                    queue.push(Token::new(
                        TokenType::IntLiteral(value),
                        lexeme,
                        self.loc_at(token_start, token_line),
                    ));
                }
                State::InString => {
                    let content_start = self.pos;
                    loop {
                        match self.peek_char() {
                            None => {
                                diagnostics.error(
                                    DiagnosticCode::EofInString,
                                    self.loc_at(self.pos, self.line),
                                    "unterminated string literal: reached end of file",
                                );
                                break;
                            }
                            Some('\n') => {
                                diagnostics.error(
                                    DiagnosticCode::NewlineInString,
                                    self.loc_at(self.pos, self.line),
                                    "newline inside string literal",
                                );
                                break;
                            }
                            Some('"') => {
                                let lexeme = arena.alloc_str(&self.source_slice(content_start, self.pos));
                                self.advance();
                                queue.push(Token::new(
                                    TokenType::StringLiteral,
                                    lexeme,
                                    self.loc_at(token_start, token_line),
                                ));
                                break;
                            }
                            Some(_) => {
                                self.advance();
                            }
                        }
                    }
                }
                State::CommentStart => match self.peek_char() {
                    Some('/') => {
                        self.advance();
                        state = State::InCommentSingle;
                        while state == State::InCommentSingle {
                            match self.peek_char() {
                                None | Some('\n') => break,
                                Some(_) => {
                                    self.advance();
                                }
                            }
                        }
                    }
                    Some('*') => {
                        self.advance();
                        state = State::InCommentMulti;
                        loop {
                            match self.peek_char() {
                                None => {
                                    diagnostics.error(
                                        DiagnosticCode::UnexpectedEof,
                                        self.loc_at(self.pos, self.line),
                                        "unterminated block comment",
                                    );
                                    break;
                                }
                                Some('*') => {
                                    self.advance();
                                    state = State::SeenStarInComment;
                                    if self.peek_char() == Some('/') {
                                        self.advance();
                                        break;
                                    }
                                    state = State::InCommentMulti;
                                }
                                Some(_) => {
                                    self.advance();
                                }
                            }
                        }
                    }
                    _ => {
                        let lexeme = arena.alloc_str("/");
                        queue.push(Token::new(
                            TokenType::Punct(Punct::Slash),
                            lexeme,
                            self.loc_at(token_start, token_line),
                        ));
                    }
                },
                State::InSymbol => {
                    let punct = Punct::from_char(c).expect("class Symbol implies from_char succeeds");
                    let lexeme = arena.alloc_str(&self.source_slice(token_start, self.pos));
                    queue.push(Token::new(
                        TokenType::Punct(punct),
                        lexeme,
                        self.loc_at(token_start, token_line),
                    ));
                }
                State::Start | State::Error => unreachable!("handled above"),
            }
        }

        queue
    }

    fn source_slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jackc_base::Arena;

    fn lex(source: &str) -> (Vec<TokenType>, DiagnosticSink) {
        let arena = Arena::new();
        let mut interner = Interner::new();
        let file = interner.intern("Main.jack");
        let mut diagnostics = DiagnosticSink::new();
        let mut lexer = Lexer::new(source, file);
        let mut queue = lexer.lex(&arena, &mut interner, &mut diagnostics);
        let mut types = Vec::new();
        loop {
            let tok = queue.pop();
            let is_eof = tok.is_eof();
            types.push(tok.ty);
            if is_eof {
                break;
            }
        }
        (types, diagnostics)
    }

    #[test]
    fn lexes_class_header() {
        let (types, diagnostics) = lex("class Main {");
        assert!(diagnostics.is_empty());
        assert_eq!(
            types,
            vec![
                TokenType::Keyword(Keyword::Class),
                TokenType::Identifier,
                TokenType::Punct(Punct::LBrace),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn lexes_integer_literal() {
        let (types, _) = lex("42");
        assert_eq!(types[0], TokenType::IntLiteral(42));
    }

    #[test]
    fn lexes_string_literal_without_quotes_in_lexeme() {
        let arena = Arena::new();
        let mut interner = Interner::new();
        let file = interner.intern("Main.jack");
        let mut diagnostics = DiagnosticSink::new();
        let mut lexer = Lexer::new("\"hello\"", file);
        let mut queue = lexer.lex(&arena, &mut interner, &mut diagnostics);
        let tok = queue.pop();
        assert_eq!(tok.ty, TokenType::StringLiteral);
        assert_eq!(tok.lexeme, "hello");
    }

    #[test]
    fn single_line_comment_contributes_no_tokens() {
        let (types, _) = lex("// a comment\nclass");
        assert_eq!(types, vec![TokenType::Keyword(Keyword::Class), TokenType::Eof]);
    }

    #[test]
    fn block_comment_contributes_no_tokens() {
        let (types, _) = lex("/* a\nmultiline\ncomment */ class");
        assert_eq!(types, vec![TokenType::Keyword(Keyword::Class), TokenType::Eof]);
    }

    #[test]
    fn newline_in_string_is_a_lex_error() {
        let (_, diagnostics) = lex("\"abc\ndef\"");
        assert!(diagnostics.has_fatal());
        assert_eq!(diagnostics.diagnostics()[0].code, DiagnosticCode::NewlineInString);
    }

    #[test]
    fn eof_in_string_is_a_lex_error() {
        let (_, diagnostics) = lex("\"unterminated");
        assert!(diagnostics.has_fatal());
        assert_eq!(diagnostics.diagnostics()[0].code, DiagnosticCode::EofInString);
    }

    #[test]
    fn integer_literal_past_u16_range_is_a_lex_error_not_a_silent_zero() {
        let (types, diagnostics) = lex("70000");
        assert_eq!(diagnostics.diagnostics()[0].code, DiagnosticCode::IntegerLiteralOverflow);
        assert_eq!(types[0], TokenType::IntLiteral(0));
    }

    #[test]
    fn illegal_character_is_reported_and_skipped() {
        let (types, diagnostics) = lex("@ class");
        assert_eq!(diagnostics.diagnostics()[0].code, DiagnosticCode::IllegalSymbol);
        assert_eq!(types.last().copied(), Some(TokenType::Eof));
        assert!(types.contains(&TokenType::Keyword(Keyword::Class)));
    }

    #[test]
    fn chained_punctuation_becomes_separate_tokens() {
        let (types, _) = lex("(){}");
        assert_eq!(
            types,
            vec![
                TokenType::Punct(Punct::LParen),
                TokenType::Punct(Punct::RParen),
                TokenType::Punct(Punct::LBrace),
                TokenType::Punct(Punct::RBrace),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn line_number_increments_on_newline_inside_comment() {
        let arena = Arena::new();
        let mut interner = Interner::new();
        let file = interner.intern("Main.jack");
        let mut diagnostics = DiagnosticSink::new();
        let mut lexer = Lexer::new("/* line1\nline2\nline3 */\nclass", file);
        let mut queue = lexer.lex(&arena, &mut interner, &mut diagnostics);
        let tok = queue.pop();
        assert_eq!(tok.loc.line, 4);
    }
}
