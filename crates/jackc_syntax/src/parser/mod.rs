//! Recursive-descent parser: token stream to AST.
//!
//! One token of lookahead drives every decision except inside [`Parser::parse_term`],
//! which peeks two tokens ahead to disambiguate `ID [`, `ID . ID (`, `ID . ID`,
//! and bare `ID`. Each nonterminal below is a dedicated method that allocates
//! and returns a new AST node out of the shared arena.

use jackc_base::{Arena, DiagnosticCode, DiagnosticSink, Interner, Symbol};

use crate::ast::*;
use crate::token::{Keyword, Punct, Token, TokenQueue, TokenType};

pub struct Parser<'a, 'd> {
    queue: TokenQueue<'a>,
    arena: &'a Arena,
    interner: &'d mut Interner,
    diagnostics: &'d mut DiagnosticSink,
    /// Set once any `expect_and_consume` mismatch has been recorded. The
    /// pipeline driver checks the diagnostic sink rather than this flag, but
    /// callers that want an early-out mid-parse can consult it.
    pub has_error: bool,
}

impl<'a, 'd> Parser<'a, 'd> {
    pub fn new(
        queue: TokenQueue<'a>,
        arena: &'a Arena,
        interner: &'d mut Interner,
        diagnostics: &'d mut DiagnosticSink,
    ) -> Self {
        Parser { queue, arena, interner, diagnostics, has_error: false }
    }

    fn peek(&self) -> Token<'a> {
        self.queue.peek()
    }

    fn peek_offset(&self, k: usize) -> Token<'a> {
        self.queue.peek_offset(k)
    }

    fn advance(&mut self) -> Token<'a> {
        self.queue.pop()
    }

    fn intern(&mut self, s: &str) -> Symbol {
        self.interner.intern(s)
    }

    /// Compares the current token's type to `expected`; advances and returns
    /// it on match. On mismatch, records an `UnexpectedToken` diagnostic and
    /// still advances (so a single bad token cannot wedge the parser) before
    /// returning the offending token to the caller.
    fn expect_and_consume(&mut self, expected: TokenType, what: &str) -> Token<'a> {
        let tok = self.peek();
        if tok.ty != expected {
            self.has_error = true;
            self.diagnostics.error(
                DiagnosticCode::UnexpectedToken,
                tok.loc,
                format!("expected {what}, found '{}'", tok.lexeme),
            );
        }
        self.advance()
    }

    fn expect_identifier(&mut self) -> Token<'a> {
        self.expect_and_consume(TokenType::Identifier, "an identifier")
    }

    pub fn parse_class(&mut self) -> Class<'a> {
        let loc = self.peek().loc;
        self.expect_and_consume(TokenType::Keyword(Keyword::Class), "'class'");
        let name_tok = self.expect_identifier();
        let name = self.intern(name_tok.lexeme);
        self.expect_and_consume(TokenType::Punct(Punct::LBrace), "'{'");

        let mut var_decs = Vec::new();
        while self.peek().is_category(crate::token::TokenCategory::ClassVarKeyword) {
            var_decs.push(self.arena.alloc(self.parse_class_var_dec()) as &ClassVarDec<'a>);
        }

        let mut subroutine_decs = Vec::new();
        while self.peek().is_category(crate::token::TokenCategory::SubroutineKeyword) {
            subroutine_decs.push(self.arena.alloc(self.parse_subroutine_dec()) as &SubroutineDec<'a>);
        }

        self.expect_and_consume(TokenType::Punct(Punct::RBrace), "'}'");

        Class {
            name,
            var_decs: self.arena.alloc_slice(var_decs),
            subroutine_decs: self.arena.alloc_slice(subroutine_decs),
            loc,
        }
    }

    pub fn parse_class_var_dec(&mut self) -> ClassVarDec<'a> {
        let loc = self.peek().loc;
        let modifier = match self.advance().ty {
            TokenType::Keyword(Keyword::Static) => ClassVarModifier::Static,
            TokenType::Keyword(Keyword::Field) => ClassVarModifier::Field,
            _ => {
                self.diagnostics.error(DiagnosticCode::UnexpectedToken, loc, "expected 'static' or 'field'");
                ClassVarModifier::Field
            }
        };
        let type_name = self.parse_type_name();
        let names = self.parse_name_list();
        self.expect_and_consume(TokenType::Punct(Punct::Semicolon), "';'");
        ClassVarDec { modifier, type_name, names: self.arena.alloc_slice(names), loc }
    }

    /// A type is either a primitive keyword (`int`, `char`, `boolean`) or a
    /// class-name identifier; this also covers `void` for return types.
    fn parse_type_name(&mut self) -> Symbol {
        let tok = self.advance();
        match tok.ty {
            TokenType::Keyword(Keyword::Int) => self.intern("int"),
            TokenType::Keyword(Keyword::Char) => self.intern("char"),
            TokenType::Keyword(Keyword::Boolean) => self.intern("boolean"),
            TokenType::Keyword(Keyword::Void) => self.intern("void"),
            TokenType::Identifier => self.intern(tok.lexeme),
            _ => {
                self.has_error = true;
                self.diagnostics.error(DiagnosticCode::UnexpectedToken, tok.loc, "expected a type");
                self.intern("int")
            }
        }
    }

    fn parse_name_list(&mut self) -> Vec<Symbol> {
        let mut names = Vec::new();
        let first = self.expect_identifier();
        names.push(self.intern(first.lexeme));
        while self.peek().ty == TokenType::Punct(Punct::Comma) {
            self.advance();
            let next = self.expect_identifier();
            names.push(self.intern(next.lexeme));
        }
        names
    }

    pub fn parse_subroutine_dec(&mut self) -> SubroutineDec<'a> {
        let loc = self.peek().loc;
        let kind = match self.advance().ty {
            TokenType::Keyword(Keyword::Constructor) => SubroutineKind::Constructor,
            TokenType::Keyword(Keyword::Function) => SubroutineKind::Function,
            TokenType::Keyword(Keyword::Method) => SubroutineKind::Method,
            _ => {
                self.diagnostics.error(DiagnosticCode::UnexpectedToken, loc, "expected a subroutine kind");
                SubroutineKind::Function
            }
        };
        let return_type = self.parse_type_name();
        let name_tok = self.expect_identifier();
        let name = self.intern(name_tok.lexeme);
        self.expect_and_consume(TokenType::Punct(Punct::LParen), "'('");
        let params = self.arena.alloc(self.parse_parameter_list());
        self.expect_and_consume(TokenType::Punct(Punct::RParen), "')'");
        let body = self.arena.alloc(self.parse_subroutine_body());
        SubroutineDec { kind, return_type, name, params, body, loc }
    }

    pub fn parse_parameter_list(&mut self) -> ParameterList<'a> {
        let loc = self.peek().loc;
        let mut params = Vec::new();
        if self.peek().ty != TokenType::Punct(Punct::RParen) {
            loop {
                let param_loc = self.peek().loc;
                let type_name = self.parse_type_name();
                let name_tok = self.expect_identifier();
                let name = self.intern(name_tok.lexeme);
                params.push(Parameter { type_name, name, loc: param_loc });
                if self.peek().ty == TokenType::Punct(Punct::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        ParameterList { params: self.arena.alloc_slice(params), loc }
    }

    pub fn parse_subroutine_body(&mut self) -> SubroutineBody<'a> {
        let loc = self.peek().loc;
        self.expect_and_consume(TokenType::Punct(Punct::LBrace), "'{'");
        let mut var_decs = Vec::new();
        while self.peek().ty == TokenType::Keyword(Keyword::Var) {
            var_decs.push(self.arena.alloc(self.parse_var_dec()) as &VarDec<'a>);
        }
        let statements = self.arena.alloc(self.parse_statements());
        self.expect_and_consume(TokenType::Punct(Punct::RBrace), "'}'");
        SubroutineBody { var_decs: self.arena.alloc_slice(var_decs), statements, loc }
    }

    pub fn parse_var_dec(&mut self) -> VarDec<'a> {
        let loc = self.peek().loc;
        self.expect_and_consume(TokenType::Keyword(Keyword::Var), "'var'");
        let type_name = self.parse_type_name();
        let names = self.parse_name_list();
        self.expect_and_consume(TokenType::Punct(Punct::Semicolon), "';'");
        VarDec { type_name, names: self.arena.alloc_slice(names), loc }
    }

    pub fn parse_statements(&mut self) -> Statements<'a> {
        let mut statements = Vec::new();
        while self.peek().is_category(crate::token::TokenCategory::StatementStarter) {
            statements.push(self.arena.alloc(self.parse_statement()) as &Statement<'a>);
        }
        Statements { statements: self.arena.alloc_slice(statements) }
    }

    pub fn parse_statement(&mut self) -> Statement<'a> {
        match self.peek().ty {
            TokenType::Keyword(Keyword::Let) => self.parse_let_statement(),
            TokenType::Keyword(Keyword::If) => self.parse_if_statement(),
            TokenType::Keyword(Keyword::While) => self.parse_while_statement(),
            TokenType::Keyword(Keyword::Do) => self.parse_do_statement(),
            TokenType::Keyword(Keyword::Return) => self.parse_return_statement(),
            _ => {
                let tok = self.advance();
                self.has_error = true;
                self.diagnostics.error(DiagnosticCode::UnexpectedToken, tok.loc, "expected a statement");
                Statement::Return { value: None, loc: tok.loc }
            }
        }
    }

    fn parse_let_statement(&mut self) -> Statement<'a> {
        let loc = self.peek().loc;
        self.advance(); // 'let'
        let target_tok = self.expect_identifier();
        let target = self.intern(target_tok.lexeme);
        let index = if self.peek().ty == TokenType::Punct(Punct::LBracket) {
            self.advance();
            let e = self.arena.alloc(self.parse_expression());
            self.expect_and_consume(TokenType::Punct(Punct::RBracket), "']'");
            Some(e as &Expression<'a>)
        } else {
            None
        };
        self.expect_and_consume(TokenType::Punct(Punct::Equals), "'='");
        let value = self.arena.alloc(self.parse_expression());
        self.expect_and_consume(TokenType::Punct(Punct::Semicolon), "';'");
        Statement::Let { target, index, value, loc }
    }

    fn parse_if_statement(&mut self) -> Statement<'a> {
        let loc = self.peek().loc;
        self.advance(); // 'if'
        self.expect_and_consume(TokenType::Punct(Punct::LParen), "'('");
        let cond = self.arena.alloc(self.parse_expression());
        self.expect_and_consume(TokenType::Punct(Punct::RParen), "')'");
        self.expect_and_consume(TokenType::Punct(Punct::LBrace), "'{'");
        let then_branch = self.arena.alloc(self.parse_statements());
        self.expect_and_consume(TokenType::Punct(Punct::RBrace), "'}'");
        let else_branch = if self.peek().ty == TokenType::Keyword(Keyword::Else) {
            self.advance();
            self.expect_and_consume(TokenType::Punct(Punct::LBrace), "'{'");
            let body = self.arena.alloc(self.parse_statements());
            self.expect_and_consume(TokenType::Punct(Punct::RBrace), "'}'");
            Some(body as &Statements<'a>)
        } else {
            None
        };
        Statement::If { cond, then_branch, else_branch, loc }
    }

    fn parse_while_statement(&mut self) -> Statement<'a> {
        let loc = self.peek().loc;
        self.advance(); // 'while'
        self.expect_and_consume(TokenType::Punct(Punct::LParen), "'('");
        let cond = self.arena.alloc(self.parse_expression());
        self.expect_and_consume(TokenType::Punct(Punct::RParen), "')'");
        self.expect_and_consume(TokenType::Punct(Punct::LBrace), "'{'");
        let body = self.arena.alloc(self.parse_statements());
        self.expect_and_consume(TokenType::Punct(Punct::RBrace), "'}'");
        Statement::While { cond, body, loc }
    }

    fn parse_do_statement(&mut self) -> Statement<'a> {
        let loc = self.peek().loc;
        self.advance(); // 'do'
        let call = self.arena.alloc(self.parse_subroutine_call());
        self.expect_and_consume(TokenType::Punct(Punct::Semicolon), "';'");
        Statement::Do { call, loc }
    }

    fn parse_return_statement(&mut self) -> Statement<'a> {
        let loc = self.peek().loc;
        self.advance(); // 'return'
        let value = if self.peek().ty == TokenType::Punct(Punct::Semicolon) {
            None
        } else {
            Some(self.arena.alloc(self.parse_expression()) as &Expression<'a>)
        };
        self.expect_and_consume(TokenType::Punct(Punct::Semicolon), "';'");
        Statement::Return { value, loc }
    }

    /// `IDENT '.' IDENT '(' (expr (',' expr)*)? ')'` or `IDENT '(' ... ')'`.
    fn parse_subroutine_call(&mut self) -> SubroutineCall<'a> {
        let loc = self.peek().loc;
        let first_tok = self.expect_identifier();
        let first = self.intern(first_tok.lexeme);
        let (caller, name) = if self.peek().ty == TokenType::Punct(Punct::Dot) {
            self.advance();
            let name_tok = self.expect_identifier();
            (Some(first), self.intern(name_tok.lexeme))
        } else {
            (None, first)
        };
        self.expect_and_consume(TokenType::Punct(Punct::LParen), "'('");
        let mut args = Vec::new();
        if self.peek().ty != TokenType::Punct(Punct::RParen) {
            loop {
                args.push(self.arena.alloc(self.parse_expression()) as &Expression<'a>);
                if self.peek().ty == TokenType::Punct(Punct::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect_and_consume(TokenType::Punct(Punct::RParen), "')'");
        SubroutineCall::new(caller, name, self.arena.alloc_slice(args), loc)
    }

    /// `term (op term)*`, left to right with a single precedence level.
    pub fn parse_expression(&mut self) -> Expression<'a> {
        let loc = self.peek().loc;
        let head = self.arena.alloc(self.parse_term());
        let mut ops = Vec::new();
        while let Some(op) = binary_op(self.peek().ty) {
            self.advance();
            let term = self.arena.alloc(self.parse_term());
            ops.push(Operation { op, term });
        }
        Expression::new(head, self.arena.alloc_slice(ops), loc)
    }

    pub fn parse_term(&mut self) -> Term<'a> {
        let tok = self.peek();
        let loc = tok.loc;
        match tok.ty {
            TokenType::IntLiteral(v) => {
                self.advance();
                Term::new(TermKind::IntConst(v), loc)
            }
            TokenType::StringLiteral => {
                self.advance();
                let s = self.intern(tok.lexeme);
                Term::new(TermKind::StringConst(s), loc)
            }
            TokenType::Keyword(Keyword::True) => {
                self.advance();
                Term::new(TermKind::KeywordConst(KeywordConst::True), loc)
            }
            TokenType::Keyword(Keyword::False) => {
                self.advance();
                Term::new(TermKind::KeywordConst(KeywordConst::False), loc)
            }
            TokenType::Keyword(Keyword::Null) => {
                self.advance();
                Term::new(TermKind::KeywordConst(KeywordConst::Null), loc)
            }
            TokenType::Keyword(Keyword::This) => {
                self.advance();
                Term::new(TermKind::KeywordConst(KeywordConst::This), loc)
            }
            TokenType::Punct(Punct::LParen) => {
                self.advance();
                let inner = self.arena.alloc(self.parse_expression());
                self.expect_and_consume(TokenType::Punct(Punct::RParen), "')'");
                Term::new(TermKind::Paren(inner), loc)
            }
            TokenType::Punct(Punct::Minus) => {
                self.advance();
                let operand = self.arena.alloc(self.parse_term());
                Term::new(TermKind::Unary { op: UnaryOp::Neg, operand }, loc)
            }
            TokenType::Punct(Punct::Tilde) => {
                self.advance();
                let operand = self.arena.alloc(self.parse_term());
                Term::new(TermKind::Unary { op: UnaryOp::Not, operand }, loc)
            }
            TokenType::Identifier => {
                // Two-token lookahead disambiguates `ID [`, `ID . ID (`,
                // `ID . ID`, and bare `ID`.
                match self.peek_offset(1).ty {
                    TokenType::Punct(Punct::LBracket) => {
                        self.advance();
                        let name = self.intern(tok.lexeme);
                        self.advance(); // '['
                        let index = self.arena.alloc(self.parse_expression());
                        self.expect_and_consume(TokenType::Punct(Punct::RBracket), "']'");
                        Term::new(TermKind::ArrayAccess { name, index }, loc)
                    }
                    TokenType::Punct(Punct::Dot) if self.peek_offset(2).ty == TokenType::Identifier
                        && self.peek_offset(3).ty == TokenType::Punct(Punct::LParen) =>
                    {
                        let call = self.arena.alloc(self.parse_subroutine_call());
                        Term::new(TermKind::Call(call), loc)
                    }
                    TokenType::Punct(Punct::LParen) => {
                        let call = self.arena.alloc(self.parse_subroutine_call());
                        Term::new(TermKind::Call(call), loc)
                    }
                    TokenType::Punct(Punct::Dot) => {
                        self.advance();
                        let qualifier = self.intern(tok.lexeme);
                        self.advance(); // '.'
                        let name_tok = self.expect_identifier();
                        let name = self.intern(name_tok.lexeme);
                        Term::new(TermKind::Var(VarTerm::new(Some(qualifier), name, loc)), loc)
                    }
                    _ => {
                        self.advance();
                        let name = self.intern(tok.lexeme);
                        Term::new(TermKind::Var(VarTerm::new(None, name, loc)), loc)
                    }
                }
            }
            _ => {
                self.advance();
                self.has_error = true;
                self.diagnostics.error(DiagnosticCode::UnexpectedToken, loc, "expected an expression term");
                Term::new(TermKind::IntConst(0), loc)
            }
        }
    }
}

fn binary_op(ty: TokenType) -> Option<BinaryOp> {
    match ty {
        TokenType::Punct(Punct::Plus) => Some(BinaryOp::Add),
        TokenType::Punct(Punct::Minus) => Some(BinaryOp::Sub),
        TokenType::Punct(Punct::Star) => Some(BinaryOp::Mul),
        TokenType::Punct(Punct::Slash) => Some(BinaryOp::Div),
        TokenType::Punct(Punct::Amp) => Some(BinaryOp::And),
        TokenType::Punct(Punct::Pipe) => Some(BinaryOp::Or),
        TokenType::Punct(Punct::Lt) => Some(BinaryOp::Lt),
        TokenType::Punct(Punct::Gt) => Some(BinaryOp::Gt),
        TokenType::Punct(Punct::Equals) => Some(BinaryOp::Eq),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jackc_base::Arena;

    macro_rules! with_parsed_class {
        ($source:expr, |$class:ident, $has_error:ident| $body:block) => {{
            let arena = Arena::new();
            let mut interner = Interner::new();
            let mut diagnostics = DiagnosticSink::new();
            let file = interner.intern("Main.jack");
            let mut lexer = crate::lexer::Lexer::new($source, file);
            let queue = lexer.lex(&arena, &mut interner, &mut diagnostics);
            let mut parser = Parser::new(queue, &arena, &mut interner, &mut diagnostics);
            let $class = parser.parse_class();
            let $has_error = parser.has_error;
            $body
        }};
    }

    #[test]
    fn parses_empty_class() {
        with_parsed_class!("class Main { }", |class, has_error| {
            assert!(!has_error);
            assert!(class.var_decs.is_empty());
            assert!(class.subroutine_decs.is_empty());
        });
    }

    #[test]
    fn parses_field_declarations() {
        with_parsed_class!("class Point { field int x, y; }", |class, has_error| {
            assert!(!has_error);
            assert_eq!(class.var_decs.len(), 1);
            assert_eq!(class.var_decs[0].names.len(), 2);
        });
    }

    #[test]
    fn parses_function_with_return() {
        with_parsed_class!("class A { function int f() { return 7; } }", |class, has_error| {
            assert!(!has_error);
            assert_eq!(class.subroutine_decs.len(), 1);
            let sub = class.subroutine_decs[0];
            assert_eq!(sub.kind, SubroutineKind::Function);
            assert_eq!(sub.body.statements.statements.len(), 1);
        });
    }

    #[test]
    fn parses_left_to_right_expression_without_precedence() {
        with_parsed_class!("class A { function int f() { return 1 + 2 * 3; } }", |class, has_error| {
            assert!(!has_error);
            let sub = class.subroutine_decs[0];
            let Statement::Return { value: Some(expr), .. } = sub.body.statements.statements[0] else {
                panic!("expected return with value");
            };
            assert_eq!(expr.ops.len(), 2);
            assert_eq!(expr.ops[0].op, BinaryOp::Add);
            assert_eq!(expr.ops[1].op, BinaryOp::Mul);
        });
    }

    #[test]
    fn disambiguates_array_access_call_and_qualified_var() {
        with_parsed_class!(
            "class A { method void g() { let x = a[0]; do Output.println(); let y = b.field; return; } }",
            |class, has_error| {
                assert!(!has_error);
                let sub = class.subroutine_decs[0];
                let stmts = sub.body.statements.statements;
                let Statement::Let { value: expr, .. } = stmts[0] else { panic!() };
                assert!(matches!(expr.head.kind, TermKind::ArrayAccess { .. }));
                assert!(matches!(stmts[1], Statement::Do { .. }));
                let Statement::Let { value: expr2, .. } = stmts[2] else { panic!() };
                assert!(matches!(expr2.head.kind, TermKind::Var(_)));
            }
        );
    }

    #[test]
    fn mismatched_token_records_diagnostic_and_keeps_parsing() {
        with_parsed_class!("class A { function int f() return 1; } }", |class, has_error| {
            assert!(has_error);
            assert_eq!(class.subroutine_decs.len(), 1);
        });
    }
}
