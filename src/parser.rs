//! Recursive-descent parser for MiniC.
//!
//! One function per grammar rule:
//!
//! ```text
//! compileUnit     := funcDef EOF
//! funcDef         := 'int' ID '(' ')' block
//! block           := '{' blockItemList? '}'
//! blockItemList   := blockItem+
//! blockItem       := statement
//! statement       := returnStatement | localVarDecl | assignExprStmt
//! returnStatement := 'return' expr ';'
//! localVarDecl    := 'int' ID varDeclList
//! varDeclList     := ',' ID varDeclList | ';'
//! assignExprStmt  := expr ( '=' expr )?
//! expr            := INT_CONST
//! ```
//!
//! Each rule inspects one token of lookahead. A rule that was not committed
//! to returns `None`; a committed rule that hits an unexpected token reports
//! a diagnostic and keeps going, so one run can surface several errors. The
//! declaration list resynchronizes by skipping exactly one token per
//! reported error; end-of-input is never skipped, which bounds the total
//! error count by the token count.

use crate::ast::{NameId, Node, NodeKind, TypeSpec};
use crate::diagnostic::DiagnosticEngine;
use crate::lexer::{Token, TokenKind};
use log::debug;

/// Parser state for one parse invocation: a token slice, the lookahead
/// index, and the diagnostic engine the errors go to.
pub struct Parser<'t, 'd> {
    tokens: &'t [Token],
    current_idx: usize,
    diag: &'d mut DiagnosticEngine,
}

impl<'t, 'd> Parser<'t, 'd> {
    /// Create a parser over an `EndOfFile`-terminated token stream.
    pub fn new(tokens: &'t [Token], diag: &'d mut DiagnosticEngine) -> Self {
        debug_assert!(
            matches!(
                tokens.last(),
                Some(token) if token.kind == TokenKind::EndOfFile
            ),
            "token stream must end with EndOfFile"
        );
        Parser {
            tokens,
            current_idx: 0,
            diag,
        }
    }

    /// Parse one compile unit. Returns the tree only when the parse
    /// reported no errors; after any error the result is `None` even
    /// though recovery may have built a partial tree.
    pub fn parse(&mut self) -> Option<Node> {
        let baseline = self.diag.error_count();
        let root = self.compile_unit();
        let errors = self.diag.error_count() - baseline;
        if errors != 0 {
            debug!("parse failed with {} error(s)", errors);
            return None;
        }
        Some(root)
    }

    // === Lookahead management ===

    fn current(&self) -> &Token {
        &self.tokens[self.current_idx]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn current_line(&self) -> u32 {
        self.current().line
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Move the lookahead forward. Never advances past `EndOfFile`.
    fn advance(&mut self) {
        if self.current_kind() != TokenKind::EndOfFile {
            self.current_idx += 1;
        }
    }

    /// Consume the current token if it matches `kind`.
    fn accept(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            return true;
        }
        false
    }

    /// Consume and return the current identifier, if any.
    fn accept_identifier(&mut self) -> Option<NameId> {
        if let TokenKind::Identifier(name) = self.current_kind() {
            self.advance();
            return Some(name);
        }
        None
    }

    /// Report an error at the current lookahead line.
    fn error(&mut self, message: impl Into<String>) {
        self.diag.report(self.current_line(), message);
    }

    // === Grammar rules ===

    /// compileUnit := funcDef EOF
    fn compile_unit(&mut self) -> Node {
        let mut unit = Node::new(NodeKind::CompileUnit);

        // FIRST(funcDef) = { 'int' }
        if self.at(TokenKind::Int) {
            if let Some(func) = self.func_def() {
                unit.push_child(func);
            }
        }

        if !self.accept(TokenKind::EndOfFile) {
            self.error("expected end of input after function definition");
        }

        unit
    }

    /// funcDef := 'int' ID '(' ')' block
    fn func_def(&mut self) -> Option<Node> {
        if !self.accept(TokenKind::Int) {
            return None;
        }

        let Some(name) = self.accept_identifier() else {
            self.error("expected function name after return type");
            return None;
        };

        if !self.accept(TokenKind::LeftParen) {
            self.error("missing '(' in function definition");
            return None;
        }

        // MiniC functions take no parameters.
        if !self.accept(TokenKind::RightParen) {
            self.error("missing ')' in function definition");
            return None;
        }

        let mut func = Node::new(NodeKind::FuncDef {
            name,
            return_type: TypeSpec::Int,
        });
        if let Some(body) = self.block() {
            func.push_child(body);
        }
        Some(func)
    }

    /// block := '{' blockItemList? '}'
    fn block(&mut self) -> Option<Node> {
        if !self.accept(TokenKind::LeftBrace) {
            self.error("missing '{' in function definition");
            return None;
        }

        let mut block = Node::new(NodeKind::Block);
        if self.accept(TokenKind::RightBrace) {
            return Some(block);
        }

        self.block_item_list(&mut block);

        if !self.accept(TokenKind::RightBrace) {
            self.error("missing '}' at end of block");
        }
        Some(block)
    }

    /// blockItemList := blockItem+
    fn block_item_list(&mut self, block: &mut Node) {
        loop {
            if self.at(TokenKind::RightBrace) {
                break;
            }
            match self.block_item() {
                Some(item) => block.push_child(item),
                None => break,
            }
        }
    }

    /// blockItem := statement
    fn block_item(&mut self) -> Option<Node> {
        self.statement()
    }

    /// statement := returnStatement | localVarDecl | assignExprStmt
    fn statement(&mut self) -> Option<Node> {
        match self.current_kind() {
            TokenKind::Return => self.return_statement(),
            TokenKind::Int => self.local_var_decl(),
            // FIRST(assignExprStmt) = FIRST(expr) = { INT_CONST }
            TokenKind::IntConst(_) => {
                let stmt = self.assign_expr_stmt();
                if !self.accept(TokenKind::Semicolon) {
                    self.error("missing ';' after expression statement");
                }
                stmt
            }
            _ => None,
        }
    }

    /// returnStatement := 'return' expr ';'
    fn return_statement(&mut self) -> Option<Node> {
        if !self.accept(TokenKind::Return) {
            return None;
        }

        let mut stmt = Node::new(NodeKind::Return);
        if let Some(value) = self.expr() {
            stmt.push_child(value);
        }

        if !self.accept(TokenKind::Semicolon) {
            self.error("missing ';' after return statement");
        }
        Some(stmt)
    }

    /// localVarDecl := 'int' ID varDeclList
    fn local_var_decl(&mut self) -> Option<Node> {
        if !self.accept(TokenKind::Int) {
            return None;
        }

        let Some(name) = self.accept_identifier() else {
            self.error("expected identifier after type");
            return None;
        };

        let mut decl = Node::new(NodeKind::VarDeclStmt { ty: TypeSpec::Int });
        decl.push_child(Node::new(NodeKind::DeclVar { name }));
        self.var_decl_list(&mut decl);
        Some(decl)
    }

    /// varDeclList := ',' ID varDeclList | ';'
    ///
    /// On an unrecognized token this rule reports, skips that one token and
    /// retries, so later declarators on the same line are still collected.
    fn var_decl_list(&mut self, decl: &mut Node) {
        if self.accept(TokenKind::Comma) {
            match self.accept_identifier() {
                Some(name) => {
                    decl.push_child(Node::new(NodeKind::DeclVar { name }));
                    self.var_decl_list(decl);
                }
                None => self.error("expected identifier after ','"),
            }
        } else if self.accept(TokenKind::Semicolon) {
            // Declaration list complete.
        } else {
            self.error("unexpected token in variable declaration");
            // End-of-input must never be skipped or recovery would not
            // terminate.
            if self.at(TokenKind::EndOfFile) {
                return;
            }
            self.advance();
            self.var_decl_list(decl);
        }
    }

    /// assignExprStmt := expr ( '=' expr )?
    fn assign_expr_stmt(&mut self) -> Option<Node> {
        let left = self.expr();
        self.assign_expr_stmt_tail(left)
    }

    fn assign_expr_stmt_tail(&mut self, left: Option<Node>) -> Option<Node> {
        if !self.accept(TokenKind::Assign) {
            // Follow set: a plain expression statement.
            return left;
        }

        let Some(left) = left else {
            self.error("left side of assignment is empty");
            return None;
        };

        let mut assign = Node::new(NodeKind::Assign);
        assign.push_child(left);
        if let Some(right) = self.expr() {
            assign.push_child(right);
        }
        Some(assign)
    }

    /// expr := INT_CONST
    fn expr(&mut self) -> Option<Node> {
        if let TokenKind::IntConst(value) = self.current_kind() {
            self.advance();
            return Some(Node::new(NodeKind::IntLiteral(value)));
        }
        None
    }
}
