pub mod ast_printer;
pub mod expr;
pub mod stmt;

use std::rc::Rc;

use diagnostic::{diagnostic::Diagnostic, diagnostic_code::DiagnosticCode, DiagnosticEngine};
use scanner::token::{Literal as TokenLiteral, Token, TokenKind};

use crate::{
  expr::{Expr, Literal},
  stmt::{FunctionDecl, Stmt},
};

const MAX_PARAMS: usize = 255;

/// Signals that a parse error was already reported to the `DiagnosticEngine`
/// and the caller should unwind to the nearest recovery point
/// (`synchronize`) rather than keep building a tree from bad input.
struct ParseError;

/// Consumes a token sequence produced by the scanner and yields the list of
/// statements it parses to. Always returns whatever statements it could
/// build even if some declarations failed — the caller decides whether to
/// execute based on `engine.has_errors()`.
pub struct Parser {
  tokens: Vec<Token>,
  current: usize,
}

impl Parser {
  pub fn new(tokens: Vec<Token>) -> Self {
    Self { tokens, current: 0 }
  }

  pub fn parse(&mut self, engine: &mut DiagnosticEngine) -> Vec<Stmt> {
    let mut statements = Vec::new();
    while !self.is_at_end() {
      if let Some(stmt) = self.declaration(engine) {
        statements.push(stmt);
      }
    }
    statements
  }

  // ---- declarations ----

  fn declaration(&mut self, engine: &mut DiagnosticEngine) -> Option<Stmt> {
    let result = if self.check(TokenKind::Fun) {
      self.advance();
      self.function_decl(engine)
    } else if self.check(TokenKind::Var) {
      self.advance();
      self.var_decl(engine)
    } else {
      self.statement(engine)
    };

    match result {
      Ok(stmt) => Some(stmt),
      Err(ParseError) => {
        self.synchronize();
        None
      },
    }
  }

  fn function_decl(&mut self, engine: &mut DiagnosticEngine) -> Result<Stmt, ParseError> {
    let name = self.consume(TokenKind::Identifier, DiagnosticCode::ExpectedIdentifier, "Expect function name.", engine)?;
    self.consume(TokenKind::LeftParen, DiagnosticCode::MissingClosingParen, "Expect '(' after function name.", engine)?;

    let mut params = Vec::new();
    if !self.check(TokenKind::RightParen) {
      loop {
        if params.len() >= MAX_PARAMS {
          self.error(DiagnosticCode::TooManyParameters, "Can't have more than 255 parameters.", engine);
        }
        let param = self.consume(TokenKind::Identifier, DiagnosticCode::ExpectedIdentifier, "Expect parameter name.", engine)?;
        params.push(param);
        if !self.match_token(TokenKind::Comma) {
          break;
        }
      }
    }
    self.consume(TokenKind::RightParen, DiagnosticCode::MissingClosingParen, "Expect ')' after parameters.", engine)?;
    self.consume(TokenKind::LeftBrace, DiagnosticCode::MissingClosingBrace, "Expect '{' before function body.", engine)?;
    let body = self.block(engine)?;

    Ok(Stmt::Function(Rc::new(FunctionDecl { name, params, body })))
  }

  fn var_decl(&mut self, engine: &mut DiagnosticEngine) -> Result<Stmt, ParseError> {
    let name = self.consume(TokenKind::Identifier, DiagnosticCode::ExpectedIdentifier, "Expect variable name.", engine)?;

    let initializer = if self.match_token(TokenKind::Equal) {
      Some(self.expression(engine)?)
    } else {
      None
    };

    self.consume(TokenKind::Semicolon, DiagnosticCode::MissingSemicolon, "Expect ';' after variable declaration.", engine)?;
    Ok(Stmt::Var(name, initializer))
  }

  // ---- statements ----

  fn statement(&mut self, engine: &mut DiagnosticEngine) -> Result<Stmt, ParseError> {
    if self.match_token(TokenKind::For) {
      return self.for_statement(engine);
    }
    if self.match_token(TokenKind::If) {
      return self.if_statement(engine);
    }
    if self.match_token(TokenKind::Put) {
      return self.put_statement(engine);
    }
    if self.match_token(TokenKind::Return) {
      return self.return_statement(engine);
    }
    if self.match_token(TokenKind::While) {
      return self.while_statement(engine);
    }
    if self.match_token(TokenKind::LeftBrace) {
      return Ok(Stmt::Block(self.block(engine)?));
    }
    self.expr_statement(engine)
  }

  /// Desugars `for (init; cond; inc) body` into
  /// `{ init; while (cond) { body; inc; } }`. There is no `For` AST node.
  fn for_statement(&mut self, engine: &mut DiagnosticEngine) -> Result<Stmt, ParseError> {
    self.consume(TokenKind::LeftParen, DiagnosticCode::MissingClosingParen, "Expect '(' after 'for'.", engine)?;

    let initializer = if self.match_token(TokenKind::Semicolon) {
      None
    } else if self.check(TokenKind::Var) {
      self.advance();
      Some(self.var_decl(engine)?)
    } else {
      Some(self.expr_statement(engine)?)
    };

    let condition = if self.check(TokenKind::Semicolon) {
      Expr::Literal(Literal::Bool(true))
    } else {
      self.expression(engine)?
    };
    self.consume(TokenKind::Semicolon, DiagnosticCode::MissingSemicolon, "Expect ';' after loop condition.", engine)?;

    let increment = if self.check(TokenKind::RightParen) {
      None
    } else {
      Some(self.expression(engine)?)
    };
    self.consume(TokenKind::RightParen, DiagnosticCode::MissingClosingParen, "Expect ')' after for clauses.", engine)?;

    let mut body = self.statement(engine)?;

    if let Some(increment) = increment {
      body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
    }
    body = Stmt::While(condition, Box::new(body));

    if let Some(initializer) = initializer {
      body = Stmt::Block(vec![initializer, body]);
    }

    Ok(body)
  }

  fn if_statement(&mut self, engine: &mut DiagnosticEngine) -> Result<Stmt, ParseError> {
    self.consume(TokenKind::LeftParen, DiagnosticCode::MissingClosingParen, "Expect '(' after 'if'.", engine)?;
    let condition = self.expression(engine)?;
    self.consume(TokenKind::RightParen, DiagnosticCode::MissingClosingParen, "Expect ')' after if condition.", engine)?;

    let then_branch = Box::new(self.statement(engine)?);
    let else_branch = if self.match_token(TokenKind::Else) {
      Some(Box::new(self.statement(engine)?))
    } else {
      None
    };

    Ok(Stmt::If(condition, then_branch, else_branch))
  }

  fn put_statement(&mut self, engine: &mut DiagnosticEngine) -> Result<Stmt, ParseError> {
    let value = self.expression(engine)?;
    self.consume(TokenKind::Semicolon, DiagnosticCode::MissingSemicolon, "Expect ';' after value.", engine)?;
    Ok(Stmt::Put(value))
  }

  fn return_statement(&mut self, engine: &mut DiagnosticEngine) -> Result<Stmt, ParseError> {
    let keyword = self.previous().clone();
    let value = if self.check(TokenKind::Semicolon) {
      None
    } else {
      Some(self.expression(engine)?)
    };
    self.consume(TokenKind::Semicolon, DiagnosticCode::MissingSemicolon, "Expect ';' after return value.", engine)?;
    Ok(Stmt::Return(keyword, value))
  }

  fn while_statement(&mut self, engine: &mut DiagnosticEngine) -> Result<Stmt, ParseError> {
    self.consume(TokenKind::LeftParen, DiagnosticCode::MissingClosingParen, "Expect '(' after 'while'.", engine)?;
    let condition = self.expression(engine)?;
    self.consume(TokenKind::RightParen, DiagnosticCode::MissingClosingParen, "Expect ')' after condition.", engine)?;
    let body = Box::new(self.statement(engine)?);
    Ok(Stmt::While(condition, body))
  }

  fn block(&mut self, engine: &mut DiagnosticEngine) -> Result<Vec<Stmt>, ParseError> {
    let mut statements = Vec::new();
    while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
      if let Some(stmt) = self.declaration(engine) {
        statements.push(stmt);
      }
    }
    self.consume(TokenKind::RightBrace, DiagnosticCode::MissingClosingBrace, "Expect '}' after block.", engine)?;
    Ok(statements)
  }

  fn expr_statement(&mut self, engine: &mut DiagnosticEngine) -> Result<Stmt, ParseError> {
    let expr = self.expression(engine)?;
    self.consume(TokenKind::Semicolon, DiagnosticCode::MissingSemicolon, "Expect ';' after expression.", engine)?;
    Ok(Stmt::Expression(expr))
  }

  // ---- expressions ----

  fn expression(&mut self, engine: &mut DiagnosticEngine) -> Result<Expr, ParseError> {
    self.assignment(engine)
  }

  fn assignment(&mut self, engine: &mut DiagnosticEngine) -> Result<Expr, ParseError> {
    let expr = self.or(engine)?;

    if self.check(TokenKind::Equal) {
      let equals = self.advance().clone();
      let value = self.assignment(engine)?;

      return match expr {
        Expr::Variable(name) => Ok(Expr::Assign(name, Box::new(value))),
        _ => {
          self.error_at(DiagnosticCode::InvalidAssignmentTarget, "Invalid assignment target.", &equals, engine);
          Ok(expr)
        },
      };
    }

    Ok(expr)
  }

  fn or(&mut self, engine: &mut DiagnosticEngine) -> Result<Expr, ParseError> {
    let mut expr = self.and(engine)?;
    while self.check(TokenKind::Or) {
      let op = self.advance().clone();
      let rhs = self.and(engine)?;
      expr = Expr::Logical(Box::new(expr), op, Box::new(rhs));
    }
    Ok(expr)
  }

  fn and(&mut self, engine: &mut DiagnosticEngine) -> Result<Expr, ParseError> {
    let mut expr = self.equality(engine)?;
    while self.check(TokenKind::And) {
      let op = self.advance().clone();
      let rhs = self.equality(engine)?;
      expr = Expr::Logical(Box::new(expr), op, Box::new(rhs));
    }
    Ok(expr)
  }

  fn equality(&mut self, engine: &mut DiagnosticEngine) -> Result<Expr, ParseError> {
    let mut expr = self.comparison(engine)?;
    while self.match_any(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
      let op = self.previous().clone();
      let rhs = self.comparison(engine)?;
      expr = Expr::Binary(Box::new(expr), op, Box::new(rhs));
    }
    Ok(expr)
  }

  fn comparison(&mut self, engine: &mut DiagnosticEngine) -> Result<Expr, ParseError> {
    let mut expr = self.term(engine)?;
    while self.match_any(&[
      TokenKind::Greater,
      TokenKind::GreaterEqual,
      TokenKind::Less,
      TokenKind::LessEqual,
    ]) {
      let op = self.previous().clone();
      let rhs = self.term(engine)?;
      expr = Expr::Binary(Box::new(expr), op, Box::new(rhs));
    }
    Ok(expr)
  }

  fn term(&mut self, engine: &mut DiagnosticEngine) -> Result<Expr, ParseError> {
    let mut expr = self.factor(engine)?;
    while self.match_any(&[TokenKind::Minus, TokenKind::Plus]) {
      let op = self.previous().clone();
      let rhs = self.factor(engine)?;
      expr = Expr::Binary(Box::new(expr), op, Box::new(rhs));
    }
    Ok(expr)
  }

  fn factor(&mut self, engine: &mut DiagnosticEngine) -> Result<Expr, ParseError> {
    let mut expr = self.unary(engine)?;
    while self.match_any(&[TokenKind::Slash, TokenKind::Star]) {
      let op = self.previous().clone();
      let rhs = self.unary(engine)?;
      expr = Expr::Binary(Box::new(expr), op, Box::new(rhs));
    }
    Ok(expr)
  }

  fn unary(&mut self, engine: &mut DiagnosticEngine) -> Result<Expr, ParseError> {
    if self.match_any(&[TokenKind::Bang, TokenKind::Minus]) {
      let op = self.previous().clone();
      let rhs = self.unary(engine)?;
      return Ok(Expr::Unary(op, Box::new(rhs)));
    }
    self.call(engine)
  }

  fn call(&mut self, engine: &mut DiagnosticEngine) -> Result<Expr, ParseError> {
    let mut expr = self.primary(engine)?;

    loop {
      if self.match_token(TokenKind::LeftParen) {
        expr = self.finish_call(expr, engine)?;
      } else {
        break;
      }
    }

    Ok(expr)
  }

  fn finish_call(&mut self, callee: Expr, engine: &mut DiagnosticEngine) -> Result<Expr, ParseError> {
    let mut arguments = Vec::new();
    if !self.check(TokenKind::RightParen) {
      loop {
        if arguments.len() >= MAX_PARAMS {
          self.error(DiagnosticCode::TooManyArguments, "Can't have more than 255 arguments.", engine);
        }
        arguments.push(self.expression(engine)?);
        if !self.match_token(TokenKind::Comma) {
          break;
        }
      }
    }
    let paren = self.consume(TokenKind::RightParen, DiagnosticCode::MissingClosingParen, "Expect ')' after arguments.", engine)?;
    Ok(Expr::Call(Box::new(callee), paren, arguments))
  }

  fn primary(&mut self, engine: &mut DiagnosticEngine) -> Result<Expr, ParseError> {
    if self.match_token(TokenKind::False) {
      return Ok(Expr::Literal(Literal::Bool(false)));
    }
    if self.match_token(TokenKind::True) {
      return Ok(Expr::Literal(Literal::Bool(true)));
    }
    if self.match_token(TokenKind::Nil) {
      return Ok(Expr::Literal(Literal::Nil));
    }
    if self.check(TokenKind::Number) {
      let token = self.advance().clone();
      let value = match token.literal {
        TokenLiteral::Number(n) => n,
        _ => 0.0,
      };
      return Ok(Expr::Literal(Literal::Number(value)));
    }
    if self.check(TokenKind::String) {
      let token = self.advance().clone();
      let value = match token.literal {
        TokenLiteral::Text(s) => s,
        _ => String::new(),
      };
      return Ok(Expr::Literal(Literal::Text(value)));
    }
    if self.check(TokenKind::Identifier) {
      return Ok(Expr::Variable(self.advance().clone()));
    }
    if self.match_token(TokenKind::LeftParen) {
      let expr = self.expression(engine)?;
      self.consume(TokenKind::RightParen, DiagnosticCode::MissingClosingParen, "Expect ')' after expression.", engine)?;
      return Ok(Expr::Grouping(Box::new(expr)));
    }

    Err(self.error(DiagnosticCode::ExpectedExpression, "Expect expression.", engine))
  }

  // ---- token stream plumbing ----

  fn match_token(&mut self, kind: TokenKind) -> bool {
    if self.check(kind) {
      self.advance();
      true
    } else {
      false
    }
  }

  fn match_any(&mut self, kinds: &[TokenKind]) -> bool {
    for &kind in kinds {
      if self.check(kind) {
        self.advance();
        return true;
      }
    }
    false
  }

  fn check(&self, kind: TokenKind) -> bool {
    self.peek().kind == kind
  }

  fn advance(&mut self) -> &Token {
    if !self.is_at_end() {
      self.current += 1;
    }
    self.previous()
  }

  fn is_at_end(&self) -> bool {
    self.peek().kind == TokenKind::Eof
  }

  fn peek(&self) -> &Token {
    &self.tokens[self.current]
  }

  fn previous(&self) -> &Token {
    &self.tokens[self.current - 1]
  }

  fn consume(
    &mut self,
    kind: TokenKind,
    code: DiagnosticCode,
    message: &str,
    engine: &mut DiagnosticEngine,
  ) -> Result<Token, ParseError> {
    if self.check(kind) {
      return Ok(self.advance().clone());
    }
    Err(self.error(code, message, engine))
  }

  fn error(&self, code: DiagnosticCode, message: &str, engine: &mut DiagnosticEngine) -> ParseError {
    let token = self.peek().clone();
    self.error_at(code, message, &token, engine)
  }

  fn error_at(&self, code: DiagnosticCode, message: &str, token: &Token, engine: &mut DiagnosticEngine) -> ParseError {
    let mut diagnostic = Diagnostic::new(code, token.line, message.to_string());
    diagnostic = if token.kind == TokenKind::Eof {
      diagnostic.at_end()
    } else {
      diagnostic.at_lexeme(token.lexeme.clone())
    };
    engine.emit(diagnostic);
    ParseError
  }

  /// Discards tokens until after the next `;` or the next token that begins
  /// a statement, so later declarations can still be parsed and checked
  /// after a syntax error.
  fn synchronize(&mut self) {
    self.advance();

    while !self.is_at_end() {
      if self.previous().kind == TokenKind::Semicolon {
        return;
      }

      match self.peek().kind {
        TokenKind::Class
        | TokenKind::Fun
        | TokenKind::Var
        | TokenKind::For
        | TokenKind::If
        | TokenKind::While
        | TokenKind::Put
        | TokenKind::Return => return,
        _ => {
          self.advance();
        },
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use scanner::Scanner;

  fn parse(source: &str) -> (Vec<Stmt>, DiagnosticEngine) {
    let mut engine = DiagnosticEngine::new();
    let tokens = Scanner::new(source).scan_tokens(&mut engine);
    let stmts = Parser::new(tokens).parse(&mut engine);
    (stmts, engine)
  }

  #[test]
  fn parses_var_decl_with_initializer() {
    let (stmts, engine) = parse("var x = 1 + 2;");
    assert!(!engine.has_errors());
    assert_eq!(stmts.len(), 1);
    assert!(matches!(stmts[0], Stmt::Var(_, Some(_))));
  }

  #[test]
  fn for_loop_desugars_to_block_with_while() {
    let (stmts, engine) = parse("for (var i = 0; i < 3; i = i + 1) put i;");
    assert!(!engine.has_errors());
    assert_eq!(stmts.len(), 1);
    match &stmts[0] {
      Stmt::Block(inner) => {
        assert_eq!(inner.len(), 2);
        assert!(matches!(inner[0], Stmt::Var(..)));
        assert!(matches!(inner[1], Stmt::While(..)));
      },
      other => panic!("expected desugared block, got {:?}", other),
    }
  }

  #[test]
  fn invalid_assignment_target_reports_but_continues() {
    let (stmts, engine) = parse("1 = 2;");
    assert!(engine.has_errors());
    assert_eq!(stmts.len(), 1);
  }

  #[test]
  fn missing_semicolon_is_a_syntax_error() {
    let (_, engine) = parse("var x = 1");
    assert!(engine.has_errors());
  }

  #[test]
  fn reserved_unused_keyword_is_a_syntax_error() {
    let (_, engine) = parse("class Foo {}");
    assert!(engine.has_errors());
  }

  #[test]
  fn synchronize_lets_later_declarations_still_parse() {
    let (stmts, engine) = parse("var = ; var y = 2;");
    assert!(engine.has_errors());
    assert!(stmts.iter().any(|s| matches!(s, Stmt::Var(name, _) if name.lexeme == "y")));
  }

  #[test]
  fn function_with_params_and_return() {
    let (stmts, engine) = parse("fun add(a, b) { return a + b; }");
    assert!(!engine.has_errors());
    match &stmts[0] {
      Stmt::Function(decl) => {
        assert_eq!(decl.name.lexeme, "add");
        assert_eq!(decl.params.len(), 2);
      },
      other => panic!("expected function decl, got {:?}", other),
    }
  }
}
