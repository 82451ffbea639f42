use diagnostic::{
  diagnostic::{Diagnostic, Label, Span},
  diagnostic_code::DiagnosticCode,
  DiagnosticEngine,
};

pub mod token;

use token::{Literal, Token, TokenKind};

/// Converts a source string into a token stream. Never fails fatally: every
/// lexical problem is reported through the `DiagnosticEngine` and the
/// offending character (or run of characters) is skipped so scanning can
/// keep collecting later errors.
pub struct Scanner {
  source: Vec<char>,
  start: usize,
  current: usize,
  line: usize,
  file: String,
}

impl Scanner {
  pub fn new(source: impl Into<String>) -> Self {
    Self::with_file(source, "input")
  }

  pub fn with_file(source: impl Into<String>, file: impl Into<String>) -> Self {
    Self {
      source: source.into().chars().collect(),
      start: 0,
      current: 0,
      line: 1,
      file: file.into(),
    }
  }

  /// Scans the whole source and returns the resulting tokens, always ending
  /// with exactly one `Eof` token.
  pub fn scan_tokens(&mut self, engine: &mut DiagnosticEngine) -> Vec<Token> {
    let mut tokens = Vec::new();

    while !self.is_at_end() {
      self.start = self.current;
      if let Some(token) = self.scan_token(engine) {
        tokens.push(token);
      }
    }

    tokens.push(Token::new(TokenKind::Eof, "", Literal::None, self.line));
    tokens
  }

  fn scan_token(&mut self, engine: &mut DiagnosticEngine) -> Option<Token> {
    let c = self.advance();

    let kind = match c {
      '(' => Some(TokenKind::LeftParen),
      ')' => Some(TokenKind::RightParen),
      '{' => Some(TokenKind::LeftBrace),
      '}' => Some(TokenKind::RightBrace),
      ',' => Some(TokenKind::Comma),
      '.' => Some(TokenKind::Dot),
      '-' => Some(TokenKind::Minus),
      '+' => Some(TokenKind::Plus),
      ';' => Some(TokenKind::Semicolon),
      '*' => Some(TokenKind::Star),

      '!' => Some(self.two_char('=', TokenKind::BangEqual, TokenKind::Bang)),
      '=' => Some(self.two_char('=', TokenKind::EqualEqual, TokenKind::Equal)),
      '<' => Some(self.two_char('=', TokenKind::LessEqual, TokenKind::Less)),
      '>' => Some(self.two_char('=', TokenKind::GreaterEqual, TokenKind::Greater)),

      '/' => return self.slash_or_comment(engine),

      ' ' | '\r' | '\t' => None,
      '\n' => {
        self.line += 1;
        None
      },

      '"' => return self.string(engine),

      d if d.is_ascii_digit() => return Some(self.number()),
      a if is_alpha(a) => return Some(self.identifier()),

      other => {
        self.emit(
          engine,
          DiagnosticCode::UnexpectedCharacter,
          "Unexpected character.".to_string(),
          self.span(1),
        );
        let _ = other;
        None
      },
    };

    kind.map(|k| self.make_token(k))
  }

  /// Consumes `expected` if it's next, returning `matched`; otherwise
  /// returns `unmatched` without consuming anything further.
  fn two_char(&mut self, expected: char, matched: TokenKind, unmatched: TokenKind) -> TokenKind {
    if self.match_char(expected) {
      matched
    } else {
      unmatched
    }
  }

  fn slash_or_comment(&mut self, engine: &mut DiagnosticEngine) -> Option<Token> {
    if self.match_char('/') {
      while self.peek() != Some('\n') && !self.is_at_end() {
        self.advance();
      }
      None
    } else if self.match_char('*') {
      self.block_comment(engine);
      None
    } else {
      Some(self.make_token(TokenKind::Slash))
    }
  }

  /// Consumes up to and including the two-character sequence `*/`,
  /// tracking newlines along the way. Reports an unterminated-comment
  /// error if EOF is reached first.
  fn block_comment(&mut self, engine: &mut DiagnosticEngine) {
    loop {
      if self.is_at_end() {
        self.emit(
          engine,
          DiagnosticCode::UnterminatedComment,
          "Unterminated comment.".to_string(),
          self.span(0),
        );
        return;
      }

      if self.peek() == Some('*') && self.peek_at(1) == Some('/') {
        self.advance();
        self.advance();
        return;
      }

      if self.advance() == '\n' {
        self.line += 1;
      }
    }
  }

  fn string(&mut self, engine: &mut DiagnosticEngine) -> Option<Token> {
    while self.peek() != Some('"') && !self.is_at_end() {
      if self.peek() == Some('\n') {
        self.line += 1;
      }
      self.advance();
    }

    if self.is_at_end() {
      self.emit(
        engine,
        DiagnosticCode::UnterminatedString,
        "Unterminated string.".to_string(),
        self.span(self.current - self.start),
      );
      return None;
    }

    // Consume the closing quote.
    self.advance();

    let value: String = self.source[self.start + 1..self.current - 1].iter().collect();
    Some(self.make_token_with(TokenKind::String, Literal::Text(value)))
  }

  fn number(&mut self) -> Token {
    while self.peek().is_some_and(|c| c.is_ascii_digit()) {
      self.advance();
    }

    if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
      self.advance();
      while self.peek().is_some_and(|c| c.is_ascii_digit()) {
        self.advance();
      }
    }

    let lexeme = self.lexeme();
    let value: f64 = lexeme.parse().unwrap_or(0.0);
    self.make_token_with(TokenKind::Number, Literal::Number(value))
  }

  fn identifier(&mut self) -> Token {
    while self.peek().is_some_and(is_alphanumeric) {
      self.advance();
    }

    let lexeme = self.lexeme();
    let kind = TokenKind::keyword(&lexeme).unwrap_or(TokenKind::Identifier);
    self.make_token(kind)
  }

  fn make_token(&self, kind: TokenKind) -> Token {
    Token::new(kind, self.lexeme(), Literal::None, self.line)
  }

  fn make_token_with(&self, kind: TokenKind, literal: Literal) -> Token {
    Token::new(kind, self.lexeme(), literal, self.line)
  }

  fn lexeme(&self) -> String {
    self.source[self.start..self.current].iter().collect()
  }

  fn emit(&self, engine: &mut DiagnosticEngine, code: DiagnosticCode, message: String, span: Span) {
    let diagnostic = Diagnostic::new(code, self.line, message).with_label(Label::primary(span, None));
    engine.emit(diagnostic);
  }

  fn span(&self, length: usize) -> Span {
    Span {
      file: self.file.clone(),
      line: self.line,
      column: self.start,
      length: length.max(1),
    }
  }

  fn is_at_end(&self) -> bool {
    self.current >= self.source.len()
  }

  fn advance(&mut self) -> char {
    let c = self.source[self.current];
    self.current += 1;
    c
  }

  fn match_char(&mut self, expected: char) -> bool {
    if self.is_at_end() || self.source[self.current] != expected {
      return false;
    }
    self.current += 1;
    true
  }

  fn peek(&self) -> Option<char> {
    self.source.get(self.current).copied()
  }

  fn peek_at(&self, offset: usize) -> Option<char> {
    self.source.get(self.current + offset).copied()
  }
}

fn is_alpha(c: char) -> bool {
  c.is_ascii_alphabetic() || c == '_'
}

fn is_alphanumeric(c: char) -> bool {
  is_alpha(c) || c.is_ascii_digit()
}
