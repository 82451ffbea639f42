use crate::diagnostic_code::{DiagnosticCode, Severity};

/// Represents a source code location
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
  pub file: String,
  pub line: usize,
  pub column: usize,
  pub length: usize,
}

/// Label for underlining specific parts of code. Every diagnostic this
/// language raises points at exactly one span, so there is no secondary
/// style to distinguish it from.
#[derive(Debug, Clone)]
pub struct Label {
  pub span: Span,
  pub message: Option<String>,
}

impl Label {
  pub fn primary(span: Span, message: Option<String>) -> Self {
    Self { span, message }
  }
}

/// The `<where>` clause of the canonical `[line N] Error<where>: <message>`
/// rendering. Lexical and runtime diagnostics never carry one; only the
/// parser distinguishes "at end of input" from "at a specific lexeme".
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
  None,
  AtEnd,
  AtLexeme(String),
}

impl std::fmt::Display for Where {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Where::None => Ok(()),
      Where::AtEnd => write!(f, " at end"),
      Where::AtLexeme(lexeme) => write!(f, " at '{}'", lexeme),
    }
  }
}

/// A single diagnostic message.
///
/// `line` and `where_` drive the canonical single-line rendering
/// (`[line N] Error<where>: <message>`); `labels`/`help` drive the richer
/// span-underlined rendering produced for interactive use.
#[derive(Debug, Clone)]
pub struct Diagnostic {
  pub code: DiagnosticCode,
  pub severity: Severity,
  pub message: String,
  pub line: usize,
  pub where_: Where,
  pub labels: Vec<Label>,
  pub help: Option<String>,
}

impl Diagnostic {
  pub fn new(code: DiagnosticCode, line: usize, message: String) -> Self {
    Self {
      severity: code.severity(),
      code,
      message,
      line,
      where_: Where::None,
      labels: Vec::new(),
      help: None,
    }
  }

  pub fn at_end(mut self) -> Self {
    self.where_ = Where::AtEnd;
    self
  }

  pub fn at_lexeme(mut self, lexeme: impl Into<String>) -> Self {
    self.where_ = Where::AtLexeme(lexeme.into());
    self
  }

  pub fn with_label(mut self, label: Label) -> Self {
    self.labels.push(label);
    self
  }

  pub fn with_help(mut self, help: String) -> Self {
    self.help = Some(help);
    self
  }

  /// The machine-checkable rendering required by the interpreter's
  /// diagnostic contract: `[line N] Error<where>: <message>`.
  pub fn format_line(&self) -> String {
    format!("[line {}] Error{}: {}", self.line, self.where_, self.message)
  }
}
