/// Severity level of a diagnostic. Every `DiagnosticCode` the scanner,
/// parser, and evaluator raise is an error; there is no warning-producing
/// diagnostic in this language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Error,
}

/// Unique identifier for each kind of diagnostic the scanner, parser, and
/// evaluator can raise. Distinct from the rendered message: the message is
/// what a user reads, the code is what a test would key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
  // Lexical
  UnexpectedCharacter,
  UnterminatedString,
  UnterminatedComment,

  // Syntactic
  ExpectedExpression,
  MissingClosingParen,
  MissingClosingBrace,
  MissingSemicolon,
  ExpectedIdentifier,
  InvalidAssignmentTarget,
  TooManyParameters,
  TooManyArguments,
  UnexpectedToken,

  // Runtime
  UndefinedVariable,
  TypeError,
  InvalidCallee,
  ArityMismatch,
}

impl DiagnosticCode {
  pub fn code(&self) -> &'static str {
    match self {
      Self::UnexpectedCharacter => "E0001",
      Self::UnterminatedString => "E0002",
      Self::UnterminatedComment => "E0003",
      Self::ExpectedExpression => "E0100",
      Self::MissingClosingParen => "E0101",
      Self::MissingClosingBrace => "E0102",
      Self::MissingSemicolon => "E0103",
      Self::ExpectedIdentifier => "E0104",
      Self::InvalidAssignmentTarget => "E0105",
      Self::TooManyParameters => "E0106",
      Self::TooManyArguments => "E0107",
      Self::UnexpectedToken => "E0108",
      Self::UndefinedVariable => "E0200",
      Self::TypeError => "E0201",
      Self::InvalidCallee => "E0202",
      Self::ArityMismatch => "E0203",
    }
  }

  pub fn severity(&self) -> Severity {
    Severity::Error
  }
}
