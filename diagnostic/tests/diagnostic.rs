use diagnostic::{
  diagnostic::{Diagnostic, Label, Span},
  diagnostic_code::DiagnosticCode,
  DiagnosticEngine,
};

#[test]
fn rich_rendering_includes_span_and_help() {
  let source = "var b = \"unterminated";

  let mut engine = DiagnosticEngine::new();

  let error = Diagnostic::new(
    DiagnosticCode::UnterminatedString,
    1,
    "Unterminated string.".to_string(),
  )
  .with_label(Label::primary(
    Span {
      file: "input".to_string(),
      line: 1,
      column: 9,
      length: 13,
    },
    Some("string starts here".to_string()),
  ))
  .with_help("close the string with a matching quote".to_string());

  engine.emit(error);
  let rendered = engine.format_all_plain(source);
  assert!(rendered.contains("Unterminated string."));
  assert!(rendered.contains("help: close the string"));
}

#[test]
fn canonical_line_format_matches_contract() {
  let mut engine = DiagnosticEngine::new();
  engine.emit(Diagnostic::new(
    DiagnosticCode::UndefinedVariable,
    3,
    "Undefined variable 'x'.".to_string(),
  ));

  let mut lines = Vec::new();
  for d in engine.get_diagnostics() {
    lines.push(d.format_line());
  }
  assert_eq!(lines, vec!["[line 3] Error: Undefined variable 'x'.".to_string()]);
}

#[test]
fn syntax_where_clause_renders_lexeme_or_end() {
  let at_end = Diagnostic::new(DiagnosticCode::ExpectedExpression, 5, "Expect expression.".into()).at_end();
  assert_eq!(at_end.format_line(), "[line 5] Error at end: Expect expression.");

  let at_lexeme =
    Diagnostic::new(DiagnosticCode::MissingSemicolon, 5, "Expect ';' after value.".into())
      .at_lexeme("}");
  assert_eq!(
    at_lexeme.format_line(),
    "[line 5] Error at '}': Expect ';' after value."
  );
}

#[test]
fn clear_resets_error_state_between_repl_lines() {
  let mut engine = DiagnosticEngine::new();
  engine.emit(Diagnostic::new(
    DiagnosticCode::UnexpectedCharacter,
    1,
    "Unexpected character.".into(),
  ));
  assert!(engine.has_errors());

  engine.clear();
  assert!(!engine.has_errors());
  assert_eq!(engine.error_count(), 0);
}
