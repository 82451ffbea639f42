pub mod diagnostic;
pub mod diagnostic_code;
pub mod formatter;

use colored::*;

use crate::{diagnostic::Diagnostic, formatter::DiagnosticFormatter};

/// Collector for all diagnostics during compilation
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
  diagnostics: Vec<Diagnostic>,
  error_count: usize,
}

impl DiagnosticEngine {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn emit(&mut self, diagnostic: Diagnostic) {
    self.error_count += 1;
    self.diagnostics.push(diagnostic);
  }

  pub fn has_errors(&self) -> bool {
    self.error_count > 0
  }

  pub fn error_count(&self) -> usize {
    self.error_count
  }

  /// Reset the engine so a REPL can reuse it across lines without past
  /// errors bleeding into the next prompt's error flags.
  pub fn clear(&mut self) {
    self.diagnostics.clear();
    self.error_count = 0;
  }

  /// Print the canonical `[line N] Error<where>: <message>` rendering of
  /// every diagnostic to stderr. This is the contract callers should depend
  /// on for exact wording; `print_all`/`format_all_plain` below are a richer
  /// opt-in rendering for interactive use.
  pub fn print_lines(&self) {
    for diagnostic in &self.diagnostics {
      eprintln!("{}", diagnostic.format_line());
    }
  }

  /// Print all diagnostics with colors to stdout
  pub fn print_all(&self, source_code: &str) {
    for diagnostic in &self.diagnostics {
      let formatter = DiagnosticFormatter::new(diagnostic, source_code);
      print!("{}", formatter.format());
    }

    self.print_summary();
  }

  /// Get all diagnostics as plain text (for file logging)
  pub fn format_all_plain(&self, source_code: &str) -> String {
    let mut output = String::new();

    for diagnostic in &self.diagnostics {
      let formatter = DiagnosticFormatter::new(diagnostic, source_code);
      output.push_str(&formatter.format_plain());
      output.push_str("\n");
    }

    output.push_str(&self.format_summary_plain());
    output
  }

  fn print_summary(&self) {
    if self.has_errors() {
      println!();
      println!(
        "{}: could not compile due to {} previous {}",
        "error".red().bold(),
        self.error_count.to_string().red().bold(),
        if self.error_count == 1 {
          "error"
        } else {
          "errors"
        },
      );
    }
  }

  fn format_summary_plain(&self) -> String {
    if self.has_errors() {
      format!(
        "error: could not compile due to {} previous {}",
        self.error_count,
        if self.error_count == 1 {
          "error"
        } else {
          "errors"
        },
      )
    } else {
      String::new()
    }
  }

  pub fn get_diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }
}
