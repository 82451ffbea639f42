use std::{
  fs,
  io::{self, Write},
};

use diagnostic::DiagnosticEngine;
use interpreter::Interpreter;
use logger::{LogType, Logger};
use parser::{ast_printer, Parser};
use scanner::Scanner;

/// Owns the single evaluator instance that persists across REPL lines and
/// runs the scan -> parse -> evaluate pipeline for both REPL and file mode.
pub struct Runner {
  print_ast: bool,
  /// When set, errors are rendered with `DiagnosticEngine::print_all`'s
  /// rustc-style span underlining instead of the canonical one-line form.
  pretty: bool,
}

impl Runner {
  pub fn new(print_ast: bool, pretty: bool) -> Self {
    Self { print_ast, pretty }
  }

  fn report(&self, source: &str, engine: &DiagnosticEngine) {
    if self.pretty {
      engine.print_all(source);
    } else {
      engine.print_lines();
    }
  }

  /// Prompt is `">> "`. A line not ending in `;` gets one appended before
  /// scanning. Reading EOF on stdin ends the loop.
  pub fn run_interactive_mode(&mut self, engine: &mut DiagnosticEngine) {
    Logger::log(LogType::Info("Lox REPL — Ctrl+D to exit"));

    let mut interpreter = Interpreter::new();

    loop {
      engine.clear();
      print!(">> ");
      let _ = io::stdout().flush();

      let mut line = String::new();
      let bytes_read = io::stdin().read_line(&mut line).unwrap_or(0);
      if bytes_read == 0 {
        println!();
        break;
      }

      let mut source = line.trim_end().to_string();
      if !source.trim_end().ends_with(';') {
        source.push(';');
      }

      self.execute(&source, &mut interpreter, engine);
    }
  }

  /// Reads `path` as UTF-8 and runs it once. Exits the process with 65 on a
  /// scan/parse error or 70 on a runtime error; returns normally on success.
  pub fn run_file(&mut self, path: &str, engine: &mut DiagnosticEngine) {
    let source = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(err) => {
        eprintln!("could not read file '{}': {}", path, err);
        std::process::exit(66);
      },
    };

    let mut interpreter = Interpreter::new();
    if !self.scan_and_parse(&source, &mut interpreter, engine) {
      self.report(&source, engine);
      std::process::exit(65);
    }

    if engine.has_errors() {
      self.report(&source, engine);
      std::process::exit(70);
    }
  }

  /// Runs one REPL line: errors are reported but do not end the process.
  fn execute(&mut self, source: &str, interpreter: &mut Interpreter, engine: &mut DiagnosticEngine) {
    self.scan_and_parse(source, interpreter, engine);
    if engine.has_errors() {
      self.report(source, engine);
    }
  }

  /// Scans, parses, and (if both succeeded) evaluates `source` with
  /// `interpreter`. Returns `false` if scanning or parsing produced a
  /// diagnostic, in which case nothing was evaluated.
  fn scan_and_parse(&mut self, source: &str, interpreter: &mut Interpreter, engine: &mut DiagnosticEngine) -> bool {
    let mut scanner = Scanner::new(source.to_string());
    let tokens = scanner.scan_tokens(engine);
    if engine.has_errors() {
      return false;
    }

    let mut parser = Parser::new(tokens);
    let statements = parser.parse(engine);
    if engine.has_errors() {
      return false;
    }

    if self.print_ast {
      println!("{}", ast_printer::print_program(&statements));
    }

    interpreter.run(&statements, engine);
    true
  }
}
