mod runner;

use diagnostic::DiagnosticEngine;
use runner::Runner;

fn main() {
  let args: Vec<String> = std::env::args().skip(1).collect();

  let print_ast = args.iter().any(|arg| arg == "--print-ast");
  let pretty = args.iter().any(|arg| arg == "--pretty");
  let positional: Vec<&String> = args
    .iter()
    .filter(|arg| *arg != "--print-ast" && *arg != "--pretty")
    .collect();

  let mut engine = DiagnosticEngine::new();
  let mut runner = Runner::new(print_ast, pretty);

  match positional.len() {
    0 => runner.run_interactive_mode(&mut engine),
    1 => runner.run_file(positional[0], &mut engine),
    _ => {
      eprintln!("Usage: lox [--print-ast] [--pretty] [script]");
      std::process::exit(64);
    },
  }
}
