//! A pure consumer of the parse tree: turns a statement list back into Lox
//! source text. Used behind the `--print-ast` CLI flag and by the
//! round-trip property test (`print(parse(src))` parses back to an
//! equivalent tree on the grammar subset that excludes `for`, which the
//! parser already desugars away).

use crate::{
  expr::{Expr, Literal},
  stmt::Stmt,
};

pub fn print_program(statements: &[Stmt]) -> String {
  statements.iter().map(print_stmt).collect::<Vec<_>>().join("\n")
}

pub fn print_stmt(stmt: &Stmt) -> String {
  match stmt {
    Stmt::Expression(expr) => format!("{};", print_expr(expr)),
    Stmt::Put(expr) => format!("put {};", print_expr(expr)),
    Stmt::Var(name, Some(init)) => format!("var {} = {};", name.lexeme, print_expr(init)),
    Stmt::Var(name, None) => format!("var {};", name.lexeme),
    Stmt::Block(stmts) => format!("{{\n{}\n}}", indent(&print_program(stmts))),
    Stmt::If(cond, then_branch, None) => {
      format!("if ({}) {}", print_expr(cond), print_stmt(then_branch))
    },
    Stmt::If(cond, then_branch, Some(else_branch)) => format!(
      "if ({}) {} else {}",
      print_expr(cond),
      print_stmt(then_branch),
      print_stmt(else_branch)
    ),
    Stmt::While(cond, body) => format!("while ({}) {}", print_expr(cond), print_stmt(body)),
    Stmt::Function(decl) => {
      let params = decl.params.iter().map(|p| p.lexeme.clone()).collect::<Vec<_>>().join(", ");
      format!(
        "fun {}({}) {{\n{}\n}}",
        decl.name.lexeme,
        params,
        indent(&print_program(&decl.body))
      )
    },
    Stmt::Return(_, Some(value)) => format!("return {};", print_expr(value)),
    Stmt::Return(_, None) => "return;".to_string(),
  }
}

pub fn print_expr(expr: &Expr) -> String {
  match expr {
    Expr::Literal(Literal::Nil) => "nil".to_string(),
    Expr::Literal(Literal::Bool(b)) => b.to_string(),
    Expr::Literal(Literal::Number(n)) => format_number(*n),
    Expr::Literal(Literal::Text(s)) => format!("\"{}\"", s),
    Expr::Variable(name) => name.lexeme.clone(),
    Expr::Assign(name, value) => format!("{} = {}", name.lexeme, print_expr(value)),
    Expr::Unary(op, rhs) => format!("{}{}", op.lexeme, print_expr(rhs)),
    Expr::Binary(lhs, op, rhs) => format!("{} {} {}", print_expr(lhs), op.lexeme, print_expr(rhs)),
    Expr::Logical(lhs, op, rhs) => format!("{} {} {}", print_expr(lhs), op.lexeme, print_expr(rhs)),
    Expr::Grouping(inner) => format!("({})", print_expr(inner)),
    Expr::Call(callee, _, args) => {
      let args = args.iter().map(print_expr).collect::<Vec<_>>().join(", ");
      format!("{}({})", print_expr(callee), args)
    },
  }
}

fn format_number(n: f64) -> String {
  if n.fract() == 0.0 && n.is_finite() {
    format!("{}", n as i64)
  } else {
    format!("{}", n)
  }
}

fn indent(block: &str) -> String {
  block.lines().map(|line| format!("  {}", line)).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;
  use diagnostic::DiagnosticEngine;
  use scanner::Scanner;

  fn roundtrip(source: &str) -> bool {
    let mut engine = DiagnosticEngine::new();
    let tokens = Scanner::new(source).scan_tokens(&mut engine);
    let first = crate::Parser::new(tokens).parse(&mut engine);
    assert!(!engine.has_errors(), "source failed to parse: {source}");

    let printed = print_program(&first);

    let mut engine2 = DiagnosticEngine::new();
    let tokens2 = Scanner::new(&printed).scan_tokens(&mut engine2);
    let second = crate::Parser::new(tokens2).parse(&mut engine2);
    assert!(!engine2.has_errors(), "re-printed source failed to parse: {printed}");

    print_program(&first) == print_program(&second)
  }

  #[test]
  fn arithmetic_roundtrips() {
    assert!(roundtrip("var x = 1 + 2 * 3;"));
  }

  #[test]
  fn control_flow_roundtrips() {
    assert!(roundtrip("if (x < 10) { put x; } else { put 0; }"));
    assert!(roundtrip("while (x < 10) { x = x + 1; }"));
  }

  #[test]
  fn function_roundtrips() {
    assert!(roundtrip("fun add(a, b) {\n  return a + b;\n}"));
  }
}
