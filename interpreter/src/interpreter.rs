use std::{cell::RefCell, rc::Rc};

use diagnostic::{diagnostic::Diagnostic, diagnostic_code::DiagnosticCode, DiagnosticEngine};
use parser::{
  expr::{Expr, Literal},
  stmt::Stmt,
};
use scanner::token::{Token, TokenKind};

use crate::{callable::LoxFunction, environment::Environment, native, value::Value};

/// The outcome of executing a statement list: either it ran to completion
/// (`Normal`) or a `return` unwound out of it carrying a value (`Return`).
/// This stands in for the non-local unwind the textbook implementation
/// uses exceptions for — it never escapes `Interpreter::run`.
enum Flow {
  Normal,
  Return(Value),
}

/// Walks a statement list, maintaining a mutable "current environment"
/// pointer that starts out equal to `globals`.
pub struct Interpreter {
  globals: Rc<RefCell<Environment>>,
  environment: Rc<RefCell<Environment>>,
}

impl Interpreter {
  pub fn new() -> Self {
    let globals = Environment::new();
    native::register(&globals);
    Self {
      environment: Rc::clone(&globals),
      globals,
    }
  }

  /// Executes a program's statements in order. Stops at the first runtime
  /// error (already reported to `engine` by the failing operation) or at a
  /// top-level `return`, which simply terminates execution since there is
  /// no enclosing call frame to receive it.
  pub fn run(&mut self, statements: &[Stmt], engine: &mut DiagnosticEngine) {
    let _ = self.execute_statements(statements, engine);
  }

  /// Runs a function body in `call_frame` and returns its result: the
  /// value passed to `return`, or `nil` if the body runs to completion.
  pub(crate) fn call_function_body(
    &mut self,
    body: &[Stmt],
    call_frame: Rc<RefCell<Environment>>,
    engine: &mut DiagnosticEngine,
  ) -> Result<Value, ()> {
    let previous = Rc::clone(&self.environment);
    self.environment = call_frame;
    let result = self.execute_statements(body, engine);
    self.environment = previous;

    match result? {
      Flow::Return(value) => Ok(value),
      Flow::Normal => Ok(Value::Nil),
    }
  }

  fn execute_statements(&mut self, statements: &[Stmt], engine: &mut DiagnosticEngine) -> Result<Flow, ()> {
    for stmt in statements {
      match self.execute(stmt, engine)? {
        Flow::Return(value) => return Ok(Flow::Return(value)),
        Flow::Normal => {},
      }
    }
    Ok(Flow::Normal)
  }

  /// Pushes `block_env`, executes `statements` in it, then restores the
  /// prior environment pointer on every exit path, including when a
  /// runtime error or a `return` propagates out.
  fn execute_block(&mut self, statements: &[Stmt], block_env: Rc<RefCell<Environment>>, engine: &mut DiagnosticEngine) -> Result<Flow, ()> {
    let previous = Rc::clone(&self.environment);
    self.environment = block_env;
    let result = self.execute_statements(statements, engine);
    self.environment = previous;
    result
  }

  fn execute(&mut self, stmt: &Stmt, engine: &mut DiagnosticEngine) -> Result<Flow, ()> {
    match stmt {
      Stmt::Expression(expr) => {
        self.evaluate(expr, engine)?;
        Ok(Flow::Normal)
      },
      Stmt::Put(expr) => {
        let value = self.evaluate(expr, engine)?;
        println!("{}", value.stringify());
        Ok(Flow::Normal)
      },
      Stmt::Var(name, initializer) => {
        let value = match initializer {
          Some(expr) => self.evaluate(expr, engine)?,
          None => Value::Nil,
        };
        self.environment.borrow_mut().define(name.lexeme.clone(), value);
        Ok(Flow::Normal)
      },
      Stmt::Block(statements) => {
        let block_env = Environment::with_enclosing(Rc::clone(&self.environment));
        self.execute_block(statements, block_env, engine)
      },
      Stmt::If(condition, then_branch, else_branch) => {
        if self.evaluate(condition, engine)?.is_truthy() {
          self.execute(then_branch, engine)
        } else if let Some(else_branch) = else_branch {
          self.execute(else_branch, engine)
        } else {
          Ok(Flow::Normal)
        }
      },
      Stmt::While(condition, body) => {
        while self.evaluate(condition, engine)?.is_truthy() {
          match self.execute(body, engine)? {
            Flow::Return(value) => return Ok(Flow::Return(value)),
            Flow::Normal => {},
          }
        }
        Ok(Flow::Normal)
      },
      Stmt::Function(decl) => {
        let function = LoxFunction::new(Rc::clone(decl), Rc::clone(&self.globals));
        self
          .environment
          .borrow_mut()
          .define(decl.name.lexeme.clone(), Value::Callable(Rc::new(function)));
        Ok(Flow::Normal)
      },
      Stmt::Return(_, value) => {
        let value = match value {
          Some(expr) => self.evaluate(expr, engine)?,
          None => Value::Nil,
        };
        Ok(Flow::Return(value))
      },
    }
  }

  fn evaluate(&mut self, expr: &Expr, engine: &mut DiagnosticEngine) -> Result<Value, ()> {
    match expr {
      Expr::Literal(literal) => Ok(literal_value(literal)),
      Expr::Variable(name) => self.environment.borrow().get(name, engine),
      Expr::Assign(name, value_expr) => {
        let value = self.evaluate(value_expr, engine)?;
        self.environment.borrow_mut().assign(name, value.clone(), engine)?;
        Ok(value)
      },
      Expr::Unary(op, rhs) => self.eval_unary(op, rhs, engine),
      Expr::Binary(lhs, op, rhs) => self.eval_binary(lhs, op, rhs, engine),
      Expr::Logical(lhs, op, rhs) => self.eval_logical(lhs, op, rhs, engine),
      Expr::Grouping(inner) => self.evaluate(inner, engine),
      Expr::Call(callee, paren, arguments) => self.eval_call(callee, paren, arguments, engine),
    }
  }

  fn eval_unary(&mut self, op: &Token, rhs: &Expr, engine: &mut DiagnosticEngine) -> Result<Value, ()> {
    let value = self.evaluate(rhs, engine)?;
    match op.kind {
      TokenKind::Bang => Ok(Value::Bool(!value.is_truthy())),
      TokenKind::Minus => match value {
        Value::Number(n) => Ok(Value::Number(-n)),
        _ => Err(self.runtime_error(engine, op, "Operand must be a number.")),
      },
      _ => unreachable!("parser only produces ! and - as unary operators"),
    }
  }

  fn eval_binary(&mut self, lhs: &Expr, op: &Token, rhs: &Expr, engine: &mut DiagnosticEngine) -> Result<Value, ()> {
    let left = self.evaluate(lhs, engine)?;
    let right = self.evaluate(rhs, engine)?;

    match op.kind {
      TokenKind::Plus => match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::Text(a), Value::Text(b)) => Ok(Value::Text(a + &b)),
        _ => Err(self.runtime_error(engine, op, "Operand must be two numbers or two strings")),
      },
      TokenKind::Minus => self.numeric_binary(left, op, right, engine, |a, b| a - b),
      TokenKind::Star => self.numeric_binary(left, op, right, engine, |a, b| a * b),
      TokenKind::Slash => self.numeric_binary(left, op, right, engine, |a, b| a / b),
      TokenKind::Greater => self.comparison(left, op, right, engine, |a, b| a > b),
      TokenKind::GreaterEqual => self.comparison(left, op, right, engine, |a, b| a >= b),
      TokenKind::Less => self.comparison(left, op, right, engine, |a, b| a < b),
      TokenKind::LessEqual => self.comparison(left, op, right, engine, |a, b| a <= b),
      TokenKind::EqualEqual => Ok(Value::Bool(left.is_equal(&right))),
      TokenKind::BangEqual => Ok(Value::Bool(!left.is_equal(&right))),
      _ => unreachable!("parser only produces arithmetic/comparison/equality as binary operators"),
    }
  }

  fn numeric_binary(
    &self,
    left: Value,
    op: &Token,
    right: Value,
    engine: &mut DiagnosticEngine,
    f: impl Fn(f64, f64) -> f64,
  ) -> Result<Value, ()> {
    match (left, right) {
      (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(a, b))),
      _ => Err(self.runtime_error(engine, op, "Operands must be numbers.")),
    }
  }

  fn comparison(
    &self,
    left: Value,
    op: &Token,
    right: Value,
    engine: &mut DiagnosticEngine,
    f: impl Fn(f64, f64) -> bool,
  ) -> Result<Value, ()> {
    match (left, right) {
      (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(f(a, b))),
      _ => Err(self.runtime_error(engine, op, "Operands must be numbers.")),
    }
  }

  /// `or` short-circuits on a truthy left operand; `and` short-circuits on
  /// a falsy one. Either way, the value returned is the original operand,
  /// not a boolean coercion of it.
  fn eval_logical(&mut self, lhs: &Expr, op: &Token, rhs: &Expr, engine: &mut DiagnosticEngine) -> Result<Value, ()> {
    let left = self.evaluate(lhs, engine)?;

    match op.kind {
      TokenKind::Or if left.is_truthy() => Ok(left),
      TokenKind::And if !left.is_truthy() => Ok(left),
      _ => self.evaluate(rhs, engine),
    }
  }

  fn eval_call(&mut self, callee: &Expr, paren: &Token, arguments: &[Expr], engine: &mut DiagnosticEngine) -> Result<Value, ()> {
    let callee_value = self.evaluate(callee, engine)?;

    let mut evaluated_args = Vec::with_capacity(arguments.len());
    for arg in arguments {
      evaluated_args.push(self.evaluate(arg, engine)?);
    }

    let Value::Callable(callable) = callee_value else {
      return Err(self.error_at(engine, DiagnosticCode::InvalidCallee, paren, "Can only call functions and classes."));
    };

    if evaluated_args.len() != callable.arity() {
      let message = format!(
        "Expected {} arguments but got {}.",
        callable.arity(),
        evaluated_args.len()
      );
      return Err(self.error_at(engine, DiagnosticCode::ArityMismatch, paren, &message));
    }

    callable.call(self, evaluated_args, engine)
  }

  fn runtime_error(&self, engine: &mut DiagnosticEngine, token: &Token, message: &str) {
    self.error_at(engine, DiagnosticCode::TypeError, token, message)
  }

  fn error_at(&self, engine: &mut DiagnosticEngine, code: DiagnosticCode, token: &Token, message: &str) {
    engine.emit(Diagnostic::new(code, token.line, message.to_string()));
  }
}

fn literal_value(literal: &Literal) -> Value {
  match literal {
    Literal::Nil => Value::Nil,
    Literal::Bool(b) => Value::Bool(*b),
    Literal::Number(n) => Value::Number(*n),
    Literal::Text(s) => Value::Text(s.clone()),
  }
}

#[cfg(test)]
mod tests {
  use parser::Parser;

  use super::*;
  use crate::callable::Callable;

  fn parse_program(source: &str) -> (Vec<Stmt>, DiagnosticEngine) {
    let mut engine = DiagnosticEngine::new();
    let tokens = scanner::Scanner::new(source).scan_tokens(&mut engine);
    let statements = Parser::new(tokens).parse(&mut engine);
    (statements, engine)
  }

  /// Parses `source` as a single expression statement and evaluates it
  /// against `interpreter`, asserting that parsing itself produced no
  /// diagnostics.
  fn eval_expr(interpreter: &mut Interpreter, source: &str) -> Result<Value, ()> {
    let (statements, mut engine) = parse_program(source);
    assert!(!engine.has_errors(), "failed to parse: {source}");
    let [Stmt::Expression(expr)] = statements.as_slice() else {
      panic!("expected exactly one expression statement, got {statements:?}");
    };
    interpreter.evaluate(expr, &mut engine)
  }

  fn run_statements(interpreter: &mut Interpreter, source: &str) {
    let (statements, mut engine) = parse_program(source);
    assert!(!engine.has_errors(), "failed to parse: {source}");
    for stmt in &statements {
      interpreter.execute(stmt, &mut engine).expect("statement should not error");
    }
  }

  fn expect_number(value: Value) -> f64 {
    match value {
      Value::Number(n) => n,
      other => panic!("expected a number, got {other:?}"),
    }
  }

  fn expect_text(value: Value) -> String {
    match value {
      Value::Text(s) => s,
      other => panic!("expected text, got {other:?}"),
    }
  }

  #[test]
  fn multiplication_binds_tighter_than_addition() {
    let mut interpreter = Interpreter::new();
    let value = eval_expr(&mut interpreter, "1 + 2 * 3;").unwrap();
    assert_eq!(expect_number(value), 7.0);
  }

  #[test]
  fn grouping_overrides_precedence() {
    let mut interpreter = Interpreter::new();
    let value = eval_expr(&mut interpreter, "(1 + 2) * 3;").unwrap();
    assert_eq!(expect_number(value), 9.0);
  }

  #[test]
  fn division_can_produce_a_fraction() {
    let mut interpreter = Interpreter::new();
    let value = eval_expr(&mut interpreter, "5 / 2;").unwrap();
    assert_eq!(expect_number(value), 2.5);
  }

  #[test]
  fn plus_concatenates_two_strings() {
    let mut interpreter = Interpreter::new();
    let value = eval_expr(&mut interpreter, "\"a\" + \"b\";").unwrap();
    assert_eq!(expect_text(value), "ab");
  }

  #[test]
  fn plus_rejects_a_string_and_a_number() {
    let mut interpreter = Interpreter::new();
    let (statements, mut engine) = parse_program("\"a\" + 1;");
    let [Stmt::Expression(expr)] = statements.as_slice() else {
      panic!("expected exactly one expression statement");
    };
    assert!(interpreter.evaluate(expr, &mut engine).is_err());
    assert!(engine.has_errors());
  }

  #[test]
  fn fibonacci_of_ten_is_fifty_five() {
    let mut interpreter = Interpreter::new();
    run_statements(
      &mut interpreter,
      r#"
        fun fib(n) {
          if (n <= 1) return n;
          return fib(n - 1) + fib(n - 2);
        }
      "#,
    );
    let value = eval_expr(&mut interpreter, "fib(10);").unwrap();
    assert_eq!(expect_number(value), 55.0);
  }

  #[test]
  fn a_function_body_that_never_returns_yields_nil() {
    let mut interpreter = Interpreter::new();
    run_statements(&mut interpreter, "fun noop() { var unused = 1; }");
    let value = eval_expr(&mut interpreter, "noop();").unwrap();
    assert!(matches!(value, Value::Nil));
  }

  /// The block-scoping example: `{ var x = 1; { var x = 2; put x; } put x; }`
  /// prints `2` then `1`. Reproduced here by assigning each observation into
  /// an outer-scoped capture variable instead of printing, so the two
  /// observed values can be asserted exactly.
  #[test]
  fn inner_block_shadows_and_outer_scope_is_restored_after() {
    let mut interpreter = Interpreter::new();
    run_statements(
      &mut interpreter,
      r#"
        var inner_seen;
        var outer_seen;
        var x = 1;
        {
          var x = 2;
          inner_seen = x;
        }
        outer_seen = x;
      "#,
    );
    assert_eq!(expect_number(eval_expr(&mut interpreter, "inner_seen;").unwrap()), 2.0);
    assert_eq!(expect_number(eval_expr(&mut interpreter, "outer_seen;").unwrap()), 1.0);
  }

  #[derive(Debug)]
  struct CountingNative {
    calls: Rc<RefCell<usize>>,
  }

  impl Callable for CountingNative {
    fn arity(&self) -> usize {
      0
    }

    fn name(&self) -> &str {
      "probe"
    }

    fn call(&self, _interpreter: &mut Interpreter, _arguments: Vec<Value>, _engine: &mut DiagnosticEngine) -> Result<Value, ()> {
      *self.calls.borrow_mut() += 1;
      Ok(Value::Bool(true))
    }
  }

  fn interpreter_with_probe() -> (Interpreter, Rc<RefCell<usize>>) {
    let interpreter = Interpreter::new();
    let calls = Rc::new(RefCell::new(0));
    interpreter
      .globals
      .borrow_mut()
      .define("probe", Value::Callable(Rc::new(CountingNative { calls: Rc::clone(&calls) })));
    (interpreter, calls)
  }

  #[test]
  fn or_skips_the_right_operand_when_the_left_is_truthy() {
    let (mut interpreter, calls) = interpreter_with_probe();
    eval_expr(&mut interpreter, "true or probe();").unwrap();
    assert_eq!(*calls.borrow(), 0, "probe() must not run once `or` short-circuits");
  }

  #[test]
  fn or_evaluates_the_right_operand_when_the_left_is_falsy() {
    let (mut interpreter, calls) = interpreter_with_probe();
    eval_expr(&mut interpreter, "false or probe();").unwrap();
    assert_eq!(*calls.borrow(), 1);
  }

  #[test]
  fn and_skips_the_right_operand_when_the_left_is_falsy() {
    let (mut interpreter, calls) = interpreter_with_probe();
    eval_expr(&mut interpreter, "false and probe();").unwrap();
    assert_eq!(*calls.borrow(), 0, "probe() must not run once `and` short-circuits");
  }

  #[test]
  fn and_evaluates_the_right_operand_when_the_left_is_truthy() {
    let (mut interpreter, calls) = interpreter_with_probe();
    eval_expr(&mut interpreter, "true and probe();").unwrap();
    assert_eq!(*calls.borrow(), 1);
  }
}
