use std::{
  cell::RefCell,
  io::{self, Write},
  rc::Rc,
  time::{SystemTime, UNIX_EPOCH},
};

use diagnostic::DiagnosticEngine;

use crate::{callable::Callable, environment::Environment, interpreter::Interpreter, value::Value};

/// Registers the interpreter's native functions into `env`, which must be
/// the global frame.
pub fn register(env: &Rc<RefCell<Environment>>) {
  let mut globals = env.borrow_mut();
  globals.define("clock", Value::Callable(Rc::new(Clock)));
  globals.define("clear", Value::Callable(Rc::new(Clear)));
  globals.define("quit", Value::Callable(Rc::new(Quit)));
  globals.define("str", Value::Callable(Rc::new(Str)));
}

#[derive(Debug)]
struct Clock;

impl Callable for Clock {
  fn arity(&self) -> usize {
    0
  }

  fn name(&self) -> &str {
    "clock"
  }

  fn call(&self, _interpreter: &mut Interpreter, _arguments: Vec<Value>, _engine: &mut DiagnosticEngine) -> Result<Value, ()> {
    let seconds = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .unwrap_or_default()
      .as_secs_f64();
    Ok(Value::Number(seconds))
  }
}

#[derive(Debug)]
struct Clear;

impl Callable for Clear {
  fn arity(&self) -> usize {
    0
  }

  fn name(&self) -> &str {
    "clear"
  }

  fn call(&self, _interpreter: &mut Interpreter, _arguments: Vec<Value>, _engine: &mut DiagnosticEngine) -> Result<Value, ()> {
    print!("\x1B[2J\x1B[1;1H");
    let _ = io::stdout().flush();
    Ok(Value::Number(0.0))
  }
}

#[derive(Debug)]
struct Quit;

impl Callable for Quit {
  fn arity(&self) -> usize {
    0
  }

  fn name(&self) -> &str {
    "quit"
  }

  fn call(&self, _interpreter: &mut Interpreter, _arguments: Vec<Value>, _engine: &mut DiagnosticEngine) -> Result<Value, ()> {
    std::process::exit(0);
  }
}

#[derive(Debug)]
struct Str;

impl Callable for Str {
  fn arity(&self) -> usize {
    1
  }

  fn name(&self) -> &str {
    "str"
  }

  fn call(&self, _interpreter: &mut Interpreter, arguments: Vec<Value>, _engine: &mut DiagnosticEngine) -> Result<Value, ()> {
    Ok(Value::Text(arguments[0].stringify()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn str_stringifies_its_argument() {
    let native = Str;
    let mut interpreter = crate::Interpreter::new();
    let mut engine = DiagnosticEngine::new();
    let result = native.call(&mut interpreter, vec![Value::Number(3.0)], &mut engine).unwrap();
    assert_eq!(result.stringify(), "3");
  }

  #[test]
  fn clock_returns_a_number() {
    let native = Clock;
    let mut interpreter = crate::Interpreter::new();
    let mut engine = DiagnosticEngine::new();
    let result = native.call(&mut interpreter, vec![], &mut engine).unwrap();
    assert!(matches!(result, Value::Number(_)));
  }
}
