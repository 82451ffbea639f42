use std::{cell::RefCell, collections::HashMap, rc::Rc};

use diagnostic::{diagnostic::Diagnostic, diagnostic_code::DiagnosticCode, DiagnosticEngine};
use scanner::token::Token;

use crate::value::Value;

/// One scope frame: a name-to-value mapping plus an optional enclosing
/// frame. The global frame has no enclosing frame and lives for the process
/// lifetime; block frames are created on block entry and discarded on exit;
/// function-call frames always enclose on `globals`, never on the lexical
/// declaration site (see the interpreter's `call` implementation).
#[derive(Debug)]
pub struct Environment {
  values: HashMap<String, Value>,
  enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
  pub fn new() -> Rc<RefCell<Self>> {
    Rc::new(RefCell::new(Self {
      values: HashMap::new(),
      enclosing: None,
    }))
  }

  pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
    Rc::new(RefCell::new(Self {
      values: HashMap::new(),
      enclosing: Some(enclosing),
    }))
  }

  /// Unconditionally writes into this frame, overwriting any existing
  /// binding for `name` in this frame only.
  pub fn define(&mut self, name: impl Into<String>, value: Value) {
    self.values.insert(name.into(), value);
  }

  pub fn get(&self, token: &Token, engine: &mut DiagnosticEngine) -> Result<Value, ()> {
    if let Some(value) = self.values.get(&token.lexeme) {
      return Ok(value.clone());
    }
    if let Some(enclosing) = &self.enclosing {
      return enclosing.borrow().get(token, engine);
    }
    Err(undefined_variable(token, engine))
  }

  /// Walks frames inside-out and writes into the first one whose mapping
  /// already contains `token.lexeme`. Fails if no frame defines it.
  pub fn assign(&mut self, token: &Token, value: Value, engine: &mut DiagnosticEngine) -> Result<(), ()> {
    if self.values.contains_key(&token.lexeme) {
      self.values.insert(token.lexeme.clone(), value);
      return Ok(());
    }
    if let Some(enclosing) = &self.enclosing {
      return enclosing.borrow_mut().assign(token, value, engine);
    }
    Err(undefined_variable(token, engine))
  }
}

fn undefined_variable(token: &Token, engine: &mut DiagnosticEngine) {
  engine.emit(Diagnostic::new(
    DiagnosticCode::UndefinedVariable,
    token.line,
    format!("Undefined variable '{}'.", token.lexeme),
  ));
}
