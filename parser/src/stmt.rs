use std::rc::Rc;

use scanner::token::Token;

use crate::expr::Expr;

/// A function declaration's fixed parts, shared by `Rc` between the `Stmt`
/// tree and any `Callable` built from it — cloning a callable should never
/// clone the function body.
#[derive(Debug)]
pub struct FunctionDecl {
  pub name: Token,
  pub params: Vec<Token>,
  pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
  Expression(Expr),
  Put(Expr),
  Var(Token, Option<Expr>),
  Block(Vec<Stmt>),
  If(Expr, Box<Stmt>, Option<Box<Stmt>>),
  While(Expr, Box<Stmt>),
  Function(Rc<FunctionDecl>),
  Return(Token, Option<Expr>),
}
