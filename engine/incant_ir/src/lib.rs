//! Incant IR - shared data types for the incant scripting engine.
//!
//! This crate contains the structures every compiler phase exchanges:
//! - [`Span`] for source locations
//! - [`Token`] and [`TokenKind`] for lexer output
//! - AST nodes ([`Program`], [`Stmt`], [`Expr`])
//! - [`Ty`] structural type descriptors
//! - The closed [`Builtin`] function catalogue
//! - [`ScriptId`] identifying one script instance for store persistence

mod ast;
mod builtin;
mod script_id;
mod span;
mod token;
mod ty;

pub use ast::{
    BinOp, Expr, ExprKind, ParamDecl, Program, SortCmp, Stmt, StmtKind, StoreDecl, UnaryOp,
};
pub use builtin::Builtin;
pub use script_id::ScriptId;
pub use span::{LineCol, Span};
pub use token::{Token, TokenKind};
pub use ty::Ty;
