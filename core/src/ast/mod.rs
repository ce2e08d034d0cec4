//! Cinder syntax tree and token types.
//!
//! The submodules organise lexical token kinds, operator enums, syntax tree
//! nodes and the tree printer. Re-exports at this level give downstream
//! crates a single import path.

pub mod nodes;
pub mod ops;
pub mod printer;
pub mod tokens;

pub use nodes::*;
pub use ops::{AssignOp, BinaryOp, CastOp, UnaryOp};
pub use printer::{format_expr, format_program};
pub use tokens::{LiteralValue, TokenKind};
