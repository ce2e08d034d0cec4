//! Scopes, symbols and the two passes that populate them.
//!
//! The collector declares what each file defines; the resolver binds what
//! each file refers to. Both work against one shared `ScopeTree`.

pub mod collector;
pub mod natives;
pub mod resolver;
pub mod scope;
pub mod symbol;

pub use collector::collect;
pub use natives::{NATIVE_TYPES, register_natives};
pub use resolver::resolve;
pub use scope::{DeclarationResult, Scope, ScopeArena, ScopeIdStack, ScopeTree};
pub use symbol::{SourceLocation, Symbol, SymbolKind};
