//! Lexical scopes shared by every file of a compilation.
//!
//! Scopes and symbols live in one arena guarded by a single mutex. Collectors
//! for different files run concurrently against the same tree, so each
//! read-modify-write below (lookup-or-insert, child registration, usage
//! recording) takes the lock exactly once.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::semantics::ids::{ScopeId, SymbolId, TypeId};
use crate::semantics::types::DataType;

use super::natives;
use super::symbol::{SourceLocation, Symbol, SymbolKind};

/// Information stored for each scope.
#[derive(Debug)]
pub struct Scope {
    /// Identifier assigned to the scope.
    pub id: ScopeId,
    /// Optional parent scope enabling lookups to walk upwards.
    pub parent: Option<ScopeId>,
    /// Symbol that owns this scope; `None` for the root and for blocks.
    pub owner: Option<SymbolId>,
    /// Child scopes in creation order.
    pub children: Vec<ScopeId>,
    /// Mapping of symbol names to identifiers.
    pub symbols: HashMap<String, SymbolId>,
}

impl Scope {
    fn new(id: ScopeId, parent: Option<ScopeId>) -> Self {
        Self {
            id,
            parent,
            owner: None,
            children: Vec::new(),
            symbols: HashMap::new(),
        }
    }

    /// Lookup a symbol by name within this scope only.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).copied()
    }
}

/// Backing storage for a `ScopeTree`.
#[derive(Debug, Default)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl ScopeArena {
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.index())
    }

    fn alloc_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::from_raw(self.scopes.len() as u32);
        self.scopes.push(Scope::new(id, parent));
        if let Some(parent) = parent.and_then(|parent| self.scopes.get_mut(parent.index())) {
            parent.children.push(id);
        }
        id
    }

    fn alloc_symbol(
        &mut self,
        scope: ScopeId,
        name: &str,
        kind: SymbolKind,
        location: Option<SourceLocation>,
    ) -> SymbolId {
        let id = SymbolId::from_raw(self.symbols.len() as u32);
        if let Some(owned) = kind.scope().and_then(|owned| self.scopes.get_mut(owned.index())) {
            owned.owner = Some(id);
        }
        if let Some(parent) = self.scopes.get_mut(scope.index()) {
            parent.symbols.insert(name.to_string(), id);
        }
        self.symbols.push(Symbol::new(id, name, kind, scope, location));
        id
    }

    fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scope(scope).and_then(|scope| scope.lookup(name))
    }

    fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(scope_id) = current {
            let scope = self.scope(scope_id)?;
            if let Some(symbol) = scope.lookup(name) {
                return Some(symbol);
            }
            current = scope.parent;
        }
        None
    }
}

/// Outcome of attempting to declare a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationResult {
    Ok(SymbolId),
    Duplicate { existing: SymbolId },
}

/// The scope tree of one compilation, rooted at the global scope.
#[derive(Debug)]
pub struct ScopeTree {
    arena: Mutex<ScopeArena>,
    root: ScopeId,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create a tree holding only an empty global scope.
    pub fn new() -> Self {
        let mut arena = ScopeArena::default();
        let root = arena.alloc_scope(None);
        Self {
            arena: Mutex::new(arena),
            root,
        }
    }

    /// Create a tree whose global scope holds the native types.
    pub fn with_natives() -> Self {
        let tree = Self::new();
        natives::register_natives(&tree);
        tree
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    /// Lock the arena for a multi-step read. A poisoned lock is taken over
    /// as is.
    pub fn lock(&self) -> MutexGuard<'_, ScopeArena> {
        self.arena.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate an anonymous child scope of `parent`.
    pub fn create_scope(&self, parent: ScopeId) -> ScopeId {
        self.lock().alloc_scope(Some(parent))
    }

    /// Open the module `name` inside `parent`, creating it on first use.
    ///
    /// Returns the module symbol and its scope; a reopened module gains one
    /// more declaration location. When `name` is taken by a symbol that is
    /// not a module, that symbol is returned as the error.
    pub fn open_module(
        &self,
        parent: ScopeId,
        name: &str,
        location: SourceLocation,
    ) -> Result<(SymbolId, ScopeId), SymbolId> {
        let mut arena = self.lock();

        if let Some(existing) = arena.lookup_local(parent, name) {
            let symbol = arena.symbol_mut(existing).ok_or(existing)?;
            return match symbol.kind {
                SymbolKind::Module { scope } => {
                    symbol.declarations.push(location);
                    tracing::debug!(module = name, ?scope, "reopened module");
                    Ok((existing, scope))
                }
                _ => Err(existing),
            };
        }

        let scope = arena.alloc_scope(Some(parent));
        let symbol = arena.alloc_symbol(parent, name, SymbolKind::Module { scope }, Some(location));
        tracing::debug!(module = name, ?scope, "opened module");
        Ok((symbol, scope))
    }

    /// Declare `name` in `scope` unless the scope already holds it.
    pub fn declare(
        &self,
        scope: ScopeId,
        name: &str,
        kind: SymbolKind,
        location: Option<SourceLocation>,
    ) -> DeclarationResult {
        let mut arena = self.lock();

        if let Some(existing) = arena.lookup_local(scope, name) {
            return DeclarationResult::Duplicate { existing };
        }

        let kind_name = kind.as_str();
        let symbol = arena.alloc_symbol(scope, name, kind, location);
        tracing::debug!(name, kind = kind_name, ?scope, "declared symbol");
        DeclarationResult::Ok(symbol)
    }

    /// Declare a type symbol with a fresh scope and type id.
    pub fn declare_type(
        &self,
        scope: ScopeId,
        name: &str,
        location: Option<SourceLocation>,
    ) -> DeclarationResult {
        let mut arena = self.lock();

        if let Some(existing) = arena.lookup_local(scope, name) {
            return DeclarationResult::Duplicate { existing };
        }

        let type_scope = arena.alloc_scope(Some(scope));
        let kind = SymbolKind::Type {
            scope: type_scope,
            type_id: TypeId::next(),
        };
        DeclarationResult::Ok(arena.alloc_symbol(scope, name, kind, location))
    }

    /// Find `name` in `scope` or the nearest ancestor declaring it.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.lock().lookup(scope, name)
    }

    /// Find `name` in `scope` only.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.lock().lookup_local(scope, name)
    }

    /// Follow a dotted path from the global scope, one owned scope per
    /// segment.
    pub fn resolve_path<S: AsRef<str>>(&self, path: &[S]) -> Option<SymbolId> {
        let arena = self.lock();
        let mut scope = Some(self.root);
        let mut found = None;

        for segment in path {
            let symbol = arena.lookup_local(scope?, segment.as_ref())?;
            scope = arena.symbol(symbol).and_then(Symbol::owned_scope);
            found = Some(symbol);
        }

        found
    }

    /// Snapshot of a symbol.
    pub fn symbol(&self, id: SymbolId) -> Option<Symbol> {
        self.lock().symbol(id).cloned()
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.lock().scope(scope).and_then(|scope| scope.parent)
    }

    pub fn children(&self, scope: ScopeId) -> Vec<ScopeId> {
        self.lock()
            .scope(scope)
            .map(|scope| scope.children.clone())
            .unwrap_or_default()
    }

    /// Symbols declared directly in `scope`, ordered by name.
    pub fn symbols_in(&self, scope: ScopeId) -> Vec<SymbolId> {
        let arena = self.lock();
        let Some(scope) = arena.scope(scope) else {
            return Vec::new();
        };

        let mut entries: Vec<(&String, &SymbolId)> = scope.symbols.iter().collect();
        entries.sort();
        entries.into_iter().map(|(_, id)| *id).collect()
    }

    pub fn record_usage(&self, id: SymbolId, location: SourceLocation) {
        if let Some(symbol) = self.lock().symbol_mut(id) {
            symbol.usages.push(location);
        }
    }

    /// Attach the resolved type to a parameter symbol. Returns false when
    /// `id` is not a parameter.
    pub fn set_parameter_type(&self, id: SymbolId, data_type: DataType) -> bool {
        let mut arena = self.lock();
        match arena.symbol_mut(id).map(|symbol| &mut symbol.kind) {
            Some(SymbolKind::Parameter { data_type: slot, .. }) => {
                *slot = Some(data_type);
                true
            }
            _ => false,
        }
    }

    /// Attach the resolved return type to an entry symbol. Returns false when
    /// `id` is not an entry point.
    pub fn set_return_type(&self, id: SymbolId, data_type: DataType) -> bool {
        let mut arena = self.lock();
        match arena.symbol_mut(id).map(|symbol| &mut symbol.kind) {
            Some(SymbolKind::Entry {
                return_type: slot, ..
            }) => {
                *slot = Some(data_type);
                true
            }
            _ => false,
        }
    }

    pub fn scope_count(&self) -> usize {
        self.lock().scopes.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.lock().symbols.len()
    }
}

/// Stack helper used while traversing nested scopes.
#[derive(Debug, Default)]
pub struct ScopeIdStack {
    stack: Vec<ScopeId>,
}

impl ScopeIdStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, scope: ScopeId) {
        self.stack.push(scope);
    }

    pub fn pop(&mut self) -> Option<ScopeId> {
        self.stack.pop()
    }

    pub fn current(&self) -> Option<ScopeId> {
        self.stack.last().copied()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Pop back down to `depth` entries.
    pub fn truncate(&mut self, depth: usize) {
        self.stack.truncate(depth);
    }
}
