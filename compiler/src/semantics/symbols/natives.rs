//! Built-in types registered in the global scope.

use super::scope::{DeclarationResult, ScopeTree};
use crate::semantics::ids::SymbolId;

/// Names of the native types, in registration order.
pub const NATIVE_TYPES: [&str; 15] = [
    "i8", "i16", "i32", "i64", "i128", "u8", "u16", "u32", "u64", "u128", "f32", "f64", "bool",
    "char", "str",
];

/// Declare every native type in the global scope of `tree`. Names that are
/// already present are left alone.
pub fn register_natives(tree: &ScopeTree) -> Vec<SymbolId> {
    NATIVE_TYPES
        .iter()
        .map(|name| match tree.declare_type(tree.root(), name, None) {
            DeclarationResult::Ok(id) | DeclarationResult::Duplicate { existing: id } => id,
        })
        .collect()
}

pub fn is_native(name: &str) -> bool {
    NATIVE_TYPES.contains(&name)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::semantics::symbols::SymbolKind;

    #[test]
    fn natives_get_distinct_type_ids() {
        let tree = ScopeTree::with_natives();

        let type_ids: HashSet<_> = NATIVE_TYPES
            .iter()
            .filter_map(|name| tree.lookup(tree.root(), name))
            .filter_map(|id| match tree.symbol(id)?.kind {
                SymbolKind::Type { type_id, .. } => Some(type_id),
                _ => None,
            })
            .collect();

        assert_eq!(type_ids.len(), NATIVE_TYPES.len());
    }

    #[test]
    fn registering_twice_keeps_the_first_symbols() {
        let tree = ScopeTree::new();
        let first = register_natives(&tree);
        let count = tree.symbol_count();

        assert_eq!(register_natives(&tree), first);
        assert_eq!(tree.symbol_count(), count);
        assert!(is_native("u128"));
        assert!(!is_native("string"));
    }
}
