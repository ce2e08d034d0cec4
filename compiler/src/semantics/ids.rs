//! Strongly typed identifiers for the scope arena and the type registry.
//!
//! Scopes and symbols live in arenas and are addressed by index; type ids are
//! handed out by a process-wide counter so that two type symbols never share
//! one, even when they come from different scope trees.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default)]
        pub struct $name(pub u32);

        impl $name {
            /// Construct an identifier from a raw value.
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Retrieve the underlying integer value.
            pub const fn to_raw(self) -> u32 {
                self.0
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id!(SymbolId);
define_id!(ScopeId);
define_id!(TypeId);

static NEXT_TYPE_ID: AtomicU32 = AtomicU32::new(1);

impl TypeId {
    /// Allocate a type id that has not been handed out before.
    pub fn next() -> Self {
        Self(NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ids_are_unique_and_nonzero() {
        let first = TypeId::next();
        let second = TypeId::next();

        assert_ne!(first, second);
        assert!(first.to_raw() >= 1);
        assert_eq!(format!("{:?}", ScopeId::from_raw(3)), "ScopeId(3)");
    }
}
