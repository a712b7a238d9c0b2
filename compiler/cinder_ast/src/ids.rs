//! Arena handles for AST nodes.
//!
//! Every node lives in a flat arena inside [`AstContext`](crate::AstContext)
//! and is addressed by a 32-bit index. Handles are `Copy` and compare in O(1).

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create a handle from a raw arena index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Get the index into the arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Get the raw u32 value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id!(
    /// Handle to a declaration.
    DeclId
);
define_id!(
    /// Handle to a (possibly sugared) type node.
    TypeId
);
define_id!(
    /// Handle to a statement.
    StmtId
);
define_id!(
    /// Handle to an expression.
    ExprId
);

/// Convert an arena length into a u32 index.
///
/// # Panics
/// Panics if the arena exceeds `u32::MAX` entries.
#[inline]
pub(crate) fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len} exceeds u32::MAX"))
}
