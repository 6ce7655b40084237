//! Newtype IDs for type-safe identifiers.
//!
//! A `ProductId` can never be passed where a `VariationId` is expected, and a
//! generated `CartItemId` is never confused with the catalog identity of the
//! thing it points at.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Catalog identifier of a product.
    ProductId
);
define_id!(
    /// Catalog identifier of a product variation (size, color, ...).
    VariationId
);
define_id!(
    /// Display/lookup key of a cart entry. Never used for identity.
    CartItemId
);
define_id!(
    /// Server-assigned order identifier.
    OrderId
);
define_id!(
    /// Identifier of the company (store) the customer is buying from.
    CompanyId
);

impl CartItemId {
    /// Generate a fresh cart entry id.
    ///
    /// Unique for the life of the process: a nanosecond timestamp followed by
    /// a monotonically increasing counter.
    pub fn generate() -> Self {
        Self(generate_id("item"))
    }
}

fn generate_id(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{prefix}-{timestamp:x}-{counter:x}")
}
