//! Newtype IDs for opaque document-service identifiers.
//!
//! The document service assigns string identifiers it never explains. Use the
//! `define_id!` macro to wrap them so a project ID can't be passed where a
//! product ID is expected.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Display`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use product_manager_core::define_id;
/// define_id!(ShelfId);
/// define_id!(BinId);
///
/// let shelf = ShelfId::new("a1");
/// let bin = BinId::new("a1");
///
/// // These are different types, so this won't compile:
/// // let _: ShelfId = bin;
/// assert_eq!(shelf.as_str(), bin.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the identifier.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Server-assigned product document identifier.
define_id!(ProductId);
// Fixed addressing of the remote collection.
define_id!(ProjectId);
define_id!(DatabaseId);
define_id!(CollectionId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_access() {
        let id = ProductId::new("68f85a6b0015f3a041a7");
        assert_eq!(id.to_string(), "68f85a6b0015f3a041a7");
        assert_eq!(id.as_str(), "68f85a6b0015f3a041a7");
        assert_eq!(id.clone().into_inner(), "68f85a6b0015f3a041a7");
    }

    #[test]
    fn test_id_serde_is_transparent() {
        let id = CollectionId::from("products");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"products\"");

        let back: CollectionId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
