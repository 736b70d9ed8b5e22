//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing a seller id with an item id.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when parsing an id from user input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdError {
    /// The input is empty or only whitespace.
    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

/// Wire form of an id as found in persisted carts.
///
/// Catalogue ids are usually strings, but older records carry plain integers.
/// Both are accepted; integers remember their form so they are written back
/// as integers.
#[doc(hidden)]
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl RawId {
    /// The id text and whether it was a JSON integer.
    #[doc(hidden)]
    #[must_use]
    pub fn into_parts(self) -> (String, bool) {
        match self {
            Self::Text(s) => (s, false),
            Self::Signed(n) => (n.to_string(), true),
            Self::Unsigned(n) => (n.to_string(), true),
        }
    }

    /// Serialize `value` as a JSON integer when `numeric`, else as a string.
    #[doc(hidden)]
    pub fn serialize<S>(value: &str, numeric: bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if numeric {
            if let Ok(n) = value.parse::<i64>() {
                return serializer.serialize_i64(n);
            }
            if let Ok(n) = value.parse::<u64>() {
                return serializer.serialize_u64(n);
            }
        }
        serializer.serialize_str(value)
    }
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Deserialize` from a string or an integer, `Serialize` back in the form it was read
/// - `Debug`, `Clone`, and `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord` on the
///   id text alone, so `3` read from a record equals `ItemId::new("3")`
/// - Conversion methods: `new()`, `parse()`, `as_str()`, `into_inner()`
/// - `Display`, `FromStr`, `AsRef<str>`, `From<String>` and `From<&str>`
///
/// # Example
///
/// ```rust
/// # use b2b_cart_core::define_id;
/// define_id!(WarehouseId, "warehouse id");
/// define_id!(BinId, "bin id");
///
/// let warehouse = WarehouseId::new("kla-01");
/// let bin = BinId::new("kla-01");
///
/// // These are different types, so this won't compile:
/// // let _: WarehouseId = bin;
/// assert_eq!(warehouse.as_str(), bin.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            value: String,
            numeric: bool,
        }

        impl $name {
            /// Create a new ID from any string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self {
                    value: id.into(),
                    numeric: false,
                }
            }

            /// Parse an ID from user input, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns an error if the trimmed input is empty.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::types::id::IdError> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err($crate::types::id::IdError::Empty($label));
                }
                Ok(Self::new(trimmed))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.value
            }

            /// Whether the underlying string is empty.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.value.is_empty()
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.value
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.value == other.value
            }
        }

        impl Eq for $name {}

        impl ::core::hash::Hash for $name {
            fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
                ::core::hash::Hash::hash(&self.value, state);
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<::core::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> ::core::cmp::Ordering {
                self.value.cmp(&other.value)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                $crate::types::id::RawId::serialize(&self.value, self.numeric, serializer)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let (value, numeric) =
                    <$crate::types::id::RawId as ::serde::Deserialize>::deserialize(deserializer)?
                        .into_parts();
                Ok(Self { value, numeric })
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.value)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.value
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

define_id!(SellerId, "seller id");
define_id!(ItemId, "item id");
