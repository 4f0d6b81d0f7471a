//! Newtype IDs for type-safe entity references.
//!
//! Every row in the remote store is keyed by a UUID. Use the `define_id!` macro
//! to create wrappers that prevent accidentally mixing IDs from different
//! entity types (e.g. passing a product id where a blog post id is expected).

/// Macro to define a type-safe UUID wrapper.
///
/// Creates a newtype wrapper around `uuid::Uuid` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `generate()`, `as_uuid()`
/// - `FromStr`, `Display`, `From<Uuid>` and `Into<Uuid>` implementations
/// - `sqlx` `Type`, `Encode`, and `Decode` implementations (with `postgres` feature)
///
/// # Example
///
/// ```rust
/// # use shopfront_core::define_id;
/// define_id!(WidgetId);
/// define_id!(GadgetId);
///
/// let widget_id = WidgetId::generate();
/// let gadget_id = GadgetId::new(widget_id.as_uuid());
///
/// // These are different types, so this won't compile:
/// // let _: WidgetId = gadget_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh random (v4) ID.
            #[must_use]
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                ::uuid::Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <::uuid::Uuid as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                let id = <::uuid::Uuid as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(Self(id))
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <::uuid::Uuid as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

// Entity IDs stored in the remote database
define_id!(BlogPostId);
define_id!(CategoryId);
define_id!(ProductId);
define_id!(AdminUserId);
define_id!(BannerId);

// Identity-service user, referenced by `admin_users.user_id`
define_id!(IdentityUserId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let raw = "0b7d3a52-4a8e-4a52-9d1c-0f0e1d2c3b4a";
        let id: ProductId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id: ProductId = " 0b7d3a52-4a8e-4a52-9d1c-0f0e1d2c3b4a\n".parse().unwrap();
        assert_eq!(id.to_string(), "0b7d3a52-4a8e-4a52-9d1c-0f0e1d2c3b4a");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<ProductId>().is_err());
        assert!("".parse::<BlogPostId>().is_err());
    }

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(CategoryId::generate(), CategoryId::generate());
    }

    #[test]
    fn test_serde_transparent() {
        let id: AdminUserId = "0b7d3a52-4a8e-4a52-9d1c-0f0e1d2c3b4a".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0b7d3a52-4a8e-4a52-9d1c-0f0e1d2c3b4a\"");
        let back: AdminUserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
