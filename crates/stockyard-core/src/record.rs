//! Domain objects with named, settable fields.
//!
//! A recipe may return a domain object instead of a plain mapping. The merge
//! stage then applies overrides by assigning each one as a field by name,
//! through the [`Record`] trait.
//!
//! Most records are plain serde types. The [`impl_record!`](crate::impl_record)
//! macro implements [`Record`] for them by round-tripping through JSON:
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use stockyard_core::{impl_record, Product, Record};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct Animal {
//!     name: Option<String>,
//!     noise: Option<String>,
//! }
//!
//! impl_record!(Animal);
//!
//! let mut cow = Animal::default();
//! cow.set_field("noise", Product::from("moo")).unwrap();
//! assert_eq!(cow.noise.as_deref(), Some("moo"));
//! assert!(cow.set_field("wings", Product::from(2)).is_err());
//! ```

use crate::error::{BuildError, BuildResult};
use crate::product::{Fields, Product};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::fmt;

/// A domain object whose fields can be assigned by name.
///
/// # Invariants
///
/// - `set_field` MUST reject names the record does not have with
///   [`BuildError::UnknownField`]
/// - `to_json` returns the current field values, used for equality and
///   serialization of products
pub trait Record: fmt::Debug + Send + Sync + 'static {
    /// Name of the model, used in error messages and by typed stages.
    fn model_name(&self) -> &'static str;

    /// Assigns a single field.
    fn set_field(&mut self, field: &str, value: Product) -> BuildResult<()>;

    /// Returns the record as JSON.
    fn to_json(&self) -> Value;

    /// Clones the record behind a trait object.
    fn clone_record(&self) -> Box<dyn Record>;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Owned upcast for downcasting to the concrete type.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Assigns every entry of `fields`, in order.
    ///
    /// Stops at the first rejected field.
    fn merge_fields(&mut self, fields: Fields) -> BuildResult<()> {
        for (field, value) in fields {
            self.set_field(&field, value)?;
        }
        Ok(())
    }

    /// Reads a field by name.
    fn field(&self, name: &str) -> Option<Product> {
        match self.to_json() {
            Value::Object(object) => object.get(name).cloned().map(Product::from),
            _ => None,
        }
    }
}

impl Clone for Box<dyn Record> {
    fn clone(&self) -> Self {
        self.clone_record()
    }
}

/// Assigns `field` of a serde type by round-tripping it through JSON.
///
/// Fields that serialize to an absent key (for example with
/// `skip_serializing_if`) count as unknown.
pub fn assign_field<T>(target: &mut T, model: &str, field: &str, value: Product) -> BuildResult<()>
where
    T: Serialize + DeserializeOwned,
{
    let mut json = serde_json::to_value(&*target)
        .map_err(|e| BuildError::invalid_field(model, field, e.to_string()))?;

    let Value::Object(object) = &mut json else {
        return Err(BuildError::unknown_field(model, field));
    };
    let Some(slot) = object.get_mut(field) else {
        return Err(BuildError::unknown_field(model, field));
    };
    *slot = value.to_json();

    *target = serde_json::from_value(json)
        .map_err(|e| BuildError::invalid_field(model, field, e.to_string()))?;
    Ok(())
}

/// Deserializes a mapping into a serde type.
pub fn from_fields<T: DeserializeOwned>(model: &str, fields: &Fields) -> BuildResult<T> {
    let json = Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    );
    serde_json::from_value(json).map_err(|e| BuildError::invalid_field(model, "*", e.to_string()))
}

/// Serializes a serde type, falling back to null.
pub fn record_json<T: Serialize>(record: &T) -> Value {
    serde_json::to_value(record).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "record failed to serialize");
        Value::Null
    })
}

/// Implements [`Record`] for a `Serialize + DeserializeOwned + Clone + Debug`
/// type, using its type name as the model name.
#[macro_export]
macro_rules! impl_record {
    ($ty:ident) => {
        $crate::impl_record!($ty, stringify!($ty));
    };
    ($ty:ty, $model:expr) => {
        impl $crate::Record for $ty {
            fn model_name(&self) -> &'static str {
                $model
            }

            fn set_field(
                &mut self,
                field: &str,
                value: $crate::Product,
            ) -> $crate::BuildResult<()> {
                $crate::record::assign_field(self, $model, field, value)
            }

            fn to_json(&self) -> $crate::record::JsonValue {
                $crate::record::record_json(self)
            }

            fn clone_record(&self) -> ::std::boxed::Box<dyn $crate::Record> {
                ::std::boxed::Box::new(::std::clone::Clone::clone(self))
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(
                self: ::std::boxed::Box<Self>,
            ) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }
    };
}

#[doc(hidden)]
pub use serde_json::Value as JsonValue;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Animal {
        name: Option<String>,
        noise: Option<String>,
    }

    crate::impl_record!(Animal);

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct License {
        expires_at: DateTime<Utc>,
        seats: u32,
    }

    crate::impl_record!(License, "license");

    #[test]
    fn test_set_known_field() {
        let mut animal = Animal::default();
        animal.set_field("name", Product::from("Cow")).unwrap();
        assert_eq!(animal.name.as_deref(), Some("Cow"));
        assert_eq!(animal.model_name(), "Animal");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut animal = Animal::default();
        let err = animal.set_field("wings", Product::from(2)).unwrap_err();
        assert!(matches!(err, BuildError::UnknownField { .. }));
        assert!(err.to_string().contains("wings"));
    }

    #[test]
    fn test_invalid_value_rejected_and_record_unchanged() {
        let mut license = License {
            expires_at: Utc.with_ymd_and_hms(2013, 3, 30, 0, 0, 0).unwrap(),
            seats: 5,
        };
        let err = license.set_field("seats", Product::from("many")).unwrap_err();
        assert!(matches!(err, BuildError::InvalidField { .. }));
        assert_eq!(license.seats, 5);
    }

    #[test]
    fn test_merge_fields_assigns_in_order() {
        let mut animal = Animal::default();
        animal
            .merge_fields(fields! { "name" => "Cow", "noise" => "moo" })
            .unwrap();
        assert_eq!(animal.noise.as_deref(), Some("moo"));
    }

    #[test]
    fn test_from_fields_builds_typed_value() {
        let expires = Utc.with_ymd_and_hms(2014, 11, 1, 0, 0, 0).unwrap();
        let fields = fields! {
            "expires_at" => Product::from_serde(&expires).unwrap(),
            "seats" => 3,
        };
        let license: License = from_fields("license", &fields).unwrap();
        assert_eq!(license.expires_at, expires);
        assert_eq!(license.seats, 3);
    }

    #[test]
    fn test_boxed_record_clone_and_downcast() {
        let product = Product::record(Animal {
            name: Some("Cow".to_string()),
            noise: None,
        });
        let copy = product.clone();
        assert_eq!(product, copy);
        assert_eq!(
            copy.downcast::<Animal>().and_then(|a| a.name),
            Some("Cow".to_string())
        );
    }

    #[test]
    fn test_field_reads_through_json() {
        let animal = Animal {
            name: Some("Cow".to_string()),
            noise: None,
        };
        assert_eq!(animal.field("name"), Some(Product::from("Cow")));
        assert!(animal.field("noise").unwrap().is_null());
        assert!(animal.field("wings").is_none());
    }

    proptest::proptest! {
        #[test]
        fn prop_assignment_only_touches_named_field(noise in ".{0,12}", field in "[a-z]{1,8}") {
            let mut animal = Animal {
                name: Some("Cow".to_string()),
                noise: None,
            };
            let result = animal.set_field(&field, Product::from(noise.as_str()));

            match field.as_str() {
                "noise" => {
                    proptest::prop_assert!(result.is_ok());
                    proptest::prop_assert_eq!(animal.noise.as_deref(), Some(noise.as_str()));
                }
                "name" => proptest::prop_assert_eq!(animal.name.as_deref(), Some(noise.as_str())),
                _ => {
                    proptest::prop_assert!(matches!(result, Err(BuildError::UnknownField { .. })), "expected UnknownField error, got {:?}", result);
                    proptest::prop_assert_eq!(animal.name.as_deref(), Some("Cow"));
                    proptest::prop_assert!(animal.noise.is_none());
                }
            }
        }
    }
}
