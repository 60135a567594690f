//! Build products.
//!
//! A [`Product`] is what a recipe returns, what each stage of the build chain
//! receives from the stage inside it, and what a field of another product can
//! hold (associations nest products inside [`Fields`]).
//!
//! | Variant | Merge capability | Settable fields |
//! |---------|------------------|-----------------|
//! | [`Product::Map`] | yes | - |
//! | [`Product::Record`] | - | yes |
//! | [`Product::Value`] | - | - |
//!
//! [`Product::Value`] is opaque: it is never merged into, even when the JSON
//! value it carries is an object. Converting a `serde_json::Value` with
//! [`From`] turns JSON objects into mergeable maps instead.
//!
//! # Example
//!
//! ```
//! use stockyard_core::{fields, Product};
//!
//! let user = Product::from(fields! { "email" => "a@b.com", "age" => 42 });
//! assert_eq!(user.get("email").and_then(Product::as_str), Some("a@b.com"));
//! assert_eq!(user.field("age").and_then(|p| p.as_i64()), Some(42));
//! ```

use crate::record::Record;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Named fields of a mapping product, or the overrides of a build call.
pub type Fields = IndexMap<String, Product>;

/// Builds a [`Fields`] mapping from `key => value` pairs.
///
/// Values are converted with [`Product::from`].
///
/// ```
/// use stockyard_core::fields;
///
/// let overrides = fields! { "name" => "Potato", "unit" => "sack" };
/// assert_eq!(overrides.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(
            fields.insert(
                ::std::string::String::from($key),
                $crate::Product::from($value),
            );
        )+
        fields
    }};
}

/// Shape of a [`Product`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// A mergeable mapping.
    Map,
    /// A domain object.
    Record,
    /// An opaque JSON value.
    Value,
}

impl ProductKind {
    /// Returns the snake_case name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Record => "record",
            Self::Value => "value",
        }
    }
}

/// A value produced by a build.
#[derive(Debug, Clone)]
pub enum Product {
    /// A plain mapping; overrides are merged into it.
    Map(Fields),
    /// A domain object; overrides are assigned field by field.
    Record(Box<dyn Record>),
    /// An opaque JSON value; overrides cannot be applied to it.
    Value(Value),
}

impl Product {
    /// Creates an empty mapping.
    #[must_use]
    pub fn map() -> Self {
        Self::Map(Fields::new())
    }

    /// Creates a JSON null.
    #[must_use]
    pub const fn null() -> Self {
        Self::Value(Value::Null)
    }

    /// Wraps a domain object.
    #[must_use]
    pub fn record<R: Record>(record: R) -> Self {
        Self::Record(Box::new(record))
    }

    /// Serializes any value into a product.
    ///
    /// JSON objects become mergeable maps.
    pub fn from_serde<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::from)
    }

    /// Returns the shape of this product.
    #[must_use]
    pub const fn kind(&self) -> ProductKind {
        match self {
            Self::Map(_) => ProductKind::Map,
            Self::Record(_) => ProductKind::Record,
            Self::Value(_) => ProductKind::Value,
        }
    }

    /// Human readable description used in error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Map(_) => "a mapping".to_string(),
            Self::Record(record) => format!("record `{}'", record.model_name()),
            Self::Value(Value::Null) => "null".to_string(),
            Self::Value(Value::Bool(_)) => "a boolean".to_string(),
            Self::Value(Value::Number(_)) => "a number".to_string(),
            Self::Value(Value::String(_)) => "a string".to_string(),
            Self::Value(Value::Array(_)) => "an array".to_string(),
            Self::Value(Value::Object(_)) => "an opaque JSON object".to_string(),
        }
    }

    /// Returns true for [`Product::Map`].
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    /// Returns true for [`Product::Record`].
    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    /// Returns true for a JSON null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    /// Looks up a key of a mapping product.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Reads a named field of a mapping, record, or JSON object.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Self> {
        match self {
            Self::Map(fields) => fields.get(name).cloned(),
            Self::Record(record) => record.field(name),
            Self::Value(Value::Object(object)) => object.get(name).cloned().map(Self::from),
            Self::Value(_) => None,
        }
    }

    /// Returns the string of a JSON string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value(value) => value.as_str(),
            _ => None,
        }
    }

    /// Returns the integer of a JSON number value.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Value(value) => value.as_i64(),
            _ => None,
        }
    }

    /// Returns the float of a JSON number value.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Value(value) => value.as_f64(),
            _ => None,
        }
    }

    /// Returns the boolean of a JSON boolean value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Value(value) => value.as_bool(),
            _ => None,
        }
    }

    /// Returns the JSON value of an opaque product.
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the fields of a mapping product.
    #[must_use]
    pub const fn as_map(&self) -> Option<&Fields> {
        match self {
            Self::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the fields of a mapping product mutably.
    pub fn as_map_mut(&mut self) -> Option<&mut Fields> {
        match self {
            Self::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Consumes a mapping product into its fields.
    #[must_use]
    pub fn into_map(self) -> Option<Fields> {
        match self {
            Self::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the record of a record product.
    #[must_use]
    pub fn as_record(&self) -> Option<&dyn Record> {
        match self {
            Self::Record(record) => Some(&**record),
            _ => None,
        }
    }

    /// Returns the record of a record product mutably.
    pub fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        match self {
            Self::Record(record) => Some(&mut **record),
            _ => None,
        }
    }

    /// Borrows the concrete type of a record product.
    #[must_use]
    pub fn downcast_ref<T: Record>(&self) -> Option<&T> {
        self.as_record()?.as_any().downcast_ref::<T>()
    }

    /// Consumes a record product into its concrete type.
    #[must_use]
    pub fn downcast<T: Record>(self) -> Option<T> {
        match self {
            Self::Record(record) => record.into_any().downcast::<T>().ok().map(|b| *b),
            _ => None,
        }
    }

    /// Converts this product into plain JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Map(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Record(record) => record.to_json(),
            Self::Value(value) => value.clone(),
        }
    }
}

impl Default for Product {
    fn default() -> Self {
        Self::map()
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => {
                a.model_name() == b.model_name() && a.to_json() == b.to_json()
            }
            _ => false,
        }
    }
}

impl Serialize for Product {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<Value> for Product {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(object) => Self::Map(
                object
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
            other => Self::Value(other),
        }
    }
}

impl From<Fields> for Product {
    fn from(fields: Fields) -> Self {
        Self::Map(fields)
    }
}

impl From<Box<dyn Record>> for Product {
    fn from(record: Box<dyn Record>) -> Self {
        Self::Record(record)
    }
}

impl<T: Into<Self>> From<Option<T>> for Product {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Into::into)
    }
}

macro_rules! impl_from_scalar {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Product {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )+
    };
}

impl_from_scalar!(&str, String, bool, i32, i64, u32, u64, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use serde_json::json;

    #[test]
    fn test_json_objects_become_maps() {
        let product = Product::from(json!({"org": {"name": "Foo"}, "tags": ["a"]}));
        assert!(product.is_map());
        assert!(product.get("org").unwrap().is_map());
        assert_eq!(product.get("tags").unwrap().kind(), ProductKind::Value);
    }

    #[test]
    fn test_fields_macro_preserves_order() {
        let fields = fields! { "b" => 1, "a" => 2, "c" => 3 };
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_to_json_round_trip_shape() {
        let product = Product::from(fields! {
            "email" => "a@b.com",
            "org" => fields! { "name" => "Foo" },
        });
        assert_eq!(
            product.to_json(),
            json!({"email": "a@b.com", "org": {"name": "Foo"}})
        );
    }

    #[test]
    fn test_option_conversion() {
        assert!(Product::from(None::<&str>).is_null());
        assert_eq!(Product::from(Some("x")).as_str(), Some("x"));
    }

    #[test]
    fn test_describe_opaque_values() {
        assert_eq!(Product::from(3).describe(), "a number");
        assert_eq!(
            Product::Value(json!({"a": 1})).describe(),
            "an opaque JSON object"
        );
        assert_eq!(Product::map().describe(), "a mapping");
    }

    #[test]
    fn test_field_reads_opaque_objects() {
        let product = Product::Value(json!({"a": 1}));
        assert_eq!(product.field("a").and_then(|p| p.as_i64()), Some(1));
        assert!(product.get("a").is_none());
    }

    #[test]
    fn test_equality_by_shape() {
        assert_eq!(Product::from("x"), Product::from("x"));
        assert_ne!(Product::from("x"), Product::map());
        assert_eq!(Product::from(json!({})), Product::map());
    }

    #[test]
    fn test_serialize_via_json() {
        let product = Product::from(fields! { "n" => 1 });
        assert_eq!(serde_json::to_string(&product).unwrap(), r#"{"n":1}"#);
    }
}
