//! Factory definitions.
//!
//! A [`Factory`] is the immutable record a registry stores for every
//! `define` call: a name, an options bag, and the recipe that produces the
//! raw product. Factories are never mutated after creation; redefining a name
//! requires resetting the registry.

use crate::context::BuildContext;
use crate::error::BuildResult;
use crate::product::Product;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// The deferred computation a factory wraps.
///
/// Evaluated once per build call and never cached.
pub type Recipe = Arc<dyn Fn(&BuildContext<'_>) -> BuildResult<Product> + Send + Sync>;

/// Options attached to a factory at definition time.
///
/// The core stages never read options; they are meant for custom stages
/// (for example a stage that picks a target type from `options["class"]`).
///
/// # Example
///
/// ```
/// use stockyard_core::FactoryOptions;
///
/// let options = FactoryOptions::new().with("class", "Crop");
/// assert_eq!(options.get_str("class"), Some("Crop"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactoryOptions(IndexMap<String, Value>);

impl FactoryOptions {
    /// Creates an empty options bag.
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Adds an option.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns an option value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns an option value if it is a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Checks if an option is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over options in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<Value> for FactoryOptions {
    /// JSON objects become options; any other value yields an empty bag.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(object) => Self(object.into_iter().collect()),
            _ => Self::new(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for FactoryOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A named, immutable recipe definition.
///
/// Factories are normally created by a registry's `define`; creating one
/// directly is useful for exercising a build chain in isolation.
///
/// # Example
///
/// ```
/// use stockyard_core::{fields, Factory, FactoryOptions};
///
/// let factory = Factory::new("user", FactoryOptions::new(), |_ctx| {
///     Ok(fields! { "email" => "a@b.com" }.into())
/// });
/// assert_eq!(factory.name(), "user");
/// assert!(factory.options().is_empty());
/// ```
pub struct Factory {
    name: String,
    options: FactoryOptions,
    recipe: Recipe,
    defined_at: &'static Location<'static>,
}

impl Factory {
    /// Creates a factory from a recipe closure.
    ///
    /// The caller's source location is recorded for diagnostics.
    #[track_caller]
    pub fn new<F>(name: impl Into<String>, options: FactoryOptions, recipe: F) -> Self
    where
        F: Fn(&BuildContext<'_>) -> BuildResult<Product> + Send + Sync + 'static,
    {
        Self::from_recipe(name, options, Arc::new(recipe))
    }

    /// Creates a factory from a shared recipe.
    #[track_caller]
    pub fn from_recipe(name: impl Into<String>, options: FactoryOptions, recipe: Recipe) -> Self {
        Self {
            name: name.into(),
            options,
            recipe,
            defined_at: Location::caller(),
        }
    }

    /// Creates a factory whose recipe produces an empty mapping.
    #[track_caller]
    pub fn blank(name: impl Into<String>, options: FactoryOptions) -> Self {
        Self::new(name, options, |_| Ok(Product::map()))
    }

    /// Returns the factory name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the factory options.
    #[must_use]
    pub const fn options(&self) -> &FactoryOptions {
        &self.options
    }

    /// Returns where the factory was defined.
    #[must_use]
    pub const fn defined_at(&self) -> &'static Location<'static> {
        self.defined_at
    }

    /// Evaluates the recipe.
    ///
    /// The result and any error are returned unchanged.
    pub fn invoke(&self, ctx: &BuildContext<'_>) -> BuildResult<Product> {
        (self.recipe)(ctx)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("defined_at", &format_args!("{}", self.defined_at))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_from_json_object() {
        let options = FactoryOptions::from(json!({"class": "User", "accessories": ["bell"]}));
        assert_eq!(options.len(), 2);
        assert_eq!(options.get_str("class"), Some("User"));
        assert_eq!(options.get("accessories"), Some(&json!(["bell"])));
    }

    #[test]
    fn test_options_from_non_object_is_empty() {
        assert!(FactoryOptions::from(json!("User")).is_empty());
    }

    #[test]
    fn test_options_from_iterator_keeps_order() {
        let options: FactoryOptions = [("b", 1), ("a", 2)].into_iter().collect();
        let keys: Vec<&str> = options.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_factory_records_definition_site() {
        let factory = Factory::blank("animal", FactoryOptions::new());
        assert!(factory.defined_at().file().ends_with("factory.rs"));
        assert!(format!("{factory:?}").contains("animal"));
    }
}
