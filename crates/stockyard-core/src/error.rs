//! Error types for Stockyard.
//!
//! This module provides the [`BuildError`] type, which is the standard error
//! type returned by `define`, `build` and every stage of the build chain.
//!
//! # Pass-through errors
//!
//! Errors raised inside a recipe or a custom stage are returned to the caller
//! of `build` exactly as they were produced. The registry and the built-in
//! stages never catch, wrap, or annotate them. Foreign error types enter the
//! [`BuildError`] world through [`BuildError::recipe`] and
//! [`BuildError::stage`], chosen by the recipe or stage author.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`BuildError`].
pub type BuildResult<T> = Result<T, BuildError>;

/// Kinds of errors for classification in tests and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A factory with the same name is already defined.
    DuplicateFactory,
    /// No factory with the requested name is defined.
    UndefinedFactory,
    /// Overrides could not be applied to the produced value.
    TypeMismatch,
    /// A record has no field with the given name.
    UnknownField,
    /// A record rejected the value assigned to a field.
    InvalidField,
    /// Nested builds exceeded the configured depth.
    CyclicBuild,
    /// Error raised by a recipe.
    Recipe,
    /// Error raised by a custom stage.
    Stage,
}

impl ErrorKind {
    /// Returns the snake_case name of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateFactory => "duplicate_factory",
            Self::UndefinedFactory => "undefined_factory",
            Self::TypeMismatch => "type_mismatch",
            Self::UnknownField => "unknown_field",
            Self::InvalidField => "invalid_field",
            Self::CyclicBuild => "cyclic_build",
            Self::Recipe => "recipe",
            Self::Stage => "stage",
        }
    }
}

/// Standard error type for Stockyard.
///
/// # Example
///
/// ```
/// use stockyard_core::{BuildError, ErrorKind};
///
/// let err = BuildError::duplicate("user");
/// assert_eq!(err.kind(), ErrorKind::DuplicateFactory);
/// assert!(err.to_string().contains("user"));
/// ```
#[derive(Error, Debug)]
pub enum BuildError {
    /// Raised by `define` when the name is already registered.
    #[error("factory `{name}' already defined")]
    DuplicateFactory {
        /// The offending factory name.
        name: String,
    },

    /// Raised by `build` when the name is not registered.
    #[error("factory `{name}' not defined")]
    UndefinedFactory {
        /// The offending factory name.
        name: String,
    },

    /// The merge stage could not apply overrides to the produced value.
    #[error("cannot apply overrides to {found} produced by factory `{factory}'")]
    TypeMismatch {
        /// The factory whose product was rejected.
        factory: String,
        /// Description of the product that could not be merged.
        found: String,
    },

    /// A record has no field with the given name.
    #[error("{model} has no field `{field}'")]
    UnknownField {
        /// Model name of the record.
        model: String,
        /// The field that was assigned.
        field: String,
    },

    /// A record rejected a field value.
    #[error("invalid value for {model}.{field}: {reason}")]
    InvalidField {
        /// Model name of the record.
        model: String,
        /// The field that was assigned.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Nested builds went deeper than the registry allows.
    #[error("build of `{name}' exceeded maximum depth {depth} ({trail})")]
    CyclicBuild {
        /// The factory that would have been built next.
        name: String,
        /// The configured maximum depth.
        depth: usize,
        /// Chain of factory names leading to the failure.
        trail: String,
    },

    /// Error raised by a recipe.
    #[error(transparent)]
    Recipe(anyhow::Error),

    /// Error raised by a custom stage.
    #[error("stage `{stage}' failed: {source}")]
    Stage {
        /// Name of the failing stage.
        stage: String,
        /// The underlying error.
        #[source]
        source: anyhow::Error,
    },
}

impl BuildError {
    /// Creates a duplicate factory error.
    #[must_use]
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateFactory { name: name.into() }
    }

    /// Creates an undefined factory error.
    #[must_use]
    pub fn undefined(name: impl Into<String>) -> Self {
        Self::UndefinedFactory { name: name.into() }
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(factory: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            factory: factory.into(),
            found: found.into(),
        }
    }

    /// Creates an unknown field error.
    #[must_use]
    pub fn unknown_field(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            model: model.into(),
            field: field.into(),
        }
    }

    /// Creates an invalid field error.
    #[must_use]
    pub fn invalid_field(
        model: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            model: model.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a cyclic build error.
    #[must_use]
    pub fn cyclic(name: impl Into<String>, depth: usize, trail: &[String]) -> Self {
        let name = name.into();
        let mut steps = trail.to_vec();
        steps.push(name.clone());
        Self::CyclicBuild {
            name,
            depth,
            trail: steps.join(" -> "),
        }
    }

    /// Wraps an arbitrary error raised while evaluating a recipe.
    ///
    /// ```
    /// use stockyard_core::BuildError;
    ///
    /// let err = BuildError::recipe(std::io::Error::other("disk full"));
    /// assert_eq!(err.to_string(), "disk full");
    /// ```
    pub fn recipe(source: impl Into<anyhow::Error>) -> Self {
        Self::Recipe(source.into())
    }

    /// Wraps an arbitrary error raised by a custom stage.
    pub fn stage(stage: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Stage {
            stage: stage.into(),
            source: source.into(),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateFactory { .. } => ErrorKind::DuplicateFactory,
            Self::UndefinedFactory { .. } => ErrorKind::UndefinedFactory,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::UnknownField { .. } => ErrorKind::UnknownField,
            Self::InvalidField { .. } => ErrorKind::InvalidField,
            Self::CyclicBuild { .. } => ErrorKind::CyclicBuild,
            Self::Recipe(_) => ErrorKind::Recipe,
            Self::Stage { .. } => ErrorKind::Stage,
        }
    }

    /// Returns the factory name for registry lookup errors.
    #[must_use]
    pub fn factory_name(&self) -> Option<&str> {
        match self {
            Self::DuplicateFactory { name }
            | Self::UndefinedFactory { name }
            | Self::CyclicBuild { name, .. } => Some(name),
            Self::TypeMismatch { factory, .. } => Some(factory),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_names_factory() {
        let err = BuildError::duplicate("user");
        assert_eq!(err.to_string(), "factory `user' already defined");
        assert_eq!(err.factory_name(), Some("user"));
    }

    #[test]
    fn test_undefined_message_names_factory() {
        let err = BuildError::undefined("ghost");
        assert_eq!(err.to_string(), "factory `ghost' not defined");
        assert_eq!(err.kind(), ErrorKind::UndefinedFactory);
    }

    #[test]
    fn test_cyclic_trail() {
        let err = BuildError::cyclic("a", 3, &["a".to_string(), "b".to_string()]);
        assert!(err.to_string().contains("a -> b -> a"));
        assert_eq!(err.kind(), ErrorKind::CyclicBuild);
    }

    #[test]
    fn test_recipe_error_is_transparent() {
        let err = BuildError::recipe(anyhow::anyhow!("boom"));
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.kind(), ErrorKind::Recipe);
        assert!(err.factory_name().is_none());
    }

    #[test]
    fn test_stage_error_keeps_source() {
        let err = BuildError::stage("persist", anyhow::anyhow!("no table"));
        assert!(err.to_string().contains("persist"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::TypeMismatch).unwrap();
        assert_eq!(json, "\"type_mismatch\"");
        assert_eq!(ErrorKind::TypeMismatch.as_str(), "type_mismatch");
    }
}
