//! Error types for the factory module.
//!
//! This module defines the error types used throughout the reinhardt-factory crate.
//! Errors fall into four groups: declaration errors raised while a factory is
//! being defined, lookup errors raised by registries, usage errors raised while
//! attributes are evaluated, and errors reported by the target model itself.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors reported by a target model implementation.
///
/// Models return these from [`Model::set_field`](crate::model::Model::set_field)
/// and [`Model::save`](crate::model::Model::save).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
	/// The model has no field with the given name.
	#[error("Unknown field `{field}` on {model}")]
	UnknownField {
		/// Model name.
		model: String,
		/// Field name.
		field: String,
	},

	/// The value cannot be stored in the field.
	#[error("Invalid value for `{field}`: {message}")]
	InvalidValue {
		/// Field name.
		field: String,
		/// Description of the mismatch.
		message: String,
	},

	/// The instance failed validation while being persisted.
	#[error("Validation failed: {}", .0.join(", "))]
	Validation(Vec<String>),

	/// The model does not support the requested operation.
	#[error("Unsupported operation: {0}")]
	Unsupported(String),

	/// Any other model failure.
	#[error("{0}")]
	Other(String),
}

/// Errors that can occur while defining or running factories.
#[derive(Debug, Error)]
pub enum FactoryError {
	/// An option key that factories do not recognize.
	#[error("Unknown factory option: {0}")]
	UnknownOption(String),

	/// A recognized option with a value of the wrong shape.
	#[error("Invalid value for factory option `{option}`: {message}")]
	InvalidOption {
		/// Option key.
		option: String,
		/// Description of the problem.
		message: String,
	},

	/// A strategy name that does not match any strategy.
	#[error("Unknown strategy: {0}")]
	UnknownStrategy(String),

	/// A callback name other than `after_build`, `after_create` or `after_stub`.
	#[error("Unknown callback: {0}")]
	UnknownCallback(String),

	/// An attribute declaration was rejected.
	#[error("Attribute definition error: {0}")]
	AttributeDefinition(String),

	/// An association pointing back at the factory that declares it.
	#[error("Self-referencing association `{attribute}` in factory `{factory}`")]
	SelfReferencingAssociation {
		/// Declaring factory.
		factory: String,
		/// Association attribute name.
		attribute: String,
	},

	/// An alias pattern that is not a valid regular expression.
	#[error("Invalid alias pattern `{pattern}`: {message}")]
	InvalidAliasPattern {
		/// The rejected pattern.
		pattern: String,
		/// Regex compiler message.
		message: String,
	},

	/// No factory is registered under the name.
	#[error("No such factory: {0}")]
	FactoryNotFound(String),

	/// A factory (or one of its aliases) is already registered under the name.
	#[error("Factory already registered: {0}")]
	DuplicateFactory(String),

	/// No sequence is defined under the name.
	#[error("No such sequence: {0}")]
	SequenceNotFound(String),

	/// No model type is registered under the name.
	#[error("Model not found: {0}")]
	ModelNotFound(String),

	/// A dynamic attribute returned a raw sequence instead of its next value.
	#[error("Dynamic attribute `{0}` returned a sequence; call next() on it instead")]
	SequenceAbuse(String),

	/// Association resolution re-entered a factory that is still being built.
	#[error("Circular association detected: {path}")]
	CircularAssociation {
		/// Resolution path, e.g. `post -> user -> post`.
		path: String,
	},

	/// Association resolution nested deeper than the configured limit.
	#[error("Association depth limit exceeded: {0}")]
	AssociationDepthExceeded(usize),

	/// A product was unwrapped as a kind it is not.
	#[error("Expected {expected} result, got {actual}")]
	UnexpectedProduct {
		/// Requested product kind.
		expected: &'static str,
		/// Actual product kind.
		actual: &'static str,
	},

	/// An instance could not be unwrapped as the requested model type.
	#[error("Expected a {expected} instance, got {actual}")]
	ModelMismatch {
		/// Requested model type.
		expected: String,
		/// Model the instance actually holds.
		actual: String,
	},

	/// A stubbed instance was asked to talk to the database.
	#[error("Stubbed {0} is not allowed to access the database")]
	StubDatabaseAccess(String),

	/// Assigning a value to a model field failed.
	#[error("Field error: {0}")]
	Field(#[source] ModelError),

	/// The model's persist operation failed.
	#[error(transparent)]
	Persistence(ModelError),

	/// Configuration could not be loaded.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

impl FactoryError {
	/// Returns true for errors raised while a factory is being declared.
	pub fn is_declaration_error(&self) -> bool {
		matches!(
			self,
			Self::UnknownOption(_)
				| Self::InvalidOption { .. }
				| Self::UnknownStrategy(_)
				| Self::UnknownCallback(_)
				| Self::AttributeDefinition(_)
				| Self::SelfReferencingAssociation { .. }
				| Self::InvalidAliasPattern { .. }
		)
	}

	/// Returns true for registry lookup failures.
	pub fn is_lookup_error(&self) -> bool {
		matches!(
			self,
			Self::FactoryNotFound(_)
				| Self::DuplicateFactory(_)
				| Self::SequenceNotFound(_)
				| Self::ModelNotFound(_)
		)
	}
}

/// Result type alias for factory operations.
pub type FactoryResult<T> = Result<T, FactoryError>;
