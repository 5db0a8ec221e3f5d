//! Target model collaborator.
//!
//! Factories populate instances of types implementing [`Model`]. The core only
//! needs a zero-argument constructor, a setter and getter per field and, for the
//! create strategy, a persist operation.
//!
//! # Example
//!
//! ```
//! use reinhardt_factory::model::{Model, TargetType};
//! use reinhardt_factory::{FieldValue, ModelError};
//!
//! #[derive(Debug, Clone, Default)]
//! struct Tag {
//!     label: Option<String>,
//! }
//!
//! impl Model for Tag {
//!     fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), ModelError> {
//!         match field {
//!             "label" => self.label = value.as_str().map(str::to_owned),
//!             _ => return Err(ModelError::UnknownField { model: "Tag".into(), field: field.into() }),
//!         }
//!         Ok(())
//!     }
//!
//!     fn field(&self, field: &str) -> Option<FieldValue> {
//!         match field {
//!             "label" => self.label.clone().map(FieldValue::from),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let target = TargetType::of::<Tag>();
//! assert_eq!(target.name(), "Tag");
//! ```

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{FactoryError, FactoryResult, ModelError};
use crate::naming::type_name_of;
use crate::value::FieldValue;

/// Object-safe helpers every [`Model`] gets for free.
///
/// Implemented for all `Model + Clone` types; never implement it by hand.
pub trait ModelBase: Any {
	/// Clones the model behind a box.
	fn clone_model(&self) -> Box<dyn Model>;

	/// Returns the model as an `Any` reference for downcasting.
	fn as_any(&self) -> &dyn Any;

	/// Returns the model as a mutable `Any` reference for downcasting.
	fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Model + Clone> ModelBase for T {
	fn clone_model(&self) -> Box<dyn Model> {
		Box::new(self.clone())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}

/// A type that factories can build.
pub trait Model: ModelBase + fmt::Debug + Send + Sync {
	/// Assigns a value to the named field.
	fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), ModelError>;

	/// Reads the current value of the named field.
	fn field(&self, field: &str) -> Option<FieldValue>;

	/// Persists the instance.
	///
	/// Only the create strategy calls this. The default implementation reports
	/// the operation as unsupported.
	fn save(&mut self) -> Result<(), ModelError> {
		Err(ModelError::Unsupported("save".to_string()))
	}

	/// Returns true until the instance has been persisted.
	fn is_new_record(&self) -> bool {
		true
	}
}

type Constructor = Arc<dyn Fn() -> Box<dyn Model> + Send + Sync>;

/// A model type as seen by factories: its name and constructor.
#[derive(Clone)]
pub struct TargetType {
	name: String,
	constructor: Constructor,
}

impl TargetType {
	/// Describes the model type `M`, named after its short type name.
	pub fn of<M: Model + Default + Clone>() -> Self {
		Self {
			name: type_name_of::<M>().to_string(),
			constructor: Arc::new(|| Box::new(M::default()) as Box<dyn Model>),
		}
	}

	/// Describes a model with an explicit name and constructor.
	pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
	where
		F: Fn() -> Box<dyn Model> + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			constructor: Arc::new(constructor),
		}
	}

	/// Returns the model name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Constructs a fresh, unsaved instance.
	pub fn instantiate(&self) -> Instance {
		Instance {
			model_name: self.name.clone(),
			model: (self.constructor)(),
			detached: BTreeMap::new(),
		}
	}
}

impl fmt::Debug for TargetType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TargetType")
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

/// A type-erased model instance.
///
/// Besides the model itself an instance can carry detached values: values
/// assigned without going through the model's setters, such as the identity
/// and associations of a stub. Reads check detached values first.
#[derive(Debug)]
pub struct Instance {
	model_name: String,
	model: Box<dyn Model>,
	detached: BTreeMap<String, FieldValue>,
}

impl Instance {
	/// Wraps a concrete model.
	pub fn new<M: Model + Clone>(model: M) -> Self {
		Self {
			model_name: type_name_of::<M>().to_string(),
			model: Box::new(model),
			detached: BTreeMap::new(),
		}
	}

	/// Returns the model name.
	pub fn model_name(&self) -> &str {
		&self.model_name
	}

	/// Reads a detached value or, failing that, a field from the model.
	pub fn get(&self, field: &str) -> Option<FieldValue> {
		self.detached
			.get(field)
			.cloned()
			.or_else(|| self.model.field(field))
	}

	/// Returns the detached value stored under `name`.
	pub fn detached(&self, name: &str) -> Option<&FieldValue> {
		self.detached.get(name)
	}

	pub(crate) fn set_detached(&mut self, name: &str, value: FieldValue) {
		self.detached.insert(name.to_string(), value);
	}

	/// Returns true until the instance has been persisted.
	pub fn is_new_record(&self) -> bool {
		self.model.is_new_record()
	}

	/// Returns the underlying model.
	pub fn model(&self) -> &dyn Model {
		self.model.as_ref()
	}

	/// Returns the underlying model mutably.
	pub fn model_mut(&mut self) -> &mut dyn Model {
		self.model.as_mut()
	}

	/// Borrows the model as `M` if it is one.
	pub fn downcast_ref<M: Model>(&self) -> Option<&M> {
		self.model.as_any().downcast_ref::<M>()
	}

	/// Mutably borrows the model as `M` if it is one.
	pub fn downcast_mut<M: Model>(&mut self) -> Option<&mut M> {
		self.model.as_any_mut().downcast_mut::<M>()
	}

	/// Unwraps the model as `M`, handing the instance back if it is not one.
	///
	/// Detached values are dropped with the instance.
	pub fn downcast<M: Model + Default>(mut self) -> Result<M, Self> {
		match self.downcast_mut::<M>() {
			Some(model) => Ok(std::mem::take(model)),
			None => Err(self),
		}
	}
}

impl Clone for Instance {
	fn clone(&self) -> Self {
		Self {
			model_name: self.model_name.clone(),
			model: self.model.clone_model(),
			detached: self.detached.clone(),
		}
	}
}

/// Registry of model types addressable by name.
///
/// Factories that name their class by string, or derive it from their own
/// name, resolve it here.
#[derive(Debug, Default)]
pub struct ModelRegistry {
	types: RwLock<HashMap<String, TargetType>>,
}

impl ModelRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers the model type `M` under its short type name.
	pub fn register<M: Model + Default + Clone>(&self) {
		self.register_type(TargetType::of::<M>());
	}

	/// Registers a target type under its own name, replacing any previous entry.
	pub fn register_type(&self, target: TargetType) {
		tracing::debug!(model = %target.name(), "registering model type");
		self.types.write().insert(target.name().to_string(), target);
	}

	/// Looks up a model type by name.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::ModelNotFound`] if nothing is registered under `name`.
	pub fn resolve(&self, name: &str) -> FactoryResult<TargetType> {
		self.types
			.read()
			.get(name)
			.cloned()
			.ok_or_else(|| FactoryError::ModelNotFound(name.to_string()))
	}

	/// Checks if a model type is registered.
	pub fn has(&self, name: &str) -> bool {
		self.types.read().contains_key(name)
	}

	/// Returns the number of registered model types.
	pub fn len(&self) -> usize {
		self.types.read().len()
	}

	/// Returns true if no model types are registered.
	pub fn is_empty(&self) -> bool {
		self.types.read().is_empty()
	}

	/// Clears all model types.
	pub fn clear(&self) {
		self.types.write().clear();
	}
}
