//! Attribute values, override sets and materialization results.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{FactoryError, FactoryResult};
use crate::model::{Instance, Model};
use crate::naming::canonical_name;
use crate::sequence::SequenceHandle;
use crate::strategy::StubInstance;

/// A value assigned to an attribute.
///
/// Plain data is carried as JSON. Associations resolve to [`Instance`] or
/// [`StubInstance`] values depending on the strategy.
#[derive(Debug, Clone)]
pub enum FieldValue {
	/// Plain data.
	Data(Value),

	/// A built or persisted model instance.
	Instance(Instance),

	/// A stubbed model instance.
	Stub(StubInstance),

	/// A raw sequence handle.
	///
	/// Never a valid attribute value. Dynamic attributes that produce one fail
	/// with [`FactoryError::SequenceAbuse`].
	Sequence(SequenceHandle),
}

impl FieldValue {
	/// JSON `null`.
	pub fn null() -> Self {
		Self::Data(Value::Null)
	}

	/// Returns the JSON data, if this is plain data.
	pub fn as_data(&self) -> Option<&Value> {
		match self {
			Self::Data(value) => Some(value),
			_ => None,
		}
	}

	/// Returns the string, if this is a JSON string.
	pub fn as_str(&self) -> Option<&str> {
		self.as_data().and_then(Value::as_str)
	}

	/// Returns the integer, if this is a JSON integer.
	pub fn as_i64(&self) -> Option<i64> {
		self.as_data().and_then(Value::as_i64)
	}

	/// Returns the boolean, if this is a JSON boolean.
	pub fn as_bool(&self) -> Option<bool> {
		self.as_data().and_then(Value::as_bool)
	}

	/// Returns true for JSON `null`.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Data(Value::Null))
	}

	/// Returns the built instance, if this is one.
	pub fn as_instance(&self) -> Option<&Instance> {
		match self {
			Self::Instance(instance) => Some(instance),
			_ => None,
		}
	}

	/// Returns the stub, if this is one.
	pub fn as_stub(&self) -> Option<&StubInstance> {
		match self {
			Self::Stub(stub) => Some(stub),
			_ => None,
		}
	}

	/// Unwraps a built instance as the model `M`.
	pub fn into_model<M: Model + Default>(self) -> Option<M> {
		match self {
			Self::Instance(instance) => instance.downcast::<M>().ok(),
			_ => None,
		}
	}

	/// Returns true for a raw sequence handle.
	pub fn is_sequence(&self) -> bool {
		matches!(self, Self::Sequence(_))
	}
}

impl Default for FieldValue {
	fn default() -> Self {
		Self::null()
	}
}

impl PartialEq<Value> for FieldValue {
	fn eq(&self, other: &Value) -> bool {
		self.as_data() == Some(other)
	}
}

impl PartialEq<&str> for FieldValue {
	fn eq(&self, other: &&str) -> bool {
		self.as_str() == Some(*other)
	}
}

impl From<Value> for FieldValue {
	fn from(value: Value) -> Self {
		Self::Data(value)
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		Self::Data(Value::from(value))
	}
}

impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		Self::Data(Value::from(value))
	}
}

impl From<bool> for FieldValue {
	fn from(value: bool) -> Self {
		Self::Data(Value::from(value))
	}
}

impl From<i32> for FieldValue {
	fn from(value: i32) -> Self {
		Self::Data(Value::from(value))
	}
}

impl From<i64> for FieldValue {
	fn from(value: i64) -> Self {
		Self::Data(Value::from(value))
	}
}

impl From<u64> for FieldValue {
	fn from(value: u64) -> Self {
		Self::Data(Value::from(value))
	}
}

impl From<f64> for FieldValue {
	fn from(value: f64) -> Self {
		Self::Data(Value::from(value))
	}
}

impl From<Instance> for FieldValue {
	fn from(value: Instance) -> Self {
		Self::Instance(value)
	}
}

impl From<StubInstance> for FieldValue {
	fn from(value: StubInstance) -> Self {
		Self::Stub(value)
	}
}

impl From<SequenceHandle> for FieldValue {
	fn from(value: SequenceHandle) -> Self {
		Self::Sequence(value)
	}
}

/// Caller-supplied values that take precedence over declared attributes.
///
/// Keys are stored in canonical form (see [`canonical_name`]); inserting a
/// key twice keeps the last value.
///
/// # Example
///
/// ```
/// use reinhardt_factory::Overrides;
///
/// let overrides = Overrides::new().with("first_name", "Bill").with(":admin", true);
/// assert_eq!(overrides.len(), 2);
/// assert!(overrides.contains("admin"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Overrides {
	values: BTreeMap<String, FieldValue>,
}

impl Overrides {
	/// Creates an empty override set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an override, returning the updated set.
	pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
		self.insert(name, value);
		self
	}

	/// Adds an override in place.
	pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
		self.values.insert(canonical_name(name), value.into());
	}

	/// Builds overrides from a JSON object.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::InvalidOption`] if `value` is not an object.
	pub fn from_json(value: Value) -> FactoryResult<Self> {
		match value {
			Value::Object(map) => Ok(map.into_iter().collect()),
			Value::Null => Ok(Self::new()),
			other => Err(FactoryError::InvalidOption {
				option: "overrides".to_string(),
				message: format!("expected an object, got {other}"),
			}),
		}
	}

	/// Returns the override for `name`.
	pub fn get(&self, name: &str) -> Option<&FieldValue> {
		self.values.get(&canonical_name(name))
	}

	/// Checks if `name` is overridden.
	pub fn contains(&self, name: &str) -> bool {
		self.values.contains_key(&canonical_name(name))
	}

	/// Iterates over the overridden names.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.values.keys().map(String::as_str)
	}

	/// Iterates over name/value pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
		self.values.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Returns the number of overrides.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns true if there are no overrides.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

impl<K: AsRef<str>, V: Into<FieldValue>> FromIterator<(K, V)> for Overrides {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut overrides = Self::new();
		for (name, value) in iter {
			overrides.insert(name.as_ref(), value);
		}
		overrides
	}
}

/// Result of the attributes-for strategy.
pub type AttributeMap = BTreeMap<String, FieldValue>;

/// What a factory run produces.
#[derive(Debug, Clone)]
pub enum Product {
	/// Plain attribute map (attributes-for).
	Attributes(AttributeMap),

	/// Unsaved or persisted instance (build, create).
	Instance(Instance),

	/// Detached stand-in (stub).
	Stub(StubInstance),
}

impl Product {
	fn kind_name(&self) -> &'static str {
		match self {
			Self::Attributes(_) => "attributes",
			Self::Instance(_) => "instance",
			Self::Stub(_) => "stub",
		}
	}

	/// Unwraps an attribute map.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::UnexpectedProduct`] for any other product.
	pub fn into_attributes(self) -> FactoryResult<AttributeMap> {
		match self {
			Self::Attributes(map) => Ok(map),
			other => Err(FactoryError::UnexpectedProduct {
				expected: "attributes",
				actual: other.kind_name(),
			}),
		}
	}

	/// Unwraps an instance.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::UnexpectedProduct`] for any other product.
	pub fn into_instance(self) -> FactoryResult<Instance> {
		match self {
			Self::Instance(instance) => Ok(instance),
			other => Err(FactoryError::UnexpectedProduct {
				expected: "instance",
				actual: other.kind_name(),
			}),
		}
	}

	/// Unwraps a stub.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::UnexpectedProduct`] for any other product.
	pub fn into_stub(self) -> FactoryResult<StubInstance> {
		match self {
			Self::Stub(stub) => Ok(stub),
			other => Err(FactoryError::UnexpectedProduct {
				expected: "stub",
				actual: other.kind_name(),
			}),
		}
	}
}
