//! Declaration builder handed to [`FactoryContext::define`].
//!
//! Every method adds exactly one attribute to the factory being defined, in
//! the order the calls are made, and returns the proxy again so calls chain
//! with `?`:
//!
//! ```
//! use reinhardt_factory::{FactoryContext, FactoryOptions};
//!
//! let ctx = FactoryContext::new();
//! ctx.define("user", FactoryOptions::new(), |f| {
//!     f.attribute("first_name", "Jimi")?
//!         .attribute("last_name", "Hendrix")?
//!         .sequence("email", |n| format!("person{n}@example.com"))?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let attributes = ctx.attributes_for("user", Default::default()).unwrap();
//! assert_eq!(attributes["email"], "person1@example.com");
//! ```

use std::sync::Arc;

use crate::attribute::{Attribute, CallbackKind, DynamicFn, Evaluator};
use crate::context::FactoryContext;
use crate::error::{FactoryError, FactoryResult};
use crate::factory::Factory;
use crate::model::Instance;
use crate::naming::canonical_name;
use crate::sequence::Sequence;
use crate::value::{FieldValue, Overrides};

/// Options for [`DefinitionProxy::association`].
#[derive(Debug, Clone, Default)]
pub struct AssociationOptions {
	factory: Option<String>,
	overrides: Overrides,
}

impl AssociationOptions {
	/// Creates options that associate to the factory named like the attribute.
	pub fn new() -> Self {
		Self::default()
	}

	/// Associates to `factory` instead of the factory named like the attribute.
	pub fn factory(mut self, factory: &str) -> Self {
		self.factory = Some(canonical_name(factory));
		self
	}

	/// Replaces the overrides passed to the associated factory.
	pub fn overrides(mut self, overrides: Overrides) -> Self {
		self.overrides = overrides;
		self
	}

	/// Adds one override passed to the associated factory.
	pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
		self.overrides.insert(name, value);
		self
	}
}

/// Adds attributes to a factory under definition.
pub struct DefinitionProxy<'a> {
	factory: &'a mut Factory,
	context: &'a FactoryContext,
}

impl<'a> DefinitionProxy<'a> {
	pub(crate) fn new(factory: &'a mut Factory, context: &'a FactoryContext) -> Self {
		Self { factory, context }
	}

	/// Returns the name of the factory being defined.
	pub fn factory_name(&self) -> &str {
		self.factory.name()
	}

	/// Adds a static or dynamic attribute; exactly one of `value` and `block`
	/// must be given.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::AttributeDefinition`] if both or neither are
	/// given, or if the attribute itself is rejected.
	pub fn add_attribute(
		&mut self,
		name: &str,
		value: Option<FieldValue>,
		block: Option<DynamicFn>,
	) -> FactoryResult<&mut Self> {
		let attribute = match (value, block) {
			(Some(_), Some(_)) => {
				return Err(FactoryError::AttributeDefinition(format!(
					"Both value and block given for `{}`",
					canonical_name(name)
				)));
			}
			(None, None) => {
				return Err(FactoryError::AttributeDefinition(format!(
					"No value or block given for `{}`",
					canonical_name(name)
				)));
			}
			(Some(value), None) => Attribute::static_value(name, value)?,
			(None, Some(block)) => Attribute::dynamic(name, block)?,
		};
		self.push(attribute)
	}

	/// Declares a static attribute.
	pub fn attribute(&mut self, name: &str, value: impl Into<FieldValue>) -> FactoryResult<&mut Self> {
		let attribute = Attribute::static_value(name, value)?;
		self.push(attribute)
	}

	/// Declares a dynamic attribute, evaluated on every run.
	pub fn dynamic<F, V>(&mut self, name: &str, block: F) -> FactoryResult<&mut Self>
	where
		F: Fn(&Evaluator<'_>) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<FieldValue>,
	{
		let block: DynamicFn =
			Arc::new(move |evaluator: &Evaluator<'_>| block(evaluator).map(Into::into));
		let attribute = Attribute::dynamic(name, block)?;
		self.push(attribute)
	}

	/// Declares an association.
	pub fn association(&mut self, name: &str, options: AssociationOptions) -> FactoryResult<&mut Self> {
		let AssociationOptions { factory, overrides } = options;
		let factory = factory.unwrap_or_else(|| canonical_name(name));
		let attribute = Attribute::association(name, &factory, overrides)?;
		self.push(attribute)
	}

	/// Declares an attribute backed by its own sequence, starting at the
	/// configured `sequence_start`.
	pub fn sequence<F, V>(&mut self, name: &str, generator: F) -> FactoryResult<&mut Self>
	where
		F: Fn(i64) -> V + Send + Sync + 'static,
		V: Into<FieldValue>,
	{
		let start = self.context.config().sequence_start;
		self.sequence_from(name, start, generator)
	}

	/// Declares an attribute backed by its own sequence, starting at `start`.
	pub fn sequence_from<F, V>(&mut self, name: &str, start: i64, generator: F) -> FactoryResult<&mut Self>
	where
		F: Fn(i64) -> V + Send + Sync + 'static,
		V: Into<FieldValue>,
	{
		let sequence = Arc::new(Sequence::starting_at(start, generator));
		let block: DynamicFn = Arc::new(move |_: &Evaluator<'_>| Ok(sequence.next()));
		let attribute = Attribute::dynamic(name, block)?;
		self.push(attribute)
	}

	/// Registers an `after_build` callback.
	pub fn after_build<F>(&mut self, block: F) -> FactoryResult<&mut Self>
	where
		F: Fn(&mut Instance) -> FactoryResult<()> + Send + Sync + 'static,
	{
		self.add_callback(CallbackKind::AfterBuild, block)
	}

	/// Registers an `after_create` callback.
	pub fn after_create<F>(&mut self, block: F) -> FactoryResult<&mut Self>
	where
		F: Fn(&mut Instance) -> FactoryResult<()> + Send + Sync + 'static,
	{
		self.add_callback(CallbackKind::AfterCreate, block)
	}

	/// Registers an `after_stub` callback.
	pub fn after_stub<F>(&mut self, block: F) -> FactoryResult<&mut Self>
	where
		F: Fn(&mut Instance) -> FactoryResult<()> + Send + Sync + 'static,
	{
		self.add_callback(CallbackKind::AfterStub, block)
	}

	/// Registers a callback by lifecycle name.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::UnknownCallback`] for names other than
	/// `after_build`, `after_create` and `after_stub`.
	pub fn callback<F>(&mut self, name: &str, block: F) -> FactoryResult<&mut Self>
	where
		F: Fn(&mut Instance) -> FactoryResult<()> + Send + Sync + 'static,
	{
		let kind = name.parse::<CallbackKind>()?;
		self.add_callback(kind, block)
	}

	fn add_callback<F>(&mut self, kind: CallbackKind, block: F) -> FactoryResult<&mut Self>
	where
		F: Fn(&mut Instance) -> FactoryResult<()> + Send + Sync + 'static,
	{
		self.push(Attribute::callback(kind, Arc::new(block)))
	}

	fn push(&mut self, attribute: Attribute) -> FactoryResult<&mut Self> {
		self.factory.add_attribute(attribute)?;
		Ok(self)
	}
}
