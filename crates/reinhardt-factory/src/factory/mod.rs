//! Factory definitions and the run loop.
//!
//! A [`Factory`] is an ordered attribute template bound to a target type.
//! Running it against a strategy happens in a fixed order:
//!
//! 1. Override keys are already canonical (see [`Overrides`]).
//! 2. The strategy is instantiated for the factory's target type.
//! 3. Every override is assigned to the strategy.
//! 4. The covered set, the alias closure of the override keys, is computed once.
//! 5. Declared attributes not in the covered set are applied in declaration order.
//! 6. The strategy produces the result.

mod registry;

pub use registry::FactoryRegistry;

use std::collections::BTreeSet;

use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::attribute::Attribute;
use crate::context::FactoryContext;
use crate::error::{FactoryError, FactoryResult};
use crate::model::{Model, ModelRegistry, TargetType};
use crate::naming::{camelize, canonical_name};
use crate::strategy::StrategyKind;
use crate::value::{Overrides, Product};

/// How a factory names its target type.
#[derive(Debug, Clone)]
pub enum ClassRef {
	/// A model name resolved through the [`ModelRegistry`] at run time.
	Name(String),
	/// A concrete target type.
	Type(TargetType),
}

impl ClassRef {
	/// Returns the model name.
	pub fn name(&self) -> &str {
		match self {
			Self::Name(name) => name,
			Self::Type(target) => target.name(),
		}
	}
}

/// Options recognized by [`FactoryContext::define`].
#[derive(Debug, Clone, Default)]
pub struct FactoryOptions {
	class: Option<ClassRef>,
	parent: Option<String>,
	default_strategy: Option<StrategyKind>,
	aliases: Vec<String>,
}

impl FactoryOptions {
	/// Creates empty options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Names the target model; resolved through the model registry.
	pub fn class(mut self, name: impl Into<String>) -> Self {
		self.class = Some(ClassRef::Name(name.into()));
		self
	}

	/// Binds the target model type directly.
	pub fn class_type<M: Model + Default + Clone>(self) -> Self {
		self.target(TargetType::of::<M>())
	}

	/// Binds a target type directly.
	pub fn target(mut self, target: TargetType) -> Self {
		self.class = Some(ClassRef::Type(target));
		self
	}

	/// Inherits from the named factory.
	pub fn parent(mut self, parent: &str) -> Self {
		self.parent = Some(canonical_name(parent));
		self
	}

	/// Sets the strategy used by [`FactoryContext::materialize_default`].
	pub fn default_strategy(mut self, strategy: StrategyKind) -> Self {
		self.default_strategy = Some(strategy);
		self
	}

	pub(crate) fn has_class(&self) -> bool {
		self.class.is_some()
	}

	/// Registers an additional name for the factory.
	pub fn alias(mut self, alias: &str) -> Self {
		self.aliases.push(canonical_name(alias));
		self
	}

	/// Registers additional names for the factory.
	pub fn aliases<I, S>(mut self, aliases: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.aliases
			.extend(aliases.into_iter().map(|a| canonical_name(a.as_ref())));
		self
	}

	/// Parses options from a JSON object.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::UnknownOption`] for keys other than
	/// `class`, `parent`, `default_strategy` and `aliases`,
	/// [`FactoryError::UnknownStrategy`] for an unknown default strategy and
	/// [`FactoryError::InvalidOption`] for values of the wrong type.
	pub fn from_json(value: Value) -> FactoryResult<Self> {
		let map = match value {
			Value::Null => return Ok(Self::new()),
			Value::Object(map) => map,
			other => {
				return Err(FactoryError::InvalidOption {
					option: "options".to_string(),
					message: format!("expected an object, got {other}"),
				});
			}
		};

		let mut options = Self::new();
		for (key, value) in map {
			match key.as_str() {
				"class" => options = options.class(expect_str(&key, &value)?),
				"parent" => options = options.parent(expect_str(&key, &value)?),
				"default_strategy" => {
					options = options.default_strategy(expect_str(&key, &value)?.parse()?);
				}
				"aliases" => match &value {
					Value::String(alias) => options = options.alias(alias),
					Value::Array(items) => {
						for item in items {
							options = options.alias(expect_str(&key, item)?);
						}
					}
					_ => return Err(invalid(&key, "expected a string or an array of strings")),
				},
				_ => return Err(FactoryError::UnknownOption(key)),
			}
		}
		Ok(options)
	}
}

fn expect_str<'v>(key: &str, value: &'v Value) -> FactoryResult<&'v str> {
	value.as_str().ok_or_else(|| invalid(key, "expected a string"))
}

fn invalid(key: &str, message: &str) -> FactoryError {
	FactoryError::InvalidOption {
		option: key.to_string(),
		message: message.to_string(),
	}
}

/// A named attribute template.
#[derive(Debug)]
pub struct Factory {
	name: String,
	class: Option<ClassRef>,
	parent: Option<String>,
	default_strategy: Option<StrategyKind>,
	aliases: Vec<String>,
	attributes: Vec<Attribute>,
	target: OnceCell<TargetType>,
}

impl Factory {
	/// Creates an empty factory.
	pub fn new(name: &str, options: FactoryOptions) -> Self {
		let FactoryOptions {
			class,
			parent,
			default_strategy,
			aliases,
		} = options;
		Self {
			name: canonical_name(name),
			class,
			parent,
			default_strategy,
			aliases,
			attributes: Vec::new(),
			target: OnceCell::new(),
		}
	}

	/// Returns the factory name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the extra names the factory is registered under.
	pub fn aliases(&self) -> &[String] {
		&self.aliases
	}

	/// Iterates over the factory name followed by its aliases.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
	}

	/// Returns the parent factory name.
	pub fn parent(&self) -> Option<&str> {
		self.parent.as_deref()
	}

	/// Returns the declared (or inherited) default strategy.
	pub fn default_strategy(&self) -> Option<StrategyKind> {
		self.default_strategy
	}

	/// Returns the attributes in evaluation order.
	pub fn attributes(&self) -> &[Attribute] {
		&self.attributes
	}

	/// Returns the target model name: the declared class, or the camelized
	/// factory name.
	pub fn class_name(&self) -> String {
		match &self.class {
			Some(class) => class.name().to_string(),
			None => camelize(&self.name),
		}
	}

	fn refers_to_self(&self, factory: &str) -> bool {
		self.names().any(|name| name == factory)
	}

	/// Appends an attribute.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::AttributeDefinition`] if a non-callback
	/// attribute with the same name exists, and
	/// [`FactoryError::SelfReferencingAssociation`] if the attribute associates
	/// to this factory.
	pub fn add_attribute(&mut self, attribute: Attribute) -> FactoryResult<()> {
		if !attribute.is_callback()
			&& self
				.attributes
				.iter()
				.any(|a| !a.is_callback() && a.name() == attribute.name())
		{
			return Err(FactoryError::AttributeDefinition(format!(
				"Attribute already defined: {}",
				attribute.name()
			)));
		}
		if let Some(target) = attribute.association_factory() {
			if self.refers_to_self(target) {
				return Err(FactoryError::SelfReferencingAssociation {
					factory: self.name.clone(),
					attribute: attribute.name().to_string(),
				});
			}
		}
		self.attributes.push(attribute);
		Ok(())
	}

	/// Copies the parent's attributes the child does not redeclare, ahead of
	/// the child's own, and adopts the parent's class and default strategy
	/// where the child declared none.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::SelfReferencingAssociation`] if an inherited
	/// association points at this factory.
	pub fn inherit_from(&mut self, parent: &Factory) -> FactoryResult<()> {
		let declared: BTreeSet<&str> = self
			.attributes
			.iter()
			.filter(|a| !a.is_callback())
			.map(Attribute::name)
			.collect();

		let mut inherited = Vec::with_capacity(parent.attributes.len() + self.attributes.len());
		for attribute in &parent.attributes {
			if !attribute.is_callback() && declared.contains(attribute.name()) {
				continue;
			}
			if let Some(target) = attribute.association_factory() {
				if self.refers_to_self(target) {
					return Err(FactoryError::SelfReferencingAssociation {
						factory: self.name.clone(),
						attribute: attribute.name().to_string(),
					});
				}
			}
			inherited.push(attribute.clone());
		}

		inherited.append(&mut self.attributes);
		self.attributes = inherited;

		if self.class.is_none() {
			self.class = Some(match &parent.class {
				Some(class) => class.clone(),
				None => ClassRef::Name(parent.class_name()),
			});
		}
		if self.default_strategy.is_none() {
			self.default_strategy = parent.default_strategy;
		}
		Ok(())
	}

	/// Resolves the target type, caching it after the first success.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::ModelNotFound`] if the class is named and not
	/// registered.
	pub fn target(&self, models: &ModelRegistry) -> FactoryResult<&TargetType> {
		if let Some(target) = self.target.get() {
			return Ok(target);
		}
		let target = match &self.class {
			Some(ClassRef::Type(target)) => target.clone(),
			Some(ClassRef::Name(name)) => models.resolve(name)?,
			None => models.resolve(&self.class_name())?,
		};
		Ok(self.target.get_or_init(|| target))
	}

	/// Runs the factory with the given strategy.
	///
	/// The strategy is discarded on error, so a failed run leaves nothing
	/// observable behind.
	pub fn run(
		&self,
		ctx: &FactoryContext,
		kind: StrategyKind,
		overrides: Overrides,
	) -> FactoryResult<Product> {
		tracing::debug!(factory = %self.name, strategy = %kind, overrides = overrides.len(), "running factory");

		let mut strategy = kind.instantiate(ctx, self)?;

		for (name, value) in overrides.iter() {
			strategy.set(name, value.clone())?;
		}

		let covered = ctx.aliases().covered(overrides.keys());

		for attribute in &self.attributes {
			if !attribute.is_callback() && covered.contains(attribute.name()) {
				tracing::trace!(factory = %self.name, attribute = %attribute.name(), "attribute covered by override");
				continue;
			}
			attribute.add_to(strategy.as_mut(), ctx)?;
		}

		strategy.result()
	}
}
