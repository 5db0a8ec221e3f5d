//! Attribute declarations.
//!
//! A factory is an ordered list of [`Attribute`] values. Each one knows how to
//! apply itself to the active strategy:
//!
//! - [`Attribute::Static`] assigns a stored value.
//! - [`Attribute::Dynamic`] evaluates a block against an [`Evaluator`] and assigns the result.
//! - [`Attribute::Association`] asks the strategy to resolve another factory.
//! - [`Attribute::Callback`] registers a lifecycle hook with the strategy.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::context::FactoryContext;
use crate::error::{FactoryError, FactoryResult};
use crate::model::Instance;
use crate::naming::canonical_name;
use crate::sequence::SequenceHandle;
use crate::strategy::Strategy;
use crate::value::{FieldValue, Overrides};

/// Block computing a dynamic attribute.
pub type DynamicFn = Arc<dyn Fn(&Evaluator<'_>) -> FactoryResult<FieldValue> + Send + Sync>;

/// Lifecycle hook receiving the built instance.
pub type CallbackFn = Arc<dyn Fn(&mut Instance) -> FactoryResult<()> + Send + Sync>;

/// Lifecycle points a callback can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CallbackKind {
	/// After attributes are applied by the build and create strategies.
	AfterBuild,
	/// After the create strategy persisted the instance.
	AfterCreate,
	/// After the stub strategy assembled its stand-in.
	AfterStub,
}

impl CallbackKind {
	/// Returns the callback name.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::AfterBuild => "after_build",
			Self::AfterCreate => "after_create",
			Self::AfterStub => "after_stub",
		}
	}
}

impl fmt::Display for CallbackKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for CallbackKind {
	type Err = FactoryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match canonical_name(s).as_str() {
			"after_build" => Ok(Self::AfterBuild),
			"after_create" => Ok(Self::AfterCreate),
			"after_stub" => Ok(Self::AfterStub),
			_ => Err(FactoryError::UnknownCallback(s.to_string())),
		}
	}
}

/// One declaration inside a factory.
#[derive(Clone)]
pub enum Attribute {
	/// A value stored verbatim.
	Static {
		/// Attribute name.
		name: String,
		/// Assigned value.
		value: FieldValue,
	},

	/// A value computed on every run.
	Dynamic {
		/// Attribute name.
		name: String,
		/// Computation.
		block: DynamicFn,
	},

	/// A record produced by another factory.
	Association {
		/// Attribute name.
		name: String,
		/// Factory to materialize.
		factory: String,
		/// Overrides passed to that factory.
		overrides: Overrides,
	},

	/// A lifecycle hook.
	Callback {
		/// Lifecycle point.
		kind: CallbackKind,
		/// Hook body.
		block: CallbackFn,
	},
}

fn validate_name(name: &str) -> FactoryResult<String> {
	let name = canonical_name(name);
	if name.is_empty() {
		return Err(FactoryError::AttributeDefinition(
			"attribute name must not be empty".to_string(),
		));
	}
	if name.ends_with('=') {
		return Err(FactoryError::AttributeDefinition(format!(
			"attribute `{name}` looks like a setter; declare `{}` instead",
			name.trim_end_matches('=')
		)));
	}
	Ok(name)
}

impl Attribute {
	/// Declares a static attribute.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::AttributeDefinition`] for empty or setter-style
	/// names and for raw sequence values.
	pub fn static_value(name: &str, value: impl Into<FieldValue>) -> FactoryResult<Self> {
		let name = validate_name(name)?;
		let value = value.into();
		if value.is_sequence() {
			return Err(FactoryError::AttributeDefinition(format!(
				"attribute `{name}` stores a raw sequence; declare it with a sequence instead"
			)));
		}
		Ok(Self::Static { name, value })
	}

	/// Declares a dynamic attribute.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::AttributeDefinition`] for empty or setter-style names.
	pub fn dynamic(name: &str, block: DynamicFn) -> FactoryResult<Self> {
		Ok(Self::Dynamic {
			name: validate_name(name)?,
			block,
		})
	}

	/// Declares an association to `factory`.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::AttributeDefinition`] for empty or setter-style names.
	pub fn association(name: &str, factory: &str, overrides: Overrides) -> FactoryResult<Self> {
		Ok(Self::Association {
			name: validate_name(name)?,
			factory: canonical_name(factory),
			overrides,
		})
	}

	/// Declares a callback.
	pub fn callback(kind: CallbackKind, block: CallbackFn) -> Self {
		Self::Callback { kind, block }
	}

	/// Returns the attribute name; callbacks are named after their lifecycle point.
	pub fn name(&self) -> &str {
		match self {
			Self::Static { name, .. } | Self::Dynamic { name, .. } | Self::Association { name, .. } => {
				name
			}
			Self::Callback { kind, .. } => kind.as_str(),
		}
	}

	/// Returns true for callbacks.
	pub fn is_callback(&self) -> bool {
		matches!(self, Self::Callback { .. })
	}

	/// Returns the association target, if this is an association.
	pub fn association_factory(&self) -> Option<&str> {
		match self {
			Self::Association { factory, .. } => Some(factory),
			_ => None,
		}
	}

	/// Applies the attribute to a strategy.
	pub(crate) fn add_to(&self, strategy: &mut dyn Strategy, ctx: &FactoryContext) -> FactoryResult<()> {
		match self {
			Self::Static { name, value } => strategy.set(name, value.clone()),
			Self::Dynamic { name, block } => {
				let value = {
					let evaluator = Evaluator {
						attribute: name,
						strategy: &*strategy,
						context: ctx,
					};
					block(&evaluator)?
				};
				if value.is_sequence() {
					return Err(FactoryError::SequenceAbuse(name.clone()));
				}
				strategy.set(name, value)
			}
			Self::Association {
				name,
				factory,
				overrides,
			} => strategy.associate(ctx, name, factory, overrides),
			Self::Callback { kind, block } => {
				strategy.add_callback(*kind, Arc::clone(block));
				Ok(())
			}
		}
	}
}

impl fmt::Debug for Attribute {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Static { name, value } => f
				.debug_struct("Static")
				.field("name", name)
				.field("value", value)
				.finish(),
			Self::Dynamic { name, .. } => f
				.debug_struct("Dynamic")
				.field("name", name)
				.finish_non_exhaustive(),
			Self::Association {
				name,
				factory,
				overrides,
			} => f
				.debug_struct("Association")
				.field("name", name)
				.field("factory", factory)
				.field("overrides", overrides)
				.finish(),
			Self::Callback { kind, .. } => f
				.debug_struct("Callback")
				.field("kind", kind)
				.finish_non_exhaustive(),
		}
	}
}

/// Read access to a run in progress, handed to dynamic attribute blocks.
///
/// Values assigned earlier in the run (overrides first, then attributes in
/// declaration order) are visible through [`get`](Self::get).
pub struct Evaluator<'a> {
	attribute: &'a str,
	strategy: &'a dyn Strategy,
	context: &'a FactoryContext,
}

impl<'a> Evaluator<'a> {
	/// Returns the name of the attribute being computed.
	pub fn attribute_name(&self) -> &str {
		self.attribute
	}

	/// Reads a value assigned earlier in this run.
	pub fn get(&self, name: &str) -> Option<FieldValue> {
		self.strategy.get(&canonical_name(name))
	}

	/// Reads a string value assigned earlier in this run.
	pub fn get_str(&self, name: &str) -> Option<String> {
		self.get(name).and_then(|v| v.as_str().map(str::to_owned))
	}

	/// Resolves another factory the way the active strategy resolves
	/// associations: created for build and create, stubbed for stub, and
	/// `null` for attributes-for.
	pub fn association(&self, factory: &str, overrides: Overrides) -> FactoryResult<FieldValue> {
		self.strategy
			.association(self.context, &canonical_name(factory), &overrides)
	}

	/// Generates the next value of a named sequence.
	pub fn next_sequence(&self, name: &str) -> FactoryResult<FieldValue> {
		self.context.next_sequence(name)
	}

	/// Returns a named sequence without advancing it.
	///
	/// Returning the handle itself from a block is an error; call
	/// [`Sequence::next`](crate::Sequence::next) on it.
	pub fn sequence(&self, name: &str) -> FactoryResult<SequenceHandle> {
		self.context.sequence(name)
	}

	/// Returns the context the run belongs to.
	pub fn context(&self) -> &'a FactoryContext {
		self.context
	}
}
