//! Build strategies.
//!
//! A strategy is the execution context a factory run writes into. Each run
//! goes through the same three phases:
//!
//! 1. **Instantiate** - an empty map, a fresh model instance, or a stub.
//! 2. **Apply attributes** - overrides and declared attributes are `set`,
//!    associations are resolved through `associate`, callbacks are collected.
//! 3. **Finalize** - `result` runs the callbacks the strategy owns and
//!    produces the [`Product`].
//!
//! | Strategy        | Result                         | Associations       | Callbacks                   |
//! |-----------------|--------------------------------|--------------------|-----------------------------|
//! | `AttributesFor` | attribute map                  | ignored            | none                        |
//! | `Build`         | unsaved instance               | created            | `after_build`               |
//! | `Create`        | persisted instance             | created            | `after_build`, `after_create` |
//! | `Stub`          | detached stand-in              | stubbed            | `after_stub`                |

mod attributes_for;
mod build;
mod create;
mod stub;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attribute::{CallbackFn, CallbackKind};
use crate::context::FactoryContext;
use crate::error::{FactoryError, FactoryResult};
use crate::factory::Factory;
use crate::model::Instance;
use crate::value::{FieldValue, Overrides, Product};

pub(crate) use attributes_for::AttributesFor;
pub(crate) use build::Build;
pub(crate) use create::Create;
pub(crate) use stub::Stub;
pub use stub::StubInstance;

/// Selects what a factory run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
	/// A plain attribute map; associations are skipped.
	AttributesFor,
	/// An unsaved instance.
	Build,
	/// A persisted instance.
	#[default]
	Create,
	/// A detached stand-in that looks persisted.
	Stub,
}

impl StrategyKind {
	/// All strategies.
	pub const ALL: [StrategyKind; 4] = [Self::AttributesFor, Self::Build, Self::Create, Self::Stub];

	/// Returns the snake_case name of the strategy.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::AttributesFor => "attributes_for",
			Self::Build => "build",
			Self::Create => "create",
			Self::Stub => "stub",
		}
	}

	/// Creates the strategy for one run of `factory`.
	pub(crate) fn instantiate(
		self,
		ctx: &FactoryContext,
		factory: &Factory,
	) -> FactoryResult<Box<dyn Strategy>> {
		let strategy: Box<dyn Strategy> = match self {
			Self::AttributesFor => Box::new(AttributesFor::new()),
			Self::Build => Box::new(Build::new(factory.target(ctx.models())?.instantiate())),
			Self::Create => Box::new(Create::new(factory.target(ctx.models())?.instantiate())),
			Self::Stub => Box::new(Stub::new(
				factory.target(ctx.models())?.instantiate(),
				ctx.next_stub_id(),
			)),
		};
		Ok(strategy)
	}
}

impl fmt::Display for StrategyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for StrategyKind {
	type Err = FactoryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| FactoryError::UnknownStrategy(s.to_string()))
	}
}

/// Capabilities shared by all strategies.
pub(crate) trait Strategy {
	/// Reads a value assigned earlier in this run.
	fn get(&self, name: &str) -> Option<FieldValue>;

	/// Assigns a value.
	fn set(&mut self, name: &str, value: FieldValue) -> FactoryResult<()>;

	/// Resolves an association declared on the factory and assigns it to `name`.
	fn associate(
		&mut self,
		ctx: &FactoryContext,
		name: &str,
		factory: &str,
		overrides: &Overrides,
	) -> FactoryResult<()>;

	/// Resolves an association requested from a dynamic attribute.
	fn association(
		&self,
		ctx: &FactoryContext,
		factory: &str,
		overrides: &Overrides,
	) -> FactoryResult<FieldValue>;

	/// Registers a lifecycle callback.
	fn add_callback(&mut self, kind: CallbackKind, callback: CallbackFn);

	/// Finalizes the run.
	fn result(self: Box<Self>) -> FactoryResult<Product>;
}

/// Callback buckets, run in registration order.
#[derive(Default)]
pub(crate) struct Callbacks {
	buckets: HashMap<CallbackKind, Vec<CallbackFn>>,
}

impl Callbacks {
	pub(crate) fn add(&mut self, kind: CallbackKind, callback: CallbackFn) {
		self.buckets.entry(kind).or_default().push(callback);
	}

	pub(crate) fn run(&self, kind: CallbackKind, instance: &mut Instance) -> FactoryResult<()> {
		let Some(callbacks) = self.buckets.get(&kind) else {
			return Ok(());
		};
		tracing::trace!(callback = %kind, count = callbacks.len(), "running callbacks");
		for callback in callbacks {
			callback(instance)?;
		}
		Ok(())
	}

	#[cfg(test)]
	pub(crate) fn len(&self, kind: CallbackKind) -> usize {
		self.buckets.get(&kind).map_or(0, Vec::len)
	}
}
