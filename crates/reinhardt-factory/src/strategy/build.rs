//! Unsaved instance strategy.

use super::{Callbacks, Strategy};
use crate::attribute::{CallbackFn, CallbackKind};
use crate::context::FactoryContext;
use crate::error::{FactoryError, FactoryResult};
use crate::model::Instance;
use crate::strategy::StrategyKind;
use crate::value::{FieldValue, Overrides, Product};

/// Builds a model instance without persisting it.
///
/// Associations are always created, so the built instance points at saved
/// records.
pub(crate) struct Build {
	pub(super) instance: Instance,
	pub(super) callbacks: Callbacks,
}

impl Build {
	pub(crate) fn new(instance: Instance) -> Self {
		Self {
			instance,
			callbacks: Callbacks::default(),
		}
	}

	/// Runs `after_build` callbacks and hands back the instance.
	pub(super) fn finish(mut self) -> FactoryResult<(Instance, Callbacks)> {
		self.callbacks
			.run(CallbackKind::AfterBuild, &mut self.instance)?;
		Ok((self.instance, self.callbacks))
	}
}

impl Strategy for Build {
	fn get(&self, name: &str) -> Option<FieldValue> {
		self.instance.get(name)
	}

	fn set(&mut self, name: &str, value: FieldValue) -> FactoryResult<()> {
		self.instance
			.model_mut()
			.set_field(name, value)
			.map_err(FactoryError::Field)
	}

	fn associate(
		&mut self,
		ctx: &FactoryContext,
		name: &str,
		factory: &str,
		overrides: &Overrides,
	) -> FactoryResult<()> {
		let associated = self.association(ctx, factory, overrides)?;
		self.set(name, associated)
	}

	fn association(
		&self,
		ctx: &FactoryContext,
		factory: &str,
		overrides: &Overrides,
	) -> FactoryResult<FieldValue> {
		tracing::debug!(factory, strategy = "create", "resolving association");
		let instance = ctx
			.materialize(StrategyKind::Create, factory, overrides.clone())?
			.into_instance()?;
		Ok(FieldValue::Instance(instance))
	}

	fn add_callback(&mut self, kind: CallbackKind, callback: CallbackFn) {
		self.callbacks.add(kind, callback);
	}

	fn result(self: Box<Self>) -> FactoryResult<Product> {
		let (instance, _) = self.finish()?;
		Ok(Product::Instance(instance))
	}
}
