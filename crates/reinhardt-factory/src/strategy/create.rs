//! Persisted instance strategy.

use super::{Build, Strategy};
use crate::attribute::{CallbackFn, CallbackKind};
use crate::context::FactoryContext;
use crate::error::{FactoryError, FactoryResult};
use crate::model::Instance;
use crate::value::{FieldValue, Overrides, Product};

/// Builds a model instance and persists it.
pub(crate) struct Create {
	build: Build,
}

impl Create {
	pub(crate) fn new(instance: Instance) -> Self {
		Self {
			build: Build::new(instance),
		}
	}
}

impl Strategy for Create {
	fn get(&self, name: &str) -> Option<FieldValue> {
		self.build.get(name)
	}

	fn set(&mut self, name: &str, value: FieldValue) -> FactoryResult<()> {
		self.build.set(name, value)
	}

	fn associate(
		&mut self,
		ctx: &FactoryContext,
		name: &str,
		factory: &str,
		overrides: &Overrides,
	) -> FactoryResult<()> {
		self.build.associate(ctx, name, factory, overrides)
	}

	fn association(
		&self,
		ctx: &FactoryContext,
		factory: &str,
		overrides: &Overrides,
	) -> FactoryResult<FieldValue> {
		self.build.association(ctx, factory, overrides)
	}

	fn add_callback(&mut self, kind: CallbackKind, callback: CallbackFn) {
		self.build.add_callback(kind, callback);
	}

	fn result(self: Box<Self>) -> FactoryResult<Product> {
		let (mut instance, callbacks) = self.build.finish()?;

		if let Err(e) = instance.model_mut().save() {
			tracing::warn!(model = %instance.model_name(), error = %e, "failed to persist instance");
			return Err(FactoryError::Persistence(e));
		}

		callbacks.run(CallbackKind::AfterCreate, &mut instance)?;
		Ok(Product::Instance(instance))
	}
}
