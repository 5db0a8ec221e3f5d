//! Model-level shortcuts.
//!
//! [`ModelFactory`] is implemented for every model type and runs the factory
//! named after the type (`BlogPost` runs `blog_post`), returning the concrete
//! model instead of an [`Instance`].
//!
//! | Shortcut          | Strategy | On save failure            |
//! |-------------------|----------|----------------------------|
//! | `make`            | create   | error                      |
//! | `spawn`           | build    | not saved                  |
//! | `generate`        | build + save | unsaved instance returned |
//! | `generate_strict` | create   | error                      |

use crate::context::FactoryContext;
use crate::error::{FactoryError, FactoryResult};
use crate::model::{Instance, Model};
use crate::naming::{type_name_of, underscore};
use crate::value::Overrides;

fn into_model<M: Model + Default>(instance: Instance) -> FactoryResult<M> {
	instance
		.downcast::<M>()
		.map_err(|instance| FactoryError::ModelMismatch {
			expected: type_name_of::<M>().to_string(),
			actual: instance.model_name().to_string(),
		})
}

/// Factory shortcuts available on every model type.
pub trait ModelFactory: Model + Default + Clone + Sized {
	/// Returns the name of the factory used for this type.
	fn factory_name() -> String {
		underscore(type_name_of::<Self>())
	}

	/// Creates a persisted instance.
	fn make(ctx: &FactoryContext, overrides: Overrides) -> FactoryResult<Self> {
		into_model(ctx.create(&Self::factory_name(), overrides)?)
	}

	/// Creates a persisted instance and hands it to `then`.
	fn make_with<F>(ctx: &FactoryContext, overrides: Overrides, then: F) -> FactoryResult<Self>
	where
		F: FnOnce(&mut Self),
	{
		let mut model = Self::make(ctx, overrides)?;
		then(&mut model);
		Ok(model)
	}

	/// Builds an unsaved instance.
	fn spawn(ctx: &FactoryContext, overrides: Overrides) -> FactoryResult<Self> {
		into_model(ctx.build(&Self::factory_name(), overrides)?)
	}

	/// Builds an unsaved instance and hands it to `then`.
	fn spawn_with<F>(ctx: &FactoryContext, overrides: Overrides, then: F) -> FactoryResult<Self>
	where
		F: FnOnce(&mut Self),
	{
		let mut model = Self::spawn(ctx, overrides)?;
		then(&mut model);
		Ok(model)
	}

	/// Builds an instance and tries to save it.
	///
	/// A failed save is logged and the unsaved instance is returned, so the
	/// caller can inspect what went wrong.
	fn generate(ctx: &FactoryContext, overrides: Overrides) -> FactoryResult<Self> {
		let mut model = Self::spawn(ctx, overrides)?;
		if let Err(e) = model.save() {
			tracing::debug!(model = %type_name_of::<Self>(), error = %e, "generated instance was not saved");
		}
		Ok(model)
	}

	/// Like [`generate`](Self::generate), handing the instance to `then` after the save attempt.
	fn generate_with<F>(ctx: &FactoryContext, overrides: Overrides, then: F) -> FactoryResult<Self>
	where
		F: FnOnce(&mut Self),
	{
		let mut model = Self::generate(ctx, overrides)?;
		then(&mut model);
		Ok(model)
	}

	/// Builds and saves an instance, failing if the save fails.
	fn generate_strict(ctx: &FactoryContext, overrides: Overrides) -> FactoryResult<Self> {
		Self::make(ctx, overrides)
	}

	/// Like [`generate_strict`](Self::generate_strict), handing the instance to `then`.
	fn generate_strict_with<F>(ctx: &FactoryContext, overrides: Overrides, then: F) -> FactoryResult<Self>
	where
		F: FnOnce(&mut Self),
	{
		Self::make_with(ctx, overrides, then)
	}

	/// Creates `count` persisted instances.
	fn make_batch(ctx: &FactoryContext, count: usize, overrides: Overrides) -> FactoryResult<Vec<Self>> {
		ctx.create_batch(&Self::factory_name(), count, overrides)?
			.into_iter()
			.map(into_model::<Self>)
			.collect()
	}

	/// Builds `count` unsaved instances.
	fn spawn_batch(ctx: &FactoryContext, count: usize, overrides: Overrides) -> FactoryResult<Vec<Self>> {
		ctx.build_batch(&Self::factory_name(), count, overrides)?
			.into_iter()
			.map(into_model::<Self>)
			.collect()
	}
}

impl<M: Model + Default + Clone> ModelFactory for M {}
