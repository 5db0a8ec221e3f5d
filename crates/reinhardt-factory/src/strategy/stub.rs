//! Detached stand-in strategy.

use super::{Callbacks, Strategy, StrategyKind};
use crate::attribute::{CallbackFn, CallbackKind};
use crate::context::FactoryContext;
use crate::error::{FactoryError, FactoryResult, ModelError};
use crate::model::{Instance, Model};
use crate::value::{FieldValue, Overrides, Product};

/// A model instance that looks persisted but refuses database access.
///
/// Every stub carries a generated identity. Associated records are stubs as
/// well. Both are stored as detached values on the wrapped instance rather
/// than passed through the model's setters, so `after_stub` callbacks see
/// them too.
#[derive(Debug, Clone)]
pub struct StubInstance {
	id: u64,
	instance: Instance,
}

impl StubInstance {
	pub(crate) fn new(instance: Instance, id: u64) -> Self {
		let mut stub = Self { id, instance };
		stub.set_id(id);
		stub
	}

	fn set_id(&mut self, id: u64) {
		self.id = id;
		self.instance.set_detached("id", FieldValue::from(id));
	}

	/// Returns the generated identity.
	pub fn id(&self) -> u64 {
		self.id
	}

	/// Returns the model name.
	pub fn model_name(&self) -> &str {
		self.instance.model_name()
	}

	/// Stubs never look like new records.
	pub fn is_new_record(&self) -> bool {
		false
	}

	/// Reads a field, an association, or the generated `id`.
	pub fn get(&self, field: &str) -> Option<FieldValue> {
		self.instance.get(field)
	}

	/// Returns the stubbed association stored under `name`.
	pub fn association(&self, name: &str) -> Option<&StubInstance> {
		self.instance.detached(name).and_then(FieldValue::as_stub)
	}

	/// Returns the wrapped instance.
	pub fn instance(&self) -> &Instance {
		&self.instance
	}

	/// Borrows the wrapped model as `M` if it is one.
	pub fn downcast_ref<M: Model>(&self) -> Option<&M> {
		self.instance.downcast_ref::<M>()
	}

	/// Always fails: stubs cannot be reloaded.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::StubDatabaseAccess`].
	pub fn reload(&self) -> FactoryResult<()> {
		Err(self.database_access())
	}

	/// Always fails: stubs cannot be saved.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::StubDatabaseAccess`].
	pub fn save(&self) -> FactoryResult<()> {
		Err(self.database_access())
	}

	/// Always fails: stubs cannot be deleted.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::StubDatabaseAccess`].
	pub fn destroy(&self) -> FactoryResult<()> {
		Err(self.database_access())
	}

	/// Always fails: stubs have no database connection.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::StubDatabaseAccess`].
	pub fn connection(&self) -> FactoryResult<()> {
		Err(self.database_access())
	}

	fn database_access(&self) -> FactoryError {
		FactoryError::StubDatabaseAccess(self.model_name().to_string())
	}
}

/// Produces [`StubInstance`] values.
pub(crate) struct Stub {
	stub: StubInstance,
	callbacks: Callbacks,
}

impl Stub {
	pub(crate) fn new(instance: Instance, id: u64) -> Self {
		Self {
			stub: StubInstance::new(instance, id),
			callbacks: Callbacks::default(),
		}
	}
}

impl Strategy for Stub {
	fn get(&self, name: &str) -> Option<FieldValue> {
		self.stub.get(name)
	}

	fn set(&mut self, name: &str, value: FieldValue) -> FactoryResult<()> {
		if name == "id" {
			let id = value
				.as_data()
				.and_then(serde_json::Value::as_u64)
				.ok_or_else(|| {
					FactoryError::Field(ModelError::InvalidValue {
						field: "id".to_string(),
						message: "stub id must be a non-negative integer".to_string(),
					})
				})?;
			self.stub.set_id(id);
			return Ok(());
		}
		if value.as_stub().is_some() {
			self.stub.instance.set_detached(name, value);
			return Ok(());
		}
		self.stub
			.instance
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
		self.stub.instance.set_detached(name, associated);
		Ok(())
	}

	fn association(
		&self,
		ctx: &FactoryContext,
		factory: &str,
		overrides: &Overrides,
	) -> FactoryResult<FieldValue> {
		tracing::debug!(factory, strategy = "stub", "resolving association");
		let stub = ctx
			.materialize(StrategyKind::Stub, factory, overrides.clone())?
			.into_stub()?;
		Ok(FieldValue::Stub(stub))
	}

	fn add_callback(&mut self, kind: CallbackKind, callback: CallbackFn) {
		self.callbacks.add(kind, callback);
	}

	fn result(self: Box<Self>) -> FactoryResult<Product> {
		let Self {
			mut stub,
			callbacks,
		} = *self;
		callbacks.run(CallbackKind::AfterStub, &mut stub.instance)?;
		Ok(Product::Stub(stub))
	}
}
