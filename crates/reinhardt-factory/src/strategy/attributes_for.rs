//! Attribute map strategy.

use super::Strategy;
use crate::attribute::{CallbackFn, CallbackKind};
use crate::context::FactoryContext;
use crate::error::FactoryResult;
use crate::value::{AttributeMap, FieldValue, Overrides, Product};

/// Collects attribute values into a flat map.
///
/// Associations contribute nothing and callbacks are discarded, so the result
/// stays plain data.
#[derive(Debug, Default)]
pub(crate) struct AttributesFor {
	attributes: AttributeMap,
}

impl AttributesFor {
	pub(crate) fn new() -> Self {
		Self::default()
	}
}

impl Strategy for AttributesFor {
	fn get(&self, name: &str) -> Option<FieldValue> {
		self.attributes.get(name).cloned()
	}

	fn set(&mut self, name: &str, value: FieldValue) -> FactoryResult<()> {
		self.attributes.insert(name.to_string(), value);
		Ok(())
	}

	fn associate(
		&mut self,
		_ctx: &FactoryContext,
		_name: &str,
		_factory: &str,
		_overrides: &Overrides,
	) -> FactoryResult<()> {
		Ok(())
	}

	fn association(
		&self,
		_ctx: &FactoryContext,
		_factory: &str,
		_overrides: &Overrides,
	) -> FactoryResult<FieldValue> {
		Ok(FieldValue::null())
	}

	fn add_callback(&mut self, _kind: CallbackKind, _callback: CallbackFn) {}

	fn result(self: Box<Self>) -> FactoryResult<Product> {
		Ok(Product::Attributes(self.attributes))
	}
}
