//! Factory registry.
//!
//! Maps factory names, and the aliases factories declare, to their
//! definitions. Each [`FactoryContext`](crate::FactoryContext) owns one.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::Factory;
use crate::error::{FactoryError, FactoryResult};
use crate::naming::canonical_name;

/// Name to factory mapping.
#[derive(Debug, Default)]
pub struct FactoryRegistry {
	factories: RwLock<HashMap<String, Arc<Factory>>>,
}

impl FactoryRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a factory under its name and every alias.
	///
	/// Either every name is registered or none is.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::DuplicateFactory`] if any of the names is taken.
	pub fn register(&self, factory: Factory) -> FactoryResult<Arc<Factory>> {
		let mut factories = self.factories.write();
		if let Some(taken) = factory.names().find(|name| factories.contains_key(*name)) {
			return Err(FactoryError::DuplicateFactory(taken.to_string()));
		}

		let factory = Arc::new(factory);
		for name in factory.names() {
			factories.insert(name.to_string(), Arc::clone(&factory));
		}
		tracing::debug!(
			factory = %factory.name(),
			aliases = ?factory.aliases(),
			attributes = factory.attributes().len(),
			"registered factory"
		);
		Ok(factory)
	}

	/// Gets a factory by name or alias.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::FactoryNotFound`] if nothing is registered under `name`.
	pub fn get(&self, name: &str) -> FactoryResult<Arc<Factory>> {
		let name = canonical_name(name);
		self.factories
			.read()
			.get(&name)
			.cloned()
			.ok_or(FactoryError::FactoryNotFound(name))
	}

	/// Checks if a factory is registered under `name`.
	pub fn has(&self, name: &str) -> bool {
		self.factories.read().contains_key(&canonical_name(name))
	}

	/// Returns every registered name, aliases included, sorted.
	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
		names.sort();
		names
	}

	/// Returns the number of registered names.
	pub fn len(&self) -> usize {
		self.factories.read().len()
	}

	/// Returns true if no factories are registered.
	pub fn is_empty(&self) -> bool {
		self.factories.read().is_empty()
	}

	/// Clears all factories.
	pub fn clear(&self) {
		self.factories.write().clear();
	}
}
