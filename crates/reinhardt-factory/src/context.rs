//! The factory context.
//!
//! [`FactoryContext`] owns everything a test suite defines: factories, model
//! types, named sequences and alias rules. It is constructed explicitly and
//! passed around (or held in a fixture), so isolating tests is a matter of
//! building a fresh context or calling [`FactoryContext::reset`].
//!
//! # Example
//!
//! ```
//! use reinhardt_factory::{FactoryContext, FactoryOptions, Overrides};
//!
//! let ctx = FactoryContext::new();
//! ctx.define("user", FactoryOptions::new(), |f| {
//!     f.attribute("first_name", "Jimi")?
//!         .attribute("last_name", "Hendrix")?
//!         .dynamic("email", |e| {
//!             let first = e.get_str("first_name").unwrap_or_default();
//!             let last = e.get_str("last_name").unwrap_or_default();
//!             Ok(format!("{first}.{last}@x.com").to_lowercase())
//!         })?;
//!     Ok(())
//! })?;
//!
//! let user = ctx.attributes_for("user", Overrides::new().with("first_name", "Bill"))?;
//! assert_eq!(user["first_name"], "Bill");
//! assert_eq!(user["email"], "bill.hendrix@x.com");
//! # Ok::<(), reinhardt_factory::FactoryError>(())
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::aliases::AliasTable;
use crate::config::FactoryConfig;
use crate::definition::DefinitionProxy;
use crate::error::{FactoryError, FactoryResult};
use crate::factory::{Factory, FactoryOptions, FactoryRegistry};
use crate::model::{Instance, Model, ModelRegistry, TargetType};
use crate::naming::{canonical_name, type_name_of, underscore};
use crate::sequence::{Sequence, SequenceHandle, SequenceRegistry};
use crate::strategy::{StrategyKind, StubInstance};
use crate::value::{AttributeMap, FieldValue, Overrides, Product};

/// Factories, model types, sequences and alias rules for one test run.
#[derive(Debug)]
pub struct FactoryContext {
	config: FactoryConfig,
	factories: FactoryRegistry,
	models: ModelRegistry,
	sequences: SequenceRegistry,
	aliases: AliasTable,
	resolution: Mutex<HashMap<ThreadId, Vec<String>>>,
	stub_ids: AtomicU64,
}

impl Default for FactoryContext {
	fn default() -> Self {
		Self::new()
	}
}

impl FactoryContext {
	/// Creates a context with the default configuration.
	pub fn new() -> Self {
		Self::with_config(FactoryConfig::default())
	}

	/// Creates a context with the given configuration.
	pub fn with_config(config: FactoryConfig) -> Self {
		let aliases = if config.default_aliases {
			AliasTable::with_defaults()
		} else {
			AliasTable::empty()
		};
		Self {
			stub_ids: AtomicU64::new(config.stub_id_start),
			config,
			factories: FactoryRegistry::new(),
			models: ModelRegistry::new(),
			sequences: SequenceRegistry::new(),
			aliases,
			resolution: Mutex::new(HashMap::new()),
		}
	}

	/// Creates a context configured from a TOML file.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::Config`] if the file cannot be read or parsed.
	pub fn from_config_file(path: impl AsRef<Path>) -> FactoryResult<Self> {
		Ok(Self::with_config(FactoryConfig::from_file(path)?))
	}

	/// Returns the configuration.
	pub fn config(&self) -> &FactoryConfig {
		&self.config
	}

	/// Returns the factory registry.
	pub fn factories(&self) -> &FactoryRegistry {
		&self.factories
	}

	/// Returns the model registry.
	pub fn models(&self) -> &ModelRegistry {
		&self.models
	}

	/// Returns the alias table.
	pub fn aliases(&self) -> &AliasTable {
		&self.aliases
	}

	pub(crate) fn next_stub_id(&self) -> u64 {
		self.stub_ids.fetch_add(1, Ordering::Relaxed)
	}

	// Definition

	/// Defines and registers a factory.
	///
	/// `block` declares the attributes. If `options` names a parent, the
	/// parent's attributes are inherited afterwards. Nothing is registered
	/// unless every step succeeds.
	///
	/// # Errors
	///
	/// Returns any declaration error raised by `block`,
	/// [`FactoryError::FactoryNotFound`] if the parent does not exist and
	/// [`FactoryError::DuplicateFactory`] if the name or an alias is taken.
	pub fn define<F>(&self, name: &str, options: FactoryOptions, block: F) -> FactoryResult<Arc<Factory>>
	where
		F: FnOnce(&mut DefinitionProxy<'_>) -> FactoryResult<()>,
	{
		let name = canonical_name(name);
		if name.is_empty() {
			return Err(FactoryError::InvalidOption {
				option: "name".to_string(),
				message: "factory name must not be empty".to_string(),
			});
		}

		let mut factory = Factory::new(&name, options);
		block(&mut DefinitionProxy::new(&mut factory, self))?;
		self.register_factory(factory)
	}

	/// Defines a factory for the model type `M`, named after the type.
	///
	/// `M` is registered with the model registry and bound as the target
	/// unless `options` names a class.
	pub fn define_for<M, F>(&self, options: FactoryOptions, block: F) -> FactoryResult<Arc<Factory>>
	where
		M: Model + Default + Clone,
		F: FnOnce(&mut DefinitionProxy<'_>) -> FactoryResult<()>,
	{
		self.models.register::<M>();
		let options = if options.has_class() {
			options
		} else {
			options.class_type::<M>()
		};
		self.define(&underscore(type_name_of::<M>()), options, block)
	}

	/// Registers an already built factory, applying inheritance first.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::FactoryNotFound`] if the parent does not exist,
	/// [`FactoryError::SelfReferencingAssociation`] if an inherited
	/// association points back at the factory and
	/// [`FactoryError::DuplicateFactory`] if the name or an alias is taken.
	pub fn register_factory(&self, mut factory: Factory) -> FactoryResult<Arc<Factory>> {
		if let Some(parent) = factory.parent() {
			let parent = self.factories.get(parent)?;
			factory.inherit_from(&parent)?;
		}
		self.factories.register(factory)
	}

	/// Registers the model type `M`.
	pub fn register_model<M: Model + Default + Clone>(&self) {
		self.models.register::<M>();
	}

	/// Registers a target type.
	pub fn register_model_type(&self, target: TargetType) {
		self.models.register_type(target);
	}

	/// Looks up a factory by name or alias.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::FactoryNotFound`] if nothing is registered under `name`.
	pub fn factory(&self, name: &str) -> FactoryResult<Arc<Factory>> {
		self.factories.get(name)
	}

	// Materialization

	/// Runs the named factory with the given strategy.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::FactoryNotFound`] for unknown factories,
	/// [`FactoryError::CircularAssociation`] or
	/// [`FactoryError::AssociationDepthExceeded`] when association resolution
	/// loops, and any error raised while applying attributes or persisting.
	pub fn materialize(&self, kind: StrategyKind, name: &str, overrides: Overrides) -> FactoryResult<Product> {
		let factory = self.factories.get(name)?;
		let _guard = self.enter(factory.name())?;
		let product = factory.run(self, kind, overrides)?;
		tracing::debug!(factory = %factory.name(), strategy = %kind, "materialized");
		Ok(product)
	}

	/// Runs the named factory with its default strategy, falling back to the
	/// configured one.
	pub fn materialize_default(&self, name: &str, overrides: Overrides) -> FactoryResult<Product> {
		let kind = self
			.factories
			.get(name)?
			.default_strategy()
			.unwrap_or(self.config.default_strategy);
		self.materialize(kind, name, overrides)
	}

	/// Runs the named factory `count` times.
	pub fn materialize_batch(
		&self,
		kind: StrategyKind,
		name: &str,
		count: usize,
		overrides: Overrides,
	) -> FactoryResult<Vec<Product>> {
		(0..count)
			.map(|_| self.materialize(kind, name, overrides.clone()))
			.collect()
	}

	/// Returns the attribute map of the named factory.
	pub fn attributes_for(&self, name: &str, overrides: Overrides) -> FactoryResult<AttributeMap> {
		self.materialize(StrategyKind::AttributesFor, name, overrides)?
			.into_attributes()
	}

	/// Builds an unsaved instance.
	pub fn build(&self, name: &str, overrides: Overrides) -> FactoryResult<Instance> {
		self.materialize(StrategyKind::Build, name, overrides)?
			.into_instance()
	}

	/// Builds and persists an instance.
	pub fn create(&self, name: &str, overrides: Overrides) -> FactoryResult<Instance> {
		self.materialize(StrategyKind::Create, name, overrides)?
			.into_instance()
	}

	/// Builds a detached stand-in.
	pub fn stub(&self, name: &str, overrides: Overrides) -> FactoryResult<StubInstance> {
		self.materialize(StrategyKind::Stub, name, overrides)?
			.into_stub()
	}

	/// Builds `count` unsaved instances.
	pub fn build_batch(&self, name: &str, count: usize, overrides: Overrides) -> FactoryResult<Vec<Instance>> {
		self.materialize_batch(StrategyKind::Build, name, count, overrides)?
			.into_iter()
			.map(Product::into_instance)
			.collect()
	}

	/// Builds and persists `count` instances.
	pub fn create_batch(&self, name: &str, count: usize, overrides: Overrides) -> FactoryResult<Vec<Instance>> {
		self.materialize_batch(StrategyKind::Create, name, count, overrides)?
			.into_iter()
			.map(Product::into_instance)
			.collect()
	}

	fn enter(&self, name: &str) -> FactoryResult<ResolutionGuard<'_>> {
		if !self.config.detect_cycles {
			return Ok(ResolutionGuard { ctx: None });
		}

		let mut resolution = self.resolution.lock();
		let path = resolution.entry(thread::current().id()).or_default();
		if path.iter().any(|entered| entered == name) {
			let cycle = path
				.iter()
				.map(String::as_str)
				.chain(std::iter::once(name))
				.collect::<Vec<_>>()
				.join(" -> ");
			tracing::warn!(path = %cycle, "circular association");
			return Err(FactoryError::CircularAssociation { path: cycle });
		}
		if path.len() >= self.config.max_association_depth {
			tracing::warn!(factory = %name, depth = path.len(), "association depth limit reached");
			return Err(FactoryError::AssociationDepthExceeded(
				self.config.max_association_depth,
			));
		}
		path.push(name.to_string());
		Ok(ResolutionGuard { ctx: Some(self) })
	}

	// Sequences

	/// Defines a named sequence starting at the configured `sequence_start`,
	/// replacing any sequence with that name.
	pub fn define_sequence<F, V>(&self, name: &str, generator: F) -> SequenceHandle
	where
		F: Fn(i64) -> V + Send + Sync + 'static,
		V: Into<FieldValue>,
	{
		self.define_sequence_from(name, self.config.sequence_start, generator)
	}

	/// Defines a named sequence starting at `start`.
	pub fn define_sequence_from<F, V>(&self, name: &str, start: i64, generator: F) -> SequenceHandle
	where
		F: Fn(i64) -> V + Send + Sync + 'static,
		V: Into<FieldValue>,
	{
		self.sequences
			.define(canonical_name(name), Sequence::starting_at(start, generator))
	}

	/// Generates the next value of a named sequence.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::SequenceNotFound`] if no such sequence exists.
	pub fn next_sequence(&self, name: &str) -> FactoryResult<FieldValue> {
		self.sequences.next(&canonical_name(name))
	}

	/// Returns a named sequence without advancing it.
	pub fn sequence(&self, name: &str) -> FactoryResult<SequenceHandle> {
		self.sequences.get(&canonical_name(name))
	}

	// Aliases

	/// Appends an alias rule.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::InvalidAliasPattern`] if `pattern` is not a valid regex.
	pub fn add_alias(&self, pattern: &str, replacement: &str) -> FactoryResult<()> {
		self.aliases.alias(pattern, replacement)
	}

	/// Returns every name equivalent to `name`, `name` included.
	pub fn aliases_for(&self, name: &str) -> BTreeSet<String> {
		self.aliases.aliases_for(&canonical_name(name))
	}

	// Reset

	/// Clears factories and sequences, restores the configured alias rules and
	/// restarts stub identities. Registered model types are kept.
	pub fn reset(&self) {
		tracing::debug!("resetting factory context");
		self.clear_factories();
		self.clear_sequences();
		self.aliases.reset(self.config.default_aliases);
		self.resolution.lock().clear();
		self.stub_ids
			.store(self.config.stub_id_start, Ordering::Relaxed);
	}

	/// Removes every factory.
	pub fn clear_factories(&self) {
		self.factories.clear();
	}

	/// Removes every named sequence.
	pub fn clear_sequences(&self) {
		self.sequences.clear();
	}
}

/// Keeps a factory on the resolution path while it runs.
struct ResolutionGuard<'a> {
	ctx: Option<&'a FactoryContext>,
}

impl Drop for ResolutionGuard<'_> {
	fn drop(&mut self) {
		let Some(ctx) = self.ctx else {
			return;
		};
		let mut resolution = ctx.resolution.lock();
		let id = thread::current().id();
		if let Some(path) = resolution.get_mut(&id) {
			path.pop();
			if path.is_empty() {
				resolution.remove(&id);
			}
		}
	}
}
