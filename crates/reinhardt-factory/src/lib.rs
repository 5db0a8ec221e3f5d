//! Attribute factories for generating test data in the Reinhardt framework.
//!
//! Instead of writing fixture data by hand for every test, declare a
//! **factory** once and materialize records from it with per-call overrides:
//!
//! - **Attributes**: static values, dynamic blocks, associations to other
//!   factories, and lifecycle callbacks, evaluated in declaration order
//! - **Strategies**: a plain attribute map, an unsaved instance, a persisted
//!   instance, or a detached stub that refuses database access
//! - **Overrides and aliases**: caller values always win, and an override for
//!   `owner_id` also covers an attribute declared as `owner`
//! - **Inheritance**: child factories reuse and selectively replace their
//!   parent's attributes
//! - **Sequences**: per-name counters for unique values
//!
//! # Quick Start
//!
//! ```
//! use reinhardt_factory::prelude::*;
//!
//! let ctx = FactoryContext::new();
//! ctx.define("user", FactoryOptions::new(), |f| {
//!     f.attribute("first_name", "Jimi")?
//!         .attribute("last_name", "Hendrix")?
//!         .sequence("username", |n| format!("user{n}"))?
//!         .attribute("admin", false)?;
//!     Ok(())
//! })?;
//!
//! ctx.define("admin", FactoryOptions::new().parent("user"), |f| {
//!     f.attribute("admin", true)?;
//!     Ok(())
//! })?;
//!
//! let admin = ctx.attributes_for("admin", Overrides::new().with("first_name", "Ada"))?;
//! assert_eq!(admin["first_name"], "Ada");
//! assert_eq!(admin["last_name"], "Hendrix");
//! assert_eq!(admin["username"], "user1");
//! assert_eq!(admin["admin"], serde_json::json!(true));
//! # Ok::<(), FactoryError>(())
//! ```
//!
//! Building, creating and stubbing need a [`Model`] implementation for the
//! target type; see the [`model`] module.
//!
//! # Architecture
//!
//! - [`FactoryContext`] - owns factories, model types, sequences and alias rules
//! - [`Factory`] - ordered attribute template with inheritance
//! - [`Attribute`] - static, dynamic, association or callback declaration
//! - [`StrategyKind`] - selects what a run produces
//! - [`AliasTable`] - decides which attributes an override covers
//! - [`Sequence`] - monotonic value generator
//! - [`ModelFactory`] - `make`/`spawn`/`generate` shortcuts on model types
//!
//! # Configuration
//!
//! [`FactoryConfig`] can be built in code or loaded from TOML:
//!
//! ```toml
//! sequence_start = 1
//! default_strategy = "create"
//! default_aliases = true
//! detect_cycles = true
//! max_association_depth = 32
//! stub_id_start = 1000
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod aliases;
pub mod attribute;
pub mod config;
pub mod context;
pub mod definition;
pub mod error;
pub mod factory;
pub mod model;
pub mod naming;
pub mod prelude;
pub mod sequence;
pub mod strategy;
pub mod syntax;
pub mod value;

#[cfg(test)]
mod test_support;

// Re-export commonly used types at crate root
pub use aliases::{AliasRule, AliasTable};
pub use attribute::{Attribute, CallbackFn, CallbackKind, DynamicFn, Evaluator};
pub use config::{ConfigError, FactoryConfig};
pub use context::FactoryContext;
pub use definition::{AssociationOptions, DefinitionProxy};
pub use error::{FactoryError, FactoryResult, ModelError};
pub use factory::{ClassRef, Factory, FactoryOptions, FactoryRegistry};
pub use model::{Instance, Model, ModelRegistry, TargetType};
pub use sequence::{Sequence, SequenceHandle, SequenceRegistry};
pub use strategy::{StrategyKind, StubInstance};
pub use syntax::ModelFactory;
pub use value::{AttributeMap, FieldValue, Overrides, Product};
