//! Convenience re-exports for common usage.
//!
//! ```
//! use reinhardt_factory::prelude::*;
//!
//! let ctx = FactoryContext::new();
//! assert!(ctx.aliases_for("owner_id").contains("owner"));
//! ```

// Error types
pub use crate::error::{FactoryError, FactoryResult, ModelError};

// Definition
pub use crate::context::FactoryContext;
pub use crate::definition::{AssociationOptions, DefinitionProxy};
pub use crate::factory::FactoryOptions;

// Values
pub use crate::attribute::Evaluator;
pub use crate::value::{AttributeMap, FieldValue, Overrides, Product};

// Models
pub use crate::model::{Instance, Model, TargetType};
pub use crate::strategy::{StrategyKind, StubInstance};
pub use crate::syntax::ModelFactory;

// Configuration
pub use crate::config::FactoryConfig;
