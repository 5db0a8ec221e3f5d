//! Sequences for unique attribute values.
//!
//! A [`Sequence`] owns a counter and a generator. Every call to
//! [`Sequence::next`] advances the counter first and then hands the new value
//! to the generator, so a sequence starting at 1 yields `gen(1)`, `gen(2)`, ...
//!
//! # Example
//!
//! ```
//! use reinhardt_factory::Sequence;
//!
//! let sequence = Sequence::new(|n| format!("user{n}@example.com"));
//! assert_eq!(sequence.next(), "user1@example.com");
//! assert_eq!(sequence.next(), "user2@example.com");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{FactoryError, FactoryResult};
use crate::value::FieldValue;

type Generator = Arc<dyn Fn(i64) -> FieldValue + Send + Sync>;

/// Shared handle to a sequence.
pub type SequenceHandle = Arc<Sequence>;

/// Monotonic counter paired with a value generator.
pub struct Sequence {
	current: Mutex<i64>,
	generator: Generator,
}

impl Sequence {
	/// Creates a sequence whose first value is generated from 1.
	pub fn new<F, V>(generator: F) -> Self
	where
		F: Fn(i64) -> V + Send + Sync + 'static,
		V: Into<FieldValue>,
	{
		Self::starting_at(1, generator)
	}

	/// Creates a sequence whose first value is generated from `start`.
	pub fn starting_at<F, V>(start: i64, generator: F) -> Self
	where
		F: Fn(i64) -> V + Send + Sync + 'static,
		V: Into<FieldValue>,
	{
		Self {
			current: Mutex::new(start.wrapping_sub(1)),
			generator: Arc::new(move |n| generator(n).into()),
		}
	}

	/// Advances the counter and generates the value for it.
	pub fn next(&self) -> FieldValue {
		let value = {
			let mut current = self.current.lock();
			*current = current.wrapping_add(1);
			*current
		};
		tracing::trace!(value, "sequence advanced");
		(self.generator)(value)
	}

	/// Returns the most recently generated counter value.
	pub fn current(&self) -> i64 {
		*self.current.lock()
	}
}

impl fmt::Debug for Sequence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Sequence")
			.field("current", &self.current())
			.finish_non_exhaustive()
	}
}

/// Named sequences, independent of each other.
#[derive(Debug, Default)]
pub struct SequenceRegistry {
	sequences: RwLock<HashMap<String, SequenceHandle>>,
}

impl SequenceRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Defines a named sequence, replacing any previous one with that name.
	pub fn define(&self, name: impl Into<String>, sequence: Sequence) -> SequenceHandle {
		let name = name.into();
		let handle = Arc::new(sequence);
		tracing::debug!(sequence = %name, "defining sequence");
		self.sequences.write().insert(name, Arc::clone(&handle));
		handle
	}

	/// Returns the raw sequence registered under `name`.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::SequenceNotFound`] if no such sequence exists.
	pub fn get(&self, name: &str) -> FactoryResult<SequenceHandle> {
		self.sequences
			.read()
			.get(name)
			.cloned()
			.ok_or_else(|| FactoryError::SequenceNotFound(name.to_string()))
	}

	/// Generates the next value of the named sequence.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::SequenceNotFound`] if no such sequence exists.
	pub fn next(&self, name: &str) -> FactoryResult<FieldValue> {
		// Release the registry lock before running the generator
		let sequence = self.get(name)?;
		Ok(sequence.next())
	}

	/// Checks if a sequence is defined.
	pub fn has(&self, name: &str) -> bool {
		self.sequences.read().contains_key(name)
	}

	/// Returns the number of defined sequences.
	pub fn len(&self) -> usize {
		self.sequences.read().len()
	}

	/// Returns true if no sequences are defined.
	pub fn is_empty(&self) -> bool {
		self.sequences.read().is_empty()
	}

	/// Removes all sequences.
	pub fn clear(&self) {
		self.sequences.write().clear();
	}
}
