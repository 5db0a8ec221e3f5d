//! Attribute name aliases.
//!
//! An override "covers" a declared attribute when the attribute's name is in
//! the alias closure of the override key. By default `owner_id` and `owner`
//! cover each other, so passing either one suppresses an attribute declared
//! under the other name.
//!
//! Patterns are regular expressions and replacements use the `regex` crate's
//! capture syntax (`$1`, `${1}_id`).

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;

use crate::error::{FactoryError, FactoryResult};

/// A single rewrite rule.
#[derive(Debug, Clone)]
pub struct AliasRule {
	pattern: Regex,
	replacement: String,
}

impl AliasRule {
	/// Compiles a rule.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::InvalidAliasPattern`] if `pattern` is not a valid regex.
	pub fn new(pattern: &str, replacement: impl Into<String>) -> FactoryResult<Self> {
		let pattern = Regex::new(pattern).map_err(|e| FactoryError::InvalidAliasPattern {
			pattern: pattern.to_string(),
			message: e.to_string(),
		})?;
		Ok(Self {
			pattern,
			replacement: replacement.into(),
		})
	}

	/// Returns the rewritten name if the rule matches `name`.
	pub fn apply(&self, name: &str) -> Option<String> {
		if !self.pattern.is_match(name) {
			return None;
		}
		let rewritten = self.pattern.replace(name, self.replacement.as_str());
		(!rewritten.is_empty()).then(|| rewritten.into_owned())
	}

	/// Returns the pattern source.
	pub fn pattern(&self) -> &str {
		self.pattern.as_str()
	}

	/// Returns the replacement template.
	pub fn replacement(&self) -> &str {
		&self.replacement
	}
}

static DEFAULT_RULES: Lazy<Vec<AliasRule>> = Lazy::new(|| {
	[(r"^(.+)_id$", "$1"), (r"^(.+)$", "${1}_id")]
		.into_iter()
		.filter_map(|(pattern, replacement)| AliasRule::new(pattern, replacement).ok())
		.collect()
});

/// The built-in `foo_id` <-> `foo` rules.
pub fn default_rules() -> Vec<AliasRule> {
	DEFAULT_RULES.clone()
}

/// Ordered, append-only list of alias rules.
#[derive(Debug, Default)]
pub struct AliasTable {
	rules: RwLock<Vec<AliasRule>>,
}

impl AliasTable {
	/// Creates a table without any rules.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Creates a table with the default rules.
	pub fn with_defaults() -> Self {
		Self {
			rules: RwLock::new(default_rules()),
		}
	}

	/// Appends a rule.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::InvalidAliasPattern`] if `pattern` is not a valid regex.
	pub fn alias(&self, pattern: &str, replacement: &str) -> FactoryResult<()> {
		let rule = AliasRule::new(pattern, replacement)?;
		tracing::debug!(pattern, replacement, "adding alias rule");
		self.rules.write().push(rule);
		Ok(())
	}

	/// Returns every name equivalent to `name`, including `name` itself.
	pub fn aliases_for(&self, name: &str) -> BTreeSet<String> {
		let mut names: BTreeSet<String> = self
			.rules
			.read()
			.iter()
			.filter_map(|rule| rule.apply(name))
			.collect();
		names.insert(name.to_string());
		names
	}

	/// Returns the union of the alias closures of all `names`.
	pub fn covered<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
		let rules = self.rules.read();
		let mut covered = BTreeSet::new();
		for name in names {
			covered.extend(rules.iter().filter_map(|rule| rule.apply(name)));
			covered.insert(name.to_string());
		}
		covered
	}

	/// Returns the number of rules.
	pub fn len(&self) -> usize {
		self.rules.read().len()
	}

	/// Returns true if the table has no rules.
	pub fn is_empty(&self) -> bool {
		self.rules.read().is_empty()
	}

	/// Drops all rules, optionally reinstalling the defaults.
	pub fn reset(&self, defaults: bool) {
		let mut rules = self.rules.write();
		rules.clear();
		if defaults {
			rules.extend(default_rules());
		}
	}
}
