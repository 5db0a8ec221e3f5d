//! Models shared by unit tests.

use std::collections::BTreeMap;

use crate::error::ModelError;
use crate::model::Model;
use crate::value::FieldValue;

/// Accepts any field and always saves.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scratch {
	pub(crate) fields: BTreeMap<String, FieldValue>,
	pub(crate) saved: bool,
}

impl Model for Scratch {
	fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), ModelError> {
		self.fields.insert(field.to_string(), value);
		Ok(())
	}

	fn field(&self, field: &str) -> Option<FieldValue> {
		self.fields.get(field).cloned()
	}

	fn save(&mut self) -> Result<(), ModelError> {
		self.saved = true;
		Ok(())
	}

	fn is_new_record(&self) -> bool {
		!self.saved
	}
}

/// A single `label` field that must be present to save.
#[derive(Debug, Clone, Default)]
pub(crate) struct Widget {
	pub(crate) label: Option<String>,
	pub(crate) saved: bool,
}

impl Model for Widget {
	fn set_field(&mut self, field: &str, value: FieldValue) -> Result<(), ModelError> {
		match field {
			"label" => {
				self.label = Some(value.as_str().map(str::to_owned).ok_or_else(|| {
					ModelError::InvalidValue {
						field: "label".to_string(),
						message: "expected a string".to_string(),
					}
				})?);
				Ok(())
			}
			_ => Err(ModelError::UnknownField {
				model: "Widget".to_string(),
				field: field.to_string(),
			}),
		}
	}

	fn field(&self, field: &str) -> Option<FieldValue> {
		match field {
			"label" => self.label.clone().map(FieldValue::from),
			_ => None,
		}
	}

	fn save(&mut self) -> Result<(), ModelError> {
		if self.label.as_deref().is_none_or(str::is_empty) {
			return Err(ModelError::Validation(vec!["label can't be blank".to_string()]));
		}
		self.saved = true;
		Ok(())
	}

	fn is_new_record(&self) -> bool {
		!self.saved
	}
}
