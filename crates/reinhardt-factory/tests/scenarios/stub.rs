//! Detached stand-ins.

use std::collections::BTreeSet;

use reinhardt_factory::prelude::*;
use rstest::rstest;

use crate::common::fixtures::factories;
use crate::common::models::{Post, User};

#[rstest]
fn test_stub_association_is_a_stub(factories: FactoryContext) {
	let post = factories.stub("post", Overrides::new()).unwrap();

	assert_eq!(post.model_name(), "Post");
	assert!(!post.is_new_record());
	assert_eq!(post.get("title").unwrap(), "Through the Looking Glass");

	let author = post.association("author").unwrap();
	assert_eq!(author.model_name(), "User");
	assert!(!author.is_new_record());
	assert_eq!(author.get("first_name").unwrap(), "Jimi");
	// the association never went through the model's setter
	assert!(post.downcast_ref::<Post>().unwrap().author.is_none());
}

#[rstest]
fn test_stub_ids_are_distinct(factories: FactoryContext) {
	let stubs: Vec<StubInstance> = (0..3)
		.map(|_| factories.stub("user", Overrides::new()).unwrap())
		.collect();
	let ids: BTreeSet<u64> = stubs.iter().map(StubInstance::id).collect();

	assert_eq!(ids.len(), 3);
	assert!(ids.iter().all(|id| *id >= 1000));
}

#[rstest]
fn test_stub_id_can_be_overridden(factories: FactoryContext) {
	let user = factories
		.stub("user", Overrides::new().with("id", 7u64))
		.unwrap();
	assert_eq!(user.id(), 7);
	assert_eq!(user.get("id").and_then(|v| v.as_i64()), Some(7));
}

#[rstest]
fn test_stub_refuses_database_access(factories: FactoryContext) {
	let user = factories.stub("user", Overrides::new()).unwrap();

	let error = user.reload().unwrap_err();
	assert_eq!(error.to_string(), "Stubbed User is not allowed to access the database");
	assert!(user.save().is_err());
	assert!(user.destroy().is_err());
	assert!(user.connection().is_err());
}

#[rstest]
fn test_stub_never_persists(factories: FactoryContext) {
	let user = factories.stub("user", Overrides::new()).unwrap();
	let model = user.downcast_ref::<User>().unwrap();
	assert!(model.id.is_none());
	assert!(model.is_new_record());
}

#[rstest]
fn test_stub_overrides(factories: FactoryContext) {
	let admin = factories
		.stub("admin", Overrides::new().with("last_name", "Page"))
		.unwrap();

	assert_eq!(admin.get("last_name").unwrap(), "Page");
	assert_eq!(admin.get("email").unwrap(), "jimi.page@x.com");
	assert_eq!(admin.get("admin").and_then(|v| v.as_bool()), Some(true));
}

#[rstest]
fn test_after_stub_callback_modifies_stub(factories: FactoryContext) {
	factories
		.define("stubbed_user", FactoryOptions::new().parent("user"), |f| {
			f.after_stub(|instance| {
				instance
					.model_mut()
					.set_field("username", FieldValue::from("stubbed"))
					.map_err(FactoryError::Field)
			})?;
			Ok(())
		})
		.unwrap();

	let user = factories.stub("stubbed_user", Overrides::new()).unwrap();
	assert_eq!(user.get("username").unwrap(), "stubbed");

	let built = factories.build("stubbed_user", Overrides::new()).unwrap();
	assert!(built.get("username").is_none());
}

#[rstest]
fn test_after_stub_callback_sees_associations(factories: FactoryContext) {
	factories
		.define("checked_post", FactoryOptions::new().parent("post"), |f| {
			f.after_stub(|instance| {
				let author = instance
					.get("author")
					.and_then(|author| author.as_stub().map(|stub| stub.get("first_name")));
				let label = match author {
					Some(Some(name)) => format!("by {}", name.as_str().unwrap_or_default()),
					_ => "anonymous".to_string(),
				};
				instance
					.model_mut()
					.set_field("body", FieldValue::from(label))
					.map_err(FactoryError::Field)
			})?;
			Ok(())
		})
		.unwrap();

	let post = factories.stub("checked_post", Overrides::new()).unwrap();

	assert_eq!(post.get("body").unwrap(), "by Jimi");
	assert!(post.association("author").is_some());
}

#[rstest]
#[case(serde_json::json!(-1))]
#[case(serde_json::json!("abc"))]
fn test_invalid_stub_id_override(factories: FactoryContext, #[case] id: serde_json::Value) {
	let result = factories.stub("user", Overrides::new().with("id", id));

	let error = result.unwrap_err();
	assert_eq!(
		error.to_string(),
		"Field error: Invalid value for `id`: stub id must be a non-negative integer"
	);
}
