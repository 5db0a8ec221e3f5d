//! Parent and child factories.

use reinhardt_factory::prelude::*;
use rstest::rstest;

use crate::common::fixtures::{ctx, factories};
use crate::common::models::User;

#[rstest]
fn test_child_inherits_parent_attributes(factories: FactoryContext) {
	let admin = factories.attributes_for("admin", Overrides::new()).unwrap();

	assert_eq!(admin["first_name"], "Jimi");
	assert_eq!(admin["last_name"], "Hendrix");
	assert_eq!(admin["email"], "jimi.hendrix@x.com");
	assert_eq!(admin["admin"], serde_json::json!(true));
}

#[rstest]
fn test_child_builds_parent_class(factories: FactoryContext) {
	let admin = factories.create("admin", Overrides::new()).unwrap();
	let admin = admin.downcast::<User>().unwrap();

	assert!(admin.admin);
	assert!(admin.id.is_some());
	assert_eq!(admin.first_name.as_deref(), Some("Jimi"));
}

#[rstest]
fn test_child_replaces_dynamic_parent_attribute(factories: FactoryContext) {
	factories
		.define("support", FactoryOptions::new().parent("user"), |f| {
			f.attribute("email", "support@example.com")?;
			Ok(())
		})
		.unwrap();

	let support = factories.attributes_for("support", Overrides::new()).unwrap();
	assert_eq!(support["email"], "support@example.com");
	assert_eq!(support["first_name"], "Jimi");
}

#[rstest]
fn test_child_dynamic_sees_inherited_values(ctx: FactoryContext) {
	ctx.define("person", FactoryOptions::new().class("User"), |f| {
		f.attribute("first_name", "Nina")?
			.attribute("last_name", "Simone")?;
		Ok(())
	})
	.unwrap();
	ctx.define("member", FactoryOptions::new().parent("person"), |f| {
		f.dynamic("username", |e| {
			Ok(e.get_str("first_name").unwrap_or_default().to_lowercase())
		})?;
		Ok(())
	})
	.unwrap();

	let member = ctx.attributes_for("member", Overrides::new()).unwrap();
	assert_eq!(member["username"], "nina");

	let renamed = ctx
		.attributes_for("member", Overrides::new().with("first_name", "Etta"))
		.unwrap();
	assert_eq!(renamed["username"], "etta");
}

#[rstest]
fn test_grandchild_inherits_through_parent(factories: FactoryContext) {
	factories
		.define("super_admin", FactoryOptions::new().parent("admin"), |f| {
			f.attribute("username", "root")?;
			Ok(())
		})
		.unwrap();

	let user = factories
		.build("super_admin", Overrides::new())
		.unwrap()
		.downcast::<User>()
		.unwrap();

	assert_eq!(user.username.as_deref(), Some("root"));
	assert!(user.admin);
	assert_eq!(user.last_name.as_deref(), Some("Hendrix"));
	assert!(user.id.is_none());
}

#[rstest]
fn test_child_keeps_parent_default_strategy(ctx: FactoryContext) {
	ctx.define(
		"draft_author",
		FactoryOptions::new()
			.class("User")
			.default_strategy(StrategyKind::Build),
		|f| {
			f.attribute("first_name", "Draft")?;
			Ok(())
		},
	)
	.unwrap();
	ctx.define("draft_editor", FactoryOptions::new().parent("draft_author"), |_| Ok(()))
		.unwrap();

	let editor = ctx
		.materialize_default("draft_editor", Overrides::new())
		.unwrap()
		.into_instance()
		.unwrap();
	assert!(editor.is_new_record());
	assert_eq!(editor.model_name(), "User");
}

#[rstest]
fn test_inherited_association_back_to_child_is_rejected(ctx: FactoryContext) {
	ctx.define("entry", FactoryOptions::new().class("Post"), |f| {
		f.attribute("title", "Entry")?
			.association("author", AssociationOptions::new().factory("reply"))?;
		Ok(())
	})
	.unwrap();

	let result = ctx.define("reply", FactoryOptions::new().parent("entry"), |_| Ok(()));
	assert!(matches!(
		result,
		Err(FactoryError::SelfReferencingAssociation { factory, .. }) if factory == "reply"
	));
	assert!(!ctx.factories().has("reply"));
}
