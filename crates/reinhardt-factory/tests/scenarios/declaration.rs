//! Declaration and lookup errors.

use reinhardt_factory::prelude::*;
use reinhardt_factory::Sequence;
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;

use crate::common::fixtures::{ctx, factories};
use crate::common::models::User;

#[rstest]
fn test_self_referencing_association_fails_at_definition(ctx: FactoryContext) {
	let result = ctx.define("node", FactoryOptions::new(), |f| {
		let name = f.factory_name().to_string();
		f.attribute("label", "root")?
			.association("parent", AssociationOptions::new().factory(&name))?;
		Ok(())
	});

	assert!(matches!(
		result,
		Err(FactoryError::SelfReferencingAssociation { factory, attribute })
			if factory == "node" && attribute == "parent"
	));
	assert!(!ctx.factories().has("node"));
}

#[rstest]
fn test_duplicate_attribute(ctx: FactoryContext) {
	let result = ctx.define("user", FactoryOptions::new(), |f| {
		f.attribute("email", "a@example.com")?
			.dynamic("email", |_| Ok("b@example.com"))?;
		Ok(())
	});

	let error = result.unwrap_err();
	assert!(error.is_declaration_error());
	assert_eq!(error.to_string(), "Attribute definition error: Attribute already defined: email");
}

#[rstest]
#[case(json!({"class": "User", "model": "User"}), "model")]
#[case(json!({"strategy": "build"}), "strategy")]
fn test_unknown_option_key(#[case] options: serde_json::Value, #[case] key: &str) {
	let result = FactoryOptions::from_json(options);
	assert!(matches!(result, Err(FactoryError::UnknownOption(name)) if name == key));
}

#[rstest]
fn test_unknown_default_strategy() {
	let result = FactoryOptions::from_json(json!({"default_strategy": "non_existent"}));
	let error = result.unwrap_err();
	assert!(error.is_declaration_error());
	assert_eq!(error.to_string(), "Unknown strategy: non_existent");
}

#[rstest]
fn test_options_from_json_define(ctx: FactoryContext) {
	let options = FactoryOptions::from_json(json!({
		"class": "User",
		"default_strategy": "build",
		"aliases": ["person"],
	}))
	.unwrap();
	ctx.define("human", options, |f| {
		f.attribute("first_name", "Grace")?;
		Ok(())
	})
	.unwrap();

	let person = ctx.materialize_default("person", Overrides::new()).unwrap();
	let user = person.into_instance().unwrap().downcast::<User>().unwrap();
	assert_eq!(user.first_name.as_deref(), Some("Grace"));
	assert!(user.id.is_none());
}

#[rstest]
fn test_duplicate_factory_is_not_a_missing_factory(factories: FactoryContext) {
	let duplicate = factories.define("user", FactoryOptions::new(), |_| Ok(()));
	assert!(matches!(duplicate, Err(FactoryError::DuplicateFactory(name)) if name == "user"));

	let alias_clash = factories.define("writer", FactoryOptions::new().alias("article"), |_| Ok(()));
	assert!(matches!(alias_clash, Err(FactoryError::DuplicateFactory(name)) if name == "article"));
	assert!(!factories.factories().has("writer"));

	let missing = factories.build("ghost", Overrides::new());
	assert!(matches!(missing, Err(FactoryError::FactoryNotFound(name)) if name == "ghost"));
}

#[rstest]
fn test_missing_parent(ctx: FactoryContext) {
	let result = ctx.define("admin", FactoryOptions::new().parent("user"), |f| {
		f.attribute("admin", true)?;
		Ok(())
	});
	assert!(matches!(result, Err(FactoryError::FactoryNotFound(name)) if name == "user"));
	assert!(ctx.factories().is_empty());
}

#[rstest]
fn test_static_sequence_is_rejected(ctx: FactoryContext) {
	let result = ctx.define("user", FactoryOptions::new(), |f| {
		f.attribute("email", Arc::new(Sequence::new(|n| format!("u{n}@example.com"))))?;
		Ok(())
	});
	assert!(matches!(result, Err(FactoryError::AttributeDefinition(_))));
}

#[rstest]
fn test_returning_a_sequence_is_a_usage_error(ctx: FactoryContext) {
	ctx.define_sequence("email", |n| format!("person{n}@example.com"));
	ctx.define("user", FactoryOptions::new(), |f| {
		f.dynamic("email", |e| e.sequence("email"))?;
		Ok(())
	})
	.unwrap();

	let result = ctx.attributes_for("user", Overrides::new());
	assert!(matches!(result, Err(FactoryError::SequenceAbuse(name)) if name == "email"));
	// the sequence was never advanced
	assert_eq!(ctx.next_sequence("email").unwrap(), "person1@example.com");
}

#[rstest]
fn test_define_for_type(ctx: FactoryContext) {
	ctx.define_for::<User, _>(FactoryOptions::new(), |f| {
		f.attribute("first_name", "Typed")?;
		Ok(())
	})
	.unwrap();

	assert!(ctx.factories().has("user"));
	let user = ctx.build("user", Overrides::new()).unwrap();
	assert_eq!(user.model_name(), "User");
}

#[rstest]
fn test_reset_isolates_runs(factories: FactoryContext) {
	factories.define_sequence("n", |n| n);
	factories.add_alias("^(.+)_ref$", "$1").unwrap();

	factories.reset();

	assert!(factories.factories().is_empty());
	assert!(matches!(factories.next_sequence("n"), Err(FactoryError::SequenceNotFound(_))));
	assert!(!factories.aliases_for("owner_ref").contains("owner"));
	define_again(&factories);
}

fn define_again(ctx: &FactoryContext) {
	crate::common::fixtures::define_factories(ctx).unwrap();
	assert!(ctx.create("post", Overrides::new()).is_ok());
}
