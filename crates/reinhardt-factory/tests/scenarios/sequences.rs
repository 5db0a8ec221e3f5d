//! Named and inline sequences.

use reinhardt_factory::prelude::*;
use rstest::rstest;

use crate::common::fixtures::ctx;

#[rstest]
fn test_named_sequence_counts_up(ctx: FactoryContext) {
	ctx.define_sequence("marker", |n| format!("={n}"));

	let values: Vec<String> = (0..3)
		.map(|_| ctx.next_sequence("marker").unwrap().as_str().unwrap().to_string())
		.collect();

	assert_eq!(values, ["=1", "=2", "=3"]);
}

#[rstest]
fn test_named_sequences_are_independent(ctx: FactoryContext) {
	ctx.define_sequence("left", |n| n);
	ctx.define_sequence_from("right", 100, |n| n);

	assert_eq!(ctx.next_sequence("left").unwrap().as_i64(), Some(1));
	assert_eq!(ctx.next_sequence("right").unwrap().as_i64(), Some(100));
	assert_eq!(ctx.next_sequence("left").unwrap().as_i64(), Some(2));
	assert_eq!(ctx.next_sequence(":right").unwrap().as_i64(), Some(101));
}

#[rstest]
fn test_missing_sequence(ctx: FactoryContext) {
	let result = ctx.next_sequence("nothing");
	assert!(matches!(result, Err(FactoryError::SequenceNotFound(name)) if name == "nothing"));
}

#[rstest]
fn test_named_sequence_inside_factory(ctx: FactoryContext) {
	ctx.define_sequence("email", |n| format!("person{n}@example.com"));
	ctx.define("user", FactoryOptions::new(), |f| {
		f.dynamic("email", |e| e.next_sequence("email"))?;
		Ok(())
	})
	.unwrap();

	let first = ctx.attributes_for("user", Overrides::new()).unwrap();
	let second = ctx.attributes_for("user", Overrides::new()).unwrap();

	assert_eq!(first["email"], "person1@example.com");
	assert_eq!(second["email"], "person2@example.com");
	// shared with direct callers
	assert_eq!(ctx.next_sequence("email").unwrap(), "person3@example.com");
}

#[rstest]
fn test_overridden_sequence_is_not_advanced(ctx: FactoryContext) {
	ctx.define("user", FactoryOptions::new(), |f| {
		f.sequence("username", |n| format!("user{n}"))?;
		Ok(())
	})
	.unwrap();

	let fixed = ctx
		.attributes_for("user", Overrides::new().with("username", "fixed"))
		.unwrap();
	let generated = ctx.attributes_for("user", Overrides::new()).unwrap();

	assert_eq!(fixed["username"], "fixed");
	assert_eq!(generated["username"], "user1");
}

#[rstest]
fn test_inline_sequence_is_shared_with_children(ctx: FactoryContext) {
	ctx.define("user", FactoryOptions::new(), |f| {
		f.sequence("username", |n| format!("user{n}"))?;
		Ok(())
	})
	.unwrap();
	ctx.define("admin", FactoryOptions::new().parent("user"), |_| Ok(()))
		.unwrap();

	let user = ctx.attributes_for("user", Overrides::new()).unwrap();
	let admin = ctx.attributes_for("admin", Overrides::new()).unwrap();

	assert_eq!(user["username"], "user1");
	assert_eq!(admin["username"], "user2");
}

#[rstest]
fn test_sequence_from_start(ctx: FactoryContext) {
	ctx.define("ticket", FactoryOptions::new(), |f| {
		f.sequence_from("number", 500, |n| n)?;
		Ok(())
	})
	.unwrap();

	let numbers: Vec<Option<i64>> = (0..2)
		.map(|_| ctx.attributes_for("ticket", Overrides::new()).unwrap()["number"].as_i64())
		.collect();
	assert_eq!(numbers, [Some(500), Some(501)]);
}

#[rstest]
fn test_configured_sequence_start() {
	let ctx = FactoryContext::with_config(FactoryConfig::new().with_sequence_start(10));
	ctx.define("user", FactoryOptions::new(), |f| {
		f.sequence("username", |n| format!("user{n}"))?;
		Ok(())
	})
	.unwrap();
	ctx.define_sequence("global", |n| n);

	let user = ctx.attributes_for("user", Overrides::new()).unwrap();
	assert_eq!(user["username"], "user10");
	assert_eq!(ctx.next_sequence("global").unwrap().as_i64(), Some(10));
}

#[rstest]
fn test_sequence_handle_from_evaluator(ctx: FactoryContext) {
	ctx.define_sequence("slug", |n| format!("slug-{n}"));
	ctx.define("page", FactoryOptions::new(), |f| {
		f.dynamic("slug", |e| Ok(e.sequence("slug")?.next()))?;
		Ok(())
	})
	.unwrap();

	let page = ctx.attributes_for("page", Overrides::new()).unwrap();
	assert_eq!(page["slug"], "slug-1");
	assert_eq!(ctx.sequence("slug").unwrap().current(), 1);
}
