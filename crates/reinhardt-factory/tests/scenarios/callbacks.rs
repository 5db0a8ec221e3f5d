//! Lifecycle callbacks.

use std::sync::Arc;

use parking_lot::Mutex;
use reinhardt_factory::prelude::*;
use rstest::rstest;

use crate::common::fixtures::factories;
use crate::common::models::User;

type Log = Arc<Mutex<Vec<String>>>;

fn record(log: &Log, entry: &'static str) -> impl Fn(&mut Instance) -> FactoryResult<()> + Send + Sync + 'static {
	let log = Arc::clone(log);
	move |_: &mut Instance| {
		log.lock().push(entry.to_string());
		Ok(())
	}
}

fn define_logged(ctx: &FactoryContext, log: &Log) {
	ctx.define("logged_user", FactoryOptions::new().class("User"), |f| {
		f.attribute("first_name", "Kurt")?
			.attribute("last_name", "Cobain")?
			.attribute("email", "kurt@example.com")?
			.after_create(record(log, "parent after_create"))?
			.after_build(record(log, "parent after_build"))?
			.after_stub(record(log, "parent after_stub"))?;
		Ok(())
	})
	.unwrap();
	ctx.define("logged_admin", FactoryOptions::new().parent("logged_user"), |f| {
		f.attribute("admin", true)?
			.after_build(record(log, "child after_build"))?
			.after_create(record(log, "child after_create"))?;
		Ok(())
	})
	.unwrap();
}

#[rstest]
#[case(StrategyKind::AttributesFor, vec![])]
#[case(StrategyKind::Build, vec!["parent after_build", "child after_build"])]
#[case(
	StrategyKind::Create,
	vec!["parent after_build", "child after_build", "parent after_create", "child after_create"]
)]
#[case(StrategyKind::Stub, vec!["parent after_stub"])]
fn test_callbacks_per_strategy(factories: FactoryContext, #[case] kind: StrategyKind, #[case] expected: Vec<&str>) {
	let log: Log = Arc::default();
	define_logged(&factories, &log);

	factories
		.materialize(kind, "logged_admin", Overrides::new())
		.unwrap();

	assert_eq!(*log.lock(), expected);
}

#[rstest]
fn test_callbacks_are_not_covered_by_overrides(factories: FactoryContext) {
	let log: Log = Arc::default();
	define_logged(&factories, &log);

	factories
		.build("logged_user", Overrides::new().with("first_name", "Dave"))
		.unwrap();

	assert_eq!(*log.lock(), vec!["parent after_build"]);
}

#[rstest]
fn test_callback_modifies_instance(factories: FactoryContext) {
	factories
		.define("loud_user", FactoryOptions::new().parent("user"), |f| {
			f.after_build(|instance| {
				if let Some(user) = instance.downcast_mut::<User>() {
					user.first_name = user.first_name.as_deref().map(str::to_uppercase);
				}
				Ok(())
			})?;
			Ok(())
		})
		.unwrap();

	let user = factories
		.create("loud_user", Overrides::new())
		.unwrap()
		.downcast::<User>()
		.unwrap();

	assert_eq!(user.first_name.as_deref(), Some("JIMI"));
	assert!(user.id.is_some());
}

#[rstest]
fn test_failing_callback_aborts_run(factories: FactoryContext) {
	factories
		.define("picky_user", FactoryOptions::new().parent("user"), |f| {
			f.after_build(|_| Err(FactoryError::AttributeDefinition("rejected".to_string())))?;
			Ok(())
		})
		.unwrap();

	let result = factories.create("picky_user", Overrides::new());
	assert!(matches!(result, Err(FactoryError::AttributeDefinition(message)) if message == "rejected"));
}
