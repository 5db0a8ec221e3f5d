//! Factory fixtures.
//!
//! `ctx` is an empty context with the test models registered; `factories`
//! adds the user/admin/post/business factories most scenarios need.

use reinhardt_factory::prelude::*;
use rstest::fixture;

use super::models::{Business, Post, User};

#[fixture]
pub fn ctx() -> FactoryContext {
	let ctx = FactoryContext::new();
	ctx.register_model::<User>();
	ctx.register_model::<Post>();
	ctx.register_model::<Business>();
	ctx
}

#[fixture]
pub fn factories(ctx: FactoryContext) -> FactoryContext {
	define_factories(&ctx).unwrap();
	ctx
}

pub fn define_factories(ctx: &FactoryContext) -> FactoryResult<()> {
	ctx.define("user", FactoryOptions::new(), |f| {
		f.attribute("first_name", "Jimi")?
			.attribute("last_name", "Hendrix")?
			.dynamic("email", |e| {
				let first = e.get_str("first_name").unwrap_or_default();
				let last = e.get_str("last_name").unwrap_or_default();
				Ok(format!("{first}.{last}@x.com").to_lowercase())
			})?
			.attribute("admin", false)?;
		Ok(())
	})?;

	ctx.define("admin", FactoryOptions::new().parent("user"), |f| {
		f.attribute("admin", true)?;
		Ok(())
	})?;

	ctx.define("post", FactoryOptions::new().alias("article"), |f| {
		f.attribute("title", "Through the Looking Glass")?
			.association("author", AssociationOptions::new().factory("user"))?;
		Ok(())
	})?;

	ctx.define("business", FactoryOptions::new(), |f| {
		f.attribute("name", "Supplier of Awesome")?
			.association("owner", AssociationOptions::new().factory("user"))?
			.association("manager", AssociationOptions::new().factory("admin"))?;
		Ok(())
	})?;

	Ok(())
}
