//! Name conversions between model types, factory names and attribute keys.

/// Convert a type name to the factory name derived from it.
///
/// # Examples
///
/// ```rust
/// use reinhardt_factory::naming::underscore;
///
/// assert_eq!(underscore("User"), "user");
/// assert_eq!(underscore("BlogPost"), "blog_post");
/// assert_eq!(underscore("HTTPRequest"), "http_request");
/// assert_eq!(underscore("blog_post"), "blog_post");
/// ```
pub fn underscore(s: &str) -> String {
	let chars: Vec<char> = s.chars().collect();
	let mut result = String::with_capacity(s.len() + 4);

	for (i, &ch) in chars.iter().enumerate() {
		if ch == '-' || ch == ' ' || ch == '_' {
			if !result.is_empty() && !result.ends_with('_') {
				result.push('_');
			}
			continue;
		}

		if ch.is_ascii_uppercase() && i > 0 && !result.ends_with('_') {
			let prev = chars[i - 1];
			let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_ascii_lowercase());
			// "HTTPRequest" splits before the last capital of the acronym
			if prev.is_ascii_lowercase()
				|| prev.is_ascii_digit()
				|| (prev.is_ascii_uppercase() && next_is_lower)
			{
				result.push('_');
			}
		}
		result.push(ch.to_ascii_lowercase());
	}

	result
}

/// Convert a factory name to the type name it resolves to.
///
/// # Examples
///
/// ```rust
/// use reinhardt_factory::naming::camelize;
///
/// assert_eq!(camelize("user"), "User");
/// assert_eq!(camelize("blog_post"), "BlogPost");
/// ```
pub fn camelize(s: &str) -> String {
	s.split(['_', '-'])
		.filter(|part| !part.is_empty())
		.map(|part| {
			let mut chars = part.chars();
			match chars.next() {
				None => String::new(),
				Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
			}
		})
		.collect()
}

/// Canonical form of an attribute or override key.
///
/// Surrounding whitespace and a leading `:` are dropped, so `":email"`,
/// `" email "` and `"email"` all address the same attribute.
pub fn canonical_name(name: &str) -> String {
	let trimmed = name.trim();
	trimmed.strip_prefix(':').unwrap_or(trimmed).to_string()
}

/// Short name of a Rust type: the last path segment of its type name.
pub fn type_name_of<T: ?Sized>() -> &'static str {
	let full = std::any::type_name::<T>();
	// Generic arguments may contain `::` too, so cut them off first
	let base = full.split('<').next().unwrap_or(full);
	base.rsplit("::").next().unwrap_or(base)
}
