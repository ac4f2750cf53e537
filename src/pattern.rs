//! Path pattern compiler.

use std::{
	collections::HashMap,
	fmt::{self, Debug, Display, Formatter},
	sync::{Arc, OnceLock, PoisonError, RwLock},
};

use regex::Regex;

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

// --------------------------------------------------
// static:		users, posts
// named:			:name
// wildcard:	*		(last segment only, captures the remainder under the name "*")

pub const WILDCARD_PARAM: &str = "*";

// --------------------------------------------------
// CompiledPattern

/// A path pattern compiled into an anchored regular expression.
///
/// The "exact" form matches only the paths the pattern describes. The "prefix"
/// form (compiled with `matches_sub_paths`) also matches every deeper path.
/// A wildcard pattern has a single form since its remainder already consumes
/// any depth.
pub(crate) struct CompiledPattern {
	raw: Arc<str>,
	regex: Regex,
	param_names: Vec<Arc<str>>,
	is_wildcard: bool,
}

impl CompiledPattern {
	#[inline(always)]
	pub(crate) fn raw(&self) -> &str {
		&self.raw
	}

	#[inline(always)]
	pub(crate) fn raw_arc(&self) -> Arc<str> {
		self.raw.clone()
	}

	#[inline(always)]
	pub(crate) fn param_names(&self) -> &[Arc<str>] {
		&self.param_names
	}

	#[inline(always)]
	pub(crate) fn has_params(&self) -> bool {
		!self.param_names.is_empty()
	}

	#[inline(always)]
	pub(crate) fn is_wildcard(&self) -> bool {
		self.is_wildcard
	}

	#[inline(always)]
	pub(crate) fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}

	/// Returns the captured values in the order of the parameter names.
	pub(crate) fn captures<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
		let captures = self.regex.captures(path)?;

		let values = captures
			.iter()
			.skip(1)
			.map(|some_match| some_match.map_or("", |value| value.as_str()))
			.collect();

		Some(values)
	}
}

impl Debug for CompiledPattern {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("CompiledPattern")
			.field("raw", &self.raw)
			.field("regex", &self.regex.as_str())
			.field("param_names", &self.param_names)
			.field("is_wildcard", &self.is_wildcard)
			.finish()
	}
}

impl Display for CompiledPattern {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!("/{}", self.raw))
	}
}

// --------------------------------------------------------------------------------
// Compilation

type PatternCache = RwLock<HashMap<(Arc<str>, bool), Arc<CompiledPattern>>>;

fn pattern_cache() -> &'static PatternCache {
	static CACHE: OnceLock<PatternCache> = OnceLock::new();

	CACHE.get_or_init(Default::default)
}

/// Compiles the pattern, or returns the previously compiled instance for the
/// same `(pattern, matches_sub_paths)` pair.
///
/// Leading and trailing slashes are ignored, so `"/users/"` and `"users"` are
/// the same pattern. An empty pattern is the root.
///
/// # Panics
///
/// - if a segment is empty (`"users//posts"`)
/// - if a named parameter has no name (`"users/:"`)
/// - if a wildcard is not the last segment (`"files/*/meta"`)
pub(crate) fn compile(pattern: &str, matches_sub_paths: bool) -> Arc<CompiledPattern> {
	let raw = trim_slashes(pattern);

	if let Some(compiled) = pattern_cache()
		.read()
		.unwrap_or_else(PoisonError::into_inner)
		.get(&(Arc::<str>::from(raw), matches_sub_paths))
	{
		return compiled.clone();
	}

	let compiled = Arc::new(build(raw, matches_sub_paths));

	pattern_cache()
		.write()
		.unwrap_or_else(PoisonError::into_inner)
		.entry((compiled.raw_arc(), matches_sub_paths))
		.or_insert(compiled)
		.clone()
}

fn build(raw: &str, matches_sub_paths: bool) -> CompiledPattern {
	if raw.is_empty() {
		let regex_pattern = if matches_sub_paths { "^/" } else { "^/$" };

		return CompiledPattern {
			raw: raw.into(),
			regex: Regex::new(regex_pattern).expect("root pattern should be a valid regex"),
			param_names: Vec::new(),
			is_wildcard: false,
		};
	}

	let mut regex_pattern = "^".to_owned();
	let mut param_names = Vec::new();
	let mut is_wildcard = false;

	let mut segments = raw.split('/').peekable();
	while let Some(segment) = segments.next() {
		if segment.is_empty() {
			panic!("empty segment in pattern '{}'", raw)
		}

		if segment == WILDCARD_PARAM {
			if segments.peek().is_some() {
				panic!("wildcard must be the last segment of pattern '{}'", raw)
			}

			// Paths are matched without their trailing slash, so "/files/" arrives
			// as "/files" and captures an empty remainder.
			regex_pattern.push_str("(?:/(.*))?");
			param_names.push(Arc::<str>::from(WILDCARD_PARAM));
			is_wildcard = true;

			continue;
		}

		regex_pattern.push('/');

		if let Some(name) = segment.strip_prefix(':') {
			if name.is_empty() {
				panic!("empty parameter name in pattern '{}'", raw)
			}

			regex_pattern.push_str("([^/]+)");
			param_names.push(Arc::<str>::from(name));

			continue;
		}

		regex_pattern.push_str(&regex::escape(segment));
	}

	if !is_wildcard && matches_sub_paths {
		regex_pattern.push_str("(?:/.*)?");
	}

	regex_pattern.push('$');

	let regex = match Regex::new(&regex_pattern) {
		Ok(regex) => regex,
		Err(error) => panic!("pattern '{}' cannot be compiled: {}", raw, error),
	};

	CompiledPattern {
		raw: raw.into(),
		regex,
		param_names,
		is_wildcard,
	}
}

// --------------------------------------------------------------------------------

#[inline]
pub(crate) fn trim_slashes(pattern: &str) -> &str {
	pattern.trim_matches('/')
}

/// Joins a parent pattern and a child pattern with a single slash.
pub(crate) fn join_patterns(parent: &str, child: &str) -> String {
	let parent = trim_slashes(parent);
	let child = trim_slashes(child);

	if parent.is_empty() {
		return child.to_owned();
	}

	if child.is_empty() {
		return parent.to_owned();
	}

	format!("{}/{}", parent, child)
}

/// Returns true when the `raw` pattern is the `prefix` itself or lies under it.
pub(crate) fn is_under(raw: &str, prefix: &str) -> bool {
	let prefix = trim_slashes(prefix);
	if prefix.is_empty() {
		return true;
	}

	raw
		.strip_prefix(prefix)
		.is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Brings a request path to the form patterns are matched against: a leading
/// slash and no trailing slash, `"/"` for the root.
pub(crate) fn normalize_path(path: &str) -> String {
	let trimmed = trim_slashes(path);

	let mut normalized = String::with_capacity(trimmed.len() + 1);
	normalized.push('/');
	normalized.push_str(trimmed);

	normalized
}

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

#[cfg(test)]
mod test {
	use super::*;

	// --------------------------------------------------------------------------------

	#[test]
	fn compile_is_interned() {
		let first = compile("users/:id", false);
		let second = compile("/users/:id/", false);
		assert!(Arc::ptr_eq(&first, &second));

		let prefix = compile("users/:id", true);
		assert!(!Arc::ptr_eq(&first, &prefix));
		assert!(Arc::ptr_eq(&prefix, &compile("users/:id", true)));
	}

	#[test]
	fn compile_exact_and_prefix_forms() {
		let cases = [
			("", false, "/", true),
			("", false, "/users", false),
			("", true, "/users/alice", true),
			("users", false, "/users", true),
			("users", false, "/users/alice", false),
			("users", false, "/usersx", false),
			("users", true, "/users/alice/posts", true),
			("users", true, "/usersx", false),
			("users/:id", false, "/users/alice", true),
			("users/:id", false, "/users/alice/posts", false),
			("users/:id", true, "/users/alice/posts", true),
			("users/:id", false, "/users", false),
			("files/*", false, "/files/a/b/c", true),
			("files/*", false, "/files/", true),
			("files/*", false, "/files", true),
			("files/*", false, "/filesx", false),
			("*", false, "/", true),
			("*", false, "/a/b", true),
			("a.b", false, "/aXb", false),
			("a.b", false, "/a.b", true),
		];

		for (pattern, matches_sub_paths, path, expected) in cases {
			let compiled = compile(pattern, matches_sub_paths);
			assert_eq!(
				compiled.is_match(path),
				expected,
				"pattern: {:?}, prefix: {}, path: {}",
				pattern,
				matches_sub_paths,
				path,
			);
		}
	}

	#[test]
	fn compile_param_names() {
		let compiled = compile("foo/:a/bar/:b", false);
		assert_eq!(
			compiled
				.param_names()
				.iter()
				.map(AsRef::as_ref)
				.collect::<Vec<&str>>(),
			["a", "b"],
		);

		assert!(!compiled.is_wildcard());
		assert_eq!(compiled.captures("/foo/X/bar/Y"), Some(vec!["X", "Y"]));

		let compiled = compile("foo/:a/*", false);
		assert!(compiled.is_wildcard());
		assert_eq!(
			compiled
				.param_names()
				.iter()
				.map(AsRef::as_ref)
				.collect::<Vec<&str>>(),
			["a", "*"],
		);

		assert_eq!(
			compiled.captures("/foo/X/a/b%2Fc"),
			Some(vec!["X", "a/b%2Fc"]),
		);

		assert_eq!(compiled.captures("/foo/X"), Some(vec!["X", ""]));

		let compiled = compile("foo/:a", true);
		assert_eq!(compiled.captures("/foo/X/deeper/path"), Some(vec!["X"]));
	}

	#[test]
	#[should_panic(expected = "wildcard must be the last segment")]
	fn compile_inner_wildcard() {
		compile("files/*/meta", false);
	}

	#[test]
	#[should_panic(expected = "empty parameter name")]
	fn compile_empty_param_name() {
		compile("users/:", false);
	}

	#[test]
	#[should_panic(expected = "empty segment")]
	fn compile_empty_segment() {
		compile("users//posts", false);
	}

	#[test]
	fn pattern_helpers() {
		assert_eq!(join_patterns("", "/users/"), "users");
		assert_eq!(join_patterns("users", ":id"), "users/:id");
		assert_eq!(join_patterns("/users/", "/:id/posts"), "users/:id/posts");
		assert_eq!(join_patterns("users", ""), "users");

		assert!(is_under("users", "users"));
		assert!(is_under("users/:id", "/users"));
		assert!(!is_under("usersx", "users"));
		assert!(is_under("anything", ""));

		assert_eq!(normalize_path(""), "/");
		assert_eq!(normalize_path("/"), "/");
		assert_eq!(normalize_path("users/alice/"), "/users/alice");
		assert_eq!(normalize_path("/users"), "/users");
	}
}
