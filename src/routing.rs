//! Request matching.

use std::{
	collections::HashSet,
	fmt::{self, Debug, Formatter},
	sync::Arc,
	time::Duration,
};

use restmount_core::response::{ResponseAction, ResponseError};
use tracing::debug;

use crate::{
	handler::{request_handlers::dispatch, MethodHandlers},
	middleware::{run_chain, ChainHook},
	pattern::normalize_path,
	registry::{Record, RecordKind},
	request::{Options, RequestContext},
};

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

// --------------------------------------------------
// RoutingError

/// The source of the errors the router itself produces while handling a request.
#[non_exhaustive]
#[derive(Debug, crate::ImplError)]
pub enum RoutingError {
	/// Returned when a path parameter isn't valid percent-encoded UTF-8.
	#[error("invalid parameter '{0}'")]
	InvalidParam(Arc<str>),
	/// Returned when a hook or a method handler panics.
	#[error("panicked: {0}")]
	Panicked(String),
	/// Returned when the request isn't handled within the configured deadline.
	#[error("deadline of {0:?} exceeded")]
	DeadlineExceeded(Duration),
}

// --------------------------------------------------
// MatchResult

/// The method handlers and the hook chain resolved for a request path.
///
/// A result is computed for each request and reflects the registrations at
/// the time of the match.
pub struct MatchResult {
	handlers: MethodHandlers,
	hooks: Vec<ChainHook>,
}

impl MatchResult {
	#[inline(always)]
	pub fn handlers(&self) -> &MethodHandlers {
		&self.handlers
	}

	/// The number of steps in the hook chain, including the built-in ones.
	#[inline(always)]
	pub fn hook_count(&self) -> usize {
		self.hooks.len()
	}

	/// Runs the hook chain, then the method handler.
	pub(crate) async fn run(
		&self,
		cx: &mut RequestContext,
		default_limit: u64,
	) -> Result<ResponseAction, ResponseError> {
		run_chain(&self.hooks, cx).await?;

		dispatch(&self.handlers, cx, default_limit).await
	}
}

impl Debug for MatchResult {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("MatchResult")
			.field("handlers", &self.handlers)
			.field("hook_count", &self.hooks.len())
			.finish()
	}
}

// --------------------------------------------------------------------------------
// Matching

/// Scans the records once in registration order.
///
/// Every record whose pattern is a prefix of the path contributes its hook or
/// its options. The parameters of a pattern are bound by a hook inserted
/// before the first of its hooks. Only the method records whose pattern
/// matches the whole path contribute handlers, later ones overriding earlier
/// ones.
///
/// Returns `None` when no handler matches the path.
pub(crate) fn match_path(records: &[Record], path: &str) -> Option<MatchResult> {
	let path = normalize_path(path);

	let mut hooks = Vec::new();
	let mut options = Options::new();
	let mut handlers = MethodHandlers::new();
	let mut bound_patterns = HashSet::new();
	let mut some_matched_pattern = None;

	for record in records {
		if !record.prefix.is_match(&path) {
			continue;
		}

		if record.prefix.has_params() && bound_patterns.insert(record.raw()) {
			if let Some(values) = record.prefix.captures(&path) {
				let captures = record
					.prefix
					.param_names()
					.iter()
					.cloned()
					.zip(values.into_iter().map(str::to_owned))
					.collect();

				hooks.push(ChainHook::BindParams(captures));
			}
		}

		match &record.kind {
			RecordKind::Options { strict, bag } => {
				if *strict && !record.exact.is_match(&path) {
					continue;
				}

				for (key, value) in bag.iter() {
					options.insert(key.clone(), value.clone());
				}
			}
			RecordKind::Hook(hook) => hooks.push(ChainHook::User(hook.clone())),
			RecordKind::Method(method_kind, some_handler) => {
				if record.exact.is_match(&path) {
					handlers.apply(*method_kind, some_handler.as_ref());

					if some_handler.is_some() {
						some_matched_pattern = Some(record.exact.raw_arc());
					}
				}
			}
		}
	}

	if handlers.is_empty() {
		debug!(path = %path, "no resource matched");

		return None;
	}

	let matched_pattern = some_matched_pattern.unwrap_or_else(|| Arc::from(""));

	debug!(
		path = %path,
		pattern = %matched_pattern,
		hooks = hooks.len(),
		allowed_methods = ?handlers.allowed_methods(),
		"resource matched",
	);

	let mut chain = Vec::with_capacity(hooks.len() + 2);
	chain.push(ChainHook::Decorate { matched_pattern });
	chain.extend(hooks);
	chain.push(ChainHook::MergeOptions(options));

	Some(MatchResult {
		handlers,
		hooks: chain,
	})
}

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------
