//! Hooks and the runner of the hook chain.

use std::{any::Any, future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures_util::FutureExt;
use percent_encoding::percent_decode_str;
use restmount_core::{response::ResponseError, BoxedFuture};
use tracing::{debug, trace};

use crate::{
	pattern::WILDCARD_PARAM,
	request::{Options, RequestContext},
	routing::RoutingError,
};

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

/// A middleware function run before the method handler.
///
/// Returning `Ok(())` continues the chain. Returning an error, or panicking,
/// aborts the request with the error's status code. The shortcut constructors
/// of [`ResponseError`] like [`not_found()`](ResponseError::not_found) can be
/// used to end the request early.
pub type HookFn = Arc<
	dyn for<'cx> Fn(&'cx mut RequestContext) -> BoxedFuture<'cx, Result<(), ResponseError>>
		+ Send
		+ Sync,
>;

// --------------------------------------------------
// ChainHook

/// A step of the hook chain built for a matched request.
#[derive(Clone)]
pub(crate) enum ChainHook {
	/// Decorates the context with the data of the matched resource.
	Decorate { matched_pattern: Arc<str> },
	/// Binds the values captured by a pattern to its parameter names.
	BindParams(Vec<(Arc<str>, String)>),
	User(HookFn),
	/// Publishes the options accumulated from every matching pattern.
	MergeOptions(Options),
}

impl ChainHook {
	async fn run(&self, cx: &mut RequestContext) -> Result<(), ResponseError> {
		match self {
			ChainHook::Decorate { matched_pattern } => {
				cx.some_matched_pattern = Some(matched_pattern.to_string());

				Ok(())
			}
			ChainHook::BindParams(captures) => bind_params(captures, cx),
			ChainHook::User(hook) => hook(cx).await,
			ChainHook::MergeOptions(options) => {
				for (key, value) in options {
					cx.options.insert(key.clone(), value.clone());
				}

				Ok(())
			}
		}
	}

	fn name(&self) -> &'static str {
		match self {
			ChainHook::Decorate { .. } => "decorate",
			ChainHook::BindParams(_) => "bind_params",
			ChainHook::User(_) => "user",
			ChainHook::MergeOptions(_) => "merge_options",
		}
	}
}

fn bind_params(
	captures: &[(Arc<str>, String)],
	cx: &mut RequestContext,
) -> Result<(), ResponseError> {
	for (name, value) in captures {
		if name.as_ref() == WILDCARD_PARAM {
			cx.params.insert(name.to_string(), value.clone());

			continue;
		}

		let decoded_value = percent_decode_str(value).decode_utf8().map_err(|_| {
			ResponseError::bad_request().with_source(RoutingError::InvalidParam(name.clone()))
		})?;

		cx.params.insert(name.to_string(), decoded_value.into_owned());
	}

	Ok(())
}

// --------------------------------------------------------------------------------
// Hook chain runner

/// Runs the hooks one after another. The first failing hook aborts the chain.
pub(crate) async fn run_chain(
	hooks: &[ChainHook],
	cx: &mut RequestContext,
) -> Result<(), ResponseError> {
	for (index, hook) in hooks.iter().enumerate() {
		trace!(index, hook = hook.name(), "running hook");

		if let Err(error) = guard_panics(hook.run(cx)).await {
			debug!(
				index,
				status_code = %error.status_code(),
				error_message = error.message(),
				"hook aborted the request",
			);

			return Err(error);
		}
	}

	Ok(())
}

/// Awaits the future, turning a panic into a `500 Internal Server Error`.
pub(crate) async fn guard_panics<Fut, T>(future: Fut) -> Result<T, ResponseError>
where
	Fut: Future<Output = Result<T, ResponseError>>,
{
	match AssertUnwindSafe(future).catch_unwind().await {
		Ok(result) => result,
		Err(panic) => {
			let message = panic_message(panic.as_ref());

			Err(ResponseError::from_error(RoutingError::Panicked(message)))
		}
	}
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
	if let Some(message) = panic.downcast_ref::<&str>() {
		return (*message).to_owned();
	}

	if let Some(message) = panic.downcast_ref::<String>() {
		return message.clone();
	}

	"unknown panic".to_owned()
}

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

#[cfg(test)]
mod test {
	use std::sync::Mutex;

	use http::{Method, StatusCode};
	use serde_json::{json, Value};

	use super::*;

	// --------------------------------------------------------------------------------

	fn recording_hook(records: Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> ChainHook {
		ChainHook::User(Arc::new(move |_cx| {
			records.lock().unwrap().push(name);

			Box::pin(async { Ok(()) })
		}))
	}

	#[tokio::test]
	async fn run_chain_in_order() {
		let records = Arc::new(Mutex::new(Vec::new()));

		let hooks = [
			ChainHook::Decorate {
				matched_pattern: Arc::from("users/:id"),
			},
			recording_hook(records.clone(), "first"),
			ChainHook::BindParams(vec![(Arc::from("id"), "al%20ice".to_owned())]),
			ChainHook::User(Arc::new(|cx| {
				Box::pin(async move {
					// Parameters bound by an earlier step are visible.
					assert_eq!(cx.param("id"), Some("al ice"));
					cx.options_mut().insert("seen".to_owned(), json!(true));

					Ok(())
				})
			})),
			recording_hook(records.clone(), "second"),
			ChainHook::MergeOptions(
				[("k".to_owned(), json!("v"))]
					.into_iter()
					.collect(),
			),
		];

		let mut cx = RequestContext::new(Method::GET, "/users/al%20ice");
		run_chain(&hooks, &mut cx).await.unwrap();

		assert_eq!(*records.lock().unwrap(), ["first", "second"]);
		assert_eq!(cx.matched_pattern(), Some("users/:id"));
		assert_eq!(cx.option("k"), Some(&Value::from("v")));
		assert_eq!(cx.option("seen"), Some(&Value::from(true)));
	}

	#[tokio::test]
	async fn run_chain_aborts_on_error() {
		let records = Arc::new(Mutex::new(Vec::new()));

		let hooks = [
			recording_hook(records.clone(), "first"),
			ChainHook::User(Arc::new(|_cx| {
				Box::pin(async { Err(ResponseError::status(500, "Oops")) })
			})),
			recording_hook(records.clone(), "third"),
		];

		let mut cx = RequestContext::new(Method::GET, "/");
		let error = run_chain(&hooks, &mut cx).await.unwrap_err();

		assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(error.message(), "Oops");
		assert_eq!(*records.lock().unwrap(), ["first"]);
	}

	#[tokio::test]
	async fn run_chain_catches_panics() {
		let records = Arc::new(Mutex::new(Vec::new()));

		let hooks = [
			// Panics while building the future, before it's polled.
			ChainHook::User(Arc::new(|_cx| panic!("sync hook bug"))),
			recording_hook(records.clone(), "second"),
		];

		let mut cx = RequestContext::new(Method::GET, "/");
		let error = run_chain(&hooks, &mut cx).await.unwrap_err();
		assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(error.message(), "panicked: sync hook bug");
		assert!(records.lock().unwrap().is_empty());

		let hooks = [ChainHook::User(Arc::new(|cx| {
			Box::pin(async move {
				let _value = cx.param("missing").expect("async hook bug");

				Ok(())
			})
		}))];

		let error = run_chain(&hooks, &mut cx).await.unwrap_err();
		assert_eq!(error.message(), "panicked: async hook bug");
	}

	#[tokio::test]
	async fn bind_params_decoding() {
		let hooks = [ChainHook::BindParams(vec![
			(Arc::from("a"), "X%2FY".to_owned()),
			(Arc::from(WILDCARD_PARAM), "a/b%2Fc".to_owned()),
		])];

		let mut cx = RequestContext::new(Method::GET, "/");
		run_chain(&hooks, &mut cx).await.unwrap();
		assert_eq!(cx.param("a"), Some("X/Y"));
		assert_eq!(cx.param("*"), Some("a/b%2Fc"));

		let hooks = [ChainHook::BindParams(vec![(
			Arc::from("a"),
			"%FF".to_owned(),
		)])];

		let error = run_chain(&hooks, &mut cx).await.unwrap_err();
		assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
	}
}
