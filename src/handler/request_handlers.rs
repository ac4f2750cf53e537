use std::fmt::{self, Debug, Formatter};

use http::Method;
use restmount_core::response::{Payload, ResponseAction, ResponseError};
use tracing::debug;

use crate::{middleware::guard_panics, request::RequestContext};

use super::{
	CountHandlerFn, HandlerFn, ListHandlerFn, MethodHandler, MethodKind, PutHandlerFn,
};

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

// --------------------------------------------------
// MethodHandlers

/// The handlers resolved for a matched request, at most one per [`MethodKind`].
///
/// `get` and the `count`/`list` pair are mutually exclusive ways of answering
/// `GET`: setting `get` drops `count` and `list`, and setting either of them
/// drops `get`.
#[derive(Clone, Default)]
pub struct MethodHandlers {
	some_get: Option<HandlerFn>,
	some_put: Option<PutHandlerFn>,
	some_post: Option<HandlerFn>,
	some_del: Option<HandlerFn>,
	some_list: Option<ListHandlerFn>,
	some_count: Option<CountHandlerFn>,
}

impl MethodHandlers {
	#[inline(always)]
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Applies a handler record. `None` resets the method to "undefined".
	pub(crate) fn apply(&mut self, kind: MethodKind, some_handler: Option<&MethodHandler>) {
		let Some(handler) = some_handler else {
			match kind {
				MethodKind::Get => self.some_get = None,
				MethodKind::Put => self.some_put = None,
				MethodKind::Post => self.some_post = None,
				MethodKind::Del => self.some_del = None,
				MethodKind::List => self.some_list = None,
				MethodKind::Count => self.some_count = None,
			}

			return;
		};

		match handler {
			MethodHandler::Get(get) => {
				self.some_get = Some(get.clone());
				self.some_list = None;
				self.some_count = None;
			}
			MethodHandler::List(list) => {
				self.some_list = Some(list.clone());
				self.some_get = None;
			}
			MethodHandler::Count(count) => {
				self.some_count = Some(count.clone());
				self.some_get = None;
			}
			MethodHandler::Put(put) => self.some_put = Some(put.clone()),
			MethodHandler::Post(post) => self.some_post = Some(post.clone()),
			MethodHandler::Del(del) => self.some_del = Some(del.clone()),
		}
	}

	// ----------

	pub fn is_empty(&self) -> bool {
		self.some_get.is_none()
			&& self.some_put.is_none()
			&& self.some_post.is_none()
			&& self.some_del.is_none()
			&& self.some_list.is_none()
			&& self.some_count.is_none()
	}

	pub fn has(&self, kind: MethodKind) -> bool {
		match kind {
			MethodKind::Get => self.some_get.is_some(),
			MethodKind::Put => self.some_put.is_some(),
			MethodKind::Post => self.some_post.is_some(),
			MethodKind::Del => self.some_del.is_some(),
			MethodKind::List => self.some_list.is_some(),
			MethodKind::Count => self.some_count.is_some(),
		}
	}

	/// Returns true when `GET` is answered with a paginated collection.
	#[inline(always)]
	pub fn is_collection(&self) -> bool {
		self.some_get.is_none() && self.some_list.is_some() && self.some_count.is_some()
	}

	/// The HTTP methods the handlers can answer.
	pub fn allowed_methods(&self) -> Vec<Method> {
		let mut allowed_methods = Vec::new();

		if self.some_get.is_some() || self.is_collection() {
			allowed_methods.push(Method::GET);
			allowed_methods.push(Method::HEAD);
		}

		if self.some_put.is_some() {
			allowed_methods.push(Method::PUT);
			allowed_methods.push(Method::PATCH);
		}

		if self.some_post.is_some() {
			allowed_methods.push(Method::POST);
		}

		if self.some_del.is_some() {
			allowed_methods.push(Method::DELETE);
		}

		allowed_methods
	}
}

impl Debug for MethodHandlers {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"MethodHandlers {{ allowed_methods: {:?} }}",
			self.allowed_methods(),
		)
	}
}

// --------------------------------------------------------------------------------
// Dispatch

/// Invokes the handler for the request method and normalizes its result.
///
/// `GET` and `HEAD` call `get`, or the `count`/`list` pair when `get` is absent.
/// `PUT` and `PATCH` both call `put`, telling it whether the request is a patch.
/// Any other combination is answered with `405 Method Not Allowed`.
pub(crate) async fn dispatch(
	handlers: &MethodHandlers,
	cx: &mut RequestContext,
	default_limit: u64,
) -> Result<ResponseAction, ResponseError> {
	let method = cx.method().clone();

	let payload = if method == Method::GET || method == Method::HEAD {
		if let Some(get) = handlers.some_get.as_ref() {
			guard_panics(async { get(cx).await }).await?
		} else if let (Some(count), Some(list)) =
			(handlers.some_count.as_ref(), handlers.some_list.as_ref())
		{
			return list_collection(count, list, cx, default_limit).await;
		} else {
			return Err(method_not_allowed(handlers, &method));
		}
	} else if method == Method::PUT || method == Method::PATCH {
		let Some(put) = handlers.some_put.as_ref() else {
			return Err(method_not_allowed(handlers, &method));
		};

		let is_patch = method == Method::PATCH;

		guard_panics(async { put(cx, is_patch).await }).await?
	} else if method == Method::DELETE {
		let Some(del) = handlers.some_del.as_ref() else {
			return Err(method_not_allowed(handlers, &method));
		};

		guard_panics(async { del(cx).await }).await?
	} else if method == Method::POST {
		let Some(post) = handlers.some_post.as_ref() else {
			return Err(method_not_allowed(handlers, &method));
		};

		guard_panics(async { post(cx).await }).await?
	} else {
		return Err(method_not_allowed(handlers, &method));
	};

	Payload::into_action(payload)
}

async fn list_collection(
	count: &CountHandlerFn,
	list: &ListHandlerFn,
	cx: &mut RequestContext,
	default_limit: u64,
) -> Result<ResponseAction, ResponseError> {
	let skip = pagination_param(cx, "skip").unwrap_or(0);
	let limit = pagination_param(cx, "limit").unwrap_or(default_limit);

	let total = guard_panics(async { count(cx).await }).await?;
	let items = guard_panics(async { list(cx, skip, limit).await }).await?;

	ResponseAction::collection(total, items)
}

/// Parses the leading digits of the parameter, so `"5abc"` is 5. A value with
/// no leading digits, or a negative one, is `None`.
fn pagination_param(cx: &RequestContext, name: &str) -> Option<u64> {
	let value = cx.query_param(name)?.trim_start();
	let value = value.strip_prefix('+').unwrap_or(value);

	let digits_end = value
		.find(|ch: char| !ch.is_ascii_digit())
		.unwrap_or(value.len());

	value[..digits_end].parse::<u64>().ok()
}

fn method_not_allowed(handlers: &MethodHandlers, method: &Method) -> ResponseError {
	debug!(
		%method,
		allowed_methods = ?handlers.allowed_methods(),
		"method not allowed",
	);

	ResponseError::method_not_allowed()
}

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

#[cfg(test)]
mod test {
	use std::sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	};

	use http::StatusCode;
	use serde_json::json;

	use crate::common::test_helpers::{action_json, action_text};

	use super::*;

	// --------------------------------------------------------------------------------

	fn text_handler(text: &'static str) -> HandlerFn {
		Arc::new(move |_cx| Box::pin(async move { Ok(Payload::from(text)) }))
	}

	fn collection_handlers(calls: Arc<std::sync::Mutex<Vec<(u64, u64)>>>) -> MethodHandlers {
		let mut handlers = MethodHandlers::new();

		let count: CountHandlerFn = Arc::new(|_cx| Box::pin(async { Ok(42) }));
		handlers.apply(MethodKind::Count, Some(&MethodHandler::Count(count)));

		let list: ListHandlerFn = Arc::new(move |_cx, skip, limit| {
			calls.lock().unwrap().push((skip, limit));

			Box::pin(async { Ok(vec![json!("a"), json!("b")]) })
		});

		handlers.apply(MethodKind::List, Some(&MethodHandler::List(list)));

		handlers
	}

	#[test]
	fn method_handlers_exclusion() {
		let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
		let mut handlers = collection_handlers(calls);
		assert!(handlers.is_collection());

		handlers.apply(MethodKind::Get, Some(&MethodHandler::Get(text_handler("doc"))));
		assert!(handlers.has(MethodKind::Get));
		assert!(!handlers.has(MethodKind::List));
		assert!(!handlers.has(MethodKind::Count));

		let count: CountHandlerFn = Arc::new(|_cx| Box::pin(async { Ok(0) }));
		handlers.apply(MethodKind::Count, Some(&MethodHandler::Count(count)));
		assert!(!handlers.has(MethodKind::Get));
		assert!(handlers.has(MethodKind::Count));
		assert!(!handlers.is_collection());

		handlers.apply(MethodKind::Count, None);
		assert!(handlers.is_empty());
	}

	#[tokio::test]
	async fn dispatch_get_and_collection() {
		let mut handlers = MethodHandlers::new();
		handlers.apply(MethodKind::Get, Some(&MethodHandler::Get(text_handler("doc"))));

		let mut cx = RequestContext::new(Method::HEAD, "/doc");
		let action = dispatch(&handlers, &mut cx, 10).await.unwrap();
		assert_eq!(action_text(&action), "doc");

		let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
		let handlers = collection_handlers(calls.clone());

		let mut cx = RequestContext::new(Method::GET, "/items");
		let action = dispatch(&handlers, &mut cx, 10).await.unwrap();
		assert_eq!(
			action_json(&action),
			json!({ "_count": 42, "_items": ["a", "b"] }),
		);

		let mut cx =
			RequestContext::new(Method::GET, "/items").with_query([("skip", "1"), ("limit", "1")]);

		dispatch(&handlers, &mut cx, 10).await.unwrap();

		let mut cx =
			RequestContext::new(Method::GET, "/items").with_query([("skip", "x"), ("limit", "-3")]);

		dispatch(&handlers, &mut cx, 0).await.unwrap();

		let mut cx = RequestContext::new(Method::GET, "/items")
			.with_query([("skip", "-1"), ("limit", "5abc")]);

		dispatch(&handlers, &mut cx, 10).await.unwrap();

		let mut cx = RequestContext::new(Method::GET, "/items")
			.with_query([("skip", " +3 "), ("limit", "")]);

		dispatch(&handlers, &mut cx, 10).await.unwrap();

		assert_eq!(
			*calls.lock().unwrap(),
			[(0, 10), (1, 1), (0, 0), (0, 5), (3, 10)],
		);
	}

	#[tokio::test]
	async fn dispatch_put_and_patch() {
		let patches = Arc::new(std::sync::Mutex::new(Vec::new()));

		let mut handlers = MethodHandlers::new();
		let put: PutHandlerFn = {
			let patches = patches.clone();

			Arc::new(move |_cx, is_patch| {
				patches.lock().unwrap().push(is_patch);

				Box::pin(async { Ok(Payload::None) })
			})
		};

		handlers.apply(MethodKind::Put, Some(&MethodHandler::Put(put)));

		let mut cx = RequestContext::new(Method::PATCH, "/doc");
		let action = dispatch(&handlers, &mut cx, 10).await.unwrap();
		assert_eq!(action, ResponseAction::NoContent);

		let mut cx = RequestContext::new(Method::PUT, "/doc");
		dispatch(&handlers, &mut cx, 10).await.unwrap();

		assert_eq!(*patches.lock().unwrap(), [true, false]);
	}

	#[tokio::test]
	async fn dispatch_method_not_allowed() {
		let mut handlers = MethodHandlers::new();
		handlers.apply(MethodKind::Post, Some(&MethodHandler::Post(text_handler("created"))));

		for method in [Method::GET, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS] {
			let mut cx = RequestContext::new(method, "/doc");
			let error = dispatch(&handlers, &mut cx, 10).await.unwrap_err();
			assert_eq!(error.status_code(), StatusCode::METHOD_NOT_ALLOWED);
		}

		// An incomplete pagination pair can't answer GET.
		let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
		let mut handlers = collection_handlers(calls);
		handlers.apply(MethodKind::List, None);

		let mut cx = RequestContext::new(Method::GET, "/items");
		let error = dispatch(&handlers, &mut cx, 10).await.unwrap_err();
		assert_eq!(error.status_code(), StatusCode::METHOD_NOT_ALLOWED);
	}

	#[tokio::test]
	async fn dispatch_handler_failures() {
		let mut handlers = MethodHandlers::new();

		let del: HandlerFn =
			Arc::new(|_cx| Box::pin(async { Err(ResponseError::status(542, "boom")) }));

		handlers.apply(MethodKind::Del, Some(&MethodHandler::Del(del)));

		let calls = Arc::new(AtomicUsize::new(0));
		let post: HandlerFn = {
			let calls = calls.clone();

			Arc::new(move |_cx| {
				calls.fetch_add(1, Ordering::SeqCst);

				Box::pin(async { panic!("handler bug") })
			})
		};

		handlers.apply(MethodKind::Post, Some(&MethodHandler::Post(post)));

		let mut cx = RequestContext::new(Method::DELETE, "/doc");
		let error = dispatch(&handlers, &mut cx, 10).await.unwrap_err();
		assert_eq!(error.status_code().as_u16(), 542);
		assert_eq!(error.message(), "boom");

		let mut cx = RequestContext::new(Method::POST, "/doc");
		let error = dispatch(&handlers, &mut cx, 10).await.unwrap_err();
		assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}
}
