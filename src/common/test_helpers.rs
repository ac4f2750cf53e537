use std::sync::Arc;

use http::Method;
use restmount_core::response::{Payload, ResponseAction};
use serde_json::Value;

use crate::{
	handler::{HandlerFn, MethodHandler, MethodKind},
	request::RequestContext,
	router::Router,
};

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

// --------------------------------------------------------------------------------
// Handler Test Helpers

pub(crate) fn text_handler(method_kind: MethodKind, text: &'static str) -> MethodHandler {
	let handler: HandlerFn = Arc::new(move |_cx| Box::pin(async move { Ok(Payload::from(text)) }));

	match method_kind {
		MethodKind::Get => MethodHandler::Get(handler),
		MethodKind::Post => MethodHandler::Post(handler),
		MethodKind::Del => MethodHandler::Del(handler),
		_ => panic!("{} handlers don't complete with a text", method_kind),
	}
}

#[inline(always)]
pub(crate) fn text_get(text: &'static str) -> MethodHandler {
	text_handler(MethodKind::Get, text)
}

// --------------------------------------------------------------------------------
// Response Test Helpers

pub(crate) fn action_text(action: &ResponseAction) -> String {
	match action {
		ResponseAction::Send { body, .. } => String::from_utf8_lossy(body).into_owned(),
		ResponseAction::Status { message, .. } => message.clone(),
		_ => panic!("unexpected action: {:?}", action),
	}
}

pub(crate) fn action_json(action: &ResponseAction) -> Value {
	let ResponseAction::Send { body, some_mime, .. } = action else {
		panic!("unexpected action: {:?}", action)
	};

	assert_eq!(some_mime.as_ref(), Some(&mime::APPLICATION_JSON));

	serde_json::from_slice(body).unwrap()
}

// --------------------------------------------------------------------------------
// Router Test Helpers

pub(crate) async fn request(router: &Router, method: Method, path: &str) -> ResponseAction {
	let mut cx = RequestContext::new(method, path);

	router.handle(&mut cx).await
}

pub(crate) async fn request_with_query(
	router: &Router,
	method: Method,
	path: &str,
	query: &[(&str, &str)],
) -> ResponseAction {
	let mut cx = RequestContext::new(method, path).with_query(query.iter().copied());

	router.handle(&mut cx).await
}

// --------------------------------------------------------------------------------
