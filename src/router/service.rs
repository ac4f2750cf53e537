use std::{convert::Infallible, io::ErrorKind, sync::Arc};

use bytes::Bytes;
use http::{
	header::{ACCEPT, CONTENT_TYPE},
	request::Parts,
	HeaderMap, HeaderValue, Method, Request, Response, StatusCode,
};
use http_body::Body;
use http_body_util::{BodyExt, Full};
use hyper::service::Service;
use mime::Mime;
use restmount_core::{
	response::{ResponseAction, ResponseError},
	BoxedError, BoxedFuture,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::{
	common::header_utils::{media_type_quality, split_header_value_with_weights},
	pattern::{is_under, trim_slashes},
	request::RequestContext,
};

use super::Router;

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

impl Router {
	/// Converts the router into a `hyper` service handling the requests to
	/// every path.
	pub fn into_service(self) -> RouterService {
		RouterService::new(self, "")
	}
}

// --------------------------------------------------
// ServiceError

/// An error type returned when the request can't be turned into a [`RequestContext`].
#[non_exhaustive]
#[derive(Debug, crate::ImplError)]
pub enum ServiceError {
	/// Returned when the request body can't be collected.
	#[error("body: {0}")]
	Body(#[source] BoxedError),
	/// Returned when the query string is malformed.
	#[error("query: {0}")]
	Query(#[from] serde_urlencoded::de::Error),
	/// Returned when a JSON request body is malformed.
	#[error("json: {0}")]
	Json(#[from] serde_json::Error),
}

// --------------------------------------------------
// RouterService

/// A service passing the requests to a router.
///
/// The mount path is stripped from the request path before the request is
/// matched. Requests outside the mount path are answered with `404 Not Found`.
#[derive(Clone)]
pub struct RouterService {
	router: Router,
	mount_path: Arc<str>,
}

impl RouterService {
	pub fn new<P: AsRef<str>>(router: Router, mount_path: P) -> Self {
		Self {
			router,
			mount_path: trim_slashes(mount_path.as_ref()).into(),
		}
	}

	#[inline(always)]
	pub fn router(&self) -> &Router {
		&self.router
	}

	#[inline(always)]
	pub fn mount_path(&self) -> &str {
		&self.mount_path
	}

	async fn handle<B>(&self, request: Request<B>) -> Response<Full<Bytes>>
	where
		B: Body<Data = Bytes>,
		B::Error: Into<BoxedError>,
	{
		let (head, body) = request.into_parts();
		let is_head = head.method == Method::HEAD;
		let accepts_json = accepts_json(&head.headers);
		let error_details = self.router.config().error_details();

		let Some(path) = strip_mount_path(&self.mount_path, head.uri.path()) else {
			let action = ResponseAction::failure(&ResponseError::not_found(), error_details);

			return action_response(action, accepts_json, is_head).await;
		};

		let mut cx = match request_context(head, body, path, &self.mount_path).await {
			Ok(cx) => cx,
			Err(error) => {
				debug!(%error, "invalid request");

				let error = ResponseError::bad_request().with_source(error);
				let action = ResponseAction::failure(&error, error_details);

				return action_response(action, accepts_json, is_head).await;
			}
		};

		let action = self.router.handle(&mut cx).await;

		action_response(action, accepts_json, is_head).await
	}
}

impl<B> Service<Request<B>> for RouterService
where
	B: Body<Data = Bytes> + Send + 'static,
	B::Error: Into<BoxedError>,
{
	type Response = Response<Full<Bytes>>;
	type Error = Infallible;
	type Future = BoxedFuture<'static, Result<Self::Response, Self::Error>>;

	fn call(&self, request: Request<B>) -> Self::Future {
		let service = self.clone();

		Box::pin(async move { Ok(service.handle(request).await) })
	}
}

// --------------------------------------------------------------------------------
// Request conversion

/// Returns the request path relative to the mount path.
fn strip_mount_path(mount_path: &str, request_path: &str) -> Option<String> {
	let request_path = trim_slashes(request_path);

	if !is_under(request_path, mount_path) {
		return None;
	}

	let relative_path = request_path[mount_path.len()..].trim_start_matches('/');

	Some(format!("/{}", relative_path))
}

async fn request_context<B>(
	head: Parts,
	body: B,
	path: String,
	mount_path: &str,
) -> Result<RequestContext, ServiceError>
where
	B: Body<Data = Bytes>,
	B::Error: Into<BoxedError>,
{
	let raw_body = body
		.collect()
		.await
		.map_err(|error| ServiceError::Body(error.into()))?
		.to_bytes();

	let query = match head.uri.query() {
		Some(query) => serde_urlencoded::from_str::<Vec<(String, String)>>(query)?,
		None => Vec::new(),
	};

	let mut cx = RequestContext::new(head.method, path)
		.with_mount_path(mount_path)
		.with_query(query);

	if has_json_content(&head.headers) && !raw_body.is_empty() {
		let body = serde_json::from_slice::<Value>(&raw_body)?;
		cx = cx.with_body(body);
	}

	Ok(cx.with_headers(head.headers).with_raw_body(raw_body))
}

fn has_json_content(headers: &HeaderMap) -> bool {
	headers
		.get(CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.parse::<Mime>().ok())
		.is_some_and(|mime| mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON))
}

/// Returns true when the client prefers JSON to plain text. A tie, a missing
/// `Accept` or a malformed one prefers text.
fn accepts_json(headers: &HeaderMap) -> bool {
	let Some(accept) = headers.get(ACCEPT) else {
		return false;
	};

	let media_ranges = match split_header_value_with_weights(accept) {
		Ok(media_ranges) => media_ranges,
		Err(error) => {
			debug!(%error, "malformed Accept header");

			return false;
		}
	};

	media_type_quality(&media_ranges, "application", "json")
		> media_type_quality(&media_ranges, "text", "plain")
}

// --------------------------------------------------------------------------------
// Response conversion

async fn action_response(
	action: ResponseAction,
	accepts_json: bool,
	is_head: bool,
) -> Response<Full<Bytes>> {
	let (status_code, body, some_mime) = match action {
		ResponseAction::Send {
			status_code,
			body,
			some_mime,
		} => (status_code, body, some_mime),
		ResponseAction::SendFile { path, some_mime } => match tokio::fs::read(&path).await {
			Ok(content) => (
				StatusCode::OK,
				Bytes::from(content),
				Some(some_mime.unwrap_or(mime::APPLICATION_OCTET_STREAM)),
			),
			Err(error) => {
				debug!(path = %path.display(), %error, "file cannot be sent");

				let status_code = if error.kind() == ErrorKind::NotFound {
					StatusCode::NOT_FOUND
				} else {
					StatusCode::INTERNAL_SERVER_ERROR
				};

				let message = status_code.canonical_reason().unwrap_or_default().to_owned();

				failure_body(status_code, message, accepts_json)
			}
		},
		ResponseAction::Status {
			status_code,
			message,
		} => failure_body(status_code, message, accepts_json),
		ResponseAction::NoContent => (StatusCode::NO_CONTENT, Bytes::new(), None),
	};

	let mut response = Response::new(Full::new(if is_head { Bytes::new() } else { body }));
	*response.status_mut() = status_code;

	if let Some(mime) = some_mime {
		if let Ok(header_value) = HeaderValue::from_str(mime.as_ref()) {
			response.headers_mut().insert(CONTENT_TYPE, header_value);
		}
	}

	response
}

fn failure_body(
	status_code: StatusCode,
	message: String,
	accepts_json: bool,
) -> (StatusCode, Bytes, Option<Mime>) {
	if accepts_json {
		let body = json!({
			"_error": status_code.as_u16(),
			"_message": message,
		});

		return (
			status_code,
			Bytes::from(body.to_string()),
			Some(mime::APPLICATION_JSON),
		);
	}

	(status_code, Bytes::from(message), Some(mime::TEXT_PLAIN_UTF_8))
}

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------
