//! Handler results and the response actions they are normalized into.

// ----------

use std::path::{Path, PathBuf};

use bytes::Bytes;
use http::StatusCode;
use mime::Mime;
use serde::Serialize;
use serde_json::{json, Value};

// --------------------------------------------------

mod error;
pub use error::ResponseError;

mod impls;

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

pub type PayloadResult = Result<Payload, ResponseError>;

// --------------------------------------------------
// Payload

/// The value a method handler completes with.
///
/// Every shape is normalized into a [`ResponseAction`] by [`Payload::into_action()`].
#[derive(Debug, Default)]
pub enum Payload {
	/// Nothing to send, results in `204 No Content`.
	#[default]
	None,
	Text(String),
	Bytes(Bytes),
	/// Sent in its textual form so it can't be mistaken for a status code.
	Number(serde_json::Number),
	Body(ResponseBody),
	File(ResponseFile),
	/// Structured data, serialized as JSON.
	Data(Value),
}

impl Payload {
	/// Serializes the value into structured data.
	pub fn json<T>(value: &T) -> Result<Self, ResponseError>
	where
		T: Serialize + ?Sized,
	{
		serde_json::to_value(value)
			.map(Payload::from)
			.map_err(ResponseError::from_error)
	}

	pub fn file<P: AsRef<Path>>(path: P) -> Self {
		Payload::File(ResponseFile::new(path))
	}

	/// Attaches an explicit MIME type.
	///
	/// Text, bytes and numbers become a typed [`ResponseBody`]. Structured data
	/// is serialized first. A file keeps its path and takes the new MIME type.
	pub fn with_mime(self, mime: Mime) -> Self {
		match self {
			Payload::None => Payload::None,
			Payload::Text(text) => Payload::Body(ResponseBody::new(text, mime)),
			Payload::Bytes(bytes) => Payload::Body(ResponseBody::new(bytes, mime)),
			Payload::Number(number) => Payload::Body(ResponseBody::new(number.to_string(), mime)),
			Payload::Body(body) => Payload::Body(ResponseBody::new(body.body, mime)),
			Payload::File(file) => Payload::File(file.with_mime(mime)),
			Payload::Data(value) => Payload::Body(ResponseBody::new(value.to_string(), mime)),
		}
	}

	#[inline(always)]
	pub fn is_none(&self) -> bool {
		matches!(self, Payload::None)
	}

	/// Normalizes the payload into the action the transport must perform.
	pub fn into_action(self) -> Result<ResponseAction, ResponseError> {
		let action = match self {
			Payload::None => ResponseAction::NoContent,
			Payload::Text(text) => ResponseAction::ok(text.into(), Some(mime::TEXT_PLAIN_UTF_8)),
			Payload::Bytes(bytes) => ResponseAction::ok(bytes, None),
			Payload::Number(number) => {
				ResponseAction::ok(number.to_string().into(), Some(mime::TEXT_PLAIN_UTF_8))
			}
			Payload::Body(ResponseBody { body, mime }) => ResponseAction::ok(body, Some(mime)),
			Payload::File(ResponseFile { path, some_mime }) => {
				ResponseAction::SendFile { path, some_mime }
			}
			Payload::Data(value) => {
				let body = serde_json::to_vec(&value).map_err(ResponseError::from_error)?;

				ResponseAction::ok(body.into(), Some(mime::APPLICATION_JSON))
			}
		};

		Ok(action)
	}
}

// --------------------------------------------------
// ResponseBody

/// A body sent with its declared MIME type.
#[derive(Debug, Clone)]
pub struct ResponseBody {
	body: Bytes,
	mime: Mime,
}

impl ResponseBody {
	pub fn new<B: Into<Bytes>>(body: B, mime: Mime) -> Self {
		Self {
			body: body.into(),
			mime,
		}
	}

	#[inline(always)]
	pub fn body(&self) -> &Bytes {
		&self.body
	}

	#[inline(always)]
	pub fn mime(&self) -> &Mime {
		&self.mime
	}
}

// --------------------------------------------------
// ResponseFile

/// A file the transport should send.
#[derive(Debug, Clone)]
pub struct ResponseFile {
	path: PathBuf,
	some_mime: Option<Mime>,
}

impl ResponseFile {
	pub fn new<P: AsRef<Path>>(path: P) -> Self {
		Self {
			path: path.as_ref().to_path_buf(),
			some_mime: None,
		}
	}

	pub fn with_mime(mut self, mime: Mime) -> Self {
		self.some_mime = Some(mime);

		self
	}

	#[inline(always)]
	pub fn path(&self) -> &Path {
		&self.path
	}

	#[inline(always)]
	pub fn mime(&self) -> Option<&Mime> {
		self.some_mime.as_ref()
	}
}

// --------------------------------------------------------------------------------
// ResponseAction

/// What the transport must do to answer the request.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseAction {
	/// Send the body. Without a MIME type the transport picks its default.
	///
	/// Text and numbers are sent as `text/plain; charset=utf-8` unless the handler
	/// declared another MIME type.
	Send {
		status_code: StatusCode,
		body: Bytes,
		some_mime: Option<Mime>,
	},
	SendFile {
		path: PathBuf,
		some_mime: Option<Mime>,
	},
	/// Send the status code with a textual message.
	Status {
		status_code: StatusCode,
		message: String,
	},
	NoContent,
}

impl ResponseAction {
	#[inline(always)]
	pub fn ok(body: Bytes, some_mime: Option<Mime>) -> Self {
		ResponseAction::Send {
			status_code: StatusCode::OK,
			body,
			some_mime,
		}
	}

	/// The envelope of a paginated collection: `{"_count": count, "_items": [...]}`.
	pub fn collection(count: u64, items: Vec<Value>) -> Result<Self, ResponseError> {
		let envelope = json!({
			"_count": count,
			"_items": items,
		});

		Payload::Data(envelope).into_action()
	}

	/// The failure action for the error.
	///
	/// With `detailed` set, the message includes the error's source chain.
	pub fn failure(error: &ResponseError, detailed: bool) -> Self {
		let message = if detailed {
			error.detailed_message()
		} else {
			error.message().to_owned()
		};

		ResponseAction::Status {
			status_code: error.status_code(),
			message,
		}
	}

	pub fn status_code(&self) -> StatusCode {
		match self {
			ResponseAction::Send { status_code, .. } | ResponseAction::Status { status_code, .. } => {
				*status_code
			}
			ResponseAction::SendFile { .. } => StatusCode::OK,
			ResponseAction::NoContent => StatusCode::NO_CONTENT,
		}
	}
}

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

#[cfg(test)]
mod test {
	use super::*;

	// --------------------------------------------------------------------------------

	#[test]
	fn payload_into_action() {
		assert_eq!(Payload::None.into_action().unwrap(), ResponseAction::NoContent);

		assert_eq!(
			Payload::from("bar").into_action().unwrap(),
			ResponseAction::ok(Bytes::from_static(b"bar"), Some(mime::TEXT_PLAIN_UTF_8)),
		);

		assert_eq!(
			Payload::from(vec![0u8, 1]).into_action().unwrap(),
			ResponseAction::ok(Bytes::from_static(&[0, 1]), None),
		);

		let action = Payload::from(42).into_action().unwrap();
		assert_eq!(
			action,
			ResponseAction::ok(Bytes::from_static(b"42"), Some(mime::TEXT_PLAIN_UTF_8)),
		);
		assert_eq!(action.status_code(), StatusCode::OK);

		let action = Payload::from("<p>bar</p>")
			.with_mime(mime::TEXT_HTML)
			.into_action()
			.unwrap();

		assert_eq!(
			action,
			ResponseAction::ok(Bytes::from_static(b"<p>bar</p>"), Some(mime::TEXT_HTML)),
		);

		let action = Payload::file("/var/www/index.html")
			.with_mime(mime::TEXT_HTML)
			.into_action()
			.unwrap();

		assert_eq!(
			action,
			ResponseAction::SendFile {
				path: PathBuf::from("/var/www/index.html"),
				some_mime: Some(mime::TEXT_HTML),
			},
		);

		let action = Payload::from(json!({ "name": "alice" })).into_action().unwrap();
		let ResponseAction::Send { body, some_mime, .. } = action else {
			panic!("unexpected action: {:?}", action);
		};

		assert_eq!(some_mime, Some(mime::APPLICATION_JSON));
		assert_eq!(
			serde_json::from_slice::<Value>(&body).unwrap(),
			json!({ "name": "alice" })
		);
	}

	#[test]
	fn collection_envelope() {
		let action = ResponseAction::collection(42, vec![json!("a"), json!("b")]).unwrap();
		let ResponseAction::Send { body, .. } = action else {
			panic!("unexpected action: {:?}", action);
		};

		assert_eq!(
			serde_json::from_slice::<Value>(&body).unwrap(),
			json!({ "_count": 42, "_items": ["a", "b"] }),
		);
	}

	#[test]
	fn failure_action() {
		let error = ResponseError::status(542, "boom");

		assert_eq!(
			ResponseAction::failure(&error, false),
			ResponseAction::Status {
				status_code: StatusCode::from_u16(542).unwrap(),
				message: "boom".to_owned(),
			},
		);
	}
}
