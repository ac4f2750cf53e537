use std::{
	borrow::Cow,
	fmt::{self, Display, Formatter},
};

use http::StatusCode;

use crate::{BoxedError, StdError};

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

// --------------------------------------------------
// ResponseError

/// An error that ends the request with a status code and a message.
///
/// Hooks and method handlers return it to abort the request. The status code
/// defaults to `500 Internal Server Error` when the error is created from an
/// arbitrary error value.
#[derive(Debug)]
pub struct ResponseError {
	status_code: StatusCode,
	message: Cow<'static, str>,
	some_source: Option<BoxedError>,
}

impl ResponseError {
	pub fn new<M>(status_code: StatusCode, message: M) -> Self
	where
		M: Into<Cow<'static, str>>,
	{
		ResponseError {
			status_code,
			message: message.into(),
			some_source: None,
		}
	}

	/// Creates an error with a raw numeric status code.
	///
	/// Codes outside `100..=999` can't be represented and fall back to `500`.
	pub fn status<M>(code: u16, message: M) -> Self
	where
		M: Into<Cow<'static, str>>,
	{
		let status_code = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

		Self::new(status_code, message)
	}

	/// Creates a `500 Internal Server Error` with the error's message, keeping
	/// the error as the source.
	pub fn from_error<E>(error: E) -> Self
	where
		E: StdError + Send + Sync + 'static,
	{
		ResponseError {
			status_code: StatusCode::INTERNAL_SERVER_ERROR,
			message: error.to_string().into(),
			some_source: Some(error.into()),
		}
	}

	pub fn with_status_code(mut self, status_code: StatusCode) -> Self {
		self.status_code = status_code;

		self
	}

	pub fn with_source<E>(mut self, source: E) -> Self
	where
		E: Into<BoxedError>,
	{
		self.some_source = Some(source.into());

		self
	}

	#[inline(always)]
	pub fn status_code(&self) -> StatusCode {
		self.status_code
	}

	#[inline(always)]
	pub fn message(&self) -> &str {
		&self.message
	}

	/// Returns the message followed by the messages of the whole source chain.
	pub fn detailed_message(&self) -> String {
		let mut detailed_message = self.message.to_string();

		let mut some_source = self.source();
		while let Some(source) = some_source {
			let source_message = source.to_string();
			if source_message != detailed_message {
				detailed_message.push_str("\n  caused by: ");
				detailed_message.push_str(&source_message);
			}

			some_source = source.source();
		}

		detailed_message
	}

	// -------------------------
	// Shortcuts

	pub fn created() -> Self {
		Self::new(StatusCode::CREATED, "Created")
	}

	pub fn no_content() -> Self {
		Self::new(StatusCode::NO_CONTENT, "")
	}

	pub fn bad_request() -> Self {
		Self::new(StatusCode::BAD_REQUEST, "Bad request")
	}

	pub fn unauthorized() -> Self {
		Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND, "Not found")
	}

	pub fn method_not_allowed() -> Self {
		Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
	}

	pub fn not_implemented() -> Self {
		Self::new(StatusCode::NOT_IMPLEMENTED, "Not implemented")
	}
}

impl From<StatusCode> for ResponseError {
	fn from(status_code: StatusCode) -> Self {
		let message = status_code.canonical_reason().unwrap_or_default();

		Self::new(status_code, message)
	}
}

impl Display for ResponseError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!("[{}]", self.status_code))?;

		if !self.message.is_empty() {
			f.write_fmt(format_args!(" {}", self.message))?
		}

		Ok(())
	}
}

impl StdError for ResponseError {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		self
			.some_source
			.as_ref()
			.map(|boxed_error| boxed_error.as_ref() as &(dyn StdError + 'static))
	}
}

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

#[cfg(test)]
mod test {
	use std::io;

	use super::*;

	// --------------------------------------------------------------------------------

	#[test]
	fn response_error_codes() {
		let error = ResponseError::from_error(io::Error::new(io::ErrorKind::Other, "boom"));
		assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(error.message(), "boom");
		assert!(error.source().is_some());

		let error = ResponseError::status(542, "boom");
		assert_eq!(error.status_code().as_u16(), 542);

		let error = ResponseError::status(42, "boom");
		assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

		assert_eq!(ResponseError::not_found().message(), "Not found");
		assert_eq!(
			ResponseError::method_not_allowed().status_code(),
			StatusCode::METHOD_NOT_ALLOWED,
		);

		let error = ResponseError::from(StatusCode::BAD_GATEWAY);
		assert_eq!(error.message(), "Bad Gateway");
		assert_eq!(error.to_string(), "[502 Bad Gateway] Bad Gateway");
	}

	#[test]
	fn response_error_detailed_message() {
		let inner = io::Error::new(io::ErrorKind::NotFound, "no such document");
		let error = ResponseError::new(StatusCode::NOT_FOUND, "lookup failed").with_source(inner);

		assert_eq!(
			error.detailed_message(),
			"lookup failed\n  caused by: no such document",
		);

		let error = ResponseError::from_error(io::Error::new(io::ErrorKind::Other, "boom"));
		assert_eq!(error.detailed_message(), "boom");
	}
}
