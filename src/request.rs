//! The per-request context hooks and handlers work on.

// ----------

use std::collections::HashMap;

use bytes::Bytes;
use http::{header::HOST, Extensions, HeaderMap, Method};
use serde_json::{Map, Value};

use crate::pattern::{join_patterns, normalize_path, trim_slashes};

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

pub type Params = HashMap<String, String>;
pub type Options = Map<String, Value>;

// --------------------------------------------------
// RequestContext

/// Carries the request data through the hook chain to the method handler.
///
/// `params` are bound by the router before the hooks of the pattern that
/// declares them run. `options` are the merged options of every matching
/// pattern and become visible once all hooks have run.
#[derive(Debug)]
pub struct RequestContext {
	method: Method,
	path: String,
	mount_path: String,
	query: Vec<(String, String)>,
	headers: HeaderMap,
	some_body: Option<Value>,
	raw_body: Bytes,

	pub(crate) some_matched_pattern: Option<String>,
	pub(crate) params: Params,
	pub(crate) options: Options,
	extensions: Extensions,
}

impl RequestContext {
	/// Creates a context for the request path relative to the router's mount point.
	pub fn new<P: AsRef<str>>(method: Method, path: P) -> Self {
		Self {
			method,
			path: normalize_path(path.as_ref()),
			mount_path: String::new(),
			query: Vec::new(),
			headers: HeaderMap::new(),
			some_body: None,
			raw_body: Bytes::new(),
			some_matched_pattern: None,
			params: Params::new(),
			options: Options::new(),
			extensions: Extensions::new(),
		}
	}

	/// Sets the path the router is mounted at, used by [`href()`](Self::href).
	pub fn with_mount_path<P: AsRef<str>>(mut self, mount_path: P) -> Self {
		self.mount_path = trim_slashes(mount_path.as_ref()).to_owned();

		self
	}

	/// Sets the decoded query string pairs.
	pub fn with_query<I, K, V>(mut self, query: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		self.query = query
			.into_iter()
			.map(|(key, value)| (key.into(), value.into()))
			.collect();

		self
	}

	pub fn with_headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;

		self
	}

	/// Sets the parsed request body.
	pub fn with_body(mut self, body: Value) -> Self {
		self.some_body = Some(body);

		self
	}

	/// Sets the raw request body.
	pub fn with_raw_body(mut self, raw_body: Bytes) -> Self {
		self.raw_body = raw_body;

		self
	}

	// -------------------------

	#[inline(always)]
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// The normalized request path: a leading slash, no trailing slash.
	#[inline(always)]
	pub fn path(&self) -> &str {
		&self.path
	}

	#[inline(always)]
	pub fn mount_path(&self) -> &str {
		&self.mount_path
	}

	/// The raw pattern of the resource that handles the request, once matched.
	#[inline(always)]
	pub fn matched_pattern(&self) -> Option<&str> {
		self.some_matched_pattern.as_deref()
	}

	/// Returns the first value of the query parameter.
	pub fn query_param(&self, name: &str) -> Option<&str> {
		self
			.query
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	#[inline(always)]
	pub fn query(&self) -> &[(String, String)] {
		&self.query
	}

	#[inline(always)]
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	#[inline(always)]
	pub fn headers_mut(&mut self) -> &mut HeaderMap {
		&mut self.headers
	}

	#[inline(always)]
	pub fn body(&self) -> Option<&Value> {
		self.some_body.as_ref()
	}

	#[inline(always)]
	pub fn take_body(&mut self) -> Option<Value> {
		self.some_body.take()
	}

	#[inline(always)]
	pub fn raw_body(&self) -> &Bytes {
		&self.raw_body
	}

	// -------------------------

	#[inline(always)]
	pub fn params(&self) -> &Params {
		&self.params
	}

	#[inline(always)]
	pub fn params_mut(&mut self) -> &mut Params {
		&mut self.params
	}

	/// Returns the value bound to the path parameter.
	///
	/// Named parameters are percent-decoded. The wildcard remainder, under the
	/// name `"*"`, is kept as it appeared in the path.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	#[inline(always)]
	pub fn options(&self) -> &Options {
		&self.options
	}

	#[inline(always)]
	pub fn options_mut(&mut self) -> &mut Options {
		&mut self.options
	}

	pub fn option(&self, key: &str) -> Option<&Value> {
		self.options.get(key)
	}

	#[inline(always)]
	pub fn extensions(&self) -> &Extensions {
		&self.extensions
	}

	#[inline(always)]
	pub fn extensions_mut(&mut self) -> &mut Extensions {
		&mut self.extensions
	}

	// -------------------------

	/// Builds the absolute URL of the current resource, or of a path under it.
	///
	/// The scheme is `http` and the authority comes from the `Host` header.
	/// Without a `Host` header the URL is relative to the server root.
	pub fn href(&self, some_sub_path: Option<&str>) -> String {
		let mut path = join_patterns(&self.mount_path, &self.path);
		if let Some(sub_path) = some_sub_path {
			path = join_patterns(&path, sub_path);
		}

		match self.headers.get(HOST).and_then(|host| host.to_str().ok()) {
			Some(host) => format!("http://{}/{}", host, path),
			None => format!("/{}", path),
		}
	}
}

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------
