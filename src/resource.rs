//! The path builder resources are defined with.

// ----------

use std::{
	fmt::{self, Debug, Formatter},
	sync::Arc,
};

use restmount_core::{
	response::{PayloadResult, ResponseError},
	BoxedFuture,
};
use serde_json::Value;

use crate::{
	handler::{MethodHandler, MethodKind},
	pattern::{compile, join_patterns, CompiledPattern, WILDCARD_PARAM},
	registry::Registry,
	request::{Options, RequestContext},
};

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

// --------------------------------------------------
// Resource

/// A handle bound to a path pattern of a router.
///
/// Every call registers directly in the router, so handles can be dropped once
/// the resource is defined. Handles are cheap to clone.
///
/// ```
/// use restmount::{Payload, Router};
///
/// let router = Router::new();
///
/// router
/// 	.resource("users/:id")
/// 	.get(|cx| {
/// 		Box::pin(async move {
/// 			let id = cx.param("id").unwrap_or_default().to_owned();
///
/// 			Ok(Payload::from(id))
/// 		})
/// 	})
/// 	.set("owner", "admin");
///
/// // Equivalent handles.
/// assert_eq!(router.resource("users").sub(":id"), router.resource("users/:id"));
/// ```
#[derive(Clone)]
pub struct Resource {
	registry: Arc<Registry>,
	pattern: Arc<CompiledPattern>,
}

impl Resource {
	pub(crate) fn new(registry: Arc<Registry>, pattern: &str) -> Self {
		Self {
			registry,
			pattern: compile(pattern, false),
		}
	}

	/// The raw pattern the handle is bound to, without leading and trailing slashes.
	#[inline(always)]
	pub fn pattern(&self) -> &str {
		self.pattern.raw()
	}

	// -------------------------

	/// Sets the handler of `GET` and `HEAD` requests.
	///
	/// Drops the `count` and `list` handlers set on the same pattern before.
	pub fn get<F>(&self, handler: F) -> &Self
	where
		F: for<'cx> Fn(&'cx mut RequestContext) -> BoxedFuture<'cx, PayloadResult>
			+ Send
			+ Sync
			+ 'static,
	{
		self.set_method(MethodHandler::Get(Arc::new(handler)))
	}

	/// Sets the handler of `PUT` and `PATCH` requests. The handler receives `true`
	/// for `PATCH`.
	pub fn put<F>(&self, handler: F) -> &Self
	where
		F: for<'cx> Fn(&'cx mut RequestContext, bool) -> BoxedFuture<'cx, PayloadResult>
			+ Send
			+ Sync
			+ 'static,
	{
		self.set_method(MethodHandler::Put(Arc::new(handler)))
	}

	pub fn post<F>(&self, handler: F) -> &Self
	where
		F: for<'cx> Fn(&'cx mut RequestContext) -> BoxedFuture<'cx, PayloadResult>
			+ Send
			+ Sync
			+ 'static,
	{
		self.set_method(MethodHandler::Post(Arc::new(handler)))
	}

	pub fn del<F>(&self, handler: F) -> &Self
	where
		F: for<'cx> Fn(&'cx mut RequestContext) -> BoxedFuture<'cx, PayloadResult>
			+ Send
			+ Sync
			+ 'static,
	{
		self.set_method(MethodHandler::Del(Arc::new(handler)))
	}

	/// Sets the handler counting the items of a collection resource.
	///
	/// `GET` requests are answered with the `count` and `list` pair when both are
	/// set and there is no `get` handler. Drops the `get` handler set on the same
	/// pattern before.
	pub fn count<F>(&self, handler: F) -> &Self
	where
		F: for<'cx> Fn(&'cx mut RequestContext) -> BoxedFuture<'cx, Result<u64, ResponseError>>
			+ Send
			+ Sync
			+ 'static,
	{
		self.set_method(MethodHandler::Count(Arc::new(handler)))
	}

	/// Sets the handler listing the items of a collection resource. It receives
	/// the `skip` and `limit` of the request, where a zero `limit` means "unbounded".
	///
	/// Drops the `get` handler set on the same pattern before.
	pub fn list<F>(&self, handler: F) -> &Self
	where
		F: for<'cx> Fn(
				&'cx mut RequestContext,
				u64,
				u64,
			) -> BoxedFuture<'cx, Result<Vec<Value>, ResponseError>>
			+ Send
			+ Sync
			+ 'static,
	{
		self.set_method(MethodHandler::List(Arc::new(handler)))
	}

	fn set_method(&self, method_handler: MethodHandler) -> &Self {
		self
			.registry
			.set_method(self.pattern(), method_handler.kind(), Some(method_handler));

		self
	}

	/// Resets the method to "undefined", hiding the handlers of the same method
	/// registered before on the same path.
	pub fn unset(&self, method_kind: MethodKind) -> &Self {
		self.registry.set_method(self.pattern(), method_kind, None);

		self
	}

	/// Unsets `post`, `put` and `del`. With `include_sub_paths`, they are also
	/// unset on the wildcard sub-path of the resource.
	pub fn readonly(&self, include_sub_paths: bool) -> &Self {
		const WRITE_METHODS: [MethodKind; 3] = [MethodKind::Post, MethodKind::Put, MethodKind::Del];

		for method_kind in WRITE_METHODS {
			self.unset(method_kind);
		}

		if include_sub_paths && !self.pattern.is_wildcard() {
			let sub_paths = self.sub(WILDCARD_PARAM);
			for method_kind in WRITE_METHODS {
				sub_paths.unset(method_kind);
			}
		}

		self
	}

	// -------------------------

	/// Adds a hook run for requests to the resource and to every path under it.
	///
	/// Hooks run in the order they were registered.
	pub fn hook<F>(&self, hook: F) -> &Self
	where
		F: for<'cx> Fn(&'cx mut RequestContext) -> BoxedFuture<'cx, Result<(), ResponseError>>
			+ Send
			+ Sync
			+ 'static,
	{
		self.registry.add_hook(self.pattern(), Arc::new(hook));

		self
	}

	/// Sets an option visible to requests to the resource and to every path under it.
	pub fn set<K, V>(&self, key: K, value: V) -> &Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self
			.registry
			.set_options(self.pattern(), false, [(key.into(), value.into())]);

		self
	}

	/// Sets an option visible only to requests to the resource itself.
	pub fn set_strict<K, V>(&self, key: K, value: V) -> &Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self
			.registry
			.set_options(self.pattern(), true, [(key.into(), value.into())]);

		self
	}

	/// Sets every option of the map, like [`set()`](Self::set).
	pub fn set_all(&self, options: Options) -> &Self {
		self.registry.set_options(self.pattern(), false, options);

		self
	}

	/// Sets every option of the map, like [`set_strict()`](Self::set_strict).
	pub fn set_all_strict(&self, options: Options) -> &Self {
		self.registry.set_options(self.pattern(), true, options);

		self
	}

	// -------------------------

	/// Returns a handle to the pattern under the resource.
	///
	/// # Panics
	///
	/// - if the resource is a wildcard, which can't have sub-paths
	///
	/// ```should_panic
	/// use restmount::Router;
	///
	/// let router = Router::new();
	/// router.resource("files/*").sub("meta");
	/// ```
	///
	/// - if the joined pattern is malformed
	pub fn sub<P: AsRef<str>>(&self, pattern: P) -> Resource {
		let pattern = pattern.as_ref();

		if self.pattern.is_wildcard() {
			panic!(
				"'{}' cannot be registered under the wildcard resource '{}'",
				pattern, self.pattern,
			)
		}

		Resource::new(
			self.registry.clone(),
			&join_patterns(self.pattern(), pattern),
		)
	}

	/// Returns a handle to the pattern under the resource with the hook added.
	pub fn sub_with_hook<P, F>(&self, pattern: P, hook: F) -> Resource
	where
		P: AsRef<str>,
		F: for<'cx> Fn(&'cx mut RequestContext) -> BoxedFuture<'cx, Result<(), ResponseError>>
			+ Send
			+ Sync
			+ 'static,
	{
		let resource = self.sub(pattern);
		resource.hook(hook);

		resource
	}

	/// Removes every registration of the pattern under the resource and of the
	/// patterns under it.
	///
	/// # Panics
	///
	/// - if the resource is a wildcard
	pub fn remove<P: AsRef<str>>(&self, pattern: P) {
		let pattern = pattern.as_ref();

		if self.pattern.is_wildcard() {
			panic!(
				"'{}' cannot be removed under the wildcard resource '{}'",
				pattern, self.pattern,
			)
		}

		self
			.registry
			.remove_prefix(&join_patterns(self.pattern(), pattern));
	}
}

impl PartialEq for Resource {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.registry, &other.registry) && Arc::ptr_eq(&self.pattern, &other.pattern)
	}
}

impl Eq for Resource {}

impl Debug for Resource {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "Resource {{ pattern: {} }}", self.pattern)
	}
}

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------
