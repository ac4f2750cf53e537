use std::sync::Arc;

use http::StatusCode;
use restmount_core::{
	response::{ResponseAction, ResponseError},
	BoxedFuture,
};
use tracing::{debug, warn};

use crate::{
	common::{
		config::{RouterConfig, RouterConfigOption},
		IntoArray,
	},
	registry::Registry,
	request::RequestContext,
	resource::Resource,
	routing::{match_path, MatchResult, RoutingError},
};

// --------------------------------------------------

#[cfg(feature = "service")]
mod service;

#[cfg(feature = "service")]
pub use service::{RouterService, ServiceError};

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

/// The registry of resources and the entry point of request handling.
///
/// Each router owns its registrations. Clones share them, so resources can be
/// defined through one clone while another one handles requests.
#[derive(Clone)]
pub struct Router {
	registry: Arc<Registry>,
	config: Arc<RouterConfig>,
}

impl Router {
	pub fn new() -> Router {
		Self {
			registry: Arc::new(Registry::new()),
			config: Arc::new(RouterConfig::default()),
		}
	}

	/// Creates a router with the given configuration.
	///
	/// ```
	/// use std::time::Duration;
	///
	/// use restmount::{
	/// 	common::config::{_with_default_limit, _with_request_deadline},
	/// 	Router,
	/// };
	///
	/// let router = Router::with_config([
	/// 	_with_default_limit(25),
	/// 	_with_request_deadline(Duration::from_secs(30)),
	/// ]);
	///
	/// assert_eq!(router.config().default_limit(), 25);
	/// ```
	pub fn with_config<C, const N: usize>(config_options: C) -> Router
	where
		C: IntoArray<RouterConfigOption, N>,
	{
		let mut router = Router::new();
		router.configure(config_options);

		router
	}

	/// Applies the configuration options.
	///
	/// Clones of the router made before the call keep their configuration.
	pub fn configure<C, const N: usize>(&mut self, config_options: C)
	where
		C: IntoArray<RouterConfigOption, N>,
	{
		let config = Arc::make_mut(&mut self.config);

		for config_option in config_options.into_array() {
			config.apply(config_option);
		}
	}

	#[inline(always)]
	pub fn config(&self) -> &RouterConfig {
		&self.config
	}

	// -------------------------

	/// Returns a handle to the resource with the given pattern.
	///
	/// # Panics
	///
	/// - if the pattern is malformed
	pub fn resource<P: AsRef<str>>(&self, pattern: P) -> Resource {
		Resource::new(self.registry.clone(), pattern.as_ref())
	}

	/// Returns a handle to the resource with the hook added.
	pub fn resource_with_hook<P, F>(&self, pattern: P, hook: F) -> Resource
	where
		P: AsRef<str>,
		F: for<'cx> Fn(&'cx mut RequestContext) -> BoxedFuture<'cx, Result<(), ResponseError>>
			+ Send
			+ Sync
			+ 'static,
	{
		let resource = self.resource(pattern);
		resource.hook(hook);

		resource
	}

	/// Removes every registration of the pattern and of the patterns under it.
	pub fn remove<P: AsRef<str>>(&self, pattern: P) {
		self.registry.remove_prefix(pattern.as_ref());
	}

	// -------------------------

	/// Resolves the method handlers and the hook chain for the path.
	///
	/// Returns `None` when no resource has a handler for the path.
	pub fn match_path<P: AsRef<str>>(&self, path: P) -> Option<MatchResult> {
		match_path(&self.registry.snapshot(), path.as_ref())
	}

	/// Handles the request and returns the action the transport must perform.
	///
	/// The hooks of every resource whose pattern is a prefix of the request path
	/// run first, in registration order. The method handler runs if all of them
	/// succeed. Failures are turned into a status action.
	pub async fn handle(&self, cx: &mut RequestContext) -> ResponseAction {
		let Some(match_result) = self.match_path(cx.path()) else {
			return ResponseAction::failure(&ResponseError::not_found(), self.config.error_details);
		};

		let default_limit = self.config.default_limit;

		let result = match self.config.some_request_deadline {
			Some(request_deadline) => {
				let some_result =
					tokio::time::timeout(request_deadline, match_result.run(cx, default_limit)).await;

				match some_result {
					Ok(result) => result,
					Err(_) => {
						warn!(
							path = cx.path(),
							deadline = ?request_deadline,
							"request deadline exceeded",
						);

						Err(
							ResponseError::new(StatusCode::SERVICE_UNAVAILABLE, "Request deadline exceeded")
								.with_source(RoutingError::DeadlineExceeded(request_deadline)),
						)
					}
				}
			}
			None => match_result.run(cx, default_limit).await,
		};

		match result {
			Ok(action) => action,
			Err(error) => {
				debug!(
					path = cx.path(),
					status_code = %error.status_code(),
					error_message = error.message(),
					"request failed",
				);

				ResponseAction::failure(&error, self.config.error_details)
			}
		}
	}
}

impl Default for Router {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Router {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("registry", &self.registry)
			.field("config", &self.config)
			.finish()
	}
}

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------
