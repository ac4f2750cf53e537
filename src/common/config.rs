//! Router configuration.

use std::time::Duration;

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

pub(crate) const DEFAULT_LIMIT: u64 = 10;

// --------------------------------------------------
// RouterConfig

/// The configuration shared by every request a router handles.
#[derive(Debug, Clone)]
pub struct RouterConfig {
	pub(crate) default_limit: u64,
	pub(crate) error_details: bool,
	pub(crate) some_request_deadline: Option<Duration>,
}

impl RouterConfig {
	pub(crate) fn apply(&mut self, config_option: RouterConfigOption) {
		use RouterConfigOption::*;

		match config_option {
			DefaultLimit(default_limit) => self.default_limit = default_limit,
			ErrorDetails(error_details) => self.error_details = error_details,
			RequestDeadline(request_deadline) => self.some_request_deadline = Some(request_deadline),
		}
	}

	/// The page size of a collection request without a valid `limit`.
	/// Zero means "unbounded".
	#[inline(always)]
	pub fn default_limit(&self) -> u64 {
		self.default_limit
	}

	/// Whether failure messages include the chain of source errors.
	#[inline(always)]
	pub fn error_details(&self) -> bool {
		self.error_details
	}

	#[inline(always)]
	pub fn request_deadline(&self) -> Option<Duration> {
		self.some_request_deadline
	}
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self {
			default_limit: DEFAULT_LIMIT,
			error_details: false,
			some_request_deadline: None,
		}
	}
}

// --------------------------------------------------
// RouterConfigOption

option! {
	#[derive(Debug, Clone)]
	pub RouterConfigOption {
		DefaultLimit(u64),
		ErrorDetails(bool),
		/// The time a request has to run its hooks and its method handler.
		RequestDeadline(Duration),
	}
}

// ----------

/// Sets the page size used when a collection request has no valid `limit`.
/// Zero means "unbounded".
pub fn _with_default_limit(default_limit: u64) -> RouterConfigOption {
	RouterConfigOption::DefaultLimit(default_limit)
}

// ----------

/// Includes the messages of the source errors in failure responses.
pub fn _with_error_details(error_details: bool) -> RouterConfigOption {
	RouterConfigOption::ErrorDetails(error_details)
}

// ----------

/// Answers requests that don't complete in time with `503 Service Unavailable`.
pub fn _with_request_deadline(request_deadline: Duration) -> RouterConfigOption {
	RouterConfigOption::RequestDeadline(request_deadline)
}

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------
