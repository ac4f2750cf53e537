//! A resource-oriented HTTP dispatch layer.
//!
//! Resources are registered on a [`Router`] under path patterns. A pattern
//! segment is either static, a named parameter (`:name`), or a trailing
//! wildcard (`*`) capturing the remainder of the path. Each resource can have
//! method handlers, hooks run for the resource and every path under it, and
//! options inherited by the paths under it.
//!
//! ```
//! use restmount::{Payload, RequestContext, ResponseAction, ResponseError, Router};
//! use restmount::http::Method;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let router = Router::new();
//!
//! let users = router.resource("users");
//! users
//! 	.hook(|cx| {
//! 		Box::pin(async move {
//! 			if cx.headers().contains_key("authorization") {
//! 				Ok(())
//! 			} else {
//! 				Err(ResponseError::unauthorized())
//! 			}
//! 		})
//! 	})
//! 	.count(|_cx| Box::pin(async { Ok(1) }))
//! 	.list(|_cx, _skip, _limit| Box::pin(async { Ok(vec![serde_json::json!("alice")]) }));
//!
//! users
//! 	.sub(":name")
//! 	.get(|cx| Box::pin(async move { Ok(Payload::from(cx.param("name").map(str::to_owned))) }));
//!
//! let mut cx = RequestContext::new(Method::GET, "/users/alice");
//! let action = router.handle(&mut cx).await;
//!
//! assert_eq!(action.status_code(), 401);
//! # }
//! ```

// ----------

pub(crate) use thiserror::Error as ImplError;

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

#[macro_use]
pub mod common;

pub mod handler;
mod middleware;
mod pattern;
mod registry;
pub mod request;
pub mod resource;
pub mod router;
mod routing;

// --------------------------------------------------------------------------------

pub use restmount_core::{
	http,
	response::{Payload, PayloadResult, ResponseAction, ResponseBody, ResponseError, ResponseFile},
	BoxedError, BoxedFuture,
};

#[doc(hidden)]
pub use common::IntoArray;

pub use common::config::{
	RouterConfig, RouterConfigOption, _with_default_limit, _with_error_details,
	_with_request_deadline,
};

pub use handler::{MethodHandlers, MethodKind};
pub use middleware::HookFn;
pub use pattern::WILDCARD_PARAM;
pub use request::{Options, Params, RequestContext};
pub use resource::Resource;
pub use router::Router;
pub use routing::{MatchResult, RoutingError};

#[cfg(feature = "service")]
pub use router::{RouterService, ServiceError};
