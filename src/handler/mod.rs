//! Method handler types and the REST method dispatcher.

use std::sync::Arc;

use restmount_core::{
	response::{PayloadResult, ResponseError},
	BoxedFuture,
};
use serde_json::Value;

use crate::request::RequestContext;

// --------------------------------------------------

mod kind;
pub(crate) mod request_handlers;

pub use kind::MethodKind;
pub(crate) use kind::MethodHandler;
pub use request_handlers::MethodHandlers;

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

/// Handles `GET`/`HEAD`, `POST` and `DELETE` requests.
pub type HandlerFn =
	Arc<dyn for<'cx> Fn(&'cx mut RequestContext) -> BoxedFuture<'cx, PayloadResult> + Send + Sync>;

/// Handles `PUT` and `PATCH` requests. The flag is `true` for `PATCH`.
pub type PutHandlerFn = Arc<
	dyn for<'cx> Fn(&'cx mut RequestContext, bool) -> BoxedFuture<'cx, PayloadResult> + Send + Sync,
>;

/// Counts the items of a collection.
pub type CountHandlerFn = Arc<
	dyn for<'cx> Fn(&'cx mut RequestContext) -> BoxedFuture<'cx, Result<u64, ResponseError>>
		+ Send
		+ Sync,
>;

/// Lists `limit` items of a collection starting at `skip`. A zero `limit`
/// means "until the end of the collection".
pub type ListHandlerFn = Arc<
	dyn for<'cx> Fn(&'cx mut RequestContext, u64, u64) -> BoxedFuture<'cx, Result<Vec<Value>, ResponseError>>
		+ Send
		+ Sync,
>;

// --------------------------------------------------------------------------------
