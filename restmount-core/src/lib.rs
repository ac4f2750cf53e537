//! Types shared by the `restmount` router, its transports and resource adapters.

use std::{future::Future, pin::Pin};

// ----------

pub(crate) use std::error::Error as StdError;

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

pub mod http;
pub mod response;

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

pub type BoxedError = Box<dyn StdError + Send + Sync>;
pub type BoxedFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// --------------------------------------------------------------------------------
