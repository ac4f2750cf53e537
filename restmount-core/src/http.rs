//! Types related to the HTTP protocol.

// ----------

pub use http::{header, method, status};
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------
