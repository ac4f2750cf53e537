use std::fmt::{self, Display, Formatter};

use super::{CountHandlerFn, HandlerFn, ListHandlerFn, PutHandlerFn};

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

// --------------------------------------------------
// MethodKind

/// The resource callbacks a pattern can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
	Get,
	Put,
	Post,
	Del,
	List,
	Count,
}

impl MethodKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			MethodKind::Get => "get",
			MethodKind::Put => "put",
			MethodKind::Post => "post",
			MethodKind::Del => "del",
			MethodKind::List => "list",
			MethodKind::Count => "count",
		}
	}
}

impl Display for MethodKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

// --------------------------------------------------
// MethodHandler

#[derive(Clone)]
pub(crate) enum MethodHandler {
	Get(HandlerFn),
	Put(PutHandlerFn),
	Post(HandlerFn),
	Del(HandlerFn),
	List(ListHandlerFn),
	Count(CountHandlerFn),
}

impl MethodHandler {
	pub(crate) fn kind(&self) -> MethodKind {
		match self {
			MethodHandler::Get(_) => MethodKind::Get,
			MethodHandler::Put(_) => MethodKind::Put,
			MethodHandler::Post(_) => MethodKind::Post,
			MethodHandler::Del(_) => MethodKind::Del,
			MethodHandler::List(_) => MethodKind::List,
			MethodHandler::Count(_) => MethodKind::Count,
		}
	}
}

// --------------------------------------------------------------------------------
