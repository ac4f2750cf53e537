use bytes::Bytes;
use serde_json::{Number, Value};

use super::*;

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

impl From<()> for Payload {
	#[inline]
	fn from(_: ()) -> Self {
		Payload::None
	}
}

impl<T> From<Option<T>> for Payload
where
	T: Into<Payload>,
{
	#[inline]
	fn from(some_value: Option<T>) -> Self {
		some_value.map_or(Payload::None, Into::into)
	}
}

// --------------------------------------------------
// Text and bytes

impl From<&'static str> for Payload {
	#[inline]
	fn from(text: &'static str) -> Self {
		Payload::Text(text.to_owned())
	}
}

impl From<String> for Payload {
	#[inline]
	fn from(text: String) -> Self {
		Payload::Text(text)
	}
}

impl From<Bytes> for Payload {
	#[inline]
	fn from(bytes: Bytes) -> Self {
		Payload::Bytes(bytes)
	}
}

impl From<Vec<u8>> for Payload {
	#[inline]
	fn from(bytes: Vec<u8>) -> Self {
		Payload::Bytes(bytes.into())
	}
}

impl From<&'static [u8]> for Payload {
	#[inline]
	fn from(bytes: &'static [u8]) -> Self {
		Payload::Bytes(Bytes::from_static(bytes))
	}
}

// --------------------------------------------------
// Numbers

macro_rules! impl_from_integer {
	($($type:ty),+) => {
		$(
			impl From<$type> for Payload {
				#[inline]
				fn from(number: $type) -> Self {
					Payload::Number(number.into())
				}
			}
		)+
	};
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);

impl From<f64> for Payload {
	#[inline]
	fn from(number: f64) -> Self {
		Number::from_f64(number).map_or_else(|| Payload::Text(number.to_string()), Payload::Number)
	}
}

// --------------------------------------------------
// Typed bodies and files

impl From<ResponseBody> for Payload {
	#[inline]
	fn from(body: ResponseBody) -> Self {
		Payload::Body(body)
	}
}

impl From<ResponseFile> for Payload {
	#[inline]
	fn from(file: ResponseFile) -> Self {
		Payload::File(file)
	}
}

// --------------------------------------------------
// Structured data

impl From<Value> for Payload {
	#[inline]
	fn from(value: Value) -> Self {
		match value {
			Value::Null => Payload::None,
			Value::Number(number) => Payload::Number(number),
			value => Payload::Data(value),
		}
	}
}

impl From<serde_json::Map<String, Value>> for Payload {
	#[inline]
	fn from(map: serde_json::Map<String, Value>) -> Self {
		Payload::Data(Value::Object(map))
	}
}

// --------------------------------------------------------------------------------
