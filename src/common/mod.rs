//! Common types and functions.

// ----------

#[macro_use]
pub(crate) mod macros;

pub mod config;

#[cfg(feature = "service")]
pub(crate) mod header_utils;

#[cfg(test)]
pub(crate) mod test_helpers;

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

// --------------------------------------------------
// IntoArray trait

#[doc(hidden)]
pub trait IntoArray<T, const N: usize> {
	fn into_array(self) -> [T; N];
}

impl<T, const N: usize> IntoArray<T, N> for [T; N]
where
	T: IntoArray<T, 1>,
{
	fn into_array(self) -> [T; N] {
		self
	}
}

// --------------------------------------------------------------------------------
