use std::num::ParseFloatError;

use http::{header::ToStrError, HeaderValue};

use crate::ImplError;

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

/// Splits a header value like `Accept` into its elements and their quality
/// weights. An element without a `q` parameter has the weight 1. Parameters
/// other than `q` are skipped.
pub(crate) fn split_header_value_with_weights(
	header_value: &HeaderValue,
) -> Result<Vec<(&str, f32)>, SplitHeaderValueError> {
	header_value
		.to_str()?
		.split(',')
		.filter(|element| !element.trim().is_empty())
		.map(|element| {
			let mut segments = element.split(';');
			let value = segments.next().unwrap_or_default().trim();

			let mut quality = 1f32;
			for parameter in segments {
				let Some((name, parameter_value)) = parameter.split_once('=') else {
					continue;
				};

				if !name.trim().eq_ignore_ascii_case("q") {
					continue;
				}

				quality = parameter_value.trim().parse::<f32>()?;
				if !(0.0..=1.0).contains(&quality) {
					return Err(SplitHeaderValueError::InvalidQualitySpecifier);
				}
			}

			Ok((value, quality))
		})
		.collect()
}

#[derive(Debug, ImplError)]
pub(crate) enum SplitHeaderValueError {
	#[error(transparent)]
	ToStrError(#[from] ToStrError),
	#[error("invalid quality specifier")]
	InvalidQualitySpecifier,
	#[error(transparent)]
	ParseFloatError(#[from] ParseFloatError),
}

// ----------

/// Returns the weight the media ranges give to the media type. The most
/// specific matching range decides (`type/subtype` over `type/*` over `*/*`).
/// A type no range matches has the weight 0.
pub(crate) fn media_type_quality(media_ranges: &[(&str, f32)], type_: &str, subtype: &str) -> f32 {
	media_ranges
		.iter()
		.filter_map(|(media_range, quality)| {
			let (range_type, range_subtype) = media_range.split_once('/')?;

			let specificity = if range_type == "*" && range_subtype == "*" {
				0
			} else if !range_type.eq_ignore_ascii_case(type_) {
				return None;
			} else if range_subtype == "*" {
				1
			} else if range_subtype.eq_ignore_ascii_case(subtype) {
				2
			} else {
				return None;
			};

			Some((specificity, *quality))
		})
		.max_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)))
		.map_or(0.0, |(_, quality)| quality)
}

// --------------------------------------------------------------------------------
// --------------------------------------------------------------------------------

#[cfg(test)]
mod test {
	use super::*;

	// --------------------------------------------------------------------------------

	#[test]
	fn split_header_value_with_weights_elements() {
		let header_value =
			HeaderValue::from_static("text/html, application/json;q=0.5, text/plain; charset=utf-8 ; q=0.1,");

		assert_eq!(
			split_header_value_with_weights(&header_value).unwrap(),
			[
				("text/html", 1.0),
				("application/json", 0.5),
				("text/plain", 0.1),
			],
		);

		let header_value = HeaderValue::from_static("application/json;q=x");
		assert!(matches!(
			split_header_value_with_weights(&header_value),
			Err(SplitHeaderValueError::ParseFloatError(_)),
		));

		let header_value = HeaderValue::from_static("application/json;q=2");
		assert!(matches!(
			split_header_value_with_weights(&header_value),
			Err(SplitHeaderValueError::InvalidQualitySpecifier),
		));
	}

	#[test]
	fn media_type_quality_specificity() {
		let media_ranges = [("text/plain", 0.0), ("text/*", 0.4), ("*/*", 0.8)];

		assert_eq!(media_type_quality(&media_ranges, "text", "plain"), 0.0);
		assert_eq!(media_type_quality(&media_ranges, "text", "html"), 0.4);
		assert_eq!(media_type_quality(&media_ranges, "application", "json"), 0.8);

		let media_ranges = [("application/*", 1.0)];
		assert_eq!(media_type_quality(&media_ranges, "application", "json"), 1.0);
		assert_eq!(media_type_quality(&media_ranges, "text", "plain"), 0.0);

		assert_eq!(media_type_quality(&[], "text", "plain"), 0.0);
	}
}
