//! Formatting helpers for log output.

/// Truncates an id to a short prefix for tracing fields.
///
/// Order ids are UUIDs and shipper ids are opaque strings, so the cut
/// respects character boundaries rather than assuming ASCII.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((index, _)) => format!("{}..", &id[..index]),
		None => id.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truncates_long_ids() {
		assert_eq!(
			truncate_id("8f14e45f-ceea-467f-a34e-cbf9b3e2f3b1"),
			"8f14e45f.."
		);
	}

	#[test]
	fn keeps_short_ids_whole() {
		assert_eq!(truncate_id("ship-1"), "ship-1");
		assert_eq!(truncate_id("12345678"), "12345678");
		assert_eq!(truncate_id(""), "");
	}

	#[test]
	fn respects_character_boundaries() {
		assert_eq!(truncate_id("ăăăăăăăăăă"), "ăăăăăăăă..");
	}
}
