//! Wall-clock helpers.

use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

/// Current time as unix seconds.
pub fn unix_timestamp() -> Result<u64, SystemTimeError> {
	Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn timestamps_are_recent() {
		// 2023-01-01; anything earlier means a broken clock source.
		let now = unix_timestamp().unwrap();
		assert!(now > 1_672_531_200);
	}
}
