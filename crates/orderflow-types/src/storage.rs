//! Storage namespace keys.
//!
//! Every persisted value lives under one of these namespaces; backends
//! combine the namespace with a record id to form the storage key.

use std::fmt;
use std::str::FromStr;

/// Well-known storage namespaces used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Order records keyed by internal order id.
	Orders,
	/// Order-number index mapping an external number to an internal id.
	OrderNumbers,
	/// Latest shipper location pings, stored with a freshness TTL.
	ShipperLocations,
}

impl StorageKey {
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
			StorageKey::OrderNumbers => "order_numbers",
			StorageKey::ShipperLocations => "shipper_locations",
		}
	}

	/// All namespaces, used when wiring per-namespace TTL overrides.
	pub fn all() -> &'static [StorageKey] {
		&[
			StorageKey::Orders,
			StorageKey::OrderNumbers,
			StorageKey::ShipperLocations,
		]
	}
}

impl fmt::Display for StorageKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"orders" => Ok(StorageKey::Orders),
			"order_numbers" => Ok(StorageKey::OrderNumbers),
			"shipper_locations" => Ok(StorageKey::ShipperLocations),
			_ => Err(()),
		}
	}
}
