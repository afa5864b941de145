//! Persistence for order records, the order number index and shipper
//! locations.
//!
//! Three namespaces back the engine:
//!
//! - `orders`: order id to the full [`OrderRecord`] aggregate.
//! - `order_numbers`: shareable order number to order id. Claimed with a
//!   create-only write so numbers stay unique.
//! - `shipper_locations`: shipper id to the latest reported position,
//!   written with a TTL so stale positions age out on their own.

use orderflow_storage::{StorageError, StorageService};
use orderflow_types::{OrderRecord, ShipperLocation, StorageKey};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the order store.
#[derive(Debug, Error)]
pub enum StateError {
	#[error("Order not found")]
	NotFound,
	#[error("Order was modified concurrently")]
	Conflict,
	#[error("Storage error: {0}")]
	Storage(String),
}

impl From<StorageError> for StateError {
	fn from(err: StorageError) -> Self {
		match err {
			StorageError::NotFound => StateError::NotFound,
			StorageError::Conflict => StateError::Conflict,
			other => StateError::Storage(other.to_string()),
		}
	}
}

/// Versioned access to persisted orders.
///
/// Every load returns the version the record was read at; every commit
/// passes that version back so concurrent writers lose cleanly instead
/// of overwriting each other.
pub struct OrderStore {
	storage: Arc<StorageService>,
}

impl OrderStore {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Loads an order record with the version to commit against.
	pub async fn load(&self, order_id: &str) -> Result<(OrderRecord, u64), StateError> {
		Ok(self.storage.retrieve(StorageKey::Orders, order_id).await?)
	}

	/// Resolves an order number to its order id.
	pub async fn resolve_number(&self, order_number: &str) -> Result<String, StateError> {
		let (order_id, _) = self
			.storage
			.retrieve::<String>(StorageKey::OrderNumbers, order_number)
			.await?;
		Ok(order_id)
	}

	/// Claims an order number for an order. Fails with [`StateError::Conflict`]
	/// when the number is already taken.
	pub async fn claim_number(&self, order_number: &str, order_id: &str) -> Result<(), StateError> {
		self.storage
			.create(StorageKey::OrderNumbers, order_number, &order_id)
			.await?;
		Ok(())
	}

	/// Inserts a freshly created record. The id must be unused.
	pub async fn insert(&self, record: &OrderRecord) -> Result<(), StateError> {
		self.storage
			.create(StorageKey::Orders, &record.order.id, record)
			.await?;
		Ok(())
	}

	/// Writes a record back only if it still holds `version`. Returns
	/// the new version on success.
	pub async fn commit(&self, record: &OrderRecord, version: u64) -> Result<u64, StateError> {
		Ok(self
			.storage
			.update_checked(StorageKey::Orders, &record.order.id, record, version)
			.await?)
	}

	/// Deletes a record and frees its order number.
	pub async fn remove(&self, record: &OrderRecord) -> Result<(), StateError> {
		self.storage
			.remove(StorageKey::Orders, &record.order.id)
			.await?;
		self.storage
			.remove(StorageKey::OrderNumbers, &record.order.order_number)
			.await?;
		Ok(())
	}

	/// Stores a shipper position that expires after `ttl`.
	pub async fn put_location(
		&self,
		location: &ShipperLocation,
		ttl: Duration,
	) -> Result<(), StateError> {
		self.storage
			.store_with_ttl(
				StorageKey::ShipperLocations,
				&location.shipper_id,
				location,
				Some(ttl),
			)
			.await?;
		Ok(())
	}

	/// Latest fresh position for a shipper, or None once it expired.
	pub async fn location(&self, shipper_id: &str) -> Result<Option<ShipperLocation>, StateError> {
		match self
			.storage
			.retrieve::<ShipperLocation>(StorageKey::ShipperLocations, shipper_id)
			.await
		{
			Ok((location, _)) => Ok(Some(location)),
			Err(StorageError::NotFound) => Ok(None),
			Err(err) => Err(err.into()),
		}
	}
}
