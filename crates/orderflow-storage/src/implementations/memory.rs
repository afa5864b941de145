//! In-memory storage backend implementation.
//!
//! Stores entries in a HashMap behind a read-write lock. Useful for
//! tests and single-process deployments where persistence across
//! restarts is not required. Unlike a plain map, entries carry versions
//! for compare-and-set writes and honor per-entry TTLs.

use crate::{StorageError, StorageInterface, Versioned, WriteExpectation};
use async_trait::async_trait;
use orderflow_types::ImplementationRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct MemoryEntry {
	bytes: Vec<u8>,
	version: u64,
	expires_at: Option<Instant>,
}

impl MemoryEntry {
	fn is_expired(&self, now: Instant) -> bool {
		self.expires_at.is_some_and(|at| now >= at)
	}
}

/// In-memory storage implementation.
///
/// Expired entries are treated as absent on read and swept out by
/// [`StorageInterface::cleanup_expired`].
pub struct MemoryStorage {
	store: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

impl MemoryStorage {
	/// Creates a new MemoryStorage instance.
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Versioned, StorageError> {
		let store = self.store.read().await;
		let now = Instant::now();
		match store.get(key) {
			Some(entry) if !entry.is_expired(now) => Ok(Versioned {
				bytes: entry.bytes.clone(),
				version: entry.version,
			}),
			_ => Err(StorageError::NotFound),
		}
	}

	async fn put_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		expect: WriteExpectation,
		ttl: Option<Duration>,
	) -> Result<u64, StorageError> {
		let mut store = self.store.write().await;
		let now = Instant::now();
		// Expired entries count as absent for expectation checks.
		let current = store.get(key).filter(|entry| !entry.is_expired(now));

		match expect {
			WriteExpectation::Any => {}
			WriteExpectation::Absent => {
				if current.is_some() {
					return Err(StorageError::Conflict);
				}
			}
			WriteExpectation::Version(expected) => match current {
				Some(entry) if entry.version == expected => {}
				_ => return Err(StorageError::Conflict),
			},
		}

		let version = current.map(|entry| entry.version + 1).unwrap_or(1);
		store.insert(
			key.to_string(),
			MemoryEntry {
				bytes: value,
				version,
				expires_at: ttl.map(|ttl| now + ttl),
			},
		);
		Ok(version)
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let store = self.store.read().await;
		let now = Instant::now();
		Ok(store.get(key).is_some_and(|entry| !entry.is_expired(now)))
	}

	async fn cleanup_expired(&self) -> Result<usize, StorageError> {
		let mut store = self.store.write().await;
		let now = Instant::now();
		let before = store.len();
		store.retain(|_, entry| !entry.is_expired(now));
		Ok(before - store.len())
	}
}

/// Factory function to create a memory storage backend from configuration.
///
/// Configuration parameters:
/// - None required for memory storage
pub fn create_storage(_config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	Ok(Box::new(MemoryStorage::new()))
}

/// Registry for the memory storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}
