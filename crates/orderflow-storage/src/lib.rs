//! Storage module for the orderflow system.
//!
//! Provides the key-value persistence layer order records live in. All
//! writes carry a [`WriteExpectation`] so callers can make compare-and-set
//! updates: the engine reads a record at some version, applies a change,
//! and commits only if nobody else wrote in between. Backends are
//! pluggable; in-memory and file-based implementations ship with the
//! workspace.

use async_trait::async_trait;
use orderflow_types::{ImplementationRegistry, StorageKey};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs when a write expectation does not hold, e.g.
	/// the record changed since it was read or already exists.
	#[error("Version conflict")]
	Conflict,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// A stored value together with the version it was read at.
///
/// Versions start at 1 on first write and increase by one on every
/// subsequent write to the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
	pub bytes: Vec<u8>,
	pub version: u64,
}

/// Precondition a write must satisfy to commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteExpectation {
	/// Unconditional write, creates or overwrites.
	Any,
	/// The key must not exist yet. Used to claim unique ids.
	Absent,
	/// The key must currently hold exactly this version. Used for
	/// read-modify-write cycles such as lifecycle transitions.
	Version(u64),
}

/// Trait defining the low-level interface for storage backends.
///
/// Backends provide versioned key-value operations with optional TTL
/// support. Every write is conditional on a [`WriteExpectation`]; a
/// failed expectation surfaces as [`StorageError::Conflict`] and must
/// leave the stored value untouched.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves the value and current version for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Versioned, StorageError>;

	/// Writes raw bytes if the expectation holds, with optional
	/// time-to-live. Returns the version the write committed at.
	async fn put_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		expect: WriteExpectation,
		ttl: Option<Duration>,
	) -> Result<u64, StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists (and has not expired).
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Removes expired entries from storage (optional operation).
	/// Returns the number of entries removed.
	/// Implementations without TTL support can return Ok(0).
	async fn cleanup_expired(&self) -> Result<usize, StorageError> {
		Ok(0)
	}
}

/// Type alias for storage factory functions.
///
/// This is the function signature every storage implementation provides
/// to create instances of its storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage
/// implementations, used by the binary to build its factory map.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level storage service that provides typed operations.
///
/// Wraps a low-level backend and adds JSON serialization plus the
/// namespace:id key scheme. The conditional-write variants surface the
/// backend's versioning so callers can detect concurrent updates.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn make_key(namespace: StorageKey, id: &str) -> String {
		format!("{}:{}", namespace, id)
	}

	/// Retrieves and deserializes a value, returning it with the
	/// version it was read at.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: StorageKey,
		id: &str,
	) -> Result<(T, u64), StorageError> {
		let key = Self::make_key(namespace, id);
		let versioned = self.backend.get_bytes(&key).await?;
		let data = serde_json::from_slice(&versioned.bytes)
			.map_err(|e| StorageError::Serialization(e.to_string()))?;
		Ok((data, versioned.version))
	}

	/// Stores a serializable value unconditionally, without TTL.
	pub async fn store<T: Serialize>(
		&self,
		namespace: StorageKey,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		self.store_with_ttl(namespace, id, data, None).await
	}

	/// Stores a serializable value unconditionally with optional
	/// time-to-live.
	pub async fn store_with_ttl<T: Serialize>(
		&self,
		namespace: StorageKey,
		id: &str,
		data: &T,
		ttl: Option<Duration>,
	) -> Result<(), StorageError> {
		let key = Self::make_key(namespace, id);
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend
			.put_bytes(&key, bytes, WriteExpectation::Any, ttl)
			.await?;
		Ok(())
	}

	/// Creates a new value, failing with [`StorageError::Conflict`] if
	/// the key already exists.
	pub async fn create<T: Serialize>(
		&self,
		namespace: StorageKey,
		id: &str,
		data: &T,
	) -> Result<u64, StorageError> {
		let key = Self::make_key(namespace, id);
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend
			.put_bytes(&key, bytes, WriteExpectation::Absent, None)
			.await
	}

	/// Updates an existing value only if it still holds `version`.
	///
	/// Returns the new version on success. A concurrent writer having
	/// bumped the version surfaces as [`StorageError::Conflict`]; the
	/// caller re-reads and decides whether to retry or give up.
	pub async fn update_checked<T: Serialize>(
		&self,
		namespace: StorageKey,
		id: &str,
		data: &T,
		version: u64,
	) -> Result<u64, StorageError> {
		let key = Self::make_key(namespace, id);
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend
			.put_bytes(&key, bytes, WriteExpectation::Version(version), None)
			.await
	}

	/// Removes a value from storage.
	pub async fn remove(&self, namespace: StorageKey, id: &str) -> Result<(), StorageError> {
		let key = Self::make_key(namespace, id);
		self.backend.delete(&key).await
	}

	/// Checks if a value exists in storage.
	pub async fn exists(&self, namespace: StorageKey, id: &str) -> Result<bool, StorageError> {
		let key = Self::make_key(namespace, id);
		self.backend.exists(&key).await
	}

	/// Removes expired entries from storage.
	///
	/// Returns the number of entries that were removed. This is a no-op
	/// for backends without TTL support.
	pub async fn cleanup_expired(&self) -> Result<usize, StorageError> {
		self.backend.cleanup_expired().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::memory::MemoryStorage;
	use serde::Deserialize;

	#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
	struct Note {
		text: String,
		revision: u32,
	}

	fn service() -> StorageService {
		StorageService::new(Box::new(MemoryStorage::new()))
	}

	#[tokio::test]
	async fn typed_round_trip() {
		let service = service();
		let note = Note {
			text: "hello".into(),
			revision: 1,
		};

		service
			.store(StorageKey::Orders, "n1", &note)
			.await
			.unwrap();
		let (loaded, version): (Note, u64) =
			service.retrieve(StorageKey::Orders, "n1").await.unwrap();
		assert_eq!(loaded, note);
		assert_eq!(version, 1);

		assert!(service.exists(StorageKey::Orders, "n1").await.unwrap());
		service.remove(StorageKey::Orders, "n1").await.unwrap();
		assert!(!service.exists(StorageKey::Orders, "n1").await.unwrap());
	}

	#[tokio::test]
	async fn create_rejects_existing_key() {
		let service = service();
		let note = Note {
			text: "first".into(),
			revision: 1,
		};

		let version = service
			.create(StorageKey::OrderNumbers, "FD-1", &note)
			.await
			.unwrap();
		assert_eq!(version, 1);

		let err = service
			.create(StorageKey::OrderNumbers, "FD-1", &note)
			.await
			.unwrap_err();
		assert!(matches!(err, StorageError::Conflict));
	}

	#[tokio::test]
	async fn update_checked_detects_stale_version() {
		let service = service();
		let mut note = Note {
			text: "v1".into(),
			revision: 1,
		};
		service
			.create(StorageKey::Orders, "n1", &note)
			.await
			.unwrap();

		note.revision = 2;
		let v2 = service
			.update_checked(StorageKey::Orders, "n1", &note, 1)
			.await
			.unwrap();
		assert_eq!(v2, 2);

		// A writer still holding version 1 must lose.
		note.revision = 3;
		let err = service
			.update_checked(StorageKey::Orders, "n1", &note, 1)
			.await
			.unwrap_err();
		assert!(matches!(err, StorageError::Conflict));

		let (current, version): (Note, u64) =
			service.retrieve(StorageKey::Orders, "n1").await.unwrap();
		assert_eq!(current.revision, 2);
		assert_eq!(version, 2);
	}

	#[tokio::test]
	async fn namespaces_do_not_collide() {
		let service = service();
		let note = Note {
			text: "x".into(),
			revision: 1,
		};
		service
			.store(StorageKey::Orders, "same-id", &note)
			.await
			.unwrap();
		let err = service
			.retrieve::<Note>(StorageKey::OrderNumbers, "same-id")
			.await
			.unwrap_err();
		assert!(matches!(err, StorageError::NotFound));
	}
}
