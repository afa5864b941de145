//! File-based storage backend implementation.
//!
//! Stores each entry as a binary file with a fixed-size header carrying
//! the expiration timestamp and the record version used for
//! compare-and-set writes. Writes go through a temp-file-plus-rename so
//! a crash never leaves a half-written record behind.

use crate::{StorageError, StorageInterface, Versioned, WriteExpectation};
use async_trait::async_trait;
use orderflow_types::{ImplementationRegistry, StorageKey};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::sync::Mutex;

#[allow(clippy::doc_nested_refdefs)]
/// Fixed-size file header for TTL and version support.
///
/// Binary layout (64 bytes total):
/// - [0-3]: Magic bytes "OFLW"
/// - [4-5]: Format version (u16, little-endian)
/// - [6-13]: Expiration timestamp (u64, little-endian, Unix seconds, 0 = never)
/// - [14-21]: Record version (u64, little-endian, starts at 1)
/// - [22-63]: Reserved/padding for future use
#[derive(Debug, Clone)]
struct FileHeader {
	magic: [u8; 4],
	format_version: u16,
	expires_at: u64,
	record_version: u64,
	padding: [u8; 42],
}

impl FileHeader {
	const MAGIC: &'static [u8; 4] = b"OFLW";
	const FORMAT_VERSION: u16 = 1;
	const SIZE: usize = 64;

	/// Creates a new header with the given TTL and record version.
	fn new(ttl: Duration, record_version: u64) -> Self {
		let expires_at = if ttl.is_zero() {
			0 // Permanent storage
		} else {
			SystemTime::now()
				.duration_since(UNIX_EPOCH)
				.unwrap()
				.as_secs()
				.saturating_add(ttl.as_secs())
		};

		Self {
			magic: *Self::MAGIC,
			format_version: Self::FORMAT_VERSION,
			expires_at,
			record_version,
			padding: [0; 42],
		}
	}

	/// Serializes the header to bytes.
	fn serialize(&self) -> [u8; Self::SIZE] {
		let mut bytes = [0u8; Self::SIZE];
		bytes[0..4].copy_from_slice(&self.magic);
		bytes[4..6].copy_from_slice(&self.format_version.to_le_bytes());
		bytes[6..14].copy_from_slice(&self.expires_at.to_le_bytes());
		bytes[14..22].copy_from_slice(&self.record_version.to_le_bytes());
		bytes[22..64].copy_from_slice(&self.padding);
		bytes
	}

	/// Deserializes a header from bytes.
	fn deserialize(bytes: &[u8]) -> Result<Self, StorageError> {
		if bytes.len() < Self::SIZE {
			return Err(StorageError::Backend("File too small for header".into()));
		}

		let mut magic = [0u8; 4];
		magic.copy_from_slice(&bytes[0..4]);

		if magic != *Self::MAGIC {
			return Err(StorageError::Backend("Unrecognized file format".into()));
		}

		let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
		if format_version > Self::FORMAT_VERSION {
			return Err(StorageError::Backend(format!(
				"Unsupported file version: {}",
				format_version
			)));
		}

		let mut expires_bytes = [0u8; 8];
		expires_bytes.copy_from_slice(&bytes[6..14]);
		let expires_at = u64::from_le_bytes(expires_bytes);

		let mut version_bytes = [0u8; 8];
		version_bytes.copy_from_slice(&bytes[14..22]);
		let record_version = u64::from_le_bytes(version_bytes);

		let mut padding = [0u8; 42];
		padding.copy_from_slice(&bytes[22..64]);

		Ok(Self {
			magic,
			format_version,
			expires_at,
			record_version,
			padding,
		})
	}

	/// Checks if the data has expired.
	fn is_expired(&self) -> bool {
		if self.expires_at == 0 {
			return false; // Permanent storage
		}

		let now = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.unwrap()
			.as_secs();

		now >= self.expires_at
	}
}

/// TTL configuration for different storage namespaces.
#[derive(Debug, Clone)]
pub struct TtlConfig {
	ttls: HashMap<StorageKey, Duration>,
}

impl TtlConfig {
	/// Creates TTL config from TOML configuration.
	fn from_config(config: &toml::Value) -> Result<Self, StorageError> {
		let mut ttls = HashMap::new();

		if let Some(table) = config.as_table() {
			for storage_key in StorageKey::all() {
				let config_key = format!("ttl_{}", storage_key.as_str());
				match table.get(&config_key) {
					None => {}
					Some(value) => {
						let seconds = value.as_integer().filter(|v| *v >= 0).ok_or_else(|| {
							StorageError::Configuration(format!(
								"{} must be a non-negative integer",
								config_key
							))
						})?;
						ttls.insert(*storage_key, Duration::from_secs(seconds as u64));
					}
				}
			}
		}

		Ok(Self { ttls })
	}

	/// Gets the TTL for a specific storage namespace.
	fn get_ttl(&self, storage_key: StorageKey) -> Duration {
		self.ttls
			.get(&storage_key)
			.copied()
			.unwrap_or(Duration::ZERO)
	}
}

/// File-based storage implementation.
///
/// Data is stored as binary files under a base directory, one file per
/// key. Record versions live in the file header, so compare-and-set
/// writes survive process restarts. Writers serialize through a single
/// mutex; the read-check-rename cycle must not interleave.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
	/// TTL configuration per storage namespace.
	ttl_config: TtlConfig,
	/// Serializes conditional writes within this process.
	write_lock: Mutex<()>,
}

impl FileStorage {
	/// Creates a new FileStorage instance with the specified base path
	/// and TTL config.
	pub fn new(base_path: PathBuf, ttl_config: TtlConfig) -> Self {
		Self {
			base_path,
			ttl_config,
			write_lock: Mutex::new(()),
		}
	}

	/// Converts a storage key to a filesystem-safe file path.
	fn get_file_path(&self, key: &str) -> PathBuf {
		// Sanitize key to be filesystem-safe
		let safe_key = key.replace(['/', ':'], "_");
		self.base_path.join(format!("{}.bin", safe_key))
	}

	/// Gets the TTL for a given key based on its namespace.
	fn get_ttl_for_key(&self, key: &str) -> Duration {
		// Parse namespace from key (e.g., "orders:123" -> "orders")
		let namespace = key.split(':').next().unwrap_or("");

		namespace
			.parse::<StorageKey>()
			.map(|sk| self.ttl_config.get_ttl(sk))
			.unwrap_or(Duration::ZERO)
	}

	/// Reads the header of the file at `path`, treating missing and
	/// expired files as absent.
	async fn read_live_header(&self, path: &std::path::Path) -> Result<Option<FileHeader>, StorageError> {
		let data = match fs::read(path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let header = FileHeader::deserialize(&data)?;
		if header.is_expired() {
			return Ok(None);
		}
		Ok(Some(header))
	}

	/// Removes all expired files from storage.
	async fn cleanup_expired_files(&self) -> Result<usize, StorageError> {
		let mut removed = 0;
		let mut entries = fs::read_dir(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() == Some(std::ffi::OsStr::new("bin")) {
				match fs::read(&path).await {
					Ok(data) => {
						if data.len() >= FileHeader::SIZE {
							if let Ok(header) = FileHeader::deserialize(&data[..FileHeader::SIZE]) {
								if header.is_expired() {
									if let Err(e) = fs::remove_file(&path).await {
										tracing::warn!(
											"Failed to remove expired file {:?}: {}",
											path,
											e
										);
									} else {
										removed += 1;
									}
								}
							}
						} else {
							tracing::debug!(
								"Skipping file {:?}: too small ({} bytes, expected at least {})",
								path,
								data.len(),
								FileHeader::SIZE
							);
						}
					}
					Err(e) => {
						tracing::debug!("Skipping file {:?}: could not be read: {}", path, e);
					}
				}
			}
		}
		Ok(removed)
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Versioned, StorageError> {
		let path = self.get_file_path(key);

		let data = match fs::read(&path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(StorageError::NotFound)
			}
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let header = FileHeader::deserialize(&data)?;
		if header.is_expired() {
			return Err(StorageError::NotFound);
		}

		let bytes = if data.len() > FileHeader::SIZE {
			data[FileHeader::SIZE..].to_vec()
		} else {
			Vec::new()
		};

		Ok(Versioned {
			bytes,
			version: header.record_version,
		})
	}

	async fn put_bytes(
		&self,
		key: &str,
		value: Vec<u8>,
		expect: WriteExpectation,
		ttl: Option<Duration>,
	) -> Result<u64, StorageError> {
		let path = self.get_file_path(key);

		// The read-check-rename cycle must not interleave with another
		// writer, otherwise two writers could both pass the version
		// check.
		let _guard = self.write_lock.lock().await;

		let current_version = self
			.read_live_header(&path)
			.await?
			.map(|header| header.record_version);

		match expect {
			WriteExpectation::Any => {}
			WriteExpectation::Absent => {
				if current_version.is_some() {
					return Err(StorageError::Conflict);
				}
			}
			WriteExpectation::Version(expected) => {
				if current_version != Some(expected) {
					return Err(StorageError::Conflict);
				}
			}
		}

		// Create parent directory if it doesn't exist
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		// Determine TTL: use provided TTL, or get from config based on key
		let ttl = ttl.unwrap_or_else(|| self.get_ttl_for_key(key));

		let record_version = current_version.map(|v| v + 1).unwrap_or(1);
		let header = FileHeader::new(ttl, record_version);
		let header_bytes = header.serialize();

		let mut file_data = Vec::with_capacity(FileHeader::SIZE + value.len());
		file_data.extend_from_slice(&header_bytes);
		file_data.extend_from_slice(&value);

		// Write atomically by writing to temp file then renaming
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, file_data)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(record_version)
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.get_file_path(key);
		Ok(self.read_live_header(&path).await?.is_some())
	}

	async fn cleanup_expired(&self) -> Result<usize, StorageError> {
		self.cleanup_expired_files().await
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for file storage (default: "./data/orderflow")
/// - `ttl_orders`: TTL in seconds for orders (default: 0, permanent)
/// - `ttl_order_numbers`: TTL in seconds for the number index (default: 0, permanent)
/// - `ttl_shipper_locations`: TTL in seconds for location pings (default: 0)
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let storage_path = match config.get("storage_path") {
		None => "./data/orderflow".to_string(),
		Some(value) => value
			.as_str()
			.ok_or_else(|| StorageError::Configuration("storage_path must be a string".into()))?
			.to_string(),
	};

	let ttl_config = TtlConfig::from_config(config)?;

	Ok(Box::new(FileStorage::new(
		PathBuf::from(storage_path),
		ttl_config,
	)))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	fn storage_at(path: &std::path::Path) -> FileStorage {
		FileStorage::new(
			path.to_path_buf(),
			TtlConfig {
				ttls: HashMap::new(),
			},
		)
	}

	#[test]
	fn header_round_trip() {
		let header = FileHeader::new(Duration::from_secs(300), 7);
		let bytes = header.serialize();
		let parsed = FileHeader::deserialize(&bytes).unwrap();
		assert_eq!(parsed.record_version, 7);
		assert_eq!(parsed.expires_at, header.expires_at);
		assert!(!parsed.is_expired());
	}

	#[test]
	fn header_expiry() {
		let mut header = FileHeader::new(Duration::ZERO, 1);
		assert!(!header.is_expired());
		header.expires_at = 1; // long past
		assert!(header.is_expired());
	}

	#[test]
	fn rejects_foreign_files() {
		let err = FileHeader::deserialize(&[0u8; 64]).unwrap_err();
		assert!(matches!(err, StorageError::Backend(_)));
		let err = FileHeader::deserialize(&[0u8; 10]).unwrap_err();
		assert!(matches!(err, StorageError::Backend(_)));
	}

	#[tokio::test]
	async fn versions_survive_restart() {
		let dir = tempdir().unwrap();

		{
			let storage = storage_at(dir.path());
			storage
				.put_bytes("orders:1", b"a".to_vec(), WriteExpectation::Absent, None)
				.await
				.unwrap();
			let v2 = storage
				.put_bytes("orders:1", b"b".to_vec(), WriteExpectation::Version(1), None)
				.await
				.unwrap();
			assert_eq!(v2, 2);
		}

		// A fresh instance over the same directory sees the version.
		let storage = storage_at(dir.path());
		let loaded = storage.get_bytes("orders:1").await.unwrap();
		assert_eq!(loaded.bytes, b"b");
		assert_eq!(loaded.version, 2);

		let err = storage
			.put_bytes("orders:1", b"c".to_vec(), WriteExpectation::Version(1), None)
			.await
			.unwrap_err();
		assert!(matches!(err, StorageError::Conflict));
	}

	#[tokio::test]
	async fn absent_expectation_claims_key_once() {
		let dir = tempdir().unwrap();
		let storage = storage_at(dir.path());

		storage
			.put_bytes("order_numbers:FD-1", b"id".to_vec(), WriteExpectation::Absent, None)
			.await
			.unwrap();
		let err = storage
			.put_bytes("order_numbers:FD-1", b"id2".to_vec(), WriteExpectation::Absent, None)
			.await
			.unwrap_err();
		assert!(matches!(err, StorageError::Conflict));
	}

	#[tokio::test]
	async fn cleanup_removes_expired_files() {
		let dir = tempdir().unwrap();
		let storage = storage_at(dir.path());

		storage
			.put_bytes("orders:live", b"x".to_vec(), WriteExpectation::Any, None)
			.await
			.unwrap();

		// Craft an already-expired file directly.
		let mut header = FileHeader::new(Duration::ZERO, 1);
		header.expires_at = 1;
		let mut data = header.serialize().to_vec();
		data.extend_from_slice(b"stale");
		tokio::fs::write(dir.path().join("shipper_locations_s1.bin"), data)
			.await
			.unwrap();

		assert_eq!(storage.cleanup_expired().await.unwrap(), 1);
		assert!(storage.exists("orders:live").await.unwrap());
		assert!(!storage.exists("shipper_locations:s1").await.unwrap());
	}

	#[tokio::test]
	async fn factory_validates_config() {
		let config: toml::Value = toml::from_str(
			r#"
			storage_path = "./data/test"
			ttl_shipper_locations = 180
			"#,
		)
		.unwrap();
		assert!(create_storage(&config).is_ok());

		let config: toml::Value = toml::from_str("ttl_orders = -5").unwrap();
		// `unwrap_err` would need `Box<dyn StorageInterface>: Debug`.
		let Err(err) = create_storage(&config) else {
			panic!("expected a negative ttl to fail")
		};
		assert!(matches!(err, StorageError::Configuration(_)));

		let config: toml::Value = toml::from_str("storage_path = 12").unwrap();
		let Err(err) = create_storage(&config) else {
			panic!("expected a non-string storage_path to fail")
		};
		assert!(matches!(err, StorageError::Configuration(_)));
	}
}
