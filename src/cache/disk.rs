//! Disk-backed [`CacheStore`] splitting each entry into a body blob and a JSON
//! metadata file.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	cache::{CacheEntry, CacheFuture, CacheKey, CacheStore, CacheStoreError, key},
};

#[derive(Debug, Serialize, Deserialize)]
struct EntryMetadata {
	headers: BTreeMap<String, String>,
	status_code: u16,
	content_type: String,
	created_at: OffsetDateTime,
	expires_at: OffsetDateTime,
}

/// Persists cache entries under a directory, one `.body` + `.meta` pair per key.
///
/// File names are digests of the cache key, so arbitrary key content never
/// reaches the file system. All trait-level operations are infallible; backend
/// trouble degrades to a miss (`get`) or a `false` result (`put`).
#[derive(Clone, Debug)]
pub struct DiskCache {
	dir: PathBuf,
}
impl DiskCache {
	/// Opens (or creates) a cache directory.
	pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheStoreError> {
		let dir = dir.into();

		fs::create_dir_all(&dir).map_err(|e| CacheStoreError::Backend {
			message: format!("Failed to create cache directory {}: {e}", dir.display()),
		})?;

		Ok(Self { dir })
	}

	fn body_path(&self, key: &CacheKey) -> PathBuf {
		self.dir.join(format!("{}.body", key::digest(key.as_str().as_bytes())))
	}

	fn meta_path(&self, key: &CacheKey) -> PathBuf {
		self.dir.join(format!("{}.meta", key::digest(key.as_str().as_bytes())))
	}

	fn write_entry(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheStoreError> {
		let metadata = EntryMetadata {
			headers: entry.headers.clone(),
			status_code: entry.status_code,
			content_type: entry.content_type.clone(),
			created_at: entry.created_at,
			expires_at: entry.expires_at,
		};
		let serialized = serde_json::to_vec(&metadata).map_err(|e| {
			CacheStoreError::Serialization {
				message: format!("Failed to serialize metadata for {key}: {e}"),
			}
		})?;

		write_atomically(&self.body_path(key), &entry.body)?;
		// Metadata lands last; a reader requires both files.
		write_atomically(&self.meta_path(key), &serialized)?;

		Ok(())
	}

	fn read_entry(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheStoreError> {
		let body_path = self.body_path(key);
		let meta_path = self.meta_path(key);

		if !body_path.exists() || !meta_path.exists() {
			return Ok(None);
		}

		let body = fs::read(&body_path).map_err(|e| CacheStoreError::Backend {
			message: format!("Failed to read {}: {e}", body_path.display()),
		})?;
		let raw_metadata = fs::read(&meta_path).map_err(|e| CacheStoreError::Backend {
			message: format!("Failed to read {}: {e}", meta_path.display()),
		})?;
		let metadata: EntryMetadata =
			serde_json::from_slice(&raw_metadata).map_err(|e| CacheStoreError::Serialization {
				message: format!("Failed to parse {}: {e}", meta_path.display()),
			})?;

		Ok(Some(CacheEntry {
			body,
			headers: metadata.headers,
			status_code: metadata.status_code,
			content_type: metadata.content_type,
			created_at: metadata.created_at,
			expires_at: metadata.expires_at,
		}))
	}

	fn clear_all(&self) -> Result<(), CacheStoreError> {
		let listing = fs::read_dir(&self.dir).map_err(|e| CacheStoreError::Backend {
			message: format!("Failed to list cache directory {}: {e}", self.dir.display()),
		})?;

		for dir_entry in listing.flatten() {
			let _ = fs::remove_file(dir_entry.path());
		}

		Ok(())
	}
}
impl CacheStore for DiskCache {
	fn put(&self, key: &CacheKey, entry: CacheEntry) -> CacheFuture<'_, bool> {
		let key = key.clone();

		Box::pin(async move { self.write_entry(&key, &entry).is_ok() })
	}

	fn get<'a>(&'a self, key: &'a CacheKey) -> CacheFuture<'a, Option<CacheEntry>> {
		Box::pin(async move { self.read_entry(key).ok().flatten() })
	}

	fn clear(&self) -> CacheFuture<'_, ()> {
		Box::pin(async move {
			let _ = self.clear_all();
		})
	}
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), CacheStoreError> {
	let mut tmp_path = path.to_path_buf();

	tmp_path.set_extension("tmp");

	{
		let mut file = File::create(&tmp_path).map_err(|e| CacheStoreError::Backend {
			message: format!("Failed to create {}: {e}", tmp_path.display()),
		})?;

		file.write_all(contents).map_err(|e| CacheStoreError::Backend {
			message: format!("Failed to write {}: {e}", tmp_path.display()),
		})?;
		file.sync_all().map_err(|e| CacheStoreError::Backend {
			message: format!("Failed to sync {}: {e}", tmp_path.display()),
		})?;
	}

	fs::rename(&tmp_path, path).map_err(|e| CacheStoreError::Backend {
		message: format!("Failed to replace {}: {e}", path.display()),
	})
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::{cache::generate_key, transport::RequestTemplate};

	fn temp_dir() -> PathBuf {
		let unique = format!(
			"token_gate_disk_cache_{}_{}",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn build_entry() -> (CacheKey, CacheEntry) {
		let url =
			Url::parse("https://api.example.com/catalog").expect("Fixture URL should parse.");
		let key = generate_key(&RequestTemplate::new(http::Method::GET, url));
		let now = OffsetDateTime::now_utc();
		let entry = CacheEntry {
			body: br#"{"items":[1,2,3]}"#.to_vec(),
			headers: BTreeMap::from([("Content-Type".to_owned(), "application/json".to_owned())]),
			status_code: 200,
			content_type: "application/json".into(),
			created_at: now,
			expires_at: now + Duration::minutes(5),
		};

		(key, entry)
	}

	#[test]
	fn save_and_reload_round_trip() {
		let dir = temp_dir();
		let cache = DiskCache::open(&dir).expect("Failed to open disk cache directory.");
		let (key, entry) = build_entry();
		let rt = Runtime::new().expect("Failed to build Tokio runtime for disk cache test.");

		assert!(rt.block_on(cache.put(&key, entry.clone())));

		let reopened = DiskCache::open(&dir).expect("Failed to reopen disk cache directory.");
		let fetched = rt
			.block_on(reopened.get(&key))
			.expect("Disk cache lost the entry after reopening.");

		assert_eq!(fetched, entry);

		rt.block_on(cache.clear());

		assert!(rt.block_on(cache.get(&key)).is_none());

		fs::remove_dir_all(&dir).unwrap_or_else(|e| {
			panic!("Failed to remove temporary cache directory {}: {e}", dir.display())
		});
	}

	#[test]
	fn corrupt_metadata_reads_as_a_miss() {
		let dir = temp_dir();
		let cache = DiskCache::open(&dir).expect("Failed to open disk cache directory.");
		let (key, entry) = build_entry();
		let rt = Runtime::new().expect("Failed to build Tokio runtime for disk cache test.");

		assert!(rt.block_on(cache.put(&key, entry)));

		fs::write(cache.meta_path(&key), b"not json")
			.expect("Overwriting metadata fixture should succeed.");

		assert!(rt.block_on(cache.get(&key)).is_none());

		fs::remove_dir_all(&dir).unwrap_or_else(|e| {
			panic!("Failed to remove temporary cache directory {}: {e}", dir.display())
		});
	}
}
