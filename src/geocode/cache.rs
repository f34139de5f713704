//! File-based geocode cache at ~/.address-grouper/geocode_cache.json.
//!
//! TTL: 30 days. Keys are normalized addresses, compared case-insensitively.
//! Only successful lookups are stored.

use super::types::Coordinates;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const CACHE_TTL_MS: i64 = 30 * 24 * 3600 * 1000; // 30 days in ms

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    lat: f64,
    lon: f64,
    timestamp: i64,
}

pub struct GeocodeCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
}

impl GeocodeCache {
    /// Load cache from the default location.
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load cache from a specific path. A missing or corrupt file yields an
    /// empty cache.
    pub fn load_from(path: PathBuf) -> Self {
        let entries = Self::read_file(&path).unwrap_or_default();
        tracing::debug!(path = %path.display(), entries = entries.len(), "geocode cache loaded");
        Self { path, entries }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".address-grouper")
            .join("geocode_cache.json")
    }

    fn read_file(path: &Path) -> Option<HashMap<String, CacheEntry>> {
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Look up an address. Returns None if missing or expired.
    pub fn get(&self, address: &str) -> Option<Coordinates> {
        let entry = self.entries.get(&address.to_lowercase())?;

        let now = chrono::Utc::now().timestamp_millis();
        if now - entry.timestamp > CACHE_TTL_MS {
            return None; // expired
        }
        Some(Coordinates::new(entry.lat, entry.lon))
    }

    /// Store coordinates for an address and persist to disk.
    pub fn put(&mut self, address: &str, coords: Coordinates) {
        let entry = CacheEntry {
            lat: coords.lat,
            lon: coords.lon,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.entries.insert(address.to_lowercase(), entry);
        self.persist();
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    tracing::warn!(path = %self.path.display(), error = %e, "could not persist geocode cache");
                }
            }
            Err(e) => tracing::warn!(error = %e, "could not serialize geocode cache"),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_cache() -> (GeocodeCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        (GeocodeCache::load_from(path), dir)
    }

    #[test]
    fn test_cache_put_get() {
        let (mut cache, _dir) = test_cache();
        cache.put("street main 123", Coordinates::new(42.0, 23.0));

        let result = cache.get("street main 123").unwrap();
        assert!((result.lat - 42.0).abs() < 1e-9);
        assert!((result.lon - 23.0).abs() < 1e-9);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_case_insensitive() {
        let (mut cache, _dir) = test_cache();
        cache.put("Ul. Lenina 5", Coordinates::new(55.75, 37.61));
        assert!(cache.get("ul. lenina 5").is_some());
        assert!(cache.get("UL. LENINA 5").is_some());
    }

    #[test]
    fn test_cache_miss() {
        let (cache, _dir) = test_cache();
        assert!(cache.get("nonexistent").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_persistence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.json");

        {
            let mut cache = GeocodeCache::load_from(path.clone());
            cache.put("road elm 5, sofia 1000", Coordinates::new(42.69, 23.32));
        }

        let reloaded = GeocodeCache::load_from(path);
        let result = reloaded.get("road elm 5, sofia 1000").unwrap();
        assert!((result.lat - 42.69).abs() < 1e-9);
    }

    #[test]
    fn test_expired_entry_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let json = r#"{
            "old address 1": { "lat": 1.0, "lon": 2.0, "timestamp": 0 },
            "new address 2": { "lat": 3.0, "lon": 4.0, "timestamp": 9999999999999 }
        }"#;
        fs::write(&path, json).unwrap();

        let cache = GeocodeCache::load_from(path);
        assert!(cache.get("old address 1").is_none());
        assert!(cache.get("new address 2").is_some());
    }

    #[test]
    fn test_entry_stores_coordinates_and_timestamp_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let mut cache = GeocodeCache::load_from(path.clone());
        cache.put("lane way 1", Coordinates::new(1.5, 2.5));

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let mut keys: Vec<&str> = raw["lane way 1"].as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["lat", "lon", "timestamp"]);

        // older files carrying extra fields still load
        fs::write(
            &path,
            r#"{ "lane way 1": { "lat": 1.5, "lon": 2.5, "timestamp": 9999999999999, "source_name": "geoapify" } }"#,
        )
        .unwrap();
        assert!(GeocodeCache::load_from(path).get("lane way 1").is_some());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(GeocodeCache::load_from(path).is_empty());
    }
}
