//! Geocode resolver — cache first, then Geoapify.
//!
//! Flow:  Cache → Geoapify (unless offline or no API key) → failure

use super::cache::GeocodeCache;
use super::providers::GeoapifyClient;
use super::types::{Coordinates, CoordinateResolver, GeocodeSource, ResolveFailure};

pub struct GeocodeResolver {
    cache: GeocodeCache,
    client: Option<GeoapifyClient>,
    offline: bool,
}

impl GeocodeResolver {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_cache(GeocodeCache::load(), api_key)
    }

    /// Create a resolver with a specific cache (for testing).
    pub fn with_cache(cache: GeocodeCache, api_key: Option<String>) -> Self {
        Self {
            cache,
            client: api_key.filter(|k| !k.is_empty()).map(GeoapifyClient::new),
            offline: false,
        }
    }

    /// Set offline mode — skip network calls.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn is_online(&self) -> bool {
        !self.offline && self.client.is_some()
    }

    /// Resolve an address, reporting where the answer came from.
    pub fn resolve_with_source(
        &mut self,
        address: &str,
    ) -> Result<(Coordinates, GeocodeSource), ResolveFailure> {
        if let Some(coords) = self.cache.get(address) {
            return Ok((coords, GeocodeSource::Cache));
        }

        let client = match (&self.client, self.offline) {
            (Some(client), false) => client,
            _ => return Err(ResolveFailure::Offline(address.to_string())),
        };

        let coords = client.search(address)?;
        self.cache.put(address, coords);
        Ok((coords, GeocodeSource::Geoapify))
    }
}

impl CoordinateResolver for GeocodeResolver {
    fn resolve(&mut self, address: &str) -> Result<Coordinates, ResolveFailure> {
        let (coords, source) = self.resolve_with_source(address)?;
        tracing::debug!(address, %coords, %source, "address resolved");
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn offline_resolver() -> (GeocodeResolver, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let mut resolver = GeocodeResolver::with_cache(GeocodeCache::load_from(path), None);
        resolver.set_offline(true);
        (resolver, dir)
    }

    #[test]
    fn test_resolve_cache_hit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let mut cache = GeocodeCache::load_from(path);
        cache.put("street main 123", Coordinates::new(10.0, 20.0));

        let mut resolver = GeocodeResolver::with_cache(cache, Some("key".into()));
        resolver.set_offline(true);

        let (coords, source) = resolver.resolve_with_source("street main 123").unwrap();
        assert_eq!(source, GeocodeSource::Cache);
        assert_eq!(coords, Coordinates::new(10.0, 20.0));
    }

    #[test]
    fn test_resolve_offline_miss() {
        let (mut resolver, _dir) = offline_resolver();
        assert_eq!(
            resolver.resolve("nonexistent place"),
            Err(ResolveFailure::Offline("nonexistent place".into()))
        );
    }

    #[test]
    fn test_missing_key_means_offline() {
        let dir = TempDir::new().unwrap();
        let cache = GeocodeCache::load_from(dir.path().join("cache.json"));
        let resolver = GeocodeResolver::with_cache(cache, Some(String::new()));
        assert!(!resolver.is_online());
    }
}
