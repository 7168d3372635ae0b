use crate::world::grid::CollisionGrid;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct CachedGrid {
    grid: Arc<CollisionGrid>,
    access_count: u64,
}

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub loads: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64) / (total as f64)
        }
    }
}

/// Grid cache with LRU eviction, keyed by grid file name. Map definitions
/// sharing one grid file share one parsed grid.
pub struct GridCache {
    cache: LruCache<String, CachedGrid>,
    backing_dir: PathBuf,
    stats: CacheStats,
}

impl GridCache {
    pub fn new(capacity: usize, backing_dir: PathBuf) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        GridCache {
            cache: LruCache::new(capacity),
            backing_dir,
            stats: CacheStats::default(),
        }
    }

    /// Get a grid, loading and parsing its file if not cached.
    pub fn get_grid(&mut self, file_name: &str) -> Result<Arc<CollisionGrid>, String> {
        if let Some(cached) = self.cache.get_mut(file_name) {
            cached.access_count += 1;
            self.stats.hits += 1;
            return Ok(Arc::clone(&cached.grid));
        }

        self.stats.misses += 1;
        let path = self.backing_dir.join(file_name);
        let grid = Arc::new(CollisionGrid::load(&path)?);
        self.stats.loads += 1;

        let cached = CachedGrid {
            grid: Arc::clone(&grid),
            access_count: 0,
        };
        if let Some((evicted_key, _)) = self.cache.push(file_name.to_string(), cached) {
            if evicted_key != file_name {
                self.stats.evictions += 1;
            }
        }
        Ok(grid)
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn write_test_grid(path: &Path) {
        fs::write(path, "3 2\n...\n.#.\n").unwrap();
    }

    fn temp_cache(tag: &str, capacity: usize) -> GridCache {
        let temp_dir =
            std::env::temp_dir().join(format!("eldermoor-grids-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&temp_dir).unwrap();
        write_test_grid(&temp_dir.join("meadow.map"));
        GridCache::new(capacity, temp_dir)
    }

    #[test]
    fn first_access_misses_then_hits() {
        let mut cache = temp_cache("hit", 4);

        let first = cache.get_grid("meadow.map").unwrap();
        let second = cache.get_grid("meadow.map").unwrap();

        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().loads, 1);
        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_file_is_an_error_not_a_cache_entry() {
        let mut cache = temp_cache("missing", 4);

        let err = cache.get_grid("nowhere.map").unwrap_err();
        assert!(err.contains("grid read failed"));
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().loads, 0);
    }

    #[test]
    fn eviction_counts_when_capacity_overflows() {
        let temp_dir =
            std::env::temp_dir().join(format!("eldermoor-grids-evict-{}", std::process::id()));
        fs::create_dir_all(&temp_dir).unwrap();
        for i in 0..5 {
            write_test_grid(&temp_dir.join(format!("grid-{}.map", i)));
        }

        let mut cache = GridCache::new(3, temp_dir);
        for i in 0..5 {
            cache.get_grid(&format!("grid-{}.map", i)).unwrap();
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn hit_rate_calculation() {
        let mut cache = temp_cache("rate", 4);

        cache.get_grid("meadow.map").unwrap();
        for _ in 0..3 {
            cache.get_grid("meadow.map").unwrap();
        }

        let rate = cache.stats().hit_rate();
        assert!((rate - 0.75).abs() < 1e-9);
    }

    #[test]
    fn reset_and_clear() {
        let mut cache = temp_cache("reset", 4);
        cache.get_grid("meadow.map").unwrap();
        cache.get_grid("meadow.map").unwrap();

        cache.reset_stats();
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().misses, 0);

        cache.clear();
        assert!(cache.is_empty());
    }
}
