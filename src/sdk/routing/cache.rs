use super::error::RoutingError;
use super::service::DistanceMetric;
use crate::sdk::points::Point;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap, fmt, fs, io::Result as IoResult, path::Path, str::FromStr, sync::Mutex,
};

/// Directed origin/destination key. Road distances are not symmetric
/// (one-way streets), so `(a, b)` and `(b, a)` are cached separately.
/// `scope` names the backend and profile that produced the distance.
#[derive(Serialize, Deserialize, Eq, PartialEq, Hash, Clone, Debug)]
pub struct PairKey {
    pub scope: String,
    pub origin: String,
    pub destination: String,
}

impl PairKey {
    pub fn new(scope: &str, from: &Point, to: &Point) -> Self {
        Self {
            scope: scope.to_string(),
            origin: from.location_key(),
            destination: to.location_key(),
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}::{}", self.scope, self.origin, self.destination)
    }
}

impl FromStr for PairKey {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scope, pair) = s.rsplit_once('|').ok_or("Invalid PairKey format")?;
        let parts: Vec<&str> = pair.split("::").collect();
        if parts.len() == 2 {
            Ok(PairKey {
                scope: scope.to_string(),
                origin: parts[0].to_string(),
                destination: parts[1].to_string(),
            })
        } else {
            Err("Invalid PairKey format")
        }
    }
}

// --- Serde Helper for Complex Key ---
mod pair_map {
    use super::PairKey;
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};
    use std::{collections::HashMap, str::FromStr};

    pub fn serialize<S: Serializer>(
        map: &HashMap<PairKey, f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let string_map: HashMap<String, f64> =
            map.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        string_map.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<PairKey, f64>, D::Error> {
        let string_map = HashMap::<String, f64>::deserialize(deserializer)?;
        string_map
            .into_iter()
            .map(|(k, v)| Ok((PairKey::from_str(&k).map_err(Error::custom)?, v)))
            .collect()
    }
}

/// Road distances in meters, persisted between runs as JSON.
#[derive(Serialize, Deserialize, Default, Debug)]
pub struct DistanceCache {
    #[serde(with = "pair_map")]
    distances: HashMap<PairKey, f64>,
}

impl DistanceCache {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        if path.as_ref().exists() {
            let data = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)
    }

    pub fn get(&self, key: &PairKey) -> Option<f64> {
        self.distances.get(key).copied()
    }

    pub fn insert(&mut self, key: PairKey, distance_m: f64) {
        self.distances.insert(key, distance_m);
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

/// Memoises successful lookups of `inner`. Failures are not cached, so a
/// later run retries them.
///
/// Entries are keyed by the inner metric's `cache_scope`, so one file can
/// hold distances from several backends and profiles.
pub struct CachedMetric<M> {
    inner: M,
    scope: String,
    cache: Mutex<DistanceCache>,
}

impl<M: DistanceMetric> CachedMetric<M> {
    pub fn new(inner: M, cache: DistanceCache) -> Self {
        Self {
            scope: inner.cache_scope(),
            inner,
            cache: Mutex::new(cache),
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .save_to_file(path)
    }

    pub fn cached_pairs(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn lookup(&self, key: &PairKey) -> Option<f64> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).get(key)
    }

    fn store(&self, key: PairKey, distance_m: f64) {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, distance_m);
    }
}

impl<M: DistanceMetric> DistanceMetric for CachedMetric<M> {
    async fn distance_m(&self, from: &Point, to: &Point) -> Result<f64, RoutingError> {
        let key = PairKey::new(&self.scope, from, to);
        if let Some(distance) = self.lookup(&key) {
            log::debug!("[CACHE HIT] {}", key);
            return Ok(distance);
        }

        let distance = self.inner.distance_m(from, to).await?;
        self.store(key, distance);
        Ok(distance)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn cache_scope(&self) -> String {
        self.scope.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    impl DistanceMetric for Counting {
        async fn distance_m(&self, _from: &Point, _to: &Point) -> Result<f64, RoutingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(RoutingError::UnroutablePoint)
            } else {
                Ok(1234.5)
            }
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    /// Same answer for every pair, under a fixed routing profile.
    struct Profiled {
        profile: &'static str,
        distance_m: f64,
    }

    impl DistanceMetric for Profiled {
        async fn distance_m(&self, _from: &Point, _to: &Point) -> Result<f64, RoutingError> {
            Ok(self.distance_m)
        }

        fn name(&self) -> &'static str {
            "profiled"
        }

        fn cache_scope(&self) -> String {
            format!("profiled/{}", self.profile)
        }
    }

    fn temp_cache_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "survey_tour_cache_{}_{}.json",
            tag,
            std::process::id()
        ))
    }

    fn counting(fail: bool) -> Counting {
        Counting {
            calls: AtomicUsize::new(0),
            fail,
        }
    }

    #[test]
    fn test_pair_key_round_trips_through_display() {
        let key = PairKey::new(
            "ors-remote http://[::1]:8080/v2/directions/driving-car",
            &Point::new(10.0, 76.0),
            &Point::new(-9.5, 75.25),
        );
        assert_eq!(
            key.to_string(),
            "ors-remote http://[::1]:8080/v2/directions/driving-car|10.000000,76.000000::-9.500000,75.250000"
        );
        assert_eq!(PairKey::from_str(&key.to_string()).unwrap(), key);
        assert!(PairKey::from_str("no-separator").is_err());
        assert!(PairKey::from_str("10.0,76.0::9.5,75.2").is_err());
    }

    #[tokio::test]
    async fn test_second_lookup_hits_cache() {
        let metric = CachedMetric::new(counting(false), DistanceCache::default());
        let a = Point::new(10.0, 76.0);
        let b = Point::new(10.05, 76.05);

        assert_eq!(metric.distance_m(&a, &b).await.unwrap(), 1234.5);
        assert_eq!(metric.distance_m(&a, &b).await.unwrap(), 1234.5);
        assert_eq!(metric.inner.calls.load(Ordering::SeqCst), 1);

        // reverse direction is its own entry
        metric.distance_m(&b, &a).await.unwrap();
        assert_eq!(metric.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(metric.cached_pairs(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let metric = CachedMetric::new(counting(true), DistanceCache::default());
        let a = Point::new(10.0, 76.0);
        let b = Point::new(10.05, 76.05);

        assert!(metric.distance_m(&a, &b).await.is_err());
        assert!(metric.distance_m(&a, &b).await.is_err());
        assert_eq!(metric.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(metric.cached_pairs(), 0);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_cache_path("save_load");
        let mut cache = DistanceCache::default();
        cache.insert(
            PairKey::new("counting", &Point::new(10.0, 76.0), &Point::new(10.05, 76.05)),
            8123.0,
        );
        cache.save_to_file(&path).unwrap();

        let loaded = DistanceCache::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), 1);
        assert_eq!(
            loaded.get(&PairKey::new(
                "counting",
                &Point::new(10.0, 76.0),
                &Point::new(10.05, 76.05)
            )),
            Some(8123.0)
        );
    }

    #[tokio::test]
    async fn test_reloaded_cache_is_not_shared_across_profiles() {
        let path = temp_cache_path("profiles");
        let a = Point::new(10.0, 76.0);
        let b = Point::new(10.05, 76.05);

        let driving = CachedMetric::new(
            Profiled {
                profile: "driving-car",
                distance_m: 9000.0,
            },
            DistanceCache::default(),
        );
        assert_eq!(driving.distance_m(&a, &b).await.unwrap(), 9000.0);
        driving.save_to_file(&path).unwrap();

        let walking = CachedMetric::new(
            Profiled {
                profile: "foot-walking",
                distance_m: 4000.0,
            },
            DistanceCache::load_from_file(&path).unwrap(),
        );
        assert_eq!(walking.distance_m(&a, &b).await.unwrap(), 4000.0);
        walking.save_to_file(&path).unwrap();

        // both profiles now live side by side in the same file
        let driving_again = CachedMetric::new(
            Profiled {
                profile: "driving-car",
                distance_m: 1.0,
            },
            DistanceCache::load_from_file(&path).unwrap(),
        );
        std::fs::remove_file(&path).ok();
        assert_eq!(driving_again.cached_pairs(), 2);
        assert_eq!(driving_again.distance_m(&a, &b).await.unwrap(), 9000.0);
    }

    #[tokio::test]
    async fn test_nearby_points_share_an_entry() {
        let metric = CachedMetric::new(counting(false), DistanceCache::default());
        let a = Point::new(10.0, 76.0);
        let b = Point::new(10.05, 76.05);
        let b_jitter = Point::new(10.05 + 1e-9, 76.05);

        metric.distance_m(&a, &b).await.unwrap();
        metric.distance_m(&a, &b_jitter).await.unwrap();
        assert_eq!(metric.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_file_gives_empty_cache() {
        let cache = DistanceCache::load_from_file("/nonexistent/survey_tour_cache.json").unwrap();
        assert!(cache.is_empty());
    }
}
