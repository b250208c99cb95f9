use crate::error::{GoesDlError, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Source of the current time for expiry checks.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// How long a cached directory listing stays valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheLifetime {
    /// Nothing is ever stored; every lookup is a miss.
    Disabled,
    Expires(Duration),
    Forever,
}

impl CacheLifetime {
    /// Infinite seconds never expire, zero or fewer disable the cache.
    pub fn from_secs(secs: f64) -> Self {
        if secs.is_nan() || secs <= 0.0 {
            CacheLifetime::Disabled
        } else if secs.is_infinite() || secs >= i64::MAX as f64 / 1_000.0 {
            CacheLifetime::Forever
        } else {
            CacheLifetime::Expires(Duration::milliseconds((secs * 1_000.0) as i64))
        }
    }

    pub fn is_enabled(self) -> bool {
        self != CacheLifetime::Disabled
    }
}

impl Default for CacheLifetime {
    fn default() -> Self {
        CacheLifetime::Forever
    }
}

/// One cached directory: its files, in listing order, and when they were listed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryListing {
    files: Vec<String>,
    created_at: DateTime<Utc>,
}

impl DirectoryListing {
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_expired(&self, lifetime: CacheLifetime, now: DateTime<Utc>) -> bool {
        match lifetime {
            CacheLifetime::Disabled => true,
            // An expiry past the end of representable time never comes.
            CacheLifetime::Expires(life) => self
                .created_at
                .checked_add_signed(life)
                .map_or(false, |expires| now > expires),
            CacheLifetime::Forever => false,
        }
    }
}

/**
 * Time-expiring memo of directory listings, keyed by directory path relative to a datasource's
 * base URL.
 *
 * Entries are write-once: a path can only be stored again after it expired or was invalidated.
 */
pub struct DirectoryCache {
    lifetime: CacheLifetime,
    clock: Box<dyn Clock>,
    entries: HashMap<String, DirectoryListing>,
}

impl DirectoryCache {
    pub fn new(lifetime: CacheLifetime) -> Self {
        Self::with_clock(lifetime, SystemClock)
    }

    pub fn with_clock<C>(lifetime: CacheLifetime, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        Self {
            lifetime,
            clock: Box::new(clock),
            entries: HashMap::new(),
        }
    }

    pub fn lifetime(&self) -> CacheLifetime {
        self.lifetime
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The listing for `path`, or `None` if absent or expired. Expired entries are evicted.
    pub fn get(&mut self, path: &str) -> Option<&DirectoryListing> {
        self.evict_if_expired(path);
        self.entries.get(path)
    }

    pub fn has(&mut self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Store the listing of `path`. Fails if a live entry already exists. With caching disabled
    /// nothing is stored.
    pub fn put(&mut self, path: &str, files: Vec<String>) -> Result<()> {
        if !self.lifetime.is_enabled() {
            return Ok(());
        }

        if self.has(path) {
            return Err(GoesDlError::cache(format!(
                "Directory '{}' is already cached",
                path
            )));
        }

        let listing = DirectoryListing {
            files,
            created_at: self.clock.now(),
        };
        self.entries.insert(path.to_owned(), listing);

        Ok(())
    }

    /// Remove the entry for `path`, failing if there is none. `None` clears everything.
    pub fn invalidate(&mut self, path: Option<&str>) -> Result<()> {
        match path {
            Some(path) => self.entries.remove(path).map(|_| ()).ok_or_else(|| {
                GoesDlError::cache(format!("Directory '{}' is not cached", path))
            }),
            None => {
                self.entries.clear();
                Ok(())
            }
        }
    }

    /// Purge expired entries, or all of them when `drop_all` is set.
    pub fn sweep(&mut self, drop_all: bool) {
        if drop_all {
            self.entries.clear();
            return;
        }

        let now = self.clock.now();
        let lifetime = self.lifetime;
        self.entries
            .retain(|_, listing| !listing.is_expired(lifetime, now));
    }

    fn evict_if_expired(&mut self, path: &str) {
        let now = self.clock.now();
        let expired = self
            .entries
            .get(path)
            .map(|listing| listing.is_expired(self.lifetime, now))
            .unwrap_or(false);

        if expired {
            log::debug!("Cached listing of '{}' expired", path);
            self.entries.remove(path);
        }
    }
}

impl Default for DirectoryCache {
    fn default() -> Self {
        Self::new(CacheLifetime::default())
    }
}

impl std::fmt::Debug for DirectoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryCache")
            .field("lifetime", &self.lifetime)
            .field("entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::{cell::Cell, rc::Rc};

    /// A clock the test moves by hand.
    #[derive(Clone)]
    pub(crate) struct ManualClock(Rc<Cell<DateTime<Utc>>>);

    impl ManualClock {
        pub(crate) fn new() -> Self {
            ManualClock(Rc::new(Cell::new(
                Utc.with_ymd_and_hms(2020, 8, 23, 14, 0, 0).unwrap(),
            )))
        }

        pub(crate) fn advance(&self, secs: i64) {
            self.0.set(self.0.get() + Duration::seconds(secs));
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            self.0.get()
        }
    }

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn lifetime_from_seconds() {
        assert_eq!(CacheLifetime::from_secs(f64::INFINITY), CacheLifetime::Forever);
        assert_eq!(CacheLifetime::from_secs(0.0), CacheLifetime::Disabled);
        assert_eq!(CacheLifetime::from_secs(-5.0), CacheLifetime::Disabled);
        assert_eq!(
            CacheLifetime::from_secs(1.5),
            CacheLifetime::Expires(Duration::milliseconds(1_500))
        );
    }

    #[test]
    fn put_then_get_until_expiry() {
        let clock = ManualClock::new();
        let mut cache =
            DirectoryCache::with_clock(CacheLifetime::Expires(Duration::seconds(60)), clock.clone());

        cache.put("2020/", files(&["2020/a.nc", "2020/b.nc"])).unwrap();
        assert_eq!(
            cache.get("2020/").map(|l| l.files().to_vec()),
            Some(files(&["2020/a.nc", "2020/b.nc"]))
        );

        clock.advance(60);
        assert!(cache.has("2020/"));

        clock.advance(1);
        assert!(cache.get("2020/").is_none());
        assert!(!cache.has("2020/"));
        assert!(cache.is_empty());
    }

    #[test]
    fn huge_lifetime_never_expires() {
        let clock = ManualClock::new();
        let mut cache = DirectoryCache::with_clock(CacheLifetime::from_secs(1e13), clock.clone());
        assert!(matches!(cache.lifetime(), CacheLifetime::Expires(_)));

        cache.put("2020/", files(&["2020/a.nc"])).unwrap();
        clock.advance(86_400 * 365);
        assert_eq!(cache.get("2020/").unwrap().files(), ["2020/a.nc"]);

        cache.sweep(false);
        assert!(cache.has("2020/"));
        assert!(cache.put("2020/", vec![]).is_err());

        let mut cache = DirectoryCache::with_clock(
            CacheLifetime::Expires(Duration::max_value()),
            ManualClock::new(),
        );
        cache.put("2020/", vec![]).unwrap();
        cache.sweep(false);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn duplicate_put_is_rejected() {
        let mut cache = DirectoryCache::with_clock(CacheLifetime::Forever, ManualClock::new());

        cache.put("2020/", vec![]).unwrap();
        let err = cache.put("2020/", vec![]).unwrap_err();
        assert!(matches!(err, GoesDlError::Cache(_)));
        assert_eq!(err.to_string(), "Directory '2020/' is already cached");
    }

    #[test]
    fn expired_entry_can_be_stored_again() {
        let clock = ManualClock::new();
        let mut cache =
            DirectoryCache::with_clock(CacheLifetime::Expires(Duration::seconds(10)), clock.clone());

        cache.put("2020/", files(&["2020/a.nc"])).unwrap();
        clock.advance(11);
        cache.put("2020/", files(&["2020/b.nc"])).unwrap();

        assert_eq!(cache.get("2020/").unwrap().files(), ["2020/b.nc"]);
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let mut cache = DirectoryCache::with_clock(CacheLifetime::Disabled, ManualClock::new());

        cache.put("2020/", files(&["2020/a.nc"])).unwrap();
        cache.put("2020/", files(&["2020/a.nc"])).unwrap();
        assert!(cache.get("2020/").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn invalidate_one_or_all() {
        let mut cache = DirectoryCache::with_clock(CacheLifetime::Forever, ManualClock::new());
        cache.put("2019/", vec![]).unwrap();
        cache.put("2020/", vec![]).unwrap();

        cache.invalidate(Some("2019/")).unwrap();
        assert!(!cache.has("2019/"));
        assert!(cache.has("2020/"));

        let err = cache.invalidate(Some("2019/")).unwrap_err();
        assert_eq!(err.to_string(), "Directory '2019/' is not cached");

        cache.invalidate(None).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn sweep_drops_only_expired_unless_asked() {
        let clock = ManualClock::new();
        let mut cache =
            DirectoryCache::with_clock(CacheLifetime::Expires(Duration::seconds(30)), clock.clone());

        cache.put("old/", vec![]).unwrap();
        clock.advance(20);
        cache.put("new/", vec![]).unwrap();
        clock.advance(20);

        cache.sweep(false);
        assert_eq!(cache.len(), 1);
        assert!(cache.has("new/"));

        cache.sweep(true);
        assert!(cache.is_empty());
    }
}
