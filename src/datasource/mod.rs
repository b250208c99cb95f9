/*! Storage backends that list directories and fetch file bytes. */
use crate::error::Result;

pub use self::{
    cache::{CacheLifetime, Clock, DirectoryCache, DirectoryListing, SystemClock},
    http::HttpDatasource,
    local::LocalDatasource,
    s3::S3Datasource,
};

pub(crate) mod cache;
mod http;
mod local;
mod s3;

/**
 * A storage backend holding a product's files below one base URL.
 *
 * All paths going in and coming out are relative to the base URL.
 */
pub trait Datasource {
    fn base_url(&self) -> &str;

    /// Paths of the files in `dir_path`, each relative to the base URL. A directory that does not
    /// exist lists as empty.
    fn listdir(&mut self, dir_path: &str) -> Result<Vec<String>>;

    fn download_file(&self, file_path: &str) -> Result<Vec<u8>>;
}

impl<D> Datasource for Box<D>
where
    D: Datasource + ?Sized,
{
    fn base_url(&self) -> &str {
        (**self).base_url()
    }

    fn listdir(&mut self, dir_path: &str) -> Result<Vec<String>> {
        (**self).listdir(dir_path)
    }

    fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        (**self).download_file(file_path)
    }
}

/// Serve `dir_path` from `cache`, or list it with `fetch` and remember the result.
pub(crate) fn cached_listdir<F>(
    cache: &mut DirectoryCache,
    dir_path: &str,
    fetch: F,
) -> Result<Vec<String>>
where
    F: FnOnce(&str) -> Result<Vec<String>>,
{
    if let Some(listing) = cache.get(dir_path) {
        log::debug!("Cache hit for directory: {}", dir_path);
        return Ok(listing.files().to_vec());
    }

    log::debug!("Cache miss for directory: {}", dir_path);
    let files = fetch(dir_path)?;
    log::debug!("Listed {} files in {}", files.len(), dir_path);
    if files.is_empty() {
        log::warn!("No files found in {}, it may not exist", dir_path);
    }

    cache.put(dir_path, files.clone())?;

    Ok(files)
}

/// `dir_path` and `name` joined with exactly one slash.
pub(crate) fn join_relative(dir_path: &str, name: &str) -> String {
    if dir_path.is_empty() || dir_path.ends_with('/') {
        format!("{}{}", dir_path, name)
    } else {
        format!("{}/{}", dir_path, name)
    }
}

#[cfg(test)]
mod tests {
    use super::{cache::tests::ManualClock, *};
    use crate::error::GoesDlError;
    use std::cell::Cell;

    #[test]
    fn listing_is_fetched_once_while_cached() {
        let mut cache = DirectoryCache::with_clock(CacheLifetime::Forever, ManualClock::new());
        let calls = Cell::new(0);
        let fetch = |dir: &str| {
            calls.set(calls.get() + 1);
            Ok(vec![join_relative(dir, "a.nc")])
        };

        let first = cached_listdir(&mut cache, "2020/", fetch).unwrap();
        let second = cached_listdir(&mut cache, "2020/", fetch).unwrap();

        assert_eq!(first, vec!["2020/a.nc"]);
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn empty_listing_is_cached() {
        let mut cache = DirectoryCache::with_clock(CacheLifetime::Forever, ManualClock::new());

        assert!(cached_listdir(&mut cache, "1970/", |_| Ok(vec![])).unwrap().is_empty());
        assert!(cache.has("1970/"));
    }

    #[test]
    fn failed_listing_is_not_cached() {
        let mut cache = DirectoryCache::with_clock(CacheLifetime::Forever, ManualClock::new());

        let result = cached_listdir(&mut cache, "2020/", |_| {
            Err(GoesDlError::runtime("Unable to list '2020/'", "timed out".to_string()))
        });

        assert!(matches!(result, Err(GoesDlError::Runtime { .. })));
        assert!(!cache.has("2020/"));
    }

    #[test]
    fn disabled_cache_always_fetches() {
        let mut cache = DirectoryCache::with_clock(CacheLifetime::Disabled, ManualClock::new());
        let calls = Cell::new(0);
        let fetch = |_: &str| {
            calls.set(calls.get() + 1);
            Ok(vec![])
        };

        cached_listdir(&mut cache, "2020/", fetch).unwrap();
        cached_listdir(&mut cache, "2020/", fetch).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn relative_paths_get_one_separator() {
        assert_eq!(join_relative("2020/236/14/", "a.nc"), "2020/236/14/a.nc");
        assert_eq!(join_relative("2020", "a.nc"), "2020/a.nc");
        assert_eq!(join_relative("", "a.nc"), "a.nc");
    }
}
