use super::{cached_listdir, join_relative, Datasource, DirectoryCache};
use crate::error::{GoesDlError, Result};
use std::{
    fs::{self, read_dir},
    io,
    path::PathBuf,
};

/// Files already on a local or mounted filesystem, laid out like the remote archive.
#[derive(Debug)]
pub struct LocalDatasource {
    root: PathBuf,
    base_url: String,
    cache: DirectoryCache,
}

impl LocalDatasource {
    pub fn new<P>(root: P, cache: DirectoryCache) -> Result<Self>
    where
        P: Into<PathBuf>,
    {
        let root = root.into();
        if !root.is_dir() {
            return Err(GoesDlError::config(format!(
                "Datasource root is not a directory: {:?}",
                root
            )));
        }

        let base_url = root.to_string_lossy().into_owned();
        log::info!("Connected to datasource at: {:?}", &root);

        Ok(Self {
            root,
            base_url,
            cache,
        })
    }

    pub fn cache(&mut self) -> &mut DirectoryCache {
        &mut self.cache
    }
}

impl Datasource for LocalDatasource {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn listdir(&mut self, dir_path: &str) -> Result<Vec<String>> {
        let root = &self.root;

        cached_listdir(&mut self.cache, dir_path, |dir_path| {
            let dir = root.join(dir_path);
            if !dir.is_dir() {
                return Ok(vec![]);
            }

            let listing_error =
                |err: io::Error| GoesDlError::runtime(format!("Unable to list {:?}", dir), err);

            let mut names = vec![];
            for entry in read_dir(&dir).map_err(listing_error)? {
                let entry = entry.map_err(listing_error)?;
                if entry.file_type().map_err(listing_error)?.is_file() {
                    names.push(entry.file_name().to_string_lossy().into_owned());
                }
            }
            names.sort();

            Ok(names
                .iter()
                .map(|name| join_relative(dir_path, name))
                .collect())
        })
    }

    fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        fs::read(self.root.join(file_path)).map_err(|err| {
            GoesDlError::runtime(format!("Unable to retrieve the file '{}'", file_path), err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::CacheLifetime;

    fn populated() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("2020/236/14");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("b.nc"), b"bbb").unwrap();
        fs::write(dir.join("a.nc"), b"a").unwrap();
        tmp
    }

    #[test]
    fn root_must_be_a_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let err = LocalDatasource::new(tmp.path().join("missing"), DirectoryCache::default())
            .unwrap_err();
        assert!(matches!(err, GoesDlError::Config(_)));
    }

    #[test]
    fn lists_files_sorted_and_relative() {
        let tmp = populated();
        let mut source = LocalDatasource::new(tmp.path(), DirectoryCache::default()).unwrap();

        assert_eq!(
            source.listdir("2020/236/14/").unwrap(),
            vec!["2020/236/14/a.nc", "2020/236/14/b.nc"]
        );
        assert_eq!(source.download_file("2020/236/14/b.nc").unwrap(), b"bbb");
    }

    #[test]
    fn missing_directory_is_empty_and_cached() {
        let tmp = populated();
        let mut source = LocalDatasource::new(tmp.path(), DirectoryCache::default()).unwrap();

        assert!(source.listdir("2020/236/15/").unwrap().is_empty());
        assert!(source.cache().has("2020/236/15/"));
    }

    #[test]
    fn cached_listing_hides_new_files() {
        let tmp = populated();
        let mut source =
            LocalDatasource::new(tmp.path(), DirectoryCache::new(CacheLifetime::Forever)).unwrap();

        source.listdir("2020/236/14/").unwrap();
        fs::write(tmp.path().join("2020/236/14/c.nc"), b"c").unwrap();
        assert_eq!(source.listdir("2020/236/14/").unwrap().len(), 2);

        source.cache().invalidate(Some("2020/236/14/")).unwrap();
        assert_eq!(source.listdir("2020/236/14/").unwrap().len(), 3);
    }

    #[test]
    fn missing_file_is_a_runtime_error() {
        let tmp = populated();
        let source = LocalDatasource::new(tmp.path(), DirectoryCache::default()).unwrap();

        let err = source.download_file("2020/236/14/zzz.nc").unwrap_err();
        assert!(matches!(err, GoesDlError::Runtime { .. }));
        assert!(err
            .to_string()
            .starts_with("Unable to retrieve the file '2020/236/14/zzz.nc'"));
    }
}
