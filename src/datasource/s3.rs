use super::{cached_listdir, join_relative, Datasource, DirectoryCache};
use crate::{
    error::{GoesDlError, Result},
    locator::{BaseUrl, DatasourceId, ProductLocator},
};
use s3::{bucket::Bucket, creds::Credentials, region::Region};

const S3_SCHEME: &str = "s3://";
const DEFAULT_REGION: &str = "us-east-1";

/// Anonymous, read-only access to a public bucket such as NOAA's open data on AWS.
pub struct S3Datasource {
    base_url: String,
    bucket: Bucket,
    prefix: String,
    cache: DirectoryCache,
}

impl S3Datasource {
    /// Connect to the bucket the locator publishes on AWS.
    pub fn connect<L>(locator: &L, cache: DirectoryCache) -> Result<Self>
    where
        L: ProductLocator + ?Sized,
    {
        let base_url = locator.base_url(DatasourceId::AWS)?;
        Self::from_base_url(base_url, cache)
    }

    /// Connect to `s3://<bucket>/<prefix>`, failing if the bucket cannot be listed.
    pub fn from_base_url(base_url: BaseUrl, cache: DirectoryCache) -> Result<Self> {
        let (bucket_name, prefix) = split_s3_url(&base_url.url)?;

        let region: Region = base_url
            .region
            .as_deref()
            .unwrap_or(DEFAULT_REGION)
            .parse()
            .map_err(|err| GoesDlError::config(format!("Invalid region: {}", err)))?;
        let credentials = Credentials::anonymous()
            .map_err(|err| GoesDlError::config(format!("Invalid credentials: {}", err)))?;

        let bucket = Bucket::new(bucket_name, region, credentials).map_err(|err| {
            GoesDlError::config(format!("Unable to open bucket '{}': {}", bucket_name, err))
        })?;

        bucket
            .list_blocking(prefix.to_owned(), Some("/".into()))
            .map_err(|err| {
                GoesDlError::config(format!("Unable to reach '{}': {}", base_url.url, err))
            })?;

        log::info!("Connected to datasource at: {}", base_url.url);

        Ok(Self {
            prefix: prefix.to_owned(),
            base_url: base_url.url,
            bucket,
            cache,
        })
    }

    pub fn cache(&mut self) -> &mut DirectoryCache {
        &mut self.cache
    }
}

impl Datasource for S3Datasource {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn listdir(&mut self, dir_path: &str) -> Result<Vec<String>> {
        let bucket = &self.bucket;
        let prefix = &self.prefix;

        cached_listdir(&mut self.cache, dir_path, |dir_path| {
            let common_prefix = format!("{}{}", prefix, dir_path);

            let results = bucket
                .list_blocking(common_prefix.clone(), Some("/".into()))
                .map_err(|err| {
                    GoesDlError::runtime(format!("Unable to list '{}'", common_prefix), err)
                })?;

            let objects = results
                .iter()
                .flat_map(|res| res.contents.iter())
                .map(|obj| (obj.key.as_str(), obj.size));

            Ok(relative_keys(&common_prefix, dir_path, objects))
        })
    }

    fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        let key = format!("{}{}", self.prefix, file_path);

        let response = self.bucket.get_object_blocking(&key).map_err(|err| {
            GoesDlError::runtime(format!("Unable to retrieve the file '{}'", file_path), err)
        })?;

        let code = response.status_code();
        if code != 200 {
            return Err(GoesDlError::runtime(
                format!("Unable to retrieve the file '{}'", file_path),
                format!("HTTP status {}", code),
            ));
        }

        Ok(response.bytes().to_vec())
    }
}

/// Split `s3://bucket/some/prefix/` into the bucket name and the key prefix.
fn split_s3_url(url: &str) -> Result<(&str, &str)> {
    let rest = url
        .strip_prefix(S3_SCHEME)
        .ok_or_else(|| GoesDlError::config(format!("Not an S3 URL: '{}'", url)))?;

    let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
    if bucket.is_empty() {
        return Err(GoesDlError::config(format!("Missing bucket name in '{}'", url)));
    }

    Ok((bucket, prefix))
}

/// Keys under `common_prefix` rewritten relative to the base URL. Zero-size objects are
/// directory placeholders and are skipped.
fn relative_keys<'a, I>(common_prefix: &str, dir_path: &str, objects: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    objects
        .into_iter()
        .filter(|(_, size)| *size > 0)
        .filter_map(|(key, _)| key.strip_prefix(common_prefix))
        .filter(|name| !name.is_empty())
        .map(|name| join_relative(dir_path, name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_bucket_and_prefix() {
        assert_eq!(
            split_s3_url("s3://noaa-goes16/ABI-L2-CMIPF/").unwrap(),
            ("noaa-goes16", "ABI-L2-CMIPF/")
        );
        assert_eq!(
            split_s3_url("s3://noaa-cdr-gridsat-b1-pds/data/").unwrap(),
            ("noaa-cdr-gridsat-b1-pds", "data/")
        );
        assert_eq!(split_s3_url("s3://bucket").unwrap(), ("bucket", ""));
    }

    #[test]
    fn reject_non_s3_urls() {
        assert!(matches!(
            split_s3_url("https://example.org/data/"),
            Err(GoesDlError::Config(_))
        ));
        assert!(split_s3_url("s3:///data/").is_err());
    }

    #[test]
    fn keys_become_relative_paths() {
        let objects = vec![
            ("ABI-L2-CMIPF/2020/236/14/", 0),
            ("ABI-L2-CMIPF/2020/236/14/OR_a.nc", 1024),
            ("ABI-L2-CMIPF/2020/236/14/OR_b.nc", 2048),
            ("ABI-L2-CMIPF/2020/236/14/empty.nc", 0),
        ];

        let paths = relative_keys("ABI-L2-CMIPF/2020/236/14/", "2020/236/14/", objects);
        assert_eq!(paths, vec!["2020/236/14/OR_a.nc", "2020/236/14/OR_b.nc"]);
    }

    #[test]
    fn no_objects_is_an_empty_listing() {
        let paths = relative_keys("data/1970/", "1970/", Vec::<(&str, u64)>::new());
        assert!(paths.is_empty());
    }
}
