/*! Dataset-specific knowledge of where product files live and how they are named. */
use crate::error::{GoesDlError, Result};
use chrono::{DateTime, Utc};
use strum::IntoStaticStr;

pub use self::{
    filename::{FilenameConvention, FilenameMatcher, TimestampFormat},
    goes::GoesLocator,
    granularity::Granularity,
    gridsat::{GridSatB1Locator, GridSatGoesLocator},
};

pub(crate) mod filename;
mod goes;
mod granularity;
mod gridsat;

/// Logical identifier of a storage provider a product may be published on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoStaticStr)]
pub enum DatasourceId {
    AWS,
    GCP,
    HTTP,
}

/// Where a datasource connects to: a root URL plus an optional object-store region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl {
    pub url: String,
    pub region: Option<String>,
}

impl BaseUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/**
 * Translates a product identity plus a time range into storage paths, and recognizes the
 * product's files by name.
 *
 * Timestamps embedded in filenames are always taken as UTC.
 */
pub trait ProductLocator {
    /// Fails with a configuration error if the product is not published on `datasource`.
    fn base_url(&self, datasource: DatasourceId) -> Result<BaseUrl>;

    /// Directory paths, relative to the base URL, covering every granularity unit between
    /// `start` and `end` inclusive. Pure and chronologically ordered.
    fn paths(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<String>;

    fn filename_matcher(&self) -> &FilenameMatcher;

    fn matches(&self, filename: &str) -> bool {
        self.filename_matcher().matches(filename)
    }

    fn datetime(&self, filename: &str) -> Result<DateTime<Utc>> {
        self.filename_matcher().datetime(filename)
    }
}

impl<L> ProductLocator for Box<L>
where
    L: ProductLocator + ?Sized,
{
    fn base_url(&self, datasource: DatasourceId) -> Result<BaseUrl> {
        (**self).base_url(datasource)
    }

    fn paths(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<String> {
        (**self).paths(start, end)
    }

    fn filename_matcher(&self) -> &FilenameMatcher {
        (**self).filename_matcher()
    }

    fn matches(&self, filename: &str) -> bool {
        (**self).matches(filename)
    }

    fn datetime(&self, filename: &str) -> Result<DateTime<Utc>> {
        (**self).datetime(filename)
    }
}

/// Look up `datasource` in a product's table of supported providers.
pub(crate) fn lookup_datasource<'a>(
    datasource: DatasourceId,
    supported: &[(DatasourceId, &'a str)],
) -> Result<&'a str> {
    supported
        .iter()
        .find(|(id, _)| *id == datasource)
        .map(|(_, url)| *url)
        .ok_or_else(|| {
            let requested: &'static str = datasource.into();
            let mut ids: Vec<&'static str> = supported.iter().map(|(id, _)| (*id).into()).collect();
            ids.sort_unstable();
            let ids: Vec<String> = ids.iter().map(|id| format!("'{}'", id)).collect();

            GoesDlError::config(format!(
                "Unsupported datasource: '{}'. Supported datasources: {}",
                requested,
                ids.join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[(DatasourceId, &str)] = &[
        (DatasourceId::HTTP, "https://example.org/data/"),
        (DatasourceId::AWS, "s3://bucket/data/"),
    ];

    #[test]
    fn lookup_finds_supported_datasource() {
        assert_eq!(
            lookup_datasource(DatasourceId::AWS, TABLE).unwrap(),
            "s3://bucket/data/"
        );
    }

    #[test]
    fn lookup_lists_supported_datasources_sorted() {
        let err = lookup_datasource(DatasourceId::GCP, TABLE).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported datasource: 'GCP'. Supported datasources: 'AWS', 'HTTP'"
        );
    }
}
