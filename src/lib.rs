/*!
Locate, list, cache and download dated GOES satellite product files.

A [`ProductLocator`] turns a product description and a time range into directory paths and
recognizes the product's files by name. A [`Datasource`] lists those directories and fetches
files, memoizing listings in a [`DirectoryCache`]. The [`Downloader`] ties both to a
[`LocalRepository`] so every file is fetched once.
*/

/**************************************************************************************************
 *                                           Public API
 *************************************************************************************************/
pub use crate::{
    datasource::{
        CacheLifetime, Clock, Datasource, DirectoryCache, DirectoryListing, HttpDatasource,
        LocalDatasource, S3Datasource, SystemClock,
    },
    downloader::{
        DownloadStatus, Downloader, DownloaderConfig, ISO_TIMESTAMP_FORMAT,
        TIME_TOLERANCE_DEFAULT, TIME_TOLERANCE_MAX, TIME_TOLERANCE_MIN,
    },
    error::{BoxError, GoesDlError, Result},
    locator::{
        BaseUrl, DatasourceId, FilenameConvention, FilenameMatcher, GoesLocator, Granularity,
        GridSatB1Locator, GridSatGoesLocator, ProductLocator, TimestampFormat,
    },
    product::{GoesProduct, Instrument, Level, Scene},
    repository::LocalRepository,
    satellite::Satellite,
    time_range::TimeRange,
};

/**************************************************************************************************
 *                                      Private Implementation
 *************************************************************************************************/
mod datasource;
mod downloader;
mod error;
mod locator;
mod product;
mod repository;
mod satellite;
mod time_range;
