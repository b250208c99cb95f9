use super::{
    filename::{
        alternation, parse_entity, validate_entity, validate_set, FilenameConvention,
        FilenameMatcher, TimestampFormat,
    },
    granularity::{walk_paths, Granularity},
    lookup_datasource, BaseUrl, DatasourceId, ProductLocator,
};
use crate::{
    error::{GoesDlError, Result},
    satellite::Satellite,
};
use chrono::{DateTime, Utc};

const FILE_SUFFIX: &str = ".nc";

const B1_FILE_PREFIX: &str = "GRIDSAT";
const B1_PRODUCT_NAME: &str = "B1";
const B1_PATH_DATE_FORMAT: &str = "%Y";
const B1_FILE_DATE_PATTERN: &str = r"\d{4}\.\d{2}\.\d{2}\.\d{2}";
const B1_FILE_DATE_FORMAT: TimestampFormat = TimestampFormat::new("%Y.%m.%d.%H");
const B1_VERSIONS: &[&str] = &["v02r01"];
const B1_LATEST_VERSION: &str = "v02r01";

// GCP mirrors the data too, but it is not supported as a datasource.
const B1_DATASOURCES: &[(DatasourceId, &str)] = &[
    (DatasourceId::AWS, "s3://noaa-cdr-gridsat-b1-pds/data/"),
    (
        DatasourceId::HTTP,
        "https://www.ncei.noaa.gov/data/geostationary-ir-channel-brightness-temperature-gridsat-b1/access/",
    ),
];

const GOES_FILE_PREFIX: &str = "GridSat";
const GOES_PATH_DATE_FORMAT: &str = "%Y/%m";
const GOES_FILE_DATE_PATTERN: &str = r"\d{4}\.\d{2}\.\d{2}\.\d{4}";
const GOES_FILE_DATE_FORMAT: TimestampFormat = TimestampFormat::new("%Y.%m.%d.%H%M");
const GOES_VERSIONS: &[&str] = &["v01"];
const GOES_LATEST_VERSION: &str = "v01";
const GOES_SCENES: &[&str] = &["C", "F"];
const GOES_ORIGINS: &[Satellite] = &[
    Satellite::GOES08,
    Satellite::GOES09,
    Satellite::GOES10,
    Satellite::GOES11,
    Satellite::GOES12,
    Satellite::GOES13,
    Satellite::GOES14,
    Satellite::GOES15,
];
const GOES_DATASOURCES: &[(DatasourceId, &str)] = &[(
    DatasourceId::HTTP,
    "https://www.ncei.noaa.gov/data/gridsat-goes/access/",
)];

/// Naming shared by the GridSat products: `<prefix>-<name>[.<origin>].<timestamp>.<version>.nc`.
#[derive(Clone, Debug)]
struct GridSatNaming {
    file_prefix: &'static str,
    name: &'static str,
    origins: Vec<String>,
    versions: Vec<String>,
    file_date_pattern: &'static str,
    file_date_format: TimestampFormat,
}

impl FilenameConvention for GridSatNaming {
    fn prefix(&self) -> String {
        let origins = alternation(&self.origins);
        let origins = if origins.is_empty() {
            origins
        } else {
            format!(r"\.{}", origins)
        };

        format!(
            r"{}-{}{}\.",
            regex::escape(self.file_prefix),
            regex::escape(self.name),
            origins
        )
    }

    fn timestamp_pattern(&self) -> String {
        format!("({})", self.file_date_pattern)
    }

    fn suffix(&self) -> String {
        format!(r"\.{}{}", alternation(&self.versions), regex::escape(FILE_SUFFIX))
    }

    fn timestamp_format(&self) -> TimestampFormat {
        self.file_date_format
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    let mut owned: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    owned.sort();
    owned.dedup();
    owned
}

/**
 * Locator for the GridSat-B1 climate data record: global, three-hourly, stored one directory per
 * year.
 *
 * Filenames look like `GRIDSAT-B1.2020.08.23.14.v02r01.nc`.
 */
#[derive(Clone, Debug)]
pub struct GridSatB1Locator {
    naming: GridSatNaming,
    matcher: FilenameMatcher,
}

impl GridSatB1Locator {
    pub fn new(versions: &[&str]) -> Result<Self> {
        validate_set("version", versions, B1_VERSIONS)?;
        let versions = if versions.is_empty() {
            vec![B1_LATEST_VERSION.to_owned()]
        } else {
            owned(versions)
        };

        let naming = GridSatNaming {
            file_prefix: B1_FILE_PREFIX,
            name: B1_PRODUCT_NAME,
            origins: vec![],
            versions,
            file_date_pattern: B1_FILE_DATE_PATTERN,
            file_date_format: B1_FILE_DATE_FORMAT,
        };
        let matcher = FilenameMatcher::new(&naming)?;

        Ok(Self { naming, matcher })
    }

    pub fn versions(&self) -> &[String] {
        &self.naming.versions
    }
}

impl ProductLocator for GridSatB1Locator {
    fn base_url(&self, datasource: DatasourceId) -> Result<BaseUrl> {
        lookup_datasource(datasource, B1_DATASOURCES).map(BaseUrl::new)
    }

    fn paths(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<String> {
        walk_paths(Granularity::Year, "", B1_PATH_DATE_FORMAT, start, end)
    }

    fn filename_matcher(&self) -> &FilenameMatcher {
        &self.matcher
    }
}

/**
 * Locator for the GridSat-GOES/CONUS data records built from the older GOES satellites,
 * stored one directory per month below a per-scene directory.
 *
 * Filenames look like `GridSat-GOES.goes13.2017.08.23.1400.v01.nc`.
 */
#[derive(Clone, Debug)]
pub struct GridSatGoesLocator {
    naming: GridSatNaming,
    path_prefix: String,
    matcher: FilenameMatcher,
}

impl GridSatGoesLocator {
    /// `scene` is "F" (full disk, product GOES) or "C" (product CONUS).
    pub fn new(scene: &str, origins: &[&str], versions: &[&str]) -> Result<Self> {
        validate_entity("scene", scene, GOES_SCENES)?;
        if origins.is_empty() {
            return Err(GoesDlError::config("At least one origin ID is required"));
        }
        let origins = origins
            .iter()
            .map(|origin| parse_entity("origin", origin, GOES_ORIGINS).map(Satellite::archive_name))
            .collect::<Result<Vec<String>>>()?;
        validate_set("version", versions, GOES_VERSIONS)?;
        let versions = if versions.is_empty() {
            vec![GOES_LATEST_VERSION.to_owned()]
        } else {
            owned(versions)
        };

        let name = if scene == "C" { "CONUS" } else { "GOES" };
        let mut origins = origins;
        origins.sort();
        origins.dedup();

        let naming = GridSatNaming {
            file_prefix: GOES_FILE_PREFIX,
            name,
            origins,
            versions,
            file_date_pattern: GOES_FILE_DATE_PATTERN,
            file_date_format: GOES_FILE_DATE_FORMAT,
        };
        let matcher = FilenameMatcher::new(&naming)?;

        Ok(Self {
            path_prefix: format!("{}/", name.to_lowercase()),
            naming,
            matcher,
        })
    }

    pub fn name(&self) -> &str {
        self.naming.name
    }
}

impl ProductLocator for GridSatGoesLocator {
    fn base_url(&self, datasource: DatasourceId) -> Result<BaseUrl> {
        lookup_datasource(datasource, GOES_DATASOURCES).map(BaseUrl::new)
    }

    fn paths(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<String> {
        walk_paths(
            Granularity::Month,
            &self.path_prefix,
            GOES_PATH_DATE_FORMAT,
            start,
            end,
        )
    }

    fn filename_matcher(&self) -> &FilenameMatcher {
        &self.matcher
    }
}
