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
    product::{GoesProduct, Scene, SCENES},
};
use chrono::{DateTime, Utc};

const FILE_DATE_PATTERN: &str = r"\d{14}";
const FILE_SUFFIX: &str = ".nc";
const PATH_DATE_FORMAT: &str = "%Y/%j/%H";
const S3_REGION: &str = "us-east-1";

// 13 digits of %Y%j%H%M%S followed by tenths of a second.
const FILE_DATE_FORMAT: TimestampFormat =
    TimestampFormat::new("%Y%j%H%M%S").with_fraction_digits(1);

const ABI_CHANNELS: &[&str] = &[
    "C01", "C02", "C03", "C04", "C05", "C06", "C07", "C08", "C09", "C10", "C11", "C12", "C13",
    "C14", "C15", "C16",
];

const ABI_PRIMARY_PRODUCTS: &[&str] = &["CMIP", "Rad"];
const ABI_MULTIBAND_PRODUCTS: &[&str] = &["MCMIP"];
const ABI_DERIVED_CHANNEL_PRODUCTS: &[&str] = &["DMW", "DMWV"];
const ABI_DERIVED_PRODUCTS: &[&str] = &[
    "ACHA", "ACHT", "ACM", "ACTP", "ADP", "AICE", "AITA", "AOD", "BRF", "COD", "CPS", "CTP", "DSI",
    "DSR", "FDC", "LST", "LVMP", "LVTP", "RRQPE", "RSR", "SST", "TPW", "VAA",
];
const GLM_PRODUCTS: &[&str] = &["LCFA"];

/// Derived motion winds on mesoscale scenes.
const DMW_MESO_CHANNELS: &[&str] = &["C02", "C07", "C08", "C09", "C10"];
/// Derived motion winds on CONUS and full disk scenes.
const DMW_CHANNELS: &[&str] = &["C02", "C07", "C08", "C09", "C10", "C14"];
const DMWV_CHANNELS: &[&str] = &["C08"];

/**
 * Locator for the GOES-R Series imagery dataset on the NOAA open data buckets.
 *
 * Directories are hourly, `YYYY/DDD/HH/`, below one directory per product. Filenames look like
 * `OR_ABI-L2-CMIPF-M6C13_G16_s20202361400203_e20202361409511_c20202361409591.nc`; only the scan
 * start timestamp (`s...`) is extracted.
 */
#[derive(Clone, Debug)]
pub struct GoesLocator {
    product: GoesProduct,
    matcher: FilenameMatcher,
}

impl GoesLocator {
    /// Primary ABI products (`CMIP`, `Rad`), one or more channels.
    pub fn abi_primary(name: &str, scene: &str, channels: &[&str], origin: &str) -> Result<Self> {
        validate_entity("product", name, ABI_PRIMARY_PRODUCTS)?;
        let scene = parse_entity("scene", scene, SCENES)?;
        require_channels("Primary", name, channels)?;
        validate_set("channel", channels, ABI_CHANNELS)?;

        let level = if name == "Rad" { "L1b" } else { "L2" };
        Self::build(GoesProduct::new(name, level, Some(scene), "ABI", channels, origin)?)
    }

    pub fn cmip(scene: &str, channels: &[&str], origin: &str) -> Result<Self> {
        Self::abi_primary("CMIP", scene, channels, origin)
    }

    pub fn rad(scene: &str, channels: &[&str], origin: &str) -> Result<Self> {
        Self::abi_primary("Rad", scene, channels, origin)
    }

    /// Multi-band ABI products (`MCMIP`), which carry every channel in one file.
    pub fn abi_multiband(name: &str, scene: &str, origin: &str) -> Result<Self> {
        validate_entity("product", name, ABI_MULTIBAND_PRODUCTS)?;
        let scene = parse_entity("scene", scene, SCENES)?;

        Self::build(GoesProduct::new(name, "L2", Some(scene), "ABI", &[], origin)?)
    }

    pub fn mcmip(scene: &str, origin: &str) -> Result<Self> {
        Self::abi_multiband("MCMIP", scene, origin)
    }

    /// Derived ABI products computed from specific channels (`DMW`, `DMWV`).
    pub fn abi_derived_channels(
        name: &str,
        scene: &str,
        channels: &[&str],
        origin: &str,
    ) -> Result<Self> {
        validate_entity("product", name, ABI_DERIVED_CHANNEL_PRODUCTS)?;
        let scene = parse_entity("scene", scene, SCENES)?;
        require_channels("Derived", name, channels)?;

        let supported = match (name, scene) {
            ("DMW", Scene::FullDisk) | ("DMW", Scene::Conus) => DMW_CHANNELS,
            ("DMW", _) => DMW_MESO_CHANNELS,
            _ => DMWV_CHANNELS,
        };
        validate_set("channel", channels, supported)?;

        Self::build(GoesProduct::new(name, "L2", Some(scene), "ABI", channels, origin)?)
    }

    pub fn dmw(scene: &str, channels: &[&str], origin: &str) -> Result<Self> {
        Self::abi_derived_channels("DMW", scene, channels, origin)
    }

    pub fn dmwv(scene: &str, origin: &str) -> Result<Self> {
        Self::abi_derived_channels("DMWV", scene, DMWV_CHANNELS, origin)
    }

    /// Derived ABI products without channel tags, e.g. `ACHA` or `FDC`.
    pub fn abi_derived(name: &str, scene: &str, origin: &str) -> Result<Self> {
        validate_entity("product", name, ABI_DERIVED_PRODUCTS)?;
        let scene = parse_entity("scene", scene, SCENES)?;

        Self::build(GoesProduct::new(name, "L2", Some(scene), "ABI", &[], origin)?)
    }

    /// GLM products (`LCFA`), which have neither scene nor scan mode.
    pub fn glm(name: &str, origin: &str) -> Result<Self> {
        validate_entity("product", name, GLM_PRODUCTS)?;

        Self::build(GoesProduct::new(name, "L2", None, "GLM", &[], origin)?)
    }

    pub fn lcfa(origin: &str) -> Result<Self> {
        Self::glm("LCFA", origin)
    }

    pub fn product(&self) -> &GoesProduct {
        &self.product
    }

    fn build(product: GoesProduct) -> Result<Self> {
        let matcher = FilenameMatcher::new(&GoesNaming(&product))?;
        Ok(Self { product, matcher })
    }
}

fn require_channels(kind: &str, name: &str, channels: &[&str]) -> Result<()> {
    if channels.is_empty() {
        Err(GoesDlError::config(format!(
            "{} ABI product '{}' does require channel specification",
            kind, name
        )))
    } else {
        Ok(())
    }
}

impl ProductLocator for GoesLocator {
    fn base_url(&self, datasource: DatasourceId) -> Result<BaseUrl> {
        let bucket = format!("noaa-{}", self.product.origin().archive_name());
        let url = format!("s3://{}/{}/", bucket, self.product.directory_tag());
        let supported = [(DatasourceId::AWS, url.as_str())];

        let url = lookup_datasource(datasource, &supported)?;
        Ok(BaseUrl::new(url).with_region(S3_REGION))
    }

    fn paths(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<String> {
        walk_paths(Granularity::Hour, "", PATH_DATE_FORMAT, start, end)
    }

    fn filename_matcher(&self) -> &FilenameMatcher {
        &self.matcher
    }
}

struct GoesNaming<'a>(&'a GoesProduct);

impl FilenameConvention for GoesNaming<'_> {
    fn prefix(&self) -> String {
        let product = self.0;

        let mut scan = alternation(product.modes());
        scan.push_str(&alternation(product.channels()));
        if !scan.is_empty() {
            scan.insert(0, '-');
        }

        format!(
            "OR_{}{}_{}",
            regex::escape(&product.file_tag()),
            scan,
            product.origin().id()
        )
    }

    fn timestamp_pattern(&self) -> String {
        format!(
            "_s({p})_e{p}_c{p}",
            p = FILE_DATE_PATTERN
        )
    }

    fn suffix(&self) -> String {
        regex::escape(FILE_SUFFIX)
    }

    fn timestamp_format(&self) -> TimestampFormat {
        FILE_DATE_FORMAT
    }
}
