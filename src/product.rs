use crate::{
    error::Result,
    locator::filename::parse_entity,
    satellite::Satellite,
};
use strum::IntoStaticStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr)]
pub enum Instrument {
    /// Advanced Baseline Imager
    ABI,
    /// Geostationary Lightning Mapper
    GLM,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr)]
pub enum Level {
    #[strum(serialize = "L1b")]
    L1b,
    #[strum(serialize = "L2")]
    L2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr)]
pub enum Scene {
    #[strum(serialize = "F")]
    FullDisk,
    #[strum(serialize = "C")]
    Conus,
    #[strum(serialize = "M1")]
    Meso1,
    #[strum(serialize = "M2")]
    Meso2,
}

impl Scene {
    /// Tag used in filenames, e.g. "M1".
    pub fn id(self) -> &'static str {
        self.into()
    }

    /// Tag used in product directory names; both mesoscale domains share one directory.
    pub fn directory_id(self) -> &'static str {
        match self {
            Scene::Meso1 | Scene::Meso2 => "M",
            other => other.id(),
        }
    }
}

pub(crate) const GOESR_ORIGINS: &[Satellite] =
    &[Satellite::GOES16, Satellite::GOES17, Satellite::GOES18];
pub(crate) const INSTRUMENTS: &[Instrument] = &[Instrument::ABI, Instrument::GLM];
pub(crate) const LEVELS: &[Level] = &[Level::L1b, Level::L2];
pub(crate) const SCENES: &[Scene] = &[Scene::FullDisk, Scene::Conus, Scene::Meso1, Scene::Meso2];

/// Scan modes a full disk image may have been taken in.
pub(crate) const FULL_DISK_MODES: &[&str] = &["M3", "M4", "M6"];
/// Scan modes for every other scene.
pub(crate) const SECTOR_MODES: &[&str] = &["M3", "M6"];

/**
 * Immutable description of one GOES-R Series product: what it is, which instrument produced it,
 * and which satellite it came from.
 *
 * Only a validated instance can be built; the per-product rules (names, channels, scenes) are
 * checked by the [`GoesLocator`](crate::GoesLocator) constructors before this one runs.
 */
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoesProduct {
    name: String,
    level: Level,
    scene: Option<Scene>,
    instrument: Instrument,
    modes: Vec<String>,
    channels: Vec<String>,
    origin: Satellite,
}

impl GoesProduct {
    pub(crate) fn new(
        name: &str,
        level: &str,
        scene: Option<Scene>,
        instrument: &str,
        channels: &[&str],
        origin: &str,
    ) -> Result<Self> {
        let origin = parse_entity("origin", origin, GOESR_ORIGINS)?;
        let instrument = parse_entity("instrument", instrument, INSTRUMENTS)?;
        let level = parse_entity("level", level, LEVELS)?;

        let modes: &[&str] = match scene {
            Some(Scene::FullDisk) => FULL_DISK_MODES,
            Some(_) => SECTOR_MODES,
            None => &[],
        };

        let mut channels: Vec<String> = channels.iter().map(|c| c.to_string()).collect();
        channels.sort();
        channels.dedup();

        Ok(Self {
            name: name.to_owned(),
            level,
            scene,
            instrument,
            modes: modes.iter().map(|m| m.to_string()).collect(),
            channels,
            origin,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn scene(&self) -> Option<Scene> {
        self.scene
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn modes(&self) -> &[String] {
        &self.modes
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn origin(&self) -> Satellite {
        self.origin
    }

    /// e.g. "ABI-L2-CMIPM1" for filenames.
    pub fn file_tag(&self) -> String {
        self.tag(self.scene.map(Scene::id))
    }

    /// e.g. "ABI-L2-CMIPM" for the product's directory on the object store.
    pub fn directory_tag(&self) -> String {
        self.tag(self.scene.map(Scene::directory_id))
    }

    fn tag(&self, scene: Option<&str>) -> String {
        let instrument: &'static str = self.instrument.into();
        let level: &'static str = self.level.into();
        format!(
            "{}-{}-{}{}",
            instrument,
            level,
            self.name,
            scene.unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GoesDlError;

    #[test]
    fn mesoscale_shares_directory() {
        let product =
            GoesProduct::new("CMIP", "L2", Some(Scene::Meso2), "ABI", &["C13"], "G16").unwrap();

        assert_eq!(product.file_tag(), "ABI-L2-CMIPM2");
        assert_eq!(product.directory_tag(), "ABI-L2-CMIPM");
        assert_eq!(product.modes(), ["M3", "M6"]);
    }

    #[test]
    fn full_disk_has_mode_4() {
        let product =
            GoesProduct::new("Rad", "L1b", Some(Scene::FullDisk), "ABI", &["C02"], "G18").unwrap();
        assert_eq!(product.modes(), ["M3", "M4", "M6"]);
        assert_eq!(product.origin(), Satellite::GOES18);
    }

    #[test]
    fn sceneless_product_has_no_modes() {
        let product = GoesProduct::new("LCFA", "L2", None, "GLM", &[], "G17").unwrap();
        assert!(product.modes().is_empty());
        assert_eq!(product.file_tag(), "GLM-L2-LCFA");
    }

    #[test]
    fn rejects_unknown_origin_instrument_and_level() {
        let err = GoesProduct::new("CMIP", "L2", None, "ABI", &[], "G15").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid origin ID: 'G15'. Available origin IDs: 'G16', 'G17', 'G18'"
        );

        let err = GoesProduct::new("CMIP", "L2", None, "SUVI", &[], "G16").unwrap_err();
        assert!(matches!(err, GoesDlError::Config(_)));
        assert!(err.to_string().contains("'ABI', 'GLM'"));

        let err = GoesProduct::new("CMIP", "L3", None, "ABI", &[], "G16").unwrap_err();
        assert!(err.to_string().contains("'L1b', 'L2'"));
    }
}
