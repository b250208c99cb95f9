use crate::{
    datasource::Datasource,
    error::{GoesDlError, Result},
    locator::ProductLocator,
    repository::LocalRepository,
    time_range::TimeRange,
};
use chrono::Duration;
use std::collections::HashSet;

/// ISO 8601 with a numeric UTC offset, e.g. `2020-08-23T13:59:05+0000`.
pub const ISO_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Seconds of padding around a requested range.
pub const TIME_TOLERANCE_DEFAULT: i64 = 60;
pub const TIME_TOLERANCE_MIN: i64 = 30;
pub const TIME_TOLERANCE_MAX: i64 = 300;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloaderConfig {
    /// chrono format for the start and end strings.
    pub date_format: String,
    /// Seconds, within `TIME_TOLERANCE_MIN..=TIME_TOLERANCE_MAX`.
    pub time_tolerance: i64,
    pub show_progress: bool,
}

impl DownloaderConfig {
    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    pub fn with_time_tolerance(mut self, seconds: i64) -> Self {
        self.time_tolerance = seconds;
        self
    }

    pub fn with_show_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            date_format: ISO_TIMESTAMP_FORMAT.to_owned(),
            time_tolerance: TIME_TOLERANCE_DEFAULT,
            show_progress: true,
        }
    }
}

/// What happened to one requested file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadStatus {
    /// Fetched and stored.
    Success,
    /// Already in the repository, nothing fetched.
    Already,
}

/**
 * Finds a product's files in a time range and fetches the ones not yet in the local repository.
 *
 * Everything runs sequentially, in path order. Any listing or fetch failure aborts the whole call.
 */
pub struct Downloader<L, D> {
    locator: L,
    datasource: D,
    repository: LocalRepository,
    config: DownloaderConfig,
}

impl<L, D> Downloader<L, D>
where
    L: ProductLocator,
    D: Datasource,
{
    pub fn new(
        locator: L,
        datasource: D,
        repository: LocalRepository,
        config: DownloaderConfig,
    ) -> Result<Self> {
        if !(TIME_TOLERANCE_MIN..=TIME_TOLERANCE_MAX).contains(&config.time_tolerance) {
            return Err(GoesDlError::config(format!(
                "Invalid time tolerance: {}. It must be between {} and {} seconds",
                config.time_tolerance, TIME_TOLERANCE_MIN, TIME_TOLERANCE_MAX
            )));
        }

        Ok(Self {
            locator,
            datasource,
            repository,
            config,
        })
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    pub fn datasource(&self) -> &D {
        &self.datasource
    }

    pub fn datasource_mut(&mut self) -> &mut D {
        &mut self.datasource
    }

    pub fn repository(&self) -> &LocalRepository {
        &self.repository
    }

    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /**
     * Paths of the product's files timestamped inside `[start, end]`, padded by the tolerance.
     *
     * `end` defaults to `start`. Paths come back in directory order without duplicates.
     */
    pub fn list_files(&mut self, start: &str, end: Option<&str>) -> Result<Vec<String>> {
        let window = self.window(start, end)?;
        log::info!(
            "Listing files from {} to {}",
            window.start().to_rfc3339(),
            window.end().to_rfc3339()
        );

        let mut seen = HashSet::new();
        let mut matched = vec![];

        for dir_path in self.locator.paths(window.start(), window.end()) {
            for path in self.datasource.listdir(&dir_path)? {
                let filename = basename(&path);
                if !self.locator.matches(filename) {
                    continue;
                }

                let time = self.locator.datetime(filename)?;
                if window.contains(time) && seen.insert(path.clone()) {
                    matched.push(path);
                }
            }
        }

        log::debug!("{} files matched", matched.len());
        Ok(matched)
    }

    /// Like [`list_files`](Self::list_files), then fetch every match not already stored.
    /// Returns every matched path, fetched now or earlier.
    pub fn download_files(&mut self, start: &str, end: Option<&str>) -> Result<Vec<String>> {
        let paths = self.list_files(start, end)?;
        self.get_files(&paths)?;
        Ok(paths)
    }

    /// Fetch the given paths, skipping the ones already in the repository.
    pub fn get_files<S>(&self, paths: &[S]) -> Result<Vec<DownloadStatus>>
    where
        S: AsRef<str>,
    {
        log::info!("Retrieving {} files", paths.len());

        let total = paths.len();
        let mut statuses = Vec::with_capacity(total);

        for (i, path) in paths.iter().enumerate() {
            let path = path.as_ref();

            let status = if self.repository.has_item(path) {
                log::debug!("Skipping download for {}", path);
                DownloadStatus::Already
            } else {
                let data = self.datasource.download_file(path).map_err(|err| {
                    log::error!("Error downloading data: {} : {}", path, err);
                    err
                })?;
                self.repository.add_item(path, &data)?;
                DownloadStatus::Success
            };

            if self.config.show_progress {
                let message = match status {
                    DownloadStatus::Success => "downloaded successfully",
                    DownloadStatus::Already => "already downloaded",
                };
                log::info!("{}/{} {} {}", i + 1, total, path, message);
            }

            statuses.push(status);
        }

        Ok(statuses)
    }

    fn window(&self, start: &str, end: Option<&str>) -> Result<TimeRange> {
        let range = TimeRange::parse(start, end, &self.config.date_format)?;
        range.widen(Duration::seconds(self.config.time_tolerance))
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = DownloaderConfig::default();
        assert_eq!(config.date_format, "%Y-%m-%dT%H:%M:%S%z");
        assert_eq!(config.time_tolerance, 60);
        assert!(config.show_progress);

        let config = config.with_time_tolerance(300).with_show_progress(false);
        assert_eq!(config.time_tolerance, 300);
        assert!(!config.show_progress);
    }

    #[test]
    fn basename_of_relative_paths() {
        assert_eq!(basename("2020/236/14/OR_a.nc"), "OR_a.nc");
        assert_eq!(basename("OR_a.nc"), "OR_a.nc");
    }
}
