use super::{cached_listdir, join_relative, Datasource, DirectoryCache};
use crate::{
    error::{GoesDlError, Result},
    locator::{DatasourceId, ProductLocator},
};
use regex::Regex;
use reqwest::{
    blocking::{Client, Response},
    StatusCode, Url,
};
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("goes_dl/", env!("CARGO_PKG_VERSION"));
const HREF_PATTERN: &str = r#"<a\s+href="([^"]+)""#;

/// Files served from an HTTP server's directory index pages.
pub struct HttpDatasource {
    base_url: Url,
    client: Client,
    href: Regex,
    cache: DirectoryCache,
}

impl HttpDatasource {
    /// Connect to the server the locator publishes on over HTTP.
    pub fn connect<L>(locator: &L, cache: DirectoryCache) -> Result<Self>
    where
        L: ProductLocator + ?Sized,
    {
        let base_url = locator.base_url(DatasourceId::HTTP)?;
        Self::from_base_url(&base_url.url, cache)
    }

    /// Connect to `base_url`, failing if its host does not resolve or the URL does not answer.
    pub fn from_base_url(base_url: &str, cache: DirectoryCache) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| GoesDlError::config(format!("Invalid URL '{}': {}", base_url, err)))?;

        let resolved = base_url.socket_addrs(|| None).map_err(|err| {
            GoesDlError::config(format!("Unable to resolve host of '{}': {}", base_url, err))
        })?;
        log::debug!("{} resolves to {:?}", base_url, resolved);

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| {
                GoesDlError::config(format!("Failed to create HTTP client: {}", err))
            })?;

        let probe = client
            .head(base_url.clone())
            .timeout(PROBE_TIMEOUT)
            .send()
            .map_err(|err| GoesDlError::config(format!("Unable to reach '{}': {}", base_url, err)))?;
        if !probe.status().is_success() {
            return Err(GoesDlError::config(format!(
                "Unable to reach '{}': HTTP {}",
                base_url,
                probe.status()
            )));
        }

        let href = Regex::new(HREF_PATTERN)
            .map_err(|err| GoesDlError::config(format!("Invalid link pattern: {}", err)))?;

        log::info!("Connected to datasource at: {}", base_url);

        Ok(Self {
            base_url,
            client,
            href,
            cache,
        })
    }

    pub fn cache(&mut self) -> &mut DirectoryCache {
        &mut self.cache
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| GoesDlError::input(format!("Invalid path '{}': {}", path, err)))
    }
}

impl Datasource for HttpDatasource {
    fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn listdir(&mut self, dir_path: &str) -> Result<Vec<String>> {
        let dir_url = self.join(dir_path)?;
        let client = &self.client;
        let href = &self.href;

        cached_listdir(&mut self.cache, dir_path, |dir_path| {
            let response = get(client, &dir_url)?;

            // A missing directory is listed as empty, like an empty bucket prefix.
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(vec![]);
            }

            let page = response
                .error_for_status()
                .and_then(Response::text)
                .map_err(|err| {
                    GoesDlError::runtime(format!("Unable to list '{}'", dir_url), err)
                })?;

            Ok(extract_links(href, &dir_url, &page)
                .iter()
                .map(|name| join_relative(dir_path, name))
                .collect())
        })
    }

    fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        let url = self.join(file_path)?;

        get(&self.client, &url)?
            .error_for_status()
            .and_then(Response::bytes)
            .map(|bytes| bytes.to_vec())
            .map_err(|err| {
                GoesDlError::runtime(format!("Unable to retrieve the file '{}'", file_path), err)
            })
    }
}

fn get(client: &Client, url: &Url) -> Result<Response> {
    client
        .get(url.clone())
        .send()
        .map_err(|err| GoesDlError::runtime(format!("Request to '{}' failed", url), err))
}

/**
 * Names of the entries directly inside `dir_url` linked from an index page.
 *
 * Links are resolved against the directory, so relative and absolute hrefs both work. Parent
 * links, sub-directories, sort links and anything pointing elsewhere are dropped.
 */
fn extract_links(href: &Regex, dir_url: &Url, page: &str) -> Vec<String> {
    let dir = dir_url.as_str();

    let mut names = vec![];
    for caps in href.captures_iter(page) {
        let link = match dir_url.join(&caps[1]) {
            Ok(link) => link,
            Err(_) => continue,
        };

        if link.query().is_some() || link.fragment().is_some() {
            continue;
        }

        let name = match link.as_str().strip_prefix(dir) {
            Some(name) if !name.is_empty() && !name.contains('/') => name,
            _ => continue,
        };

        if !names.iter().any(|n: &String| n == name) {
            names.push(name.to_owned());
        }
    }

    names
}
