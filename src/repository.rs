use crate::error::{GoesDlError, Result};
use std::{
    fs::{create_dir_all, remove_file, File, OpenOptions},
    io::{self, Read, Write},
    path::{Component, Path, PathBuf},
};

/**
 * Write-once local store of downloaded files, mirroring the remote relative paths below a root
 * directory.
 *
 * There is no index; an item exists if its file does.
 */
#[derive(Clone, Debug)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    /// Open the repository at `root`, creating the directory if needed.
    pub fn new<P>(root: P) -> Result<Self>
    where
        P: Into<PathBuf>,
    {
        let root = root.into();
        create_dir_all(&root).map_err(|err| {
            GoesDlError::runtime(format!("Unable to create repository at {:?}", root), err)
        })?;

        log::info!("Connected to repository at: {:?}", &root);
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has_item(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Store `data` at `path`. Fails if the item is already present.
    pub fn add_item(&self, path: &str, data: &[u8]) -> Result<()> {
        let local_path = self.resolve(path)?;

        if let Some(parent) = local_path.parent() {
            create_dir_all(parent).map_err(|err| {
                GoesDlError::runtime(format!("Unable to create directory {:?}", parent), err)
            })?;
        }

        let f = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&local_path)
        {
            Ok(f) => f,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(GoesDlError::repository(format!(
                    "Item already exists in repository: '{}'",
                    path
                )));
            }
            Err(err) => {
                return Err(GoesDlError::runtime(
                    format!("Unable to create file {:?}", local_path),
                    err,
                ))
            }
        };

        write_or_remove(f, data, &local_path)?;

        log::debug!("Saved {:?}", local_path);
        Ok(())
    }

    /// The bytes stored at `path`, or `None` if there are none.
    pub fn get_item(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let local_path = match self.resolve(path) {
            Ok(local_path) => local_path,
            Err(_) => return Ok(None),
        };

        let mut f = match File::open(&local_path) {
            Ok(f) => f,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(GoesDlError::runtime(
                    format!("Unable to open file {:?}", local_path),
                    err,
                ))
            }
        };

        let mut data = vec![];
        f.read_to_end(&mut data).map_err(|err| {
            GoesDlError::runtime(format!("Error reading data from disk: {:?}", local_path), err)
        })?;

        Ok(Some(data))
    }

    /// Items are addressed by plain relative paths that stay inside the root.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        if path.is_empty() || !plain {
            return Err(GoesDlError::repository(format!(
                "Invalid repository path: '{}'",
                path
            )));
        }

        Ok(self.root.join(relative))
    }
}

/// Write `data` through `out`, removing the file at `local_path` if that fails so a truncated
/// item never looks present.
fn write_or_remove<W: Write>(mut out: W, data: &[u8], local_path: &Path) -> Result<()> {
    let written = out.write_all(data).and_then(|_| out.flush());
    drop(out);

    written.map_err(|err| {
        if let Err(rm_err) = remove_file(local_path) {
            log::error!("Error removing partial file: {:?} : {}", local_path, rm_err);
        }
        GoesDlError::runtime(format!("Error writing data to disk: {:?}", local_path), err)
    })
}
