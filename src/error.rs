use std::error::Error;

/// Boxed cause carried by runtime failures.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, GoesDlError>;

#[derive(Debug, thiserror::Error)]
pub enum GoesDlError {
    /// Invalid product parameter, unsupported datasource or version, tolerance out of bounds,
    /// unreachable backend root.
    #[error("{0}")]
    Config(String),

    /// Missing or malformed timestamps, filenames without exactly one timestamp field.
    #[error("{0}")]
    Input(String),

    /// A file or listing could not be retrieved or stored.
    #[error("{message}: {source}")]
    Runtime {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("{0}")]
    Cache(String),

    #[error("{0}")]
    Repository(String),
}

impl GoesDlError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        GoesDlError::Config(message.into())
    }

    pub(crate) fn input(message: impl Into<String>) -> Self {
        GoesDlError::Input(message.into())
    }

    pub(crate) fn runtime<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        GoesDlError::Runtime {
            message: message.into(),
            source: source.into(),
        }
    }

    pub(crate) fn cache(message: impl Into<String>) -> Self {
        GoesDlError::Cache(message.into())
    }

    pub(crate) fn repository(message: impl Into<String>) -> Self {
        GoesDlError::Repository(message.into())
    }
}
