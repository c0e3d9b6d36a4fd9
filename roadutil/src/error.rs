use std::fmt;

/// Everything that can abort a run. Each variant corresponds to one failure domain; nothing in
/// the pipeline retries, so callers mostly just propagate these with `?`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Fetching a dataset or a basemap tile failed, or the server answered with something other
    /// than success.
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },
    /// An expected attribute or column is missing, or holds the wrong type.
    #[error("data schema error: {0}")]
    DataSchema(String),
    /// A CRS is missing, unknown, or a coordinate can't be transformed.
    #[error("coordinate system error: {0}")]
    CoordinateSystem(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The canvas couldn't be allocated or encoded.
    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn network<I: Into<String>, E: fmt::Display>(url: I, reason: E) -> Error {
        Error::Network {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn schema<I: Into<String>>(msg: I) -> Error {
        Error::DataSchema(msg.into())
    }

    pub fn crs<I: Into<String>>(msg: I) -> Error {
        Error::CoordinateSystem(msg.into())
    }

    pub fn render<I: Into<String>>(msg: I) -> Error {
        Error::Render(msg.into())
    }
}
