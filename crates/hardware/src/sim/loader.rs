//! Configuration and Trace Loading.
//!
//! Both files are JSON. A trace is either a bare array of requests or an
//! object with a `requests` array:
//!
//! ```json
//! { "requests": [ { "id": 0, "addr": 64 }, { "id": 1, "addr": 128 } ] }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::common::{Request, SimError};
use crate::config::Config;

#[derive(Deserialize)]
#[serde(untagged)]
enum TraceFile {
    Bare(Vec<Request>),
    Wrapped { requests: Vec<Request> },
}

impl TraceFile {
    fn into_requests(self) -> Vec<Request> {
        match self {
            Self::Bare(requests) | Self::Wrapped { requests } => requests,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SimError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and validates a configuration file. Missing fields take their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, SimError> {
    let path = path.as_ref();
    let config: Config = read_json(path)?;
    config.validate()?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Reads a request trace.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<Request>, SimError> {
    let path = path.as_ref();
    let requests = read_json::<TraceFile>(path)?.into_requests();
    debug!(path = %path.display(), requests = requests.len(), "loaded trace");
    Ok(requests)
}

/// Parses a trace from an in-memory JSON string.
pub fn parse_trace(json: &str) -> Result<Vec<Request>, serde_json::Error> {
    serde_json::from_str::<TraceFile>(json).map(TraceFile::into_requests)
}
