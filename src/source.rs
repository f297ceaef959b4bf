//! schema sources
//!
//! the configured `schema` is either a path relative to the working root or
//! an http(s) url serving sdl text.

use crate::error::{Error, Result};
use reqwest::blocking::Client as BlockingClient;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

/// where schema sdl is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    File(PathBuf),
    Url(Url),
}

impl SchemaSource {
    /// classify a configured schema location
    pub fn resolve(schema: &str, root: &Path) -> Result<Self> {
        let schema = schema.trim();
        if schema.starts_with("http://") || schema.starts_with("https://") {
            return Ok(SchemaSource::Url(Url::parse(schema)?));
        }
        Ok(SchemaSource::File(root.join(schema)))
    }

    /// read the sdl text, sending `headers` with url fetches
    pub fn load(&self, headers: &BTreeMap<String, String>) -> Result<String> {
        match self {
            SchemaSource::File(path) => {
                tracing::debug!(path = %path.display(), "reading schema");
                std::fs::read_to_string(path).map_err(|err| Error::io(path, err))
            }
            SchemaSource::Url(url) => {
                tracing::debug!(url = %url, headers = headers.len(), "fetching schema");
                let response = BlockingClient::new()
                    .get(url.clone())
                    .headers(header_map(headers)?)
                    .send()?
                    .error_for_status()?;
                Ok(response.text()?)
            }
        }
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| Error::Config(format!("invalid schema header name {name}: {err}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| Error::Config(format!("invalid value for schema header {name}: {err}")))?;
        map.insert(name, value);
    }
    Ok(map)
}
