// Request descriptors
//
// Endpoints describe what they want as data: a verb (with its payload),
// path segments relative to the API root, and ordered query parameters.
// `ApiRequest::url` serializes that once against the base URL, so no
// endpoint ever concatenates query strings by hand.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use url::Url;

use crate::error::Error;

/// One named file in a multipart form.
///
/// The form field name and the file name are the same string, which is
/// what the REST service keys uploaded experiment files on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub name: String,
    pub content: Bytes,
}

impl FilePart {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Encode `value` as a JSON document part.
    pub fn json(name: impl Into<String>, value: &impl Serialize) -> Result<Self, Error> {
        let content = serde_json::to_vec(value).map_err(Error::Serialization)?;
        Ok(Self::new(name, content))
    }

    /// Read a local file; the part is named after the file's base name.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", path.display()),
                )
            })?;
        let content = std::fs::read(path)?;
        Ok(Self::new(name, content))
    }
}

/// HTTP verb together with the payload it carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Verb {
    Get,
    /// POST with a JSON-encoded body.
    Post(serde_json::Value),
    /// POST with a `multipart/form-data` body.
    Multipart(Vec<FilePart>),
    Delete,
}

impl Verb {
    /// Wire method name.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post(_) | Self::Multipart(_) => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Multipart(_) => f.write_str("POST (multipart)"),
            other => f.write_str(other.method()),
        }
    }
}

/// A relative REST call: verb + path segments + query.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    verb: Verb,
    segments: Vec<String>,
    query: Vec<(String, Option<String>)>,
}

impl ApiRequest {
    pub fn new(verb: Verb, resource: &str) -> Self {
        Self {
            verb,
            segments: vec![resource.to_owned()],
            query: Vec::new(),
        }
    }

    pub fn get(resource: &str) -> Self {
        Self::new(Verb::Get, resource)
    }

    pub fn delete(resource: &str) -> Self {
        Self::new(Verb::Delete, resource)
    }

    pub fn post(resource: &str, body: serde_json::Value) -> Self {
        Self::new(Verb::Post(body), resource)
    }

    pub fn multipart(resource: &str, parts: Vec<FilePart>) -> Self {
        Self::new(Verb::Multipart(parts), resource)
    }

    /// Append one path segment. Reserved characters are percent-encoded.
    #[must_use]
    pub fn segment(mut self, segment: impl fmt::Display) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Append a key-only query flag (`?sites`, `?resources`).
    #[must_use]
    pub fn flag(mut self, key: &str) -> Self {
        self.query.push((key.to_owned(), None));
        self
    }

    /// Append a `key=value` query parameter.
    #[must_use]
    pub fn param(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.query.push((key.to_owned(), Some(value.to_string())));
        self
    }

    pub fn verb(&self) -> &Verb {
        &self.verb
    }

    pub fn into_verb(self) -> Verb {
        self.verb
    }

    /// Resolve against `base`, keeping the base path as a prefix.
    ///
    /// `https://host/rest/` + `experiments/42?state` gives
    /// `https://host/rest/experiments/42?state`.
    pub fn url(&self, base: &Url) -> Result<Url, Error> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut path = url.path_segments_mut().map_err(|()| Error::InvalidBaseUrl {
                url: base.to_string(),
            })?;
            path.pop_if_empty().extend(&self.segments);
        }
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                match value {
                    Some(value) => pairs.append_pair(key, value),
                    None => pairs.append_key_only(key),
                };
            }
        }
        Ok(url)
    }
}

/// Parse and validate an API root URL.
///
/// The result always ends in `/` so it reads as a directory.
pub fn parse_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidBaseUrl { url: raw.to_owned() });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
