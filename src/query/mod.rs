//! Executable requests and the pipelines that build them.
//!
//! A [`Query`] is what the request bar shows and what gets sent. It is built
//! either from a catalog sample (`sample`) or from a backend-authored
//! free-text description (`free_text`), with profile tokens substituted by
//! `tokens`.

pub mod free_text;
pub mod sample;
pub mod tokens;

use serde::{Deserialize, Serialize};

use crate::http::method::HttpMethod;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A request body: structured when the text was valid JSON, raw otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SampleBody {
    Json(serde_json::Value),
    Raw(String),
}

impl SampleBody {
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => SampleBody::Json(value),
            Err(_) => SampleBody::Raw(raw.to_string()),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            SampleBody::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            SampleBody::Raw(raw) => raw.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub selected_verb: HttpMethod,
    pub selected_version: String,
    pub sample_url: String,
    pub sample_headers: Vec<Header>,
    pub sample_body: Option<SampleBody>,
}

impl Query {
    pub fn get(url: impl Into<String>, graph_url: &str) -> Self {
        let sample_url = url.into();
        let selected_version = version_from_url(&sample_url, graph_url).unwrap_or_default();
        Self {
            selected_verb: HttpMethod::Get,
            selected_version,
            sample_url,
            sample_headers: Vec::new(),
            sample_body: None,
        }
    }

    pub fn headers_text(&self) -> String {
        self.sample_headers
            .iter()
            .map(|header| format!("{}: {}", header.name, header.value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn body_text(&self) -> String {
        self.sample_body.as_ref().map(SampleBody::to_text).unwrap_or_default()
    }
}

/// The first segment of a request path: `/v1.0/me` yields `v1.0`.
pub fn version_from_path(path: &str) -> Option<String> {
    let trimmed = path.trim().trim_start_matches('/');
    let segment = trimmed
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}

/// Version segment of an absolute or relative request URL.
pub fn version_from_url(url: &str, graph_url: &str) -> Option<String> {
    let url = url.trim();
    if let Some(path) = url.strip_prefix(graph_url.trim_end_matches('/')) {
        return version_from_path(path);
    }
    if url.starts_with('/') {
        return version_from_path(url);
    }
    let parsed = reqwest::Url::parse(url).ok()?;
    version_from_path(parsed.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_the_first_path_segment() {
        assert_eq!(version_from_path("/v1.0/me").as_deref(), Some("v1.0"));
        assert_eq!(version_from_path("/beta/me/events?$top=5").as_deref(), Some("beta"));
        assert_eq!(version_from_path("/"), None);
    }

    #[test]
    fn version_from_absolute_url() {
        let graph = "https://graph.microsoft.com";
        assert_eq!(
            version_from_url("https://graph.microsoft.com/v1.0/me", graph).as_deref(),
            Some("v1.0")
        );
        assert_eq!(
            version_from_url("https://api.example/beta/users", graph).as_deref(),
            Some("beta")
        );
        assert_eq!(version_from_url("https://api.example", graph), None);
    }

    #[test]
    fn body_keeps_raw_text_when_not_json() {
        assert_eq!(SampleBody::parse("not json"), SampleBody::Raw("not json".into()));
        assert_eq!(
            SampleBody::parse("{\"a\": 1}"),
            SampleBody::Json(serde_json::json!({ "a": 1 }))
        );
    }
}
