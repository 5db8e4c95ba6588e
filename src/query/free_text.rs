//! Parser for the literal request descriptions returned by the copilot
//! backend:
//!
//! ```text
//! <VERB> <URL>
//! <Name>: <Value>
//! ...
//!
//! <body>
//! ```

use reqwest::header::HeaderName;
use thiserror::Error;

use crate::http::method::HttpMethod;

use super::{version_from_url, Header, Query, SampleBody};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FreeTextError {
    #[error("the response did not contain a request description")]
    Empty,
    #[error("request line `{0}` has no URL")]
    MissingUrl(String),
    #[error("unsupported HTTP method `{0}`")]
    UnknownMethod(String),
    #[error("malformed header line `{0}`")]
    MalformedHeader(String),
    #[error("no API version in URL `{0}`")]
    MissingVersion(String),
}

pub fn parse_free_text(raw: &str, graph_url: &str) -> Result<Query, FreeTextError> {
    let mut lines = raw.lines().skip_while(|line| line.trim().is_empty());

    let request_line = lines.next().map(str::trim).ok_or(FreeTextError::Empty)?;
    let (verb, url) = request_line
        .split_once(char::is_whitespace)
        .map(|(verb, url)| (verb, url.trim()))
        .filter(|(_, url)| !url.is_empty())
        .ok_or_else(|| FreeTextError::MissingUrl(request_line.to_string()))?;
    let selected_verb: HttpMethod = verb
        .parse()
        .map_err(|_| FreeTextError::UnknownMethod(verb.to_string()))?;
    let selected_version = version_from_url(url, graph_url)
        .ok_or_else(|| FreeTextError::MissingVersion(url.to_string()))?;

    let mut sample_headers = Vec::new();
    for line in lines.by_ref() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .map(|(name, value)| (name.trim(), value))
            .filter(|(name, _)| HeaderName::from_bytes(name.as_bytes()).is_ok())
            .ok_or_else(|| FreeTextError::MalformedHeader(line.to_string()))?;
        // The backend echoes a placeholder token; requests carry the signed-in one.
        if name.eq_ignore_ascii_case("authorization") {
            continue;
        }
        sample_headers.push(Header::new(name, value.trim()));
    }

    let body = lines.collect::<Vec<_>>().join("\n");
    let body = body.trim();
    let sample_body = if body.is_empty() {
        None
    } else {
        Some(SampleBody::parse(body))
    };

    let sample_url = if url.starts_with('/') {
        format!("{}{url}", graph_url.trim_end_matches('/'))
    } else {
        url.to_string()
    };

    Ok(Query {
        selected_verb,
        selected_version,
        sample_url,
        sample_headers,
        sample_body,
    })
}
