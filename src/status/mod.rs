//! # Status Messages
//!
//! The shared banner that reports request outcomes, tips and failures.
//! Status text may embed URLs; those become link segments, and links into the
//! Graph API load a new query instead of leaving the app.

use std::fmt::{self, Display};
use std::sync::LazyLock;

use regex::Regex;

use crate::http::method::HttpMethod;
use crate::query::{version_from_url, Query};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bhttps?://\S+").expect("URL pattern is a valid regex")
});

static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\d+").expect("placeholder pattern is a valid regex")
});

const CONSENT_GUIDANCE: &str =
    "Consent to the scopes required for this query on the Modify permissions tab.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Warning,
    Error,
}

/// Either an HTTP status code or free text such as a tip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusValue {
    Code(u16),
    Text(String),
}

impl Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusValue::Code(code) => write!(f, "{code}"),
            StatusValue::Text(text) => write!(f, "{text}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message_type: MessageType,
    pub status_text: String,
    pub status: StatusValue,
    pub duration_ms: Option<u128>,
    pub hint: Option<String>,
}

impl Status {
    pub fn error(status_text: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::Error,
            status_text: status_text.into(),
            status: StatusValue::Text(message.into()),
            duration_ms: None,
            hint: None,
        }
    }

    pub fn info(status_text: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::Info,
            ..Self::error(status_text, message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Load the URL into the request bar as a GET query.
    LoadQuery,
    OpenExternal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSegment {
    Text(String),
    Link { url: String, action: LinkAction },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStatus {
    pub message_type: MessageType,
    pub segments: Vec<StatusSegment>,
    pub hint: Option<String>,
}

/// URLs in `message`, each paired with the `$n` placeholder that stands for
/// it after [`replace_links`]. `None` when the message has no URL.
pub fn extract_links(message: &str) -> Option<Vec<(String, String)>> {
    let links: Vec<(String, String)> = URL_PATTERN
        .find_iter(message)
        .enumerate()
        .map(|(index, found)| (format!("${index}"), found.as_str().to_string()))
        .collect();
    if links.is_empty() { None } else { Some(links) }
}

pub fn replace_links(message: &str) -> String {
    let mut index = 0;
    URL_PATTERN
        .replace_all(message, |_: &regex::Captures<'_>| {
            let placeholder = format!("${index}");
            index += 1;
            placeholder
        })
        .into_owned()
}

/// Split a placeholder message into text and link segments.
pub fn render(message: &str, links: &[(String, String)], graph_url: &str) -> Vec<StatusSegment> {
    if links.is_empty() {
        return vec![StatusSegment::Text(message.to_string())];
    }

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in PLACEHOLDER_PATTERN.find_iter(message) {
        let Some((_, url)) = links.iter().find(|(placeholder, _)| placeholder == found.as_str()) else {
            continue;
        };
        if found.start() > cursor {
            segments.push(StatusSegment::Text(message[cursor..found.start()].to_string()));
        }
        let action = if url.contains(graph_url) {
            LinkAction::LoadQuery
        } else {
            LinkAction::OpenExternal
        };
        segments.push(StatusSegment::Link {
            url: url.clone(),
            action,
        });
        cursor = found.end();
    }
    if cursor < message.len() {
        segments.push(StatusSegment::Text(message[cursor..].to_string()));
    }
    segments
}

pub fn render_status(status: &Status, graph_url: &str) -> RenderedStatus {
    let raw = status.status.to_string();
    let mut segments = vec![StatusSegment::Text(format!("{} - ", status.status_text))];

    match extract_links(&raw) {
        Some(links) => segments.extend(render(&replace_links(&raw), &links, graph_url)),
        None => segments.push(StatusSegment::Text(raw)),
    }

    if let Some(duration) = status.duration_ms {
        segments.push(StatusSegment::Text(format!(" - {duration} ms")));
    }
    if status.status == StatusValue::Code(403) {
        segments.push(StatusSegment::Text(format!(". {CONSENT_GUIDANCE}")));
    }

    RenderedStatus {
        message_type: status.message_type,
        segments,
        hint: status.hint.clone(),
    }
}

/// The current query re-pointed at a link from a status message. The version
/// follows the link; a link without one keeps the current version.
pub fn query_from_link(current: &Query, link: &str, graph_url: &str) -> Query {
    let sample_url = link.trim_end_matches('.').to_string();
    let selected_version = version_from_url(&sample_url, graph_url)
        .unwrap_or_else(|| current.selected_version.clone());
    Query {
        sample_url,
        selected_version,
        selected_verb: HttpMethod::Get,
        ..current.clone()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const GRAPH_URL: &str = "https://graph.microsoft.com";

    fn code_status(code: u16) -> Status {
        Status {
            message_type: MessageType::Error,
            status_text: "Forbidden".into(),
            status: StatusValue::Code(code),
            duration_ms: Some(120),
            hint: None,
        }
    }

    #[test]
    fn extracts_links_in_order() {
        let links = extract_links("See https://a.example/x and http://b.example/y.").unwrap();
        assert_eq!(
            links,
            vec![
                ("$0".to_string(), "https://a.example/x".to_string()),
                ("$1".to_string(), "http://b.example/y.".to_string()),
            ]
        );
        assert_eq!(extract_links("no links here"), None);
    }

    #[test]
    fn replaces_links_with_placeholders() {
        assert_eq!(
            replace_links("Go to https://a.example/x or https://b.example"),
            "Go to $0 or $1"
        );
    }

    #[test]
    fn graph_links_load_queries_and_others_open_externally() {
        let message = "Use https://graph.microsoft.com/v1.0/me or read https://learn.microsoft.com/graph";
        let links = extract_links(message).unwrap();
        let segments = render(&replace_links(message), &links, GRAPH_URL);
        assert_eq!(
            segments,
            vec![
                StatusSegment::Text("Use ".into()),
                StatusSegment::Link {
                    url: "https://graph.microsoft.com/v1.0/me".into(),
                    action: LinkAction::LoadQuery,
                },
                StatusSegment::Text(" or read ".into()),
                StatusSegment::Link {
                    url: "https://learn.microsoft.com/graph".into(),
                    action: LinkAction::OpenExternal,
                },
            ]
        );
    }

    #[test]
    fn forbidden_status_adds_consent_guidance() {
        let rendered = render_status(&code_status(403), GRAPH_URL);
        assert_eq!(
            rendered.segments,
            vec![
                StatusSegment::Text("Forbidden - ".into()),
                StatusSegment::Text("403".into()),
                StatusSegment::Text(" - 120 ms".into()),
                StatusSegment::Text(format!(". {CONSENT_GUIDANCE}")),
            ]
        );
    }

    #[test]
    fn other_codes_have_no_guidance() {
        let rendered = render_status(&code_status(500), GRAPH_URL);
        assert!(!rendered
            .segments
            .iter()
            .any(|segment| matches!(segment, StatusSegment::Text(text) if text.contains(CONSENT_GUIDANCE))));
    }

    #[test]
    fn tip_text_with_link_is_rendered_as_segments() {
        let status = Status {
            message_type: MessageType::Warning,
            status_text: "Tip".into(),
            status: StatusValue::Text("Try https://graph.microsoft.com/beta/me.".into()),
            duration_ms: None,
            hint: Some("Beta APIs may change.".into()),
        };
        let rendered = render_status(&status, GRAPH_URL);
        assert_eq!(rendered.hint.as_deref(), Some("Beta APIs may change."));
        assert!(rendered.segments.contains(&StatusSegment::Link {
            url: "https://graph.microsoft.com/beta/me.".into(),
            action: LinkAction::LoadQuery,
        }));
    }

    #[test]
    fn link_becomes_get_query_without_trailing_period() {
        let current = Query::get("https://graph.microsoft.com/v1.0/me", GRAPH_URL);
        let mut posting = current.clone();
        posting.selected_verb = HttpMethod::Post;
        let query = query_from_link(&posting, "https://graph.microsoft.com/v1.0/me/events.", GRAPH_URL);
        assert_eq!(query.sample_url, "https://graph.microsoft.com/v1.0/me/events");
        assert_eq!(query.selected_verb, HttpMethod::Get);
    }

    #[test]
    fn link_version_replaces_the_current_one() {
        let current = Query::get("https://graph.microsoft.com/v1.0/me", GRAPH_URL);
        let query = query_from_link(&current, "https://graph.microsoft.com/beta/me/events", GRAPH_URL);
        assert_eq!(query.selected_version, "beta");

        let unversioned = query_from_link(&current, "https://graph.microsoft.com", GRAPH_URL);
        assert_eq!(unversioned.selected_version, "v1.0");
    }
}
