use crate::auth::UserProfile;
use crate::samples::SampleQuery;
use crate::status::{MessageType, Status, StatusValue};

use super::{tokens, version_from_path, Query, SampleBody};

/// Build the executable request for a catalog sample.
///
/// The version comes from the first segment of `request_url`, profile tokens
/// are substituted in the URL and body, and a body that parses as JSON is
/// kept structured. Deterministic for a given input.
pub fn from_sample(sample: &SampleQuery, profile: Option<&UserProfile>, graph_url: &str) -> Query {
    let selected_version = version_from_path(&sample.request_url).unwrap_or_default();
    let sample_url = format!("{}{}", graph_url.trim_end_matches('/'), sample.request_url);

    let sample_body = sample
        .post_body
        .as_deref()
        .filter(|body| !body.is_empty())
        .map(|body| SampleBody::parse(&tokens::substitute(body, profile)));

    Query {
        selected_verb: sample.method,
        selected_version,
        sample_url: tokens::substitute(&sample_url, profile),
        sample_headers: sample.headers.clone(),
        sample_body,
    }
}

/// The advisory status shown when a sample carries a tip.
pub fn tip_status(sample: &SampleQuery) -> Option<Status> {
    let tip = sample.tip.as_deref()?.trim();
    if tip.is_empty() {
        return None;
    }
    Some(Status {
        message_type: MessageType::Warning,
        status_text: "Tip".to_string(),
        status: StatusValue::Text(tip.to_string()),
        duration_ms: None,
        hint: None,
    })
}
