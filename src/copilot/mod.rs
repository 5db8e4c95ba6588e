//! # Copilot
//!
//! Sends a natural-language request to the copilot backend and turns the
//! literal API description it answers with into a [`Query`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::http::cancel::until_cancelled;
use crate::query::free_text::{parse_free_text, FreeTextError};
use crate::query::Query;

#[derive(Debug, Serialize)]
struct CopilotRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct CopilotResponse {
    #[serde(rename = "API")]
    api: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CopilotError {
    #[error("type a question for the copilot first")]
    EmptyQuery,
    #[error("copilot request failed: {0}")]
    Transport(String),
    #[error("copilot responded with HTTP {0}")]
    Status(u16),
    #[error("copilot response was not understood: {0}")]
    InvalidResponse(String),
    #[error("copilot suggestion could not be parsed: {0}")]
    Parse(#[from] FreeTextError),
}

pub async fn submit(
    client: reqwest::Client,
    endpoint: String,
    text: String,
    graph_url: String,
) -> Result<Query, CopilotError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CopilotError::EmptyQuery);
    }

    debug!(%endpoint, "submitting copilot query");
    let response = client
        .post(&endpoint)
        .json(&CopilotRequest { query: text })
        .send()
        .await
        .map_err(|e| CopilotError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        warn!(status = status.as_u16(), "copilot request rejected");
        return Err(CopilotError::Status(status.as_u16()));
    }

    let body = response
        .json::<CopilotResponse>()
        .await
        .map_err(|e| CopilotError::InvalidResponse(e.to_string()))?;
    Ok(parse_free_text(&body.api, &graph_url)?)
}

/// [`submit`] bound to a cancellation token; `None` once cancelled.
pub async fn submit_cancellable(
    client: reqwest::Client,
    endpoint: String,
    text: String,
    graph_url: String,
    mut cancel_rx: broadcast::Receiver<()>,
) -> Option<Result<Query, CopilotError>> {
    until_cancelled(submit(client, endpoint, text, graph_url), &mut cancel_rx).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::cancel::CancelRegistry;
    use crate::http::method::HttpMethod;
    use crate::query::{Header, SampleBody};

    const GRAPH_URL: &str = "https://graph.microsoft.com";

    async fn server_answering(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/copilot/queries"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    fn endpoint(server: &MockServer) -> String {
        format!("{}/copilot/queries", server.uri())
    }

    #[tokio::test]
    async fn turns_the_answer_into_a_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/copilot/queries"))
            .and(body_json(serde_json::json!({ "query": "create a notebook" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "API": "\nPOST https://graph.microsoft.com/v1.0/me/onenote/notebooks\nContent-Type: application/json\nAuthorization: Bearer {access-token}\n\n{\n  \"displayName\": \"testingNotebook\"\n}"
            })))
            .mount(&server)
            .await;

        let query = submit(
            reqwest::Client::new(),
            endpoint(&server),
            "  create a notebook ".into(),
            GRAPH_URL.into(),
        )
        .await
        .unwrap();
        assert_eq!(query.selected_verb, HttpMethod::Post);
        assert_eq!(query.selected_version, "v1.0");
        assert_eq!(query.sample_headers, vec![Header::new("Content-Type", "application/json")]);
        assert_eq!(
            query.sample_body,
            Some(SampleBody::Json(serde_json::json!({ "displayName": "testingNotebook" })))
        );
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = server_answering(ResponseTemplate::new(502)).await;
        let result = submit(reqwest::Client::new(), endpoint(&server), "lists".into(), GRAPH_URL.into()).await;
        assert_eq!(result, Err(CopilotError::Status(502)));
    }

    #[tokio::test]
    async fn unparseable_suggestion_is_reported() {
        let server = server_answering(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "API": "I am not sure." })),
        )
        .await;
        let result = submit(reqwest::Client::new(), endpoint(&server), "lists".into(), GRAPH_URL.into()).await;
        assert!(matches!(result, Err(CopilotError::Parse(_))));
    }

    #[tokio::test]
    async fn missing_field_is_an_invalid_response() {
        let server = server_answering(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "answer": "GET /v1.0/me" })),
        )
        .await;
        let result = submit(reqwest::Client::new(), endpoint(&server), "me".into(), GRAPH_URL.into()).await;
        assert!(matches!(result, Err(CopilotError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn blank_question_is_not_sent() {
        let result = submit(
            reqwest::Client::new(),
            "http://127.0.0.1:9/unused".into(),
            "   ".into(),
            GRAPH_URL.into(),
        )
        .await;
        assert_eq!(result, Err(CopilotError::EmptyQuery));
    }

    #[tokio::test]
    async fn cancelled_submission_yields_nothing() {
        let server = server_answering(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(serde_json::json!({ "API": "GET https://graph.microsoft.com/v1.0/me" })),
        )
        .await;

        let registry = CancelRegistry::new();
        let rx = registry.register("first");
        registry.cancel("first");
        let outcome = submit_cancellable(
            reqwest::Client::new(),
            endpoint(&server),
            "me".into(),
            GRAPH_URL.into(),
            rx,
        )
        .await;
        assert_eq!(outcome, None);
    }
}
