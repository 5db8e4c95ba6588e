use std::time::{Duration, Instant};

use reqwest::header::{HeaderName, HeaderValue};
use tracing::{debug, info};

use super::request::RequestInput;
use super::response::HttpResponse;

pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, String> {
    let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::limited(10));
    if timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }
    builder
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {e}"))
}

pub async fn send_request(client: reqwest::Client, request: RequestInput) -> Result<HttpResponse, String> {
    let method: reqwest::Method = request.method.into();
    let url = reqwest::Url::parse(request.url.trim()).map_err(|e| format!("Invalid URL: {e}"))?;

    let mut req_builder = client.request(method, url);
    req_builder = apply_headers(req_builder, &request.headers)?;
    if let Some(token) = request.bearer_token.as_deref().filter(|token| !token.is_empty()) {
        req_builder = req_builder.bearer_auth(token);
    }

    let body = request.body.trim();
    if !body.is_empty() && request.method.allows_body() {
        req_builder = req_builder.body(body.to_string());
    }

    debug!(method = %request.method, url = %request.url, "sending request");
    let started = Instant::now();
    let response = req_builder
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;
    let elapsed = started.elapsed().as_millis();

    let status = response.status();
    let headers = format_headers(response.headers());
    let bytes = response
        .bytes()
        .await
        .map_err(|e| format!("Failed to read response: {e}"))?;
    info!(status = status.as_u16(), elapsed_ms = elapsed as u64, "request finished");

    Ok(HttpResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        duration_ms: elapsed,
        size_bytes: bytes.len(),
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

fn format_headers(headers: &reqwest::header::HeaderMap) -> String {
    let mut lines = Vec::new();
    for (name, value) in headers {
        let value = value.to_str().unwrap_or("<binary>");
        lines.push(format!("{name}: {value}"));
    }
    lines.join("\n")
}

pub fn parse_header_lines(headers: &str) -> Result<Vec<(String, String)>, String> {
    let mut pairs = Vec::new();

    for line in headers.lines() {
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }

        let (key, value) = raw
            .split_once(':')
            .ok_or_else(|| format!("Invalid header format: {raw}"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("Header key is empty: {raw}"));
        }
        pairs.push((key.to_string(), value.trim().to_string()));
    }

    Ok(pairs)
}

fn apply_headers(
    mut req_builder: reqwest::RequestBuilder,
    headers: &str,
) -> Result<reqwest::RequestBuilder, String> {
    for (key, value) in parse_header_lines(headers)? {
        let header_name =
            HeaderName::from_bytes(key.as_bytes()).map_err(|e| format!("Invalid header key `{key}`: {e}"))?;
        let header_value =
            HeaderValue::from_str(&value).map_err(|e| format!("Invalid header value `{value}`: {e}"))?;
        req_builder = req_builder.header(header_name, header_value);
    }

    Ok(req_builder)
}
