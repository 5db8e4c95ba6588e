//! # Sample Queries
//!
//! The catalog of pre-built requests shown in the sidebar, its keyword
//! search, and retrieval from the DevX API with a bundled fallback.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::http::method::HttpMethod;
use crate::query::Header;

const CACHED_SAMPLES: &str = include_str!("default_samples.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleQuery {
    #[serde(default)]
    pub id: Option<String>,
    pub category: String,
    pub method: HttpMethod,
    pub human_name: String,
    pub request_url: String,
    #[serde(default)]
    pub doc_link: String,
    #[serde(default)]
    pub post_body: Option<String>,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub tip: Option<String>,
    #[serde(default)]
    pub skip_test: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SamplesResponse {
    sample_queries: Vec<SampleQuery>,
}

/// A loaded catalog. `cached` is set when the bundled copy is shown because
/// the live catalog could not be fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleCatalog {
    pub queries: Vec<SampleQuery>,
    pub cached: bool,
}

/// Samples whose display name contains `keyword`, ignoring case. A blank
/// keyword returns the whole catalog in its original order.
pub fn search(catalog: &[SampleQuery], keyword: &str) -> Vec<SampleQuery> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return catalog.to_vec();
    }

    catalog
        .iter()
        .filter(|query| query.human_name.to_lowercase().contains(&keyword))
        .cloned()
        .collect()
}

/// Stable sort by category so that grouping sees contiguous runs.
pub fn sort_by_category(queries: &mut [SampleQuery]) {
    queries.sort_by(|a, b| a.category.cmp(&b.category));
}

/// Anonymous users may only run GET samples.
pub fn should_run_query(method: HttpMethod, authenticated: bool) -> bool {
    authenticated || method == HttpMethod::Get
}

pub fn cached_catalog() -> Vec<SampleQuery> {
    let mut queries = match serde_json::from_str::<SamplesResponse>(CACHED_SAMPLES) {
        Ok(response) => response.sample_queries,
        Err(err) => {
            warn!(error = %err, "bundled sample catalog is invalid");
            Vec::new()
        }
    };
    sort_by_category(&mut queries);
    queries
}

pub async fn fetch_samples(client: reqwest::Client, url: String) -> SampleCatalog {
    match fetch_live(&client, &url).await {
        Ok(mut queries) => {
            sort_by_category(&mut queries);
            info!(count = queries.len(), "loaded sample catalog");
            SampleCatalog {
                queries,
                cached: false,
            }
        }
        Err(err) => {
            warn!(%url, error = %err, "falling back to cached sample catalog");
            SampleCatalog {
                queries: cached_catalog(),
                cached: true,
            }
        }
    }
}

async fn fetch_live(client: &reqwest::Client, url: &str) -> Result<Vec<SampleQuery>, String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("Unexpected status {status}"));
    }
    let body = response
        .json::<SamplesResponse>()
        .await
        .map_err(|e| format!("Failed to parse samples: {e}"))?;
    Ok(body.sample_queries)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn blank_keyword_returns_catalog_unchanged() {
        let catalog = cached_catalog();
        assert_eq!(search(&catalog, ""), catalog);
        assert_eq!(search(&catalog, "   "), catalog);
    }

    #[test]
    fn search_matches_display_name_ignoring_case() {
        let catalog = cached_catalog();
        let results = search(&catalog, "MY");
        assert!(!results.is_empty());
        assert!(results.iter().all(|query| query.human_name.to_lowercase().contains("my")));
        assert!(results.iter().all(|query| catalog.contains(query)));
    }

    #[test]
    fn search_preserves_relative_order() {
        let catalog = cached_catalog();
        let results = search(&catalog, "group");
        let positions: Vec<usize> = results
            .iter()
            .map(|query| catalog.iter().position(|item| item == query).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn search_without_matches_is_empty() {
        assert!(search(&cached_catalog(), "no such sample").is_empty());
    }

    #[test]
    fn locked_samples_require_sign_in() {
        assert!(should_run_query(HttpMethod::Get, false));
        assert!(!should_run_query(HttpMethod::Post, false));
        assert!(should_run_query(HttpMethod::Delete, true));
    }

    #[test]
    fn cached_catalog_is_sorted_by_category() {
        let catalog = cached_catalog();
        assert!(catalog.windows(2).all(|pair| pair[0].category <= pair[1].category));
    }

    #[tokio::test]
    async fn fetches_live_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/samples"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sampleQueries": [
                    { "category": "Users", "method": "GET", "humanName": "all users", "requestUrl": "/v1.0/users" },
                    { "category": "Groups", "method": "GET", "humanName": "all groups", "requestUrl": "/v1.0/groups" }
                ]
            })))
            .mount(&server)
            .await;

        let catalog = fetch_samples(reqwest::Client::new(), format!("{}/samples", server.uri())).await;
        assert!(!catalog.cached);
        assert_eq!(catalog.queries[0].category, "Groups");
        assert_eq!(catalog.queries[1].human_name, "all users");
    }

    #[tokio::test]
    async fn falls_back_to_cached_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let catalog = fetch_samples(reqwest::Client::new(), format!("{}/samples", server.uri())).await;
        assert!(catalog.cached);
        assert_eq!(catalog.queries, cached_catalog());
    }
}
