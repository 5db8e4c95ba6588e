//! # Authentication
//!
//! Holds the signed-in access token, the scopes it grants and the profile of
//! the user it belongs to. Interactive sign-in is not performed here: a token
//! obtained elsewhere is pasted into the app and inspected locally.

use std::collections::HashSet;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::CacheLocation;
use crate::storage::{LocalStore, StorageError};

const ACCESS_TOKEN_KEY: &str = "ACCESS_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("access token is not a JWT")]
    MalformedToken,
    #[error("access token payload could not be decoded: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub mail: Option<String>,
    pub user_principal_name: String,
}

/// A bearer token together with the scopes consented for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    token: String,
    scopes: HashSet<String>,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    scp: Option<String>,
}

impl AuthToken {
    /// Accept a raw access token, reading its `scp` claim.
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let token = raw.trim().trim_start_matches("Bearer ").trim().to_string();
        let payload = token.split('.').nth(1).ok_or(AuthError::MalformedToken)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| AuthError::InvalidPayload(e.to_string()))?;
        let claims: TokenClaims =
            serde_json::from_slice(&bytes).map_err(|e| AuthError::InvalidPayload(e.to_string()))?;

        let scopes = claims
            .scp
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        Ok(Self { token, scopes })
    }

    pub fn secret(&self) -> &str {
        &self.token
    }

    pub fn consented_scopes(&self) -> &HashSet<String> {
        &self.scopes
    }
}

/// Keep the token for the next session, or drop any kept one when the cache
/// is per session.
pub fn save_token(
    store: &LocalStore,
    location: CacheLocation,
    token: &AuthToken,
) -> Result<(), StorageError> {
    match location {
        CacheLocation::LocalStore => store.set_item(ACCESS_TOKEN_KEY, token.secret()),
        CacheLocation::Session => clear_token(store),
    }
}

/// The token kept by an earlier session. A kept token that no longer parses
/// is removed.
pub fn restore_token(
    store: &LocalStore,
    location: CacheLocation,
) -> Result<Option<AuthToken>, StorageError> {
    if location == CacheLocation::Session {
        clear_token(store)?;
        return Ok(None);
    }
    let Some(raw) = store.get_item(ACCESS_TOKEN_KEY)? else {
        return Ok(None);
    };
    match AuthToken::parse(&raw) {
        Ok(token) => Ok(Some(token)),
        Err(err) => {
            warn!(error = %err, "discarding unreadable stored token");
            clear_token(store)?;
            Ok(None)
        }
    }
}

pub fn clear_token(store: &LocalStore) -> Result<(), StorageError> {
    store.remove_item(ACCESS_TOKEN_KEY)
}

pub async fn fetch_profile(
    client: reqwest::Client,
    graph_url: String,
    token: String,
) -> Result<UserProfile, String> {
    let url = format!("{}/v1.0/me", graph_url.trim_end_matches('/'));
    let response = client
        .get(&url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| format!("Failed to load profile: {e}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("Failed to load profile: {status}"));
    }

    response
        .json::<UserProfile>()
        .await
        .map_err(|e| format!("Failed to parse profile: {e}"))
}

#[cfg(test)]
pub(crate) fn test_token(scopes: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({ "scp": scopes }).to_string());
    format!("{header}.{payload}.signature")
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn token_survives_in_the_local_store() {
        let store = LocalStore::open_in_memory().unwrap();
        let token = AuthToken::parse(&test_token("User.Read")).unwrap();

        save_token(&store, CacheLocation::LocalStore, &token).unwrap();
        let restored = restore_token(&store, CacheLocation::LocalStore).unwrap();
        assert_eq!(restored, Some(token));

        clear_token(&store).unwrap();
        assert_eq!(restore_token(&store, CacheLocation::LocalStore).unwrap(), None);
    }

    #[test]
    fn session_cache_keeps_nothing() {
        let store = LocalStore::open_in_memory().unwrap();
        let token = AuthToken::parse(&test_token("User.Read")).unwrap();

        save_token(&store, CacheLocation::LocalStore, &token).unwrap();
        save_token(&store, CacheLocation::Session, &token).unwrap();
        assert_eq!(store.get_item(ACCESS_TOKEN_KEY).unwrap(), None);

        store.set_item(ACCESS_TOKEN_KEY, token.secret()).unwrap();
        assert_eq!(restore_token(&store, CacheLocation::Session).unwrap(), None);
        assert_eq!(store.get_item(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn unreadable_stored_token_is_dropped() {
        let store = LocalStore::open_in_memory().unwrap();
        store.set_item(ACCESS_TOKEN_KEY, "not-a-jwt").unwrap();
        assert_eq!(restore_token(&store, CacheLocation::LocalStore).unwrap(), None);
        assert_eq!(store.get_item(ACCESS_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn reads_scopes_from_token() {
        let token = AuthToken::parse(&test_token("User.Read Mail.Read openid")).unwrap();
        let scopes = token.consented_scopes();
        assert_eq!(scopes.len(), 3);
        assert!(scopes.contains("Mail.Read"));
    }

    #[test]
    fn accepts_bearer_prefix() {
        let raw = format!("Bearer {}", test_token("User.Read"));
        let token = AuthToken::parse(&raw).unwrap();
        assert!(!token.secret().starts_with("Bearer"));
    }

    #[test]
    fn rejects_opaque_tokens() {
        assert_eq!(AuthToken::parse("opaque-token"), Err(AuthError::MalformedToken));
        assert!(matches!(
            AuthToken::parse("a.!!!.c"),
            Err(AuthError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn fetches_profile_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "u-1",
                "displayName": "Adele Vance",
                "mail": null,
                "userPrincipalName": "adele@contoso.com"
            })))
            .mount(&server)
            .await;

        let profile = fetch_profile(reqwest::Client::new(), server.uri(), "secret".into())
            .await
            .unwrap();
        assert_eq!(profile.display_name, "Adele Vance");
        assert_eq!(profile.mail, None);
    }

    #[tokio::test]
    async fn profile_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1.0/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = fetch_profile(reqwest::Client::new(), server.uri(), "secret".into()).await;
        assert!(result.unwrap_err().contains("401"));
    }
}
