//! # Permissions
//!
//! Scopes a query needs, whether the signed-in user already consented to
//! them, and retrieval of the permission catalog from the DevX API.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::query::Query;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub value: String,
    #[serde(default)]
    pub consent_display_name: Option<String>,
    #[serde(default)]
    pub consent_description: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(skip)]
    pub consented: bool,
}

impl Permission {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            consent_display_name: None,
            consent_description: None,
            is_admin: false,
            consented: false,
        }
    }

    /// The resource prefix of the scope: `Mail.ReadWrite` belongs to `Mail`.
    pub fn group_name(&self) -> &str {
        self.value.split('.').next().unwrap_or(&self.value)
    }
}

/// Mark each permission consented when a user is signed in and the scope is
/// among the consented ones. Signed-out users have consented to nothing.
pub fn set_consented_status(
    token_present: bool,
    permissions: &mut [Permission],
    consented_scopes: &HashSet<String>,
) {
    for permission in permissions {
        permission.consented = token_present && consented_scopes.contains(&permission.value);
    }
}

pub fn sort_permissions(permissions: &mut [Permission]) {
    permissions.sort_by(|a, b| a.value.cmp(&b.value));
}

pub fn search_permissions(permissions: &[Permission], keyword: &str) -> Vec<Permission> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return permissions.to_vec();
    }
    permissions
        .iter()
        .filter(|permission| permission.value.to_lowercase().contains(&keyword))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionFetchError {
    #[error("no permissions found for this query (HTTP {status})")]
    NotFound { status: u16 },
    #[error("fetching permissions failed: {message}")]
    Failed { status: Option<u16>, message: String },
}

impl PermissionFetchError {
    fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            code @ (400 | 404) => PermissionFetchError::NotFound { status: code },
            code => PermissionFetchError::Failed {
                status: Some(code),
                message: format!("unexpected status {status}"),
            },
        }
    }
}

/// What the permissions tab should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionsView {
    NotSignedIn,
    NotFound,
    FetchFailed,
    List { sign_in_hint: bool },
}

impl PermissionsView {
    pub fn classify(
        token_present: bool,
        permissions: &[Permission],
        fetch_error: Option<&PermissionFetchError>,
    ) -> Self {
        if !permissions.is_empty() {
            return PermissionsView::List {
                sign_in_hint: !token_present,
            };
        }
        if !token_present {
            return PermissionsView::NotSignedIn;
        }
        match fetch_error {
            Some(PermissionFetchError::NotFound { .. }) => PermissionsView::NotFound,
            _ => PermissionsView::FetchFailed,
        }
    }
}

/// Path of the query relative to the Graph origin and version, as the DevX
/// API expects it: `https://graph.microsoft.com/v1.0/me/events?$top=1` yields
/// `/me/events`.
pub fn request_path(query: &Query) -> String {
    let url = query.sample_url.as_str();
    let without_origin = match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            rest.find('/').map(|index| &rest[index..]).unwrap_or("/")
        }
        None => url,
    };
    let path = without_origin
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let version_prefix = format!("/{}", query.selected_version);
    let path = path.strip_prefix(&version_prefix).unwrap_or(path);
    if path.is_empty() { "/".to_string() } else { path.to_string() }
}

pub async fn fetch_scopes(
    client: reqwest::Client,
    devx_api_url: String,
    query: Query,
) -> Result<Vec<Permission>, PermissionFetchError> {
    let url = format!("{}/permissions", devx_api_url.trim_end_matches('/'));
    let path = request_path(&query);
    debug!(%path, method = %query.selected_verb, "fetching permissions");
    let request = client
        .get(&url)
        .query(&[("requesturl", path.as_str()), ("method", query.selected_verb.as_str())]);
    fetch_permissions(request).await
}

pub async fn fetch_full_permissions(
    client: reqwest::Client,
    devx_api_url: String,
) -> Result<Vec<Permission>, PermissionFetchError> {
    let url = format!("{}/permissions", devx_api_url.trim_end_matches('/'));
    let mut permissions = fetch_permissions(client.get(&url)).await?;
    sort_permissions(&mut permissions);
    Ok(permissions)
}

async fn fetch_permissions(
    request: reqwest::RequestBuilder,
) -> Result<Vec<Permission>, PermissionFetchError> {
    let response = request.send().await.map_err(|e| PermissionFetchError::Failed {
        status: None,
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(PermissionFetchError::from_status(status));
    }

    response
        .json::<Vec<Permission>>()
        .await
        .map_err(|e| PermissionFetchError::Failed {
            status: Some(status.as_u16()),
            message: e.to_string(),
        })
}
