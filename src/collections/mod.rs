//! # Resource Collections
//!
//! Resource paths gathered while exploring, kept in named collections and
//! exported as Postman v2.1 collection files.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::http::method::HttpMethod;
use crate::query::Query;

const POSTMAN_SCHEMA: &str = "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";
const DEFAULT_COLLECTION_NAME: &str = "Graph-Collection";

/// A path relative to the API version, e.g. `/me/events` on `v1.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceLink {
    pub url: String,
    pub method: HttpMethod,
    pub version: String,
}

impl ResourceLink {
    pub fn from_query(query: &Query) -> Self {
        Self {
            url: crate::permissions::request_path(query),
            method: query.selected_verb,
            version: query.selected_version.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCollection {
    pub id: String,
    pub name: String,
    pub paths: Vec<ResourceLink>,
    pub is_default: bool,
}

impl Default for ResourceCollection {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: DEFAULT_COLLECTION_NAME.to_string(),
            paths: Vec::new(),
            is_default: true,
        }
    }
}

impl ResourceCollection {
    /// Add paths not already present, keeping insertion order.
    pub fn add_paths(&mut self, links: impl IntoIterator<Item = ResourceLink>) {
        for link in links {
            if !self.paths.contains(&link) {
                self.paths.push(link);
            }
        }
    }

    pub fn remove_paths(&mut self, links: &[ResourceLink]) {
        self.paths.retain(|path| !links.contains(path));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanCollection {
    pub info: PostmanInfo,
    pub item: Vec<PostmanItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanInfo {
    #[serde(rename = "_postman_id")]
    pub postman_id: String,
    pub name: String,
    pub schema: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanItem {
    pub name: String,
    pub request: PostmanRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanRequest {
    pub method: HttpMethod,
    pub url: PostmanUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostmanUrl {
    pub raw: String,
    pub protocol: String,
    pub host: Vec<String>,
    pub path: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: the collection is empty")]
    Empty,
    #[error("invalid API origin `{0}`")]
    InvalidOrigin(String),
    #[error("failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write `{path}`: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub fn generate_postman_collection(
    collection: &ResourceCollection,
    graph_url: &str,
) -> Result<PostmanCollection, ExportError> {
    let origin = reqwest::Url::parse(graph_url)
        .map_err(|_| ExportError::InvalidOrigin(graph_url.to_string()))?;
    let host: Vec<String> = origin
        .host_str()
        .ok_or_else(|| ExportError::InvalidOrigin(graph_url.to_string()))?
        .split('.')
        .map(str::to_string)
        .collect();
    let base = graph_url.trim_end_matches('/');

    let item = collection
        .paths
        .iter()
        .map(|link| {
            let mut path = vec![link.version.clone()];
            path.extend(
                link.url
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string),
            );
            PostmanItem {
                name: link.url.clone(),
                request: PostmanRequest {
                    method: link.method,
                    url: PostmanUrl {
                        raw: format!("{base}/{}{}", link.version, link.url),
                        protocol: origin.scheme().to_string(),
                        host: host.clone(),
                        path,
                    },
                },
            }
        })
        .collect();

    Ok(PostmanCollection {
        info: PostmanInfo {
            postman_id: collection.id.clone(),
            name: collection.name.clone(),
            schema: POSTMAN_SCHEMA.to_string(),
        },
        item,
    })
}

pub fn export_file_name(content: &PostmanCollection) -> String {
    format!(
        "{}-{}.postman_collection.json",
        content.info.name, content.info.postman_id
    )
}

/// Write the collection into `export_dir`, returning the file written.
pub fn export_collection(
    collection: &ResourceCollection,
    graph_url: &str,
    export_dir: &Path,
) -> Result<PathBuf, ExportError> {
    if collection.paths.is_empty() {
        return Err(ExportError::Empty);
    }
    let content = generate_postman_collection(collection, graph_url)?;
    let raw = serde_json::to_string_pretty(&content)?;

    fs::create_dir_all(export_dir).map_err(|source| ExportError::Write {
        path: export_dir.to_path_buf(),
        source,
    })?;
    let file = export_dir.join(export_file_name(&content));
    fs::write(&file, raw).map_err(|source| ExportError::Write {
        path: file.clone(),
        source,
    })?;
    info!(path = %file.display(), items = content.item.len(), "exported collection");
    Ok(file)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const GRAPH_URL: &str = "https://graph.microsoft.com";

    fn link(url: &str, method: HttpMethod, version: &str) -> ResourceLink {
        ResourceLink {
            url: url.into(),
            method,
            version: version.into(),
        }
    }

    fn collection() -> ResourceCollection {
        ResourceCollection {
            id: "c0ffee".into(),
            ..ResourceCollection::default()
        }
    }

    #[test]
    fn adding_paths_skips_duplicates() {
        let mut collection = collection();
        collection.add_paths([
            link("/me", HttpMethod::Get, "v1.0"),
            link("/me", HttpMethod::Get, "v1.0"),
            link("/me", HttpMethod::Get, "beta"),
        ]);
        assert_eq!(collection.paths.len(), 2);
        collection.remove_paths(&[link("/me", HttpMethod::Get, "v1.0")]);
        assert_eq!(collection.paths, vec![link("/me", HttpMethod::Get, "beta")]);
    }

    #[test]
    fn link_from_query_is_version_relative() {
        let query = Query::get("https://graph.microsoft.com/v1.0/me/events?$top=2", GRAPH_URL);
        assert_eq!(ResourceLink::from_query(&query), link("/me/events", HttpMethod::Get, "v1.0"));
    }

    #[test]
    fn generates_postman_items() {
        let mut collection = collection();
        collection.add_paths([link("/me/messages", HttpMethod::Post, "beta")]);
        let content = generate_postman_collection(&collection, GRAPH_URL).unwrap();

        assert_eq!(content.info.postman_id, "c0ffee");
        assert_eq!(content.info.name, "Graph-Collection");
        assert_eq!(content.info.schema, POSTMAN_SCHEMA);
        assert_eq!(
            content.item,
            vec![PostmanItem {
                name: "/me/messages".into(),
                request: PostmanRequest {
                    method: HttpMethod::Post,
                    url: PostmanUrl {
                        raw: "https://graph.microsoft.com/beta/me/messages".into(),
                        protocol: "https".into(),
                        host: vec!["graph".into(), "microsoft".into(), "com".into()],
                        path: vec!["beta".into(), "me".into(), "messages".into()],
                    },
                },
            }]
        );

        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["info"]["_postman_id"], "c0ffee");
        assert_eq!(json["item"][0]["request"]["method"], "POST");
    }

    #[test]
    fn exports_to_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut collection = collection();
        collection.add_paths([link("/me", HttpMethod::Get, "v1.0")]);

        let file = export_collection(&collection, GRAPH_URL, dir.path()).unwrap();
        assert_eq!(
            file.file_name().and_then(|name| name.to_str()),
            Some("Graph-Collection-c0ffee.postman_collection.json")
        );
        let written: PostmanCollection =
            serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(written.item.len(), 1);
    }

    #[test]
    fn empty_collection_is_not_exported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            export_collection(&collection(), GRAPH_URL, dir.path()),
            Err(ExportError::Empty)
        ));
    }
}
