//! Index administration: list, create and delete indices
//!
//! Every operation reports failure inside its response (`success = false`
//! plus an error string) rather than returning an error.

use crate::error::{GazeError, Result};
use crate::fetch::Endpoint;
use crate::profile::ConnectionProfile;
use crate::service::ClusterService;
use crate::transport::build_url;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{error, info, info_span, warn, Instrument};

/// One row of `_cat/indices`, cells kept as reported
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexInfo {
    pub name: String,
    pub health: String,
    pub status: String,
    pub uuid: String,
    /// Primary shards
    pub pri: String,
    /// Replicas per primary
    pub rep: String,
    pub docs_count: String,
    pub docs_deleted: String,
    pub store_size: String,
    pub pri_store_size: String,
    pub creation_date: String,
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub segments: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexRequest {
    pub index_name: String,
    pub num_shards: i32,
    pub num_replicas: i32,
}

impl CreateIndexRequest {
    pub fn new(index_name: impl Into<String>, num_shards: i32, num_replicas: i32) -> Self {
        Self {
            index_name: index_name.into(),
            num_shards,
            num_replicas,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_index_name(&self.index_name)?;
        if self.num_shards < 1 {
            return Err(GazeError::validation("num_shards", "number of shards must be at least 1"));
        }
        if self.num_replicas < 0 {
            return Err(GazeError::validation("num_replicas", "number of replicas cannot be negative"));
        }
        Ok(())
    }

    /// `PUT /<index>` body
    pub fn body(&self) -> Value {
        json!({
            "settings": {
                "index": {
                    "number_of_shards": self.num_shards,
                    "number_of_replicas": self.num_replicas,
                }
            }
        })
    }
}

fn validate_index_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(GazeError::validation("index_name", "index name is required"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicesResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub indices: Vec<IndexInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default)]
    pub shards_acknowledged: bool,
    #[serde(default)]
    pub index: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteIndexResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Convert raw `_cat/indices` rows; non-string cells are rendered as text
pub fn parse_cat_indices(rows: &[Map<String, Value>]) -> Vec<IndexInfo> {
    rows.iter()
        .map(|row| {
            let cell = |key: &str| match row.get(key) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };

            IndexInfo {
                name: cell("index"),
                health: cell("health"),
                status: cell("status"),
                uuid: cell("uuid"),
                pri: cell("pri"),
                rep: cell("rep"),
                docs_count: cell("docs.count"),
                docs_deleted: cell("docs.deleted"),
                store_size: cell("store.size"),
                pri_store_size: cell("pri.store.size"),
                creation_date: cell("creation.date.string"),
                creation_time: cell("creation.date")
                    .parse::<i64>()
                    .ok()
                    .and_then(DateTime::<Utc>::from_timestamp_millis),
                segments: cell("segments.count"),
            }
        })
        .collect()
}

impl ClusterService {
    pub async fn list_indices(&self, profile: &ConnectionProfile) -> IndicesResponse {
        let span = info_span!(parent: &self.span, "list_indices", profile = %profile.label());
        async {
            info!("Fetching indices");
            match self.client.fetch::<Vec<Map<String, Value>>>(profile, Endpoint::CatIndices).await {
                Ok(rows) => {
                    let indices = parse_cat_indices(&rows);
                    info!("Successfully fetched {} indices", indices.len());
                    IndicesResponse {
                        success: true,
                        indices,
                        error: None,
                    }
                }
                Err(e) => {
                    error!("Failed to fetch indices: {e}");
                    IndicesResponse {
                        success: false,
                        indices: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn create_index(&self, profile: &ConnectionProfile, request: &CreateIndexRequest) -> CreateIndexResponse {
        let span = info_span!(parent: &self.span, "create_index", profile = %profile.label(), index = %request.index_name);
        async {
            info!("Creating index");
            match self.send_create(profile, request).await {
                Ok(mut response) => {
                    info!(acknowledged = response.acknowledged, "Index created");
                    response.success = true;
                    response
                }
                Err(e) => {
                    warn!("Failed to create index: {e}");
                    CreateIndexResponse {
                        error: Some(e.to_string()),
                        ..CreateIndexResponse::default()
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn delete_index(&self, profile: &ConnectionProfile, index_name: &str) -> DeleteIndexResponse {
        let span = info_span!(parent: &self.span, "delete_index", profile = %profile.label(), index = %index_name);
        async {
            info!("Deleting index");
            match self.send_delete(profile, index_name).await {
                Ok(mut response) => {
                    info!(acknowledged = response.acknowledged, "Index deleted");
                    response.success = true;
                    response
                }
                Err(e) => {
                    warn!("Failed to delete index: {e}");
                    DeleteIndexResponse {
                        error: Some(e.to_string()),
                        ..DeleteIndexResponse::default()
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn send_create(&self, profile: &ConnectionProfile, request: &CreateIndexRequest) -> Result<CreateIndexResponse> {
        request.validate()?;

        let path = format!("/{}", request.index_name);
        let url = build_url(profile, &path);
        let body = request.body();
        info!(%url, %body, "Sending create request");

        let builder = self.client.request(Method::PUT, profile, &path)?.body(body.to_string());
        let (status, text) = self.client.execute(&url, builder).await?;
        expect_status(&url, status, &text, &[StatusCode::OK, StatusCode::CREATED])?;

        serde_json::from_str(&text).map_err(|source| GazeError::Decode { url, source })
    }

    async fn send_delete(&self, profile: &ConnectionProfile, index_name: &str) -> Result<DeleteIndexResponse> {
        validate_index_name(index_name)?;

        let path = format!("/{index_name}");
        let url = build_url(profile, &path);
        let builder = self.client.request(Method::DELETE, profile, &path)?;
        let (status, text) = self.client.execute(&url, builder).await?;
        expect_status(&url, status, &text, &[StatusCode::OK])?;

        serde_json::from_str(&text).map_err(|source| GazeError::Decode { url, source })
    }
}

fn expect_status(url: &str, status: StatusCode, body: &str, accepted: &[StatusCode]) -> Result<()> {
    if accepted.contains(&status) {
        return Ok(());
    }
    Err(GazeError::HttpStatus {
        url: url.to_string(),
        status: status.as_u16(),
        body: body.to_string(),
    })
}
