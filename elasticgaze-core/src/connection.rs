//! Connection check
//!
//! One `GET /` against a profile, with every outcome mapped to a coded
//! `ConnectionCheck` rather than an error.

use crate::error::GazeError;
use crate::models::ClusterInfo;
use crate::profile::ConnectionProfile;
use crate::service::ClusterService;
use crate::transport::build_url;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info, info_span, warn, Instrument};

/// Outcome of a connection check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionCheck {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_details: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_code: String,
}

impl ConnectionCheck {
    fn failed(message: impl Into<String>, details: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error_details: details.into(),
            error_code: code.into(),
            ..Self::default()
        }
    }
}

/// Message and code for a non-200 status
fn status_outcome(status: StatusCode) -> (String, String) {
    match status.as_u16() {
        401 => ("Authentication failed".into(), "AUTH_FAILED".into()),
        403 => ("Access forbidden".into(), "ACCESS_FORBIDDEN".into()),
        404 => ("Elasticsearch not found at this URL".into(), "NOT_FOUND".into()),
        500 => ("Elasticsearch server error".into(), "SERVER_ERROR".into()),
        code => (format!("HTTP {status}"), format!("HTTP_{code}")),
    }
}

impl ClusterService {
    /// Validate the profile, authenticate and read the cluster banner
    pub async fn check_connection(&self, profile: &ConnectionProfile) -> ConnectionCheck {
        let span = info_span!(parent: &self.span, "check_connection", profile = %profile.label());
        async {
            info!(
                tls = profile.tls,
                auth = %profile.auth_method,
                "Testing connection to {}:{}", profile.host, profile.port
            );

            let profile = match profile.validated() {
                Ok(profile) => profile,
                Err(e) => {
                    error!("Connection check validation failed: {e}");
                    return ConnectionCheck::failed("Validation failed", e.to_string(), e.code());
                }
            };

            let url = build_url(&profile, "/");
            let request = match self.client.request(Method::GET, &profile, "/") {
                Ok(request) => request,
                Err(e) => {
                    error!("Authentication setup failed: {e}");
                    return ConnectionCheck::failed("Authentication setup failed", e.to_string(), e.code());
                }
            };

            let started = Instant::now();
            let result = self.client.execute(&url, request).await;
            let elapsed = started.elapsed();

            let (status, body) = match result {
                Ok(response) => response,
                Err(e) => {
                    error!("Request failed after {elapsed:?}: {e}");
                    let cause = match &e {
                        GazeError::Connection { source, .. } => source.to_string(),
                        other => other.to_string(),
                    };
                    let message = if e.is_timeout() { "Connection timeout" } else { "Connection failed" };
                    return ConnectionCheck::failed(
                        message,
                        format!("Connection failed after {elapsed:?}\nURL: {url}\nError: {cause}"),
                        e.code(),
                    );
                }
            };
            info!(status = status.as_u16(), bytes = body.len(), "Response received after {elapsed:?}");

            if status != StatusCode::OK {
                error!("HTTP error status {status}: {body}");
                let (message, code) = status_outcome(status);
                return ConnectionCheck::failed(
                    message,
                    format!("HTTP {status}\nURL: {url}\nResponse: {body}"),
                    code,
                );
            }

            match serde_json::from_str::<ClusterInfo>(&body) {
                Ok(cluster) => {
                    info!(
                        cluster = %cluster.cluster_name,
                        version = %cluster.version.number,
                        flavor = %cluster.version.build_flavor,
                        "Connection test successful"
                    );
                    ConnectionCheck {
                        success: true,
                        message: "Connection successful".into(),
                        cluster_name: cluster.cluster_name,
                        version: cluster.version.number,
                        ..ConnectionCheck::default()
                    }
                }
                Err(e) => {
                    warn!("Response parsing failed, connection still successful: {e}");
                    ConnectionCheck {
                        success: true,
                        message: "Connection successful (unable to parse cluster info)".into(),
                        error_code: "PARSE_WARNING".into(),
                        ..ConnectionCheck::default()
                    }
                }
            }
        }
        .instrument(span)
        .await
    }
}
