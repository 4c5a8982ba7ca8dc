//! HTTP transport to the cluster REST API
//!
//! `build_url` and `apply_auth` are pure functions of a connection profile;
//! `EsClient` owns the pooled `reqwest::Client` and turns a profile + path
//! into a sent request and a decoded body.

use crate::config::HttpSettings;
use crate::error::{AuthError, GazeError, Result};
use crate::profile::{AuthMethod, ConnectionProfile};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// `scheme://host:port` + path, `https` iff the profile has TLS enabled
pub fn build_url(profile: &ConnectionProfile, path: &str) -> String {
    let scheme = if profile.tls { "https" } else { "http" };
    format!("{}://{}:{}{}", scheme, profile.host, profile.port, path)
}

/// Attach the profile's credentials to an outgoing request
pub fn apply_auth(request: RequestBuilder, profile: &ConnectionProfile) -> Result<RequestBuilder, AuthError> {
    match profile.auth()? {
        AuthMethod::None => Ok(request),
        AuthMethod::Basic => match (&profile.username, &profile.password) {
            (Some(username), Some(password)) => Ok(request.basic_auth(username, Some(password))),
            _ => Err(AuthError::MissingCredentials {
                method: "basic",
                missing: "username and password",
            }),
        },
        AuthMethod::ApiKey => match &profile.api_key {
            Some(key) => Ok(request.header(AUTHORIZATION, format!("ApiKey {key}"))),
            None => Err(AuthError::MissingCredentials {
                method: "API key",
                missing: "API key",
            }),
        },
    }
}

/// Shared HTTP client; cheap to clone
#[derive(Clone)]
pub struct EsClient {
    http: reqwest::Client,
}

impl EsClient {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(settings.user_agent.clone())
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|e| GazeError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Authenticated request with the JSON content type; nothing is sent yet
    pub fn request(&self, method: Method, profile: &ConnectionProfile, path: &str) -> Result<RequestBuilder> {
        let url = build_url(profile, path);
        let request = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        Ok(apply_auth(request, profile)?)
    }

    /// Send a request and read its body as text, whatever the status
    pub async fn execute(&self, url: &str, request: RequestBuilder) -> Result<(StatusCode, String)> {
        let response = request.send().await.map_err(|source| GazeError::Connection {
            url: url.to_string(),
            source,
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|source| GazeError::Connection {
            url: url.to_string(),
            source,
        })?;
        debug!(url, status = status.as_u16(), bytes = body.len(), "Response received");
        Ok((status, body))
    }

    /// GET `path`, require HTTP 200 and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, profile: &ConnectionProfile, path: &str) -> Result<T> {
        let url = build_url(profile, path);
        let request = self.request(Method::GET, profile, path)?;
        let (status, body) = self.execute(&url, request).await?;

        if status != StatusCode::OK {
            return Err(GazeError::HttpStatus {
                url,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| GazeError::Decode { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> EsClient {
        EsClient::new(&HttpSettings::default()).unwrap()
    }

    fn authorization(profile: &ConnectionProfile) -> Option<String> {
        let request = client()
            .request(Method::GET, profile, "/")
            .unwrap()
            .build()
            .unwrap();
        request
            .headers()
            .get(AUTHORIZATION)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[test]
    fn test_build_url_scheme() {
        let profile = ConnectionProfile::new("es.local", 9200);
        assert_eq!(build_url(&profile, "/_nodes"), "http://es.local:9200/_nodes");

        let profile = profile.with_tls(true);
        assert_eq!(
            build_url(&profile, "/_cat/shards?format=json&h=node"),
            "https://es.local:9200/_cat/shards?format=json&h=node"
        );
    }

    #[test]
    fn test_no_auth_leaves_request_untouched() {
        let profile = ConnectionProfile::new("es.local", 9200);
        assert_eq!(authorization(&profile), None);
    }

    #[test]
    fn test_basic_auth_header() {
        let profile = ConnectionProfile::new("es.local", 9200).with_basic_auth("elastic", "changeme");
        // base64("elastic:changeme")
        assert_eq!(
            authorization(&profile).as_deref(),
            Some("Basic ZWxhc3RpYzpjaGFuZ2VtZQ==")
        );
    }

    #[test]
    fn test_api_key_header() {
        let profile = ConnectionProfile::new("es.local", 9200).with_api_key("a2V5OnNlY3JldA==");
        assert_eq!(authorization(&profile).as_deref(), Some("ApiKey a2V5OnNlY3JldA=="));
    }

    #[test]
    fn test_basic_auth_without_password_fails() {
        let mut profile = ConnectionProfile::new("es.local", 9200).with_basic_auth("elastic", "x");
        profile.password = None;

        let err = apply_auth(client().http.get("http://es.local:9200/"), &profile).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials { method: "basic", .. }));
    }

    #[test]
    fn test_api_key_missing_fails() {
        let mut profile = ConnectionProfile::new("es.local", 9200);
        profile.auth_method = "apikey".into();

        let err = apply_auth(client().http.get("http://es.local:9200/"), &profile).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials { .. }));
    }

    #[test]
    fn test_unsupported_method_fails() {
        let mut profile = ConnectionProfile::new("es.local", 9200);
        profile.auth_method = "kerberos".into();

        let err = client().request(Method::GET, &profile, "/").unwrap_err();
        assert_eq!(err.code(), "AUTH_ERROR");
        assert!(err.to_string().contains("kerberos"));
    }

    #[test]
    fn test_content_type_is_json() {
        let profile = ConnectionProfile::new("es.local", 9200);
        let request = client().request(Method::GET, &profile, "/").unwrap().build().unwrap();
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
    }
}
