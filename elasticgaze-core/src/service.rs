//! Entry point for cluster operations
//!
//! `ClusterService` pairs the shared HTTP client with the tracing span that
//! every operation logs under. Operations live next to their logic:
//! node telemetry in `nodes`, the dashboard in `dashboard`, the connection
//! check in `connection`, index administration in `indices`.

use crate::config::HttpSettings;
use crate::error::Result;
use crate::transport::EsClient;
use tracing::Span;

#[derive(Clone)]
pub struct ClusterService {
    pub(crate) client: EsClient,
    pub(crate) span: Span,
}

impl ClusterService {
    /// Service logging under no parent span
    pub fn new(client: EsClient) -> Self {
        Self {
            client,
            span: Span::none(),
        }
    }

    pub fn from_settings(settings: &HttpSettings) -> Result<Self> {
        Ok(Self::new(EsClient::new(settings)?))
    }

    /// Parent span for every operation run by this service
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn client(&self) -> &EsClient {
        &self.client
    }
}
