/*!
Test harness for ElasticGaze

Wraps an `EsStub` with:
- A one-call healthy cluster (every endpoint the engine reads)
- Expectations on how often each path is requested
- Request statistics for debugging failing tests
*/

use crate::es_stub::{EsStub, RecordedRequest, StubResponse};
use crate::fixtures::{
    cat_indices_body, cat_nodes_body, cat_shards_body, cluster_health_body, cluster_info_body,
    indices_stats_body, nodes_body, NodeFixture,
};
use std::collections::HashMap;
use anyhow::Result;

pub const CLUSTER_INFO: &str = "/";
pub const CLUSTER_HEALTH: &str = "/_cluster/health";
pub const NODES_STATS: &str = "/_nodes";
pub const CAT_NODES: &str = "/_cat/nodes";
pub const CAT_SHARDS: &str = "/_cat/shards";
pub const INDICES_STATS: &str = "/_stats";
pub const CAT_INDICES: &str = "/_cat/indices";

/// Stub cluster plus expectations
pub struct TestHarness {
    pub stub: EsStub,
    expectations: Vec<Expectation>,
}

#[derive(Debug)]
struct Expectation {
    path: String,
    expected_count: usize,
}

impl TestHarness {
    /// Start an empty stub; every route answers 404 until registered
    pub async fn start() -> Result<Self> {
        env_logger::try_init().ok();

        Ok(Self {
            stub: EsStub::start().await?,
            expectations: Vec::new(),
        })
    }

    /// Stub serving a green cluster made of `nodes`, one shard per node
    pub async fn healthy_cluster(nodes: &[NodeFixture]) -> Result<Self> {
        let harness = Self::start().await?;
        let shards: Vec<(&str, usize)> = nodes.iter().map(|n| (n.name.as_str(), 1)).collect();
        let node_count = nodes.len() as u64;

        harness
            .stub
            .on_get(CLUSTER_INFO, cluster_info_body("gaze-test", "8.14.0"))
            .on_get(CLUSTER_HEALTH, cluster_health_body("green", node_count, node_count, node_count))
            .on_get(NODES_STATS, nodes_body(nodes))
            .on_get(CAT_NODES, cat_nodes_body(nodes))
            .on_get(CAT_SHARDS, cat_shards_body(&shards, 0))
            .on_get(INDICES_STATS, indices_stats_body(1200, 1536))
            .on_get(CAT_INDICES, cat_indices_body(&[("logs-1", "green", 1200)]));

        log::info!("🟢 Healthy stub cluster with {} nodes", nodes.len());
        Ok(harness)
    }

    /// Replace the response for `GET path`
    pub fn respond(&self, path: &str, response: StubResponse) -> &Self {
        self.stub.on("GET", path, response);
        self
    }

    pub fn host(&self) -> String {
        self.stub.host()
    }

    pub fn port(&self) -> u16 {
        self.stub.port()
    }

    /// Expect exactly `count` requests on `path`
    pub fn expect_requests(&mut self, path: &str, count: usize) -> &mut Self {
        self.expectations.push(Expectation {
            path: path.to_string(),
            expected_count: count,
        });
        self
    }

    pub fn verify_expectations(&self) -> Result<()> {
        log::info!("🔍 Verifying {} expectations...", self.expectations.len());

        for expectation in &self.expectations {
            let actual = self.stub.hits(&expectation.path);
            if actual != expectation.expected_count {
                anyhow::bail!(
                    "Expectation failed for '{}': expected {} requests, got {}",
                    expectation.path, expectation.expected_count, actual
                );
            }
            log::info!("✅ '{}': {} requests as expected", expectation.path, actual);
        }
        Ok(())
    }

    /// Every request on `path` carried `Authorization: expected`
    pub fn assert_authorization(&self, path: &str, expected: &str) -> Result<()> {
        let requests = self.requests_for(path);
        if requests.is_empty() {
            anyhow::bail!("No request received on {}", path);
        }
        for request in requests {
            if request.authorization.as_deref() != Some(expected) {
                anyhow::bail!(
                    "Authorization mismatch on {}: expected {:?}, got {:?}",
                    path, expected, request.authorization
                );
            }
        }
        Ok(())
    }

    pub fn requests_for(&self, path: &str) -> Vec<RecordedRequest> {
        self.stub.requests().into_iter().filter(|r| r.path == path).collect()
    }

    pub fn get_stats(&self) -> TestStats {
        let requests = self.stub.requests();
        let mut path_counts = HashMap::new();
        for request in &requests {
            *path_counts.entry(request.path.clone()).or_insert(0) += 1;
        }

        TestStats {
            total_requests: requests.len(),
            path_counts,
        }
    }

    pub fn reset(&mut self) {
        self.stub.clear_requests();
        self.expectations.clear();
        log::info!("🧹 Test harness reset");
    }
}

#[derive(Debug)]
pub struct TestStats {
    pub total_requests: usize,
    pub path_counts: HashMap<String, usize>,
}

impl TestStats {
    pub fn print(&self) {
        println!("📊 Stub statistics:");
        println!("  Total requests: {}", self.total_requests);
        for (path, count) in &self.path_counts {
            println!("    {}: {} requests", path, count);
        }
    }
}
