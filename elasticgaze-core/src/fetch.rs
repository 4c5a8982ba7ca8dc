//! Endpoint fetchers
//!
//! One fetch per Elasticsearch endpoint: build the URL, authenticate, GET with
//! the client timeout, require HTTP 200, decode. Failures carry the endpoint
//! they came from; nothing is retried.

use crate::error::Result;
use crate::models::{
    ClusterHealth, ClusterInfo, IndicesStats, RawCatNode, RawCatShard, RawNodesStats, ShardCounts,
};
use crate::profile::ConnectionProfile;
use crate::transport::EsClient;
use serde::de::DeserializeOwned;
use std::fmt;
use tracing::debug;

/// Every endpoint the engine reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ClusterInfo,
    ClusterHealth,
    NodesStats,
    CatNodes,
    CatShards,
    IndicesStats,
    CatIndices,
}

impl Endpoint {
    /// Path and fixed query string
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::ClusterInfo => "/",
            Endpoint::ClusterHealth => "/_cluster/health",
            Endpoint::NodesStats => "/_nodes",
            Endpoint::CatNodes => {
                "/_cat/nodes?format=json&h=ip,heap.percent,ram.percent,cpu,load_1m,load_5m,load_15m,node.role,master,name,disk.avail,disk.used,disk.total,disk.percent"
            }
            Endpoint::CatShards => "/_cat/shards?format=json&h=node",
            Endpoint::IndicesStats => "/_stats",
            Endpoint::CatIndices => {
                "/_cat/indices?format=json&h=index,health,status,uuid,pri,rep,docs.count,docs.deleted,store.size,pri.store.size,creation.date,creation.date.string,segments.count"
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::ClusterInfo => "cluster info",
            Endpoint::ClusterHealth => "cluster health",
            Endpoint::NodesStats => "nodes stats",
            Endpoint::CatNodes => "cat nodes",
            Endpoint::CatShards => "shard counts",
            Endpoint::IndicesStats => "indices stats",
            Endpoint::CatIndices => "indices",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl EsClient {
    /// Fetch and decode one endpoint, tagging any failure with it
    pub async fn fetch<T: DeserializeOwned>(&self, profile: &ConnectionProfile, endpoint: Endpoint) -> Result<T> {
        debug!(%endpoint, path = endpoint.path(), "Fetching");
        self.get_json(profile, endpoint.path())
            .await
            .map_err(|e| e.at(endpoint))
    }

    pub async fn fetch_nodes_stats(&self, profile: &ConnectionProfile) -> Result<RawNodesStats> {
        self.fetch(profile, Endpoint::NodesStats).await
    }

    pub async fn fetch_cat_nodes(&self, profile: &ConnectionProfile) -> Result<Vec<RawCatNode>> {
        self.fetch(profile, Endpoint::CatNodes).await
    }

    /// Shard listing reduced to a per-node count
    pub async fn fetch_shard_counts(&self, profile: &ConnectionProfile) -> Result<ShardCounts> {
        let rows: Vec<RawCatShard> = self.fetch(profile, Endpoint::CatShards).await?;
        Ok(ShardCounts::from_rows(&rows))
    }

    pub async fn fetch_cluster_info(&self, profile: &ConnectionProfile) -> Result<ClusterInfo> {
        self.fetch(profile, Endpoint::ClusterInfo).await
    }

    pub async fn fetch_cluster_health(&self, profile: &ConnectionProfile) -> Result<ClusterHealth> {
        self.fetch(profile, Endpoint::ClusterHealth).await
    }

    pub async fn fetch_indices_stats(&self, profile: &ConnectionProfile) -> Result<IndicesStats> {
        self.fetch(profile, Endpoint::IndicesStats).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cat_paths_request_json() {
        for endpoint in [Endpoint::CatNodes, Endpoint::CatShards, Endpoint::CatIndices] {
            assert!(endpoint.path().contains("format=json"), "{endpoint}");
        }
        assert!(Endpoint::CatNodes.path().ends_with("disk.total,disk.percent"));
        assert_eq!(Endpoint::CatShards.path(), "/_cat/shards?format=json&h=node");
    }

    #[test]
    fn test_labels() {
        assert_eq!(Endpoint::NodesStats.to_string(), "nodes stats");
        assert_eq!(Endpoint::ClusterInfo.path(), "/");
    }
}
