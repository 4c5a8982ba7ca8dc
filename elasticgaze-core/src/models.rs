//! Wire shapes decoded from the cluster and the normalized views handed back
//!
//! Raw shapes mirror each endpoint's JSON and tolerate missing fields: the
//! `_nodes` info API omits most resource counters, and `_cat` tables report
//! absent cells as `null`.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// `null` or a missing cell becomes the empty string
fn empty_if_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// GET /_nodes
// ---------------------------------------------------------------------------

/// Node statistics keyed by opaque node id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNodesStats {
    #[serde(default)]
    pub nodes: BTreeMap<String, RawNodeStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawNodeStats {
    pub name: String,
    pub version: String,
    pub host: String,
    pub ip: String,
    pub roles: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub os: OsStats,
    pub jvm: JvmStats,
    pub fs: FsStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OsStats {
    pub cpu: CpuStats,
    pub mem: MemStats,
    pub load_average: LoadAverage,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CpuStats {
    pub percent: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemStats {
    #[serde(rename = "total_in_bytes")]
    pub total: i64,
    #[serde(rename = "free_in_bytes")]
    pub free: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoadAverage {
    #[serde(rename = "1m")]
    pub one: f64,
    #[serde(rename = "5m")]
    pub five: f64,
    #[serde(rename = "15m")]
    pub fifteen: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JvmStats {
    pub mem: HeapStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HeapStats {
    #[serde(rename = "heap_used_in_bytes")]
    pub heap_used: i64,
    #[serde(rename = "heap_max_in_bytes")]
    pub heap_max: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FsStats {
    pub total: FsTotal,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FsTotal {
    #[serde(rename = "total_in_bytes")]
    pub total: i64,
    #[serde(rename = "available_in_bytes")]
    pub available: i64,
}

// ---------------------------------------------------------------------------
// GET /_cat/nodes and /_cat/shards
// ---------------------------------------------------------------------------

/// One row of `_cat/nodes?format=json`, every cell a string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCatNode {
    #[serde(default, deserialize_with = "empty_if_null")]
    pub ip: String,
    #[serde(rename = "heap.percent", default, deserialize_with = "empty_if_null")]
    pub heap_percent: String,
    #[serde(rename = "ram.percent", default, deserialize_with = "empty_if_null")]
    pub ram_percent: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub cpu: String,
    #[serde(rename = "load_1m", default, deserialize_with = "empty_if_null")]
    pub load_1m: String,
    #[serde(rename = "load_5m", default, deserialize_with = "empty_if_null")]
    pub load_5m: String,
    #[serde(rename = "load_15m", default, deserialize_with = "empty_if_null")]
    pub load_15m: String,
    #[serde(rename = "node.role", default, deserialize_with = "empty_if_null")]
    pub node_role: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub master: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    pub name: String,
    #[serde(rename = "disk.avail", default, deserialize_with = "empty_if_null")]
    pub disk_avail: String,
    #[serde(rename = "disk.used", default, deserialize_with = "empty_if_null")]
    pub disk_used: String,
    #[serde(rename = "disk.total", default, deserialize_with = "empty_if_null")]
    pub disk_total: String,
    #[serde(rename = "disk.percent", default, deserialize_with = "empty_if_null")]
    pub disk_percent: String,
}

/// One row of `_cat/shards?format=json&h=node`; unassigned shards have no node
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCatShard {
    #[serde(default)]
    pub node: Option<String>,
}

/// Multiset of node names taken from the shard listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardCounts(HashMap<String, usize>);

impl ShardCounts {
    pub fn from_rows(rows: &[RawCatShard]) -> Self {
        let mut counts = HashMap::new();
        for node in rows.iter().filter_map(|row| row.node.as_deref()) {
            if !node.is_empty() {
                *counts.entry(node.to_string()).or_insert(0) += 1;
            }
        }
        Self(counts)
    }

    /// Shards held by `node_name`, 0 when it holds none
    pub fn get(&self, node_name: &str) -> usize {
        self.0.get(node_name).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// GET /, /_cluster/health, /_stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterInfo {
    pub name: String,
    pub cluster_name: String,
    pub cluster_uuid: String,
    pub version: ClusterVersion,
    pub tagline: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterVersion {
    pub number: String,
    pub build_flavor: String,
    pub build_type: String,
    pub build_hash: String,
    pub build_date: String,
    pub lucene_version: String,
    pub minimum_wire_compatibility_version: String,
    pub minimum_index_compatibility_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: String,
    pub timed_out: bool,
    pub number_of_nodes: u64,
    pub number_of_data_nodes: u64,
    pub active_primary_shards: u64,
    pub active_shards: u64,
    pub relocating_shards: u64,
    pub initializing_shards: u64,
    pub unassigned_shards: u64,
    pub delayed_unassigned_shards: u64,
    pub number_of_pending_tasks: u64,
    pub number_of_in_flight_fetch: u64,
    pub task_max_waiting_in_queue_millis: u64,
    pub active_shards_percent_as_number: f64,
}

/// Aggregate index statistics; only `_all.total` is consumed
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndicesStats {
    #[serde(rename = "_all")]
    pub all: IndicesAll,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndicesAll {
    pub total: IndicesTotal,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndicesTotal {
    pub docs: DocsStats,
    pub store: StoreStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocsStats {
    pub count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreStats {
    pub size_in_bytes: u64,
}

// ---------------------------------------------------------------------------
// Normalized views
// ---------------------------------------------------------------------------

/// One cluster member, reconciled from node stats, cat nodes and shards
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedNode {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub master: bool,
    pub roles: Vec<String>,
    /// Abbreviated roles as printed by `_cat/nodes` (e.g. "dim")
    pub role_string: String,
    pub attributes: String,
    /// "1m / 5m / 15m"
    pub load: String,
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub heap_percent: f64,
    pub disk_percent: f64,
    pub shards: usize,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodesResponse {
    pub success: bool,
    pub nodes: Vec<NormalizedNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NodesResponse {
    pub fn ok(nodes: Vec<NormalizedNode>) -> Self {
        Self {
            success: true,
            nodes,
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            nodes: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeCounts {
    pub master: usize,
    pub data: usize,
    pub ingest: usize,
    pub total: usize,
}

/// Replica count is always `total - primary`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShardSummary {
    pub primary: u64,
    pub replica: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexMetrics {
    pub document_count: u64,
    pub disk_usage: String,
    pub disk_usage_bytes: u64,
}

/// Cluster-wide dashboard view
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterSnapshot {
    pub cluster_info: ClusterInfo,
    pub cluster_health: ClusterHealth,
    pub node_counts: NodeCounts,
    pub shard_counts: ShardSummary,
    pub index_metrics: IndexMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ClusterSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DashboardResponse {
    pub fn ok(snapshot: ClusterSnapshot) -> Self {
        Self {
            success: true,
            data: Some(snapshot),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}
