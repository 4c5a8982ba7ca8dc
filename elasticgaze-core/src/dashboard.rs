//! Cluster dashboard
//!
//! Combines cluster info, cluster health, node roles and index statistics
//! into one `ClusterSnapshot`. The four fetches run concurrently and the
//! first failure aborts the whole dashboard.

use crate::error::{GazeError, Result};
use crate::models::{
    ClusterHealth, ClusterInfo, ClusterSnapshot, DashboardResponse, IndexMetrics, IndicesStats,
    NodeCounts, RawNodesStats, ShardSummary,
};
use crate::profile::ConnectionProfile;
use crate::service::ClusterService;
use tracing::{debug, error, info, info_span, Instrument};

/// Roles that count towards the `data` bucket
const DATA_ROLES: [&str; 6] = [
    "data",
    "data_content",
    "data_hot",
    "data_warm",
    "data_cold",
    "data_frozen",
];

impl ClusterService {
    /// Dashboard with failures reported in the response
    pub async fn dashboard_response(&self, profile: &ConnectionProfile) -> DashboardResponse {
        match self.dashboard(profile).await {
            Ok(snapshot) => DashboardResponse::ok(snapshot),
            Err(e) => DashboardResponse::failed(e),
        }
    }

    pub async fn dashboard(&self, profile: &ConnectionProfile) -> Result<ClusterSnapshot> {
        let span = info_span!(parent: &self.span, "dashboard", profile = %profile.label());
        async {
            info!("Fetching dashboard data");

            let (info, health, nodes, stats) = tokio::try_join!(
                self.client.fetch_cluster_info(profile),
                self.client.fetch_cluster_health(profile),
                self.client.fetch_nodes_stats(profile),
                self.client.fetch_indices_stats(profile),
            )
            .inspect_err(|e| error!("Dashboard fetch failed: {e}"))?;

            let snapshot = summarize(info, health, &nodes, &stats);
            info!(
                cluster = %snapshot.cluster_info.cluster_name,
                status = %snapshot.cluster_health.status,
                nodes = snapshot.node_counts.total,
                "Dashboard data ready"
            );
            Ok::<_, GazeError>(snapshot)
        }
        .instrument(span)
        .await
    }

    /// Current `_cluster/health` body
    pub async fn cluster_health(&self, profile: &ConnectionProfile) -> Result<ClusterHealth> {
        let span = info_span!(parent: &self.span, "cluster_health", profile = %profile.label());
        async {
            let health = self.client.fetch_cluster_health(profile).await?;
            debug!(status = %health.status, nodes = health.number_of_nodes, "Cluster health fetched");
            Ok::<_, GazeError>(health)
        }
        .instrument(span)
        .await
    }
}

/// Build the snapshot from the four fetched bodies
pub fn summarize(
    info: ClusterInfo,
    health: ClusterHealth,
    nodes: &RawNodesStats,
    stats: &IndicesStats,
) -> ClusterSnapshot {
    let shard_counts = ShardSummary {
        primary: health.active_primary_shards,
        replica: health.active_shards.saturating_sub(health.active_primary_shards),
        total: health.active_shards,
    };

    let total = &stats.all.total;
    let index_metrics = IndexMetrics {
        document_count: total.docs.count,
        disk_usage: format_bytes(total.store.size_in_bytes),
        disk_usage_bytes: total.store.size_in_bytes,
    };

    ClusterSnapshot {
        cluster_info: info,
        cluster_health: health,
        node_counts: count_roles(nodes),
        shard_counts,
        index_metrics,
    }
}

/// Nodes per role bucket; a node counts at most once per bucket
pub fn count_roles(nodes: &RawNodesStats) -> NodeCounts {
    let mut counts = NodeCounts {
        total: nodes.nodes.len(),
        ..NodeCounts::default()
    };

    for node in nodes.nodes.values() {
        let has = |role: &str| node.roles.iter().any(|r| r == role);

        if has("master") {
            counts.master += 1;
        }
        if node.roles.iter().any(|r| DATA_ROLES.contains(&r.as_str())) {
            counts.data += 1;
        }
        if has("ingest") {
            counts.ingest += 1;
        }
    }
    counts
}

/// Human-readable size in binary units with one decimal, e.g. "1.5 KB"
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{bytes} B");
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT && exp < 5 {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let prefix = ['K', 'M', 'G', 'T', 'P', 'E'][exp];
    format!("{:.1} {}B", bytes as f64 / div as f64, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(json: &str) -> RawNodesStats {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.0 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GB");
        assert_eq!(format_bytes(u64::MAX), "16.0 EB");
    }

    #[test]
    fn test_hot_data_and_ingest_count_once_each() {
        let counts = count_roles(&nodes(r#"{"nodes":{"a":{"name":"n1","roles":["data_hot","ingest"]}}}"#));
        assert_eq!(
            counts,
            NodeCounts {
                master: 0,
                data: 1,
                ingest: 1,
                total: 1
            }
        );
    }

    #[test]
    fn test_multiple_data_tiers_count_once() {
        let counts = count_roles(&nodes(
            r#"{"nodes":{
                "a":{"roles":["master","data","data_content","data_hot"]},
                "b":{"roles":["data_warm","data_cold"]},
                "c":{"roles":["ml","remote_cluster_client"]}}}"#,
        ));
        assert_eq!(counts.master, 1);
        assert_eq!(counts.data, 2);
        assert_eq!(counts.ingest, 0);
        assert_eq!(counts.total, 3);
    }

    #[test]
    fn test_summary_derives_replicas_and_sizes() {
        let health = ClusterHealth {
            status: "green".into(),
            active_primary_shards: 12,
            active_shards: 30,
            ..ClusterHealth::default()
        };
        let stats: IndicesStats = serde_json::from_str(
            r#"{"_all":{"total":{"docs":{"count":1200},"store":{"size_in_bytes":1536}}}}"#,
        )
        .unwrap();

        let snapshot = summarize(ClusterInfo::default(), health, &RawNodesStats::default(), &stats);
        assert_eq!(
            snapshot.shard_counts,
            ShardSummary {
                primary: 12,
                replica: 18,
                total: 30
            }
        );
        assert_eq!(snapshot.index_metrics.document_count, 1200);
        assert_eq!(snapshot.index_metrics.disk_usage, "1.5 KB");
        assert_eq!(snapshot.index_metrics.disk_usage_bytes, 1536);
        assert_eq!(snapshot.node_counts.total, 0);
    }
}
