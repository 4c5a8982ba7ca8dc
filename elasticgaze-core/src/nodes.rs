//! Node telemetry: fetch the three node sources and reconcile them
//!
//! Node stats (keyed by id) define the set of nodes. Cat nodes (keyed by
//! name) supply the master marker, abbreviated roles, load averages and a
//! second reading for any percentage node stats report as zero. The shard
//! listing supplies per-name shard counts.

use crate::error::{GazeError, Result};
use crate::models::{NodesResponse, NormalizedNode, RawCatNode, RawNodeStats, RawNodesStats, ShardCounts};
use crate::profile::ConnectionProfile;
use crate::service::ClusterService;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, error, info, info_span, warn, Instrument};

impl ClusterService {
    /// Normalized view of every node; failures are reported in the response
    pub async fn nodes(&self, profile: &ConnectionProfile) -> NodesResponse {
        match self.collect_nodes(profile).await {
            Ok(nodes) => NodesResponse::ok(nodes),
            Err(e) => NodesResponse::failed(e),
        }
    }

    /// Fetch node stats, cat nodes and shard counts concurrently and reconcile them.
    /// Only the shard listing may fail without failing the call.
    pub async fn collect_nodes(&self, profile: &ConnectionProfile) -> Result<Vec<NormalizedNode>> {
        let span = info_span!(parent: &self.span, "nodes", profile = %profile.label());
        async {
            info!("Fetching nodes information");

            let (stats, cat_nodes, shards) = tokio::join!(
                self.client.fetch_nodes_stats(profile),
                self.client.fetch_cat_nodes(profile),
                self.client.fetch_shard_counts(profile),
            );

            let stats = stats.inspect_err(|e| error!("Failed to fetch nodes stats: {e}"))?;
            let cat_nodes = cat_nodes.inspect_err(|e| error!("Failed to fetch cat nodes: {e}"))?;
            let shards = shards.unwrap_or_else(|e| {
                warn!("Failed to fetch shard counts, reporting 0 shards per node: {e}");
                ShardCounts::default()
            });

            let nodes = reconcile(&stats, &cat_nodes, &shards);
            info!("Successfully fetched information for {} nodes", nodes.len());
            Ok::<_, GazeError>(nodes)
        }
        .instrument(span)
        .await
    }
}

/// Merge the three node sources into one record per node id, in id order.
/// Cat rows and shard rows naming unknown nodes are dropped.
pub fn reconcile(stats: &RawNodesStats, cat_nodes: &[RawCatNode], shards: &ShardCounts) -> Vec<NormalizedNode> {
    let by_name: HashMap<&str, &RawCatNode> = cat_nodes.iter().map(|c| (c.name.as_str(), c)).collect();

    stats
        .nodes
        .iter()
        .map(|(id, raw)| {
            let mut node = base_node(id, raw);
            node.shards = shards.get(&raw.name);

            match by_name.get(raw.name.as_str()) {
                Some(cat) => apply_cat_node(&mut node, raw, cat),
                None => {
                    debug!(node = %raw.name, "No cat nodes entry, keeping node stats values");
                    node.load = stats_load(raw);
                }
            }
            node
        })
        .collect()
}

/// Fields derived from node stats alone
fn base_node(id: &str, raw: &RawNodeStats) -> NormalizedNode {
    NormalizedNode {
        id: id.to_string(),
        name: raw.name.clone(),
        ip: raw.ip.clone(),
        roles: raw.roles.clone(),
        attributes: format_attributes(&raw.attributes),
        cpu_percent: raw.os.cpu.percent,
        ram_percent: used_percent(raw.os.mem.total, raw.os.mem.free),
        heap_percent: ratio_percent(raw.jvm.mem.heap_used, raw.jvm.mem.heap_max),
        disk_percent: used_percent(raw.fs.total.total, raw.fs.total.available),
        version: raw.version.clone(),
        ..NormalizedNode::default()
    }
}

fn apply_cat_node(node: &mut NormalizedNode, raw: &RawNodeStats, cat: &RawCatNode) {
    node.master = cat.master == "*";
    node.role_string = cat.node_role.clone();
    debug!(node = %raw.name, roles = %cat.node_role, "Matched cat nodes entry");

    node.load = if !cat.load_1m.is_empty() && !cat.load_5m.is_empty() && !cat.load_15m.is_empty() {
        format!("{} / {} / {}", cat.load_1m, cat.load_5m, cat.load_15m)
    } else {
        stats_load(raw)
    };

    // A zero from node stats is treated as "not reported"; a genuine 0% reading
    // is indistinguishable and also takes the cat value.
    node.cpu_percent = prefer_nonzero(node.cpu_percent, &cat.cpu);
    node.ram_percent = prefer_nonzero(node.ram_percent, &cat.ram_percent);
    node.heap_percent = prefer_nonzero(node.heap_percent, &cat.heap_percent);
    node.disk_percent = prefer_nonzero(node.disk_percent, &cat.disk_percent);
}

/// `(total - free) / total * 100`, 0 when total is not positive
pub fn used_percent(total: i64, free: i64) -> f64 {
    if total > 0 {
        (total - free) as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// `used / max * 100`, 0 when max is not positive
pub fn ratio_percent(used: i64, max: i64) -> f64 {
    if max > 0 {
        used as f64 / max as f64 * 100.0
    } else {
        0.0
    }
}

fn prefer_nonzero(value: f64, fallback: &str) -> f64 {
    if value != 0.0 || fallback.is_empty() {
        return value;
    }
    fallback.trim().parse::<f64>().unwrap_or(value)
}

/// Load averages from node stats, "1m / 5m / 15m"
fn stats_load(raw: &RawNodeStats) -> String {
    let load = &raw.os.load_average;
    format!("{} / {} / {}", load.one, load.five, load.fifteen)
}

/// `key: value` pairs joined with ", ", keys in sorted order
pub fn format_attributes(attributes: &BTreeMap<String, String>) -> String {
    attributes
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawCatShard;

    fn stats(json: &str) -> RawNodesStats {
        serde_json::from_str(json).unwrap()
    }

    fn cat(json: &str) -> Vec<RawCatNode> {
        serde_json::from_str(json).unwrap()
    }

    fn shards(names: &[&str]) -> ShardCounts {
        let rows: Vec<RawCatShard> = names
            .iter()
            .map(|n| RawCatShard { node: Some(n.to_string()) })
            .collect();
        ShardCounts::from_rows(&rows)
    }

    const FULL_NODE: &str = r#"{"nodes":{"id-1":{
        "name":"n1","version":"8.14.0","ip":"10.0.0.1","roles":["master","data","ingest"],
        "attributes":{"zone":"eu-1b","rack":"r7"},
        "os":{"cpu":{"percent":35},"mem":{"total_in_bytes":1000,"free_in_bytes":250},
              "load_average":{"1m":1.5,"5m":2.0,"15m":0.25}},
        "jvm":{"mem":{"heap_used_in_bytes":300,"heap_max_in_bytes":1200}},
        "fs":{"total":{"total_in_bytes":2000,"available_in_bytes":500}}}}}"#;

    #[test]
    fn test_percentages_from_node_stats() {
        let nodes = reconcile(&stats(FULL_NODE), &[], &ShardCounts::default());
        assert_eq!(nodes.len(), 1);

        let node = &nodes[0];
        assert_eq!(node.id, "id-1");
        assert_eq!(node.cpu_percent, 35.0);
        assert_eq!(node.ram_percent, 75.0);
        assert_eq!(node.heap_percent, 25.0);
        assert_eq!(node.disk_percent, 75.0);
        assert_eq!(node.version, "8.14.0");
    }

    #[test]
    fn test_zero_totals_never_divide() {
        let raw = stats(
            r#"{"nodes":{"id-1":{"name":"n1",
                "os":{"mem":{"total_in_bytes":0,"free_in_bytes":0}},
                "jvm":{"mem":{"heap_used_in_bytes":10,"heap_max_in_bytes":0}},
                "fs":{"total":{"total_in_bytes":0,"available_in_bytes":0}}}}}"#,
        );
        let node = &reconcile(&raw, &[], &ShardCounts::default())[0];

        for value in [node.ram_percent, node.heap_percent, node.disk_percent] {
            assert!(value.is_finite());
            assert_eq!(value, 0.0);
        }
    }

    #[test]
    fn test_node_without_cat_entry_uses_stats_only() {
        let cat_nodes = cat(r#"[{"name":"other","master":"*","node.role":"dim","load_1m":"9.00","load_5m":"9.00","load_15m":"9.00"}]"#);
        let node = &reconcile(&stats(FULL_NODE), &cat_nodes, &ShardCounts::default())[0];

        assert!(!node.master);
        assert_eq!(node.role_string, "");
        assert_eq!(node.load, "1.5 / 2 / 0.25");
    }

    #[test]
    fn test_cat_entry_supplies_master_roles_and_load() {
        let cat_nodes = cat(
            r#"[{"name":"n1","master":"*","node.role":"dim","load_1m":"0.42","load_5m":"0.38","load_15m":"0.30","cpu":"99"}]"#,
        );
        let node = &reconcile(&stats(FULL_NODE), &cat_nodes, &ShardCounts::default())[0];

        assert!(node.master);
        assert_eq!(node.role_string, "dim");
        assert_eq!(node.load, "0.42 / 0.38 / 0.30");
        // node stats reported a non-zero CPU, so the cat value is ignored
        assert_eq!(node.cpu_percent, 35.0);
    }

    #[test]
    fn test_partial_cat_load_falls_back_to_stats() {
        let cat_nodes = cat(r#"[{"name":"n1","master":"-","load_1m":"0.42","load_5m":"","load_15m":null}]"#);
        let node = &reconcile(&stats(FULL_NODE), &cat_nodes, &ShardCounts::default())[0];

        assert!(!node.master);
        assert_eq!(node.load, "1.5 / 2 / 0.25");
    }

    #[test]
    fn test_zero_readings_take_cat_values() {
        let raw = stats(r#"{"nodes":{"id-1":{"name":"n1"}}}"#);
        let cat_nodes = cat(
            r#"[{"name":"n1","cpu":"42.5","ram.percent":"81","heap.percent":"47","disk.percent":"63.2"}]"#,
        );
        let node = &reconcile(&raw, &cat_nodes, &shards(&["n1", "n1", "n1"]))[0];

        assert_eq!(node.cpu_percent, 42.5);
        assert_eq!(node.ram_percent, 81.0);
        assert_eq!(node.heap_percent, 47.0);
        assert_eq!(node.disk_percent, 63.2);
        assert_eq!(node.shards, 3);
    }

    #[test]
    fn test_genuine_zero_is_overwritten_by_cat_reading() {
        // Known approximation: node stats cannot report a real 0% CPU when cat nodes disagree
        let raw = stats(r#"{"nodes":{"id-1":{"name":"n1","os":{"cpu":{"percent":0}}}}}"#);
        let cat_nodes = cat(r#"[{"name":"n1","cpu":"3"}]"#);
        assert_eq!(reconcile(&raw, &cat_nodes, &ShardCounts::default())[0].cpu_percent, 3.0);
    }

    #[test]
    fn test_unparseable_cat_values_are_ignored() {
        let raw = stats(r#"{"nodes":{"id-1":{"name":"n1"}}}"#);
        let cat_nodes = cat(r#"[{"name":"n1","cpu":"n/a","ram.percent":""}]"#);
        let node = &reconcile(&raw, &cat_nodes, &ShardCounts::default())[0];

        assert_eq!(node.cpu_percent, 0.0);
        assert_eq!(node.ram_percent, 0.0);
    }

    #[test]
    fn test_nodes_outside_node_stats_are_dropped() {
        let raw = stats(r#"{"nodes":{"b":{"name":"n2"},"a":{"name":"n1"}}}"#);
        let cat_nodes = cat(r#"[{"name":"n1"},{"name":"n2"},{"name":"ghost"}]"#);
        let nodes = reconcile(&raw, &cat_nodes, &shards(&["ghost", "n2"]));

        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(nodes[0].shards, 0);
        assert_eq!(nodes[1].shards, 1);
    }

    #[test]
    fn test_shards_counted_without_cat_entry() {
        let raw = stats(r#"{"nodes":{"a":{"name":"n1"}}}"#);
        let node = &reconcile(&raw, &[], &shards(&["n1", "n1"]))[0];
        assert_eq!(node.shards, 2);
    }

    #[test]
    fn test_attributes_sorted_by_key() {
        let node = &reconcile(&stats(FULL_NODE), &[], &ShardCounts::default())[0];
        assert_eq!(node.attributes, "rack: r7, zone: eu-1b");
        assert_eq!(format_attributes(&BTreeMap::new()), "");
    }
}
