/*!
Realistic Elasticsearch response bodies

`NodeFixture` describes one node once and renders both its `_nodes` entry and
its `_cat/nodes` row, so the two views stay consistent unless a test
deliberately makes them diverge.
*/

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct NodeFixture {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub version: String,
    pub roles: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub cpu_percent: f64,
    pub mem_total: i64,
    pub mem_free: i64,
    pub heap_used: i64,
    pub heap_max: i64,
    pub disk_total: i64,
    pub disk_available: i64,
    pub load: [f64; 3],
    /// Elected master (`*` in cat nodes)
    pub master: bool,
    pub role_string: String,
    /// Cat cells overriding the values derived from the fields above
    pub cat_overrides: Map<String, Value>,
    /// Render the node in node stats only
    pub skip_cat: bool,
}

impl NodeFixture {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ip: "10.0.0.1".to_string(),
            version: "8.14.0".to_string(),
            roles: vec!["master".into(), "data".into(), "ingest".into()],
            attributes: BTreeMap::new(),
            cpu_percent: 12.0,
            mem_total: 16 * 1024 * 1024 * 1024,
            mem_free: 4 * 1024 * 1024 * 1024,
            heap_used: 1024 * 1024 * 1024,
            heap_max: 4 * 1024 * 1024 * 1024,
            disk_total: 100 * 1024 * 1024 * 1024,
            disk_available: 60 * 1024 * 1024 * 1024,
            load: [0.5, 0.75, 1.0],
            master: false,
            role_string: "dim".to_string(),
            cat_overrides: Map::new(),
            skip_cat: false,
        }
    }

    pub fn ip(mut self, ip: &str) -> Self {
        self.ip = ip.to_string();
        self
    }

    pub fn roles(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn cpu(mut self, percent: f64) -> Self {
        self.cpu_percent = percent;
        self
    }

    pub fn memory(mut self, total: i64, free: i64) -> Self {
        self.mem_total = total;
        self.mem_free = free;
        self
    }

    pub fn heap(mut self, used: i64, max: i64) -> Self {
        self.heap_used = used;
        self.heap_max = max;
        self
    }

    pub fn disk(mut self, total: i64, available: i64) -> Self {
        self.disk_total = total;
        self.disk_available = available;
        self
    }

    pub fn load(mut self, one: f64, five: f64, fifteen: f64) -> Self {
        self.load = [one, five, fifteen];
        self
    }

    pub fn master(mut self) -> Self {
        self.master = true;
        self
    }

    pub fn role_string(mut self, roles: &str) -> Self {
        self.role_string = roles.to_string();
        self
    }

    /// Override one cat nodes cell, e.g. `cat("cpu", "42.5")`
    pub fn cat(mut self, column: &str, value: &str) -> Self {
        self.cat_overrides.insert(column.to_string(), Value::String(value.to_string()));
        self
    }

    /// Null one cat nodes cell
    pub fn cat_null(mut self, column: &str) -> Self {
        self.cat_overrides.insert(column.to_string(), Value::Null);
        self
    }

    pub fn without_cat(mut self) -> Self {
        self.skip_cat = true;
        self
    }

    /// Entry under `nodes.<id>` in a `_nodes` response
    pub fn to_stats_json(&self) -> Value {
        json!({
            "name": self.name,
            "transport_address": format!("{}:9300", self.ip),
            "host": self.ip,
            "ip": self.ip,
            "version": self.version,
            "roles": self.roles,
            "attributes": self.attributes,
            "os": {
                "cpu": {"percent": self.cpu_percent},
                "mem": {"total_in_bytes": self.mem_total, "free_in_bytes": self.mem_free},
                "load_average": {"1m": self.load[0], "5m": self.load[1], "15m": self.load[2]}
            },
            "jvm": {
                "mem": {"heap_used_in_bytes": self.heap_used, "heap_max_in_bytes": self.heap_max}
            },
            "fs": {
                "total": {"total_in_bytes": self.disk_total, "available_in_bytes": self.disk_available}
            }
        })
    }

    /// Row of `_cat/nodes?format=json`, every cell a string
    pub fn to_cat_json(&self) -> Value {
        let percent = |used: i64, total: i64| {
            if total > 0 {
                (used * 100 / total).to_string()
            } else {
                "0".to_string()
            }
        };

        let mut row = json!({
            "ip": self.ip,
            "heap.percent": percent(self.heap_used, self.heap_max),
            "ram.percent": percent(self.mem_total - self.mem_free, self.mem_total),
            "cpu": format!("{}", self.cpu_percent),
            "load_1m": format!("{:.2}", self.load[0]),
            "load_5m": format!("{:.2}", self.load[1]),
            "load_15m": format!("{:.2}", self.load[2]),
            "node.role": self.role_string,
            "master": if self.master { "*" } else { "-" },
            "name": self.name,
            "disk.avail": format!("{}b", self.disk_available),
            "disk.used": format!("{}b", self.disk_total - self.disk_available),
            "disk.total": format!("{}b", self.disk_total),
            "disk.percent": percent(self.disk_total - self.disk_available, self.disk_total),
        });

        if let Value::Object(cells) = &mut row {
            for (column, value) in &self.cat_overrides {
                cells.insert(column.clone(), value.clone());
            }
        }
        row
    }
}

/// `GET /_nodes` body
pub fn nodes_body(nodes: &[NodeFixture]) -> Value {
    let entries: Map<String, Value> = nodes
        .iter()
        .map(|n| (n.id.clone(), n.to_stats_json()))
        .collect();
    json!({
        "_nodes": {"total": nodes.len(), "successful": nodes.len(), "failed": 0},
        "cluster_name": "gaze-test",
        "nodes": entries
    })
}

/// `GET /_cat/nodes` body; nodes marked `without_cat` are left out
pub fn cat_nodes_body(nodes: &[NodeFixture]) -> Value {
    Value::Array(
        nodes
            .iter()
            .filter(|n| !n.skip_cat)
            .map(NodeFixture::to_cat_json)
            .collect(),
    )
}

/// `GET /_cat/shards?h=node` body: `count` rows per node name plus unassigned rows
pub fn cat_shards_body(assigned: &[(&str, usize)], unassigned: usize) -> Value {
    let mut rows = Vec::new();
    for (node, count) in assigned {
        rows.extend(std::iter::repeat_with(|| json!({"node": node})).take(*count));
    }
    rows.extend(std::iter::repeat_with(|| json!({"node": null})).take(unassigned));
    Value::Array(rows)
}

/// `GET /` body
pub fn cluster_info_body(cluster_name: &str, version: &str) -> Value {
    json!({
        "name": "node-1",
        "cluster_name": cluster_name,
        "cluster_uuid": "k2Pq8v1TQd2mI0aEYxkE3w",
        "version": {
            "number": version,
            "build_flavor": "default",
            "build_type": "docker",
            "build_hash": "1c5c3e1a9b7f0d2e4a6b8c0d1e2f3a4b5c6d7e8f",
            "build_date": "2024-06-03T10:21:32.183Z",
            "build_snapshot": false,
            "lucene_version": "9.10.0",
            "minimum_wire_compatibility_version": "7.17.0",
            "minimum_index_compatibility_version": "7.0.0"
        },
        "tagline": "You Know, for Search"
    })
}

/// `GET /_cluster/health` body
pub fn cluster_health_body(status: &str, nodes: u64, active_primary: u64, active_total: u64) -> Value {
    json!({
        "cluster_name": "gaze-test",
        "status": status,
        "timed_out": false,
        "number_of_nodes": nodes,
        "number_of_data_nodes": nodes,
        "active_primary_shards": active_primary,
        "active_shards": active_total,
        "relocating_shards": 0,
        "initializing_shards": 0,
        "unassigned_shards": 0,
        "delayed_unassigned_shards": 0,
        "number_of_pending_tasks": 0,
        "number_of_in_flight_fetch": 0,
        "task_max_waiting_in_queue_millis": 0,
        "active_shards_percent_as_number": 100.0
    })
}

/// `GET /_stats` body
pub fn indices_stats_body(doc_count: u64, size_in_bytes: u64) -> Value {
    json!({
        "_shards": {"total": 10, "successful": 10, "failed": 0},
        "_all": {
            "primaries": {
                "docs": {"count": doc_count, "deleted": 0},
                "store": {"size_in_bytes": size_in_bytes / 2}
            },
            "total": {
                "docs": {"count": doc_count, "deleted": 0},
                "store": {"size_in_bytes": size_in_bytes}
            }
        },
        "indices": {}
    })
}

/// `GET /_cat/indices` body from `(name, health, docs)` triples
pub fn cat_indices_body(indices: &[(&str, &str, u64)]) -> Value {
    Value::Array(
        indices
            .iter()
            .enumerate()
            .map(|(i, (name, health, docs))| {
                json!({
                    "index": name,
                    "health": health,
                    "status": "open",
                    "uuid": format!("uuid-{i}"),
                    "pri": "1",
                    "rep": "1",
                    "docs.count": docs.to_string(),
                    "docs.deleted": "0",
                    "store.size": "12.4kb",
                    "pri.store.size": "6.2kb",
                    "creation.date": "1700000000000",
                    "creation.date.string": "2023-11-14T22:13:20.000Z",
                    "segments.count": "2"
                })
            })
            .collect(),
    )
}
