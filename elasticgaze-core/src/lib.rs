/*!
# ElasticGaze Core - Cluster Telemetry Aggregation

Reads an Elasticsearch cluster's REST API and turns it into a normalized
operator view:
- Per-node telemetry reconciled from node stats, cat nodes and shards
- Cluster dashboard (info, health, role counts, shard and index totals)
- Connection checks with coded outcomes
- Index listing, creation and deletion

```no_run
use elasticgaze_core::{ClusterService, ConnectionProfile, HttpSettings};

# async fn run() -> elasticgaze_core::Result<()> {
let service = ClusterService::from_settings(&HttpSettings::default())?;
let profile = ConnectionProfile::new("localhost", 9200).with_basic_auth("elastic", "changeme");
let nodes = service.nodes(&profile).await;
println!("{} nodes", nodes.nodes.len());
# Ok(())
# }
```
*/

pub mod config;
pub mod connection;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod indices;
pub mod models;
pub mod nodes;
pub mod profile;
pub mod service;
pub mod transport;

pub use config::{GazeConfig, HttpSettings, LoggingConfig};
pub use connection::ConnectionCheck;
pub use dashboard::format_bytes;
pub use error::{AuthError, GazeError, Result};
pub use fetch::Endpoint;
pub use indices::{CreateIndexRequest, CreateIndexResponse, DeleteIndexResponse, IndexInfo, IndicesResponse};
pub use models::{ClusterHealth, ClusterInfo, ClusterSnapshot, DashboardResponse, NodesResponse, NormalizedNode};
pub use profile::{AuthMethod, ConnectionProfile};
pub use service::ClusterService;
pub use transport::EsClient;
