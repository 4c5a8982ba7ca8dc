mod common;

use common::{impatient_service, profile_for, service};
use elasticgaze_devkit::fixtures::{cat_nodes_body, cat_shards_body, nodes_body};
use elasticgaze_devkit::test_utils::{CAT_NODES, CAT_SHARDS, NODES_STATS};
use elasticgaze_devkit::{NodeFixture, StubResponse, TestHarness};
use std::time::Duration;

fn three_nodes() -> Vec<NodeFixture> {
    vec![
        NodeFixture::new("id-b", "es-2").ip("10.0.0.2").roles(&["data_hot", "ingest"]).role_string("hi"),
        NodeFixture::new("id-a", "es-1")
            .master()
            .roles(&["master"])
            .role_string("m")
            .attribute("zone", "eu-1b")
            .attribute("rack", "r7"),
        NodeFixture::new("id-c", "es-3").ip("10.0.0.3").without_cat(),
    ]
}

#[tokio::test]
async fn test_nodes_reconciled_in_id_order() {
    let nodes = three_nodes();
    let mut harness = TestHarness::healthy_cluster(&nodes).await.unwrap();
    harness
        .stub
        .on_get(CAT_SHARDS, cat_shards_body(&[("es-1", 4), ("es-2", 2), ("ghost", 5)], 3));

    let response = service().nodes(&profile_for(&harness)).await;
    assert!(response.success, "{:?}", response.error);
    assert!(response.error.is_none());

    let ids: Vec<_> = response.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["id-a", "id-b", "id-c"]);

    let master = &response.nodes[0];
    assert!(master.master);
    assert_eq!(master.role_string, "m");
    assert_eq!(master.attributes, "rack: r7, zone: eu-1b");
    assert_eq!(master.load, "0.50 / 0.75 / 1.00");
    assert_eq!(master.ram_percent, 75.0);
    assert_eq!(master.heap_percent, 25.0);
    assert_eq!(master.disk_percent, 40.0);
    assert_eq!(master.shards, 4);

    let data = &response.nodes[1];
    assert!(!data.master);
    assert_eq!(data.ip, "10.0.0.2");
    assert_eq!(data.roles, ["data_hot", "ingest"]);
    assert_eq!(data.shards, 2);

    let uncatalogued = &response.nodes[2];
    assert!(!uncatalogued.master);
    assert_eq!(uncatalogued.role_string, "");
    assert_eq!(uncatalogued.load, "0.5 / 0.75 / 1");
    assert_eq!(uncatalogued.shards, 0);

    harness
        .expect_requests(NODES_STATS, 1)
        .expect_requests(CAT_NODES, 1)
        .expect_requests(CAT_SHARDS, 1);
    harness.verify_expectations().unwrap();
}

#[tokio::test]
async fn test_cat_values_fill_zero_readings() {
    let node = NodeFixture::new("id-1", "n1").cpu(0.0).cat("cpu", "42.5");
    let harness = TestHarness::healthy_cluster(&[node]).await.unwrap();
    harness.stub.on_get(CAT_SHARDS, cat_shards_body(&[("n1", 3)], 0));

    let response = service().nodes(&profile_for(&harness)).await;
    assert!(response.success);
    assert_eq!(response.nodes[0].cpu_percent, 42.5);
    assert_eq!(response.nodes[0].shards, 3);
}

#[tokio::test]
async fn test_zero_totals_report_zero_percent() {
    let node = NodeFixture::new("id-1", "n1")
        .memory(0, 0)
        .heap(512, 0)
        .disk(0, 0)
        .cat("ram.percent", "")
        .cat("heap.percent", "")
        .cat("disk.percent", "");
    let harness = TestHarness::healthy_cluster(&[node]).await.unwrap();

    let response = service().nodes(&profile_for(&harness)).await;
    let node = &response.nodes[0];
    for value in [node.ram_percent, node.heap_percent, node.disk_percent] {
        assert!(value.is_finite());
        assert_eq!(value, 0.0);
    }
}

#[tokio::test]
async fn test_shard_failure_keeps_nodes() {
    let harness = TestHarness::healthy_cluster(&three_nodes()).await.unwrap();
    harness.respond(CAT_SHARDS, StubResponse::status(500));

    let response = service().nodes(&profile_for(&harness)).await;
    assert!(response.success);
    assert_eq!(response.nodes.len(), 3);
    assert!(response.nodes.iter().all(|n| n.shards == 0));
}

#[tokio::test]
async fn test_shard_timeout_keeps_nodes() {
    let harness = TestHarness::healthy_cluster(&three_nodes()).await.unwrap();
    harness.respond(
        CAT_SHARDS,
        StubResponse::json(cat_shards_body(&[("es-1", 2)], 0)).with_delay(Duration::from_secs(3)),
    );

    let response = impatient_service().nodes(&profile_for(&harness)).await;
    assert!(response.success, "{:?}", response.error);
    assert!(response.nodes.iter().all(|n| n.shards == 0));
}

#[tokio::test]
async fn test_nodes_stats_failure_fails_call() {
    let harness = TestHarness::healthy_cluster(&three_nodes()).await.unwrap();
    harness.respond(NODES_STATS, StubResponse::status(500));

    let response = service().nodes(&profile_for(&harness)).await;
    assert!(!response.success);
    assert!(response.nodes.is_empty());
    let error = response.error.unwrap();
    assert!(error.contains("nodes stats"), "{error}");
    assert!(error.contains("500"), "{error}");
}

#[tokio::test]
async fn test_cat_nodes_failure_fails_call() {
    let harness = TestHarness::healthy_cluster(&three_nodes()).await.unwrap();
    harness.respond(CAT_NODES, StubResponse::text(200, "<html>proxy error</html>"));

    let err = service().collect_nodes(&profile_for(&harness)).await.unwrap_err();
    assert_eq!(err.code(), "DECODE_ERROR");
    assert!(err.to_string().contains("cat nodes"));
}

#[tokio::test]
async fn test_basic_auth_without_password_sends_nothing() {
    let harness = TestHarness::healthy_cluster(&three_nodes()).await.unwrap();
    let mut profile = profile_for(&harness).with_basic_auth("elastic", "changeme");
    profile.password = None;

    let response = service().nodes(&profile).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("username and password required"));
    assert_eq!(harness.get_stats().total_requests, 0);
}

#[tokio::test]
async fn test_credentials_sent_to_every_endpoint() {
    let harness = TestHarness::healthy_cluster(&three_nodes()).await.unwrap();

    let profile = profile_for(&harness).with_basic_auth("elastic", "changeme");
    assert!(service().nodes(&profile).await.success);
    for path in [NODES_STATS, CAT_NODES, CAT_SHARDS] {
        harness
            .assert_authorization(path, "Basic ZWxhc3RpYzpjaGFuZ2VtZQ==")
            .unwrap();
    }

    let mut harness = harness;
    harness.reset();
    let profile = profile_for(&harness).with_api_key("a2V5OnNlY3JldA==");
    assert!(service().nodes(&profile).await.success);
    harness.assert_authorization(NODES_STATS, "ApiKey a2V5OnNlY3JldA==").unwrap();
}

#[tokio::test]
async fn test_requests_carry_headers_and_cat_columns() {
    let harness = TestHarness::healthy_cluster(&three_nodes()).await.unwrap();
    service().nodes(&profile_for(&harness)).await;

    let cat = &harness.requests_for(CAT_NODES)[0];
    assert_eq!(cat.content_type.as_deref(), Some("application/json"));
    assert_eq!(cat.user_agent.as_deref(), Some("ElasticGaze/1.0"));
    assert!(cat.query.as_deref().unwrap().starts_with("format=json&h=ip,heap.percent"));

    let shards = &harness.requests_for(CAT_SHARDS)[0];
    assert_eq!(shards.query.as_deref(), Some("format=json&h=node"));
}

#[tokio::test]
async fn test_empty_cluster() {
    let harness = TestHarness::start().await.unwrap();
    harness
        .stub
        .on_get(NODES_STATS, nodes_body(&[]))
        .on_get(CAT_NODES, cat_nodes_body(&[]))
        .on_get(CAT_SHARDS, cat_shards_body(&[], 0));

    let response = service().nodes(&profile_for(&harness)).await;
    assert!(response.success);
    assert!(response.nodes.is_empty());
}
