#![allow(dead_code)]

use elasticgaze_core::{ClusterService, ConnectionProfile, HttpSettings};
use elasticgaze_devkit::TestHarness;
use tracing::info_span;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Profile pointing at the harness stub
pub fn profile_for(harness: &TestHarness) -> ConnectionProfile {
    ConnectionProfile::new(harness.host(), harness.port()).named("stub")
}

/// Service logging under a per-test span
pub fn service() -> ClusterService {
    init_tracing();
    ClusterService::from_settings(&HttpSettings::default())
        .unwrap()
        .with_span(info_span!("test"))
}

/// Service whose requests give up after one second
pub fn impatient_service() -> ClusterService {
    init_tracing();
    let settings = HttpSettings {
        timeout_secs: 1,
        ..HttpSettings::default()
    };
    ClusterService::from_settings(&settings).unwrap()
}
