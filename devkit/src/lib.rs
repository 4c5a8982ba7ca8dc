/*!
# ElasticGaze DevKit - Stubs and Utilities for Testing

Lets the engine be exercised without a real cluster:
- Stub Elasticsearch server with canned responses and request recording
- Fixtures for realistic `_nodes`, `_cat`, health and stats bodies
- Test harness with request expectations
*/

pub mod es_stub;
pub mod fixtures;
pub mod test_utils;

pub use es_stub::{EsStub, RecordedRequest, StubResponse};
pub use fixtures::NodeFixture;
pub use test_utils::TestHarness;
