//! Unit tests for backend adapters: in-memory storage, CCDB URLs and the
//! `PostgreSQL` version query.

use crate::retrieval::{
    adapters::{
        DefaultBackendConnector, ccdb::CcdbObjectBackend, memory::InMemoryObjectBackend,
        postgres::latest_version_query,
    },
    domain::{BackendConfig, RetrievalRequest},
    ports::{BackendConnector, ConnectError, ObjectBackend, RetrievalError},
};
use chrono::DateTime;
use diesel::debug_query;
use diesel::pg::Pg;
use rstest::{fixture, rstest};
use serde_json::json;
use url::Url;

#[fixture]
fn ccdb() -> CcdbObjectBackend {
    let base = Url::parse("http://ccdb.example.org:8080").expect("valid url");
    CcdbObjectBackend::connect(base).expect("client should build")
}

#[rstest]
fn ccdb_url_splits_name_into_segments(ccdb: CcdbObjectBackend) {
    let url = ccdb
        .object_url(&RetrievalRequest::new("qc", "TPC/Clusters/histo"))
        .expect("url should build");

    assert_eq!(
        url.as_str(),
        "http://ccdb.example.org:8080/qc/TPC/Clusters/histo"
    );
}

#[rstest]
fn ccdb_url_percent_encodes_segments(ccdb: CcdbObjectBackend) {
    let url = ccdb
        .object_url(&RetrievalRequest::new("run 1", "a?b"))
        .expect("url should build");

    assert_eq!(url.as_str(), "http://ccdb.example.org:8080/run%201/a%3Fb");
}

#[rstest]
fn ccdb_url_appends_version_millis(ccdb: CcdbObjectBackend) {
    let as_of = DateTime::from_timestamp_millis(1_700_000_000_123).expect("timestamp");
    let url = ccdb
        .object_url(&RetrievalRequest::new("qc", "histo").with_as_of(as_of))
        .expect("url should build");

    assert_eq!(
        url.as_str(),
        "http://ccdb.example.org:8080/qc/histo/1700000000123"
    );
}

#[rstest]
fn ccdb_url_keeps_base_path_prefix() {
    let base = Url::parse("http://ccdb.example.org/browse/").expect("valid url");
    let backend = CcdbObjectBackend::connect(base).expect("client should build");

    let url = backend
        .object_url(&RetrievalRequest::new("qc", "histo"))
        .expect("url should build");

    assert_eq!(url.as_str(), "http://ccdb.example.org/browse/qc/histo");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn memory_backend_returns_latest_version() {
    let backend = InMemoryObjectBackend::new();
    let first = DateTime::from_timestamp_millis(1_000).expect("timestamp");
    let second = DateTime::from_timestamp_millis(2_000).expect("timestamp");
    backend
        .insert_at("agent", "obj", second, json!({"v": 2}))
        .expect("insert should succeed");
    backend
        .insert_at("agent", "obj", first, json!({"v": 1}))
        .expect("insert should succeed");

    let latest = backend
        .retrieve(&RetrievalRequest::new("agent", "obj"))
        .await
        .expect("object should exist");

    assert_eq!(latest, r#"{"v":2}"#);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn memory_backend_reports_not_found_before_first_version() {
    let backend = InMemoryObjectBackend::new();
    let created = DateTime::from_timestamp_millis(5_000).expect("timestamp");
    let before = DateTime::from_timestamp_millis(4_999).expect("timestamp");
    backend
        .insert_at("agent", "obj", created, json!({"v": 1}))
        .expect("insert should succeed");

    let result = backend
        .retrieve(&RetrievalRequest::new("agent", "obj").with_as_of(before))
        .await;

    assert!(matches!(
        result,
        Err(RetrievalError::NotFound { ref namespace, ref name })
            if namespace == "agent" && name == "obj"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn memory_backend_records_received_requests() {
    let backend = InMemoryObjectBackend::new();

    let result = backend.retrieve(&RetrievalRequest::new("nouser", "")).await;

    assert!(result.is_err());
    assert_eq!(
        backend.received_requests().expect("requests"),
        vec![("nouser".to_owned(), String::new())]
    );
}

#[rstest]
fn error_codes_are_stable() {
    let not_found = RetrievalError::not_found(&RetrievalRequest::new("a", "b"));

    assert_eq!(not_found.code(), "not_found");
    assert_eq!(RetrievalError::Abandoned.code(), "abandoned");
    assert_eq!(
        RetrievalError::Status {
            status: 500,
            path: "a/b".to_owned()
        }
        .code(),
        "status"
    );
}

#[rstest]
fn postgres_query_selects_newest_matching_row() {
    let query = latest_version_query("qc", "TPC/histo", None);

    let sql = debug_query::<Pg, _>(&query).to_string();

    assert!(sql.contains(r#""qc_objects"."agent" = $1"#), "{sql}");
    assert!(sql.contains(r#""qc_objects"."object_name" = $2"#), "{sql}");
    assert!(sql.contains(r#"ORDER BY "qc_objects"."created_at" DESC"#), "{sql}");
    assert!(sql.contains("LIMIT $3"), "{sql}");
    assert!(!sql.contains("<="), "{sql}");
}

#[rstest]
fn postgres_query_bounds_versions_by_as_of() {
    let as_of = DateTime::from_timestamp_millis(1_700_000_000_000).expect("timestamp");
    let query = latest_version_query("qc", "histo", Some(as_of));

    let sql = debug_query::<Pg, _>(&query).to_string();

    assert!(sql.contains(r#""qc_objects"."created_at" <= $3"#), "{sql}");
    assert!(sql.contains(r#"ORDER BY "qc_objects"."created_at" DESC"#), "{sql}");
    assert!(sql.contains("LIMIT $4"), "{sql}");
}

#[rstest]
fn unreachable_postgres_host_fails_to_connect() {
    let config = BackendConfig::from_args(&["postgres", "127.0.0.1:1", "qc", "qc", "secret"])
        .expect("valid config");

    let result = DefaultBackendConnector.connect(&config);

    assert!(matches!(
        result,
        Err(ConnectError::Connection {
            backend: "postgres",
            ..
        })
    ));
}
