//! Router-level tests for the map API.
//!
//! These run against in-memory snapshots; the pool is lazy and never
//! connects, so no database is required.

mod common;

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::Value;

use alumnimap::state::load_from_records;

use common::{alumnus, create_test_app, create_test_state, curated, StubGeocoder};

fn world_query(zoom: f64) -> Vec<(&'static str, String)> {
    vec![
        ("west", "-180".to_string()),
        ("south", "-85".to_string()),
        ("east", "180".to_string()),
        ("north", "85".to_string()),
        ("zoom", zoom.to_string()),
    ]
}

#[tokio::test]
async fn clusters_endpoint_reports_not_ready_before_first_load() {
    let state = create_test_state(Arc::new(StubGeocoder(vec![])));
    let server = TestServer::new(create_test_app(state)).unwrap();

    let mut request = server.get("/map/clusters");
    for (k, v) in world_query(4.0) {
        request = request.add_query_param(k, v);
    }
    let response = request.await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ready"], Value::Bool(false));
    assert!(body["clusters"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn clusters_endpoint_returns_the_draw_list() {
    let state = create_test_state(Arc::new(StubGeocoder(vec![])));
    let table = vec![curated("Example University", &[], 42.36, -71.06)];
    let alumni = vec![
        alumnus("Amy", "Adams", Some("Example University")),
        alumnus("Ben", "Brown", Some("Example University")),
    ];
    load_from_records(&state, &table, &alumni).await;

    let server = TestServer::new(create_test_app(state)).unwrap();
    let mut request = server.get("/map/clusters");
    for (k, v) in world_query(8.0) {
        request = request.add_query_param(k, v);
    }
    let response = request.await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["ready"], Value::Bool(true));
    let clusters = body["clusters"].as_array().unwrap();
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0]["type"], "cluster");
    assert_eq!(clusters[0]["point_count"], 2);
}

#[tokio::test]
async fn click_at_top_of_ladder_returns_the_member_list() {
    let state = create_test_state(Arc::new(StubGeocoder(vec![])));
    let table = vec![curated("Example University", &[], 42.36, -71.06)];
    let alumni = vec![
        alumnus("Dee", "Diaz", Some("Example University")),
        alumnus("Eli", "Evans", Some("Example University")),
    ];
    load_from_records(&state, &table, &alumni).await;

    let server = TestServer::new(create_test_app(state)).unwrap();

    let mut request = server.get("/map/clusters");
    for (k, v) in world_query(16.0) {
        request = request.add_query_param(k, v);
    }
    let body: Value = request.await.json();
    let cluster_id = body["clusters"][0]["cluster_id"].as_u64().unwrap();

    let response = server
        .get(&format!("/map/clusters/{cluster_id}/click"))
        .add_query_param("zoom", 16.0)
        .await;
    response.assert_status_ok();
    let plan: Value = response.json();
    assert_eq!(plan["action"], "list");
    assert_eq!(plan["members"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn click_low_on_the_ladder_returns_a_zoom_step() {
    let state = create_test_state(Arc::new(StubGeocoder(vec![])));
    let table = vec![curated("Example University", &[], 42.36, -71.06)];
    let alumni = vec![
        alumnus("Amy", "Adams", Some("Example University")),
        alumnus("Ben", "Brown", Some("Example University")),
    ];
    load_from_records(&state, &table, &alumni).await;

    let server = TestServer::new(create_test_app(state)).unwrap();

    let mut request = server.get("/map/clusters");
    for (k, v) in world_query(5.0) {
        request = request.add_query_param(k, v);
    }
    let body: Value = request.await.json();
    let cluster_id = body["clusters"][0]["cluster_id"].as_u64().unwrap();

    let plan: Value = server
        .get(&format!("/map/clusters/{cluster_id}/click"))
        .add_query_param("zoom", 5.0)
        .await
        .json();
    assert_eq!(plan["action"], "zoom");
    assert_eq!(plan["zoom"], 8.0);
}

#[tokio::test]
async fn stale_cluster_id_is_a_noop() {
    let state = create_test_state(Arc::new(StubGeocoder(vec![])));
    let table = vec![curated("Example University", &[], 42.36, -71.06)];
    let alumni = vec![
        alumnus("Amy", "Adams", Some("Example University")),
        alumnus("Ben", "Brown", Some("Example University")),
    ];
    load_from_records(&state, &table, &alumni).await;

    let server = TestServer::new(create_test_app(state.clone())).unwrap();

    let mut request = server.get("/map/clusters");
    for (k, v) in world_query(8.0) {
        request = request.add_query_param(k, v);
    }
    let body: Value = request.await.json();
    let stale_id = body["clusters"][0]["cluster_id"].as_u64().unwrap();

    // Dataset reloads; the drawn cluster id no longer exists.
    load_from_records(&state, &table, &alumni).await;

    let plan: Value = server
        .get(&format!("/map/clusters/{stale_id}/click"))
        .add_query_param("zoom", 8.0)
        .await
        .json();
    assert_eq!(plan["action"], "noop");

    let children = server
        .get(&format!("/map/clusters/{stale_id}/children"))
        .await;
    children.assert_status_ok();
    let children: Value = children.json();
    assert!(children.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unmapped_report_lists_unresolved_college_names() {
    let state = create_test_state(Arc::new(StubGeocoder(vec![])));
    let alumni = vec![
        alumnus("Fay", "Ford", Some("Mystery College")),
        alumnus("Gus", "Gray", Some("Mystery College")),
        alumnus("Hal", "Hunt", Some("US Army")),
    ];
    load_from_records(&state, &[], &alumni).await;

    let server = TestServer::new(create_test_app(state)).unwrap();
    let response = server.get("/reports/unmapped").await;

    response.assert_status_ok();
    let groups: Value = response.json();
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["college_name"], "Mystery College");
    assert_eq!(groups[0]["student_count"], 2);
    assert_eq!(groups[0]["students"].as_array().unwrap().len(), 2);
}
