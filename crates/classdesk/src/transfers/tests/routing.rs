use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::transfers::domain::{ClassId, StudentId};
use crate::transfers::router::{student_candidates_handler, StudentCandidatesRequest};

fn post_json(uri: &str, body: Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serializable body"),
        ))
        .expect("request builds")
}

#[tokio::test]
async fn candidates_handler_returns_ranked_classes() {
    let (service, _, _) = build_service();

    let response = student_candidates_handler::<MemoryCatalog, MemoryLedger>(
        State(Arc::new(service)),
        axum::Json(StudentCandidatesRequest {
            source_class_id: ClassId::new("M9-A"),
            student_ids: vec![StudentId::new("stu-1")],
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let eligible: Vec<&str> = payload["eligible"]
        .as_array()
        .expect("eligible array")
        .iter()
        .filter_map(|class| class["id"].as_str())
        .collect();
    assert_eq!(eligible, vec!["M9-B", "M9-C", "M9-D"]);
    assert_eq!(payload["rejected"][0]["reason"]["reason"], json!("same_class"));
}

#[tokio::test]
async fn candidates_route_returns_unprocessable_for_empty_selection() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/transfers/students/candidates",
            json!({ "source_class_id": "M9-A", "student_ids": [] }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn commit_route_creates_transfer() {
    let (service, _, ledger) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/transfers/students",
            json!({
                "source_class_id": "M9-A",
                "destination_class_id": "M9-C",
                "student_ids": ["stu-1", "stu-2"],
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["commit"]["kind"], json!("students"));
    assert_eq!(payload["commit"]["destination_class_id"], json!("M9-C"));
    assert_eq!(ledger.receipts().len(), 1);
}

#[tokio::test]
async fn commit_route_returns_conflict_with_reason() {
    let (service, _, ledger) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/transfers/students",
            json!({
                "source_class_id": "M9-A",
                "destination_class_id": "M9-D",
                "student_ids": ["stu-1", "stu-2"],
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert_eq!(payload["code"], json!("insufficient_capacity"));
    assert_eq!(payload["detail"]["available"], json!(1));
    assert!(ledger.receipts().is_empty());
}

#[tokio::test]
async fn unknown_class_returns_not_found() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/transfers/teachers/validate",
            json!({
                "source_class_id": "missing",
                "teacher_id": "t-new",
                "effective_date": "2025-09-01",
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn teacher_validation_route_reports_verdict() {
    let mut classes = campus();
    classes[0] = handover_class();
    let catalog = Arc::new(MemoryCatalog::with_classes(classes));
    let mut inactive = teacher("t-away", &["math"]);
    inactive.active = false;
    catalog.add_teacher(inactive, Vec::new());
    let service = crate::transfers::TransferService::new(
        catalog,
        Arc::new(MemoryLedger::default()),
        crate::transfers::TransferEligibilityResolver::new(),
    );
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/transfers/teachers/validate",
            json!({
                "source_class_id": "M9-A",
                "teacher_id": "t-away",
                "effective_date": "2025-09-01",
                "substitute_end_date": "2025-09-14",
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["eligible"], json!(false));
    assert_eq!(payload["result"]["verdict"], json!("ineligible"));
    assert_eq!(payload["result"]["reason"], json!("inactive"));
    assert_eq!(payload["summary"], json!("teacher is inactive"));
}

#[tokio::test]
async fn inverted_window_is_unprocessable() {
    let mut classes = campus();
    classes[0] = handover_class();
    let catalog = Arc::new(MemoryCatalog::with_classes(classes));
    catalog.add_teacher(teacher("t-new", &["math"]), Vec::new());
    let service = crate::transfers::TransferService::new(
        catalog,
        Arc::new(MemoryLedger::default()),
        crate::transfers::TransferEligibilityResolver::new(),
    );
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/transfers/teachers",
            json!({
                "source_class_id": "M9-A",
                "teacher_id": "t-new",
                "effective_date": "2025-09-14",
                "substitute_end_date": "2025-09-01",
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn repeated_student_ids_are_unprocessable() {
    let (service, _, ledger) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/transfers/students",
            json!({
                "source_class_id": "M9-A",
                "destination_class_id": "M9-D",
                "student_ids": ["stu-1", "stu-1"],
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], json!("student stu-1 is selected more than once"));
    assert!(ledger.receipts().is_empty());
}
