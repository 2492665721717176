//! Tests for the non-CRUD actions: task execution and charge validation.

mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::*;

#[tokio::test]
async fn executing_a_task_completes_it_and_records_the_run() {
    let app = TestApp::new();
    let id = app
        .create("/api/tasks", task("task-1", json!({ "action": "sync" })))
        .await;

    let (status, executed) = app
        .post_json(&format!("/api/tasks/{id}/execute"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(executed["status"], "completed");
    assert_eq!(executed["execution"]["runCount"], 1);
    assert_eq!(executed["execution"]["outcome"], "success");
    assert!(executed["execution"]["lastRunAt"].is_string());

    // The execution record is persisted, not just echoed.
    let (_, fetched) = app.get(&format!("/api/tasks/{id}")).await;
    assert_eq!(fetched["status"], "completed");
    assert_eq!(fetched["execution"]["runCount"], 1);
}

#[tokio::test]
async fn completed_tasks_cannot_be_executed_again() {
    let app = TestApp::new();
    let id = app.create("/api/tasks", task("task-1", json!(null))).await;

    let (status, _) = app
        .post_json(&format!("/api/tasks/{id}/execute"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post_json(&format!("/api/tasks/{id}/execute"), json!({}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("completed"));
}

#[tokio::test]
async fn cancelled_tasks_cannot_be_executed() {
    let app = TestApp::new();
    let id = app.create("/api/tasks", task("task-1", json!(null))).await;

    let mut cancelled = task("task-1", json!(null));
    cancelled["status"] = json!("cancelled");
    let (status, _) = app.put_json(&format!("/api/tasks/{id}"), cancelled).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post_json(&format!("/api/tasks/{id}/execute"), json!({}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn failed_runs_mark_the_task_failed_and_allow_retry() {
    let app = TestApp::new();
    // Scalar input is unusable, so the run fails.
    let id = app
        .create("/api/tasks", task("task-1", json!("not an object")))
        .await;

    let (status, executed) = app
        .post_json(&format!("/api/tasks/{id}/execute"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(executed["status"], "failed");
    assert_eq!(executed["execution"]["outcome"], "error");
    assert!(executed["execution"]["detail"].is_string());

    // Failed is not terminal: a retry runs and bumps the count.
    let (status, retried) = app
        .post_json(&format!("/api/tasks/{id}/execute"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(retried["execution"]["runCount"], 2);
}

#[tokio::test]
async fn executing_a_missing_task_is_not_found() {
    let app = TestApp::new();
    let (status, _) = app
        .post_json(
            "/api/tasks/11111111-1111-1111-1111-111111111111/execute",
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn a_complete_charge_validates_clean() {
    let app = TestApp::new();
    let id = app.create("/api/charges", charge("charge-1")).await;

    let (status, report) = app
        .post_json(&format!("/api/charges/{id}/validate"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["valid"], true);
    assert_eq!(report["issues"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn an_incomplete_charge_reports_each_issue() {
    let app = TestApp::new();
    let id = app
        .create(
            "/api/charges",
            json!({
                "fhirId": "charge-1",
                "status": "planned",
                "patientId": "patient-123"
            }),
        )
        .await;

    let (status, report) = app
        .post_json(&format!("/api/charges/{id}/validate"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["valid"], false);
    let issues = report["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 3);
}

#[tokio::test]
async fn unsupported_currency_is_an_issue() {
    let app = TestApp::new();
    let mut payload = charge("charge-1");
    payload["unitPrice"] = json!({ "value": 125.00, "currency": "JPY" });
    let id = app.create("/api/charges", payload).await;

    let (_, report) = app
        .post_json(&format!("/api/charges/{id}/validate"), json!({}))
        .await;
    assert_eq!(report["valid"], false);
    let issues = report["issues"].as_array().unwrap();
    assert!(issues
        .iter()
        .any(|issue| issue.as_str().unwrap().contains("JPY")));
}

#[tokio::test]
async fn validation_does_not_mutate_the_charge() {
    let app = TestApp::new();
    let id = app
        .create(
            "/api/charges",
            json!({
                "fhirId": "charge-1",
                "status": "planned",
                "patientId": "patient-123"
            }),
        )
        .await;

    let (_, before) = app.get(&format!("/api/charges/{id}")).await;
    app.post_json(&format!("/api/charges/{id}/validate"), json!({}))
        .await;
    let (_, after) = app.get(&format!("/api/charges/{id}")).await;
    assert_eq!(before, after);
}
