//! Shared test harness: the full router over the in-memory store.
#![allow(dead_code)]

use std::sync::Arc;

use atria::{api::create_router, config::Config, db::InMemoryResourceStore, state::AppState};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryResourceStore::new());
        let state = AppState::with_store(Config::default(), store);
        Self {
            router: create_router(state),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// POST a raw body, bypassing JSON serialization. For malformed-payload
    /// cases.
    pub async fn post_raw(&self, uri: &str, body: &str) -> StatusCode {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        response.status()
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// POST a payload and return the server-assigned id, asserting 201.
    pub async fn create(&self, uri: &str, body: Value) -> String {
        let (status, created) = self.post_json(uri, body).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
        created["id"].as_str().unwrap().to_string()
    }
}

// Payload builders. Each produces the minimal valid payload for its kind;
// tests mutate the result when they need more.

pub fn claim(fhir_id: &str, status: &str) -> Value {
    json!({
        "fhirId": fhir_id,
        "status": status,
        "use": "claim",
        "patientId": "patient-123",
        "total": { "value": 1250.00, "currency": "USD" }
    })
}

pub fn claim_response(fhir_id: &str, request_id: Option<&str>) -> Value {
    let mut payload = json!({
        "fhirId": fhir_id,
        "status": "active",
        "outcome": "complete",
        "patientId": "patient-123"
    });
    if let Some(request_id) = request_id {
        payload["requestId"] = json!(request_id);
    }
    payload
}

pub fn coverage(fhir_id: &str) -> Value {
    json!({
        "fhirId": fhir_id,
        "status": "active",
        "patientId": "patient-123",
        "plan": { "text": "Gold PPO" }
    })
}

pub fn practitioner(fhir_id: &str, npi: &str, family: &str) -> Value {
    json!({
        "fhirId": fhir_id,
        "npi": npi,
        "name": { "family": family, "given": ["Alex"] }
    })
}

pub fn patient(fhir_id: &str, mrn: &str, family: &str) -> Value {
    json!({
        "fhirId": fhir_id,
        "mrn": mrn,
        "name": { "family": family, "given": ["Sam"] },
        "birthDate": "1984-03-12"
    })
}

pub fn task(fhir_id: &str, input: Value) -> Value {
    json!({
        "fhirId": fhir_id,
        "status": "requested",
        "intent": "order",
        "description": "Nightly eligibility sync",
        "input": input
    })
}

pub fn charge(fhir_id: &str) -> Value {
    json!({
        "fhirId": fhir_id,
        "status": "planned",
        "patientId": "patient-123",
        "code": { "text": "99213" },
        "quantity": 1,
        "unitPrice": { "value": 125.00, "currency": "USD" }
    })
}
