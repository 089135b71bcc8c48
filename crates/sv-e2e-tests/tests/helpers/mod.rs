//! Shared test harness for E2E integration tests.
//!
//! Drives the real Axum router over `tower::oneshot`, with the in-memory
//! store and whichever intent parser the test installs.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use sv_api::inference::IntentParser;
use sv_api::routes::build_router;
use sv_api::state::AppState;

/// End-to-end test harness: seeded state + router.
pub struct TestHarness {
    /// Application state (in-memory, no DB).
    pub state: AppState,
    /// Axum router for HTTP requests via `tower::oneshot`.
    pub router: Router,
}

impl TestHarness {
    /// Harness with the six sample sodas and a rules-only parser.
    pub fn with_sample_data() -> Self {
        let state = AppState::with_sample_data();
        let router = build_router(state.clone());
        Self { state, router }
    }

    /// Harness with the six sample sodas and a custom parser (e.g. one
    /// pointed at a wiremock chat endpoint).
    pub fn with_parser(parser: IntentParser) -> Self {
        let mut state = AppState::with_sample_data();
        state.parser = Arc::new(parser);
        let router = build_router(state.clone());
        Self { state, router }
    }

    /// POST /api/v1/purchase. Returns (HTTP status, response JSON body).
    pub async fn post_purchase(&self, message: &str) -> (StatusCode, serde_json::Value) {
        let body = serde_json::json!({ "message": message });
        let response = self
            .router
            .clone()
            .oneshot(
                Request::post("/api/v1/purchase")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// GET a JSON endpoint.
    pub async fn get_json(&self, path: &str) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// Current stock of a product in the in-memory shelf.
    pub async fn stock_of(&self, name: &str) -> i32 {
        let products = self.state.products.read().await;
        products
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.stock)
            .unwrap_or_else(|| panic!("product '{name}' not on shelf"))
    }
}
