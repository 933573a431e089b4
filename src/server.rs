// src/server.rs
use crate::service::SupplyService;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use std::sync::Arc;
use tracing::error;

pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

pub fn router(service: Arc<SupplyService>) -> Router {
    Router::new()
        .route("/", get(circulating_supply))
        .route("/circulating-supply", get(circulating_supply))
        .with_state(service)
}

async fn circulating_supply(State(service): State<Arc<SupplyService>>) -> (StatusCode, String) {
    match service.adjusted_supply().await {
        Ok(value) => (StatusCode::OK, value),
        Err(e) => {
            error!(contract = %service.contract_key(), error = %e, "failed to serve adjusted supply");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR.to_string())
        }
    }
}
