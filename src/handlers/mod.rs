use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod hackathon;
pub mod leaderboard;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "mlsc-api",
    };

    success(payload, "Health check successful")
}
