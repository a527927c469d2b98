use axum::routing::{get, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::hackathon::{
    create_hackathon, default_fields, delete_hackathon, list_hackathons, update_hackathon,
};
use crate::handlers::health_check;
use crate::handlers::leaderboard::{launchpad_leaderboard, launchpad_rank};
use crate::state::AppState;

pub fn create_routes(state: AppState, cors_origins: &[String], include_hsts: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/hackathons", get(list_hackathons).post(create_hackathon))
        .route("/hackathons/default-fields", get(default_fields))
        .route(
            "/hackathons/:hackathon_id",
            put(update_hackathon).delete(delete_hackathon),
        )
        .route("/launchpad/leaderboard", get(launchpad_leaderboard))
        .route("/launchpad/leaderboard/:user_id", get(launchpad_rank))
        .layer(TraceLayer::new_for_http());

    create_security_headers_layer(router, include_hsts)
        .layer(create_cors_layer(cors_origins))
        .with_state(state)
}
