use axum::extract::{Path, State};
use axum::response::Response;

use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn launchpad_leaderboard(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> Result<Response, AppError> {
    let entries = state.store.launchpad_leaderboard(&state.launchpad).await?;
    Ok(success(entries, "Leaderboard fetched"))
}

pub async fn launchpad_rank(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let entry = state
        .store
        .launchpad_rank(&state.launchpad, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User Not Ranked".to_string()))?;
    Ok(success(entry, "Rank fetched"))
}
