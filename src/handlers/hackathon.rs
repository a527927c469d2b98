use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use tracing::info;

use crate::models::hackathon::{DefaultFormFields, HackathonPayload};
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};

const NOT_FOUND_MESSAGE: &str = "Hackathon Does Not Exist";

fn payload_from(
    body: Result<Json<HackathonPayload>, JsonRejection>,
) -> Result<HackathonPayload, AppError> {
    body.map(|Json(payload)| payload)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Field checks plus foreign key lookups against the store.
async fn validate(state: &AppState, payload: &HackathonPayload) -> Result<(), AppError> {
    let mut errors = payload.validate();

    if let Some(org_id) = &payload.org_id {
        if !state.store.organization_exists(org_id).await? {
            errors.add(
                "org_id",
                format!("Invalid pk \"{}\" - object does not exist.", org_id),
            );
        }
    }
    if let Some(district_id) = &payload.district_id {
        if !state.store.district_exists(district_id).await? {
            errors.add(
                "district_id",
                format!("Invalid pk \"{}\" - object does not exist.", district_id),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

pub async fn list_hackathons(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> Result<Response, AppError> {
    let hackathons = state.store.list_hackathons().await?;
    Ok(success(hackathons, "Hackathons fetched"))
}

pub async fn create_hackathon(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<HackathonPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let payload = payload_from(body)?;
    validate(&state, &payload).await?;

    let id = state.store.create_hackathon(&payload, &user.id).await?;
    info!(hackathon_id = %id, organiser = %user.id, "Hackathon created");

    Ok(empty_success("Hackathon Created"))
}

pub async fn update_hackathon(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(hackathon_id): Path<String>,
    body: Result<Json<HackathonPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    if !state.store.hackathon_exists(&hackathon_id).await? {
        return Err(AppError::NotFound(NOT_FOUND_MESSAGE.to_string()));
    }

    let payload = payload_from(body)?;
    validate(&state, &payload).await?;

    if !state
        .store
        .update_hackathon(&hackathon_id, &payload, &user.id)
        .await?
    {
        return Err(AppError::NotFound(NOT_FOUND_MESSAGE.to_string()));
    }
    info!(hackathon_id = %hackathon_id, updated_by = %user.id, "Hackathon updated");

    Ok(empty_success("Hackathon Updated"))
}

pub async fn delete_hackathon(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(hackathon_id): Path<String>,
) -> Result<Response, AppError> {
    if !state.store.delete_hackathon(&hackathon_id).await? {
        return Err(AppError::NotFound(NOT_FOUND_MESSAGE.to_string()));
    }
    info!(hackathon_id = %hackathon_id, deleted_by = %user.id, "Hackathon deleted");

    Ok(empty_success("Hackathon Deleted"))
}

pub async fn default_fields(AuthUser(_user): AuthUser) -> Response {
    success(DefaultFormFields, "Default form fields")
}
