//! Storage seam.
//!
//! Handlers only talk to [`Store`]. Production wires in [`PgStore`]; the
//! handler tests wire in an in-memory store with the same semantics.

use async_trait::async_trait;

use crate::config::LaunchpadConfig;
use crate::models::hackathon::{HackathonPayload, HackathonView};
use crate::models::leaderboard::LeaderboardEntry;
use crate::models::user::User;
use crate::utils::error::AppError;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Resolves an unexpired bearer token to its active user.
    async fn user_for_token(&self, token: &str) -> StoreResult<Option<User>>;

    async fn list_hackathons(&self) -> StoreResult<Vec<HackathonView>>;

    async fn hackathon_exists(&self, id: &str) -> StoreResult<bool>;

    async fn organization_exists(&self, id: &str) -> StoreResult<bool>;

    async fn district_exists(&self, id: &str) -> StoreResult<bool>;

    /// Persists a validated payload with `actor` as organiser. Returns the new id.
    async fn create_hackathon(
        &self,
        payload: &HackathonPayload,
        actor: &str,
    ) -> StoreResult<String>;

    /// Full replace of a hackathon. `Ok(false)` when the id does not exist.
    async fn update_hackathon(
        &self,
        id: &str,
        payload: &HackathonPayload,
        actor: &str,
    ) -> StoreResult<bool>;

    /// Hard delete including form fields and organiser links.
    /// `Ok(false)` when the id does not exist.
    async fn delete_hackathon(&self, id: &str) -> StoreResult<bool>;

    /// Ranked launchpad standings, best first.
    async fn launchpad_leaderboard(
        &self,
        scope: &LaunchpadConfig,
    ) -> StoreResult<Vec<LeaderboardEntry>>;

    /// Standing of a single user; `None` if the user does not qualify.
    async fn launchpad_rank(
        &self,
        scope: &LaunchpadConfig,
        user_id: &str,
    ) -> StoreResult<Option<LeaderboardEntry>>;
}
