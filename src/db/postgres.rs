use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::config::LaunchpadConfig;
use crate::models::hackathon::{FormField, Hackathon, HackathonPayload, HackathonView};
use crate::models::leaderboard::LeaderboardEntry;
use crate::models::user::User;

/// Ranks every user qualifying for the launchpad event.
///
/// `$1` event, `$2` intro task hashtag, `$3` allowed org types,
/// `$4` optional user id to narrow the result to. The user filter is applied
/// after ranking so a single lookup still sees the full standings.
const LAUNCHPAD_LEADERBOARD_SQL: &str = r#"
WITH intro_completed AS (
    SELECT DISTINCT kal.user_id
    FROM karma_activity_log kal
    JOIN task_list t ON t.id = kal.task_id
    WHERE t.event = $1
      AND t.hashtag = $2
      AND kal.appraiser_approved
      AND kal.user_id IS NOT NULL
),
org_qualified AS (
    SELECT DISTINCT uol.user_id
    FROM user_organization_link uol
    JOIN organization o ON o.id = uol.org_id
    WHERE o.org_type = ANY($3)
),
standings AS (
    SELECT kal.user_id,
           SUM(kal.karma)::BIGINT AS karma,
           MAX(kal.created_at) AS last_activity
    FROM karma_activity_log kal
    JOIN task_list t ON t.id = kal.task_id
    WHERE t.event = $1
      AND kal.appraiser_approved
      AND kal.user_id IN (SELECT user_id FROM intro_completed)
      AND kal.user_id IN (SELECT user_id FROM org_qualified)
    GROUP BY kal.user_id
),
ranked AS (
    SELECT s.user_id,
           s.karma,
           s.last_activity,
           RANK() OVER (ORDER BY s.karma DESC) AS rank
    FROM standings s
)
SELECT r.rank,
       u.id AS user_id,
       TRIM(CONCAT(u.first_name, ' ', COALESCE(u.last_name, ''))) AS full_name,
       r.karma,
       r.last_activity,
       org.title AS org,
       org.district_name,
       org.state
FROM ranked r
JOIN "user" u ON u.id = r.user_id
LEFT JOIN LATERAL (
    SELECT o.title, d.name AS district_name, st.name AS state
    FROM user_organization_link uol
    JOIN organization o ON o.id = uol.org_id
    LEFT JOIN district d ON d.id = o.district_id
    LEFT JOIN zone z ON z.id = d.zone_id
    LEFT JOIN state st ON st.id = z.state_id
    WHERE uol.user_id = u.id
      AND o.org_type = ANY($3)
    ORDER BY uol.created_at, uol.id
    LIMIT 1
) org ON TRUE
WHERE $4::VARCHAR IS NULL OR r.user_id = $4
ORDER BY r.karma DESC, r.last_activity ASC, u.id
"#;

const HACKATHON_VIEW_SQL: &str = r#"
SELECT h.id, h.title, h.tagline, h.description, h.participant_count, h.type,
       h.website, h.org_id, o.title AS org_name, h.district_id,
       d.name AS district_name, h.place, h.event_logo, h.banner,
       h.is_open_to_all, h.application_start, h.application_ends,
       h.event_start, h.event_end, h.status, h.created_by, h.created_at,
       h.updated_at
FROM hackathon h
LEFT JOIN organization o ON o.id = h.org_id
LEFT JOIN district d ON d.id = h.district_id
ORDER BY h.created_at DESC
"#;

// Fields come back in the order the client sent them.
const FORM_FIELDS_SQL: &str = r#"
SELECT hackathon_id, field_name, field_type, is_required
FROM hackathon_form
WHERE hackathon_id = ANY($1)
ORDER BY hackathon_id, position
"#;

#[derive(FromRow)]
struct FormFieldRow {
    hackathon_id: String,
    #[sqlx(flatten)]
    field: FormField,
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!(max_connections, "Successfully connected to database");
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await?;
        info!("Migrations run successfully");
        Ok(())
    }

    async fn exists(&self, sql: &str, id: &str) -> StoreResult<bool> {
        let found: Option<(i32,)> = sqlx::query_as(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn leaderboard(
        &self,
        scope: &LaunchpadConfig,
        user_id: Option<&str>,
    ) -> StoreResult<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(LAUNCHPAD_LEADERBOARD_SQL)
            .bind(&scope.event)
            .bind(&scope.intro_hashtag)
            .bind(&scope.allowed_org_types)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }
}

async fn insert_form_fields(
    conn: &mut PgConnection,
    hackathon_id: &str,
    fields: &[FormField],
    actor: &str,
) -> StoreResult<()> {
    let now = Utc::now();
    for (position, field) in (0_i32..).zip(fields) {
        sqlx::query(
            "INSERT INTO hackathon_form
                (id, hackathon_id, field_name, field_type, is_required, position,
                 updated_by, updated_at, created_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $7, $8)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(hackathon_id)
        .bind(field.field_name.trim())
        .bind(field.field_type.trim())
        .bind(field.is_required)
        .bind(position)
        .bind(actor)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl Store for PgStore {
    async fn user_for_token(&self, token: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT u.id, u.first_name, u.last_name, u.email, u.active, u.created_at
               FROM access_token t
               JOIN "user" u ON u.id = t.user_id
               WHERE t.token = $1 AND t.expiry > NOW() AND u.active"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_hackathons(&self) -> StoreResult<Vec<HackathonView>> {
        let mut hackathons = sqlx::query_as::<_, HackathonView>(HACKATHON_VIEW_SQL)
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<String> = hackathons.iter().map(|h| h.id.clone()).collect();
        let rows = sqlx::query_as::<_, FormFieldRow>(FORM_FIELDS_SQL)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        let mut fields: HashMap<String, Vec<FormField>> = HashMap::new();
        for row in rows {
            fields.entry(row.hackathon_id).or_default().push(row.field);
        }
        for hackathon in &mut hackathons {
            hackathon.form_fields = fields.remove(&hackathon.id).unwrap_or_default();
        }

        debug!(count = hackathons.len(), "Listed hackathons");
        Ok(hackathons)
    }

    async fn hackathon_exists(&self, id: &str) -> StoreResult<bool> {
        self.exists("SELECT 1 FROM hackathon WHERE id = $1", id).await
    }

    async fn organization_exists(&self, id: &str) -> StoreResult<bool> {
        self.exists("SELECT 1 FROM organization WHERE id = $1", id).await
    }

    async fn district_exists(&self, id: &str) -> StoreResult<bool> {
        self.exists("SELECT 1 FROM district WHERE id = $1", id).await
    }

    async fn create_hackathon(
        &self,
        payload: &HackathonPayload,
        actor: &str,
    ) -> StoreResult<String> {
        let hackathon = Hackathon::from_payload(payload, actor);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO hackathon
                (id, title, tagline, description, participant_count, type, website,
                 org_id, district_id, place, event_logo, banner, is_open_to_all,
                 application_start, application_ends, event_start, event_end, status,
                 updated_by, updated_at, created_by, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                       $14, $15, $16, $17, $18, $19, $20, $21, $22)"#,
        )
        .bind(&hackathon.id)
        .bind(&hackathon.title)
        .bind(&hackathon.tagline)
        .bind(&hackathon.description)
        .bind(hackathon.participant_count)
        .bind(&hackathon.kind)
        .bind(&hackathon.website)
        .bind(&hackathon.org_id)
        .bind(&hackathon.district_id)
        .bind(&hackathon.place)
        .bind(&hackathon.event_logo)
        .bind(&hackathon.banner)
        .bind(hackathon.is_open_to_all)
        .bind(hackathon.application_start)
        .bind(hackathon.application_ends)
        .bind(hackathon.event_start)
        .bind(hackathon.event_end)
        .bind(&hackathon.status)
        .bind(&hackathon.updated_by)
        .bind(hackathon.updated_at)
        .bind(&hackathon.created_by)
        .bind(hackathon.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO hackathon_organiser_link
                (id, organiser_id, hackathon_id, updated_by, updated_at, created_by, created_at)
             VALUES ($1, $2, $3, $2, $4, $2, $4)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(actor)
        .bind(&hackathon.id)
        .bind(hackathon.created_at)
        .execute(&mut *tx)
        .await?;

        if let Some(fields) = &payload.form_fields {
            insert_form_fields(&mut tx, &hackathon.id, fields, actor).await?;
        }

        tx.commit().await?;
        Ok(hackathon.id)
    }

    async fn update_hackathon(
        &self,
        id: &str,
        payload: &HackathonPayload,
        actor: &str,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Hackathon>(
            "SELECT * FROM hackathon WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut hackathon) = existing else {
            return Ok(false);
        };
        hackathon.apply(payload, actor);

        sqlx::query(
            r#"UPDATE hackathon SET
                title = $2, tagline = $3, description = $4, participant_count = $5,
                type = $6, website = $7, org_id = $8, district_id = $9, place = $10,
                event_logo = $11, banner = $12, is_open_to_all = $13,
                application_start = $14, application_ends = $15, event_start = $16,
                event_end = $17, status = $18, updated_by = $19, updated_at = $20
               WHERE id = $1"#,
        )
        .bind(&hackathon.id)
        .bind(&hackathon.title)
        .bind(&hackathon.tagline)
        .bind(&hackathon.description)
        .bind(hackathon.participant_count)
        .bind(&hackathon.kind)
        .bind(&hackathon.website)
        .bind(&hackathon.org_id)
        .bind(&hackathon.district_id)
        .bind(&hackathon.place)
        .bind(&hackathon.event_logo)
        .bind(&hackathon.banner)
        .bind(hackathon.is_open_to_all)
        .bind(hackathon.application_start)
        .bind(hackathon.application_ends)
        .bind(hackathon.event_start)
        .bind(hackathon.event_end)
        .bind(&hackathon.status)
        .bind(&hackathon.updated_by)
        .bind(hackathon.updated_at)
        .execute(&mut *tx)
        .await?;

        if let Some(fields) = &payload.form_fields {
            sqlx::query("DELETE FROM hackathon_form WHERE hackathon_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_form_fields(&mut tx, id, fields, actor).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_hackathon(&self, id: &str) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM hackathon_form WHERE hackathon_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM hackathon_organiser_link WHERE hackathon_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM hackathon WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn launchpad_leaderboard(
        &self,
        scope: &LaunchpadConfig,
    ) -> StoreResult<Vec<LeaderboardEntry>> {
        self.leaderboard(scope, None).await
    }

    async fn launchpad_rank(
        &self,
        scope: &LaunchpadConfig,
        user_id: &str,
    ) -> StoreResult<Option<LeaderboardEntry>> {
        Ok(self.leaderboard(scope, Some(user_id)).await?.into_iter().next())
    }
}
