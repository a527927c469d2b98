//! In-memory [`Store`] for handler tests.
//!
//! Mirrors the Postgres queries closely enough that the same assertions hold
//! against both: the leaderboard here ranks with the same qualification
//! rules and competition ranking as the SQL window query.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{Store, StoreResult};
use crate::config::LaunchpadConfig;
use crate::models::hackathon::{FormField, Hackathon, HackathonPayload, HackathonView};
use crate::models::leaderboard::LeaderboardEntry;
use crate::models::organization::{District, Organization, State, UserOrganizationLink, Zone};
use crate::models::task::{KarmaActivityLog, Task};
use crate::models::user::User;

#[derive(Default)]
struct Data {
    users: Vec<User>,
    tokens: HashMap<String, (String, DateTime<Utc>)>,
    states: Vec<State>,
    zones: Vec<Zone>,
    districts: Vec<District>,
    organizations: Vec<Organization>,
    org_links: Vec<UserOrganizationLink>,
    tasks: Vec<Task>,
    logs: Vec<KarmaActivityLog>,
    hackathons: Vec<Hackathon>,
    forms: HashMap<String, Vec<(i32, FormField)>>,
    organisers: Vec<(String, String)>,
}

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Data>,
}

fn next_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, first_name: &str, last_name: Option<&str>) -> String {
        let id = next_id();
        self.data.lock().unwrap().users.push(User {
            id: id.clone(),
            first_name: first_name.to_string(),
            last_name: last_name.map(str::to_string),
            email: format!("{}@example.com", id),
            active: true,
            created_at: Utc::now(),
        });
        id
    }

    pub fn add_token(&self, token: &str, user_id: &str, valid_for: Duration) {
        self.data
            .lock()
            .unwrap()
            .tokens
            .insert(token.to_string(), (user_id.to_string(), Utc::now() + valid_for));
    }

    /// Adds a state → zone → district chain and returns the district id.
    pub fn add_district(&self, district: &str, state: &str) -> String {
        let mut data = self.data.lock().unwrap();
        let state_id = next_id();
        let zone_id = next_id();
        let district_id = next_id();
        data.states.push(State {
            id: state_id.clone(),
            name: state.to_string(),
            country_id: next_id(),
        });
        data.zones.push(Zone {
            id: zone_id.clone(),
            name: format!("{} zone", district),
            state_id,
        });
        data.districts.push(District {
            id: district_id.clone(),
            name: district.to_string(),
            zone_id,
        });
        district_id
    }

    pub fn add_organization(
        &self,
        title: &str,
        org_type: &str,
        district_id: Option<&str>,
    ) -> String {
        let id = next_id();
        self.data.lock().unwrap().organizations.push(Organization {
            id: id.clone(),
            title: title.to_string(),
            org_type: org_type.to_string(),
            district_id: district_id.map(str::to_string),
        });
        id
    }

    pub fn link_user_to_org(&self, user_id: &str, org_id: &str) {
        self.link_user_to_org_at(&next_id(), user_id, org_id, Utc::now());
    }

    pub fn link_user_to_org_at(
        &self,
        link_id: &str,
        user_id: &str,
        org_id: &str,
        created_at: DateTime<Utc>,
    ) {
        self.data.lock().unwrap().org_links.push(UserOrganizationLink {
            id: link_id.to_string(),
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
            created_at,
        });
    }

    pub fn add_task(&self, hashtag: &str, event: Option<&str>) -> String {
        let id = next_id();
        self.data.lock().unwrap().tasks.push(Task {
            id: id.clone(),
            hashtag: hashtag.to_string(),
            event: event.map(str::to_string),
        });
        id
    }

    pub fn log_karma(
        &self,
        user_id: &str,
        task_id: &str,
        karma: i32,
        approved: bool,
        created_at: DateTime<Utc>,
    ) {
        self.data.lock().unwrap().logs.push(KarmaActivityLog {
            id: next_id(),
            user_id: Some(user_id.to_string()),
            task_id: task_id.to_string(),
            karma,
            appraiser_approved: Some(approved),
            created_at,
        });
    }

    pub fn hackathon(&self, id: &str) -> Option<Hackathon> {
        let data = self.data.lock().unwrap();
        data.hackathons.iter().find(|h| h.id == id).cloned()
    }

    pub fn form_fields(&self, id: &str) -> Vec<FormField> {
        self.data.lock().unwrap().form_fields(id)
    }

    pub fn organisers(&self, id: &str) -> Vec<String> {
        let data = self.data.lock().unwrap();
        data.organisers
            .iter()
            .filter(|(_, hackathon_id)| hackathon_id == id)
            .map(|(organiser, _)| organiser.clone())
            .collect()
    }
}

/// Form rows keyed by their position in the submitted list.
fn form_rows(fields: &[FormField]) -> Vec<(i32, FormField)> {
    (0_i32..)
        .zip(fields)
        .map(|(position, f)| {
            let field = FormField {
                field_name: f.field_name.trim().to_string(),
                field_type: f.field_type.trim().to_string(),
                is_required: f.is_required,
            };
            (position, field)
        })
        .collect()
}

impl Data {
    fn form_fields(&self, hackathon_id: &str) -> Vec<FormField> {
        let mut rows = self.forms.get(hackathon_id).cloned().unwrap_or_default();
        rows.sort_by_key(|(position, _)| *position);
        rows.into_iter().map(|(_, field)| field).collect()
    }

    fn org_location(&self, org: &Organization) -> (Option<String>, Option<String>) {
        let district = org
            .district_id
            .as_ref()
            .and_then(|id| self.districts.iter().find(|d| &d.id == id));
        let state = district
            .and_then(|d| self.zones.iter().find(|z| z.id == d.zone_id))
            .and_then(|z| self.states.iter().find(|s| s.id == z.state_id));
        (district.map(|d| d.name.clone()), state.map(|s| s.name.clone()))
    }

    fn leaderboard(&self, scope: &LaunchpadConfig) -> Vec<LeaderboardEntry> {
        let event_tasks: HashMap<&str, &Task> = self
            .tasks
            .iter()
            .filter(|t| t.event.as_deref() == Some(scope.event.as_str()))
            .map(|t| (t.id.as_str(), t))
            .collect();

        let approved_event_logs: Vec<(&str, &KarmaActivityLog)> = self
            .logs
            .iter()
            .filter(|log| log.is_approved() && event_tasks.contains_key(log.task_id.as_str()))
            .filter_map(|log| log.user_id.as_deref().map(|user| (user, log)))
            .collect();

        let intro_completed: HashSet<&str> = approved_event_logs
            .iter()
            .filter(|(_, log)| event_tasks[log.task_id.as_str()].hashtag == scope.intro_hashtag)
            .map(|(user, _)| *user)
            .collect();

        // Earliest link to an allowed org type, per user.
        let mut qualifying_org: HashMap<&str, &Organization> = HashMap::new();
        let mut links: Vec<&UserOrganizationLink> = self.org_links.iter().collect();
        links.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        for link in links {
            let org = self.organizations.iter().find(|o| {
                o.id == link.org_id && scope.allowed_org_types.iter().any(|t| t == &o.org_type)
            });
            if let Some(org) = org {
                qualifying_org.entry(link.user_id.as_str()).or_insert(org);
            }
        }

        let mut standings: HashMap<&str, (i64, DateTime<Utc>)> = HashMap::new();
        for &(user, log) in &approved_event_logs {
            if !intro_completed.contains(user) || !qualifying_org.contains_key(user) {
                continue;
            }
            let entry = standings.entry(user).or_insert((0, log.created_at));
            entry.0 += i64::from(log.karma);
            entry.1 = entry.1.max(log.created_at);
        }

        let mut ordered: Vec<(&str, i64, DateTime<Utc>)> = standings
            .into_iter()
            .map(|(user, (karma, last))| (user, karma, last))
            .collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)).then(a.0.cmp(&b.0)));

        let mut entries = Vec::with_capacity(ordered.len());
        let mut previous: Option<(i64, i64)> = None;
        for (position, (user_id, karma, last_activity)) in ordered.into_iter().enumerate() {
            let rank = match previous {
                Some((prev_karma, prev_rank)) if prev_karma == karma => prev_rank,
                _ => position as i64 + 1,
            };
            previous = Some((karma, rank));

            let full_name = self
                .users
                .iter()
                .find(|u| u.id == user_id)
                .map(User::full_name)
                .unwrap_or_default();
            let org = qualifying_org[user_id];
            let (district_name, state) = self.org_location(org);

            entries.push(LeaderboardEntry {
                rank,
                user_id: user_id.to_string(),
                full_name,
                karma,
                last_activity: Some(last_activity),
                org: Some(org.title.clone()),
                district_name,
                state,
            });
        }
        entries
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn user_for_token(&self, token: &str) -> StoreResult<Option<User>> {
        let data = self.data.lock().unwrap();
        let user = data
            .tokens
            .get(token)
            .filter(|(_, expiry)| *expiry > Utc::now())
            .and_then(|(user_id, _)| data.users.iter().find(|u| &u.id == user_id && u.active))
            .cloned();
        Ok(user)
    }

    async fn list_hackathons(&self) -> StoreResult<Vec<HackathonView>> {
        let data = self.data.lock().unwrap();
        let mut hackathons = data.hackathons.clone();
        hackathons.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let views = hackathons
            .into_iter()
            .map(|h| {
                let org_name = h
                    .org_id
                    .as_ref()
                    .and_then(|id| data.organizations.iter().find(|o| &o.id == id))
                    .map(|o| o.title.clone());
                let district_name = h
                    .district_id
                    .as_ref()
                    .and_then(|id| data.districts.iter().find(|d| &d.id == id))
                    .map(|d| d.name.clone());
                let fields = data.form_fields(&h.id);
                HackathonView::new(h, org_name, district_name, fields)
            })
            .collect();
        Ok(views)
    }

    async fn hackathon_exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.data.lock().unwrap().hackathons.iter().any(|h| h.id == id))
    }

    async fn organization_exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.data.lock().unwrap().organizations.iter().any(|o| o.id == id))
    }

    async fn district_exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.data.lock().unwrap().districts.iter().any(|d| d.id == id))
    }

    async fn create_hackathon(
        &self,
        payload: &HackathonPayload,
        actor: &str,
    ) -> StoreResult<String> {
        let hackathon = Hackathon::from_payload(payload, actor);
        let id = hackathon.id.clone();

        let mut data = self.data.lock().unwrap();
        data.hackathons.push(hackathon);
        data.organisers.push((actor.to_string(), id.clone()));
        if let Some(fields) = &payload.form_fields {
            data.forms.insert(id.clone(), form_rows(fields));
        }
        Ok(id)
    }

    async fn update_hackathon(
        &self,
        id: &str,
        payload: &HackathonPayload,
        actor: &str,
    ) -> StoreResult<bool> {
        let mut data = self.data.lock().unwrap();
        let Some(hackathon) = data.hackathons.iter_mut().find(|h| h.id == id) else {
            return Ok(false);
        };
        hackathon.apply(payload, actor);
        if let Some(fields) = &payload.form_fields {
            data.forms.insert(id.to_string(), form_rows(fields));
        }
        Ok(true)
    }

    async fn delete_hackathon(&self, id: &str) -> StoreResult<bool> {
        let mut data = self.data.lock().unwrap();
        let before = data.hackathons.len();
        data.hackathons.retain(|h| h.id != id);
        data.forms.remove(id);
        data.organisers.retain(|(_, hackathon_id)| hackathon_id != id);
        Ok(data.hackathons.len() < before)
    }

    async fn launchpad_leaderboard(
        &self,
        scope: &LaunchpadConfig,
    ) -> StoreResult<Vec<LeaderboardEntry>> {
        Ok(self.data.lock().unwrap().leaderboard(scope))
    }

    async fn launchpad_rank(
        &self,
        scope: &LaunchpadConfig,
        user_id: &str,
    ) -> StoreResult<Option<LeaderboardEntry>> {
        let entries = self.data.lock().unwrap().leaderboard(scope);
        Ok(entries.into_iter().find(|e| e.user_id == user_id))
    }
}
