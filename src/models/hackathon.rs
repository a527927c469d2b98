use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use std::collections::HashSet;

use crate::utils::validation::FieldErrors;

pub const HACKATHON_TYPES: &[&str] = &["online", "offline", "hybrid"];

/// Default application form offered to organisers, in display order.
/// `system` fields are filled from the applicant's profile, `input` fields
/// are typed in by the applicant.
pub const DEFAULT_FORM_FIELDS: &[(&str, &str)] = &[
    ("name", "system"),
    ("gender", "system"),
    ("email", "system"),
    ("mobile", "system"),
    ("bio", "input"),
    ("college", "system"),
    ("experience", "input"),
    ("github", "input"),
    ("linkedin", "input"),
];

/// Serializes [`DEFAULT_FORM_FIELDS`] as a JSON object without losing order.
#[derive(Debug, Clone, Copy)]
pub struct DefaultFormFields;

impl Serialize for DefaultFormFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(DEFAULT_FORM_FIELDS.len()))?;
        for (name, kind) in DEFAULT_FORM_FIELDS {
            map.serialize_entry(name, kind)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Hackathon {
    pub id: String,
    pub title: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub participant_count: Option<i32>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: Option<String>,
    pub website: Option<String>,
    pub org_id: Option<String>,
    pub district_id: Option<String>,
    pub place: Option<String>,
    pub event_logo: Option<String>,
    pub banner: Option<String>,
    pub is_open_to_all: Option<bool>,
    pub application_start: Option<DateTime<Utc>>,
    pub application_ends: Option<DateTime<Utc>>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hackathon {
    /// Builds a fresh row owned by `actor` from an already validated payload.
    pub fn from_payload(payload: &HackathonPayload, actor: &str) -> Self {
        let now = Utc::now();
        let mut hackathon = Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: String::new(),
            tagline: None,
            description: None,
            participant_count: None,
            kind: None,
            website: None,
            org_id: None,
            district_id: None,
            place: None,
            event_logo: None,
            banner: None,
            is_open_to_all: None,
            application_start: None,
            application_ends: None,
            event_start: None,
            event_end: None,
            status: None,
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
            created_at: now,
            updated_at: now,
        };
        hackathon.apply(payload, actor);
        hackathon
    }

    /// Overwrites every payload-controlled column. PUT is a full replace.
    pub fn apply(&mut self, payload: &HackathonPayload, actor: &str) {
        self.title = payload.title.as_deref().unwrap_or_default().trim().to_string();
        self.tagline = payload.tagline.clone();
        self.description = payload.description.clone();
        self.participant_count = payload.participant_count;
        self.kind = payload.kind.as_deref().map(str::to_lowercase);
        self.website = payload.website.clone();
        self.org_id = payload.org_id.clone();
        self.district_id = payload.district_id.clone();
        self.place = payload.place.clone();
        self.event_logo = payload.event_logo.clone();
        self.banner = payload.banner.clone();
        self.is_open_to_all = payload.is_open_to_all;
        self.application_start = payload.application_start;
        self.application_ends = payload.application_ends;
        self.event_start = payload.event_start;
        self.event_end = payload.event_end;
        self.status = payload.status.clone();
        self.updated_by = actor.to_string();
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FormField {
    pub field_name: String,
    pub field_type: String,
    #[serde(default)]
    pub is_required: bool,
}

/// Hackathon as returned to clients.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HackathonView {
    pub id: String,
    pub title: String,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub participant_count: Option<i32>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: Option<String>,
    pub website: Option<String>,
    pub org_id: Option<String>,
    pub org_name: Option<String>,
    pub district_id: Option<String>,
    pub district_name: Option<String>,
    pub place: Option<String>,
    pub event_logo: Option<String>,
    pub banner: Option<String>,
    pub is_open_to_all: Option<bool>,
    pub application_start: Option<DateTime<Utc>>,
    pub application_ends: Option<DateTime<Utc>>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub form_fields: Vec<FormField>,
}

impl HackathonView {
    pub fn new(
        hackathon: Hackathon,
        org_name: Option<String>,
        district_name: Option<String>,
        form_fields: Vec<FormField>,
    ) -> Self {
        Self {
            id: hackathon.id,
            title: hackathon.title,
            tagline: hackathon.tagline,
            description: hackathon.description,
            participant_count: hackathon.participant_count,
            kind: hackathon.kind,
            website: hackathon.website,
            org_id: hackathon.org_id,
            org_name,
            district_id: hackathon.district_id,
            district_name,
            place: hackathon.place,
            event_logo: hackathon.event_logo,
            banner: hackathon.banner,
            is_open_to_all: hackathon.is_open_to_all,
            application_start: hackathon.application_start,
            application_ends: hackathon.application_ends,
            event_start: hackathon.event_start,
            event_end: hackathon.event_end,
            status: hackathon.status,
            created_by: hackathon.created_by,
            created_at: hackathon.created_at,
            updated_at: hackathon.updated_at,
            form_fields,
        }
    }
}

/// Body of `POST /hackathons` and `PUT /hackathons/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HackathonPayload {
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub participant_count: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub website: Option<String>,
    pub org_id: Option<String>,
    pub district_id: Option<String>,
    pub place: Option<String>,
    pub event_logo: Option<String>,
    pub banner: Option<String>,
    pub is_open_to_all: Option<bool>,
    pub application_start: Option<DateTime<Utc>>,
    pub application_ends: Option<DateTime<Utc>>,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub form_fields: Option<Vec<FormField>>,
}

impl HackathonPayload {
    /// Checks everything that does not need the database. Foreign keys are
    /// checked by the handler against the store.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        errors.require("title", self.title.as_deref());
        errors.max_len("title", self.title.as_deref(), 100);
        errors.max_len("tagline", self.tagline.as_deref(), 150);
        errors.max_len("description", self.description.as_deref(), 5000);
        errors.max_len("website", self.website.as_deref(), 200);
        errors.max_len("place", self.place.as_deref(), 255);
        errors.max_len("event_logo", self.event_logo.as_deref(), 200);
        errors.max_len("banner", self.banner.as_deref(), 200);
        errors.max_len("status", self.status.as_deref(), 20);

        if matches!(self.participant_count, Some(count) if count < 0) {
            errors.add(
                "participant_count",
                "Ensure this value is greater than or equal to 0.",
            );
        }

        if let Some(kind) = &self.kind {
            if !HACKATHON_TYPES.contains(&kind.to_lowercase().as_str()) {
                errors.add("type", format!("\"{}\" is not a valid choice.", kind));
            }
        }

        check_window(
            &mut errors,
            "application_ends",
            self.application_start,
            self.application_ends,
        );
        check_window(&mut errors, "event_end", self.event_start, self.event_end);

        if let Some(fields) = &self.form_fields {
            let mut seen = HashSet::new();
            for field in fields {
                let name = field.field_name.trim();
                if name.is_empty() {
                    errors.add("form_fields", "Field name may not be blank.");
                } else if name.chars().count() > 255 {
                    errors.add(
                        "form_fields",
                        format!("Field name '{}' is longer than 255 characters.", name),
                    );
                } else if !seen.insert(name) {
                    errors.add(
                        "form_fields",
                        format!("Field '{}' is listed more than once.", name),
                    );
                }

                let kind = field.field_type.trim();
                if kind.is_empty() || kind.chars().count() > 50 {
                    errors.add(
                        "form_fields",
                        format!("Field '{}' has an invalid field type.", name),
                    );
                }
            }
        }

        errors
    }
}

fn check_window(
    errors: &mut FieldErrors,
    field: &str,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            errors.add(field, "End must not be before start.");
        }
    }
}
