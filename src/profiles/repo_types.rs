use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthProfile {
    pub id: i64,
    pub user_id: i64,
    pub weight: f64, // kg
    pub height: f64, // cm
    pub age: i32,
    pub gender: String,
    pub allergies: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: i64,
    pub weight: f64,
    pub height: f64,
    pub age: i32,
    pub gender: String,
    pub allergies: Option<String>,
}

/// Fields to overwrite; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub allergies: Option<Option<String>>,
}

impl From<NewProfile> for ProfilePatch {
    fn from(p: NewProfile) -> Self {
        Self {
            weight: Some(p.weight),
            height: Some(p.height),
            age: Some(p.age),
            gender: Some(p.gender),
            allergies: Some(p.allergies),
        }
    }
}

impl HealthProfile {
    pub(crate) fn apply(&mut self, patch: ProfilePatch, now: OffsetDateTime) {
        if let Some(w) = patch.weight {
            self.weight = w;
        }
        if let Some(h) = patch.height {
            self.height = h;
        }
        if let Some(a) = patch.age {
            self.age = a;
        }
        if let Some(g) = patch.gender {
            self.gender = g;
        }
        if let Some(a) = patch.allergies {
            self.allergies = a;
        }
        self.updated_at = next_updated_at(self.updated_at, now);
    }
}

/// Keeps `updated_at` strictly increasing even when the clock has not moved.
pub(crate) fn next_updated_at(previous: OffsetDateTime, now: OffsetDateTime) -> OffsetDateTime {
    now.max(previous + time::Duration::microseconds(1))
}
