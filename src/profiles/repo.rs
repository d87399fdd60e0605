use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::profiles::repo_types::{HealthProfile, NewProfile, ProfilePatch};

pub const PROFILE_EXISTS: &str = "Health profile already exists";

/// Health profile store; at most one profile per user.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<HealthProfile>>;
    /// Fails with `Conflict` when the user already has a profile.
    async fn create(&self, new: NewProfile) -> Result<HealthProfile>;
    /// `None` when the user has no profile.
    async fn update(&self, user_id: i64, patch: ProfilePatch) -> Result<Option<HealthProfile>>;
    /// Atomic find-or-create; the flag is `true` when a new profile was inserted.
    async fn upsert(&self, new: NewProfile) -> Result<(HealthProfile, bool)>;
}

#[derive(Default)]
struct ProfileTable {
    next_id: i64,
    by_user: HashMap<i64, HealthProfile>,
}

impl ProfileTable {
    fn insert(&mut self, new: NewProfile) -> HealthProfile {
        self.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let profile = HealthProfile {
            id: self.next_id,
            user_id: new.user_id,
            weight: new.weight,
            height: new.height,
            age: new.age,
            gender: new.gender,
            allergies: new.allergies,
            created_at: now,
            updated_at: now,
        };
        self.by_user.insert(profile.user_id, profile.clone());
        profile
    }
}

#[derive(Default)]
pub struct MemProfileRepository {
    table: RwLock<ProfileTable>,
}

impl MemProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.by_user.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ProfileRepository for MemProfileRepository {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<HealthProfile>> {
        Ok(self.table.read().await.by_user.get(&user_id).cloned())
    }

    async fn create(&self, new: NewProfile) -> Result<HealthProfile> {
        let mut table = self.table.write().await;
        if table.by_user.contains_key(&new.user_id) {
            return Err(AppError::Conflict(PROFILE_EXISTS.into()));
        }
        Ok(table.insert(new))
    }

    async fn update(&self, user_id: i64, patch: ProfilePatch) -> Result<Option<HealthProfile>> {
        let mut table = self.table.write().await;
        Ok(table.by_user.get_mut(&user_id).map(|profile| {
            profile.apply(patch, OffsetDateTime::now_utc());
            profile.clone()
        }))
    }

    async fn upsert(&self, new: NewProfile) -> Result<(HealthProfile, bool)> {
        let mut table = self.table.write().await;
        if let Some(profile) = table.by_user.get_mut(&new.user_id) {
            profile.apply(new.into(), OffsetDateTime::now_utc());
            return Ok((profile.clone(), false));
        }
        Ok((table.insert(new), true))
    }
}

pub struct PgProfileRepository {
    db: PgPool,
}

impl PgProfileRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    profile: HealthProfile,
    inserted: bool,
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<HealthProfile>> {
        let profile = sqlx::query_as::<_, HealthProfile>(
            r#"
            SELECT id, user_id, weight, height, age, gender, allergies, created_at, updated_at
            FROM health_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(profile)
    }

    async fn create(&self, new: NewProfile) -> Result<HealthProfile> {
        let res = sqlx::query_as::<_, HealthProfile>(
            r#"
            INSERT INTO health_profiles (user_id, weight, height, age, gender, allergies)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, weight, height, age, gender, allergies, created_at, updated_at
            "#,
        )
        .bind(new.user_id)
        .bind(new.weight)
        .bind(new.height)
        .bind(new.age)
        .bind(&new.gender)
        .bind(&new.allergies)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(profile) => Ok(profile),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::Conflict(PROFILE_EXISTS.into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, user_id: i64, patch: ProfilePatch) -> Result<Option<HealthProfile>> {
        let profile = sqlx::query_as::<_, HealthProfile>(
            r#"
            UPDATE health_profiles
               SET weight     = COALESCE($2, weight),
                   height     = COALESCE($3, height),
                   age        = COALESCE($4, age),
                   gender     = COALESCE($5, gender),
                   allergies  = CASE WHEN $6 THEN $7 ELSE allergies END,
                   updated_at = GREATEST(now(), updated_at + interval '1 microsecond')
             WHERE user_id = $1
            RETURNING id, user_id, weight, height, age, gender, allergies, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(patch.weight)
        .bind(patch.height)
        .bind(patch.age)
        .bind(patch.gender)
        .bind(patch.allergies.is_some())
        .bind(patch.allergies.flatten())
        .fetch_optional(&self.db)
        .await?;
        Ok(profile)
    }

    async fn upsert(&self, new: NewProfile) -> Result<(HealthProfile, bool)> {
        // xmax = 0 only for freshly inserted tuples
        let row = sqlx::query_as::<_, UpsertRow>(
            r#"
            INSERT INTO health_profiles (user_id, weight, height, age, gender, allergies)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE
               SET weight     = EXCLUDED.weight,
                   height     = EXCLUDED.height,
                   age        = EXCLUDED.age,
                   gender     = EXCLUDED.gender,
                   allergies  = EXCLUDED.allergies,
                   updated_at = GREATEST(now(), health_profiles.updated_at + interval '1 microsecond')
            RETURNING id, user_id, weight, height, age, gender, allergies, created_at, updated_at,
                      (xmax = 0) AS inserted
            "#,
        )
        .bind(new.user_id)
        .bind(new.weight)
        .bind(new.height)
        .bind(new.age)
        .bind(&new.gender)
        .bind(&new.allergies)
        .fetch_one(&self.db)
        .await?;
        Ok((row.profile, row.inserted))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn new_profile(user_id: i64, weight: f64) -> NewProfile {
        NewProfile {
            user_id,
            weight,
            height: 175.0,
            age: 30,
            gender: "male".into(),
            allergies: None,
        }
    }

    #[tokio::test]
    async fn create_then_find_by_user() {
        let repo = MemProfileRepository::new();
        let created = repo.create(new_profile(1, 70.0)).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(repo.find_by_user(1).await.unwrap(), Some(created));
        assert_eq!(repo.find_by_user(2).await.unwrap(), None);
    }

    #[tokio::test]
    async fn second_create_for_same_user_conflicts() {
        let repo = MemProfileRepository::new();
        repo.create(new_profile(1, 70.0)).await.unwrap();
        let err = repo.create(new_profile(1, 71.0)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn update_merges_present_fields_only() {
        let repo = MemProfileRepository::new();
        let mut base = new_profile(1, 70.0);
        base.allergies = Some("peanuts".into());
        let created = repo.create(base).await.unwrap();

        let updated = repo
            .update(
                1,
                ProfilePatch {
                    weight: Some(68.5),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .expect("profile exists");
        assert_eq!(updated.weight, 68.5);
        assert_eq!(updated.height, 175.0);
        assert_eq!(updated.allergies.as_deref(), Some("peanuts"));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);

        let cleared = repo
            .update(
                1,
                ProfilePatch {
                    allergies: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cleared.allergies, None);
    }

    #[tokio::test]
    async fn update_without_profile_returns_none() {
        let repo = MemProfileRepository::new();
        let res = repo.update(42, ProfilePatch::default()).await.unwrap();
        assert!(res.is_none());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn upsert_creates_once_then_updates() {
        let repo = MemProfileRepository::new();
        let (first, created) = repo.upsert(new_profile(1, 70.0)).await.unwrap();
        assert!(created);
        let (second, created) = repo.upsert(new_profile(1, 72.0)).await.unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.weight, 72.0);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_upserts_leave_one_profile() {
        let repo = Arc::new(MemProfileRepository::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.upsert(new_profile(9, 60.0 + i as f64)).await })
            })
            .collect();

        let mut inserted = 0;
        for h in handles {
            let (_, created) = h.await.unwrap().unwrap();
            if created {
                inserted += 1;
            }
        }
        assert_eq!(inserted, 1);
        assert_eq!(repo.len().await, 1);
    }
}
