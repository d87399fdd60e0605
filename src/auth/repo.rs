use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::auth::repo_types::{NewUser, User};
use crate::error::{AppError, Result};

pub const USERNAME_TAKEN: &str = "Username already exists";
pub const EMAIL_TAKEN: &str = "Email already exists";
pub const GOOGLE_ID_TAKEN: &str = "Google account already registered";

/// Identity store. `create` checks every unique key and inserts in one step.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>>;
    async fn create(&self, new: NewUser) -> Result<User>;
}

#[derive(Default)]
struct UserTable {
    next_id: i64,
    rows: HashMap<i64, User>,
    by_username: HashMap<String, i64>,
    by_email: HashMap<String, i64>,
    by_google_id: HashMap<String, i64>,
}

impl UserTable {
    fn lookup(&self, index: &HashMap<String, i64>, key: &str) -> Option<User> {
        index.get(key).and_then(|id| self.rows.get(id)).cloned()
    }
}

/// Volatile identity store; contents are lost on restart.
#[derive(Default)]
pub struct MemUserRepository {
    table: RwLock<UserTable>,
}

impl MemUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count_by_username(&self, username: &str) -> usize {
        let table = self.table.read().await;
        table.rows.values().filter(|u| u.username == username).count()
    }
}

#[async_trait]
impl UserRepository for MemUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let table = self.table.read().await;
        Ok(table.lookup(&table.by_username, username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let table = self.table.read().await;
        Ok(table.lookup(&table.by_email, email))
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>> {
        let table = self.table.read().await;
        Ok(table.lookup(&table.by_google_id, google_id))
    }

    async fn create(&self, new: NewUser) -> Result<User> {
        let mut table = self.table.write().await;

        if table.by_username.contains_key(&new.username) {
            return Err(AppError::Conflict(USERNAME_TAKEN.into()));
        }
        if table.by_email.contains_key(&new.email) {
            return Err(AppError::Conflict(EMAIL_TAKEN.into()));
        }
        if let Some(gid) = &new.google_id {
            if table.by_google_id.contains_key(gid) {
                return Err(AppError::Conflict(GOOGLE_ID_TAKEN.into()));
            }
        }

        table.next_id += 1;
        let user = User {
            id: table.next_id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            google_id: new.google_id,
            name: new.name,
        };
        table.by_username.insert(user.username.clone(), user.id);
        table.by_email.insert(user.email.clone(), user.id);
        if let Some(gid) = &user.google_id {
            table.by_google_id.insert(gid.clone(), user.id);
        }
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }
}

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn conflict_for(constraint: Option<&str>) -> AppError {
    let msg = match constraint {
        Some("users_email_key") => EMAIL_TAKEN,
        Some("users_google_id_key") => GOOGLE_ID_TAKEN,
        _ => USERNAME_TAKEN,
    };
    AppError::Conflict(msg.into())
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, google_id, name
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, google_id, name
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, google_id, name
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, google_id, name
            FROM users
            WHERE google_id = $1
            "#,
        )
        .bind(google_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> Result<User> {
        // Pre-checks only pick the message; the unique constraints decide.
        if self.find_by_username(&new.username).await?.is_some() {
            return Err(AppError::Conflict(USERNAME_TAKEN.into()));
        }
        if self.find_by_email(&new.email).await?.is_some() {
            return Err(AppError::Conflict(EMAIL_TAKEN.into()));
        }

        let res = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, google_id, name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, google_id, name
            "#,
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.google_id)
        .bind(&new.name)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(conflict_for(e.constraint()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
