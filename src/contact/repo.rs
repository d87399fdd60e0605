use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Append-only inbox for the contact form.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, new: NewContactMessage) -> Result<ContactMessage>;
}

#[derive(Default)]
pub struct MemContactRepository {
    log: RwLock<Vec<ContactMessage>>,
}

impl MemContactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<ContactMessage> {
        self.log.read().await.clone()
    }
}

#[async_trait]
impl ContactRepository for MemContactRepository {
    async fn create(&self, new: NewContactMessage) -> Result<ContactMessage> {
        let mut log = self.log.write().await;
        let msg = ContactMessage {
            id: log.len() as i64 + 1,
            name: new.name,
            email: new.email,
            subject: new.subject,
            message: new.message,
            created_at: OffsetDateTime::now_utc(),
        };
        log.push(msg.clone());
        Ok(msg)
    }
}

pub struct PgContactRepository {
    db: PgPool,
}

impl PgContactRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn create(&self, new: NewContactMessage) -> Result<ContactMessage> {
        let msg = sqlx::query_as::<_, ContactMessage>(
            r#"
            INSERT INTO contact_messages (name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, subject, message, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.subject)
        .bind(&new.message)
        .fetch_one(&self.db)
        .await?;
        Ok(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn messages_are_appended_in_order() {
        let repo = MemContactRepository::new();
        for subject in ["first", "second"] {
            repo.create(NewContactMessage {
                name: "Sam".into(),
                email: "sam@example.com".into(),
                subject: subject.into(),
                message: "Please call me back".into(),
            })
            .await
            .unwrap();
        }
        let log = repo.snapshot().await;
        assert_eq!(log.len(), 2);
        assert_eq!((log[0].id, log[0].subject.as_str()), (1, "first"));
        assert_eq!((log[1].id, log[1].subject.as_str()), (2, "second"));
    }
}
