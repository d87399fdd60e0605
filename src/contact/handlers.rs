use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::MessageResponse,
        services::{is_valid_email, normalize_email},
    },
    contact::repo::NewContactMessage,
    error::{AppError, FieldError, Result},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactRequest {
    fn validate(self) -> std::result::Result<NewContactMessage, AppError> {
        let name = self.name.trim().to_string();
        let email = normalize_email(&self.email);
        let subject = self.subject.trim().to_string();
        let message = self.message.trim().to_string();

        let mut errors = Vec::new();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        if !is_valid_email(&email) {
            errors.push(FieldError::new("email", "Please enter a valid email"));
        }
        if subject.is_empty() {
            errors.push(FieldError::new("subject", "Subject is required"));
        }
        if message.chars().count() < 10 {
            errors.push(FieldError::new("message", "Message must be at least 10 characters"));
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(NewContactMessage {
            name,
            email,
            subject,
            message,
        })
    }
}

pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/contact", post(submit))
}

#[instrument(skip(state, payload))]
pub async fn submit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let Json(payload) = payload?;
    let msg = state.contacts.create(payload.validate()?).await?;
    info!(message_id = msg.id, "contact message received");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Message sent successfully",
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_rejected() {
        let req = ContactRequest {
            name: "Sam".into(),
            email: "sam@example.com".into(),
            subject: "Hello".into(),
            message: "too short".into(),
        };
        let AppError::Validation(errors) = req.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(errors, vec![FieldError::new("message", "Message must be at least 10 characters")]);
    }

    #[test]
    fn one_letter_name_and_short_subject_are_accepted() {
        let req = ContactRequest {
            name: "J".into(),
            email: "j@example.com".into(),
            subject: "Hi".into(),
            message: "Do you support metric units?".into(),
        };
        let msg = req.validate().unwrap();
        assert_eq!((msg.name.as_str(), msg.subject.as_str()), ("J", "Hi"));
    }

    #[test]
    fn blank_name_and_subject_are_rejected() {
        let req = ContactRequest {
            name: "  ".into(),
            email: "j@example.com".into(),
            subject: "".into(),
            message: "Do you support metric units?".into(),
        };
        let AppError::Validation(errors) = req.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "subject"]);
    }

    #[test]
    fn valid_request_is_trimmed() {
        let req = ContactRequest {
            name: " Sam ".into(),
            email: "Sam@Example.com".into(),
            subject: "Billing".into(),
            message: "I have a question about my plan.".into(),
        };
        let msg = req.validate().unwrap();
        assert_eq!(msg.name, "Sam");
        assert_eq!(msg.email, "sam@example.com");
    }
}
