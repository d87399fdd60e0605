use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::{
    dto::{GoogleAuthRequest, LoginRequest, RegisterRequest},
    password::{hash_password, verify_password},
    repo::UserRepository,
    repo_types::{NewUser, User},
};
use crate::error::{AppError, FieldError, Result};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_registration(req: &RegisterRequest) -> Result<()> {
    let mut errors = Vec::new();
    if req.username.trim().is_empty() {
        errors.push(FieldError::new("username", "Username is required"));
    }
    if !is_valid_email(&req.email) {
        errors.push(FieldError::new("email", "Please enter a valid email"));
    }
    if req.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Creates a password account. Uniqueness is enforced by the store in one step.
pub async fn register(users: &dyn UserRepository, mut req: RegisterRequest) -> Result<User> {
    req.username = req.username.trim().to_string();
    req.email = normalize_email(&req.email);
    validate_registration(&req)?;

    let password_hash = hash_password(&req.password)?;
    let user = users
        .create(NewUser {
            username: req.username,
            email: req.email,
            password_hash: Some(password_hash),
            google_id: None,
            name: req.name.filter(|n| !n.trim().is_empty()),
        })
        .await
        .inspect_err(|e| {
            if let AppError::Conflict(reason) = e {
                warn!(%reason, "registration rejected");
            }
        })?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

pub async fn login(users: &dyn UserRepository, req: LoginRequest) -> Result<User> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let Some(user) = users.find_by_username(username).await? else {
        warn!(%username, "login unknown username");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    let Some(hash) = user.password_hash.as_deref() else {
        warn!(user_id = user.id, "password login for google account");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(&req.password, hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    info!(user_id = user.id, "user logged in");
    Ok(user)
}

/// Signs in with an external identity. Returns the user and whether it was just created.
/// An email already owned by another account is refused rather than linked.
pub async fn login_with_google(
    users: &dyn UserRepository,
    req: GoogleAuthRequest,
) -> Result<(User, bool)> {
    let non_blank = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let (Some(google_id), Some(email), Some(name)) =
        (non_blank(req.google_id), non_blank(req.email), non_blank(req.name))
    else {
        return Err(AppError::BadRequest("Missing required Google auth fields".into()));
    };
    let email = normalize_email(&email);
    if !is_valid_email(&email) {
        return Err(AppError::Validation(vec![FieldError::new(
            "email",
            "Please enter a valid email",
        )]));
    }

    if let Some(user) = users.find_by_google_id(&google_id).await? {
        info!(user_id = user.id, "google login");
        return Ok((user, false));
    }

    if let Some(owner) = users.find_by_email(&email).await? {
        if owner.google_id.as_deref() == Some(google_id.as_str()) {
            return Ok((owner, false));
        }
        warn!(%email, "google login for email registered with password");
        return Err(AppError::Conflict("Email already registered with password".into()));
    }

    let created = users
        .create(NewUser {
            username: email.clone(),
            email,
            password_hash: None,
            google_id: Some(google_id.clone()),
            name: Some(name),
        })
        .await;

    match created {
        Ok(user) => {
            info!(user_id = user.id, "user registered via google");
            Ok((user, true))
        }
        // A concurrent first login for the same identity won the insert.
        Err(AppError::Conflict(reason)) => match users.find_by_google_id(&google_id).await? {
            Some(user) => {
                info!(user_id = user.id, "google login after concurrent signup");
                Ok((user, false))
            }
            None => Err(AppError::Conflict(reason)),
        },
        Err(e) => Err(e),
    }
}
