use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_minutes: i64,
    pub sweep_interval_secs: u64,
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "medibot.sid".into(),
            ttl_minutes: 60 * 24,
            sweep_interval_secs: 60 * 60,
            secure_cookie: false,
        }
    }
}

/// Upper bound for `SESSION_TTL_MINUTES`: one year.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

fn check_session_ttl(minutes: i64) -> anyhow::Result<()> {
    if minutes <= 0 {
        anyhow::bail!("SESSION_TTL_MINUTES must be positive");
    }
    if minutes > MAX_SESSION_TTL_MINUTES {
        anyhow::bail!("SESSION_TTL_MINUTES must be at most {MAX_SESSION_TTL_MINUTES}");
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Postgres backend when set, in-memory stores otherwise.
    pub database_url: Option<String>,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = SessionConfig::default();
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.cookie_name),
            ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(defaults.ttl_minutes),
            sweep_interval_secs: std::env::var("SESSION_SWEEP_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.sweep_interval_secs),
            secure_cookie: std::env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
        };
        check_session_ttl(session.ttl_minutes)?;
        Ok(Self {
            database_url,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ttl_bounds() {
        assert!(check_session_ttl(0).is_err());
        assert!(check_session_ttl(-5).is_err());
        assert!(check_session_ttl(SessionConfig::default().ttl_minutes).is_ok());
        assert!(check_session_ttl(525_600).is_ok());
        assert!(check_session_ttl(525_601).is_err());
        assert!(check_session_ttl(i64::MAX).is_err());
    }
}
