use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by session tokens from the auth provider. The caller
/// identity is `email`, falling back to `sub`.
#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    /// Claims for `email` expiring `valid_for` from now. `None` when the
    /// expiry is not a positive timestamp.
    pub fn for_email(email: &str, issuer: Option<String>, valid_for: Duration) -> Option<Self> {
        let exp = Utc::now().checked_add_signed(valid_for)?.timestamp();
        let exp = usize::try_from(exp).ok().filter(|exp| *exp > 0)?;
        Some(Self {
            sub: email.to_string(),
            email: Some(email.to_string()),
            exp,
            iss: issuer,
        })
    }

    pub fn identity(&self) -> &str {
        self.email
            .as_deref()
            .filter(|email| !email.is_empty())
            .unwrap_or(&self.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_lies_in_the_future() {
        let claims = Claims::for_email("alice@example.com", None, Duration::hours(24)).unwrap();
        assert!(claims.exp as i64 > Utc::now().timestamp());
        assert_eq!(claims.identity(), "alice@example.com");
    }

    #[test]
    fn expiry_before_the_epoch_is_refused() {
        let past = Duration::hours(-(Utc::now().timestamp() / 3600) - 24);
        assert!(Claims::for_email("alice@example.com", None, past).is_none());
    }
}
