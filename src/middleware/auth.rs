use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{
    config::JwtConfig,
    dto::auth::Claims,
    entity::{product_reviews, reups, user_product_dislikes, user_product_favorites},
    error::AppError,
    state::AppState,
};

/// The authenticated caller. `email` is the identity stored in `user` columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
}

impl AuthUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Per-call context handed to every procedure.
#[derive(Debug, Clone, Default)]
pub struct Ctx {
    pub user: Option<AuthUser>,
}

impl Ctx {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: AuthUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn require_user(&self) -> Result<&AuthUser, AppError> {
        self.user.as_ref().ok_or(AppError::Unauthorized)
    }
}

/// Rows that belong to exactly one user.
pub trait Owned {
    fn owner(&self) -> &str;
}

impl Owned for reups::Model {
    fn owner(&self) -> &str {
        &self.user
    }
}

impl Owned for user_product_favorites::Model {
    fn owner(&self) -> &str {
        &self.user
    }
}

impl Owned for user_product_dislikes::Model {
    fn owner(&self) -> &str {
        &self.user
    }
}

impl Owned for product_reviews::Model {
    fn owner(&self) -> &str {
        &self.user
    }
}

pub fn belongs_to_caller<M: Owned>(entity: &M, caller: &AuthUser) -> bool {
    entity.owner() == caller.email
}

/// Fetch-then-authorize guard: `NotFound` when the lookup came back empty,
/// `Unauthorized` when the row is someone else's.
pub fn ensure_owner<M: Owned>(
    found: Option<M>,
    what: &str,
    id: i32,
    caller: &AuthUser,
) -> Result<M, AppError> {
    let entity = found.ok_or_else(|| AppError::not_found(what, id))?;
    if !belongs_to_caller(&entity, caller) {
        tracing::warn!(caller = %caller.email, entity = what, id, "ownership check failed");
        return Err(AppError::Unauthorized);
    }
    Ok(entity)
}

/// Verifies a bearer token and returns the caller it names.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<AuthUser, AppError> {
    let mut validation = Validation::default();
    validation.validate_aud = false;
    if let Some(issuer) = &config.issuer {
        validation.set_issuer(&[issuer.as_str()]);
    }

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|err| {
        tracing::debug!(error = %err, "rejected session token");
        AppError::Unauthorized
    })?;

    let identity = decoded.claims.identity();
    if identity.is_empty() {
        return Err(AppError::Unauthorized);
    }
    Ok(AuthUser::new(identity))
}

impl FromRequestParts<AppState> for Ctx {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(Ctx::anonymous());
        };

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        let Some(token) = auth_str.strip_prefix("Bearer ") else {
            return Err(AppError::BadRequest("Invalid Authorization scheme".into()));
        };

        let user = verify_token(token.trim(), &state.jwt)?;
        Ok(Ctx::authenticated(user))
    }
}
