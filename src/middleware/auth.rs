use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{error::AppError, models::Role, state::AppState};

/// Principal resolved from a bearer access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_employee(&self) -> bool {
        self.role.is_employee()
    }
}

pub fn ensure_any_role(user: &AuthUser, allowed: &[Role]) -> Result<(), AppError> {
    if !allowed.contains(&user.role) {
        return Err(AppError::forbidden());
    }
    Ok(())
}

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?;

    let auth_str = auth_header.to_str().map_err(|_| AppError::InvalidToken)?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::InvalidToken)?;
    Ok(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(parts)?;
        let claims = state.tokens.verify_access_token(token).inspect_err(|_| {
            tracing::debug!(uri = %parts.uri, "rejected access token");
        })?;

        let user = AuthUser {
            user_id: claims.principal_id()?,
            role: claims.role,
        };
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Allow-list of roles for a route.
pub trait RoleSet: Send + Sync + 'static {
    const ALLOWED: &'static [Role];
}

pub struct CustomerOnly;
impl RoleSet for CustomerOnly {
    const ALLOWED: &'static [Role] = &[Role::Customer];
}

pub struct StaffOnly;
impl RoleSet for StaffOnly {
    const ALLOWED: &'static [Role] = &[Role::Admin, Role::Staff];
}

pub struct AdminOnly;
impl RoleSet for AdminOnly {
    const ALLOWED: &'static [Role] = &[Role::Admin];
}

/// Authenticates, then checks the role against `R::ALLOWED`.
pub struct Require<R: RoleSet> {
    pub user: AuthUser,
    _roles: PhantomData<R>,
}

impl<R: RoleSet> FromRequestParts<AppState> for Require<R> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        ensure_any_role(&user, R::ALLOWED)?;
        Ok(Require {
            user,
            _roles: PhantomData,
        })
    }
}
