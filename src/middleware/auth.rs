use axum::{extract::FromRequestParts, http::header};
use sea_orm::EntityTrait;

use crate::{
    entity::users::Entity as Users, error::AppError, models::Role,
    services::auth_service::decode_token, state::AppState,
};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

pub fn ensure_any_role(user: &AuthUser, roles: &[Role]) -> Result<(), AppError> {
    if !roles.contains(&user.role) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_any_role(user, &[Role::Admin])
}

/// Catalog, floor plan and reports.
pub fn ensure_manager(user: &AuthUser) -> Result<(), AppError> {
    ensure_any_role(user, &[Role::Admin, Role::Manager])
}

/// Taking payment for an order.
pub fn ensure_cashier(user: &AuthUser) -> Result<(), AppError> {
    ensure_any_role(user, &[Role::Admin, Role::Manager, Role::Cashier])
}

/// Placing orders from the floor or the till.
pub fn ensure_order_taker(user: &AuthUser) -> Result<(), AppError> {
    ensure_any_role(
        user,
        &[Role::Admin, Role::Manager, Role::Cashier, Role::Waiter],
    )
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

        let claims = decode_token(&state.config.jwt_secret, token)?;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

        // The account row, not the token, decides the role.
        let account = Users::find_by_id(user_id)
            .one(&state.orm)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))?;

        Ok(AuthUser {
            user_id,
            username: account.username,
            role: account.role,
        })
    }
}
