use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::{
    audit,
    dto::{
        auth::{Claims, LoginRequest, LoginResponse, SessionUser},
        non_blank,
    },
    entity::users::{
        ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel,
    },
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials.";

pub fn hash_pin(pin: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

/// bcrypt hashes written by the previous till software.
fn is_bcrypt(stored_hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| stored_hash.starts_with(prefix))
}

/// Stored hashes that should be replaced by an argon2 one after a successful login.
pub fn needs_rehash(stored_hash: &str) -> bool {
    is_bcrypt(stored_hash)
}

/// Accepts argon2 PHC strings and legacy bcrypt hashes; anything else never matches.
pub fn verify_pin(pin: &str, stored_hash: &str) -> AppResult<bool> {
    if is_bcrypt(stored_hash) {
        return Ok(bcrypt::verify(pin, stored_hash).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "stored bcrypt hash is malformed");
            false
        }));
    }

    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        tracing::warn!("stored password hash is not a PHC string");
        return Ok(false);
    };
    Ok(Argon2::default()
        .verify_password(pin.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn issue_token(secret: &str, ttl_hours: i64, user: &UserModel) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        role: user.role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn decode_token(secret: &str, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let (Some(username), Some(pin)) = (non_blank(payload.username), non_blank(payload.pin))
    else {
        return Err(AppError::BadRequest("Username and PIN are required.".into()));
    };

    let user = Users::find()
        .filter(UserCol::Username.eq(username.as_str()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    if !verify_pin(&pin, &user.password)? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    if needs_rehash(&user.password) {
        upgrade_pin_hash(state, &user, &pin).await;
    }

    let token = issue_token(&state.config.jwt_secret, state.config.jwt_ttl_hours, &user)?;

    audit::record(
        &state.pool,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    let name = user
        .full_name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| user.username.clone());

    Ok(ApiResponse::success(
        "Login successful!",
        LoginResponse {
            user: SessionUser {
                id: user.id,
                username: user.username,
                role: user.role,
                name,
            },
            token,
        },
        Some(Meta::empty()),
    ))
}

/// Best effort: a failed upgrade leaves the legacy hash in place.
async fn upgrade_pin_hash(state: &AppState, user: &UserModel, pin: &str) {
    let result = async {
        let mut active: UserActive = user.clone().into();
        active.password = Set(hash_pin(pin)?);
        active.update(&state.orm).await?;
        Ok::<_, AppError>(())
    }
    .await;

    match result {
        Ok(()) => tracing::info!(user_id = user.id, "legacy pin hash upgraded to argon2"),
        Err(err) => tracing::warn!(user_id = user.id, error = %err, "pin hash upgrade failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn model() -> UserModel {
        UserModel {
            id: 7,
            username: "cashier".into(),
            password: String::new(),
            role: Role::Cashier,
            email: None,
            full_name: None,
        }
    }

    #[test]
    fn pin_hash_round_trip() {
        let hash = hash_pin("12345").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_pin("12345", &hash).unwrap());
        assert!(!verify_pin("54321", &hash).unwrap());
    }

    #[test]
    fn legacy_bcrypt_hashes_still_verify() {
        let hash = bcrypt::hash("12345", 4).unwrap();
        assert!(needs_rehash(&hash));
        assert!(verify_pin("12345", &hash).unwrap());
        assert!(!verify_pin("54321", &hash).unwrap());
        assert!(!verify_pin("12345", "$2b$10$not-a-real-hash").unwrap());
        assert!(!needs_rehash(&hash_pin("12345").unwrap()));
    }

    #[test]
    fn token_carries_identity() {
        let token = issue_token("secret", 1, &model()).unwrap();
        let claims = decode_token("secret", &token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "cashier");
        assert_eq!(claims.role, Role::Cashier);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = issue_token("secret", 1, &model()).unwrap();
        assert!(matches!(
            decode_token("other", &token),
            Err(AppError::Unauthorized(_))
        ));
    }
}
