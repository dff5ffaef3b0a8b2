use axum::{extract::State, http::StatusCode, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::{password, AuthenticatedProfile},
    domain::Role,
    error::{AppError, AppResult},
    models::{NewProfile, Profile},
    schema::profiles,
    state::AppState,
};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    if payload.role == Role::Admin {
        return Err(AppError::validation(
            "admin accounts cannot be self-registered",
        ));
    }

    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("a valid email address is required"));
    }
    if payload.password.len() < 8 {
        return Err(AppError::validation(
            "password must be at least 8 characters",
        ));
    }
    let display_name = payload.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::validation("display_name must not be empty"));
    }

    let password_hash = password::hash_password(&payload.password)?;
    let new_profile = NewProfile {
        id: Uuid::new_v4(),
        email: email.clone(),
        display_name: display_name.to_string(),
        password_hash,
        role: payload.role.as_str().to_string(),
    };

    let mut conn = state.db()?;
    match diesel::insert_into(profiles::table)
        .values(&new_profile)
        .execute(&mut conn)
    {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            return Err(AppError::validation("email is already registered"));
        }
        Err(err) => return Err(AppError::from(err)),
    }

    info!(profile_id = %new_profile.id, role = %payload.role, "profile registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: new_profile.id,
            email,
            role: payload.role,
        }),
    ))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let mut conn = state.db()?;

    let profile: Profile = profiles::table
        .filter(profiles::email.eq(payload.email.trim().to_lowercase()))
        .first(&mut conn)
        .map_err(|_| AppError::unauthorized())?;

    if profile.disabled_at.is_some() {
        return Err(AppError::unauthorized());
    }

    let valid = password::verify_password(&payload.password, &profile.password_hash)
        .map_err(|_| AppError::unauthorized())?;
    if !valid {
        return Err(AppError::unauthorized());
    }

    let access_token = state.jwt.generate_token(
        profile.id,
        &profile.email,
        &profile.role,
        profile.company_id,
    )?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.jwt_expiry_minutes * 60,
    }))
}

pub async fn me(profile: AuthenticatedProfile) -> Json<AuthenticatedProfile> {
    Json(profile)
}
