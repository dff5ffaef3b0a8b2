pub mod jwt;
pub mod password;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{Actor, Role},
    error::AppError,
    models::Profile,
    schema::profiles,
    state::AppState,
};

/// The verified caller. The profile row is re-read on every request so that
/// a freshly linked company or an admin disable takes effect immediately,
/// without waiting for token expiry.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedProfile {
    pub profile_id: Uuid,
    pub email: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
}

impl AuthenticatedProfile {
    pub fn actor(&self) -> Actor {
        Actor {
            profile_id: self.profile_id,
            role: self.role,
            company_id: self.company_id,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedProfile {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::unauthorized())?;

        let claims = state
            .jwt
            .verify_token(bearer.token())
            .map_err(|_| AppError::unauthorized())?;

        let mut conn = state.db()?;
        let profile: Profile = profiles::table
            .find(claims.sub)
            .first(&mut conn)
            .map_err(|_| AppError::unauthorized())?;

        if profile.disabled_at.is_some() {
            return Err(AppError::unauthorized());
        }

        let role = Role::parse(&profile.role).map_err(|_| AppError::unauthorized())?;

        Ok(AuthenticatedProfile {
            profile_id: profile.id,
            email: profile.email,
            role,
            company_id: profile.company_id,
        })
    }
}
