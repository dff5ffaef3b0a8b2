use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedProfile,
    domain::Role,
    error::{AppError, AppResult},
    models::Profile,
    schema::profiles,
    state::AppState,
};

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub company_id: Option<Uuid>,
    pub created_at: String,
}

pub async fn me(
    State(state): State<AppState>,
    caller: AuthenticatedProfile,
) -> AppResult<Json<ProfileResponse>> {
    let mut conn = state.db()?;
    let profile: Profile = profiles::table.find(caller.profile_id).first(&mut conn)?;

    Ok(Json(ProfileResponse {
        id: profile.id,
        email: profile.email,
        display_name: profile.display_name,
        role: profile.role,
        company_id: profile.company_id,
        created_at: profile.created_at.and_utc().to_rfc3339(),
    }))
}

/// First phase of profile deletion: access is cut immediately by setting
/// `disabled_at`; purging the identity record happens through the external
/// identity provider's own admin surface.
pub async fn disable_profile(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    caller: AuthenticatedProfile,
) -> AppResult<StatusCode> {
    if caller.role != Role::Admin {
        return Err(AppError::permission_denied(
            "only an admin may disable profiles",
        ));
    }

    let mut conn = state.db()?;
    let now = Utc::now().naive_utc();
    let updated = diesel::update(profiles::table.find(profile_id))
        .set((
            profiles::disabled_at.eq(Some(now)),
            profiles::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    if updated == 0 {
        return Err(AppError::not_found());
    }

    info!(%profile_id, "profile disabled");
    Ok(StatusCode::NO_CONTENT)
}
