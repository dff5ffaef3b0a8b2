use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedProfile,
    domain::{
        authorize, load::derive_cross_border, Action, LoadStatus, Role, TrailerType,
    },
    error::{AppError, AppResult},
    geocode::Coordinates,
    models::{Company, Load, NewLoad},
    schema::{companies, loads},
    state::AppState,
};

#[derive(Serialize)]
pub struct LoadResponse {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub pickup_address: String,
    pub pickup_city: String,
    pub pickup_province: Option<String>,
    pub pickup_country: String,
    pub pickup_lat: Option<f64>,
    pub pickup_lng: Option<f64>,
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_province: Option<String>,
    pub delivery_country: String,
    pub delivery_lat: Option<f64>,
    pub delivery_lng: Option<f64>,
    pub cargo_type: String,
    pub description: Option<String>,
    pub weight_tons: f64,
    pub required_trailer_types: Vec<String>,
    pub budget_amount: Option<f64>,
    pub is_cross_border: bool,
    pub is_hazardous: bool,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

fn to_load_response(load: Load) -> LoadResponse {
    LoadResponse {
        id: load.id,
        company_id: load.company_id,
        pickup_address: load.pickup_address,
        pickup_city: load.pickup_city,
        pickup_province: load.pickup_province,
        pickup_country: load.pickup_country,
        pickup_lat: load.pickup_lat,
        pickup_lng: load.pickup_lng,
        delivery_address: load.delivery_address,
        delivery_city: load.delivery_city,
        delivery_province: load.delivery_province,
        delivery_country: load.delivery_country,
        delivery_lat: load.delivery_lat,
        delivery_lng: load.delivery_lng,
        cargo_type: load.cargo_type,
        description: load.description,
        weight_tons: load.weight_tons,
        required_trailer_types: load.required_trailer_types,
        budget_amount: load.budget_amount,
        is_cross_border: load.is_cross_border,
        is_hazardous: load.is_hazardous,
        status: load.status,
        created_at: load.created_at.and_utc().to_rfc3339(),
        updated_at: load.updated_at.and_utc().to_rfc3339(),
    }
}

fn validate_trailer_types(raw: &[String]) -> AppResult<Vec<String>> {
    raw.iter()
        .map(|value| {
            TrailerType::parse(value.trim())
                .map(|t| t.as_str().to_string())
                .map_err(AppError::from)
        })
        .collect()
}

async fn lookup_coordinates(state: &AppState, address: &str, city: &str, country: &str) -> Option<Coordinates> {
    let full_address = format!("{address}, {city}, {country}");
    state.geocoder.geocode(&full_address).await
}

#[derive(Deserialize)]
pub struct CreateLoadRequest {
    pub pickup_address: String,
    pub pickup_city: String,
    pub pickup_province: Option<String>,
    pub pickup_country: String,
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_province: Option<String>,
    pub delivery_country: String,
    pub cargo_type: String,
    pub description: Option<String>,
    pub weight_tons: f64,
    #[serde(default)]
    pub required_trailer_types: Vec<String>,
    pub budget_amount: Option<f64>,
    #[serde(default)]
    pub is_cross_border: bool,
    #[serde(default)]
    pub is_hazardous: bool,
    /// Admin-only: skip review and create the load already approved.
    #[serde(default)]
    pub approve_immediately: bool,
}

pub async fn create_load(
    State(state): State<AppState>,
    caller: AuthenticatedProfile,
    Json(payload): Json<CreateLoadRequest>,
) -> AppResult<(StatusCode, Json<LoadResponse>)> {
    // admins may post loads with no company at all; everyone else posts for
    // their own supplier company
    let company_id = if caller.role == Role::Admin {
        caller.company_id
    } else {
        let company_id = caller.company_id.ok_or_else(|| {
            AppError::validation("a company is required before posting loads")
        })?;
        let mut conn = state.db()?;
        let company: Company = companies::table.find(company_id).first(&mut conn)?;
        if company.company_type != "supplier" {
            return Err(AppError::permission_denied(
                "only supplier companies may post loads",
            ));
        }
        Some(company_id)
    };

    authorize(&caller.actor(), Action::CreateLoad { company: company_id })
        .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    if payload.approve_immediately && caller.role != Role::Admin {
        return Err(AppError::permission_denied(
            "only an admin may create pre-approved loads",
        ));
    }

    if payload.weight_tons < 0.0 {
        return Err(AppError::validation("weight_tons must be non-negative"));
    }
    if matches!(payload.budget_amount, Some(amount) if amount < 0.0) {
        return Err(AppError::validation("budget_amount must be non-negative"));
    }
    for (field, value) in [
        ("pickup_address", &payload.pickup_address),
        ("pickup_city", &payload.pickup_city),
        ("pickup_country", &payload.pickup_country),
        ("delivery_address", &payload.delivery_address),
        ("delivery_city", &payload.delivery_city),
        ("delivery_country", &payload.delivery_country),
        ("cargo_type", &payload.cargo_type),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::validation(format!("{field} must not be empty")));
        }
    }

    let required_trailer_types = validate_trailer_types(&payload.required_trailer_types)?;

    let is_cross_border = derive_cross_border(
        payload.is_cross_border,
        &payload.pickup_country,
        &payload.delivery_country,
    );

    let status = if payload.approve_immediately {
        LoadStatus::Approved
    } else {
        LoadStatus::Pending
    };

    let pickup_coords = lookup_coordinates(
        &state,
        &payload.pickup_address,
        &payload.pickup_city,
        &payload.pickup_country,
    )
    .await;
    let delivery_coords = lookup_coordinates(
        &state,
        &payload.delivery_address,
        &payload.delivery_city,
        &payload.delivery_country,
    )
    .await;

    let new_load = NewLoad {
        id: Uuid::new_v4(),
        company_id,
        created_by: caller.profile_id,
        pickup_address: payload.pickup_address.trim().to_string(),
        pickup_city: payload.pickup_city.trim().to_string(),
        pickup_province: payload.pickup_province,
        pickup_country: payload.pickup_country.trim().to_string(),
        pickup_lat: pickup_coords.map(|c| c.latitude),
        pickup_lng: pickup_coords.map(|c| c.longitude),
        delivery_address: payload.delivery_address.trim().to_string(),
        delivery_city: payload.delivery_city.trim().to_string(),
        delivery_province: payload.delivery_province,
        delivery_country: payload.delivery_country.trim().to_string(),
        delivery_lat: delivery_coords.map(|c| c.latitude),
        delivery_lng: delivery_coords.map(|c| c.longitude),
        cargo_type: payload.cargo_type.trim().to_string(),
        description: payload.description,
        weight_tons: payload.weight_tons,
        required_trailer_types,
        budget_amount: payload.budget_amount,
        is_cross_border,
        is_hazardous: payload.is_hazardous,
        status: status.as_str().to_string(),
    };

    let mut conn = state.db()?;
    diesel::insert_into(loads::table)
        .values(&new_load)
        .execute(&mut conn)?;

    let load: Load = loads::table.find(new_load.id).first(&mut conn)?;
    info!(load_id = %load.id, status = %load.status, "load created");
    Ok((StatusCode::CREATED, Json(to_load_response(load))))
}

/// Transporter marketplace view: only approved loads, regardless of company.
pub async fn available_loads(
    State(state): State<AppState>,
    caller: AuthenticatedProfile,
) -> AppResult<Json<Vec<LoadResponse>>> {
    if caller.role == Role::Supplier {
        return Err(AppError::permission_denied(
            "suppliers browse their own loads, not the marketplace",
        ));
    }

    let mut conn = state.db()?;
    let rows: Vec<Load> = loads::table
        .filter(loads::status.eq(LoadStatus::Approved.as_str()))
        .order(loads::created_at.desc())
        .load(&mut conn)?;

    Ok(Json(rows.into_iter().map(to_load_response).collect()))
}

/// All of the caller's company's loads, whatever their status.
pub async fn my_loads(
    State(state): State<AppState>,
    caller: AuthenticatedProfile,
) -> AppResult<Json<Vec<LoadResponse>>> {
    let company_id = caller
        .company_id
        .ok_or_else(|| AppError::validation("a company is required to list your loads"))?;

    let mut conn = state.db()?;
    let rows: Vec<Load> = loads::table
        .filter(loads::company_id.eq(Some(company_id)))
        .order(loads::created_at.desc())
        .load(&mut conn)?;

    Ok(Json(rows.into_iter().map(to_load_response).collect()))
}

#[derive(Deserialize)]
pub struct AdminLoadQuery {
    pub status: Option<String>,
}

/// Admin view: unfiltered, with an optional status filter.
pub async fn list_loads(
    State(state): State<AppState>,
    Query(params): Query<AdminLoadQuery>,
    caller: AuthenticatedProfile,
) -> AppResult<Json<Vec<LoadResponse>>> {
    if caller.role != Role::Admin {
        return Err(AppError::permission_denied(
            "only an admin may list all loads",
        ));
    }

    let mut conn = state.db()?;
    let mut query = loads::table.into_boxed();
    if let Some(status) = params.status.as_deref() {
        let status = LoadStatus::parse(status)?;
        query = query.filter(loads::status.eq(status.as_str()));
    }
    let rows: Vec<Load> = query.order(loads::created_at.desc()).load(&mut conn)?;

    Ok(Json(rows.into_iter().map(to_load_response).collect()))
}

pub async fn get_load(
    State(state): State<AppState>,
    Path(load_id): Path<Uuid>,
    caller: AuthenticatedProfile,
) -> AppResult<Json<LoadResponse>> {
    let mut conn = state.db()?;
    let load: Load = loads::table.find(load_id).first(&mut conn)?;

    let status = LoadStatus::parse(&load.status)?;
    authorize(
        &caller.actor(),
        Action::ReadLoad {
            owner_company: load.company_id,
            status,
        },
    )
    .map_err(|_| AppError::not_found())?;

    Ok(Json(to_load_response(load)))
}

#[derive(Deserialize)]
pub struct UpdateLoadRequest {
    pub pickup_address: Option<String>,
    pub pickup_city: Option<String>,
    pub pickup_province: Option<String>,
    pub pickup_country: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_city: Option<String>,
    pub delivery_province: Option<String>,
    pub delivery_country: Option<String>,
    pub cargo_type: Option<String>,
    pub description: Option<String>,
    pub weight_tons: Option<f64>,
    pub required_trailer_types: Option<Vec<String>>,
    pub budget_amount: Option<f64>,
    pub is_cross_border: Option<bool>,
    pub is_hazardous: Option<bool>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = loads)]
struct LoadChangeset {
    pickup_address: Option<String>,
    pickup_city: Option<String>,
    pickup_province: Option<String>,
    pickup_country: Option<String>,
    pickup_lat: Option<Option<f64>>,
    pickup_lng: Option<Option<f64>>,
    delivery_address: Option<String>,
    delivery_city: Option<String>,
    delivery_province: Option<String>,
    delivery_country: Option<String>,
    delivery_lat: Option<Option<f64>>,
    delivery_lng: Option<Option<f64>>,
    cargo_type: Option<String>,
    description: Option<String>,
    weight_tons: Option<f64>,
    required_trailer_types: Option<Vec<String>>,
    budget_amount: Option<f64>,
    is_cross_border: Option<bool>,
    is_hazardous: Option<bool>,
    updated_at: Option<chrono::NaiveDateTime>,
}

/// Creator-side field edits. Only legal while the load is still pending or
/// rejected; editing a rejected load does not change its status.
pub async fn update_load(
    State(state): State<AppState>,
    Path(load_id): Path<Uuid>,
    caller: AuthenticatedProfile,
    Json(payload): Json<UpdateLoadRequest>,
) -> AppResult<Json<LoadResponse>> {
    let mut conn = state.db()?;
    let load: Load = loads::table.find(load_id).first(&mut conn)?;
    drop(conn);

    authorize(
        &caller.actor(),
        Action::EditLoad {
            owner_company: load.company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let status = LoadStatus::parse(&load.status)?;
    status.ensure_editable(load.id)?;

    if matches!(payload.weight_tons, Some(w) if w < 0.0) {
        return Err(AppError::validation("weight_tons must be non-negative"));
    }
    if matches!(payload.budget_amount, Some(amount) if amount < 0.0) {
        return Err(AppError::validation("budget_amount must be non-negative"));
    }

    let required_trailer_types = payload
        .required_trailer_types
        .map(|types| validate_trailer_types(&types))
        .transpose()?;

    let pickup_country = payload
        .pickup_country
        .clone()
        .unwrap_or_else(|| load.pickup_country.clone());
    let delivery_country = payload
        .delivery_country
        .clone()
        .unwrap_or_else(|| load.delivery_country.clone());
    let explicit_cross_border = payload.is_cross_border.unwrap_or(load.is_cross_border);
    let is_cross_border =
        derive_cross_border(explicit_cross_border, &pickup_country, &delivery_country);

    // re-geocode only the endpoints whose address, city or country changed,
    // since all three feed the lookup query
    let pickup_coords = match (
        &payload.pickup_address,
        &payload.pickup_city,
        &payload.pickup_country,
    ) {
        (None, None, None) => None,
        (address, city, _) => Some(
            lookup_coordinates(
                &state,
                address.as_deref().unwrap_or(&load.pickup_address),
                city.as_deref().unwrap_or(&load.pickup_city),
                &pickup_country,
            )
            .await,
        ),
    };
    let delivery_coords = match (
        &payload.delivery_address,
        &payload.delivery_city,
        &payload.delivery_country,
    ) {
        (None, None, None) => None,
        (address, city, _) => Some(
            lookup_coordinates(
                &state,
                address.as_deref().unwrap_or(&load.delivery_address),
                city.as_deref().unwrap_or(&load.delivery_city),
                &delivery_country,
            )
            .await,
        ),
    };

    let changeset = LoadChangeset {
        pickup_address: payload.pickup_address,
        pickup_city: payload.pickup_city,
        pickup_province: payload.pickup_province,
        pickup_country: payload.pickup_country,
        pickup_lat: pickup_coords.map(|c| c.map(|c| c.latitude)),
        pickup_lng: pickup_coords.map(|c| c.map(|c| c.longitude)),
        delivery_address: payload.delivery_address,
        delivery_city: payload.delivery_city,
        delivery_province: payload.delivery_province,
        delivery_country: payload.delivery_country,
        delivery_lat: delivery_coords.map(|c| c.map(|c| c.latitude)),
        delivery_lng: delivery_coords.map(|c| c.map(|c| c.longitude)),
        cargo_type: payload.cargo_type,
        description: payload.description,
        weight_tons: payload.weight_tons,
        required_trailer_types,
        budget_amount: payload.budget_amount,
        is_cross_border: Some(is_cross_border),
        is_hazardous: payload.is_hazardous,
        updated_at: Some(Utc::now().naive_utc()),
    };

    let mut conn = state.db()?;
    diesel::update(loads::table.find(load_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let updated: Load = loads::table.find(load_id).first(&mut conn)?;
    Ok(Json(to_load_response(updated)))
}

/// Creator-side deletion, legal only while the load is still pending.
pub async fn delete_load(
    State(state): State<AppState>,
    Path(load_id): Path<Uuid>,
    caller: AuthenticatedProfile,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    let load: Load = loads::table.find(load_id).first(&mut conn)?;

    authorize(
        &caller.actor(),
        Action::DeleteLoad {
            owner_company: load.company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let status = LoadStatus::parse(&load.status)?;
    status.ensure_deletable(load.id)?;

    diesel::delete(loads::table.find(load_id)).execute(&mut conn)?;

    info!(%load_id, "load deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub status: String,
}

/// Admin-driven status changes, validated against the closed transition
/// table: pending review decisions, the approved → in_transit → completed
/// pipeline, resurrection of rejected loads, and cancellation.
pub async fn transition_load(
    State(state): State<AppState>,
    Path(load_id): Path<Uuid>,
    caller: AuthenticatedProfile,
    Json(payload): Json<TransitionRequest>,
) -> AppResult<Json<LoadResponse>> {
    authorize(&caller.actor(), Action::TransitionLoad)
        .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let target = LoadStatus::parse(&payload.status)?;

    let mut conn = state.db()?;
    let load: Load = loads::table.find(load_id).first(&mut conn)?;

    let current = LoadStatus::parse(&load.status)?;
    let next = current.transition(target)?;

    diesel::update(loads::table.find(load_id))
        .set((
            loads::status.eq(next.as_str()),
            loads::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

    let updated: Load = loads::table.find(load_id).first(&mut conn)?;

    info!(
        %load_id,
        from = current.as_str(),
        to = next.as_str(),
        by = %caller.profile_id,
        "load transitioned"
    );

    Ok(Json(to_load_response(updated)))
}
