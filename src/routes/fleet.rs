use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedProfile,
    domain::{authorize, Action, ParentRef, TrailerType},
    error::{AppError, AppResult},
    models::{
        Company, Driver, NewDriver, NewTrailer, NewTruck, Trailer, Truck,
    },
    schema::{companies, drivers, trailers, trucks},
    state::AppState,
};

use super::documents::remove_documents_for_parent;

/// Resolves which company a fleet mutation targets: members act on their own
/// company, an admin names one explicitly. The company must be
/// transporter-typed for any fleet asset to attach.
fn resolve_fleet_company(
    state: &AppState,
    caller: &AuthenticatedProfile,
    explicit: Option<Uuid>,
) -> AppResult<Uuid> {
    let company_id = match explicit.or(caller.company_id) {
        Some(id) => id,
        None => {
            return Err(AppError::validation(
                "a company is required before registering fleet assets",
            ))
        }
    };

    authorize(
        &caller.actor(),
        Action::ManageFleet {
            owner_company: company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let mut conn = state.db()?;
    let company: Company = companies::table.find(company_id).first(&mut conn)?;
    if company.company_type != "transporter" {
        return Err(AppError::validation(
            "fleet assets can only be registered to a transporter company",
        ));
    }

    Ok(company_id)
}

fn require_non_empty(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn require_non_negative_i32(value: Option<i32>, field: &str) -> AppResult<Option<i32>> {
    match value {
        Some(v) if v < 0 => Err(AppError::validation(format!("{field} must be non-negative"))),
        other => Ok(other),
    }
}

fn require_non_negative_f64(value: Option<f64>, field: &str) -> AppResult<Option<f64>> {
    match value {
        Some(v) if v < 0.0 => Err(AppError::validation(format!("{field} must be non-negative"))),
        other => Ok(other),
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub company_id: Option<Uuid>,
}

fn list_scope(caller: &AuthenticatedProfile, params: &ListQuery) -> AppResult<Option<Uuid>> {
    if caller.actor().is_admin() {
        return Ok(params.company_id);
    }
    match caller.company_id {
        Some(own) => Ok(Some(own)),
        None => Err(AppError::validation(
            "a company is required to list fleet assets",
        )),
    }
}

// ---- Drivers ----

#[derive(Deserialize)]
pub struct CreateDriverRequest {
    pub company_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub license_expiry: Option<NaiveDate>,
    pub phone: Option<String>,
}

#[derive(Serialize)]
pub struct DriverResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
    pub license_expiry: Option<NaiveDate>,
    pub phone: Option<String>,
}

fn to_driver_response(driver: Driver) -> DriverResponse {
    DriverResponse {
        id: driver.id,
        company_id: driver.company_id,
        first_name: driver.first_name,
        last_name: driver.last_name,
        license_number: driver.license_number,
        license_expiry: driver.license_expiry,
        phone: driver.phone,
    }
}

pub async fn create_driver(
    State(state): State<AppState>,
    caller: AuthenticatedProfile,
    Json(payload): Json<CreateDriverRequest>,
) -> AppResult<(StatusCode, Json<DriverResponse>)> {
    let company_id = resolve_fleet_company(&state, &caller, payload.company_id)?;

    let new_driver = NewDriver {
        id: Uuid::new_v4(),
        company_id,
        first_name: require_non_empty(&payload.first_name, "first_name")?,
        last_name: require_non_empty(&payload.last_name, "last_name")?,
        license_number: require_non_empty(&payload.license_number, "license_number")?,
        license_expiry: payload.license_expiry,
        phone: payload.phone,
    };

    let mut conn = state.db()?;
    diesel::insert_into(drivers::table)
        .values(&new_driver)
        .execute(&mut conn)?;

    let driver: Driver = drivers::table.find(new_driver.id).first(&mut conn)?;
    info!(driver_id = %driver.id, %company_id, "driver registered");
    Ok((StatusCode::CREATED, Json(to_driver_response(driver))))
}

pub async fn list_drivers(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
    caller: AuthenticatedProfile,
) -> AppResult<Json<Vec<DriverResponse>>> {
    let scope = list_scope(&caller, &params)?;

    let mut conn = state.db()?;
    let mut query = drivers::table.into_boxed();
    if let Some(company_id) = scope {
        query = query.filter(drivers::company_id.eq(company_id));
    }
    let rows: Vec<Driver> = query.order(drivers::created_at.desc()).load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_driver_response).collect()))
}

#[derive(Deserialize)]
pub struct UpdateDriverRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub phone: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = drivers)]
struct DriverChangeset {
    first_name: Option<String>,
    last_name: Option<String>,
    license_number: Option<String>,
    license_expiry: Option<NaiveDate>,
    phone: Option<String>,
    updated_at: Option<chrono::NaiveDateTime>,
}

pub async fn update_driver(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
    caller: AuthenticatedProfile,
    Json(payload): Json<UpdateDriverRequest>,
) -> AppResult<Json<DriverResponse>> {
    let mut conn = state.db()?;
    let existing: Driver = drivers::table.find(driver_id).first(&mut conn)?;
    drop(conn);

    authorize(
        &caller.actor(),
        Action::ManageFleet {
            owner_company: existing.company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let changeset = DriverChangeset {
        first_name: payload
            .first_name
            .map(|v| require_non_empty(&v, "first_name"))
            .transpose()?,
        last_name: payload
            .last_name
            .map(|v| require_non_empty(&v, "last_name"))
            .transpose()?,
        license_number: payload
            .license_number
            .map(|v| require_non_empty(&v, "license_number"))
            .transpose()?,
        license_expiry: payload.license_expiry,
        phone: payload.phone,
        updated_at: Some(Utc::now().naive_utc()),
    };

    let mut conn = state.db()?;
    diesel::update(drivers::table.find(driver_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let driver: Driver = drivers::table.find(driver_id).first(&mut conn)?;
    Ok(Json(to_driver_response(driver)))
}

pub async fn delete_driver(
    State(state): State<AppState>,
    Path(driver_id): Path<Uuid>,
    caller: AuthenticatedProfile,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    let existing: Driver = drivers::table.find(driver_id).first(&mut conn)?;
    drop(conn);

    authorize(
        &caller.actor(),
        Action::ManageFleet {
            owner_company: existing.company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    remove_documents_for_parent(&state, ParentRef::Driver(driver_id)).await?;

    let mut conn = state.db()?;
    diesel::delete(drivers::table.find(driver_id)).execute(&mut conn)?;

    info!(%driver_id, "driver deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---- Trucks ----

#[derive(Deserialize)]
pub struct CreateTruckRequest {
    pub company_id: Option<Uuid>,
    pub registration_number: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub axle_count: Option<i32>,
}

#[derive(Serialize)]
pub struct TruckResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub registration_number: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub axle_count: Option<i32>,
}

fn to_truck_response(truck: Truck) -> TruckResponse {
    TruckResponse {
        id: truck.id,
        company_id: truck.company_id,
        registration_number: truck.registration_number,
        make: truck.make,
        model: truck.model,
        year: truck.year,
        axle_count: truck.axle_count,
    }
}

pub async fn create_truck(
    State(state): State<AppState>,
    caller: AuthenticatedProfile,
    Json(payload): Json<CreateTruckRequest>,
) -> AppResult<(StatusCode, Json<TruckResponse>)> {
    let company_id = resolve_fleet_company(&state, &caller, payload.company_id)?;

    let new_truck = NewTruck {
        id: Uuid::new_v4(),
        company_id,
        registration_number: require_non_empty(&payload.registration_number, "registration_number")?,
        make: payload.make,
        model: payload.model,
        year: require_non_negative_i32(payload.year, "year")?,
        axle_count: require_non_negative_i32(payload.axle_count, "axle_count")?,
    };

    let mut conn = state.db()?;
    diesel::insert_into(trucks::table)
        .values(&new_truck)
        .execute(&mut conn)?;

    let truck: Truck = trucks::table.find(new_truck.id).first(&mut conn)?;
    info!(truck_id = %truck.id, %company_id, "truck registered");
    Ok((StatusCode::CREATED, Json(to_truck_response(truck))))
}

pub async fn list_trucks(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
    caller: AuthenticatedProfile,
) -> AppResult<Json<Vec<TruckResponse>>> {
    let scope = list_scope(&caller, &params)?;

    let mut conn = state.db()?;
    let mut query = trucks::table.into_boxed();
    if let Some(company_id) = scope {
        query = query.filter(trucks::company_id.eq(company_id));
    }
    let rows: Vec<Truck> = query.order(trucks::created_at.desc()).load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_truck_response).collect()))
}

#[derive(Deserialize)]
pub struct UpdateTruckRequest {
    pub registration_number: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub axle_count: Option<i32>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = trucks)]
struct TruckChangeset {
    registration_number: Option<String>,
    make: Option<String>,
    model: Option<String>,
    year: Option<i32>,
    axle_count: Option<i32>,
    updated_at: Option<chrono::NaiveDateTime>,
}

pub async fn update_truck(
    State(state): State<AppState>,
    Path(truck_id): Path<Uuid>,
    caller: AuthenticatedProfile,
    Json(payload): Json<UpdateTruckRequest>,
) -> AppResult<Json<TruckResponse>> {
    let mut conn = state.db()?;
    let existing: Truck = trucks::table.find(truck_id).first(&mut conn)?;
    drop(conn);

    authorize(
        &caller.actor(),
        Action::ManageFleet {
            owner_company: existing.company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let changeset = TruckChangeset {
        registration_number: payload
            .registration_number
            .map(|v| require_non_empty(&v, "registration_number"))
            .transpose()?,
        make: payload.make,
        model: payload.model,
        year: require_non_negative_i32(payload.year, "year")?,
        axle_count: require_non_negative_i32(payload.axle_count, "axle_count")?,
        updated_at: Some(Utc::now().naive_utc()),
    };

    let mut conn = state.db()?;
    diesel::update(trucks::table.find(truck_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let truck: Truck = trucks::table.find(truck_id).first(&mut conn)?;
    Ok(Json(to_truck_response(truck)))
}

pub async fn delete_truck(
    State(state): State<AppState>,
    Path(truck_id): Path<Uuid>,
    caller: AuthenticatedProfile,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    let existing: Truck = trucks::table.find(truck_id).first(&mut conn)?;
    drop(conn);

    authorize(
        &caller.actor(),
        Action::ManageFleet {
            owner_company: existing.company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    remove_documents_for_parent(&state, ParentRef::Truck(truck_id)).await?;

    let mut conn = state.db()?;
    diesel::delete(trucks::table.find(truck_id)).execute(&mut conn)?;

    info!(%truck_id, "truck deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---- Trailers ----

#[derive(Deserialize)]
pub struct CreateTrailerRequest {
    pub company_id: Option<Uuid>,
    pub registration_number: String,
    pub trailer_type: String,
    pub payload_capacity_tons: Option<f64>,
    pub length_meters: Option<f64>,
}

#[derive(Serialize)]
pub struct TrailerResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub registration_number: String,
    pub trailer_type: String,
    pub payload_capacity_tons: Option<f64>,
    pub length_meters: Option<f64>,
}

fn to_trailer_response(trailer: Trailer) -> TrailerResponse {
    TrailerResponse {
        id: trailer.id,
        company_id: trailer.company_id,
        registration_number: trailer.registration_number,
        trailer_type: trailer.trailer_type,
        payload_capacity_tons: trailer.payload_capacity_tons,
        length_meters: trailer.length_meters,
    }
}

pub async fn create_trailer(
    State(state): State<AppState>,
    caller: AuthenticatedProfile,
    Json(payload): Json<CreateTrailerRequest>,
) -> AppResult<(StatusCode, Json<TrailerResponse>)> {
    let company_id = resolve_fleet_company(&state, &caller, payload.company_id)?;
    let trailer_type = TrailerType::parse(payload.trailer_type.trim())?;

    let new_trailer = NewTrailer {
        id: Uuid::new_v4(),
        company_id,
        registration_number: require_non_empty(&payload.registration_number, "registration_number")?,
        trailer_type: trailer_type.as_str().to_string(),
        payload_capacity_tons: require_non_negative_f64(
            payload.payload_capacity_tons,
            "payload_capacity_tons",
        )?,
        length_meters: require_non_negative_f64(payload.length_meters, "length_meters")?,
    };

    let mut conn = state.db()?;
    diesel::insert_into(trailers::table)
        .values(&new_trailer)
        .execute(&mut conn)?;

    let trailer: Trailer = trailers::table.find(new_trailer.id).first(&mut conn)?;
    info!(trailer_id = %trailer.id, %company_id, "trailer registered");
    Ok((StatusCode::CREATED, Json(to_trailer_response(trailer))))
}

pub async fn list_trailers(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
    caller: AuthenticatedProfile,
) -> AppResult<Json<Vec<TrailerResponse>>> {
    let scope = list_scope(&caller, &params)?;

    let mut conn = state.db()?;
    let mut query = trailers::table.into_boxed();
    if let Some(company_id) = scope {
        query = query.filter(trailers::company_id.eq(company_id));
    }
    let rows: Vec<Trailer> = query.order(trailers::created_at.desc()).load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_trailer_response).collect()))
}

#[derive(Deserialize)]
pub struct UpdateTrailerRequest {
    pub registration_number: Option<String>,
    pub trailer_type: Option<String>,
    pub payload_capacity_tons: Option<f64>,
    pub length_meters: Option<f64>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = trailers)]
struct TrailerChangeset {
    registration_number: Option<String>,
    trailer_type: Option<String>,
    payload_capacity_tons: Option<f64>,
    length_meters: Option<f64>,
    updated_at: Option<chrono::NaiveDateTime>,
}

pub async fn update_trailer(
    State(state): State<AppState>,
    Path(trailer_id): Path<Uuid>,
    caller: AuthenticatedProfile,
    Json(payload): Json<UpdateTrailerRequest>,
) -> AppResult<Json<TrailerResponse>> {
    let mut conn = state.db()?;
    let existing: Trailer = trailers::table.find(trailer_id).first(&mut conn)?;
    drop(conn);

    authorize(
        &caller.actor(),
        Action::ManageFleet {
            owner_company: existing.company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let trailer_type = payload
        .trailer_type
        .map(|v| TrailerType::parse(v.trim()).map(|t| t.as_str().to_string()))
        .transpose()?;

    let changeset = TrailerChangeset {
        registration_number: payload
            .registration_number
            .map(|v| require_non_empty(&v, "registration_number"))
            .transpose()?,
        trailer_type,
        payload_capacity_tons: require_non_negative_f64(
            payload.payload_capacity_tons,
            "payload_capacity_tons",
        )?,
        length_meters: require_non_negative_f64(payload.length_meters, "length_meters")?,
        updated_at: Some(Utc::now().naive_utc()),
    };

    let mut conn = state.db()?;
    diesel::update(trailers::table.find(trailer_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let trailer: Trailer = trailers::table.find(trailer_id).first(&mut conn)?;
    Ok(Json(to_trailer_response(trailer)))
}

pub async fn delete_trailer(
    State(state): State<AppState>,
    Path(trailer_id): Path<Uuid>,
    caller: AuthenticatedProfile,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    let existing: Trailer = trailers::table.find(trailer_id).first(&mut conn)?;
    drop(conn);

    authorize(
        &caller.actor(),
        Action::ManageFleet {
            owner_company: existing.company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    remove_documents_for_parent(&state, ParentRef::Trailer(trailer_id)).await?;

    let mut conn = state.db()?;
    diesel::delete(trailers::table.find(trailer_id)).execute(&mut conn)?;

    info!(%trailer_id, "trailer deleted");
    Ok(StatusCode::NO_CONTENT)
}
