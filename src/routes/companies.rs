use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use diesel::dsl::count_star;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedProfile,
    domain::{authorize, verification, Action, DocumentStatus, Role},
    error::{AppError, AppResult},
    models::{Company, NewCompany},
    schema::{companies, documents, profiles},
    state::AppState,
};

#[derive(Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct CompanyResponse {
    pub id: Uuid,
    pub company_type: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub is_verified: bool,
    pub does_cross_border: bool,
}

/// Redacted view returned to actors outside the company. The verification
/// flag itself is public by design.
#[derive(Serialize)]
pub struct PublicCompanyResponse {
    pub id: Uuid,
    pub company_type: String,
    pub name: String,
    pub is_verified: bool,
}

fn to_company_response(company: Company) -> CompanyResponse {
    CompanyResponse {
        id: company.id,
        company_type: company.company_type,
        name: company.name,
        contact_email: company.contact_email,
        contact_phone: company.contact_phone,
        address: company.address,
        is_verified: company.is_verified,
        does_cross_border: company.does_cross_border,
    }
}

/// A profile sets up its company exactly once; the company's type is the
/// creator's role and never changes afterwards.
pub async fn create_company(
    State(state): State<AppState>,
    caller: AuthenticatedProfile,
    Json(payload): Json<CreateCompanyRequest>,
) -> AppResult<(StatusCode, Json<CompanyResponse>)> {
    let company_type = match caller.role {
        Role::Supplier => "supplier",
        Role::Transporter => "transporter",
        Role::Admin => {
            return Err(AppError::validation(
                "admin profiles are not bound to a company",
            ))
        }
    };

    if caller.company_id.is_some() {
        return Err(AppError::invalid_state(
            "profile is already linked to a company",
        ));
    }

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }

    let new_company = NewCompany {
        id: Uuid::new_v4(),
        company_type: company_type.to_string(),
        name: name.to_string(),
        contact_email: payload.contact_email,
        contact_phone: payload.contact_phone,
        address: payload.address,
    };

    let mut conn = state.db()?;
    let company: Company = conn.transaction(|conn| {
        diesel::insert_into(companies::table)
            .values(&new_company)
            .execute(conn)?;

        // guards the set-at-most-once invariant against a concurrent setup
        let linked = diesel::update(
            profiles::table
                .find(caller.profile_id)
                .filter(profiles::company_id.is_null()),
        )
        .set((
            profiles::company_id.eq(Some(new_company.id)),
            profiles::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)?;

        if linked == 0 {
            return Err(diesel::result::Error::RollbackTransaction);
        }

        companies::table.find(new_company.id).first(conn)
    })?;

    info!(company_id = %company.id, company_type, "company created");

    Ok((StatusCode::CREATED, Json(to_company_response(company))))
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    caller: AuthenticatedProfile,
) -> AppResult<axum::response::Response> {
    use axum::response::IntoResponse;

    let mut conn = state.db()?;
    let company: Company = companies::table.find(company_id).first(&mut conn)?;

    let is_member = caller.role == Role::Admin || caller.company_id == Some(company_id);
    if is_member {
        Ok(Json(to_company_response(company)).into_response())
    } else {
        Ok(Json(PublicCompanyResponse {
            id: company.id,
            company_type: company.company_type,
            name: company.name,
            is_verified: company.is_verified,
        })
        .into_response())
    }
}

#[derive(Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub does_cross_border: Option<bool>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = companies)]
struct CompanyChangeset {
    name: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    address: Option<String>,
    does_cross_border: Option<bool>,
    updated_at: Option<chrono::NaiveDateTime>,
}

pub async fn update_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    caller: AuthenticatedProfile,
    Json(payload): Json<UpdateCompanyRequest>,
) -> AppResult<Json<CompanyResponse>> {
    authorize(&caller.actor(), Action::UpdateCompany { company: company_id })
        .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    if let Some(name) = payload.name.as_deref() {
        if name.trim().is_empty() {
            return Err(AppError::validation("name must not be empty"));
        }
    }

    let changeset = CompanyChangeset {
        name: payload.name.map(|n| n.trim().to_string()),
        contact_email: payload.contact_email,
        contact_phone: payload.contact_phone,
        address: payload.address,
        does_cross_border: payload.does_cross_border,
        updated_at: Some(Utc::now().naive_utc()),
    };

    let mut conn = state.db()?;
    // ensure the row exists before the partial update
    let _: Company = companies::table.find(company_id).first(&mut conn)?;

    diesel::update(companies::table.find(company_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let updated: Company = companies::table.find(company_id).first(&mut conn)?;
    Ok(Json(to_company_response(updated)))
}

#[derive(Deserialize)]
pub struct SetVerifiedRequest {
    pub verified: bool,
}

/// The only write path to `is_verified`. The document-count heuristic in the
/// verification summary never reaches this flag.
pub async fn set_verified(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    caller: AuthenticatedProfile,
    Json(payload): Json<SetVerifiedRequest>,
) -> AppResult<Json<CompanyResponse>> {
    authorize(&caller.actor(), Action::SetCompanyVerified)
        .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let mut conn = state.db()?;
    let updated = diesel::update(companies::table.find(company_id))
        .set((
            companies::is_verified.eq(payload.verified),
            companies::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

    if updated == 0 {
        return Err(AppError::not_found());
    }

    info!(%company_id, verified = payload.verified, "company verification set");

    let company: Company = companies::table.find(company_id).first(&mut conn)?;
    Ok(Json(to_company_response(company)))
}

#[derive(Serialize)]
pub struct VerificationSummary {
    pub company_id: Uuid,
    pub is_verified: bool,
    pub approved_documents: i64,
    pub pending_documents: i64,
    pub rejected_documents: i64,
    /// Advisory display signal only; verification is an explicit admin call.
    pub suggested_verified: bool,
}

pub async fn verification_summary(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    caller: AuthenticatedProfile,
) -> AppResult<Json<VerificationSummary>> {
    authorize(&caller.actor(), Action::ReadCompanyVerified)
        .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let mut conn = state.db()?;
    let company: Company = companies::table.find(company_id).first(&mut conn)?;

    let count_for = |conn: &mut diesel::PgConnection,
                     status: DocumentStatus|
     -> Result<i64, diesel::result::Error> {
        documents::table
            .filter(documents::owner_company_id.eq(company_id))
            .filter(documents::status.eq(status.as_str()))
            .select(count_star())
            .first(conn)
    };

    let approved = count_for(&mut conn, DocumentStatus::Approved)?;
    let pending = count_for(&mut conn, DocumentStatus::Pending)?;
    let rejected = count_for(&mut conn, DocumentStatus::Rejected)?;

    Ok(Json(VerificationSummary {
        company_id,
        is_verified: company.is_verified,
        approved_documents: approved,
        pending_documents: pending,
        rejected_documents: rejected,
        suggested_verified: verification::suggested_verified(approved),
    }))
}
