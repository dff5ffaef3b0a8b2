use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use diesel::{prelude::*, PgConnection};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::AuthenticatedProfile;
use crate::domain::{
    authorize, Action, DocumentCategory, DocumentStatus, ParentRef, ReviewDecision,
};
use crate::error::{AppError, AppResult};
use crate::models::{Company, Document, Driver, NewDocument, Trailer, Truck};
use crate::schema::{companies, documents, drivers, trailers, trucks};
use crate::state::AppState;
use crate::storage::document_key;

const PRESIGNED_URL_EXPIRY_SECONDS: u64 = 300;

fn inline_content_disposition(filename: &str) -> Option<String> {
    if filename.is_empty() {
        return None;
    }

    let sanitized: String = filename
        .chars()
        .map(|ch| match ch {
            '"' | '\\' => '_',
            _ => ch,
        })
        .collect();

    let encoded =
        percent_encoding::utf8_percent_encode(&sanitized, percent_encoding::NON_ALPHANUMERIC);
    Some(format!(
        "inline; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    ))
}

#[derive(Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub owner_company_id: Uuid,
    pub company_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub truck_id: Option<Uuid>,
    pub trailer_id: Option<Uuid>,
    pub category: String,
    pub title: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub checksum: String,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

fn to_document_response(document: Document) -> DocumentResponse {
    DocumentResponse {
        id: document.id,
        owner_company_id: document.owner_company_id,
        company_id: document.company_id,
        driver_id: document.driver_id,
        truck_id: document.truck_id,
        trailer_id: document.trailer_id,
        category: document.category,
        title: document.title,
        content_type: document.content_type,
        size_bytes: document.size_bytes,
        checksum: document.checksum,
        status: document.status,
        rejection_reason: document.rejection_reason,
        created_at: document.created_at.and_utc().to_rfc3339(),
        updated_at: document.updated_at.and_utc().to_rfc3339(),
    }
}

/// Looks up a document's parent and returns the company that owns it.
/// Company documents are owned by the referenced company itself; fleet asset
/// documents are owned by the asset's company.
fn resolve_owner_company(
    conn: &mut PgConnection,
    parent: ParentRef,
) -> Result<Uuid, diesel::result::Error> {
    match parent {
        ParentRef::Company(id) => {
            let company: Company = companies::table.find(id).first(conn)?;
            Ok(company.id)
        }
        ParentRef::Driver(id) => {
            let driver: Driver = drivers::table.find(id).first(conn)?;
            Ok(driver.company_id)
        }
        ParentRef::Truck(id) => {
            let truck: Truck = trucks::table.find(id).first(conn)?;
            Ok(truck.company_id)
        }
        ParentRef::Trailer(id) => {
            let trailer: Trailer = trailers::table.find(id).first(conn)?;
            Ok(trailer.company_id)
        }
    }
}

struct UploadFields {
    bytes: Vec<u8>,
    original_name: String,
    content_type: Option<String>,
    title: Option<String>,
    category: Option<String>,
    company_id: Option<Uuid>,
    driver_id: Option<Uuid>,
    truck_id: Option<Uuid>,
    trailer_id: Option<Uuid>,
}

async fn collect_upload_fields(mut multipart: Multipart) -> AppResult<UploadFields> {
    let mut bytes: Option<Vec<u8>> = None;
    let mut original_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut title: Option<String> = None;
    let mut category: Option<String> = None;
    let mut company_id: Option<Uuid> = None;
    let mut driver_id: Option<Uuid> = None;
    let mut truck_id: Option<Uuid> = None;
    let mut trailer_id: Option<Uuid> = None;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        error!(error = %err, "invalid multipart data");
        AppError::validation(format!("invalid multipart data: {err}"))
    })? {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                original_name = field.file_name().map(|n| n.to_string());
                content_type = field.content_type().map(|mime| mime.to_string());
                let data = field.bytes().await.map_err(|err| {
                    error!(error = %err, "failed to read file bytes");
                    AppError::validation(format!("failed to read file bytes: {err}"))
                })?;
                bytes = Some(data.to_vec());
            }
            Some("title") => {
                title = Some(read_text_field(field).await?);
            }
            Some("category") => {
                category = Some(read_text_field(field).await?);
            }
            Some(parent @ ("company_id" | "driver_id" | "truck_id" | "trailer_id")) => {
                let parent_name = parent.to_string();
                let value = read_text_field(field).await?;
                if value.trim().is_empty() {
                    continue;
                }
                let parsed = Uuid::parse_str(value.trim()).map_err(|_| {
                    AppError::validation(format!("{parent_name} must be a valid UUID"))
                })?;
                match parent_name.as_str() {
                    "company_id" => company_id = Some(parsed),
                    "driver_id" => driver_id = Some(parsed),
                    "truck_id" => truck_id = Some(parsed),
                    _ => trailer_id = Some(parsed),
                }
            }
            _ => {}
        }
    }

    let bytes = bytes.ok_or_else(|| AppError::validation("file field is required"))?;
    if bytes.is_empty() {
        return Err(AppError::validation("file field must not be empty"));
    }
    let original_name =
        original_name.ok_or_else(|| AppError::validation("filename is required"))?;

    Ok(UploadFields {
        bytes,
        original_name,
        content_type,
        title,
        category,
        company_id,
        driver_id,
        truck_id,
        trailer_id,
    })
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|err| AppError::validation(format!("invalid field value: {err}")))
}

pub async fn upload_document(
    State(state): State<AppState>,
    caller: AuthenticatedProfile,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DocumentResponse>)> {
    let fields = collect_upload_fields(multipart).await?;

    let parent = ParentRef::from_ids(
        fields.company_id,
        fields.driver_id,
        fields.truck_id,
        fields.trailer_id,
    )?;

    let category_raw = fields
        .category
        .ok_or_else(|| AppError::validation("category field is required"))?;
    let category = DocumentCategory::parse_for(category_raw.trim(), parent.kind())?;

    let title = fields
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fields.original_name.clone());

    let mut conn = state.db()?;
    let owner_company_id = resolve_owner_company(&mut conn, parent)?;
    drop(conn);

    authorize(
        &caller.actor(),
        Action::UploadDocument {
            owner_company: owner_company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let document_id = Uuid::new_v4();
    let s3_key = document_key(owner_company_id, document_id, &fields.original_name);
    let content_type = fields.content_type.clone().or_else(|| {
        mime_guess::from_path(&fields.original_name)
            .first()
            .map(|mime| mime.to_string())
    });
    let size_bytes = fields.bytes.len() as i64;
    let checksum = hex::encode(Sha256::digest(&fields.bytes));

    // The object lands first: a storage failure leaves no metadata row behind.
    state
        .storage
        .put_object(
            &s3_key,
            fields.bytes,
            content_type.clone(),
            inline_content_disposition(&fields.original_name),
        )
        .await
        .map_err(AppError::storage)?;

    let new_document = NewDocument {
        id: document_id,
        owner_company_id,
        company_id: fields.company_id,
        driver_id: fields.driver_id,
        truck_id: fields.truck_id,
        trailer_id: fields.trailer_id,
        category: category.as_str().to_string(),
        title,
        s3_key: s3_key.clone(),
        content_type,
        size_bytes,
        checksum,
        status: DocumentStatus::Pending.as_str().to_string(),
    };

    let mut conn = state.db()?;
    let inserted = diesel::insert_into(documents::table)
        .values(&new_document)
        .execute(&mut conn);
    drop(conn);

    if let Err(err) = inserted {
        // best-effort removal of the object we just wrote; an orphaned file
        // is logged loudly rather than silently leaked
        if let Err(cleanup_err) = state.storage.delete_object(&s3_key).await {
            error!(
                %s3_key,
                error = %cleanup_err,
                "failed to clean up stored object after row insert failure"
            );
        }
        return Err(AppError::from(err));
    }

    let mut conn = state.db()?;
    let document: Document = documents::table.find(document_id).first(&mut conn)?;

    info!(
        %document_id,
        owner_company_id = %owner_company_id,
        parent = parent.kind().as_str(),
        category = category.as_str(),
        "document uploaded"
    );

    Ok((StatusCode::CREATED, Json(to_document_response(document))))
}

#[derive(Deserialize)]
pub struct DocumentListQuery {
    pub company_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub truck_id: Option<Uuid>,
    pub trailer_id: Option<Uuid>,
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<DocumentListQuery>,
    caller: AuthenticatedProfile,
) -> AppResult<Json<Vec<DocumentResponse>>> {
    let parent = ParentRef::from_ids(
        params.company_id,
        params.driver_id,
        params.truck_id,
        params.trailer_id,
    )?;

    let mut conn = state.db()?;
    let owner_company_id = resolve_owner_company(&mut conn, parent)?;

    authorize(
        &caller.actor(),
        Action::ReadDocument {
            owner_company: owner_company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let mut query = documents::table.into_boxed();
    query = match parent {
        ParentRef::Company(id) => query.filter(documents::company_id.eq(Some(id))),
        ParentRef::Driver(id) => query.filter(documents::driver_id.eq(Some(id))),
        ParentRef::Truck(id) => query.filter(documents::truck_id.eq(Some(id))),
        ParentRef::Trailer(id) => query.filter(documents::trailer_id.eq(Some(id))),
    };

    let rows: Vec<Document> = query.order(documents::created_at.desc()).load(&mut conn)?;
    Ok(Json(rows.into_iter().map(to_document_response).collect()))
}

pub async fn review_queue(
    State(state): State<AppState>,
    caller: AuthenticatedProfile,
) -> AppResult<Json<Vec<DocumentResponse>>> {
    authorize(&caller.actor(), Action::ReviewDocument)
        .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let mut conn = state.db()?;
    let rows: Vec<Document> = documents::table
        .filter(documents::status.eq(DocumentStatus::Pending.as_str()))
        .order(documents::created_at.asc())
        .load(&mut conn)?;

    Ok(Json(rows.into_iter().map(to_document_response).collect()))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    caller: AuthenticatedProfile,
) -> AppResult<Json<DocumentResponse>> {
    let mut conn = state.db()?;
    let document: Document = documents::table.find(document_id).first(&mut conn)?;

    authorize(
        &caller.actor(),
        Action::ReadDocument {
            owner_company: document.owner_company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    Ok(Json(to_document_response(document)))
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    pub reason: Option<String>,
}

/// Admin review. Approving clears any earlier rejection reason; rejecting
/// requires one. Two admins racing the same document is last-write-wins.
pub async fn review_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    caller: AuthenticatedProfile,
    Json(payload): Json<ReviewRequest>,
) -> AppResult<Json<DocumentResponse>> {
    authorize(&caller.actor(), Action::ReviewDocument)
        .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let (status, reason) = payload.decision.apply(payload.reason.as_deref())?;

    let mut conn = state.db()?;
    let _: Document = documents::table.find(document_id).first(&mut conn)?;

    diesel::update(documents::table.find(document_id))
        .set((
            documents::status.eq(status.as_str()),
            documents::rejection_reason.eq(reason),
            documents::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

    let document: Document = documents::table.find(document_id).first(&mut conn)?;

    info!(
        %document_id,
        status = status.as_str(),
        reviewed_by = %caller.profile_id,
        "document reviewed"
    );

    Ok(Json(to_document_response(document)))
}

#[derive(Serialize)]
pub struct DocumentDownloadResponse {
    pub url: String,
    pub expires_in: u64,
    pub filename: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
}

pub async fn download_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    caller: AuthenticatedProfile,
) -> AppResult<Json<DocumentDownloadResponse>> {
    let mut conn = state.db()?;
    let document: Document = documents::table.find(document_id).first(&mut conn)?;
    drop(conn);

    authorize(
        &caller.actor(),
        Action::ReadDocument {
            owner_company: document.owner_company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    let presigned_url = state
        .storage
        .presign_get_object(
            &document.s3_key,
            Duration::from_secs(PRESIGNED_URL_EXPIRY_SECONDS),
        )
        .await
        .map_err(AppError::storage)?;

    Ok(Json(DocumentDownloadResponse {
        url: presigned_url,
        expires_in: PRESIGNED_URL_EXPIRY_SECONDS,
        filename: document.title,
        content_type: document.content_type,
        size_bytes: document.size_bytes,
    }))
}

pub async fn remove_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    caller: AuthenticatedProfile,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    let document: Document = documents::table.find(document_id).first(&mut conn)?;
    drop(conn);

    authorize(
        &caller.actor(),
        Action::RemoveDocument {
            owner_company: document.owner_company_id,
        },
    )
    .map_err(|denial| AppError::permission_denied(denial.to_string()))?;

    delete_document_and_object(&state, &document).await?;

    info!(%document_id, "document removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes the stored object and the metadata row as a pair. The object goes
/// first: a storage failure aborts with both still in place, while a row
/// failure after the object is gone leaves a visible, re-deletable row and an
/// error in the log.
pub(crate) async fn delete_document_and_object(
    state: &AppState,
    document: &Document,
) -> AppResult<()> {
    state
        .storage
        .delete_object(&document.s3_key)
        .await
        .map_err(AppError::storage)?;

    let mut conn = state.db()?;
    if let Err(err) = diesel::delete(documents::table.find(document.id)).execute(&mut conn) {
        error!(
            document_id = %document.id,
            s3_key = %document.s3_key,
            error = %err,
            "stored object deleted but row removal failed"
        );
        return Err(AppError::from(err));
    }

    Ok(())
}

/// Cascade used by the fleet registry: removes every document attached to the
/// given parent so no document ever points at a deleted asset.
pub(crate) async fn remove_documents_for_parent(
    state: &AppState,
    parent: ParentRef,
) -> AppResult<usize> {
    let mut conn = state.db()?;
    let mut query = documents::table.into_boxed();
    query = match parent {
        ParentRef::Company(id) => query.filter(documents::company_id.eq(Some(id))),
        ParentRef::Driver(id) => query.filter(documents::driver_id.eq(Some(id))),
        ParentRef::Truck(id) => query.filter(documents::truck_id.eq(Some(id))),
        ParentRef::Trailer(id) => query.filter(documents::trailer_id.eq(Some(id))),
    };
    let docs: Vec<Document> = query.load(&mut conn)?;
    drop(conn);

    let removed = docs.len();
    for document in &docs {
        delete_document_and_object(state, document).await?;
    }

    if removed > 0 {
        warn!(
            parent = parent.kind().as_str(),
            parent_id = %parent.id(),
            removed,
            "cascaded document removal"
        );
    }

    Ok(removed)
}
