mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, body_to_json, TestApp};
use serde_json::json;
use uuid::Uuid;

async fn seed_transporter(app: &TestApp) -> Result<(Uuid, String)> {
    let owner = app
        .insert_profile("fleet@example.com", "s3cret-pass", "transporter")
        .await?;
    let company_id = app
        .insert_company("transporter", "Veld Logistics", owner)
        .await?;
    let token = app.login_token("fleet@example.com", "s3cret-pass").await?;
    Ok((company_id, token))
}

async fn seed_admin(app: &TestApp) -> Result<String> {
    app.insert_profile("ops@example.com", "s3cret-pass", "admin")
        .await?;
    app.login_token("ops@example.com", "s3cret-pass").await
}

#[tokio::test]
async fn upload_stores_object_and_starts_pending() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let (company_id, token) = seed_transporter(&app).await?;

    let response = app
        .upload_document(
            "registration.pdf",
            "application/pdf",
            b"%PDF-1.4 registration",
            "registration",
            &[("company_id", company_id)],
            &token,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_json(response.into_body()).await?;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["company_id"], json!(company_id));
    assert!(body["driver_id"].is_null());
    assert_eq!(body["size_bytes"], 21);
    assert!(!body["checksum"].as_str().unwrap_or_default().is_empty());

    assert_eq!(app.storage().object_count().await, 1);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn upload_requires_exactly_one_parent() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let (company_id, token) = seed_transporter(&app).await?;

    // no parent at all
    let response = app
        .upload_document(
            "registration.pdf",
            "application/pdf",
            b"data",
            "registration",
            &[],
            &token,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // two parents at once
    let response = app
        .upload_document(
            "registration.pdf",
            "application/pdf",
            b"data",
            "registration",
            &[("company_id", company_id), ("driver_id", Uuid::new_v4())],
            &token,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // nothing reached storage on either failure
    assert_eq!(app.storage().object_count().await, 0);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn category_must_match_the_parent_kind() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let (company_id, token) = seed_transporter(&app).await?;

    // a driver-scoped category is not valid on a company parent
    let response = app
        .upload_document(
            "license.pdf",
            "application/pdf",
            b"data",
            "drivers_license",
            &[("company_id", company_id)],
            &token,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn review_requires_reason_on_rejection_and_clears_it_on_approval() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let (company_id, token) = seed_transporter(&app).await?;
    let admin_token = seed_admin(&app).await?;

    let response = app
        .upload_document(
            "registration.pdf",
            "application/pdf",
            b"data",
            "registration",
            &[("company_id", company_id)],
            &token,
        )
        .await?;
    let body = body_to_json(response.into_body()).await?;
    let document_id: Uuid = serde_json::from_value(body["id"].clone())?;
    let review_path = format!("/api/documents/{document_id}/review");

    // members cannot review their own paperwork
    let response = app
        .post_json(&review_path, &json!({"decision": "approved"}), Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // rejection without a reason is refused
    let response = app
        .post_json(
            &review_path,
            &json!({"decision": "rejected"}),
            Some(&admin_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            &review_path,
            &json!({"decision": "rejected", "reason": "document is expired"}),
            Some(&admin_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await?;
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["rejection_reason"], "document is expired");

    // an approval afterwards overwrites the rejection entirely
    let response = app
        .post_json(
            &review_path,
            &json!({"decision": "approved"}),
            Some(&admin_token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await?;
    assert_eq!(body["status"], "approved");
    assert!(body["rejection_reason"].is_null());

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn documents_stay_inside_their_company() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let (company_id, token) = seed_transporter(&app).await?;

    let rival = app
        .insert_profile("rival@example.com", "s3cret-pass", "transporter")
        .await?;
    app.insert_company("transporter", "Rival Haulage", rival)
        .await?;
    let rival_token = app.login_token("rival@example.com", "s3cret-pass").await?;

    let response = app
        .upload_document(
            "registration.pdf",
            "application/pdf",
            b"data",
            "registration",
            &[("company_id", company_id)],
            &token,
        )
        .await?;
    let body = body_to_json(response.into_body()).await?;
    let document_id: Uuid = serde_json::from_value(body["id"].clone())?;

    let response = app
        .get(&format!("/api/documents/{document_id}"), Some(&rival_token))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .delete(&format!("/api/documents/{document_id}"), Some(&rival_token))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // nor can a rival upload against someone else's company
    let response = app
        .upload_document(
            "registration.pdf",
            "application/pdf",
            b"data",
            "registration",
            &[("company_id", company_id)],
            &rival_token,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn review_queue_lists_pending_for_admins_only() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let (company_id, token) = seed_transporter(&app).await?;
    let admin_token = seed_admin(&app).await?;

    for name in ["a.pdf", "b.pdf"] {
        let response = app
            .upload_document(
                name,
                "application/pdf",
                b"data",
                "registration",
                &[("company_id", company_id)],
                &token,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.get("/api/documents/review", Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/api/documents/review", Some(&admin_token)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await?;
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn failed_upload_leaves_no_row_behind() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let (company_id, token) = seed_transporter(&app).await?;
    let admin_token = seed_admin(&app).await?;

    app.storage().fail_next_put();
    let response = app
        .upload_document(
            "registration.pdf",
            "application/pdf",
            b"%PDF-1.4 data",
            "registration",
            &[("company_id", company_id)],
            &token,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_to_json(response.into_body()).await?;
    assert_eq!(body["code"], "storage");

    // neither the object nor a database row survives the failure
    assert_eq!(app.storage().object_count().await, 0);
    let response = app.get("/api/documents/review", Some(&admin_token)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await?;
    assert_eq!(body.as_array().map(Vec::len), Some(0));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn failed_object_removal_keeps_the_document() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let (company_id, token) = seed_transporter(&app).await?;

    let response = app
        .upload_document(
            "registration.pdf",
            "application/pdf",
            b"%PDF-1.4 data",
            "registration",
            &[("company_id", company_id)],
            &token,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_json(response.into_body()).await?;
    let document_id: Uuid = serde_json::from_value(body["id"].clone())?;

    app.storage().fail_next_delete();
    let response = app
        .delete(&format!("/api/documents/{document_id}"), Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // the delete aborted before touching the row, so both halves remain
    assert_eq!(app.storage().object_count().await, 1);
    let response = app
        .get(&format!("/api/documents/{document_id}"), Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn download_and_delete_track_the_stored_object() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;
    let (company_id, token) = seed_transporter(&app).await?;

    let response = app
        .upload_document(
            "registration.pdf",
            "application/pdf",
            b"%PDF-1.4 data",
            "registration",
            &[("company_id", company_id)],
            &token,
        )
        .await?;
    let body = body_to_json(response.into_body()).await?;
    let document_id: Uuid = serde_json::from_value(body["id"].clone())?;

    let response = app
        .get(
            &format!("/api/documents/{document_id}/download"),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await?;
    assert!(body["url"]
        .as_str()
        .unwrap_or_default()
        .starts_with("https://fake-storage/"));
    assert_eq!(body["filename"], "registration.pdf");

    let response = app
        .delete(&format!("/api/documents/{document_id}"), Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.storage().object_count().await, 0);

    let response = app
        .get(&format!("/api/documents/{document_id}"), Some(&token))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.cleanup().await?;
    Ok(())
}
