use axum::http::HeaderValue;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{auth::AuthenticatedProfile, state::AppState};

pub mod auth;
pub mod companies;
pub mod documents;
pub mod fleet;
pub mod health;
pub mod loads;
pub mod profiles;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(headers))
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    let companies_routes = Router::new()
        .route("/", post(companies::create_company))
        .route(
            "/:id",
            get(companies::get_company).patch(companies::update_company),
        )
        .route("/:id/verify", post(companies::set_verified))
        .route("/:id/verification", get(companies::verification_summary));

    let documents_routes = Router::new()
        .route(
            "/",
            get(documents::list_documents).post(documents::upload_document),
        )
        .route("/review", get(documents::review_queue))
        .route(
            "/:id",
            get(documents::get_document).delete(documents::remove_document),
        )
        .route("/:id/review", post(documents::review_document))
        .route("/:id/download", get(documents::download_document));

    let drivers_routes = Router::new()
        .route("/", get(fleet::list_drivers).post(fleet::create_driver))
        .route(
            "/:id",
            axum::routing::patch(fleet::update_driver).delete(fleet::delete_driver),
        );

    let trucks_routes = Router::new()
        .route("/", get(fleet::list_trucks).post(fleet::create_truck))
        .route(
            "/:id",
            axum::routing::patch(fleet::update_truck).delete(fleet::delete_truck),
        );

    let trailers_routes = Router::new()
        .route("/", get(fleet::list_trailers).post(fleet::create_trailer))
        .route(
            "/:id",
            axum::routing::patch(fleet::update_trailer).delete(fleet::delete_trailer),
        );

    let loads_routes = Router::new()
        .route("/", get(loads::list_loads).post(loads::create_load))
        .route("/available", get(loads::available_loads))
        .route("/mine", get(loads::my_loads))
        .route(
            "/:id",
            get(loads::get_load)
                .patch(loads::update_load)
                .delete(loads::delete_load),
        )
        .route("/:id/status", post(loads::transition_load));

    let profiles_routes = Router::new()
        .route("/me", get(profiles::me))
        .route("/:id", axum::routing::delete(profiles::disable_profile));

    let protected_state = state.clone();
    let protected_routes = Router::new()
        .nest("/api/companies", companies_routes)
        .nest("/api/documents", documents_routes)
        .nest("/api/drivers", drivers_routes)
        .nest("/api/trucks", trucks_routes)
        .nest("/api/trailers", trailers_routes)
        .nest("/api/loads", loads_routes)
        .nest("/api/profiles", profiles_routes)
        .layer(middleware::from_extractor_with_state::<AuthenticatedProfile, _>(protected_state));

    Router::new()
        .merge(protected_routes)
        .nest("/api/auth", auth_routes)
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 64))
}
