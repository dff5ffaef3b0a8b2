use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use loadlink::{
    auth::jwt::JwtService,
    config::AppConfig,
    db,
    geocode::{Geocoder, HttpGeocoder, NoopGeocoder},
    routes,
    state::AppState,
    storage::S3Storage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        database_url = %config.redacted_database_url(),
        s3_bucket = %config.s3_bucket,
        geocoder_enabled = config.geocoder_endpoint.is_some(),
        "loaded configuration"
    );

    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    let storage = Arc::new(S3Storage::connect(&config).await?);
    let geocoder: Arc<dyn Geocoder> = match &config.geocoder_endpoint {
        Some(endpoint) => Arc::new(HttpGeocoder::new(endpoint.clone())),
        None => Arc::new(NoopGeocoder),
    };
    let jwt = JwtService::from_config(&config)?;

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let state = AppState::new(pool, config, storage, geocoder, jwt);
    let router = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
