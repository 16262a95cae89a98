//! ENTITIES Storefront - server entry point

use anyhow::{Context, Result};
use entities_storefront::{
    ai::GeminiClient,
    auth::SessionVerifier,
    config::Config,
    publisher::EventPublisher,
    state::{AppState, Repositories},
    storage::RestObjectStorage,
    web,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;
    sqlx::migrate!("./migrations").run(&db).await.context("failed to run migrations")?;
    info!("✅ Database ready");

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => {
                info!("📡 Connected to NATS at {}", url);
                Some(client)
            }
            Err(e) => {
                warn!("⚠️ NATS unavailable, events will not be published: {}", e);
                None
            }
        },
        None => None,
    };

    let storage = RestObjectStorage::new(&config.storage.url, config.storage.bucket.clone(), config.storage.service_key.clone())
        .context("failed to configure object storage")?;
    let generation = &config.generation;
    let generator = GeminiClient::new(
        generation.base_url.clone(),
        generation.api_key.clone(),
        generation.chat_model.clone(),
        generation.blog_model.clone(),
        generation.max_duration,
    )
    .context("failed to configure text generation")?;

    let state = AppState::new(
        Repositories::postgres(db),
        Arc::new(storage),
        Arc::new(generator),
        EventPublisher::new(nats),
        SessionVerifier::new(&config.session_jwt_secret),
        config.sign_in_url.clone(),
        config.whatsapp_number.clone(),
    );
    let app = web::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("🚀 ENTITIES storefront listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
