//! Bellyfed server entry point.

mod events;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, middleware};
use bellyfed_api::{middleware::AppState, rate_limit::RateLimiterState, router as api_router};
use bellyfed_common::{AppError, Config, LocalStorage, StorageBackend};
use bellyfed_core::{
    DishService, EventPublisherService, FollowingService, RankingService, RestaurantService,
    UploadService, UserService,
};
use bellyfed_db::repositories::{
    DishRepository, FollowingRepository, RankingRepository, RestaurantRepository, UserRepository,
};
use events::RedisEventPublisher;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Build the object storage backend from configuration.
async fn build_storage(config: &Config) -> Result<Arc<dyn StorageBackend>, AppError> {
    match config.storage.kind.as_str() {
        "s3" => {
            #[cfg(feature = "s3")]
            {
                let bucket = config.storage.s3_bucket.clone().ok_or_else(|| {
                    AppError::Config("storage.s3_bucket is required for the s3 backend".to_string())
                })?;
                let endpoint = config.storage.s3_endpoint.clone().ok_or_else(|| {
                    AppError::Config(
                        "storage.s3_endpoint is required for the s3 backend".to_string(),
                    )
                })?;
                let region = config
                    .storage
                    .s3_region
                    .clone()
                    .unwrap_or_else(|| "us-east-1".to_string());

                let storage = bellyfed_common::storage::S3Storage::new(
                    &endpoint,
                    bucket,
                    &region,
                    config.storage.s3_public_url.clone(),
                )
                .await?;
                Ok(Arc::new(storage))
            }
            #[cfg(not(feature = "s3"))]
            {
                Err(AppError::Config(
                    "storage.kind = \"s3\" requires building with the s3 feature".to_string(),
                ))
            }
        }
        _ => {
            // Relative base URLs are served by this instance
            let base_url = if config.storage.base_url.starts_with('/') {
                format!(
                    "{}{}",
                    config.server.url.trim_end_matches('/'),
                    config.storage.base_url
                )
            } else {
                config.storage.base_url.clone()
            };

            Ok(Arc::new(LocalStorage::new(
                PathBuf::from(&config.storage.base_path),
                base_url,
            )))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bellyfed=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting bellyfed server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = bellyfed_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    bellyfed_db::migrate(&db).await?;
    info!("Migrations completed");

    // Object storage backend
    let storage = build_storage(&config).await?;

    // Engagement event publisher (optional)
    let event_publisher: Option<EventPublisherService> = if config.redis.enabled {
        let publisher =
            RedisEventPublisher::connect(&config.redis.url, &config.redis.prefix).await?;
        info!("Connected to Redis for engagement events");
        Some(Arc::new(publisher))
    } else {
        None
    };

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let restaurant_repo = RestaurantRepository::new(Arc::clone(&db));
    let dish_repo = DishRepository::new(Arc::clone(&db));
    let ranking_repo = RankingRepository::new(Arc::clone(&db));
    let following_repo = FollowingRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo.clone());

    let mut ranking_service = RankingService::new(
        ranking_repo,
        dish_repo.clone(),
        restaurant_repo.clone(),
        user_repo.clone(),
    );
    let mut following_service = FollowingService::new(following_repo, user_repo);
    if let Some(publisher) = &event_publisher {
        ranking_service.set_event_publisher(publisher.clone());
        following_service.set_event_publisher(publisher.clone());
    }

    let dish_service = DishService::new(dish_repo, restaurant_repo.clone());
    let restaurant_service = RestaurantService::new(restaurant_repo);
    let upload_service = UploadService::new(storage);

    // Create app state
    let state = AppState {
        user_service,
        ranking_service,
        dish_service,
        restaurant_service,
        following_service,
        upload_service,
    };

    // Rate limiter (per-user with per-IP fallback)
    let rate_limiter = RateLimiterState::new();

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            bellyfed_api::rate_limit::rate_limit_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            bellyfed_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
