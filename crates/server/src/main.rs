//! crm-rs server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use crm_api::{AppState, auth_middleware, router as api_router};
use crm_common::Config;
use crm_core::{
    ActivationCodeService, ClientService, ContactService, DealService, LeadService,
    LocationService, PipelineService, TierService, UserService,
};
use crm_db::repositories::{
    ActivationCodeRepository, ClientRepository, ContactRepository, DealRepository, LeadRepository,
    LocationRepository, PipelineRepository, TierRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crm=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting crm-rs server...");

    let config = Config::load()?;

    let db = Arc::new(crm_db::init(&config).await?);
    info!("Connected to database");

    info!("Running database migrations...");
    crm_db::migrate(&db).await?;
    info!("Migrations completed");

    // Repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let tier_repo = TierRepository::new(Arc::clone(&db));
    let code_repo = ActivationCodeRepository::new(Arc::clone(&db));
    let location_repo = LocationRepository::new(Arc::clone(&db));
    let client_repo = ClientRepository::new(Arc::clone(&db));
    let contact_repo = ContactRepository::new(Arc::clone(&db));
    let pipeline_repo = PipelineRepository::new(Arc::clone(&db));
    let lead_repo = LeadRepository::new(Arc::clone(&db));
    let deal_repo = DealRepository::new(Arc::clone(&db));

    // Services
    let activation_code_service =
        ActivationCodeService::new(code_repo, tier_repo.clone());
    let user_service = UserService::new(user_repo, activation_code_service.clone());
    let tier_service = TierService::new(tier_repo);
    let location_service = LocationService::new(location_repo.clone());
    let client_service = ClientService::new(
        client_repo.clone(),
        location_repo,
        activation_code_service.clone(),
    );
    let contact_service = ContactService::new(contact_repo, client_repo.clone());
    let pipeline_service = PipelineService::new(pipeline_repo.clone());
    let lead_service = LeadService::new(lead_repo, pipeline_repo);
    let deal_service = DealService::new(deal_repo, client_repo);

    let state = AppState {
        user_service,
        tier_service,
        activation_code_service,
        location_service,
        client_service,
        contact_service,
        pipeline_service,
        lead_service,
        deal_service,
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
