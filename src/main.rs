// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stride-Sync API Server
//!
//! Links user accounts to Strava and syncs their recent activity history
//! into Firestore for the dashboard to read.

use std::sync::Arc;

use stride_sync::{
    config::Config,
    db::FirestoreDb,
    services::{LinkService, StravaClient, SyncService},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Stride-Sync API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");
    let store: Arc<dyn stride_sync::db::Store> = Arc::new(db);

    // Initialize Strava client and services
    let strava: Arc<dyn stride_sync::services::StravaApi> = Arc::new(StravaClient::new(&config));
    let link_service = LinkService::new(strava.clone(), store.clone());
    let sync_service = SyncService::new(strava, store);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        link_service,
        sync_service,
    });

    // Build router
    let app = stride_sync::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stride_sync=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
