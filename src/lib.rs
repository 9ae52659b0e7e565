//! Stride-Sync: link user accounts to Strava and sync activity history.
//!
//! This crate provides the backend API for connecting a user's account to
//! Strava via OAuth and reconciling their recent activities into Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{LinkService, SyncService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub link_service: LinkService,
    pub sync_service: SyncService,
}
