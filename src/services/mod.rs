// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod link;
pub mod strava;
pub mod sync;

pub use link::LinkService;
pub use strava::{StravaApi, StravaClient};
pub use sync::SyncService;
