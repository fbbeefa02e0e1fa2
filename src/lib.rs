//! Pulse: a social listening dashboard for brand and issue monitoring.
//!
//! Server-rendered pages and a JSON API over mocked backend fixtures.

pub mod charts;
pub mod comparison;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod influence;
pub mod mentions;
pub mod mock_api;
pub mod models;
pub mod routes;
pub mod store;
pub mod widgets;
pub mod wizard;
pub mod workspace;

use rocket::figment::Figment;
use rocket::fs::{relative, FileServer};
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::fixtures::Fixtures;
use crate::mock_api::MockApi;
use crate::store::{AuthStore, ProjectStore};

/// Assemble the dashboard: fixtures, stores, templates and every route
pub fn build(figment: Figment) -> Result<Rocket<Build>, DashboardError> {
    let fixtures = Fixtures::load()?;
    let config = DashboardConfig::from_figment(&figment);
    tracing::info!(
        mock_latency_ms = config.mock_latency_ms,
        page_size = config.page_size,
        keyword_limit = config.keyword_limit,
        "dashboard configured"
    );

    Ok(rocket::custom(figment)
        .attach(Template::fairing())
        .manage(MockApi::new(fixtures, config))
        .manage(ProjectStore::default())
        .manage(AuthStore::default())
        .mount("/", routes::index_routes())
        .mount("/api", routes::api_routes())
        .register("/api", routes::api_catchers())
        .mount("/static", FileServer::from(relative!("static"))))
}
