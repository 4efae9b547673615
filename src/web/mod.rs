//! Web layer module
//!
//! HTTP interface for the cafe directory. Handlers stay thin: they
//! validate request parameters at the boundary, delegate to the
//! database layer, and assemble one of the response shapes.

use anyhow::Result;
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::Config, database::Database};

pub mod api;
pub mod responses;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub config: Config,
}

/// Builds the full route table. Split out from `WebServer` so tests can
/// drive the router directly.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .web
                .cors_origin
                .parse::<HeaderValue>()
                .expect("invalid cors_origin in configuration"),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(api::health))
        .route("/cafes", get(api::list_cafes).post(api::create_cafe))
        .route("/cafes/search", get(api::search_cafes))
        .route("/cafes/area", get(api::get_cafes_in_area))
        .route("/cafes/filter", get(api::get_cafes_by_tags))
        .route("/cafes/:id", get(api::get_cafe))
        .route(
            "/cafes/:id/tags",
            get(api::get_cafe_tags).put(api::update_cafe_tags),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: Config, database: Database) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
        let app = router(AppState { database, config });

        Ok(Self { app, addr })
    }

    /// Start the web server
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}
