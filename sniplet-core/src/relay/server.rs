//! Actix Web HTTP server.
//!
//! Exposes:
//! - `POST /api/generate`
//! - `GET /health`

use super::error::ServerError;
use super::handler::{generate, health, AppState};
use crate::config::RelayConfig;
use crate::upstream::UpstreamClient;
use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing::info;

/// Register the relay routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/api/generate", web::post().to(generate));
}

/// Build a server on an already bound listener
pub fn build_server(listener: TcpListener, state: AppState) -> Result<Server, ServerError> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .configure(configure)
    })
    .listen(listener)?
    .run();

    Ok(server)
}

/// Bind the configured address and serve until shutdown
pub async fn serve(config: RelayConfig) -> Result<(), ServerError> {
    let client = UpstreamClient::new(config.upstream.clone())?;
    let (host, port) = config.bind_addr();
    let addr = format!("{}:{}", host, port);

    let listener = TcpListener::bind((host, port)).map_err(|source| ServerError::Bind {
        addr: addr.clone(),
        source,
    })?;

    info!(
        addr = %addr,
        model = %config.upstream.model,
        api_key = %config.upstream.api_key.partial_redact(),
        "sniplet relay listening"
    );

    build_server(listener, AppState::new(Arc::new(client)))?.await?;

    Ok(())
}
