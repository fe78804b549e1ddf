use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

mod config;
mod controllers;
mod db;
mod error;
mod llm;
mod relay;

#[cfg(test)]
mod test_utils;

use config::Config;
use db::Database;
use llm::OpenAiCompatClient;
use relay::OpinionRelay;

pub struct AppState {
    pub db: Arc<Database>,
    pub relay: Arc<OpinionRelay>,
    pub config: Config,
    /// Server start time for uptime calculation
    pub started_at: Instant,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    log::info!(
        "Starting second-opinion backend on {}:{}",
        config.bind_address,
        config.port
    );

    log::info!("Opening database at {}", config.db_path.display());
    let db = Arc::new(Database::open(&config.db_path).map_err(std::io::Error::other)?);

    let generator = OpenAiCompatClient::new(&config.llm).map_err(std::io::Error::other)?;
    log::info!(
        "Using inference endpoint {} (model: {})",
        config.llm.base_url,
        config.llm.model
    );

    // Root of every relay's cancellation token
    let shutdown = CancellationToken::new();
    let relay = Arc::new(OpinionRelay::new(
        Arc::clone(&db),
        Arc::new(generator),
        shutdown.clone(),
    ));
    let started_at = Instant::now();

    let bind = (config.bind_address.clone(), config.port);
    let app_config = config.clone();

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                db: Arc::clone(&db),
                relay: Arc::clone(&relay),
                config: app_config.clone(),
                started_at,
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config_routes)
            .configure(controllers::medical_details::config)
            .configure(controllers::second_opinion::config)
    })
    .bind(bind)?
    .run();

    // Get server handle for graceful shutdown
    let server_handle = server.handle();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        log::info!("Received Ctrl+C, shutting down...");

        // End in-flight second opinions before the workers stop
        shutdown.cancel();

        log::info!("Stopping HTTP server...");
        let server_stop = server_handle.stop(true);
        if tokio::time::timeout(std::time::Duration::from_secs(5), server_stop).await.is_err() {
            log::warn!("Timeout waiting for HTTP server to stop, forcing exit...");
        }

        log::info!("Shutdown complete");
    });

    server.await
}
