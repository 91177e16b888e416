use actix_web::{web, App, HttpServer};
use log::{error, info};

mod engine;
mod error;
mod game;
mod models;
mod routes;
mod settings;
mod websocket;

use crate::models::AppState;
use crate::settings::Settings;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::from_env().map_err(|e| {
        error!("Invalid settings: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;
    let bind_addr = settings.bind_addr.clone();
    let static_dir = settings.static_dir.clone();

    info!("Starting chess match server at http://{}", bind_addr);
    info!("Engine: {}", settings.engine_path.display());

    // Ratings are shared by every connection for the life of the process
    let app_state = web::Data::new(AppState::new(settings));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(|cfg| routes::configure_routes(cfg, &static_dir))
    })
    .bind(bind_addr)?
    .run()
    .await
}
