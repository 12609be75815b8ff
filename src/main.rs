mod api;
mod config;
mod db;
mod error;
mod guide;
mod handlers;
mod i18n;
mod models;
mod router;
mod state;
mod store;

use actix_web::{web, App, HttpServer};
use actix_web::middleware::NormalizePath;
use actix_cors::Cors;
use config::Config;
use state::AppState;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    if config.echo_otp {
        tracing::warn!("OTP_ECHO is on: verification codes are returned to clients");
    }

    let pool = db::init_pool(&config.database_url)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let port = config.port;
    let app_state = web::Data::new(AppState::new(pool, config));

    tracing::info!(%port, "session service listening");

    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::trim())
            .wrap(Cors::permissive())
            .app_data(app_state.clone())
            .configure(handlers::configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
