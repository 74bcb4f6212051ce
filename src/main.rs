use std::{env, sync::Arc};

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};

use config::Config;
use db::UserStore;
use metrics::HttpMetrics;
use middleware::Instrumentation;

mod config;
mod db;
mod error;
mod metrics;
mod middleware;
mod models;
mod services;
mod validator;

pub struct AppState {
    pub store: UserStore,
    pub metrics: Arc<HttpMetrics>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    pretty_env_logger::formatted_builder()
        .parse_filters(&config::log_filter(|key| env::var(key).ok()))
        .init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let store = UserStore::new(&config.users_file);
    info!("Users are stored in {}", store.path().display());

    let metrics = Arc::new(HttpMetrics::default());
    let state = web::Data::new(AppState {
        store,
        metrics: metrics.clone(),
    });

    info!("Listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Instrumentation::new(metrics.clone()))
            .wrap(Logger::default())
            .configure(services::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
