mod analyzer;
mod config;
mod error;
mod mentor;
mod model;
mod web;

use actix_web::{App, HttpServer, web::Data};
use dotenv::dotenv;
use log::{info, warn, error};
use std::sync::Arc;

use config::Config;
use model::CompletionProvider;
use web::routes;

// Built once at startup and only read afterwards
pub struct AppState {
    pub config: Config,
    pub provider: Option<Arc<dyn CompletionProvider>>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting {}", web::handlers::SERVICE_NAME);

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if config.service_key_is_custom() {
        info!("AI Service API key configured");
    } else {
        warn!("Using default AI_SERVICE_API_KEY. This is not secure for production!");
    }

    let provider = model::build_provider(&config);
    if provider.is_none() {
        warn!("OpenAI not configured, /analyze and /mentor will return fallback responses");
    }

    let bind = (config.host.clone(), config.port);
    let app_state = Data::new(AppState { config, provider });

    info!("Listening on http://{}:{} (health check at /health)", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind(bind)?
    .run()
    .await
}
