use actix_web::web;
use crate::error::ServiceError;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/analyze", web::post().to(handlers::analyze))
        .route("/mentor", web::post().to(handlers::mentor))
        .route("/health", web::get().to(handlers::health_check));
}

// Body shape failures are reported as 422 with a `detail` message.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ServiceError::InvalidBody(err.to_string()).into())
}
