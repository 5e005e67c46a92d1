use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use log::warn;

use crate::error::ServiceError;
use crate::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

// Must be the first handler argument so a bad key is rejected before the body is read
pub struct ApiKey;

impl FromRequest for ApiKey {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let expected = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.config.service_api_key.as_bytes());
        let presented = req.headers().get(API_KEY_HEADER).map(|v| v.as_bytes());

        ready(match (expected, presented) {
            (Some(expected), Some(presented)) if expected == presented => Ok(ApiKey),
            (_, None) => {
                warn!("Rejected {} {}: missing {}", req.method(), req.path(), API_KEY_HEADER);
                Err(ServiceError::Unauthorized)
            }
            _ => {
                warn!("Rejected {} {}: invalid {}", req.method(), req.path(), API_KEY_HEADER);
                Err(ServiceError::Unauthorized)
            }
        })
    }
}
