use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;
use log::info;

use crate::analyzer;
use crate::mentor;
use crate::web::auth::ApiKey;
use crate::web::models::{AnalyzeRequest, HealthResponse, MentorRequest};
use crate::web::utc_timestamp;
use crate::AppState;

pub const SERVICE_NAME: &str = "GCC FUSION AI Service";

// Health check endpoint, unauthenticated
pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        openai_configured: data.provider.is_some(),
        api_key_configured: data.config.service_key_is_custom(),
        timestamp: utc_timestamp(),
    })
}

// Submission analysis endpoint
pub async fn analyze(
    _key: ApiKey,
    data: web::Data<AppState>,
    req: web::Json<AnalyzeRequest>,
) -> impl Responder {
    let request_id = Uuid::new_v4();
    info!("[{}] Analyze submission {} for hackathon {}",
          request_id, req.submission_id, req.hackathon_id);

    let response = analyzer::analyze(data.provider.as_deref(), &req).await;

    info!("[{}] Submission {} scored {:.1} ({:?})",
          request_id, response.submission_id, response.match_percentage, response.decision);
    HttpResponse::Ok().json(response)
}

// Mentor chat endpoint
pub async fn mentor(
    _key: ApiKey,
    data: web::Data<AppState>,
    req: web::Json<MentorRequest>,
) -> impl Responder {
    let request_id = Uuid::new_v4();
    info!("[{}] Mentor request from user {} ({} history messages)",
          request_id,
          req.user_id.as_deref().unwrap_or("anonymous"),
          req.history().len());

    let response = mentor::mentor(data.provider.as_deref(), &req).await;

    info!("[{}] Mentor reply: {} characters", request_id, response.response.len());
    HttpResponse::Ok().json(response)
}
