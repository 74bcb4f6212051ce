use actix_web::{get, web, Responder};

use crate::models::IndexResponse;

pub const GREETING: &str = "Hello from user-registry";

#[get("/")]
async fn index() -> web::Json<IndexResponse> {
    web::Json(IndexResponse {
        message: GREETING.to_owned(),
    })
}

/// Liveness probe.
#[get("/health")]
async fn health_check() -> impl Responder {
    "Healthy"
}
