use actix_web::{get, web, HttpResponse, Responder};

use crate::{metrics::CONTENT_TYPE, AppState};

#[get("/metrics")]
async fn get_metrics(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok()
        .content_type(CONTENT_TYPE)
        .body(state.metrics.render())
}
