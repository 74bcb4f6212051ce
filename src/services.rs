use actix_web::web;

use crate::validator;

pub mod basic;
pub mod metrics;
pub mod users;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validator::json_config())
        .service(basic::index)
        .service(basic::health_check)
        .service(metrics::get_metrics)
        .service(users::create_user)
        .service(users::list_users);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{
        http::{header, StatusCode},
        test, App,
    };
    use serde_json::json;

    use super::*;
    use crate::{
        db::{tests::temp_store, UserStore},
        metrics::HttpMetrics,
        middleware::Instrumentation,
        models::{BaseResponse, IndexResponse, User, UserListResponse},
        AppState,
    };

    fn app_state(store: UserStore) -> (web::Data<AppState>, Arc<HttpMetrics>) {
        let metrics = Arc::new(HttpMetrics::default());
        let state = web::Data::new(AppState {
            store,
            metrics: metrics.clone(),
        });
        (state, metrics)
    }

    macro_rules! init_app {
        ($store:expr) => {{
            let (state, metrics) = app_state($store);
            test::init_service(
                App::new()
                    .app_data(state)
                    .wrap(Instrumentation::new(metrics))
                    .configure(configure),
            )
            .await
        }};
    }

    fn post_user(body: serde_json::Value) -> test::TestRequest {
        test::TestRequest::post().uri("/users").set_json(body)
    }

    #[actix_web::test]
    async fn index_greets() {
        let app = init_app!(temp_store());
        let req = test::TestRequest::get().uri("/").to_request();
        let resp: IndexResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp.message, basic::GREETING);
    }

    #[actix_web::test]
    async fn health_check_answers() {
        let app = init_app!(temp_store());
        let req = test::TestRequest::get().uri("/health").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "Healthy");
    }

    #[actix_web::test]
    async fn empty_store_lists_no_users() {
        let app = init_app!(temp_store());
        let req = test::TestRequest::get().uri("/users").to_request();
        let resp: UserListResponse = test::call_and_read_body_json(&app, req).await;
        assert!(resp.users.is_empty());
    }

    #[actix_web::test]
    async fn created_user_is_listed() {
        let store = temp_store();
        let path = store.path().to_owned();
        let app = init_app!(store);

        let req = post_user(json!({"name": "ada", "email": "ada@example.com"})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, r#"{"success":true}"#);

        let req = test::TestRequest::get().uri("/users").to_request();
        let resp: UserListResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            resp.users,
            vec![User {
                name: "ada".to_owned(),
                email: Some("ada@example.com".to_owned()),
            }]
        );

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[actix_web::test]
    async fn undecodable_payload_fails_with_422() {
        let app = init_app!(temp_store());

        let req = post_user(json!({"email": "ada@example.com"})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let resp: BaseResponse = test::read_body_json(resp).await;
        assert!(!resp.success);
        assert!(!resp.error.unwrap_or_default().is_empty());

        let req = test::TestRequest::post()
            .uri("/users")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp: BaseResponse = test::call_and_read_body_json(&app, req).await;
        assert!(!resp.success);
        assert!(resp.error.is_some());
    }

    #[actix_web::test]
    async fn unknown_fields_are_not_stored() {
        let store = temp_store();
        let path = store.path().to_owned();
        let app = init_app!(store);

        let req = post_user(json!({"name": "a", "extra": 1, "email": null})).to_request();
        let resp: BaseResponse = test::call_and_read_body_json(&app, req).await;
        assert!(resp.success);

        let stored: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(stored, json!([{"name": "a", "email": null}]));

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[actix_web::test]
    async fn wrong_content_type_fails_with_422() {
        let store = temp_store();
        let path = store.path().to_owned();
        let app = init_app!(store);

        let req = test::TestRequest::post()
            .uri("/users")
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload(r#"{"name": "a"}"#)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let resp: BaseResponse = test::read_body_json(resp).await;
        assert!(!resp.success);
        assert!(!resp.error.unwrap_or_default().is_empty());

        assert!(!path.exists());
    }

    #[actix_web::test]
    async fn invalid_user_fails_without_writing() {
        let store = temp_store();
        let path = store.path().to_owned();
        let app = init_app!(store);

        let req = post_user(json!({"name": "  "})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp: BaseResponse = test::read_body_json(resp).await;
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("name must not be empty"));

        assert!(!path.exists());
    }

    #[actix_web::test]
    async fn store_failure_is_reported_not_raised() {
        let store = temp_store();
        let path = store.path().to_owned();
        tokio::fs::write(&path, "not json").await.unwrap();
        let app = init_app!(store);

        let req = post_user(json!({"name": "ada"})).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp: BaseResponse = test::read_body_json(resp).await;
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("not valid JSON"));

        let req = test::TestRequest::get().uri("/users").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        tokio::fs::remove_file(path).await.unwrap();
    }

    #[actix_web::test]
    async fn metrics_report_earlier_requests() {
        let app = init_app!(temp_store());

        let req = test::TestRequest::get().uri("/").to_request();
        test::call_service(&app, req).await;
        let req = test::TestRequest::get().uri("/nowhere").to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            crate::metrics::CONTENT_TYPE
        );
        let body = test::read_body(resp).await;
        let body = std::str::from_utf8(&body).unwrap();

        assert!(body.contains("# TYPE http_requests_total counter"));
        assert!(body.contains(r#"http_requests_total{handler="/",method="GET",status="2xx"} 1"#));
        assert!(body.contains(r#"http_requests_total{handler="none",method="GET",status="4xx"} 1"#));
        assert!(body.contains("# TYPE http_request_duration_seconds histogram"));
        assert!(body.contains(r#"http_response_size_bytes_count{handler="/"} 1"#));
    }
}
