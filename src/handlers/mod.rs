pub mod session;

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use std::collections::HashMap;

use crate::api;
use crate::i18n;
use crate::state::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))

        .route("/api/session/{device_id}", web::get().to(session::get_session))
        .route("/api/session/{device_id}/login", web::post().to(session::login))
        .route("/api/session/{device_id}/verify-otp", web::post().to(session::verify_otp))
        .route("/api/session/{device_id}/user-type", web::post().to(session::select_user_type))
        .route("/api/session/{device_id}/onboarding", web::post().to(session::complete_onboarding))
        .route("/api/session/{device_id}/service-offerings", web::post().to(session::add_service_offering))
        .route("/api/session/{device_id}/guide", web::get().to(session::get_guide))
        .route("/api/session/{device_id}/guide/complete", web::post().to(session::complete_guide))
        .route("/api/session/{device_id}/password", web::put().to(session::change_password))
        .route("/api/session/{device_id}/logout", web::post().to(session::logout))

        .route("/api/i18n/{key}", web::get().to(translation))
        .route("/api/endpoints", web::get().to(endpoints))
        .route("/api/endpoints/{group}/{name}", web::get().to(endpoint_url));
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn translation(req: HttpRequest, path: web::Path<String>) -> HttpResponse {
    let key = path.into_inner();
    let locale = i18n::detect_locale(&req);
    HttpResponse::Ok().json(json!({
        "key": key,
        "locale": locale,
        "value": i18n::translate(locale, &key),
    }))
}

pub async fn endpoints(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "baseUrl": state.config.api_base_url,
        "endpoints": api::ENDPOINTS,
    }))
}

/// Resolves one catalogue entry to a full URL; query parameters fill the
/// `:name` path segments.
pub async fn endpoint_url(
    path: web::Path<(String, String)>,
    query: web::Query<HashMap<String, String>>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let (group, name) = path.into_inner();
    let Some(endpoint) = api::find(&group, &name) else {
        return HttpResponse::NotFound().json(json!({ "error": "Unknown endpoint" }));
    };

    let params: Vec<(&str, &str)> = query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    HttpResponse::Ok().json(json!({
        "group": endpoint.group,
        "name": endpoint.name,
        "url": api::build_url(&state.config.api_base_url, endpoint.path, &params),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    async fn app_state() -> AppState {
        let pool = db::init_pool("sqlite::memory:").await.unwrap();
        let config = Config {
            echo_otp: true,
            ..Config::default()
        };
        AppState::new(pool, config)
    }

    #[actix_web::test]
    async fn full_customer_journey() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state().await))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/session/d1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["destination"], "guide");

        let req = test::TestRequest::post().uri("/api/session/d1/guide/complete").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["exit"], "signup");
        assert_eq!(body["path"], "/auth/phone-login");

        let req = test::TestRequest::post()
            .uri("/api/session/d1/login?lang=roman")
            .set_json(json!({ "phoneNumber": "0300 1234567" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["destination"], "otp_verify");
        assert_eq!(body["message"], "Tasdeeqi code bhej diya gaya");
        let otp = body["otp"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/session/d1/verify-otp")
            .set_json(json!({ "otp": otp }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["destination"], "user_type_select");

        let req = test::TestRequest::post()
            .uri("/api/session/d1/user-type")
            .set_json(json!({ "userType": "User" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["destination"], "onboarding_start");

        let req = test::TestRequest::post()
            .uri("/api/session/d1/onboarding")
            .set_json(json!({ "name": "Sara", "locations": ["Karachi"] }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["destination"], "guide");

        let req = test::TestRequest::get().uri("/api/session/d1/guide").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["deck"], "customer");
        assert_eq!(body["slides"].as_array().unwrap().len(), 4);

        let req = test::TestRequest::post().uri("/api/session/d1/guide/complete").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["exit"], "main_tabs");
        assert_eq!(body["destination"], "main_tabs");
        assert_eq!(body["path"], "/(tabs)");
    }

    #[actix_web::test]
    async fn errors_map_to_json_statuses() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state().await))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/session/d2/verify-otp")
            .set_json(json!({ "otp": "123456" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "No user is signed in on this device");

        let req = test::TestRequest::post()
            .uri("/api/session/d2/login")
            .set_json(json!({ "phoneNumber": "nope" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn second_device_sees_nothing_until_verified() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state().await))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/session/owner/login")
            .set_json(json!({ "phoneNumber": "03001234567" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let req = test::TestRequest::post()
            .uri("/api/session/owner/verify-otp")
            .set_json(json!({ "otp": body["otp"] }))
            .to_request();
        test::call_service(&app, req).await;
        let req = test::TestRequest::post()
            .uri("/api/session/owner/onboarding")
            .set_json(json!({ "name": "Amna" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["session"]["user"]["name"], "Amna");

        let req = test::TestRequest::post().uri("/api/session/other/guide/complete").to_request();
        test::call_service(&app, req).await;
        let req = test::TestRequest::post()
            .uri("/api/session/other/login")
            .set_json(json!({ "phoneNumber": "03001234567" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["destination"], "otp_verify");
        assert!(body["session"]["user"].is_null());

        let req = test::TestRequest::post()
            .uri("/api/session/other/onboarding")
            .set_json(json!({ "name": "Someone else" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get().uri("/api/session/owner").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["session"]["user"]["name"], "Amna");
    }

    #[actix_web::test]
    async fn translation_and_catalogue_endpoints() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state().await))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/i18n/common.next")
            .insert_header(("Accept-Language", "ur"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["value"], "آگے");
        assert_eq!(body["locale"], "ur");

        let req = test::TestRequest::get().uri("/api/endpoints").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["baseUrl"], "https://www.kamwaalay.com/api");
        assert!(body["endpoints"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["path"] == "/verify-otp"));

        let req = test::TestRequest::get().uri("/api/endpoints/helpers/edit?id=9").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["url"], "https://www.kamwaalay.com/api/helpers/9/edit");

        let req = test::TestRequest::get().uri("/api/endpoints/helpers/fly").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
