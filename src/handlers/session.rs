use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::error::SessionError;
use crate::guide;
use crate::i18n::{self, Locale};
use crate::models::{
    ChangePasswordRequest, LoginRequest, ProfileData, ServiceOffering, UserTypeRequest,
    VerifyOtpRequest,
};
use crate::router;
use crate::state::AppState;

/// Current snapshot plus where the client should be, optionally with a
/// localized feedback message for the client to show. The user record is
/// withheld until the device has passed OTP verification.
async fn session_body(
    state: &AppState,
    device_id: &str,
    message: Option<(Locale, &str)>,
) -> Result<serde_json::Value, SessionError> {
    let mut snapshot = state.sessions.snapshot(device_id).await?;
    let destination = router::resolve(&snapshot);
    if snapshot.verified_user().is_none() {
        snapshot.user = None;
    }
    let mut body = json!({
        "session": snapshot,
        "destination": destination,
        "path": destination.path(),
    });
    if let Some((locale, key)) = message {
        body["message"] = json!(i18n::translate(locale, key));
    }
    Ok(body)
}

pub async fn get_session(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SessionError> {
    let device_id = path.into_inner();
    Ok(HttpResponse::Ok().json(session_body(&state, &device_id, None).await?))
}

pub async fn login(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SessionError> {
    let device_id = path.into_inner();
    let (_, otp) = state.sessions.login(&device_id, &data.phone_number).await?;

    let locale = i18n::detect_locale(&req);
    let mut body = session_body(&state, &device_id, Some((locale, "auth.otpSent"))).await?;
    body["otpExpiresAt"] = json!(otp.expires_at.to_rfc3339());
    if state.config.echo_otp {
        body["otp"] = json!(otp.code);
    }
    Ok(HttpResponse::Ok().json(body))
}

pub async fn verify_otp(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<VerifyOtpRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SessionError> {
    let device_id = path.into_inner();
    state.sessions.verify_otp(&device_id, data.otp.trim()).await?;

    let locale = i18n::detect_locale(&req);
    Ok(HttpResponse::Ok().json(session_body(&state, &device_id, Some((locale, "auth.otpVerified"))).await?))
}

pub async fn select_user_type(
    path: web::Path<String>,
    data: web::Json<UserTypeRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SessionError> {
    let device_id = path.into_inner();
    state.sessions.select_user_type(&device_id, &data.user_type).await?;
    Ok(HttpResponse::Ok().json(session_body(&state, &device_id, None).await?))
}

pub async fn complete_onboarding(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<ProfileData>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SessionError> {
    let device_id = path.into_inner();
    state.sessions.complete_onboarding(&device_id, data.into_inner()).await?;

    let locale = i18n::detect_locale(&req);
    Ok(HttpResponse::Ok().json(session_body(&state, &device_id, Some((locale, "onboarding.completed"))).await?))
}

pub async fn add_service_offering(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<ServiceOffering>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SessionError> {
    let device_id = path.into_inner();
    let offering = state.sessions.add_service_offering(&device_id, data.into_inner()).await?;

    let locale = i18n::detect_locale(&req);
    let mut body = session_body(&state, &device_id, Some((locale, "onboarding.serviceAdded"))).await?;
    body["offering"] = json!(offering);
    Ok(HttpResponse::Created().json(body))
}

pub async fn get_guide(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SessionError> {
    let device_id = path.into_inner();
    let snapshot = state.sessions.snapshot(&device_id).await?;
    let locale = i18n::detect_locale(&req);
    let deck = guide::deck_for(snapshot.verified_user());

    Ok(HttpResponse::Ok().json(json!({
        "deck": deck,
        "locale": locale,
        "slides": guide::slides(deck, locale),
    })))
}

pub async fn complete_guide(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SessionError> {
    let device_id = path.into_inner();
    let exit = state.sessions.complete_guide(&device_id).await?;

    let mut body = session_body(&state, &device_id, None).await?;
    body["exit"] = json!(exit);
    body["exitPath"] = json!(exit.path());
    Ok(HttpResponse::Ok().json(body))
}

pub async fn change_password(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<ChangePasswordRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SessionError> {
    let device_id = path.into_inner();
    state
        .sessions
        .change_password(&device_id, &data.current_password, &data.new_password)
        .await?;

    let locale = i18n::detect_locale(&req);
    Ok(HttpResponse::Ok().json(json!({
        "message": i18n::translate(locale, "auth.passwordChanged"),
    })))
}

pub async fn logout(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SessionError> {
    let device_id = path.into_inner();
    state.sessions.logout(&device_id).await?;

    let locale = i18n::detect_locale(&req);
    Ok(HttpResponse::Ok().json(session_body(&state, &device_id, Some((locale, "auth.loggedOut"))).await?))
}
