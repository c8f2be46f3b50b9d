//! Tests for session endpoints.

use super::*;
use crate::inbound::http::test_utils::{MemoryDesk, api_app, session_cookie};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::Value;

fn login_request(email: &str, password: &str) -> actix_http::Request {
    actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(LoginRequest {
            email: email.into(),
            password: password.into(),
        })
        .to_request()
}

#[rstest]
#[actix_web::test]
async fn login_binds_the_user_and_me_describes_them() {
    let desk = MemoryDesk::new();
    let ada = desk.seed_user("ada@example.com", "Ada", "analytical").await;
    let app = actix_test::init_service(api_app(desk.state.clone())).await;

    let login_res = actix_test::call_service(
        &app,
        login_request("Ada@Example.com", "analytical"),
    )
    .await;
    assert_eq!(login_res.status(), StatusCode::OK);
    let cookie = session_cookie(&login_res);

    let me_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(me_res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(me_res).await;
    assert_eq!(body["id"], ada.id().to_string());
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["roles"], serde_json::json!(["ROLE_USER"]));
}

#[rstest]
#[case("ada@example.com", "wrong")]
#[case("nobody@example.com", "analytical")]
#[actix_web::test]
async fn login_rejects_bad_credentials(#[case] email: &str, #[case] password: &str) {
    let desk = MemoryDesk::new();
    desk.seed_user("ada@example.com", "Ada", "analytical").await;
    let app = actix_test::init_service(api_app(desk.state.clone())).await;

    let res = actix_test::call_service(&app, login_request(email, password)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(body["message"], "invalid credentials");
}

#[rstest]
#[case("not-an-email", "pw", "email", "invalid_email")]
#[case("ada@example.com", "", "password", "empty_password")]
#[actix_web::test]
async fn login_validates_payload_shape(
    #[case] email: &str,
    #[case] password: &str,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(api_app(MemoryDesk::new().state)).await;

    let res = actix_test::call_service(&app, login_request(email, password)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn login_with_malformed_json_is_a_bad_request() {
    let app = actix_test::init_service(api_app(MemoryDesk::new().state)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"email\":")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "invalid_json");
}

#[rstest]
#[actix_web::test]
async fn me_without_session_is_unauthorised_with_trace_id() {
    let app = actix_test::init_service(api_app(MemoryDesk::new().state)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/me").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let header = res
        .headers()
        .get(crate::domain::TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["traceId"], header);
}

#[rstest]
#[actix_web::test]
async fn logout_clears_the_session() {
    let desk = MemoryDesk::new();
    desk.seed_user("ada@example.com", "Ada", "analytical").await;
    let app = actix_test::init_service(api_app(desk.state.clone())).await;
    let login_res = actix_test::call_service(
        &app,
        login_request("ada@example.com", "analytical"),
    )
    .await;
    let cookie = session_cookie(&login_res);

    let logout_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(logout_res.status(), StatusCode::NO_CONTENT);
    let cleared = session_cookie(&logout_res);

    let me_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(cleared)
            .to_request(),
    )
    .await;
    assert_eq!(me_res.status(), StatusCode::UNAUTHORIZED);
}
