use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use jwt_http_auth::{middleware, AuthContext, JwtHttpInterceptor, PartialConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

async fn me(auth: AuthContext) -> String {
    format!(
        "{}:{}",
        auth.subject().unwrap_or_default(),
        auth.source.as_str()
    )
}

fn issue_token(sub: &str, issuer: &str, audience: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = json!({
        "sub": sub,
        "iss": issuer,
        "aud": audience,
        "iat": now,
        "exp": now + 600,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("sign token")
}

fn build_app() -> Router {
    let interceptor = JwtHttpInterceptor::new(
        SECRET,
        Some(
            PartialConfig::new()
                .with_issuer("auth.test")
                .with_audience("api.test"),
        ),
    )
    .expect("interceptor");
    middleware::apply(Router::new().route("/me", get(me)), Arc::new(interceptor))
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

#[tokio::test]
async fn bearer_header_reaches_handler() {
    let token = issue_token("user-1", "auth.test", "api.test");
    let req = Request::builder()
        .uri("/me")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();

    let resp = build_app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "user-1:header");
}

#[tokio::test]
async fn query_token_reaches_handler() {
    let token = issue_token("user-2", "auth.test", "api.test");
    let req = Request::builder()
        .uri(format!("/me?token={token}&format=json"))
        .body(Body::empty())
        .unwrap();

    let resp = build_app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "user-2:query");
}

#[tokio::test]
async fn missing_credentials_are_rejected() {
    let req = Request::builder().uri("/me").body(Body::empty()).unwrap();

    let resp = build_app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body_string(resp).await).expect("json body");
    assert_eq!(body["code"], "AUTH_TOKEN");
    assert_eq!(body["message"], "token is invalid");
}

#[tokio::test]
async fn malformed_header_token_does_not_leak_decode_details() {
    let req = Request::builder()
        .uri("/me")
        .header("authorization", "Bearer a.b.c")
        .body(Body::empty())
        .unwrap();

    let resp = build_app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body_string(resp).await).expect("json body");
    assert_eq!(body["code"], "AUTH_TOKEN");
    assert_eq!(body["message"], "token is invalid");
}

#[tokio::test]
async fn wrong_audience_is_rejected() {
    let token = issue_token("user-3", "auth.test", "localhost");
    let req = Request::builder()
        .uri("/me")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();

    let resp = build_app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn extractor_without_middleware_is_unauthenticated() {
    let app = Router::new().route("/me", get(me));
    let req = Request::builder().uri("/me").body(Body::empty()).unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body_string(resp).await).expect("json body");
    assert_eq!(body["code"], "AUTH_HEADER");
}
