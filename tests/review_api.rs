use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use school_reviews::api;
use school_reviews::app_state::AppState;
use school_reviews::config::{normalize_keywords, Config, DEFAULT_REVIEW_KEYWORDS};
use school_reviews::identity::Claims;

const SECRET: &str = "test-secret";

fn test_app() -> Router {
    let config = Config {
        database_url: None,
        jwt_secret: SECRET.to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_dir: PathBuf::from("logs"),
        default_page_size: 10,
        max_page_size: 50,
        review_keywords: normalize_keywords(DEFAULT_REVIEW_KEYWORDS.iter().copied()),
    };
    api::router(AppState::in_memory(config))
}

fn token(user_id: i32, role: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        username: format!("user{user_id}"),
        role: role.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn review_form(stars: i64, comment: &str) -> Value {
    json!({
        "location_rating": stars,
        "service_rating": stars,
        "facilities_rating": stars,
        "cleanliness_rating": stars,
        "value_rating": stars,
        "education_rating": stars,
        "comment": comment,
    })
}

#[tokio::test]
async fn anonymous_listing_of_empty_school() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/schools/1/reviews", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["total_count"], json!(0));
    assert_eq!(body["data"]["has_more"], json!(false));
    assert_eq!(body["data"]["reviews"], json!([]));
}

#[tokio::test]
async fn helpful_vote_requires_login() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/reviews/1/helpful",
        None,
        Some(json!({ "action": "helpful" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn invalid_token_is_rejected() {
    let app = test_app();
    let (status, _) = send(&app, Method::GET, "/schools/1/reviews", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_paging_is_a_bad_request() {
    let app = test_app();
    let (status, _) = send(&app, Method::GET, "/schools/1/reviews?limit=0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_approve_vote_and_list() {
    let app = test_app();
    let author = token(10, "parent");
    let admin = token(1, "admin");
    let voter = token(20, "parent");

    let (status, body) = send(
        &app,
        Method::POST,
        "/schools/3/reviews",
        Some(&author),
        Some(review_form(4, "Clean rooms and caring teachers")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let review_id = body["data"].as_i64().unwrap();

    // Pending: visible to the author, hidden from everyone else.
    let (_, own) = send(&app, Method::GET, "/schools/3/reviews", Some(&author), None).await;
    assert_eq!(own["data"]["total_count"], json!(1));
    let (_, public) = send(&app, Method::GET, "/schools/3/reviews", None, None).await;
    assert_eq!(public["data"]["total_count"], json!(0));

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/reviews/{review_id}/status"),
        Some(&voter),
        Some(json!({ "action": "approve" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/reviews/{review_id}/status"),
        Some(&admin),
        Some(json!({ "action": "approve" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!("Approved"));

    for _ in 0..2 {
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/reviews/{review_id}/helpful"),
            Some(&voter),
            Some(json!({ "action": "helpful" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["helpful_count"], json!(1));
    }

    let (_, listing) = send(&app, Method::GET, "/schools/3/reviews", Some(&voter), None).await;
    let first = &listing["data"]["reviews"][0];
    assert_eq!(first["id"], json!(review_id));
    assert_eq!(first["helpful_count"], json!(1));
    assert_eq!(first["user_marked_helpful"], json!(true));

    let (status, breakdown) = send(&app, Method::GET, "/schools/3/rating-breakdown", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(breakdown["success"], json!(true));

    let (_, keywords) = send(&app, Method::GET, "/schools/3/review-keywords?top=2", None, None).await;
    assert_eq!(keywords["data"]["keywords"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn health_endpoints_answer() {
    let app = test_app();
    let (status, _) = send(&app, Method::GET, "/health/live", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

fn assert_invalid_argument(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["status_code"], json!(400));
    assert_eq!(body["errors"]["kind"], json!("invalid_argument"));
}

#[tokio::test]
async fn unknown_helpful_action_is_an_invalid_argument() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/reviews/1/helpful",
        Some(&token(20, "parent")),
        Some(json!({ "action": "bogus" })),
    )
    .await;
    assert_invalid_argument(status, &body);
}

#[tokio::test]
async fn missing_rating_field_is_an_invalid_argument() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/schools/1/reviews",
        Some(&token(10, "parent")),
        Some(json!({ "location_rating": 4 })),
    )
    .await;
    assert_invalid_argument(status, &body);
    assert!(body["errors"]["message"]
        .as_str()
        .unwrap()
        .contains("service_rating"));
}

#[tokio::test]
async fn non_numeric_limit_is_an_invalid_argument() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/schools/1/reviews?limit=abc", None, None).await;
    assert_invalid_argument(status, &body);
}

#[tokio::test]
async fn non_numeric_path_id_is_an_invalid_argument() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/reviews/abc/helpful",
        Some(&token(20, "parent")),
        Some(json!({ "action": "helpful" })),
    )
    .await;
    assert_invalid_argument(status, &body);

    let (status, body) = send(&app, Method::GET, "/schools/x/rating-breakdown", None, None).await;
    assert_invalid_argument(status, &body);
}

#[tokio::test]
async fn anonymous_caller_with_bad_body_gets_unauthorized() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/reviews/1/helpful",
        None,
        Some(json!({ "action": "bogus" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"]["kind"], json!("unauthorized"));

    let (status, _) = send(
        &app,
        Method::POST,
        "/schools/1/reviews",
        None,
        Some(json!({ "location_rating": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
