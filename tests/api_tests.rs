use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use dashboard_auth_api::data::memory::InMemoryAccountRepository;
use dashboard_auth_api::data::sqlite::SqliteAccountRepository;
use dashboard_auth_api::domain::repository::AccountRepository;
use dashboard_auth_api::infrastructure::security::PasswordHashing;
use dashboard_auth_api::presentation::handlers::AppState;
use dashboard_auth_api::presentation::middleware::{REQUEST_ID_HEADER, RESPONSE_TIME_HEADER, RequestTracing};
use dashboard_auth_api::presentation::routes;
use std::sync::Arc;

fn fast_hashing() -> PasswordHashing {
    PasswordHashing::new(1024, 1, 1).unwrap()
}

macro_rules! setup_test {
    ($repository:expr) => {{
        let state = web::Data::new(AppState::new($repository, fast_hashing()));
        test::init_service(
            App::new()
                .app_data(state.clone())
                .wrap(Cors::permissive())
                .wrap(RequestTracing)
                .configure(routes::configure),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_ping_returns_pong() {
    let app = setup_test!(Arc::new(InMemoryAccountRepository::new()));

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"PONG");
}

#[actix_web::test]
async fn test_responses_carry_request_id_and_timing() {
    let app = setup_test!(Arc::new(InMemoryAccountRepository::new()));

    let first = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let second = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    let first_id = first.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap().to_string();
    let second_id = second.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap().to_string();
    assert_ne!(first_id, second_id);

    let timing = first.headers().get(RESPONSE_TIME_HEADER).unwrap().to_str().unwrap();
    assert!(timing.ends_with("ms"));
}

#[actix_web::test]
async fn test_unknown_path_and_wrong_verb_are_not_found() {
    let app = setup_test!(Arc::new(InMemoryAccountRepository::new()));

    let req = test::TestRequest::post().uri("/auth/logout").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/auth/unknown").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_malformed_json_is_validation_error() {
    let app = setup_test!(Arc::new(InMemoryAccountRepository::new()));

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"email\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
    assert!(body["msg"].as_str().unwrap().starts_with("Malformed request body"));
}

#[actix_web::test]
async fn test_non_json_content_type_is_validation_error() {
    let app = setup_test!(Arc::new(InMemoryAccountRepository::new()));

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .insert_header(("content-type", "text/plain"))
        .set_payload("name=Ann")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_cors_preflight_is_allowed() {
    let app = setup_test!(Arc::new(InMemoryAccountRepository::new()));

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/auth/login")
        .insert_header(("origin", "http://localhost:5173"))
        .insert_header(("access-control-request-method", "POST"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key("access-control-allow-origin"));
}

#[actix_web::test]
async fn test_flow_against_sqlite_store() {
    let repository = Arc::new(SqliteAccountRepository::connect("sqlite::memory:").await.unwrap());
    let app = setup_test!(repository.clone());

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(serde_json::json!({ "name": "Ann", "email": "ann@x.com", "password": "secret1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(serde_json::json!({ "name": "Ann", "email": "ann@x.com", "password": "secret1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(serde_json::json!({ "email": "ann@x.com", "password": "secret1" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    assert_eq!(repository.count().await.unwrap(), 1);
}

#[actix_web::test]
async fn test_closed_store_is_service_unavailable() {
    let repository = Arc::new(SqliteAccountRepository::connect("sqlite::memory:").await.unwrap());
    repository.close().await;
    let app = setup_test!(repository);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(serde_json::json!({ "email": "ann@x.com", "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "store_unavailable");
    assert!(!body["msg"].as_str().unwrap().contains("closed"));
}
