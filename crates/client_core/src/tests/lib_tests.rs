use super::*;
use axum::{http::StatusCode, routing::post, Json, Router};
use shared::error::ErrorCode;
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct GreetServerState {
    received: Arc<Mutex<Vec<GreetRequest>>>,
}

async fn handle_greet(
    axum::extract::State(state): axum::extract::State<GreetServerState>,
    Json(request): Json<GreetRequest>,
) -> Json<GreetResponse> {
    let greeting = format!("Hello, {}!", request.name);
    state.received.lock().await.push(request);
    Json(GreetResponse { greeting })
}

async fn handle_greet_rejected() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiError::new(ErrorCode::Unavailable, "greeter is draining")),
    )
}

async fn handle_greet_plain_error() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn spawn_greet_server(router: Router) -> Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

#[test]
fn greet_endpoint_appends_route_to_base_url() {
    assert_eq!(
        greet_endpoint("http://127.0.0.1:4943").expect("endpoint").as_str(),
        "http://127.0.0.1:4943/greet"
    );
    assert_eq!(
        greet_endpoint("https://example.test/api").expect("endpoint").as_str(),
        "https://example.test/api/greet"
    );
    assert_eq!(
        greet_endpoint("https://example.test/api/").expect("endpoint").as_str(),
        "https://example.test/api/greet"
    );
}

#[test]
fn greet_endpoint_rejects_unusable_urls() {
    assert!(greet_endpoint("not a url").is_err());
    assert!(greet_endpoint("ftp://example.test").is_err());
}

#[tokio::test]
async fn http_service_posts_name_and_returns_greeting() {
    let state = GreetServerState::default();
    let router = Router::new()
        .route("/greet", post(handle_greet))
        .with_state(state.clone());
    let server_url = spawn_greet_server(router).await.expect("spawn server");

    let service =
        HttpGreetService::new(&server_url, DEFAULT_REQUEST_TIMEOUT).expect("build service");
    let greeting = service.greet("Ada").await.expect("greet");

    assert_eq!(greeting, "Hello, Ada!");
    assert_eq!(
        *state.received.lock().await,
        vec![GreetRequest {
            name: "Ada".to_string()
        }]
    );
}

#[tokio::test]
async fn http_service_surfaces_structured_remote_errors() {
    let router = Router::new().route("/greet", post(handle_greet_rejected));
    let server_url = spawn_greet_server(router).await.expect("spawn server");
    let service =
        HttpGreetService::new(&server_url, DEFAULT_REQUEST_TIMEOUT).expect("build service");

    let err = service.greet("Ada").await.expect_err("greet should fail");
    match err.downcast_ref::<GreetError>() {
        Some(GreetError::Remote { status, source }) => {
            assert_eq!(*status, 503);
            assert_eq!(source.code, ErrorCode::Unavailable);
            assert_eq!(source.message, "greeter is draining");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn http_service_keeps_unstructured_error_bodies() {
    let router = Router::new().route("/greet", post(handle_greet_plain_error));
    let server_url = spawn_greet_server(router).await.expect("spawn server");
    let service =
        HttpGreetService::new(&server_url, DEFAULT_REQUEST_TIMEOUT).expect("build service");

    let err = service.greet("Ada").await.expect_err("greet should fail");
    match err.downcast_ref::<GreetError>() {
        Some(GreetError::Status { status, body }) => {
            assert_eq!(*status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn http_service_reports_unreachable_server_as_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let service = HttpGreetService::new(&format!("http://{addr}"), DEFAULT_REQUEST_TIMEOUT)
        .expect("build service");
    let err = service.greet("Ada").await.expect_err("greet should fail");
    assert!(matches!(
        err.downcast_ref::<GreetError>(),
        Some(GreetError::Transport(_))
    ));
}

#[tokio::test]
async fn missing_service_always_fails() {
    let err = MissingGreetService
        .greet("Ada")
        .await
        .expect_err("missing service");
    assert!(err.to_string().contains("unavailable"));
}
