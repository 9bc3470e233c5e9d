//! Full network round trips: contract → registry → hyper server → HTTP
//! client transport, plus raw-wire behavior for misses and bad payloads.

use covenant_client::HttpTransport;
use covenant_core::contract::{endpoint, response, Contract};
use covenant_core::di::Container;
use covenant_core::registry::{EndpointContext, MiddlewareContext, Registry};
use covenant_core::{ApiClient, CallParts, HandlerError, ResponseObject, FAILED_VALIDATION_HEADER};
use covenant_schema::{object, string};
use covenant_server::ApiServer;
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;

async fn start_server() -> (ApiClient, String) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let contract = Contract::builder()
        .route(
            "POST /echo",
            endpoint()
                .body(object().field("name", string().min_len(1)))
                .response(StatusCode::CREATED, response()),
        )
        .route(
            "GET /items/:id",
            endpoint().response(StatusCode::OK, response()),
        )
        .route(
            "GET /search",
            endpoint()
                .query(object().field("q", string()))
                .response(StatusCode::OK, response()),
        )
        .route("GET /locked", endpoint().response(StatusCode::OK, response()))
        .build()
        .unwrap();

    let registry = Arc::new(Registry::new(Container::builder().build(), &contract));

    registry
        .route("POST /echo")
        .unwrap()
        .register(|input, _ctx: EndpointContext<()>| async move {
            let body = input.body.ok_or_else(|| HandlerError::msg("missing body"))?;
            Ok(ResponseObject::created(body).with_header("location", json!("/echo/1")))
        });

    registry
        .route("GET /items/:id")
        .unwrap()
        .register(|input, _ctx: EndpointContext<()>| async move {
            Ok(ResponseObject::ok(json!({ "id": input.path_params["id"] })))
        });

    registry
        .route("GET /search")
        .unwrap()
        .register(|input, _ctx: EndpointContext<()>| async move {
            Ok(ResponseObject::ok(
                input.query.unwrap_or(serde_json::Value::Null),
            ))
        });

    registry
        .route("GET /locked")
        .unwrap()
        .register(|_input, _ctx: EndpointContext<()>| async move {
            Ok(ResponseObject::ok(json!("open")))
        });

    registry
        .middleware("GET /locked")
        .unwrap()
        .register(|_input, _ctx: MiddlewareContext<()>| async move {
            Ok(Some(
                ResponseObject::new(StatusCode::FORBIDDEN).with_body(json!({ "error": "locked" })),
            ))
        });

    let server = ApiServer::new(registry).bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.serve());

    let base_url = format!("http://{}", addr);
    let transport = Arc::new(HttpTransport::new(base_url.clone()));
    (ApiClient::new(contract, transport), base_url)
}

#[tokio::test]
async fn post_round_trip_carries_body_and_headers() {
    let (client, _) = start_server().await;

    let created = client
        .seg("echo")
        .post(CallParts {
            body: Some(json!({ "name": "pikachu" })),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.code, StatusCode::CREATED);
    assert_eq!(created.body, Some(json!({ "name": "pikachu" })));
    assert_eq!(created.header("location"), Some(&json!("/echo/1")));
    assert_eq!(created.header("content-type"), Some(&json!("application/json")));
}

#[tokio::test]
async fn path_params_resolve_over_the_wire() {
    let (client, _) = start_server().await;

    let fetched = client
        .seg("items")
        .param("id", 7)
        .get(CallParts::default())
        .await
        .unwrap();

    assert_eq!(fetched.code, StatusCode::OK);
    assert_eq!(fetched.body, Some(json!({ "id": "7" })));
}

#[tokio::test]
async fn query_strings_survive_the_round_trip() {
    let (client, _) = start_server().await;

    let found = client
        .seg("search")
        .get(CallParts {
            query: Some(json!({ "q": "pika" })),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(found.body, Some(json!({ "q": "pika" })));
}

#[tokio::test]
async fn middleware_short_circuits_on_the_server() {
    let (client, _) = start_server().await;

    let locked = client.seg("locked").get(CallParts::default()).await.unwrap();
    assert_eq!(locked.code, StatusCode::FORBIDDEN);
    assert_eq!(locked.body, Some(json!({ "error": "locked" })));
}

#[tokio::test]
async fn wire_level_validation_failures_are_400s() {
    let (_, base_url) = start_server().await;
    let raw = reqwest::Client::new();

    // Schema-invalid body, bypassing the contract-shaped client.
    let invalid = raw
        .post(format!("{}/echo", base_url))
        .json(&json!({ "name": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        invalid
            .headers()
            .get(FAILED_VALIDATION_HEADER)
            .and_then(|v| v.to_str().ok()),
        Some("body")
    );

    let not_json = raw
        .post(format!("{}/echo", base_url))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn misses_map_to_404_and_405() {
    let (_, base_url) = start_server().await;
    let raw = reqwest::Client::new();

    let missing = raw
        .get(format!("{}/nowhere", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let wrong_method = raw
        .delete(format!("{}/echo", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_method.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        wrong_method
            .headers()
            .get("allow")
            .and_then(|v| v.to_str().ok()),
        Some("POST")
    );
}
