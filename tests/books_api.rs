use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use bookshelf_app::Application;
use bookshelf_kernel::settings::{CorsSettings, DatabaseSettings, SecuritySettings, Settings};
use serde_json::{json, Value};
use tower::ServiceExt;

const ORIGIN: &str = "http://localhost:3000";

fn settings(permit_all: bool) -> Settings {
    Settings {
        database: DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        cors: CorsSettings {
            allowed_origin: format!("{ORIGIN}, https://*.example.com"),
        },
        security: SecuritySettings {
            permit_all,
            ..SecuritySettings::default()
        },
        ..Settings::default()
    }
}

async fn app_with(settings: Settings) -> Router {
    let app = Application::build(settings).await.unwrap();
    app.prepare().await.unwrap()
}

async fn app() -> Router {
    app_with(settings(true)).await
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn dune() -> Value {
    json!({"title": "Dune", "author": "Herbert", "yearPublished": 1965})
}

#[tokio::test]
async fn book_lifecycle() {
    let app = app().await;

    let created = send(&app, Method::POST, "/api/books", Some(dune())).await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = json_body(created).await;
    let id = created["id"].as_i64().expect("id assigned");
    assert_eq!(created["title"], "Dune");
    assert_eq!(created["author"], "Herbert");
    assert_eq!(created["yearPublished"], 1965);

    let uri = format!("/api/books/{id}");
    let fetched = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(json_body(fetched).await, created);

    let deleted = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(json_body(deleted).await, created);

    let gone = send(&app, Method::GET, &uri, None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    let gone = json_body(gone).await;
    assert_eq!(gone["error"]["code"], "not_found");
}

#[tokio::test]
async fn update_replaces_all_fields() {
    let app = app().await;
    let created = json_body(send(&app, Method::POST, "/api/books", Some(dune())).await).await;
    let uri = format!("/api/books/{}", created["id"]);

    let replacement = json!({"title": "Emma", "author": "Austen", "yearPublished": 1815});
    let updated = send(&app, Method::PUT, &uri, Some(replacement)).await;
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(
        json_body(updated).await,
        json!({"id": created["id"], "title": "Emma", "author": "Austen", "yearPublished": 1815})
    );

    let listed = json_body(send(&app, Method::GET, "/api/books", None).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["title"], "Emma");
}

#[tokio::test]
async fn missing_books_are_not_found() {
    let app = app().await;

    for method in [Method::GET, Method::DELETE] {
        let response = send(&app, method, "/api/books/999", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    let response = send(&app, Method::PUT, "/api/books/999", Some(dune())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_requests_are_rejected_on_create_and_update() {
    let app = app().await;
    let created = json_body(send(&app, Method::POST, "/api/books", Some(dune())).await).await;
    let update_uri = format!("/api/books/{}", created["id"]);

    let cases = [
        (
            json!({"title": " ", "author": "Herbert", "yearPublished": 1965}),
            "title",
            "Title is required",
        ),
        (
            json!({"title": "Dune", "author": "", "yearPublished": 1965}),
            "author",
            "Author is required",
        ),
        (
            json!({"title": "Dune", "author": "Herbert", "yearPublished": 1399}),
            "yearPublished",
            "Year published must be greater than or equal to 1400",
        ),
        (
            json!({"title": "Dune", "author": "Herbert", "yearPublished": 10000}),
            "yearPublished",
            "Year published must be less than 10000",
        ),
    ];

    for (body, field, message) in cases {
        for (method, uri) in [(Method::POST, "/api/books"), (Method::PUT, update_uri.as_str())] {
            let response = send(&app, method.clone(), uri, Some(body.clone())).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {body}");
            let error = json_body(response).await;
            assert_eq!(error["error"]["code"], "validation_error");
            assert_eq!(
                error["error"]["details"],
                json!([{"field": field, "message": message}])
            );
        }
    }

    // nothing above reached storage
    let stored = json_body(send(&app, Method::GET, &update_uri, None).await).await;
    assert_eq!(stored, created);
}

#[tokio::test]
async fn missing_or_null_fields_are_validation_errors() {
    let app = app().await;
    let created = json_body(send(&app, Method::POST, "/api/books", Some(dune())).await).await;
    let update_uri = format!("/api/books/{}", created["id"]);

    let cases = [
        (
            json!({"author": "Herbert", "yearPublished": 1965}),
            json!([{"field": "title", "message": "Title is required"}]),
        ),
        (
            json!({"title": "Dune", "author": null, "yearPublished": 1965}),
            json!([{"field": "author", "message": "Author is required"}]),
        ),
        (
            json!({"title": "", "author": null, "yearPublished": 1965}),
            json!([
                {"field": "title", "message": "Title is required"},
                {"field": "author", "message": "Author is required"}
            ]),
        ),
    ];

    for (body, details) in cases {
        for (method, uri) in [(Method::POST, "/api/books"), (Method::PUT, update_uri.as_str())] {
            let response = send(&app, method.clone(), uri, Some(body.clone())).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {body}");
            let error = json_body(response).await;
            assert_eq!(error["error"]["code"], "validation_error");
            assert_eq!(error["error"]["details"], details, "{method} {body}");
        }
    }

    let stored = json_body(send(&app, Method::GET, &update_uri, None).await).await;
    assert_eq!(stored, created);
}

#[tokio::test]
async fn malformed_input_is_bad_request() {
    let app = app().await;

    let missing_year = send(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({"title": "Dune", "author": "Herbert"})),
    )
    .await;
    assert_eq!(missing_year.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(missing_year).await["error"]["code"], "bad_request");

    let bad_id = send(&app, Method::GET, "/api/books/abc", None).await;
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ids_endpoint_maps_ids_to_titles() {
    let app = app().await;
    let mut expected = serde_json::Map::new();
    for (title, year) in [("Dune", 1965), ("Emma", 1815)] {
        let created = json_body(
            send(
                &app,
                Method::POST,
                "/api/books",
                Some(json!({"title": title, "author": "Someone", "yearPublished": year})),
            )
            .await,
        )
        .await;
        expected.insert(created["id"].to_string(), json!(title));
    }

    let response = send(&app, Method::GET, "/api/books/ids", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, Value::Object(expected));
}

#[tokio::test]
async fn hello_returns_plain_greeting() {
    let app = app().await;

    let response = send(&app, Method::GET, "/api/v1/hello", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Hello, World!");
}

#[tokio::test]
async fn cors_preflight_honours_allow_list() {
    let app = app().await;

    let preflight = |origin: &'static str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/books")
            .header("origin", origin)
            .header("access-control-request-method", "PUT")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap()
    };

    let allowed = app.clone().oneshot(preflight(ORIGIN)).await.unwrap();
    assert_eq!(allowed.headers()["access-control-allow-origin"], ORIGIN);
    assert_eq!(allowed.headers()["access-control-allow-credentials"], "true");
    let methods = allowed.headers()["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .to_string();
    for method in ["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"] {
        assert!(methods.contains(method), "{methods} lacks {method}");
    }

    let wildcard = app
        .clone()
        .oneshot(preflight("https://shop.example.com"))
        .await
        .unwrap();
    assert_eq!(
        wildcard.headers()["access-control-allow-origin"],
        "https://shop.example.com"
    );

    let refused = app.oneshot(preflight("https://evil.test")).await.unwrap();
    assert!(!refused
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn security_fails_closed_without_permit_all() {
    let app = app_with(settings(false)).await;

    let books = send(&app, Method::GET, "/api/books", None).await;
    assert_eq!(books.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(books).await["error"]["code"], "unauthorized");

    let health = send(&app, Method::GET, "/healthz", None).await;
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn openapi_document_lists_module_paths() {
    let app = app().await;

    let doc = json_body(send(&app, Method::GET, "/docs/openapi.json", None).await).await;
    for path in [
        "/api/books",
        "/api/books/{id}",
        "/api/books/ids",
        "/api/v1/hello",
        "/healthz",
    ] {
        assert!(doc["paths"].get(path).is_some(), "missing {path}");
    }
    assert!(doc["components"]["schemas"].get("BookRequest").is_some());
}
