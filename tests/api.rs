use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use storefront_core::{app, bootstrap_catalog, AppState, Settings};
use tower::ServiceExt;

const SEED: &str = "
    INSERT INTO categories (id, name) VALUES (1, 'Lighting'), (2, 'Furniture');
    INSERT INTO brands (id, name) VALUES (1, 'Acme'), (2, 'Nordic');
    INSERT INTO products (id, name, price, category_id, brand_id, is_available, created_at, updated_at) VALUES
        (1, 'Desk', 250.0, 2, 1, 1, '2024-01-01 10:00:00', '2024-01-01 10:00:00'),
        (2, 'Lamp', 40.0, 1, 2, 1, '2024-01-02 10:00:00', '2024-01-02 10:00:00'),
        (3, 'Chair', 120.0, 2, 1, 1, '2024-01-03 10:00:00', '2024-01-03 10:00:00'),
        (4, 'Shelf', 100.0, 2, 2, 0, '2024-01-04 10:00:00', '2024-01-04 10:00:00'),
        (5, 'Floor Lamp', 90.0, 1, 1, 1, '2024-01-05 10:00:00', '2024-01-05 10:00:00');
";

async fn setup_with(settings: Settings) -> Router {
    let state = AppState::from_settings(settings).await.unwrap();
    let pool = state.connector.pool().await.unwrap();
    bootstrap_catalog(&pool).await.unwrap();
    pool.execute_raw(SEED).await.unwrap();
    app(state)
}

async fn setup() -> Router {
    setup_with(Settings::for_database("sqlite::memory:")).await
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(b) = body {
        let ct = if b.trim_start().starts_with('{') {
            "application/json"
        } else {
            "application/x-www-form-urlencoded"
        };
        req = req.header(CONTENT_TYPE, ct);
    }
    let req = req
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .map(|a| a.iter().filter_map(|r| r["id"].as_i64()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn lists_available_products_newest_first() {
    let app = setup().await;
    let (status, body) = send(&app, "GET", "/api/v1/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 4);
    assert_eq!(body["perPage"], 20);
    assert_eq!(body["page"], 1);
    assert_eq!(body["totalPages"], 1);
    assert_eq!(ids(&body["data"]), vec![5, 3, 2, 1]);
}

#[tokio::test]
async fn filters_and_sorts_products() {
    let app = setup().await;
    let (_, body) = send(&app, "GET", "/api/v2/products?category=2&sort=price&order=asc", None).await;
    assert_eq!(ids(&body["data"]), vec![3, 1]);

    let (_, body) = send(&app, "GET", "/api/v1/products?min_price=100&max_price=200", None).await;
    assert_eq!(ids(&body["data"]), vec![3]);

    let (_, body) = send(&app, "GET", "/api/v1/products?sort=stock;drop&order=asc", None).await;
    assert_eq!(ids(&body["data"]), vec![1, 2, 3, 5]);

    let (status, _) = send(&app, "GET", "/api/v1/products?min_price=cheap", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn paginates_products() {
    let app = setup().await;
    let (_, body) = send(&app, "GET", "/api/v1/products?per_page=2&page=2", None).await;
    assert_eq!(ids(&body["data"]), vec![2, 1]);
    assert_eq!(body["page"], 2);
    assert_eq!(body["perPage"], 2);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["total"], 4);
}

#[tokio::test]
async fn searches_by_name() {
    let app = setup().await;
    let (status, body) = send(&app, "GET", "/api/v1/products/search?q=lamp", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["data"]), vec![5, 2]);
    assert_eq!(body["count"], 2);

    let (status, body) = send(&app, "GET", "/api/v1/products/search", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Search query is required");
}

#[tokio::test]
async fn shows_one_product() {
    let app = setup().await;
    let (status, body) = send(&app, "GET", "/api/v1/products/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Chair");

    let (status, body) = send(&app, "GET", "/api/v1/products/4", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product is not available");

    let (status, body) = send(&app, "GET", "/api/v1/products/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");

    let (status, _) = send(&app, "GET", "/api/v1/products/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn creates_from_json_and_form() {
    let app = setup().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/products",
        Some(r#"{"name": "Sofa", "price": 899.0, "category_id": 2, "brand_id": 2, "secret": "ignored"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Product created successfully");
    assert_eq!(body["data"]["name"], "Sofa");
    assert!(body["data"].get("secret").is_none());
    assert!(body["data"]["created_at"].is_string());
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/api/v1/products/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 899.0);

    let (status, body) = send(&app, "POST", "/api/v1/products", Some("name=Stool&price=35")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Stool");
    assert_eq!(body["data"]["price"], 35.0);
}

#[tokio::test]
async fn create_validates_required_fields() {
    let app = setup().await;
    let (status, body) = send(&app, "POST", "/api/v1/products", Some(r#"{"description": "no name"}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"]["name"], "Name is required");
    assert_eq!(body["errors"]["price"], "Price is required");

    // a body that is neither JSON nor a form reads as empty
    let (status, body) = send(&app, "POST", "/api/v1/products", Some("{not json at all")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"], "Name is required");
}

#[tokio::test]
async fn updates_and_deletes() {
    let app = setup().await;
    let (status, body) = send(&app, "PUT", "/api/v1/products/2", Some(r#"{"price": 45}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 45.0);
    assert_eq!(body["data"]["name"], "Lamp");
    assert_ne!(body["data"]["updated_at"], "2024-01-02 10:00:00");

    let (status, _) = send(&app, "POST", "/api/v1/products/2", Some(r#"{"name": "Desk Lamp"}"#)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "PUT", "/api/v1/products/99", Some(r#"{"price": 1}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "DELETE", "/api/v1/products/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");
    let (status, _) = send(&app, "GET", "/api/v1/products/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn categories_and_brands() {
    let app = setup().await;
    let (_, body) = send(&app, "GET", "/api/v1/categories", None).await;
    let names: Vec<&str> = body["data"].as_array().unwrap().iter().filter_map(|c| c["name"].as_str()).collect();
    assert_eq!(names, vec!["Furniture", "Lighting"]);
    assert_eq!(body["data"][0]["product_count"], 2);
    assert_eq!(body["data"][1]["product_count"], 2);

    let (_, body) = send(&app, "GET", "/api/v1/categories/1/products", None).await;
    assert_eq!(body["category"]["name"], "Lighting");
    assert_eq!(ids(&body["products"]["data"]), vec![5, 2]);

    let (_, body) = send(&app, "GET", "/api/v1/brands/2/products", None).await;
    assert_eq!(body["brand"]["name"], "Nordic");
    assert_eq!(body["products"]["total"], 1);

    let (status, body) = send(&app, "GET", "/api/v1/categories/9/products", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");
}

#[tokio::test]
async fn unknown_routes_echo_the_request() {
    let app = setup().await;
    let (status, body) = send(&app, "GET", "/api/v1/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["method"], "GET");
    assert_eq!(body["url"], "api/v1/nope");
    assert_eq!(body["available_versions"], json!(["v1", "v2", "v3"]));

    // path exists under GET only
    let (status, body) = send(&app, "DELETE", "/api/v1/categories", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["method"], "DELETE");

    let (status, body) = send(&app, "GET", "/api/v3/products", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["version"], "v3");

    let (status, body) = send(&app, "GET", "/api/v9/products", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["version"], "v1");
}

#[tokio::test]
async fn unprefixed_paths_use_v1() {
    let app = setup().await;
    let (status, body) = send(&app, "GET", "/products/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Chair");
}

#[tokio::test]
async fn options_short_circuits() {
    let app = setup().await;
    let (status, body) = send(&app, "OPTIONS", "/api/v1/anything/at/all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn echo_keeps_capture_order() {
    let app = setup().await;
    let (_, body) = send(&app, "GET", "/api/v2/test/echo/alpha/beta?x=1", None).await;
    assert_eq!(body["params"], json!({"first": "alpha", "second": "beta"}));
    assert_eq!(body["positional"], json!(["alpha", "beta"]));
    assert_eq!(body["query"]["x"], "1");
}

#[tokio::test]
async fn strategies_agree_over_http() {
    let mut settings = Settings::for_database("sqlite::memory:");
    settings.allow_interpolated_sql = true;
    let app = setup_with(settings).await;

    let (_, v1) = send(&app, "GET", "/api/v1/test/public", None).await;
    let (_, v2) = send(&app, "GET", "/api/v2/test/public", None).await;
    assert_eq!(v1["strategy"], "interpolated");
    assert_eq!(v2["strategy"], "parameterized");

    let query = "products?min_price=100&sort=name&order=asc";
    let (_, v1) = send(&app, "GET", &format!("/api/v1/{}", query), None).await;
    let (_, v2) = send(&app, "GET", &format!("/api/v2/{}", query), None).await;
    assert_eq!(ids(&v1["data"]), vec![3, 1]);
    assert_eq!(ids(&v1["data"]), ids(&v2["data"]));

    let (status, body) = send(&app, "GET", "/api/v1/products/search?q=x%27%20OR%20%271%27%3D%271", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn health_and_readiness() {
    let app = setup().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
    assert_eq!(body["driver"], "SQLite");

    let (_, body) = send(&app, "GET", "/version", None).await;
    assert_eq!(body["package"], "storefront-core");
}

#[tokio::test]
async fn connection_failure_is_503() {
    let state = AppState::from_settings(Settings::for_database("mysql://root@localhost/shop"))
        .await
        .unwrap();
    let app = app(state);
    let (status, body) = send(&app, "GET", "/api/v1/products", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
}
