//! REST client requests and responses against a local fake endpoint.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use chrono::{TimeZone, Utc};
use stockspot_app::config::SupabaseConfig;
use stockspot_app::ports::{InventoryStore, ShopStore, StoreError};
use stockspot_app::supabase::SupabaseClient;
use stockspot_core::{DayOfWeek, ProductId, Shop, ShopId};
use stockspot_integration_tests::{FakeRest, RecordedRequest};

const KEY: &str = "sb_publishable_test_key";

async fn setup() -> (FakeRest, SupabaseClient) {
    let server = FakeRest::start().await.unwrap();
    let config = SupabaseConfig::new(&server.base_url(), KEY).unwrap();
    let client = SupabaseClient::new(&config).unwrap();
    (server, client)
}

fn only_request(server: &FakeRest) -> RecordedRequest {
    let mut requests = server.requests();
    assert_eq!(requests.len(), 1, "expected one request: {requests:?}");
    requests.pop().unwrap()
}

fn pair(k: &str, v: &str) -> (String, String) {
    (k.to_string(), v.to_string())
}

#[tokio::test]
async fn test_list_shops_request_and_projection() {
    let (server, client) = setup().await;
    server.respond_with(
        Method::GET,
        "/rest/v1/shops",
        StatusCode::OK,
        r#"[{
            "id": 3,
            "name": "Harbour Deli",
            "longitude": 24.951,
            "latitude": 60.1675,
            "created_at": "2025-01-01T00:00:00+00:00",
            "hours": [
                {"id": 1, "shop_id": 3, "day_of_week": 1, "open_time": "08:00:00", "close_time": "16:00:00"}
            ]
        }]"#,
    );

    let shops: Vec<Shop> = client
        .list_shops()
        .await
        .unwrap()
        .into_iter()
        .map(Shop::from)
        .collect();

    let request = only_request(&server);
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.query, vec![pair("select", "*,hours:shop_hours(*)")]);
    assert_eq!(request.headers.get("apikey").map(String::as_str), Some(KEY));
    assert_eq!(
        request.headers.get("authorization").cloned(),
        Some(format!("Bearer {KEY}"))
    );

    let shop = shops.first().unwrap();
    assert_eq!(shop.id, ShopId::new("3"));
    assert_eq!(
        shop.hours_label(DayOfWeek::new(1).unwrap()),
        "Open today: 08:00 - 16:00"
    );
}

#[tokio::test]
async fn test_assigned_products_request() {
    let (server, client) = setup().await;
    server.respond_with(
        Method::GET,
        "/rest/v1/shop_products",
        StatusCode::OK,
        r#"[{
            "shop_id": "s1",
            "product_id": "p1",
            "last_verified_at": "2025-06-01T09:30:00.123+00:00",
            "product": {"id": "p1", "name": "Oat Milk", "image_path": "dairy/oat.png"}
        }]"#,
    );

    let rows = client.assigned_products(&ShopId::new("s1")).await.unwrap();

    let request = only_request(&server);
    assert_eq!(
        request.query,
        vec![
            pair("select", "*,product:products(*)"),
            pair("shop_id", "eq.s1"),
        ]
    );
    let row = rows.first().unwrap();
    assert_eq!(row.product.name, "Oat Milk");
    assert!(row.last_verified_at.is_some());
}

#[tokio::test]
async fn test_products_excluding_uses_not_in_and_falls_back_when_empty() {
    let (server, client) = setup().await;

    client
        .products_excluding(&[ProductId::new("p1"), ProductId::new("p2")])
        .await
        .unwrap();
    client.products_excluding(&[]).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests.first().unwrap().query,
        vec![pair("select", "*"), pair("id", "not.in.(p1,p2)")]
    );
    assert_eq!(requests.get(1).unwrap().query, vec![pair("select", "*")]);
}

#[tokio::test]
async fn test_writes_target_the_association() {
    let (server, client) = setup().await;
    let shop = ShopId::new("s1");
    let product = ProductId::new("p9");
    let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    client.add_product(&shop, &product, at).await.unwrap();
    client.set_last_verified(&shop, &product, None).await.unwrap();
    client.remove_product(&shop, &product).await.unwrap();

    let requests = server.requests();
    let [insert, update, delete] = requests.as_slice() else {
        panic!("expected three requests: {requests:?}");
    };

    assert_eq!(insert.method, Method::POST);
    assert_eq!(insert.path, "/rest/v1/shop_products");
    assert_eq!(
        insert.body,
        Some(serde_json::json!({
            "shop_id": "s1",
            "product_id": "p9",
            "last_verified_at": "2025-06-01T12:00:00.000Z",
        }))
    );
    assert_eq!(
        insert.headers.get("prefer").map(String::as_str),
        Some("return=minimal")
    );

    let by_both_keys = vec![pair("product_id", "eq.p9"), pair("shop_id", "eq.s1")];
    assert_eq!(update.method, Method::PATCH);
    assert_eq!(update.query, by_both_keys);
    assert_eq!(
        update.body,
        Some(serde_json::json!({ "last_verified_at": null }))
    );

    assert_eq!(delete.method, Method::DELETE);
    assert_eq!(delete.query, by_both_keys);
}

#[tokio::test]
async fn test_backend_errors_become_store_errors() {
    let (server, client) = setup().await;
    server.respond_with(
        Method::POST,
        "/rest/v1/shop_products",
        StatusCode::CONFLICT,
        r#"{"code":"23505","details":null,"hint":null,"message":"duplicate key value violates unique constraint"}"#,
    );
    server.respond_with(
        Method::GET,
        "/rest/v1/products",
        StatusCode::UNAUTHORIZED,
        r#"{"message":"Invalid API key"}"#,
    );

    let err = client
        .add_product(&ShopId::new("s1"), &ProductId::new("p1"), Utc::now())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::rejected(409, "duplicate key value violates unique constraint")
    );

    let err = client.all_products().await.unwrap_err();
    assert_eq!(err, StoreError::rejected(401, "Invalid API key"));
}

#[tokio::test]
async fn test_malformed_rows_are_decode_errors() {
    let (server, client) = setup().await;
    server.respond_with(
        Method::GET,
        "/rest/v1/shops",
        StatusCode::OK,
        r#"[{"id": 1, "name": "No coordinates"}]"#,
    );

    let err = client.list_shops().await.unwrap_err();
    assert!(matches!(err, StoreError::Decode { .. }), "{err:?}");
}
