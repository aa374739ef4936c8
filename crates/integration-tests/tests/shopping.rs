//! Catalog, cart, wishlist, review, address and order flow tests.
//!
//! These tests require a running API server and a seeded catalog
//! (`bazaar-cli seed crates/cli/seed/catalog.yaml`). Admin flows also need
//! the database URL to promote their test user.

use bazaar_integration_tests::{
    TestUser, any_product_id, base_url, client, pool, total_count, unique_name,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_product_listing_sets_total_count() {
    let resp = client()
        .get(format!("{}/products?page=1&limit=2&sort=price&order=asc", base_url()))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), StatusCode::OK);
    let total: i64 = resp
        .headers()
        .get("x-total-count")
        .expect("No X-Total-Count header")
        .to_str()
        .expect("Header is not ASCII")
        .parse()
        .expect("Header is not a number");

    let products: Vec<Value> = resp.json().await.expect("Body is not JSON");
    assert!(products.len() <= 2);
    assert!(total >= i64::try_from(products.len()).unwrap_or(i64::MAX));

    if let [first, second, ..] = products.as_slice() {
        assert!(first["price"].as_f64() <= second["price"].as_f64());
        assert!(first["brand"]["name"].is_string());
        assert!(first["category"]["name"].is_string());
    }
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_bad_product_query_is_rejected() {
    let resp = client()
        .get(format!("{}/products?sort=colour", base_url()))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_cart_flow() {
    let user = TestUser::signup().await;
    let product = any_product_id(&user.client).await;

    let resp = user.post("/cart", &json!({"product": product})).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let line: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(line["quantity"], 1);
    assert_eq!(line["product"]["_id"], product);

    // Adding the same product again raises the quantity of the same line.
    let resp = user.post("/cart", &json!({"product": product, "quantity": 2})).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let again: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(again["_id"], line["_id"]);
    assert_eq!(again["quantity"], 3);

    let line_id = line["_id"].as_i64().expect("Line has no _id");
    let resp = user.patch(&format!("/cart/{line_id}"), &json!({"quantity": 5})).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = user.patch(&format!("/cart/{line_id}"), &json!({"quantity": 0})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let lines: Vec<Value> = user
        .get(&format!("/cart/user/{}", user.id))
        .await
        .json()
        .await
        .expect("Body is not JSON");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 5);

    let resp = user.delete(&format!("/cart/user/{}", user.id)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let lines: Vec<Value> = user
        .get(&format!("/cart/user/{}", user.id))
        .await
        .json()
        .await
        .expect("Body is not JSON");
    assert!(lines.is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_cart_requires_login() {
    let product = any_product_id(&client()).await;

    let resp = client()
        .post(format!("{}/cart", base_url()))
        .json(&json!({"product": product}))
        .send()
        .await
        .expect("Failed to add to cart");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_wishlist_flow() {
    let user = TestUser::signup().await;
    let product = any_product_id(&user.client).await;

    let resp = user
        .post("/wishlist", &json!({"product": product, "note": "  birthday  "}))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let item: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(item["note"], "birthday");

    let resp = user.post("/wishlist", &json!({"product": product})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = user.get(&format!("/wishlist/user/{}", user.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("x-total-count").expect("No X-Total-Count header"),
        "1"
    );

    let item_id = item["_id"].as_i64().expect("Item has no _id");
    let resp = user.delete(&format!("/wishlist/{item_id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(deleted["_id"], item_id);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_order_total_is_computed_server_side() {
    let user = TestUser::signup().await;
    let product = any_product_id(&user.client).await;

    let resp = user
        .post(
            "/orders",
            &json!({
                "items": [{"product": product, "quantity": 2}],
                "address": {
                    "street": "1 Main St",
                    "city": "Springfield",
                    "state": "IL",
                    "phoneNumber": "5551234567",
                    "postalCode": "62701",
                    "country": "US",
                    "type": "home"
                },
                "paymentMode": "COD",
                "total": 0.01
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let order: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["items"][0]["quantity"], 2);
    assert_eq!(order["total"], order["items"][0]["lineTotal"]);

    let orders: Vec<Value> = user
        .get(&format!("/orders/user/{}", user.id))
        .await
        .json()
        .await
        .expect("Body is not JSON");
    assert_eq!(orders.len(), 1);
}

fn address() -> Value {
    json!({
        "street": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "phoneNumber": "5551234567",
        "postalCode": "62701",
        "country": "US",
        "type": "home"
    })
}

fn id_of(body: &Value) -> i64 {
    body["_id"].as_i64().expect("Body has no _id")
}

/// Create a fresh brand, category and product as `admin`.
async fn create_product(admin: &TestUser, price: f64) -> (i64, i64) {
    let brand: Value = admin
        .post("/brands", &json!({"name": unique_name("brand")}))
        .await
        .json()
        .await
        .expect("Body is not JSON");
    let category: Value = admin
        .post("/categories", &json!({"name": unique_name("category")}))
        .await
        .json()
        .await
        .expect("Body is not JSON");

    let resp = admin
        .post(
            "/products",
            &json!({
                "title": "Test Lamp",
                "description": "Lights things",
                "price": price,
                "discountPercentage": 10,
                "category": id_of(&category),
                "brand": id_of(&brand),
                "stockQuantity": 5,
                "thumbnail": "https://cdn.example.com/lamp.png"
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let product: Value = resp.json().await.expect("Body is not JSON");
    (id_of(&product), id_of(&brand))
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_brand_and_category_creation() {
    let pool = pool().await;
    let admin = TestUser::admin(&pool).await;
    let shopper = TestUser::signup().await;
    let name = unique_name("brand");

    let resp = shopper.post("/brands", &json!({"name": name})).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = admin.post("/brands", &json!({"name": name})).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = admin.post("/brands", &json!({"name": name})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let brands: Vec<Value> = client()
        .get(format!("{}/brands", base_url()))
        .send()
        .await
        .expect("Failed to list brands")
        .json()
        .await
        .expect("Body is not JSON");
    assert!(brands.iter().any(|b| b["name"] == name.as_str()));

    let category = unique_name("category");
    let resp = admin.post("/categories", &json!({"name": category})).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = admin.post("/categories", &json!({"name": category})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_admin_product_lifecycle() {
    let pool = pool().await;
    let admin = TestUser::admin(&pool).await;
    let shopper = TestUser::signup().await;
    let (product, brand) = create_product(&admin, 40.0).await;

    let resp = shopper.patch(&format!("/products/{product}"), &json!({"price": 1})).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = admin
        .patch(&format!("/products/{product}"), &json!({"price": 35.5}))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(updated["price"], 35.5);

    let resp = admin.delete(&format!("/products/{product}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(deleted["isDeleted"], true);

    // Storefront listings hide deleted products; admin listings keep them.
    let resp = shopper.get(&format!("/products?brand={brand}&user=true")).await;
    assert_eq!(total_count(&resp), 0);
    let resp = admin.get(&format!("/products?brand={brand}")).await;
    assert_eq!(total_count(&resp), 1);

    let resp = shopper.post("/cart", &json!({"product": product})).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = admin
        .patch(&format!("/products/undelete/{product}"), &json!({}))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = shopper.get(&format!("/products?brand={brand}&user=true")).await;
    assert_eq!(total_count(&resp), 1);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_review_flow() {
    let pool = pool().await;
    let admin = TestUser::admin(&pool).await;
    let author = TestUser::signup().await;
    let stranger = TestUser::signup().await;
    let (product, _) = create_product(&admin, 20.0).await;

    let resp = author
        .post("/reviews", &json!({"product": product, "rating": 6, "comment": "Too good"}))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = author
        .post("/reviews", &json!({"product": product, "rating": 4, "comment": "Bright"}))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let review: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(review["user"]["_id"], author.id);
    let review_id = id_of(&review);

    let resp = client()
        .get(format!("{}/reviews/product/{product}", base_url()))
        .send()
        .await
        .expect("Failed to list reviews");
    assert_eq!(total_count(&resp), 1);

    // Only the author may edit, admins included.
    let edit = json!({"rating": 1, "comment": "rewritten"});
    let resp = stranger.patch(&format!("/reviews/{review_id}"), &edit).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = admin.patch(&format!("/reviews/{review_id}"), &edit).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = author
        .patch(&format!("/reviews/{review_id}"), &json!({"rating": 5}))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let edited: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(edited["rating"], 5);
    assert_eq!(edited["comment"], "Bright");

    let resp = stranger.delete(&format!("/reviews/{review_id}")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = admin.delete(&format!("/reviews/{review_id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_address_flow() {
    let pool = pool().await;
    let owner = TestUser::signup().await;
    let admin = TestUser::admin(&pool).await;

    let resp = owner.post("/address", &address()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.expect("Body is not JSON");
    let address_id = id_of(&created);
    assert_eq!(created["phoneNumber"], "5551234567");

    let resp = owner
        .patch(&format!("/address/{address_id}"), &json!({"city": "Shelbyville"}))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(updated["city"], "Shelbyville");
    assert_eq!(updated["street"], "1 Main St");

    // Admins can see a user's addresses but not change them.
    let resp = admin.get(&format!("/address/user/{}", owner.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = admin
        .patch(&format!("/address/{address_id}"), &json!({"city": "Capital City"}))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = admin.delete(&format!("/address/{address_id}")).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = owner.delete(&format!("/address/{address_id}")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let addresses: Vec<Value> = owner
        .get(&format!("/address/user/{}", owner.id))
        .await
        .json()
        .await
        .expect("Body is not JSON");
    assert!(addresses.is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server, database and seeded catalog"]
async fn test_cart_and_wishlist_lines_are_owner_only() {
    let pool = pool().await;
    let owner = TestUser::signup().await;
    let admin = TestUser::admin(&pool).await;
    let product = any_product_id(&owner.client).await;

    let line: Value = owner
        .post("/cart", &json!({"product": product}))
        .await
        .json()
        .await
        .expect("Body is not JSON");
    let item: Value = owner
        .post("/wishlist", &json!({"product": product}))
        .await
        .json()
        .await
        .expect("Body is not JSON");

    let resp = admin.get(&format!("/cart/user/{}", owner.id)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = admin
        .patch(&format!("/cart/{}", id_of(&line)), &json!({"quantity": 9}))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = admin.delete(&format!("/cart/{}", id_of(&line))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = admin
        .patch(&format!("/wishlist/{}", id_of(&item)), &json!({"note": "mine now"}))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = admin.delete(&format!("/wishlist/{}", id_of(&item))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = owner.delete(&format!("/cart/{}", id_of(&line))).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded catalog"]
async fn test_oversized_quantities_are_rejected() {
    let user = TestUser::signup().await;
    let product = any_product_id(&user.client).await;

    let resp = user
        .post("/cart", &json!({"product": product, "quantity": i32::MAX}))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Repeated adds stop at the per-line maximum.
    for _ in 0..2 {
        let resp = user
            .post("/cart", &json!({"product": product, "quantity": 10_000}))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
    let lines: Vec<Value> = user
        .get(&format!("/cart/user/{}", user.id))
        .await
        .json()
        .await
        .expect("Body is not JSON");
    assert_eq!(lines[0]["quantity"], 10_000);

    let resp = user
        .post(
            "/orders",
            &json!({
                "items": [{"product": product, "quantity": 10_001}],
                "address": address(),
                "paymentMode": "UPI"
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_order_total_beyond_storable_range_is_rejected() {
    let pool = pool().await;
    let admin = TestUser::admin(&pool).await;
    let (product, _) = create_product(&admin, 9_999_999.99).await;

    let resp = admin
        .post(
            "/orders",
            &json!({
                "items": [{"product": product, "quantity": 10_000}],
                "address": address(),
                "paymentMode": "CARD"
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server, database and seeded catalog"]
async fn test_order_status_changes() {
    let pool = pool().await;
    let admin = TestUser::admin(&pool).await;
    let user = TestUser::signup().await;
    let product = any_product_id(&user.client).await;

    let order: Value = user
        .post(
            "/orders",
            &json!({
                "items": [{"product": product, "quantity": 1}],
                "address": address(),
                "paymentMode": "COD"
            }),
        )
        .await
        .json()
        .await
        .expect("Body is not JSON");
    let path = format!("/orders/{}", id_of(&order));

    let resp = user.patch(&path, &json!({"status": "Dispatched"})).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = admin.patch(&path, &json!({"status": "Dispatched"})).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let dispatched: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(dispatched["status"], "Dispatched");

    let resp = admin.patch(&path, &json!({"status": "Pending"})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = admin.patch(&path, &json!({"status": "Out for delivery"})).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = admin.get("/orders?page=1&limit=5").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(total_count(&resp) >= 1);
}
