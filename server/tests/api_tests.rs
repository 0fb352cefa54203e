// server/tests/api_tests.rs

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use coinslot::MemoryStore;
use coinslot_server::{configure_app, AppConfig, AppState};
use serde_json::{json, Value};
use serial_test::serial;
use std::sync::Arc;

fn test_state() -> AppState {
  let config = AppConfig::from_source(|_| None).expect("default config");
  AppState::new(Arc::new(MemoryStore::new()), &config)
}

// Sends a request and returns the status with the decoded JSON body (Null when empty).
macro_rules! send {
  ($app:expr, $req:expr) => {{
    let resp = test::call_service(&$app, $req.to_request()).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body: Value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
  }};
}

macro_rules! init_app {
  () => {
    test::init_service(
      App::new()
        .app_data(web::Data::new(test_state()))
        .configure(configure_app),
    )
    .await
  };
}

fn bearer(token: &str) -> (header::HeaderName, String) {
  (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Registers and logs in; returns (user id, token).
macro_rules! sign_up {
  ($app:expr, $username:expr, $role:expr) => {{
    let (status, user) = send!(
      $app,
      test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({"username": $username, "password": "secret123", "role": $role}))
    );
    assert_eq!(status, StatusCode::CREATED, "register {}: {}", $username, user);
    let (status, login) = send!(
      $app,
      test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"username": $username, "password": "secret123"}))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["userId"], user["id"]);
    (
      user["id"].as_str().unwrap().to_string(),
      login["token"].as_str().unwrap().to_string(),
    )
  }};
}

#[actix_rt::test]
#[serial]
async fn test_health() {
  let app = init_app!();
  let (status, body) = send!(app, test::TestRequest::get().uri("/api/v1/health"));
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({"status": "ok"}));
}

#[actix_rt::test]
#[serial]
async fn test_register_login_deposit_buy() {
  let app = init_app!();
  let (seller_id, seller_token) = sign_up!(app, "sam", "seller");
  let (_buyer_id, buyer_token) = sign_up!(app, "bea", "buyer");

  let (status, product) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/products")
      .insert_header(bearer(&seller_token))
      .set_json(json!({"name": "Test Soda", "cost": 50, "quantity": 5}))
  );
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(product["sellerId"], seller_id.as_str());
  let product_id = product["id"].as_str().unwrap().to_string();

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/vending/deposit")
      .insert_header(bearer(&buyer_token))
      .set_json(json!({"amount": 100}))
  );
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "your deposit is 100 and you currently have 100");

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/vending/buy")
      .insert_header(bearer(&buyer_token))
      .set_json(json!({"productId": product_id, "quantity": 1}))
  );
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    body,
    json!({"totalSpent": 50, "productPurchased": "Test Soda", "quantity": 1, "change": 50})
  );

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/vending/buy")
      .insert_header(bearer(&buyer_token))
      .set_json(json!({"productId": product_id, "quantity": 10}))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "PRODUCT_INSUFFICIENT_QUANTITY");

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/vending/buy")
      .insert_header(bearer(&buyer_token))
      .set_json(json!({"productId": product_id, "quantity": 2}))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "USER_INSUFFICIENT_DEPOSIT");

  let (status, body) = send!(
    app,
    test::TestRequest::get()
      .uri(&format!("/api/v1/products/{}", product_id))
      .insert_header(bearer(&buyer_token))
  );
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["quantity"], 4);

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/vending/reset")
      .insert_header(bearer(&buyer_token))
  );
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "your deposit is reset");
}

#[actix_rt::test]
#[serial]
async fn test_requests_without_a_valid_token_are_unauthorized() {
  let app = init_app!();
  let (buyer_id, buyer_token) = sign_up!(app, "bea", "buyer");

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/vending/deposit")
      .set_json(json!({"amount": 5}))
  );
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["error"], "UNAUTHORIZED");

  for value in ["Bearer not-a-token", "Basic YWxhZGRpbjpvcGVuc2VzYW1l", "Bearer "] {
    let (status, _) = send!(
      app,
      test::TestRequest::get()
        .uri("/api/v1/products")
        .insert_header((header::AUTHORIZATION, value))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED, "accepted {:?}", value);
  }

  // A token outlives its user only until the next request.
  let (status, _) = send!(
    app,
    test::TestRequest::delete()
      .uri(&format!("/api/v1/users/{}", buyer_id))
      .insert_header(bearer(&buyer_token))
  );
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send!(
    app,
    test::TestRequest::get()
      .uri("/api/v1/users")
      .insert_header(bearer(&buyer_token))
  );
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
#[serial]
async fn test_token_is_checked_before_the_request_body() {
  let app = init_app!();
  let (_, buyer_token) = sign_up!(app, "bea", "buyer");

  // Malformed bodies and paths from an anonymous caller never reach the parsers.
  let anonymous = [
    test::TestRequest::post()
      .uri("/api/v1/vending/buy")
      .set_json(json!({"quantity": "x"})),
    test::TestRequest::post()
      .uri("/api/v1/vending/deposit")
      .insert_header((header::CONTENT_TYPE, "application/json"))
      .set_payload("{not json"),
    test::TestRequest::post()
      .uri("/api/v1/products")
      .set_json(json!({"cost": "free"})),
    test::TestRequest::put()
      .uri("/api/v1/products/not-a-uuid")
      .set_json(json!({"quantity": -1})),
    test::TestRequest::put()
      .uri("/api/v1/users/not-a-uuid")
      .set_json(json!({"role": "seller"})),
  ];
  for req in anonymous {
    let (status, body) = send!(app, req);
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", body);
    assert_eq!(body["error"], "UNAUTHORIZED");
  }

  // The same body from an authenticated caller is a validation failure.
  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/vending/buy")
      .insert_header(bearer(&buyer_token))
      .set_json(json!({"quantity": "x"}))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[actix_rt::test]
#[serial]
async fn test_login_rejects_wrong_password_and_unknown_user() {
  let app = init_app!();
  sign_up!(app, "bea", "buyer");

  for (username, password) in [("bea", "wrong-password"), ("nobody", "secret123")] {
    let (status, body) = send!(
      app,
      test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_json(json!({"username": username, "password": password}))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid username or password.");
  }
}

#[actix_rt::test]
#[serial]
async fn test_invalid_input_yields_validation_errors() {
  let app = init_app!();
  let (_, buyer_token) = sign_up!(app, "bea", "buyer");

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/users")
      .set_json(json!({"username": "al", "password": "123", "role": "buyer"}))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "VALIDATION_ERROR");
  assert_eq!(body["details"][0]["field"], "password");

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/users")
      .insert_header((header::CONTENT_TYPE, "application/json"))
      .set_payload("{not json")
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "VALIDATION_ERROR");

  let (status, body) = send!(
    app,
    test::TestRequest::get()
      .uri("/api/v1/products/not-a-uuid")
      .insert_header(bearer(&buyer_token))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "VALIDATION_ERROR");

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/vending/deposit")
      .insert_header(bearer(&buyer_token))
      .set_json(json!({"amount": 7}))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "INVALID_DEPOSIT_AMOUNT");
}

#[actix_rt::test]
#[serial]
async fn test_roles_are_enforced() {
  let app = init_app!();
  let (_, seller_token) = sign_up!(app, "sam", "seller");
  let (_, buyer_token) = sign_up!(app, "bea", "buyer");

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/vending/deposit")
      .insert_header(bearer(&seller_token))
      .set_json(json!({"amount": 5}))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "USER_INSUFFICIENT_TYPE");

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/products")
      .insert_header(bearer(&buyer_token))
      .set_json(json!({"name": "Water", "cost": 5, "quantity": 1}))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "USER_INSUFFICIENT_TYPE");
}

#[actix_rt::test]
#[serial]
async fn test_user_accounts_are_self_service() {
  let app = init_app!();
  let (alice_id, alice_token) = sign_up!(app, "alice", "buyer");
  let (_, bob_token) = sign_up!(app, "bob", "buyer");

  let (status, body) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/users")
      .set_json(json!({"username": "alice", "password": "secret123", "role": "seller"}))
  );
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"], "USERNAME_TAKEN");

  let (status, body) = send!(
    app,
    test::TestRequest::put()
      .uri(&format!("/api/v1/users/{}", alice_id))
      .insert_header(bearer(&bob_token))
      .set_json(json!({"username": "mallory"}))
  );
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["error"], "FORBIDDEN");

  let (status, body) = send!(
    app,
    test::TestRequest::put()
      .uri(&format!("/api/v1/users/{}", alice_id))
      .insert_header(bearer(&alice_token))
      .set_json(json!({"balance": 1000}))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "VALIDATION_ERROR");

  let (status, body) = send!(
    app,
    test::TestRequest::put()
      .uri(&format!("/api/v1/users/{}", alice_id))
      .insert_header(bearer(&alice_token))
      .set_json(json!({"username": "alicia"}))
  );
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["username"], "alicia");
  assert_eq!(body["balance"], 0);
  assert!(body.get("passwordHash").is_none());

  let (status, body) = send!(
    app,
    test::TestRequest::get()
      .uri(&format!("/api/v1/users/{}", uuid::Uuid::new_v4()))
      .insert_header(bearer(&alice_token))
  );
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "USER_NOT_FOUND");
}

#[actix_rt::test]
#[serial]
async fn test_only_the_owner_changes_a_product() {
  let app = init_app!();
  let (_, owner_token) = sign_up!(app, "sam", "seller");
  let (_, rival_token) = sign_up!(app, "sue", "seller");

  let (_, product) = send!(
    app,
    test::TestRequest::post()
      .uri("/api/v1/products")
      .insert_header(bearer(&owner_token))
      .set_json(json!({"name": "Cola", "cost": 10, "quantity": 3}))
  );
  let uri = format!("/api/v1/products/{}", product["id"].as_str().unwrap());

  let (status, body) = send!(
    app,
    test::TestRequest::put()
      .uri(&uri)
      .insert_header(bearer(&rival_token))
      .set_json(json!({"cost": 1}))
  );
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "PRODUCT_INSUFFICIENT_OWNER");

  let (status, body) = send!(
    app,
    test::TestRequest::put()
      .uri(&uri)
      .insert_header(bearer(&owner_token))
      .set_json(json!({"cost": 15}))
  );
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({"modifiedCount": 1}));

  let (status, body) = send!(
    app,
    test::TestRequest::get()
      .uri("/api/v1/products?name=Cola")
      .insert_header(bearer(&rival_token))
  );
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body[0]["cost"], 15);

  let (status, body) = send!(
    app,
    test::TestRequest::delete().uri(&uri).insert_header(bearer(&owner_token))
  );
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({"deletedCount": 1}));

  let (status, body) = send!(app, test::TestRequest::get().uri(&uri).insert_header(bearer(&owner_token)));
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "PRODUCT_NOT_FOUND");
}
