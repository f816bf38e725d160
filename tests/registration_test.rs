mod common;

use assert_matches::assert_matches;
use bookstore_api::errors::ServiceError;
use bookstore_api::services::users::RegisterInput;

fn input(email: &str, password: &str, repeat: &str) -> RegisterInput {
    RegisterInput {
        email: email.to_string(),
        password: password.to_string(),
        repeat_password: repeat.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        shipping_address: None,
    }
}

#[tokio::test]
async fn registration_creates_exactly_one_empty_cart() {
    let app = common::setup().await;

    let user = common::register_user(&app, "ada@example.com").await;

    let cart = app
        .services
        .carts
        .get_cart(user.id)
        .await
        .expect("cart exists right after registration");
    assert_eq!(cart.cart.id, user.id);
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = common::setup().await;

    common::register_user(&app, "ada@example.com").await;
    let err = app
        .services
        .users
        .register(input("ada@example.com", "long-enough-pw", "long-enough-pw"))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn mismatched_passwords_fail_validation() {
    let app = common::setup().await;

    let err = app
        .services
        .users
        .register(input("ada@example.com", "long-enough-pw", "different-pw"))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn malformed_email_fails_validation() {
    let app = common::setup().await;

    let err = app
        .services
        .users
        .register(input("not-an-email", "long-enough-pw", "long-enough-pw"))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn response_never_leaks_the_password_hash() {
    let app = common::setup().await;

    let user = common::register_user(&app, "ada@example.com").await;
    let json = serde_json::to_value(&user).expect("serialize response");

    assert!(json.get("password_hash").is_none());
    assert_eq!(json["email"], "ada@example.com");
}
