mod common;

use assert_matches::assert_matches;
use bookstore_api::errors::ServiceError;
use bookstore_api::services::carts::{AddToCartInput, UpdateCartItemInput};
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::test]
async fn adding_to_an_empty_cart_creates_one_line() {
    let app = common::setup().await;
    let user = common::register_user(&app, "reader@example.com").await;
    let book = common::seed_book(&app, "Dune", "Frank Herbert", "9780441172719", dec!(12.50)).await;

    let cart = app
        .services
        .carts
        .add_item(
            user.id,
            AddToCartInput {
                book_id: book.book.id,
                quantity: 5,
            },
        )
        .await
        .expect("add item");

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].book_id, book.book.id);
    assert_eq!(cart.items[0].quantity, 5);
}

#[tokio::test]
async fn adding_the_same_book_twice_keeps_two_lines() {
    let app = common::setup().await;
    let user = common::register_user(&app, "reader@example.com").await;
    let book = common::seed_book(&app, "Dune", "Frank Herbert", "9780441172719", dec!(12.50)).await;

    for quantity in [1, 2] {
        app.services
            .carts
            .add_item(
                user.id,
                AddToCartInput {
                    book_id: book.book.id,
                    quantity,
                },
            )
            .await
            .expect("add item");
    }

    let cart = app.services.carts.get_cart(user.id).await.expect("get cart");
    assert_eq!(cart.items.len(), 2, "quantities must not be merged");
    let mut quantities: Vec<i32> = cart.items.iter().map(|i| i.quantity).collect();
    quantities.sort_unstable();
    assert_eq!(quantities, vec![1, 2]);
}

#[tokio::test]
async fn quantity_update_is_visible_on_next_read() {
    let app = common::setup().await;
    let user = common::register_user(&app, "reader@example.com").await;
    let book = common::seed_book(&app, "Emma", "Jane Austen", "9780141439587", dec!(8.00)).await;

    let cart = app
        .services
        .carts
        .add_item(
            user.id,
            AddToCartInput {
                book_id: book.book.id,
                quantity: 1,
            },
        )
        .await
        .expect("add item");
    let item_id = cart.items[0].id;

    let cart = app
        .services
        .carts
        .update_item_quantity(user.id, item_id, UpdateCartItemInput { quantity: 7 })
        .await
        .expect("update quantity");

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 7);
}

#[tokio::test]
async fn removing_a_missing_item_is_not_found_and_leaves_cart_unchanged() {
    let app = common::setup().await;
    let user = common::register_user(&app, "reader@example.com").await;
    let book = common::seed_book(&app, "Emma", "Jane Austen", "9780141439587", dec!(8.00)).await;

    app.services
        .carts
        .add_item(
            user.id,
            AddToCartInput {
                book_id: book.book.id,
                quantity: 2,
            },
        )
        .await
        .expect("add item");

    let err = app
        .services
        .carts
        .remove_item(user.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let cart = app.services.carts.get_cart(user.id).await.expect("get cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);
}

#[tokio::test]
async fn removing_an_item_empties_the_line() {
    let app = common::setup().await;
    let user = common::register_user(&app, "reader@example.com").await;
    let book = common::seed_book(&app, "Emma", "Jane Austen", "9780141439587", dec!(8.00)).await;

    let cart = app
        .services
        .carts
        .add_item(
            user.id,
            AddToCartInput {
                book_id: book.book.id,
                quantity: 2,
            },
        )
        .await
        .expect("add item");

    let cart = app
        .services
        .carts
        .remove_item(user.id, cart.items[0].id)
        .await
        .expect("remove item");
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn unknown_cart_is_not_found() {
    let app = common::setup().await;

    let err = app.services.carts.get_cart(Uuid::new_v4()).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn soft_deleted_book_cannot_be_added() {
    let app = common::setup().await;
    let user = common::register_user(&app, "reader@example.com").await;
    let book = common::seed_book(&app, "Dune", "Frank Herbert", "9780441172719", dec!(12.50)).await;

    app.services
        .books
        .delete_book(book.book.id)
        .await
        .expect("soft delete");

    let err = app
        .services
        .carts
        .add_item(
            user.id,
            AddToCartInput {
                book_id: book.book.id,
                quantity: 1,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}
