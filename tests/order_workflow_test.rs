mod common;

use assert_matches::assert_matches;
use bookstore_api::entities::order::OrderStatus;
use bookstore_api::errors::ServiceError;
use bookstore_api::services::books::UpdateBookInput;
use bookstore_api::services::carts::AddToCartInput;
use bookstore_api::services::orders::CreateOrderInput;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn shipping() -> CreateOrderInput {
    CreateOrderInput {
        shipping_address: "123 Main St".to_string(),
    }
}

#[tokio::test]
async fn order_total_is_exact_decimal_arithmetic() {
    let app = common::setup().await;
    let user = common::register_user(&app, "buyer@example.com").await;
    let a = common::seed_book(&app, "Dune", "Frank Herbert", "9780441172719", dec!(20.00)).await;
    let b = common::seed_book(&app, "Emma", "Jane Austen", "9780141439587", dec!(9.99)).await;

    for (book, quantity) in [(&a, 2), (&b, 1)] {
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

    let order = app
        .services
        .orders
        .create_order(user.id, shipping())
        .await
        .expect("create order");

    assert_eq!(order.order.status, OrderStatus::Pending);
    assert_eq!(order.order.total, dec!(49.99));
    assert_eq!(order.items.len(), 2);
}

#[tokio::test]
async fn order_captures_price_at_purchase_time() {
    let app = common::setup().await;
    let user = common::register_user(&app, "buyer@example.com").await;
    let book = common::seed_book(&app, "Dune", "Frank Herbert", "9780441172719", dec!(20.00)).await;

    app.services
        .carts
        .add_item(
            user.id,
            AddToCartInput {
                book_id: book.book.id,
                quantity: 3,
            },
        )
        .await
        .expect("add item");

    let order = app
        .services
        .orders
        .create_order(user.id, shipping())
        .await
        .expect("create order");
    assert_eq!(order.order.total, dec!(60.00));
    assert_eq!(order.order.shipping_address, "123 Main St");
    assert_eq!(order.items[0].price, dec!(20.00));

    // A later catalog price change must not touch the snapshot.
    app.services
        .books
        .update_book(
            book.book.id,
            UpdateBookInput {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                isbn: "9780441172719".to_string(),
                price: dec!(35.00),
                description: None,
                cover_image: None,
                category_ids: Vec::new(),
            },
        )
        .await
        .expect("raise the price");

    let reread = app
        .services
        .orders
        .get_order(order.order.id)
        .await
        .expect("reread order");
    assert_eq!(reread.order.total, dec!(60.00));
    assert_eq!(reread.items[0].price, dec!(20.00));
}

#[tokio::test]
async fn cart_is_left_untouched_by_order_placement() {
    let app = common::setup().await;
    let user = common::register_user(&app, "buyer@example.com").await;
    let book = common::seed_book(&app, "Dune", "Frank Herbert", "9780441172719", dec!(20.00)).await;

    app.services
        .carts
        .add_item(
            user.id,
            AddToCartInput {
                book_id: book.book.id,
                quantity: 3,
            },
        )
        .await
        .expect("add item");

    app.services
        .orders
        .create_order(user.id, shipping())
        .await
        .expect("create order");

    let cart = app.services.carts.get_cart(user.id).await.expect("get cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
}

#[tokio::test]
async fn status_update_is_reflected_on_next_read() {
    let app = common::setup().await;
    let user = common::register_user(&app, "buyer@example.com").await;
    let book = common::seed_book(&app, "Emma", "Jane Austen", "9780141439587", dec!(8.00)).await;

    app.services
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
    let order = app
        .services
        .orders
        .create_order(user.id, shipping())
        .await
        .expect("create order");

    app.services
        .orders
        .update_order_status(order.order.id, OrderStatus::Completed)
        .await
        .expect("update status");

    let reread = app
        .services
        .orders
        .get_order(order.order.id)
        .await
        .expect("reread order");
    assert_eq!(reread.order.status, OrderStatus::Completed);
}

#[tokio::test]
async fn status_update_for_unknown_order_is_not_found() {
    let app = common::setup().await;

    let err = app
        .services
        .orders
        .update_order_status(Uuid::new_v4(), OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn order_for_a_user_without_a_cart_is_not_found() {
    let app = common::setup().await;

    let err = app
        .services
        .orders
        .create_order(Uuid::new_v4(), shipping())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn order_items_are_scoped_to_their_order() {
    let app = common::setup().await;
    let user = common::register_user(&app, "buyer@example.com").await;
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
    let order = app
        .services
        .orders
        .create_order(user.id, shipping())
        .await
        .expect("create order");

    let items = app
        .services
        .orders
        .get_order_items(order.order.id)
        .await
        .expect("list items");
    assert_eq!(items.len(), 1);

    let item = app
        .services
        .orders
        .get_order_item(order.order.id, items[0].id)
        .await
        .expect("single item");
    assert_eq!(item.quantity, 2);
    assert_eq!(item.price, dec!(8.00));

    let err = app
        .services
        .orders
        .get_order_item(order.order.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn order_listing_is_scoped_to_the_user() {
    let app = common::setup().await;
    let buyer = common::register_user(&app, "buyer@example.com").await;
    let other = common::register_user(&app, "other@example.com").await;
    let book = common::seed_book(&app, "Emma", "Jane Austen", "9780141439587", dec!(8.00)).await;

    app.services
        .carts
        .add_item(
            buyer.id,
            AddToCartInput {
                book_id: book.book.id,
                quantity: 1,
            },
        )
        .await
        .expect("add item");
    app.services
        .orders
        .create_order(buyer.id, shipping())
        .await
        .expect("create order");

    let (orders, total) = app
        .services
        .orders
        .list_orders_for_user(buyer.id, 1, 20)
        .await
        .expect("list buyer orders");
    assert_eq!(total, 1);
    assert_eq!(orders.len(), 1);

    let (orders, total) = app
        .services
        .orders
        .list_orders_for_user(other.id, 1, 20)
        .await
        .expect("list other orders");
    assert_eq!(total, 0);
    assert!(orders.is_empty());
}
