mod common;

use assert_matches::assert_matches;
use bookstore_api::errors::ServiceError;
use bookstore_api::services::books::UpdateBookInput;
use bookstore_api::services::categories::CategoryInput;
use rust_decimal_macros::dec;

#[tokio::test]
async fn isbn_must_be_unique_among_live_books() {
    let app = common::setup().await;
    common::seed_book(&app, "Dune", "Frank Herbert", "9780441172719", dec!(20.00)).await;

    let err = app
        .services
        .books
        .create_book(bookstore_api::services::books::CreateBookInput {
            title: "Dune (hardcover)".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: "9780441172719".to_string(),
            price: dec!(35.00),
            description: None,
            cover_image: None,
            category_ids: Vec::new(),
        })
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn soft_deleting_a_book_frees_its_isbn() {
    let app = common::setup().await;
    let first = common::seed_book(&app, "Dune", "Frank Herbert", "9780441172719", dec!(20.00)).await;

    app.services
        .books
        .delete_book(first.book.id)
        .await
        .expect("soft delete");

    // The row is retained but no longer blocks the ISBN.
    common::seed_book(&app, "Dune", "Frank Herbert", "9780441172719", dec!(22.00)).await;
}

#[tokio::test]
async fn update_replaces_category_links() {
    let app = common::setup().await;
    let scifi = app
        .services
        .categories
        .create_category(CategoryInput {
            name: "Science Fiction".to_string(),
            description: None,
        })
        .await
        .expect("create category");
    let classics = app
        .services
        .categories
        .create_category(CategoryInput {
            name: "Classics".to_string(),
            description: None,
        })
        .await
        .expect("create category");

    let book = common::seed_book_in_categories(
        &app,
        "Dune",
        "Frank Herbert",
        "9780441172719",
        dec!(20.00),
        vec![scifi.id],
    )
    .await;
    assert_eq!(book.category_ids, vec![scifi.id]);

    let updated = app
        .services
        .books
        .update_book(
            book.book.id,
            UpdateBookInput {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                isbn: "9780441172719".to_string(),
                price: dec!(20.00),
                description: None,
                cover_image: None,
                category_ids: vec![classics.id],
            },
        )
        .await
        .expect("update book");

    assert_eq!(updated.category_ids, vec![classics.id]);
}

#[tokio::test]
async fn books_in_category_excludes_soft_deleted() {
    let app = common::setup().await;
    let scifi = app
        .services
        .categories
        .create_category(CategoryInput {
            name: "Science Fiction".to_string(),
            description: Some("Spaceships and sandworms".to_string()),
        })
        .await
        .expect("create category");

    let dune = common::seed_book_in_categories(
        &app,
        "Dune",
        "Frank Herbert",
        "9780441172719",
        dec!(20.00),
        vec![scifi.id],
    )
    .await;
    common::seed_book_in_categories(
        &app,
        "Hyperion",
        "Dan Simmons",
        "9780553283686",
        dec!(15.00),
        vec![scifi.id],
    )
    .await;

    app.services
        .books
        .delete_book(dune.book.id)
        .await
        .expect("soft delete");

    let (books, total) = app
        .services
        .categories
        .books_in_category(scifi.id, 1, 20)
        .await
        .expect("list category books");
    assert_eq!(total, 1);
    assert_eq!(books[0].title, "Hyperion");
}

#[tokio::test]
async fn deleting_a_category_keeps_its_books() {
    let app = common::setup().await;
    let scifi = app
        .services
        .categories
        .create_category(CategoryInput {
            name: "Science Fiction".to_string(),
            description: None,
        })
        .await
        .expect("create category");
    let book = common::seed_book_in_categories(
        &app,
        "Dune",
        "Frank Herbert",
        "9780441172719",
        dec!(20.00),
        vec![scifi.id],
    )
    .await;

    app.services
        .categories
        .delete_category(scifi.id)
        .await
        .expect("delete category");

    let reread = app
        .services
        .books
        .get_book(book.book.id)
        .await
        .expect("book survives");
    assert!(reread.category_ids.is_empty());
}

#[tokio::test]
async fn unknown_category_ids_are_rejected_on_create() {
    let app = common::setup().await;

    let err = app
        .services
        .books
        .create_book(bookstore_api::services::books::CreateBookInput {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: "9780441172719".to_string(),
            price: dec!(20.00),
            description: None,
            cover_image: None,
            category_ids: vec![uuid::Uuid::new_v4()],
        })
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::InvalidInput(_));
}

#[tokio::test]
async fn negative_price_is_rejected_on_create_and_update() {
    let app = common::setup().await;

    let err = app
        .services
        .books
        .create_book(bookstore_api::services::books::CreateBookInput {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: "9780441172719".to_string(),
            price: dec!(-1.00),
            description: None,
            cover_image: None,
            category_ids: Vec::new(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let book = common::seed_book(&app, "Dune", "Frank Herbert", "9780441172719", dec!(20.00)).await;
    let err = app
        .services
        .books
        .update_book(
            book.book.id,
            UpdateBookInput {
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                isbn: "9780441172719".to_string(),
                price: dec!(-0.01),
                description: None,
                cover_image: None,
                category_ids: Vec::new(),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}
