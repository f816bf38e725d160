mod common;

use bookstore_api::db::book_filter::BookSearchQuery;
use rust_decimal_macros::dec;

async fn seeded() -> common::TestApp {
    let app = common::setup().await;
    common::seed_book(&app, "Dune", "Frank Herbert", "9780441172719", dec!(20.00)).await;
    common::seed_book(&app, "Emma", "Jane Austen", "9780141439587", dec!(9.99)).await;
    common::seed_book(&app, "Persuasion", "Jane Austen", "9780141439686", dec!(14.50)).await;
    app
}

#[tokio::test]
async fn empty_filter_set_matches_everything() {
    let app = seeded().await;

    let (books, total) = app
        .services
        .books
        .search_books(BookSearchQuery::default().into_params(), 1, 20)
        .await
        .expect("search");

    assert_eq!(total, 3);
    assert_eq!(books.len(), 3);
}

#[tokio::test]
async fn title_filter_is_an_in_set_match() {
    let app = seeded().await;

    let query = BookSearchQuery {
        titles: Some("Dune, Emma".to_string()),
        ..Default::default()
    };
    let (books, total) = app
        .services
        .books
        .search_books(query.into_params(), 1, 20)
        .await
        .expect("search");

    assert_eq!(total, 2);
    let mut titles = common::titles_of(&books);
    titles.sort_unstable();
    assert_eq!(titles, vec!["Dune", "Emma"]);
}

#[tokio::test]
async fn price_bounds_are_inclusive() {
    let app = seeded().await;

    let query = BookSearchQuery {
        from_price: Some(dec!(9.99)),
        to_price: Some(dec!(14.50)),
        ..Default::default()
    };
    let (books, total) = app
        .services
        .books
        .search_books(query.into_params(), 1, 20)
        .await
        .expect("search");

    assert_eq!(total, 2);
    let mut titles = common::titles_of(&books);
    titles.sort_unstable();
    assert_eq!(titles, vec!["Emma", "Persuasion"]);
}

#[tokio::test]
async fn combined_filters_intersect() {
    let app = seeded().await;

    let query = BookSearchQuery {
        authors: Some("Jane Austen".to_string()),
        from_price: Some(dec!(10.00)),
        ..Default::default()
    };
    let (books, total) = app
        .services
        .books
        .search_books(query.into_params(), 1, 20)
        .await
        .expect("search");

    assert_eq!(total, 1);
    assert_eq!(books[0].title, "Persuasion");
}

#[tokio::test]
async fn soft_deleted_books_never_surface() {
    let app = seeded().await;
    let doomed = common::seed_book(&app, "Old Edition", "Anon", "9780000000001", dec!(1.00)).await;

    app.services
        .books
        .delete_book(doomed.book.id)
        .await
        .expect("soft delete");

    let (_, total) = app
        .services
        .books
        .search_books(BookSearchQuery::default().into_params(), 1, 20)
        .await
        .expect("search");
    assert_eq!(total, 3);

    let (_, total) = app.services.books.list_books(1, 20).await.expect("list");
    assert_eq!(total, 3);

    let err = app.services.books.get_book(doomed.book.id).await.unwrap_err();
    assert!(matches!(
        err,
        bookstore_api::errors::ServiceError::NotFound(_)
    ));
}

#[tokio::test]
async fn listing_is_paged() {
    let app = seeded().await;

    let (page_one, total) = app.services.books.list_books(1, 2).await.expect("page 1");
    let (page_two, _) = app.services.books.list_books(2, 2).await.expect("page 2");

    assert_eq!(total, 3);
    assert_eq!(page_one.len(), 2);
    assert_eq!(page_two.len(), 1);
}
