use crate::entities::book;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, Condition};
use serde::Deserialize;
use utoipa::IntoParams;

/// Raw query-string form of a catalog search.
///
/// List-valued fields arrive as comma-separated strings
/// (`?titles=Dune,Emma&authors=Austen`) and are split before filtering.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct BookSearchQuery {
    /// Comma-separated list of exact titles to match
    pub titles: Option<String>,
    /// Comma-separated list of exact author names to match
    pub authors: Option<String>,
    /// Comma-separated list of exact descriptions to match
    pub descriptions: Option<String>,
    /// Comma-separated list of exact cover image URLs to match
    pub cover_images: Option<String>,
    /// Lower price bound, inclusive
    pub from_price: Option<Decimal>,
    /// Upper price bound, inclusive
    pub to_price: Option<Decimal>,
}

impl BookSearchQuery {
    pub fn into_params(self) -> BookSearchParams {
        BookSearchParams {
            titles: split_csv(self.titles),
            authors: split_csv(self.authors),
            descriptions: split_csv(self.descriptions),
            cover_images: split_csv(self.cover_images),
            from_price: self.from_price,
            to_price: self.to_price,
        }
    }
}

fn split_csv(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Parsed search parameters. Absent fields produce no filter at all.
#[derive(Debug, Clone, Default)]
pub struct BookSearchParams {
    pub titles: Vec<String>,
    pub authors: Vec<String>,
    pub descriptions: Vec<String>,
    pub cover_images: Vec<String>,
    pub from_price: Option<Decimal>,
    pub to_price: Option<Decimal>,
}

impl BookSearchParams {
    /// Turns the populated fields into the closed set of predicates.
    pub fn into_filters(self) -> Vec<BookFilter> {
        let mut filters = Vec::new();
        if !self.titles.is_empty() {
            filters.push(BookFilter::Titles(self.titles));
        }
        if !self.authors.is_empty() {
            filters.push(BookFilter::Authors(self.authors));
        }
        if !self.descriptions.is_empty() {
            filters.push(BookFilter::Descriptions(self.descriptions));
        }
        if !self.cover_images.is_empty() {
            filters.push(BookFilter::CoverImages(self.cover_images));
        }
        if let Some(from) = self.from_price {
            filters.push(BookFilter::PriceFrom(from));
        }
        if let Some(to) = self.to_price {
            filters.push(BookFilter::PriceTo(to));
        }
        filters
    }
}

/// The closed set of predicates a catalog search can be built from.
///
/// Each variant maps onto exactly one SQL predicate over the books table.
#[derive(Debug, Clone, PartialEq)]
pub enum BookFilter {
    /// Title is one of the given values
    Titles(Vec<String>),
    /// Author is one of the given values
    Authors(Vec<String>),
    /// Description is one of the given values
    Descriptions(Vec<String>),
    /// Cover image URL is one of the given values
    CoverImages(Vec<String>),
    /// Price is at least the given value
    PriceFrom(Decimal),
    /// Price is at most the given value
    PriceTo(Decimal),
}

impl BookFilter {
    /// Builds the SQL predicate for this filter.
    pub fn condition(&self) -> Condition {
        match self {
            BookFilter::Titles(values) => {
                Condition::all().add(book::Column::Title.is_in(values.iter().cloned()))
            }
            BookFilter::Authors(values) => {
                Condition::all().add(book::Column::Author.is_in(values.iter().cloned()))
            }
            BookFilter::Descriptions(values) => {
                Condition::all().add(book::Column::Description.is_in(values.iter().cloned()))
            }
            BookFilter::CoverImages(values) => {
                Condition::all().add(book::Column::CoverImage.is_in(values.iter().cloned()))
            }
            BookFilter::PriceFrom(from) => Condition::all().add(book::Column::Price.gte(*from)),
            BookFilter::PriceTo(to) => Condition::all().add(book::Column::Price.lte(*to)),
        }
    }
}

/// AND-folds a set of filters into a single condition.
///
/// An empty set yields a condition that matches every row.
pub fn compose(filters: Vec<BookFilter>) -> Condition {
    filters
        .into_iter()
        .fold(Condition::all(), |acc, filter| acc.add(filter.condition()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    fn to_sql(condition: Condition) -> String {
        book::Entity::find()
            .filter(condition)
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn empty_filter_set_matches_everything() {
        let sql = to_sql(compose(vec![]));
        assert!(!sql.contains("WHERE"), "unexpected WHERE clause: {}", sql);
    }

    #[test]
    fn title_filter_uses_in_set_semantics() {
        let sql = to_sql(compose(vec![BookFilter::Titles(vec![
            "Dune".into(),
            "Emma".into(),
        ])]));
        assert!(sql.contains(r#""books"."title" IN ('Dune', 'Emma')"#), "{}", sql);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let sql = to_sql(compose(vec![
            BookFilter::PriceFrom(dec!(10.50)),
            BookFilter::PriceTo(dec!(25.00)),
        ]));
        assert!(sql.contains(r#""books"."price" >="#), "{}", sql);
        assert!(sql.contains(r#""books"."price" <="#), "{}", sql);
    }

    #[test]
    fn filters_are_and_composed() {
        let sql = to_sql(compose(vec![
            BookFilter::Authors(vec!["Frank Herbert".into()]),
            BookFilter::PriceTo(dec!(30)),
        ]));
        assert!(sql.contains("AND"), "{}", sql);
    }

    #[test]
    fn csv_fields_are_split_and_trimmed() {
        let query = BookSearchQuery {
            titles: Some("Dune, Emma ,,".into()),
            from_price: Some(dec!(5)),
            ..Default::default()
        };
        let params = query.into_params();
        assert_eq!(params.titles, vec!["Dune".to_string(), "Emma".to_string()]);
        assert_eq!(params.from_price, Some(dec!(5)));

        let filters = params.into_filters();
        assert_eq!(
            filters,
            vec![
                BookFilter::Titles(vec!["Dune".into(), "Emma".into()]),
                BookFilter::PriceFrom(dec!(5)),
            ]
        );
    }

    #[test]
    fn blank_csv_produces_no_filter() {
        let query = BookSearchQuery {
            titles: Some(" , ,".into()),
            ..Default::default()
        };
        assert!(query.into_params().into_filters().is_empty());
    }
}
