//! Translation of storefront catalog query strings into a typed query, plus
//! the SQL ordering and paging rules applied to the filtered rows.

use crate::entities::commerce::{product, review, Product};
use crate::errors::ServiceError;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func, Query, SimpleExpr, SubQueryStatement},
    Order, QueryOrder, Select,
};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Rating,
    Price,
    Reviews,
    #[default]
    Date,
}

impl FromStr for SortField {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rating" => Ok(Self::Rating),
            "price" => Ok(Self::Price),
            "reviews" => Ok(Self::Reviews),
            "date" => Ok(Self::Date),
            other => Err(ServiceError::ValidationError(format!(
                "unknown sort field '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Inc,
    #[default]
    Dec,
}

impl FromStr for SortDirection {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inc" => Ok(Self::Inc),
            "dec" => Ok(Self::Dec),
            other => Err(ServiceError::ValidationError(format!(
                "unknown sortType '{}'",
                other
            ))),
        }
    }
}

/// Parsed `GET /catalog` parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub free_delivery: bool,
    pub available: bool,
    pub category: Option<i32>,
    pub tags: Vec<i32>,
    pub sort: SortField,
    pub direction: SortDirection,
    pub page: u64,
    pub limit: Option<u64>,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            name: None,
            min_price: None,
            max_price: None,
            free_delivery: false,
            available: false,
            category: None,
            tags: Vec::new(),
            sort: SortField::default(),
            direction: SortDirection::default(),
            page: 1,
            limit: None,
        }
    }
}

impl CatalogQuery {
    /// Builds a query from raw `key=value` pairs. Unknown keys are ignored and
    /// empty values count as absent.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, ServiceError> {
        let mut query = CatalogQuery::default();

        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "filter[name]" | "name" => query.name = Some(value.to_string()),
                "filter[minPrice]" | "minPrice" => {
                    query.min_price = Some(parse_decimal(key, value)?)
                }
                "filter[maxPrice]" | "maxPrice" => {
                    query.max_price = Some(parse_decimal(key, value)?)
                }
                "filter[freeDelivery]" | "freeDelivery" => {
                    query.free_delivery = parse_flag(key, value)?
                }
                "filter[available]" | "available" => query.available = parse_flag(key, value)?,
                "category" => query.category = Some(parse_number(key, value)?),
                "tags[]" | "tags" => {
                    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                        let id = parse_number(key, part)?;
                        if !query.tags.contains(&id) {
                            query.tags.push(id);
                        }
                    }
                }
                "sort" => query.sort = value.parse()?,
                "sortType" => query.direction = value.parse()?,
                "currentPage" | "page" => query.page = parse_number::<u64>(key, value)?.max(1),
                "limit" => query.limit = Some(parse_number::<u64>(key, value)?.max(1)),
                _ => {}
            }
        }

        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                return Err(ServiceError::ValidationError(format!(
                    "minPrice {} is greater than maxPrice {}",
                    min, max
                )));
            }
        }

        Ok(query)
    }

    /// Effective page size given the configured default and ceiling
    pub fn page_size(&self, default: u64, max: u64) -> u64 {
        self.limit.unwrap_or(default).clamp(1, max.max(1))
    }
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ServiceError> {
    Decimal::from_str(value)
        .map_err(|_| ServiceError::ValidationError(format!("{} must be a number", key)))
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ServiceError> {
    value
        .parse()
        .map_err(|_| ServiceError::ValidationError(format!("{} must be a whole number", key)))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ServiceError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(ServiceError::ValidationError(format!(
            "{} must be true or false",
            key
        ))),
    }
}

impl SortDirection {
    fn order(self) -> Order {
        match self {
            Self::Inc => Order::Asc,
            Self::Dec => Order::Desc,
        }
    }
}

/// Number of reviews of the outer product row
pub fn review_count_expr() -> SimpleExpr {
    product_reviews_subquery(Expr::col((review::Entity, review::Column::Id)).count())
}

/// Mean review rate of the outer product row, `NULL` without reviews
pub fn rating_expr() -> SimpleExpr {
    product_reviews_subquery(Func::avg(Expr::col((review::Entity, review::Column::Rate))).into())
}

/// Whether the outer product row has at least one review
pub fn has_reviews_expr() -> SimpleExpr {
    Expr::exists(
        Query::select()
            .expr(Expr::val(1))
            .from(review::Entity)
            .and_where(reviews_of_outer_product())
            .to_owned(),
    )
}

fn reviews_of_outer_product() -> SimpleExpr {
    Expr::col((review::Entity, review::Column::ProductId))
        .equals((product::Entity, product::Column::Id))
}

fn product_reviews_subquery(aggregate: SimpleExpr) -> SimpleExpr {
    SimpleExpr::SubQuery(
        None,
        Box::new(SubQueryStatement::SelectStatement(
            Query::select()
                .expr(aggregate)
                .from(review::Entity)
                .and_where(reviews_of_outer_product())
                .to_owned(),
        )),
    )
}

/// Adds the catalog ORDER BY. Unrated products come last when sorting by
/// rating in either direction; ties fall back to ascending id.
pub fn apply_sort(
    select: Select<Product>,
    field: SortField,
    direction: SortDirection,
) -> Select<Product> {
    let order = direction.order();
    let select = match field {
        SortField::Price => select.order_by(product::Column::Price, order),
        SortField::Date => select.order_by(product::Column::Date, order),
        SortField::Reviews => select.order_by(review_count_expr(), order),
        SortField::Rating => select
            .order_by(has_reviews_expr(), Order::Desc)
            .order_by(rating_expr(), order),
    };
    select.order_by_asc(product::Column::Id)
}

/// `%fragment%` with LIKE wildcards in the fragment escaped by `\`
pub fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// One page of results with the storefront's 1-based paging fields
#[derive(Debug, Clone, PartialEq)]
pub struct PageWindow {
    pub offset: u64,
    pub size: u64,
    pub current_page: u64,
    pub last_page: u64,
}

impl PageWindow {
    pub fn new(total: u64, page: u64, size: u64) -> Self {
        let size = size.max(1);
        let last_page = total.div_ceil(size).max(1);
        let current_page = page.max(1);
        Self {
            offset: (current_page - 1).saturating_mul(size),
            size,
            current_page,
            last_page,
        }
    }

    /// True when the page starts after the last of `total` rows
    pub fn is_past_end(&self, total: u64) -> bool {
        self.offset >= total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use sea_orm::{DbBackend, EntityTrait, QueryTrait};

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn order_clause(field: SortField, direction: SortDirection) -> String {
        let sql = apply_sort(Product::find(), field, direction)
            .build(DbBackend::Sqlite)
            .to_string();
        sql.split("ORDER BY").nth(1).unwrap_or_default().to_string()
    }

    #[test]
    fn parses_storefront_parameters() {
        let query = CatalogQuery::from_pairs(&pairs(&[
            ("filter[name]", "laptop"),
            ("filter[minPrice]", "10"),
            ("filter[maxPrice]", "99.50"),
            ("filter[freeDelivery]", "true"),
            ("filter[available]", "false"),
            ("currentPage", "3"),
            ("category", "4"),
            ("sort", "price"),
            ("sortType", "inc"),
            ("tags[]", "1"),
            ("tags[]", "5"),
            ("limit", "10"),
        ]))
        .unwrap();

        assert_eq!(query.name.as_deref(), Some("laptop"));
        assert_eq!(query.min_price, Some(dec!(10)));
        assert_eq!(query.max_price, Some(dec!(99.50)));
        assert!(query.free_delivery);
        assert!(!query.available);
        assert_eq!(query.page, 3);
        assert_eq!(query.category, Some(4));
        assert_eq!(query.sort, SortField::Price);
        assert_eq!(query.direction, SortDirection::Inc);
        assert_eq!(query.tags, vec![1, 5]);
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn blank_values_are_ignored() {
        let query =
            CatalogQuery::from_pairs(&pairs(&[("filter[name]", ""), ("category", " ")])).unwrap();
        assert_eq!(query, CatalogQuery::default());
    }

    #[test]
    fn rejects_garbage() {
        assert_matches!(
            CatalogQuery::from_pairs(&pairs(&[("filter[minPrice]", "cheap")])),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            CatalogQuery::from_pairs(&pairs(&[("sort", "popularity")])),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            CatalogQuery::from_pairs(&pairs(&[
                ("filter[minPrice]", "50"),
                ("filter[maxPrice]", "10")
            ])),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn comma_separated_tags_are_deduplicated() {
        let query = CatalogQuery::from_pairs(&pairs(&[("tags", "3,4,3")])).unwrap();
        assert_eq!(query.tags, vec![3, 4]);
    }

    #[test]
    fn page_size_respects_ceiling() {
        let mut query = CatalogQuery::default();
        assert_eq!(query.page_size(20, 100), 20);
        query.limit = Some(500);
        assert_eq!(query.page_size(20, 100), 100);
    }

    #[test]
    fn every_sort_ends_with_id_tiebreak() {
        for field in [
            SortField::Price,
            SortField::Date,
            SortField::Reviews,
            SortField::Rating,
        ] {
            for direction in [SortDirection::Inc, SortDirection::Dec] {
                let clause = order_clause(field, direction);
                assert!(
                    clause.trim_end().ends_with(r#""products"."id" ASC"#),
                    "{:?} {:?}: {}",
                    field,
                    direction,
                    clause
                );
            }
        }
    }

    #[test]
    fn rating_sort_puts_rated_products_first_in_both_directions() {
        for direction in [SortDirection::Inc, SortDirection::Dec] {
            let clause = order_clause(SortField::Rating, direction);
            let exists = clause.find("EXISTS").unwrap();
            let avg = clause.find("AVG").unwrap();
            assert!(exists < avg, "{}", clause);
            assert!(clause[exists..avg].contains("DESC"), "{}", clause);
        }
    }

    #[test]
    fn newest_first_by_default() {
        let query = CatalogQuery::default();
        let clause = order_clause(query.sort, query.direction);
        assert!(clause.trim_start().starts_with(r#""products"."date" DESC"#));
    }

    #[test]
    fn wildcards_in_name_filter_are_literal() {
        assert_eq!(contains_pattern("phone"), "%phone%");
        assert_eq!(contains_pattern("_"), r"%\_%");
        assert_eq!(contains_pattern("100%"), r"%100\%%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }

    #[test]
    fn page_window_math() {
        let window = PageWindow::new(45, 3, 20);
        assert_eq!(window.offset, 40);
        assert_eq!(window.last_page, 3);
        assert!(!window.is_past_end(45));

        let empty = PageWindow::new(0, 1, 20);
        assert_eq!(empty.last_page, 1);
        assert!(empty.is_past_end(0));
    }

    #[test]
    fn huge_page_numbers_saturate() {
        let window = PageWindow::new(5, u64::MAX, 20);
        assert_eq!(window.offset, u64::MAX);
        assert_eq!(window.current_page, u64::MAX);
        assert_eq!(window.last_page, 1);
        assert!(window.is_past_end(5));
    }
}
