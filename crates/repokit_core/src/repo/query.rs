//! Filtering, ordering and paging options for `get_all`.
//!
//! # Invariants
//! - Filter clauses only use anonymous `?` placeholders, bound in order.
//! - Column names are quoted; values never reach SQL text.
//! - Paging applies only when both `page` and `page_size` are set.

use crate::db::quote_ident;
use rusqlite::types::Value;
use std::fmt;

/// Value bound into a filter placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterValue(Value);

impl FilterValue {
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self(Value::Text(value.to_string()))
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self(Value::Text(value))
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self(Value::Integer(value))
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self(Value::Integer(i64::from(value)))
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        Self(Value::Integer(i64::from(value)))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self(Value::Real(value))
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self(Value::from(value))
    }
}

/// Parameterized SQL predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    clause: String,
    params: Vec<Value>,
}

impl Filter {
    /// Raw predicate. Placeholders must be anonymous `?`.
    pub fn raw<V: Into<FilterValue>>(
        clause: impl Into<String>,
        params: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            clause: clause.into(),
            params: params
                .into_iter()
                .map(|value| value.into().into_value())
                .collect(),
        }
    }

    pub fn eq(column: &str, value: impl Into<FilterValue>) -> Self {
        Self::compare(column, "=", value.into().into_value())
    }

    pub fn ne(column: &str, value: impl Into<FilterValue>) -> Self {
        Self::compare(column, "!=", value.into().into_value())
    }

    pub fn gt(column: &str, value: impl Into<FilterValue>) -> Self {
        Self::compare(column, ">", value.into().into_value())
    }

    pub fn gte(column: &str, value: impl Into<FilterValue>) -> Self {
        Self::compare(column, ">=", value.into().into_value())
    }

    pub fn lt(column: &str, value: impl Into<FilterValue>) -> Self {
        Self::compare(column, "<", value.into().into_value())
    }

    pub fn lte(column: &str, value: impl Into<FilterValue>) -> Self {
        Self::compare(column, "<=", value.into().into_value())
    }

    pub fn like(column: &str, pattern: impl Into<String>) -> Self {
        Self::compare(column, "LIKE", Value::Text(pattern.into()))
    }

    /// `column IN (...)`. An empty list matches nothing.
    pub fn in_list<V: Into<FilterValue>>(
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let params: Vec<Value> = values
            .into_iter()
            .map(|value| value.into().into_value())
            .collect();
        if params.is_empty() {
            return Self::raw::<Value>("0 = 1", []);
        }
        let placeholders = vec!["?"; params.len()].join(", ");
        Self {
            clause: format!("{} IN ({})", quote_ident(column), placeholders),
            params,
        }
    }

    pub fn is_null(column: &str) -> Self {
        Self::raw::<Value>(format!("{} IS NULL", quote_ident(column)), [])
    }

    pub fn is_not_null(column: &str) -> Self {
        Self::raw::<Value>(format!("{} IS NOT NULL", quote_ident(column)), [])
    }

    pub fn and(self, other: Filter) -> Self {
        self.combine("AND", other)
    }

    pub fn or(self, other: Filter) -> Self {
        self.combine("OR", other)
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    fn compare(column: &str, operator: &str, value: Value) -> Self {
        Self {
            clause: format!("{} {} ?", quote_ident(column), operator),
            params: vec![value],
        }
    }

    fn combine(mut self, joiner: &str, other: Filter) -> Self {
        self.clause = format!("({}) {} ({})", self.clause, joiner, other.clause);
        self.params.extend(other.params);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "ASC"),
            Self::Descending => write!(f, "DESC"),
        }
    }
}

/// One ordering term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: OrderDirection,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: OrderDirection::Ascending,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: OrderDirection::Descending,
        }
    }

    pub(crate) fn to_sql(&self) -> String {
        format!("{} {}", quote_ident(&self.column), self.direction)
    }
}

/// Options for listing entities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    /// Language scope; ignored for non-localized entity types.
    pub lang_code: Option<String>,
    pub filter: Option<Filter>,
    pub order_by: Vec<OrderBy>,
    /// 1-based page number.
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lang_code(mut self, lang_code: impl Into<String>) -> Self {
        self.lang_code = Some(lang_code.into());
        self
    }

    /// Sets the caller predicate, AND-ing it with any previous one.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    /// Returns `(skip, take)` when both paging fields are set.
    ///
    /// Page `0` is treated as page `1`.
    pub fn page_window(&self) -> Option<(u64, u64)> {
        match (self.page, self.page_size) {
            (Some(page), Some(page_size)) => {
                let page_size = u64::from(page_size);
                let skip = u64::from(page.saturating_sub(1)) * page_size;
                Some((skip, page_size))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Filter, ListQuery, OrderBy};
    use rusqlite::types::Value;

    #[test]
    fn comparison_filters_quote_columns_and_bind_values() {
        let filter = Filter::eq("name", "A");
        assert_eq!(filter.clause(), "\"name\" = ?");
        assert_eq!(filter.params(), &[Value::Text("A".to_string())]);

        let filter = Filter::gte("price", 10i64);
        assert_eq!(filter.clause(), "\"price\" >= ?");
        assert_eq!(filter.params(), &[Value::Integer(10)]);
    }

    #[test]
    fn combined_filters_keep_parameter_order() {
        let filter = Filter::eq("a", 1i64)
            .and(Filter::like("b", "x%"))
            .or(Filter::is_null("c"));
        assert_eq!(filter.clause(), "((\"a\" = ?) AND (\"b\" LIKE ?)) OR (\"c\" IS NULL)");
        assert_eq!(
            filter.params(),
            &[Value::Integer(1), Value::Text("x%".to_string())]
        );
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let filter = Filter::in_list::<i64>("id", []);
        assert_eq!(filter.clause(), "0 = 1");
        assert!(filter.params().is_empty());

        let filter = Filter::in_list("id", [1i64, 2, 3]);
        assert_eq!(filter.clause(), "\"id\" IN (?, ?, ?)");
        assert_eq!(filter.params().len(), 3);
    }

    #[test]
    fn page_window_requires_page_and_size() {
        assert_eq!(ListQuery::new().page_window(), None);

        let only_page = ListQuery {
            page: Some(2),
            ..ListQuery::default()
        };
        assert_eq!(only_page.page_window(), None);

        assert_eq!(ListQuery::new().page(1, 10).page_window(), Some((0, 10)));
        assert_eq!(ListQuery::new().page(3, 10).page_window(), Some((20, 10)));
        assert_eq!(ListQuery::new().page(0, 10).page_window(), Some((0, 10)));
    }

    #[test]
    fn builder_ands_repeated_filters() {
        let query = ListQuery::new()
            .filter(Filter::eq("a", 1i64))
            .filter(Filter::eq("b", 2i64))
            .order_by(OrderBy::desc("a"));
        let filter = query.filter.expect("filter should be set");
        assert_eq!(filter.clause(), "(\"a\" = ?) AND (\"b\" = ?)");
        assert_eq!(query.order_by[0].to_sql(), "\"a\" DESC");
    }
}
