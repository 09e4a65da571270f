use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

/// Structured catalog search filter. Each predicate is appended with a bound
/// placeholder; empty strings are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub manufacturer: Option<String>,
}

impl ProductFilter {
    /// Append the filter predicates to a query whose FROM clause aliases
    /// `products` as `p` and ends in a WHERE clause ready for AND terms.
    pub fn apply(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let Some(search) = self.search.as_ref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            builder
                .push(" AND (p.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category_id) = self.category_id {
            builder.push(" AND p.category_id = ").push_bind(category_id);
        }
        if let Some(manufacturer) = self.manufacturer.as_ref().filter(|m| !m.is_empty()) {
            builder
                .push(" AND p.manufacturer = ")
                .push_bind(manufacturer.clone());
        }
    }
}
