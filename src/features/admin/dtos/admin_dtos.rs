use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::properties::models::PropertyStatus;
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

// =============================================================================
// COMMON SORT ENUM
// =============================================================================

/// Sort direction
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Desc,
    Asc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

// =============================================================================
// PROPERTY LIST
// =============================================================================

/// Query params for the back-office property list
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AdminPropertyQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Filter by status
    pub status: Option<PropertyStatus>,
    /// Search in title or description
    pub search: Option<String>,
    /// Sort direction on publication date (default: desc)
    #[serde(default)]
    pub sort: SortDirection,
}

impl AdminPropertyQueryParams {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit())
    }
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Row of the back-office property list
#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct AdminPropertyDto {
    pub id: Uuid,
    pub title: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub status: PropertyStatus,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub image_count: i64,
    pub published_at: DateTime<Utc>,
}

// =============================================================================
// BULK ACTIONS
// =============================================================================

/// Selection for a bulk action
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BulkIdsDto {
    #[validate(length(min = 1, message = "Select at least one item"))]
    pub ids: Vec<Uuid>,
}

/// Outcome of a bulk action
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkActionResultDto {
    /// Rows actually changed; ids that no longer exist are not counted
    pub affected: u64,
    pub message: String,
}

impl BulkActionResultDto {
    pub fn new(affected: u64, what: &str, done: &str) -> Self {
        Self {
            affected,
            message: format!("{} {} {}", affected, what, done),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_message() {
        let r = BulkActionResultDto::new(3, "property(ies)", "deleted");
        assert_eq!(r.message, "3 property(ies) deleted");
        assert_eq!(r.affected, 3);
    }

    #[test]
    fn test_empty_selection_is_invalid() {
        let dto = BulkIdsDto { ids: vec![] };
        assert!(dto.validate().is_err());

        let dto = BulkIdsDto {
            ids: vec![Uuid::now_v7()],
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_query_defaults() {
        let q: AdminPropertyQueryParams = serde_json::from_str("{}").unwrap();
        assert_eq!(q.offset(), 0);
        assert_eq!(q.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(q.sort.as_sql(), "DESC");
    }

    #[test]
    fn test_offset_saturates_on_huge_page() {
        let q: AdminPropertyQueryParams =
            serde_json::from_str(&format!(r#"{{"page": {}}}"#, i64::MAX)).unwrap();
        assert_eq!(q.offset(), i64::MAX);
    }
}
