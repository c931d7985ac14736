use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::properties::models::{Property, PropertyStatus};

// ============================================================================
// Price buckets
// ============================================================================

/// Price ranges shown on the dashboard. Together they cover every positive price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PriceBucket {
    /// price < 1,000,000
    #[serde(rename = "under_1m")]
    Under1M,
    /// 1,000,000 <= price <= 2,000,000
    #[serde(rename = "1m_to_2m")]
    From1MTo2M,
    /// 2,000,000 < price <= 3,000,000
    #[serde(rename = "2m_to_3m")]
    From2MTo3M,
    /// price > 3,000,000
    #[serde(rename = "over_3m")]
    Over3M,
}

impl PriceBucket {
    pub const ALL: [PriceBucket; 4] = [
        PriceBucket::Under1M,
        PriceBucket::From1MTo2M,
        PriceBucket::From2MTo3M,
        PriceBucket::Over3M,
    ];

    pub const ONE_MILLION: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
    pub const TWO_MILLION: Decimal = Decimal::from_parts(2_000_000, 0, 0, false, 0);
    pub const THREE_MILLION: Decimal = Decimal::from_parts(3_000_000, 0, 0, false, 0);

    pub fn classify(price: Decimal) -> Self {
        if price < Self::ONE_MILLION {
            PriceBucket::Under1M
        } else if price <= Self::TWO_MILLION {
            PriceBucket::From1MTo2M
        } else if price <= Self::THREE_MILLION {
            PriceBucket::From2MTo3M
        } else {
            PriceBucket::Over3M
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriceBucket::Under1M => "Under $1M",
            PriceBucket::From1MTo2M => "$1M - $2M",
            PriceBucket::From2MTo3M => "$2M - $3M",
            PriceBucket::Over3M => "Over $3M",
        }
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// Raw aggregate row, one query for every counter
#[derive(Debug, Clone, Default, FromRow)]
pub struct DashboardCounts {
    pub total: i64,
    pub for_sale: i64,
    pub sold: i64,
    pub under_1m: i64,
    pub from_1m_to_2m: i64,
    pub from_2m_to_3m: i64,
    pub over_3m: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusCountDto {
    pub status: PropertyStatus,
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceBucketCountDto {
    pub bucket: PriceBucket,
    pub label: String,
    pub count: i64,
}

/// Back-office dashboard aggregates
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardDto {
    pub total: i64,
    /// One entry per status, zero counts included
    pub by_status: Vec<StatusCountDto>,
    /// One entry per price bucket, in ascending price order
    pub by_price: Vec<PriceBucketCountDto>,
    pub generated_at: DateTime<Utc>,
}

impl From<DashboardCounts> for DashboardDto {
    fn from(c: DashboardCounts) -> Self {
        let by_status = PropertyStatus::ALL
            .into_iter()
            .map(|status| StatusCountDto {
                status,
                label: status.label().to_string(),
                count: match status {
                    PropertyStatus::ForSale => c.for_sale,
                    PropertyStatus::Sold => c.sold,
                },
            })
            .collect();

        let by_price = PriceBucket::ALL
            .into_iter()
            .map(|bucket| PriceBucketCountDto {
                bucket,
                label: bucket.label().to_string(),
                count: match bucket {
                    PriceBucket::Under1M => c.under_1m,
                    PriceBucket::From1MTo2M => c.from_1m_to_2m,
                    PriceBucket::From2MTo3M => c.from_2m_to_3m,
                    PriceBucket::Over3M => c.over_3m,
                },
            })
            .collect();

        Self {
            total: c.total,
            by_status,
            by_price,
            generated_at: Utc::now(),
        }
    }
}

// ============================================================================
// Sales report
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalesReportItemDto {
    pub id: Uuid,
    pub title: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub price_bucket: PriceBucket,
    pub status: PropertyStatus,
    pub location_label: String,
    pub published_at: DateTime<Utc>,
}

impl From<Property> for SalesReportItemDto {
    fn from(p: Property) -> Self {
        let location_label = p.location_label();
        Self {
            id: p.id,
            title: p.title,
            price: p.price,
            price_bucket: PriceBucket::classify(p.price),
            status: p.status,
            location_label,
            published_at: p.published_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SalesReportSectionDto {
    pub count: i64,
    #[schema(value_type = String)]
    pub total_value: Decimal,
    pub properties: Vec<SalesReportItemDto>,
}

impl SalesReportSectionDto {
    fn push(&mut self, item: SalesReportItemDto) {
        self.count += 1;
        self.total_value += item.price;
        self.properties.push(item);
    }
}

/// Sales report document data
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalesReportDto {
    pub generated_at: DateTime<Utc>,
    pub for_sale: SalesReportSectionDto,
    pub sold: SalesReportSectionDto,
    pub total_count: i64,
    #[schema(value_type = String)]
    pub total_value: Decimal,
}

impl SalesReportDto {
    /// Splits rows by status, keeping their order within each section
    pub fn from_properties(rows: Vec<Property>) -> Self {
        let mut for_sale = SalesReportSectionDto::default();
        let mut sold = SalesReportSectionDto::default();

        for p in rows {
            match p.status {
                PropertyStatus::ForSale => for_sale.push(p.into()),
                PropertyStatus::Sold => sold.push(p.into()),
            }
        }

        Self {
            generated_at: Utc::now(),
            total_count: for_sale.count + sold.count,
            total_value: for_sale.total_value + sold.total_value,
            for_sale,
            sold,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::features::properties::models::property_fixtures::property;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(PriceBucket::classify(dec("999999.99")), PriceBucket::Under1M);
        assert_eq!(PriceBucket::classify(dec("1000000")), PriceBucket::From1MTo2M);
        assert_eq!(PriceBucket::classify(dec("2000000")), PriceBucket::From1MTo2M);
        assert_eq!(PriceBucket::classify(dec("2000000.50")), PriceBucket::From2MTo3M);
        assert_eq!(PriceBucket::classify(dec("3000000")), PriceBucket::From2MTo3M);
        assert_eq!(PriceBucket::classify(dec("3000000.01")), PriceBucket::Over3M);
    }

    #[test]
    fn test_dashboard_lists_every_status_and_bucket() {
        let dto = DashboardDto::from(DashboardCounts {
            total: 3,
            for_sale: 3,
            sold: 0,
            under_1m: 1,
            from_1m_to_2m: 0,
            from_2m_to_3m: 2,
            over_3m: 0,
        });

        assert_eq!(dto.by_status.len(), 2);
        assert_eq!(dto.by_status[1].status, PropertyStatus::Sold);
        assert_eq!(dto.by_status[1].count, 0);

        let buckets: Vec<PriceBucket> = dto.by_price.iter().map(|b| b.bucket).collect();
        assert_eq!(buckets, PriceBucket::ALL.to_vec());
        assert_eq!(dto.by_price.iter().map(|b| b.count).sum::<i64>(), dto.total);
    }

    #[test]
    fn test_bucket_serializes_with_short_names() {
        assert_eq!(
            serde_json::to_string(&PriceBucket::From1MTo2M).unwrap(),
            "\"1m_to_2m\""
        );
    }

    #[test]
    fn test_sales_report_splits_and_totals() {
        let rows = vec![
            property("A", "1500000", PropertyStatus::ForSale),
            property("B", "900000.50", PropertyStatus::ForSale),
            property("C", "2500000", PropertyStatus::Sold),
        ];
        let report = SalesReportDto::from_properties(rows);

        assert_eq!(report.for_sale.count, 2);
        assert_eq!(report.for_sale.total_value, dec("2400000.50"));
        assert_eq!(report.for_sale.properties[0].title, "A");
        assert_eq!(
            report.for_sale.properties[1].price_bucket,
            PriceBucket::Under1M
        );
        assert_eq!(report.sold.count, 1);
        assert_eq!(report.total_count, 3);
        assert_eq!(report.total_value, dec("4900000.50"));
    }

    #[test]
    fn test_sales_report_empty() {
        let report = SalesReportDto::from_properties(vec![]);
        assert_eq!(report.total_count, 0);
        assert_eq!(report.total_value, Decimal::ZERO);
    }
}
