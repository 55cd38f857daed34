use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::entity::orders::OrderStatus;

const DEFAULT_LIMIT: u64 = 5;
const MAX_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, Default)]
pub struct Pagination {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl Pagination {
    /// `(page, limit, offset)`, with out-of-range values replaced by defaults.
    pub fn normalize(&self) -> (u64, u64, u64) {
        let page = self.page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = self
            .limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        let offset = (page - 1).saturating_mul(limit);
        (page, limit, offset)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeQuery {
    #[serde(rename = "_page")]
    pub page: Option<u64>,
    #[serde(rename = "_limit")]
    pub limit: Option<u64>,
    /// Full-text match on username.
    pub name_like: Option<String>,
}

impl EmployeeQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    #[serde(rename = "_page")]
    pub page: Option<u64>,
    #[serde(rename = "_limit")]
    pub limit: Option<u64>,
    /// Full-text match on the product name.
    pub name_like: Option<String>,
    /// Category id.
    #[serde(rename = "type")]
    pub category_id: Option<Uuid>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    #[serde(rename = "_page")]
    pub page: Option<u64>,
    #[serde(rename = "_limit")]
    pub limit: Option<u64>,
    pub status: Option<OrderStatus>,
    /// Calendar day (UTC) the order was placed, `YYYY-MM-DD`.
    pub order_date: Option<NaiveDate>,
    /// Manager listing only.
    pub customer_id: Option<Uuid>,
    /// Manager listing only.
    pub employee_id: Option<Uuid>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn defaults_and_offsets() {
        assert_eq!(Pagination::default().normalize(), (1, 5, 0));
        let p = Pagination {
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(p.normalize(), (3, 10, 20));
    }

    #[test]
    fn clamps_out_of_range_values() {
        let p = Pagination {
            page: Some(0),
            limit: Some(1000),
        };
        assert_eq!(p.normalize(), (1, 100, 0));
        let p = Pagination {
            page: Some(2),
            limit: Some(0),
        };
        assert_eq!(p.normalize(), (2, 5, 5));
    }
}
