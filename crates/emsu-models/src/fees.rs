//! Fee domain models and DTOs.
//!
//! Fee status is set explicitly by staff; it is never derived from the paid
//! amount.

use chrono::{DateTime, NaiveDate, Utc};
use emsu_core::serde::{
    deserialize_nullable, deserialize_optional_bool, deserialize_optional_i64,
    deserialize_optional_trimmed,
};
use emsu_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::round2;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
pub enum FeeStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
    Partial,
    Waived,
}

/// Outstanding amount: `amount + late_fee - discount_amount - paid_amount`,
/// rounded to 2 decimals.
pub fn balance(amount: f64, late_fee: f64, discount_amount: f64, paid_amount: f64) -> f64 {
    round2(amount + late_fee - discount_amount - paid_amount)
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Fee {
    pub id: i64,
    pub student_id: i64,
    pub student_name: Option<String>,
    /// tuition, library, lab, transport, exam, misc
    pub fee_type: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub paid_amount: f64,
    pub status: FeeStatus,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub semester: Option<String>,
    pub academic_year: Option<String>,
    pub transaction_id: Option<String>,
    pub discount_amount: f64,
    pub late_fee: f64,
    pub receipt_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Fee {
    pub fn balance(&self) -> f64 {
        balance(
            self.amount,
            self.late_fee,
            self.discount_amount,
            self.paid_amount,
        )
    }
}

/// Fee as returned by the API, with the computed balance.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeeResponse {
    #[serde(flatten)]
    pub fee: Fee,
    pub balance: f64,
}

impl From<Fee> for FeeResponse {
    fn from(fee: Fee) -> Self {
        let balance = fee.balance();
        Self { fee, balance }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateFeeDto {
    pub student_id: i64,
    #[validate(length(min = 1, max = 50))]
    pub fee_type: String,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub due_date: NaiveDate,
    #[validate(range(min = 0.0))]
    pub paid_amount: Option<f64>,
    /// Defaults to `Pending`
    pub status: Option<FeeStatus>,
    pub payment_date: Option<DateTime<Utc>>,
    #[validate(length(max = 50))]
    pub payment_method: Option<String>,
    #[validate(length(max = 20))]
    pub semester: Option<String>,
    #[validate(length(max = 10))]
    pub academic_year: Option<String>,
    #[validate(length(max = 100))]
    pub transaction_id: Option<String>,
    #[validate(range(min = 0.0))]
    pub discount_amount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub late_fee: Option<f64>,
    #[validate(length(max = 50))]
    pub receipt_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateFeeDto {
    pub student_id: Option<i64>,
    #[validate(length(min = 1, max = 50))]
    pub fee_type: Option<String>,
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    pub due_date: Option<NaiveDate>,
    #[validate(range(min = 0.0))]
    pub paid_amount: Option<f64>,
    pub status: Option<FeeStatus>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub payment_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 50))]
    pub payment_method: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 20))]
    pub semester: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 10))]
    pub academic_year: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 100))]
    pub transaction_id: Option<Option<String>>,
    #[validate(range(min = 0.0))]
    pub discount_amount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub late_fee: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 50))]
    pub receipt_number: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeeFilterParams {
    /// Case-insensitive match on fee type, receipt number or transaction ID
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub student_id: Option<i64>,
    pub status: Option<FeeStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub fee_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub semester: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub include_inactive: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedFeesResponse {
    pub data: Vec<FeeResponse>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_includes_late_fee_and_discount() {
        assert_eq!(balance(1000.0, 50.0, 100.0, 400.0), 550.0);
        assert_eq!(balance(100.0, 0.0, 0.0, 100.0), 0.0);
        assert_eq!(balance(0.1, 0.2, 0.0, 0.0), 0.3);
    }

    #[test]
    fn test_status_keeps_pascal_case() {
        assert_eq!(serde_json::to_string(&FeeStatus::Overdue).unwrap(), r#""Overdue""#);
        assert_eq!(FeeStatus::default(), FeeStatus::Pending);
    }

    #[test]
    fn test_fee_response_serializes_balance() {
        let fee = Fee {
            id: 3,
            student_id: 1,
            student_name: Some("John Doe".to_string()),
            fee_type: "tuition".to_string(),
            amount: 500.0,
            due_date: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap(),
            paid_amount: 200.0,
            status: FeeStatus::Partial,
            payment_date: None,
            payment_method: Some("Cash".to_string()),
            semester: None,
            academic_year: None,
            transaction_id: None,
            discount_amount: 25.5,
            late_fee: 10.0,
            receipt_number: None,
            is_active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(FeeResponse::from(fee)).unwrap();
        assert_eq!(json["balance"], 284.5);
        assert_eq!(json["status"], "Partial");
    }
}
