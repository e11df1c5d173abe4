use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::donation::Donation;
use crate::services::donation_service::DonationList;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationPayload {
    #[validate(length(min = 1))]
    pub donor_name: String,
    #[validate(email)]
    pub donor_email: Option<String>,
    pub amount: Decimal,
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    pub donated_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Partial update. Fields left out keep their stored value and are not
/// considered by the history diff. Nullable columns take an explicit `null`
/// to clear the stored value.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDonationPayload {
    #[validate(length(min = 1))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor_name: Option<String>,
    #[validate(email)]
    #[serde(
        default,
        deserialize_with = "crate::dto::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub donor_email: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[validate(length(equal = 3))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donated_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "crate::dto::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationResponse {
    pub id: uuid::Uuid,
    pub donor_name: String,
    pub donor_email: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub donated_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationListResponse {
    pub items: Vec<DonationResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DonationListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub currency: Option<String>,
}

impl From<Donation> for DonationResponse {
    fn from(value: Donation) -> Self {
        Self {
            id: value.id,
            donor_name: value.donor_name,
            donor_email: value.donor_email,
            amount: value.amount,
            currency: value.currency,
            donated_at: value.donated_at,
            notes: value.notes,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<DonationList> for DonationListResponse {
    fn from(value: DonationList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}
