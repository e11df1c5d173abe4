use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::vendor::Vendor;
use crate::services::vendor_service::VendorList;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorPayload {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
}

/// Partial update; `null` clears a nullable column.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVendorPayload {
    #[validate(length(min = 1))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[validate(email)]
    #[serde(
        default,
        deserialize_with = "crate::dto::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_email: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "crate::dto::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "crate::dto::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorResponse {
    pub id: uuid::Uuid,
    pub name: String,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorListResponse {
    pub items: Vec<VendorResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct VendorListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
}

impl From<Vendor> for VendorResponse {
    fn from(value: Vendor) -> Self {
        Self {
            id: value.id,
            name: value.name,
            contact_email: value.contact_email,
            phone: value.phone,
            category: value.category,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<VendorList> for VendorListResponse {
    fn from(value: VendorList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_absent_fields_deserialize_differently() {
        let payload: UpdateVendorPayload =
            serde_json::from_value(json!({"phone": null, "category": "catering"})).unwrap();
        assert_eq!(payload.phone, Some(None));
        assert_eq!(payload.category, Some(Some("catering".to_string())));
        assert_eq!(payload.contact_email, None);
        assert_eq!(payload.name, None);
    }
}
