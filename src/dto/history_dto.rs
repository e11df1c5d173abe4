use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::audit_record::AuditRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryResponse {
    pub id: Uuid,
    pub record_id: Uuid,
    pub field_changed: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
}

impl From<AuditRecord> for HistoryEntryResponse {
    fn from(value: AuditRecord) -> Self {
        Self {
            id: value.id,
            record_id: value.record_id,
            field_changed: value.field_changed,
            old_value: value.old_value,
            new_value: value.new_value,
            changed_by: value.changed_by,
            changed_at: value.changed_at,
        }
    }
}
