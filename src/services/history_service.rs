use crate::error::Result;
use crate::models::audit_record::{AuditRecord, NewAuditRecord};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Logical (API) field name paired with the storage column it is persisted in.
pub type FieldMapping = [(&'static str, &'static str)];

pub type Record = Map<String, JsonValue>;

/// Renders a value the way it is written to the history table.
///
/// Strings are taken verbatim, scalars use their JSON text, and a missing key
/// or JSON `null` renders as `None`. Type information is not kept, so `0` and
/// `"0"` compare equal.
pub fn stringify(value: Option<&JsonValue>) -> Option<String> {
    match value {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Compares `old` (keyed by storage name) with `new` (keyed by logical name)
/// over the fields listed in `mapping` and returns one entry per changed field.
///
/// Logical fields that `new` does not carry are not part of the update and
/// are skipped. Fields outside `mapping` are ignored.
pub fn diff_records(
    old: &Record,
    new: &Record,
    mapping: &FieldMapping,
    record_id: Uuid,
    changed_by: Uuid,
) -> Vec<NewAuditRecord> {
    mapping
        .iter()
        .filter_map(|(logical, storage)| {
            let proposed = new.get(*logical)?;
            let old_value = stringify(old.get(*storage));
            let new_value = stringify(Some(proposed));
            if old_value == new_value {
                return None;
            }
            Some(NewAuditRecord {
                record_id,
                field_changed: (*storage).to_string(),
                old_value,
                new_value,
                changed_by,
            })
        })
        .collect()
}

/// Serializes a row or payload into a field map for [`diff_records`].
pub fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value)? {
        JsonValue::Object(map) => Ok(map),
        other => Err(crate::error::Error::Internal(format!(
            "expected an object for history diffing, got {}",
            other
        ))),
    }
}

#[derive(Clone)]
pub struct HistoryService {
    pool: PgPool,
}

impl HistoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Writes the given changes on the caller's connection, normally inside the
    /// transaction that applies the update itself.
    pub async fn append(
        conn: &mut PgConnection,
        table_name: &str,
        records: &[NewAuditRecord],
    ) -> Result<Vec<AuditRecord>> {
        let mut written = Vec::with_capacity(records.len());
        for record in records {
            let row = sqlx::query_as::<_, AuditRecord>(
                r#"
                INSERT INTO history (table_name, record_id, field_changed, old_value, new_value, changed_by)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(table_name)
            .bind(record.record_id)
            .bind(&record.field_changed)
            .bind(&record.old_value)
            .bind(&record.new_value)
            .bind(record.changed_by)
            .fetch_one(&mut *conn)
            .await?;
            written.push(row);
        }
        if !written.is_empty() {
            tracing::info!(
                table = table_name,
                record_id = %written[0].record_id,
                changes = written.len(),
                "history rows appended"
            );
        }
        Ok(written)
    }

    pub async fn list(&self, table_name: &str, record_id: Uuid) -> Result<Vec<AuditRecord>> {
        let rows = sqlx::query_as::<_, AuditRecord>(
            r#"
            SELECT * FROM history
            WHERE table_name = $1 AND record_id = $2
            ORDER BY changed_at ASC, id ASC
            "#,
        )
        .bind(table_name)
        .bind(record_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
