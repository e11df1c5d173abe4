use crate::dto::donation_dto::{CreateDonationPayload, DonationListQuery, UpdateDonationPayload};
use crate::error::{Error, Result};
use crate::models::audit_record::AuditRecord;
use crate::models::donation::Donation;
use crate::services::history_service::{
    diff_records, to_record, FieldMapping, HistoryService, Record,
};
use crate::utils::time::{now, to_stored_precision};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

pub const DONATION_TABLE: &str = "donations";

pub const DONATION_FIELDS: &FieldMapping = &[
    ("donorName", "donor_name"),
    ("donorEmail", "donor_email"),
    ("amount", "amount"),
    ("currency", "currency"),
    ("donatedAt", "donated_at"),
    ("notes", "notes"),
];

pub const SOFT_DELETE_FIELDS: &FieldMapping = &[("deletedAt", "deleted_at")];

const DEFAULT_CURRENCY: &str = "USD";

#[derive(Clone)]
pub struct DonationService {
    pool: PgPool,
}

pub struct DonationList {
    pub items: Vec<Donation>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

/// Stored amounts carry two decimal places; compare and write at that scale.
pub fn money(amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(Error::BadRequest("amount must be greater than zero".to_string()));
    }
    let mut scaled = amount.round_dp(2);
    scaled.rescale(2);
    Ok(scaled)
}

/// Brings supplied values to their stored form so the diff only sees real
/// changes.
fn normalize_update(mut payload: UpdateDonationPayload) -> Result<UpdateDonationPayload> {
    if let Some(amount) = payload.amount {
        payload.amount = Some(money(amount)?);
    }
    if let Some(currency) = payload.currency.as_mut() {
        *currency = currency.to_uppercase();
    }
    payload.donated_at = payload.donated_at.map(to_stored_precision);
    Ok(payload)
}

impl DonationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateDonationPayload) -> Result<Donation> {
        let amount = money(payload.amount)?;
        let currency = payload
            .currency
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let donated_at = to_stored_precision(payload.donated_at.unwrap_or_else(now));

        let donation = sqlx::query_as::<_, Donation>(
            r#"
            INSERT INTO donations (donor_name, donor_email, amount, currency, donated_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(payload.donor_name.trim())
        .bind(payload.donor_email)
        .bind(amount)
        .bind(currency)
        .bind(donated_at)
        .bind(payload.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(donation)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Donation> {
        sqlx::query_as::<_, Donation>(
            r#"SELECT * FROM donations WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Donation not found".to_string()))
    }

    pub async fn list(&self, query: DonationListQuery) -> Result<DonationList> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut filters = vec!["deleted_at IS NULL".to_string()];
        let mut args: Vec<String> = Vec::new();

        if let Some(currency) = query.currency {
            filters.push(format!("currency = ${}", args.len() + 1));
            args.push(currency.to_uppercase());
        }
        if let Some(search) = query.search {
            let first = args.len() + 1;
            let second = first + 1;
            filters.push(format!(
                "(donor_name ILIKE ${} OR donor_email ILIKE ${})",
                first, second
            ));
            args.push(format!("%{}%", search.clone()));
            args.push(format!("%{}%", search));
        }

        let where_clause = format!("WHERE {}", filters.join(" AND "));

        let items_query = format!(
            "SELECT * FROM donations {} ORDER BY donated_at DESC, id LIMIT ${} OFFSET ${}",
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM donations {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, Donation>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        items_statement = items_statement.bind(per_page).bind(offset);
        let items = items_statement.fetch_all(&self.pool).await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        let total_pages = ((total as f64) / (per_page as f64)).ceil() as i64;

        Ok(DonationList {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Applies a partial update and logs each changed field, all under a row
    /// lock in one transaction.
    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdateDonationPayload,
        changed_by: Uuid,
    ) -> Result<(Donation, Vec<AuditRecord>)> {
        let payload = normalize_update(payload)?;

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Donation>(
            r#"SELECT * FROM donations WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Donation not found".to_string()))?;

        let changes = diff_records(
            &to_record(&current)?,
            &to_record(&payload)?,
            DONATION_FIELDS,
            id,
            changed_by,
        );
        if changes.is_empty() {
            tx.commit().await?;
            return Ok((current, Vec::new()));
        }

        let updated = sqlx::query_as::<_, Donation>(
            r#"
            UPDATE donations
            SET
                donor_name = COALESCE($2, donor_name),
                donor_email = CASE WHEN $3 THEN $4 ELSE donor_email END,
                amount = COALESCE($5, amount),
                currency = COALESCE($6, currency),
                donated_at = COALESCE($7, donated_at),
                notes = CASE WHEN $8 THEN $9 ELSE notes END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.donor_name)
        .bind(payload.donor_email.is_some())
        .bind(payload.donor_email.flatten())
        .bind(payload.amount)
        .bind(payload.currency)
        .bind(payload.donated_at)
        .bind(payload.notes.is_some())
        .bind(payload.notes.flatten())
        .fetch_one(&mut *tx)
        .await?;

        let history = HistoryService::append(&mut *tx, DONATION_TABLE, &changes).await?;
        tx.commit().await?;

        Ok((updated, history))
    }

    pub async fn soft_delete(&self, id: Uuid, changed_by: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Donation>(
            r#"SELECT * FROM donations WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Donation not found".to_string()))?;

        let deleted = sqlx::query_as::<_, Donation>(
            r#"UPDATE donations SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 RETURNING *"#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let mut proposed = Record::new();
        proposed.insert("deletedAt".to_string(), json!(deleted.deleted_at));
        let changes = diff_records(
            &to_record(&current)?,
            &proposed,
            SOFT_DELETE_FIELDS,
            id,
            changed_by,
        );
        HistoryService::append(&mut *tx, DONATION_TABLE, &changes).await?;
        tx.commit().await?;

        tracing::info!(donation_id = %id, "donation soft-deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;

    fn stored() -> Donation {
        Donation {
            id: Uuid::new_v4(),
            donor_name: "Ada".to_string(),
            donor_email: Some("ada@example.org".to_string()),
            amount: Decimal::from_str("25.00").unwrap(),
            currency: "USD".to_string(),
            donated_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            notes: None,
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }

    #[test]
    fn money_normalizes_scale() {
        assert_eq!(money(Decimal::from_str("12.5").unwrap()).unwrap().to_string(), "12.50");
        assert_eq!(money(Decimal::from(3)).unwrap().to_string(), "3.00");
        assert!(money(Decimal::ZERO).is_err());
        assert!(money(Decimal::from_str("-1").unwrap()).is_err());
    }

    #[test]
    fn same_amount_at_different_scale_is_not_a_change() {
        let current = stored();
        let payload = normalize_update(UpdateDonationPayload {
            amount: Some(Decimal::from_str("25").unwrap()),
            currency: Some("usd".to_string()),
            ..Default::default()
        })
        .unwrap();

        let changes = diff_records(
            &to_record(&current).unwrap(),
            &to_record(&payload).unwrap(),
            DONATION_FIELDS,
            current.id,
            Uuid::nil(),
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn changed_fields_are_logged_under_column_names() {
        let current = stored();
        let payload = UpdateDonationPayload {
            donor_name: Some("Ada Lovelace".to_string()),
            notes: Some(Some("matched by employer".to_string())),
            donated_at: Some(current.donated_at),
            ..Default::default()
        };

        let changes = diff_records(
            &to_record(&current).unwrap(),
            &to_record(&payload).unwrap(),
            DONATION_FIELDS,
            current.id,
            Uuid::nil(),
        );

        let fields: Vec<_> = changes.iter().map(|c| c.field_changed.as_str()).collect();
        assert_eq!(fields, vec!["donor_name", "notes"]);
        assert_eq!(changes[1].old_value, None);
    }

    #[test]
    fn null_clears_notes_and_logs_the_old_value() {
        let mut current = stored();
        current.notes = Some("hello".to_string());
        let payload: UpdateDonationPayload =
            serde_json::from_value(serde_json::json!({"notes": null})).unwrap();

        let changes = diff_records(
            &to_record(&current).unwrap(),
            &to_record(&payload).unwrap(),
            DONATION_FIELDS,
            current.id,
            Uuid::nil(),
        );

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field_changed, "notes");
        assert_eq!(changes[0].old_value.as_deref(), Some("hello"));
        assert_eq!(changes[0].new_value, None);
    }

    #[test]
    fn null_on_an_empty_column_is_not_a_change() {
        let current = stored();
        let payload: UpdateDonationPayload =
            serde_json::from_value(serde_json::json!({"notes": null})).unwrap();

        let changes = diff_records(
            &to_record(&current).unwrap(),
            &to_record(&payload).unwrap(),
            DONATION_FIELDS,
            current.id,
            Uuid::nil(),
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn resent_timestamp_below_stored_precision_is_not_a_change() {
        let mut current = stored();
        current.donated_at = current.donated_at + chrono::Duration::microseconds(250);
        let payload = normalize_update(UpdateDonationPayload {
            donated_at: Some(current.donated_at + chrono::Duration::nanoseconds(999)),
            ..Default::default()
        })
        .unwrap();

        let changes = diff_records(
            &to_record(&current).unwrap(),
            &to_record(&payload).unwrap(),
            DONATION_FIELDS,
            current.id,
            Uuid::nil(),
        );
        assert!(changes.is_empty());
    }
}
