use crate::dto::vendor_dto::{CreateVendorPayload, UpdateVendorPayload, VendorListQuery};
use crate::error::{Error, Result};
use crate::models::audit_record::AuditRecord;
use crate::models::vendor::Vendor;
use crate::services::donation_service::SOFT_DELETE_FIELDS;
use crate::services::history_service::{
    diff_records, to_record, FieldMapping, HistoryService, Record,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

pub const VENDOR_TABLE: &str = "vendors";

pub const VENDOR_FIELDS: &FieldMapping = &[
    ("name", "name"),
    ("contactEmail", "contact_email"),
    ("phone", "phone"),
    ("category", "category"),
];

#[derive(Clone)]
pub struct VendorService {
    pool: PgPool,
}

pub struct VendorList {
    pub items: Vec<Vendor>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl VendorService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateVendorPayload) -> Result<Vendor> {
        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            INSERT INTO vendors (name, contact_email, phone, category)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.contact_email)
        .bind(payload.phone)
        .bind(payload.category)
        .fetch_one(&self.pool)
        .await?;

        Ok(vendor)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Vendor> {
        sqlx::query_as::<_, Vendor>(r#"SELECT * FROM vendors WHERE id = $1 AND deleted_at IS NULL"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Vendor not found".to_string()))
    }

    pub async fn list(&self, query: VendorListQuery) -> Result<VendorList> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut filters = vec!["deleted_at IS NULL".to_string()];
        let mut args: Vec<String> = Vec::new();

        if let Some(category) = query.category {
            filters.push(format!("category = ${}", args.len() + 1));
            args.push(category);
        }
        if let Some(search) = query.search {
            filters.push(format!("name ILIKE ${}", args.len() + 1));
            args.push(format!("%{}%", search));
        }

        let where_clause = format!("WHERE {}", filters.join(" AND "));

        let items_query = format!(
            "SELECT * FROM vendors {} ORDER BY name ASC, id LIMIT ${} OFFSET ${}",
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM vendors {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, Vendor>(&items_query);
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

        Ok(VendorList {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdateVendorPayload,
        changed_by: Uuid,
    ) -> Result<(Vendor, Vec<AuditRecord>)> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Vendor>(
            r#"SELECT * FROM vendors WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Vendor not found".to_string()))?;

        let changes = diff_records(
            &to_record(&current)?,
            &to_record(&payload)?,
            VENDOR_FIELDS,
            id,
            changed_by,
        );
        if changes.is_empty() {
            tx.commit().await?;
            return Ok((current, Vec::new()));
        }

        let updated = sqlx::query_as::<_, Vendor>(
            r#"
            UPDATE vendors
            SET
                name = COALESCE($2, name),
                contact_email = CASE WHEN $3 THEN $4 ELSE contact_email END,
                phone = CASE WHEN $5 THEN $6 ELSE phone END,
                category = CASE WHEN $7 THEN $8 ELSE category END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.name)
        .bind(payload.contact_email.is_some())
        .bind(payload.contact_email.flatten())
        .bind(payload.phone.is_some())
        .bind(payload.phone.flatten())
        .bind(payload.category.is_some())
        .bind(payload.category.flatten())
        .fetch_one(&mut *tx)
        .await?;

        let history = HistoryService::append(&mut *tx, VENDOR_TABLE, &changes).await?;
        tx.commit().await?;

        Ok((updated, history))
    }

    pub async fn soft_delete(&self, id: Uuid, changed_by: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Vendor>(
            r#"SELECT * FROM vendors WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Vendor not found".to_string()))?;

        let deleted = sqlx::query_as::<_, Vendor>(
            r#"UPDATE vendors SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 RETURNING *"#,
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
        HistoryService::append(&mut *tx, VENDOR_TABLE, &changes).await?;
        tx.commit().await?;

        tracing::info!(vendor_id = %id, "vendor soft-deleted");
        Ok(())
    }
}
