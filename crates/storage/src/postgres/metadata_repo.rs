//! User metadata repository implementation for PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use roster_core::error::{PaginationResult, StorageResult};
use roster_core::models::{NewUserMetadata, UserMetadata, UserMetadataUpdate};
use roster_core::pagination::{paginate_cursor, Connection, CursorArgs, PageSource};
use roster_core::ports::UserMetadataRepository;

use super::database::Database;
use super::helpers::{bind_params, map_query_error, SqlParam};

const METADATA_COLUMNS: &str = "id, user_id, first_name, last_name, email, country, \
     postal_code, address, phone, signup_id, unit_no, state_province, created_at, updated_at";

/// PostgreSQL implementation of UserMetadataRepository.
pub struct PgUserMetadataRepository {
    pool: PgPool,
}

impl PgUserMetadataRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl UserMetadataRepository for PgUserMetadataRepository {
    async fn create_metadata(
        &self,
        user_id: i64,
        metadata: NewUserMetadata,
    ) -> StorageResult<UserMetadata> {
        let row = sqlx::query_as::<_, MetadataRow>(&format!(
            r#"
            INSERT INTO user_metadata (
                user_id, first_name, last_name, email, country,
                postal_code, address, phone, signup_id, unit_no, state_province
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {METADATA_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&metadata.first_name)
        .bind(&metadata.last_name)
        .bind(&metadata.email)
        .bind(&metadata.country)
        .bind(&metadata.postal_code)
        .bind(&metadata.address)
        .bind(&metadata.phone)
        .bind(&metadata.signup_id)
        .bind(&metadata.unit_no)
        .bind(&metadata.state_province)
        .fetch_one(&self.pool)
        .await
        .map_err(map_query_error)?;

        Ok(row.into_metadata())
    }

    async fn get_metadata_for_user(&self, user_id: i64) -> StorageResult<Option<UserMetadata>> {
        let row = sqlx::query_as::<_, MetadataRow>(&format!(
            "SELECT {METADATA_COLUMNS} FROM user_metadata WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_query_error)?;

        Ok(row.map(MetadataRow::into_metadata))
    }

    async fn list_metadata(&self, args: CursorArgs) -> PaginationResult<Connection<UserMetadata>> {
        let source = MetadataPageSource {
            pool: self.pool.clone(),
        };
        paginate_cursor(&source, &args, UserMetadata::CURSOR_TYPE, |metadata: &UserMetadata| {
            metadata.id.to_string()
        })
        .await
    }

    async fn count_metadata(&self) -> StorageResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_metadata")
            .fetch_one(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(count as u64)
    }

    async fn update_metadata(
        &self,
        user_id: i64,
        update: UserMetadataUpdate,
    ) -> StorageResult<Option<UserMetadata>> {
        // Same dynamic SET pattern as the user repository: hardcoded
        // column names, bound values only.
        let mut sets = Vec::new();
        let mut params = Vec::new();

        let mut push_text = |column: &str, value: Option<String>| {
            if let Some(value) = value {
                params.push(SqlParam::Text(value));
                sets.push(format!("{column} = ${}", params.len()));
            }
        };

        push_text("first_name", update.first_name);
        push_text("last_name", update.last_name);
        push_text("email", update.email);
        push_text("country", update.country);
        push_text("postal_code", update.postal_code);
        push_text("address", update.address);
        push_text("phone", update.phone);
        push_text("unit_no", update.unit_no);
        push_text("state_province", update.state_province);

        if sets.is_empty() {
            return self.get_metadata_for_user(user_id).await;
        }

        sets.push("updated_at = NOW()".to_string());
        params.push(SqlParam::Int(user_id));

        let sql = format!(
            "UPDATE user_metadata SET {} WHERE user_id = ${} RETURNING {METADATA_COLUMNS}",
            sets.join(", "),
            params.len()
        );

        let query = bind_params!(sqlx::query_as::<_, MetadataRow>(&sql), &params);
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(row.map(MetadataRow::into_metadata))
    }

    async fn delete_metadata_for_user(&self, user_id: i64) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM user_metadata WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Page Source
// =============================================================================

/// Metadata listing has no filters; ordering is by id ascending.
struct MetadataPageSource {
    pool: PgPool,
}

#[async_trait]
impl PageSource for MetadataPageSource {
    type Item = UserMetadata;

    async fn fetch(&self, offset: u64, limit: Option<u64>) -> StorageResult<Vec<UserMetadata>> {
        let mut sql = format!(
            "SELECT {METADATA_COLUMNS} FROM user_metadata ORDER BY id ASC OFFSET {offset}"
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let rows = sqlx::query_as::<_, MetadataRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(rows.into_iter().map(MetadataRow::into_metadata).collect())
    }

    async fn count(&self) -> StorageResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_metadata")
            .fetch_one(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(count as u64)
    }
}

// =============================================================================
// Row Conversion
// =============================================================================

/// Database row representation for UserMetadata.
#[derive(sqlx::FromRow)]
pub(crate) struct MetadataRow {
    pub id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub postal_code: String,
    pub address: String,
    pub phone: Option<String>,
    pub signup_id: Option<String>,
    pub unit_no: Option<String>,
    pub state_province: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl MetadataRow {
    pub(crate) fn into_metadata(self) -> UserMetadata {
        UserMetadata {
            id: self.id,
            user_id: self.user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            country: self.country,
            postal_code: self.postal_code,
            address: self.address,
            phone: self.phone,
            signup_id: self.signup_id,
            unit_no: self.unit_no,
            state_province: self.state_province,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
