//! User repository implementation for PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use roster_core::error::{PaginationResult, StorageResult};
use roster_core::models::{NewUser, User, UserUpdate};
use roster_core::pagination::{
    paginate, paginate_cursor, Connection, CursorArgs, Page, PageArgs, PageSource,
};
use roster_core::ports::{OrderDirection, UserFilter, UserRepository};

use super::database::Database;
use super::helpers::{bind_params, map_query_error, parse_role, SqlParam};

const USER_COLUMNS: &str = "id, email, role, verified, created_at, updated_at";

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_query_error)?;

        row.into_user()
    }

    async fn get_user(&self, id: i64) -> StorageResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_query_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_query_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn get_password_hash(&self, id: i64) -> StorageResult<Option<String>> {
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)
    }

    async fn list_users(
        &self,
        filter: UserFilter,
        args: CursorArgs,
        order: OrderDirection,
    ) -> PaginationResult<Connection<User>> {
        let source = UserPageSource::new(self.pool.clone(), &filter, order);
        paginate_cursor(&source, &args, User::CURSOR_TYPE, |user: &User| {
            user.id.to_string()
        })
        .await
    }

    async fn paginate_users(
        &self,
        filter: UserFilter,
        args: PageArgs,
    ) -> PaginationResult<Page<User>> {
        let source = UserPageSource::new(self.pool.clone(), &filter, OrderDirection::Asc);
        paginate(&source, args).await
    }

    async fn count_users(&self) -> StorageResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(count as u64)
    }

    async fn update_user(&self, id: i64, update: UserUpdate) -> StorageResult<Option<User>> {
        // Build SET clause dynamically: column names are hardcoded, all
        // values are bound parameters.
        let mut sets = Vec::new();
        let mut params = Vec::new();

        if let Some(email) = update.email {
            params.push(SqlParam::Text(email));
            sets.push(format!("email = ${}", params.len()));
        }
        if let Some(role) = update.role {
            params.push(SqlParam::Text(role.as_str().to_string()));
            sets.push(format!("role = ${}", params.len()));
        }
        if let Some(verified) = update.verified {
            params.push(SqlParam::Flag(verified));
            sets.push(format!("verified = ${}", params.len()));
        }

        if sets.is_empty() {
            return self.get_user(id).await;
        }

        sets.push("updated_at = NOW()".to_string());
        params.push(SqlParam::Int(id));

        let sql = format!(
            "UPDATE users SET {} WHERE id = ${} RETURNING {USER_COLUMNS}",
            sets.join(", "),
            params.len()
        );

        let query = bind_params!(sqlx::query_as::<_, UserRow>(&sql), &params);
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn delete_user(&self, id: i64) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Page Source
// =============================================================================

/// One concrete user list query: filter and ordering are fixed at
/// construction, the pagination engine drives offset and count.
struct UserPageSource {
    pool: PgPool,
    where_clause: String,
    params: Vec<SqlParam>,
    order: OrderDirection,
}

impl UserPageSource {
    fn new(pool: PgPool, filter: &UserFilter, order: OrderDirection) -> Self {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(role) = filter.role {
            params.push(SqlParam::Text(role.as_str().to_string()));
            conditions.push(format!("role = ${}", params.len()));
        }
        if let Some(verified) = filter.verified {
            params.push(SqlParam::Flag(verified));
            conditions.push(format!("verified = ${}", params.len()));
        }
        if let Some(fragment) = &filter.email_contains {
            params.push(SqlParam::Text(format!("%{fragment}%")));
            conditions.push(format!("email ILIKE ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        Self {
            pool,
            where_clause,
            params,
            order,
        }
    }
}

#[async_trait]
impl PageSource for UserPageSource {
    type Item = User;

    async fn fetch(&self, offset: u64, limit: Option<u64>) -> StorageResult<Vec<User>> {
        let order_sql = match self.order {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        };

        let mut sql = format!(
            "SELECT {USER_COLUMNS} FROM users {} ORDER BY id {} OFFSET {}",
            self.where_clause, order_sql, offset
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let query = bind_params!(sqlx::query_as::<_, UserRow>(&sql), &self.params);
        let rows = query.fetch_all(&self.pool).await.map_err(map_query_error)?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn count(&self) -> StorageResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM users {}", self.where_clause);
        let query = bind_params!(sqlx::query_scalar::<_, i64>(&sql), &self.params);
        let count = query.fetch_one(&self.pool).await.map_err(map_query_error)?;

        Ok(count as u64)
    }
}

// =============================================================================
// Row Conversion
// =============================================================================

/// Database row representation for User. Never selects the password hash.
#[derive(sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub verified: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserRow {
    pub(crate) fn into_user(self) -> StorageResult<User> {
        Ok(User {
            id: self.id,
            email: self.email,
            role: parse_role(&self.role, "users.role")?,
            verified: self.verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
