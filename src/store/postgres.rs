use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::UserError;
use crate::models::User;
use crate::store::{NewUserRecord, UserPatch, UserStore};

const COLUMNS: &str = "id, nome, cpf, email, telefone, cep, senha, created_at, updated_at, deleted_at";

/// `UserStore` over a shared Postgres pool. Rows are decoded through the
/// typed `User` mapping, so a row missing a required column fails the call
/// instead of leaking nulls into the domain.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_by_column(
        &self,
        column: &str,
        value: &str,
        include_deleted: bool,
    ) -> Result<Option<User>, UserError> {
        let filter = if include_deleted {
            ""
        } else {
            " AND deleted_at IS NULL"
        };
        let sql =
            format!("SELECT {COLUMNS} FROM usuarios WHERE {column} = $1{filter}");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, record: NewUserRecord) -> Result<User, UserError> {
        let sql = format!(
            "INSERT INTO usuarios (nome, cpf, email, telefone, cep, senha, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&record.nome)
            .bind(&record.cpf)
            .bind(&record.email)
            .bind(&record.telefone)
            .bind(&record.cep)
            .bind(&record.senha)
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(&self.db)
            .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64, include_deleted: bool) -> Result<Option<User>, UserError> {
        let filter = if include_deleted {
            ""
        } else {
            " AND deleted_at IS NULL"
        };
        let sql = format!("SELECT {COLUMNS} FROM usuarios WHERE id = $1{filter}");

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn find_by_email(
        &self,
        email: &str,
        include_deleted: bool,
    ) -> Result<Option<User>, UserError> {
        self.find_by_column("email", email, include_deleted).await
    }

    async fn find_by_cpf(
        &self,
        cpf: &str,
        include_deleted: bool,
    ) -> Result<Option<User>, UserError> {
        self.find_by_column("cpf", cpf, include_deleted).await
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
        include_deleted: bool,
    ) -> Result<(Vec<User>, u64), UserError> {
        let filter = if include_deleted {
            ""
        } else {
            " WHERE deleted_at IS NULL"
        };

        let sql = format!(
            "SELECT {COLUMNS} FROM usuarios{filter} ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM usuarios{filter}");
        let total: i64 = sqlx::query_scalar(&count_sql).fetch_one(&self.db).await?;

        Ok((users, total as u64))
    }

    async fn apply_patch(&self, id: i64, patch: UserPatch) -> Result<Option<User>, UserError> {
        let sql = format!(
            "UPDATE usuarios
             SET nome = COALESCE($2, nome),
                 cpf = COALESCE($3, cpf),
                 email = COALESCE($4, email),
                 telefone = COALESCE($5, telefone),
                 cep = COALESCE($6, cep),
                 senha = COALESCE($7, senha),
                 updated_at = $8
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&patch.nome)
            .bind(&patch.cpf)
            .bind(&patch.email)
            .bind(&patch.telefone)
            .bind(&patch.cep)
            .bind(&patch.senha)
            .bind(patch.updated_at)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn set_deleted_at(
        &self,
        id: i64,
        deleted_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserError> {
        let sql = format!(
            "UPDATE usuarios SET deleted_at = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(deleted_at)
            .bind(updated_at)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }
}
