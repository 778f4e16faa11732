// Record store capability over the usuarios table

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::UserError;
use crate::models::User;

/// Fully normalized row ready for insertion; `senha` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub nome: String,
    pub cpf: String,
    pub email: String,
    pub telefone: Option<String>,
    pub cep: Option<String>,
    pub senha: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column-level patch, normalized and hashed by the service. Absent fields
/// keep their stored value.
#[derive(Debug, Clone)]
pub struct UserPatch {
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub cep: Option<String>,
    pub senha: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// The table behind the user lifecycle, injected into the service so tests
/// can run against an in-memory implementation. Lookups take an
/// `include_deleted` flag; with it unset, soft-deleted rows are invisible.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, record: NewUserRecord) -> Result<User, UserError>;

    async fn find_by_id(&self, id: i64, include_deleted: bool) -> Result<Option<User>, UserError>;

    async fn find_by_email(
        &self,
        email: &str,
        include_deleted: bool,
    ) -> Result<Option<User>, UserError>;

    async fn find_by_cpf(&self, cpf: &str, include_deleted: bool)
        -> Result<Option<User>, UserError>;

    /// Page of rows ordered by `created_at` descending, plus the total count
    /// under the same visibility filter.
    async fn list(
        &self,
        limit: i64,
        offset: i64,
        include_deleted: bool,
    ) -> Result<(Vec<User>, u64), UserError>;

    /// Applies the patch to an active row; `None` when no active row matches.
    async fn apply_patch(&self, id: i64, patch: UserPatch) -> Result<Option<User>, UserError>;

    /// Sets or clears the soft-delete marker regardless of current state.
    async fn set_deleted_at(
        &self,
        id: i64,
        deleted_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserError>;
}
