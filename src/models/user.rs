use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `usuarios` table. `senha` holds the bcrypt hash, never the
/// plaintext. `deleted_at` is the soft-delete marker: `None` means active.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub nome: String,
    pub cpf: String,
    pub email: String,
    pub telefone: Option<String>,
    pub cep: Option<String>,
    pub senha: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Projection returned to callers: everything except the password hash.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            nome: self.nome.clone(),
            cpf: self.cpf.clone(),
            email: self.email.clone(),
            telefone: self.telefone.clone(),
            cep: self.cep.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: i64,
    pub nome: String,
    pub cpf: String,
    pub email: String,
    pub telefone: Option<String>,
    pub cep: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Registration payload as received from the form, before any normalization.
/// Fields are defaulted so an incomplete body reaches the validator and gets
/// the required-field messages instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateUser {
    pub nome: String,
    pub cpf: String,
    pub email: String,
    pub telefone: Option<String>,
    pub cep: Option<String>,
    pub senha: String,
}

/// Partial patch: absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub nome: Option<String>,
    pub cpf: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub cep: Option<String>,
    pub senha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct UserPage {
    pub items: Vec<PublicUser>,
    pub pagination: Pagination,
}

/// Outcome of a credential check. An absent user means the email is unknown
/// among active accounts; that is a normal outcome, not an error.
#[derive(Debug, Serialize)]
pub struct PasswordVerification {
    pub valid: bool,
    pub user: Option<PublicUser>,
}
