use std::sync::Arc;

use chrono::Utc;

use crate::auth::PasswordHasher;
use crate::error::UserError;
use crate::models::{
    digits_only, normalize_email, validate_new_user, CreateUser, Pagination, PasswordVerification,
    PublicUser, UpdateUser, User, UserPage,
};
use crate::store::{NewUserRecord, UserPatch, UserStore};

// Blank patch values mean "leave the field alone", matching forms that
// submit empty inputs for untouched fields. A blank value must never reach
// the store, where digits_only("") would break the cep/cpf digit rules.
fn patch_value(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Orchestrates validation, normalization, hashing and the record store for
/// the user lifecycle. Uniqueness pre-checks and the following write are not
/// atomic against concurrent writers; the partial unique indexes in the
/// migration are the backstop for that race.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Validate, enforce email/CPF uniqueness among active rows, hash the
    /// password and insert.
    pub async fn create(&self, data: CreateUser) -> Result<PublicUser, UserError> {
        let errors = validate_new_user(&data);
        if !errors.is_empty() {
            return Err(UserError::Validation(errors));
        }

        let email = normalize_email(&data.email);
        if self.store.find_by_email(&email, false).await?.is_some() {
            return Err(UserError::Conflict("Email já está em uso".to_string()));
        }

        let cpf = digits_only(&data.cpf);
        if self.store.find_by_cpf(&cpf, false).await?.is_some() {
            return Err(UserError::Conflict("CPF já está em uso".to_string()));
        }

        let senha = self.hasher.hash(&data.senha)?;
        let now = Utc::now();

        let user = self
            .store
            .insert(NewUserRecord {
                nome: data.nome.trim().to_string(),
                cpf,
                email,
                telefone: data.telefone.as_deref().map(digits_only),
                cep: data.cep.as_deref().map(digits_only),
                senha,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(user_id = user.id, "user created");
        Ok(user.to_public())
    }

    /// Absence is a normal outcome for lookups, never an error.
    pub async fn find_by_id(
        &self,
        id: i64,
        include_deleted: bool,
    ) -> Result<Option<User>, UserError> {
        self.store.find_by_id(id, include_deleted).await
    }

    pub async fn find_by_email(
        &self,
        email: &str,
        include_deleted: bool,
    ) -> Result<Option<User>, UserError> {
        self.store
            .find_by_email(&normalize_email(email), include_deleted)
            .await
    }

    pub async fn find_by_cpf(
        &self,
        cpf: &str,
        include_deleted: bool,
    ) -> Result<Option<User>, UserError> {
        self.store
            .find_by_cpf(&digits_only(cpf), include_deleted)
            .await
    }

    /// Newest-first page plus the total count under the same filter.
    pub async fn list_page(
        &self,
        page: u32,
        limit: u32,
        include_deleted: bool,
    ) -> Result<UserPage, UserError> {
        let page = page.max(1);
        let limit = limit.max(1);
        // extreme page/limit query values must not overflow the i64 offset
        let offset = (page as i64 - 1).saturating_mul(limit as i64);

        let (users, total) = self.store.list(limit as i64, offset, include_deleted).await?;

        Ok(UserPage {
            items: users.iter().map(User::to_public).collect(),
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages: total.div_ceil(limit as u64),
            },
        })
    }

    /// Partial patch: absent fields are left untouched; email/CPF changes
    /// re-run the uniqueness checks against other active rows; a new password
    /// is re-hashed.
    pub async fn update(&self, id: i64, data: UpdateUser) -> Result<PublicUser, UserError> {
        let current = self
            .store
            .find_by_id(id, false)
            .await?
            .ok_or(UserError::NotFound)?;

        let email = patch_value(data.email.as_deref()).map(normalize_email);
        if let Some(email) = &email {
            if *email != current.email {
                if let Some(other) = self.store.find_by_email(email, false).await? {
                    if other.id != id {
                        return Err(UserError::Conflict(
                            "Email já está em uso por outro usuário".to_string(),
                        ));
                    }
                }
            }
        }

        let cpf = patch_value(data.cpf.as_deref()).map(digits_only);
        if let Some(cpf) = &cpf {
            if *cpf != current.cpf {
                if let Some(other) = self.store.find_by_cpf(cpf, false).await? {
                    if other.id != id {
                        return Err(UserError::Conflict(
                            "CPF já está em uso por outro usuário".to_string(),
                        ));
                    }
                }
            }
        }

        let senha = match data.senha.as_deref().filter(|s| !s.is_empty()) {
            Some(plain) => Some(self.hasher.hash(plain)?),
            None => None,
        };

        let patch = UserPatch {
            nome: patch_value(data.nome.as_deref()).map(|n| n.trim().to_string()),
            cpf,
            email,
            telefone: patch_value(data.telefone.as_deref()).map(digits_only),
            cep: patch_value(data.cep.as_deref()).map(digits_only),
            senha,
            updated_at: Utc::now(),
        };

        let user = self
            .store
            .apply_patch(id, patch)
            .await?
            .ok_or(UserError::NotFound)?;

        tracing::info!(user_id = user.id, "user updated");
        Ok(user.to_public())
    }

    /// ACTIVE -> DELETED. Soft-deleting a deleted record is an error, not a
    /// no-op.
    pub async fn soft_delete(&self, id: i64) -> Result<PublicUser, UserError> {
        let user = self
            .store
            .find_by_id(id, true)
            .await?
            .ok_or(UserError::NotFound)?;

        if user.is_deleted() {
            return Err(UserError::AlreadyDeleted);
        }

        let now = Utc::now();
        let user = self
            .store
            .set_deleted_at(id, Some(now), now)
            .await?
            .ok_or(UserError::NotFound)?;

        tracing::info!(user_id = user.id, "user soft-deleted");
        Ok(user.to_public())
    }

    /// DELETED -> ACTIVE. Restoring an active record is an error.
    pub async fn restore(&self, id: i64) -> Result<PublicUser, UserError> {
        let user = self
            .store
            .find_by_id(id, true)
            .await?
            .ok_or(UserError::NotFound)?;

        if !user.is_deleted() {
            return Err(UserError::NotDeleted);
        }

        let now = Utc::now();
        let user = self
            .store
            .set_deleted_at(id, None, now)
            .await?
            .ok_or(UserError::NotFound)?;

        tracing::info!(user_id = user.id, "user restored");
        Ok(user.to_public())
    }

    /// Checks a plaintext password against the stored hash for an active
    /// account. Unknown email and wrong password are both normal outcomes.
    /// The projection is returned even when the password does not match,
    /// matching the existing API contract; callers decide what to expose.
    pub async fn verify_password(
        &self,
        email: &str,
        senha: &str,
    ) -> Result<PasswordVerification, UserError> {
        let user = match self.find_by_email(email, false).await? {
            Some(user) => user,
            None => {
                return Ok(PasswordVerification {
                    valid: false,
                    user: None,
                })
            }
        };

        let valid = self.hasher.verify(senha, &user.senha)?;

        Ok(PasswordVerification {
            valid,
            user: Some(user.to_public()),
        })
    }
}
