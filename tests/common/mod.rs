#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use hotel_accounts::auth::PasswordHasher;
use hotel_accounts::error::UserError;
use hotel_accounts::models::{CreateUser, User};
use hotel_accounts::services::UserService;
use hotel_accounts::store::{NewUserRecord, UserPatch, UserStore};

/// In-memory stand-in for the Postgres store. Mirrors its visibility
/// semantics: lookups skip soft-deleted rows unless asked otherwise, and
/// patches only touch active rows.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<User>>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

fn visible(user: &User, include_deleted: bool) -> bool {
    include_deleted || !user.is_deleted()
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, record: NewUserRecord) -> Result<User, UserError> {
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            nome: record.nome,
            cpf: record.cpf,
            email: record.email,
            telefone: record.telefone,
            cep: record.cep,
            senha: record.senha,
            created_at: record.created_at,
            updated_at: record.updated_at,
            deleted_at: None,
        };
        self.rows.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64, include_deleted: bool) -> Result<Option<User>, UserError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|u| u.id == id && visible(u, include_deleted))
            .cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
        include_deleted: bool,
    ) -> Result<Option<User>, UserError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|u| u.email == email && visible(u, include_deleted))
            .cloned())
    }

    async fn find_by_cpf(
        &self,
        cpf: &str,
        include_deleted: bool,
    ) -> Result<Option<User>, UserError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|u| u.cpf == cpf && visible(u, include_deleted))
            .cloned())
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
        include_deleted: bool,
    ) -> Result<(Vec<User>, u64), UserError> {
        let rows = self.rows.lock().unwrap();
        let mut matching: Vec<User> = rows
            .iter()
            .filter(|u| visible(u, include_deleted))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }

    async fn apply_patch(&self, id: i64, patch: UserPatch) -> Result<Option<User>, UserError> {
        let mut rows = self.rows.lock().unwrap();
        let user = match rows.iter_mut().find(|u| u.id == id && !u.is_deleted()) {
            Some(user) => user,
            None => return Ok(None),
        };

        if let Some(nome) = patch.nome {
            user.nome = nome;
        }
        if let Some(cpf) = patch.cpf {
            user.cpf = cpf;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(telefone) = patch.telefone {
            user.telefone = Some(telefone);
        }
        if let Some(cep) = patch.cep {
            user.cep = Some(cep);
        }
        if let Some(senha) = patch.senha {
            user.senha = senha;
        }
        user.updated_at = patch.updated_at;

        Ok(Some(user.clone()))
    }

    async fn set_deleted_at(
        &self,
        id: i64,
        deleted_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserError> {
        let mut rows = self.rows.lock().unwrap();
        let user = match rows.iter_mut().find(|u| u.id == id) {
            Some(user) => user,
            None => return Ok(None),
        };

        user.deleted_at = deleted_at;
        user.updated_at = updated_at;

        Ok(Some(user.clone()))
    }
}

/// Deterministic hasher so service tests do not pay for bcrypt.
pub struct FakeHasher;

impl PasswordHasher for FakeHasher {
    fn hash(&self, plain: &str) -> Result<String, bcrypt::BcryptError> {
        Ok(format!("hashed${plain}"))
    }

    fn verify(&self, plain: &str, hashed: &str) -> Result<bool, bcrypt::BcryptError> {
        Ok(hashed == format!("hashed${plain}"))
    }
}

pub fn test_service() -> UserService {
    UserService::new(
        std::sync::Arc::new(MemoryUserStore::new()),
        std::sync::Arc::new(FakeHasher),
    )
}

/// Builds a checksum-valid CPF from a 9-digit base.
pub fn cpf_from_base(base: u64) -> String {
    let mut digits: Vec<u32> = format!("{:09}", base % 1_000_000_000)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    let check_digit = |digits: &[u32]| -> u32 {
        let len = digits.len();
        let sum: u32 = digits
            .iter()
            .zip((2..=len as u32 + 1).rev())
            .map(|(&d, w)| d * w)
            .sum();
        let remainder = 11 - (sum % 11);
        if remainder >= 10 {
            0
        } else {
            remainder
        }
    };

    let d10 = check_digit(&digits);
    digits.push(d10);
    let d11 = check_digit(&digits);
    digits.push(d11);

    digits
        .into_iter()
        .filter_map(|d| char::from_digit(d, 10))
        .collect()
}

pub fn sample_user(n: u64) -> CreateUser {
    CreateUser {
        nome: format!("Hóspede {n}"),
        cpf: cpf_from_base(100_000_001 + n * 7),
        email: format!("hospede{n}@example.com"),
        telefone: Some("(11) 98765-4321".to_string()),
        cep: Some("01310-100".to_string()),
        senha: "segredo123".to_string(),
    }
}
