use bcrypt::{hash, verify, BcryptError};

/// One-way credential hashing, injected into the user service so tests can
/// substitute a cheap fake.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, BcryptError>;
    fn verify(&self, plain: &str, hashed: &str) -> Result<bool, BcryptError>;
}

/// bcrypt with a fixed work factor.
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub const DEFAULT_COST: u32 = 12;

    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plain: &str) -> Result<String, BcryptError> {
        hash(plain, self.cost)
    }

    fn verify(&self, plain: &str, hashed: &str) -> Result<bool, BcryptError> {
        verify(plain, hashed)
    }
}
