// Password hashing capability

pub mod password;

pub use password::{BcryptHasher, PasswordHasher};
