use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::CreateUser;

// Shape check only ("something@something.something"), not full RFC parsing.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Trim and lowercase, the canonical storage form for emails.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Strip everything that is not an ASCII digit (CPF, telefone, CEP).
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// CPF check-digit validation: strip formatting, require 11 digits, reject
/// the all-identical sequences, then verify both mod-11 check digits.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    // Check digit over the first `len` digits, weighted (len+1)..=2.
    let check_digit = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
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

    check_digit(9) == digits[9] && check_digit(10) == digits[10]
}

/// Validate a registration payload against the raw (pre-normalization) field
/// rules. Every violation is collected; nothing short-circuits.
pub fn validate_new_user(data: &CreateUser) -> Vec<String> {
    let mut errors = Vec::new();

    // Limits are in characters, not bytes; accented names must not be
    // miscounted.
    if data.nome.trim().is_empty() {
        errors.push("Nome é obrigatório".to_string());
    } else if data.nome.trim().chars().count() > 100 {
        errors.push("Nome deve ter no máximo 100 caracteres".to_string());
    }

    if data.cpf.trim().is_empty() {
        errors.push("CPF é obrigatório".to_string());
    } else if digits_only(&data.cpf).len() != 11 {
        errors.push("CPF deve conter exatamente 11 dígitos".to_string());
    } else if !is_valid_cpf(&data.cpf) {
        errors.push("CPF inválido".to_string());
    }

    if data.email.trim().is_empty() {
        errors.push("Email é obrigatório".to_string());
    } else if data.email.chars().count() > 100 {
        errors.push("Email deve ter no máximo 100 caracteres".to_string());
    } else if !is_valid_email(&data.email) {
        errors.push("Email deve ter um formato válido".to_string());
    }

    if let Some(telefone) = &data.telefone {
        if telefone.chars().count() > 15 {
            errors.push("Telefone deve ter no máximo 15 caracteres".to_string());
        }
    }

    if let Some(cep) = &data.cep {
        if digits_only(cep).len() != 8 {
            errors.push("CEP deve conter exatamente 8 dígitos".to_string());
        }
    }

    let senha_chars = data.senha.chars().count();
    if senha_chars < 6 {
        errors.push("Senha deve ter pelo menos 6 caracteres".to_string());
    } else if senha_chars > 255 {
        errors.push("Senha deve ter no máximo 255 caracteres".to_string());
    }

    errors
}
