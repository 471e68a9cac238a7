// src/common/password.rs

use bcrypt::{hash, verify};

use crate::common::error::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Política de senha: mínimo de 8 caracteres, com maiúscula, minúscula, dígito e símbolo.
pub fn check_policy(password: &str) -> Result<(), AppError> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LENGTH;
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if long_enough && has_upper && has_lower && has_digit && has_symbol {
        Ok(())
    } else {
        Err(AppError::invalid(format!(
            "A senha deve ter no mínimo {MIN_PASSWORD_LENGTH} caracteres, com letra maiúscula, \
             letra minúscula, número e símbolo."
        )))
    }
}

// O bcrypt é caro em CPU: roda em uma thread separada para não travar o runtime.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

/// `true` se a senha já foi usada (qualquer hash do histórico confere).
pub async fn was_used_before(password: &str, history: &[String]) -> Result<bool, AppError> {
    for old_hash in history {
        if verify_password(password, old_hash).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_requires_every_character_class() {
        assert!(check_policy("Str0ng!Pass").is_ok());
        assert!(check_policy("Sh0rt!").is_err());
        assert!(check_policy("nouppercase1!").is_err());
        assert!(check_policy("NOLOWERCASE1!").is_err());
        assert!(check_policy("NoDigitsHere!").is_err());
        assert!(check_policy("NoSymbols123").is_err());
    }

    #[tokio::test]
    async fn hash_and_verify() {
        let hashed = hash_password("Str0ng!Pass", 4).await.unwrap();
        assert!(verify_password("Str0ng!Pass", &hashed).await.unwrap());
        assert!(!verify_password("Wr0ng!Pass", &hashed).await.unwrap());
        assert!(was_used_before("Str0ng!Pass", &[hashed]).await.unwrap());
    }
}
