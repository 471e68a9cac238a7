// src/common/tokens.rs

use rand::Rng;
use rand::distr::Alphanumeric;

/// Identificador de tenant no formato `tenant-<inteiro aleatório>`.
pub fn generate_tenant_id() -> String {
    let n: u32 = rand::rng().random_range(100_000..1_000_000_000);
    format!("tenant-{n}")
}

/// Código OTP de 6 dígitos.
pub fn generate_otp() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}

/// Token opaco para o link de redefinição de senha.
pub fn generate_reset_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_ids_have_the_expected_shape() {
        let id = generate_tenant_id();
        let suffix = id.strip_prefix("tenant-").unwrap();
        assert!(suffix.parse::<u32>().is_ok());
    }

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..50 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn reset_tokens_are_unique() {
        assert_ne!(generate_reset_token(), generate_reset_token());
        assert_eq!(generate_reset_token().len(), 48);
    }
}
