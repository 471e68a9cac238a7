// src/services/auth.rs

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::{
        error::AppError,
        password::{check_policy, hash_password, verify_password, was_used_before},
        tokens::{generate_otp, generate_reset_token},
    },
    db::{AccountRepository, HospitalRepository},
    models::{
        account::{Account, AccountStatus, NewAccount, Role},
        auth::{Claims, Principal, ADMIN_ROLE},
    },
    services::mailer::Mailer,
};

#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub otp_ttl: Duration,
    pub reset_ttl: Duration,
    pub bcrypt_cost: u32,
}

// Dados de cadastro já validados pelo handler
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialization: Option<String>,
    pub role: Role,
}

// O OTP só confirma o e-mail. Com departamento escolhido, `is_verified` passa a
// ser a aprovação do admin (médico) ou do médico (enfermeiro).
fn reject_otp_after_department(account: &Account) -> Result<(), AppError> {
    if account.has_department() {
        return Err(AppError::forbidden(
            "Conta vinculada a um departamento: a aprovação é feita pelo responsável.",
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    hospitals: Arc<dyn HospitalRepository>,
    mailer: Arc<dyn Mailer>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        hospitals: Arc<dyn HospitalRepository>,
        mailer: Arc<dyn Mailer>,
        settings: AuthSettings,
    ) -> Self {
        Self { accounts, hospitals, mailer, settings }
    }

    /// Cria a conta (não verificada) e envia o OTP por e-mail.
    pub async fn register_account(&self, input: Registration) -> Result<Account, AppError> {
        if !input.role.is_self_registrable() {
            return Err(AppError::invalid("Este papel não pode ser escolhido no cadastro."));
        }
        check_policy(&input.password)?;

        let email = input.email.trim().to_lowercase();
        if self.hospitals.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Este e-mail já está em uso."));
        }

        let password_hash = hash_password(&input.password, self.settings.bcrypt_cost).await?;
        let otp = generate_otp();

        let account = self
            .accounts
            .create(NewAccount {
                email,
                name: input.name.trim().to_string(),
                first_name: input.first_name,
                last_name: input.last_name,
                specialization: input.specialization,
                password_hash,
                role: input.role,
                is_verified: false,
                otp: Some(otp.clone()),
                otp_expires_at: Some(Utc::now() + self.settings.otp_ttl),
            })
            .await?;

        self.send_otp(&account.email, &otp).await?;
        tracing::info!(account_id = %account.id, role = account.role.as_str(), "Nova conta cadastrada");
        Ok(account)
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<Account, AppError> {
        let account = self
            .accounts
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(AppError::NotFound("Conta"))?;
        reject_otp_after_department(&account)?;

        let still_valid = account.otp_expires_at.is_some_and(|exp| exp > Utc::now());
        if account.otp.as_deref() != Some(otp) || !still_valid {
            return Err(AppError::invalid("Código inválido ou expirado."));
        }

        self.accounts.verify_email(account.id).await
    }

    pub async fn resend_otp(&self, email: &str) -> Result<(), AppError> {
        let account = self
            .accounts
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(AppError::NotFound("Conta"))?;
        reject_otp_after_department(&account)?;

        if account.is_verified {
            return Err(AppError::invalid("Esta conta já foi verificada."));
        }

        let otp = generate_otp();
        self.accounts
            .set_otp(account.id, Some(&otp), Some(Utc::now() + self.settings.otp_ttl))
            .await?;
        self.send_otp(&account.email, &otp).await
    }

    /// Contas primeiro; sem conta com esse e-mail, tenta os hospitais.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, Principal), AppError> {
        let email = email.trim().to_lowercase();

        if let Some(account) = self.accounts.find_by_email(&email).await? {
            if !verify_password(password, &account.password_hash).await? {
                tracing::warn!(%email, "Tentativa de login com senha inválida");
                return Err(AppError::InvalidCredentials);
            }
            if !account.is_verified {
                return Err(AppError::forbidden("Conta ainda não verificada ou aguardando aprovação."));
            }
            if account.status != AccountStatus::Active {
                return Err(AppError::forbidden("Conta inativa ou bloqueada."));
            }
            let principal = Principal::from_account(&account);
            return Ok((self.create_token(&principal)?, principal));
        }

        // Hospital pendente também recebe token; o acesso aos dados do tenant
        // é barrado depois, enquanto `is_hospital` for falso.
        let hospital = self
            .hospitals
            .find_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &hospital.password_hash).await? {
            tracing::warn!(%email, "Tentativa de login de hospital com senha inválida");
            return Err(AppError::InvalidCredentials);
        }

        let principal = Principal::from_hospital(&hospital);
        Ok((self.create_token(&principal)?, principal))
    }

    /// Resolve o bearer token em um principal. Qualquer falha vira `InvalidToken`.
    pub async fn resolve_token(&self, token: &str) -> Result<Principal, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;
        if claims.role == ADMIN_ROLE {
            let hospital = self
                .hospitals
                .find_by_id(claims.sub)
                .await?
                .ok_or(AppError::InvalidToken)?;
            return Ok(Principal::from_hospital(&hospital));
        }

        let account = self
            .accounts
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;
        Ok(Principal::from_account(&account))
    }

    /// Gera o token de reset e envia o link. E-mail desconhecido não é revelado.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let Some(account) = self.accounts.find_by_email(&email.trim().to_lowercase()).await? else {
            tracing::info!("Pedido de redefinição para e-mail desconhecido");
            return Ok(());
        };

        let token = generate_reset_token();
        self.accounts
            .set_reset_token(account.id, Some(&token), Some(Utc::now() + self.settings.reset_ttl))
            .await?;

        self.mailer
            .send(
                &account.email,
                "Redefinição de senha",
                &format!("Use este token para redefinir sua senha: {token}"),
            )
            .await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        let account = self
            .accounts
            .find_by_reset_token(token)
            .await?
            .ok_or_else(|| AppError::invalid("Token de redefinição inválido ou expirado."))?;

        let still_valid = account.reset_token_expires_at.is_some_and(|exp| exp > Utc::now());
        if !still_valid {
            return Err(AppError::invalid("Token de redefinição inválido ou expirado."));
        }

        check_policy(new_password)?;
        if was_used_before(new_password, &account.password_history).await? {
            return Err(AppError::invalid("A nova senha não pode repetir uma senha anterior."));
        }

        let password_hash = hash_password(new_password, self.settings.bcrypt_cost).await?;
        self.accounts.update_password(account.id, &password_hash).await?;
        tracing::info!(account_id = %account.id, "Senha redefinida");
        Ok(())
    }

    /// Garante que exista um superadmin (credenciais vindas da configuração).
    pub async fn ensure_superadmin(&self, email: &str, password: &str) -> Result<(), AppError> {
        let email = email.trim().to_lowercase();
        if let Some(existing) = self.accounts.find_by_email(&email).await? {
            if existing.role != Role::Superadmin {
                return Err(AppError::conflict(format!(
                    "O e-mail do superadmin ({email}) já pertence a outra conta."
                )));
            }
            return Ok(());
        }

        check_policy(password)?;
        let password_hash = hash_password(password, self.settings.bcrypt_cost).await?;
        self.accounts
            .create(NewAccount {
                email,
                name: "Superadmin".into(),
                first_name: None,
                last_name: None,
                specialization: None,
                password_hash,
                role: Role::Superadmin,
                is_verified: true,
                otp: None,
                otp_expires_at: None,
            })
            .await?;
        tracing::info!("✅ Conta de superadmin criada");
        Ok(())
    }

    async fn send_otp(&self, email: &str, otp: &str) -> Result<(), AppError> {
        self.mailer
            .send(email, "Código de verificação", &format!("Seu código de verificação é {otp}"))
            .await
    }

    fn create_token(&self, principal: &Principal) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.settings.token_ttl;

        let claims = Claims {
            sub: principal.id(),
            email: principal.email().to_string(),
            role: principal.role_label().to_string(),
            tenant_id: principal.tenant_id().map(str::to_string),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.jwt_secret.as_ref()),
        )?)
    }
}
