// src/db/account_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    db::repository::AccountRepository,
    models::account::{Account, DepartmentLink, NewAccount, Review, Role},
};

// O repositório de contas, responsável pelas tabelas 'accounts' e 'reviews'
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Papéis vão como texto; o Postgres compara com `role::text`
fn role_names(roles: &[Role]) -> Vec<String> {
    roles.iter().map(|r| r.as_str().to_string()).collect()
}

fn account_conflict(constraint: &str) -> Option<String> {
    (constraint == "accounts_email_key").then(|| "Este e-mail já está em uso.".to_string())
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn create(&self, input: NewAccount) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (
                email, name, first_name, last_name, specialization,
                password_hash, password_history, role, is_verified, otp, otp_expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, ARRAY[$6], $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&input.email)
        .bind(&input.name)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.specialization)
        .bind(&input.password_hash)
        .bind(input.role)
        .bind(input.is_verified)
        .bind(&input.otp)
        .bind(input.otp_expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, account_conflict))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE reset_token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn list_all(&self) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>("SELECT * FROM accounts ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(accounts)
    }

    async fn list_by_roles(&self, roles: &[Role]) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE role::text = ANY($1) ORDER BY created_at ASC",
        )
        .bind(role_names(roles))
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }

    async fn list_by_tenant(&self, tenant_id: &str, roles: &[Role]) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT * FROM accounts
            WHERE selected_hospital_tenant_id = $1
              AND (cardinality($2::text[]) = 0 OR role::text = ANY($2))
            ORDER BY created_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(role_names(roles))
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }

    async fn list_by_hospital(&self, hospital_id: Uuid) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE selected_hospital = $1 ORDER BY created_at ASC",
        )
        .bind(hospital_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }

    async fn list_by_department(
        &self,
        role: Role,
        category_id: Uuid,
        hospital_id: Uuid,
    ) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT * FROM accounts
            WHERE role = $1 AND selected_category = $2 AND selected_hospital = $3
            ORDER BY created_at ASC
            "#,
        )
        .bind(role)
        .bind(category_id)
        .bind(hospital_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }

    async fn list_active_doctors_by_category(&self, category_id: Uuid) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT * FROM accounts
            WHERE role = 'doctor' AND status = 'ACTIVE' AND selected_category = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(accounts)
    }

    async fn set_verification(
        &self,
        id: Uuid,
        is_verified: bool,
        role: Option<Role>,
    ) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET is_verified = $2, role = COALESCE($3, role), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(is_verified)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Conta"))
    }

    async fn set_department(&self, id: Uuid, link: &DepartmentLink) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET selected_category = $2,
                selected_hospital = $3,
                selected_hospital_tenant_id = $4,
                is_verified = FALSE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(link.category_id)
        .bind(link.hospital_id)
        .bind(&link.tenant_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Conta"))
    }

    async fn set_otp(
        &self,
        id: Uuid,
        otp: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE accounts SET otp = $2, otp_expires_at = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(otp)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Conta"));
        }
        Ok(())
    }

    async fn verify_email(&self, id: Uuid) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET is_verified = TRUE, otp = NULL, otp_expires_at = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Conta"))
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET reset_token = $2, reset_token_expires_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Conta"));
        }
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $2,
                password_history = array_append(password_history, $2),
                reset_token = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Conta"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Conta"));
        }
        Ok(())
    }

    async fn add_review(
        &self,
        doctor_id: Uuid,
        reviewer_id: Uuid,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Review, AppError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (doctor_id, reviewer_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(doctor_id)
        .bind(reviewer_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(review)
    }

    async fn list_reviews(&self, doctor_id: Uuid) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE doctor_id = $1 ORDER BY created_at DESC",
        )
        .bind(doctor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }
}
