// src/db/hospital_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    db::repository::HospitalRepository,
    models::hospital::{Category, CategoryListing, Hospital, HospitalChanges, HospitalStatus, NewHospital},
};

// O repositório de hospitais, responsável pelas tabelas 'hospitals' e 'categories'
#[derive(Clone)]
pub struct PgHospitalRepository {
    pool: PgPool,
}

impl PgHospitalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn hospital_conflict(constraint: &str) -> Option<String> {
    match constraint {
        "hospitals_email_key" => Some("Este e-mail já está em uso.".into()),
        "hospitals_license_number_key" => Some("Este número de licença já está cadastrado.".into()),
        "hospitals_hospital_name_key" => Some("Já existe um hospital com esse nome.".into()),
        "hospitals_tenant_id_key" => Some("Identificador de tenant já utilizado.".into()),
        _ => None,
    }
}

fn category_conflict(constraint: &str) -> Option<String> {
    (constraint == "categories_hospital_name_ci_key")
        .then(|| "Já existe uma categoria com esse nome neste hospital.".to_string())
}

#[async_trait]
impl HospitalRepository for PgHospitalRepository {
    async fn create(&self, input: NewHospital) -> Result<Hospital, AppError> {
        sqlx::query_as::<_, Hospital>(
            r#"
            INSERT INTO hospitals (
                tenant_id, hospital_name, email, license_number,
                address, phone, image_url, password_hash, password_history
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, ARRAY[$8])
            RETURNING *
            "#,
        )
        .bind(&input.tenant_id)
        .bind(&input.hospital_name)
        .bind(&input.email)
        .bind(&input.license_number)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.image_url)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, hospital_conflict))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hospital>, AppError> {
        let hospital = sqlx::query_as::<_, Hospital>("SELECT * FROM hospitals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(hospital)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Hospital>, AppError> {
        let hospital = sqlx::query_as::<_, Hospital>("SELECT * FROM hospitals WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(hospital)
    }

    async fn find_by_tenant(&self, tenant_id: &str) -> Result<Option<Hospital>, AppError> {
        let hospital = sqlx::query_as::<_, Hospital>("SELECT * FROM hospitals WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(hospital)
    }

    async fn list(&self) -> Result<Vec<Hospital>, AppError> {
        let hospitals = sqlx::query_as::<_, Hospital>("SELECT * FROM hospitals ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(hospitals)
    }

    async fn set_approval(
        &self,
        id: Uuid,
        is_hospital: bool,
        status: HospitalStatus,
    ) -> Result<Hospital, AppError> {
        sqlx::query_as::<_, Hospital>(
            r#"
            UPDATE hospitals
            SET is_hospital = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(is_hospital)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Hospital"))
    }

    async fn update(&self, id: Uuid, changes: HospitalChanges) -> Result<Hospital, AppError> {
        sqlx::query_as::<_, Hospital>(
            r#"
            UPDATE hospitals
            SET hospital_name = COALESCE($2, hospital_name),
                address       = COALESCE($3, address),
                phone         = COALESCE($4, phone),
                image_url     = COALESCE($5, image_url),
                status        = COALESCE($6, status),
                updated_at    = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.hospital_name)
        .bind(changes.address)
        .bind(changes.phone)
        .bind(changes.image_url)
        .bind(changes.status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, hospital_conflict))?
        .ok_or(AppError::NotFound("Hospital"))
    }

    async fn delete_if_unreferenced(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // Trava a linha do hospital até o fim da transação
        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM hospitals WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound("Hospital"));
        }

        let members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE selected_hospital = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if members > 0 {
            return Err(AppError::conflict(format!(
                "Não é possível excluir o hospital: {members} conta(s) ainda vinculada(s)."
            )));
        }

        sqlx::query("DELETE FROM hospitals WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                // A FK (ON DELETE RESTRICT) pega uma conta vinculada depois da contagem
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::conflict(
                            "Não é possível excluir o hospital: ainda há contas vinculadas.",
                        );
                    }
                }
                AppError::from(e)
            })?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_categories(&self, hospital_id: Uuid) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE hospital_id = $1 ORDER BY created_at ASC",
        )
        .bind(hospital_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn list_all_categories(&self) -> Result<Vec<CategoryListing>, AppError> {
        let categories = sqlx::query_as::<_, CategoryListing>(
            r#"
            SELECT c.id, c.name, c.description, c.hospital_id, h.hospital_name
            FROM categories c
            JOIN hospitals h ON h.id = c.hospital_id
            ORDER BY h.created_at ASC, c.created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn find_category(&self, category_id: Uuid) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(category_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn add_category(
        &self,
        hospital_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (hospital_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(hospital_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, category_conflict))
    }

    async fn update_category(
        &self,
        hospital_id: Uuid,
        category_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name        = COALESCE($3, name),
                description = COALESCE($4, description)
            WHERE id = $1 AND hospital_id = $2
            RETURNING *
            "#,
        )
        .bind(category_id)
        .bind(hospital_id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, category_conflict))?
        .ok_or(AppError::NotFound("Categoria"))
    }

    async fn delete_category(&self, hospital_id: Uuid, category_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND hospital_id = $2")
            .bind(category_id)
            .bind(hospital_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Categoria"));
        }
        Ok(())
    }
}
