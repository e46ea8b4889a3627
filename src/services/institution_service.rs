use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{Institution, UpdateInstitution};

pub struct InstitutionService {
    db: Database,
}

impl InstitutionService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Institution>> {
        let institutions: Vec<Institution> =
            sqlx::query_as("SELECT * FROM instituciones ORDER BY created_at DESC")
                .fetch_all(&self.db.pg)
                .await?;

        Ok(institutions)
    }

    pub async fn update(&self, id: Uuid, changes: UpdateInstitution) -> Result<Institution> {
        let institution: Institution = sqlx::query_as(
            "UPDATE instituciones \
             SET status = $2, \
                 approved_at = COALESCE($3, approved_at), \
                 max_users = COALESCE($4, max_users), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING *",
        )
        .bind(id)
        .bind(&changes.status)
        .bind(changes.approved_at)
        .bind(changes.max_users)
        .fetch_optional(&self.db.pg)
        .await?
        .ok_or_else(|| AppError::NotFound("Institución no encontrada".to_string()))?;

        Ok(institution)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM instituciones WHERE id = $1")
            .bind(id)
            .execute(&self.db.pg)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Institución no encontrada".to_string()));
        }

        Ok(())
    }
}
