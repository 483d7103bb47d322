use async_trait::async_trait;
use sqlx::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::repos::{
        CategoriesRepo, CategoriesWriteRepo, CreateCategoryParams, RepoError,
        UpdateCategoryParams,
    },
    domain::{categories::CategoryRecord, hierarchy::ParentLink},
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    parent_id: Option<Uuid>,
    level: i16,
    is_active: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<CategoryRow> for CategoryRecord {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            parent_id: row.parent_id,
            level: row.level,
            is_active: row.is_active,
            children: None,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: Uuid,
    parent_id: Option<Uuid>,
}

#[async_trait]
impl CategoriesRepo for PostgresRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        let row = query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, parent_id, level, is_active, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(CategoryRecord::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<CategoryRecord>, RepoError> {
        let row = query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, parent_id, level, is_active, created_at, updated_at
            FROM categories
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(CategoryRecord::from))
    }

    async fn list_all(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let rows = query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, parent_id, level, is_active, created_at, updated_at
            FROM categories
            ORDER BY seq
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CategoryRecord::from).collect())
    }

    async fn list_parent_links(&self) -> Result<Vec<ParentLink>, RepoError> {
        let rows = query_as::<_, LinkRow>("SELECT id, parent_id FROM categories ORDER BY seq")
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| ParentLink {
                id: row.id,
                parent_id: row.parent_id,
            })
            .collect())
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        self.ping().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl CategoriesWriteRepo for PostgresRepositories {
    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let row = query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (id, name, parent_id, level)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, parent_id, level, is_active, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&params.name)
        .bind(params.parent_id)
        .bind(params.level)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(CategoryRecord::from(row))
    }

    async fn update_category(
        &self,
        params: UpdateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let row = query_as::<_, CategoryRow>(
            r#"
            UPDATE categories
            SET name = $2,
                parent_id = $3,
                level = $4,
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, parent_id, level, is_active, created_at, updated_at
            "#,
        )
        .bind(params.id)
        .bind(&params.name)
        .bind(params.parent_id)
        .bind(params.level)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(RepoError::NotFound)?;

        if params.level_delta != 0 && !params.descendants.is_empty() {
            sqlx::query(
                r#"
                UPDATE categories
                SET level = level + $2,
                    updated_at = now()
                WHERE id = ANY($1)
                "#,
            )
            .bind(&params.descendants)
            .bind(params.level_delta)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(CategoryRecord::from(row))
    }

    async fn set_active_bulk(&self, ids: &[Uuid], is_active: bool) -> Result<u64, RepoError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET is_active = $2,
                updated_at = now()
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .bind(is_active)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
