// src/db/masterdata_repo.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{AppError, map_unique_violation},
    models::masterdata::{Brand, Client, RepairType, Store},
};

#[derive(Clone)]
pub struct MasterDataRepository {
    pool: PgPool,
}

impl MasterDataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CLIENTS
    // =========================================================================

    pub async fn create_client(
        &self,
        full_name: &str,
        mobile: &str,
        email: Option<&str>,
        address: Option<&str>,
    ) -> Result<Client, AppError> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (full_name, mobile, email, address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, mobile, email, address, created_at, updated_at
            "#,
        )
        .bind(full_name)
        .bind(mobile)
        .bind(email)
        .bind(address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, format!("A client with mobile '{mobile}' already exists."))
        })?;

        Ok(client)
    }

    pub async fn find_client(&self, id: Uuid) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, full_name, mobile, email, address, created_at, updated_at FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    pub async fn list_clients(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Client>, i64), AppError> {
        let pattern = like_pattern(search);

        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, full_name, mobile, email, address, created_at, updated_at
            FROM clients
            WHERE ($1::text IS NULL OR full_name ILIKE $1 OR mobile ILIKE $1)
            ORDER BY full_name ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM clients WHERE ($1::text IS NULL OR full_name ILIKE $1 OR mobile ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((clients, total))
    }

    pub async fn update_client(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        mobile: Option<&str>,
        email: Option<&str>,
        address: Option<&str>,
    ) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET
                full_name = COALESCE($2, full_name),
                mobile = COALESCE($3, mobile),
                email = COALESCE($4, email),
                address = COALESCE($5, address),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, full_name, mobile, email, address, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(full_name)
        .bind(mobile)
        .bind(email)
        .bind(address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Another client already uses that mobile number."))?;

        Ok(client)
    }

    pub async fn delete_client(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  BRANDS
    // =========================================================================

    pub async fn create_brand(&self, name: &str) -> Result<Brand, AppError> {
        let brand = sqlx::query_as::<_, Brand>(
            "INSERT INTO brands (name) VALUES ($1) RETURNING id, name, created_at, updated_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("Brand '{name}' already exists.")))?;

        Ok(brand)
    }

    pub async fn find_brand(&self, id: Uuid) -> Result<Option<Brand>, AppError> {
        let brand = sqlx::query_as::<_, Brand>(
            "SELECT id, name, created_at, updated_at FROM brands WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(brand)
    }

    pub async fn list_brands(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Brand>, i64), AppError> {
        let pattern = like_pattern(search);

        let brands = sqlx::query_as::<_, Brand>(
            r#"
            SELECT id, name, created_at, updated_at
            FROM brands
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY name ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM brands WHERE ($1::text IS NULL OR name ILIKE $1)")
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

        Ok((brands, total))
    }

    pub async fn update_brand(&self, id: Uuid, name: &str) -> Result<Option<Brand>, AppError> {
        let brand = sqlx::query_as::<_, Brand>(
            r#"
            UPDATE brands SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("Brand '{name}' already exists.")))?;

        Ok(brand)
    }

    pub async fn delete_brand(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  STORES
    // =========================================================================

    pub async fn create_store(
        &self,
        name: &str,
        code: &str,
        address: Option<&str>,
    ) -> Result<Store, AppError> {
        let store = sqlx::query_as::<_, Store>(
            r#"
            INSERT INTO stores (name, code, address)
            VALUES ($1, $2, $3)
            RETURNING id, name, code, address, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(code)
        .bind(address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("Store code '{code}' already exists.")))?;

        Ok(store)
    }

    pub async fn find_store(&self, id: Uuid) -> Result<Option<Store>, AppError> {
        let store = sqlx::query_as::<_, Store>(
            "SELECT id, name, code, address, created_at, updated_at FROM stores WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(store)
    }

    pub async fn list_stores(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Store>, i64), AppError> {
        let pattern = like_pattern(search);

        let stores = sqlx::query_as::<_, Store>(
            r#"
            SELECT id, name, code, address, created_at, updated_at
            FROM stores
            WHERE ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1)
            ORDER BY name ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stores WHERE ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((stores, total))
    }

    pub async fn update_store(
        &self,
        id: Uuid,
        name: Option<&str>,
        code: Option<&str>,
        address: Option<&str>,
    ) -> Result<Option<Store>, AppError> {
        let store = sqlx::query_as::<_, Store>(
            r#"
            UPDATE stores SET
                name = COALESCE($2, name),
                code = COALESCE($3, code),
                address = COALESCE($4, address),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, code, address, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(code)
        .bind(address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Another store already uses that code."))?;

        Ok(store)
    }

    pub async fn delete_store(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  REPAIR TYPES
    // =========================================================================

    pub async fn create_repair_type(
        &self,
        name: &str,
        code: &str,
        default_price: Option<Decimal>,
    ) -> Result<RepairType, AppError> {
        let repair_type = sqlx::query_as::<_, RepairType>(
            r#"
            INSERT INTO repair_types (name, code, default_price)
            VALUES ($1, $2, $3)
            RETURNING id, name, code, default_price, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(code)
        .bind(default_price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("Repair type code '{code}' already exists.")))?;

        Ok(repair_type)
    }

    pub async fn find_repair_type(&self, id: Uuid) -> Result<Option<RepairType>, AppError> {
        let repair_type = sqlx::query_as::<_, RepairType>(
            "SELECT id, name, code, default_price, created_at, updated_at FROM repair_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(repair_type)
    }

    pub async fn list_repair_types(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<RepairType>, i64), AppError> {
        let pattern = like_pattern(search);

        let repair_types = sqlx::query_as::<_, RepairType>(
            r#"
            SELECT id, name, code, default_price, created_at, updated_at
            FROM repair_types
            WHERE ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1)
            ORDER BY name ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM repair_types WHERE ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((repair_types, total))
    }

    pub async fn update_repair_type(
        &self,
        id: Uuid,
        name: Option<&str>,
        code: Option<&str>,
        default_price: Option<Decimal>,
    ) -> Result<Option<RepairType>, AppError> {
        let repair_type = sqlx::query_as::<_, RepairType>(
            r#"
            UPDATE repair_types SET
                name = COALESCE($2, name),
                code = COALESCE($3, code),
                default_price = COALESCE($4, default_price),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, code, default_price, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(code)
        .bind(default_price)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Another repair type already uses that code."))?;

        Ok(repair_type)
    }

    pub async fn delete_repair_type(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM repair_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn like_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"))
}
