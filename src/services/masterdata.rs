// src/services/masterdata.rs
//
// Thin orchestration over the master-data registries: the repositories own
// the SQL, this layer owns existence checks and the NotFound translation.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::MasterDataRepository,
    models::masterdata::{Brand, Client, RepairType, Store},
};

#[derive(Clone)]
pub struct MasterDataService {
    repo: MasterDataRepository,
}

impl MasterDataService {
    pub fn new(repo: MasterDataRepository) -> Self {
        Self { repo }
    }

    // --- Clients ---

    pub async fn create_client(
        &self,
        full_name: &str,
        mobile: &str,
        email: Option<&str>,
        address: Option<&str>,
    ) -> Result<Client, AppError> {
        self.repo.create_client(full_name, mobile, email, address).await
    }

    pub async fn get_client(&self, id: Uuid) -> Result<Client, AppError> {
        self.repo
            .find_client(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found.".into()))
    }

    pub async fn list_clients(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Client>, i64), AppError> {
        self.repo.list_clients(search, limit, offset).await
    }

    pub async fn update_client(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        mobile: Option<&str>,
        email: Option<&str>,
        address: Option<&str>,
    ) -> Result<Client, AppError> {
        self.repo
            .update_client(id, full_name, mobile, email, address)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found.".into()))
    }

    pub async fn delete_client(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_client(id).await? {
            return Err(AppError::NotFound("Client not found.".into()));
        }
        Ok(())
    }

    // --- Brands ---

    pub async fn create_brand(&self, name: &str) -> Result<Brand, AppError> {
        self.repo.create_brand(name).await
    }

    pub async fn get_brand(&self, id: Uuid) -> Result<Brand, AppError> {
        self.repo
            .find_brand(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Brand not found.".into()))
    }

    pub async fn list_brands(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Brand>, i64), AppError> {
        self.repo.list_brands(search, limit, offset).await
    }

    pub async fn update_brand(&self, id: Uuid, name: &str) -> Result<Brand, AppError> {
        self.repo
            .update_brand(id, name)
            .await?
            .ok_or_else(|| AppError::NotFound("Brand not found.".into()))
    }

    pub async fn delete_brand(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_brand(id).await? {
            return Err(AppError::NotFound("Brand not found.".into()));
        }
        Ok(())
    }

    // --- Stores ---

    pub async fn create_store(
        &self,
        name: &str,
        code: &str,
        address: Option<&str>,
    ) -> Result<Store, AppError> {
        self.repo.create_store(name, code, address).await
    }

    pub async fn get_store(&self, id: Uuid) -> Result<Store, AppError> {
        self.repo
            .find_store(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Store not found.".into()))
    }

    pub async fn list_stores(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Store>, i64), AppError> {
        self.repo.list_stores(search, limit, offset).await
    }

    pub async fn update_store(
        &self,
        id: Uuid,
        name: Option<&str>,
        code: Option<&str>,
        address: Option<&str>,
    ) -> Result<Store, AppError> {
        self.repo
            .update_store(id, name, code, address)
            .await?
            .ok_or_else(|| AppError::NotFound("Store not found.".into()))
    }

    pub async fn delete_store(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_store(id).await? {
            return Err(AppError::NotFound("Store not found.".into()));
        }
        Ok(())
    }

    // --- Repair types ---

    pub async fn create_repair_type(
        &self,
        name: &str,
        code: &str,
        default_price: Option<Decimal>,
    ) -> Result<RepairType, AppError> {
        self.repo.create_repair_type(name, code, default_price).await
    }

    pub async fn get_repair_type(&self, id: Uuid) -> Result<RepairType, AppError> {
        self.repo
            .find_repair_type(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Repair type not found.".into()))
    }

    pub async fn list_repair_types(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<RepairType>, i64), AppError> {
        self.repo.list_repair_types(search, limit, offset).await
    }

    pub async fn update_repair_type(
        &self,
        id: Uuid,
        name: Option<&str>,
        code: Option<&str>,
        default_price: Option<Decimal>,
    ) -> Result<RepairType, AppError> {
        self.repo
            .update_repair_type(id, name, code, default_price)
            .await?
            .ok_or_else(|| AppError::NotFound("Repair type not found.".into()))
    }

    pub async fn delete_repair_type(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_repair_type(id).await? {
            return Err(AppError::NotFound("Repair type not found.".into()));
        }
        Ok(())
    }
}
