use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::category::{Category, NewCategory};
use crate::domain::product::{NewProduct, Product, UpdateProduct};

pub mod category;
pub mod product;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over product records.
pub trait ProductReader {
    /// Every product, ordered by identifier.
    fn list_products(&self) -> RepositoryResult<Vec<Product>>;
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
    /// First product (lowest id) whose name matches exactly.
    fn get_product_by_name(&self, name: &str) -> RepositoryResult<Option<Product>>;
}

/// Write operations over product records.
pub trait ProductWriter {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
    fn update_product(&self, product_id: i32, updates: &UpdateProduct)
    -> RepositoryResult<Product>;
    fn delete_product(&self, product_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over category records.
pub trait CategoryReader {
    /// First category (lowest id) whose name matches exactly.
    fn get_category_by_name(&self, name: &str) -> RepositoryResult<Option<Category>>;
}

/// Write operations over category records.
pub trait CategoryWriter {
    fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
}
