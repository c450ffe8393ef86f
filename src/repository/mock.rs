use mockall::mock;

use super::{CategoryReader, ProductReader, ProductWriter};
use crate::domain::{
    category::Category,
    product::{NewProduct, Product, UpdateProduct},
};
use pushkind_common::repository::errors::RepositoryResult;

mock! {
    pub ProductReader {}

    impl ProductReader for ProductReader {
        fn list_products(&self) -> RepositoryResult<Vec<Product>>;
        fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
        fn get_product_by_name(&self, name: &str) -> RepositoryResult<Option<Product>>;
    }
}

mock! {
    pub ProductWriter {}

    impl ProductWriter for ProductWriter {
        fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
        fn update_product(&self, product_id: i32, updates: &UpdateProduct) -> RepositoryResult<Product>;
        fn delete_product(&self, product_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub CategoryReader {}

    impl CategoryReader for CategoryReader {
        fn get_category_by_name(&self, name: &str) -> RepositoryResult<Option<Category>>;
    }
}
