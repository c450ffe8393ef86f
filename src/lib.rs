pub mod domain;
pub mod forms;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;
pub mod storage;

/// Public disk directory that receives product images.
pub const PRODUCT_IMAGE_DIRECTORY: &str = "products";
