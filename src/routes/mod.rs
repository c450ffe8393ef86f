pub mod products;
pub mod response;
