use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, UpdateProduct as DomainUpdateProduct,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category_id: i32,
    pub expired_at: NaiveDate,
    pub image: Option<String>,
    pub modified_by: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub category_id: i32,
    pub expired_at: NaiveDate,
    pub image: Option<&'a str>,
    pub modified_by: &'a str,
    pub updated_at: NaiveDateTime,
}

/// `image` is skipped when `None` so an update without upload keeps the file.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct UpdateProduct<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub category_id: i32,
    pub expired_at: NaiveDate,
    pub image: Option<&'a str>,
    pub modified_by: &'a str,
    pub updated_at: NaiveDateTime,
}

impl From<Product> for DomainProduct {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            price: value.price,
            category_id: value.category_id,
            expired_at: value.expired_at,
            image: value.image,
            modified_by: value.modified_by,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewProduct> for NewProduct<'a> {
    fn from(value: &'a DomainNewProduct) -> Self {
        Self {
            name: value.name.as_str(),
            description: value.description.as_str(),
            price: value.price,
            category_id: value.category_id,
            expired_at: value.expired_at,
            image: value.image.as_deref(),
            modified_by: value.modified_by.as_str(),
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainUpdateProduct> for UpdateProduct<'a> {
    fn from(value: &'a DomainUpdateProduct) -> Self {
        Self {
            name: value.name.as_str(),
            description: value.description.as_str(),
            price: value.price,
            category_id: value.category_id,
            expired_at: value.expired_at,
            image: value.image.as_deref(),
            modified_by: value.modified_by.as_str(),
            updated_at: value.updated_at,
        }
    }
}
