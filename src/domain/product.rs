use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Domain representation of a catalog product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    /// Unique identifier of the product.
    pub id: i32,
    /// Human-readable name of the product.
    pub name: String,
    /// Longer description shown to customers.
    pub description: String,
    /// Unit price, never below one.
    pub price: f64,
    /// Identifier of the category the product belongs to.
    pub category_id: i32,
    /// Date after which the product should no longer be sold.
    pub expired_at: NaiveDate,
    /// Path of the product image relative to the public disk.
    pub image: Option<String>,
    /// Email of the user who last created or changed the product.
    pub modified_by: String,
    /// Timestamp for when the product record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the product record.
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category_id: i32,
    pub expired_at: NaiveDate,
    pub image: Option<String>,
    pub modified_by: String,
    /// Timestamp captured when the product payload was created.
    pub updated_at: NaiveDateTime,
}

impl NewProduct {
    /// Build a new product payload with the supplied details and current timestamp.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        category_id: i32,
        expired_at: NaiveDate,
        modified_by: impl Into<String>,
    ) -> Self {
        let now = chrono::Local::now().naive_utc();
        Self {
            name: name.into(),
            description: description.into(),
            price,
            category_id,
            expired_at,
            image: None,
            modified_by: modified_by.into(),
            updated_at: now,
        }
    }

    /// Attach the stored image path to the product payload.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Full overwrite applied when updating an existing product.
///
/// Every column is replaced except `image`, which is only changed when a new
/// upload was stored.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category_id: i32,
    pub expired_at: NaiveDate,
    /// New image path; `None` keeps the current image.
    pub image: Option<String>,
    pub modified_by: String,
    /// Timestamp captured when the update was created.
    pub updated_at: NaiveDateTime,
}

impl UpdateProduct {
    /// Build an update payload with the supplied values and current timestamp.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        category_id: i32,
        expired_at: NaiveDate,
        modified_by: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            category_id,
            expired_at,
            image: None,
            modified_by: modified_by.into(),
            updated_at: chrono::Local::now().naive_utc(),
        }
    }

    /// Replace the product image with a newly stored file.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}
