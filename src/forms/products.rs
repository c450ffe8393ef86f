use std::collections::BTreeMap;
use std::io::{Read, Seek};

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::storage::ImageUpload;

/// Lowest accepted product price.
const MIN_PRICE: f64 = 1.0;

/// Strict format required when a product is created.
const STORE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date layouts accepted when a product is updated.
const UPDATE_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];
const UPDATE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

const PRICE_NUMERIC_MESSAGE: &str = "The price field must be a number.";
const PRICE_MIN_MESSAGE: &str = "The price field must be at least 1.";
const EXPIRED_AT_FORMAT_MESSAGE: &str = "The expired at field must match the format Y-m-d.";
const EXPIRED_AT_DATE_MESSAGE: &str = "The expired at field must be a valid date.";
const IMAGE_REQUIRED_MESSAGE: &str = "The image field is required.";
const IMAGE_TYPE_MESSAGE: &str = "The image field must be a file of type: png, jpg, jpeg.";

/// Result type returned by the product form helpers.
pub type ProductFormResult<T> = Result<T, FieldErrors>;

/// Validation messages keyed by request field name.
///
/// Serializes as `{"field": ["message", ...]}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Error)]
#[serde(transparent)]
#[error("validation failed for {} field(s)", .0.len())]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Record `message` against `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Names of the fields that failed validation.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn merge_validation(&mut self, errors: &ValidationErrors) {
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("The {} field is invalid.", field.replace('_', " ")),
                };
                self.add(field.to_string(), message);
            }
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = Self::default();
        fields.merge_validation(&errors);
        fields
    }
}

#[derive(MultipartForm)]
/// Multipart body accepted by the create and update product endpoints.
pub struct ProductMultipartForm {
    pub name: Option<Text<String>>,
    pub description: Option<Text<String>>,
    pub price: Option<Text<String>>,
    /// Name of the category; the field name is kept for client compatibility.
    pub category_id: Option<Text<String>>,
    pub expired_at: Option<Text<String>>,
    #[multipart(limit = "10MB")]
    /// Uploaded product picture.
    pub image: Option<TempFile>,
}

impl ProductMultipartForm {
    /// Read the multipart parts into a [`ProductForm`].
    ///
    /// An image part without content is treated as if no file was sent.
    pub fn into_product_form(self) -> std::io::Result<ProductForm> {
        let ProductMultipartForm {
            name,
            description,
            price,
            category_id,
            expired_at,
            image,
        } = self;

        let image = match image {
            Some(mut upload) if upload.size > 0 => {
                let mut bytes = Vec::with_capacity(upload.size);
                upload.file.rewind()?;
                upload.file.read_to_end(&mut bytes)?;
                Some(bytes)
            }
            _ => None,
        };

        Ok(ProductForm {
            name: name.map(|text| text.0),
            description: description.map(|text| text.0),
            price: price.map(|text| text.0),
            category_id: category_id.map(|text| text.0),
            expired_at: expired_at.map(|text| text.0),
            image,
        })
    }
}

/// Product fields as submitted by the client, before validation.
#[derive(Debug, Default, Clone, Validate)]
pub struct ProductForm {
    #[validate(required(message = "The name field is required."))]
    pub name: Option<String>,
    #[validate(required(message = "The description field is required."))]
    pub description: Option<String>,
    #[validate(required(message = "The price field is required."))]
    pub price: Option<String>,
    #[validate(required(message = "The category id field is required."))]
    pub category_id: Option<String>,
    #[validate(required(message = "The expired at field is required."))]
    pub expired_at: Option<String>,
    /// Raw bytes of the uploaded image.
    pub image: Option<Vec<u8>>,
}

/// Product data that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Name of the category the product should be filed under.
    pub category_name: String,
    pub expired_at: NaiveDate,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Copy)]
enum DateRule {
    /// Only `YYYY-MM-DD`.
    Strict,
    /// Any recognised date or date-time layout.
    AnyDate,
}

impl ProductForm {
    /// Validate the payload for product creation: all fields including the
    /// image are required and the expiry date must be `YYYY-MM-DD`.
    pub fn validate_for_store(self) -> ProductFormResult<ProductInput> {
        self.into_input(DateRule::Strict, true)
    }

    /// Validate the payload for a product update: the image is optional and
    /// the expiry date may use any recognised layout.
    pub fn validate_for_update(self) -> ProductFormResult<ProductInput> {
        self.into_input(DateRule::AnyDate, false)
    }

    /// Trim text fields and drop the ones left empty.
    fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            description: trimmed(self.description),
            price: trimmed(self.price),
            category_id: trimmed(self.category_id),
            expired_at: trimmed(self.expired_at),
            image: self.image.filter(|bytes| !bytes.is_empty()),
        }
    }

    fn into_input(
        self,
        date_rule: DateRule,
        image_required: bool,
    ) -> ProductFormResult<ProductInput> {
        let form = self.normalized();

        let mut errors = FieldErrors::default();
        if let Err(validation) = form.validate() {
            errors.merge_validation(&validation);
        }

        let ProductForm {
            name,
            description,
            price,
            category_id,
            expired_at,
            image,
        } = form;

        let price = match price.as_deref().map(parse_price) {
            Some(Ok(price)) => Some(price),
            Some(Err(message)) => {
                errors.add("price", message);
                None
            }
            None => None,
        };

        let expired_at = match expired_at.as_deref().map(|value| parse_date(value, date_rule)) {
            Some(Ok(date)) => Some(date),
            Some(Err(message)) => {
                errors.add("expired_at", message);
                None
            }
            None => None,
        };

        let image = match image {
            Some(bytes) => match ImageUpload::from_bytes(bytes) {
                Some(upload) => Some(upload),
                None => {
                    errors.add("image", IMAGE_TYPE_MESSAGE);
                    None
                }
            },
            None => {
                if image_required {
                    errors.add("image", IMAGE_REQUIRED_MESSAGE);
                }
                None
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        match (name, description, price, category_id, expired_at) {
            (Some(name), Some(description), Some(price), Some(category_name), Some(expired_at)) => {
                Ok(ProductInput {
                    name,
                    description,
                    price,
                    category_name,
                    expired_at,
                    image,
                })
            }
            _ => Err(errors),
        }
    }
}

fn parse_price(value: &str) -> Result<f64, &'static str> {
    match value.parse::<f64>() {
        Ok(price) if !price.is_finite() => Err(PRICE_NUMERIC_MESSAGE),
        Ok(price) if price < MIN_PRICE => Err(PRICE_MIN_MESSAGE),
        Ok(price) => Ok(price),
        Err(_) => Err(PRICE_NUMERIC_MESSAGE),
    }
}

fn parse_date(value: &str, rule: DateRule) -> Result<NaiveDate, &'static str> {
    match rule {
        DateRule::Strict => parse_strict_date(value).ok_or(EXPIRED_AT_FORMAT_MESSAGE),
        DateRule::AnyDate => parse_any_date(value).ok_or(EXPIRED_AT_DATE_MESSAGE),
    }
}

fn parse_strict_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes.get(4) != Some(&b'-') || bytes.get(7) != Some(&b'-') {
        return None;
    }

    NaiveDate::parse_from_str(value, STORE_DATE_FORMAT).ok()
}

fn parse_any_date(value: &str) -> Option<NaiveDate> {
    UPDATE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            UPDATE_DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|datetime| datetime.date_naive())
        })
}

/// Surrounding whitespace is dropped; the inner text is kept as sent.
fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
