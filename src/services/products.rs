use pushkind_common::domain::auth::AuthenticatedUser;

use crate::PRODUCT_IMAGE_DIRECTORY;
use crate::domain::category::Category;
use crate::domain::product::{NewProduct, Product, UpdateProduct};
use crate::forms::products::ProductForm;
use crate::repository::{CategoryReader, ProductReader, ProductWriter};
use crate::services::{ServiceError, ServiceResult};
use crate::storage::{FileStorage, ImageUpload};

/// Returns every product in the catalog.
pub fn list_products<R>(repo: &R) -> ServiceResult<Vec<Product>>
where
    R: ProductReader + ?Sized,
{
    Ok(repo.list_products()?)
}

/// Loads a single product by its identifier.
pub fn get_product<R>(repo: &R, product_id: i32) -> ServiceResult<Product>
where
    R: ProductReader + ?Sized,
{
    repo.get_product_by_id(product_id)?
        .ok_or(ServiceError::ProductNotFound)
}

/// Validates the submitted form and creates a product on behalf of `user`.
///
/// The category is resolved by name before anything is written. The image is
/// stored first; if the insert then fails the stored file is removed again.
pub fn create_product<R, S>(
    repo: &R,
    storage: &S,
    user: &AuthenticatedUser,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: ProductWriter + CategoryReader + ?Sized,
    S: FileStorage + ?Sized,
{
    let input = form.validate_for_store().map_err(ServiceError::Validation)?;
    let category = find_category(repo, &input.category_name)?;

    let mut new_product = NewProduct::new(
        input.name,
        input.description,
        input.price,
        category.id,
        input.expired_at,
        user.email.as_str(),
    );

    let stored_image = store_image(storage, input.image.as_ref())?;
    if let Some(path) = stored_image.as_deref() {
        new_product = new_product.with_image(path);
    }

    match repo.create_product(&new_product) {
        Ok(product) => Ok(product),
        Err(err) => {
            log::error!("Failed to create product `{}`: {err}", new_product.name);
            discard_image(storage, stored_image.as_deref());
            // An insert has no existing row to miss.
            Err(ServiceError::Repository(err))
        }
    }
}

/// Overwrites the product whose *name* equals `product_name`.
///
/// Every field is replaced and `modified_by` is set to `user`; the image only
/// changes when a new file was uploaded.
pub fn update_product<R, S>(
    repo: &R,
    storage: &S,
    user: &AuthenticatedUser,
    product_name: &str,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter + CategoryReader + ?Sized,
    S: FileStorage + ?Sized,
{
    let input = form
        .validate_for_update()
        .map_err(ServiceError::Validation)?;
    let category = find_category(repo, &input.category_name)?;

    let product = repo
        .get_product_by_name(product_name)?
        .ok_or(ServiceError::ProductNotFound)?;

    let mut updates = UpdateProduct::new(
        input.name,
        input.description,
        input.price,
        category.id,
        input.expired_at,
        user.email.as_str(),
    );

    let stored_image = store_image(storage, input.image.as_ref())?;
    if let Some(path) = stored_image.as_deref() {
        updates = updates.with_image(path);
    }

    match repo.update_product(product.id, &updates) {
        Ok(updated) => Ok(updated),
        Err(err) => {
            log::error!("Failed to update product {}: {err}", product.id);
            discard_image(storage, stored_image.as_deref());
            Err(ServiceError::from(err))
        }
    }
}

/// Deletes the product with the given identifier.
pub fn delete_product<R>(repo: &R, product_id: i32) -> ServiceResult<()>
where
    R: ProductReader + ProductWriter + ?Sized,
{
    if repo.get_product_by_id(product_id)?.is_none() {
        return Err(ServiceError::ProductNotFound);
    }

    repo.delete_product(product_id)?;
    Ok(())
}

fn find_category<R>(repo: &R, name: &str) -> ServiceResult<Category>
where
    R: CategoryReader + ?Sized,
{
    repo.get_category_by_name(name)?
        .ok_or_else(|| ServiceError::CategoryNotFound(name.to_string()))
}

fn store_image<S>(storage: &S, image: Option<&ImageUpload>) -> ServiceResult<Option<String>>
where
    S: FileStorage + ?Sized,
{
    match image {
        Some(image) => Ok(Some(storage.put(PRODUCT_IMAGE_DIRECTORY, image)?)),
        None => Ok(None),
    }
}

fn discard_image<S>(storage: &S, path: Option<&str>)
where
    S: FileStorage + ?Sized,
{
    let Some(path) = path else {
        return;
    };

    if let Err(err) = storage.delete(path) {
        log::error!("Failed to remove orphaned image {path}: {err}");
    }
}
