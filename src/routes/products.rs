use actix_multipart::form::{MultipartForm, MultipartFormConfig};
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, delete, get, post, route, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Serialize;

use crate::domain::product::Product;
use crate::forms::products::{FieldErrors, ProductMultipartForm};
use crate::repository::DieselRepository;
use crate::routes::response::{send_error, send_error_with_data, send_response};
use crate::services::{ServiceError, products};
use crate::storage::PublicDisk;

const LISTED_MESSAGE: &str = "Berhasil menampilkan data!";
const CREATED_MESSAGE: &str = "Produk berhasil dibuat!";
const SHOWN_MESSAGE: &str = "Berhasil menampilkan data produk";
const UPDATED_MESSAGE: &str = "Produk berhasil di update!";
const DELETED_MESSAGE: &str = "Data produk berhasil dihapus!";

const VALIDATION_FAILED_MESSAGE: &str = "Kesalahan validasi.";
const CATEGORY_NOT_FOUND_MESSAGE: &str = "Kategori tidak ditemukan";
const PRODUCT_NOT_FOUND_MESSAGE: &str = "Produk tidak ditemukan";
const INTERNAL_ERROR_MESSAGE: &str = "Ada kesalahan";

/// Upper bound for a whole multipart request body.
const MAX_UPLOAD_BYTES: usize = 12 * 1024 * 1024;

#[derive(Serialize)]
struct ProductList {
    products: Vec<Product>,
}

#[derive(Serialize)]
struct CreatedProduct {
    id: i32,
}

#[derive(Serialize)]
struct ProductDetail {
    product: Product,
}

/// Multipart extractor settings for the product endpoints.
///
/// A body that cannot be read as a product upload (wrong content type,
/// oversized image, truncated stream) is answered with the validation
/// envelope under the `body` key.
pub fn multipart_config() -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(MAX_UPLOAD_BYTES)
        .error_handler(|err, _req| {
            log::warn!("Rejected product upload: {err}");
            let mut errors = FieldErrors::default();
            errors.add("body", err.to_string());
            let response = send_error_with_data(
                VALIDATION_FAILED_MESSAGE,
                errors,
                StatusCode::UNPROCESSABLE_ENTITY,
            );
            InternalError::from_response(err, response).into()
        })
}

#[get("/products")]
pub async fn index_products(
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match products::list_products(repo.get_ref()) {
        Ok(products) => render_list(products),
        Err(err) => error_response(err, "list products"),
    }
}

/// Form-rendering endpoint kept for route parity; the API has no forms.
#[get("/products/create")]
pub async fn create_product_form() -> impl Responder {
    HttpResponse::NotFound().finish()
}

#[post("/products")]
pub async fn store_product(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    disk: web::Data<PublicDisk>,
    MultipartForm(form): MultipartForm<ProductMultipartForm>,
) -> impl Responder {
    let form = match form.into_product_form() {
        Ok(form) => form,
        Err(err) => {
            log::error!("Failed to read product upload: {err}");
            return send_error(INTERNAL_ERROR_MESSAGE, StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    match products::create_product(repo.get_ref(), disk.get_ref(), &user, form) {
        Ok(product) => render_created(&product),
        Err(err) => error_response(err, "create product"),
    }
}

#[get("/products/{product_id}")]
pub async fn show_product(
    path: web::Path<String>,
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Some(product_id) = parse_product_id(&path) else {
        return send_error(PRODUCT_NOT_FOUND_MESSAGE, StatusCode::NOT_FOUND);
    };

    match products::get_product(repo.get_ref(), product_id) {
        Ok(product) => render_product(product),
        Err(err) => error_response(err, "load product"),
    }
}

/// Form-rendering endpoint kept for route parity; the API has no forms.
#[get("/products/{product_id}/edit")]
pub async fn edit_product_form() -> impl Responder {
    HttpResponse::NotFound().finish()
}

/// Updates the product whose name equals the last path segment.
#[route("/products/{product_name}", method = "PUT", method = "PATCH")]
pub async fn update_product(
    path: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    disk: web::Data<PublicDisk>,
    MultipartForm(form): MultipartForm<ProductMultipartForm>,
) -> impl Responder {
    let product_name = path.into_inner();

    let form = match form.into_product_form() {
        Ok(form) => form,
        Err(err) => {
            log::error!("Failed to read product upload: {err}");
            return send_error(INTERNAL_ERROR_MESSAGE, StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    match products::update_product(repo.get_ref(), disk.get_ref(), &user, &product_name, form) {
        Ok(_) => render_updated(),
        Err(err) => error_response(err, "update product"),
    }
}

#[delete("/products/{product_id}")]
pub async fn destroy_product(
    path: web::Path<String>,
    _user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let Some(product_id) = parse_product_id(&path) else {
        return send_error(PRODUCT_NOT_FOUND_MESSAGE, StatusCode::NOT_FOUND);
    };

    match products::delete_product(repo.get_ref(), product_id) {
        Ok(()) => render_deleted(),
        Err(err) => error_response(err, "delete product"),
    }
}

fn render_list(products: Vec<Product>) -> HttpResponse {
    send_response(ProductList { products }, LISTED_MESSAGE, StatusCode::OK)
}

/// Only the new identifier is echoed back.
fn render_created(product: &Product) -> HttpResponse {
    send_response(
        CreatedProduct { id: product.id },
        CREATED_MESSAGE,
        StatusCode::CREATED,
    )
}

fn render_product(product: Product) -> HttpResponse {
    send_response(ProductDetail { product }, SHOWN_MESSAGE, StatusCode::OK)
}

fn render_updated() -> HttpResponse {
    send_response((), UPDATED_MESSAGE, StatusCode::CREATED)
}

fn render_deleted() -> HttpResponse {
    send_response((), DELETED_MESSAGE, StatusCode::OK)
}

/// Identifiers that are not integers cannot match any row.
fn parse_product_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn error_response(err: ServiceError, action: &str) -> HttpResponse {
    match err {
        ServiceError::Validation(errors) => send_error_with_data(
            VALIDATION_FAILED_MESSAGE,
            errors,
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        ServiceError::CategoryNotFound(_) => {
            send_error(CATEGORY_NOT_FOUND_MESSAGE, StatusCode::NOT_FOUND)
        }
        ServiceError::ProductNotFound => send_error(PRODUCT_NOT_FOUND_MESSAGE, StatusCode::NOT_FOUND),
        err @ (ServiceError::Repository(_) | ServiceError::Storage(_)) => {
            log::error!("Failed to {action}: {err}");
            send_error(INTERNAL_ERROR_MESSAGE, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::App;
    use actix_web::body::to_bytes;
    use actix_web::test::{TestRequest, call_service, init_service, read_body};
    use chrono::NaiveDate;
    use serde_json::{Value, json};

    use crate::storage::StorageError;

    fn sample_product() -> Product {
        let created_at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(8, 30, 0))
            .unwrap();
        Product {
            id: 11,
            name: "Shirt".to_string(),
            description: "Cotton".to_string(),
            price: 50000.0,
            category_id: 3,
            expired_at: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            image: Some("products/abc.png".to_string()),
            modified_by: "admin@example.com".to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    async fn body_json(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body())
            .await
            .expect("read response body");
        serde_json::from_slice(&bytes).expect("response is json")
    }

    async fn accept_upload(
        MultipartForm(_form): MultipartForm<ProductMultipartForm>,
    ) -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn created_response_carries_new_id() {
        let response = render_created(&sample_product());

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": true,
                "data": { "id": 11 },
                "message": "Produk berhasil dibuat!"
            })
        );
    }

    #[actix_web::test]
    async fn product_response_wraps_product_fields() {
        let response = render_product(sample_product());

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("Berhasil menampilkan data produk"));

        let product = &body["data"]["product"];
        assert_eq!(product["id"], json!(11));
        assert_eq!(product["name"], json!("Shirt"));
        assert_eq!(product["price"], json!(50000.0));
        assert_eq!(product["category_id"], json!(3));
        assert_eq!(product["expired_at"], json!("2025-12-31"));
        assert_eq!(product["image"], json!("products/abc.png"));
        assert_eq!(product["modified_by"], json!("admin@example.com"));
    }

    #[actix_web::test]
    async fn list_response_wraps_products() {
        let response = render_list(vec![sample_product()]);

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], json!("Berhasil menampilkan data!"));
        let products = body["data"]["products"]
            .as_array()
            .expect("products is an array");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["name"], json!("Shirt"));
    }

    #[actix_web::test]
    async fn update_and_delete_responses_carry_null_data() {
        let response = render_updated();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": true,
                "data": null,
                "message": "Produk berhasil di update!"
            })
        );

        let response = render_deleted();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": true,
                "data": null,
                "message": "Data produk berhasil dihapus!"
            })
        );
    }

    #[actix_web::test]
    async fn non_multipart_body_gets_validation_envelope() {
        let app = init_service(
            App::new()
                .app_data(multipart_config())
                .route("/products", web::post().to(accept_upload)),
        )
        .await;

        let request = TestRequest::post()
            .uri("/products")
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"name":"Shirt"}"#)
            .to_request();
        let response = call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = read_body(response).await;
        let body: Value = serde_json::from_slice(&bytes).expect("response is json");
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("Kesalahan validasi."));
        assert!(body["data"]["body"].is_array());
    }

    #[actix_web::test]
    async fn form_endpoints_are_not_found() {
        let app = init_service(
            App::new()
                .service(create_product_form)
                .service(edit_product_form),
        )
        .await;

        for uri in ["/products/create", "/products/12/edit"] {
            let request = TestRequest::get().uri(uri).to_request();
            let response = call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[test]
    fn parse_product_id_rejects_non_numeric() {
        assert_eq!(parse_product_id("42"), Some(42));
        assert_eq!(parse_product_id("shirt"), None);
        assert_eq!(parse_product_id(""), None);
    }

    #[test]
    fn error_response_maps_statuses() {
        let mut errors = FieldErrors::default();
        errors.add("name", "The name field is required.");

        let cases = [
            (
                ServiceError::Validation(errors),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::CategoryNotFound("Apparel".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (ServiceError::ProductNotFound, StatusCode::NOT_FOUND),
            (
                ServiceError::Storage(StorageError::InvalidPath("..".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(error_response(err, "test").status(), expected);
        }
    }
}
