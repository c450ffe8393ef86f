//! JSON envelope shared by every API response.
//!
//! Success: `{"success": true, "data": ..., "message": "..."}`; `data` is
//! always present, `null` included. Errors: `{"success": false, "message":
//! "..."}` with `data` only when there are details to report.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SuccessBody<'a, T: Serialize> {
    success: bool,
    data: T,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a, T: Serialize> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

/// Wrap `data` in a success envelope.
pub fn send_response<T: Serialize>(data: T, message: &str, status: StatusCode) -> HttpResponse {
    HttpResponse::build(status).json(SuccessBody {
        success: true,
        data,
        message,
    })
}

/// Error envelope without details.
pub fn send_error(message: &str, status: StatusCode) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody::<()> {
        success: false,
        message,
        data: None,
    })
}

/// Error envelope carrying `errors` under `data`.
pub fn send_error_with_data<T: Serialize>(
    message: &str,
    errors: T,
    status: StatusCode,
) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody {
        success: false,
        message,
        data: Some(errors),
    })
}
