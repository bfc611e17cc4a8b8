//! Listing Errors

use mandi::errors::ValidationError;
use mandi_app::domain::listings::ListingsServiceError;
use salvo::http::StatusError;
use tracing::error;

/// 400 naming the offending field.
pub(crate) fn validation_error(error: &ValidationError) -> StatusError {
    StatusError::bad_request().brief(format!("{}: {error}", error.field()))
}

pub(crate) fn into_status_error(error: ListingsServiceError) -> StatusError {
    match error {
        ListingsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Listing already exists")
        }
        ListingsServiceError::NotFound => StatusError::not_found().brief("Listing not found"),
        ListingsServiceError::Forbidden => {
            StatusError::forbidden().brief("Not allowed to manage this listing")
        }
        ListingsServiceError::Validation(error) => validation_error(&error),
        ListingsServiceError::InvalidReference
        | ListingsServiceError::MissingRequiredData
        | ListingsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid listing payload")
        }
        ListingsServiceError::Sql(source) => {
            error!("listing storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
