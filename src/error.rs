// src/error.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

pub const MISSING_TEXT_MESSAGE: &str = "No text provided";
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process the request";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("no text provided")]
    MissingText,

    #[error("processing failed: {0}")]
    Processing(#[from] anyhow::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingText => StatusCode::BAD_REQUEST,
            ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::MissingText => MISSING_TEXT_MESSAGE,
            ApiError::Processing(e) => {
                // Details stay in the server log.
                error!("An error occurred: {:#}", e);
                PROCESSING_FAILED_MESSAGE
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
