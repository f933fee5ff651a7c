use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body extractor whose rejections render as a 400 in the usual envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
