//! Request extractors with envelope-shaped rejections
//!
//! Wrap axum's `Json`, `Query` and `Path` so a malformed body, query string or
//! path segment is answered with the uniform error envelope instead of
//! axum's plain-text rejection.

use axum::extract::{FromRequest, FromRequestParts};

use crate::utils::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
