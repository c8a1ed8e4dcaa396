//! Path and query extractors whose rejections render through [`ApiError`],
//! so malformed URLs get the same `{error: {code, message}}` body as every
//! other failure.
use axum::extract::FromRequestParts;

use crate::error::ApiError;

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);
