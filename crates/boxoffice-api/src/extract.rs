//! Request extractors whose rejections are [`ApiError`]s.
//!
//! axum's stock `Json` and `Path` reject with plain-text bodies. These
//! wrappers run the same extraction but answer with the usual JSON error
//! shape and a `400` status.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);
