//! Request extractors whose failures render as HTML error pages
//!
//! Path parameters that cannot be parsed name nothing that exists, so they
//! become 404s. Request bodies are taken as `Result`s and only unwrapped
//! after the ownership guard has run; a non-owner sees 403 whatever the
//! body looks like.

use axum::{
    async_trait,
    extract::{
        multipart::MultipartRejection, rejection::FormRejection, FromRequestParts, Multipart, Path,
    },
    http::request::Parts,
    Form,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::validation::FormFields;
use crate::{AppError, AppResult};

/// URL path parameters, rejected as [`AppError::NotFound`]
#[derive(Debug)]
pub struct ResourcePath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ResourcePath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!("Unresolvable path {}: {}", parts.uri.path(), rejection);
                Err(AppError::NotFound(parts.uri.path().to_string()))
            }
        }
    }
}

/// Url-encoded form body, unparsed until [`form_fields`]
pub type FormBody = Result<Form<FormFields>, FormRejection>;

/// Multipart body, unparsed until [`multipart_body`]
pub type MultipartBody = Result<Multipart, MultipartRejection>;

pub fn form_fields(body: FormBody) -> AppResult<FormFields> {
    body.map(|Form(fields)| fields)
        .map_err(|rejection| AppError::BadRequest(rejection.to_string()))
}

pub fn multipart_body(body: MultipartBody) -> AppResult<Multipart> {
    body.map_err(|rejection| AppError::BadRequest(rejection.to_string()))
}
