use crate::domain::validation::{RequestSchema, validate_schema};
use crate::presentation::handlers::ApiError;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use tracing::warn;

/// JSON body that has been normalized and validated.
///
/// Extraction fails with [`ApiError::Validation`] before the handler runs,
/// both for malformed JSON and for schema violations.
#[derive(Debug)]
pub struct Validated<T>(pub T);

impl<T> Validated<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FromRequest for Validated<T>
where
    T: RequestSchema + DeserializeOwned + 'static,
{
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = web::Json::<T>::from_request(req, payload);
        Box::pin(async move {
            let web::Json(body) = body.await.map_err(|e| {
                warn!(error = %e, "Unreadable JSON body");
                ApiError::Validation(format!("Malformed request body: {}", e))
            })?;
            let body = validate_schema(body)?;
            Ok(Validated(body))
        })
    }
}
