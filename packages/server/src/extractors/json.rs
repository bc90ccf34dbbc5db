use axum::{
    Json,
    extract::{FromRequest, OptionalFromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A `Json<T>` wrapper whose rejections become `VALIDATION_ERROR` bodies.
///
/// As `Option<AppJson<T>>` it also accepts a request with no JSON body at all.
pub struct AppJson<T>(pub T);

fn rejection(err: JsonRejection) -> AppError {
    match err {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::Validation("Expected Content-Type: application/json".into())
        }
        JsonRejection::JsonSyntaxError(_) => AppError::Validation("Invalid JSON body".into()),
        other => AppError::Validation(other.body_text()),
    }
}

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state)
            .await
            .map_err(rejection)?;
        Ok(AppJson(value))
    }
}

impl<S, T> OptionalFromRequest<S> for AppJson<T>
where
    Json<T>: OptionalFromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let value = <Json<T> as OptionalFromRequest<S>>::from_request(req, state)
            .await
            .map_err(rejection)?;
        Ok(value.map(|Json(v)| AppJson(v)))
    }
}
