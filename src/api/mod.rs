use crate::error::AppError;
use axum::{
    async_trait,
    body::HttpBody,
    extract::{FromRequest, RequestParts},
    http::StatusCode,
    BoxError, Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use std::borrow::Cow;

pub mod admin;
pub mod attendance;
pub mod event;
pub mod member;
pub mod registration;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Cow<'static, str>>,
}

pub type Reply<T> = (StatusCode, Json<Envelope<T>>);

pub fn reply<T>(code: StatusCode, data: T) -> Reply<T> {
    (
        code,
        Json(Envelope {
            success: true,
            data,
            message: None,
        }),
    )
}

pub fn reply_with<T>(code: StatusCode, data: T, message: impl Into<Cow<'static, str>>) -> Reply<T> {
    (
        code,
        Json(Envelope {
            success: true,
            data,
            message: Some(message.into()),
        }),
    )
}

/// JSON request body whose rejections (bad syntax, wrong types, unknown
/// keys, missing content type) are answered as validation errors.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, B> FromRequest<B> for JsonBody<T>
where
    T: DeserializeOwned,
    B: HttpBody + Send,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = AppError;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                log::debug!("rejected request body: {rejection}");
                Err(AppError::validation(rejection.to_string()))
            }
        }
    }
}

pub fn app() -> Router {
    Router::new()
        .nest("/admin", admin::app())
        .merge(event::app())
        .merge(registration::app())
        .nest("/attendance", attendance::app())
        .merge(member::app())
}
