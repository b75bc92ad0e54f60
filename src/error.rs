use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::borrow::Cow;

pub enum AppError {
    InternalServerError(anyhow::Error),
    /// A required field is missing or malformed
    Validation(Cow<'static, str>),
    NotFound(Cow<'static, str>),
    /// An event names an owner with no admin record
    OwnerNotFound,
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize)]
struct AppErrorResponse {
    success: bool,
    error: &'static str,
    message: Cow<'static, str>,
}

fn respond(code: StatusCode, error: &'static str, message: Cow<'static, str>) -> Response {
    (
        code,
        Json(AppErrorResponse {
            success: false,
            error,
            message,
        }),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InternalServerError(err) => {
                // uniqueness rejections from the store are the caller's fault
                if let Some(StoreError::Conflict { .. }) = err.downcast_ref::<StoreError>() {
                    log::warn!("{err}");
                    return respond(StatusCode::CONFLICT, "conflict", err.to_string().into());
                }

                log::error!("{err:#}");
                respond(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal Server Error".into(),
                )
            }
            AppError::Validation(s) => respond(StatusCode::BAD_REQUEST, "validation_error", s),
            AppError::NotFound(s) => respond(StatusCode::NOT_FOUND, "not_found", s),
            AppError::OwnerNotFound => respond(
                StatusCode::NOT_FOUND,
                "owner_not_found",
                "Owner not found".into(),
            ),
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(e: E) -> AppError {
        AppError::InternalServerError(e.into())
    }
}

impl AppError {
    pub fn validation(s: impl Into<Cow<'static, str>>) -> AppError {
        AppError::Validation(s.into())
    }

    pub fn not_found(s: impl Into<Cow<'static, str>>) -> AppError {
        AppError::NotFound(s.into())
    }

    /// Short machine-readable kind, the same string the response carries in `error`.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InternalServerError(err) => match err.downcast_ref::<StoreError>() {
                Some(StoreError::Conflict { .. }) => "conflict",
                _ => "internal_error",
            },
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::OwnerNotFound => "owner_not_found",
        }
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::InternalServerError(err) => write!(f, "InternalServerError({err:#})"),
            AppError::Validation(s) => write!(f, "Validation({s})"),
            AppError::NotFound(s) => write!(f, "NotFound({s})"),
            AppError::OwnerNotFound => write!(f, "OwnerNotFound"),
        }
    }
}
