//! Field checks shared by every request body.
//!
//! Each helper takes the wire name of the field so the error message points
//! at what the client actually sent.

use crate::error::{AppError, AppResult};
use itertools::Itertools;
use url::Url;

/// Clients send the literal string "undefined" when the signed-in user is not loaded yet.
const UNDEFINED: &str = "undefined";

pub fn reference(field: &'static str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() || value == UNDEFINED {
        return Err(AppError::validation(format!("{field} is missing")));
    }
    Ok(value.to_string())
}

/// Rejects absent or blank values. A present value is returned as sent.
pub fn required(field: &'static str, value: Option<String>) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::validation(format!("{field} is required"))),
    }
}

/// For partial updates: absent is fine, present-but-blank is not.
pub fn non_blank(field: &'static str, value: Option<String>) -> AppResult<Option<String>> {
    value.map(|v| required(field, Some(v))).transpose()
}

pub fn asset_url(field: &'static str, value: String) -> AppResult<String> {
    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(value),
        _ => Err(AppError::validation(format!(
            "{field} must be an http(s) url"
        ))),
    }
}

pub fn required_url(field: &'static str, value: Option<String>) -> AppResult<String> {
    asset_url(field, required(field, value)?)
}

pub fn optional_url(field: &'static str, value: Option<String>) -> AppResult<Option<String>> {
    non_blank(field, value)?
        .map(|v| asset_url(field, v))
        .transpose()
}

/// Trims labels, drops blanks and repeats, keeps first-seen order.
pub fn labels(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unique()
        .collect()
}
