use super::{reply, reply_with, JsonBody, Reply};
use crate::{
    error::{AppError, AppResult},
    models::Attendance,
    store::{SharedStore, Store, StoreError},
    validate,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Extension, Router,
};
use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every check-in is stamped with IST wall-clock time, wherever the scanner is.
const CHECK_IN_OFFSET_SECS: i64 = 5 * 60 * 60 + 30 * 60;

/// Format used when listing check-ins, e.g. `11/2/2026, 3:04:05 PM`.
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

const UNKNOWN: &str = "Unknown";
const NO_CONFIRMATION: &str = "N/A";

pub fn check_in_time() -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::seconds(CHECK_IN_OFFSET_SECS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckIn {
    Recorded,
    /// The pair was already checked in; nothing was written.
    AlreadyRecorded,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub event_id: Option<String>,
    pub user_id: Option<String>,
    #[serde(rename = "conf_number")]
    pub conf_number: Option<String>,
}

pub async fn record_check_in(store: &dyn Store, req: CheckInRequest) -> AppResult<CheckIn> {
    let (event_id, user_id, conf_number) = match (req.event_id, req.user_id, req.conf_number) {
        (Some(e), Some(u), Some(c)) => (
            validate::reference("eventId", &e)?,
            validate::reference("userId", &u)?,
            validate::required("conf_number", Some(c))?,
        ),
        _ => return Err(AppError::validation("Data insufficient")),
    };

    if store.attendance_for(&event_id, &user_id).await?.is_some() {
        return Ok(CheckIn::AlreadyRecorded);
    }

    let attendance = Attendance {
        timestamp: check_in_time(),
        event_id,
        user_id,
        conf_number,
    };
    match store.create_attendance(attendance).await {
        Ok(a) => {
            log::info!("checked in {} at event {}", a.user_id, a.event_id);
            Ok(CheckIn::Recorded)
        }
        // a concurrent scan of the same ticket won the insert
        Err(StoreError::Conflict { .. }) => Ok(CheckIn::AlreadyRecorded),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRow {
    pub name: String,
    pub email: String,
    pub username: String,
    pub mobile_no: String,
    pub institute: String,
    pub timestamp: String,
    #[serde(rename = "conf_number")]
    pub conf_number: String,
}

/// Check-ins of an event joined with attendee profiles.
///
/// An event nobody has checked in to is reported as not found, the same as
/// an unknown event id.
pub async fn list_attendance(store: &dyn Store, event_id: &str) -> AppResult<Vec<AttendanceRow>> {
    let event_id = validate::reference("eventId", event_id)?;

    let records = store.attendance_by_event(&event_id).await?;
    if records.is_empty() {
        return Err(AppError::not_found("Event not found"));
    }

    let account_refs: Vec<String> = records.iter().map(|a| a.user_id.clone()).collect();
    let users: HashMap<_, _> = store
        .users_by_account_refs(&account_refs)
        .await?
        .into_iter()
        .map(|u| (u.clerk_id.clone(), u))
        .collect();

    Ok(records
        .into_iter()
        .map(|a| {
            let (name, email, username, mobile_no, institute) = match users.get(&a.user_id) {
                Some(u) => (
                    u.name.clone(),
                    u.email.clone(),
                    u.username.clone(),
                    u.mobile_no.clone(),
                    u.institute.clone(),
                ),
                None => {
                    log::warn!("attendee {} of event {} has no profile", a.user_id, a.event_id);
                    let unknown = || UNKNOWN.to_string();
                    (unknown(), unknown(), unknown(), unknown(), unknown())
                }
            };

            AttendanceRow {
                name,
                email,
                username,
                mobile_no,
                institute,
                timestamp: a.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                conf_number: if a.conf_number.trim().is_empty() {
                    NO_CONFIRMATION.to_string()
                } else {
                    a.conf_number
                },
            }
        })
        .collect())
}

async fn take(
    Extension(store): Extension<SharedStore>,
    JsonBody(req): JsonBody<CheckInRequest>,
) -> AppResult<Reply<CheckIn>> {
    Ok(match record_check_in(store.as_ref(), req).await? {
        CheckIn::Recorded => reply_with(
            StatusCode::OK,
            CheckIn::Recorded,
            "Attendance recorded successfully!",
        ),
        CheckIn::AlreadyRecorded => reply_with(
            StatusCode::MULTIPLE_CHOICES,
            CheckIn::AlreadyRecorded,
            "Attendance already marked for this event and user.",
        ),
    })
}

async fn list(
    Extension(store): Extension<SharedStore>,
    Path(event_id): Path<String>,
) -> AppResult<Reply<Vec<AttendanceRow>>> {
    Ok(reply(
        StatusCode::OK,
        list_attendance(store.as_ref(), &event_id).await?,
    ))
}

pub fn app() -> Router {
    Router::new()
        .route("/", post(take))
        .route("/:event_id", get(list))
}
