use super::{reply, Reply};
use crate::{
    error::{AppError, AppResult},
    store::{SharedStore, Store},
    validate,
};
use axum::{extract::Path, http::StatusCode, routing::get, Extension, Router};
use futures::future::try_join_all;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Registration {
    #[serde(rename_all = "camelCase")]
    Profile {
        name: String,
        email: String,
        username: String,
        mobile_no: String,
        institute: String,
    },
    #[serde(rename_all = "camelCase")]
    Missing {
        account_ref: String,
        message: &'static str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReport {
    pub event_name: String,
    pub registrations: Vec<Registration>,
}

/// Registered users joined against their profiles. A missing profile
/// yields a placeholder row instead of failing the report.
pub async fn get_registrations(store: &dyn Store, event_id: &str) -> AppResult<RegistrationReport> {
    let event_id = validate::reference("eventId", event_id)?;
    let event = store
        .event_by_id(&event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    let event_id = &event_id;
    let lookups = event.registered_users.iter().map(|account_ref| async move {
        let user = store.user_by_account_ref(account_ref).await?;
        Ok::<_, AppError>(match user {
            Some(user) => Registration::Profile {
                name: user.name,
                email: user.email,
                username: user.username,
                mobile_no: user.mobile_no,
                institute: user.institute,
            },
            None => {
                log::warn!("registered user {account_ref} of event {event_id} has no profile");
                Registration::Missing {
                    account_ref: account_ref.clone(),
                    message: "User not found",
                }
            }
        })
    });
    let registrations = try_join_all(lookups).await?;

    Ok(RegistrationReport {
        event_name: event.title,
        registrations,
    })
}

async fn registrations(
    Extension(store): Extension<SharedStore>,
    Path(event_id): Path<String>,
) -> AppResult<Reply<RegistrationReport>> {
    Ok(reply(
        StatusCode::OK,
        get_registrations(store.as_ref(), &event_id).await?,
    ))
}

pub fn app() -> Router {
    Router::new().route("/event/:id/registrations", get(registrations))
}
