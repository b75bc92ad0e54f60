use super::{reply, reply_with, JsonBody, Reply};
use crate::{
    error::{AppError, AppResult},
    models::{Event, EventMode, OwnerSnapshot, ParticipantLimit},
    store::{SharedStore, Store},
    validate,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use nanoid::nanoid;
use serde::Deserialize;

/// Resolves the participant limit from the wire pair, falling back to
/// `current` when the request leaves it untouched.
fn participant_limit(
    no_max_participants: Option<bool>,
    max_allowed_participants: Option<i64>,
    current: Option<ParticipantLimit>,
) -> AppResult<ParticipantLimit> {
    let limited = |n: i64| {
        u32::try_from(n).map(ParticipantLimit::Limited).map_err(|_| {
            AppError::validation("maxAllowedParticipants must be a non-negative integer")
        })
    };

    match (no_max_participants, max_allowed_participants, current) {
        (Some(true), _, _) => Ok(ParticipantLimit::Unlimited),
        (_, Some(n), _) => limited(n),
        (None, None, Some(current)) => Ok(current),
        (Some(false), None, Some(ParticipantLimit::Limited(n))) => Ok(ParticipantLimit::Limited(n)),
        _ => Err(AppError::validation(
            "maxAllowedParticipants is required unless noMaxParticipants is set",
        )),
    }
}

/// Checks that hold for every stored event, whether freshly built or merged.
fn validate_event(event: &Event) -> AppResult<()> {
    for (field, value) in [
        ("title", &event.title),
        ("subtitle", &event.subtitle),
        ("description", &event.description),
        ("time", &event.time),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::validation(format!("{field} is required")));
        }
    }
    if event.mode == EventMode::Offline && event.location.trim().is_empty() {
        return Err(AppError::validation(
            "location is required for offline events",
        ));
    }
    if !event.fees.is_finite() || event.fees < 0.0 {
        return Err(AppError::validation("fees must be a non-negative number"));
    }
    if event.like_counter < 0 {
        return Err(AppError::validation("likeCounter must not be negative"));
    }
    for (field, value) in [
        ("coverImg", &event.cover_img),
        ("detailImg", &event.detail_img),
        ("supportFile", &event.support_file),
    ] {
        validate::asset_url(field, value.clone())?;
    }
    Ok(())
}

fn required_value<T>(field: &'static str, value: Option<T>) -> AppResult<T> {
    value.ok_or_else(|| AppError::validation(format!("{field} is required")))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub owner_id: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub mode: Option<EventMode>,
    pub location: Option<String>,
    pub time: Option<String>,
    pub fees: Option<f64>,
    pub max_allowed_participants: Option<i64>,
    pub no_max_participants: Option<bool>,
    pub cover_img: Option<String>,
    pub detail_img: Option<String>,
    pub support_file: Option<String>,
    pub visibility: Option<bool>,
    pub is_available_to_reg: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub like_counter: Option<i64>,
    pub registration_open_till: Option<DateTime<Utc>>,
    pub additional_info: Option<String>,
    #[serde(default)]
    pub registered_users: Vec<String>,
}

pub async fn create_event(store: &dyn Store, req: CreateEventRequest) -> AppResult<Event> {
    let owner = validate::reference("ownerId", &validate::required("ownerId", req.owner_id)?)?;
    let mode = req.mode.unwrap_or(EventMode::Offline);

    let mut event = Event {
        id: nanoid!(),
        title: validate::required("title", req.title)?,
        subtitle: validate::required("subtitle", req.subtitle)?,
        description: validate::required("description", req.description)?,
        date: required_value("date", req.date)?,
        mode,
        location: req.location.unwrap_or_default(),
        time: validate::required("time", req.time)?,
        fees: required_value("fees", req.fees)?,
        participants: participant_limit(
            req.no_max_participants,
            req.max_allowed_participants,
            None,
        )?,
        cover_img: validate::required_url("coverImg", req.cover_img)?,
        detail_img: validate::required_url("detailImg", req.detail_img)?,
        support_file: validate::required_url("supportFile", req.support_file)?,
        visibility: required_value("visibility", req.visibility)?,
        is_available_to_reg: required_value("isAvailableToReg", req.is_available_to_reg)?,
        tags: req.tags,
        categories: req.categories,
        like_counter: req.like_counter.unwrap_or(0),
        registration_open_till: req.registration_open_till,
        additional_info: req.additional_info.unwrap_or_default(),
        registered_users: req.registered_users,
        owner,
        owner_snapshot: OwnerSnapshot {
            owner_name: String::new(),
            owner_logo: String::new(),
        },
    };
    validate_event(&event)?;

    let admin = store
        .admin_by_account_ref(&event.owner)
        .await?
        .ok_or(AppError::OwnerNotFound)?;
    event.owner_snapshot = OwnerSnapshot::from(&admin);

    let event = store.create_event(event).await?;
    log::info!("{} created event {} ({})", event.owner, event.id, event.title);
    Ok(event)
}

/// Zero or one event. A missing id is an empty list, not an error.
pub async fn get_event_by_id(store: &dyn Store, id: &str) -> AppResult<Vec<Event>> {
    Ok(store.event_by_id(id).await?.into_iter().collect())
}

pub async fn list_events_by_owner(store: &dyn Store, owner: &str) -> AppResult<Vec<Event>> {
    let owner = validate::reference("owner", owner)?;
    Ok(store.events_by_owner(&owner).await?)
}

/// Same listing as [`list_events_by_owner`]; both read the `owner` field.
pub async fn list_events_by_creator(
    store: &dyn Store,
    account_ref: &str,
) -> AppResult<Vec<Event>> {
    list_events_by_owner(store, account_ref).await
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EventUpdateRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub mode: Option<EventMode>,
    pub location: Option<String>,
    pub time: Option<String>,
    pub fees: Option<f64>,
    pub max_allowed_participants: Option<i64>,
    pub no_max_participants: Option<bool>,
    pub cover_img: Option<String>,
    pub detail_img: Option<String>,
    pub support_file: Option<String>,
    pub visibility: Option<bool>,
    pub is_available_to_reg: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub like_counter: Option<i64>,
    pub registration_open_till: Option<DateTime<Utc>>,
    pub additional_info: Option<String>,
}

impl EventUpdateRequest {
    fn merge_into(self, event: &mut Event) -> AppResult<()> {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field { event.$field = v; })*
            };
        }

        event.participants = participant_limit(
            self.no_max_participants,
            self.max_allowed_participants,
            Some(event.participants),
        )?;
        if let Some(open_till) = self.registration_open_till {
            event.registration_open_till = Some(open_till);
        }
        merge!(
            title,
            subtitle,
            description,
            date,
            mode,
            location,
            time,
            fees,
            cover_img,
            detail_img,
            support_file,
            visibility,
            tags,
            categories,
            is_available_to_reg,
            like_counter,
            additional_info
        );
        Ok(())
    }
}

pub async fn update_event(
    store: &dyn Store,
    id: &str,
    req: EventUpdateRequest,
) -> AppResult<Event> {
    let id = validate::reference("id", id)?;
    let mut event = store
        .event_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    req.merge_into(&mut event)?;
    validate_event(&event)?;

    let event = store
        .replace_event(event)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;
    log::info!("updated event {}", event.id);
    Ok(event)
}

/// Attendance rows and registrations of the event are left in place.
pub async fn delete_event(store: &dyn Store, id: &str) -> AppResult<()> {
    let id = validate::reference("id", id)?;
    if !store.delete_event(&id).await? {
        return Err(AppError::not_found("Event not found"));
    }
    log::info!("deleted event {id}");
    Ok(())
}

async fn create(
    Extension(store): Extension<SharedStore>,
    JsonBody(req): JsonBody<CreateEventRequest>,
) -> AppResult<Reply<Event>> {
    Ok(reply(
        StatusCode::CREATED,
        create_event(store.as_ref(), req).await?,
    ))
}

async fn find(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
) -> AppResult<Reply<Vec<Event>>> {
    Ok(reply(
        StatusCode::OK,
        get_event_by_id(store.as_ref(), &id).await?,
    ))
}

async fn update(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<EventUpdateRequest>,
) -> AppResult<Reply<Event>> {
    Ok(reply(
        StatusCode::OK,
        update_event(store.as_ref(), &id, req).await?,
    ))
}

async fn remove(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
) -> AppResult<Reply<()>> {
    delete_event(store.as_ref(), &id).await?;
    Ok(reply_with(StatusCode::OK, (), "Event successfully deleted"))
}

async fn by_owner(
    Extension(store): Extension<SharedStore>,
    Path(owner): Path<String>,
) -> AppResult<Reply<Vec<Event>>> {
    Ok(reply(
        StatusCode::OK,
        list_events_by_owner(store.as_ref(), &owner).await?,
    ))
}

async fn by_creator(
    Extension(store): Extension<SharedStore>,
    Path(account_ref): Path<String>,
) -> AppResult<Reply<Vec<Event>>> {
    Ok(reply(
        StatusCode::OK,
        list_events_by_creator(store.as_ref(), &account_ref).await?,
    ))
}

pub fn app() -> Router {
    Router::new()
        .route("/event", post(create))
        .route("/event/:id", get(find).put(update).delete(remove))
        .route("/events/:owner", get(by_owner))
        .route("/creator/:account_ref/events", get(by_creator))
}
