use super::{reply, reply_with, JsonBody, Reply};
use crate::{
    error::{AppError, AppResult},
    models::{ClubMember, MemberChanges, MemberType},
    store::{SharedStore, Store},
    validate,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Extension, Router,
};
use nanoid::nanoid;
use serde::{Deserialize, Serialize};

fn member_type(value: String) -> AppResult<MemberType> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::validation("type must be board or executive"))
}

/// A client-sent `_id` is ignored; the store assigns ids.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub clerk_id: Option<String>,
    #[serde(rename = "type")]
    pub member_type: Option<String>,
    pub name: Option<String>,
    pub position: Option<String>,
    pub profile_photo: Option<String>,
}

pub async fn add_member(store: &dyn Store, req: AddMemberRequest) -> AppResult<ClubMember> {
    let member = ClubMember {
        id: nanoid!(),
        clerk_id: validate::reference("clerkId", &validate::required("clerkId", req.clerk_id)?)?,
        member_type: member_type(validate::required("type", req.member_type)?)?,
        name: validate::required("name", req.name)?,
        position: validate::non_blank("position", req.position)?,
        profile_photo: validate::required_url("profilePhoto", req.profile_photo)?,
    };

    let stored = store.create_member(member).await?;
    log::info!(
        "added {} member {} to club {}",
        stored.member_type.as_str(),
        stored.id,
        stored.clerk_id
    );
    Ok(stored)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateMemberRequest {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    /// Document version some clients echo back; ignored.
    #[serde(rename = "__v", default)]
    pub _version: Option<serde_json::Value>,
    pub clerk_id: Option<String>,
    #[serde(rename = "type")]
    pub member_type: Option<String>,
    pub name: Option<String>,
    pub position: Option<String>,
    pub profile_photo: Option<String>,
}

/// The owning club cannot be changed; an echoed `clerkId` must match.
pub async fn update_member(store: &dyn Store, req: UpdateMemberRequest) -> AppResult<ClubMember> {
    let id = validate::reference("_id", &validate::required("_id", req.id)?)?;
    let changes = MemberChanges {
        member_type: validate::non_blank("type", req.member_type)?
            .map(member_type)
            .transpose()?,
        name: validate::non_blank("name", req.name)?,
        position: validate::non_blank("position", req.position)?,
        profile_photo: validate::optional_url("profilePhoto", req.profile_photo)?,
    };

    let existing = store
        .member_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Member not found"))?;
    if let Some(clerk_id) = req.clerk_id {
        if clerk_id.trim() != existing.clerk_id {
            return Err(AppError::validation("clerkId cannot be changed"));
        }
    }

    let updated = store
        .update_member(&id, changes)
        .await?
        .ok_or_else(|| AppError::not_found("Member not found"))?;
    log::info!("updated member {}", updated.id);
    Ok(updated)
}

pub async fn delete_member(store: &dyn Store, member_id: Option<String>) -> AppResult<()> {
    let member_id = validate::reference("memberId", &validate::required("memberId", member_id)?)?;

    if !store.delete_member(&member_id).await? {
        return Err(AppError::not_found("Member not found"));
    }
    log::info!("deleted member {member_id}");
    Ok(())
}

#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub board_members: Vec<ClubMember>,
    pub executive_members: Vec<ClubMember>,
}

pub async fn list_members(store: &dyn Store, owner: &str) -> AppResult<Roster> {
    let owner = validate::reference("clerkId", owner)?;

    let members = store.members_by_owner(&owner).await?;
    if members.is_empty() {
        return Err(AppError::not_found("No members found for this club"));
    }

    let (board_members, executive_members) = members
        .into_iter()
        .partition(|m| m.member_type == MemberType::Board);
    Ok(Roster {
        board_members,
        executive_members,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteMemberRequest {
    member_id: Option<String>,
}

async fn add(
    Extension(store): Extension<SharedStore>,
    JsonBody(req): JsonBody<AddMemberRequest>,
) -> AppResult<Reply<ClubMember>> {
    Ok(reply(
        StatusCode::CREATED,
        add_member(store.as_ref(), req).await?,
    ))
}

async fn edit(
    Extension(store): Extension<SharedStore>,
    JsonBody(req): JsonBody<UpdateMemberRequest>,
) -> AppResult<Reply<ClubMember>> {
    Ok(reply(
        StatusCode::OK,
        update_member(store.as_ref(), req).await?,
    ))
}

async fn remove(
    Extension(store): Extension<SharedStore>,
    JsonBody(req): JsonBody<DeleteMemberRequest>,
) -> AppResult<Reply<()>> {
    delete_member(store.as_ref(), req.member_id).await?;
    Ok(reply_with(StatusCode::OK, (), "Member successfully deleted"))
}

async fn roster(
    Extension(store): Extension<SharedStore>,
    Path(owner): Path<String>,
) -> AppResult<Reply<Roster>> {
    Ok(reply(StatusCode::OK, list_members(store.as_ref(), &owner).await?))
}

pub fn app() -> Router {
    Router::new()
        .route("/member", post(add).put(edit).delete(remove))
        .route("/members/:owner", get(roster))
}
