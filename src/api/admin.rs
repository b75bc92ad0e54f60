use super::{reply, reply_with, JsonBody, Reply};
use crate::{
    error::{AppError, AppResult},
    models::{Admin, AdminChanges, PendingAdminRequest},
    store::{SharedStore, Store},
    validate,
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};

/// Where an account stands on its way to becoming a club admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStatus {
    NotApplied = 1,
    Pending = 2,
    Approved = 3,
}

impl ApprovalStatus {
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn message(self) -> &'static str {
        match self {
            ApprovalStatus::NotApplied => "User has not applied for admin",
            ApprovalStatus::Pending => "Admin request pending",
            ApprovalStatus::Approved => "Admin request approved",
        }
    }
}

/// Admin is checked before the pending table: an approved account may still
/// have its old request lying around.
pub async fn get_approval_status(
    store: &dyn Store,
    account_ref: &str,
) -> AppResult<ApprovalStatus> {
    let account_ref = validate::reference("clerkId", account_ref)?;

    if store.admin_by_account_ref(&account_ref).await?.is_some() {
        return Ok(ApprovalStatus::Approved);
    }
    if store
        .pending_request_by_account_ref(&account_ref)
        .await?
        .is_some()
    {
        return Ok(ApprovalStatus::Pending);
    }
    Ok(ApprovalStatus::NotApplied)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(alias = "clerkId")]
    pub account_ref: Option<String>,
    pub club_name: Option<String>,
    #[serde(rename = "type")]
    pub club_type: Option<String>,
    pub logo: Option<String>,
    pub institute: Option<String>,
    pub email_id: Option<String>,
}

pub async fn submit_approval_request(
    store: &dyn Store,
    req: SignupRequest,
) -> AppResult<PendingAdminRequest> {
    let request = PendingAdminRequest {
        account_ref: validate::reference(
            "accountRef",
            &validate::required("accountRef", req.account_ref)?,
        )?,
        club_name: validate::required("clubName", req.club_name)?,
        club_type: validate::required("type", req.club_type)?,
        logo: validate::required_url("logo", req.logo)?,
        institute: validate::required("institute", req.institute)?,
        email_id: validate::required("emailId", req.email_id)?,
    };

    let stored = store.create_pending_request(request).await?;
    log::info!(
        "admin request from {} for club {}",
        stored.account_ref,
        stored.club_name
    );
    Ok(stored)
}

pub async fn get_admin(store: &dyn Store, account_ref: &str) -> AppResult<Admin> {
    let account_ref = validate::reference("clerkId", account_ref)?;

    store
        .admin_by_account_ref(&account_ref)
        .await?
        .ok_or_else(|| AppError::not_found("Admin not found"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminUpdateRequest {
    /// Clients send back the whole profile they fetched; the id may ride along.
    #[serde(alias = "clerkId")]
    pub account_ref: Option<String>,
    pub club_name: Option<String>,
    #[serde(rename = "type")]
    pub club_type: Option<String>,
    pub logo: Option<String>,
    pub institute: Option<String>,
    pub email_id: Option<String>,
    pub bio: Option<String>,
    pub cover_image: Option<String>,
    pub membership_form: Option<String>,
    pub social_media_links: Option<Vec<String>>,
    pub faculty_advisor: Option<String>,
    pub website: Option<String>,
    pub about_us: Option<String>,
}

/// Optional profile links may be cleared with an empty string.
fn clearable_url(field: &'static str, value: Option<String>) -> AppResult<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => Ok(Some(String::new())),
        other => validate::optional_url(field, other),
    }
}

impl AdminUpdateRequest {
    fn into_changes(self) -> AppResult<AdminChanges> {
        Ok(AdminChanges {
            club_name: validate::non_blank("clubName", self.club_name)?,
            club_type: validate::non_blank("type", self.club_type)?,
            logo: validate::optional_url("logo", self.logo)?,
            institute: validate::non_blank("institute", self.institute)?,
            email_id: validate::non_blank("emailId", self.email_id)?,
            bio: self.bio,
            cover_image: clearable_url("coverImage", self.cover_image)?,
            membership_form: clearable_url("membershipForm", self.membership_form)?,
            social_media_links: self.social_media_links.map(validate::labels),
            faculty_advisor: self.faculty_advisor,
            website: clearable_url("website", self.website)?,
            about_us: self.about_us,
        })
    }
}

/// Events already created keep the name and logo they were created with.
/// An echoed `accountRef` must name the same admin as the path.
pub async fn update_admin(
    store: &dyn Store,
    account_ref: &str,
    req: AdminUpdateRequest,
) -> AppResult<Admin> {
    let account_ref = validate::reference("clerkId", account_ref)?;
    if let Some(echoed) = &req.account_ref {
        if echoed.trim() != account_ref {
            return Err(AppError::validation("accountRef cannot be changed"));
        }
    }
    let changes = req.into_changes()?;

    let admin = store
        .update_admin(&account_ref, changes)
        .await?
        .ok_or_else(|| AppError::not_found("Admin not found"))?;

    log::info!("updated club profile of {}", admin.account_ref);
    Ok(admin)
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: u8,
}

async fn status(
    Extension(store): Extension<SharedStore>,
    Path(account_ref): Path<String>,
) -> AppResult<Reply<StatusResponse>> {
    let status = get_approval_status(store.as_ref(), &account_ref).await?;

    Ok(reply_with(
        StatusCode::OK,
        StatusResponse {
            status: status.rank(),
        },
        status.message(),
    ))
}

async fn signup(
    Extension(store): Extension<SharedStore>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> AppResult<Reply<PendingAdminRequest>> {
    let stored = submit_approval_request(store.as_ref(), req).await?;
    Ok(reply(StatusCode::CREATED, stored))
}

async fn details(
    Extension(store): Extension<SharedStore>,
    Path(account_ref): Path<String>,
) -> AppResult<Reply<Admin>> {
    Ok(reply(
        StatusCode::OK,
        get_admin(store.as_ref(), &account_ref).await?,
    ))
}

async fn edit(
    Extension(store): Extension<SharedStore>,
    Path(account_ref): Path<String>,
    JsonBody(req): JsonBody<AdminUpdateRequest>,
) -> AppResult<Reply<Admin>> {
    Ok(reply(
        StatusCode::OK,
        update_admin(store.as_ref(), &account_ref, req).await?,
    ))
}

pub fn app() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/:account_ref", get(details).put(edit))
        .route("/:account_ref/status", get(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::fixtures, store::MemoryStore};

    fn signup_request(account_ref: &str) -> SignupRequest {
        SignupRequest {
            account_ref: Some(account_ref.to_string()),
            club_name: Some("Chess Club".to_string()),
            club_type: Some("cultural".to_string()),
            logo: Some("https://cdn.example.com/chess.png".to_string()),
            institute: Some("NIT".to_string()),
            email_id: Some("chess@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn status_ranks_follow_lookup_order() {
        let store = MemoryStore::new();

        let status = get_approval_status(&store, "nobody").await.unwrap();
        assert_eq!(status, ApprovalStatus::NotApplied);
        assert_eq!(status.rank(), 1);

        submit_approval_request(&store, signup_request("pending"))
            .await
            .unwrap();
        let status = get_approval_status(&store, "pending").await.unwrap();
        assert_eq!(status.rank(), 2);

        store.insert_admin(fixtures::admin("approved")).await;
        assert_eq!(
            get_approval_status(&store, "approved").await.unwrap().rank(),
            3
        );
    }

    #[tokio::test]
    async fn approved_wins_over_a_leftover_pending_request() {
        let store = MemoryStore::new();
        submit_approval_request(&store, signup_request("A1"))
            .await
            .unwrap();
        store.insert_admin(fixtures::admin("A1")).await;

        assert_eq!(
            get_approval_status(&store, "A1").await.unwrap(),
            ApprovalStatus::Approved
        );
    }

    #[tokio::test]
    async fn status_rejects_undefined_account() {
        let store = MemoryStore::new();
        let err = get_approval_status(&store, "undefined").await.unwrap_err();
        assert_eq!(err.kind(), "validation_error");
    }

    #[tokio::test]
    async fn signup_requires_every_field() {
        let store = MemoryStore::new();

        let mut req = signup_request("A1");
        req.institute = Some("  ".to_string());
        let err = submit_approval_request(&store, req).await.unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        let mut req = signup_request("A1");
        req.club_type = None;
        assert!(submit_approval_request(&store, req).await.is_err());

        assert_eq!(
            get_approval_status(&store, "A1").await.unwrap(),
            ApprovalStatus::NotApplied
        );
    }

    #[tokio::test]
    async fn signup_returns_the_stored_request() {
        let store = MemoryStore::new();
        let stored = submit_approval_request(&store, signup_request("A1"))
            .await
            .unwrap();

        assert_eq!(stored.account_ref, "A1");
        assert_eq!(stored.club_name, "Chess Club");
        assert_eq!(
            store.pending_request_by_account_ref("A1").await.unwrap(),
            Some(stored)
        );
    }

    #[tokio::test]
    async fn duplicate_signup_is_a_conflict() {
        let store = MemoryStore::new();
        submit_approval_request(&store, signup_request("A1"))
            .await
            .unwrap();

        let err = submit_approval_request(&store, signup_request("A1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "conflict");
    }

    #[tokio::test]
    async fn missing_admin_is_not_found() {
        let store = MemoryStore::new();
        let err = get_admin(&store, "ghost").await.unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn profile_update_merges_only_given_fields() {
        let store = MemoryStore::new();
        store.insert_admin(fixtures::admin("A1")).await;

        let updated = update_admin(
            &store,
            "A1",
            AdminUpdateRequest {
                bio: Some("We build robots".to_string()),
                social_media_links: Some(vec![
                    "https://x.com/robotics".to_string(),
                    "https://x.com/robotics".to_string(),
                ]),
                website: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.club_name, "Robotics Club");
        assert_eq!(updated.bio.as_deref(), Some("We build robots"));
        assert_eq!(updated.social_media_links, vec!["https://x.com/robotics"]);
        assert_eq!(updated.website.as_deref(), Some(""));
        assert_eq!(get_admin(&store, "A1").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn profile_update_rejects_blank_required_fields() {
        let store = MemoryStore::new();
        store.insert_admin(fixtures::admin("A1")).await;

        let err = update_admin(
            &store,
            "A1",
            AdminUpdateRequest {
                club_name: Some(" ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        let err = update_admin(&store, "ghost", AdminUpdateRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn fetched_profile_can_be_sent_back() {
        let store = MemoryStore::new();
        store.insert_admin(fixtures::admin("A1")).await;

        let mut profile = serde_json::to_value(get_admin(&store, "A1").await.unwrap()).unwrap();
        profile["bio"] = serde_json::json!("Bots and more");
        let req: AdminUpdateRequest = serde_json::from_value(profile).unwrap();

        let updated = update_admin(&store, "A1", req).await.unwrap();
        assert_eq!(updated.bio.as_deref(), Some("Bots and more"));
        assert_eq!(updated.club_name, "Robotics Club");
    }

    #[tokio::test]
    async fn profile_update_cannot_move_to_another_account() {
        let store = MemoryStore::new();
        store.insert_admin(fixtures::admin("A1")).await;

        let err = update_admin(
            &store,
            "A1",
            AdminUpdateRequest {
                account_ref: Some("B2".to_string()),
                bio: Some("hijack".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), "validation_error");
        assert_eq!(get_admin(&store, "A1").await.unwrap().bio, None);
    }
}
