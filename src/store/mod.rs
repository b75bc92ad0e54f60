use crate::models::{
    Admin, AdminChanges, Attendance, ClubMember, Event, MemberChanges, PendingAdminRequest, User,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

mod memory;
pub use memory::*;

mod pg;
pub use pg::*;

pub type Result<T> = std::result::Result<T, StoreError>;
pub type SharedStore = Arc<dyn Store>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database or pool failed
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
    /// A uniqueness constraint rejected the write
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    /// A stored row could not be turned back into a record
    #[error("corrupt {resource} row: {reason}")]
    Corrupt {
        resource: &'static str,
        reason: String,
    },
}

/// Everything the workflows need from persistence.
///
/// Lookups return `Ok(None)` or `Ok(false)` for a missing record; deciding
/// whether that is an error is left to the caller.
#[async_trait]
pub trait Store: Send + Sync {
    async fn admin_by_account_ref(&self, account_ref: &str) -> Result<Option<Admin>>;
    async fn update_admin(&self, account_ref: &str, changes: AdminChanges)
        -> Result<Option<Admin>>;

    async fn pending_request_by_account_ref(
        &self,
        account_ref: &str,
    ) -> Result<Option<PendingAdminRequest>>;
    async fn create_pending_request(
        &self,
        request: PendingAdminRequest,
    ) -> Result<PendingAdminRequest>;

    async fn create_event(&self, event: Event) -> Result<Event>;
    async fn event_by_id(&self, id: &str) -> Result<Option<Event>>;
    async fn events_by_owner(&self, owner: &str) -> Result<Vec<Event>>;
    /// Overwrites every column of the event with the same id.
    async fn replace_event(&self, event: Event) -> Result<Option<Event>>;
    async fn delete_event(&self, id: &str) -> Result<bool>;

    async fn user_by_account_ref(&self, account_ref: &str) -> Result<Option<User>>;
    async fn users_by_account_refs(&self, account_refs: &[String]) -> Result<Vec<User>>;

    async fn attendance_for(&self, event_id: &str, user_id: &str) -> Result<Option<Attendance>>;
    /// Fails with [`StoreError::Conflict`] if the (event, user) pair is already present.
    async fn create_attendance(&self, attendance: Attendance) -> Result<Attendance>;
    async fn attendance_by_event(&self, event_id: &str) -> Result<Vec<Attendance>>;

    async fn create_member(&self, member: ClubMember) -> Result<ClubMember>;
    async fn member_by_id(&self, id: &str) -> Result<Option<ClubMember>>;
    async fn update_member(&self, id: &str, changes: MemberChanges) -> Result<Option<ClubMember>>;
    async fn delete_member(&self, id: &str) -> Result<bool>;
    async fn members_by_owner(&self, owner: &str) -> Result<Vec<ClubMember>>;

    /// Releases pooled resources. Called once on shutdown.
    async fn close(&self) {}
}
