use super::{Result, Store, StoreError};
use crate::models::{
    Admin, AdminChanges, Attendance, ClubMember, Event, MemberChanges, PendingAdminRequest, User,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    admins: HashMap<String, Admin>,
    pending: HashMap<String, PendingAdminRequest>,
    // insertion order is kept so listings are stable
    events: Vec<Event>,
    members: Vec<ClubMember>,
    attendances: Vec<Attendance>,
    users: HashMap<String, User>,
}

/// A store that keeps everything in process memory.
///
/// Used by the test suite and by the `memory` backend for local runs.
/// Admins and users are seeded directly since no workflow creates them.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_admin(&self, admin: Admin) {
        let mut tables = self.tables.lock().await;
        tables.admins.insert(admin.account_ref.clone(), admin);
    }

    pub async fn insert_user(&self, user: User) {
        let mut tables = self.tables.lock().await;
        tables.users.insert(user.clerk_id.clone(), user);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn admin_by_account_ref(&self, account_ref: &str) -> Result<Option<Admin>> {
        Ok(self.tables.lock().await.admins.get(account_ref).cloned())
    }

    async fn update_admin(
        &self,
        account_ref: &str,
        changes: AdminChanges,
    ) -> Result<Option<Admin>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.admins.get_mut(account_ref).map(|admin| {
            admin.apply(changes);
            admin.clone()
        }))
    }

    async fn pending_request_by_account_ref(
        &self,
        account_ref: &str,
    ) -> Result<Option<PendingAdminRequest>> {
        Ok(self.tables.lock().await.pending.get(account_ref).cloned())
    }

    async fn create_pending_request(
        &self,
        request: PendingAdminRequest,
    ) -> Result<PendingAdminRequest> {
        let mut tables = self.tables.lock().await;
        if tables.pending.contains_key(&request.account_ref) {
            return Err(StoreError::Conflict {
                resource: "pending admin request",
                field: "accountRef",
                value: request.account_ref,
            });
        }
        tables
            .pending
            .insert(request.account_ref.clone(), request.clone());
        Ok(request)
    }

    async fn create_event(&self, event: Event) -> Result<Event> {
        let mut tables = self.tables.lock().await;
        if tables.events.iter().any(|e| e.id == event.id) {
            return Err(StoreError::Conflict {
                resource: "event",
                field: "id",
                value: event.id,
            });
        }
        tables.events.push(event.clone());
        Ok(event)
    }

    async fn event_by_id(&self, id: &str) -> Result<Option<Event>> {
        let tables = self.tables.lock().await;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    async fn events_by_owner(&self, owner: &str) -> Result<Vec<Event>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .events
            .iter()
            .filter(|e| e.owner == owner)
            .cloned()
            .collect())
    }

    async fn replace_event(&self, event: Event) -> Result<Option<Event>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .map(|stored| {
                *stored = event;
                stored.clone()
            }))
    }

    async fn delete_event(&self, id: &str) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.events.len();
        tables.events.retain(|e| e.id != id);
        Ok(tables.events.len() != before)
    }

    async fn user_by_account_ref(&self, account_ref: &str) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(account_ref).cloned())
    }

    async fn users_by_account_refs(&self, account_refs: &[String]) -> Result<Vec<User>> {
        let tables = self.tables.lock().await;
        Ok(account_refs
            .iter()
            .filter_map(|r| tables.users.get(r).cloned())
            .collect())
    }

    async fn attendance_for(&self, event_id: &str, user_id: &str) -> Result<Option<Attendance>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .attendances
            .iter()
            .find(|a| a.event_id == event_id && a.user_id == user_id)
            .cloned())
    }

    async fn create_attendance(&self, attendance: Attendance) -> Result<Attendance> {
        let mut tables = self.tables.lock().await;
        let exists = tables
            .attendances
            .iter()
            .any(|a| a.event_id == attendance.event_id && a.user_id == attendance.user_id);
        if exists {
            return Err(StoreError::Conflict {
                resource: "attendance",
                field: "(eventId, userId)",
                value: format!("({}, {})", attendance.event_id, attendance.user_id),
            });
        }
        tables.attendances.push(attendance.clone());
        Ok(attendance)
    }

    async fn attendance_by_event(&self, event_id: &str) -> Result<Vec<Attendance>> {
        let tables = self.tables.lock().await;
        let mut found: Vec<_> = tables
            .attendances
            .iter()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect();
        // same order as the postgres store; ties keep insertion order
        found.sort_by_key(|a| a.timestamp);
        Ok(found)
    }

    async fn create_member(&self, member: ClubMember) -> Result<ClubMember> {
        let mut tables = self.tables.lock().await;
        tables.members.push(member.clone());
        Ok(member)
    }

    async fn member_by_id(&self, id: &str) -> Result<Option<ClubMember>> {
        let tables = self.tables.lock().await;
        Ok(tables.members.iter().find(|m| m.id == id).cloned())
    }

    async fn update_member(&self, id: &str, changes: MemberChanges) -> Result<Option<ClubMember>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.members.iter_mut().find(|m| m.id == id).map(|member| {
            member.apply(changes);
            member.clone()
        }))
    }

    async fn delete_member(&self, id: &str) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.members.len();
        tables.members.retain(|m| m.id != id);
        Ok(tables.members.len() != before)
    }

    async fn members_by_owner(&self, owner: &str) -> Result<Vec<ClubMember>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .members
            .iter()
            .filter(|m| m.clerk_id == owner)
            .cloned()
            .collect())
    }
}
