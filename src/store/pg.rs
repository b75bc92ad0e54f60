use super::{Result, Store, StoreError};
use crate::{
    models::{
        Admin, AdminChanges, Attendance, ClubMember, Event, EventMode, MemberChanges,
        OwnerSnapshot, ParticipantLimit, PendingAdminRequest, User,
    },
    schema::*,
    DbPool,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool::managed::Object;
use diesel::{
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
};
use diesel_async::{
    pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection, RunQueryDsl,
};

type Connection = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Helper trait to reduce boilerplate
trait IntoStoreError {
    fn any(self) -> StoreError;
    fn conflict_or_any(self, resource: &'static str, field: &'static str, value: &str)
        -> StoreError;
}

impl IntoStoreError for DieselError {
    fn any(self) -> StoreError {
        StoreError::Internal(self.into())
    }

    fn conflict_or_any(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> StoreError {
        match self {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                StoreError::Conflict {
                    resource,
                    field,
                    value: value.to_string(),
                }
            }
            e => e.any(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = events)]
#[diesel(treat_none_as_null = true)]
struct EventRow {
    id: String,
    title: String,
    subtitle: String,
    description: String,
    date: DateTime<Utc>,
    mode: EventMode,
    location: String,
    time: String,
    fees: f64,
    max_allowed_participants: i64,
    no_max_participants: bool,
    cover_img: String,
    detail_img: String,
    support_file: String,
    visibility: bool,
    is_available_to_reg: bool,
    tags: Vec<String>,
    categories: Vec<String>,
    like_counter: i64,
    registration_open_till: Option<DateTime<Utc>>,
    additional_info: String,
    registered_users: Vec<String>,
    owner: String,
    owner_name: String,
    owner_logo: String,
}

impl From<Event> for EventRow {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            title: e.title,
            subtitle: e.subtitle,
            description: e.description,
            date: e.date,
            mode: e.mode,
            location: e.location,
            time: e.time,
            fees: e.fees,
            max_allowed_participants: e.participants.max_allowed_participants(),
            no_max_participants: e.participants.no_max_participants(),
            cover_img: e.cover_img,
            detail_img: e.detail_img,
            support_file: e.support_file,
            visibility: e.visibility,
            is_available_to_reg: e.is_available_to_reg,
            tags: e.tags,
            categories: e.categories,
            like_counter: e.like_counter,
            registration_open_till: e.registration_open_till,
            additional_info: e.additional_info,
            registered_users: e.registered_users,
            owner: e.owner,
            owner_name: e.owner_snapshot.owner_name,
            owner_logo: e.owner_snapshot.owner_logo,
        }
    }
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self> {
        let participants =
            ParticipantLimit::from_columns(row.no_max_participants, row.max_allowed_participants)
                .ok_or_else(|| StoreError::Corrupt {
                    resource: "event",
                    reason: format!(
                        "{} has a negative participant limit without noMaxParticipants",
                        row.id
                    ),
                })?;

        Ok(Self {
            id: row.id,
            title: row.title,
            subtitle: row.subtitle,
            description: row.description,
            date: row.date,
            mode: row.mode,
            location: row.location,
            time: row.time,
            fees: row.fees,
            participants,
            cover_img: row.cover_img,
            detail_img: row.detail_img,
            support_file: row.support_file,
            visibility: row.visibility,
            is_available_to_reg: row.is_available_to_reg,
            tags: row.tags,
            categories: row.categories,
            like_counter: row.like_counter,
            registration_open_till: row.registration_open_till,
            additional_info: row.additional_info,
            registered_users: row.registered_users,
            owner: row.owner,
            owner_snapshot: OwnerSnapshot {
                owner_name: row.owner_name,
                owner_logo: row.owner_logo,
            },
        })
    }
}

fn events_from_rows(rows: Vec<EventRow>) -> Result<Vec<Event>> {
    rows.into_iter().map(Event::try_from).collect()
}

/// A postgres store backed by a deadpool of async diesel connections
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Internal(anyhow::anyhow!("failed to get connection: {e}")))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn admin_by_account_ref(&self, account_ref: &str) -> Result<Option<Admin>> {
        let conn = &mut self.conn().await?;

        admins::table
            .find(account_ref)
            .first::<Admin>(conn)
            .await
            .optional()
            .map_err(|e| e.any())
    }

    async fn update_admin(
        &self,
        account_ref: &str,
        changes: AdminChanges,
    ) -> Result<Option<Admin>> {
        if changes.is_empty() {
            return self.admin_by_account_ref(account_ref).await;
        }

        let conn = &mut self.conn().await?;

        diesel::update(admins::table.find(account_ref))
            .set(changes)
            .get_result::<Admin>(conn)
            .await
            .optional()
            .map_err(|e| e.any())
    }

    async fn pending_request_by_account_ref(
        &self,
        account_ref: &str,
    ) -> Result<Option<PendingAdminRequest>> {
        let conn = &mut self.conn().await?;

        pending_admin_requests::table
            .find(account_ref)
            .first::<PendingAdminRequest>(conn)
            .await
            .optional()
            .map_err(|e| e.any())
    }

    async fn create_pending_request(
        &self,
        request: PendingAdminRequest,
    ) -> Result<PendingAdminRequest> {
        let conn = &mut self.conn().await?;

        let created = diesel::insert_into(pending_admin_requests::table)
            .values(&request)
            .on_conflict(pending_admin_requests::account_ref)
            .do_nothing()
            .get_result::<PendingAdminRequest>(conn)
            .await
            .optional()
            .map_err(|e| e.any())?;

        created.ok_or(StoreError::Conflict {
            resource: "pending admin request",
            field: "accountRef",
            value: request.account_ref,
        })
    }

    async fn create_event(&self, event: Event) -> Result<Event> {
        let conn = &mut self.conn().await?;
        let id = event.id.clone();

        diesel::insert_into(events::table)
            .values(EventRow::from(event))
            .get_result::<EventRow>(conn)
            .await
            .map_err(|e| e.conflict_or_any("event", "id", &id))?
            .try_into()
    }

    async fn event_by_id(&self, id: &str) -> Result<Option<Event>> {
        let conn = &mut self.conn().await?;

        events::table
            .find(id)
            .first::<EventRow>(conn)
            .await
            .optional()
            .map_err(|e| e.any())?
            .map(Event::try_from)
            .transpose()
    }

    async fn events_by_owner(&self, owner: &str) -> Result<Vec<Event>> {
        let conn = &mut self.conn().await?;

        let rows = events::table
            .filter(events::owner.eq(owner))
            .load::<EventRow>(conn)
            .await
            .map_err(|e| e.any())?;

        events_from_rows(rows)
    }

    async fn replace_event(&self, event: Event) -> Result<Option<Event>> {
        let conn = &mut self.conn().await?;
        let row = EventRow::from(event);

        diesel::update(events::table.find(&row.id))
            .set(&row)
            .get_result::<EventRow>(conn)
            .await
            .optional()
            .map_err(|e| e.any())?
            .map(Event::try_from)
            .transpose()
    }

    async fn delete_event(&self, id: &str) -> Result<bool> {
        let conn = &mut self.conn().await?;

        let deleted = diesel::delete(events::table.find(id))
            .execute(conn)
            .await
            .map_err(|e| e.any())?;

        Ok(deleted > 0)
    }

    async fn user_by_account_ref(&self, account_ref: &str) -> Result<Option<User>> {
        let conn = &mut self.conn().await?;

        users::table
            .find(account_ref)
            .first::<User>(conn)
            .await
            .optional()
            .map_err(|e| e.any())
    }

    async fn users_by_account_refs(&self, account_refs: &[String]) -> Result<Vec<User>> {
        let conn = &mut self.conn().await?;

        users::table
            .filter(users::clerk_id.eq_any(account_refs))
            .load::<User>(conn)
            .await
            .map_err(|e| e.any())
    }

    async fn attendance_for(&self, event_id: &str, user_id: &str) -> Result<Option<Attendance>> {
        let conn = &mut self.conn().await?;

        attendances::table
            .find((event_id, user_id))
            .first::<Attendance>(conn)
            .await
            .optional()
            .map_err(|e| e.any())
    }

    async fn create_attendance(&self, attendance: Attendance) -> Result<Attendance> {
        let conn = &mut self.conn().await?;

        let created = diesel::insert_into(attendances::table)
            .values(&attendance)
            .on_conflict((attendances::event_id, attendances::user_id))
            .do_nothing()
            .get_result::<Attendance>(conn)
            .await
            .optional()
            .map_err(|e| e.any())?;

        created.ok_or_else(|| StoreError::Conflict {
            resource: "attendance",
            field: "(eventId, userId)",
            value: format!("({}, {})", attendance.event_id, attendance.user_id),
        })
    }

    async fn attendance_by_event(&self, event_id: &str) -> Result<Vec<Attendance>> {
        let conn = &mut self.conn().await?;

        attendances::table
            .filter(attendances::event_id.eq(event_id))
            .order(attendances::timestamp.asc())
            .load::<Attendance>(conn)
            .await
            .map_err(|e| e.any())
    }

    async fn create_member(&self, member: ClubMember) -> Result<ClubMember> {
        let conn = &mut self.conn().await?;
        let id = member.id.clone();

        diesel::insert_into(club_members::table)
            .values(member)
            .get_result::<ClubMember>(conn)
            .await
            .map_err(|e| e.conflict_or_any("club member", "id", &id))
    }

    async fn member_by_id(&self, id: &str) -> Result<Option<ClubMember>> {
        let conn = &mut self.conn().await?;

        club_members::table
            .find(id)
            .first::<ClubMember>(conn)
            .await
            .optional()
            .map_err(|e| e.any())
    }

    async fn update_member(&self, id: &str, changes: MemberChanges) -> Result<Option<ClubMember>> {
        if changes.is_empty() {
            return self.member_by_id(id).await;
        }

        let conn = &mut self.conn().await?;

        diesel::update(club_members::table.find(id))
            .set(changes)
            .get_result::<ClubMember>(conn)
            .await
            .optional()
            .map_err(|e| e.any())
    }

    async fn delete_member(&self, id: &str) -> Result<bool> {
        let conn = &mut self.conn().await?;

        let deleted = diesel::delete(club_members::table.find(id))
            .execute(conn)
            .await
            .map_err(|e| e.any())?;

        Ok(deleted > 0)
    }

    async fn members_by_owner(&self, owner: &str) -> Result<Vec<ClubMember>> {
        let conn = &mut self.conn().await?;

        club_members::table
            .filter(club_members::clerk_id.eq(owner))
            .load::<ClubMember>(conn)
            .await
            .map_err(|e| e.any())
    }

    async fn close(&self) {
        self.pool.close();
    }
}
