use crate::schema::*;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::{
    deserialize::{self, FromSql},
    pg::{Pg, PgValue},
    prelude::*,
    serialize::{self, IsNull, Output, ToSql},
    sql_types::Text,
    AsExpression, FromSqlRow,
};
use serde::{Deserialize, Serialize, Serializer};
use std::{io::Write, str::FromStr};

/// An approved club. Rows are created by the approval process, outside this service.
#[derive(Debug, Clone, PartialEq, Serialize, Queryable)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub account_ref: String,
    pub club_name: String,
    #[serde(rename = "type")]
    pub club_type: String,
    pub logo: String,
    pub institute: String,
    pub email_id: String,
    pub bio: Option<String>,
    pub cover_image: Option<String>,
    pub membership_form: Option<String>,
    pub social_media_links: Vec<String>,
    pub faculty_advisor: Option<String>,
    pub website: Option<String>,
    pub about_us: Option<String>,
}

impl Admin {
    /// Profile with only the fields a signup carries, as the approval process creates it.
    pub fn from_request(req: PendingAdminRequest) -> Self {
        Self {
            account_ref: req.account_ref,
            club_name: req.club_name,
            club_type: req.club_type,
            logo: req.logo,
            institute: req.institute,
            email_id: req.email_id,
            bio: None,
            cover_image: None,
            membership_form: None,
            social_media_links: Vec::new(),
            faculty_advisor: None,
            website: None,
            about_us: None,
        }
    }

    pub fn apply(&mut self, changes: AdminChanges) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(v) = changes.$field { self.$field = v; })*
            };
        }
        macro_rules! merge_opt {
            ($($field:ident),*) => {
                $(if let Some(v) = changes.$field { self.$field = Some(v); })*
            };
        }

        merge!(
            club_name,
            club_type,
            logo,
            institute,
            email_id,
            social_media_links
        );
        merge_opt!(
            bio,
            cover_image,
            membership_form,
            faculty_advisor,
            website,
            about_us
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = admins)]
pub struct AdminChanges {
    pub club_name: Option<String>,
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

impl AdminChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Insertable)]
#[diesel(table_name = pending_admin_requests)]
#[serde(rename_all = "camelCase")]
pub struct PendingAdminRequest {
    pub account_ref: String,
    pub club_name: String,
    #[serde(rename = "type")]
    pub club_type: String,
    pub logo: String,
    pub institute: String,
    pub email_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum EventMode {
    Online,
    Offline,
}

impl EventMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventMode::Online => "online",
            EventMode::Offline => "offline",
        }
    }
}

/// How many people may register for an event.
///
/// Serializes as the `maxAllowedParticipants` / `noMaxParticipants` pair,
/// where an unlimited event carries `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantLimit {
    Unlimited,
    Limited(u32),
}

impl ParticipantLimit {
    pub const UNLIMITED_SENTINEL: i64 = -1;

    pub fn from_columns(no_max_participants: bool, max_allowed_participants: i64) -> Option<Self> {
        if no_max_participants {
            return Some(ParticipantLimit::Unlimited);
        }
        u32::try_from(max_allowed_participants)
            .ok()
            .map(ParticipantLimit::Limited)
    }

    pub fn max_allowed_participants(&self) -> i64 {
        match self {
            ParticipantLimit::Unlimited => Self::UNLIMITED_SENTINEL,
            ParticipantLimit::Limited(n) => i64::from(*n),
        }
    }

    pub fn no_max_participants(&self) -> bool {
        matches!(self, ParticipantLimit::Unlimited)
    }
}

impl Serialize for ParticipantLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Columns {
            max_allowed_participants: i64,
            no_max_participants: bool,
        }

        Columns {
            max_allowed_participants: self.max_allowed_participants(),
            no_max_participants: self.no_max_participants(),
        }
        .serialize(serializer)
    }
}

/// The owning club's name and logo as they were when the event was created.
/// Later profile edits do not reach events that already exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSnapshot {
    pub owner_name: String,
    pub owner_logo: String,
}

impl From<&Admin> for OwnerSnapshot {
    fn from(admin: &Admin) -> Self {
        Self {
            owner_name: admin.club_name.clone(),
            owner_logo: admin.logo.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub mode: EventMode,
    pub location: String,
    pub time: String,
    pub fees: f64,
    #[serde(flatten)]
    pub participants: ParticipantLimit,
    pub cover_img: String,
    pub detail_img: String,
    pub support_file: String,
    pub visibility: bool,
    pub is_available_to_reg: bool,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub like_counter: i64,
    pub registration_open_till: Option<DateTime<Utc>>,
    pub additional_info: String,
    pub registered_users: Vec<String>,
    pub owner: String,
    #[serde(flatten)]
    pub owner_snapshot: OwnerSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Board,
    Executive,
}

impl MemberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberType::Board => "board",
            MemberType::Executive => "executive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Insertable)]
#[diesel(table_name = club_members)]
#[serde(rename_all = "camelCase")]
pub struct ClubMember {
    #[serde(rename = "_id")]
    pub id: String,
    pub clerk_id: String,
    #[serde(rename = "type")]
    pub member_type: MemberType,
    pub name: String,
    pub position: Option<String>,
    pub profile_photo: String,
}

#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = club_members)]
pub struct MemberChanges {
    pub member_type: Option<MemberType>,
    pub name: Option<String>,
    pub position: Option<String>,
    pub profile_photo: Option<String>,
}

impl MemberChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl ClubMember {
    pub fn apply(&mut self, changes: MemberChanges) {
        if let Some(member_type) = changes.member_type {
            self.member_type = member_type;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(position) = changes.position {
            self.position = Some(position);
        }
        if let Some(profile_photo) = changes.profile_photo {
            self.profile_photo = profile_photo;
        }
    }
}

/// A single check-in. `timestamp` is wall-clock time at UTC+05:30.
#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Insertable)]
#[diesel(table_name = attendances)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub timestamp: NaiveDateTime,
    pub event_id: String,
    pub user_id: String,
    #[serde(rename = "conf_number")]
    pub conf_number: String,
}

/// Attendee profile, owned by the user-facing app and only read here.
#[derive(Debug, Clone, PartialEq, Serialize, Queryable)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub clerk_id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub mobile_no: String,
    pub institute: String,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown variant `{0}`")]
pub struct UnknownVariant(String);

impl FromStr for EventMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(EventMode::Online),
            "offline" => Ok(EventMode::Offline),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl FromStr for MemberType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "board" => Ok(MemberType::Board),
            "executive" => Ok(MemberType::Executive),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

macro_rules! text_enum_sql {
    ($ty:ty) => {
        impl ToSql<Text, Pg> for $ty {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(IsNull::No)
            }
        }

        impl FromSql<Text, Pg> for $ty {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                let s = std::str::from_utf8(bytes.as_bytes())?;
                Ok(s.parse()?)
            }
        }
    };
}

text_enum_sql!(EventMode);
text_enum_sql!(MemberType);
