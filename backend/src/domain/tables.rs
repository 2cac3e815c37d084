//! Storage row vocabulary shared by the coordinators and the table store.
//!
//! Rows are sparse: every non-key column is optional, and an absent column
//! is never written ("do not set" semantics). A full entity converts into a
//! row with every column present; an update template converts into a row
//! carrying only the columns it sets. Reading an entity back out of a row
//! fails when a required column is missing — that is a corrupt row, not a
//! normal outcome.
//!
//! The three view rows reuse the projection types from [`crate::domain::video`]
//! directly; their non-key columns are already optional.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credentials::{PasswordHash, UserCredentials};
use super::user::{Email, User};
use super::video::{DayBucket, LatestVideo, Tag, UserVideo, Video, VideoByTag, VideoUpdate};

/// A required column was absent when converting a row back into an entity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{table} row is missing required column {column}")]
pub struct MissingColumn {
    /// Table the corrupt row came from.
    pub table: &'static str,
    /// Column that was expected to be present.
    pub column: &'static str,
}

impl MissingColumn {
    const fn new(table: &'static str, column: &'static str) -> Self {
        Self { table, column }
    }
}

/// Sparse row of the `users` table, partitioned by `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    /// Partition key.
    pub user_id: Uuid,
    /// Given name column.
    pub first_name: Option<String>,
    /// Family name column.
    pub last_name: Option<String>,
    /// Email column; informational here, the uniqueness invariant lives in
    /// `user_credentials`.
    pub email: Option<Email>,
    /// Creation instant column.
    pub created_at: Option<DateTime<Utc>>,
}

/// Sparse row of the `user_credentials` table, partitioned by `email`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRow {
    /// Partition key.
    pub email: Email,
    /// Stored password hash column.
    pub password_hash: Option<PasswordHash>,
    /// Back-reference to the owning user row.
    pub user_id: Option<Uuid>,
}

/// Sparse row of the `videos` table, partitioned by `video_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRow {
    /// Partition key.
    pub video_id: Uuid,
    /// Owner column.
    pub user_id: Option<Uuid>,
    /// Title column.
    pub name: Option<String>,
    /// Content location column.
    pub location: Option<String>,
    /// Location type code column.
    pub location_type: Option<i32>,
    /// Preview image location column.
    pub preview_image_location: Option<String>,
    /// Description column.
    pub description: Option<String>,
    /// Tag set column.
    pub tags: Option<BTreeSet<Tag>>,
    /// Upload instant column.
    pub added_date: Option<DateTime<Utc>>,
}

/// One row of any of the six tables, as handed to the table store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TableRow {
    /// `users` row.
    User(UserRow),
    /// `user_credentials` row.
    Credentials(CredentialsRow),
    /// `videos` row.
    Video(VideoRow),
    /// `user_videos` view row.
    UserVideo(UserVideo),
    /// `latest_videos` view row.
    LatestVideo(LatestVideo),
    /// `videos_by_tag` view row.
    VideoByTag(VideoByTag),
}

impl TableRow {
    /// Table this row belongs to, for diagnostics and adapter dispatch.
    pub fn table(&self) -> &'static str {
        match self {
            Self::User(_) => "users",
            Self::Credentials(_) => "user_credentials",
            Self::Video(_) => "videos",
            Self::UserVideo(_) => "user_videos",
            Self::LatestVideo(_) => "latest_videos",
            Self::VideoByTag(_) => "videos_by_tag",
        }
    }

    /// Full primary key of this row.
    pub fn key(&self) -> RowKey {
        match self {
            Self::User(row) => RowKey::User {
                user_id: row.user_id,
            },
            Self::Credentials(row) => RowKey::Credentials {
                email: row.email.clone(),
            },
            Self::Video(row) => RowKey::Video {
                video_id: row.video_id,
            },
            Self::UserVideo(row) => RowKey::UserVideo {
                user_id: row.user_id,
                added_date: row.added_date,
                video_id: row.video_id,
            },
            Self::LatestVideo(row) => RowKey::LatestVideo {
                day: row.day.clone(),
                added_date: row.added_date,
                video_id: row.video_id,
            },
            Self::VideoByTag(row) => RowKey::VideoByTag {
                tag: row.tag.clone(),
                video_id: row.video_id,
            },
        }
    }

    /// User this row belongs to or references, when the column is present.
    ///
    /// Guarded deletes compare against this value so a compensating delete
    /// can only ever remove its own insert.
    pub fn user_reference(&self) -> Option<Uuid> {
        match self {
            Self::User(row) => Some(row.user_id),
            Self::Credentials(row) => row.user_id,
            Self::Video(row) => row.user_id,
            Self::UserVideo(row) => Some(row.user_id),
            Self::LatestVideo(row) => row.user_id,
            Self::VideoByTag(row) => row.user_id,
        }
    }
}

/// Full primary key of one row in one of the six tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowKey {
    /// `users` primary key.
    User {
        /// Partition key.
        user_id: Uuid,
    },
    /// `user_credentials` primary key.
    Credentials {
        /// Partition key.
        email: Email,
    },
    /// `videos` primary key.
    Video {
        /// Partition key.
        video_id: Uuid,
    },
    /// `user_videos` primary key.
    UserVideo {
        /// Partition key.
        user_id: Uuid,
        /// First clustering column.
        added_date: DateTime<Utc>,
        /// Second clustering column.
        video_id: Uuid,
    },
    /// `latest_videos` primary key.
    LatestVideo {
        /// Partition key.
        day: DayBucket,
        /// First clustering column.
        added_date: DateTime<Utc>,
        /// Second clustering column.
        video_id: Uuid,
    },
    /// `videos_by_tag` primary key.
    VideoByTag {
        /// Partition key.
        tag: Tag,
        /// Clustering column.
        video_id: Uuid,
    },
}

impl RowKey {
    /// Table this key addresses.
    pub fn table(&self) -> &'static str {
        match self {
            Self::User { .. } => "users",
            Self::Credentials { .. } => "user_credentials",
            Self::Video { .. } => "videos",
            Self::UserVideo { .. } => "user_videos",
            Self::LatestVideo { .. } => "latest_videos",
            Self::VideoByTag { .. } => "videos_by_tag",
        }
    }
}

/// Partition prefix for the multi-row view tables.
///
/// A partition read returns every row under the prefix, ordered by the
/// clustering columns ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PartitionKey {
    /// All `user_videos` rows of one owner.
    UserVideos {
        /// Partition key.
        user_id: Uuid,
    },
    /// All `latest_videos` rows of one UTC day.
    LatestVideos {
        /// Partition key.
        day: DayBucket,
    },
    /// All `videos_by_tag` rows of one tag.
    VideosByTag {
        /// Partition key.
        tag: Tag,
    },
}

impl PartitionKey {
    /// Table this partition belongs to.
    pub fn table(&self) -> &'static str {
        match self {
            Self::UserVideos { .. } => "user_videos",
            Self::LatestVideos { .. } => "latest_videos",
            Self::VideosByTag { .. } => "videos_by_tag",
        }
    }
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            first_name: Some(user.first_name.clone()),
            last_name: Some(user.last_name.clone()),
            email: Some(user.email.clone()),
            created_at: Some(user.created_at),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = MissingColumn;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.user_id,
            first_name: row
                .first_name
                .ok_or(MissingColumn::new("users", "first_name"))?,
            last_name: row
                .last_name
                .ok_or(MissingColumn::new("users", "last_name"))?,
            email: row.email.ok_or(MissingColumn::new("users", "email"))?,
            created_at: row
                .created_at
                .ok_or(MissingColumn::new("users", "created_at"))?,
        })
    }
}

impl From<&UserCredentials> for CredentialsRow {
    fn from(credentials: &UserCredentials) -> Self {
        Self {
            email: credentials.email.clone(),
            password_hash: Some(credentials.password_hash.clone()),
            user_id: Some(credentials.user_id),
        }
    }
}

impl TryFrom<CredentialsRow> for UserCredentials {
    type Error = MissingColumn;

    fn try_from(row: CredentialsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            email: row.email,
            password_hash: row
                .password_hash
                .ok_or(MissingColumn::new("user_credentials", "password_hash"))?,
            user_id: row
                .user_id
                .ok_or(MissingColumn::new("user_credentials", "user_id"))?,
        })
    }
}

impl From<&Video> for VideoRow {
    fn from(video: &Video) -> Self {
        Self {
            video_id: video.video_id,
            user_id: Some(video.user_id),
            name: Some(video.name.clone()),
            location: video.location.clone(),
            location_type: video.location_type,
            preview_image_location: video.preview_image_location.clone(),
            description: video.description.clone(),
            tags: Some(video.tags.clone()),
            added_date: Some(video.added_date),
        }
    }
}

impl TryFrom<VideoRow> for Video {
    type Error = MissingColumn;

    fn try_from(row: VideoRow) -> Result<Self, Self::Error> {
        Ok(Self {
            video_id: row.video_id,
            user_id: row.user_id.ok_or(MissingColumn::new("videos", "user_id"))?,
            name: row.name.ok_or(MissingColumn::new("videos", "name"))?,
            location: row.location,
            location_type: row.location_type,
            preview_image_location: row.preview_image_location,
            description: row.description,
            tags: row.tags.unwrap_or_default(),
            added_date: row
                .added_date
                .ok_or(MissingColumn::new("videos", "added_date"))?,
        })
    }
}

impl From<&VideoUpdate> for VideoRow {
    fn from(template: &VideoUpdate) -> Self {
        Self {
            video_id: template.video_id,
            user_id: template.user_id,
            name: template.name.clone(),
            location: template.location.clone(),
            location_type: template.location_type,
            preview_image_location: template.preview_image_location.clone(),
            description: template.description.clone(),
            tags: template.tags.clone(),
            added_date: template.added_date,
        }
    }
}
