//! Video catalogue model: the canonical entity and its denormalized views.
//!
//! The four row families (`Video`, `UserVideo`, `LatestVideo`, `VideoByTag`)
//! describe the *same* logical video laid out under different keys to serve
//! different read patterns. The views are projections — they are never
//! created independently; the fan-out writer derives them from the canonical
//! entity at creation time.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned when constructing video value types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoValidationError {
    /// Tag was empty after trimming whitespace.
    EmptyTag,
    /// Tag carried leading or trailing whitespace.
    TagContainsWhitespace,
    /// Day bucket was not exactly eight ASCII digits.
    InvalidDayBucket,
}

impl fmt::Display for VideoValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTag => write!(f, "tag must not be empty"),
            Self::TagContainsWhitespace => {
                write!(f, "tag must not contain surrounding whitespace")
            }
            Self::InvalidDayBucket => {
                write!(f, "day bucket must be eight ASCII digits (yyyyMMdd)")
            }
        }
    }
}

impl std::error::Error for VideoValidationError {}

/// Free-form label a video can be browsed by.
///
/// Each tag becomes the partition key of one `VideoByTag` row, so the same
/// trimming rules apply as for any other partition key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    /// Validate and construct a [`Tag`].
    ///
    /// # Examples
    /// ```
    /// use reelvault_backend::domain::Tag;
    ///
    /// let tag = Tag::new("nosql").expect("valid tag");
    /// assert_eq!(tag.as_str(), "nosql");
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, VideoValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(VideoValidationError::EmptyTag);
        }
        if raw.trim() != raw {
            return Err(VideoValidationError::TagContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Borrow the tag as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Tag> for String {
    fn from(value: Tag) -> Self {
        value.0
    }
}

impl TryFrom<String> for Tag {
    type Error = VideoValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// UTC calendar day rendered as `yyyyMMdd`, the partition key of the
/// latest-videos view.
///
/// Bucketing by textual day keeps "browse today's uploads" a single
/// partition read instead of a full scan.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayBucket(String);

impl DayBucket {
    /// Validate and construct a [`DayBucket`] from caller input.
    pub fn new(value: impl Into<String>) -> Result<Self, VideoValidationError> {
        let raw = value.into();
        if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VideoValidationError::InvalidDayBucket);
        }
        Ok(Self(raw))
    }

    /// Bucket a timestamp by its UTC calendar day.
    ///
    /// # Examples
    /// ```
    /// use chrono::TimeZone;
    /// use chrono::Utc;
    /// use reelvault_backend::domain::DayBucket;
    ///
    /// let instant = Utc.with_ymd_and_hms(2026, 8, 7, 23, 59, 59).single().expect("valid");
    /// assert_eq!(DayBucket::from_datetime(&instant).as_str(), "20260807");
    /// ```
    pub fn from_datetime(instant: &DateTime<Utc>) -> Self {
        Self(instant.format("%Y%m%d").to_string())
    }

    /// Borrow the bucket as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for DayBucket {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DayBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DayBucket> for String {
    fn from(value: DayBucket) -> Self {
        value.0
    }
}

impl TryFrom<String> for DayBucket {
    type Error = VideoValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Draft of a video, as supplied by a caller before creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDraft {
    /// Identifier, generated when absent.
    pub video_id: Option<Uuid>,
    /// Owning user, by reference.
    pub user_id: Uuid,
    /// Display title.
    pub name: String,
    /// URI-like location of the content.
    pub location: Option<String>,
    /// Opaque location type code carried through from the caller.
    pub location_type: Option<i32>,
    /// URI-like location of the preview image.
    pub preview_image_location: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Unordered, unique labels; may be empty.
    pub tags: BTreeSet<Tag>,
    /// Upload instant, server-assigned when absent.
    pub added_date: Option<DateTime<Utc>>,
}

impl VideoDraft {
    /// Build a draft with only the caller-supplied fields set.
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            video_id: None,
            user_id,
            name: name.into(),
            location: None,
            location_type: None,
            preview_image_location: None,
            description: None,
            tags: BTreeSet::new(),
            added_date: None,
        }
    }

    /// Fill server-assigned fields, producing the entity to persist.
    pub fn resolve(self, now: DateTime<Utc>) -> Video {
        Video {
            video_id: self.video_id.unwrap_or_else(Uuid::new_v4),
            user_id: self.user_id,
            name: self.name,
            location: self.location,
            location_type: self.location_type,
            preview_image_location: self.preview_image_location,
            description: self.description,
            tags: self.tags,
            added_date: self.added_date.unwrap_or(now),
        }
    }
}

/// Canonical catalogue entity, partitioned by `video_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// Partition key of the videos table.
    pub video_id: Uuid,
    /// Owning user, by reference.
    pub user_id: Uuid,
    /// Display title.
    pub name: String,
    /// URI-like location of the content.
    pub location: Option<String>,
    /// Opaque location type code.
    pub location_type: Option<i32>,
    /// URI-like location of the preview image.
    pub preview_image_location: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Unordered, unique labels; may be empty.
    pub tags: BTreeSet<Tag>,
    /// Upload instant.
    pub added_date: DateTime<Utc>,
}

impl Video {
    /// Project the per-owner view row.
    pub fn to_user_video(&self) -> UserVideo {
        UserVideo {
            user_id: self.user_id,
            added_date: self.added_date,
            video_id: self.video_id,
            name: Some(self.name.clone()),
            preview_image_location: self.preview_image_location.clone(),
        }
    }

    /// Project the per-day view row, bucketed by the upload's UTC day.
    pub fn to_latest_video(&self) -> LatestVideo {
        LatestVideo {
            day: DayBucket::from_datetime(&self.added_date),
            added_date: self.added_date,
            video_id: self.video_id,
            user_id: Some(self.user_id),
            name: Some(self.name.clone()),
            preview_image_location: self.preview_image_location.clone(),
        }
    }

    /// Project one per-tag view row.
    ///
    /// `tagged_date` equals `added_date` at creation; it is a distinct field
    /// so a future re-tagging operation can move it independently.
    pub fn to_video_by_tag(&self, tag: Tag) -> VideoByTag {
        VideoByTag {
            tag,
            video_id: self.video_id,
            added_date: Some(self.added_date),
            user_id: Some(self.user_id),
            name: Some(self.name.clone()),
            preview_image_location: self.preview_image_location.clone(),
            tagged_date: Some(self.added_date),
        }
    }
}

/// Per-owner view row, keyed by `(user_id, added_date, video_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVideo {
    /// Partition key: the owning user.
    pub user_id: Uuid,
    /// First clustering column.
    pub added_date: DateTime<Utc>,
    /// Second clustering column.
    pub video_id: Uuid,
    /// Read-projection of the canonical title.
    pub name: Option<String>,
    /// Read-projection of the preview image location.
    pub preview_image_location: Option<String>,
}

/// Per-day view row, keyed by `(day, added_date, video_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestVideo {
    /// Partition key: UTC calendar day of `added_date`.
    pub day: DayBucket,
    /// First clustering column.
    pub added_date: DateTime<Utc>,
    /// Second clustering column.
    pub video_id: Uuid,
    /// Read-projection of the owner.
    pub user_id: Option<Uuid>,
    /// Read-projection of the canonical title.
    pub name: Option<String>,
    /// Read-projection of the preview image location.
    pub preview_image_location: Option<String>,
}

/// Per-tag view row, keyed by `(tag, video_id)`. Fan-out cardinality is the
/// number of tags on the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoByTag {
    /// Partition key: the tag.
    pub tag: Tag,
    /// Clustering column.
    pub video_id: Uuid,
    /// Read-projection of the upload instant.
    pub added_date: Option<DateTime<Utc>>,
    /// Read-projection of the owner.
    pub user_id: Option<Uuid>,
    /// Read-projection of the canonical title.
    pub name: Option<String>,
    /// Read-projection of the preview image location.
    pub preview_image_location: Option<String>,
    /// When the tag was attached; equals `added_date` at creation.
    pub tagged_date: Option<DateTime<Utc>>,
}

/// Sparse update template for the canonical video row.
///
/// Carries the full primary key plus an arbitrary subset of fields; each
/// present field is applied as a SET on the addressed row, absent fields are
/// left untouched in storage. Applying a template does NOT repair the
/// denormalized views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUpdate {
    /// Full primary key of the row to update. Mandatory.
    pub video_id: Uuid,
    /// New owner reference, when present.
    pub user_id: Option<Uuid>,
    /// New title, when present.
    pub name: Option<String>,
    /// New content location, when present.
    pub location: Option<String>,
    /// New location type code, when present.
    pub location_type: Option<i32>,
    /// New preview image location, when present.
    pub preview_image_location: Option<String>,
    /// New description, when present.
    pub description: Option<String>,
    /// Replacement tag set, when present.
    pub tags: Option<BTreeSet<Tag>>,
    /// New upload instant, when present.
    pub added_date: Option<DateTime<Utc>>,
}

impl VideoUpdate {
    /// Template that changes nothing beyond addressing the row.
    pub fn for_video(video_id: Uuid) -> Self {
        Self {
            video_id,
            ..Self::default()
        }
    }

    /// True when no field beyond the primary key is present.
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.name.is_none()
            && self.location.is_none()
            && self.location_type.is_none()
            && self.preview_image_location.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.added_date.is_none()
    }
}
