//! Video catalogue coordinator: denormalized fan-out writes, sparse updates
//! and the partition-read surface.
//!
//! Creation writes the canonical row and every derived view in one logged
//! batch — all-or-nothing on completion, though not isolated from concurrent
//! readers. Updates touch the canonical row only; repairing the views after
//! an update is explicitly out of scope and tests assert the gap.

use std::sync::Arc;

use mockable::Clock;
use uuid::Uuid;

use crate::domain::store_error_mapping::map_store_error;
use crate::domain::tables::{PartitionKey, RowKey, TableRow, VideoRow};
use crate::domain::video::{
    DayBucket, LatestVideo, Tag, UserVideo, Video, VideoByTag, VideoDraft, VideoUpdate,
};
use crate::domain::Error;
use crate::domain::ports::{TableStore, WriteMode};

/// Video catalogue coordinator.
///
/// Stateless; safe to share across concurrent callers.
#[derive(Clone)]
pub struct VideoCatalogService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> VideoCatalogService<S> {
    /// Create a new coordinator over the given table store.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl<S> VideoCatalogService<S>
where
    S: TableStore,
{
    /// Create a video and propagate it into every denormalized view.
    ///
    /// Fills `video_id` and `added_date` when absent, then submits the
    /// canonical row, the per-owner row, the per-day row and one per-tag row
    /// per tag as a single logged batch. An empty tag set simply produces no
    /// tag rows. Returns the video as persisted, so callers never re-read to
    /// discover server-assigned fields.
    ///
    /// # Errors
    ///
    /// The mapped store failure when the batch is rejected; no partial
    /// fan-out survives a failed batch.
    pub async fn create(&self, draft: VideoDraft) -> Result<Video, Error> {
        let video = draft.resolve(self.clock.utc());
        let rows = fan_out_rows(&video);
        self.store
            .batch_write(&rows)
            .await
            .map_err(map_store_error)?;
        Ok(video)
    }

    /// Apply a sparse template onto the canonical row.
    ///
    /// Every present field becomes a SET on the addressed row; absent fields
    /// are left untouched in storage. The denormalized views are NOT
    /// repaired — a known consistency gap of this layer.
    ///
    /// # Errors
    ///
    /// [`crate::domain::ErrorCode::InvalidRequest`] when the template sets
    /// nothing beyond the primary key (rejected before any storage call),
    /// otherwise the mapped store failure.
    pub async fn update(&self, template: VideoUpdate) -> Result<(), Error> {
        if template.is_empty() {
            return Err(Error::invalid_request(
                "update template must set at least one field beyond the primary key",
            ));
        }
        self.store
            .write(
                &TableRow::Video(VideoRow::from(&template)),
                WriteMode::Upsert,
            )
            .await
            .map_err(map_store_error)?;
        Ok(())
    }

    /// Point read of the canonical row.
    ///
    /// # Errors
    ///
    /// Mapped store failures and corrupt rows.
    pub async fn get(&self, video_id: Uuid) -> Result<Option<Video>, Error> {
        let Some(row) = self
            .store
            .read(&RowKey::Video { video_id })
            .await
            .map_err(map_store_error)?
        else {
            return Ok(None);
        };
        let TableRow::Video(row) = row else {
            return Err(Error::internal(format!(
                "video read returned a {} row",
                row.table()
            )));
        };
        Video::try_from(row)
            .map(Some)
            .map_err(|err| Error::internal(err.to_string()))
    }

    /// All of one owner's videos, upload order ascending.
    ///
    /// # Errors
    ///
    /// Mapped store failures and rows from the wrong table.
    pub async fn get_by_user(&self, user_id: Uuid) -> Result<Vec<UserVideo>, Error> {
        let rows = self
            .store
            .read_partition(&PartitionKey::UserVideos { user_id })
            .await
            .map_err(map_store_error)?;
        rows.into_iter()
            .map(|row| match row {
                TableRow::UserVideo(view) => Ok(view),
                other => Err(Error::internal(format!(
                    "user_videos read returned a {} row",
                    other.table()
                ))),
            })
            .collect()
    }

    /// All videos uploaded on one UTC day, upload order ascending.
    ///
    /// # Errors
    ///
    /// Mapped store failures and rows from the wrong table.
    pub async fn get_latest(&self, day: DayBucket) -> Result<Vec<LatestVideo>, Error> {
        let rows = self
            .store
            .read_partition(&PartitionKey::LatestVideos { day })
            .await
            .map_err(map_store_error)?;
        rows.into_iter()
            .map(|row| match row {
                TableRow::LatestVideo(view) => Ok(view),
                other => Err(Error::internal(format!(
                    "latest_videos read returned a {} row",
                    other.table()
                ))),
            })
            .collect()
    }

    /// All videos carrying one tag, video id ascending.
    ///
    /// # Errors
    ///
    /// Mapped store failures and rows from the wrong table.
    pub async fn get_by_tag(&self, tag: Tag) -> Result<Vec<VideoByTag>, Error> {
        let rows = self
            .store
            .read_partition(&PartitionKey::VideosByTag { tag })
            .await
            .map_err(map_store_error)?;
        rows.into_iter()
            .map(|row| match row {
                TableRow::VideoByTag(view) => Ok(view),
                other => Err(Error::internal(format!(
                    "videos_by_tag read returned a {} row",
                    other.table()
                ))),
            })
            .collect()
    }
}

/// Canonical row plus one row per derived view, in batch order.
fn fan_out_rows(video: &Video) -> Vec<TableRow> {
    let mut rows = Vec::with_capacity(3 + video.tags.len());
    rows.push(TableRow::Video(VideoRow::from(video)));
    rows.push(TableRow::UserVideo(video.to_user_video()));
    rows.push(TableRow::LatestVideo(video.to_latest_video()));
    rows.extend(
        video
            .tags
            .iter()
            .map(|tag| TableRow::VideoByTag(video.to_video_by_tag(tag.clone()))),
    );
    rows
}
