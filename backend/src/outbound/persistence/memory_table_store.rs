//! In-memory implementation of the table store port.
//!
//! One ordered map per table, all behind a single mutex. Holding the lock
//! across every operation makes conditional writes and guarded deletes
//! linearizable and a batch atomic, which is exactly the contract the
//! coordinators rely on. Iteration order of the maps doubles as clustering
//! order, so partition reads come back clustering-key ascending for free.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{DeleteGuard, TableStore, TableStoreError, WriteMode};
use crate::domain::tables::{
    CredentialsRow, PartitionKey, RowKey, TableRow, UserRow, VideoRow,
};
use crate::domain::user::Email;
use crate::domain::video::{DayBucket, LatestVideo, Tag, UserVideo, VideoByTag};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<Uuid, UserRow>,
    credentials: BTreeMap<Email, CredentialsRow>,
    videos: BTreeMap<Uuid, VideoRow>,
    user_videos: BTreeMap<(Uuid, DateTime<Utc>, Uuid), UserVideo>,
    latest_videos: BTreeMap<(DayBucket, DateTime<Utc>, Uuid), LatestVideo>,
    videos_by_tag: BTreeMap<(Tag, Uuid), VideoByTag>,
}

/// In-memory table store.
///
/// # Examples
/// ```
/// use reelvault_backend::outbound::persistence::InMemoryTableStore;
///
/// let _store = InMemoryTableStore::new();
/// ```
#[derive(Debug, Default)]
pub struct InMemoryTableStore {
    tables: Mutex<Tables>,
}

impl InMemoryTableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, TableStoreError> {
        // A poisoned lock means a writer panicked mid-operation; refuse to
        // serve possibly half-applied state.
        self.tables.lock().map_err(|_| {
            warn!("table store mutex poisoned, refusing further operations");
            TableStoreError::unavailable("table store mutex poisoned")
        })
    }
}

/// Apply one write to one table, honouring the conditional mode.
fn write_entry<K: Ord, V: Clone>(
    map: &mut BTreeMap<K, V>,
    key: K,
    row: &V,
    mode: WriteMode,
    merge: impl Fn(&mut V, &V),
) -> bool {
    match mode {
        WriteMode::IfNotExists => match map.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(row.clone());
                true
            }
            Entry::Occupied(_) => false,
        },
        WriteMode::Upsert => {
            match map.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(row.clone());
                }
                Entry::Occupied(mut slot) => merge(slot.get_mut(), row),
            }
            true
        }
    }
}

/// Apply one delete to one table, honouring the guard.
fn delete_entry<K: Ord, V>(
    map: &mut BTreeMap<K, V>,
    key: &K,
    guard: DeleteGuard,
    owner: impl Fn(&V) -> Option<Uuid>,
) -> bool {
    match guard {
        DeleteGuard::None => {
            // Unconditional deletes report applied regardless of prior
            // existence, matching the backend's tombstone behaviour.
            map.remove(key);
            true
        }
        DeleteGuard::IfExists => map.remove(key).is_some(),
        DeleteGuard::IfOwnedBy(user_id) => {
            let owned = map.get(key).and_then(&owner) == Some(user_id);
            if owned {
                map.remove(key);
            }
            owned
        }
    }
}

fn merge_user(existing: &mut UserRow, incoming: &UserRow) {
    merge_column(&mut existing.first_name, &incoming.first_name);
    merge_column(&mut existing.last_name, &incoming.last_name);
    merge_column(&mut existing.email, &incoming.email);
    merge_column(&mut existing.created_at, &incoming.created_at);
}

fn merge_credentials(existing: &mut CredentialsRow, incoming: &CredentialsRow) {
    merge_column(&mut existing.password_hash, &incoming.password_hash);
    merge_column(&mut existing.user_id, &incoming.user_id);
}

fn merge_video(existing: &mut VideoRow, incoming: &VideoRow) {
    merge_column(&mut existing.user_id, &incoming.user_id);
    merge_column(&mut existing.name, &incoming.name);
    merge_column(&mut existing.location, &incoming.location);
    merge_column(&mut existing.location_type, &incoming.location_type);
    merge_column(
        &mut existing.preview_image_location,
        &incoming.preview_image_location,
    );
    merge_column(&mut existing.description, &incoming.description);
    merge_column(&mut existing.tags, &incoming.tags);
    merge_column(&mut existing.added_date, &incoming.added_date);
}

fn merge_user_video(existing: &mut UserVideo, incoming: &UserVideo) {
    merge_column(&mut existing.name, &incoming.name);
    merge_column(
        &mut existing.preview_image_location,
        &incoming.preview_image_location,
    );
}

fn merge_latest_video(existing: &mut LatestVideo, incoming: &LatestVideo) {
    merge_column(&mut existing.user_id, &incoming.user_id);
    merge_column(&mut existing.name, &incoming.name);
    merge_column(
        &mut existing.preview_image_location,
        &incoming.preview_image_location,
    );
}

fn merge_video_by_tag(existing: &mut VideoByTag, incoming: &VideoByTag) {
    merge_column(&mut existing.added_date, &incoming.added_date);
    merge_column(&mut existing.user_id, &incoming.user_id);
    merge_column(&mut existing.name, &incoming.name);
    merge_column(
        &mut existing.preview_image_location,
        &incoming.preview_image_location,
    );
    merge_column(&mut existing.tagged_date, &incoming.tagged_date);
}

/// Absent columns are never written; present ones overwrite.
fn merge_column<T: Clone>(existing: &mut Option<T>, incoming: &Option<T>) {
    if let Some(value) = incoming {
        *existing = Some(value.clone());
    }
}

fn apply_write(tables: &mut Tables, row: &TableRow, mode: WriteMode) -> bool {
    match row {
        TableRow::User(user) => {
            write_entry(&mut tables.users, user.user_id, user, mode, merge_user)
        }
        TableRow::Credentials(credentials) => write_entry(
            &mut tables.credentials,
            credentials.email.clone(),
            credentials,
            mode,
            merge_credentials,
        ),
        TableRow::Video(video) => write_entry(
            &mut tables.videos,
            video.video_id,
            video,
            mode,
            merge_video,
        ),
        TableRow::UserVideo(view) => write_entry(
            &mut tables.user_videos,
            (view.user_id, view.added_date, view.video_id),
            view,
            mode,
            merge_user_video,
        ),
        TableRow::LatestVideo(view) => write_entry(
            &mut tables.latest_videos,
            (view.day.clone(), view.added_date, view.video_id),
            view,
            mode,
            merge_latest_video,
        ),
        TableRow::VideoByTag(view) => write_entry(
            &mut tables.videos_by_tag,
            (view.tag.clone(), view.video_id),
            view,
            mode,
            merge_video_by_tag,
        ),
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn write(&self, row: &TableRow, mode: WriteMode) -> Result<bool, TableStoreError> {
        let mut tables = self.lock()?;
        Ok(apply_write(&mut tables, row, mode))
    }

    async fn delete(&self, key: &RowKey, guard: DeleteGuard) -> Result<bool, TableStoreError> {
        let mut tables = self.lock()?;
        let applied = match key {
            RowKey::User { user_id } => {
                delete_entry(&mut tables.users, user_id, guard, |row| Some(row.user_id))
            }
            RowKey::Credentials { email } => {
                delete_entry(&mut tables.credentials, email, guard, |row| row.user_id)
            }
            RowKey::Video { video_id } => {
                delete_entry(&mut tables.videos, video_id, guard, |row| row.user_id)
            }
            RowKey::UserVideo {
                user_id,
                added_date,
                video_id,
            } => delete_entry(
                &mut tables.user_videos,
                &(*user_id, *added_date, *video_id),
                guard,
                |row| Some(row.user_id),
            ),
            RowKey::LatestVideo {
                day,
                added_date,
                video_id,
            } => delete_entry(
                &mut tables.latest_videos,
                &(day.clone(), *added_date, *video_id),
                guard,
                |row| row.user_id,
            ),
            RowKey::VideoByTag { tag, video_id } => delete_entry(
                &mut tables.videos_by_tag,
                &(tag.clone(), *video_id),
                guard,
                |row| row.user_id,
            ),
        };
        Ok(applied)
    }

    async fn batch_write(&self, rows: &[TableRow]) -> Result<(), TableStoreError> {
        // One lock acquisition for the whole batch: all rows land or, had
        // any write been able to fail, none would — the logged-batch
        // contract.
        let mut tables = self.lock()?;
        for row in rows {
            let _applied = apply_write(&mut tables, row, WriteMode::Upsert);
        }
        Ok(())
    }

    async fn read(&self, key: &RowKey) -> Result<Option<TableRow>, TableStoreError> {
        let tables = self.lock()?;
        let row = match key {
            RowKey::User { user_id } => tables.users.get(user_id).cloned().map(TableRow::User),
            RowKey::Credentials { email } => tables
                .credentials
                .get(email)
                .cloned()
                .map(TableRow::Credentials),
            RowKey::Video { video_id } => {
                tables.videos.get(video_id).cloned().map(TableRow::Video)
            }
            RowKey::UserVideo {
                user_id,
                added_date,
                video_id,
            } => tables
                .user_videos
                .get(&(*user_id, *added_date, *video_id))
                .cloned()
                .map(TableRow::UserVideo),
            RowKey::LatestVideo {
                day,
                added_date,
                video_id,
            } => tables
                .latest_videos
                .get(&(day.clone(), *added_date, *video_id))
                .cloned()
                .map(TableRow::LatestVideo),
            RowKey::VideoByTag { tag, video_id } => tables
                .videos_by_tag
                .get(&(tag.clone(), *video_id))
                .cloned()
                .map(TableRow::VideoByTag),
        };
        Ok(row)
    }

    async fn read_partition(&self, key: &PartitionKey) -> Result<Vec<TableRow>, TableStoreError> {
        let tables = self.lock()?;
        // BTreeMap iteration is ascending over the full key, so rows within
        // one partition come out in clustering order.
        let rows = match key {
            PartitionKey::UserVideos { user_id } => tables
                .user_videos
                .iter()
                .filter(|((partition, _, _), _)| partition == user_id)
                .map(|(_, row)| TableRow::UserVideo(row.clone()))
                .collect(),
            PartitionKey::LatestVideos { day } => tables
                .latest_videos
                .iter()
                .filter(|((partition, _, _), _)| partition == day)
                .map(|(_, row)| TableRow::LatestVideo(row.clone()))
                .collect(),
            PartitionKey::VideosByTag { tag } => tables
                .videos_by_tag
                .iter()
                .filter(|((partition, _), _)| partition == tag)
                .map(|(_, row)| TableRow::VideoByTag(row.clone()))
                .collect(),
        };
        Ok(rows)
    }
}
