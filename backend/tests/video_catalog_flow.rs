//! End-to-end catalogue fan-out and partial-update behaviour over the
//! in-memory store.

use std::collections::BTreeSet;
use std::sync::Arc;

use mockable::DefaultClock;
use reelvault_backend::domain::{DayBucket, Tag, VideoCatalogService, VideoDraft, VideoUpdate};
use reelvault_backend::outbound::persistence::InMemoryTableStore;
use uuid::Uuid;

fn service() -> VideoCatalogService<InMemoryTableStore> {
    VideoCatalogService::new(Arc::new(InMemoryTableStore::new()), Arc::new(DefaultClock))
}

fn tag(value: &str) -> Tag {
    Tag::new(value).expect("valid test tag")
}

fn tags(values: &[&str]) -> BTreeSet<Tag> {
    values.iter().map(|value| tag(value)).collect()
}

#[tokio::test]
async fn creating_with_tags_populates_every_view() {
    let catalog = service();
    let user_id = Uuid::new_v4();
    let draft = VideoDraft {
        tags: tags(&["a", "b"]),
        preview_image_location: Some("https://img.example.com/1.png".to_owned()),
        location: Some("https://example.com/watch?v=1".to_owned()),
        ..VideoDraft::new(user_id, "Accelerate (trailer)")
    };

    let video = catalog.create(draft).await.expect("create succeeds");

    // Canonical row, readable immediately with defaults filled.
    let canonical = catalog
        .get(video.video_id)
        .await
        .expect("read succeeds")
        .expect("canonical row exists");
    assert_eq!(canonical, video);

    // Exactly one per-owner row.
    let by_user = catalog.get_by_user(user_id).await.expect("read succeeds");
    assert_eq!(by_user.len(), 1);
    assert_eq!(by_user.first().map(|view| view.video_id), Some(video.video_id));

    // Exactly one per-day row, bucketed by the upload's UTC day.
    let day = DayBucket::from_datetime(&video.added_date);
    let latest = catalog.get_latest(day).await.expect("read succeeds");
    assert_eq!(latest.len(), 1);

    // One row per tag.
    for value in ["a", "b"] {
        let by_tag = catalog.get_by_tag(tag(value)).await.expect("read succeeds");
        assert_eq!(by_tag.len(), 1, "tag {value} must carry exactly one row");
        let row = by_tag.into_iter().next().expect("row present");
        assert_eq!(row.video_id, video.video_id);
        assert_eq!(row.tagged_date, Some(video.added_date));
    }
}

#[tokio::test]
async fn creating_without_tags_produces_no_tag_rows() {
    let catalog = service();
    let user_id = Uuid::new_v4();

    let tagged = catalog
        .create(VideoDraft {
            tags: tags(&["shared"]),
            ..VideoDraft::new(user_id, "Tagged")
        })
        .await
        .expect("create succeeds");
    let untagged = catalog
        .create(VideoDraft::new(user_id, "Untagged"))
        .await
        .expect("create succeeds");

    // The untagged video exists in the owner and day views...
    let by_user = catalog.get_by_user(user_id).await.expect("read succeeds");
    assert_eq!(by_user.len(), 2);

    // ...and through its canonical row...
    let canonical = catalog
        .get(untagged.video_id)
        .await
        .expect("read succeeds")
        .expect("canonical row exists");
    assert!(canonical.tags.is_empty());

    // ...but only the tagged one is reachable through the tag view.
    let by_tag = catalog
        .get_by_tag(tag("shared"))
        .await
        .expect("read succeeds");
    assert_eq!(by_tag.len(), 1);
    assert_eq!(
        by_tag.into_iter().next().map(|row| row.video_id),
        Some(tagged.video_id)
    );
}

#[tokio::test]
async fn partial_update_touches_only_the_canonical_row() {
    let catalog = service();
    let user_id = Uuid::new_v4();
    let video = catalog
        .create(VideoDraft {
            tags: tags(&["nosql"]),
            description: Some("season one".to_owned()),
            ..VideoDraft::new(user_id, "Original title")
        })
        .await
        .expect("create succeeds");

    let template = VideoUpdate {
        name: Some("Updated title".to_owned()),
        ..VideoUpdate::for_video(video.video_id)
    };
    catalog.update(template).await.expect("update succeeds");

    // The canonical row changed only where the template set a value.
    let canonical = catalog
        .get(video.video_id)
        .await
        .expect("read succeeds")
        .expect("canonical row exists");
    assert_eq!(canonical.name, "Updated title");
    assert_eq!(canonical.description.as_deref(), Some("season one"));
    assert_eq!(canonical.user_id, user_id);
    assert_eq!(canonical.added_date, video.added_date);
    assert_eq!(canonical.tags, video.tags);

    // The denormalized views are NOT repaired: this is the documented
    // consistency gap of the template update, asserted rather than assumed.
    let by_user = catalog.get_by_user(user_id).await.expect("read succeeds");
    assert_eq!(
        by_user.first().and_then(|view| view.name.as_deref()),
        Some("Original title")
    );
    let latest = catalog
        .get_latest(DayBucket::from_datetime(&video.added_date))
        .await
        .expect("read succeeds");
    assert_eq!(
        latest.first().and_then(|view| view.name.as_deref()),
        Some("Original title")
    );
    let by_tag = catalog.get_by_tag(tag("nosql")).await.expect("read succeeds");
    assert_eq!(
        by_tag.first().and_then(|view| view.name.as_deref()),
        Some("Original title")
    );
}

#[tokio::test]
async fn user_view_lists_uploads_in_ascending_added_date_order() {
    let catalog = service();
    let user_id = Uuid::new_v4();

    for title in ["first", "second", "third"] {
        let _ = catalog
            .create(VideoDraft::new(user_id, title))
            .await
            .expect("create succeeds");
    }

    let by_user = catalog.get_by_user(user_id).await.expect("read succeeds");
    assert_eq!(by_user.len(), 3);
    let dates: Vec<_> = by_user.iter().map(|view| view.added_date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted, "rows must come back clustering-key ascending");
}
