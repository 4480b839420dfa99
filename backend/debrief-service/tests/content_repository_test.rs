//! Content feed behaviour over the in-process store.

mod common;

use common::{channel_row, public_row, Harness};
use std::time::Duration;
use uuid::Uuid;

use debrief_service::notifier::messages;
use debrief_service::{
    DebriefError, FeedScope, LoadOutcome, MediaUpload, NewContent, NoticeLevel, PublishOptions,
    NO_CHANNEL,
};

#[tokio::test]
async fn test_channel_feed_is_newest_first_and_enriched() {
    let viewer = Uuid::new_v4();
    let author = Uuid::new_v4();
    let channel = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    h.store.add_profile(author, "Noah");

    let older = channel_row(channel, author, 1);
    let newer = channel_row(channel, viewer, 5);
    let stranger = channel_row(channel, Uuid::new_v4(), 3);
    h.store.seed_content(older.clone());
    h.store.seed_content(newer.clone());
    h.store.seed_content(stranger.clone());
    h.store.seed_content(channel_row(Uuid::new_v4(), author, 9));
    h.store.seed_content_like(older.id, viewer);

    let repo = h.content_repository();
    let outcome = repo.load_for_channel(Some(channel)).await.unwrap();

    assert_eq!(outcome, LoadOutcome::Loaded(3));
    assert_eq!(repo.scope(), FeedScope::Channel(channel));
    assert!(!repo.is_loading());

    let items = repo.items();
    let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![newer.id, stranger.id, older.id]);
    assert_eq!(items[0].creator_name, "Camille");
    assert_eq!(items[1].creator_name, "Utilisateur");
    assert_eq!(items[2].creator_name, "Noah");
    assert!(items[2].is_liked);
    assert!(!items[0].is_liked);
}

#[tokio::test]
async fn test_enrichment_is_batched() {
    let viewer = Uuid::new_v4();
    let channel = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    for minute in 0..20 {
        h.store
            .seed_content(channel_row(channel, Uuid::new_v4(), minute));
    }

    let repo = h.content_repository();
    repo.load_for_channel(Some(channel)).await.unwrap();

    assert_eq!(repo.len(), 20);
    assert_eq!(h.store.call_count("list_channel_content"), 1);
    assert_eq!(h.store.call_count("display_names"), 1);
    assert_eq!(h.store.call_count("liked_content_ids"), 1);
}

#[tokio::test]
async fn test_unselected_channel_resets_without_store_call() {
    let viewer = Uuid::new_v4();
    let channel = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    h.store.seed_content(channel_row(channel, viewer, 1));

    let repo = h.content_repository();
    repo.load_for_channel(Some(channel)).await.unwrap();
    assert_eq!(repo.len(), 1);
    h.store.reset_calls();

    assert_eq!(
        repo.load_for_channel(Some(NO_CHANNEL)).await.unwrap(),
        LoadOutcome::Reset
    );
    assert!(repo.is_empty());
    assert_eq!(repo.scope(), FeedScope::Unselected);

    assert_eq!(repo.load_for_channel(None).await.unwrap(), LoadOutcome::Reset);
    assert!(!repo.is_loading());
    assert_eq!(h.store.total_calls(), 0);

    assert_eq!(repo.refresh().await.unwrap(), LoadOutcome::Reset);
    assert_eq!(h.store.total_calls(), 0);
}

#[tokio::test]
async fn test_public_feed_and_refresh() {
    let h = Harness::anonymous();
    let author = Uuid::new_v4();
    h.store.add_profile(author, "Noah");
    h.store.seed_content(public_row(author, 1));
    h.store.seed_content(channel_row(Uuid::new_v4(), author, 2));

    let repo = h.content_repository();
    assert_eq!(repo.load_public_feed().await.unwrap(), LoadOutcome::Loaded(1));
    assert!(repo.items().iter().all(|i| i.is_public && i.channel_id.is_none()));
    // No viewer: like state is never looked up
    assert_eq!(h.store.call_count("liked_content_ids"), 0);

    h.store.seed_content(public_row(author, 7));
    assert_eq!(repo.refresh().await.unwrap(), LoadOutcome::Loaded(2));
    assert_eq!(repo.scope(), FeedScope::Public);
    assert_eq!(h.store.call_count("list_public_content"), 2);
}

#[tokio::test]
async fn test_failed_load_keeps_list_and_notifies() {
    let viewer = Uuid::new_v4();
    let channel = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    h.store.seed_content(channel_row(channel, viewer, 1));

    let repo = h.content_repository();
    repo.load_for_channel(Some(channel)).await.unwrap();
    let before = repo.items();

    h.store.fail_operation("list_channel_content");
    let err = repo.load_for_channel(Some(channel)).await.unwrap_err();

    assert!(matches!(err, DebriefError::Store(_)));
    assert_eq!(repo.items(), before);
    assert!(!repo.is_loading());
    let notice = h.notices.last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, messages::CONTENT_LOAD_FAILED);
}

#[tokio::test]
async fn test_enrichment_failure_fails_the_whole_load() {
    let viewer = Uuid::new_v4();
    let channel = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    h.store.seed_content(channel_row(channel, viewer, 1));
    h.store.fail_operation("liked_content_ids");

    let repo = h.content_repository();
    assert!(repo.load_for_channel(Some(channel)).await.is_err());
    assert!(repo.is_empty());
}

#[tokio::test]
async fn test_superseded_load_is_discarded() {
    let viewer = Uuid::new_v4();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    let first_row = channel_row(first, viewer, 1);
    let second_row = channel_row(second, viewer, 2);
    h.store.seed_content(first_row);
    h.store.seed_content(second_row.clone());
    h.store.set_latency(Some(Duration::from_millis(40)));

    let repo = h.content_repository();
    let (stale, fresh) = tokio::join!(repo.load_for_channel(Some(first)), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        repo.load_for_channel(Some(second)).await
    });

    assert_eq!(stale.unwrap(), LoadOutcome::Superseded);
    assert_eq!(fresh.unwrap(), LoadOutcome::Loaded(1));
    assert_eq!(repo.scope(), FeedScope::Channel(second));
    let ids: Vec<Uuid> = repo.items().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![second_row.id]);
}

#[tokio::test]
async fn test_reset_supersedes_in_flight_load() {
    let viewer = Uuid::new_v4();
    let channel = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    h.store.seed_content(channel_row(channel, viewer, 1));
    h.store.set_latency(Some(Duration::from_millis(40)));

    let repo = h.content_repository();
    let (stale, reset) = tokio::join!(repo.load_for_channel(Some(channel)), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        repo.load_for_channel(None).await
    });

    assert_eq!(stale.unwrap(), LoadOutcome::Superseded);
    assert_eq!(reset.unwrap(), LoadOutcome::Reset);
    assert!(repo.is_empty());
    assert!(!repo.is_loading());
}

#[tokio::test]
async fn test_writes_require_a_viewer() {
    let h = Harness::anonymous();
    let channel = Uuid::new_v4();
    let author = Uuid::new_v4();
    let row = channel_row(channel, author, 1);
    h.store.seed_content(row.clone());

    let repo = h.content_repository();
    repo.load_for_channel(Some(channel)).await.unwrap();
    h.store.reset_calls();

    let create = repo
        .create(NewContent::new("Retour match"), PublishOptions::channel(channel))
        .await;
    assert!(matches!(create, Err(DebriefError::AuthRequired)));
    assert!(matches!(
        repo.like(row.id).await,
        Err(DebriefError::AuthRequired)
    ));
    assert!(matches!(
        repo.delete(row.id).await,
        Err(DebriefError::AuthRequired)
    ));

    assert_eq!(h.store.total_calls(), 0);
    assert!(h.media.keys().is_empty());
    assert_eq!(h.store.content_len(), 1);
    assert_eq!(repo.len(), 1);
    assert_eq!(h.last_notice().as_deref(), Some(messages::AUTH_REQUIRED));
}

#[tokio::test]
async fn test_create_in_channel_prepends_item() {
    let viewer = Uuid::new_v4();
    let channel = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    h.store.seed_content(channel_row(channel, Uuid::new_v4(), 1));

    let repo = h.content_repository();
    repo.load_for_channel(Some(channel)).await.unwrap();

    let item = repo
        .create(
            NewContent::new("  Retour match  ")
                .with_description("Analyse de la défense")
                .with_link("https://example.com/stats"),
            PublishOptions::channel(channel),
        )
        .await
        .unwrap();

    assert_eq!(item.title, "Retour match");
    assert_eq!(item.creator_id, viewer);
    assert_eq!(item.creator_name, "Camille");
    assert_eq!(item.channel_id, Some(channel));
    assert!(!item.is_public);
    assert_eq!((item.like_count, item.view_count), (0, 0));
    assert!(!item.is_liked);
    assert_eq!(repo.items()[0].id, item.id);
    assert_eq!(repo.len(), 2);
    assert_eq!(h.last_notice().as_deref(), Some(messages::CONTENT_PUBLISHED));
}

#[tokio::test]
async fn test_create_public_uploads_media_and_drops_channel() {
    let viewer = Uuid::new_v4();
    let h = Harness::anonymous();
    h.identity.sign_in(viewer);

    let repo = h.content_repository();
    let input = NewContent::new("Highlights")
        .with_video(MediaUpload::new("match.mp4", "video/mp4", vec![1, 2, 3]))
        .with_thumbnail(MediaUpload::new("cover.png", "image/png", vec![9]));
    let item = repo.create_public(input).await.unwrap();

    assert!(item.is_public);
    assert_eq!(item.channel_id, None);
    // No profile row for the viewer
    assert_eq!(item.creator_name, "Vous");

    let keys = h.media.keys();
    assert_eq!(keys.len(), 2);
    let video_key = keys.iter().find(|k| k.ends_with("_match.mp4")).unwrap();
    let thumb_key = keys.iter().find(|k| k.ends_with("_cover.png")).unwrap();
    assert!(video_key.starts_with(&format!("{}/", viewer)));
    assert!(thumb_key.starts_with(&format!("{}/thumbnails/", viewer)));
    assert_eq!(h.media.object(video_key).unwrap().content_type, "video/mp4");

    assert_eq!(
        item.video_url.as_deref(),
        Some(format!("memory://content-media/{}", video_key).as_str())
    );
    assert_eq!(
        item.thumbnail_url.as_deref(),
        Some(format!("memory://content-media/{}", thumb_key).as_str())
    );

    let stored = h.store.content(item.id).unwrap();
    assert!(stored.is_public);
    assert_eq!(stored.channel_id, None);
    assert_eq!(repo.items()[0].id, item.id);
}

#[tokio::test]
async fn test_create_public_flag_overrides_target_channel() {
    let viewer = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    let repo = h.content_repository();

    let options = PublishOptions {
        target_channel: Some(Uuid::new_v4()),
        is_public: true,
    };
    let item = repo.create(NewContent::new("Public"), options).await.unwrap();
    assert_eq!(item.channel_id, None);
    assert!(item.is_public);
}

#[tokio::test]
async fn test_create_without_channel_is_invalid_scope() {
    let viewer = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    let repo = h.content_repository();

    for options in [
        PublishOptions::default(),
        PublishOptions::channel(NO_CHANNEL),
    ] {
        let err = repo
            .create(
                NewContent::new("Retour").with_video(MediaUpload::new(
                    "a.mp4",
                    "video/mp4",
                    vec![0],
                )),
                options,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DebriefError::InvalidScope));
    }

    assert_eq!(h.store.total_calls(), 0);
    assert!(h.media.keys().is_empty());
    assert_eq!(h.last_notice().as_deref(), Some(messages::CHANNEL_REQUIRED));
}

#[tokio::test]
async fn test_create_rejects_invalid_input() {
    let viewer = Uuid::new_v4();
    let channel = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    let repo = h.content_repository();

    let inputs = [
        NewContent::new("   "),
        NewContent::new("x".repeat(201)),
        NewContent::new("Retour").with_description("d".repeat(2001)),
        NewContent::new("Retour").with_link("not a url"),
    ];
    for input in inputs {
        let err = repo
            .create(input, PublishOptions::channel(channel))
            .await
            .unwrap_err();
        assert!(matches!(err, DebriefError::InvalidInput(_)), "{:?}", err);
    }

    assert_eq!(h.store.total_calls(), 0);
    assert_eq!(h.last_notice().as_deref(), Some(messages::INVALID_INPUT));
}

#[tokio::test]
async fn test_upload_failure_stops_before_insert() {
    let viewer = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    h.media.set_failing(true);

    let repo = h.content_repository();
    let err = repo
        .create_public(
            NewContent::new("Highlights")
                .with_video(MediaUpload::new("match.mp4", "video/mp4", vec![1])),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DebriefError::Blob(_)));
    assert_eq!(h.store.call_count("insert_content"), 0);
    assert!(repo.is_empty());
    assert_eq!(
        h.last_notice().as_deref(),
        Some(messages::CONTENT_PUBLISH_FAILED)
    );
}

#[tokio::test]
async fn test_insert_failure_leaves_uploaded_media() {
    let viewer = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    h.store.fail_operation("insert_content");

    let repo = h.content_repository();
    let err = repo
        .create_public(
            NewContent::new("Highlights")
                .with_video(MediaUpload::new("match.mp4", "video/mp4", vec![1])),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DebriefError::Store(_)));
    // Upload is not rolled back
    assert_eq!(h.media.keys().len(), 1);
    assert_eq!(h.store.content_len(), 0);
    assert!(repo.is_empty());
}

#[tokio::test]
async fn test_name_lookup_failure_after_insert_is_not_fatal() {
    let viewer = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    h.store.fail_operation("display_names");

    let repo = h.content_repository();
    let item = repo.create_public(NewContent::new("Retour")).await.unwrap();
    assert_eq!(item.creator_name, "Vous");
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn test_like_toggle_trusts_store_count() {
    let viewer = Uuid::new_v4();
    let channel = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    let mut row = channel_row(channel, Uuid::new_v4(), 1);
    row.like_count = 3;
    h.store.seed_content(row.clone());

    let repo = h.content_repository();
    repo.load_for_channel(Some(channel)).await.unwrap();

    let liked = repo.like(row.id).await.unwrap();
    assert!(liked.liked);
    assert_eq!(liked.like_count, 4);
    let item = repo.item(row.id).unwrap();
    assert!(item.is_liked);
    assert_eq!(item.like_count, 4);
    assert!(h.store.has_content_like(row.id, viewer));

    let unliked = repo.like(row.id).await.unwrap();
    assert!(!unliked.liked);
    assert_eq!(unliked.like_count, 3);
    let item = repo.item(row.id).unwrap();
    assert!(!item.is_liked);
    assert_eq!(item.like_count, 3);
    assert!(!h.store.has_content_like(row.id, viewer));
}

#[tokio::test]
async fn test_like_unknown_item_is_not_found() {
    let viewer = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    let repo = h.content_repository();

    let missing = Uuid::new_v4();
    let err = repo.like(missing).await.unwrap_err();
    assert!(matches!(err, DebriefError::NotFound(id) if id == missing));
    assert_eq!(h.store.total_calls(), 0);
    assert_eq!(
        h.last_notice().as_deref(),
        Some(messages::CONTENT_LIKE_FAILED)
    );
}

#[tokio::test]
async fn test_failed_like_leaves_local_state() {
    let viewer = Uuid::new_v4();
    let channel = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    let row = channel_row(channel, Uuid::new_v4(), 1);
    h.store.seed_content(row.clone());

    let repo = h.content_repository();
    repo.load_for_channel(Some(channel)).await.unwrap();
    h.store.fail_operation("insert_content_like");

    assert!(repo.like(row.id).await.is_err());
    let item = repo.item(row.id).unwrap();
    assert!(!item.is_liked);
    assert_eq!(item.like_count, 0);
}

#[tokio::test]
async fn test_delete_own_item() {
    let viewer = Uuid::new_v4();
    let channel = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    let own = channel_row(channel, viewer, 1);
    let other = channel_row(channel, Uuid::new_v4(), 2);
    h.store.seed_content(own.clone());
    h.store.seed_content(other.clone());

    let repo = h.content_repository();
    repo.load_for_channel(Some(channel)).await.unwrap();

    repo.delete(own.id).await.unwrap();
    assert!(repo.item(own.id).is_none());
    assert!(h.store.content(own.id).is_none());
    assert_eq!(repo.len(), 1);
    assert_eq!(h.last_notice().as_deref(), Some(messages::CONTENT_DELETED));
}

#[tokio::test]
async fn test_delete_foreign_item_is_rejected() {
    let viewer = Uuid::new_v4();
    let channel = Uuid::new_v4();
    let h = Harness::signed_in(viewer, "Camille");
    let other = channel_row(channel, Uuid::new_v4(), 2);
    h.store.seed_content(other.clone());

    let repo = h.content_repository();
    repo.load_for_channel(Some(channel)).await.unwrap();
    let before = repo.items();

    let err = repo.delete(other.id).await.unwrap_err();
    assert!(matches!(err, DebriefError::OwnershipRejected(id) if id == other.id));
    assert_eq!(repo.items(), before);
    assert!(h.store.content(other.id).is_some());
    assert_eq!(
        h.last_notice().as_deref(),
        Some(messages::CONTENT_DELETE_FAILED)
    );
    assert_eq!(h.notices.errors().len(), 1);
}
