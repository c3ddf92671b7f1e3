//! Integration tests for order repair, captions and site content against the
//! SQLite-backed store.

mod common;

use assert_matches::assert_matches;
use common::{assets, TestHarness};
use memories::store::ContentStore;
use memories_common::{Asset, Collection, Error, NewRow, SiteContentUpdate};

#[tokio::test]
async fn repair_renumbers_duplicates_in_sqlite() {
    let h = TestHarness::signed_in();
    for (url, key) in [("/a", 1), ("/b", 1), ("/c", 2), ("/d", 7)] {
        h.store
            .insert_row(NewRow::for_collection(Collection::Slider, url.into(), key))
            .await
            .unwrap();
    }

    let rewritten = h.service.repair_order(Collection::Slider).await.unwrap();
    assert_eq!(rewritten, 3);

    let slides = h.service.slider_items().await.unwrap();
    let order: Vec<(u32, &str)> = slides
        .iter()
        .map(|s| (s.position, s.image_url.as_str()))
        .collect();
    assert_eq!(order, vec![(1, "/a"), (2, "/b"), (3, "/c"), (4, "/d")]);

    // captions are left alone by a repair
    assert_eq!(slides[3].caption, "Slide 7");
}

#[tokio::test]
async fn repair_on_dense_collection_is_a_no_op() {
    let h = TestHarness::signed_in();
    h.service
        .ingest(assets(&["a.jpg", "b.jpg"]), Collection::Gallery)
        .await
        .unwrap();

    assert_eq!(h.service.repair_order(Collection::Gallery).await.unwrap(), 0);
}

#[tokio::test]
async fn caption_edit_changes_only_the_caption() {
    let h = TestHarness::signed_in();
    h.service
        .ingest(assets(&["a.jpg", "b.jpg"]), Collection::Slider)
        .await
        .unwrap();
    let before = h.service.slider_items().await.unwrap();

    h.service
        .update_slider_caption(before[1].id, "Sunset in Bali")
        .await
        .unwrap();

    let after = h.service.slider_items().await.unwrap();
    assert_eq!(after[0], before[0]);
    assert_eq!(after[1].caption, "Sunset in Bali");
    assert_eq!(after[1].position, before[1].position);
    assert_eq!(after[1].image_url, before[1].image_url);
}

#[tokio::test]
async fn site_content_update_is_partial_and_stamped() {
    let h = TestHarness::signed_in();
    let before = h.service.site_content().await.unwrap();

    let updated = h
        .service
        .update_site_content(SiteContentUpdate {
            letter_text: Some("Dear you,".into()),
            hero_image_position: Some(30),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.id, before.id);
    assert_eq!(updated.letter_text, "Dear you,");
    assert_eq!(updated.hero_image_position, 30);
    assert_eq!(updated.couple_name, before.couple_name);
    assert!(updated.updated_at >= before.updated_at);

    let reread = h.service.site_content().await.unwrap();
    assert_eq!(reread, updated);
}

#[tokio::test]
async fn hero_position_out_of_range_is_rejected() {
    let h = TestHarness::signed_in();
    let err = h
        .service
        .update_site_content(SiteContentUpdate {
            hero_image_position: Some(150),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_matches!(err, Error::Validation(_));
}

#[tokio::test]
async fn hero_image_replacement_stores_object() {
    let h = TestHarness::signed_in();

    let content = h
        .service
        .replace_hero_image(Asset::new("us.png", b"png".to_vec()))
        .await
        .unwrap();

    let path = content
        .hero_image_url
        .rsplit_once("/images/")
        .map(|(_, p)| p.to_string())
        .unwrap();
    assert!(path.starts_with("hero/"));
    assert!(h.object_file(&path).exists());
}

#[tokio::test]
async fn site_content_edit_requires_session() {
    let h = TestHarness::new();
    let err = h
        .service
        .update_site_content(SiteContentUpdate {
            couple_name: Some("x".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());

    // reads are public
    assert!(h.service.site_content().await.is_ok());
}
