use std::sync::atomic::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::common::{PNG_BYTES, TestApp, routes};

#[tokio::test]
async fn create_card_returns_draft_with_cover() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            routes::CARDS,
            &json!({ "occasion": "christmas", "vibe": "warm", "message": "Happy holidays!" }),
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.str("status"), "draft");
    assert_eq!(res.str("occasion"), "christmas");
    assert_eq!(res.str("vibe"), "warm");
    assert_eq!(res.str("clean_message"), "[warm Christmas] Happy holidays!");
    assert_eq!(res.str("slug").len(), 6);

    let id = res.str("id");
    let cover = res.str("cover_image_url");
    assert_eq!(cover, format!("/covers/cards/{id}/cover-1.png"));

    let expires_at: DateTime<Utc> = res.str("expires_at").parse().unwrap();
    let expected = Utc::now() + Duration::days(30);
    assert!((expires_at - expected).num_seconds().abs() < 60);

    assert_eq!(res.header("x-ratelimit-ip-limit"), Some("10"));
    assert_eq!(res.header("x-ratelimit-ip-remaining"), Some("9"));
    assert_eq!(res.header("x-ratelimit-device-limit"), Some("3"));
    assert_eq!(res.header("x-ratelimit-device-remaining"), Some("2"));

    let image = app.client.get(app.url(&cover)).send().await.unwrap();
    assert_eq!(image.status().as_u16(), 200);
    assert_eq!(image.bytes().await.unwrap().as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn create_card_validates_input() {
    let app = TestApp::spawn().await;

    let res = app
        .post(routes::CARDS, &json!({ "occasion": "christmas", "vibe": "warm" }))
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
    assert_eq!(
        res.str("message"),
        "Missing required fields: occasion, vibe, message"
    );

    let res = app
        .post(
            routes::CARDS,
            &json!({ "occasion": "christmas", "vibe": "gloomy", "message": "Happy holidays!" }),
        )
        .await;
    assert_eq!(res.status, 400);
    assert!(res.str("message").starts_with("Invalid vibe"));

    let res = app
        .post(
            routes::CARDS,
            &json!({ "occasion": "arbor-day", "vibe": "warm", "message": "Happy holidays!" }),
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn moderation_rejection_skips_generation() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            routes::CARDS,
            &json!({ "occasion": "christmas", "vibe": "funny", "message": "hi" }),
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "CONTENT_REJECTED");
    assert_eq!(
        res.str("message"),
        "Your message is too short. Please write a longer message."
    );
    assert_eq!(app.generator.text_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fourth_card_from_same_device_is_rate_limited() {
    let app = TestApp::spawn().await;
    for _ in 0..3 {
        app.create_card("Happy holidays!").await;
    }

    let res = app
        .post(
            routes::CARDS,
            &json!({ "occasion": "christmas", "vibe": "warm", "message": "Happy holidays!" }),
        )
        .await;

    assert_eq!(res.status, 429, "{}", res.text);
    assert_eq!(res.code(), "RATE_LIMITED");
    assert_eq!(res.header("x-ratelimit-dimension"), Some("device"));
    assert_eq!(res.header("x-ratelimit-device-remaining"), Some("0"));
    let retry_after: u64 = res.header("retry-after").unwrap().parse().unwrap();
    assert!(retry_after > 0 && retry_after <= 24 * 3600);

    // A different client is unaffected.
    let res = app
        .post_from(
            routes::CARDS,
            &json!({ "occasion": "christmas", "vibe": "warm", "message": "Happy holidays!" }),
            "198.51.100.77",
        )
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
}

#[tokio::test]
async fn overloaded_image_model_is_service_unavailable() {
    let app = TestApp::spawn().await;
    app.generator.images_overloaded.store(true, Ordering::SeqCst);

    let res = app
        .post(
            routes::CARDS,
            &json!({ "occasion": "christmas", "vibe": "warm", "message": "Happy holidays!" }),
        )
        .await;

    assert_eq!(res.status, 503, "{}", res.text);
    assert_eq!(res.code(), "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn publish_builds_deep_link_once() {
    let app = TestApp::spawn().await;
    let card = app.create_card("Happy holidays!").await;
    let id = card["id"].as_str().unwrap();
    let slug = card["slug"].as_str().unwrap();

    let res = app.post_empty(&routes::publish(id)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.str("status"), "published");
    // No Origin or forwarded host: the Host header of the test server is used.
    assert_eq!(
        res.str("deep_link"),
        format!("http://{}/c/christmas/{slug}", app.addr)
    );

    let res = app.post_empty(&routes::publish(id)).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "ALREADY_PUBLISHED");
}

#[tokio::test]
async fn publish_prefers_origin_header() {
    let app = TestApp::spawn().await;
    let card = app.create_card("Happy holidays!").await;
    let id = card["id"].as_str().unwrap();
    let slug = card["slug"].as_str().unwrap();

    let res = app
        .client
        .post(app.url(&routes::publish(id)))
        .header("Origin", "https://cards.example.org")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["deep_link"],
        format!("https://cards.example.org/c/christmas/{slug}")
    );
}

#[tokio::test]
async fn unknown_card_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.post_empty(&routes::publish("does-not-exist")).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.code(), "NOT_FOUND");

    let res = app.post_empty(&routes::regenerate_cover("does-not-exist")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn regenerate_cover_replaces_object() {
    let app = TestApp::spawn().await;
    let card = app.create_card("Happy holidays!").await;
    let id = card["id"].as_str().unwrap();
    let old_cover = card["cover_image_url"].as_str().unwrap();

    let res = app.post_empty(&routes::regenerate_cover(id)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    let new_cover = res.str("cover_image_url");
    assert_ne!(new_cover, old_cover);
    assert!(new_cover.starts_with(&format!("/covers/cards/{id}/cover-")));

    let old_path = app
        .covers
        .path()
        .join(format!("cards/{id}/cover-1.png"));
    assert!(!old_path.exists());

    let image = app.client.get(app.url(&new_cover)).send().await.unwrap();
    assert_eq!(image.status().as_u16(), 200);
}

#[tokio::test]
async fn regenerate_message_with_and_without_original() {
    let app = TestApp::spawn().await;
    let card = app.create_card("Happy holidays!").await;
    let id = card["id"].as_str().unwrap();

    let res = app.post_empty(&routes::regenerate_message(id)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.str("clean_message"), "[warm Christmas] Happy holidays!");

    let res = app
        .post(
            &routes::regenerate_message(id),
            &json!({ "original_message": "Call me at 555-123-4567 for cocoa" }),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(
        res.str("clean_message"),
        "[warm Christmas] Call me at [phone removed] for cocoa"
    );
}

#[tokio::test]
async fn published_card_cannot_be_regenerated() {
    let app = TestApp::spawn().await;
    let card = app.create_card("Happy holidays!").await;
    let id = card["id"].as_str().unwrap();
    app.post_empty(&routes::publish(id)).await;

    let res = app.post_empty(&routes::regenerate_cover(id)).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "ALREADY_PUBLISHED");

    let res = app.post_empty(&routes::regenerate_message(id)).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "ALREADY_PUBLISHED");

    let slug = card["slug"].as_str().unwrap();
    let res = app.get(&routes::public_card("christmas", slug)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.str("clean_message"), card["clean_message"].as_str().unwrap());
    assert_eq!(res.str("cover_image_url"), card["cover_image_url"].as_str().unwrap());
}

#[tokio::test]
async fn public_view_only_shows_live_published_cards() {
    let app = TestApp::spawn().await;
    let card = app.create_card("Happy holidays!").await;
    let id = card["id"].as_str().unwrap();
    let slug = card["slug"].as_str().unwrap();

    let res = app.get(&routes::public_card("christmas", slug)).await;
    assert_eq!(res.status, 404, "drafts are private");

    app.post_empty(&routes::publish(id)).await;
    let res = app.get(&routes::public_card("christmas", slug)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.str("occasion_name"), "Christmas");
    assert_eq!(res.str("theme_version"), "1.0");

    app.set_expires_at(id, Utc::now() - Duration::minutes(1)).await;
    let res = app.get(&routes::public_card("christmas", slug)).await;
    assert_eq!(res.status, 410);
    assert_eq!(res.code(), "CARD_EXPIRED");
}
