use chrono::{Duration, Utc};

use crate::common::{TestApp, routes};

#[tokio::test]
async fn removes_only_expired_cards() {
    let app = TestApp::spawn().await;
    let expired_a = app.create_card("Happy holidays!").await;
    let expired_b = app.create_card("Merry everything!").await;
    let live = app.create_card("See you next year!").await;

    let now = Utc::now();
    for card in [&expired_a, &expired_b] {
        let id = card["id"].as_str().unwrap();
        app.set_expires_at(id, now - Duration::hours(1)).await;
    }

    let res = app.post_empty(routes::CLEANUP).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["result"]["total_expired"], 2);
    assert_eq!(res.body["result"]["deleted"], 2);
    assert_eq!(res.body["result"]["errors"], 0);

    let id_a = expired_a["id"].as_str().unwrap();
    let cover_a = app.covers.path().join(format!("cards/{id_a}/cover-1.png"));
    assert!(!cover_a.exists());

    let live_id = live["id"].as_str().unwrap();
    let live_cover = app.covers.path().join(format!("cards/{live_id}/cover-1.png"));
    assert!(live_cover.exists());

    let res = app.post_empty(&routes::publish(live_id)).await;
    assert_eq!(res.status, 200, "live card should survive the sweep");

    let res = app.post_empty(&routes::publish(id_a)).await;
    assert_eq!(res.status, 404);

    // A second run finds nothing.
    let res = app.post_empty(routes::CLEANUP).await;
    assert_eq!(res.body["result"]["total_expired"], 0);
}

#[tokio::test]
async fn configured_token_is_required() {
    let app = TestApp::spawn_with(|c| c.cleanup.auth_token = Some("sweep-secret".into())).await;

    let res = app.post_empty(routes::CLEANUP).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.code(), "UNAUTHORIZED");

    let res = app.post_with_token(routes::CLEANUP, "wrong").await;
    assert_eq!(res.status, 401);

    let res = app.post_with_token(routes::CLEANUP, "sweep-secret").await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["success"], true);
}

#[tokio::test]
async fn get_describes_endpoint() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::CLEANUP).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.str("method"), "POST");
    assert_eq!(res.str("endpoint"), "/api/v1/cleanup");
}
