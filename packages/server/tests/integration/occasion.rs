use crate::common::{TestApp, routes};

#[tokio::test]
async fn lists_seeded_occasions_by_name() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::OCCASIONS).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let occasions = res.body.as_array().expect("occasions should be an array");
    let names: Vec<_> = occasions
        .iter()
        .map(|o| o["name"].as_str().unwrap())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names.len(), 5);
    assert_eq!(names, sorted);

    let christmas = occasions
        .iter()
        .find(|o| o["id"] == "christmas")
        .expect("christmas should be seeded");
    assert!(christmas["style_guide"]["color_palette"].is_array());
    assert!(!christmas["font_set"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn health_reports_database() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::HEALTH).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.str("status"), "ok");
    assert_eq!(res.body["database"], true);
}
