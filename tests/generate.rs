use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use image::{Rgb, RgbImage};
use serde_json::json;
use tower::ServiceExt;

use hallticket_backend::config::{Config, QrSource};
use hallticket_backend::pdf;
use hallticket_backend::ticket::{self, TicketError};
use hallticket_backend::{api, AppState};

fn test_config(dir: &Path) -> Config {
    Config {
        template_path: dir.join("template.png"),
        font_regular_path: dir.join("calibri.ttf"),
        font_bold_path: dir.join("calibrib.ttf"),
        dataset_path: dir.join("students.json"),
        output_dir: dir.join("out"),
        qr_source: QrSource::Local,
    }
}

/// Asset existence is checked before any file is parsed, and the record
/// lookup runs before the template and fonts are opened, so placeholder font
/// files are enough for the lookup-level tests.
fn write_assets(dir: &Path) {
    RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]))
        .save(dir.join("template.png"))
        .unwrap();
    std::fs::write(dir.join("calibri.ttf"), b"").unwrap();
    std::fs::write(dir.join("calibrib.ttf"), b"").unwrap();

    let dataset = json!({
        "Class X": [
            {"registrationNo": "2024001", "name": "Asha Rao", "rollNo": 12.0, "section": "A"}
        ]
    });
    std::fs::write(
        dir.join("students.json"),
        serde_json::to_string_pretty(&dataset).unwrap(),
    )
    .unwrap();
}

/// Real fonts for the tests that drive the full render path.
fn write_fixture_fonts(dir: &Path) {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/assets");
    std::fs::copy(fixtures.join("DejaVuSans.ttf"), dir.join("calibri.ttf")).unwrap();
    std::fs::copy(fixtures.join("DejaVuSans-Bold.ttf"), dir.join("calibrib.ttf")).unwrap();
}

#[tokio::test]
async fn successful_generation_leaves_no_files_behind() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());
    write_fixture_fonts(dir.path());
    let cfg = test_config(dir.path());

    let state = AppState {
        http: reqwest::Client::new(),
        config: cfg.clone(),
    };
    let app = Router::new()
        .route("/generate", get(api::generate))
        .with_state(Arc::new(state));

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/generate?reg_no=2024001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let doc = lopdf::Document::load_mem(&body).unwrap();
    assert_eq!(doc.get_pages().len(), 1);

    let leftovers: Vec<_> = std::fs::read_dir(&cfg.output_dir).unwrap().collect();
    assert!(
        leftovers.is_empty(),
        "output dir should be empty after the response, found {leftovers:?}"
    );
}

#[tokio::test]
async fn unknown_registration_is_not_found_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());
    let cfg = test_config(dir.path());
    let http = reqwest::Client::new();

    let err = ticket::generate_hall_ticket(&http, &cfg, "0000000")
        .await
        .unwrap_err();

    assert!(matches!(err, TicketError::NotFound));
    assert_eq!(err.to_string(), "Invalid Registration Number");
    assert!(!cfg.output_dir.exists());
}

#[tokio::test]
async fn missing_template_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());
    std::fs::remove_file(dir.path().join("template.png")).unwrap();
    let cfg = test_config(dir.path());
    let http = reqwest::Client::new();

    let err = ticket::generate_hall_ticket(&http, &cfg, "2024001")
        .await
        .unwrap_err();

    match err {
        TicketError::MissingAsset(path) => assert!(path.ends_with("template.png")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_dataset_is_a_missing_asset() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());
    std::fs::remove_file(dir.path().join("students.json")).unwrap();
    let cfg = test_config(dir.path());
    let http = reqwest::Client::new();

    let err = ticket::generate_hall_ticket(&http, &cfg, "2024001")
        .await
        .unwrap_err();

    assert!(matches!(err, TicketError::MissingAsset(_)));
}

#[test]
fn emitted_pdf_has_exactly_one_a4_page() {
    let dir = tempfile::tempdir().unwrap();
    let bitmap = RgbImage::from_pixel(40, 60, Rgb([200, 200, 200]));
    let path = dir.path().join("ticket.pdf");

    pdf::write_single_page(&bitmap, &path).unwrap();

    let doc = lopdf::Document::load(&path).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);

    let page_id = pages[&1];
    let media_box = doc
        .get_object(page_id)
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap();
    let values: Vec<f64> = media_box
        .iter()
        .map(|o| match o {
            lopdf::Object::Integer(i) => *i as f64,
            lopdf::Object::Real(r) => *r as f64,
            other => panic!("unexpected MediaBox entry: {other:?}"),
        })
        .collect();

    // A4 in PDF points: 595.276 x 841.89.
    assert!((values[2] - 595.276).abs() < 1.0, "width was {}", values[2]);
    assert!((values[3] - 841.89).abs() < 1.0, "height was {}", values[3]);
}
