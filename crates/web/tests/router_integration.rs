//! The full router driven over HTTP, backed by the mock analysis service.
mod support;

use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use reqwest::redirect::Policy;
use reqwest::StatusCode;

use floodaware_common::config::PageSessionConfig;
use floodaware_web::client::AnalysisClient;
use floodaware_web::pages::PageRegistry;
use floodaware_web::server::{build_router, AppState};
use floodaware_web::submission::FlowSettings;

use support::{Behavior, MockBackend, Seen};

const MIB: usize = 1024 * 1024;

struct App {
    base: String,
    http: reqwest::Client,
}

impl App {
    async fn start(backend_url: &str, request_timeout: Duration) -> Self {
        let client = AnalysisClient::with_http(reqwest::Client::new(), backend_url).unwrap();
        let registry = Arc::new(PageRegistry::new(
            Arc::new(client),
            FlowSettings {
                request_timeout,
                max_image_bytes: 10 * MIB as u64,
            },
            &PageSessionConfig {
                idle_ttl_seconds: 600,
                max_sessions: 16,
            },
        ));
        let state = Arc::new(AppState {
            registry,
            metrics_handle: PrometheusBuilder::new().build_recorder().handle(),
            max_image_bytes: 10 * MIB as u64,
        });
        let router = build_router(state, 32 * MIB);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            http: reqwest::Client::builder()
                .redirect(Policy::none())
                .build()
                .unwrap(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Mount a page and return its path.
    async fn mount(&self) -> String {
        let resp = self.http.get(self.url("/flood-detection")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        location(&resp)
    }

    async fn state(&self, page: &str) -> serde_json::Value {
        self.http
            .get(self.url(&format!("{}/state", page)))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.http
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    async fn upload(&self, page: &str, name: &str, mime: &str, bytes: Vec<u8>) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(mime)
            .unwrap();
        let form = reqwest::multipart::Form::new().part("file", part);
        self.http
            .post(self.url(&format!("{}/image", page)))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }
}

fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_static_pages_and_health() {
    let app = App::start("http://127.0.0.1:9", Duration::from_secs(5)).await;

    let home = app.http.get(app.url("/")).send().await.unwrap();
    assert_eq!(home.status(), StatusCode::OK);
    assert!(home.text().await.unwrap().contains("Flood Aware!"));

    let about = app.http.get(app.url("/about")).send().await.unwrap();
    assert!(about.text().await.unwrap().contains("About FloodAware"));

    let health: serde_json::Value = app
        .http
        .get(app.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");

    let metrics = app.http.get(app.url("/metrics")).send().await.unwrap();
    assert_eq!(metrics.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_coordinates_round_trip() {
    let backend = MockBackend::start(Behavior::Respond("High")).await;
    let app = App::start(&backend.base_url, Duration::from_secs(5)).await;
    let page = app.mount().await;

    let resp = app
        .post_form(
            &format!("{}/coordinates", page),
            &[("latitude", "31.5204"), ("longitude", "74.3587")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), page);

    let state = app.state(&page).await;
    assert_eq!(state["isLoading"], false);
    assert_eq!(state["lastError"], serde_json::Value::Null);
    assert_eq!(state["lastResult"]["assessment"]["riskLevel"], "High");
    assert_eq!(state["coordinateInput"]["latitude"], "31.5204");

    let html = app.http.get(app.url(&page)).send().await.unwrap().text().await.unwrap();
    assert!(html.contains(r#"class="badge badge-destructive""#));
    assert!(html.contains("208m"));

    assert_eq!(backend.seen().len(), 1);
}

#[tokio::test]
async fn test_invalid_coordinates_never_reach_backend() {
    let backend = MockBackend::start(Behavior::Respond("Low")).await;
    let app = App::start(&backend.base_url, Duration::from_secs(5)).await;
    let page = app.mount().await;

    app.post_form(
        &format!("{}/coordinates", page),
        &[("latitude", "91"), ("longitude", "10")],
    )
    .await;

    let state = app.state(&page).await;
    assert!(state["lastError"]
        .as_str()
        .unwrap()
        .contains("Lat: -90 to 90"));
    assert!(backend.seen().is_empty());

    app.post_form(&format!("{}/dismiss", page), &[]).await;
    assert_eq!(app.state(&page).await["lastError"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_backend_failure_shows_coarse_message() {
    let backend = MockBackend::start(Behavior::Status(503)).await;
    let app = App::start(&backend.base_url, Duration::from_secs(5)).await;
    let page = app.mount().await;

    app.post_form(
        &format!("{}/coordinates", page),
        &[("latitude", "1"), ("longitude", "1")],
    )
    .await;

    let state = app.state(&page).await;
    assert_eq!(
        state["lastError"],
        "Error analyzing coordinates. Please check if the backend server is running."
    );
    assert_eq!(state["lastResult"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let backend = MockBackend::start(Behavior::Delay(Duration::from_secs(10))).await;
    let app = App::start(&backend.base_url, Duration::from_millis(200)).await;
    let page = app.mount().await;

    app.post_form(
        &format!("{}/coordinates", page),
        &[("latitude", "1"), ("longitude", "1")],
    )
    .await;

    let state = app.state(&page).await;
    assert_eq!(state["isLoading"], false);
    assert!(state["lastError"]
        .as_str()
        .unwrap()
        .starts_with("Error analyzing coordinates."));
}

#[tokio::test]
async fn test_image_select_preview_and_analyze() {
    let backend = MockBackend::start(Behavior::Respond("Low")).await;
    let app = App::start(&backend.base_url, Duration::from_secs(5)).await;
    let page = app.mount().await;

    app.post_form(&format!("{}/mode", page), &[("mode", "image")]).await;
    let resp = app.upload(&page, "river.jpg", "image/jpeg", vec![9; 2048]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let state = app.state(&page).await;
    assert_eq!(state["mode"], "image");
    assert_eq!(state["selectedImage"]["fileName"], "river.jpg");
    assert_eq!(state["selectedImage"]["size"], 2048);

    let preview = app
        .http
        .get(app.url(&format!("{}/image/preview", page)))
        .send()
        .await
        .unwrap();
    assert_eq!(preview.headers()[reqwest::header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(preview.bytes().await.unwrap().len(), 2048);

    app.post_form(&format!("{}/image/analyze", page), &[]).await;
    let state = app.state(&page).await;
    assert_eq!(state["lastResult"]["assessment"]["riskLevel"], "Low");
    assert_eq!(state["lastResult"]["mode"], "image");
    assert!(matches!(&backend.seen()[0], Seen::Image { len: 2048, .. }));
}

#[tokio::test]
async fn test_oversized_image_rejected() {
    let backend = MockBackend::start(Behavior::Respond("Low")).await;
    let app = App::start(&backend.base_url, Duration::from_secs(5)).await;
    let page = app.mount().await;
    app.post_form(&format!("{}/mode", page), &[("mode", "image")]).await;

    app.upload(&page, "huge.png", "image/png", vec![0; 12 * MIB]).await;

    let state = app.state(&page).await;
    assert_eq!(state["lastError"], "Image size must be less than 10MB");
    assert_eq!(state["selectedImage"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_upload_above_body_limit_shows_size_error() {
    let backend = MockBackend::start(Behavior::Respond("Low")).await;
    let app = App::start(&backend.base_url, Duration::from_secs(5)).await;
    let page = app.mount().await;
    app.post_form(&format!("{}/mode", page), &[("mode", "image")]).await;
    app.upload(&page, "river.png", "image/png", vec![3; 64]).await;

    // Larger than the 32 MiB form body limit.
    let resp = app.upload(&page, "survey.png", "image/png", vec![0; 40 * MIB]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let state = app.state(&page).await;
    assert_eq!(state["lastError"], "Image size must be less than 10MB");
    assert_eq!(state["selectedImage"]["fileName"], "river.png");
    assert!(backend.seen().is_empty());
}

#[tokio::test]
async fn test_unsupported_image_type_rejected() {
    let backend = MockBackend::start(Behavior::Respond("Low")).await;
    let app = App::start(&backend.base_url, Duration::from_secs(5)).await;
    let page = app.mount().await;

    app.upload(&page, "map.webp", "image/webp", vec![1; 10]).await;

    let state = app.state(&page).await;
    assert!(state["lastError"].as_str().unwrap().contains("JPG"));
    assert_eq!(state["selectedImage"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_analyze_without_image_is_rejected() {
    let backend = MockBackend::start(Behavior::Respond("Low")).await;
    let app = App::start(&backend.base_url, Duration::from_secs(5)).await;
    let page = app.mount().await;

    app.post_form(&format!("{}/image/analyze", page), &[]).await;

    assert_eq!(
        app.state(&page).await["lastError"],
        "Please select an image first"
    );
    assert!(backend.seen().is_empty());
}

#[tokio::test]
async fn test_unknown_pages() {
    let app = App::start("http://127.0.0.1:9", Duration::from_secs(5)).await;
    let ghost = format!("/flood-detection/{}", uuid::Uuid::new_v4());

    let resp = app.http.get(app.url(&ghost)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/flood-detection");

    let resp = app
        .post_form(&format!("{}/coordinates", ghost), &[("latitude", "1")])
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.post_form("/flood-detection/not-a-uuid/dismiss", &[]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_close_unmounts_page() {
    let app = App::start("http://127.0.0.1:9", Duration::from_secs(5)).await;
    let page = app.mount().await;

    let resp = app.post_form(&format!("{}/close", page), &[]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let resp = app
        .http
        .get(app.url(&format!("{}/state", page)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
